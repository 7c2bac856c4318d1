use anyhow::Result;

pub fn execute() -> Result<()> {
    let closed = heliumctl_browser::close()?;

    if closed == 0 {
        println!("ℹ️  No running Helium processes found");
    } else {
        println!("✅ Closed {closed} Helium process(es)");
    }
    Ok(())
}
