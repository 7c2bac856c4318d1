use anyhow::Result;
use heliumctl_browser::{HeliumFinder, LaunchMode};
use std::path::PathBuf;

pub fn execute(mode: LaunchMode, url: Option<String>, browser_path: Option<PathBuf>) -> Result<()> {
    let finder = HeliumFinder::new(browser_path);
    let executable = finder.find()?;
    tracing::debug!("using browser at {}", executable.display());

    heliumctl_browser::launch(&executable, mode, url.as_deref())?;

    let status = match (mode, url.is_some()) {
        (LaunchMode::Tab, true) => "Opening URL in Helium...",
        (LaunchMode::Tab, false) => "New tab opened",
        (LaunchMode::Window, _) => "New window opened",
        (LaunchMode::PrivateWindow, _) => "New private window opened",
    };
    println!("🚀 {status}");
    Ok(())
}
