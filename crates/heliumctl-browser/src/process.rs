use crate::{Error, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

/// Process names Helium runs under.
#[cfg(unix)]
const PROCESS_NAMES: [&str; 2] = ["helium", "Helium"];
#[cfg(windows)]
const PROCESS_NAMES: [&str; 2] = ["Helium.exe", "chrome.exe"];

/// Grace period between the polite terminate and the forced kill.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(750);

/// Which surface a launch should open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Reuse the running instance; a URL becomes a new tab.
    Tab,
    /// `--new-window`
    Window,
    /// `--incognito`
    PrivateWindow,
}

/// Spawn the browser detached, optionally at a URL. When an instance is
/// already running Chromium hands the arguments over and exits, so this is
/// also how "new tab" works.
pub fn launch(executable: &Path, mode: LaunchMode, url: Option<&str>) -> Result<()> {
    let mut command = Command::new(executable);
    match mode {
        LaunchMode::Tab => {}
        LaunchMode::Window => {
            command.arg("--new-window");
        }
        LaunchMode::PrivateWindow => {
            command.arg("--incognito");
        }
    }
    if let Some(url) = url {
        command.arg(url);
    }

    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    tracing::debug!("launching {} ({:?})", executable.display(), mode);
    command
        .spawn()
        .map_err(|err| Error::Browser(format!("failed to launch Helium: {err}")))?;
    Ok(())
}

/// Terminate every running Helium process: polite termination first, then a
/// forced kill for stragglers. Returns how many processes were signalled.
pub fn close() -> Result<usize> {
    let pids = find_pids()?;
    if pids.is_empty() {
        return Ok(0);
    }

    for &pid in &pids {
        terminate(pid, false);
    }

    std::thread::sleep(SHUTDOWN_GRACE);
    for &pid in &find_pids()? {
        tracing::debug!("process {} survived terminate, forcing", pid);
        terminate(pid, true);
    }

    Ok(pids.len())
}

/// PIDs of running Helium processes, via the platform process tools.
fn find_pids() -> Result<Vec<u32>> {
    let mut pids = Vec::new();

    #[cfg(unix)]
    for name in PROCESS_NAMES {
        let output = Command::new("pgrep").arg("-x").arg(name).output()?;
        if output.status.success() {
            for line in String::from_utf8_lossy(&output.stdout).lines() {
                if let Ok(pid) = line.trim().parse() {
                    if !pids.contains(&pid) {
                        pids.push(pid);
                    }
                }
            }
        }
    }

    #[cfg(windows)]
    for name in PROCESS_NAMES {
        let output = Command::new("tasklist")
            .args(["/FO", "CSV", "/NH", "/FI"])
            .arg(format!("IMAGENAME eq {name}"))
            .output()?;
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            // CSV row: "Image Name","PID","Session Name",...
            if let Some(pid) = line
                .split(',')
                .nth(1)
                .and_then(|field| field.trim_matches('"').parse().ok())
            {
                if !pids.contains(&pid) {
                    pids.push(pid);
                }
            }
        }
    }

    Ok(pids)
}

/// Signal one process by PID (cross-platform).
fn terminate(pid: u32, force: bool) {
    #[cfg(unix)]
    {
        let mut command = Command::new("kill");
        if force {
            command.arg("-9");
        }
        let _ = command.arg(pid.to_string()).output();
    }

    #[cfg(windows)]
    {
        let mut command = Command::new("taskkill");
        command.args(["/PID", &pid.to_string()]);
        if force {
            command.arg("/F");
        }
        let _ = command.output();
    }
}
