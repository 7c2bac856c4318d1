use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Locates the Helium executable on the system.
pub struct HeliumFinder {
    custom_path: Option<PathBuf>,
}

impl HeliumFinder {
    /// Create a new HeliumFinder with optional custom path
    pub fn new(custom_path: Option<PathBuf>) -> Self {
        Self { custom_path }
    }

    /// Find the Helium binary: custom path first, then platform default
    /// install locations, then PATH.
    pub fn find(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.custom_path {
            return self.validate_browser_path(path);
        }

        for path in Self::default_paths() {
            if let Ok(valid_path) = self.validate_browser_path(&path) {
                return Ok(valid_path);
            }
        }

        for name in ["helium", "Helium"] {
            if let Ok(path) = which::which(name) {
                return self.validate_browser_path(&path);
            }
        }

        Err(Error::Browser(format!(
            "Helium not found. Checked: {}. Use --browser-path to specify location.",
            Self::default_paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    /// Platform-specific default install paths, in priority order.
    fn default_paths() -> Vec<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            let mut paths = Vec::new();
            if let Some(local) = dirs::data_local_dir() {
                paths.push(local.join(r"imput\Helium\Application\chrome.exe"));
                paths.push(local.join(r"imput\Helium\Helium.exe"));
                paths.push(local.join(r"Programs\Helium\Helium.exe"));
                paths.push(local.join(r"Helium\Helium.exe"));
            }
            for var in ["PROGRAMFILES", "ProgramFiles(x86)"] {
                if let Ok(programs) = std::env::var(var) {
                    paths.push(PathBuf::from(programs).join(r"Helium\Helium.exe"));
                }
            }
            return paths;
        }

        #[cfg(target_os = "macos")]
        return vec![PathBuf::from(
            "/Applications/Helium.app/Contents/MacOS/Helium",
        )];

        #[cfg(target_os = "linux")]
        return vec![
            PathBuf::from("/usr/bin/helium"),
            PathBuf::from("/usr/local/bin/helium"),
            PathBuf::from("/opt/helium/helium"),
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        return vec![];
    }

    /// Validate that a path exists and is executable
    fn validate_browser_path(&self, path: &Path) -> Result<PathBuf> {
        if !path.exists() {
            return Err(Error::Browser(format!(
                "Helium not found at: {}",
                path.display()
            )));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            if metadata.permissions().mode() & 0o111 == 0 {
                return Err(Error::Browser(format!(
                    "Helium binary not executable: {}",
                    path.display()
                )));
            }
        }

        Ok(path.to_path_buf())
    }
}
