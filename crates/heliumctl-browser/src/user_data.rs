use crate::finder::HeliumFinder;
use std::path::{Path, PathBuf};

/// Candidate `User Data` roots for the store locator, in priority order:
/// an explicit override wins outright, then the directory next to the
/// installed executable, then platform data directories.
///
/// Every returned path is a candidate, not a promise; callers treat an
/// empty or all-missing list as "browser never launched".
pub fn user_data_roots(override_dir: Option<PathBuf>) -> Vec<PathBuf> {
    if let Some(dir) = override_dir {
        return vec![dir];
    }

    let mut roots = Vec::new();

    if let Ok(executable) = HeliumFinder::new(None).find()
        && let Some(install) = install_dir(&executable)
    {
        roots.push(install.join("User Data"));
    }

    for root in platform_roots() {
        if !roots.contains(&root) {
            roots.push(root);
        }
    }

    tracing::debug!("user data roots: {:?}", roots);
    roots
}

/// Install root for a located executable. On Windows `chrome.exe` sits in
/// an `Application` directory one level below the install root.
fn install_dir(executable: &Path) -> Option<PathBuf> {
    let parent = executable.parent()?;
    if parent.file_name().is_some_and(|name| name == "Application") {
        parent.parent().map(Path::to_path_buf)
    } else {
        Some(parent.to_path_buf())
    }
}

fn platform_roots() -> Vec<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let mut roots = Vec::new();
        if let Some(local) = dirs::data_local_dir() {
            roots.push(local.join(r"imput\Helium\User Data"));
            roots.push(local.join(r"Helium\User Data"));
        }
        return roots;
    }

    #[cfg(target_os = "macos")]
    return dirs::config_dir()
        .map(|dir| vec![dir.join("Helium")])
        .unwrap_or_default();

    #[cfg(target_os = "linux")]
    return dirs::config_dir()
        .map(|dir| vec![dir.join("helium"), dir.join("imput/helium")])
        .unwrap_or_default();

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    return vec![];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins_outright() {
        let roots = user_data_roots(Some(PathBuf::from("/custom/User Data")));
        assert_eq!(roots, vec![PathBuf::from("/custom/User Data")]);
    }

    #[test]
    fn test_install_dir_strips_application_level() {
        let exe = PathBuf::from(r"/local/imput/Helium/Application/chrome.exe");
        assert_eq!(
            install_dir(&exe),
            Some(PathBuf::from("/local/imput/Helium"))
        );
    }

    #[test]
    fn test_install_dir_plain_executable() {
        let exe = PathBuf::from("/usr/bin/helium");
        assert_eq!(install_dir(&exe), Some(PathBuf::from("/usr/bin")));
    }

    #[test]
    fn test_roots_are_deduplicated() {
        let roots = user_data_roots(None);
        for (i, root) in roots.iter().enumerate() {
            assert!(!roots[i + 1..].contains(root), "duplicate root: {root:?}");
        }
    }
}
