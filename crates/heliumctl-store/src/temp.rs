use crate::locate::StoreKind;
use std::path::{Path, PathBuf};

/// Exclusively-owned scratch copy of a live store file.
///
/// The path is unique per process and instant, so concurrent invocations
/// never collide. Removal on drop is best-effort: temp files are transient
/// and a leaked one is not worth an error.
#[derive(Debug)]
pub struct TempCopy {
    path: PathBuf,
}

impl TempCopy {
    /// Reserve a unique scratch path for one mutation of the given store.
    /// Nothing is created on disk until the caller copies into it.
    pub(crate) fn reserve(kind: StoreKind) -> Self {
        let (tag, ext) = match kind {
            StoreKind::Bookmarks => ("bookmarks", "json"),
            StoreKind::History => ("history", "db"),
        };
        let name = format!(
            "helium-{}-{}-{}.{}",
            tag,
            std::process::id(),
            chrono::Utc::now().timestamp_micros(),
            ext
        );
        Self {
            path: std::env::temp_dir().join(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempCopy {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_paths_are_unique() {
        let a = TempCopy::reserve(StoreKind::Bookmarks);
        let b = TempCopy::reserve(StoreKind::Bookmarks);
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_drop_removes_file() {
        let temp = TempCopy::reserve(StoreKind::History);
        std::fs::write(temp.path(), b"scratch").unwrap();
        let path = temp.path().to_path_buf();
        assert!(path.exists());

        drop(temp);
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_tolerates_missing_file() {
        let temp = TempCopy::reserve(StoreKind::History);
        // Never created on disk; drop must not panic.
        drop(temp);
    }
}
