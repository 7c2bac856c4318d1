use std::path::PathBuf;

/// Profile subdirectories checked inside each `User Data` root, in priority
/// order. A root-level file (some versions keep one) is checked last.
pub const PROFILE_DIRS: [&str; 4] = ["Default", "Profile 1", "Profile 2", "Guest Profile"];

/// Which of Helium's two on-disk stores a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// The JSON bookmarks document (`Bookmarks`).
    Bookmarks,
    /// The SQLite history database (`History`).
    History,
}

impl StoreKind {
    /// Profile-relative file name Chromium-based browsers use for this store.
    pub fn file_name(&self) -> &'static str {
        match self {
            StoreKind::Bookmarks => "Bookmarks",
            StoreKind::History => "History",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StoreKind::Bookmarks => "bookmarks file",
            StoreKind::History => "history database",
        }
    }
}

/// A freshly resolved path to one of the browser's stores.
///
/// Handles are resolved per operation and never cached beyond the session's
/// short TTL window; the file belongs to the browser, not to us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreHandle {
    pub path: PathBuf,
    pub kind: StoreKind,
}

/// All paths where the store could live, as the cross product of
/// (root x profile subdirectory) in fixed priority order.
pub fn candidates(roots: &[PathBuf], kind: StoreKind) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(roots.len() * (PROFILE_DIRS.len() + 1));
    for root in roots {
        for profile in PROFILE_DIRS {
            paths.push(root.join(profile).join(kind.file_name()));
        }
        paths.push(root.join(kind.file_name()));
    }
    paths
}

/// First existing candidate, or `None` when the store does not exist.
///
/// Absence is a normal outcome (browser never launched, nonstandard
/// install), not an error. Existence checks only; nothing is read.
pub fn locate(roots: &[PathBuf], kind: StoreKind) -> Option<StoreHandle> {
    candidates(roots, kind)
        .into_iter()
        .find(|path| path.is_file())
        .map(|path| StoreHandle { path, kind })
}
