//! The safe-mutation protocol. The browser owns the live file and may hold
//! a lock on it at any moment, so a mutation never opens the live path for
//! writing. Instead: snapshot to a private temp copy, transform the copy,
//! copy it back over the live path, then verify and touch. Copying into the
//! destination (rather than truncate-then-write) means a failed replace at
//! any point leaves the previous complete contents intact.
//!
//! A batch shares one snapshot/replace cycle across all ids; every cycle is
//! lock-contended, so per-id cycles would multiply the risk.
//!
//! Nothing guards two mutations racing on the same store. The calling
//! surface is a single interactive command, so at most one mutation runs at
//! a time; that assumption is documented rather than enforced.

use crate::locate::{StoreHandle, StoreKind};
use crate::temp::TempCopy;
use crate::{Error, Result, bookmarks, history};
use crate::{bookmarks::BookmarkItem, history::HistoryEntry};
use heliumctl_core::{RetryPolicy, with_retry};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// What a mutation accomplished. `success_count + fail_count` equals the
/// requested id count whenever the store parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MutationOutcome {
    pub success_count: usize,
    pub fail_count: usize,
    /// Whether the live file was replaced wholesale (false for the history
    /// in-place fast path).
    pub replaced: bool,
}

impl MutationOutcome {
    pub fn is_partial(&self) -> bool {
        self.success_count > 0 && self.fail_count > 0
    }
}

/// Applies deletions to a live store via snapshot, transform, replace,
/// verify and touch. See the module docs for the protocol.
pub struct Mutator {
    snapshot_policy: RetryPolicy,
    replace_policy: RetryPolicy,
    verify: bool,
}

impl Default for Mutator {
    fn default() -> Self {
        Self::new()
    }
}

impl Mutator {
    pub fn new() -> Self {
        Self {
            snapshot_policy: RetryPolicy::snapshot(),
            replace_policy: RetryPolicy::replace(),
            verify: true,
        }
    }

    /// Enable or disable the post-replace re-read check. Verification is
    /// diagnostic only; a mismatch is logged and never fails the operation.
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Override the retry schedules (tests use zero-delay policies).
    pub fn with_policies(mut self, snapshot: RetryPolicy, replace: RetryPolicy) -> Self {
        self.snapshot_policy = snapshot;
        self.replace_policy = replace;
        self
    }

    /// Flattened bookmark listing. Reads the live file directly and falls
    /// back to a scratch copy when the browser holds the read lock.
    pub async fn load_bookmarks(&self, handle: &StoreHandle) -> Result<Vec<BookmarkItem>> {
        let doc = match fs::read_to_string(&handle.path) {
            Ok(content) => bookmarks::parse(&content)?,
            Err(err) => {
                tracing::debug!("direct read failed ({}), snapshotting instead", err);
                let temp = self.snapshot(&handle.path, StoreKind::Bookmarks).await?;
                bookmarks::parse(&fs::read_to_string(temp.path())?)?
            }
        };
        Ok(bookmarks::flatten(&doc))
    }

    /// Recent history entries. Always queried through a scratch copy; the
    /// live database is never opened read-write here.
    pub async fn load_history(
        &self,
        handle: &StoreHandle,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>> {
        let temp = self.snapshot(&handle.path, StoreKind::History).await?;
        history::read_entries(temp.path(), limit)
    }

    /// Remove the given bookmark ids in one snapshot/replace cycle.
    pub async fn delete_bookmarks(
        &self,
        handle: &StoreHandle,
        ids: &BTreeSet<String>,
    ) -> Result<MutationOutcome> {
        let live = handle.path.as_path();
        let temp = self.snapshot(live, StoreKind::Bookmarks).await?;

        let mut doc = bookmarks::parse(&fs::read_to_string(temp.path())?)?;

        let mut removed = Vec::with_capacity(ids.len());
        let mut fail_count = 0;
        for id in ids {
            if bookmarks::remove_by_id(&mut doc, id) {
                removed.push(id.as_str());
            } else {
                fail_count += 1;
            }
        }

        if removed.is_empty() {
            return Err(Error::NothingToDelete);
        }

        fs::write(temp.path(), serde_json::to_string_pretty(&doc)?)?;
        self.replace(temp.path(), live).await?;

        if self.verify {
            verify_removed(live, &removed);
        }
        touch(live);

        tracing::info!(
            "deleted {} bookmark(s), {} not found",
            removed.len(),
            fail_count
        );
        Ok(MutationOutcome {
            success_count: removed.len(),
            fail_count,
            replaced: true,
        })
    }

    /// Remove the given history ids. Tries a transactional in-place delete
    /// first; when the browser's lock refuses it, falls back to the same
    /// snapshot/replace cycle the bookmarks store uses.
    pub async fn delete_history(
        &self,
        handle: &StoreHandle,
        ids: &[i64],
    ) -> Result<MutationOutcome> {
        if !handle.path.is_file() {
            return Err(Error::NotFound(StoreKind::History));
        }

        match delete_history_in_place(&handle.path, ids) {
            Ok(outcome) => return Ok(outcome),
            Err(Error::NothingToDelete) => return Err(Error::NothingToDelete),
            Err(err) => {
                tracing::debug!("in-place delete failed ({}), falling back to copy", err);
            }
        }

        let live = handle.path.as_path();
        let temp = self.snapshot(live, StoreKind::History).await?;

        let mut conn = history::open_scratch(temp.path())?;
        let (success_count, fail_count) = history::delete_ids(&mut conn, ids)?;
        drop(conn);

        if success_count == 0 {
            return Err(Error::NothingToDelete);
        }

        self.replace(temp.path(), live).await?;
        touch(live);

        tracing::info!(
            "deleted {} history entry(ies), {} not found",
            success_count,
            fail_count
        );
        Ok(MutationOutcome {
            success_count,
            fail_count,
            replaced: true,
        })
    }

    /// Copy the live file to a fresh temp path, retrying through transient
    /// locks. Exhaustion is terminal: the store is unavailable, and we never
    /// fall through to mutating the live file itself.
    async fn snapshot(&self, live: &Path, kind: StoreKind) -> Result<TempCopy> {
        if !live.is_file() {
            return Err(Error::NotFound(kind));
        }
        let temp = TempCopy::reserve(kind);
        with_retry(self.snapshot_policy, || {
            fs::copy(live, temp.path()).map(|_| ())
        })
        .await
        .map_err(|err| Error::Unavailable(err.to_string()))?;
        Ok(temp)
    }

    /// Copy the transformed temp file over the live path, retrying while the
    /// browser releases its lock. Exhaustion leaves the live file exactly as
    /// it was.
    async fn replace(&self, temp: &Path, live: &Path) -> Result<()> {
        with_retry(self.replace_policy, || fs::copy(temp, live).map(|_| ()))
            .await
            .map_err(|_| Error::Busy)
    }
}

/// Transactional delete against the live database, used when the lock
/// permits it. Cheaper than a full copy/replace cycle.
fn delete_history_in_place(path: &Path, ids: &[i64]) -> Result<MutationOutcome> {
    let mut conn = history::open_live(path)?;
    let (success_count, fail_count) = history::delete_ids(&mut conn, ids)?;

    if success_count == 0 {
        return Err(Error::NothingToDelete);
    }
    Ok(MutationOutcome {
        success_count,
        fail_count,
        replaced: false,
    })
}

/// Re-read the live document and warn about any id that survived the
/// replace. Diagnostic only.
fn verify_removed(live: &Path, ids: &[&str]) {
    let Ok(content) = fs::read_to_string(live) else {
        return;
    };
    let Ok(doc) = serde_json::from_str::<Value>(&content) else {
        return;
    };
    for id in ids {
        if bookmarks::contains_id(&doc, id) {
            tracing::warn!("bookmark {} still present after replace", id);
        }
    }
}

/// Bump the live file's mtime so the browser's own reload-on-change watcher
/// notices the rewrite. Best-effort.
fn touch(path: &Path) {
    if let Ok(file) = fs::OpenOptions::new().append(true).open(path) {
        let _ = file.set_modified(SystemTime::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::fixtures;
    use crate::locate::{StoreHandle, StoreKind};
    use heliumctl_core::DelayPolicy;
    use serde_json::json;
    use std::time::Duration;

    fn fast_mutator() -> Mutator {
        let immediate = |attempts| RetryPolicy {
            max_attempts: attempts,
            delay: DelayPolicy::Stepped {
                step: Duration::ZERO,
            },
        };
        Mutator::new().with_policies(immediate(3), immediate(5))
    }

    fn write_bookmarks(path: &Path) {
        let doc = json!({
            "checksum": "ab12",
            "roots": {
                "bookmark_bar": {"type": "folder", "name": "Bookmarks bar", "children": [
                    {"id": "a1", "type": "url", "name": "Example", "url": "https://example.com"},
                    {"id": "f1", "type": "folder", "name": "Work", "children": [
                        {"id": "a2", "type": "url", "name": "Docs", "url": "https://docs.example.com"}
                    ]}
                ]},
                "other": {"type": "folder", "name": "Other bookmarks", "children": []},
                "synced": {"type": "folder", "name": "Mobile bookmarks", "children": []}
            }
        });
        fs::write(path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
    }

    fn bookmarks_handle(path: &Path) -> StoreHandle {
        StoreHandle {
            path: path.to_path_buf(),
            kind: StoreKind::Bookmarks,
        }
    }

    fn history_handle(path: &Path) -> StoreHandle {
        StoreHandle {
            path: path.to_path_buf(),
            kind: StoreKind::History,
        }
    }

    fn ids(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_delete_nested_bookmark_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let live = dir.path().join("Bookmarks");
        write_bookmarks(&live);

        let outcome = fast_mutator()
            .delete_bookmarks(&bookmarks_handle(&live), &ids(&["a2"]))
            .await
            .unwrap();

        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.fail_count, 0);
        assert!(outcome.replaced);

        let doc: Value = serde_json::from_str(&fs::read_to_string(&live).unwrap()).unwrap();
        let work = &doc["roots"]["bookmark_bar"]["children"][1];
        assert_eq!(work["id"], "f1");
        assert_eq!(work["children"].as_array().unwrap().len(), 0);
        assert_eq!(doc["roots"]["bookmark_bar"]["children"][0]["id"], "a1");
        assert_eq!(doc["checksum"], "ab12");
    }

    #[tokio::test]
    async fn test_delete_all_present_ids_succeeds_fully() {
        let dir = tempfile::tempdir().unwrap();
        let live = dir.path().join("Bookmarks");
        write_bookmarks(&live);

        let handle = bookmarks_handle(&live);
        let mutator = fast_mutator();
        let outcome = mutator
            .delete_bookmarks(&handle, &ids(&["a1", "a2"]))
            .await
            .unwrap();

        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.fail_count, 0);

        let remaining = mutator.load_bookmarks(&handle).await.unwrap();
        assert!(remaining.iter().all(|item| item.id != "a1" && item.id != "a2"));
    }

    #[tokio::test]
    async fn test_partial_failure_is_localized() {
        let dir = tempfile::tempdir().unwrap();
        let live = dir.path().join("Bookmarks");
        write_bookmarks(&live);

        let outcome = fast_mutator()
            .delete_bookmarks(&bookmarks_handle(&live), &ids(&["a1", "missing"]))
            .await
            .unwrap();

        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.fail_count, 1);
        assert!(outcome.is_partial());

        let doc: Value = serde_json::from_str(&fs::read_to_string(&live).unwrap()).unwrap();
        assert!(!bookmarks::contains_id(&doc, "a1"));
        assert!(bookmarks::contains_id(&doc, "a2"));
    }

    #[tokio::test]
    async fn test_second_delete_of_same_id_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let live = dir.path().join("Bookmarks");
        write_bookmarks(&live);

        let handle = bookmarks_handle(&live);
        let mutator = fast_mutator();
        mutator
            .delete_bookmarks(&handle, &ids(&["a1"]))
            .await
            .unwrap();

        // Already absent: NothingToDelete, never a raw failure.
        let second = mutator.delete_bookmarks(&handle, &ids(&["a1"])).await;
        assert!(matches!(second, Err(Error::NothingToDelete)));

        // Paired with a present id it is a per-item miss.
        let third = mutator
            .delete_bookmarks(&handle, &ids(&["a1", "a2"]))
            .await
            .unwrap();
        assert_eq!(third.success_count, 1);
        assert_eq!(third.fail_count, 1);
    }

    #[tokio::test]
    async fn test_no_matches_aborts_without_touching_store() {
        let dir = tempfile::tempdir().unwrap();
        let live = dir.path().join("Bookmarks");
        write_bookmarks(&live);
        let before = fs::read(&live).unwrap();

        let result = fast_mutator()
            .delete_bookmarks(&bookmarks_handle(&live), &ids(&["zz"]))
            .await;

        assert!(matches!(result, Err(Error::NothingToDelete)));
        assert_eq!(fs::read(&live).unwrap(), before);
    }

    #[tokio::test]
    async fn test_missing_store_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let live = dir.path().join("Bookmarks");

        let result = fast_mutator()
            .delete_bookmarks(&bookmarks_handle(&live), &ids(&["a1"]))
            .await;
        assert!(matches!(result, Err(Error::NotFound(StoreKind::Bookmarks))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_replace_leaves_live_bytes_untouched() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let live = dir.path().join("Bookmarks");
        write_bookmarks(&live);
        let before = fs::read(&live).unwrap();

        // Read-only live file: snapshot still works, replace never can.
        fs::set_permissions(&live, fs::Permissions::from_mode(0o444)).unwrap();
        if fs::OpenOptions::new().write(true).open(&live).is_ok() {
            // Permission bits are not enforced for this user (root); the
            // lock cannot be simulated this way.
            return;
        }

        let result = fast_mutator()
            .with_verification(false)
            .delete_bookmarks(&bookmarks_handle(&live), &ids(&["a1"]))
            .await;

        assert!(matches!(result, Err(Error::Busy)));
        assert_eq!(fs::read(&live).unwrap(), before);

        fs::set_permissions(&live, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[tokio::test]
    async fn test_temp_copy_is_cleaned_up_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let live = dir.path().join("Bookmarks");
        write_bookmarks(&live);

        fast_mutator()
            .delete_bookmarks(&bookmarks_handle(&live), &ids(&["a1"]))
            .await
            .unwrap();

        let leftovers: Vec<_> = fs::read_dir(std::env::temp_dir())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| {
                name.starts_with(&format!("helium-bookmarks-{}-", std::process::id()))
            })
            .collect();
        assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
    }

    #[tokio::test]
    async fn test_delete_history_in_place_when_unlocked() {
        let dir = tempfile::tempdir().unwrap();
        let live = dir.path().join("History");
        fixtures::create_db(
            &live,
            &[(1, "https://a.example", "A", 10), (2, "https://b.example", "B", 20)],
        );

        let outcome = fast_mutator()
            .delete_history(&history_handle(&live), &[1, 99])
            .await
            .unwrap();

        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.fail_count, 1);
        assert!(!outcome.replaced, "unlocked database takes the in-place path");
        assert_eq!(fixtures::visit_rows_for(&live, 1), 0);
        assert_eq!(fixtures::visit_rows_for(&live, 2), 1);
    }

    #[tokio::test]
    async fn test_delete_history_nothing_to_delete() {
        let dir = tempfile::tempdir().unwrap();
        let live = dir.path().join("History");
        fixtures::create_db(&live, &[(1, "https://a.example", "A", 10)]);

        let result = fast_mutator()
            .delete_history(&history_handle(&live), &[42])
            .await;
        assert!(matches!(result, Err(Error::NothingToDelete)));
        assert_eq!(fixtures::visit_rows_for(&live, 1), 1);
    }

    #[tokio::test]
    async fn test_delete_history_missing_store_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let live = dir.path().join("History");

        let result = fast_mutator()
            .delete_history(&history_handle(&live), &[1])
            .await;

        assert!(matches!(result, Err(Error::NotFound(StoreKind::History))));
        assert!(!live.exists());
    }

    #[tokio::test]
    async fn test_load_history_reads_through_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let live = dir.path().join("History");
        fixtures::create_db(
            &live,
            &[(1, "https://a.example", "A", 10), (2, "https://b.example", "B", 20)],
        );

        let entries = fast_mutator()
            .load_history(&history_handle(&live), 10)
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, 2);
    }

    #[tokio::test]
    async fn test_load_bookmarks_flattens_live_file() {
        let dir = tempfile::tempdir().unwrap();
        let live = dir.path().join("Bookmarks");
        write_bookmarks(&live);

        let items = fast_mutator()
            .load_bookmarks(&bookmarks_handle(&live))
            .await
            .unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a1", "f1", "a2"]);
    }
}
