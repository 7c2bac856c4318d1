//! The history store: a SQLite database with a primary `urls` table and a
//! `visits` table whose `url` column is a foreign key back to `urls.id`.

use crate::Result;
use heliumctl_core::time;
use rusqlite::{Connection, OpenFlags, TransactionBehavior, params};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Row cap for listings; matches what the interactive search can usefully show.
pub const DEFAULT_QUERY_LIMIT: usize = 500;

/// How long the in-place fast path waits on the browser's lock before the
/// caller falls back to copy-modify-replace.
const BUSY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub visit_count: i64,
    /// Microseconds since the Chromium epoch.
    pub last_visit_time: i64,
}

impl HistoryEntry {
    pub fn last_visit_utc(&self) -> chrono::DateTime<chrono::Utc> {
        time::from_chromium_micros(self.last_visit_time)
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query) || self.url.to_lowercase().contains(&query)
    }
}

/// Open a scratch copy we own exclusively.
pub(crate) fn open_scratch(path: &Path) -> Result<Connection> {
    Ok(Connection::open(path)?)
}

/// Open the live database for the in-place fast path. The browser may hold
/// the write lock; the busy timeout gives it a window to release.
pub(crate) fn open_live(path: &Path) -> Result<Connection> {
    // Read-write without create: a missing database must never be conjured.
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.query_row("PRAGMA journal_mode=WAL", [], |_row| Ok(()))?;
    Ok(conn)
}

/// Most recently visited entries, newest first.
pub fn read_entries(path: &Path, limit: usize) -> Result<Vec<HistoryEntry>> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let mut stmt = conn.prepare(
        "SELECT id, url, title, visit_count, last_visit_time
         FROM urls
         ORDER BY last_visit_time DESC
         LIMIT ?1",
    )?;

    let rows = stmt.query_map(params![limit as i64], |row| {
        let url: String = row.get(1)?;
        let title: Option<String> = row.get(2)?;
        Ok(HistoryEntry {
            id: row.get(0)?,
            title: title.filter(|t| !t.is_empty()).unwrap_or_else(|| url.clone()),
            url,
            visit_count: row.get(3)?,
            last_visit_time: row.get(4)?,
        })
    })?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Into::into)
}

/// Delete each id from `urls` plus its `visits` rows, one all-or-nothing
/// transaction per id. An id with no row counts as a per-item failure and
/// the batch continues.
pub(crate) fn delete_ids(conn: &mut Connection, ids: &[i64]) -> Result<(usize, usize)> {
    let mut success = 0;
    let mut fail = 0;

    for &id in ids {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = tx.execute("DELETE FROM urls WHERE id = ?1", params![id])?;
        tx.execute("DELETE FROM visits WHERE url = ?1", params![id])?;
        tx.commit()?;

        if removed > 0 {
            success += 1;
        } else {
            fail += 1;
        }
    }

    Ok((success, fail))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_entries_newest_first_with_limit() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("History");
        fixtures::create_db(
            &db,
            &[
                (1, "https://old.example", "Old", 100),
                (2, "https://new.example", "New", 300),
                (3, "https://mid.example", "Mid", 200),
            ],
        );

        let entries = read_entries(&db, 2).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, 2);
        assert_eq!(entries[1].id, 3);
    }

    #[test]
    fn test_read_entries_empty_title_falls_back_to_url() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("History");
        fixtures::create_db(&db, &[(1, "https://untitled.example", "", 100)]);

        let entries = read_entries(&db, 10).unwrap();
        assert_eq!(entries[0].title, "https://untitled.example");
    }

    #[test]
    fn test_delete_ids_counts_hits_and_misses() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("History");
        fixtures::create_db(
            &db,
            &[(1, "https://a.example", "A", 1), (2, "https://b.example", "B", 2)],
        );

        let mut conn = Connection::open(&db).unwrap();
        let (success, fail) = delete_ids(&mut conn, &[1, 99]).unwrap();
        drop(conn);

        assert_eq!((success, fail), (1, 1));
        assert_eq!(fixtures::visit_rows_for(&db, 1), 0);
        assert_eq!(fixtures::visit_rows_for(&db, 2), 1);
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let entry = HistoryEntry {
            id: 1,
            url: "https://Docs.Example.com/page".to_string(),
            title: "Project Notes".to_string(),
            visit_count: 3,
            last_visit_time: 0,
        };

        assert!(entry.matches("notes"));
        assert!(entry.matches("docs.example"));
        assert!(!entry.matches("bookmarks"));
    }
}
