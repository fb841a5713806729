//! SQLite-backed key/value snapshot store.
//!
//! The Rust stand-in for the extension's `chrome.storage.local`: four JSON
//! values under fixed keys, each independently overwritable. Late-attaching
//! observers read the whole snapshot to reconstruct current state.

use std::path::{Path, PathBuf};

use insight_core::{Error, Result};
use insight_protocol::{AnalysisError, AnalysisResult, Selection};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::keys;
use crate::types::Snapshot;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS snapshot (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
"#;

/// Durable last-write-wins snapshot store.
pub struct SnapshotStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SnapshotStore {
    /// Open or create the snapshot store.
    ///
    /// `db_dir` is the directory (e.g., `data/snapshot/`). The file will be
    /// `db_dir/insight.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir).map_err(|e| Error::Storage(e.to_string()))?;
        let db_path = db_dir.join("insight.db");

        let conn = Connection::open(&db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };

        info!("SnapshotStore initialized: path={}", store.db_path.display());
        Ok(store)
    }

    // ---------------------------------------------------------------
    // Raw key access
    // ---------------------------------------------------------------

    /// Write one key. Overwrites any previous value.
    pub fn set(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let json = serde_json::to_string(value)?;
        let now = chrono::Utc::now().timestamp_millis();
        self.conn
            .lock()
            .execute(
                "INSERT INTO snapshot (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
                params![key, json, now],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// Read one key, or `None` if unset.
    pub fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let raw: Option<String> = self
            .conn
            .lock()
            .query_row(
                "SELECT value FROM snapshot WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        match raw {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    /// Clear one key. Clearing an unset key is a no-op.
    pub fn clear(&self, key: &str) -> Result<()> {
        self.conn
            .lock()
            .execute("DELETE FROM snapshot WHERE key = ?1", params![key])
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Typed writes (one per outcome shape)
    // ---------------------------------------------------------------

    /// Record the latest selection. Analysis fields are left untouched.
    pub fn set_last_selection(&self, selection: &Selection) -> Result<()> {
        self.set(keys::LAST_SELECTION, &serde_json::to_value(selection)?)
    }

    /// Record a successful analysis: sets `lastAnalysis`, clears
    /// `lastAnalysisError`, stamps `lastAnalysisAt`.
    pub fn record_analysis_result(&self, result: &AnalysisResult) -> Result<()> {
        self.set(keys::LAST_ANALYSIS, &serde_json::to_value(result)?)?;
        self.clear(keys::LAST_ANALYSIS_ERROR)?;
        self.stamp_analysis_at()
    }

    /// Record a failed analysis: sets `lastAnalysisError`, clears
    /// `lastAnalysis`, stamps `lastAnalysisAt`.
    pub fn record_analysis_error(&self, error: &AnalysisError) -> Result<()> {
        self.set(keys::LAST_ANALYSIS_ERROR, &serde_json::to_value(error)?)?;
        self.clear(keys::LAST_ANALYSIS)?;
        self.stamp_analysis_at()
    }

    fn stamp_analysis_at(&self) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        self.set(keys::LAST_ANALYSIS_AT, &serde_json::json!(now))
    }

    // ---------------------------------------------------------------
    // Hydration
    // ---------------------------------------------------------------

    /// Read the full snapshot in one pass.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let mut snap = Snapshot::default();

        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT key, value FROM snapshot")
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| Error::Database(e.to_string()))?;

        for row in rows {
            let (key, value) = row.map_err(|e| Error::Database(e.to_string()))?;
            match key.as_str() {
                keys::LAST_SELECTION => snap.last_selection = serde_json::from_str(&value).ok(),
                keys::LAST_ANALYSIS => snap.last_analysis = serde_json::from_str(&value).ok(),
                keys::LAST_ANALYSIS_ERROR => {
                    snap.last_analysis_error = serde_json::from_str(&value).ok()
                }
                keys::LAST_ANALYSIS_AT => snap.last_analysis_at = serde_json::from_str(&value).ok(),
                _ => {}
            }
        }

        Ok(snap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (SnapshotStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn selection() -> Selection {
        Selection {
            text: "hello".into(),
            url: "http://a".into(),
            title: "A".into(),
            timestamp: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_selection_round_trip() {
        let (store, _dir) = test_store();
        let sel = selection();
        store.set_last_selection(&sel).unwrap();

        let snap = store.snapshot().unwrap();
        let read = snap.last_selection.unwrap();
        assert_eq!(read.text, "hello");
        assert_eq!(read.url, "http://a");
        assert_eq!(read.title, "A");
        assert_eq!(read.timestamp, 1_700_000_000_000);
    }

    #[test]
    fn test_last_write_wins() {
        let (store, _dir) = test_store();
        store.set_last_selection(&selection()).unwrap();

        let newer = Selection {
            text: "newer".into(),
            ..selection()
        };
        store.set_last_selection(&newer).unwrap();

        let snap = store.snapshot().unwrap();
        assert_eq!(snap.last_selection.unwrap().text, "newer");
    }

    #[test]
    fn test_result_clears_error() {
        let (store, _dir) = test_store();
        store
            .record_analysis_error(&AnalysisError {
                message: "down".into(),
            })
            .unwrap();

        store
            .record_analysis_result(&AnalysisResult {
                summary: "S".into(),
                insights: vec!["i1".into()],
            })
            .unwrap();

        let snap = store.snapshot().unwrap();
        assert_eq!(snap.last_analysis.unwrap().summary, "S");
        assert!(snap.last_analysis_error.is_none());
        assert!(snap.last_analysis_at.is_some());
    }

    #[test]
    fn test_error_clears_result() {
        let (store, _dir) = test_store();
        store
            .record_analysis_result(&AnalysisResult {
                summary: "S".into(),
                insights: vec![],
            })
            .unwrap();

        store
            .record_analysis_error(&AnalysisError {
                message: "Backend not running or request timed out".into(),
            })
            .unwrap();

        let snap = store.snapshot().unwrap();
        assert!(snap.last_analysis.is_none());
        assert_eq!(
            snap.last_analysis_error.unwrap().message,
            "Backend not running or request timed out"
        );
    }

    #[test]
    fn test_clear_key_is_independent() {
        let (store, _dir) = test_store();
        store.set_last_selection(&selection()).unwrap();
        store
            .record_analysis_result(&AnalysisResult {
                summary: "S".into(),
                insights: vec![],
            })
            .unwrap();

        store.clear(keys::LAST_ANALYSIS).unwrap();

        let snap = store.snapshot().unwrap();
        assert!(snap.last_analysis.is_none());
        assert!(snap.last_selection.is_some());
        assert!(snap.last_analysis_at.is_some());
    }

    #[test]
    fn test_empty_snapshot() {
        let (store, _dir) = test_store();
        let snap = store.snapshot().unwrap();
        assert!(snap.last_selection.is_none());
        assert!(snap.last_analysis.is_none());
        assert!(snap.last_analysis_error.is_none());
        assert!(snap.last_analysis_at.is_none());
    }

    #[test]
    fn test_reopen_persists() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = SnapshotStore::open(dir.path()).unwrap();
            store.set_last_selection(&selection()).unwrap();
        }
        let store = SnapshotStore::open(dir.path()).unwrap();
        assert_eq!(store.snapshot().unwrap().last_selection.unwrap().text, "hello");
    }
}
