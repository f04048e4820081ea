//! Durable key → bytes table backed by a single SQLite file
//!
//! Schema:
//! ```text
//! Blobs
//!   - DataName:  TEXT, primary key, unique, not null
//!   - DataBytes: BLOB, not null
//! ```
//!
//! Every operation takes the store's mutex, opens a fresh connection, runs a
//! single statement, and closes the connection before the mutex is released.
//! Operations on one store therefore execute one at a time, in the order
//! they acquired the mutex. Nothing is retried; engine errors go straight
//! back to the caller.

use crate::codec::{decode_from_bytes, encode_to_bytes, Decode, Encode};
use crate::store::blob::Blob;
use crate::store::config::StoreConfig;
use crate::{Error, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS Blobs (
    DataName TEXT PRIMARY KEY NOT NULL UNIQUE,
    DataBytes BLOB NOT NULL
)";

const UPSERT: &str = "INSERT INTO Blobs (DataName, DataBytes) VALUES (?1, ?2)
    ON CONFLICT(DataName) DO UPDATE SET DataBytes = excluded.DataBytes";

const REQUIRED_COLUMNS: [&str; 2] = ["DataName", "DataBytes"];

/// Gate state; connections to the file are only handed out through it
struct Backing {
    /// Operations started so far; their order is the store's total order
    seq: u64,
}

impl Backing {
    fn connect(&mut self, path: &Path, config: &StoreConfig) -> Result<Connection> {
        self.seq += 1;
        open_connection(path, config)
    }
}

/// A durable key-value table of binary blobs
pub struct BlobStore {
    /// Path to the database file
    path: PathBuf,
    /// Engine settings used for every connection
    config: StoreConfig,
    /// Serializes every operation against the file
    gate: Mutex<Backing>,
}

impl BlobStore {
    /// Open (or create) a store with the default configuration.
    ///
    /// The parent directory must already exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, StoreConfig::default())
    }

    /// Open (or create) a store, setting up the journal mode and schema
    pub fn open_with_config(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Not shared yet, so no gate needed.
        let conn = open_connection(&path, &config)?;
        conn.execute_batch(CREATE_TABLE)?;
        validate_schema(&conn)?;
        let mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
        drop(conn);

        info!(path = %path.display(), journal_mode = %mode, "opened blob store");

        Ok(BlobStore {
            path,
            config,
            gate: Mutex::new(Backing { seq: 0 }),
        })
    }

    /// Run `op` on a fresh connection while holding the gate
    fn with_connection<T>(
        &self,
        name: &'static str,
        op: impl FnOnce(&Connection) -> Result<T>,
    ) -> Result<T> {
        let mut backing = self.gate.lock();
        let conn = backing.connect(&self.path, &self.config)?;
        let result = op(&conn);
        drop(conn);

        trace!(seq = backing.seq, op = name, ok = result.is_ok(), "store operation finished");
        result
    }

    /// Insert or overwrite the payload stored under `key`.
    ///
    /// Returns `Ok(false)` without touching the file if `key` or `bytes` is
    /// empty. Engine failures are returned as errors.
    pub fn set(&self, key: &str, bytes: &[u8]) -> Result<bool> {
        if key.is_empty() || bytes.is_empty() {
            warn!(
                key_len = key.len(),
                payload_len = bytes.len(),
                "rejected set with empty key or payload"
            );
            return Ok(false);
        }

        let changed = self.with_connection("set", |conn| {
            Ok(conn.execute(UPSERT, params![key, bytes])?)
        })?;
        debug!(key, size = bytes.len(), changed, "set blob");
        Ok(changed > 0)
    }

    /// Fetch the payload for `key`, or `None` if it is absent
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let bytes = self.with_connection("get", |conn| {
            Ok(conn
                .query_row(
                    "SELECT DataBytes FROM Blobs WHERE DataName = ?1",
                    params![key],
                    |row| row.get::<_, Vec<u8>>(0),
                )
                .optional()?)
        })?;
        debug!(key, hit = bytes.is_some(), "get blob");
        Ok(bytes)
    }

    /// Remove `key`; returns whether a row was removed
    pub fn delete(&self, key: &str) -> Result<bool> {
        let removed = self.with_connection("delete", |conn| {
            Ok(conn.execute("DELETE FROM Blobs WHERE DataName = ?1", params![key])?)
        })?;
        debug!(key, removed, "delete blob");
        Ok(removed > 0)
    }

    /// Check if `key` is present without loading its payload
    pub fn data_exists(&self, key: &str) -> Result<bool> {
        self.with_connection("data_exists", |conn| {
            Ok(conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM Blobs WHERE DataName = ?1)",
                params![key],
                |row| row.get::<_, bool>(0),
            )?)
        })
    }

    /// All keys, in ascending order
    pub fn list(&self) -> Result<Vec<String>> {
        self.with_connection("list", |conn| {
            let mut stmt = conn.prepare("SELECT DataName FROM Blobs ORDER BY DataName ASC")?;
            let keys = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(keys)
        })
    }

    /// Get the number of blobs in the store
    pub fn num_entries(&self) -> Result<usize> {
        let count = self.with_connection("num_entries", |conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM Blobs", [], |row| {
                row.get::<_, i64>(0)
            })?)
        })?;
        Ok(count as usize)
    }

    // === Whole records ===

    /// Store a blob record; same rules as [`set`](Self::set)
    pub fn set_blob(&self, blob: &Blob) -> Result<bool> {
        if !blob.is_valid() {
            warn!(key_len = blob.name.len(), payload_len = blob.size(), "rejected blob");
            return Ok(false);
        }
        self.set(&blob.name, &blob.bytes)
    }

    /// Fetch a blob record
    pub fn get_blob(&self, key: &str) -> Result<Option<Blob>> {
        Ok(self.get(key)?.map(|bytes| Blob::new(key, bytes)))
    }

    /// Every record, in key order
    pub fn entries(&self) -> Result<Vec<Blob>> {
        self.with_connection("entries", |conn| {
            let mut stmt =
                conn.prepare("SELECT DataName, DataBytes FROM Blobs ORDER BY DataName ASC")?;
            let blobs = stmt
                .query_map([], |row| {
                    Ok(Blob {
                        name: row.get(0)?,
                        bytes: row.get(1)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(blobs)
        })
    }

    // === Encoded values ===

    /// Encode `value` and store it under `key`
    pub fn put_value<T: Encode + ?Sized>(&self, key: &str, value: &T) -> Result<bool> {
        let bytes = encode_to_bytes(value);
        self.set(key, &bytes)
    }

    /// Load and decode the value stored under `key`
    pub fn get_value<T: Decode>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(bytes) => Ok(Some(decode_from_bytes(bytes)?)),
            None => Ok(None),
        }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the engine configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

/// Open a connection with every setting from `config` applied.
///
/// `journal_mode` is set on each connection: most modes persist in the file,
/// but `MEMORY` only lasts as long as the connection that set it.
fn open_connection(path: &Path, config: &StoreConfig) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(config.busy_timeout())?;

    let wanted = config.journal_mode.as_pragma();
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", wanted, |row| row.get(0))?;
    if !mode.eq_ignore_ascii_case(wanted) {
        warn!(path = %path.display(), wanted, actual = %mode, "journal mode not applied");
    }

    conn.pragma_update(None, "synchronous", config.synchronous.as_pragma())?;
    Ok(conn)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('Blobs')")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    for required in REQUIRED_COLUMNS {
        if !columns.iter().any(|c| c == required) {
            return Err(Error::Schema(format!(
                "table Blobs is missing column {} (found: {})",
                required,
                columns.join(", ")
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Decoder, Encoder};
    use crate::store::config::{JournalMode, SyncMode};
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let store = BlobStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.num_entries().unwrap(), 0);
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn test_read_after_write() {
        let dir = tempdir().unwrap();
        let store = BlobStore::open(dir.path().join("test.db")).unwrap();

        assert!(store.set("mesh", &[1, 2, 3]).unwrap());
        assert_eq!(store.get("mesh").unwrap(), Some(vec![1, 2, 3]));
        assert!(store.data_exists("mesh").unwrap());
    }

    #[test]
    fn test_upsert_overwrites() {
        let dir = tempdir().unwrap();
        let store = BlobStore::open(dir.path().join("test.db")).unwrap();

        assert!(store.set("k", b"first").unwrap());
        assert_eq!(store.num_entries().unwrap(), 1);

        assert!(store.set("k", b"second").unwrap());
        assert_eq!(store.num_entries().unwrap(), 1);
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"second"[..]));
    }

    #[test]
    fn test_miss_semantics() {
        let dir = tempdir().unwrap();
        let store = BlobStore::open(dir.path().join("test.db")).unwrap();

        assert_eq!(store.get("nonexistent").unwrap(), None);
        assert!(!store.delete("nonexistent").unwrap());
        assert!(!store.data_exists("nonexistent").unwrap());
        assert!(store.get_blob("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_invalid_set_is_soft_failure() {
        let dir = tempdir().unwrap();
        let store = BlobStore::open(dir.path().join("test.db")).unwrap();

        assert!(!store.set("", b"payload").unwrap());
        assert!(!store.set("key", b"").unwrap());
        assert!(!store.set_blob(&Blob::new("", Vec::<u8>::new())).unwrap());
        assert_eq!(store.num_entries().unwrap(), 0);
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let store = BlobStore::open(dir.path().join("test.db")).unwrap();

        store.set("a", &[1]).unwrap();
        store.set("b", &[2]).unwrap();
        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());
        assert_eq!(store.list().unwrap(), vec!["b".to_string()]);
    }

    #[test]
    fn test_list_is_sorted() {
        let dir = tempdir().unwrap();
        let store = BlobStore::open(dir.path().join("test.db")).unwrap();

        for key in ["b", "a", "c"] {
            store.set(key, key.as_bytes()).unwrap();
        }
        assert_eq!(store.list().unwrap(), vec!["a", "b", "c"]);

        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], Blob::new("a", b"a".to_vec()));
        assert_eq!(entries[2].name, "c");
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let store = BlobStore::open(&path).unwrap();
            store.set("persistent", b"still here").unwrap();
        }

        {
            let store = BlobStore::open(&path).unwrap();
            assert_eq!(
                store.get("persistent").unwrap().as_deref(),
                Some(&b"still here"[..])
            );
        }
    }

    #[test]
    fn test_schema_matches_contract() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let store = BlobStore::open(&path).unwrap();
        store.set("k", &[1]).unwrap();

        let conn = Connection::open(&path).unwrap();
        let payload: Vec<u8> = conn
            .query_row(
                "SELECT DataBytes FROM Blobs WHERE DataName = 'k'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(payload, vec![1]);

        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");

        // NOT NULL on the payload column
        assert!(conn
            .execute("INSERT INTO Blobs (DataName, DataBytes) VALUES ('n', NULL)", [])
            .is_err());
    }

    #[test]
    fn test_rejects_foreign_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE Blobs (id INTEGER PRIMARY KEY, body TEXT)")
                .unwrap();
        }

        assert!(matches!(BlobStore::open(&path), Err(Error::Schema(_))));
    }

    #[test]
    fn test_rejects_non_database_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.db");
        std::fs::write(&path, vec![0xabu8; 4096]).unwrap();

        assert!(matches!(BlobStore::open(&path), Err(Error::Sqlite(_))));
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no").join("such").join("dir.db");
        assert!(BlobStore::open(&path).is_err());
    }

    #[test]
    fn test_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let config = StoreConfig {
            journal_mode: JournalMode::Delete,
            synchronous: SyncMode::Full,
            busy_timeout_ms: 100,
        };

        let store = BlobStore::open_with_config(&path, config.clone()).unwrap();
        assert_eq!(store.config(), &config);
        store.set("k", &[9]).unwrap();
        drop(store);

        let conn = Connection::open(&path).unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "delete");
    }

    #[test]
    fn test_memory_journal_applies_to_every_operation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let config = StoreConfig {
            journal_mode: JournalMode::Memory,
            ..StoreConfig::default()
        };
        let store = BlobStore::open_with_config(&path, config).unwrap();

        let conn = store.gate.lock().connect(store.path(), store.config()).unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "memory");
        drop(conn);

        let seen = store
            .with_connection("check", |conn| {
                Ok(conn.query_row("PRAGMA journal_mode", [], |row| row.get::<_, String>(0))?)
            })
            .unwrap();
        assert_eq!(seen, "memory");

        assert!(store.set("k", &[1, 2]).unwrap());
        assert_eq!(store.get("k").unwrap(), Some(vec![1, 2]));
    }

    #[test]
    fn test_blob_records() {
        let dir = tempdir().unwrap();
        let store = BlobStore::open(dir.path().join("test.db")).unwrap();

        let blob = Blob::new("mesh", vec![4u8, 5, 6]);
        assert!(store.set_blob(&blob).unwrap());
        assert_eq!(store.get_blob("mesh").unwrap(), Some(blob));

        assert!(!store.set_blob(&Blob::new("mesh", Vec::<u8>::new())).unwrap());
        assert_eq!(store.get("mesh").unwrap(), Some(vec![4, 5, 6]));
    }

    #[test]
    fn test_operations_advance_sequence() {
        let dir = tempdir().unwrap();
        let store = BlobStore::open(dir.path().join("test.db")).unwrap();
        assert_eq!(store.gate.lock().seq, 0);

        store.set("k", &[1]).unwrap();
        store.get("k").unwrap();
        store.set("", &[1]).unwrap();
        assert_eq!(store.gate.lock().seq, 2);
    }

    #[test]
    fn test_encoded_values() {
        let dir = tempdir().unwrap();
        let store = BlobStore::open(dir.path().join("test.db")).unwrap();

        let samples = vec![0.5f64, 1.5, -2.25];
        assert!(store.put_value("samples", &samples).unwrap());
        assert!(store.put_value("label", "triangle").unwrap());

        let loaded: Vec<f64> = store.get_value("samples").unwrap().unwrap();
        assert_eq!(loaded, samples);
        let label: String = store.get_value("label").unwrap().unwrap();
        assert_eq!(label, "triangle");
        assert!(store.get_value::<i32>("missing").unwrap().is_none());

        // Wrong type: a 4-byte read leaves bytes behind.
        assert!(matches!(
            store.get_value::<i32>("samples"),
            Err(Error::TrailingBytes(_))
        ));
    }

    #[test]
    fn test_codec_payload_roundtrip() {
        let dir = tempdir().unwrap();
        let store = BlobStore::open(dir.path().join("test.db")).unwrap();

        let mut enc = Encoder::new();
        enc.write_i32(-17);
        enc.write_string("");
        enc.write_bool(true);
        store.set("record", &enc.finish()).unwrap();

        let mut dec = Decoder::new(store.get("record").unwrap().unwrap());
        assert_eq!(dec.read_i32().unwrap(), -17);
        assert_eq!(dec.read_string().unwrap(), "");
        assert!(dec.read_bool().unwrap());
        assert!(dec.is_at_end());
    }

    #[test]
    fn test_store_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BlobStore>();
    }
}
