// 🗄️ Persistence Gateway - typed records over a durable key-value store
//
// One row per entity key. A payload that fails to parse is reported as
// `LoadError::Corrupt` by `try_load`; `load_or` swallows only that case and
// hands back the caller's default. A store that cannot be read is an error.

use crate::error::{CorruptStorage, LoadError, StorageError};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

// ============================================================================
// KEYS
// ============================================================================

/// Stable identifiers, one per persisted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Transactions,
    Budgets,
    Categories,
    Currency,
    Theme,
    CalendarLimits,
}

impl StorageKey {
    pub const ALL: [StorageKey; 6] = [
        StorageKey::Transactions,
        StorageKey::Budgets,
        StorageKey::Categories,
        StorageKey::Currency,
        StorageKey::Theme,
        StorageKey::CalendarLimits,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Transactions => "transactions",
            StorageKey::Budgets => "budgets",
            StorageKey::Categories => "categories",
            StorageKey::Currency => "currency",
            StorageKey::Theme => "theme",
            StorageKey::CalendarLimits => "calendarLimits",
        }
    }
}

// ============================================================================
// RAW STORE
// ============================================================================

/// One write in a batch: `Some(value)` sets the key, `None` removes it.
pub type BatchEntry<'a> = (&'a str, Option<&'a str>);

/// Durable string-to-string store. Writes to one key never touch another.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Apply several writes. The default runs them in order and stops at the
    /// first failure; backends with transactions apply all or nothing.
    fn apply_batch(&mut self, entries: &[BatchEntry<'_>]) -> Result<(), StorageError> {
        for (key, value) in entries {
            match value {
                Some(value) => self.set(key, value)?,
                None => self.remove(key)?,
            }
        }
        Ok(())
    }
}

/// In-memory store, for tests and for embedding without a file.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// SQLite-backed store: a single `kv_store` table, WAL journal.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        debug!(path = %path.display(), "opening sqlite store");
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        setup_store(&conn)?;
        Ok(SqliteStore { conn })
    }

    /// Number of keys currently stored.
    pub fn key_count(&self) -> Result<i64, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))?;
        Ok(count)
    }
}

const UPSERT_SQL: &str = "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
     ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3";

const DELETE_SQL: &str = "DELETE FROM kv_store WHERE key = ?1";

fn setup_store(conn: &Connection) -> Result<(), StorageError> {
    // Crash recovery; in-memory databases silently keep "memory"
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn
            .execute(UPSERT_SQL, params![key, value, Utc::now().to_rfc3339()])?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.conn.execute(DELETE_SQL, params![key])?;
        Ok(())
    }

    /// All entries in one SQLite transaction; dropped uncommitted on error.
    fn apply_batch(&mut self, entries: &[BatchEntry<'_>]) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        let now = Utc::now().to_rfc3339();
        for (key, value) in entries {
            match value {
                Some(value) => tx.execute(UPSERT_SQL, params![*key, *value, now])?,
                None => tx.execute(DELETE_SQL, params![*key])?,
            };
        }
        tx.commit()?;
        Ok(())
    }
}

// ============================================================================
// TYPED GATEWAY
// ============================================================================

/// JSON-encoded typed access on top of a `KeyValueStore`.
pub struct Storage<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(store: S) -> Self {
        Storage { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Read and decode `key`.
    ///
    /// `Ok(None)` when the key is absent (or holds an empty string),
    /// `LoadError::Corrupt` when the payload does not parse as `T`,
    /// `LoadError::Backend` when the store itself failed.
    pub fn try_load<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>, LoadError> {
        let raw = self.store.get(key.as_str())?;

        match raw {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| {
                    CorruptStorage {
                        key: key.as_str().to_string(),
                        reason: e.to_string(),
                    }
                    .into()
                }),
        }
    }

    /// Read `key`, substituting `default` when it is absent or corrupt.
    /// Backend failures are returned so a caller never mistakes an
    /// unreadable store for an empty one.
    pub fn load_or<T: DeserializeOwned>(&self, key: StorageKey, default: T) -> Result<T, StorageError> {
        match self.try_load(key) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Ok(default),
            Err(LoadError::Corrupt(corrupt)) => {
                warn!(key = key.as_str(), reason = %corrupt.reason, "discarding corrupt payload, using default");
                Ok(default)
            }
            Err(LoadError::Backend(e)) => Err(e),
        }
    }

    pub fn save<T: Serialize + ?Sized>(&mut self, key: StorageKey, value: &T) -> Result<(), StorageError> {
        let json = encode(key, value)?;
        debug!(key = key.as_str(), bytes = json.len(), "saving");
        self.store.set(key.as_str(), &json)
    }

    pub fn remove(&mut self, key: StorageKey) -> Result<(), StorageError> {
        debug!(key = key.as_str(), "removing");
        self.store.remove(key.as_str())
    }

    /// Write every entry of `batch`, atomically on backends that support it.
    pub fn commit(&mut self, batch: WriteBatch) -> Result<(), StorageError> {
        if batch.is_empty() {
            return Ok(());
        }
        let entries: Vec<BatchEntry<'_>> = batch
            .entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
            .collect();
        debug!(keys = entries.len(), "committing batch");
        self.store.apply_batch(&entries)
    }
}

fn encode<T: Serialize + ?Sized>(key: StorageKey, value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.as_str().to_string(),
        source,
    })
}

/// Typed writes collected for `Storage::commit`, applied in insertion order.
#[derive(Debug, Default)]
pub struct WriteBatch {
    entries: Vec<(StorageKey, Option<String>)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save<T: Serialize + ?Sized>(mut self, key: StorageKey, value: &T) -> Result<Self, StorageError> {
        let json = encode(key, value)?;
        self.entries.push((key, Some(json)));
        Ok(self)
    }

    pub fn remove(mut self, key: StorageKey) -> Self {
        self.entries.push((key, None));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CalendarLimits, Theme, Transaction, TransactionType};
    use crate::registry::BudgetMap;
    use chrono::TimeZone;

    fn memory() -> Storage<MemoryStore> {
        Storage::new(MemoryStore::new())
    }

    #[test]
    fn test_round_trip_every_entity_shape() {
        let mut storage = memory();

        let transactions = vec![Transaction {
            id: 1_700_000_000_000,
            description: "Groceries \"weekly\"".to_string(),
            amount: 84.25,
            category: "Food".to_string(),
            kind: TransactionType::Expense,
            date: Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
        }];
        let mut budgets = BudgetMap::new();
        budgets.insert("Rent", 1200.0);
        budgets.insert("Food", 500.0);
        let categories = vec!["Food".to_string(), "Rent".to_string()];
        let limits = CalendarLimits { low: 200.0, medium: 900.0 };

        storage.save(StorageKey::Transactions, &transactions).unwrap();
        storage.save(StorageKey::Budgets, &budgets).unwrap();
        storage.save(StorageKey::Categories, &categories).unwrap();
        storage.save(StorageKey::Currency, "$").unwrap();
        storage.save(StorageKey::Theme, &Theme::Dark).unwrap();
        storage.save(StorageKey::CalendarLimits, &limits).unwrap();

        let loaded: Vec<Transaction> = storage.try_load(StorageKey::Transactions).unwrap().unwrap();
        assert_eq!(loaded, transactions);
        let loaded: BudgetMap = storage.try_load(StorageKey::Budgets).unwrap().unwrap();
        assert_eq!(loaded, budgets);
        let loaded: Vec<String> = storage.try_load(StorageKey::Categories).unwrap().unwrap();
        assert_eq!(loaded, categories);
        let loaded: String = storage.try_load(StorageKey::Currency).unwrap().unwrap();
        assert_eq!(loaded, "$");
        let loaded: Theme = storage.try_load(StorageKey::Theme).unwrap().unwrap();
        assert_eq!(loaded, Theme::Dark);
        let loaded: CalendarLimits = storage.try_load(StorageKey::CalendarLimits).unwrap().unwrap();
        assert_eq!(loaded, limits);
    }

    #[test]
    fn test_missing_key_is_none() {
        let storage = memory();
        let loaded: Option<Vec<String>> = storage.try_load(StorageKey::Categories).unwrap();
        assert!(loaded.is_none());
        assert_eq!(storage.load_or(StorageKey::Currency, "€".to_string()).unwrap(), "€");
    }

    #[test]
    fn test_corrupt_payload_falls_back_to_default() {
        let mut store = MemoryStore::new();
        store.set("calendarLimits", "{low: oops").unwrap();
        store.set("theme", "\"purple\"").unwrap();
        let storage = Storage::new(store);

        let err = storage
            .try_load::<CalendarLimits>(StorageKey::CalendarLimits)
            .unwrap_err();
        match err {
            LoadError::Corrupt(corrupt) => assert_eq!(corrupt.key, "calendarLimits"),
            other => panic!("expected corrupt payload, got {:?}", other),
        }

        let limits = storage
            .load_or(StorageKey::CalendarLimits, CalendarLimits::default())
            .unwrap();
        assert_eq!(limits, CalendarLimits::default());

        // Valid JSON with the wrong shape is corrupt too
        assert_eq!(storage.load_or(StorageKey::Theme, Theme::Light).unwrap(), Theme::Light);
    }

    #[test]
    fn test_empty_payload_is_absent() {
        let mut store = MemoryStore::new();
        store.set("categories", "").unwrap();
        let storage = Storage::new(store);

        let loaded: Option<Vec<String>> = storage.try_load(StorageKey::Categories).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_remove_only_touches_its_key() {
        let mut storage = memory();
        storage.save(StorageKey::Currency, "$").unwrap();
        storage.save(StorageKey::Theme, &Theme::Dark).unwrap();

        storage.remove(StorageKey::Currency).unwrap();

        assert!(storage.try_load::<String>(StorageKey::Currency).unwrap().is_none());
        assert_eq!(storage.store().len(), 1);
    }

    #[test]
    fn test_sqlite_upsert_and_remove() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        store.set("currency", "\"$\"").unwrap();
        store.set("currency", "\"€\"").unwrap();
        assert_eq!(store.get("currency").unwrap().as_deref(), Some("\"€\""));
        assert_eq!(store.key_count().unwrap(), 1);

        store.remove("currency").unwrap();
        assert_eq!(store.get("currency").unwrap(), None);
        assert_eq!(store.key_count().unwrap(), 0);
    }

    #[test]
    fn test_sqlite_file_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tracker.db");

        {
            let mut storage = Storage::new(SqliteStore::open(&path).unwrap());
            storage
                .save(StorageKey::Categories, &vec!["Food".to_string()])
                .unwrap();
        }

        let storage = Storage::new(SqliteStore::open(&path).unwrap());
        let loaded: Vec<String> = storage.try_load(StorageKey::Categories).unwrap().unwrap();
        assert_eq!(loaded, vec!["Food".to_string()]);
    }

    struct UnreadableStore;

    impl KeyValueStore for UnreadableStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "database is locked",
            )))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Ok(())
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_backend_read_failure_is_not_corruption() {
        let storage = Storage::new(UnreadableStore);

        let err = storage.try_load::<Vec<String>>(StorageKey::Categories).unwrap_err();
        assert!(matches!(err, LoadError::Backend(_)));

        // No silent default when the store cannot be read
        assert!(storage.load_or(StorageKey::Categories, Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_batch_applies_in_order() {
        let mut storage = memory();
        storage.save(StorageKey::Currency, "$").unwrap();

        let batch = WriteBatch::new()
            .save(StorageKey::Theme, &Theme::Dark)
            .unwrap()
            .remove(StorageKey::Currency);
        assert_eq!(batch.len(), 2);
        storage.commit(batch).unwrap();

        assert_eq!(storage.try_load::<Theme>(StorageKey::Theme).unwrap(), Some(Theme::Dark));
        assert!(storage.try_load::<String>(StorageKey::Currency).unwrap().is_none());
    }

    /// SQLite store whose deletes of `key` abort, via a trigger.
    fn sqlite_refusing_delete_of(key: &str) -> SqliteStore {
        let conn = Connection::open_in_memory().unwrap();
        setup_store(&conn).unwrap();
        conn.execute_batch(&format!(
            "CREATE TRIGGER refuse_delete BEFORE DELETE ON kv_store
             WHEN OLD.key = '{}'
             BEGIN SELECT RAISE(ABORT, 'database is locked'); END;",
            key
        ))
        .unwrap();
        SqliteStore::from_connection(conn).unwrap()
    }

    #[test]
    fn test_sqlite_batch_is_all_or_nothing() {
        let mut storage = Storage::new(sqlite_refusing_delete_of("transactions"));
        storage.save(StorageKey::Transactions, &Vec::<Transaction>::new()).unwrap();
        storage.save(StorageKey::Currency, "$").unwrap();

        let batch = WriteBatch::new()
            .save(StorageKey::Currency, "€")
            .unwrap()
            .remove(StorageKey::Budgets)
            .remove(StorageKey::Transactions);
        assert!(storage.commit(batch).is_err());

        // The earlier write in the batch was rolled back
        assert_eq!(storage.try_load::<String>(StorageKey::Currency).unwrap().as_deref(), Some("$"));
        assert_eq!(storage.store().key_count().unwrap(), 2);
    }

    #[test]
    fn test_key_names_are_stable() {
        let names: Vec<&str> = StorageKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            vec!["transactions", "budgets", "categories", "currency", "theme", "calendarLimits"]
        );
    }
}
