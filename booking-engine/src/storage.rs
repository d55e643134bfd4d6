//! Local persistence port and its redb adapter
//!
//! # Keys
//!
//! | Key | Value | Written |
//! |-----|-------|---------|
//! | `restaurant-booking-state` | `{ booking, cart, restaurant }` | after every applied command |
//! | `tablesStateV1` | `{ tables: TableLayout[] }` | on layout changes (debounced) |
//! | `booking_people_selections` | `[{ id, foodSelections }]` | on every pre-order change |
//!
//! Reads never fail: a missing key or JSON that no longer parses falls
//! back to the default state with a warning. Writes are best-effort; the
//! callers log failures and keep going.

use crate::workflow::BookingState;
use redb::{Database, ReadableDatabase, TableDefinition};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared::models::{OrderHistoryEntry, OrderLine, PersonSelections, TableLayout};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Single key-value table: key = storage key, value = JSON bytes
const KV_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

pub const SESSION_KEY: &str = "restaurant-booking-state";
pub const TABLES_KEY: &str = "tablesStateV1";
pub const PEOPLE_SELECTIONS_KEY: &str = "booking_people_selections";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for shared::AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Serialization(e) => {
                shared::AppError::with_message(shared::ErrorCode::StorageCorrupted, e.to_string())
            }
            other => shared::AppError::storage(other.to_string()),
        }
    }
}

/// Persistence port
///
/// Implemented by [`RedbStore`]; anything that can read and write bytes by
/// key can stand in for it.
pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;
    fn write(&self, key: &str, value: &[u8]) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Key-value store backed by redb
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests, throwaway sessions)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(KV_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }
}

impl KeyValueStore for RedbStore {
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KV_TABLE)?;
        Ok(table.get(key)?.map(|guard| guard.value().to_vec()))
    }

    fn write(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(KV_TABLE)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(KV_TABLE)?;
            table.remove(key)?;
        }
        txn.commit()?;
        Ok(())
    }
}

// ========== Persisted layouts ==========

/// Booking sub-state plus the order history, stored side by side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSnapshot {
    #[serde(flatten)]
    pub state: BookingState,
    #[serde(default)]
    pub order_history: Vec<OrderHistoryEntry>,
}

/// Shared cart sub-state (pre-order lines are stored under their own key)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    #[serde(default)]
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantState {
    #[serde(default)]
    pub selected_table: Option<String>,
    #[serde(default)]
    pub active_category: Option<String>,
}

/// Full session snapshot (`restaurant-booking-state`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub booking: BookingSnapshot,
    #[serde(default)]
    pub cart: CartState,
    #[serde(default)]
    pub restaurant: RestaurantState,
}

#[derive(Serialize)]
struct TablesOut<'a> {
    tables: &'a [TableLayout],
}

/// Older writers stored the bare array
#[derive(Deserialize)]
#[serde(untagged)]
enum TablesIn {
    Wrapped { tables: Vec<TableLayout> },
    Bare(Vec<TableLayout>),
}

/// Typed access to the three storage keys
#[derive(Clone)]
pub struct SessionPersistence {
    store: Arc<dyn KeyValueStore>,
}

impl SessionPersistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read and decode a key; `None` when missing, unreadable or corrupt
    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.store.read(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read from local storage");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Stored state is corrupt, falling back to defaults");
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let bytes = serde_json::to_vec(value)?;
        self.store.write(key, &bytes)
    }

    pub fn load_session(&self) -> Option<SessionSnapshot> {
        self.read_json(SESSION_KEY)
    }

    pub fn save_session(&self, snapshot: &SessionSnapshot) -> StorageResult<()> {
        self.write_json(SESSION_KEY, snapshot)
    }

    /// Stored layout records; `None` when nothing usable is stored
    pub fn load_tables(&self) -> Option<Vec<TableLayout>> {
        self.read_json::<TablesIn>(TABLES_KEY).map(|t| match t {
            TablesIn::Wrapped { tables } => tables,
            TablesIn::Bare(tables) => tables,
        })
    }

    pub fn save_tables(&self, tables: &[TableLayout]) -> StorageResult<()> {
        self.write_json(TABLES_KEY, &TablesOut { tables })
    }

    pub fn load_person_selections(&self) -> Vec<PersonSelections> {
        self.read_json(PEOPLE_SELECTIONS_KEY).unwrap_or_default()
    }

    pub fn save_person_selections(&self, selections: &[PersonSelections]) -> StorageResult<()> {
        self.write_json(PEOPLE_SELECTIONS_KEY, selections)
    }

    /// Remove all three keys
    pub fn clear(&self) -> StorageResult<()> {
        for key in [SESSION_KEY, TABLES_KEY, PEOPLE_SELECTIONS_KEY] {
            self.store.remove(key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{FoodRef, FoodSelection, Position};

    fn persistence() -> (RedbStore, SessionPersistence) {
        let store = RedbStore::open_in_memory().unwrap();
        let persistence = SessionPersistence::new(Arc::new(store.clone()));
        (store, persistence)
    }

    #[test]
    fn test_read_write_remove() {
        let store = RedbStore::open_in_memory().unwrap();
        assert!(store.read("k").unwrap().is_none());
        store.write("k", b"v1").unwrap();
        store.write("k", b"v2").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some(&b"v2"[..]));
        store.remove("k").unwrap();
        assert!(store.read("k").unwrap().is_none());
    }

    #[test]
    fn test_missing_keys_fall_back() {
        let (_, p) = persistence();
        assert!(p.load_session().is_none());
        assert!(p.load_tables().is_none());
        assert!(p.load_person_selections().is_empty());
    }

    #[test]
    fn test_corrupt_json_falls_back() {
        let (store, p) = persistence();
        store.write(SESSION_KEY, b"{not json").unwrap();
        store.write(PEOPLE_SELECTIONS_KEY, b"{\"id\":1}").unwrap();
        store.write(TABLES_KEY, b"42").unwrap();

        assert!(p.load_session().is_none());
        assert!(p.load_person_selections().is_empty());
        assert!(p.load_tables().is_none());
    }

    #[test]
    fn test_session_snapshot_round_trip() {
        let (_, p) = persistence();
        let mut snapshot = SessionSnapshot::default();
        snapshot.restaurant.selected_table = Some("3".to_string());
        p.save_session(&snapshot).unwrap();

        let loaded = p.load_session().unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_partial_session_uses_defaults() {
        let (store, p) = persistence();
        store
            .write(SESSION_KEY, br#"{"booking":{"bookingStep":"seat-selection"}}"#)
            .unwrap();

        let loaded = p.load_session().unwrap();
        assert_eq!(
            loaded.booking.state.booking_step,
            shared::models::BookingStep::SeatSelection
        );
        assert_eq!(loaded.booking.state.tables.len(), 7);
        assert!(loaded.cart.items.is_empty());
    }

    #[test]
    fn test_tables_wrapped_and_bare() {
        let (store, p) = persistence();
        let layout = TableLayout::new("t1", 1, Position::new(40.0, 40.0));
        p.save_tables(std::slice::from_ref(&layout)).unwrap();

        let raw = store.read(TABLES_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert!(json["tables"].is_array());
        assert_eq!(p.load_tables().unwrap(), vec![layout.clone()]);

        let bare = serde_json::to_vec(&vec![layout.clone()]).unwrap();
        store.write(TABLES_KEY, &bare).unwrap();
        assert_eq!(p.load_tables().unwrap(), vec![layout]);
    }

    #[test]
    fn test_person_selections_layout() {
        let (store, p) = persistence();
        let records = vec![PersonSelections {
            id: "person-1".to_string(),
            food_selections: vec![FoodSelection {
                food: FoodRef::new("1", "Caesar Salad", 12.99),
                quantity: 2,
            }],
        }];
        p.save_person_selections(&records).unwrap();

        let raw = store.read(PEOPLE_SELECTIONS_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(json[0]["foodSelections"][0]["quantity"], 2);
        assert_eq!(p.load_person_selections(), records);
    }

    #[test]
    fn test_clear_removes_every_key() {
        let (_, p) = persistence();
        p.save_session(&SessionSnapshot::default()).unwrap();
        p.save_person_selections(&[]).unwrap();
        p.clear().unwrap();
        assert!(p.load_session().is_none());
    }

    #[test]
    fn test_file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("booking.redb");
        {
            let store = RedbStore::open(&path).unwrap();
            store.write("k", b"persisted").unwrap();
        }
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some(&b"persisted"[..]));
    }
}
