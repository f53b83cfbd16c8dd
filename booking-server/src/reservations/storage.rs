//! redb-based storage layer for reservations
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `reservations` | `reservation_id` | `Reservation` | 预订记录 (JSON) |
//!
//! # Durability
//!
//! redb commits are persistent as soon as `commit()` returns (copy-on-write
//! with atomic pointer swap), so the database file is always in a consistent
//! state even across unexpected shutdowns.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::AppError;
use shared::models::Reservation;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for storing reservations: key = reservation_id, value = JSON-serialized Reservation
const RESERVATIONS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("reservations");

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

    #[error("Reservation not found: {0}")]
    ReservationNotFound(i64),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ReservationNotFound(id) => AppError::reservation_not_found(id),
            other => AppError::storage(other.to_string()),
        }
    }
}

/// Reservation storage backed by redb
#[derive(Clone)]
pub struct ReservationStorage {
    db: Arc<Database>,
}

impl ReservationStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        // Create the table if it doesn't exist
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(RESERVATIONS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Persist a new or updated reservation
    pub fn upsert(&self, reservation: &Reservation) -> StorageResult<()> {
        let bytes = serde_json::to_vec(reservation)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(RESERVATIONS_TABLE)?;
            table.insert(reservation.id, bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Load a single reservation by id
    pub fn get(&self, id: i64) -> StorageResult<Reservation> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RESERVATIONS_TABLE)?;
        let guard = table
            .get(id)?
            .ok_or(StorageError::ReservationNotFound(id))?;
        Ok(serde_json::from_slice(guard.value())?)
    }

    /// Load all reservations (startup recovery)
    pub fn load_all(&self) -> StorageResult<Vec<Reservation>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RESERVATIONS_TABLE)?;
        let mut reservations = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            reservations.push(serde_json::from_slice(value.value())?);
        }
        Ok(reservations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{CustomerRef, ReservationStatus};

    fn sample_reservation(id: i64) -> Reservation {
        Reservation {
            id,
            customer: CustomerRef::Manual {
                name: "Ana".to_string(),
                phone: "600111222".to_string(),
            },
            table_id: Some(3),
            start_at: 1_788_274_800_000,
            end_at: None,
            party_size: 4,
            status: ReservationStatus::Confirmed,
            notes: None,
            requested_at: 1_788_200_000_000,
        }
    }

    #[test]
    fn test_upsert_and_get() {
        let storage = ReservationStorage::open_in_memory().unwrap();
        let res = sample_reservation(1);
        storage.upsert(&res).unwrap();

        let loaded = storage.get(1).unwrap();
        assert_eq!(loaded.id, 1);
        assert_eq!(loaded.party_size, 4);
        assert_eq!(loaded.status, ReservationStatus::Confirmed);
    }

    #[test]
    fn test_get_missing_returns_not_found() {
        let storage = ReservationStorage::open_in_memory().unwrap();
        let err = storage.get(42).unwrap_err();
        assert!(matches!(err, StorageError::ReservationNotFound(42)));
    }

    #[test]
    fn test_upsert_overwrites() {
        let storage = ReservationStorage::open_in_memory().unwrap();
        let mut res = sample_reservation(7);
        storage.upsert(&res).unwrap();

        res.status = ReservationStatus::Cancelled;
        storage.upsert(&res).unwrap();

        let loaded = storage.get(7).unwrap();
        assert_eq!(loaded.status, ReservationStatus::Cancelled);
        assert_eq!(storage.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_reopen_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reservations.redb");

        {
            let storage = ReservationStorage::open(&path).unwrap();
            storage.upsert(&sample_reservation(1)).unwrap();
        }

        let reopened = ReservationStorage::open(&path).unwrap();
        assert_eq!(reopened.get(1).unwrap().id, 1);
    }

    #[test]
    fn test_load_all() {
        let storage = ReservationStorage::open_in_memory().unwrap();
        for id in 1..=3 {
            storage.upsert(&sample_reservation(id)).unwrap();
        }
        let all = storage.load_all().unwrap();
        assert_eq!(all.len(), 3);
    }
}
