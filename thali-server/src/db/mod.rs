//! Database Module
//!
//! One embedded redb file holds both the catalog/tenant collections and the
//! order event store. Sharing the file lets a single write transaction cover
//! an order, its tables and its pending record.
//!
//! | Collection | Key | Value |
//! |------------|-----|-------|
//! | `franchises` | id | `Franchise` |
//! | `locations` | id | `Location` |
//! | `users` | id | `UserRecord` (user + password hash) |
//! | `categories` | id | `Category` |
//! | `menu_items` | id | `MenuItem` |
//! | `coupons` | id | `DishCoupon` |
//! | `dining_tables` | id | `DiningTable` |

pub mod collection;
pub mod repository;

use redb::{Database, ReadableDatabase};
use std::path::Path;
use std::sync::Arc;

pub use collection::Document;
pub use repository::{RepoError, RepoResult};

/// Database service - owns the redb handle
#[derive(Clone)]
pub struct DbService {
    db: Arc<Database>,
}

impl std::fmt::Debug for DbService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbService").finish_non_exhaustive()
    }
}

impl DbService {
    /// Open or create the database file and ensure every collection exists
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        let db = Database::create(path.as_ref())?;
        let service = Self { db: Arc::new(db) };
        service.init_collections()?;
        tracing::info!(path = %path.as_ref().display(), "Database opened");
        Ok(service)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> RepoResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let service = Self { db: Arc::new(db) };
        service.init_collections()?;
        Ok(service)
    }

    fn init_collections(&self) -> RepoResult<()> {
        use collection::*;
        let txn = self.db.begin_write()?;
        {
            let _ = txn.open_table(FRANCHISES)?;
            let _ = txn.open_table(LOCATIONS)?;
            let _ = txn.open_table(USERS)?;
            let _ = txn.open_table(CATEGORIES)?;
            let _ = txn.open_table(MENU_ITEMS)?;
            let _ = txn.open_table(COUPONS)?;
            let _ = txn.open_table(DINING_TABLES)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Shared handle for the order store
    pub fn database(&self) -> Arc<Database> {
        self.db.clone()
    }

    // ========== Generic document access ==========

    pub fn get<T: Document>(&self, id: i64) -> RepoResult<Option<T>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(T::TABLE)?;
        collection::read_doc(&table, id)
    }

    pub fn list<T: Document>(&self) -> RepoResult<Vec<T>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(T::TABLE)?;
        collection::read_all(&table)
    }

    /// All documents matching `pred`
    pub fn find<T: Document>(&self, pred: impl Fn(&T) -> bool) -> RepoResult<Vec<T>> {
        Ok(self.list::<T>()?.into_iter().filter(|d| pred(d)).collect())
    }

    pub fn insert<T: Document>(&self, doc: &T) -> RepoResult<()> {
        let txn = self.db.begin_write()?;
        collection::put_in(&txn, doc)?;
        txn.commit()?;
        Ok(())
    }

    /// Read-modify-write one document in its own transaction.
    ///
    /// `f` may reject the change; nothing is written in that case.
    pub fn modify<T: Document>(
        &self,
        id: i64,
        f: impl FnOnce(&mut T) -> RepoResult<()>,
    ) -> RepoResult<T> {
        let txn = self.db.begin_write()?;
        let mut doc: T = collection::get_in(&txn, id)?
            .ok_or_else(|| RepoError::NotFound(format!("{} {}", T::NAME, id)))?;
        f(&mut doc)?;
        collection::put_in(&txn, &doc)?;
        txn.commit()?;
        Ok(doc)
    }

    pub fn remove<T: Document>(&self, id: i64) -> RepoResult<bool> {
        let txn = self.db.begin_write()?;
        let removed = collection::remove_in::<T>(&txn, id)?;
        txn.commit()?;
        Ok(removed)
    }

    /// Run `f` inside one write transaction; commits only on `Ok`
    pub fn write<R>(
        &self,
        f: impl FnOnce(&redb::WriteTransaction) -> RepoResult<R>,
    ) -> RepoResult<R> {
        let txn = self.db.begin_write()?;
        let result = f(&txn)?;
        txn.commit()?;
        Ok(result)
    }
}
