//! Typed document collections on redb
//!
//! Each collection is a `TableDefinition<i64, &[u8]>` keyed by snowflake id
//! with a JSON value. The `*_in` helpers work inside a caller's write
//! transaction so the order engine can update tables atomically with events.

use redb::{ReadableTable, TableDefinition, WriteTransaction};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{Category, DiningTable, DishCoupon, Franchise, Location, MenuItem};

use super::{RepoError, RepoResult};

pub const FRANCHISES: TableDefinition<i64, &[u8]> = TableDefinition::new("franchises");
pub const LOCATIONS: TableDefinition<i64, &[u8]> = TableDefinition::new("locations");
pub const USERS: TableDefinition<i64, &[u8]> = TableDefinition::new("users");
pub const CATEGORIES: TableDefinition<i64, &[u8]> = TableDefinition::new("categories");
pub const MENU_ITEMS: TableDefinition<i64, &[u8]> = TableDefinition::new("menu_items");
pub const COUPONS: TableDefinition<i64, &[u8]> = TableDefinition::new("coupons");
pub const DINING_TABLES: TableDefinition<i64, &[u8]> = TableDefinition::new("dining_tables");

/// A JSON document stored in one collection
pub trait Document: Serialize + DeserializeOwned {
    /// Human-readable resource name (logs, errors, change feed)
    const NAME: &'static str;
    const TABLE: TableDefinition<'static, i64, &'static [u8]>;

    fn id(&self) -> i64;
}

macro_rules! document {
    ($ty:ty, $name:literal, $table:expr) => {
        impl Document for $ty {
            const NAME: &'static str = $name;
            const TABLE: TableDefinition<'static, i64, &'static [u8]> = $table;

            fn id(&self) -> i64 {
                self.id
            }
        }
    };
}

document!(Franchise, "franchise", FRANCHISES);
document!(Location, "location", LOCATIONS);
document!(Category, "category", CATEGORIES);
document!(MenuItem, "menu_item", MENU_ITEMS);
document!(DishCoupon, "coupon", COUPONS);
document!(DiningTable, "dining_table", DINING_TABLES);

pub(crate) fn read_doc<T: Document>(
    table: &impl ReadableTable<i64, &'static [u8]>,
    id: i64,
) -> RepoResult<Option<T>> {
    match table.get(id)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

pub(crate) fn read_all<T: Document>(
    table: &impl ReadableTable<i64, &'static [u8]>,
) -> RepoResult<Vec<T>> {
    let mut docs = Vec::new();
    for result in table.iter()? {
        let (_key, value) = result?;
        docs.push(serde_json::from_slice(value.value())?);
    }
    Ok(docs)
}

/// Read a document within a write transaction
pub fn get_in<T: Document>(txn: &WriteTransaction, id: i64) -> RepoResult<Option<T>> {
    let table = txn.open_table(T::TABLE)?;
    read_doc(&table, id)
}

/// Read a document that must exist
pub fn require_in<T: Document>(txn: &WriteTransaction, id: i64) -> RepoResult<T> {
    get_in(txn, id)?.ok_or_else(|| RepoError::NotFound(format!("{} {}", T::NAME, id)))
}

pub fn list_in<T: Document>(txn: &WriteTransaction) -> RepoResult<Vec<T>> {
    let table = txn.open_table(T::TABLE)?;
    read_all(&table)
}

/// Insert or replace a document within a write transaction
pub fn put_in<T: Document>(txn: &WriteTransaction, doc: &T) -> RepoResult<()> {
    let mut table = txn.open_table(T::TABLE)?;
    let value = serde_json::to_vec(doc)?;
    table.insert(doc.id(), value.as_slice())?;
    Ok(())
}

pub fn remove_in<T: Document>(txn: &WriteTransaction, id: i64) -> RepoResult<bool> {
    let mut table = txn.open_table(T::TABLE)?;
    let removed = table.remove(id)?.is_some();
    Ok(removed)
}
