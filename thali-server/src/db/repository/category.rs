//! Category Repository

use super::{RepoError, RepoResult};
use crate::db::collection::{get_in, list_in, put_in, remove_in};
use crate::db::DbService;
use shared::error::ErrorCode;
use shared::models::{Category, CategoryCreate, CategoryUpdate, Location, MenuItem};
use shared::util::snowflake_id;

#[derive(Clone)]
pub struct CategoryRepository {
    db: DbService,
}

impl CategoryRepository {
    pub fn new(db: DbService) -> Self {
        Self { db }
    }

    /// Categories of a location ordered by `sort_order`, then name
    pub fn find_by_location(&self, location_id: i64) -> RepoResult<Vec<Category>> {
        let mut found = self.db.find::<Category>(|c| c.location_id == location_id)?;
        found.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.name.cmp(&b.name)));
        Ok(found)
    }

    pub fn find_by_id(&self, id: i64) -> RepoResult<Option<Category>> {
        self.db.get(id)
    }

    pub fn create(&self, data: CategoryCreate) -> RepoResult<Category> {
        let name = data.name.trim().to_string();
        self.db.write(|txn| {
            if get_in::<Location>(txn, data.location_id)?.is_none() {
                return Err(RepoError::Rejected(
                    ErrorCode::LocationNotFound,
                    format!("Location {} not found", data.location_id),
                ));
            }
            let siblings: Vec<Category> = list_in(txn)?;
            if siblings
                .iter()
                .any(|c| c.location_id == data.location_id && c.name.eq_ignore_ascii_case(&name))
            {
                return Err(RepoError::Rejected(
                    ErrorCode::CategoryNameExists,
                    format!("Category '{}' already exists", name),
                ));
            }
            let category = Category {
                id: snowflake_id(),
                location_id: data.location_id,
                name,
                sort_order: data.sort_order.unwrap_or(0),
                is_active: true,
            };
            put_in(txn, &category)?;
            Ok(category)
        })
    }

    pub fn update(&self, id: i64, data: CategoryUpdate) -> RepoResult<Category> {
        self.db.write(|txn| {
            let mut category: Category = get_in(txn, id)?
                .ok_or_else(|| RepoError::NotFound(format!("category {}", id)))?;
            if let Some(name) = data.name {
                let name = name.trim().to_string();
                let siblings: Vec<Category> = list_in(txn)?;
                if siblings.iter().any(|c| {
                    c.id != id
                        && c.location_id == category.location_id
                        && c.name.eq_ignore_ascii_case(&name)
                }) {
                    return Err(RepoError::Rejected(
                        ErrorCode::CategoryNameExists,
                        format!("Category '{}' already exists", name),
                    ));
                }
                category.name = name;
            }
            if let Some(order) = data.sort_order {
                category.sort_order = order;
            }
            if let Some(active) = data.is_active {
                category.is_active = active;
            }
            put_in(txn, &category)?;
            Ok(category)
        })
    }

    /// Hard delete; refused while menu items still reference the category
    pub fn delete(&self, id: i64) -> RepoResult<bool> {
        self.db.write(|txn| {
            let items: Vec<MenuItem> = list_in(txn)?;
            let in_use = items.iter().filter(|i| i.category_id == id).count();
            if in_use > 0 {
                return Err(RepoError::Rejected(
                    ErrorCode::CategoryHasItems,
                    format!("Category {} still has {} menu items", id, in_use),
                ));
            }
            remove_in::<Category>(txn, id)
        })
    }
}
