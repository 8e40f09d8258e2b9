//! Menu Item Repository

use super::{RepoError, RepoResult};
use crate::db::collection::{get_in, put_in, remove_in};
use crate::db::DbService;
use shared::error::ErrorCode;
use shared::models::{Category, MenuItem, MenuItemCreate, MenuItemUpdate};
use shared::util::{now_millis, snowflake_id};

#[derive(Clone)]
pub struct MenuItemRepository {
    db: DbService,
}

impl MenuItemRepository {
    pub fn new(db: DbService) -> Self {
        Self { db }
    }

    pub fn find_by_location(&self, location_id: i64) -> RepoResult<Vec<MenuItem>> {
        let mut found = self.db.find::<MenuItem>(|m| m.location_id == location_id)?;
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    pub fn find_by_category(&self, category_id: i64) -> RepoResult<Vec<MenuItem>> {
        let mut found = self.db.find::<MenuItem>(|m| m.category_id == category_id)?;
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    pub fn find_by_id(&self, id: i64) -> RepoResult<Option<MenuItem>> {
        self.db.get(id)
    }

    pub fn create(&self, data: MenuItemCreate) -> RepoResult<MenuItem> {
        check_price(data.price)?;
        self.db.write(|txn| {
            require_category(txn, data.category_id, data.location_id)?;
            let now = now_millis();
            let item = MenuItem {
                id: snowflake_id(),
                location_id: data.location_id,
                category_id: data.category_id,
                name: data.name.trim().to_string(),
                description: data.description,
                price: data.price,
                is_available: data.is_available.unwrap_or(true),
                image: data.image,
                created_at: now,
                updated_at: now,
            };
            put_in(txn, &item)?;
            Ok(item)
        })
    }

    pub fn update(&self, id: i64, data: MenuItemUpdate) -> RepoResult<MenuItem> {
        if let Some(price) = data.price {
            check_price(price)?;
        }
        self.db.write(|txn| {
            let mut item: MenuItem = get_in(txn, id)?
                .ok_or_else(|| RepoError::NotFound(format!("menu_item {}", id)))?;
            if let Some(category_id) = data.category_id {
                require_category(txn, category_id, item.location_id)?;
                item.category_id = category_id;
            }
            if let Some(name) = data.name {
                item.name = name.trim().to_string();
            }
            if data.description.is_some() {
                item.description = data.description;
            }
            if let Some(price) = data.price {
                item.price = price;
            }
            if let Some(available) = data.is_available {
                item.is_available = available;
            }
            if data.image.is_some() {
                item.image = data.image;
            }
            item.updated_at = now_millis();
            put_in(txn, &item)?;
            Ok(item)
        })
    }

    pub fn delete(&self, id: i64) -> RepoResult<bool> {
        self.db.write(|txn| remove_in::<MenuItem>(txn, id))
    }
}

fn check_price(price: f64) -> RepoResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(RepoError::Rejected(
            ErrorCode::InvalidPrice,
            format!("Invalid price: {}", price),
        ));
    }
    Ok(())
}

fn require_category(
    txn: &redb::WriteTransaction,
    category_id: i64,
    location_id: i64,
) -> RepoResult<()> {
    match get_in::<Category>(txn, category_id)? {
        Some(c) if c.location_id == location_id => Ok(()),
        _ => Err(RepoError::Rejected(
            ErrorCode::CategoryNotFound,
            format!("Category {} not found at location {}", category_id, location_id),
        )),
    }
}
