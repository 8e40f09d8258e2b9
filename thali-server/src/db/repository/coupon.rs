//! Dish Coupon Repository

use super::{RepoError, RepoResult};
use crate::db::collection::{get_in, list_in, put_in, remove_in};
use crate::db::DbService;
use shared::error::ErrorCode;
use shared::models::{DishCoupon, DishCouponCreate, DishCouponUpdate, MenuItem};
use shared::util::{now_millis, snowflake_id};

#[derive(Clone)]
pub struct CouponRepository {
    db: DbService,
}

impl CouponRepository {
    pub fn new(db: DbService) -> Self {
        Self { db }
    }

    pub fn find_by_location(&self, location_id: i64) -> RepoResult<Vec<DishCoupon>> {
        let mut found = self.db.find::<DishCoupon>(|c| c.location_id == location_id)?;
        found.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(found)
    }

    pub fn find_by_id(&self, id: i64) -> RepoResult<Option<DishCoupon>> {
        self.db.get(id)
    }

    pub fn create(&self, data: DishCouponCreate) -> RepoResult<DishCoupon> {
        check_percentage(data.percentage)?;
        let code = normalize_code(&data.code);
        self.db.write(|txn| {
            match get_in::<MenuItem>(txn, data.menu_item_id)? {
                Some(item) if item.location_id == data.location_id => {}
                _ => {
                    return Err(RepoError::Rejected(
                        ErrorCode::MenuItemNotFound,
                        format!("Menu item {} not found", data.menu_item_id),
                    ));
                }
            }
            if find_code_in(txn, data.location_id, &code)?.is_some() {
                return Err(RepoError::Duplicate(format!("Coupon code {} already exists", code)));
            }
            let coupon = DishCoupon {
                id: snowflake_id(),
                location_id: data.location_id,
                code,
                menu_item_id: data.menu_item_id,
                percentage: data.percentage,
                is_active: true,
                created_at: now_millis(),
            };
            put_in(txn, &coupon)?;
            Ok(coupon)
        })
    }

    pub fn update(&self, id: i64, data: DishCouponUpdate) -> RepoResult<DishCoupon> {
        if let Some(pct) = data.percentage {
            check_percentage(pct)?;
        }
        self.db.modify::<DishCoupon>(id, |c| {
            if let Some(pct) = data.percentage {
                c.percentage = pct;
            }
            if let Some(active) = data.is_active {
                c.is_active = active;
            }
            Ok(())
        })
    }

    pub fn delete(&self, id: i64) -> RepoResult<bool> {
        self.db.write(|txn| remove_in::<DishCoupon>(txn, id))
    }
}

/// Coupon codes compare upper-case and trimmed
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Look up a coupon by code inside a write transaction
pub fn find_code_in(
    txn: &redb::WriteTransaction,
    location_id: i64,
    code: &str,
) -> RepoResult<Option<DishCoupon>> {
    let code = normalize_code(code);
    let coupons: Vec<DishCoupon> = list_in(txn)?;
    Ok(coupons
        .into_iter()
        .find(|c| c.location_id == location_id && c.code == code))
}

fn check_percentage(pct: f64) -> RepoResult<()> {
    if !pct.is_finite() || pct <= 0.0 || pct > 100.0 {
        return Err(RepoError::Validation(format!(
            "Coupon percentage must be in (0, 100], got {}",
            pct
        )));
    }
    Ok(())
}
