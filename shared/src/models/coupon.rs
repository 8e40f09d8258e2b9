//! Dish Coupon Model
//!
//! A dish coupon takes a percentage off one unit of a specific menu item.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishCoupon {
    pub id: i64,
    pub location_id: i64,
    /// Code typed at the counter, matched case-insensitively
    pub code: String,
    pub menu_item_id: i64,
    pub percentage: f64,
    pub is_active: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DishCouponCreate {
    pub location_id: i64,
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    pub menu_item_id: i64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DishCouponUpdate {
    #[validate(range(min = 0.0, max = 100.0))]
    pub percentage: Option<f64>,
    pub is_active: Option<bool>,
}
