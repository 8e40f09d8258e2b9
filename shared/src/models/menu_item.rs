//! Menu Item Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Menu item (dish) of a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub location_id: i64,
    pub category_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub is_available: bool,
    /// Image URL returned by the upload endpoint
    #[serde(default)]
    pub image: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MenuItemCreate {
    pub location_id: i64,
    pub category_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 1000000.0))]
    pub price: f64,
    pub is_available: Option<bool>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MenuItemUpdate {
    pub category_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 1000000.0))]
    pub price: Option<f64>,
    pub is_available: Option<bool>,
    pub image: Option<String>,
}
