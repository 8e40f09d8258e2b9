//! Category Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Menu category of a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub location_id: i64,
    pub name: String,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryCreate {
    pub location_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CategoryUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}
