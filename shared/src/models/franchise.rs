//! Franchise Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Franchise entity, the top-level tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Franchise {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create franchise payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FranchiseCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub owner_email: Option<String>,
}

/// Update franchise payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FranchiseUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub owner_email: Option<String>,
    pub is_active: Option<bool>,
}
