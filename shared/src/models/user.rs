//! User Model
//!
//! Users bind to a franchise (admins) or a location (managers, staff).
//! Login is gated by `is_approved && is_active`.

use super::role::Role;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User entity (never carries the password hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    #[serde(default)]
    pub franchise_id: Option<i64>,
    #[serde(default)]
    pub location_id: Option<i64>,
    pub is_approved: bool,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    pub fn can_login(&self) -> bool {
        self.is_approved && self.is_active
    }
}

/// Self-service sign-up; the account starts unapproved
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 200))]
    pub display_name: String,
    pub franchise_id: Option<i64>,
    pub location_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: i64,
    pub user: User,
    pub permissions: Vec<String>,
}

/// Approval / role assignment by an admin
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub franchise_id: Option<i64>,
    pub location_id: Option<i64>,
    pub is_approved: Option<bool>,
    pub is_active: Option<bool>,
}
