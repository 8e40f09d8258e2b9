//! API routes
//!
//! # Structure
//!
//! - [`health`] - liveness and storage stats (public)
//! - [`auth`] - login, signup, current user
//! - [`users`] - user listing and approval
//! - [`upload`] - image upload and serving
//! - [`franchises`] / [`locations`] - tenant administration
//! - [`categories`] / [`menu_items`] / [`coupons`] / [`tables`] - catalog and floor
//! - [`orders`] - order commands and queries, receipt printing
//! - [`sync`] - reconnect catch-up and journal replay
//! - [`events`] - Server-Sent Events change feed
//! - [`reports`] - sales summary and CSV export
//! - [`admin`] - consistency check and repair

pub mod admin;
pub mod auth;
pub mod events;
pub mod health;
pub mod orders;
pub mod reports;
pub mod sync;
pub mod upload;
pub mod users;

// Tenant and catalog
pub mod categories;
pub mod coupons;
pub mod franchises;
pub mod locations;
pub mod menu_items;
pub mod tables;

use serde::Deserialize;

use crate::auth::{CurrentUser, LocationScope};
use crate::core::ServerState;
use crate::utils::AppResult;

/// `?location_id=` filter shared by list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    pub location_id: Option<i64>,
}

/// The caller's scope, narrowed to `location_id` when given
pub(crate) fn scope_for(
    state: &ServerState,
    user: &CurrentUser,
    location_id: Option<i64>,
) -> AppResult<LocationScope> {
    LocationScope::for_user(user, &state.db)?.narrow(location_id)
}
