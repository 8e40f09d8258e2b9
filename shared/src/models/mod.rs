//! Data models
//!
//! Shared between the server and clients (via API). All resource IDs are
//! snowflake `i64` values (see [`crate::util::snowflake_id`]).

pub mod category;
pub mod coupon;
pub mod dining_table;
pub mod franchise;
pub mod location;
pub mod menu_item;
pub mod role;
pub mod user;

// Re-exports
pub use category::*;
pub use coupon::*;
pub use dining_table::*;
pub use franchise::*;
pub use location::*;
pub use menu_item::*;
pub use role::*;
pub use user::*;
