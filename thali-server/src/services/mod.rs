//! Service layer
//!
//! - [`IdentityService`] - sign-in, sign-up, approval, bootstrap admin
//! - [`ImageStore`] - menu image upload and lookup

pub mod identity;
pub mod image_store;

pub use identity::IdentityService;
pub use image_store::{ImageStore, StoredImage};
