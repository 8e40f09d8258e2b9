//! Authentication and authorization
//!
//! - [`JwtService`] - token issue and validation
//! - [`CurrentUser`] - caller identity, extracted from the bearer token
//! - [`LocationScope`] - the locations a caller may see
//! - [`require_auth`] / [`require_capability`] - axum middleware
//! - [`password`] - argon2 hashing

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod scope;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService, generate_printable_secret};
pub use middleware::{CurrentUserExt, require_auth, require_capability};
pub use scope::LocationScope;
