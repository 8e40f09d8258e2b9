//! Core - configuration, state, server and background tasks
//!
//! - [`Config`] - server configuration
//! - [`ServerState`] - shared service handles
//! - [`Server`] - HTTP server
//! - [`ServerError`] - startup/lifecycle errors
//! - [`BackgroundTasks`] - event router and reservation sweeper

pub mod config;
pub mod error;
pub mod event_router;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::{Server, build_app, build_router};
pub use state::ServerState;
pub use tasks::BackgroundTasks;
