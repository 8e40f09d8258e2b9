//! Thali Server - restaurant point-of-sale backend
//!
//! # Overview
//!
//! - **Orders** (`orders`): event-sourced order engine on redb; table
//!   occupancy, manager hand-over and settlement commit in one transaction
//! - **Database** (`db`): embedded redb document collections for tenants,
//!   users, catalog and tables
//! - **Auth** (`auth`): Argon2 passwords, JWT bearer tokens, role
//!   capabilities and location scope
//! - **Messages** (`message`): in-process change feed served as SSE
//! - **HTTP API** (`api`): RESTful routes
//!
//! # Module layout
//!
//! ```text
//! thali-server/src/
//! ├── core/          # config, state, server, background tasks
//! ├── auth/          # JWT, middleware, scope
//! ├── services/      # identity, image store
//! ├── api/           # HTTP routes and handlers
//! ├── utils/         # errors, logging, business time
//! ├── db/            # document store and repositories
//! ├── message/       # change feed
//! ├── orders/        # order event sourcing
//! ├── printing/      # receipt layout and printer dispatch
//! └── reports/       # sales summary and CSV export
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod message;
pub mod orders;
pub mod printing;
pub mod reports;
pub mod services;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use message::{BusMessage, EventType};
pub use orders::{OrderStorage, OrdersManager};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Load `.env`, read the configuration and start logging
pub fn setup_environment() -> core::Result<Config> {
    // A missing .env is normal in production
    let _ = dotenv::dotenv();

    let config = Config::from_env()?;
    init_logger_with_file(
        &config.log_level,
        config.is_production(),
        config.log_dir.as_deref(),
    )?;
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
  _____ _           _ _
 |_   _| |__   __ _| (_)
   | | | '_ \ / _` | | |
   | | | | | | (_| | | |
   |_| |_| |_|\__,_|_|_|
        point of sale
    "#
    );
}
