use std::path::PathBuf;

use chrono_tz::Tz;

use super::ServerError;
use crate::auth::{JwtConfig, generate_printable_secret};

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | ./work_dir | database, images and logs |
/// | HTTP_PORT | 3000 | HTTP listen port |
/// | ENVIRONMENT | development | development / staging / production |
/// | BUSINESS_TIMEZONE | Asia/Kolkata | order numbers and report dates |
/// | LOG_LEVEL | info | overridden by RUST_LOG |
/// | LOG_DIR | (console only) | daily rolling log files |
/// | RESERVATION_SWEEP_SECS | 60 | expired reservation sweep interval |
/// | PRINTER_TIMEOUT_MS | 5000 | receipt printer connect/write timeout |
/// | REQUEST_TIMEOUT_MS | 30000 | per-request timeout |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | graceful shutdown grace period |
/// | JWT_SECRET, JWT_EXPIRATION_MINUTES, JWT_ISSUER, JWT_AUDIENCE | | token settings |
/// | BOOTSTRAP_ADMIN_EMAIL, BOOTSTRAP_ADMIN_PASSWORD | | superadmin created on an empty database |
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub environment: String,
    pub business_tz: Tz,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub reservation_sweep_secs: u64,
    pub printer_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub shutdown_timeout_ms: u64,
    pub jwt: JwtConfig,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// First superadmin account
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Defaults for `work_dir`, with a random JWT secret
    pub fn new(work_dir: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port: 3000,
            environment: "development".into(),
            business_tz: chrono_tz::Asia::Kolkata,
            log_level: "info".into(),
            log_dir: None,
            reservation_sweep_secs: 60,
            printer_timeout_ms: 5000,
            request_timeout_ms: 30000,
            shutdown_timeout_ms: 10000,
            jwt: JwtConfig {
                secret: generate_printable_secret(),
                expiration_minutes: 720,
                issuer: "thali-server".into(),
                audience: "thali-clients".into(),
            },
            bootstrap_admin: None,
        }
    }

    /// Load from the environment (after `.env`, if present)
    pub fn from_env() -> Result<Self, ServerError> {
        let mut config = Self::new(
            std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into()),
        );
        config.http_port = env_or("HTTP_PORT", config.http_port);
        config.environment = std::env::var("ENVIRONMENT").unwrap_or(config.environment);

        if let Ok(tz) = std::env::var("BUSINESS_TIMEZONE") {
            config.business_tz = tz
                .parse()
                .map_err(|_| ServerError::Config(format!("Unknown BUSINESS_TIMEZONE: {}", tz)))?;
        }

        config.log_level = std::env::var("LOG_LEVEL").unwrap_or(config.log_level);
        config.log_dir = std::env::var("LOG_DIR").ok();
        config.reservation_sweep_secs =
            env_or("RESERVATION_SWEEP_SECS", config.reservation_sweep_secs);
        config.printer_timeout_ms = env_or("PRINTER_TIMEOUT_MS", config.printer_timeout_ms);
        config.request_timeout_ms = env_or("REQUEST_TIMEOUT_MS", config.request_timeout_ms);
        config.shutdown_timeout_ms = env_or("SHUTDOWN_TIMEOUT_MS", config.shutdown_timeout_ms);
        config.jwt = JwtConfig::from_env(config.is_production())
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config.bootstrap_admin = match (
            std::env::var("BOOTSTRAP_ADMIN_EMAIL"),
            std::env::var("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(BootstrapAdmin { email, password }),
            _ => None,
        };

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database").join("thali.redb")
    }

    pub fn images_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("images")
    }

    /// Create `database/` and `images/` under the work dir
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        let root = PathBuf::from(&self.work_dir);
        std::fs::create_dir_all(root.join("database"))?;
        std::fs::create_dir_all(self.images_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_and_structure() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path().to_string_lossy());
        config.ensure_work_dir_structure().unwrap();
        assert!(config.database_path().parent().unwrap().is_dir());
        assert!(config.images_dir().is_dir());
        assert_eq!(config.business_tz, chrono_tz::Asia::Kolkata);
        assert!(!config.is_production());
    }
}
