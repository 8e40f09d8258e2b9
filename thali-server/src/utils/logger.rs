//! Logging Infrastructure
//!
//! - Console output, pretty in development and JSON in production
//! - Daily rotating application log under `{log_dir}/app` (kept 14 days)
//! - Daily rotating security log under `{log_dir}/security` (never deleted)
//!
//! `RUST_LOG` overrides the configured level.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const APP_LOG_RETENTION_DAYS: i64 = 14;

/// Initialize the logging system
///
/// # Examples
/// ```no_run
/// // Development: console only
/// thali_server::init_logger_with_file("debug", false, None)?;
///
/// // Production: JSON console + files
/// thali_server::init_logger_with_file("info", true, Some("./work_dir/logs"))?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> std::io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let Some(dir) = log_dir else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();
        return Ok(());
    };

    let log_dir = Path::new(dir);
    let app_log_dir = log_dir.join("app");
    let security_log_dir = log_dir.join("security");
    fs::create_dir_all(&app_log_dir)?;
    fs::create_dir_all(&security_log_dir)?;

    let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
    let app_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_writer(std::sync::Mutex::new(app_log))
        .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target() != "security"
        }));

    let security_log = RollingFileAppender::new(Rotation::DAILY, security_log_dir, "security");
    let security_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_writer(std::sync::Mutex::new(security_log))
        .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target() == "security"
        }));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(app_layer)
        .with(security_layer)
        .init();

    tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));
    Ok(())
}

/// Console-only logging
pub fn init_logger(level: &str, json_format: bool) -> std::io::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Delete application logs older than the retention window.
///
/// Rolling files are named `app.YYYY-MM-DD`. Security logs are never touched.
pub fn cleanup_old_logs(log_dir: &Path, today: chrono::NaiveDate) -> std::io::Result<usize> {
    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(0);
    }
    let cutoff = today - chrono::Duration::days(APP_LOG_RETENTION_DAYS);

    let mut removed = 0;
    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(date) = name
            .strip_prefix("app.")
            .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            continue;
        };
        if date < cutoff {
            fs::remove_file(&path)?;
            removed += 1;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }
    Ok(removed)
}

async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;
        let today = chrono::Utc::now().date_naive();
        if let Err(e) = cleanup_old_logs(&log_dir, today) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

/// Security log helper - records authentication and authorization events
///
/// ```ignore
/// security_log!(WARN, "login_failed", email = %email, reason = "invalid_password");
/// security_log!(INFO, "user_approved", user_id = id, approved_by = admin_id);
/// ```
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(target: "security", event = $event, $($arg)*)
    };
    (ERROR, $event:expr, $($arg:tt)*) => {
        tracing::error!(target: "security", event = $event, $($arg)*)
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(target: "security", event = $event, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_removes_only_expired_app_logs() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app");
        let security = dir.path().join("security");
        fs::create_dir_all(&app).unwrap();
        fs::create_dir_all(&security).unwrap();
        fs::write(app.join("app.2026-01-01"), "old").unwrap();
        fs::write(app.join("app.2026-01-20"), "recent").unwrap();
        fs::write(app.join("notes.txt"), "keep").unwrap();
        fs::write(security.join("security.2025-01-01"), "keep").unwrap();

        let today = chrono::NaiveDate::from_ymd_opt(2026, 1, 25).unwrap();
        assert_eq!(cleanup_old_logs(dir.path(), today).unwrap(), 1);
        assert!(!app.join("app.2026-01-01").exists());
        assert!(app.join("app.2026-01-20").exists());
        assert!(app.join("notes.txt").exists());
        assert!(security.join("security.2025-01-01").exists());
    }

    #[test]
    fn test_cleanup_without_directory() {
        let dir = tempfile::tempdir().unwrap();
        let today = chrono::NaiveDate::from_ymd_opt(2026, 1, 25).unwrap();
        assert_eq!(cleanup_old_logs(dir.path(), today).unwrap(), 0);
    }
}
