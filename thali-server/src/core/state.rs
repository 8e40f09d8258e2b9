use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use shared::message::{BusMessage, SyncAction, SyncPayload};

use crate::auth::JwtService;
use crate::core::event_router::EventRouter;
use crate::core::tasks::{self, BackgroundTasks, TaskKind};
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::message::MessageBus;
use crate::orders::{OrdersManager, Reconciler, SyncService};
use crate::printing::PrintService;
use crate::services::{IdentityService, ImageStore};

/// Server state - shared handles to every service
///
/// Cloning is cheap; every field is a handle.
///
/// | Field | Purpose |
/// |-------|---------|
/// | config | immutable settings |
/// | db | redb collections (tenant, catalog, tables) |
/// | orders | order command engine on the same database |
/// | sync | reconnect catch-up and journal replay |
/// | reconciler | cross-record consistency check |
/// | message_bus | change feed |
/// | jwt_service | token issue/validation |
/// | identity | sign-in, sign-up, approval |
/// | images | uploaded menu images |
/// | printer | receipt printing |
/// | started_at | uptime reference |
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub db: DbService,
    pub orders: OrdersManager,
    pub sync: SyncService,
    pub reconciler: Reconciler,
    pub message_bus: MessageBus,
    pub jwt_service: Arc<JwtService>,
    pub identity: IdentityService,
    pub images: ImageStore,
    pub printer: PrintService,
    pub started_at: Instant,
}

impl ServerState {
    /// Open the database under `work_dir` and build every service.
    ///
    /// Creates the bootstrap superadmin when configured and no user exists,
    /// and logs (without repairing) any cross-record inconsistency.
    pub fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;
        let db = DbService::open(config.database_path())?;
        let state = Self::with_database(config.clone(), db)?;

        if let Some(admin) = &config.bootstrap_admin {
            state
                .identity
                .bootstrap(admin)
                .map_err(|e| ServerError::Bootstrap(e.to_string()))?;
        }

        let report = state.reconciler.scan()?;
        if !report.is_clean() {
            tracing::warn!(
                issues = report.issues.len(),
                "Order data inconsistencies found, run POST /api/admin/reconcile/repair"
            );
        }

        Ok(state)
    }

    /// Build the services on an already opened database
    pub fn with_database(config: Config, db: DbService) -> Result<Self> {
        let orders = OrdersManager::new(db.database(), config.business_tz)?;
        let sync = SyncService::new(orders.clone());
        let reconciler = Reconciler::new(orders.storage().clone());
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let identity = IdentityService::new(db.clone(), jwt_service.clone());
        let images = ImageStore::new(config.images_dir());
        let printer = PrintService::new(
            db.clone(),
            config.business_tz,
            Duration::from_millis(config.printer_timeout_ms),
        );

        Ok(Self {
            config: Arc::new(config),
            db,
            orders,
            sync,
            reconciler,
            message_bus: MessageBus::new(),
            jwt_service,
            identity,
            images,
            printer,
            started_at: Instant::now(),
        })
    }

    /// Start the event router and the reservation sweeper
    ///
    /// Must be called before `Server::run()` serves requests.
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();
        let shutdown = tasks.shutdown_token();

        let router = EventRouter::new(self.orders.clone(), self.message_bus.clone());
        let source = self.orders.subscribe();
        let token = shutdown.clone();
        tasks.spawn("event_router", TaskKind::Listener, async move {
            router.run(source, token).await;
        });

        tasks.spawn(
            "reservation_sweeper",
            TaskKind::Periodic,
            tasks::reservation_sweeper(
                self.db.clone(),
                self.message_bus.clone(),
                Duration::from_secs(self.config.reservation_sweep_secs.max(1)),
                shutdown,
            ),
        );

        tasks
    }

    /// Announce a catalog/tenant write on the change feed.
    ///
    /// `location_id` limits delivery to callers who can see that location;
    /// `None` goes to every subscriber.
    pub fn broadcast_sync<T: Serialize>(
        &self,
        resource: &str,
        action: SyncAction,
        id: i64,
        location_id: Option<i64>,
        data: Option<&T>,
    ) {
        let payload = SyncPayload {
            resource: resource.to_string(),
            action,
            id: id.to_string(),
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        };
        self.message_bus
            .publish(BusMessage::sync(location_id, &payload));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LocationScope;
    use crate::message::visible_to;

    #[tokio::test]
    async fn test_initialize_bootstraps_admin_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new(dir.path().to_string_lossy());
        config.bootstrap_admin = Some(crate::core::config::BootstrapAdmin {
            email: "root@example.com".into(),
            password: "bootstrap-secret".into(),
        });

        {
            let state = ServerState::initialize(&config).unwrap();
            assert!(config.database_path().exists());
            let users = crate::db::repository::UserRepository::new(state.db.clone());
            assert_eq!(users.count().unwrap(), 1);
        }

        // Reopen: still one user
        let state = ServerState::initialize(&config).unwrap();
        let users = crate::db::repository::UserRepository::new(state.db.clone());
        assert_eq!(users.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_sync_is_scoped() {
        let db = DbService::open_in_memory().unwrap();
        let state = ServerState::with_database(Config::new("/tmp/unused"), db).unwrap();
        let mut rx = state.message_bus.subscribe();

        state.broadcast_sync("categories", SyncAction::Created, 5, Some(10), Some(&"Starters"));
        let msg = rx.recv().await.unwrap();
        let payload: SyncPayload = msg.parse_payload().unwrap();
        assert_eq!(payload.resource, "categories");
        assert_eq!(payload.id, "5");
        assert!(visible_to(&msg, &LocationScope::Only(vec![10])));
        assert!(!visible_to(&msg, &LocationScope::Only(vec![20])));
    }
}
