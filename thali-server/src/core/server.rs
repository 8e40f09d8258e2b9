//! Server Implementation
//!
//! HTTP server startup, router assembly and graceful shutdown

use std::net::SocketAddr;
use std::time::Duration;

use axum::{Router, middleware};
use http::StatusCode;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::{Config, Result, ServerState};

/// HTTP access log middleware
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let started = std::time::Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        target: "http_access",
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        request_id = request_id.as_deref().unwrap_or("-"),
    );

    response
}

/// Requests running longer than `timeout` are answered with 408
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        // Core APIs
        .merge(crate::api::health::router())
        .merge(crate::api::auth::router())
        .merge(crate::api::users::router())
        .merge(crate::api::upload::router())
        // Tenant
        .merge(crate::api::franchises::router())
        .merge(crate::api::locations::router())
        // Catalog and floor
        .merge(crate::api::categories::router())
        .merge(crate::api::menu_items::router())
        .merge(crate::api::coupons::router())
        .merge(crate::api::tables::router())
        // Orders
        .merge(crate::api::orders::router())
        .merge(crate::api::sync::router())
        .merge(crate::api::events::router())
        .merge(crate::api::reports::router())
        .merge(crate::api::admin::router())
}

/// Router with state, auth and the tower-http stack applied
pub fn build_router(state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    build_app()
        // require_auth skips public routes itself
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        // Outermost first: the request id exists before anything logs
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(log_request))
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive())
                .layer(timeout_layer(timeout)),
        )
}

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// Serve until Ctrl-C, then stop background tasks
    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config)?,
        };

        let tasks = state.start_background_tasks();
        let app = build_router(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(
            %addr,
            environment = %self.config.environment,
            timezone = %self.config.business_tz,
            "Thali server listening"
        );

        let shutdown = state.message_bus.shutdown_token().clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down..."),
                    _ = shutdown.cancelled() => {}
                }
            })
            .await?;

        // Ends open SSE streams too
        state.message_bus.shutdown();
        tasks
            .shutdown(Duration::from_millis(self.config.shutdown_timeout_ms))
            .await;
        tracing::info!("Server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::routing::get;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_slow_request_times_out_with_408() {
        let app = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "done"
                }),
            )
            .route("/fast", get(|| async { "done" }))
            .layer(timeout_layer(Duration::from_millis(20)));

        let slow = app
            .clone()
            .oneshot(http::Request::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(slow.status(), StatusCode::REQUEST_TIMEOUT);

        let fast = app
            .oneshot(http::Request::get("/fast").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(fast.status(), StatusCode::OK);
    }
}
