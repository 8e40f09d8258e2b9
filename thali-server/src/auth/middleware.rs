//! Authentication middleware
//!
//! Axum middleware for JWT authentication and capability checks.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::models::Capability;

use crate::AppError;
use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// API routes reachable without a token
const PUBLIC_API_ROUTES: &[&str] = &["/api/auth/login", "/api/auth/signup", "/api/health"];

/// Require a valid bearer token.
///
/// On success the [`CurrentUser`] is inserted into the request extensions.
///
/// # Skipped
///
/// - `OPTIONS *` (CORS preflight)
/// - non-`/api/` paths (`/images/*`)
/// - [`PUBLIC_API_ROUTES`]
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS
        || !path.starts_with("/api/")
        || PUBLIC_API_ROUTES.contains(&path)
    {
        return Ok(next.run(req).await);
    }

    let user = authenticate(&state.jwt_service, req.headers(), req.uri())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Validate the `Authorization` header and build the caller
pub(crate) fn authenticate(
    jwt_service: &JwtService,
    headers: &http::HeaderMap,
    uri: &http::Uri,
) -> Result<CurrentUser, AppError> {
    let auth_header = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!(WARN, "auth_missing", uri = %uri);
            return Err(AppError::not_authenticated());
        }
    };

    let claims = jwt_service.validate_token(token).map_err(|e| {
        security_log!(WARN, "auth_failed", error = %e, uri = %uri);
        AppError::from(e)
    })?;

    CurrentUser::try_from(claims).map_err(AppError::from)
}

/// Require a capability of the authenticated caller
///
/// # Usage
///
/// ```ignore
/// use axum::middleware;
/// Router::new()
///     .route("/api/reports", get(handler::summary))
///     .layer(middleware::from_fn(require_capability(Capability::ReportsView)));
/// ```
pub fn require_capability(
    capability: Capability,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            req.current_user()?.require(capability)?;
            Ok(next.run(req).await)
        })
    }
}

/// Access the [`CurrentUser`] inserted by [`require_auth`]
pub trait CurrentUserExt {
    /// `NotAuthenticated` when the request passed no auth layer
    fn current_user(&self) -> Result<&CurrentUser, AppError>;
}

impl CurrentUserExt for Request {
    fn current_user(&self) -> Result<&CurrentUser, AppError> {
        self.extensions()
            .get::<CurrentUser>()
            .ok_or_else(AppError::not_authenticated)
    }
}
