//! JWT token service
//!
//! Tokens carry the user's role and tenant binding, so request handlers can
//! resolve capabilities and location scope without a database read.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::models::{Capability, Role, User, role_allows};
use thiserror::Error;

/// Minimum accepted secret length
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in minutes
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    /// Read `JWT_*` variables.
    ///
    /// A missing secret is replaced by a random one outside production, which
    /// invalidates every token on restart.
    pub fn from_env(production: bool) -> Result<Self, JwtError> {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if secret.len() < MIN_SECRET_LEN => {
                return Err(JwtError::ConfigError(format!(
                    "JWT_SECRET must be at least {MIN_SECRET_LEN} characters long"
                )));
            }
            Ok(secret) => secret,
            Err(_) if production => {
                return Err(JwtError::ConfigError(
                    "JWT_SECRET must be set in production".to_string(),
                ));
            }
            Err(_) => {
                tracing::warn!("JWT_SECRET not set, generating a temporary development key");
                generate_printable_secret()
            }
        };

        Ok(Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(720),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "thali-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "thali-clients".to_string()),
        })
    }
}

/// Random 64-character secret
pub fn generate_printable_secret() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
    let mut rng = rand::thread_rng();
    (0..64)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// Claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    #[serde(default)]
    pub franchise_id: Option<i64>,
    #[serde(default)]
    pub location_id: Option<i64>,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::ExpiredToken => AppError::token_expired(),
            JwtError::InvalidToken(_) | JwtError::InvalidSignature => {
                AppError::invalid_token("Invalid token")
            }
            JwtError::GenerationFailed(msg) | JwtError::ConfigError(msg) => AppError::internal(msg),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a token for `user`; returns the token and its expiry (Unix millis)
    pub fn generate_token(&self, user: &User) -> Result<(String, i64), JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
            franchise_id: user.franchise_id,
            location_id: user.location_id,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))?;
        Ok((token, expiration.timestamp_millis()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Token from an `Authorization: Bearer <token>` header
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// Caller identity, built from validated claims
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub franchise_id: Option<i64>,
    pub location_id: Option<i64>,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse()
            .map_err(|_| JwtError::InvalidToken(format!("bad subject: {}", claims.sub)))?;
        Ok(Self {
            id,
            email: claims.email,
            display_name: claims.display_name,
            role: claims.role,
            franchise_id: claims.franchise_id,
            location_id: claims.location_id,
        })
    }
}

impl CurrentUser {
    pub fn can(&self, capability: Capability) -> bool {
        role_allows(self.role, capability)
    }

    /// `PermissionDenied` unless the role grants `capability`
    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if self.can(capability) {
            return Ok(());
        }
        crate::security_log!(
            WARN,
            "permission_denied",
            user_id = self.id,
            role = %self.role,
            required = %capability
        );
        Err(AppError::forbidden(format!("Permission denied: {}", capability)))
    }
}
