//! Identity service - sign-in, sign-up, approval and bootstrap
//!
//! Accounts created through sign-up are unapproved staff. An admin (or the
//! superadmin) approves them and may assign a role no higher than their own.

use std::sync::Arc;
use std::time::Duration;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{LoginRequest, LoginResponse, Role, SignupRequest, User, UserUpdate};
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{CurrentUser, JwtService, LocationScope};
use crate::core::config::BootstrapAdmin;
use crate::db::DbService;
use crate::db::repository::user::NewUser;
use crate::db::repository::{LocationRepository, UserRepository};
use crate::security_log;

/// Constant delay on failed sign-in, so timing does not reveal which emails exist
const AUTH_FAILURE_DELAY: Duration = Duration::from_millis(300);

#[derive(Clone)]
pub struct IdentityService {
    db: DbService,
    users: UserRepository,
    jwt: Arc<JwtService>,
}

impl IdentityService {
    pub fn new(db: DbService, jwt: Arc<JwtService>) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            db,
            jwt,
        }
    }

    pub async fn sign_in(&self, req: LoginRequest) -> AppResult<LoginResponse> {
        req.validate()?;

        let record = self.users.find_record_by_email(&req.email)?;
        let verified = match &record {
            Some(r) => verify_password(&req.password, &r.password_hash)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?,
            None => false,
        };

        let record = match record {
            Some(r) if verified => r,
            _ => {
                security_log!(WARN, "login_failed", email = %req.email);
                tokio::time::sleep(AUTH_FAILURE_DELAY).await;
                return Err(AppError::invalid_credentials());
            }
        };

        let user = record.user;
        if !user.is_active {
            security_log!(WARN, "login_blocked", user_id = user.id, reason = "inactive");
            return Err(AppError::new(ErrorCode::AccountDisabled));
        }
        if !user.is_approved {
            security_log!(INFO, "login_blocked", user_id = user.id, reason = "pending_approval");
            return Err(AppError::new(ErrorCode::AccountPendingApproval));
        }

        let (token, expires_at) = self.jwt.generate_token(&user)?;
        tracing::info!(user_id = user.id, role = %user.role, "User signed in");

        Ok(LoginResponse {
            token,
            expires_at,
            permissions: user.role.permissions(),
            user,
        })
    }

    /// Register an unapproved staff account
    pub fn sign_up(&self, req: SignupRequest) -> AppResult<User> {
        req.validate()?;

        if let Some(location_id) = req.location_id {
            let location = LocationRepository::new(self.db.clone())
                .find_by_id(location_id)?
                .ok_or_else(|| AppError::new(ErrorCode::LocationNotFound))?;
            if req.franchise_id.is_some_and(|f| f != location.franchise_id) {
                return Err(AppError::validation(
                    "Location does not belong to the given franchise",
                ));
            }
        }

        let password_hash = hash_password(&req.password)
            .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;

        let user = self.users.create(NewUser {
            email: req.email,
            display_name: req.display_name,
            password_hash,
            role: Role::Staff,
            franchise_id: req.franchise_id,
            location_id: req.location_id,
            is_approved: false,
        })?;
        security_log!(INFO, "user_signed_up", user_id = user.id);
        Ok(user)
    }

    /// Approve or update an account.
    ///
    /// The caller must outrank both the account's current role and any role
    /// being assigned, and must see the account's location.
    pub fn approve(&self, actor: &CurrentUser, user_id: i64, update: UserUpdate) -> AppResult<User> {
        actor.require(shared::models::Capability::UsersApprove)?;
        if actor.id == user_id {
            return Err(AppError::new(ErrorCode::CannotModifySelf));
        }

        let target = self
            .users
            .find_by_id(user_id)?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

        if !actor.role.outranks(target.role) {
            return Err(AppError::forbidden("Cannot modify a user of equal or higher role"));
        }
        if let Some(role) = update.role
            && !actor.role.outranks(role)
        {
            return Err(AppError::forbidden(format!("Cannot assign role {}", role)));
        }

        if actor.role != Role::Superadmin {
            let scope = LocationScope::for_user(actor, &self.db)?;
            let location_id = update.location_id.or(target.location_id);
            match location_id {
                Some(id) => scope.ensure(id)?,
                None => {
                    let franchise_id = update.franchise_id.or(target.franchise_id);
                    if franchise_id != actor.franchise_id {
                        return Err(AppError::out_of_scope("User"));
                    }
                }
            }
        }

        let user = self.users.update(user_id, update)?;
        security_log!(
            INFO,
            "user_updated",
            user_id = user.id,
            by = actor.id,
            approved = user.is_approved,
            active = user.is_active,
            role = %user.role
        );
        Ok(user)
    }

    /// Create the superadmin on an empty user table
    pub fn bootstrap(&self, admin: &BootstrapAdmin) -> AppResult<Option<User>> {
        if self.users.count()? > 0 {
            return Ok(None);
        }
        let password_hash = hash_password(&admin.password)
            .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;
        let user = self.users.create(NewUser {
            email: admin.email.clone(),
            display_name: "Administrator".into(),
            password_hash,
            role: Role::Superadmin,
            franchise_id: None,
            location_id: None,
            is_approved: true,
        })?;
        tracing::info!(email = %user.email, "Bootstrap superadmin created");
        Ok(Some(user))
    }
}
