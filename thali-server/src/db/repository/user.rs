//! User Repository
//!
//! Users are stored together with their argon2 password hash. The hash
//! never leaves this module's [`UserRecord`]; API responses carry
//! [`User`] only.

use redb::TableDefinition;
use serde::{Deserialize, Serialize};

use super::{RepoError, RepoResult};
use crate::db::collection::{Document, USERS};
use crate::db::DbService;
use shared::error::ErrorCode;
use shared::models::{Role, User, UserUpdate};
use shared::util::{now_millis, snowflake_id};

/// Stored user document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(flatten)]
    pub user: User,
    pub password_hash: String,
}

impl Document for UserRecord {
    const NAME: &'static str = "user";
    const TABLE: TableDefinition<'static, i64, &'static [u8]> = USERS;

    fn id(&self) -> i64 {
        self.user.id
    }
}

/// New account data after validation and hashing
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: Role,
    pub franchise_id: Option<i64>,
    pub location_id: Option<i64>,
    pub is_approved: bool,
}

#[derive(Clone)]
pub struct UserRepository {
    db: DbService,
}

impl UserRepository {
    pub fn new(db: DbService) -> Self {
        Self { db }
    }

    pub fn find_all(&self) -> RepoResult<Vec<User>> {
        let mut users: Vec<User> = self
            .db
            .list::<UserRecord>()?
            .into_iter()
            .map(|r| r.user)
            .collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    pub fn find_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        Ok(self.db.get::<UserRecord>(id)?.map(|r| r.user))
    }

    /// Case-insensitive lookup, including the password hash
    pub fn find_record_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>> {
        let email = email.trim();
        Ok(self
            .db
            .find::<UserRecord>(|r| r.user.email.eq_ignore_ascii_case(email))?
            .into_iter()
            .next())
    }

    pub fn count(&self) -> RepoResult<usize> {
        Ok(self.db.list::<UserRecord>()?.len())
    }

    pub fn create(&self, data: NewUser) -> RepoResult<User> {
        let email = data.email.trim().to_ascii_lowercase();
        self.db.write(|txn| {
            let existing: Vec<UserRecord> = crate::db::collection::list_in(txn)?;
            if existing
                .iter()
                .any(|r| r.user.email.eq_ignore_ascii_case(&email))
            {
                return Err(RepoError::Rejected(
                    ErrorCode::EmailAlreadyRegistered,
                    format!("Email {} is already registered", email),
                ));
            }
            let now = now_millis();
            let record = UserRecord {
                user: User {
                    id: snowflake_id(),
                    email,
                    display_name: data.display_name.trim().to_string(),
                    role: data.role,
                    franchise_id: data.franchise_id,
                    location_id: data.location_id,
                    is_approved: data.is_approved,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                },
                password_hash: data.password_hash,
            };
            crate::db::collection::put_in(txn, &record)?;
            Ok(record.user)
        })
    }

    pub fn update(&self, id: i64, data: UserUpdate) -> RepoResult<User> {
        let record = self.db.modify::<UserRecord>(id, |r| {
            let u = &mut r.user;
            if let Some(name) = data.display_name {
                u.display_name = name.trim().to_string();
            }
            if let Some(role) = data.role {
                u.role = role;
            }
            if data.franchise_id.is_some() {
                u.franchise_id = data.franchise_id;
            }
            if data.location_id.is_some() {
                u.location_id = data.location_id;
            }
            if let Some(approved) = data.is_approved {
                u.is_approved = approved;
            }
            if let Some(active) = data.is_active {
                u.is_active = active;
            }
            u.updated_at = now_millis();
            Ok(())
        })?;
        Ok(record.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            display_name: "Asha".into(),
            password_hash: "hash".into(),
            role: Role::Staff,
            franchise_id: Some(1),
            location_id: Some(2),
            is_approved: false,
        }
    }

    #[test]
    fn test_email_is_unique_case_insensitive() {
        let db = DbService::open_in_memory().unwrap();
        let repo = UserRepository::new(db);
        repo.create(new_user("asha@example.com")).unwrap();
        let dup = repo.create(new_user("ASHA@example.com"));
        assert!(matches!(
            dup,
            Err(RepoError::Rejected(ErrorCode::EmailAlreadyRegistered, _))
        ));
    }

    #[test]
    fn test_record_keeps_hash_and_flattened_user() {
        let db = DbService::open_in_memory().unwrap();
        let repo = UserRepository::new(db);
        let user = repo.create(new_user("Asha@Example.com")).unwrap();
        assert_eq!(user.email, "asha@example.com");

        let record = repo.find_record_by_email("asha@example.com").unwrap().unwrap();
        assert_eq!(record.password_hash, "hash");
        assert_eq!(record.user.id, user.id);

        let approved = repo
            .update(
                user.id,
                UserUpdate {
                    is_approved: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(approved.can_login());
    }
}
