//! Franchise Repository

use super::{RepoError, RepoResult};
use crate::db::DbService;
use shared::models::{Franchise, FranchiseCreate, FranchiseUpdate};
use shared::util::{now_millis, snowflake_id};

#[derive(Clone)]
pub struct FranchiseRepository {
    db: DbService,
}

impl FranchiseRepository {
    pub fn new(db: DbService) -> Self {
        Self { db }
    }

    pub fn find_all(&self) -> RepoResult<Vec<Franchise>> {
        let mut all = self.db.list::<Franchise>()?;
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    pub fn find_by_id(&self, id: i64) -> RepoResult<Option<Franchise>> {
        self.db.get(id)
    }

    pub fn create(&self, data: FranchiseCreate) -> RepoResult<Franchise> {
        let name = data.name.trim().to_string();
        if self
            .db
            .find::<Franchise>(|f| f.name.eq_ignore_ascii_case(&name))?
            .first()
            .is_some()
        {
            return Err(RepoError::Duplicate(format!("Franchise '{}' already exists", name)));
        }
        let now = now_millis();
        let franchise = Franchise {
            id: snowflake_id(),
            name,
            owner_email: data.owner_email,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.db.insert(&franchise)?;
        Ok(franchise)
    }

    pub fn update(&self, id: i64, data: FranchiseUpdate) -> RepoResult<Franchise> {
        self.db.modify::<Franchise>(id, |f| {
            if let Some(name) = data.name {
                f.name = name.trim().to_string();
            }
            if data.owner_email.is_some() {
                f.owner_email = data.owner_email;
            }
            if let Some(active) = data.is_active {
                f.is_active = active;
            }
            f.updated_at = now_millis();
            Ok(())
        })
    }

    /// Soft delete: the franchise is deactivated, its history stays
    pub fn delete(&self, id: i64) -> RepoResult<bool> {
        match self.db.modify::<Franchise>(id, |f| {
            f.is_active = false;
            f.updated_at = now_millis();
            Ok(())
        }) {
            Ok(_) => Ok(true),
            Err(RepoError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
