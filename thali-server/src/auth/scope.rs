//! Tenant scope
//!
//! Superadmins see every location, admins the locations of their franchise,
//! managers and staff only their own location.

use shared::error::{AppError, AppResult};
use shared::models::{Location, Role};

use super::CurrentUser;
use crate::db::DbService;

/// Locations visible to a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationScope {
    All,
    Only(Vec<i64>),
}

impl LocationScope {
    pub fn allows(&self, location_id: i64) -> bool {
        match self {
            LocationScope::All => true,
            LocationScope::Only(ids) => ids.contains(&location_id),
        }
    }

    /// `OutsideTenantScope` unless `location_id` is visible
    pub fn ensure(&self, location_id: i64) -> AppResult<()> {
        if self.allows(location_id) {
            Ok(())
        } else {
            Err(AppError::out_of_scope(format!("Location {}", location_id)))
        }
    }

    /// Narrow to one location when the caller asked for it
    pub fn narrow(self, location_id: Option<i64>) -> AppResult<Self> {
        match location_id {
            Some(id) => {
                self.ensure(id)?;
                Ok(LocationScope::Only(vec![id]))
            }
            None => Ok(self),
        }
    }

    /// Resolve the caller's scope.
    ///
    /// Franchise membership is read from the database so newly added
    /// locations are visible without a new token.
    pub fn for_user(user: &CurrentUser, db: &DbService) -> AppResult<Self> {
        match user.role {
            Role::Superadmin => Ok(LocationScope::All),
            Role::Admin => {
                let Some(franchise_id) = user.franchise_id else {
                    return Ok(LocationScope::Only(vec![]));
                };
                let ids = db
                    .find::<Location>(|l| l.franchise_id == franchise_id)?
                    .into_iter()
                    .map(|l| l.id)
                    .collect();
                Ok(LocationScope::Only(ids))
            }
            Role::Manager | Role::Staff => {
                Ok(LocationScope::Only(user.location_id.into_iter().collect()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(id: i64, franchise_id: i64) -> Location {
        Location {
            id,
            franchise_id,
            name: format!("Outlet {id}"),
            address: None,
            order_prefix: format!("L{id}"),
            cgst_percent: 2.5,
            sgst_percent: 2.5,
            gstin: None,
            printer_ip: None,
            printer_port: 9100,
            receipt_header: vec![],
            receipt_footer: vec![],
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn user(role: Role, franchise_id: Option<i64>, location_id: Option<i64>) -> CurrentUser {
        CurrentUser {
            id: 1,
            email: "u@example.com".into(),
            display_name: "U".into(),
            role,
            franchise_id,
            location_id,
        }
    }

    #[test]
    fn test_scope_per_role() {
        let db = DbService::open_in_memory().unwrap();
        db.insert(&location(10, 1)).unwrap();
        db.insert(&location(11, 1)).unwrap();
        db.insert(&location(20, 2)).unwrap();

        let scope = LocationScope::for_user(&user(Role::Superadmin, None, None), &db).unwrap();
        assert_eq!(scope, LocationScope::All);

        let scope = LocationScope::for_user(&user(Role::Admin, Some(1), None), &db).unwrap();
        assert!(scope.allows(10) && scope.allows(11));
        assert!(!scope.allows(20));

        let scope = LocationScope::for_user(&user(Role::Staff, Some(1), Some(11)), &db).unwrap();
        assert_eq!(scope, LocationScope::Only(vec![11]));

        let scope = LocationScope::for_user(&user(Role::Manager, None, None), &db).unwrap();
        assert!(!scope.allows(10));
    }

    #[test]
    fn test_narrow() {
        let scope = LocationScope::Only(vec![10, 11]);
        assert_eq!(
            scope.clone().narrow(Some(11)).unwrap(),
            LocationScope::Only(vec![11])
        );
        assert!(scope.clone().narrow(Some(20)).is_err());
        assert_eq!(scope.clone().narrow(None).unwrap(), scope);
    }
}
