//! Location Repository

use super::{RepoError, RepoResult};
use crate::db::DbService;
use shared::error::ErrorCode;
use shared::models::{DEFAULT_PRINTER_PORT, Franchise, Location, LocationCreate, LocationUpdate};
use shared::util::{now_millis, snowflake_id};

#[derive(Clone)]
pub struct LocationRepository {
    db: DbService,
}

impl LocationRepository {
    pub fn new(db: DbService) -> Self {
        Self { db }
    }

    pub fn find_all(&self) -> RepoResult<Vec<Location>> {
        let mut all = self.db.list::<Location>()?;
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    pub fn find_by_franchise(&self, franchise_id: i64) -> RepoResult<Vec<Location>> {
        let mut found = self.db.find::<Location>(|l| l.franchise_id == franchise_id)?;
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    pub fn find_by_id(&self, id: i64) -> RepoResult<Option<Location>> {
        self.db.get(id)
    }

    pub fn create(&self, data: LocationCreate) -> RepoResult<Location> {
        let franchise: Franchise = self.db.get(data.franchise_id)?.ok_or_else(|| {
            RepoError::Rejected(
                ErrorCode::FranchiseNotFound,
                format!("Franchise {} not found", data.franchise_id),
            )
        })?;
        if !franchise.is_active {
            return Err(RepoError::Rejected(
                ErrorCode::FranchiseInactive,
                format!("Franchise {} is inactive", franchise.id),
            ));
        }

        let now = now_millis();
        let location = Location {
            id: snowflake_id(),
            franchise_id: data.franchise_id,
            name: data.name.trim().to_string(),
            address: data.address,
            order_prefix: normalize_prefix(&data.order_prefix),
            cgst_percent: data.cgst_percent,
            sgst_percent: data.sgst_percent,
            gstin: data.gstin,
            printer_ip: data.printer_ip.filter(|ip| !ip.trim().is_empty()),
            printer_port: data.printer_port.unwrap_or(DEFAULT_PRINTER_PORT),
            receipt_header: data.receipt_header,
            receipt_footer: data.receipt_footer,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.db.insert(&location)?;
        Ok(location)
    }

    pub fn update(&self, id: i64, data: LocationUpdate) -> RepoResult<Location> {
        self.db.modify::<Location>(id, |l| {
            if let Some(name) = data.name {
                l.name = name.trim().to_string();
            }
            if data.address.is_some() {
                l.address = data.address;
            }
            if let Some(prefix) = data.order_prefix {
                l.order_prefix = normalize_prefix(&prefix);
            }
            if let Some(cgst) = data.cgst_percent {
                l.cgst_percent = cgst;
            }
            if let Some(sgst) = data.sgst_percent {
                l.sgst_percent = sgst;
            }
            if data.gstin.is_some() {
                l.gstin = data.gstin;
            }
            if let Some(ip) = data.printer_ip {
                l.printer_ip = Some(ip).filter(|ip| !ip.trim().is_empty());
            }
            if let Some(port) = data.printer_port {
                l.printer_port = port;
            }
            if let Some(header) = data.receipt_header {
                l.receipt_header = header;
            }
            if let Some(footer) = data.receipt_footer {
                l.receipt_footer = footer;
            }
            if let Some(active) = data.is_active {
                l.is_active = active;
            }
            l.updated_at = now_millis();
            Ok(())
        })
    }
}

/// Order-number prefixes are upper-case without separators
fn normalize_prefix(prefix: &str) -> String {
    prefix
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::FranchiseRepository;
    use shared::models::FranchiseCreate;

    fn location_create(franchise_id: i64) -> LocationCreate {
        LocationCreate {
            franchise_id,
            name: "Indiranagar".into(),
            address: None,
            order_prefix: " blr-1 ".into(),
            cgst_percent: 2.5,
            sgst_percent: 2.5,
            gstin: None,
            printer_ip: Some("".into()),
            printer_port: None,
            receipt_header: vec![],
            receipt_footer: vec![],
        }
    }

    #[test]
    fn test_create_normalizes_prefix_and_printer() {
        let db = DbService::open_in_memory().unwrap();
        let franchise = FranchiseRepository::new(db.clone())
            .create(FranchiseCreate {
                name: "Spice Route".into(),
                owner_email: None,
            })
            .unwrap();

        let repo = LocationRepository::new(db);
        let loc = repo.create(location_create(franchise.id)).unwrap();
        assert_eq!(loc.order_prefix, "BLR1");
        assert_eq!(loc.printer_ip, None);
        assert_eq!(loc.printer_port, DEFAULT_PRINTER_PORT);
        assert_eq!(repo.find_by_franchise(franchise.id).unwrap().len(), 1);
    }

    #[test]
    fn test_create_requires_franchise() {
        let db = DbService::open_in_memory().unwrap();
        let repo = LocationRepository::new(db);
        let result = repo.create(location_create(42));
        assert!(matches!(
            result,
            Err(RepoError::Rejected(ErrorCode::FranchiseNotFound, _))
        ));
    }
}
