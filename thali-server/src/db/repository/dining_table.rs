//! Dining Table Repository
//!
//! Table status is owned by the order engine: `occupied` is only ever set
//! or cleared inside an order transaction. This repository handles layout
//! fields and reservations.

use super::{RepoError, RepoResult};
use crate::db::collection::{get_in, list_in, put_in};
use crate::db::DbService;
use shared::error::ErrorCode;
use shared::models::{
    DiningTable, DiningTableCreate, DiningTableUpdate, Location, ReserveTableRequest, TableStatus,
};
use shared::util::snowflake_id;

#[derive(Clone)]
pub struct DiningTableRepository {
    db: DbService,
}

impl DiningTableRepository {
    pub fn new(db: DbService) -> Self {
        Self { db }
    }

    /// Active tables of a location ordered by number
    pub fn find_by_location(&self, location_id: i64) -> RepoResult<Vec<DiningTable>> {
        let mut found = self
            .db
            .find::<DiningTable>(|t| t.location_id == location_id && t.is_active)?;
        found.sort_by(|a, b| natural_cmp(&a.number, &b.number));
        Ok(found)
    }

    pub fn find_by_id(&self, id: i64) -> RepoResult<Option<DiningTable>> {
        self.db.get(id)
    }

    pub fn create(&self, data: DiningTableCreate) -> RepoResult<DiningTable> {
        let number = data.number.trim().to_string();
        self.db.write(|txn| {
            if get_in::<Location>(txn, data.location_id)?.is_none() {
                return Err(RepoError::Rejected(
                    ErrorCode::LocationNotFound,
                    format!("Location {} not found", data.location_id),
                ));
            }
            ensure_number_free(txn, data.location_id, &number, None)?;
            let table = DiningTable {
                id: snowflake_id(),
                location_id: data.location_id,
                number,
                capacity: data.capacity,
                shape: data.shape.unwrap_or_default(),
                status: TableStatus::Available,
                reserved_until: None,
                reserved_for: None,
                is_active: true,
            };
            put_in(txn, &table)?;
            Ok(table)
        })
    }

    pub fn update(&self, id: i64, data: DiningTableUpdate) -> RepoResult<DiningTable> {
        self.db.write(|txn| {
            let mut table: DiningTable = get_in(txn, id)?
                .ok_or_else(|| RepoError::NotFound(format!("dining_table {}", id)))?;
            if let Some(number) = data.number {
                let number = number.trim().to_string();
                ensure_number_free(txn, table.location_id, &number, Some(id))?;
                table.number = number;
            }
            if let Some(capacity) = data.capacity {
                table.capacity = capacity;
            }
            if let Some(shape) = data.shape {
                table.shape = shape;
            }
            if let Some(active) = data.is_active {
                if !active && table.status == TableStatus::Occupied {
                    return Err(in_use(&table));
                }
                table.is_active = active;
            }
            put_in(txn, &table)?;
            Ok(table)
        })
    }

    /// Soft delete; refused while an order holds the table
    pub fn delete(&self, id: i64) -> RepoResult<bool> {
        self.db.write(|txn| {
            let Some(mut table) = get_in::<DiningTable>(txn, id)? else {
                return Ok(false);
            };
            if table.status == TableStatus::Occupied {
                return Err(in_use(&table));
            }
            table.is_active = false;
            put_in(txn, &table)?;
            Ok(true)
        })
    }

    /// Reserve an available table (or re-reserve a reserved one)
    pub fn reserve(&self, id: i64, req: ReserveTableRequest, now: i64) -> RepoResult<DiningTable> {
        if req.until.is_some_and(|until| until <= now) {
            return Err(RepoError::Validation(
                "Reservation expiry must be in the future".into(),
            ));
        }
        self.db.modify::<DiningTable>(id, |t| {
            if t.status == TableStatus::Occupied {
                return Err(RepoError::Rejected(
                    ErrorCode::TableOccupied,
                    format!("Table {} is occupied", t.number),
                ));
            }
            t.status = TableStatus::Reserved;
            t.reserved_until = req.until;
            t.reserved_for = req.reserved_for;
            Ok(())
        })
    }

    /// Drop a reservation; a no-op on tables that are not reserved
    pub fn release_reservation(&self, id: i64) -> RepoResult<DiningTable> {
        self.db.modify::<DiningTable>(id, |t| {
            if t.status == TableStatus::Reserved {
                t.status = TableStatus::Available;
                t.reserved_until = None;
                t.reserved_for = None;
            }
            Ok(())
        })
    }

    /// Reset every reservation that expired at or before `now`.
    ///
    /// Returns the tables that changed.
    pub fn sweep_expired_reservations(&self, now: i64) -> RepoResult<Vec<DiningTable>> {
        self.db.write(|txn| {
            let tables: Vec<DiningTable> = list_in(txn)?;
            let mut changed = Vec::new();
            for mut table in tables.into_iter().filter(|t| t.reservation_expired(now)) {
                table.status = TableStatus::Available;
                table.reserved_until = None;
                table.reserved_for = None;
                put_in(txn, &table)?;
                changed.push(table);
            }
            Ok(changed)
        })
    }
}

fn in_use(table: &DiningTable) -> RepoError {
    RepoError::Rejected(
        ErrorCode::TableInUse,
        format!("Table {} is held by an open order", table.number),
    )
}

fn ensure_number_free(
    txn: &redb::WriteTransaction,
    location_id: i64,
    number: &str,
    except: Option<i64>,
) -> RepoResult<()> {
    let tables: Vec<DiningTable> = list_in(txn)?;
    let taken = tables.iter().any(|t| {
        t.location_id == location_id
            && t.is_active
            && Some(t.id) != except
            && t.number.eq_ignore_ascii_case(number)
    });
    if taken {
        return Err(RepoError::Rejected(
            ErrorCode::TableNumberExists,
            format!("Table number {} already exists", number),
        ));
    }
    Ok(())
}

/// "T2" sorts before "T10"
fn natural_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    let split = |s: &str| {
        let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
        let prefix: String = s.chars().filter(|c| !c.is_ascii_digit()).collect();
        (prefix, digits.parse::<u64>().unwrap_or(0))
    };
    split(a).cmp(&split(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::TableShape;

    fn seed(db: &DbService) -> i64 {
        let loc = Location {
            id: 7,
            franchise_id: 1,
            name: "Koramangala".into(),
            address: None,
            order_prefix: "KOR".into(),
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
        };
        db.insert(&loc).unwrap();
        loc.id
    }

    fn create(location_id: i64, number: &str) -> DiningTableCreate {
        DiningTableCreate {
            location_id,
            number: number.into(),
            capacity: 4,
            shape: None,
        }
    }

    #[test]
    fn test_create_defaults_and_unique_number() {
        let db = DbService::open_in_memory().unwrap();
        let loc = seed(&db);
        let repo = DiningTableRepository::new(db);

        let t1 = repo.create(create(loc, "T1")).unwrap();
        assert_eq!(t1.status, TableStatus::Available);
        assert_eq!(t1.shape, TableShape::Square);

        assert!(matches!(
            repo.create(create(loc, "t1")),
            Err(RepoError::Rejected(ErrorCode::TableNumberExists, _))
        ));
    }

    #[test]
    fn test_natural_ordering() {
        let db = DbService::open_in_memory().unwrap();
        let loc = seed(&db);
        let repo = DiningTableRepository::new(db);
        for n in ["T10", "T2", "T1"] {
            repo.create(create(loc, n)).unwrap();
        }
        let numbers: Vec<String> = repo
            .find_by_location(loc)
            .unwrap()
            .into_iter()
            .map(|t| t.number)
            .collect();
        assert_eq!(numbers, vec!["T1", "T2", "T10"]);
    }

    #[test]
    fn test_reservation_sweep() {
        let db = DbService::open_in_memory().unwrap();
        let loc = seed(&db);
        let repo = DiningTableRepository::new(db);
        let t = repo.create(create(loc, "T1")).unwrap();

        let reserved = repo
            .reserve(
                t.id,
                ReserveTableRequest {
                    until: Some(2_000),
                    reserved_for: Some("Mehta, 8pm".into()),
                },
                1_000,
            )
            .unwrap();
        assert_eq!(reserved.status, TableStatus::Reserved);
        assert_eq!(reserved.effective_status(1_500), TableStatus::Reserved);
        assert_eq!(reserved.effective_status(2_000), TableStatus::Available);

        assert!(repo.sweep_expired_reservations(1_999).unwrap().is_empty());
        let swept = repo.sweep_expired_reservations(2_000).unwrap();
        assert_eq!(swept.len(), 1);
        assert_eq!(swept[0].status, TableStatus::Available);
        assert_eq!(swept[0].reserved_for, None);
    }

    #[test]
    fn test_occupied_table_cannot_be_reserved_or_deleted() {
        let db = DbService::open_in_memory().unwrap();
        let loc = seed(&db);
        let repo = DiningTableRepository::new(db.clone());
        let mut t = repo.create(create(loc, "T1")).unwrap();
        t.status = TableStatus::Occupied;
        db.insert(&t).unwrap();

        assert!(matches!(
            repo.reserve(t.id, ReserveTableRequest { until: None, reserved_for: None }, 0),
            Err(RepoError::Rejected(ErrorCode::TableOccupied, _))
        ));
        assert!(matches!(
            repo.delete(t.id),
            Err(RepoError::Rejected(ErrorCode::TableInUse, _))
        ));
    }
}
