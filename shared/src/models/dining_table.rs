//! Dining Table Model

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableShape {
    Round,
    #[default]
    Square,
    Rectangle,
    Booth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    #[default]
    Available,
    Reserved,
    Occupied,
}

/// Dining table entity
///
/// `status == Occupied` iff at least one non-terminal order references the
/// table. Only the order engine writes `Occupied`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: i64,
    pub location_id: i64,
    /// Display number printed on the table, e.g. "T1"
    pub number: String,
    pub capacity: u32,
    #[serde(default)]
    pub shape: TableShape,
    #[serde(default)]
    pub status: TableStatus,
    /// Reservation expiry (Unix millis)
    #[serde(default)]
    pub reserved_until: Option<i64>,
    #[serde(default)]
    pub reserved_for: Option<String>,
    pub is_active: bool,
}

impl DiningTable {
    /// Status as seen at `now`: an expired reservation reads as available
    pub fn effective_status(&self, now: i64) -> TableStatus {
        match self.status {
            TableStatus::Reserved if self.reservation_expired(now) => TableStatus::Available,
            other => other,
        }
    }

    pub fn reservation_expired(&self, now: i64) -> bool {
        self.status == TableStatus::Reserved
            && self.reserved_until.is_some_and(|until| until <= now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiningTableCreate {
    pub location_id: i64,
    #[validate(length(min = 1, max = 32))]
    pub number: String,
    #[validate(range(min = 1, max = 100))]
    pub capacity: u32,
    pub shape: Option<TableShape>,
}

/// Update payload; `status` is not editable here
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DiningTableUpdate {
    #[validate(length(min = 1, max = 32))]
    pub number: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub capacity: Option<u32>,
    pub shape: Option<TableShape>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReserveTableRequest {
    /// Reservation expiry (Unix millis); `None` holds until released
    pub until: Option<i64>,
    #[validate(length(max = 200))]
    pub reserved_for: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(status: TableStatus, reserved_until: Option<i64>) -> DiningTable {
        DiningTable {
            id: 1,
            location_id: 10,
            number: "T1".into(),
            capacity: 4,
            shape: TableShape::Round,
            status,
            reserved_until,
            reserved_for: None,
            is_active: true,
        }
    }

    #[test]
    fn test_expired_reservation_reads_available() {
        let t = table(TableStatus::Reserved, Some(1_000));
        assert_eq!(t.effective_status(999), TableStatus::Reserved);
        assert_eq!(t.effective_status(1_000), TableStatus::Available);
    }

    #[test]
    fn test_open_ended_reservation_never_expires() {
        let t = table(TableStatus::Reserved, None);
        assert_eq!(t.effective_status(i64::MAX), TableStatus::Reserved);
    }

    #[test]
    fn test_occupied_ignores_reservation_expiry() {
        let t = table(TableStatus::Occupied, Some(1));
        assert_eq!(t.effective_status(5), TableStatus::Occupied);
    }

    #[test]
    fn test_shape_serde() {
        assert_eq!(serde_json::to_string(&TableShape::Booth).unwrap(), "\"booth\"");
    }
}
