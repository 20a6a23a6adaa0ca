//! Public API surface for the scheduler core.
//!
//! This file consolidates the typed identifiers and re-exports the value
//! types used across the repository, scheduler and HTTP layers. All types
//! derive Serialize/Deserialize for JSON serialization.

use crate::define_id;

define_id!(i64, SessionId);
define_id!(i64, BatchId);
define_id!(i64, VenueId);
define_id!(i64, DepartmentId);
define_id!(i64, HolidayId);
define_id!(i64, AttendanceId);
define_id!(i64, StudentId);

pub use crate::models::interval::{InvalidInterval, TimeInterval};
pub use crate::models::session::{
    AttendanceRecord, Holiday, HolidayScope, NewAttendance, NewHoliday, NewSession, Session,
    TrainingBatch, Venue,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_new_and_value() {
        let id = SessionId::new(42);
        assert_eq!(id.value(), 42);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(VenueId::new(7).to_string(), "7");
    }

    #[test]
    fn test_id_from_conversions() {
        let id: BatchId = 3.into();
        let raw: i64 = id.into();
        assert_eq!(raw, 3);
    }

    #[test]
    fn test_id_ordering() {
        assert!(SessionId::new(1) < SessionId::new(2));
    }

    #[test]
    fn test_id_serde_is_transparent() {
        let json = serde_json::to_string(&HolidayId::new(9)).unwrap();
        assert_eq!(json, "9");
        let back: HolidayId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, HolidayId::new(9));
    }
}
