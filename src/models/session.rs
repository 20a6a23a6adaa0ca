//! Value types for the scheduling domain.
//!
//! Rows cross the store boundary as these typed values, constructed once
//! by the repository implementations. Venues and batches are reference
//! data owned by the wider admin application; the scheduler only reads
//! them. Sessions are the mutable entity the scheduler owns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::{
    AttendanceId, BatchId, DepartmentId, HolidayId, SessionId, StudentId, VenueId,
};
use crate::models::interval::TimeInterval;

/// A bookable room with finite capacity. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: VenueId,
    pub name: String,
    /// Room label as printed on the door, e.g. "B-204".
    pub room: String,
    pub capacity: i32,
}

/// A cohort of students undergoing training, scoped to a department and
/// academic year. The scheduler treats it as an opaque foreign key plus
/// department affiliation (needed for holiday scoping).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingBatch {
    pub id: BatchId,
    pub name: String,
    pub department_id: DepartmentId,
    pub academic_year: String,
    pub active: bool,
}

/// The breadth at which a holiday applies. Narrower scope wins: a
/// batch-scoped holiday shadows a department or global holiday on the
/// same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum HolidayScope {
    Global,
    Department { department_id: DepartmentId },
    Batch { batch_id: BatchId },
}

impl HolidayScope {
    /// Precedence rank; higher shadows lower.
    pub fn specificity(&self) -> u8 {
        match self {
            HolidayScope::Global => 0,
            HolidayScope::Department { .. } => 1,
            HolidayScope::Batch { .. } => 2,
        }
    }

    /// Whether a holiday with this scope governs the given batch context.
    pub fn applies_to(&self, department: Option<DepartmentId>, batch: Option<BatchId>) -> bool {
        match self {
            HolidayScope::Global => true,
            HolidayScope::Department { department_id } => department == Some(*department_id),
            HolidayScope::Batch { batch_id } => batch == Some(*batch_id),
        }
    }
}

/// A blocked calendar date at some scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holiday {
    pub id: HolidayId,
    pub date: NaiveDate,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub scope: HolidayScope,
}

/// Insert payload for a holiday record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHoliday {
    pub date: NaiveDate,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub scope: HolidayScope,
}

/// A single scheduled training occurrence at one venue, date and time
/// range for one batch.
///
/// Invariant: for a fixed `(venue, date)` pair no two sessions with
/// `cancelled = false` overlap in time. Cancelling preserves history;
/// only an explicit delete removes the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub batch_id: BatchId,
    pub venue_id: VenueId,
    pub date: NaiveDate,
    pub interval: TimeInterval,
    pub topic: String,
    pub trainer: String,
    pub cancelled: bool,
}

/// Insert payload for a session; the store assigns the id and the
/// `cancelled` flag starts false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSession {
    pub batch_id: BatchId,
    pub venue_id: VenueId,
    pub date: NaiveDate,
    pub interval: TimeInterval,
    pub topic: String,
    pub trainer: String,
}

/// Attendance row dependent on a session. Owned by the attendance module
/// of the wider app, but keyed by session id, so the scheduler cascades
/// deletion before removing a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub session_id: SessionId,
    pub student_id: StudentId,
    pub present: bool,
}

/// Insert payload for an attendance row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAttendance {
    pub session_id: SessionId,
    pub student_id: StudentId,
    pub present: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_specificity_ordering() {
        let global = HolidayScope::Global;
        let dept = HolidayScope::Department {
            department_id: DepartmentId::new(1),
        };
        let batch = HolidayScope::Batch {
            batch_id: BatchId::new(1),
        };
        assert!(batch.specificity() > dept.specificity());
        assert!(dept.specificity() > global.specificity());
    }

    #[test]
    fn test_global_scope_applies_everywhere() {
        assert!(HolidayScope::Global.applies_to(None, None));
        assert!(HolidayScope::Global.applies_to(Some(DepartmentId::new(3)), Some(BatchId::new(4))));
    }

    #[test]
    fn test_department_scope_requires_matching_department() {
        let scope = HolidayScope::Department {
            department_id: DepartmentId::new(2),
        };
        assert!(scope.applies_to(Some(DepartmentId::new(2)), None));
        assert!(!scope.applies_to(Some(DepartmentId::new(9)), None));
        assert!(!scope.applies_to(None, Some(BatchId::new(2))));
    }

    #[test]
    fn test_batch_scope_requires_matching_batch() {
        let scope = HolidayScope::Batch {
            batch_id: BatchId::new(7),
        };
        assert!(scope.applies_to(None, Some(BatchId::new(7))));
        assert!(!scope.applies_to(Some(DepartmentId::new(7)), Some(BatchId::new(8))));
    }

    #[test]
    fn test_holiday_scope_serde_tagging() {
        let holiday = Holiday {
            id: HolidayId::new(1),
            date: NaiveDate::from_ymd_opt(2024, 1, 26).unwrap(),
            name: "Republic Day".to_string(),
            description: None,
            scope: HolidayScope::Global,
        };
        let json = serde_json::to_value(&holiday).unwrap();
        assert_eq!(json["scope"], "global");

        let scoped = Holiday {
            scope: HolidayScope::Batch {
                batch_id: BatchId::new(5),
            },
            ..holiday
        };
        let json = serde_json::to_value(&scoped).unwrap();
        assert_eq!(json["scope"], "batch");
        assert_eq!(json["batch_id"], 5);
    }
}
