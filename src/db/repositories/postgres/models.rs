use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;

use super::schema::{attendance_records, holidays, training_batches, training_sessions, venues};
use crate::api::{AttendanceId, BatchId, DepartmentId, HolidayId, SessionId, StudentId, VenueId};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::interval::TimeInterval;
use crate::models::session::{
    AttendanceRecord, Holiday, HolidayScope, Session, TrainingBatch, Venue,
};

pub(super) const SCOPE_GLOBAL: &str = "global";
pub(super) const SCOPE_DEPARTMENT: &str = "department";
pub(super) const SCOPE_BATCH: &str = "batch";

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = venues)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VenueRow {
    pub venue_id: i64,
    pub venue_name: String,
    pub room_label: String,
    pub capacity: i32,
}

impl From<VenueRow> for Venue {
    fn from(row: VenueRow) -> Self {
        Venue {
            id: VenueId::new(row.venue_id),
            name: row.venue_name,
            room: row.room_label,
            capacity: row.capacity,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = venues)]
pub struct NewVenueRow {
    pub venue_id: i64,
    pub venue_name: String,
    pub room_label: String,
    pub capacity: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = training_batches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BatchRow {
    pub batch_id: i64,
    pub batch_name: String,
    pub department_id: i64,
    pub academic_year: String,
    pub active: bool,
}

impl From<BatchRow> for TrainingBatch {
    fn from(row: BatchRow) -> Self {
        TrainingBatch {
            id: BatchId::new(row.batch_id),
            name: row.batch_name,
            department_id: DepartmentId::new(row.department_id),
            academic_year: row.academic_year,
            active: row.active,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = training_batches)]
pub struct NewBatchRow {
    pub batch_id: i64,
    pub batch_name: String,
    pub department_id: i64,
    pub academic_year: String,
    pub active: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = holidays)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HolidayRow {
    pub holiday_id: i64,
    pub holiday_date: NaiveDate,
    pub holiday_name: String,
    pub description: Option<String>,
    pub scope: String,
    pub department_id: Option<i64>,
    pub batch_id: Option<i64>,
}

impl HolidayRow {
    /// Convert the row into the domain type, validating the scope
    /// columns against the tag.
    pub fn into_domain(self) -> RepositoryResult<Holiday> {
        let scope = match (self.scope.as_str(), self.department_id, self.batch_id) {
            (SCOPE_GLOBAL, None, None) => HolidayScope::Global,
            (SCOPE_DEPARTMENT, Some(department_id), None) => HolidayScope::Department {
                department_id: DepartmentId::new(department_id),
            },
            (SCOPE_BATCH, None, Some(batch_id)) => HolidayScope::Batch {
                batch_id: BatchId::new(batch_id),
            },
            (tag, dept, batch) => {
                return Err(RepositoryError::validation_with_context(
                    format!(
                        "inconsistent holiday scope: tag={} department_id={:?} batch_id={:?}",
                        tag, dept, batch
                    ),
                    ErrorContext::new("holiday_row_into_domain")
                        .with_entity("holiday")
                        .with_entity_id(self.holiday_id),
                ))
            }
        };
        Ok(Holiday {
            id: HolidayId::new(self.holiday_id),
            date: self.holiday_date,
            name: self.holiday_name,
            description: self.description,
            scope,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = holidays)]
pub struct NewHolidayRow {
    pub holiday_date: NaiveDate,
    pub holiday_name: String,
    pub description: Option<String>,
    pub scope: String,
    pub department_id: Option<i64>,
    pub batch_id: Option<i64>,
}

impl NewHolidayRow {
    pub fn from_domain(new_holiday: crate::models::session::NewHoliday) -> Self {
        let (scope, department_id, batch_id) = match new_holiday.scope {
            HolidayScope::Global => (SCOPE_GLOBAL, None, None),
            HolidayScope::Department { department_id } => {
                (SCOPE_DEPARTMENT, Some(department_id.value()), None)
            }
            HolidayScope::Batch { batch_id } => (SCOPE_BATCH, None, Some(batch_id.value())),
        };
        Self {
            holiday_date: new_holiday.date,
            holiday_name: new_holiday.name,
            description: new_holiday.description,
            scope: scope.to_string(),
            department_id,
            batch_id,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = training_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // created_at is carried for database operations only
pub struct SessionRow {
    pub session_id: i64,
    pub batch_id: i64,
    pub venue_id: i64,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub topic: String,
    pub trainer: String,
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
}

impl SessionRow {
    /// Convert the row into the domain type. The database enforces
    /// `end_time > start_time`, so a failure here means a corrupt row.
    pub fn into_domain(self) -> RepositoryResult<Session> {
        let interval = TimeInterval::new(self.start_time, self.end_time).map_err(|e| {
            RepositoryError::validation_with_context(
                e.to_string(),
                ErrorContext::new("session_row_into_domain")
                    .with_entity("session")
                    .with_entity_id(self.session_id),
            )
        })?;
        Ok(Session {
            id: SessionId::new(self.session_id),
            batch_id: BatchId::new(self.batch_id),
            venue_id: VenueId::new(self.venue_id),
            date: self.session_date,
            interval,
            topic: self.topic,
            trainer: self.trainer,
            cancelled: self.cancelled,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = training_sessions)]
pub struct NewSessionRow {
    pub batch_id: i64,
    pub venue_id: i64,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub topic: String,
    pub trainer: String,
    pub cancelled: bool,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = training_sessions)]
pub struct SessionChanges {
    pub batch_id: i64,
    pub venue_id: i64,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub topic: String,
    pub trainer: String,
    pub cancelled: bool,
}

impl SessionChanges {
    pub fn from_domain(session: &Session) -> Self {
        Self {
            batch_id: session.batch_id.value(),
            venue_id: session.venue_id.value(),
            session_date: session.date,
            start_time: session.interval.start(),
            end_time: session.interval.end(),
            topic: session.topic.clone(),
            trainer: session.trainer.clone(),
            cancelled: session.cancelled,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = attendance_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AttendanceRow {
    pub attendance_id: i64,
    pub session_id: i64,
    pub student_id: i64,
    pub present: bool,
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        AttendanceRecord {
            id: AttendanceId::new(row.attendance_id),
            session_id: SessionId::new(row.session_id),
            student_id: StudentId::new(row.student_id),
            present: row.present,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = attendance_records)]
pub struct NewAttendanceRow {
    pub session_id: i64,
    pub student_id: i64,
    pub present: bool,
}
