//! In-memory repository for unit testing and local development.
//!
//! State lives behind a single `parking_lot::RwLock`; ids are assigned
//! from monotonic counters. Nothing survives the process, which is the
//! point.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::api::{AttendanceId, BatchId, DepartmentId, HolidayId, SessionId, VenueId};
use crate::db::repository::{
    AttendanceRepository, ErrorContext, FullRepository, HolidayRepository, ReferenceRepository,
    RepositoryError, RepositoryResult, SessionRepository,
};
use crate::models::session::{
    AttendanceRecord, Holiday, NewAttendance, NewHoliday, NewSession, Session, TrainingBatch,
    Venue,
};

#[derive(Debug, Default)]
struct State {
    sessions: HashMap<i64, Session>,
    holidays: HashMap<i64, Holiday>,
    venues: HashMap<i64, Venue>,
    batches: HashMap<i64, TrainingBatch>,
    attendance: HashMap<i64, AttendanceRecord>,
    next_session_id: i64,
    next_holiday_id: i64,
    next_attendance_id: i64,
}

/// In-memory implementation of all repository traits.
#[derive(Debug, Default)]
pub struct LocalRepository {
    state: RwLock<State>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(entity: &str, id: i64, operation: &str) -> RepositoryError {
        RepositoryError::not_found_with_context(
            format!("{} {} does not exist", entity, id),
            ErrorContext::new(operation)
                .with_entity(entity)
                .with_entity_id(id),
        )
    }
}

#[async_trait]
impl SessionRepository for LocalRepository {
    async fn insert_session(&self, new_session: NewSession) -> RepositoryResult<Session> {
        let mut state = self.state.write();
        state.next_session_id += 1;
        let session = Session {
            id: SessionId::new(state.next_session_id),
            batch_id: new_session.batch_id,
            venue_id: new_session.venue_id,
            date: new_session.date,
            interval: new_session.interval,
            topic: new_session.topic,
            trainer: new_session.trainer,
            cancelled: false,
        };
        state.sessions.insert(session.id.value(), session.clone());
        Ok(session)
    }

    async fn fetch_session(&self, id: SessionId) -> RepositoryResult<Session> {
        self.state
            .read()
            .sessions
            .get(&id.value())
            .cloned()
            .ok_or_else(|| Self::not_found("session", id.value(), "fetch_session"))
    }

    async fn update_session(&self, session: &Session) -> RepositoryResult<Session> {
        let mut state = self.state.write();
        if !state.sessions.contains_key(&session.id.value()) {
            return Err(Self::not_found(
                "session",
                session.id.value(),
                "update_session",
            ));
        }
        state.sessions.insert(session.id.value(), session.clone());
        Ok(session.clone())
    }

    async fn delete_session(&self, id: SessionId) -> RepositoryResult<()> {
        let mut state = self.state.write();
        state
            .sessions
            .remove(&id.value())
            .map(|_| ())
            .ok_or_else(|| Self::not_found("session", id.value(), "delete_session"))
    }

    async fn sessions_for_slot(
        &self,
        venue_id: VenueId,
        date: NaiveDate,
        exclude_cancelled: bool,
    ) -> RepositoryResult<Vec<Session>> {
        let state = self.state.read();
        let mut sessions: Vec<Session> = state
            .sessions
            .values()
            .filter(|s| s.venue_id == venue_id && s.date == date)
            .filter(|s| !exclude_cancelled || !s.cancelled)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| (s.interval.start(), s.id));
        Ok(sessions)
    }

    async fn sessions_for_batch(&self, batch_id: BatchId) -> RepositoryResult<Vec<Session>> {
        let state = self.state.read();
        let mut sessions: Vec<Session> = state
            .sessions
            .values()
            .filter(|s| s.batch_id == batch_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| (s.date, s.interval.start(), s.id));
        Ok(sessions)
    }
}

#[async_trait]
impl HolidayRepository for LocalRepository {
    async fn holidays_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        department_id: Option<DepartmentId>,
        batch_id: Option<BatchId>,
    ) -> RepositoryResult<Vec<Holiday>> {
        let state = self.state.read();
        let mut holidays: Vec<Holiday> = state
            .holidays
            .values()
            .filter(|h| h.date >= start && h.date <= end)
            .filter(|h| h.scope.applies_to(department_id, batch_id))
            .cloned()
            .collect();
        holidays.sort_by_key(|h| (h.date, h.id));
        Ok(holidays)
    }

    async fn insert_holiday(&self, new_holiday: NewHoliday) -> RepositoryResult<Holiday> {
        let mut state = self.state.write();
        state.next_holiday_id += 1;
        let holiday = Holiday {
            id: HolidayId::new(state.next_holiday_id),
            date: new_holiday.date,
            name: new_holiday.name,
            description: new_holiday.description,
            scope: new_holiday.scope,
        };
        state.holidays.insert(holiday.id.value(), holiday.clone());
        Ok(holiday)
    }

    async fn delete_holiday(&self, id: HolidayId) -> RepositoryResult<()> {
        let mut state = self.state.write();
        state
            .holidays
            .remove(&id.value())
            .map(|_| ())
            .ok_or_else(|| Self::not_found("holiday", id.value(), "delete_holiday"))
    }
}

#[async_trait]
impl ReferenceRepository for LocalRepository {
    async fn fetch_venue(&self, id: VenueId) -> RepositoryResult<Venue> {
        self.state
            .read()
            .venues
            .get(&id.value())
            .cloned()
            .ok_or_else(|| Self::not_found("venue", id.value(), "fetch_venue"))
    }

    async fn fetch_batch(&self, id: BatchId) -> RepositoryResult<TrainingBatch> {
        self.state
            .read()
            .batches
            .get(&id.value())
            .cloned()
            .ok_or_else(|| Self::not_found("batch", id.value(), "fetch_batch"))
    }

    async fn list_venues(&self) -> RepositoryResult<Vec<Venue>> {
        let state = self.state.read();
        let mut venues: Vec<Venue> = state.venues.values().cloned().collect();
        venues.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(venues)
    }

    async fn insert_venue(&self, venue: Venue) -> RepositoryResult<Venue> {
        let mut state = self.state.write();
        state.venues.insert(venue.id.value(), venue.clone());
        Ok(venue)
    }

    async fn insert_batch(&self, batch: TrainingBatch) -> RepositoryResult<TrainingBatch> {
        let mut state = self.state.write();
        state.batches.insert(batch.id.value(), batch.clone());
        Ok(batch)
    }
}

#[async_trait]
impl AttendanceRepository for LocalRepository {
    async fn delete_attendance_by_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<usize> {
        let mut state = self.state.write();
        let doomed: Vec<i64> = state
            .attendance
            .values()
            .filter(|a| a.session_id == session_id)
            .map(|a| a.id.value())
            .collect();
        for id in &doomed {
            state.attendance.remove(id);
        }
        Ok(doomed.len())
    }

    async fn insert_attendance(
        &self,
        new_attendance: NewAttendance,
    ) -> RepositoryResult<AttendanceRecord> {
        let mut state = self.state.write();
        state.next_attendance_id += 1;
        let record = AttendanceRecord {
            id: AttendanceId::new(state.next_attendance_id),
            session_id: new_attendance.session_id,
            student_id: new_attendance.student_id,
            present: new_attendance.present,
        };
        state.attendance.insert(record.id.value(), record.clone());
        Ok(record)
    }

    async fn attendance_for_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<Vec<AttendanceRecord>> {
        let state = self.state.read();
        let mut records: Vec<AttendanceRecord> = state
            .attendance
            .values()
            .filter(|a| a.session_id == session_id)
            .cloned()
            .collect();
        records.sort_by_key(|a| a.id);
        Ok(records)
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
