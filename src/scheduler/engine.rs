//! The scheduling engine.
//!
//! [`Scheduler`] is the single scheduling authority: every
//! conflict-check-then-write for a `(venue, date)` slot goes through its
//! per-slot async locks, so two concurrent requests cannot both observe
//! "no conflict" and double-book the venue. The engine holds no other
//! mutable state; everything durable lives behind the repository.
//!
//! Holiday blocks and venue conflicts are returned as outcome variants,
//! not errors. A blocked caller resubmits with `skip_holidays` (explicit
//! two-step confirmation) or picks a different slot.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::{BatchId, SessionId, VenueId};
use crate::db::repository::{FullRepository, RepositoryError};
use crate::models::interval::{InvalidInterval, TimeInterval};
use crate::models::session::{Holiday, NewSession, Session, TrainingBatch};

use super::conflict::find_conflicts;
use super::holiday::HolidayCalendar;
use super::recurrence::{expand, Cadence, InvalidRecurrence};

/// Error type for scheduling operations.
///
/// Validation errors are raised before any storage I/O. Store failures
/// propagate without automatic retry at this layer (the Postgres backend
/// retries transient failures internally).
#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error(transparent)]
    InvalidInterval(#[from] InvalidInterval),

    #[error(transparent)]
    InvalidRecurrence(#[from] InvalidRecurrence),

    /// Referenced batch, venue or session id does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Underlying persistence failure, propagated to the caller.
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl SchedulingError {
    /// Map a repository fetch failure, turning the store's NotFound into
    /// the scheduler's own.
    fn from_fetch(err: RepositoryError, entity: &'static str, id: i64) -> Self {
        match err {
            RepositoryError::NotFound { .. } => SchedulingError::NotFound { entity, id },
            other => SchedulingError::Store(other),
        }
    }
}

/// Request-scoped identity of the acting admin.
///
/// Passed explicitly into every mutating call; role enforcement happens
/// in the admin layer before the call is made, this context exists so the
/// engine can attribute its writes in the logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub admin_id: i64,
}

impl AuthContext {
    pub fn new(admin_id: i64) -> Self {
        Self { admin_id }
    }
}

/// Outcome of a single-session create or update.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleOutcome {
    /// The session was persisted.
    Created(Session),
    /// The date resolves to a holiday and `skip_holidays` was not set.
    /// Resubmit with `skip_holidays = true` to override.
    HolidayBlocked(Holiday),
    /// One or more existing bookings overlap the requested slot.
    ConflictBlocked(Vec<Session>),
}

/// Outcome of a cancel/restore toggle.
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    Cancelled(Session),
    Restored(Session),
    /// The slot was taken while the session sat cancelled; the session
    /// stays cancelled.
    ConflictBlocked(Vec<Session>),
}

/// Per-date report of a recurring creation. Partial success is the
/// normal case: blocked dates are recorded and the loop moves on.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecurrenceReport {
    pub created: Vec<Session>,
    pub skipped_conflicts: Vec<NaiveDate>,
    pub skipped_holidays: Vec<NaiveDate>,
}

impl RecurrenceReport {
    pub fn created_dates(&self) -> Vec<NaiveDate> {
        self.created.iter().map(|s| s.date).collect()
    }
}

/// Parameters for creating one session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateSessionRequest {
    pub batch_id: BatchId,
    pub venue_id: VenueId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub topic: String,
    pub trainer: String,
    #[serde(default)]
    pub skip_holidays: bool,
}

/// Parameters for creating a recurring series.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateRecurringRequest {
    pub batch_id: BatchId,
    pub venue_id: VenueId,
    pub start_date: NaiveDate,
    pub cadence: Cadence,
    pub repeat_until: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub topic: String,
    pub trainer: String,
    #[serde(default)]
    pub skip_holidays: bool,
}

/// Partial update of a session. Unset fields keep their current value;
/// the result is re-validated exactly as on creation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SessionUpdate {
    pub batch_id: Option<BatchId>,
    pub venue_id: Option<VenueId>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub topic: Option<String>,
    pub trainer: Option<String>,
    pub cancelled: Option<bool>,
}

/// Async locks serializing check-then-write per `(venue, date)` slot.
///
/// The map grows with the distinct slots actually touched by this
/// process; entries are a single `Arc<Mutex<()>>` each.
#[derive(Default)]
struct SlotLocks {
    inner: parking_lot::Mutex<HashMap<(VenueId, NaiveDate), Arc<tokio::sync::Mutex<()>>>>,
}

impl SlotLocks {
    fn slot(&self, venue_id: VenueId, date: NaiveDate) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(self.inner.lock().entry((venue_id, date)).or_default())
    }
}

/// Result of one check-then-insert attempt against a slot.
enum BookAttempt {
    Booked(Session),
    Conflicts(Vec<Session>),
}

/// The scheduling orchestrator.
pub struct Scheduler {
    repository: Arc<dyn FullRepository>,
    slot_locks: SlotLocks,
}

impl Scheduler {
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            slot_locks: SlotLocks::default(),
        }
    }

    /// Create one session.
    ///
    /// Pipeline: validate interval, resolve reference data, holiday gate,
    /// conflict check under the slot lock, persist.
    pub async fn create_single(
        &self,
        auth: &AuthContext,
        request: CreateSessionRequest,
    ) -> Result<ScheduleOutcome, SchedulingError> {
        let interval = TimeInterval::new(request.start_time, request.end_time)?;
        let batch = self.fetch_batch(request.batch_id).await?;
        self.fetch_venue_exists(request.venue_id).await?;

        let calendar = self
            .holiday_snapshot(request.date, request.date, &batch)
            .await?;
        if !request.skip_holidays {
            if let Some(holiday) =
                calendar.resolve(request.date, Some(batch.department_id), Some(batch.id))
            {
                info!(
                    admin_id = auth.admin_id,
                    date = %request.date,
                    holiday = %holiday.name,
                    "session creation blocked by holiday"
                );
                return Ok(ScheduleOutcome::HolidayBlocked(holiday.clone()));
            }
        }

        let new_session = NewSession {
            batch_id: request.batch_id,
            venue_id: request.venue_id,
            date: request.date,
            interval,
            topic: request.topic,
            trainer: request.trainer,
        };
        match self.book_slot(auth, new_session).await? {
            BookAttempt::Booked(session) => Ok(ScheduleOutcome::Created(session)),
            BookAttempt::Conflicts(conflicts) => Ok(ScheduleOutcome::ConflictBlocked(conflicts)),
        }
    }

    /// Create a recurring series, one independent check-then-write per
    /// date. Blocked dates are skipped and reported; a store failure
    /// aborts the remaining dates while sessions already inserted stay
    /// committed.
    pub async fn create_recurring(
        &self,
        auth: &AuthContext,
        request: CreateRecurringRequest,
    ) -> Result<RecurrenceReport, SchedulingError> {
        let interval = TimeInterval::new(request.start_time, request.end_time)?;
        let dates = expand(request.start_date, request.cadence, request.repeat_until)?;
        let batch = self.fetch_batch(request.batch_id).await?;
        self.fetch_venue_exists(request.venue_id).await?;

        // One range query covers the whole series.
        let last = *dates.last().unwrap_or(&request.start_date);
        let calendar = self
            .holiday_snapshot(request.start_date, last, &batch)
            .await?;

        let mut report = RecurrenceReport::default();
        for date in dates {
            if !request.skip_holidays {
                if let Some(holiday) =
                    calendar.resolve(date, Some(batch.department_id), Some(batch.id))
                {
                    info!(
                        admin_id = auth.admin_id,
                        date = %date,
                        holiday = %holiday.name,
                        "recurring date skipped: holiday"
                    );
                    report.skipped_holidays.push(date);
                    continue;
                }
            }

            let new_session = NewSession {
                batch_id: request.batch_id,
                venue_id: request.venue_id,
                date,
                interval,
                topic: request.topic.clone(),
                trainer: request.trainer.clone(),
            };
            match self.book_slot(auth, new_session).await? {
                BookAttempt::Booked(session) => report.created.push(session),
                BookAttempt::Conflicts(_) => {
                    info!(admin_id = auth.admin_id, date = %date, "recurring date skipped: conflict");
                    report.skipped_conflicts.push(date);
                }
            }
        }

        info!(
            admin_id = auth.admin_id,
            created = report.created.len(),
            skipped_conflicts = report.skipped_conflicts.len(),
            skipped_holidays = report.skipped_holidays.len(),
            "recurring series processed"
        );
        Ok(report)
    }

    /// Edit a session, re-validating exactly as on creation but with the
    /// session excluded from its own conflict set.
    ///
    /// The holiday gate applies only when the update moves the session to
    /// a different date; a date already approved at creation is not
    /// re-litigated by same-day edits.
    pub async fn update(
        &self,
        auth: &AuthContext,
        session_id: SessionId,
        update: SessionUpdate,
        skip_holidays: bool,
    ) -> Result<ScheduleOutcome, SchedulingError> {
        let current = self.fetch_session(session_id).await?;

        let date = update.date.unwrap_or(current.date);
        let date_changed = date != current.date;
        let interval = TimeInterval::new(
            update.start_time.unwrap_or(current.interval.start()),
            update.end_time.unwrap_or(current.interval.end()),
        )?;

        let batch_id = update.batch_id.unwrap_or(current.batch_id);
        let venue_id = update.venue_id.unwrap_or(current.venue_id);
        let batch = self.fetch_batch(batch_id).await?;
        if venue_id != current.venue_id {
            self.fetch_venue_exists(venue_id).await?;
        }

        if date_changed && !skip_holidays {
            let calendar = self.holiday_snapshot(date, date, &batch).await?;
            if let Some(holiday) = calendar.resolve(date, Some(batch.department_id), Some(batch.id))
            {
                return Ok(ScheduleOutcome::HolidayBlocked(holiday.clone()));
            }
        }

        let updated = Session {
            id: current.id,
            batch_id,
            venue_id,
            date,
            interval,
            topic: update.topic.unwrap_or(current.topic),
            trainer: update.trainer.unwrap_or(current.trainer),
            cancelled: update.cancelled.unwrap_or(current.cancelled),
        };

        // Cancelled sessions occupy no slot, so only an active result
        // needs the conflict check.
        if updated.cancelled {
            let persisted = self.repository.update_session(&updated).await?;
            info!(admin_id = auth.admin_id, session_id = %session_id, "session updated (cancelled)");
            return Ok(ScheduleOutcome::Created(persisted));
        }

        let lock = self.slot_locks.slot(updated.venue_id, updated.date);
        let _slot = lock.lock().await;

        let existing = self
            .repository
            .sessions_for_slot(updated.venue_id, updated.date, true)
            .await?;
        let conflicts = find_conflicts(&updated.interval, &existing, Some(updated.id));
        if !conflicts.is_empty() {
            return Ok(ScheduleOutcome::ConflictBlocked(
                conflicts.into_iter().cloned().collect(),
            ));
        }

        let persisted = self.repository.update_session(&updated).await?;
        info!(admin_id = auth.admin_id, session_id = %session_id, "session updated");
        Ok(ScheduleOutcome::Created(persisted))
    }

    /// Flip the cancelled flag.
    ///
    /// Cancelling is unconditional. Restoring re-runs the conflict check
    /// against the current bookings and leaves the session cancelled when
    /// the slot has since been taken.
    pub async fn toggle_cancelled(
        &self,
        auth: &AuthContext,
        session_id: SessionId,
    ) -> Result<ToggleOutcome, SchedulingError> {
        let mut session = self.fetch_session(session_id).await?;

        if !session.cancelled {
            session.cancelled = true;
            let persisted = self.repository.update_session(&session).await?;
            info!(admin_id = auth.admin_id, session_id = %session_id, "session cancelled");
            return Ok(ToggleOutcome::Cancelled(persisted));
        }

        let lock = self.slot_locks.slot(session.venue_id, session.date);
        let _slot = lock.lock().await;

        let existing = self
            .repository
            .sessions_for_slot(session.venue_id, session.date, true)
            .await?;
        let conflicts = find_conflicts(&session.interval, &existing, Some(session.id));
        if !conflicts.is_empty() {
            warn!(
                admin_id = auth.admin_id,
                session_id = %session_id,
                conflicts = conflicts.len(),
                "restore blocked: slot taken while cancelled"
            );
            return Ok(ToggleOutcome::ConflictBlocked(
                conflicts.into_iter().cloned().collect(),
            ));
        }

        session.cancelled = false;
        let persisted = self.repository.update_session(&session).await?;
        info!(admin_id = auth.admin_id, session_id = %session_id, "session restored");
        Ok(ToggleOutcome::Restored(persisted))
    }

    /// Remove a session and its dependent attendance rows.
    ///
    /// Attendance is keyed by session id and owned elsewhere, so the
    /// scheduler is the unit that cascades the delete before removing the
    /// session row.
    pub async fn delete(
        &self,
        auth: &AuthContext,
        session_id: SessionId,
    ) -> Result<(), SchedulingError> {
        // Surface NotFound before touching dependent rows.
        self.fetch_session(session_id).await?;

        let removed = self.repository.delete_attendance_by_session(session_id).await?;
        self.repository
            .delete_session(session_id)
            .await
            .map_err(|e| SchedulingError::from_fetch(e, "session", session_id.value()))?;
        info!(
            admin_id = auth.admin_id,
            session_id = %session_id,
            attendance_removed = removed,
            "session deleted"
        );
        Ok(())
    }

    // ==================== internals ====================

    /// Conflict-check and insert under the slot lock. The holiday gate is
    /// the caller's responsibility.
    async fn book_slot(
        &self,
        auth: &AuthContext,
        new_session: NewSession,
    ) -> Result<BookAttempt, SchedulingError> {
        let lock = self.slot_locks.slot(new_session.venue_id, new_session.date);
        let _slot = lock.lock().await;

        let existing = self
            .repository
            .sessions_for_slot(new_session.venue_id, new_session.date, true)
            .await?;
        let conflicts = find_conflicts(&new_session.interval, &existing, None);
        if !conflicts.is_empty() {
            return Ok(BookAttempt::Conflicts(
                conflicts.into_iter().cloned().collect(),
            ));
        }

        let session = self.repository.insert_session(new_session).await?;
        info!(
            admin_id = auth.admin_id,
            session_id = %session.id,
            venue_id = %session.venue_id,
            date = %session.date,
            "session created"
        );
        Ok(BookAttempt::Booked(session))
    }

    async fn holiday_snapshot(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        batch: &TrainingBatch,
    ) -> Result<HolidayCalendar, SchedulingError> {
        let records = self
            .repository
            .holidays_in_range(start, end, Some(batch.department_id), Some(batch.id))
            .await?;
        Ok(HolidayCalendar::from_records(records))
    }

    async fn fetch_session(&self, id: SessionId) -> Result<Session, SchedulingError> {
        self.repository
            .fetch_session(id)
            .await
            .map_err(|e| SchedulingError::from_fetch(e, "session", id.value()))
    }

    async fn fetch_batch(&self, id: BatchId) -> Result<TrainingBatch, SchedulingError> {
        self.repository
            .fetch_batch(id)
            .await
            .map_err(|e| SchedulingError::from_fetch(e, "batch", id.value()))
    }

    async fn fetch_venue_exists(&self, id: VenueId) -> Result<(), SchedulingError> {
        self.repository
            .fetch_venue(id)
            .await
            .map(|_| ())
            .map_err(|e| SchedulingError::from_fetch(e, "venue", id.value()))
    }
}
