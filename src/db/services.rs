//! Service layer for read paths used by the admin listings.
//!
//! These functions are generic over the repository traits so they work
//! with any backend. Mutations go through the scheduling engine
//! ([`crate::scheduler::Scheduler`]), never through this layer.

use chrono::NaiveDate;

use super::repository::{
    FullRepository, HolidayRepository, ReferenceRepository, RepositoryError, RepositoryResult,
    SessionRepository,
};
use crate::api::{BatchId, DepartmentId, SessionId, VenueId};
use crate::models::session::{Holiday, Session, Venue};

/// Verify the backend is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Fetch one session by id.
pub async fn get_session<R: SessionRepository + ?Sized>(
    repo: &R,
    id: SessionId,
) -> RepositoryResult<Session> {
    repo.fetch_session(id).await
}

/// All sessions of one batch, ordered by date then start time.
pub async fn sessions_for_batch<R: SessionRepository + ?Sized>(
    repo: &R,
    batch_id: BatchId,
) -> RepositoryResult<Vec<Session>> {
    repo.sessions_for_batch(batch_id).await
}

/// The day plan of one venue: every session booked there on `date`,
/// cancelled ones included.
pub async fn venue_day_plan<R: SessionRepository + ?Sized>(
    repo: &R,
    venue_id: VenueId,
    date: NaiveDate,
) -> RepositoryResult<Vec<Session>> {
    repo.sessions_for_slot(venue_id, date, false).await
}

/// Holiday records in a date range, optionally narrowed to a department
/// scope. Rejects inverted ranges before touching the store.
pub async fn holidays_in_range<R: HolidayRepository + ?Sized>(
    repo: &R,
    start: NaiveDate,
    end: NaiveDate,
    department_id: Option<DepartmentId>,
    batch_id: Option<BatchId>,
) -> RepositoryResult<Vec<Holiday>> {
    if end < start {
        return Err(RepositoryError::validation(format!(
            "holiday range end {} precedes start {}",
            end, start
        )));
    }
    repo.holidays_in_range(start, end, department_id, batch_id)
        .await
}

/// All venues, ordered by name.
pub async fn list_venues<R: ReferenceRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<Venue>> {
    repo.list_venues().await
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod services_tests;
