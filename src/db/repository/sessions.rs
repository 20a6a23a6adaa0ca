//! Session repository trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::api::{BatchId, SessionId, VenueId};
use crate::models::session::{NewSession, Session};

/// Repository trait for session rows, the mutable entity the scheduler
/// owns.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a new session. The store assigns the id; the cancelled
    /// flag starts false.
    ///
    /// # Returns
    /// * `Ok(Session)` - The persisted row including its id
    /// * `Err(RepositoryError)` - If the insert fails
    async fn insert_session(&self, new_session: NewSession) -> RepositoryResult<Session>;

    /// Fetch a session by id.
    ///
    /// # Returns
    /// * `Ok(Session)` if it exists
    /// * `Err(RepositoryError::NotFound)` otherwise
    async fn fetch_session(&self, id: SessionId) -> RepositoryResult<Session>;

    /// Persist the full state of an existing session.
    ///
    /// # Returns
    /// * `Ok(Session)` - The stored row after the write
    /// * `Err(RepositoryError::NotFound)` if the id does not exist
    async fn update_session(&self, session: &Session) -> RepositoryResult<Session>;

    /// Remove a session row. Dependent attendance rows must already have
    /// been removed by the caller.
    async fn delete_session(&self, id: SessionId) -> RepositoryResult<()>;

    /// All sessions booked at one venue on one date, the conflict
    /// checker's candidate set. With `exclude_cancelled` the result
    /// contains only rows with `cancelled = false`.
    async fn sessions_for_slot(
        &self,
        venue_id: VenueId,
        date: NaiveDate,
        exclude_cancelled: bool,
    ) -> RepositoryResult<Vec<Session>>;

    /// All sessions of one batch, ordered by date then start time.
    async fn sessions_for_batch(&self, batch_id: BatchId) -> RepositoryResult<Vec<Session>>;
}
