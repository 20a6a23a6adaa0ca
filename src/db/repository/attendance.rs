//! Attendance repository trait.
//!
//! Attendance rows are owned by the attendance module of the wider app
//! but are keyed by session id, so the scheduler cascades their deletion
//! before removing a session row.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::SessionId;
use crate::models::session::{AttendanceRecord, NewAttendance};

/// Repository trait for attendance rows dependent on sessions.
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Remove every attendance row for a session.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows removed (zero is fine)
    async fn delete_attendance_by_session(&self, session_id: SessionId)
        -> RepositoryResult<usize>;

    /// Insert an attendance row.
    async fn insert_attendance(
        &self,
        new_attendance: NewAttendance,
    ) -> RepositoryResult<AttendanceRecord>;

    /// All attendance rows for a session.
    async fn attendance_for_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<Vec<AttendanceRecord>>;
}
