//! Abstract repository interface for the scheduler's stores.
//!
//! One trait per concern, combined into [`FullRepository`] for the
//! layers that need all of them behind a single handle.

use async_trait::async_trait;

pub mod attendance;
pub mod calendar;
pub mod error;
pub mod reference;
pub mod sessions;

pub use attendance::AttendanceRepository;
pub use calendar::HolidayRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use reference::ReferenceRepository;
pub use sessions::SessionRepository;

/// Combined repository interface covering every store the scheduler
/// touches.
#[async_trait]
pub trait FullRepository:
    SessionRepository + HolidayRepository + ReferenceRepository + AttendanceRepository
{
    /// Verify the backend is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
