//! Holiday repository trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::api::{BatchId, DepartmentId, HolidayId};
use crate::models::session::{Holiday, NewHoliday};

/// Repository trait for the holiday calendar.
///
/// The range query returns every record whose scope could govern the
/// given batch context (global records, the department's records, the
/// batch's records); precedence between them is resolved in the
/// scheduler, not the store.
#[async_trait]
pub trait HolidayRepository: Send + Sync {
    /// All scope-matching holiday records with `start <= date <= end`.
    ///
    /// # Arguments
    /// * `department_id` - include records scoped to this department
    /// * `batch_id` - include records scoped to this batch
    ///
    /// Global records are always included.
    async fn holidays_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        department_id: Option<DepartmentId>,
        batch_id: Option<BatchId>,
    ) -> RepositoryResult<Vec<Holiday>>;

    /// Insert a holiday record (the admin app maintains the calendar).
    async fn insert_holiday(&self, new_holiday: NewHoliday) -> RepositoryResult<Holiday>;

    /// Remove a holiday record.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` if the id does not exist
    async fn delete_holiday(&self, id: HolidayId) -> RepositoryResult<()>;
}
