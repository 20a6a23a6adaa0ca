//! Scoped holiday resolution.
//!
//! The engine pre-fetches all holiday records for the date range it is
//! about to schedule into a [`HolidayCalendar`] and resolves each date
//! in memory. One range query serves a whole recurring series instead of
//! one query per candidate date.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::api::{BatchId, DepartmentId};
use crate::models::session::{Holiday, HolidayScope};

/// Read-only snapshot of holiday records, indexed by date.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    by_date: HashMap<NaiveDate, Vec<Holiday>>,
}

impl HolidayCalendar {
    /// Build a calendar from the store's range query result.
    pub fn from_records(records: Vec<Holiday>) -> Self {
        let mut by_date: HashMap<NaiveDate, Vec<Holiday>> = HashMap::new();
        for holiday in records {
            by_date.entry(holiday.date).or_default().push(holiday);
        }
        Self { by_date }
    }

    /// Resolve the holiday governing `date` for the given batch context.
    ///
    /// Checks batch-scoped records first, then department-scoped, then
    /// global, returning the most specific match. Returns `None` when the
    /// date is not blocked for this context.
    pub fn resolve(
        &self,
        date: NaiveDate,
        department: Option<DepartmentId>,
        batch: Option<BatchId>,
    ) -> Option<&Holiday> {
        let candidates = self.by_date.get(&date)?;

        // Three explicit tiers so a batch holiday always shadows a
        // department or global one on the same date.
        if let Some(batch_id) = batch {
            if let Some(hit) = candidates
                .iter()
                .find(|h| h.scope == HolidayScope::Batch { batch_id })
            {
                return Some(hit);
            }
        }
        if let Some(department_id) = department {
            if let Some(hit) = candidates
                .iter()
                .find(|h| h.scope == HolidayScope::Department { department_id })
            {
                return Some(hit);
            }
        }
        candidates.iter().find(|h| h.scope == HolidayScope::Global)
    }

    /// Number of dates with at least one record.
    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HolidayId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn holiday(id: i64, d: NaiveDate, name: &str, scope: HolidayScope) -> Holiday {
        Holiday {
            id: HolidayId::new(id),
            date: d,
            name: name.to_string(),
            description: None,
            scope,
        }
    }

    #[test]
    fn test_resolve_none_when_no_records() {
        let calendar = HolidayCalendar::default();
        assert!(calendar
            .resolve(date(2024, 1, 26), None, None)
            .is_none());
    }

    #[test]
    fn test_resolve_global() {
        let d = date(2024, 1, 26);
        let calendar = HolidayCalendar::from_records(vec![holiday(
            1,
            d,
            "Republic Day",
            HolidayScope::Global,
        )]);
        let hit = calendar.resolve(d, None, None).unwrap();
        assert_eq!(hit.name, "Republic Day");
    }

    #[test]
    fn test_batch_scope_shadows_global() {
        let d = date(2024, 1, 26);
        let batch = BatchId::new(5);
        let calendar = HolidayCalendar::from_records(vec![
            holiday(1, d, "Republic Day", HolidayScope::Global),
            holiday(2, d, "Batch Orientation", HolidayScope::Batch { batch_id: batch }),
        ]);
        let hit = calendar.resolve(d, None, Some(batch)).unwrap();
        assert_eq!(hit.name, "Batch Orientation");
    }

    #[test]
    fn test_department_scope_shadows_global_but_not_batch() {
        let d = date(2024, 3, 1);
        let dept = DepartmentId::new(2);
        let batch = BatchId::new(9);
        let calendar = HolidayCalendar::from_records(vec![
            holiday(1, d, "College Day", HolidayScope::Global),
            holiday(
                2,
                d,
                "Dept Seminar",
                HolidayScope::Department { department_id: dept },
            ),
            holiday(3, d, "Batch Break", HolidayScope::Batch { batch_id: batch }),
        ]);

        let hit = calendar.resolve(d, Some(dept), None).unwrap();
        assert_eq!(hit.name, "Dept Seminar");

        let hit = calendar.resolve(d, Some(dept), Some(batch)).unwrap();
        assert_eq!(hit.name, "Batch Break");
    }

    #[test]
    fn test_foreign_batch_scope_is_ignored() {
        let d = date(2024, 3, 1);
        let calendar = HolidayCalendar::from_records(vec![holiday(
            1,
            d,
            "Other Batch Break",
            HolidayScope::Batch {
                batch_id: BatchId::new(1),
            },
        )]);
        assert!(calendar.resolve(d, None, Some(BatchId::new(2))).is_none());
    }

    #[test]
    fn test_resolution_is_per_date() {
        let calendar = HolidayCalendar::from_records(vec![holiday(
            1,
            date(2024, 1, 26),
            "Republic Day",
            HolidayScope::Global,
        )]);
        assert!(calendar.resolve(date(2024, 1, 27), None, None).is_none());
    }
}
