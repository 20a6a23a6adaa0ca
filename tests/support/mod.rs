//! Shared helpers for the integration suites.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveTime};

use trainsched::api::{BatchId, DepartmentId, VenueId};
use trainsched::db::repositories::LocalRepository;
use trainsched::db::repository::ReferenceRepository;
use trainsched::models::session::{TrainingBatch, Venue};
use trainsched::scheduler::Scheduler;

/// Process-global lock serializing tests that touch environment
/// variables; Rust runs tests in parallel by default.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Run `f` with the given environment variables set (`None` removes),
/// restoring the previous values afterwards, panics included.
pub fn with_env<R>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> R) -> R {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");

    struct Restore(Vec<(String, Option<String>)>);
    impl Drop for Restore {
        fn drop(&mut self) {
            for (key, value) in self.0.drain(..) {
                match value {
                    Some(v) => std::env::set_var(&key, v),
                    None => std::env::remove_var(&key),
                }
            }
        }
    }

    let _restore = Restore(
        vars.iter()
            .map(|(key, _)| (key.to_string(), std::env::var(key).ok()))
            .collect(),
    );
    for (key, value) in vars {
        match value {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        }
    }
    f()
}

pub const DEPT_ID: i64 = 10;
pub const BATCH_ID: i64 = 1;
pub const VENUE_ID: i64 = 1;
pub const SECOND_VENUE_ID: i64 = 2;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// A fresh in-memory repository with one batch and two venues.
pub async fn seeded_repo() -> Arc<LocalRepository> {
    let repo = Arc::new(LocalRepository::new());
    repo.insert_venue(Venue {
        id: VenueId::new(VENUE_ID),
        name: "Seminar Hall".to_string(),
        room: "S-1".to_string(),
        capacity: 80,
    })
    .await
    .unwrap();
    repo.insert_venue(Venue {
        id: VenueId::new(SECOND_VENUE_ID),
        name: "Placement Lab".to_string(),
        room: "P-2".to_string(),
        capacity: 40,
    })
    .await
    .unwrap();
    repo.insert_batch(TrainingBatch {
        id: BatchId::new(BATCH_ID),
        name: "CSE 2024 A".to_string(),
        department_id: DepartmentId::new(DEPT_ID),
        academic_year: "2023-24".to_string(),
        active: true,
    })
    .await
    .unwrap();
    repo
}

pub fn engine(repo: &Arc<LocalRepository>) -> Scheduler {
    Scheduler::new(
        Arc::clone(repo) as Arc<dyn trainsched::db::repository::FullRepository>
    )
}
