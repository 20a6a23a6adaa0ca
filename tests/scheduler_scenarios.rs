//! End-to-end scheduling workflows over the in-memory repository.

mod support;

use support::{date, engine, seeded_repo, time, BATCH_ID, SECOND_VENUE_ID, VENUE_ID};
use trainsched::api::{BatchId, SessionId, StudentId, VenueId};
use trainsched::db::repository::{AttendanceRepository, HolidayRepository};
use trainsched::db::services;
use trainsched::models::session::{HolidayScope, NewAttendance, NewHoliday};
use trainsched::scheduler::{
    AuthContext, Cadence, CreateRecurringRequest, CreateSessionRequest, ScheduleOutcome,
    SchedulingError, SessionUpdate, ToggleOutcome,
};

fn auth() -> AuthContext {
    AuthContext::new(7)
}

fn request(venue: i64, d: chrono::NaiveDate, sh: u32, eh: u32) -> CreateSessionRequest {
    CreateSessionRequest {
        batch_id: BatchId::new(BATCH_ID),
        venue_id: VenueId::new(venue),
        date: d,
        start_time: time(sh, 0),
        end_time: time(eh, 0),
        topic: "Quantitative aptitude".to_string(),
        trainer: "R. Iyer".to_string(),
        skip_holidays: false,
    }
}

fn created(outcome: ScheduleOutcome) -> trainsched::models::session::Session {
    match outcome {
        ScheduleOutcome::Created(session) => session,
        other => panic!("expected Created, got {:?}", other),
    }
}

#[tokio::test]
async fn test_full_session_lifecycle() {
    let repo = seeded_repo().await;
    let scheduler = engine(&repo);
    let d = date(2024, 3, 10);

    // Book
    let session = created(
        scheduler
            .create_single(&auth(), request(VENUE_ID, d, 9, 10))
            .await
            .unwrap(),
    );
    assert!(!session.cancelled);

    // Visible through the read layer
    let listed = services::sessions_for_batch(repo.as_ref(), BatchId::new(BATCH_ID))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    // Reschedule to the second venue in the afternoon
    let moved = created(
        scheduler
            .update(
                &auth(),
                session.id,
                SessionUpdate {
                    venue_id: Some(VenueId::new(SECOND_VENUE_ID)),
                    start_time: Some(time(14, 0)),
                    end_time: Some(time(16, 0)),
                    ..Default::default()
                },
                false,
            )
            .await
            .unwrap(),
    );
    assert_eq!(moved.venue_id, VenueId::new(SECOND_VENUE_ID));
    assert_eq!(moved.interval.duration_minutes(), 120);

    // The original slot is free again
    let rebooked = created(
        scheduler
            .create_single(&auth(), request(VENUE_ID, d, 9, 10))
            .await
            .unwrap(),
    );
    assert_ne!(rebooked.id, session.id);

    // Cancel, restore, delete
    let outcome = scheduler.toggle_cancelled(&auth(), moved.id).await.unwrap();
    assert!(matches!(outcome, ToggleOutcome::Cancelled(_)));
    let outcome = scheduler.toggle_cancelled(&auth(), moved.id).await.unwrap();
    assert!(matches!(outcome, ToggleOutcome::Restored(_)));

    scheduler.delete(&auth(), moved.id).await.unwrap();
    let err = services::get_session(repo.as_ref(), moved.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        trainsched::db::repository::RepositoryError::NotFound { .. }
    ));
}

#[tokio::test]
async fn test_same_interval_in_different_venues_is_fine() {
    let repo = seeded_repo().await;
    let scheduler = engine(&repo);
    let d = date(2024, 3, 10);

    created(
        scheduler
            .create_single(&auth(), request(VENUE_ID, d, 9, 10))
            .await
            .unwrap(),
    );
    created(
        scheduler
            .create_single(&auth(), request(SECOND_VENUE_ID, d, 9, 10))
            .await
            .unwrap(),
    );
}

#[tokio::test]
async fn test_recurring_series_with_mixed_blocks() {
    let repo = seeded_repo().await;

    // Holiday on week 2, conflict on week 3
    repo.insert_holiday(NewHoliday {
        date: date(2024, 1, 8),
        name: "Dept Seminar".to_string(),
        description: None,
        scope: HolidayScope::Department {
            department_id: trainsched::api::DepartmentId::new(support::DEPT_ID),
        },
    })
    .await
    .unwrap();

    let scheduler = engine(&repo);
    created(
        scheduler
            .create_single(&auth(), request(VENUE_ID, date(2024, 1, 15), 9, 10))
            .await
            .unwrap(),
    );

    let report = scheduler
        .create_recurring(
            &auth(),
            CreateRecurringRequest {
                batch_id: BatchId::new(BATCH_ID),
                venue_id: VenueId::new(VENUE_ID),
                start_date: date(2024, 1, 1),
                cadence: Cadence::Weekly,
                repeat_until: Some(date(2024, 1, 22)),
                start_time: time(9, 0),
                end_time: time(10, 0),
                topic: "Group discussion".to_string(),
                trainer: "K. Menon".to_string(),
                skip_holidays: false,
            },
        )
        .await
        .unwrap();

    assert_eq!(report.created_dates(), vec![date(2024, 1, 1), date(2024, 1, 22)]);
    assert_eq!(report.skipped_holidays, vec![date(2024, 1, 8)]);
    assert_eq!(report.skipped_conflicts, vec![date(2024, 1, 15)]);

    // Every created session belongs to the batch and is active
    let sessions = services::sessions_for_batch(repo.as_ref(), BatchId::new(BATCH_ID))
        .await
        .unwrap();
    assert!(sessions.iter().all(|s| !s.cancelled));
}

#[tokio::test]
async fn test_holiday_override_workflow() {
    let repo = seeded_repo().await;
    repo.insert_holiday(NewHoliday {
        date: date(2024, 1, 26),
        name: "Republic Day".to_string(),
        description: Some("National holiday".to_string()),
        scope: HolidayScope::Global,
    })
    .await
    .unwrap();
    let scheduler = engine(&repo);

    // First attempt surfaces the holiday so a human can decide
    let outcome = scheduler
        .create_single(&auth(), request(VENUE_ID, date(2024, 1, 26), 9, 10))
        .await
        .unwrap();
    let holiday = match outcome {
        ScheduleOutcome::HolidayBlocked(holiday) => holiday,
        other => panic!("expected HolidayBlocked, got {:?}", other),
    };
    assert_eq!(holiday.name, "Republic Day");
    assert_eq!(holiday.description.as_deref(), Some("National holiday"));

    // Deliberate resubmission overrides
    let mut retry = request(VENUE_ID, date(2024, 1, 26), 9, 10);
    retry.skip_holidays = true;
    created(scheduler.create_single(&auth(), retry).await.unwrap());
}

#[tokio::test]
async fn test_cascade_delete_removes_attendance() {
    let repo = seeded_repo().await;
    let scheduler = engine(&repo);

    let session = created(
        scheduler
            .create_single(&auth(), request(VENUE_ID, date(2024, 3, 10), 9, 10))
            .await
            .unwrap(),
    );
    for student in [11, 12, 13] {
        repo.insert_attendance(NewAttendance {
            session_id: session.id,
            student_id: StudentId::new(student),
            present: true,
        })
        .await
        .unwrap();
    }
    assert_eq!(
        repo.attendance_for_session(session.id).await.unwrap().len(),
        3
    );

    scheduler.delete(&auth(), session.id).await.unwrap();

    assert!(repo
        .attendance_for_session(session.id)
        .await
        .unwrap()
        .is_empty());
    let err = scheduler
        .delete(&auth(), SessionId::new(session.id.value()))
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound { .. }));
}

#[tokio::test]
async fn test_venue_day_plan_shows_cancelled_history() {
    let repo = seeded_repo().await;
    let scheduler = engine(&repo);
    let d = date(2024, 3, 10);

    let session = created(
        scheduler
            .create_single(&auth(), request(VENUE_ID, d, 9, 10))
            .await
            .unwrap(),
    );
    scheduler.toggle_cancelled(&auth(), session.id).await.unwrap();
    created(
        scheduler
            .create_single(&auth(), request(VENUE_ID, d, 9, 10))
            .await
            .unwrap(),
    );

    // Cancelling preserves history: the day plan shows both rows
    let plan = services::venue_day_plan(repo.as_ref(), VenueId::new(VENUE_ID), d)
        .await
        .unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!(plan.iter().filter(|s| s.cancelled).count(), 1);
}
