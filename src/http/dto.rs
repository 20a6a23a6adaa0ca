//! Data transfer objects for the REST API.

use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::session::{Holiday, Session, Venue};
use crate::scheduler::{RecurrenceReport, ScheduleOutcome, SessionUpdate, ToggleOutcome};

/// GET /health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Outcome payload for create and update calls.
///
/// Blocked outcomes are decision points, not errors: the caller either
/// resubmits with `skip_holidays` or picks another slot, so they ship as
/// 200-level responses with a discriminating status tag.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionOutcomeDto {
    Created { session: Session },
    HolidayBlocked { holiday: Holiday },
    ConflictBlocked { conflicts: Vec<Session> },
}

impl SessionOutcomeDto {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SessionOutcomeDto::Created { .. } => StatusCode::CREATED,
            _ => StatusCode::OK,
        }
    }
}

impl From<ScheduleOutcome> for SessionOutcomeDto {
    fn from(outcome: ScheduleOutcome) -> Self {
        match outcome {
            ScheduleOutcome::Created(session) => SessionOutcomeDto::Created { session },
            ScheduleOutcome::HolidayBlocked(holiday) => {
                SessionOutcomeDto::HolidayBlocked { holiday }
            }
            ScheduleOutcome::ConflictBlocked(conflicts) => {
                SessionOutcomeDto::ConflictBlocked { conflicts }
            }
        }
    }
}

/// Outcome payload for the cancel/restore toggle.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToggleOutcomeDto {
    Cancelled { session: Session },
    Restored { session: Session },
    ConflictBlocked { conflicts: Vec<Session> },
}

impl From<ToggleOutcome> for ToggleOutcomeDto {
    fn from(outcome: ToggleOutcome) -> Self {
        match outcome {
            ToggleOutcome::Cancelled(session) => ToggleOutcomeDto::Cancelled { session },
            ToggleOutcome::Restored(session) => ToggleOutcomeDto::Restored { session },
            ToggleOutcome::ConflictBlocked(conflicts) => {
                ToggleOutcomeDto::ConflictBlocked { conflicts }
            }
        }
    }
}

/// Per-date report of a recurring creation.
#[derive(Debug, Clone, Serialize)]
pub struct RecurrenceReportDto {
    pub created: Vec<Session>,
    pub created_dates: Vec<NaiveDate>,
    pub skipped_conflicts: Vec<NaiveDate>,
    pub skipped_holidays: Vec<NaiveDate>,
}

impl From<RecurrenceReport> for RecurrenceReportDto {
    fn from(report: RecurrenceReport) -> Self {
        let created_dates = report.created_dates();
        Self {
            created: report.created,
            created_dates,
            skipped_conflicts: report.skipped_conflicts,
            skipped_holidays: report.skipped_holidays,
        }
    }
}

/// PUT /v1/sessions/{id} body.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSessionBody {
    #[serde(flatten)]
    pub changes: SessionUpdate,
    #[serde(default)]
    pub skip_holidays: bool,
}

/// GET /v1/venues/{venue_id}/sessions query.
#[derive(Debug, Clone, Deserialize)]
pub struct DayPlanQuery {
    pub date: NaiveDate,
}

/// GET /v1/holidays query.
#[derive(Debug, Clone, Deserialize)]
pub struct HolidayRangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub department_id: Option<i64>,
    pub batch_id: Option<i64>,
}

/// GET /v1/batches/{batch_id}/sessions response.
#[derive(Debug, Clone, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<Session>,
    pub total: usize,
}

/// GET /v1/venues response.
#[derive(Debug, Clone, Serialize)]
pub struct VenueListResponse {
    pub venues: Vec<Venue>,
    pub total: usize,
}

/// GET /v1/holidays response.
#[derive(Debug, Clone, Serialize)]
pub struct HolidayListResponse {
    pub holidays: Vec<Holiday>,
    pub total: usize,
}
