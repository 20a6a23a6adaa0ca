//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint. Reads delegate to
//! `db::services`; every scheduling mutation goes through the engine with
//! an explicit [`AuthContext`] taken from the `X-Admin-Id` header (the
//! admin layer authenticates upstream and forwards the acting admin).

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use super::dto::{
    DayPlanQuery, HealthResponse, HolidayListResponse, HolidayRangeQuery, RecurrenceReportDto,
    SessionListResponse, SessionOutcomeDto, ToggleOutcomeDto, UpdateSessionBody,
    VenueListResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{BatchId, DepartmentId, HolidayId, SessionId, VenueId};
use crate::db::repository::HolidayRepository;
use crate::db::services as db_services;
use crate::models::session::{Holiday, NewHoliday, Session};
use crate::scheduler::{AuthContext, CreateRecurringRequest, CreateSessionRequest};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

const ADMIN_HEADER: &str = "x-admin-id";

/// Extract the acting admin from the forwarded header.
fn admin_context(headers: &HeaderMap) -> Result<AuthContext, AppError> {
    let value = headers
        .get(ADMIN_HEADER)
        .ok_or_else(|| AppError::BadRequest(format!("Missing {} header", ADMIN_HEADER)))?;
    let admin_id = value
        .to_str()
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid {} header", ADMIN_HEADER)))?;
    Ok(AuthContext::new(admin_id))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the
/// database is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Sessions
// =============================================================================

/// POST /v1/sessions
///
/// Create one session. Blocked outcomes (holiday, conflict) return 200
/// with a discriminating status; a created session returns 201.
pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionOutcomeDto>), AppError> {
    let auth = admin_context(&headers)?;
    let outcome = state.scheduler.create_single(&auth, request).await?;
    let dto = SessionOutcomeDto::from(outcome);
    Ok((dto.status_code(), Json(dto)))
}

/// POST /v1/sessions/recurring
///
/// Create a recurring series. Partial success is normal: blocked dates
/// are reported, the rest are booked.
pub async fn create_recurring(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateRecurringRequest>,
) -> HandlerResult<RecurrenceReportDto> {
    let auth = admin_context(&headers)?;
    let report = state.scheduler.create_recurring(&auth, request).await?;
    Ok(Json(RecurrenceReportDto::from(report)))
}

/// GET /v1/sessions/{session_id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> HandlerResult<Session> {
    let session =
        db_services::get_session(state.repository.as_ref(), SessionId::new(session_id)).await?;
    Ok(Json(session))
}

/// PUT /v1/sessions/{session_id}
///
/// Edit a session; re-validated exactly as on creation, excluding itself
/// from the conflict set.
pub async fn update_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<UpdateSessionBody>,
) -> Result<(StatusCode, Json<SessionOutcomeDto>), AppError> {
    let auth = admin_context(&headers)?;
    let outcome = state
        .scheduler
        .update(
            &auth,
            SessionId::new(session_id),
            body.changes,
            body.skip_holidays,
        )
        .await?;
    let dto = SessionOutcomeDto::from(outcome);
    // An update that persists is 200, not 201
    let status = match dto {
        SessionOutcomeDto::Created { .. } => StatusCode::OK,
        _ => dto.status_code(),
    };
    Ok((status, Json(dto)))
}

/// POST /v1/sessions/{session_id}/toggle-cancelled
pub async fn toggle_cancelled(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    headers: HeaderMap,
) -> HandlerResult<ToggleOutcomeDto> {
    let auth = admin_context(&headers)?;
    let outcome = state
        .scheduler
        .toggle_cancelled(&auth, SessionId::new(session_id))
        .await?;
    Ok(Json(ToggleOutcomeDto::from(outcome)))
}

/// DELETE /v1/sessions/{session_id}
///
/// Removes the session and its dependent attendance rows.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let auth = admin_context(&headers)?;
    state
        .scheduler
        .delete(&auth, SessionId::new(session_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Listings
// =============================================================================

/// GET /v1/batches/{batch_id}/sessions
pub async fn sessions_for_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<i64>,
) -> HandlerResult<SessionListResponse> {
    let sessions =
        db_services::sessions_for_batch(state.repository.as_ref(), BatchId::new(batch_id)).await?;
    let total = sessions.len();
    Ok(Json(SessionListResponse { sessions, total }))
}

/// GET /v1/venues/{venue_id}/sessions?date=YYYY-MM-DD
///
/// Day plan of one venue, cancelled sessions included.
pub async fn venue_day_plan(
    State(state): State<AppState>,
    Path(venue_id): Path<i64>,
    Query(query): Query<DayPlanQuery>,
) -> HandlerResult<SessionListResponse> {
    let sessions = db_services::venue_day_plan(
        state.repository.as_ref(),
        VenueId::new(venue_id),
        query.date,
    )
    .await?;
    let total = sessions.len();
    Ok(Json(SessionListResponse { sessions, total }))
}

/// GET /v1/venues
pub async fn list_venues(State(state): State<AppState>) -> HandlerResult<VenueListResponse> {
    let venues = db_services::list_venues(state.repository.as_ref()).await?;
    let total = venues.len();
    Ok(Json(VenueListResponse { venues, total }))
}

// =============================================================================
// Holidays
// =============================================================================

/// GET /v1/holidays?from=&to=&department_id=&batch_id=
pub async fn list_holidays(
    State(state): State<AppState>,
    Query(query): Query<HolidayRangeQuery>,
) -> HandlerResult<HolidayListResponse> {
    let holidays = db_services::holidays_in_range(
        state.repository.as_ref(),
        query.from,
        query.to,
        query.department_id.map(DepartmentId::new),
        query.batch_id.map(BatchId::new),
    )
    .await?;
    let total = holidays.len();
    Ok(Json(HolidayListResponse { holidays, total }))
}

/// POST /v1/holidays
pub async fn create_holiday(
    State(state): State<AppState>,
    Json(new_holiday): Json<NewHoliday>,
) -> Result<(StatusCode, Json<Holiday>), AppError> {
    let holiday = state.repository.insert_holiday(new_holiday).await?;
    Ok((StatusCode::CREATED, Json(holiday)))
}

/// DELETE /v1/holidays/{holiday_id}
pub async fn delete_holiday(
    State(state): State<AppState>,
    Path(holiday_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state
        .repository
        .delete_holiday(HolidayId::new(holiday_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
