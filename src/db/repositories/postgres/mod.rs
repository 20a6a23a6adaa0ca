//! Postgres repository implementation using Diesel.
//!
//! This module implements the repository traits against a Postgres
//! database holding the scheduler's tables (venues, training batches,
//! holidays, training sessions, attendance records).
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::api::{BatchId, DepartmentId, HolidayId, SessionId, VenueId};
use crate::db::repository::{
    AttendanceRepository, ErrorContext, FullRepository, HolidayRepository, ReferenceRepository,
    RepositoryError, RepositoryResult, SessionRepository,
};
use crate::models::session::{
    AttendanceRecord, Holiday, NewAttendance, NewHoliday, NewSession, Session, TrainingBatch,
    Venue,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        Ok(Self {
            database_url,
            max_pool_size: env_parse("PG_POOL_MAX", 10),
            min_pool_size: env_parse("PG_POOL_MIN", 1),
            connection_timeout_sec: env_parse("PG_CONN_TIMEOUT_SEC", 30),
            idle_timeout_sec: env_parse("PG_IDLE_TIMEOUT_SEC", 600),
            max_retries: env_parse("PG_MAX_RETRIES", 3),
            retry_delay_ms: env_parse("PG_RETRY_DELAY_MS", 100),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Diesel-backed repository for Postgres.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true) // Validate connections before use
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        // Run migrations once during initialization
        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self { pool, config })
    }

    /// Run pending database migrations.
    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient
    /// failures (connection errors, timeouts, serialization failures).
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2; // Exponential backoff
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    fn not_found(entity: &str, id: i64, operation: &str) -> RepositoryError {
        RepositoryError::not_found_with_context(
            format!("{} {} does not exist", entity, id),
            ErrorContext::new(operation)
                .with_entity(entity)
                .with_entity_id(id),
        )
    }
}

#[async_trait]
impl SessionRepository for PostgresRepository {
    async fn insert_session(&self, new_session: NewSession) -> RepositoryResult<Session> {
        let row = NewSessionRow {
            batch_id: new_session.batch_id.value(),
            venue_id: new_session.venue_id.value(),
            session_date: new_session.date,
            start_time: new_session.interval.start(),
            end_time: new_session.interval.end(),
            topic: new_session.topic,
            trainer: new_session.trainer,
            cancelled: false,
        };
        self.with_conn(move |conn| {
            let stored: SessionRow = diesel::insert_into(training_sessions::table)
                .values(&row)
                .returning(SessionRow::as_returning())
                .get_result(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("insert_session"))?;
            stored.into_domain()
        })
        .await
    }

    async fn fetch_session(&self, id: SessionId) -> RepositoryResult<Session> {
        self.with_conn(move |conn| {
            let row: SessionRow = training_sessions::table
                .find(id.value())
                .select(SessionRow::as_select())
                .first(conn)
                .optional()
                .map_err(|e| RepositoryError::from(e).with_operation("fetch_session"))?
                .ok_or_else(|| Self::not_found("session", id.value(), "fetch_session"))?;
            row.into_domain()
        })
        .await
    }

    async fn update_session(&self, session: &Session) -> RepositoryResult<Session> {
        let id = session.id;
        let changes = SessionChanges::from_domain(session);
        self.with_conn(move |conn| {
            let stored: SessionRow = diesel::update(training_sessions::table.find(id.value()))
                .set(changes.clone())
                .returning(SessionRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(|e| RepositoryError::from(e).with_operation("update_session"))?
                .ok_or_else(|| Self::not_found("session", id.value(), "update_session"))?;
            stored.into_domain()
        })
        .await
    }

    async fn delete_session(&self, id: SessionId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let removed = diesel::delete(training_sessions::table.find(id.value()))
                .execute(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("delete_session"))?;
            if removed == 0 {
                return Err(Self::not_found("session", id.value(), "delete_session"));
            }
            Ok(())
        })
        .await
    }

    async fn sessions_for_slot(
        &self,
        venue_id: VenueId,
        date: NaiveDate,
        exclude_cancelled: bool,
    ) -> RepositoryResult<Vec<Session>> {
        self.with_conn(move |conn| {
            let mut query = training_sessions::table
                .filter(training_sessions::venue_id.eq(venue_id.value()))
                .filter(training_sessions::session_date.eq(date))
                .select(SessionRow::as_select())
                .into_boxed();
            if exclude_cancelled {
                query = query.filter(training_sessions::cancelled.eq(false));
            }
            let rows: Vec<SessionRow> = query
                .order((
                    training_sessions::start_time.asc(),
                    training_sessions::session_id.asc(),
                ))
                .load(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("sessions_for_slot"))?;
            rows.into_iter().map(SessionRow::into_domain).collect()
        })
        .await
    }

    async fn sessions_for_batch(&self, batch_id: BatchId) -> RepositoryResult<Vec<Session>> {
        self.with_conn(move |conn| {
            let rows: Vec<SessionRow> = training_sessions::table
                .filter(training_sessions::batch_id.eq(batch_id.value()))
                .order((
                    training_sessions::session_date.asc(),
                    training_sessions::start_time.asc(),
                    training_sessions::session_id.asc(),
                ))
                .select(SessionRow::as_select())
                .load(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("sessions_for_batch"))?;
            rows.into_iter().map(SessionRow::into_domain).collect()
        })
        .await
    }
}

#[async_trait]
impl HolidayRepository for PostgresRepository {
    async fn holidays_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        department_id: Option<DepartmentId>,
        batch_id: Option<BatchId>,
    ) -> RepositoryResult<Vec<Holiday>> {
        self.with_conn(move |conn| {
            // Scope filter composed from typed predicates; global records
            // always qualify.
            type Condition = Box<
                dyn BoxableExpression<holidays::table, diesel::pg::Pg, SqlType = diesel::sql_types::Bool>,
            >;
            let mut condition: Condition = Box::new(holidays::scope.eq(SCOPE_GLOBAL));
            if let Some(department) = department_id {
                condition = Box::new(condition.or(holidays::scope
                    .eq(SCOPE_DEPARTMENT)
                    .and(holidays::department_id.is_not_distinct_from(department.value()))));
            }
            if let Some(batch) = batch_id {
                condition = Box::new(condition.or(holidays::scope
                    .eq(SCOPE_BATCH)
                    .and(holidays::batch_id.is_not_distinct_from(batch.value()))));
            }

            let rows: Vec<HolidayRow> = holidays::table
                .filter(holidays::holiday_date.between(start, end))
                .filter(condition)
                .order((holidays::holiday_date.asc(), holidays::holiday_id.asc()))
                .select(HolidayRow::as_select())
                .load(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("holidays_in_range"))?;
            rows.into_iter().map(HolidayRow::into_domain).collect()
        })
        .await
    }

    async fn insert_holiday(&self, new_holiday: NewHoliday) -> RepositoryResult<Holiday> {
        let row = NewHolidayRow::from_domain(new_holiday);
        self.with_conn(move |conn| {
            let stored: HolidayRow = diesel::insert_into(holidays::table)
                .values(&row)
                .returning(HolidayRow::as_returning())
                .get_result(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("insert_holiday"))?;
            stored.into_domain()
        })
        .await
    }

    async fn delete_holiday(&self, id: HolidayId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let removed = diesel::delete(holidays::table.find(id.value()))
                .execute(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("delete_holiday"))?;
            if removed == 0 {
                return Err(Self::not_found("holiday", id.value(), "delete_holiday"));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl ReferenceRepository for PostgresRepository {
    async fn fetch_venue(&self, id: VenueId) -> RepositoryResult<Venue> {
        self.with_conn(move |conn| {
            let row: VenueRow = venues::table
                .find(id.value())
                .select(VenueRow::as_select())
                .first(conn)
                .optional()
                .map_err(|e| RepositoryError::from(e).with_operation("fetch_venue"))?
                .ok_or_else(|| Self::not_found("venue", id.value(), "fetch_venue"))?;
            Ok(row.into())
        })
        .await
    }

    async fn fetch_batch(&self, id: BatchId) -> RepositoryResult<TrainingBatch> {
        self.with_conn(move |conn| {
            let row: BatchRow = training_batches::table
                .find(id.value())
                .select(BatchRow::as_select())
                .first(conn)
                .optional()
                .map_err(|e| RepositoryError::from(e).with_operation("fetch_batch"))?
                .ok_or_else(|| Self::not_found("batch", id.value(), "fetch_batch"))?;
            Ok(row.into())
        })
        .await
    }

    async fn list_venues(&self) -> RepositoryResult<Vec<Venue>> {
        self.with_conn(move |conn| {
            let rows: Vec<VenueRow> = venues::table
                .order(venues::venue_name.asc())
                .select(VenueRow::as_select())
                .load(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("list_venues"))?;
            Ok(rows.into_iter().map(Venue::from).collect())
        })
        .await
    }

    async fn insert_venue(&self, venue: Venue) -> RepositoryResult<Venue> {
        let row = NewVenueRow {
            venue_id: venue.id.value(),
            venue_name: venue.name,
            room_label: venue.room,
            capacity: venue.capacity,
        };
        self.with_conn(move |conn| {
            let stored: VenueRow = diesel::insert_into(venues::table)
                .values(&row)
                .returning(VenueRow::as_returning())
                .get_result(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("insert_venue"))?;
            Ok(stored.into())
        })
        .await
    }

    async fn insert_batch(&self, batch: TrainingBatch) -> RepositoryResult<TrainingBatch> {
        let row = NewBatchRow {
            batch_id: batch.id.value(),
            batch_name: batch.name,
            department_id: batch.department_id.value(),
            academic_year: batch.academic_year,
            active: batch.active,
        };
        self.with_conn(move |conn| {
            let stored: BatchRow = diesel::insert_into(training_batches::table)
                .values(&row)
                .returning(BatchRow::as_returning())
                .get_result(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("insert_batch"))?;
            Ok(stored.into())
        })
        .await
    }
}

#[async_trait]
impl AttendanceRepository for PostgresRepository {
    async fn delete_attendance_by_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<usize> {
        self.with_conn(move |conn| {
            diesel::delete(
                attendance_records::table
                    .filter(attendance_records::session_id.eq(session_id.value())),
            )
            .execute(conn)
            .map_err(|e| RepositoryError::from(e).with_operation("delete_attendance_by_session"))
        })
        .await
    }

    async fn insert_attendance(
        &self,
        new_attendance: NewAttendance,
    ) -> RepositoryResult<AttendanceRecord> {
        let row = NewAttendanceRow {
            session_id: new_attendance.session_id.value(),
            student_id: new_attendance.student_id.value(),
            present: new_attendance.present,
        };
        self.with_conn(move |conn| {
            let stored: AttendanceRow = diesel::insert_into(attendance_records::table)
                .values(&row)
                .returning(AttendanceRow::as_returning())
                .get_result(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("insert_attendance"))?;
            Ok(stored.into())
        })
        .await
    }

    async fn attendance_for_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<Vec<AttendanceRecord>> {
        self.with_conn(move |conn| {
            let rows: Vec<AttendanceRow> = attendance_records::table
                .filter(attendance_records::session_id.eq(session_id.value()))
                .order(attendance_records::attendance_id.asc())
                .select(AttendanceRow::as_select())
                .load(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("attendance_for_session"))?;
            Ok(rows.into_iter().map(AttendanceRecord::from).collect())
        })
        .await
    }
}

#[async_trait]
impl FullRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(|e| RepositoryError::from(e).with_operation("health_check"))
        })
        .await
    }
}
