//! Training-session scheduling engine.
//!
//! This module is the single scheduling authority of the platform. It
//! combines four collaborators, leaves first:
//!
//! - [`crate::models::interval`]: the overlap predicate
//! - [`holiday`]: scoped holiday resolution over a pre-fetched calendar
//! - [`conflict`]: venue/date conflict detection
//! - [`recurrence`]: cadence expansion for recurring series
//!
//! [`engine::Scheduler`] orchestrates them against the session store.
//! Blocked holidays and venue conflicts are structured outcomes, not
//! errors; the caller decides whether to resubmit with an override or
//! pick another slot.

pub mod conflict;
pub mod engine;
pub mod holiday;
pub mod recurrence;

pub use conflict::find_conflicts;
pub use engine::{
    AuthContext, CreateRecurringRequest, CreateSessionRequest, RecurrenceReport, ScheduleOutcome,
    Scheduler, SchedulingError, SessionUpdate, ToggleOutcome,
};
pub use holiday::HolidayCalendar;
pub use recurrence::{expand, Cadence, InvalidRecurrence};
