//! # Trainsched
//!
//! Training-session scheduling core for the college training platform.
//!
//! This crate implements the scheduling authority that assigns time-boxed
//! training sessions to venues and batches: overlap-safe booking, recurring
//! series generation, and holiday calendars with scoped precedence and
//! manual override. The admin frontend consumes it through a REST API
//! exposed via Axum.
//!
//! ## Features
//!
//! - **Interval model**: half-open time intervals with a single overlap rule
//! - **Holiday resolution**: batch > department > global scope precedence
//! - **Conflict checking**: venue-exclusive booking per date and time range
//! - **Recurrence**: single / daily / weekly series expansion
//! - **Orchestration**: create, update, cancel/restore and delete sessions
//!   with structured outcomes instead of exceptions
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Typed identifiers and value types shared across layers
//! - [`models`]: Pure value logic (intervals, sessions, holidays)
//! - [`scheduler`]: The scheduling engine and its collaborators
//! - [`db`]: Repository pattern and persistence backends
//! - [`http`]: Axum-based HTTP server and request handlers
//!

// Allow large error types - RepositoryError carries rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod models;

pub mod scheduler;

#[cfg(feature = "http-server")]
pub mod http;
