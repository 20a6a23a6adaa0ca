//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::scheduler::Scheduler;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for read paths
    pub repository: Arc<dyn FullRepository>,
    /// The scheduling engine for all mutations
    pub scheduler: Arc<Scheduler>,
}

impl AppState {
    /// Create a new application state around the given repository.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        let scheduler = Arc::new(Scheduler::new(Arc::clone(&repository)));
        Self {
            repository,
            scheduler,
        }
    }
}
