//! Reference-data repository trait (venues and batches).
//!
//! Venues and training batches are owned by the wider admin application.
//! The scheduler only reads them; the insert operations exist for
//! bootstrap and test seeding.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{BatchId, VenueId};
use crate::models::session::{TrainingBatch, Venue};

/// Repository trait for venue and batch lookups.
#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    /// Fetch a venue by id.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` if the id does not exist
    async fn fetch_venue(&self, id: VenueId) -> RepositoryResult<Venue>;

    /// Fetch a training batch by id.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` if the id does not exist
    async fn fetch_batch(&self, id: BatchId) -> RepositoryResult<TrainingBatch>;

    /// All venues, ordered by name.
    async fn list_venues(&self) -> RepositoryResult<Vec<Venue>>;

    /// Insert a venue with its externally assigned id (bootstrap/seeding).
    async fn insert_venue(&self, venue: Venue) -> RepositoryResult<Venue>;

    /// Insert a training batch with its externally assigned id
    /// (bootstrap/seeding).
    async fn insert_batch(&self, batch: TrainingBatch) -> RepositoryResult<TrainingBatch>;
}
