use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CreatorFilter, CreatorRecord, SortKey, TagFields};

/// Errors that can occur when reading from the creator store
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Seed file error: {0}")]
    SeedError(String),

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error("Repository unavailable: {0}")]
    Unavailable(String),
}

/// Read contract of the creator store
///
/// Implementations must honor every field of [`CreatorFilter`] and apply the
/// sort keys in order. The engine never writes through this trait.
#[async_trait]
pub trait CreatorRepository: Send + Sync {
    /// Ordered, paginated lookup
    async fn find(
        &self,
        filter: &CreatorFilter,
        order: &[SortKey],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CreatorRecord>, RepositoryError>;

    async fn count(&self, filter: &CreatorFilter) -> Result<u64, RepositoryError>;

    /// Id and tag-bearing fields of up to `cap` matching creators
    async fn find_tag_fields(
        &self,
        filter: &CreatorFilter,
        cap: usize,
    ) -> Result<Vec<TagFields>, RepositoryError> {
        let rows = self.find(filter, &[SortKey::IdAsc], cap, 0).await?;
        Ok(rows.iter().map(CreatorRecord::tag_fields).collect())
    }

    /// Creators the user has marked as favorites
    async fn find_favorites(&self, user_id: &str) -> Result<Vec<CreatorRecord>, RepositoryError>;

    async fn health_check(&self) -> Result<bool, RepositoryError> {
        Ok(true)
    }
}
