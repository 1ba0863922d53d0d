use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Quote, QuoteStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Durable storage for saved quotes and the active quote pointer.
///
/// Reads are fail-soft: a store holding corrupt data lists as empty rather
/// than returning an error. Errors are reserved for the storage medium
/// itself being unreachable or refusing a write.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Every saved quote, most recently created first.
    async fn list_all(&self) -> Result<Vec<Quote>, RepositoryError>;

    /// Replaces the quote with the same id in place, or prepends it.
    async fn upsert(
        &self,
        quote: &Quote,
    ) -> Result<(), RepositoryError>;

    async fn get_by_id(
        &self,
        id: &str,
    ) -> Result<Option<Quote>, RepositoryError>;

    /// Deletes the quote. Clears the active pointer if it named `id`.
    /// Removing an unknown id is not an error.
    async fn remove(
        &self,
        id: &str,
    ) -> Result<(), RepositoryError>;

    async fn set_active(
        &self,
        id: &str,
    ) -> Result<(), RepositoryError>;

    /// The active quote id, or an empty string when none is set.
    async fn get_active(&self) -> Result<String, RepositoryError>;

    /// Changes a quote's status and bumps its `updated_at`, keeping its
    /// position in the list. Returns `None` when no quote has `id`.
    async fn set_status(
        &self,
        id: &str,
        status: QuoteStatus,
    ) -> Result<Option<Quote>, RepositoryError>;
}
