use async_trait::async_trait;
use tracing::debug;

use fence_core::db::repository::{QuoteRepository, RepositoryError};
use fence_core::db::{DbConfig, RepositoryFactory};

use crate::repository::SqliteRepository;

/// Map a connection string to a sqlx URL.
///
/// * `":memory:"` (or empty) becomes an ephemeral in-memory database.
/// * Strings already starting with `sqlite:` are passed through.
/// * Anything else is a file path, created if it does not exist.
pub fn database_url(connection_string: &str) -> String {
    let trimmed = connection_string.trim();
    if trimmed.is_empty() || trimmed == ":memory:" {
        "sqlite::memory:".to_string()
    } else if trimmed.starts_with("sqlite:") {
        trimmed.to_string()
    } else {
        format!("sqlite:{trimmed}?mode=rwc")
    }
}

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`fence_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use fence_core::db::RepositoryRegistry;
/// use fence_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` (see
    /// [`database_url`]) and bring its schema up to date.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn QuoteRepository>, RepositoryError> {
        let url = database_url(&config.connection_string);
        debug!(%url, "opening sqlite quote store");

        let repo = SqliteRepository::new(&url)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        Ok(Box::new(repo))
    }
}
