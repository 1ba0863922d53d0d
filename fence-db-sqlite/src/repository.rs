use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use fence_core::store::{ACTIVE_QUOTE_KEY, QUOTES_KEY, QuoteDocument};
use fence_core::{Quote, QuoteRepository, QuoteStatus, RepositoryError};
use sqlx::{Sqlite, SqliteConnection, Transaction, sqlite::SqlitePool};
use tracing::{debug, info};

/// Quote storage in a single SQLite key-value table.
///
/// The quote list is one JSON document under [`QUOTES_KEY`]; the active
/// quote id is a plain string under [`ACTIVE_QUOTE_KEY`]. Writes that read
/// the document first run inside a transaction.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn begin(&self) -> Result<Transaction<'static, Sqlite>, RepositoryError> {
        self.pool.begin().await.map_err(db_error)
    }

    async fn read_document(&self) -> Result<QuoteDocument, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        load_document(&mut conn).await
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

async fn get_value(
    conn: &mut SqliteConnection,
    key: &str,
) -> Result<Option<String>, RepositoryError> {
    sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
        .bind(key)
        .fetch_optional(conn)
        .await
        .map_err(db_error)
}

async fn put_value(
    conn: &mut SqliteConnection,
    key: &str,
    value: &str,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO kv_store (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
    .execute(conn)
    .await
    .map_err(db_error)?;
    Ok(())
}

async fn load_document(conn: &mut SqliteConnection) -> Result<QuoteDocument, RepositoryError> {
    let raw = get_value(conn, QUOTES_KEY).await?;
    Ok(raw
        .as_deref()
        .map(QuoteDocument::from_json)
        .unwrap_or_default())
}

async fn store_document(
    conn: &mut SqliteConnection,
    doc: &QuoteDocument,
) -> Result<(), RepositoryError> {
    let json = doc
        .to_json()
        .map_err(|e| RepositoryError::Database(format!("Failed to encode quotes: {e}")))?;
    put_value(conn, QUOTES_KEY, &json).await
}

#[async_trait]
impl QuoteRepository for SqliteRepository {
    async fn list_all(&self) -> Result<Vec<Quote>, RepositoryError> {
        let doc = self.read_document().await?;
        debug!(count = doc.quotes().len(), "listed quotes");
        Ok(doc.into_quotes())
    }

    async fn upsert(
        &self,
        quote: &Quote,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.begin().await?;
        let mut doc = load_document(&mut tx).await?;
        let replaced = doc.upsert(quote.clone());
        store_document(&mut tx, &doc).await?;
        tx.commit().await.map_err(db_error)?;

        debug!(id = %quote.id, replaced, "upserted quote");
        Ok(())
    }

    async fn get_by_id(
        &self,
        id: &str,
    ) -> Result<Option<Quote>, RepositoryError> {
        let doc = self.read_document().await?;
        Ok(doc.get(id).cloned())
    }

    async fn remove(
        &self,
        id: &str,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.begin().await?;
        let mut doc = load_document(&mut tx).await?;
        if doc.remove(id) {
            store_document(&mut tx, &doc).await?;
            info!(id, "deleted quote");
        }

        let active = get_value(&mut tx, ACTIVE_QUOTE_KEY).await?;
        if active.as_deref() == Some(id) {
            put_value(&mut tx, ACTIVE_QUOTE_KEY, "").await?;
            debug!(id, "cleared active quote");
        }

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn set_active(
        &self,
        id: &str,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        put_value(&mut conn, ACTIVE_QUOTE_KEY, id).await
    }

    async fn get_active(&self) -> Result<String, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        Ok(get_value(&mut conn, ACTIVE_QUOTE_KEY)
            .await?
            .unwrap_or_default())
    }

    async fn set_status(
        &self,
        id: &str,
        status: QuoteStatus,
    ) -> Result<Option<Quote>, RepositoryError> {
        let mut tx = self.begin().await?;
        let mut doc = load_document(&mut tx).await?;

        let Some(quote) = doc.get_mut(id) else {
            return Ok(None);
        };
        quote.status = status;
        quote.updated_at = Utc::now();
        let updated = quote.clone();

        store_document(&mut tx, &doc).await?;
        tx.commit().await.map_err(db_error)?;

        info!(id, %status, "changed quote status");
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use fence_core::{Customer, EstimateInputs, PricingConfig, Segment, Totals};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn setup_test_db() -> SqliteRepository {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        let repo = SqliteRepository::new_with_pool(pool).await;
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    async fn put_raw(
        repo: &SqliteRepository,
        key: &str,
        value: &str,
    ) {
        sqlx::query("INSERT INTO kv_store (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(repo.pool())
            .await
            .expect("Failed to insert raw value");
    }

    fn test_quote(id: &str) -> Quote {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap();
        Quote {
            id: id.to_string(),
            created_at: at,
            updated_at: at,
            status: QuoteStatus::Pending,
            title: "Smith — 120 LF".to_string(),
            notes: "gate by garage".to_string(),
            customer: Customer {
                name: "Smith".to_string(),
                phone: "231-555-0100".to_string(),
                ..Default::default()
            },
            inputs: EstimateInputs {
                segments: vec![
                    Segment::new("seg_1", "A-B", Some(dec!(80))),
                    Segment::new("seg_2", "B-C", Some(dec!(40))),
                    Segment::new("seg_3", "C-D", None),
                ],
                gates_walk: 1,
                ..Default::default()
            },
            pricing: PricingConfig::default(),
            totals: Totals {
                total_lf: dec!(120),
                labor_hours: dec!(10.77),
                labor_cost: dec!(807.75),
                material_cost: dec!(3600),
                total: dec!(5107.75),
            },
        }
    }

    fn ids(quotes: &[Quote]) -> Vec<&str> {
        quotes.iter().map(|q| q.id.as_str()).collect()
    }

    // =========================================================================
    // list / upsert / get
    // =========================================================================

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let repo = setup_test_db().await;

        let quotes = repo.list_all().await.expect("Should list quotes");

        assert!(quotes.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_then_get_returns_equal_record() {
        let repo = setup_test_db().await;
        let quote = test_quote("est_1");

        repo.upsert(&quote).await.expect("Should upsert");
        let found = repo.get_by_id("est_1").await.expect("Should read");

        assert_eq!(found, Some(quote));
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_none() {
        let repo = setup_test_db().await;
        repo.upsert(&test_quote("est_1")).await.unwrap();

        assert_eq!(repo.get_by_id("est_missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_new_quotes_are_listed_first() {
        let repo = setup_test_db().await;
        repo.upsert(&test_quote("est_1")).await.unwrap();
        repo.upsert(&test_quote("est_2")).await.unwrap();

        let quotes = repo.list_all().await.unwrap();

        assert_eq!(ids(&quotes), vec!["est_2", "est_1"]);
    }

    #[tokio::test]
    async fn test_second_upsert_replaces_in_place() {
        let repo = setup_test_db().await;
        repo.upsert(&test_quote("est_1")).await.unwrap();
        repo.upsert(&test_quote("est_2")).await.unwrap();

        let mut changed = test_quote("est_1");
        changed.notes = "moved gate".to_string();
        repo.upsert(&changed).await.unwrap();

        let quotes = repo.list_all().await.unwrap();
        assert_eq!(ids(&quotes), vec!["est_2", "est_1"]);
        assert_eq!(quotes[1].notes, "moved gate");
    }

    // =========================================================================
    // remove / active pointer
    // =========================================================================

    #[tokio::test]
    async fn test_active_is_empty_until_set() {
        let repo = setup_test_db().await;

        assert_eq!(repo.get_active().await.unwrap(), "");

        repo.set_active("est_9").await.unwrap();
        assert_eq!(repo.get_active().await.unwrap(), "est_9");
    }

    #[tokio::test]
    async fn test_remove_deletes_record() {
        let repo = setup_test_db().await;
        repo.upsert(&test_quote("est_1")).await.unwrap();

        repo.remove("est_1").await.expect("Should remove");

        assert_eq!(repo.get_by_id("est_1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_unknown_id_is_noop() {
        let repo = setup_test_db().await;
        repo.upsert(&test_quote("est_1")).await.unwrap();

        repo.remove("est_missing").await.expect("Should not fail");

        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_removing_active_quote_clears_pointer() {
        let repo = setup_test_db().await;
        repo.upsert(&test_quote("est_1")).await.unwrap();
        repo.set_active("est_1").await.unwrap();

        repo.remove("est_1").await.unwrap();

        assert_eq!(repo.get_active().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_removing_other_quote_keeps_pointer() {
        let repo = setup_test_db().await;
        repo.upsert(&test_quote("est_1")).await.unwrap();
        repo.upsert(&test_quote("est_2")).await.unwrap();
        repo.set_active("est_1").await.unwrap();

        repo.remove("est_2").await.unwrap();

        assert_eq!(repo.get_active().await.unwrap(), "est_1");
    }

    // =========================================================================
    // status
    // =========================================================================

    #[tokio::test]
    async fn test_set_status_bumps_updated_at_and_keeps_position() {
        let repo = setup_test_db().await;
        let original = test_quote("est_1");
        repo.upsert(&original).await.unwrap();
        repo.upsert(&test_quote("est_2")).await.unwrap();

        let updated = repo
            .set_status("est_1", QuoteStatus::Void)
            .await
            .unwrap()
            .expect("Quote should exist");

        assert_eq!(updated.status, QuoteStatus::Void);
        assert!(updated.updated_at > original.updated_at);
        assert_eq!(updated.created_at, original.created_at);

        let quotes = repo.list_all().await.unwrap();
        assert_eq!(ids(&quotes), vec!["est_2", "est_1"]);
        assert_eq!(quotes[1].status, QuoteStatus::Void);
    }

    #[tokio::test]
    async fn test_set_status_unknown_id_is_none() {
        let repo = setup_test_db().await;

        let result = repo.set_status("est_missing", QuoteStatus::Sold).await;

        assert_eq!(result, Ok(None));
    }

    // =========================================================================
    // stored data compatibility
    // =========================================================================

    #[tokio::test]
    async fn test_corrupt_document_lists_as_empty() {
        let repo = setup_test_db().await;
        put_raw(&repo, QUOTES_KEY, "{{{ definitely not json").await;

        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_overwritten_on_save() {
        let repo = setup_test_db().await;
        put_raw(&repo, QUOTES_KEY, "not json").await;

        repo.upsert(&test_quote("est_1")).await.unwrap();

        assert_eq!(ids(&repo.list_all().await.unwrap()), vec!["est_1"]);
    }

    #[tokio::test]
    async fn test_browser_array_is_read_and_upgraded_on_write() {
        let repo = setup_test_db().await;
        put_raw(
            &repo,
            QUOTES_KEY,
            r#"[{"id":"q_old","createdAt":"2024-09-01T10:00:00.000Z","updatedAt":"2024-09-01T10:00:00.000Z",
                 "status":"sold","segments":[{"id":"s1","name":"A-B","lengthFt":250}],
                 "totals":{"totalLf":250,"laborHours":19.3,"laborCost":1448.07,"materialCost":7500,"total":9648.07}}]"#,
        )
        .await;

        let old = repo.get_by_id("q_old").await.unwrap().expect("Should migrate");
        assert_eq!(old.status, QuoteStatus::Sold);
        assert_eq!(old.totals.material_cost, dec!(7500));

        repo.upsert(&test_quote("est_1")).await.unwrap();

        let raw: String = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
            .bind(QUOTES_KEY)
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert!(raw.starts_with(r#"{"version":2"#));
        assert_eq!(ids(&repo.list_all().await.unwrap()), vec!["est_1", "q_old"]);
    }
}
