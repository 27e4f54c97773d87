//! Access to the daily measurements table.
//!
//! Raw measurements live in a single `daily_values` table with one row per
//! reservoir, category (`level` or `volume`), timestamp and value. This module
//! provides [`ReadingStore`], the seam used by the HTTP layer, and
//! [`SqlReadingStore`], its implementation over a `sqlx` connection pool.
//!
//! The count query and the page query are built from the same filter
//! predicate, so `total_counts` always describes the rows that paging walks
//! through.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::any::AnyPoolOptions;
use sqlx::{AnyPool, Connection, FromRow};

use crate::config::StorageConfig;
use crate::error::{ReadError, ReadStage, Result, StoreError};
use crate::reading::{DailyReading, Page, ReadingFilter};

/// Predicate shared by every query over `daily_values`.
///
/// Binds, in order: reservoir id, first day, last day (inclusive).
macro_rules! reading_filter {
    () => {
        "reservoir_id = ? AND category IN ('level', 'volume') AND `date` BETWEEN ? AND ?"
    };
}

const COUNT_DAYS_SQL: &str = concat!(
    "SELECT COUNT(DISTINCT DATE(`date`)) FROM daily_values WHERE ",
    reading_filter!()
);

// Casts keep the result types portable across drivers: MySQL returns DATE
// and DECIMAL otherwise.
const PAGE_SQL: &str = concat!(
    "SELECT CAST(DATE(`date`) AS CHAR) AS day, ",
    "CAST(MAX(CASE WHEN category = 'level' THEN `value` END) AS DOUBLE) AS level, ",
    "CAST(MAX(CASE WHEN category = 'volume' THEN `value` END) AS DOUBLE) AS volume ",
    "FROM daily_values WHERE ",
    reading_filter!(),
    " GROUP BY day ORDER BY day LIMIT ? OFFSET ?"
);

/// Read access to pivoted daily readings.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Number of distinct days matched by `filter`.
    async fn count_distinct_days(&self, filter: &ReadingFilter) -> Result<i64>;

    /// One page of readings matched by `filter`, ascending by day.
    ///
    /// A page past the last matching day is empty, not an error.
    async fn fetch_page(&self, filter: &ReadingFilter, page: Page) -> Result<Vec<DailyReading>>;
}

/// Result of [`read_with_deadline`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingPage {
    /// Distinct days matched by the filter, independent of paging.
    pub total: i64,
    /// Readings on the requested page.
    pub readings: Vec<DailyReading>,
}

/// Run the count and page queries under a single deadline.
///
/// If `deadline` elapses first, the in-flight query is dropped and a
/// [`StoreError::Timeout`] is returned. Either way the error records which
/// query was running.
pub async fn read_with_deadline(
    store: &dyn ReadingStore,
    filter: &ReadingFilter,
    page: Page,
    deadline: Duration,
) -> std::result::Result<ReadingPage, ReadError> {
    let mut stage = ReadStage::Count;
    let outcome = tokio::time::timeout(deadline, async {
        let total = store.count_distinct_days(filter).await?;
        stage = ReadStage::Page;
        let readings = store.fetch_page(filter, page).await?;
        Ok::<_, StoreError>(ReadingPage { total, readings })
    })
    .await;

    match outcome {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(source)) => Err(ReadError { stage, source }),
        Err(_) => Err(ReadError {
            stage,
            source: StoreError::Timeout(deadline),
        }),
    }
}

#[derive(Debug, FromRow)]
struct PivotRow {
    day: String,
    level: Option<f64>,
    volume: Option<f64>,
}

impl From<PivotRow> for DailyReading {
    fn from(row: PivotRow) -> Self {
        Self {
            date: row.day,
            level: row.level.unwrap_or_default(),
            volume: row.volume.unwrap_or_default(),
        }
    }
}

/// [`ReadingStore`] backed by a SQL connection pool.
///
/// The pool is safe to share between concurrent requests; clone the store
/// or wrap it in an `Arc`.
#[derive(Debug, Clone)]
pub struct SqlReadingStore {
    pool: AnyPool,
}

impl SqlReadingStore {
    /// Open a connection pool and verify the database is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be established or the
    /// connectivity check fails.
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.connection_url()?)
            .await?;

        let store = Self::from_pool(pool);
        store.ping().await?;
        Ok(store)
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Check out a connection and ping the server.
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await?;
        Ok(())
    }

    /// Close every pooled connection. Waits for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// The underlying pool.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

#[async_trait]
impl ReadingStore for SqlReadingStore {
    async fn count_distinct_days(&self, filter: &ReadingFilter) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(COUNT_DAYS_SQL)
            .bind(filter.reservoir_id)
            .bind(filter.date_from.as_str())
            .bind(filter.date_to.as_str())
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(
            reservoir_id = filter.reservoir_id,
            date_from = %filter.date_from,
            date_to = %filter.date_to,
            count = count,
            "Counted distinct days"
        );
        Ok(count)
    }

    async fn fetch_page(&self, filter: &ReadingFilter, page: Page) -> Result<Vec<DailyReading>> {
        let rows: Vec<PivotRow> = sqlx::query_as(PAGE_SQL)
            .bind(filter.reservoir_id)
            .bind(filter.date_from.as_str())
            .bind(filter.date_to.as_str())
            .bind(page.per_page())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            reservoir_id = filter.reservoir_id,
            page = page.number(),
            per_page = page.per_page(),
            rows = rows.len(),
            "Fetched reading page"
        );
        Ok(rows.into_iter().map(DailyReading::from).collect())
    }
}
