//! Persistence of fetched quotations.
//!
//! `QuotationStore` is the seam the request handler writes through; the
//! production implementation is `SqliteStore`, which opens a fresh connection
//! for every write and appends one row per call. Rows are never updated or
//! deleted here: `updated_at` equals `created_at` and `deleted_at` stays NULL.
//!
//! A write either commits its row or reports an error, never both. The
//! deadline bounds connecting and staging the insert inside a transaction;
//! once staged, the commit is awaited to completion. Expiry before the commit
//! drops the transaction, which rolls the insert back.
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use log::{debug, warn};
use quotation_common::{Quotation, QuotationError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteQueryResult, SqliteRow};
use tokio::time::Instant;
use sqlx::{ConnectOptions, Connection, Row, Sqlite, Transaction};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS quotations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL,
    codein TEXT NOT NULL,
    name TEXT NOT NULL,
    high TEXT NOT NULL,
    low TEXT NOT NULL,
    var_bid TEXT NOT NULL,
    pct_change TEXT NOT NULL,
    bid TEXT NOT NULL,
    ask TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    create_date TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_quotations_deleted_at ON quotations (deleted_at);
"#;

const INSERT: &str = "INSERT INTO quotations \
    (code, codein, name, high, low, var_bid, pct_change, bid, ask, timestamp, create_date, created_at, updated_at) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

const SELECT_LIVE: &str = "SELECT id, code, codein, name, high, low, var_bid, pct_change, bid, ask, \
    timestamp, create_date, created_at, updated_at, deleted_at \
    FROM quotations WHERE deleted_at IS NULL ORDER BY id";

/// Append-only sink for fetched quotations.
#[async_trait]
pub trait QuotationStore: Send + Sync {
    /// Store one quotation as a new record.
    ///
    /// Returning `Err` means no record was stored. Work up to the point where
    /// the record becomes durable is bounded by `deadline`.
    async fn insert(&self, quotation: &Quotation, deadline: WriteDeadline) -> Result<()>;
}

/// Budget of a single write, started when the write begins.
#[derive(Debug, Clone, Copy)]
pub struct WriteDeadline {
    budget: Duration,
    expiry: Instant,
}

impl WriteDeadline {
    /// Start a budget of `budget` from now.
    pub fn start(budget: Duration) -> Self {
        Self {
            budget,
            expiry: Instant::now() + budget,
        }
    }

    /// Run `fut` unless the budget runs out first; expiry drops `fut` and
    /// reports `QuotationError::Storage`.
    pub async fn bound<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout_at(self.expiry, fut)
            .await
            .map_err(|_| QuotationError::Storage(QuotationError::deadline_message(self.budget)))?
    }
}

/// Write `quotation` through `store` under a fresh `deadline`.
pub async fn persist(
    store: &dyn QuotationStore,
    quotation: &Quotation,
    deadline: Duration,
) -> Result<()> {
    store.insert(quotation, WriteDeadline::start(deadline)).await
}

/// Stored form of a quotation: the wire fields plus identity and audit columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotationRecord {
    /// Generated row identifier.
    pub id: i64,
    /// Stored quotation fields.
    pub quotation: Quotation,
    /// Insert instant, RFC 3339 UTC.
    pub created_at: String,
    /// Last update instant; equal to `created_at` since rows are never mutated.
    pub updated_at: String,
    /// Soft-delete marker.
    pub deleted_at: Option<String>,
}

/// SQLite-backed store opening one connection per operation.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
    options: SqliteConnectOptions,
}

impl SqliteStore {
    /// Store backed by the database file at `path`, created on first connect.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .log_statements(log::LevelFilter::Debug);
        Self { path, options }
    }

    /// Database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(&self) -> Result<SqliteConnection> {
        self.options.connect().await.map_err(storage_error)
    }

    /// Create the `quotations` table and its index when missing.
    pub async fn migrate(&self) -> Result<()> {
        let mut conn = self.connect().await?;
        sqlx::raw_sql(SCHEMA)
            .execute(&mut conn)
            .await
            .map_err(storage_error)?;
        conn.close().await.map_err(storage_error)
    }

    /// All records that are not soft-deleted, oldest first.
    pub async fn records(&self) -> Result<Vec<QuotationRecord>> {
        let mut conn = self.connect().await?;
        let rows = sqlx::query(SELECT_LIVE)
            .fetch_all(&mut conn)
            .await
            .map_err(storage_error)?;
        conn.close().await.map_err(storage_error)?;

        rows.iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(storage_error)
    }
}

#[async_trait]
impl QuotationStore for SqliteStore {
    async fn insert(&self, quotation: &Quotation, deadline: WriteDeadline) -> Result<()> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut conn = deadline.bound(self.connect()).await?;
        let mut tx = deadline.bound(begin_write(&mut conn)).await?;
        let result = deadline
            .bound(async { insert_row(&mut tx, quotation, &now).await.map_err(storage_error) })
            .await?;

        // Not bounded: past this point the row may already be durable.
        tx.commit().await.map_err(storage_error)?;
        debug!("Stored quotation record {}", result.last_insert_rowid());

        if let Err(e) = conn.close().await {
            warn!("Failed to close storage connection after commit: {}", e);
        }
        Ok(())
    }
}

async fn begin_write(conn: &mut SqliteConnection) -> Result<Transaction<'_, Sqlite>> {
    conn.begin().await.map_err(storage_error)
}

async fn insert_row(
    conn: &mut SqliteConnection,
    quotation: &Quotation,
    now: &str,
) -> Result<SqliteQueryResult, sqlx::Error> {
    sqlx::query(INSERT)
        .bind(quotation.code.as_str())
        .bind(quotation.base_code.as_str())
        .bind(quotation.display_name.as_str())
        .bind(quotation.high.as_str())
        .bind(quotation.low.as_str())
        .bind(quotation.variation.as_str())
        .bind(quotation.percent_change.as_str())
        .bind(quotation.bid.as_str())
        .bind(quotation.ask.as_str())
        .bind(quotation.timestamp.as_str())
        .bind(quotation.create_date.as_str())
        .bind(now)
        .bind(now)
        .execute(conn)
        .await
}

fn record_from_row(r: &SqliteRow) -> Result<QuotationRecord, sqlx::Error> {
    Ok(QuotationRecord {
        id: r.try_get("id")?,
        quotation: Quotation {
            code: r.try_get("code")?,
            base_code: r.try_get("codein")?,
            display_name: r.try_get("name")?,
            high: r.try_get("high")?,
            low: r.try_get("low")?,
            variation: r.try_get("var_bid")?,
            percent_change: r.try_get("pct_change")?,
            bid: r.try_get("bid")?,
            ask: r.try_get("ask")?,
            timestamp: r.try_get("timestamp")?,
            create_date: r.try_get("create_date")?,
        },
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
        deleted_at: r.try_get("deleted_at")?,
    })
}

fn storage_error(err: sqlx::Error) -> QuotationError {
    QuotationError::Storage(err.to_string())
}
