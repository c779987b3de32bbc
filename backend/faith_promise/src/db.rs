//! Database layer: migrations, pledge writes and reads, and the SQLite
//! submission sink.

use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::{debug, info};

use crate::errors::{Result, SubmissionError};
use crate::form::PledgeRecord;
use crate::sink::SubmissionSink;

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    connect(database_url, 5).await
}

pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    // `mode=rwc` creates the file on first start.
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };
    let url = if url.contains(":memory:") || url.contains('?') {
        url
    } else {
        format!("{url}?mode=rwc")
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(&url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

/// A pledge as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PledgeRow {
    pub id: i64,
    pub full_name: String,
    pub faith_promise: String,
    pub amount: i64,
    pub payment_method: String,
    pub proof_of_transfer: Option<String>,
    pub submitted_at: i64,
    pub created_at: i64,
}

// ─────────────────────────────────────────────────────────
// Writes
// ─────────────────────────────────────────────────────────

/// Persist one pledge, returning its row id.
pub async fn insert_pledge(
    pool: &SqlitePool,
    record: &PledgeRecord,
) -> std::result::Result<i64, SubmissionError> {
    // The column is an INTEGER; wider amounts are refused by this sink only.
    let amount: i64 = record.faith_promise.parse().map_err(|_| {
        SubmissionError::Rejected(format!("amount {} does not fit the ledger", record.faith_promise))
    })?;

    let id = sqlx::query(
        r#"
        INSERT INTO pledges
            (full_name, faith_promise, amount, payment_method, proof_of_transfer, submitted_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&record.full_name)
    .bind(&record.faith_promise)
    .bind(amount)
    .bind(record.payment_method.as_str())
    .bind(&record.proof_of_transfer)
    .bind(record.submitted_at.timestamp())
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

// ─────────────────────────────────────────────────────────
// Reads
// ─────────────────────────────────────────────────────────

/// Fetch all pledges, oldest first.
pub async fn get_all_pledges(pool: &SqlitePool) -> Result<Vec<PledgeRow>> {
    let rows = sqlx::query_as::<_, PledgeRow>(
        r#"
        SELECT id, full_name, faith_promise, amount, payment_method,
               proof_of_transfer, submitted_at, created_at
        FROM   pledges
        ORDER  BY submitted_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ─────────────────────────────────────────────────────────
// Sink
// ─────────────────────────────────────────────────────────

/// Records pledges in the local SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteSink {
    pool: SqlitePool,
}

impl SqliteSink {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl SubmissionSink for SqliteSink {
    async fn submit(&self, record: &PledgeRecord) -> std::result::Result<(), SubmissionError> {
        let id = insert_pledge(&self.pool, record).await?;
        debug!("Stored pledge #{id}");
        Ok(())
    }
}
