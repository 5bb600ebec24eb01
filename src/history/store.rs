use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    ConnectOptions, Row, SqlitePool,
};
use tracing::debug;

use super::HistoryError;

/// A persisted lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub id: i64,
    pub address: String,
    pub bandwidth: Option<f64>,
    pub energy: Option<f64>,
    pub balance: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// A lookup about to be persisted, id and timestamp are assigned on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryRecord {
    pub address: String,
    pub bandwidth: Option<f64>,
    pub energy: Option<f64>,
    pub balance: Option<f64>,
}

fn record_from_row(row: &SqliteRow) -> Result<HistoryRecord, sqlx::Error> {
    let timestamp: NaiveDateTime = row.try_get("timestamp")?;
    Ok(HistoryRecord {
        id: row.try_get("id")?,
        address: row.try_get("address")?,
        bandwidth: row.try_get("bandwidth")?,
        energy: row.try_get("energy")?,
        balance: row.try_get("balance")?,
        timestamp: Utc.from_utc_datetime(&timestamp),
    })
}

/// Append-only table of lookups.
#[derive(Clone)]
pub struct HistoryStore {
    pool: SqlitePool,
}

impl HistoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        log_statements: bool,
    ) -> Result<Self, HistoryError> {
        let mut connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        if !log_statements {
            connect_opts = connect_opts.disable_statement_logging();
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_opts)
            .await?;

        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> Result<(), HistoryError> {
        // the timestamp default keeps millisecond precision and a fixed width so
        // that text ordering equals chronological ordering
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS history (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                address     VARCHAR(42) NOT NULL CHECK (length(address) <= 42),
                bandwidth   REAL,
                energy      REAL,
                balance     REAL,
                timestamp   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS history_timestamp_idx
            ON history (timestamp DESC, id DESC)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert(&self, record: &NewHistoryRecord) -> Result<i64, HistoryError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO history (address, bandwidth, energy, balance)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&record.address)
        .bind(record.bandwidth)
        .bind(record.energy)
        .bind(record.balance)
        .fetch_one(&mut *tx)
        .await?;

        // dropping the transaction on any error above rolls it back
        tx.commit().await?;

        debug!(id, address = %record.address, "inserted history record");

        Ok(id)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<HistoryRecord, HistoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, address, bandwidth, energy, balance, timestamp
            FROM history
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(HistoryError::NotFound(id))?;

        record_from_row(&row).map_err(Into::into)
    }

    /// Newest first. Ties on timestamp are ordered by id so pages never overlap.
    pub async fn list_page(&self, offset: i64, limit: i64) -> Result<Vec<HistoryRecord>, HistoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, address, bandwidth, energy, balance, timestamp
            FROM history
            ORDER BY timestamp DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Removes every record. Not used by the service itself.
    pub async fn truncate(&self) -> Result<u64, HistoryError> {
        sqlx::query("DELETE FROM history")
            .execute(&self.pool)
            .await
            .map(|result| result.rows_affected())
            .map_err(Into::into)
    }

    pub async fn ping(&self) -> Result<(), HistoryError> {
        self.pool.acquire().await?;
        Ok(())
    }
}
