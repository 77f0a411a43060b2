//! Postgres-backed event store.

use std::time::Duration;

use async_trait::async_trait;
use forgefeed_common::{Action, Event, NewEvent};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::warn;

use crate::error::StoreError;

/// How many events the feed serves when the caller does not say otherwise.
pub const DEFAULT_RECENT_LIMIT: i64 = 20;

/// Append-only log of normalized repository events.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends one event and returns its store-assigned id. Every call
    /// writes a new row; duplicates are the caller's problem.
    async fn append(&self, event: NewEvent) -> Result<i64, StoreError>;

    /// Returns up to `limit` events, newest first by receipt timestamp.
    /// Events sharing a timestamp come back newest-inserted first.
    async fn recent(&self, limit: i64) -> Result<Vec<Event>, StoreError>;

    /// Total number of stored events.
    async fn count(&self) -> Result<i64, StoreError>;

    /// The earliest stored event, if any. Diagnostic use only.
    async fn sample(&self) -> Result<Option<Event>, StoreError>;
}

/// `EventStore` on a Postgres pool.
#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds a store on a lazy pool. No connection is attempted here, so
    /// this succeeds even when the database is down; the first query pays
    /// the price instead.
    pub fn connect_lazy(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy(database_url)
            .map_err(StoreError::from)?;
        Ok(Self { pool })
    }

    /// Creates the events table and its feed index if they do not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                id          BIGSERIAL PRIMARY KEY,
                request_id  TEXT NOT NULL,
                author      TEXT NOT NULL,
                action      TEXT NOT NULL,
                from_branch TEXT NOT NULL DEFAULT '',
                to_branch   TEXT NOT NULL,
                ts          TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS events_ts_idx ON events (ts DESC, id DESC)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Decodes one row into an `Event`. Rows whose action text no longer parses
/// (hand-edited or written by a newer deployment) are skipped with a warning
/// rather than failing the whole read.
fn event_from_row(row: &PgRow) -> Result<Option<Event>, sqlx::Error> {
    let id: i64 = row.try_get("id")?;
    let action_text: String = row.try_get("action")?;
    let Some(action) = Action::parse(&action_text) else {
        warn!(id, action = %action_text, "skipping stored event with unknown action");
        return Ok(None);
    };
    Ok(Some(Event {
        id,
        request_id: row.try_get("request_id")?,
        author: row.try_get("author")?,
        action,
        from_branch: row.try_get("from_branch")?,
        to_branch: row.try_get("to_branch")?,
        timestamp: row.try_get("ts")?,
    }))
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn append(&self, event: NewEvent) -> Result<i64, StoreError> {
        let row = sqlx::query_as::<_, (i64,)>(
            r#"
            INSERT INTO events (request_id, author, action, from_branch, to_branch, ts)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&event.request_id)
        .bind(&event.author)
        .bind(event.action.as_str())
        .bind(&event.from_branch)
        .bind(&event.to_branch)
        .bind(event.timestamp)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<Event>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, request_id, author, action, from_branch, to_branch, ts
            FROM events
            ORDER BY ts DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(event) = event_from_row(row)? {
                events.push(event);
            }
        }
        Ok(events)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let row = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    async fn sample(&self) -> Result<Option<Event>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, request_id, author, action, from_branch, to_branch, ts
            FROM events
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(event_from_row(&row)?),
            None => Ok(None),
        }
    }
}
