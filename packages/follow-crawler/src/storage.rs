//! Durable graph store backed by a single SQLite file.
//!
//! Holds the known accounts, the directed follow edges observed between
//! them, and one aggregate stats row per completed cycle. All writes go
//! through transactions so a killed run can never leave an edge without
//! both of its endpoints.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use twitter_client::TwitterUser;

use crate::error::StorageResult;

/// An aggregate sample of the graph size at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSample {
    pub timestamp: DateTime<Utc>,
    pub user_count: i64,
    pub following_count: i64,
}

/// Storage interface for the crawl cycle (to allow mocking).
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Select the account to refresh next: oldest snapshot first, ties
    /// broken uniformly at random. `None` when the store is empty.
    async fn pick_frontier(&self) -> StorageResult<Option<TwitterUser>>;

    /// Replace `user`'s outbound edge set with `followings` in one
    /// transaction, upserting every account touched, and requeue `user`
    /// at the tail of the frontier ordering. Returns the number of
    /// edges written.
    async fn commit_refresh(
        &self,
        user: &TwitterUser,
        followings: &[TwitterUser],
    ) -> StorageResult<usize>;

    /// Delete an account and every edge it appears in, as one transaction.
    async fn remove_user(&self, user_id: &str) -> StorageResult<()>;

    /// Record a new stats sample and return the newest durable one.
    async fn snapshot_stats(&self) -> StorageResult<StatsSample>;
}

/// SQLite-backed graph store.
pub struct SqliteGraphStore {
    pool: SqlitePool,
}

impl SqliteGraphStore {
    /// Open (creating if needed) the store at the given connection URL
    /// and ensure the schema exists. Schema setup is idempotent.
    ///
    /// # Example URLs
    /// - `sqlite:app.db?mode=rwc` - file-based database, created if missing
    /// - `sqlite::memory:` - in-memory database (ephemeral)
    pub async fn new(database_url: &str) -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(30));

        // One logical task per run; concurrent invocations are separate
        // processes serialized by SQLite itself.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub async fn in_memory() -> StorageResult<Self> {
        Self::new("sqlite::memory:").await
    }

    async fn run_migrations(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT NOT NULL,
                raw_data JSON NOT NULL,
                retrieved_at DATETIME NOT NULL,
                PRIMARY KEY (id)
            );

            CREATE INDEX IF NOT EXISTS idx_users__retrieved_at
            ON users(retrieved_at);
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS followings (
                src TEXT NOT NULL,
                dest TEXT NOT NULL,
                retrieved_at DATETIME NOT NULL,
                PRIMARY KEY (src, dest),
                FOREIGN KEY (src) REFERENCES users(id),
                FOREIGN KEY (dest) REFERENCES users(id)
            );

            CREATE INDEX IF NOT EXISTS idx_followings__dest
            ON followings(dest);
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS stats (
                timestamp DATETIME NOT NULL,
                user_count INT UNSIGNED NOT NULL,
                following_count BIGINT UNSIGNED NOT NULL,
                PRIMARY KEY (timestamp)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Fixed-precision RFC 3339 so lexicographic ORDER BY is chronological.
fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

#[async_trait]
impl GraphStore for SqliteGraphStore {
    async fn pick_frontier(&self) -> StorageResult<Option<TwitterUser>> {
        let row: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT raw_data FROM users
            ORDER BY retrieved_at ASC, RANDOM()
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((raw,)) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn commit_refresh(
        &self,
        user: &TwitterUser,
        followings: &[TwitterUser],
    ) -> StorageResult<usize> {
        let raw_user = serde_json::to_string(user)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, raw_data, retrieved_at)
            VALUES (?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                raw_data = excluded.raw_data,
                retrieved_at = excluded.retrieved_at
            "#,
        )
        .bind(&user.id)
        .bind(&raw_user)
        .bind(format_ts(Utc::now()))
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM followings WHERE src = ?")
            .bind(&user.id)
            .execute(&mut *tx)
            .await?;

        let mut count = 0;
        for following in followings {
            let raw = serde_json::to_string(following)?;
            let seen_at = format_ts(Utc::now());

            sqlx::query(
                r#"
                INSERT INTO users (id, raw_data, retrieved_at)
                VALUES (?, ?, ?)
                ON CONFLICT (id) DO UPDATE SET
                    raw_data = excluded.raw_data,
                    retrieved_at = excluded.retrieved_at
                "#,
            )
            .bind(&following.id)
            .bind(&raw)
            .bind(&seen_at)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO followings (src, dest, retrieved_at)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(&user.id)
            .bind(&following.id)
            .bind(&seen_at)
            .execute(&mut *tx)
            .await?;

            count += 1;
        }

        // Stamp the refreshed account last so it requeues strictly behind
        // every neighbor touched above.
        sqlx::query("UPDATE users SET retrieved_at = ? WHERE id = ?")
            .bind(format_ts(Utc::now()))
            .bind(&user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(count)
    }

    async fn remove_user(&self, user_id: &str) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM followings WHERE src = ? OR dest = ?")
            .bind(user_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn snapshot_stats(&self) -> StorageResult<StatsSample> {
        sqlx::query(
            r#"
            INSERT INTO stats (timestamp, user_count, following_count)
            VALUES (?,
                    (SELECT COUNT(*) FROM users),
                    (SELECT COUNT(*) FROM followings))
            "#,
        )
        .bind(format_ts(Utc::now()))
        .execute(&self.pool)
        .await?;

        // Read back the newest durable row rather than echoing the values
        // just computed; a concurrent invocation may have landed between
        // the insert and this read, and the report should match the store.
        let row: (String, i64, i64) = sqlx::query_as(
            r#"
            SELECT timestamp, user_count, following_count
            FROM stats
            ORDER BY timestamp DESC
            LIMIT 1
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(StatsSample {
            timestamp: parse_ts(&row.0)?,
            user_count: row.1,
            following_count: row.2,
        })
    }
}
