// # SQLite History Backend
//
// Embedded file-based implementation of HistoryStore.
//
// ## Purpose
//
// The default backend: a single database file next to the process, no
// server to run. The file is created on first open, as is the
// observation table (probed via `sqlite_master`).
//
// ## In-memory mode
//
// `open_in_memory()` backs the store with a connection-local database.
// The pool is pinned to one connection that is never recycled, otherwise
// the database would vanish mid-test.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::net::IpAddr;
use std::path::Path;

use super::{TABLE_NAME, decode_observation};
use crate::traits::{HistoryStore, Observation};

/// Embedded SQLite history store
#[derive(Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
    description: String,
    created_table: bool,
}

impl SqliteStore {
    /// Open (creating if missing) the database file at `path`.
    pub async fn open<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        tracing::debug!("opening sqlite database at {}", path.display());

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let description = format!("{TABLE_NAME} in {}", path.display());
        Self::bootstrap(pool, description).await
    }

    /// Open a store backed by an in-memory database (tests, dry runs).
    pub async fn open_in_memory() -> crate::Result<Self> {
        let options = SqliteConnectOptions::new().in_memory(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::bootstrap(pool, format!("{TABLE_NAME} in :memory:")).await
    }

    async fn bootstrap(pool: SqlitePool, description: String) -> crate::Result<Self> {
        let exists = sqlx::query_scalar::<_, String>(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
        )
        .bind(TABLE_NAME)
        .fetch_optional(&pool)
        .await?
        .is_some();

        if !exists {
            tracing::info!("table '{TABLE_NAME}' does not exist, creating");
            sqlx::query(
                "CREATE TABLE public_ip_address ( \
                 id INTEGER PRIMARY KEY AUTOINCREMENT, \
                 time TEXT NOT NULL, \
                 ip_address VARCHAR(80) )",
            )
            .execute(&pool)
            .await?;
        }

        Ok(Self {
            pool,
            description,
            created_table: !exists,
        })
    }
}

#[async_trait]
impl HistoryStore for SqliteStore {
    fn was_newly_created(&self) -> bool {
        self.created_table
    }

    async fn append(&self, time: DateTime<Utc>, address: IpAddr) -> crate::Result<i64> {
        tracing::debug!("adding row to '{}'", self.description);
        let result =
            sqlx::query("INSERT INTO public_ip_address (time, ip_address) VALUES (?1, ?2)")
                .bind(time)
                .bind(address.to_string())
                .execute(&self.pool)
                .await?;

        let id = result.last_insert_rowid();
        tracing::debug!("committed new row with id {id}");
        Ok(id)
    }

    async fn latest(&self) -> crate::Result<Option<Observation>> {
        let row = sqlx::query_as::<_, (i64, DateTime<Utc>, Option<String>)>(
            "SELECT id, time, ip_address FROM public_ip_address \
             ORDER BY time DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(decode_observation))
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_then_latest_round_trips() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        assert!(store.was_newly_created());

        let time = Utc::now();
        let address: IpAddr = "10.10.10.42".parse().unwrap();
        let id = store.append(time, address).await.unwrap();

        let observation = store.latest().await.unwrap().unwrap();
        assert_eq!(observation.id, id);
        assert_eq!(observation.time, time);
        assert_eq!(observation.address, address);
    }

    #[tokio::test]
    async fn latest_on_empty_table_is_none() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        assert!(store.latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn timestamp_ties_break_by_highest_id() {
        let store = SqliteStore::open_in_memory().await.unwrap();

        let time = Utc::now();
        store.append(time, "10.0.0.1".parse().unwrap()).await.unwrap();
        let second = store.append(time, "10.0.0.2".parse().unwrap()).await.unwrap();

        let observation = store.latest().await.unwrap().unwrap();
        assert_eq!(observation.id, second);
        assert_eq!(observation.address, "10.0.0.2".parse::<IpAddr>().unwrap());
    }

    #[tokio::test]
    async fn ids_are_monotonically_increasing() {
        let store = SqliteStore::open_in_memory().await.unwrap();

        let address: IpAddr = "192.0.2.7".parse().unwrap();
        let first = store.append(Utc::now(), address).await.unwrap();
        let second = store.append(Utc::now(), address).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn describe_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");

        let store = SqliteStore::open(&path).await.unwrap();
        assert!(store.describe().contains("history.db"));
        assert!(store.describe().contains(TABLE_NAME));
    }
}
