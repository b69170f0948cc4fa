//! PostgreSQL history backend
//!
//! Client/server variant of the history store. Identical contract to the
//! other backends; ids come back from `INSERT .. RETURNING id`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::net::IpAddr;

use super::{TABLE_NAME, decode_observation};
use crate::config::ServerConfig;
use crate::traits::{HistoryStore, Observation};

/// PostgreSQL-backed history store
#[derive(Debug)]
pub struct PostgresStore {
    pool: PgPool,
    description: String,
    created_table: bool,
}

impl PostgresStore {
    /// Connect to the configured server and ensure the table exists.
    pub async fn open(server: &ServerConfig) -> crate::Result<Self> {
        tracing::debug!(
            "connecting to postgres database '{}' on {}:{}",
            server.database,
            server.host,
            server.port
        );

        let options = PgConnectOptions::new()
            .host(&server.host)
            .port(server.port)
            .username(&server.username)
            .password(&server.password)
            .database(&server.database);
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let exists = sqlx::query_scalar::<_, String>(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_name = $1",
        )
        .bind(TABLE_NAME)
        .fetch_optional(&pool)
        .await?
        .is_some();

        if !exists {
            tracing::info!("table '{TABLE_NAME}' does not exist, creating");
            sqlx::query(
                "CREATE TABLE public_ip_address ( \
                 id BIGSERIAL PRIMARY KEY, \
                 time TIMESTAMPTZ NOT NULL, \
                 ip_address VARCHAR(80) )",
            )
            .execute(&pool)
            .await?;
        }

        Ok(Self {
            pool,
            description: format!(
                "{TABLE_NAME} in {} on {}:{}",
                server.database, server.host, server.port
            ),
            created_table: !exists,
        })
    }
}

#[async_trait]
impl HistoryStore for PostgresStore {
    fn was_newly_created(&self) -> bool {
        self.created_table
    }

    async fn append(&self, time: DateTime<Utc>, address: IpAddr) -> crate::Result<i64> {
        tracing::debug!("adding row to '{}'", self.description);
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO public_ip_address (time, ip_address) VALUES ($1, $2) RETURNING id",
        )
        .bind(time)
        .bind(address.to_string())
        .fetch_one(&self.pool)
        .await?;

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
