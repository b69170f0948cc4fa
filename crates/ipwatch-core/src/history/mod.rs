// # History Backends
//
// This module provides implementations of the HistoryStore trait for the
// supported storage engines.
//
// ## Contract
//
// All three backends create the same table on open, report whether they
// had to create it, and implement identical append/latest semantics.
// Only the connection wiring and the describe() output differ, which is
// exactly what the contract tests verify.
//
// ## Schema
//
// ```sql
// CREATE TABLE public_ip_address (
//     id         <integer, primary key, auto-increment>,
//     time       <timestamp, not null>,
//     ip_address VARCHAR(80) NULL
// )
// ```

pub mod mysql;
pub mod postgres;
pub mod sqlite;

pub use mysql::MySqlStore;
pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};

use crate::config::StoreConfig;
use crate::traits::{HistoryStore, Observation};

/// Name of the observation table, shared by every backend
pub const TABLE_NAME: &str = "public_ip_address";

/// Open the backend selected by `config`.
///
/// Opening creates the observation table if it is absent; the returned
/// store remembers whether that happened (see
/// [`HistoryStore::was_newly_created`]).
pub async fn open_store(config: &StoreConfig) -> crate::Result<Box<dyn HistoryStore>> {
    match config {
        StoreConfig::Sqlite { path } => Ok(Box::new(SqliteStore::open(path).await?)),
        StoreConfig::MySql(server) => Ok(Box::new(MySqlStore::open(server).await?)),
        StoreConfig::Postgres(server) => Ok(Box::new(PostgresStore::open(server).await?)),
    }
}

/// Turn a fetched row into an [`Observation`].
///
/// The schema allows a null address and older rows may hold junk; either
/// degrades to `None` with a warning so the caller treats the history as
/// unreadable rather than failing the run.
pub(crate) fn decode_observation(
    (id, time, address): (i64, DateTime<Utc>, Option<String>),
) -> Option<Observation> {
    let raw = match address {
        Some(raw) => raw,
        None => {
            tracing::warn!("row {id} has no stored address, treating previous IP as unreadable");
            return None;
        }
    };
    match raw.parse() {
        Ok(address) => Some(Observation { id, time, address }),
        Err(_) => {
            tracing::warn!(
                "row {id} holds unparseable address '{raw}', treating previous IP as unreadable"
            );
            None
        }
    }
}
