// # History Store Trait
//
// Defines the interface for the append-only observation history.
//
// ## Purpose
//
// Every successful run appends one observation; the latest observation is
// the baseline the next run compares against. The table is append-only:
// no update or delete operations exist on this interface.
//
// ## Implementations
//
// - SQLite (embedded file), MySQL and PostgreSQL (client/server),
//   all in the `history` module. The three share one schema and one
//   contract; they differ only in how they connect and how they
//   describe themselves.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::net::IpAddr;

/// One persisted (timestamp, address) record.
///
/// Observations are immutable once written. The `id` is assigned by the
/// backend, is unique and monotonically increasing within one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Row id assigned by the backend
    pub id: i64,
    /// When the address was read
    pub time: DateTime<Utc>,
    /// The observed public address
    pub address: IpAddr,
}

/// Trait for observation history backends
///
/// All methods must behave identically across backends; only the
/// connection wiring and [`describe`](HistoryStore::describe) output differ.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Whether opening this store had to create the observation table.
    ///
    /// This flag is the engine's only signal to distinguish "no history
    /// exists yet" from "history exists but could not be read".
    fn was_newly_created(&self) -> bool;

    /// Append one observation, returning the assigned row id.
    ///
    /// The write is a single atomic INSERT: a failure leaves no partial
    /// row visible to subsequent reads.
    async fn append(&self, time: DateTime<Utc>, address: IpAddr) -> crate::Result<i64>;

    /// The most recent observation, or `None` if the table is empty.
    ///
    /// "Most recent" means maximum `time`, ties broken by maximum `id`.
    /// An empty table is not an error.
    async fn latest(&self) -> crate::Result<Option<Observation>>;

    /// Human-readable backend identity for logging.
    ///
    /// Never includes credentials.
    fn describe(&self) -> String;
}
