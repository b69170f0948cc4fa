// # ipwatch-core
//
// Core library for the ipwatch public IP change tracker.
//
// ## Architecture Overview
//
// - **HistoryStore**: Trait for the append-only observation history,
//   with SQLite, MySQL and PostgreSQL backends sharing one contract
// - **IpResolver**: Trait for obtaining the current public IP
// - **Notifier / Healthcheck**: Traits for the optional outbound
//   notification collaborators
// - **WatchEngine**: Single-shot workflow that compares, persists and
//   classifies one run into a RunOutcome
//
// ## Design Principles
//
// 1. **Explicit configuration**: components take config structs; nothing
//    here reads the process environment
// 2. **One contract, three backends**: append/latest behave identically
//    everywhere; only the wiring differs
// 3. **Errors stop the run, not the process**: run-level failures are
//    collected, logged, notified and turned into an exit code

pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod traits;

// Re-export core types for convenience
pub use config::{
    DEFAULT_HEALTHCHECK_SERVER, HealthcheckSettings, ServerConfig, StoreConfig, StoreSettings,
    WebhookSettings,
};
pub use engine::{Baseline, RunOutcome, RunReport, WatchEngine};
pub use error::{Error, Result};
pub use history::{MySqlStore, PostgresStore, SqliteStore, open_store};
pub use traits::{Healthcheck, HistoryStore, IpResolver, Notifier, Observation};
