//! Core traits for the ipwatch system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`HistoryStore`]: Append-only persistence of IP observations
//! - [`IpResolver`]: Obtain the current public IP address
//! - [`Notifier`] / [`Healthcheck`]: Outbound notification collaborators

pub mod history_store;
pub mod notify;
pub mod resolver;

pub use history_store::{HistoryStore, Observation};
pub use notify::{Healthcheck, Notifier};
pub use resolver::IpResolver;
