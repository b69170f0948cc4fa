//! Notification collaborator traits
//!
//! Both collaborators are optional integrations: the engine holds them as
//! `Option<Box<dyn ..>>` and a misconfigured integration degrades to absent
//! rather than failing the run. Delivery failures are logged by the engine
//! and never affect the process exit code.

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for human-facing run notifications (e.g. a chat webhook)
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Report a recorded address.
    ///
    /// `previous` is `None` when no baseline existed (first run, or the
    /// previous address could not be read) — the message must surface that
    /// distinctly from a confirmed change.
    async fn notify_change(&self, previous: Option<IpAddr>, current: IpAddr) -> crate::Result<()>;

    /// Report the errors a run collected.
    async fn notify_errors(&self, errors: &[String]) -> crate::Result<()>;
}

/// Trait for dead-man's-switch healthcheck pings
#[async_trait]
pub trait Healthcheck: Send + Sync {
    /// Signal a successful run, carrying the current address as diagnostic payload.
    async fn report_success(&self, current: IpAddr) -> crate::Result<()>;

    /// Signal a failed run (no current address was obtained).
    async fn report_failure(&self) -> crate::Result<()>;
}
