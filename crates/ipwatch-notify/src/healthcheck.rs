//! Healthcheck pinger
//!
//! Dead-man's-switch integration in the healthchecks.io style: a success
//! ping hits `{server}/{check_id}`, a failure ping hits
//! `{server}/{check_id}/fail`. Every ping carries a per-run `rid` query
//! parameter so the monitor can correlate pings from one invocation, and
//! the success ping POSTs the current address as a diagnostic payload.

use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;
use uuid::Uuid;

use ipwatch_core::config::HealthcheckSettings;
use ipwatch_core::error::{Error, Result};
use ipwatch_core::traits::Healthcheck;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Which endpoint a ping targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PingKind {
    Success,
    Fail,
}

impl PingKind {
    fn path_suffix(self) -> &'static str {
        match self {
            PingKind::Success => "",
            PingKind::Fail => "/fail",
        }
    }
}

/// Healthcheck-server-backed [`Healthcheck`]
pub struct HealthcheckPinger {
    server: String,
    check_id: String,
    run_id: Uuid,
    client: reqwest::Client,
}

impl HealthcheckPinger {
    /// Create a pinger for `check_id` on `server`.
    pub fn new(server: impl Into<String>, check_id: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            check_id: check_id.into(),
            run_id: Uuid::new_v4(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Build the pinger from settings, degrading to `None` when no check
    /// id is configured.
    pub fn from_settings(settings: &HealthcheckSettings) -> Option<Self> {
        match settings.check_id.as_deref() {
            Some(check_id) if !check_id.is_empty() => {
                Some(Self::new(settings.server.clone(), check_id))
            }
            _ => {
                tracing::warn!("healthcheck id not configured, healthcheck integration disabled");
                None
            }
        }
    }

    /// The run id attached to every ping from this instance.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    fn ping_url(&self, kind: PingKind) -> String {
        format!(
            "{}/{}{}?rid={}",
            self.server.trim_end_matches('/'),
            self.check_id,
            kind.path_suffix(),
            self.run_id
        )
    }

    async fn ping(&self, kind: PingKind, payload: Option<String>) -> Result<()> {
        let url = self.ping_url(kind);
        tracing::debug!("pinging {url}");

        let mut request = self.client.post(&url);
        if let Some(body) = payload {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::notification(format!("healthcheck ping failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::notification(format!(
                "healthcheck server returned HTTP {status}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Healthcheck for HealthcheckPinger {
    async fn report_success(&self, current: IpAddr) -> Result<()> {
        tracing::info!("sending 'success' ping");
        self.ping(PingKind::Success, Some(format!("ip={current}")))
            .await
    }

    async fn report_failure(&self) -> Result<()> {
        tracing::info!("sending 'fail' ping");
        self.ping(PingKind::Fail, None).await
    }
}
