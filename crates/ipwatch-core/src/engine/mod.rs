//! Change-detection engine
//!
//! The WatchEngine ties one run together:
//! - Determine the baseline (previous observation) via HistoryStore
//! - Resolve the current address via IpResolver
//! - Append the new observation (unconditionally on success)
//! - Classify what happened into a RunOutcome
//! - Hand the classification to the notification collaborators
//!
//! ## Run Flow
//!
//! ```text
//! HistoryStore ──(baseline)──► WatchEngine ◄──(current)── IpResolver
//!                                   │
//!                       append ─────┼───── classify
//!                                   ▼
//!                  Notifier / Healthcheck / exit code
//! ```
//!
//! A run is single-shot and strictly sequential; the engine holds no state
//! of its own between runs. Resolution and storage failures are caught
//! here, logged, and folded into the failure exit code — they never
//! terminate the process with an unhandled fault.

use chrono::Utc;
use std::net::IpAddr;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::traits::{Healthcheck, HistoryStore, IpResolver, Notifier};

/// What was known about the previous address before this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Baseline {
    /// The observation table was created by this run; no history can exist
    FirstRun,
    /// The table existed but held no usable previous observation
    Unknown,
    /// The previous observation's address
    Known(IpAddr),
}

impl std::fmt::Display for Baseline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Baseline::FirstRun => write!(f, "unknown (first run)"),
            Baseline::Unknown => write!(f, "unknown"),
            Baseline::Known(address) => write!(f, "{address}"),
        }
    }
}

/// Classification of a single invocation. Exactly one variant holds per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The address was recorded but no baseline existed to compare against;
    /// change status is unknown (distinct from a confirmed [`Unchanged`]).
    ///
    /// [`Unchanged`]: RunOutcome::Unchanged
    FirstObservation {
        current: IpAddr,
        baseline: Baseline,
    },
    /// Current address equals the previous observation
    Unchanged { current: IpAddr },
    /// The address changed since the previous observation
    Changed { previous: IpAddr, current: IpAddr },
    /// No provider returned a usable address; nothing was appended
    ResolutionFailed { attempted: Vec<String> },
}

/// Result of one engine run: the outcome plus any run-level errors.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Resolution/storage errors collected during the run
    pub errors: Vec<String>,
}

impl RunReport {
    /// True when the run resolved and persisted an address without error.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Process exit status: 0 on success, 1 on any run error.
    ///
    /// Whether the address changed never affects the exit code.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }
}

/// Single-shot change-detection engine
///
/// Construct with [`WatchEngine::new`], optionally attach collaborators,
/// then call [`WatchEngine::execute`] exactly once per process run.
pub struct WatchEngine {
    store: Box<dyn HistoryStore>,
    resolver: Box<dyn IpResolver>,
    notifier: Option<Box<dyn Notifier>>,
    healthcheck: Option<Box<dyn Healthcheck>>,
}

impl WatchEngine {
    /// Create an engine over an opened store and a resolver.
    pub fn new(store: Box<dyn HistoryStore>, resolver: Box<dyn IpResolver>) -> Self {
        Self {
            store,
            resolver,
            notifier: None,
            healthcheck: None,
        }
    }

    /// Attach a webhook-style notifier.
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Attach a healthcheck pinger.
    pub fn with_healthcheck(mut self, healthcheck: Box<dyn Healthcheck>) -> Self {
        self.healthcheck = Some(healthcheck);
        self
    }

    /// Run the workflow once and report what happened.
    pub async fn execute(&self) -> RunReport {
        let mut errors = Vec::new();

        let baseline = self.determine_baseline().await;

        let current = match self.resolver.current().await {
            Ok(address) => address,
            Err(err) => {
                error!("{err}");
                let attempted = match &err {
                    Error::Resolution { attempted } => attempted.clone(),
                    _ => Vec::new(),
                };
                errors.push(err.to_string());
                let outcome = RunOutcome::ResolutionFailed { attempted };
                self.dispatch(&outcome, &errors, None).await;
                return RunReport { outcome, errors };
            }
        };
        info!("Current IP: {current}");

        // The table is the authoritative history: append on every
        // successful resolution, changed address or not.
        match self.store.append(Utc::now(), current).await {
            Ok(id) => debug!("recorded observation {id} in {}", self.store.describe()),
            Err(err) => {
                error!("failed to record observation: {err}");
                errors.push(err.to_string());
            }
        }

        let outcome = classify(&baseline, current);
        match &outcome {
            RunOutcome::Unchanged { .. } => info!("IP address has not changed"),
            RunOutcome::Changed { previous, current } => {
                info!("IP address has changed: '{previous}' -> '{current}'");
            }
            RunOutcome::FirstObservation { current, baseline } => {
                info!("recorded '{current}', previous address {baseline}; change status unknown");
            }
            RunOutcome::ResolutionFailed { .. } => {}
        }

        self.dispatch(&outcome, &errors, Some(current)).await;
        RunReport { outcome, errors }
    }

    /// Step 1 of the run: what do we know about the previous address?
    async fn determine_baseline(&self) -> Baseline {
        if self.store.was_newly_created() {
            warn!("first run against a new table, previous IP is unknown");
            return Baseline::FirstRun;
        }

        match self.store.latest().await {
            Ok(Some(observation)) => {
                info!("Previous IP: {}", observation.address);
                Baseline::Known(observation.address)
            }
            Ok(None) => {
                warn!("no previous IP address on record");
                Baseline::Unknown
            }
            Err(err) => {
                // The read is advisory; the append below is the
                // authoritative write. Degrade instead of failing the run.
                warn!("error retrieving previous IP address: {err}");
                Baseline::Unknown
            }
        }
    }

    /// Hand the classified outcome to the collaborators.
    ///
    /// Collaborator failures are logged and absorbed; they never change
    /// the exit code.
    async fn dispatch(&self, outcome: &RunOutcome, errors: &[String], current: Option<IpAddr>) {
        if let Some(healthcheck) = &self.healthcheck {
            let result = match current {
                Some(address) => healthcheck.report_success(address).await,
                None => healthcheck.report_failure().await,
            };
            if let Err(err) = result {
                warn!("healthcheck ping failed: {err}");
            }
        }

        if let Some(notifier) = &self.notifier {
            let result = match outcome {
                RunOutcome::Changed { previous, current } => {
                    notifier.notify_change(Some(*previous), *current).await
                }
                RunOutcome::FirstObservation { current, .. } => {
                    notifier.notify_change(None, *current).await
                }
                RunOutcome::Unchanged { .. } | RunOutcome::ResolutionFailed { .. } => Ok(()),
            };
            if let Err(err) = result {
                warn!("change notification failed: {err}");
            }

            if !errors.is_empty() {
                if let Err(err) = notifier.notify_errors(errors).await {
                    warn!("error notification failed: {err}");
                }
            }
        }
    }
}

/// Pure classification of a run, given the baseline and the resolved address.
fn classify(baseline: &Baseline, current: IpAddr) -> RunOutcome {
    match baseline {
        Baseline::Known(previous) if *previous == current => RunOutcome::Unchanged { current },
        Baseline::Known(previous) => RunOutcome::Changed {
            previous: *previous,
            current,
        },
        Baseline::FirstRun | Baseline::Unknown => RunOutcome::FirstObservation {
            current,
            baseline: baseline.clone(),
        },
    }
}
