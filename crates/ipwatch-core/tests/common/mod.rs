//! Test doubles and common utilities for workflow contract tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ipwatch_core::error::{Error, Result};
use ipwatch_core::traits::{Healthcheck, HistoryStore, IpResolver, Notifier, Observation};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A resolver that always returns the same address
pub struct StaticResolver {
    address: IpAddr,
}

impl StaticResolver {
    pub fn new(address: IpAddr) -> Self {
        Self { address }
    }
}

#[async_trait]
impl IpResolver for StaticResolver {
    async fn current(&self) -> Result<IpAddr> {
        Ok(self.address)
    }
}

/// A resolver whose every provider has failed
pub struct FailingResolver {
    attempted: Vec<String>,
}

impl FailingResolver {
    pub fn new(attempted: &[&str]) -> Self {
        Self {
            attempted: attempted.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl IpResolver for FailingResolver {
    async fn current(&self) -> Result<IpAddr> {
        Err(Error::resolution(self.attempted.clone()))
    }
}

/// A notifier that records every delivery
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub changes: Arc<Mutex<Vec<(Option<IpAddr>, IpAddr)>>>,
    pub errors: Arc<Mutex<Vec<Vec<String>>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_change(&self, previous: Option<IpAddr>, current: IpAddr) -> Result<()> {
        self.changes.lock().unwrap().push((previous, current));
        Ok(())
    }

    async fn notify_errors(&self, errors: &[String]) -> Result<()> {
        self.errors.lock().unwrap().push(errors.to_vec());
        Ok(())
    }
}

/// A healthcheck that counts pings instead of sending them
#[derive(Clone, Default)]
pub struct RecordingHealthcheck {
    pub successes: Arc<Mutex<Vec<IpAddr>>>,
    pub failures: Arc<AtomicUsize>,
}

impl RecordingHealthcheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Healthcheck for RecordingHealthcheck {
    async fn report_success(&self, current: IpAddr) -> Result<()> {
        self.successes.lock().unwrap().push(current);
        Ok(())
    }

    async fn report_failure(&self) -> Result<()> {
        self.failures.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Shares one store between a test and the engine that boxes it
pub struct SharedStore(pub Arc<dyn HistoryStore>);

#[async_trait]
impl HistoryStore for SharedStore {
    fn was_newly_created(&self) -> bool {
        self.0.was_newly_created()
    }

    async fn append(&self, time: DateTime<Utc>, address: IpAddr) -> Result<i64> {
        self.0.append(time, address).await
    }

    async fn latest(&self) -> Result<Option<Observation>> {
        self.0.latest().await
    }

    fn describe(&self) -> String {
        self.0.describe()
    }
}

/// A store with an injectable write failure and a fixed previous row
pub struct FlakyStore {
    pub previous: Option<Observation>,
    pub fail_append: bool,
}

#[async_trait]
impl HistoryStore for FlakyStore {
    fn was_newly_created(&self) -> bool {
        false
    }

    async fn append(&self, _time: DateTime<Utc>, _address: IpAddr) -> Result<i64> {
        if self.fail_append {
            Err(Error::storage("injected write failure"))
        } else {
            Ok(1)
        }
    }

    async fn latest(&self) -> Result<Option<Observation>> {
        Ok(self.previous.clone())
    }

    fn describe(&self) -> String {
        "flaky test store".to_string()
    }
}
