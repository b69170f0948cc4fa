// # HTTP IP Resolver
//
// Queries an ordered list of external "what is my IP" services and
// returns the first response that parses as an IPv4 or IPv6 literal.
//
// ## Failure isolation
//
// A provider failing — network error, bad status, unparseable body — is
// logged and the next provider is tried; it is never fatal by itself.
// Only exhausting the whole list fails the run, with an error carrying
// every attempted provider for operator diagnosis. There is no retry
// within one invocation.

use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;

use ipwatch_core::error::{Error, Result};
use ipwatch_core::traits::IpResolver;

/// Per-provider request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default IP lookup services, tried in order
pub const DEFAULT_PROVIDERS: &[&str] = &[
    "https://api.ipify.org",  // returns plain text IP
    "https://ifconfig.me/ip", // no rate limit documented
    "https://icanhazip.com",  // no rate limit documented
    "https://ident.me",
];

/// HTTP-based current-IP resolver
pub struct HttpResolver {
    providers: Vec<String>,
    client: reqwest::Client,
}

impl HttpResolver {
    /// Create a resolver over the given provider URLs.
    ///
    /// An empty list falls back to [`DEFAULT_PROVIDERS`].
    pub fn new(providers: Vec<String>) -> Self {
        Self::with_timeout(providers, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create with a custom per-provider timeout.
    pub fn with_timeout(providers: Vec<String>, timeout: Duration) -> Self {
        let providers = if providers.is_empty() {
            DEFAULT_PROVIDERS.iter().map(|s| s.to_string()).collect()
        } else {
            providers
        };

        Self {
            providers,
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// The provider URLs this resolver will try, in order.
    pub fn providers(&self) -> &[String] {
        &self.providers
    }

    /// Fetch and parse the address from a single provider.
    ///
    /// Failures stay internal to the provider loop, as plain strings; only
    /// exhaustion of the whole list becomes a typed error.
    async fn fetch_from(&self, url: &str) -> std::result::Result<IpAddr, String> {
        tracing::debug!("retrieving current IP from {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("HTTP error: {}", response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;

        let body = body.trim();
        body.parse()
            .map_err(|_| format!("invalid IP address: '{body}'"))
    }
}

#[async_trait]
impl IpResolver for HttpResolver {
    async fn current(&self) -> Result<IpAddr> {
        for url in &self.providers {
            match self.fetch_from(url).await {
                Ok(address) => {
                    tracing::info!("current IP {address} retrieved from {url}");
                    return Ok(address);
                }
                Err(err) => {
                    // Skip and continue; exhaustion is handled below
                    tracing::warn!("failed to retrieve IP address from {url}: {err}");
                }
            }
        }

        Err(Error::resolution(self.providers.clone()))
    }
}
