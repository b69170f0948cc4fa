//! IP resolver trait
//!
//! A resolver obtains the caller's current public IP address, typically by
//! querying an ordered list of external "what is my IP" services. A single
//! provider failing is a resolver-internal event; the trait only surfaces
//! total exhaustion, as [`Error::Resolution`](crate::Error::Resolution)
//! carrying every attempted provider.

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for current-IP resolver implementations
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Get the current public IP address.
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The first successfully parsed address
    /// - `Err(Error::Resolution { .. })`: Every provider failed
    async fn current(&self) -> crate::Result<IpAddr>;
}
