//! Webhook notifier
//!
//! Posts run results as `{"content": <message>}` to a configured webhook
//! URL (Discord-compatible, but any endpoint accepting that shape works).

use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;

use ipwatch_core::config::WebhookSettings;
use ipwatch_core::error::{Error, Result};
use ipwatch_core::traits::Notifier;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Webhook-backed [`Notifier`]
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Create a notifier posting to `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Build the notifier from settings, degrading to `None` when the
    /// integration is not configured.
    pub fn from_settings(settings: &WebhookSettings) -> Option<Self> {
        match settings.url.as_deref() {
            Some(url) if !url.is_empty() => Some(Self::new(url)),
            _ => {
                tracing::warn!("webhook URL not configured, webhook notifications disabled");
                None
            }
        }
    }

    async fn post(&self, content: &str) -> Result<()> {
        tracing::debug!("sending message to webhook");
        let payload = serde_json::json!({ "content": content });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::notification(format!("webhook request failed: {e}")))?;

        let status = response.status();
        tracing::debug!("webhook response: {status}");
        if !status.is_success() {
            return Err(Error::notification(format!(
                "webhook returned HTTP {status}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify_change(&self, previous: Option<IpAddr>, current: IpAddr) -> Result<()> {
        self.post(&change_message(previous, current)).await
    }

    async fn notify_errors(&self, errors: &[String]) -> Result<()> {
        self.post(&error_message(errors)).await
    }
}

/// Message for a recorded address, with or without a known baseline.
pub fn change_message(previous: Option<IpAddr>, current: IpAddr) -> String {
    match previous {
        Some(previous) => format!(
            "**Public IP address has changed!**\nPrevious: {previous}\nNew: {current}"
        ),
        None => format!(
            "Public IP address recorded, change status unknown\nCurrent: {current}"
        ),
    }
}

/// Message enumerating the errors a run collected.
pub fn error_message(errors: &[String]) -> String {
    format!("**Encountered errors:**\n{}", errors.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn addr(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn factory_disables_without_url() {
        assert!(WebhookNotifier::from_settings(&WebhookSettings::default()).is_none());
        assert!(
            WebhookNotifier::from_settings(&WebhookSettings {
                url: Some(String::new())
            })
            .is_none()
        );
        assert!(
            WebhookNotifier::from_settings(&WebhookSettings {
                url: Some("https://hooks.example/abc".to_string())
            })
            .is_some()
        );
    }

    #[test]
    fn change_message_names_both_addresses() {
        let message = change_message(Some(addr("192.168.1.1")), addr("10.10.10.42"));
        assert!(message.contains("192.168.1.1"));
        assert!(message.contains("10.10.10.42"));
        assert!(message.contains("changed"));
    }

    #[test]
    fn missing_baseline_is_not_reported_as_a_change() {
        let message = change_message(None, addr("10.10.10.0"));
        assert!(message.contains("10.10.10.0"));
        assert!(message.contains("unknown"));
        assert!(!message.contains("changed"));
    }

    #[test]
    fn error_message_enumerates_errors() {
        let message = error_message(&["first failure".to_string(), "second failure".to_string()]);
        assert!(message.contains("first failure"));
        assert!(message.contains("second failure"));
    }

    #[tokio::test]
    async fn post_delivers_json_content() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();

            // Read until the JSON body has arrived (it may come in a
            // separate segment from the headers)
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = tokio::time::timeout(
                    std::time::Duration::from_secs(5),
                    stream.read(&mut chunk),
                )
                .await
                .expect("request did not arrive")
                .unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if String::from_utf8_lossy(&request).contains("10.10.10.42") {
                    break;
                }
            }

            stream
                .write_all(b"HTTP/1.1 204 No Content\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .await
                .unwrap();
            String::from_utf8_lossy(&request).to_string()
        });

        let notifier = WebhookNotifier::new(url);
        notifier
            .notify_change(Some(addr("192.168.1.1")), addr("10.10.10.42"))
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST"));
        assert!(request.contains("content"));
        assert!(request.contains("10.10.10.42"));
    }
}
