// # Notification Collaborators
//
// Outbound side effects of a run: a chat-style webhook for humans and a
// dead-man's-switch healthcheck ping for monitors.
//
// Both integrations are optional. Their factories take settings from
// ipwatch-core and return `Option<..>`: a missing setting logs a
// "disabled" line and yields `None`, never an error — a misconfigured
// notification must not stop the run from recording history.

pub mod healthcheck;
pub mod webhook;

pub use healthcheck::HealthcheckPinger;
pub use webhook::WebhookNotifier;
