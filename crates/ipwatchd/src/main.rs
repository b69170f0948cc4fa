// # ipwatchd - Public IP Watcher
//
// Thin integration layer: reads configuration from environment variables,
// initializes logging, wires the components and runs the change-detection
// workflow exactly once. An external timer (cron, systemd timer) is
// expected to invoke it periodically.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Storage
// - `IPWATCH_DB_TYPE`: Backend mode (sqlite, mysql, mariadb, postgres,
//   postgresql). Defaults to sqlite.
// - `IPWATCH_DATABASE`: Database file path (sqlite) or database name
//   (client/server backends)
// - `IPWATCH_USERNAME` / `IPWATCH_PASSWORD`: Server credentials
// - `IPWATCH_HOST` / `IPWATCH_PORT`: Server address
//
// ### IP lookup
// - `IPWATCH_URLS`: Comma-separated provider URLs, tried in order.
//   Defaults to a built-in list.
//
// ### Notifications (optional; absent means disabled)
// - `IPWATCH_WEBHOOK_URL`: Webhook to post run results to
// - `IPWATCH_HEALTHCHECK_UUID`: Check id on the healthcheck server
// - `IPWATCH_HEALTHCHECK_SERVER`: Healthcheck server base URL
//   (defaults to https://hc-ping.com)
//
// ### Logging
// - `IPWATCH_LOG_LEVEL`: trace, debug, info, warn or error (default info)
// - `IPWATCH_LOG_DIR`: When set, also write daily-rotated log files here
//
// ## Exit codes
//
// - 0: the current IP was resolved and recorded (changed or not)
// - 1: resolution or storage failed, or the configuration was invalid

use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_appender::rolling::Rotation;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use ipwatch_core::config::{
    DEFAULT_HEALTHCHECK_SERVER, HealthcheckSettings, StoreSettings, WebhookSettings,
};
use ipwatch_core::traits::{Healthcheck, Notifier};
use ipwatch_core::{WatchEngine, open_store};
use ipwatch_notify::{HealthcheckPinger, WebhookNotifier};
use ipwatch_resolver_http::HttpResolver;

/// Number of rotated daily log files to keep
const MAX_LOG_FILES: usize = 28;

/// Application configuration
struct Config {
    store: StoreSettings,
    providers: Vec<String>,
    webhook: WebhookSettings,
    healthcheck: HealthcheckSettings,
    log_level: String,
    log_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let port = match env::var("IPWATCH_PORT") {
            Ok(raw) => Some(raw.parse::<u16>().map_err(|_| {
                anyhow::anyhow!("IPWATCH_PORT must be a number between 0 and 65535, got '{raw}'")
            })?),
            Err(_) => None,
        };

        Ok(Self {
            store: StoreSettings {
                mode: env::var("IPWATCH_DB_TYPE").unwrap_or_else(|_| "sqlite".to_string()),
                path: env::var("IPWATCH_DATABASE").ok().map(PathBuf::from),
                username: env::var("IPWATCH_USERNAME").ok(),
                password: env::var("IPWATCH_PASSWORD").ok(),
                host: env::var("IPWATCH_HOST").ok(),
                port,
                database: env::var("IPWATCH_DATABASE").ok(),
            },
            providers: env::var("IPWATCH_URLS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            webhook: WebhookSettings {
                url: env::var("IPWATCH_WEBHOOK_URL").ok(),
            },
            healthcheck: HealthcheckSettings {
                server: env::var("IPWATCH_HEALTHCHECK_SERVER")
                    .unwrap_or_else(|_| DEFAULT_HEALTHCHECK_SERVER.to_string()),
                check_id: env::var("IPWATCH_HEALTHCHECK_UUID").ok(),
            },
            log_level: env::var("IPWATCH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_dir: env::var("IPWATCH_LOG_DIR").ok().map(PathBuf::from),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => anyhow::bail!(
                "IPWATCH_LOG_LEVEL '{other}' is not valid. \
                 Valid levels: trace, debug, info, warn, error"
            ),
        }

        for url in &self.providers {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("IPWATCH_URLS entries must use HTTP or HTTPS. Got: {url}");
            }
        }

        // Surfaces unsupported modes and missing backend fields before
        // any connection attempt
        self.store.resolve()?;

        Ok(())
    }
}

/// Initialize console logging, plus rotating file logging when configured.
fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::new(config.log_level.to_lowercase());

    match &config.log_dir {
        Some(dir) => {
            let file = tracing_appender::rolling::Builder::new()
                .rotation(Rotation::DAILY)
                .filename_prefix("ipwatch")
                .filename_suffix("log")
                .max_log_files(MAX_LOG_FILES)
                .build(dir)?;

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .with(fmt::layer().with_ansi(false).with_writer(file))
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .init();
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {e}");
        return ExitCode::from(1);
    }

    if let Err(e) = init_logging(&config) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::from(1);
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            return ExitCode::from(1);
        }
    };

    ExitCode::from(rt.block_on(run(config)))
}

/// Run the workflow once, returning the process exit status.
async fn run(config: Config) -> u8 {
    let notifier = WebhookNotifier::from_settings(&config.webhook);
    let healthcheck = HealthcheckPinger::from_settings(&config.healthcheck);

    // validate() already resolved once; a failure here would be a race
    // with the environment, handled the same way
    let store_config = match config.store.resolve() {
        Ok(store_config) => store_config,
        Err(err) => return fail_before_run(err, &notifier, &healthcheck).await,
    };

    let store = match open_store(&store_config).await {
        Ok(store) => store,
        Err(err) => return fail_before_run(err, &notifier, &healthcheck).await,
    };
    info!("using {}", store.describe());

    let resolver = HttpResolver::new(config.providers.clone());

    let mut engine = WatchEngine::new(store, Box::new(resolver));
    if let Some(notifier) = notifier {
        engine = engine.with_notifier(Box::new(notifier));
    }
    if let Some(healthcheck) = healthcheck {
        engine = engine.with_healthcheck(Box::new(healthcheck));
    }

    let report = engine.execute().await;
    debug!("exit code {}", report.exit_code());
    report.exit_code()
}

/// The run could not even start (config or store-open failure): log,
/// attempt the failure notifications, exit 1.
async fn fail_before_run(
    err: ipwatch_core::Error,
    notifier: &Option<WebhookNotifier>,
    healthcheck: &Option<HealthcheckPinger>,
) -> u8 {
    error!("{err}");

    let errors = vec![err.to_string()];
    if let Some(notifier) = notifier {
        if let Err(e) = notifier.notify_errors(&errors).await {
            warn!("error notification failed: {e}");
        }
    }
    if let Some(healthcheck) = healthcheck {
        if let Err(e) = healthcheck.report_failure().await {
            warn!("healthcheck ping failed: {e}");
        }
    }

    1
}
