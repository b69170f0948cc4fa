//! Configuration types for the ipwatch system
//!
//! Configuration is explicit: the caller builds these structs (the daemon
//! fills them from environment variables) and passes them into component
//! constructors. Nothing in this crate reads the process environment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default SQLite database path when none is configured
const DEFAULT_SQLITE_PATH: &str = "public_ip.db";

/// Default healthcheck server
pub const DEFAULT_HEALTHCHECK_SERVER: &str = "https://hc-ping.com";

/// Raw storage backend selection input.
///
/// `mode` selects the backend; the remaining fields are interpreted per
/// mode. [`StoreSettings::resolve`] turns this into a validated
/// [`StoreConfig`] or a configuration error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Backend mode: `sqlite`, `mysql`, `mariadb`, `postgres` or
    /// `postgresql` (case-insensitive)
    pub mode: String,
    /// Database file path (sqlite only)
    pub path: Option<PathBuf>,
    /// Connection username (client/server backends)
    pub username: Option<String>,
    /// Connection password (client/server backends)
    pub password: Option<String>,
    /// Server hostname (client/server backends)
    pub host: Option<String>,
    /// Server port (client/server backends)
    pub port: Option<u16>,
    /// Database name (client/server backends)
    pub database: Option<String>,
}

impl StoreSettings {
    /// Map these settings onto a concrete backend configuration.
    ///
    /// The mode match is case-insensitive. An unrecognized mode, or missing
    /// required fields for the selected mode, yields [`Error::Config`]
    /// naming the offending setting(s).
    ///
    /// [`Error::Config`]: crate::Error::Config
    pub fn resolve(&self) -> crate::Result<StoreConfig> {
        tracing::debug!("requested storage mode is '{}'", self.mode.to_lowercase());
        match self.mode.to_lowercase().as_str() {
            "sqlite" => Ok(StoreConfig::Sqlite {
                path: self
                    .path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_SQLITE_PATH)),
            }),
            "mysql" | "mariadb" => Ok(StoreConfig::MySql(self.server_config()?)),
            "postgres" | "postgresql" => Ok(StoreConfig::Postgres(self.server_config()?)),
            other => Err(crate::Error::config(format!(
                "unsupported storage mode '{other}': \
                 expected sqlite, mysql, mariadb, postgres or postgresql"
            ))),
        }
    }

    /// Collect the client/server connection fields, listing everything missing.
    fn server_config(&self) -> crate::Result<ServerConfig> {
        let mut missing = Vec::new();
        if self.username.is_none() {
            missing.push("username");
        }
        if self.password.is_none() {
            missing.push("password");
        }
        if self.host.is_none() {
            missing.push("host");
        }
        if self.port.is_none() {
            missing.push("port");
        }
        if self.database.is_none() {
            missing.push("database");
        }
        if !missing.is_empty() {
            return Err(crate::Error::config(format!(
                "missing required setting(s): {}",
                missing.join(", ")
            )));
        }

        Ok(ServerConfig {
            username: self.username.clone().unwrap_or_default(),
            password: self.password.clone().unwrap_or_default(),
            host: self.host.clone().unwrap_or_default(),
            port: self.port.unwrap_or_default(),
            database: self.database.clone().unwrap_or_default(),
        })
    }
}

/// Connection parameters for a client/server backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

/// Validated storage backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Embedded file-based backend
    Sqlite {
        /// Path to the database file (created if missing)
        path: PathBuf,
    },
    /// MySQL / MariaDB client/server backend
    MySql(ServerConfig),
    /// PostgreSQL client/server backend
    Postgres(ServerConfig),
}

impl StoreConfig {
    /// Human-readable identity of the configured backend.
    ///
    /// Safe for logging: never includes credentials.
    pub fn describe(&self) -> String {
        match self {
            StoreConfig::Sqlite { path } => {
                format!("{} in {}", crate::history::TABLE_NAME, path.display())
            }
            StoreConfig::MySql(server) | StoreConfig::Postgres(server) => format!(
                "{} in {} on {}:{}",
                crate::history::TABLE_NAME,
                server.database,
                server.host,
                server.port
            ),
        }
    }
}

/// Settings for the webhook notification integration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookSettings {
    /// Webhook URL; `None` disables the integration
    pub url: Option<String>,
}

/// Settings for the healthcheck integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthcheckSettings {
    /// Healthcheck server base URL
    #[serde(default = "default_healthcheck_server")]
    pub server: String,
    /// Check identifier on the server; `None` disables the integration
    pub check_id: Option<String>,
}

impl Default for HealthcheckSettings {
    fn default() -> Self {
        Self {
            server: default_healthcheck_server(),
            check_id: None,
        }
    }
}

fn default_healthcheck_server() -> String {
    DEFAULT_HEALTHCHECK_SERVER.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_settings(mode: &str) -> StoreSettings {
        StoreSettings {
            mode: mode.to_string(),
            path: None,
            username: Some("ipwatch".to_string()),
            password: Some("hunter2".to_string()),
            host: Some("db.internal".to_string()),
            port: Some(3306),
            database: Some("ipwatch".to_string()),
        }
    }

    #[test]
    fn sqlite_mode_defaults_path() {
        let settings = StoreSettings {
            mode: "sqlite".to_string(),
            ..Default::default()
        };

        match settings.resolve().unwrap() {
            StoreConfig::Sqlite { path } => assert_eq!(path, PathBuf::from("public_ip.db")),
            other => panic!("expected sqlite config, got {other:?}"),
        }
    }

    #[test]
    fn mode_match_is_case_insensitive() {
        assert!(matches!(
            server_settings("MySQL").resolve().unwrap(),
            StoreConfig::MySql(_)
        ));
        assert!(matches!(
            server_settings("PostgreSQL").resolve().unwrap(),
            StoreConfig::Postgres(_)
        ));
        assert!(matches!(
            server_settings("mariadb").resolve().unwrap(),
            StoreConfig::MySql(_)
        ));
    }

    #[test]
    fn unrecognized_mode_is_a_config_error() {
        let err = server_settings("oracle").resolve().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("mode"), "should name the setting: {message}");
        assert!(message.contains("oracle"), "should echo the value: {message}");
    }

    #[test]
    fn missing_server_fields_are_all_listed() {
        let settings = StoreSettings {
            mode: "mysql".to_string(),
            username: Some("ipwatch".to_string()),
            ..Default::default()
        };

        let err = settings.resolve().unwrap_err();
        let message = err.to_string();
        for field in ["password", "host", "port", "database"] {
            assert!(message.contains(field), "missing '{field}' in: {message}");
        }
        assert!(!message.contains("username"), "username was provided: {message}");
    }

    #[test]
    fn non_numeric_port_cannot_reach_resolve() {
        // Port is typed as u16 here; the daemon rejects non-numeric input
        // while parsing the environment. This test pins the tie-break: a
        // present-but-zero port is still "present".
        let mut settings = server_settings("mysql");
        settings.port = Some(0);
        assert!(settings.resolve().is_ok());
    }

    #[test]
    fn describe_never_leaks_credentials() {
        let config = server_settings("postgres").resolve().unwrap();
        let description = config.describe();
        assert!(description.contains("db.internal"));
        assert!(description.contains("3306"));
        assert!(!description.contains("hunter2"));
        assert!(!description.contains("ipwatch@"));
    }

    #[test]
    fn healthcheck_server_defaults() {
        let settings = HealthcheckSettings::default();
        assert_eq!(settings.server, DEFAULT_HEALTHCHECK_SERVER);
        assert!(settings.check_id.is_none());
    }
}
