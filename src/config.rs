//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Default dashboard front-end that serves `/client/<client_id>`.
pub const DEFAULT_DASHBOARD_URL: &str = "https://ivfstuba.manus.space";

/// Default database location, in the same URL form operators already use.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:///axiom_enterprise.db";

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Port to listen on (bound on all interfaces).
    pub port: u16,
    /// Path of the libSQL database file, or `:memory:`.
    pub database_path: PathBuf,
    /// Base URL of the client dashboard, without a trailing slash.
    pub dashboard_base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            database_path: database_path_from_url(DEFAULT_DATABASE_URL),
            dashboard_base_url: DEFAULT_DASHBOARD_URL.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Build the configuration from `PORT`, `DATABASE_URL` and
    /// `AXIOM_DASHBOARD_URL`, falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                message: format!("{raw:?} is not a valid port: {e}"),
            })?,
            Err(_) => defaults.port,
        };

        let database_path = std::env::var("DATABASE_URL")
            .map(|url| database_path_from_url(&url))
            .unwrap_or(defaults.database_path);

        let dashboard_base_url = std::env::var("AXIOM_DASHBOARD_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.dashboard_base_url);

        Ok(Self {
            port,
            database_path,
            dashboard_base_url,
        })
    }

    /// Dashboard link handed back to the automation workflow.
    pub fn dashboard_url(&self, client_id: &str) -> String {
        format!("{}/client/{}", self.dashboard_base_url, client_id)
    }
}

/// Strip the `sqlite://` scheme so both `sqlite:///data/x.db` and a bare path work.
fn database_path_from_url(url: &str) -> PathBuf {
    let path = url
        .strip_prefix("sqlite:///")
        .or_else(|| url.strip_prefix("sqlite://"))
        .or_else(|| url.strip_prefix("file:"))
        .unwrap_or(url);
    PathBuf::from(path)
}
