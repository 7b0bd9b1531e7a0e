//! Configuration read from environment variables
//!
//! Every key is prefixed with `VITRINE_` and has a default.

use std::num::NonZeroUsize;

use serde::Deserialize;
use thiserror::Error;

/// The prefix of every environment variable read into [`Config`]
pub const ENV_PREFIX: &str = "VITRINE_";

/// Values which require a restart to change
///
/// Values an admin changes at runtime are "settings" and live in the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Reported as `service_name` in json logs
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Table storing the site settings row
    #[serde(default = "default_settings_table")]
    pub settings_table: String,

    /// Prefix of the change channels opened for the site settings
    #[serde(default = "default_channel_prefix")]
    pub channel_prefix: String,

    /// Maximum number of articles on the index page
    #[serde(default)]
    pub home_article_limit: Option<NonZeroUsize>,
}

/// How log lines are written
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `tracing_subscriber`'s human readable format
    #[default]
    Pretty,

    /// One flat json object per line, see [`FlatJson`](crate::tracing::FlatJson)
    Json,
}

/// Error returned by [`Config::from_env`]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is present but couldn't be parsed
    #[error("Invalid environment configuration: {0}")]
    Env(#[from] envy::Error),
}

impl Config {
    /// Reads the configuration from the process' environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(envy::prefixed(ENV_PREFIX).from_env()?)
    }

    /// Reads the configuration from explicit `(key, value)` pairs
    ///
    /// Keys carry the same prefix as the environment variables.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter(vars)?)
    }

    /// Options for synchronizing the site settings
    #[cfg(feature = "contrib-settings")]
    pub fn sync_options(&self) -> vitrine_contrib_settings::SyncOptions {
        vitrine_contrib_settings::SyncOptions {
            table: self.settings_table.clone(),
            channel_prefix: self.channel_prefix.clone(),
        }
    }

    /// The filter of the index page's article listing
    #[cfg(feature = "contrib-articles")]
    pub fn home_filter(&self) -> vitrine_contrib_articles::ArticleFilter {
        vitrine_contrib_articles::ArticleFilter {
            limit: self.home_article_limit,
            ..Default::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            settings_table: default_settings_table(),
            channel_prefix: default_channel_prefix(),
            home_article_limit: None,
        }
    }
}

fn default_service_name() -> String {
    "vitrine".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_settings_table() -> String {
    vitrine_core::models::SiteSettings::TABLE.to_string()
}

fn default_channel_prefix() -> String {
    "site-settings".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = Config::from_vars(vars(&[("PATH", "/usr/bin")])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.settings_table, "site_settings");
        assert_eq!(config.channel_prefix, "site-settings");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn prefixed_variables_override_defaults() {
        let config = Config::from_vars(vars(&[
            ("VITRINE_SERVICE_NAME", "acme-site"),
            ("VITRINE_LOG_FORMAT", "json"),
            ("VITRINE_HOME_ARTICLE_LIMIT", "6"),
            ("SERVICE_NAME", "ignored"),
        ]))
        .unwrap();

        assert_eq!(config.service_name, "acme-site");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.home_article_limit, NonZeroUsize::new(6));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Config::from_vars(vars(&[("VITRINE_LOG_FORMAT", "xml")])).is_err());
        assert!(Config::from_vars(vars(&[("VITRINE_HOME_ARTICLE_LIMIT", "0")])).is_err());
    }

    #[cfg(feature = "contrib")]
    #[test]
    fn derived_options() {
        let config = Config {
            settings_table: "settings".to_string(),
            home_article_limit: NonZeroUsize::new(3),
            ..Config::default()
        };
        assert_eq!(config.sync_options().table, "settings");
        assert_eq!(config.home_filter().limit, NonZeroUsize::new(3));
        assert!(!config.home_filter().featured);
    }
}
