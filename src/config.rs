use std::env;
use std::str::FromStr;

use slog::Level;
use thiserror::Error;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_ADMIN_PORT: u16 = 5001;

/// Enumerates errors in the environment-provided configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not parse {name}={value:?}")]
    Unparseable { name: &'static str, value: String },
}

/// Runtime settings, read from the environment (and `.env`).
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// The port serving the survey.
    pub port: u16,

    /// The port serving health checks.
    pub admin_port: u16,

    /// The Postgres connection string. Submissions are kept in memory
    /// when this is absent.
    pub database_url: Option<String>,

    pub log_level: Level,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads settings through `lookup`, which returns the value of the
    /// named variable if it is defined.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        Ok(Settings {
            port: parse_or(&lookup, "CO2_PORT", DEFAULT_PORT)?,
            admin_port: parse_or(&lookup, "CO2_ADMIN_PORT", DEFAULT_ADMIN_PORT)?,
            database_url,
            log_level: parse_or(&lookup, "CO2_LOG_LEVEL", Level::Info)?,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Unparseable { name, value }),
        None => Ok(default),
    }
}
