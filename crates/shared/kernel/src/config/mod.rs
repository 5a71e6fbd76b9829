//! Typed configuration lookups by dotted key.
//!
//! [`Settings`] layers an optional file (`docket.toml`, or any format the `config` crate
//! recognises by extension) under environment overrides prefixed with `DOCKET__`.
//! Nested keys use double underscores: `DOCKET__SERVER__PORT` maps to `server.port`.
//!
//! Every lookup is classified at this boundary:
//! * a missing key is [`ErrorKind::NotFound`];
//! * a value that cannot be coerced to the requested type is [`ErrorKind::Internal`].

pub mod duration;

use crate::error::{Error, ErrorKind, Result};
use config::{Config, ConfigError, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Default configuration file stem, resolved relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "docket";

/// Environment prefix for overrides.
pub const ENV_PREFIX: &str = "DOCKET";

/// Read-only configuration port consumed by components at construction time.
pub trait Configuration: Send + Sync {
    /// # Errors
    /// `NotFound` when the key is absent, `Internal` when the value is not a string.
    fn get_string(&self, key: &str) -> Result<String>;

    /// # Errors
    /// `NotFound` when the key is absent, `Internal` when the value is not an integer.
    fn get_int(&self, key: &str) -> Result<i64>;

    /// # Errors
    /// `NotFound` when the key is absent, `Internal` when the value is not a boolean.
    fn get_bool(&self, key: &str) -> Result<bool>;

    fn is_set(&self, key: &str) -> bool;

    /// Reads a duration such as `"10s"` or `"1m30s"`.
    ///
    /// # Errors
    /// `NotFound` when the key is absent, `Internal` when the value does not parse.
    fn get_duration(&self, key: &str) -> Result<Duration> {
        let raw = self.get_string(key)?;
        duration::parse(&raw).map_err(|err| {
            Error::wrap_as(ErrorKind::Internal, err, invalid_type_message(key))
        })
    }
}

fn not_found_message(key: &str) -> String {
    format!("Failed to get key ({key}) from configuration")
}

fn invalid_type_message(key: &str) -> String {
    format!("Invalid data type for key ({key}) from configuration")
}

/// [`Configuration`] backed by the `config` crate.
#[derive(Debug, Clone)]
pub struct Settings {
    inner: Config,
}

impl Settings {
    /// Loads the configuration file and environment overrides.
    ///
    /// With `Some(path)` the file must exist. With `None`, [`DEFAULT_CONFIG_PATH`] is used
    /// when present and the environment alone otherwise.
    ///
    /// # Errors
    /// Returns an `Internal` error if the file is missing (when explicitly requested) or
    /// malformed.
    pub fn load(path: Option<impl AsRef<Path>>) -> Result<Self> {
        let (effective_path, required) = path.map_or_else(
            || (PathBuf::from(DEFAULT_CONFIG_PATH), false),
            |p| (p.as_ref().to_path_buf(), true),
        );

        info!(path = %effective_path.display(), required, "Loading configuration");

        let inner = Config::builder()
            .add_source(File::from(effective_path.as_path()).required(required))
            .add_source(environment())
            .build()
            .map_err(|err| {
                Error::wrap_as(ErrorKind::Internal, err, "Failed to load configuration")
            })?;

        Ok(Self { inner })
    }

    /// Builds settings from an inline TOML document, still honouring environment overrides.
    ///
    /// # Errors
    /// Returns an `Internal` error if the document does not parse.
    pub fn from_toml(source: &str) -> Result<Self> {
        let inner = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .add_source(environment())
            .build()
            .map_err(|err| {
                Error::wrap_as(ErrorKind::Internal, err, "Failed to parse configuration")
            })?;

        Ok(Self { inner })
    }

    fn lookup<T>(key: &str, value: std::result::Result<T, ConfigError>) -> Result<T> {
        match value {
            Ok(value) => Ok(value),
            Err(ConfigError::NotFound(_)) => Err(Error::not_found(not_found_message(key))),
            Err(err) => Err(Error::wrap_as(ErrorKind::Internal, err, invalid_type_message(key))),
        }
    }
}

impl From<Config> for Settings {
    fn from(inner: Config) -> Self {
        Self { inner }
    }
}

impl Configuration for Settings {
    fn get_string(&self, key: &str) -> Result<String> {
        Self::lookup(key, self.inner.get_string(key))
    }

    fn get_int(&self, key: &str) -> Result<i64> {
        Self::lookup(key, self.inner.get_int(key))
    }

    fn get_bool(&self, key: &str) -> Result<bool> {
        Self::lookup(key, self.inner.get_bool(key))
    }

    fn is_set(&self, key: &str) -> bool {
        self.inner.get::<config::Value>(key).is_ok()
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator("__").convert_case(config::Case::Snake)
}
