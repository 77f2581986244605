//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the run
//! configuration from YAML.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{PublicationError, PublicationResult};

use super::types::{PublicationConfig, PublicationConfigFile};

/// Name of the run configuration file inside a configuration directory.
pub const CONFIG_FILE_NAME: &str = "publication.yaml";

/// Loads and provides access to the run configuration.
///
/// # Directory Structure
///
/// ```text
/// config/
/// └── publication.yaml   # month_date, start_date, end_date, output_dir
/// ```
///
/// # Example
///
/// ```no_run
/// use absence_rates::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config")?;
/// println!("Publishing {}", loader.month_date());
/// # Ok::<(), absence_rates::error::PublicationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PublicationConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `publication.yaml` is missing
    /// - the file contains invalid YAML or an invalid date
    /// - a required key is absent
    pub fn load<P: AsRef<Path>>(path: P) -> PublicationResult<Self> {
        let config_path = path.as_ref().join(CONFIG_FILE_NAME);
        let file = Self::load_yaml::<PublicationConfigFile>(&config_path)?;
        Ok(Self {
            config: file.validate()?,
        })
    }

    /// Parses configuration from YAML text; `source` names it in errors.
    pub fn from_yaml_str(content: &str, source: &str) -> PublicationResult<Self> {
        let file: PublicationConfigFile =
            serde_yaml::from_str(content).map_err(|e| PublicationError::ConfigParseError {
                path: source.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            config: file.validate()?,
        })
    }

    /// Wraps an already validated configuration.
    pub fn from_config(config: PublicationConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> PublicationResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| PublicationError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| PublicationError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying run configuration.
    pub fn config(&self) -> &PublicationConfig {
        &self.config
    }

    /// The date stamped into published tables.
    pub fn month_date(&self) -> NaiveDate {
        self.config.month_date
    }
}
