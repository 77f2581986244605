//! Configuration types for a publication run.
//!
//! This module contains the run configuration deserialized from
//! `publication.yaml`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{PublicationError, PublicationResult};

/// Settings for one publication run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationConfig {
    /// The date stamped into every published table.
    pub month_date: NaiveDate,
    /// Start of the reporting window, inclusive. Also suffixes output files.
    pub start_date: NaiveDate,
    /// End of the reporting window, exclusive.
    pub end_date: NaiveDate,
    /// Directory the CSV outputs are written to.
    pub output_dir: PathBuf,
}

impl PublicationConfig {
    /// File name of a table's CSV output for this run.
    pub fn output_file_name(&self, table: &str) -> String {
        format!("{}_{}.csv", table, self.start_date)
    }
}

/// `publication.yaml` as written, before required keys are checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PublicationConfigFile {
    #[serde(default)]
    month_date: Option<NaiveDate>,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    end_date: Option<NaiveDate>,
    #[serde(default)]
    output_dir: Option<PathBuf>,
}

fn required<T>(value: Option<T>, key: &str) -> PublicationResult<T> {
    value.ok_or_else(|| PublicationError::MissingConfigValue {
        key: key.to_string(),
    })
}

impl PublicationConfigFile {
    /// Checks that every required key is present.
    pub(crate) fn validate(self) -> PublicationResult<PublicationConfig> {
        Ok(PublicationConfig {
            month_date: required(self.month_date, "month_date")?,
            start_date: required(self.start_date, "start_date")?,
            end_date: required(self.end_date, "end_date")?,
            output_dir: required(self.output_dir, "output_dir")?,
        })
    }
}
