//! Request types for the publication API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{AbsenceRecord, OrgReference};

/// Request body for the `/publications` endpoints.
///
/// Records are taken as already scoped by the caller, the same contract a
/// warehouse extract honours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationRequest {
    /// The absence records to publish.
    pub records: Vec<AbsenceRecord>,
    /// The latest organisation reference.
    #[serde(default)]
    pub latest_orgs: Vec<OrgReference>,
    /// Overrides the configured date stamped into tables.
    #[serde(default)]
    pub publication_date: Option<NaiveDate>,
}

impl PublicationRequest {
    /// The date to stamp, falling back to `configured`.
    pub fn publication_date_or(&self, configured: NaiveDate) -> NaiveDate {
        self.publication_date.unwrap_or(configured)
    }
}
