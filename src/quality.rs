//! Data quality checks.
//!
//! These run alongside a publication rather than inside it: they flag
//! occupation codes with no reference entry, apply the agreed corrections to
//! those codes, and check that a record source honoured the organisation
//! scope contract.

use std::collections::{BTreeMap, BTreeSet};
use std::io;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{PublicationError, PublicationResult};
use crate::models::AbsenceRecord;
use crate::reference::is_excluded_org_code;

/// An occupation code seen in a reporting period.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OccupationCodeObservation {
    /// Reporting period.
    #[serde(rename = "TM_YEAR_MONTH")]
    pub period: String,
    /// Occupation code as recorded.
    #[serde(rename = "OCCUPATION_CODE")]
    pub occupation_code: String,
}

/// Lists observations whose occupation code is not in `valid`.
///
/// The result is sorted and free of duplicates.
///
/// # Example
///
/// ```
/// use absence_rates::quality::{unexpected_occupation_codes, OccupationCodeObservation};
/// use std::collections::BTreeSet;
///
/// let observed = vec![
///     OccupationCodeObservation { period: "2024-03".into(), occupation_code: "N0A".into() },
///     OccupationCodeObservation { period: "2024-03".into(), occupation_code: "ZZZ".into() },
/// ];
/// let valid: BTreeSet<String> = ["N0A".to_string()].into();
///
/// let unexpected = unexpected_occupation_codes(&observed, &valid);
/// assert_eq!(unexpected.len(), 1);
/// assert_eq!(unexpected[0].occupation_code, "ZZZ");
/// ```
pub fn unexpected_occupation_codes(
    observed: &[OccupationCodeObservation],
    valid: &BTreeSet<String>,
) -> Vec<OccupationCodeObservation> {
    let unexpected: BTreeSet<&OccupationCodeObservation> = observed
        .iter()
        .filter(|observation| !valid.contains(&observation.occupation_code))
        .collect();

    if !unexpected.is_empty() {
        warn!(count = unexpected.len(), "Unexpected occupation codes found");
    }

    unexpected.into_iter().cloned().collect()
}

/// Writes unexpected occupation codes as CSV for investigation.
pub fn write_unexpected_occupation_codes<W: io::Write>(
    codes: &[OccupationCodeObservation],
    writer: W,
) -> PublicationResult<()> {
    let to_error = |e: csv::Error| PublicationError::OutputError {
        path: "unexpected_occ_codes".to_string(),
        message: e.to_string(),
    };

    let mut csv_writer = csv::Writer::from_writer(writer);
    for code in codes {
        csv_writer.serialize(code).map_err(to_error)?;
    }
    csv_writer.flush().map_err(|e| PublicationError::OutputError {
        path: "unexpected_occ_codes".to_string(),
        message: e.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct OccupationCodeUpdateRow {
    old_code: String,
    new_code: String,
}

/// Reads agreed occupation code corrections from CSV with the header
/// `old_code,new_code`.
///
/// # Errors
///
/// Returns [`PublicationError::SourceError`] naming `source` when a row
/// cannot be read.
pub fn read_occupation_code_updates<R: io::Read>(
    reader: R,
    source: &str,
) -> PublicationResult<BTreeMap<String, String>> {
    let mut updates = BTreeMap::new();
    for row in csv::Reader::from_reader(reader).deserialize::<OccupationCodeUpdateRow>() {
        let row = row.map_err(|e| PublicationError::SourceError {
            path: source.to_string(),
            message: e.to_string(),
        })?;
        updates.insert(row.old_code, row.new_code);
    }
    Ok(updates)
}

/// Records with corrected occupation codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupationCodeUpdate {
    /// The corrected records, in input order.
    pub records: Vec<AbsenceRecord>,
    /// Number of records whose code changed.
    pub updated: usize,
}

/// Applies occupation code corrections, leaving the input untouched.
pub fn apply_occupation_code_updates(
    records: &[AbsenceRecord],
    updates: &BTreeMap<String, String>,
) -> OccupationCodeUpdate {
    let mut updated = 0;
    let records = records
        .iter()
        .map(|record| {
            let mut record = record.clone();
            if let Some(new_code) = record
                .occupation_code
                .as_ref()
                .and_then(|code| updates.get(code))
            {
                record.occupation_code = Some(new_code.clone());
                updated += 1;
            }
            record
        })
        .collect();

    info!(updated, mappings = updates.len(), "Applied occupation code updates");
    OccupationCodeUpdate { records, updated }
}

/// Lists organisation codes that the record source should have excluded.
///
/// The result is sorted and free of duplicates.
pub fn scope_violations(records: &[AbsenceRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.org_code.as_deref())
        .filter(|code| is_excluded_org_code(code))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
