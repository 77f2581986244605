//! Join of organisation-level rows to the latest organisation reference.

use std::collections::HashMap;

use tracing::warn;

use crate::error::{PublicationError, PublicationResult};
use crate::models::{
    BreakdownRow, Column, CompositionStep, CompositionWarning, OrgReference, PublicationFamily,
};

/// An attribute supplied by the organisation reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgAttribute {
    /// Current organisation name.
    OrgName,
    /// NHS England region code.
    RegionCode,
    /// NHS England region name.
    RegionName,
    /// Organisation type.
    ClusterGroup,
    /// Benchmarking peer group.
    BenchmarkGroup,
}

impl OrgAttribute {
    fn value(&self, reference: &OrgReference) -> Option<String> {
        match self {
            OrgAttribute::OrgName => Some(reference.org_name.clone()),
            OrgAttribute::RegionCode => reference.region_code.clone(),
            OrgAttribute::RegionName => reference.region_name.clone(),
            OrgAttribute::ClusterGroup => reference.cluster_group.clone(),
            OrgAttribute::BenchmarkGroup => reference.benchmark_group.clone(),
        }
    }
}

/// The result of joining rows to the organisation reference.
#[derive(Debug, Clone)]
pub struct JoinResult {
    /// Rows whose organisation code matched, in input order.
    pub rows: Vec<BreakdownRow>,
    /// Organisation codes that had no reference entry.
    pub unmatched: Vec<String>,
    /// Warnings for dropped rows.
    pub warnings: Vec<CompositionWarning>,
    /// The audit step recording this join.
    pub audit_step: CompositionStep,
}

/// Inner-joins rows to the latest organisation reference on `ORG_CODE`.
///
/// Each matched row gains the requested reference attributes as labels.
/// Rows with no reference entry are dropped and reported. When the reference
/// lists a code twice, the first entry wins.
///
/// # Errors
///
/// Returns [`PublicationError::SchemaMismatch`] when a row does not carry an
/// `ORG_CODE` label.
pub fn join_latest_org(
    family: PublicationFamily,
    rows: Vec<BreakdownRow>,
    references: &[OrgReference],
    attributes: &[(Column, OrgAttribute)],
    step_number: u32,
) -> PublicationResult<JoinResult> {
    let mut by_code: HashMap<&str, &OrgReference> = HashMap::new();
    for reference in references {
        by_code.entry(reference.org_code.as_str()).or_insert(reference);
    }

    let total = rows.len();
    let mut joined = Vec::with_capacity(total);
    let mut unmatched: Vec<String> = Vec::new();

    for mut row in rows {
        let code = row
            .label(Column::OrgCode)
            .map(str::to_string)
            .ok_or_else(|| PublicationError::SchemaMismatch {
                family: family.to_string(),
                column: Column::OrgCode.header().to_string(),
                context: format!(
                    "join key missing from breakdown '{}'",
                    row.breakdown_type.label()
                ),
            })?;

        match by_code.get(code.as_str()) {
            Some(reference) => {
                for (column, attribute) in attributes {
                    row.set_label(*column, attribute.value(reference));
                }
                joined.push(row);
            }
            None => {
                if !unmatched.contains(&code) {
                    unmatched.push(code);
                }
            }
        }
    }

    let dropped = total - joined.len();
    let mut warnings = Vec::new();
    if !unmatched.is_empty() {
        warn!(
            family = %family,
            rows_dropped = dropped,
            org_codes = ?unmatched,
            "Organisations missing from latest organisation reference"
        );
        warnings.push(CompositionWarning::new(
            "ORG_NOT_IN_REFERENCE",
            format!(
                "{} rows dropped for organisations missing from the reference: {}",
                dropped,
                unmatched.join(", ")
            ),
            "medium",
        ));
    }

    let audit_step = CompositionStep {
        step_number,
        breakdown: "latest_org_join".to_string(),
        breakdown_type: "JOIN".to_string(),
        condition: "inner join on ORG_CODE".to_string(),
        input: serde_json::json!({
            "rows": total,
            "reference_entries": references.len(),
            "attributes": attributes.iter().map(|(c, _)| c.header()).collect::<Vec<_>>()
        }),
        output: serde_json::json!({
            "rows": joined.len(),
            "rows_dropped": dropped,
            "unmatched_org_codes": unmatched
        }),
        reasoning: format!(
            "{} of {} rows matched an organisation reference entry",
            joined.len(),
            total
        ),
    };

    Ok(JoinResult {
        rows: joined,
        unmatched,
        warnings,
        audit_step,
    })
}
