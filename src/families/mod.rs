//! Publication families.
//!
//! Each family module declares its breakdown plans and output schemas and
//! exposes a `build` function that composes, joins, suppresses and assembles
//! its tables from one immutable record set.

pub mod benchmarking;
pub mod covid;
pub mod reason_staff;
pub mod sickness_rates;

use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::calculation::{
    GroupField, OrgAttribute, RecordFilter, TableSchema, assemble, join_latest_org, suppress_rows,
};
use crate::error::PublicationResult;
use crate::models::{
    AbsenceRecord, BreakdownRow, Column, CompositionStep, CompositionTrace, OrgReference,
    PublicationFamily, PublicationTable,
};
use crate::reference::IGNORED_STAFF_GROUPS;

/// Inputs shared by every family build.
#[derive(Debug, Clone, Copy)]
pub struct FamilyInput<'a> {
    /// The family's record set.
    pub records: &'a [AbsenceRecord],
    /// The latest organisation reference.
    pub latest_orgs: &'a [OrgReference],
    /// The date stamped into published tables.
    pub publication_date: NaiveDate,
}

/// The published tables of one family.
#[derive(Debug, Clone, Serialize)]
pub struct FamilyOutput {
    /// The family built.
    pub family: PublicationFamily,
    /// Published tables, in output order.
    pub tables: Vec<PublicationTable>,
    /// The composition trace across every table.
    pub trace: CompositionTrace,
}

impl FamilyOutput {
    /// Returns the table with the given name.
    pub fn table(&self, name: &str) -> Option<&PublicationTable> {
        self.tables.iter().find(|table| table.name == name)
    }
}

/// Builds one publication family.
///
/// # Errors
///
/// Any composition, join or assembly error aborts the family.
///
/// # Example
///
/// ```
/// use absence_rates::families::{build_family, FamilyInput};
/// use absence_rates::models::PublicationFamily;
/// use chrono::NaiveDate;
///
/// let input = FamilyInput {
///     records: &[],
///     latest_orgs: &[],
///     publication_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
/// };
/// assert!(build_family(PublicationFamily::SicknessRates, input).is_err());
/// ```
pub fn build_family(
    family: PublicationFamily,
    input: FamilyInput<'_>,
) -> PublicationResult<FamilyOutput> {
    let start_time = Instant::now();
    info!(family = %family, records = input.records.len(), "Building publication family");

    let mut output = match family {
        PublicationFamily::SicknessRates => sickness_rates::build(input)?,
        PublicationFamily::Benchmarking => benchmarking::build(input)?,
        PublicationFamily::Covid => covid::build(input)?,
        PublicationFamily::ReasonByStaff => reason_staff::build(input)?,
    };

    output.trace.duration_us = start_time.elapsed().as_micros() as u64;
    info!(
        family = %family,
        tables = output.tables.len(),
        warnings = output.trace.warnings.len(),
        duration_us = output.trace.duration_us,
        "Publication family built"
    );

    Ok(output)
}

/// Filter excluding the staff-group ignore-list on `field`.
pub(crate) fn not_ignored(field: GroupField) -> RecordFilter {
    RecordFilter::NotIn(field, IGNORED_STAFF_GROUPS)
}

/// Joins rows to the latest organisation reference, recording the join.
pub(crate) fn join(
    family: PublicationFamily,
    rows: Vec<BreakdownRow>,
    latest_orgs: &[OrgReference],
    attributes: &[(Column, OrgAttribute)],
    trace: &mut CompositionTrace,
) -> PublicationResult<Vec<BreakdownRow>> {
    let joined = join_latest_org(family, rows, latest_orgs, attributes, trace.next_step())?;
    trace.steps.push(joined.audit_step);
    trace.warnings.extend(joined.warnings);
    Ok(joined.rows)
}

/// Suppresses and assembles rows into a published table, recording both.
pub(crate) fn publish(
    family: PublicationFamily,
    rows: Vec<BreakdownRow>,
    schema: &TableSchema,
    publication_date: NaiveDate,
    trace: &mut CompositionTrace,
) -> PublicationResult<PublicationTable> {
    let suppression = suppress_rows(rows, trace.next_step());
    trace.steps.push(suppression.audit_step);

    let table = assemble(family, schema, &suppression.rows, publication_date)?;
    let step_number = trace.next_step();
    trace.steps.push(CompositionStep {
        step_number,
        breakdown: schema.name.to_string(),
        breakdown_type: "ASSEMBLY".to_string(),
        condition: "published column order".to_string(),
        input: serde_json::json!({
            "rows": suppression.rows.len()
        }),
        output: serde_json::json!({
            "columns": table.columns.iter().map(Column::header).collect::<Vec<_>>(),
            "rows": table.rows.len()
        }),
        reasoning: format!(
            "Assembled {} rows into '{}' dated {}",
            table.rows.len(),
            schema.name,
            publication_date
        ),
    });

    Ok(table)
}

#[cfg(test)]
pub(crate) mod test_support {
    use rust_decimal::Decimal;
    use std::str::FromStr;

    use crate::models::{AbsenceRecord, OrgReference};

    pub fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    /// A fully populated record; tests override the fields they exercise.
    pub fn create_test_record(org_code: &str, lost: &str, available: &str) -> AbsenceRecord {
        let (region_code, region_name) = match org_code {
            "RJ1" | "RJ2" => ("Y56", "London"),
            _ => ("Y60", "Midlands"),
        };
        AbsenceRecord {
            fte_days_lost: Some(dec(lost)),
            fte_days_available: Some(dec(available)),
            region_code: Some(region_code.to_string()),
            region_name: Some(region_name.to_string()),
            org_code: Some(org_code.to_string()),
            org_name: Some(format!("{} Trust", org_code)),
            cluster_group: Some("Acute".to_string()),
            main_staff_group: Some("Professionally qualified clinical staff".to_string()),
            minor_staff_group: Some("HCHS Doctors".to_string()),
            grade: Some("Consultant".to_string()),
            breed: Some("Med".to_string()),
            occupation_code: Some("010".to_string()),
            attendance_reason: Some("S11 Back Problems".to_string()),
            related_reason: None,
            period: Some("2024-03-31".to_string()),
        }
    }

    /// A non-medical record with an uppercase occupation code.
    pub fn create_test_nurse(org_code: &str, lost: &str, available: &str) -> AbsenceRecord {
        AbsenceRecord {
            main_staff_group: Some("Nurses & health visitors".to_string()),
            minor_staff_group: Some("Nurses & health visitors".to_string()),
            grade: None,
            breed: Some("Non-Med".to_string()),
            occupation_code: Some("N0A".to_string()),
            ..create_test_record(org_code, lost, available)
        }
    }

    pub fn create_test_reference(org_code: &str) -> OrgReference {
        OrgReference {
            org_code: org_code.to_string(),
            org_name: format!("{} NHS Foundation Trust", org_code),
            region_code: Some("Y56".to_string()),
            region_name: Some("London".to_string()),
            cluster_group: Some("Acute".to_string()),
            benchmark_group: Some("Acute - Large".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_build_family_records_duration_and_tables() {
        let records = vec![
            create_test_record("RJ1", "10", "1000"),
            create_test_record("RK1", "20", "2000"),
            create_test_nurse("RJ1", "30", "1500"),
        ];
        let references = vec![create_test_reference("RJ1"), create_test_reference("RK1")];
        let input = FamilyInput {
            records: &records,
            latest_orgs: &references,
            publication_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        };

        for family in PublicationFamily::ALL {
            let output = build_family(family, input).unwrap();
            assert_eq!(output.family, family);
            assert!(!output.tables.is_empty());
            assert!(!output.trace.steps.is_empty());
            let numbers: Vec<u32> = output.trace.steps.iter().map(|s| s.step_number).collect();
            let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
            assert_eq!(numbers, expected);
        }
    }
}
