//! Organisation benchmarking tool family.
//!
//! Every organisation gets an all-staff row, an HCHS Doctors row and one row
//! per non-medical minor staff group. Rows are then joined to the latest
//! organisation reference for current names, regions and peer groups.

use crate::calculation::{
    BreakdownSpec, FamilyPlan, GroupField, LabelSource, OrgAttribute, PlanStep, RecordFilter,
    TableSchema, compose,
};
use crate::error::PublicationResult;
use crate::models::{
    BreakdownRow, BreakdownType, Column, CompositionStep, CompositionTrace, PublicationFamily,
    StaffDimension,
};
use crate::reference::{
    ALL_STAFF_GROUPS, HCHS_DOCTORS, UNKNOWN_STAFF_GROUP, UNKNOWN_STAFF_GROUP_LABEL,
};

use super::{FamilyInput, FamilyOutput, join, publish};

/// Name of the benchmarking table.
pub const BENCHMARKING_TABLE: &str = "benchmarking_csv";

const FAMILY: PublicationFamily = PublicationFamily::Benchmarking;

const REFERENCE_ATTRIBUTES: &[(Column, OrgAttribute)] = &[
    (Column::NhseRegionCode, OrgAttribute::RegionCode),
    (Column::NhseRegionName, OrgAttribute::RegionName),
    (Column::OrgName, OrgAttribute::OrgName),
    (Column::ClusterGroup, OrgAttribute::ClusterGroup),
    (Column::BenchmarkGroup, OrgAttribute::BenchmarkGroup),
];

fn per_org(name: &'static str, staff: StaffDimension) -> BreakdownSpec {
    BreakdownSpec::new(name, BreakdownType::Organisation(staff))
        .label(Column::OrgCode, LabelSource::Group(GroupField::OrgCode))
}

/// The per-organisation breakdowns, in published order.
pub fn plan() -> FamilyPlan {
    let steps = vec![
        PlanStep::Aggregate(
            per_org("org_all_staff", StaffDimension::AllStaff)
                .group_by(&[GroupField::OrgCode])
                .value(Column::StaffGroup, LabelSource::Literal(ALL_STAFF_GROUPS)),
        ),
        PlanStep::Aggregate(
            per_org("org_hchs_doctors", StaffDimension::MinorGroup)
                .group_by(&[GroupField::OrgCode])
                .filter(RecordFilter::Equals(GroupField::MinorStaffGroup, HCHS_DOCTORS))
                .value(Column::StaffGroup, LabelSource::Literal(HCHS_DOCTORS)),
        ),
        PlanStep::Aggregate(
            per_org("org_non_medical_staff_groups", StaffDimension::MinorGroup)
                .group_by(&[GroupField::OrgCode, GroupField::MinorStaffGroup])
                .filter(RecordFilter::NonMedicalOccupation)
                .value(Column::StaffGroup, LabelSource::Group(GroupField::MinorStaffGroup)),
        ),
    ];

    FamilyPlan {
        family: FAMILY,
        steps,
        tracks_covid: false,
    }
}

/// Published schema of the benchmarking table.
pub fn schema() -> TableSchema {
    TableSchema::new(
        BENCHMARKING_TABLE,
        &[
            Column::Date,
            Column::NhseRegionCode,
            Column::NhseRegionName,
            Column::OrgCode,
            Column::OrgName,
            Column::ClusterGroup,
            Column::BenchmarkGroup,
            Column::StaffGroup,
            Column::FteDaysLost,
            Column::FteDaysAvailable,
            Column::SicknessAbsenceRatePercent,
        ],
    )
}

/// Publishes the raw `Unknown` staff group under its descriptive label.
fn relabel_unknown(rows: &mut [BreakdownRow], step_number: u32) -> CompositionStep {
    let mut relabelled = 0;
    for row in rows.iter_mut() {
        if row.label(Column::StaffGroup) == Some(UNKNOWN_STAFF_GROUP) {
            row.breakdown_value = Some(UNKNOWN_STAFF_GROUP_LABEL.to_string());
            row.set_label(Column::StaffGroup, Some(UNKNOWN_STAFF_GROUP_LABEL.to_string()));
            relabelled += 1;
        }
    }

    CompositionStep {
        step_number,
        breakdown: "unknown_staff_group".to_string(),
        breakdown_type: "RELABEL".to_string(),
        condition: format!("STAFF_GROUP = {}", UNKNOWN_STAFF_GROUP),
        input: serde_json::json!({ "rows": rows.len() }),
        output: serde_json::json!({ "rows_relabelled": relabelled }),
        reasoning: format!(
            "{} rows relabelled '{}'",
            relabelled, UNKNOWN_STAFF_GROUP_LABEL
        ),
    }
}

/// Builds the benchmarking table.
pub fn build(input: FamilyInput<'_>) -> PublicationResult<FamilyOutput> {
    let composition = compose(&plan(), input.records)?;
    let mut trace = CompositionTrace::default();
    trace.extend(composition.trace);

    let mut rows = composition.rows;
    let step = relabel_unknown(&mut rows, trace.next_step());
    trace.steps.push(step);

    let rows = join(FAMILY, rows, input.latest_orgs, REFERENCE_ATTRIBUTES, &mut trace)?;
    let table = publish(FAMILY, rows, &schema(), input.publication_date, &mut trace)?;

    Ok(FamilyOutput {
        family: FAMILY,
        tables: vec![table],
        trace,
    })
}
