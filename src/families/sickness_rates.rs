//! Sickness absence rates family.
//!
//! Produces two tables: the national breakdowns that feed the monthly
//! workbook (England, region, staff group, medical grade, organisation type)
//! and the dated per-organisation rates table.

use crate::calculation::{
    BreakdownSpec, FamilyPlan, GroupField, LabelSource, PlanStep, RecordFilter, TableSchema,
    compose,
};
use crate::error::PublicationResult;
use crate::models::{
    BreakdownRow, BreakdownType, Column, CompositionTrace, Measure, PublicationFamily,
};
use crate::reference::{ALL_ENGLAND, HCHS_DOCTORS, MEDICAL_BREED, SPECIAL_HEALTH_AUTHORITY};

use super::{FamilyInput, FamilyOutput, not_ignored, publish};

/// Name of the national breakdowns table.
pub const BREAKDOWNS_TABLE: &str = "csv_absence_excel_production";
/// Name of the per-organisation rates table.
pub const REPORTING_ORG_TABLE: &str = "csv_absence_rates";

const FAMILY: PublicationFamily = PublicationFamily::SicknessRates;

fn national(spec: BreakdownSpec) -> BreakdownSpec {
    spec.label(Column::NhseRegionCode, LabelSource::Null)
        .label(Column::NhseRegionName, LabelSource::Null)
}

fn special_health_authority_row() -> BreakdownRow {
    let mut row = BreakdownRow {
        breakdown_type: BreakdownType::OrganisationType,
        breakdown_value: Some(SPECIAL_HEALTH_AUTHORITY.to_string()),
        labels: Default::default(),
        fte_days_lost: Measure::Missing,
        fte_days_available: Measure::Missing,
        fte_days_lost_covid: None,
        rate_percent: Measure::NotApplicable,
    };
    row.set_label(Column::BreakdownValue, Some(SPECIAL_HEALTH_AUTHORITY.to_string()));
    row.set_label(Column::NhseRegionCode, None);
    row.set_label(Column::NhseRegionName, None);
    row
}

/// The national breakdowns, in published order.
pub fn breakdowns_plan() -> FamilyPlan {
    let steps = vec![
        PlanStep::Aggregate(national(
            BreakdownSpec::new("all_england", BreakdownType::AllEngland)
                .value(Column::BreakdownValue, LabelSource::Literal(ALL_ENGLAND)),
        )),
        PlanStep::Aggregate(
            BreakdownSpec::new("region", BreakdownType::Region)
                .group_by(&[GroupField::RegionCode, GroupField::RegionName])
                .value(Column::BreakdownValue, LabelSource::Group(GroupField::RegionName))
                .label(Column::NhseRegionCode, LabelSource::Group(GroupField::RegionCode))
                .label(Column::NhseRegionName, LabelSource::Group(GroupField::RegionName)),
        ),
        PlanStep::Aggregate(national(
            BreakdownSpec::new("major_staff_groups", BreakdownType::MajorStaffGroup)
                .group_by(&[GroupField::MainStaffGroup])
                .filter(not_ignored(GroupField::MainStaffGroup))
                .value(Column::BreakdownValue, LabelSource::Group(GroupField::MainStaffGroup)),
        )),
        PlanStep::Aggregate(national(
            BreakdownSpec::new("minor_staff_groups", BreakdownType::MinorStaffGroup)
                .group_by(&[GroupField::MinorStaffGroup])
                .filter(not_ignored(GroupField::MinorStaffGroup))
                .value(Column::BreakdownValue, LabelSource::Group(GroupField::MinorStaffGroup)),
        )),
        PlanStep::Aggregate(national(
            BreakdownSpec::new("minor_staff_grades", BreakdownType::MinorStaffGrade)
                .group_by(&[GroupField::Grade])
                .filter(RecordFilter::AllOf(vec![
                    RecordFilter::Equals(GroupField::MinorStaffGroup, HCHS_DOCTORS),
                    RecordFilter::Equals(GroupField::Breed, MEDICAL_BREED),
                ]))
                .value(Column::BreakdownValue, LabelSource::Group(GroupField::Grade)),
        )),
        PlanStep::Aggregate(national(
            BreakdownSpec::new("organisation_type", BreakdownType::OrganisationType)
                .group_by(&[GroupField::ClusterGroup])
                .value(Column::BreakdownValue, LabelSource::Group(GroupField::ClusterGroup)),
        )),
        PlanStep::Placeholder {
            name: "special_health_authority",
            row: special_health_authority_row(),
        },
    ];

    FamilyPlan {
        family: FAMILY,
        steps,
        tracks_covid: false,
    }
}

/// Published schema of the national breakdowns table.
pub fn breakdowns_schema() -> TableSchema {
    TableSchema::new(
        BREAKDOWNS_TABLE,
        &[
            Column::BreakdownType,
            Column::BreakdownValue,
            Column::NhseRegionCode,
            Column::NhseRegionName,
            Column::FteDaysLost,
            Column::FteDaysAvailable,
            Column::SicknessAbsenceRatePercent,
        ],
    )
}

/// One row per reporting organisation.
pub fn reporting_org_plan() -> FamilyPlan {
    let spec = BreakdownSpec::new("reporting_org", BreakdownType::ReportingOrg)
        .group_by(&[
            GroupField::RegionCode,
            GroupField::RegionName,
            GroupField::OrgCode,
            GroupField::OrgName,
            GroupField::ClusterGroup,
        ])
        .value(Column::OrgCode, LabelSource::Group(GroupField::OrgCode))
        .label(Column::NhseRegionCode, LabelSource::Group(GroupField::RegionCode))
        .label(Column::NhseRegionName, LabelSource::Group(GroupField::RegionName))
        .label(Column::OrgName, LabelSource::Group(GroupField::OrgName))
        .label(Column::ClusterGroup, LabelSource::Group(GroupField::ClusterGroup));

    FamilyPlan {
        family: FAMILY,
        steps: vec![PlanStep::Aggregate(spec)],
        tracks_covid: false,
    }
}

/// Published schema of the per-organisation rates table.
pub fn reporting_org_schema() -> TableSchema {
    TableSchema::new(
        REPORTING_ORG_TABLE,
        &[
            Column::Date,
            Column::NhseRegionCode,
            Column::NhseRegionName,
            Column::OrgCode,
            Column::OrgName,
            Column::OrgType,
            Column::FteDaysLost,
            Column::FteDaysAvailable,
            Column::SicknessAbsenceRatePercent,
        ],
    )
    .rename(Column::ClusterGroup, Column::OrgType)
}

/// Builds both sickness rates tables.
pub fn build(input: FamilyInput<'_>) -> PublicationResult<FamilyOutput> {
    let mut trace = CompositionTrace::default();

    let breakdowns = compose(&breakdowns_plan(), input.records)?;
    trace.extend(breakdowns.trace);
    let breakdowns_table = publish(
        FAMILY,
        breakdowns.rows,
        &breakdowns_schema(),
        input.publication_date,
        &mut trace,
    )?;

    let by_org = compose(&reporting_org_plan(), input.records)?;
    trace.extend(by_org.trace);
    let by_org_table = publish(
        FAMILY,
        by_org.rows,
        &reporting_org_schema(),
        input.publication_date,
        &mut trace,
    )?;

    Ok(FamilyOutput {
        family: FAMILY,
        tables: vec![breakdowns_table, by_org_table],
        trace,
    })
}
