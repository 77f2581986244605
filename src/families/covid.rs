//! COVID absence family.
//!
//! Crosses geography (England, region, organisation) with staff dimension
//! (all staff, major group, minor group, medical grade), tracking the days
//! lost to COVID-related absence alongside the totals. England and region
//! rows are composed in one table and organisation rows in another; the
//! organisation rows take their names from the latest organisation
//! reference before the two are unioned.

use crate::calculation::{
    BreakdownSpec, FamilyPlan, GroupField, LabelSource, OrgAttribute, PlanStep, RecordFilter,
    TableSchema, compose,
};
use crate::error::PublicationResult;
use crate::models::{
    BreakdownType, Column, CompositionTrace, Geography, PublicationFamily, StaffDimension,
};
use crate::reference::{ALL_NHSE_REGIONS, ALL_ORGANISATIONS, ALL_STAFF_GROUPS, MEDICAL_BREED};

use super::{FamilyInput, FamilyOutput, join, not_ignored, publish};

/// Name of the COVID table.
pub const COVID_TABLE: &str = "covid";

const FAMILY: PublicationFamily = PublicationFamily::Covid;

const STAFF_DIMENSIONS: [StaffDimension; 4] = [
    StaffDimension::AllStaff,
    StaffDimension::MajorGroup,
    StaffDimension::MinorGroup,
    StaffDimension::MedicalGrade,
];

fn spec_name(geography: Geography, staff: StaffDimension) -> &'static str {
    match (geography, staff) {
        (Geography::England, StaffDimension::AllStaff) => "england_all_staff",
        (Geography::England, StaffDimension::MajorGroup) => "england_major_staff_groups",
        (Geography::England, StaffDimension::MinorGroup) => "england_minor_staff_groups",
        (Geography::England, StaffDimension::MedicalGrade) => "england_medical_grades",
        (Geography::Region, StaffDimension::AllStaff) => "region_all_staff",
        (Geography::Region, StaffDimension::MajorGroup) => "region_major_staff_groups",
        (Geography::Region, StaffDimension::MinorGroup) => "region_minor_staff_groups",
        (Geography::Region, StaffDimension::MedicalGrade) => "region_medical_grades",
        (Geography::Organisation, StaffDimension::AllStaff) => "org_all_staff",
        (Geography::Organisation, StaffDimension::MajorGroup) => "org_major_staff_groups",
        (Geography::Organisation, StaffDimension::MinorGroup) => "org_minor_staff_groups",
        (Geography::Organisation, StaffDimension::MedicalGrade) => "org_medical_grades",
    }
}

fn geography_fields(geography: Geography) -> &'static [GroupField] {
    match geography {
        Geography::England => &[GroupField::Period],
        Geography::Region => &[GroupField::Period, GroupField::RegionCode, GroupField::RegionName],
        Geography::Organisation => &[
            GroupField::Period,
            GroupField::RegionCode,
            GroupField::RegionName,
            GroupField::OrgCode,
        ],
    }
}

/// The breakdown for one geography and staff dimension.
pub fn covid_spec(geography: Geography, staff: StaffDimension) -> BreakdownSpec {
    let mut group_by = geography_fields(geography).to_vec();
    let (filter, value) = match staff {
        StaffDimension::AllStaff => (RecordFilter::All, LabelSource::Literal(ALL_STAFF_GROUPS)),
        StaffDimension::MajorGroup => {
            group_by.push(GroupField::MainStaffGroup);
            (
                not_ignored(GroupField::MainStaffGroup),
                LabelSource::Group(GroupField::MainStaffGroup),
            )
        }
        StaffDimension::MinorGroup => {
            group_by.push(GroupField::MinorStaffGroup);
            (
                not_ignored(GroupField::MinorStaffGroup),
                LabelSource::Group(GroupField::MinorStaffGroup),
            )
        }
        StaffDimension::MedicalGrade => {
            group_by.push(GroupField::Grade);
            (
                RecordFilter::Equals(GroupField::Breed, MEDICAL_BREED),
                LabelSource::Group(GroupField::Grade),
            )
        }
    };

    let spec = BreakdownSpec::new(spec_name(geography, staff), BreakdownType::Covid { geography, staff })
        .group_by(&group_by)
        .filter(filter)
        .value(Column::StaffGroup, value);

    match geography {
        Geography::England => spec
            .label(Column::NhseRegionCode, LabelSource::Literal(ALL_NHSE_REGIONS))
            .label(Column::NhseRegionName, LabelSource::Literal(ALL_NHSE_REGIONS))
            .label(Column::OrgCode, LabelSource::Literal(ALL_ORGANISATIONS))
            .label(Column::OrgName, LabelSource::Literal(ALL_ORGANISATIONS)),
        Geography::Region => spec
            .label(Column::NhseRegionCode, LabelSource::Group(GroupField::RegionCode))
            .label(Column::NhseRegionName, LabelSource::Group(GroupField::RegionName))
            .label(Column::OrgCode, LabelSource::Literal(ALL_ORGANISATIONS))
            .label(Column::OrgName, LabelSource::Literal(ALL_ORGANISATIONS)),
        Geography::Organisation => spec
            .label(Column::NhseRegionCode, LabelSource::Group(GroupField::RegionCode))
            .label(Column::NhseRegionName, LabelSource::Group(GroupField::RegionName))
            .label(Column::OrgCode, LabelSource::Group(GroupField::OrgCode)),
    }
}

fn plan_for(geographies: &[Geography]) -> FamilyPlan {
    let steps = geographies
        .iter()
        .flat_map(|geography| {
            STAFF_DIMENSIONS
                .iter()
                .map(move |staff| PlanStep::Aggregate(covid_spec(*geography, *staff)))
        })
        .collect();

    FamilyPlan {
        family: FAMILY,
        steps,
        tracks_covid: true,
    }
}

/// England and region breakdowns.
pub fn england_region_plan() -> FamilyPlan {
    plan_for(&[Geography::England, Geography::Region])
}

/// Organisation breakdowns.
pub fn organisation_plan() -> FamilyPlan {
    plan_for(&[Geography::Organisation])
}

/// Published schema of the COVID table.
pub fn schema() -> TableSchema {
    TableSchema::new(
        COVID_TABLE,
        &[
            Column::Date,
            Column::NhseRegionCode,
            Column::NhseRegionName,
            Column::OrgCode,
            Column::OrgName,
            Column::StaffGroup,
            Column::FteDaysAvailable,
            Column::FteDaysLost,
            Column::FteDaysLostCovid,
        ],
    )
}

/// Builds the COVID table.
pub fn build(input: FamilyInput<'_>) -> PublicationResult<FamilyOutput> {
    let mut trace = CompositionTrace::default();

    let england_region = compose(&england_region_plan(), input.records)?;
    trace.extend(england_region.trace);

    let organisations = compose(&organisation_plan(), input.records)?;
    trace.extend(organisations.trace);
    let organisation_rows = join(
        FAMILY,
        organisations.rows,
        input.latest_orgs,
        &[(Column::OrgName, OrgAttribute::OrgName)],
        &mut trace,
    )?;

    let mut rows = england_region.rows;
    rows.extend(organisation_rows);
    let table = publish(FAMILY, rows, &schema(), input.publication_date, &mut trace)?;

    Ok(FamilyOutput {
        family: FAMILY,
        tables: vec![table],
        trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::families::test_support::*;
    use crate::models::{AbsenceRecord, Cell};
    use chrono::NaiveDate;

    fn create_test_records() -> Vec<AbsenceRecord> {
        let mut covid = create_test_record("RJ1", "300", "3000");
        covid.related_reason = Some("Coronavirus (COVID-19) - self isolating".to_string());
        vec![
            covid,
            create_test_record("RJ1", "100", "4000"),
            create_test_nurse("RK1", "50", "2000"),
        ]
    }

    fn build_with(records: &[AbsenceRecord]) -> FamilyOutput {
        let references = vec![create_test_reference("RJ1"), create_test_reference("RK1")];
        build(FamilyInput {
            records,
            latest_orgs: &references,
            publication_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        })
        .unwrap()
    }

    /// CV-001: England all-staff row carries national labels and COVID days
    #[test]
    fn test_england_all_staff_row() {
        let output = build_with(&create_test_records());
        let table = output.table(COVID_TABLE).unwrap();

        assert_eq!(
            table.rows[0],
            vec![
                Cell::Date(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()),
                Cell::Text("All NHSE regions".to_string()),
                Cell::Text("All NHSE regions".to_string()),
                Cell::Text("All organisations".to_string()),
                Cell::Text("All organisations".to_string()),
                Cell::Text("All staff groups".to_string()),
                Cell::Number(dec("9000")),
                Cell::Number(dec("450")),
                Cell::Number(dec("300")),
            ]
        );
    }

    /// CV-002: geography order is England, region, then organisation
    #[test]
    fn test_union_order() {
        let output = build_with(&create_test_records());
        let table = output.table(COVID_TABLE).unwrap();
        let orgs: Vec<String> = table.rows.iter().map(|r| r[3].render()).collect();

        let first_org = orgs.iter().position(|o| o != "All organisations").unwrap();
        assert!(orgs[first_org..].iter().all(|o| o != "All organisations"));
        assert_eq!(orgs[first_org], "RJ1");
        // England: all + 2 major + 2 minor + 1 grade; regions: 2 + 2 + 2 + 1
        assert_eq!(first_org, 13);
    }

    /// CV-003: organisation rows take the reference name
    #[test]
    fn test_organisation_rows_joined() {
        let output = build_with(&create_test_records());
        let table = output.table(COVID_TABLE).unwrap();
        let row = table
            .find_row(&[(Column::OrgCode, "RK1"), (Column::StaffGroup, "All staff groups")])
            .unwrap();

        assert_eq!(row[4].render(), "RK1 NHS Foundation Trust");
        assert_eq!(row[2].render(), "Midlands");
        assert_eq!(row[8], Cell::Number(dec("0")));
    }

    /// CV-004: medical grades derive from medical staff only
    #[test]
    fn test_medical_grades_only_from_medical_staff() {
        let output = build_with(&create_test_records());
        let table = output.table(COVID_TABLE).unwrap();
        let row = table
            .find_row(&[(Column::OrgCode, "All organisations"), (Column::StaffGroup, "Consultant")])
            .unwrap();
        assert_eq!(row[6], Cell::Number(dec("7000")));
    }

    /// CV-005: small rows blank all three figures
    #[test]
    fn test_suppression_blanks_covid_days() {
        let mut records = create_test_records();
        records.push(AbsenceRecord {
            main_staff_group: Some("Midwives".to_string()),
            minor_staff_group: Some("Midwives".to_string()),
            ..create_test_nurse("RK1", "5", "100")
        });

        let output = build_with(&records);
        let table = output.table(COVID_TABLE).unwrap();
        let row = table
            .find_row(&[(Column::OrgCode, "All organisations"), (Column::StaffGroup, "Midwives")])
            .unwrap();

        assert_eq!(row[6..], [Cell::Blank, Cell::Blank, Cell::Blank]);
    }

    #[test]
    fn test_plans_cover_every_crossing() {
        assert_eq!(england_region_plan().specs().count(), 8);
        assert_eq!(organisation_plan().specs().count(), 4);
        assert!(england_region_plan().tracks_covid);
    }
}
