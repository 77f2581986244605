//! Reason for absence by staff group family.
//!
//! Crosses the staff dimensions with the absence reason. Every staff slice is
//! published once over all reasons and once per known reason; records whose
//! reason is outside the published list only count towards the all-reasons
//! rows.

use crate::calculation::{
    BreakdownSpec, FamilyPlan, GroupField, LabelSource, PlanStep, RecordFilter, TableSchema,
    compose,
};
use crate::error::PublicationResult;
use crate::models::{BreakdownType, Column, CompositionTrace, PublicationFamily, StaffDimension};
use crate::reference::{ALL_REASONS, ALL_STAFF_GROUPS, MEDICAL_BREED};

use super::{FamilyInput, FamilyOutput, not_ignored, publish};

/// Name of the reason by staff group table.
pub const REASON_TABLE: &str = "reason_absence";

const FAMILY: PublicationFamily = PublicationFamily::ReasonByStaff;

/// Staff slice and reason crossings, in published order.
const CROSSINGS: [(StaffDimension, bool); 8] = [
    (StaffDimension::AllStaff, true),
    (StaffDimension::AllStaff, false),
    (StaffDimension::MajorGroup, true),
    (StaffDimension::MinorGroup, true),
    (StaffDimension::MedicalGrade, true),
    (StaffDimension::MajorGroup, false),
    (StaffDimension::MinorGroup, false),
    (StaffDimension::MedicalGrade, false),
];

fn spec_name(staff: StaffDimension, all_reasons: bool) -> &'static str {
    match (staff, all_reasons) {
        (StaffDimension::AllStaff, true) => "all_staff_all_reasons",
        (StaffDimension::AllStaff, false) => "all_staff_by_reason",
        (StaffDimension::MajorGroup, true) => "major_staff_groups_all_reasons",
        (StaffDimension::MajorGroup, false) => "major_staff_groups_by_reason",
        (StaffDimension::MinorGroup, true) => "minor_staff_groups_all_reasons",
        (StaffDimension::MinorGroup, false) => "minor_staff_groups_by_reason",
        (StaffDimension::MedicalGrade, true) => "medical_grades_all_reasons",
        (StaffDimension::MedicalGrade, false) => "medical_grades_by_reason",
    }
}

/// The breakdown for one staff slice, over all reasons or per reason.
pub fn reason_spec(staff: StaffDimension, all_reasons: bool) -> BreakdownSpec {
    let mut group_by = vec![GroupField::Period];
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
                RecordFilter::AllOf(vec![
                    RecordFilter::Equals(GroupField::Breed, MEDICAL_BREED),
                    not_ignored(GroupField::Grade),
                ]),
                LabelSource::Group(GroupField::Grade),
            )
        }
    };

    let reason = if all_reasons {
        LabelSource::Literal(ALL_REASONS)
    } else {
        group_by.push(GroupField::Reason);
        LabelSource::Group(GroupField::Reason)
    };

    BreakdownSpec::new(
        spec_name(staff, all_reasons),
        BreakdownType::Reason { staff, all_reasons },
    )
    .group_by(&group_by)
    .filter(filter)
    .value(Column::StaffGroup, value)
    .label(Column::Reason, reason)
}

/// All eight staff and reason crossings.
pub fn plan() -> FamilyPlan {
    FamilyPlan {
        family: FAMILY,
        steps: CROSSINGS
            .iter()
            .map(|(staff, all_reasons)| PlanStep::Aggregate(reason_spec(*staff, *all_reasons)))
            .collect(),
        tracks_covid: false,
    }
}

/// Published schema of the reason table.
pub fn schema() -> TableSchema {
    TableSchema::new(
        REASON_TABLE,
        &[
            Column::Date,
            Column::StaffGroup,
            Column::Reason,
            Column::FteDaysLost,
            Column::FteDaysAvailable,
        ],
    )
}

/// Builds the reason by staff group table.
pub fn build(input: FamilyInput<'_>) -> PublicationResult<FamilyOutput> {
    let composition = compose(&plan(), input.records)?;
    let mut trace = CompositionTrace::default();
    trace.extend(composition.trace);

    let table = publish(
        FAMILY,
        composition.rows,
        &schema(),
        input.publication_date,
        &mut trace,
    )?;

    Ok(FamilyOutput {
        family: FAMILY,
        tables: vec![table],
        trace,
    })
}
