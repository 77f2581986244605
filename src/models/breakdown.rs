//! Breakdown rows and the vocabulary used to label them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PublicationError;

/// The four publication families produced each month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationFamily {
    /// Sickness absence rates by region, staff group, grade and organisation.
    SicknessRates,
    /// Organisation benchmarking tool.
    Benchmarking,
    /// COVID-related absence.
    Covid,
    /// Days lost by absence reason and staff group.
    ReasonByStaff,
}

impl PublicationFamily {
    /// All families in publication order.
    pub const ALL: [PublicationFamily; 4] = [
        PublicationFamily::SicknessRates,
        PublicationFamily::Benchmarking,
        PublicationFamily::Covid,
        PublicationFamily::ReasonByStaff,
    ];

    /// The identifier used in logs, errors and API paths.
    pub fn id(&self) -> &'static str {
        match self {
            PublicationFamily::SicknessRates => "sickness_rates",
            PublicationFamily::Benchmarking => "benchmarking",
            PublicationFamily::Covid => "covid",
            PublicationFamily::ReasonByStaff => "reason_by_staff",
        }
    }
}

impl fmt::Display for PublicationFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for PublicationFamily {
    type Err = PublicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PublicationFamily::ALL
            .into_iter()
            .find(|family| family.id() == s)
            .ok_or_else(|| PublicationError::UnknownBreakdownValue {
                field: "family".to_string(),
                value: s.to_string(),
            })
    }
}

/// The staff dimension of a crossed breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffDimension {
    /// Every staff group together.
    AllStaff,
    /// Main staff groups.
    MajorGroup,
    /// Minor staff groups.
    MinorGroup,
    /// Medical grades.
    MedicalGrade,
}

impl StaffDimension {
    fn code(&self) -> &'static str {
        match self {
            StaffDimension::AllStaff => "ALL_STAFF",
            StaffDimension::MajorGroup => "MAJOR_STAFF_GROUP",
            StaffDimension::MinorGroup => "MINOR_STAFF_GROUP",
            StaffDimension::MedicalGrade => "MINOR_STAFF_GRADE",
        }
    }
}

/// The geography dimension of a COVID breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Geography {
    /// National total.
    England,
    /// NHS England region.
    Region,
    /// Individual organisation.
    Organisation,
}

impl Geography {
    fn code(&self) -> &'static str {
        match self {
            Geography::England => "ENGLAND",
            Geography::Region => "REGION",
            Geography::Organisation => "ORGANISATION",
        }
    }
}

/// What a breakdown row summarises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownType {
    /// National total.
    AllEngland,
    /// NHS England region.
    Region,
    /// Main staff group.
    MajorStaffGroup,
    /// Minor staff group.
    MinorStaffGroup,
    /// Medical grade within HCHS Doctors.
    MinorStaffGrade,
    /// Organisation type (cluster group).
    OrganisationType,
    /// Single reporting organisation.
    ReportingOrg,
    /// Organisation by staff dimension (benchmarking).
    Organisation(StaffDimension),
    /// Geography by staff dimension (COVID).
    Covid {
        /// Geographic level.
        geography: Geography,
        /// Staff level.
        staff: StaffDimension,
    },
    /// Staff dimension by absence reason.
    Reason {
        /// Staff level.
        staff: StaffDimension,
        /// True for rows computed over every reason.
        all_reasons: bool,
    },
}

impl BreakdownType {
    /// The published label of this breakdown type.
    ///
    /// # Example
    ///
    /// ```
    /// use absence_rates::models::{BreakdownType, Geography, StaffDimension};
    ///
    /// assert_eq!(BreakdownType::MinorStaffGrade.label(), "MINOR_STAFF_GRADES");
    /// let covid = BreakdownType::Covid {
    ///     geography: Geography::Region,
    ///     staff: StaffDimension::MajorGroup,
    /// };
    /// assert_eq!(covid.label(), "COVID_REGION_MAJOR_STAFF_GROUP");
    /// ```
    pub fn label(&self) -> String {
        match self {
            BreakdownType::AllEngland => "ALL_ENGLAND".to_string(),
            BreakdownType::Region => "REGION".to_string(),
            BreakdownType::MajorStaffGroup => "MAJOR_STAFF_GROUPS".to_string(),
            BreakdownType::MinorStaffGroup => "MINOR_STAFF_GROUPS".to_string(),
            BreakdownType::MinorStaffGrade => "MINOR_STAFF_GRADES".to_string(),
            BreakdownType::OrganisationType => "ORGANISATION_TYPE".to_string(),
            BreakdownType::ReportingOrg => "REPORTING_ORG".to_string(),
            BreakdownType::Organisation(staff) => format!("ORGANISATION_{}", staff.code()),
            BreakdownType::Covid { geography, staff } => {
                format!("COVID_{}_{}", geography.code(), staff.code())
            }
            BreakdownType::Reason { staff, all_reasons } => {
                let reason = if *all_reasons { "ALL_REASONS" } else { "BY_REASON" };
                format!("REASON_{}_{}", staff.code(), reason)
            }
        }
    }

    /// The staff dimension, for types that carry one.
    pub fn staff_dimension(&self) -> Option<StaffDimension> {
        match self {
            BreakdownType::MajorStaffGroup => Some(StaffDimension::MajorGroup),
            BreakdownType::MinorStaffGroup => Some(StaffDimension::MinorGroup),
            BreakdownType::MinorStaffGrade => Some(StaffDimension::MedicalGrade),
            BreakdownType::Organisation(staff)
            | BreakdownType::Covid { staff, .. }
            | BreakdownType::Reason { staff, .. } => Some(*staff),
            _ => None,
        }
    }
}

/// A named column of a publication table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Column {
    /// Publication date stamp.
    Date,
    /// Breakdown type label.
    BreakdownType,
    /// Breakdown group label.
    BreakdownValue,
    /// NHS England region code.
    NhseRegionCode,
    /// NHS England region name.
    NhseRegionName,
    /// Organisation code.
    OrgCode,
    /// Organisation name.
    OrgName,
    /// Organisation type.
    ClusterGroup,
    /// Organisation type, as published in the reporting organisation table.
    OrgType,
    /// Benchmarking peer group.
    BenchmarkGroup,
    /// Staff group label.
    StaffGroup,
    /// Absence reason label.
    Reason,
    /// FTE days lost.
    FteDaysLost,
    /// FTE days available.
    FteDaysAvailable,
    /// FTE days lost to COVID.
    FteDaysLostCovid,
    /// Sickness absence rate.
    SicknessAbsenceRatePercent,
}

impl Column {
    /// The published header of this column.
    pub fn header(&self) -> &'static str {
        match self {
            Column::Date => "DATE",
            Column::BreakdownType => "BREAKDOWN_TYPE",
            Column::BreakdownValue => "BREAKDOWN_VALUE",
            Column::NhseRegionCode => "NHSE_REGION_CODE",
            Column::NhseRegionName => "NHSE_REGION_NAME",
            Column::OrgCode => "ORG_CODE",
            Column::OrgName => "ORG_NAME",
            Column::ClusterGroup => "CLUSTER_GROUP",
            Column::OrgType => "ORG_TYPE",
            Column::BenchmarkGroup => "BENCHMARK_GROUP",
            Column::StaffGroup => "STAFF_GROUP",
            Column::Reason => "REASON",
            Column::FteDaysLost => "FTE_DAYS_LOST",
            Column::FteDaysAvailable => "FTE_DAYS_AVAILABLE",
            Column::FteDaysLostCovid => "FTE_DAYS_LOST_COVID",
            Column::SicknessAbsenceRatePercent => "SICKNESS_ABSENCE_RATE_PERCENT",
        }
    }
}

/// A numeric output value and the reasons it may be withheld.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Measure {
    /// A published figure.
    Value(Decimal),
    /// Blanked by disclosure control.
    Suppressed,
    /// The category does not apply (published as a sentinel).
    NotApplicable,
    /// No figure could be computed.
    Missing,
}

impl Measure {
    /// The published figure, if any.
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Measure::Value(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns true if the figure was blanked by disclosure control.
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Measure::Suppressed)
    }
}

/// One labelled output row.
///
/// `labels` holds every text column the row can publish. A key mapped to
/// `None` is a deliberately empty label; a key that is absent means the row
/// cannot supply that column at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownRow {
    /// What the row summarises.
    pub breakdown_type: BreakdownType,
    /// The group label.
    pub breakdown_value: Option<String>,
    /// Text columns.
    pub labels: BTreeMap<Column, Option<String>>,
    /// Summed FTE days lost.
    pub fte_days_lost: Measure,
    /// Summed FTE days available.
    pub fte_days_available: Measure,
    /// Summed FTE days lost to COVID, for families that track it.
    pub fte_days_lost_covid: Option<Measure>,
    /// Sickness absence rate percentage.
    pub rate_percent: Measure,
}

impl BreakdownRow {
    /// Returns the label published in `column`, if set.
    pub fn label(&self, column: Column) -> Option<&str> {
        self.labels.get(&column).and_then(|label| label.as_deref())
    }

    /// Sets the label published in `column`.
    pub fn set_label(&mut self, column: Column, value: Option<String>) {
        self.labels.insert(column, value);
    }
}
