//! Absence record and organisation reference models.
//!
//! Records arrive from the data-access layer already scoped to one
//! publication month. That layer owns the scope contract:
//!
//! - organisation codes `8HK67`, `8J318`, `8J149`, `NL1` and every code
//!   starting with `5` or `Q` are removed;
//! - organisations are kept when their validity period overlaps the
//!   half-open interval `[start_date, end_date)`;
//! - only English organisations are returned.
//!
//! The engine never re-applies these filters. [`crate::quality`] can report
//! records that breach them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::reference::{COVID_REASON_PREFIX, MEDICAL_BREED};

/// One absence observation.
///
/// Every attribute is optional because each publication family queries a
/// different subset of columns. An absent grouping attribute is never
/// coerced into a group key, and an absent numeric value is left out of sums.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbsenceRecord {
    /// FTE days lost to sickness absence.
    pub fte_days_lost: Option<Decimal>,
    /// FTE days available to work.
    pub fte_days_available: Option<Decimal>,
    /// NHS England region code.
    pub region_code: Option<String>,
    /// NHS England region name.
    pub region_name: Option<String>,
    /// Organisation code.
    pub org_code: Option<String>,
    /// Organisation name.
    pub org_name: Option<String>,
    /// Organisation type (cluster group).
    pub cluster_group: Option<String>,
    /// Main (major) staff group.
    pub main_staff_group: Option<String>,
    /// Minor staff group.
    pub minor_staff_group: Option<String>,
    /// Medical grade.
    pub grade: Option<String>,
    /// Medical or non-medical flag (`Med` for medical staff).
    pub breed: Option<String>,
    /// Occupation code.
    pub occupation_code: Option<String>,
    /// Attendance reason label.
    pub attendance_reason: Option<String>,
    /// Related reason, used to identify COVID absence.
    pub related_reason: Option<String>,
    /// Reporting period (month end date).
    pub period: Option<String>,
}

impl AbsenceRecord {
    /// Returns true if the record describes medical staff.
    pub fn is_medical(&self) -> bool {
        self.breed.as_deref() == Some(MEDICAL_BREED)
    }

    /// Returns true if the absence is COVID related.
    pub fn is_covid_related(&self) -> bool {
        self.related_reason
            .as_deref()
            .is_some_and(|reason| reason.starts_with(COVID_REASON_PREFIX))
    }

    /// Days lost that count towards the COVID total.
    ///
    /// Equal to the days lost for a COVID-related absence and zero otherwise.
    /// Absent when the days lost are absent.
    ///
    /// # Example
    ///
    /// ```
    /// use absence_rates::models::AbsenceRecord;
    /// use rust_decimal::Decimal;
    ///
    /// let record = AbsenceRecord {
    ///     fte_days_lost: Some(Decimal::new(4, 0)),
    ///     related_reason: Some("Coronavirus (COVID-19) - positive test".to_string()),
    ///     ..Default::default()
    /// };
    /// assert_eq!(record.covid_days_lost(), Some(Decimal::new(4, 0)));
    /// ```
    pub fn covid_days_lost(&self) -> Option<Decimal> {
        self.fte_days_lost.map(|lost| {
            if self.is_covid_related() {
                lost
            } else {
                Decimal::ZERO
            }
        })
    }
}

/// One entry of the latest organisation reference table.
///
/// Supplies current names, regions and peer groups for organisation-level
/// outputs, keyed on the organisation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgReference {
    /// Organisation code.
    pub org_code: String,
    /// Current organisation name.
    pub org_name: String,
    /// NHS England region code.
    #[serde(default)]
    pub region_code: Option<String>,
    /// NHS England region name.
    #[serde(default)]
    pub region_name: Option<String>,
    /// Organisation type (cluster group).
    #[serde(default)]
    pub cluster_group: Option<String>,
    /// Benchmarking peer group.
    #[serde(default)]
    pub benchmark_group: Option<String>,
}
