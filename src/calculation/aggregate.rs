//! Breakdown aggregation.
//!
//! This module provides the grouping primitive every breakdown is built on:
//! filter the records, group them by an ordered list of fields, and sum the
//! FTE day quantities of each group.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::AbsenceRecord;
use crate::reference::known_reason;

use super::filter::RecordFilter;

/// A record attribute that can be grouped or filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupField {
    /// Reporting period.
    Period,
    /// NHS England region code.
    RegionCode,
    /// NHS England region name.
    RegionName,
    /// Organisation code.
    OrgCode,
    /// Organisation name.
    OrgName,
    /// Organisation type.
    ClusterGroup,
    /// Main staff group.
    MainStaffGroup,
    /// Minor staff group.
    MinorStaffGroup,
    /// Medical grade.
    Grade,
    /// Medical or non-medical flag.
    Breed,
    /// Occupation code.
    OccupationCode,
    /// Raw attendance reason.
    AttendanceReason,
    /// Published absence reason label, absent for reasons outside the known list.
    Reason,
}

impl GroupField {
    /// The record attribute name.
    pub fn name(&self) -> &'static str {
        match self {
            GroupField::Period => "period",
            GroupField::RegionCode => "region_code",
            GroupField::RegionName => "region_name",
            GroupField::OrgCode => "org_code",
            GroupField::OrgName => "org_name",
            GroupField::ClusterGroup => "cluster_group",
            GroupField::MainStaffGroup => "main_staff_group",
            GroupField::MinorStaffGroup => "minor_staff_group",
            GroupField::Grade => "grade",
            GroupField::Breed => "breed",
            GroupField::OccupationCode => "occupation_code",
            GroupField::AttendanceReason => "attendance_reason",
            GroupField::Reason => "reason",
        }
    }

    /// Reads this field from a record.
    pub fn value<'a>(&self, record: &'a AbsenceRecord) -> Option<&'a str> {
        match self {
            GroupField::Period => record.period.as_deref(),
            GroupField::RegionCode => record.region_code.as_deref(),
            GroupField::RegionName => record.region_name.as_deref(),
            GroupField::OrgCode => record.org_code.as_deref(),
            GroupField::OrgName => record.org_name.as_deref(),
            GroupField::ClusterGroup => record.cluster_group.as_deref(),
            GroupField::MainStaffGroup => record.main_staff_group.as_deref(),
            GroupField::MinorStaffGroup => record.minor_staff_group.as_deref(),
            GroupField::Grade => record.grade.as_deref(),
            GroupField::Breed => record.breed.as_deref(),
            GroupField::OccupationCode => record.occupation_code.as_deref(),
            GroupField::AttendanceReason => record.attendance_reason.as_deref(),
            GroupField::Reason => record
                .attendance_reason
                .as_deref()
                .and_then(|raw| known_reason(raw).ok()),
        }
    }
}

/// Summed quantities of one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTotals {
    /// Summed FTE days lost.
    pub days_lost: Decimal,
    /// Summed FTE days available.
    pub days_available: Decimal,
    /// Summed FTE days lost to COVID.
    pub days_lost_covid: Decimal,
    /// Number of records in the group.
    pub records: usize,
}

impl GroupTotals {
    fn add(&mut self, record: &AbsenceRecord) {
        if let Some(lost) = record.fte_days_lost {
            self.days_lost += lost;
        }
        if let Some(available) = record.fte_days_available {
            self.days_available += available;
        }
        if let Some(covid) = record.covid_days_lost() {
            self.days_lost_covid += covid;
        }
        self.records += 1;
    }
}

/// The result of one aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    /// Totals per group key, ordered by key.
    pub groups: BTreeMap<Vec<String>, GroupTotals>,
    /// Number of records that passed the filter.
    pub matched: usize,
    /// Filtered records dropped for an absent group key, by the first absent field.
    pub dropped: BTreeMap<GroupField, usize>,
}

impl Aggregation {
    /// Total number of records dropped for absent group keys.
    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }
}

/// Groups filtered records and sums their FTE days.
///
/// Key tuples follow the order of `group_by`, and only combinations present
/// in the data appear. An empty `group_by` yields a single group keyed by the
/// empty tuple whenever at least one record passes the filter.
///
/// Absent numeric values are left out of the sums. A record with an absent
/// value for any grouping field is dropped and counted in
/// [`Aggregation::dropped`] rather than grouped under a placeholder key.
///
/// # Example
///
/// ```
/// use absence_rates::calculation::{aggregate, GroupField, RecordFilter};
/// use absence_rates::models::AbsenceRecord;
/// use rust_decimal::Decimal;
///
/// let records = vec![
///     AbsenceRecord {
///         region_name: Some("London".to_string()),
///         fte_days_lost: Some(Decimal::new(10, 0)),
///         fte_days_available: Some(Decimal::new(300, 0)),
///         ..Default::default()
///     },
///     AbsenceRecord {
///         region_name: Some("London".to_string()),
///         fte_days_lost: Some(Decimal::new(5, 0)),
///         fte_days_available: Some(Decimal::new(400, 0)),
///         ..Default::default()
///     },
/// ];
///
/// let result = aggregate(&records, &[GroupField::RegionName], &RecordFilter::All);
/// let london = &result.groups[&vec!["London".to_string()]];
/// assert_eq!(london.days_lost, Decimal::new(15, 0));
/// assert_eq!(london.days_available, Decimal::new(700, 0));
/// ```
pub fn aggregate(
    records: &[AbsenceRecord],
    group_by: &[GroupField],
    filter: &RecordFilter,
) -> Aggregation {
    let mut aggregation = Aggregation::default();

    for record in records.iter().filter(|record| filter.matches(record)) {
        aggregation.matched += 1;

        let mut key = Vec::with_capacity(group_by.len());
        let mut absent_field = None;
        for field in group_by {
            match field.value(record) {
                Some(value) => key.push(value.to_string()),
                None => {
                    absent_field = Some(*field);
                    break;
                }
            }
        }

        if let Some(field) = absent_field {
            *aggregation.dropped.entry(field).or_insert(0) += 1;
            continue;
        }

        aggregation.groups.entry(key).or_default().add(record);
    }

    aggregation
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_record(region: Option<&str>, lost: Option<&str>, available: Option<&str>) -> AbsenceRecord {
        AbsenceRecord {
            region_code: region.map(|r| format!("Y{}", r.len())),
            region_name: region.map(str::to_string),
            fte_days_lost: lost.map(dec),
            fte_days_available: available.map(dec),
            breed: Some("Med".to_string()),
            ..Default::default()
        }
    }

    /// AG-001: records group by key and sum both quantities
    #[test]
    fn test_groups_and_sums() {
        let records = vec![
            create_test_record(Some("London"), Some("10"), Some("300")),
            create_test_record(Some("Midlands"), Some("20"), Some("200")),
            create_test_record(Some("London"), Some("5"), Some("400")),
            create_test_record(Some("Midlands"), Some("0"), Some("50")),
        ];

        let result = aggregate(&records, &[GroupField::RegionName], &RecordFilter::All);

        assert_eq!(result.matched, 4);
        assert_eq!(result.groups.len(), 2);
        let keys: Vec<&Vec<String>> = result.groups.keys().collect();
        assert_eq!(keys[0], &vec!["London".to_string()]);
        assert_eq!(keys[1], &vec!["Midlands".to_string()]);

        let midlands = &result.groups[&vec!["Midlands".to_string()]];
        assert_eq!(midlands.days_lost, dec("20"));
        assert_eq!(midlands.days_available, dec("250"));
        assert_eq!(midlands.records, 2);
    }

    /// AG-002: empty grouping produces a single total
    #[test]
    fn test_empty_group_by_yields_single_total() {
        let records = vec![
            create_test_record(Some("London"), Some("10"), Some("300")),
            create_test_record(None, Some("2.5"), Some("100")),
        ];

        let result = aggregate(&records, &[], &RecordFilter::All);

        assert_eq!(result.groups.len(), 1);
        let total = &result.groups[&Vec::<String>::new()];
        assert_eq!(total.days_lost, dec("12.5"));
        assert_eq!(total.days_available, dec("400"));
        assert_eq!(result.dropped_total(), 0);
    }

    /// AG-003: absent group key drops the record instead of coercing it
    #[test]
    fn test_absent_group_key_is_dropped() {
        let records = vec![
            create_test_record(Some("London"), Some("10"), Some("300")),
            create_test_record(None, Some("7"), Some("70")),
        ];

        let result = aggregate(
            &records,
            &[GroupField::RegionCode, GroupField::RegionName],
            &RecordFilter::All,
        );

        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.matched, 2);
        assert_eq!(result.dropped.get(&GroupField::RegionCode), Some(&1));
        assert_eq!(result.dropped_total(), 1);
    }

    /// AG-004: absent numeric values are excluded from sums
    #[test]
    fn test_absent_numbers_excluded_from_sum() {
        let records = vec![
            create_test_record(Some("London"), None, Some("300")),
            create_test_record(Some("London"), Some("4"), None),
        ];

        let result = aggregate(&records, &[GroupField::RegionName], &RecordFilter::All);
        let london = &result.groups[&vec!["London".to_string()]];

        assert_eq!(london.days_lost, dec("4"));
        assert_eq!(london.days_available, dec("300"));
        assert_eq!(london.records, 2);
    }

    /// AG-005: filter applies before grouping
    #[test]
    fn test_filter_applies_before_grouping() {
        let mut other = create_test_record(Some("London"), Some("9"), Some("90"));
        other.breed = Some("Non-Med".to_string());
        let records = vec![create_test_record(Some("London"), Some("1"), Some("10")), other];

        let result = aggregate(
            &records,
            &[GroupField::RegionName],
            &RecordFilter::Equals(GroupField::Breed, "Med"),
        );

        assert_eq!(result.matched, 1);
        assert_eq!(result.groups[&vec!["London".to_string()]].days_lost, dec("1"));
    }

    /// AG-006: no matching records yields no groups
    #[test]
    fn test_no_matching_records() {
        let records = vec![create_test_record(Some("London"), Some("1"), Some("10"))];
        let result = aggregate(
            &records,
            &[],
            &RecordFilter::Equals(GroupField::Breed, "Non-Med"),
        );
        assert_eq!(result.matched, 0);
        assert!(result.groups.is_empty());
    }

    #[test]
    fn test_covid_days_are_summed() {
        let mut covid = create_test_record(Some("London"), Some("3"), Some("30"));
        covid.related_reason = Some("Coronavirus (COVID-19)".to_string());
        let records = vec![covid, create_test_record(Some("London"), Some("2"), Some("20"))];

        let result = aggregate(&records, &[], &RecordFilter::All);
        let total = &result.groups[&Vec::<String>::new()];

        assert_eq!(total.days_lost, dec("5"));
        assert_eq!(total.days_lost_covid, dec("3"));
    }

    #[test]
    fn test_reason_field_uses_published_label() {
        let record = AbsenceRecord {
            attendance_reason: Some("Sickness: S11 Back Problems".to_string()),
            ..Default::default()
        };
        assert_eq!(GroupField::Reason.value(&record), Some("S11 Back Problems"));
        assert_eq!(
            GroupField::AttendanceReason.value(&record),
            Some("Sickness: S11 Back Problems")
        );

        let unknown = AbsenceRecord {
            attendance_reason: Some("Bereavement".to_string()),
            ..Default::default()
        };
        assert_eq!(GroupField::Reason.value(&unknown), None);
    }
}
