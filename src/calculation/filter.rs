//! Record filters applied before grouping.

use crate::models::AbsenceRecord;

use super::aggregate::GroupField;

/// A predicate over absence records.
///
/// Filters never mutate records; they select the view a breakdown is
/// computed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    /// Every record.
    All,
    /// Records whose field equals the value. Absent values never match.
    Equals(GroupField, &'static str),
    /// Records whose field is not one of the values. Absent values pass.
    NotIn(GroupField, &'static [&'static str]),
    /// Records whose occupation code contains an uppercase ASCII letter.
    NonMedicalOccupation,
    /// Records matching every inner filter.
    AllOf(Vec<RecordFilter>),
}

impl RecordFilter {
    /// Returns true if `record` passes this filter.
    pub fn matches(&self, record: &AbsenceRecord) -> bool {
        match self {
            RecordFilter::All => true,
            RecordFilter::Equals(field, expected) => field.value(record) == Some(*expected),
            RecordFilter::NotIn(field, excluded) => field
                .value(record)
                .is_none_or(|value| !excluded.contains(&value)),
            RecordFilter::NonMedicalOccupation => record
                .occupation_code
                .as_deref()
                .is_some_and(|code| code.chars().any(|c| c.is_ascii_uppercase())),
            RecordFilter::AllOf(filters) => filters.iter().all(|filter| filter.matches(record)),
        }
    }

    /// A human-readable description used in traces and errors.
    ///
    /// # Example
    ///
    /// ```
    /// use absence_rates::calculation::{GroupField, RecordFilter};
    ///
    /// let filter = RecordFilter::Equals(GroupField::Breed, "Med");
    /// assert_eq!(filter.describe(), "breed = Med");
    /// ```
    pub fn describe(&self) -> String {
        match self {
            RecordFilter::All => "all records".to_string(),
            RecordFilter::Equals(field, expected) => format!("{} = {}", field.name(), expected),
            RecordFilter::NotIn(field, excluded) => {
                format!("{} not in [{}]", field.name(), excluded.join(", "))
            }
            RecordFilter::NonMedicalOccupation => {
                "occupation_code contains an uppercase letter".to_string()
            }
            RecordFilter::AllOf(filters) => filters
                .iter()
                .map(RecordFilter::describe)
                .collect::<Vec<_>>()
                .join(" and "),
        }
    }
}
