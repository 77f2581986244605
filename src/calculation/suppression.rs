//! Statistical disclosure control.
//!
//! Rows whose FTE days available are at or below the threshold have their
//! days lost, days available, COVID days lost and rate blanked. Applied after
//! every aggregation and join, immediately before assembly.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{BreakdownRow, CompositionStep, Measure};
use crate::reference::suppression_threshold;

/// The result of suppressing a set of rows.
#[derive(Debug, Clone)]
pub struct SuppressionResult {
    /// Rows after disclosure control.
    pub rows: Vec<BreakdownRow>,
    /// Number of rows that were blanked.
    pub suppressed: usize,
    /// The audit step recording this pass.
    pub audit_step: CompositionStep,
}

/// Returns true when a days-available figure is small enough to disclose
/// individuals.
pub fn is_disclosive(days_available: Decimal) -> bool {
    days_available <= suppression_threshold()
}

/// Applies disclosure control to a single row.
///
/// Only a published days-available figure triggers suppression, so
/// placeholder rows and rows already suppressed pass through unchanged.
///
/// # Example
///
/// ```
/// use absence_rates::calculation::suppress;
/// use absence_rates::models::{BreakdownRow, BreakdownType, Measure};
/// use rust_decimal::Decimal;
///
/// let row = BreakdownRow {
///     breakdown_type: BreakdownType::Region,
///     breakdown_value: Some("Midlands".to_string()),
///     labels: Default::default(),
///     fte_days_lost: Measure::Value(Decimal::new(20, 0)),
///     fte_days_available: Measure::Value(Decimal::new(250, 0)),
///     fte_days_lost_covid: None,
///     rate_percent: Measure::Value(Decimal::new(800, 2)),
/// };
///
/// let row = suppress(row);
/// assert_eq!(row.fte_days_lost, Measure::Suppressed);
/// assert_eq!(row.fte_days_available, Measure::Suppressed);
/// assert_eq!(row.rate_percent, Measure::Suppressed);
/// ```
pub fn suppress(mut row: BreakdownRow) -> BreakdownRow {
    let disclosive = row
        .fte_days_available
        .value()
        .is_some_and(is_disclosive);

    if disclosive {
        row.fte_days_lost = Measure::Suppressed;
        row.fte_days_available = Measure::Suppressed;
        row.rate_percent = Measure::Suppressed;
        if row.fte_days_lost_covid.is_some() {
            row.fte_days_lost_covid = Some(Measure::Suppressed);
        }
    }

    row
}

/// Applies disclosure control to every row of a table.
///
/// # Arguments
///
/// * `rows` - The composed (and joined) rows
/// * `step_number` - The step number for trace sequencing
pub fn suppress_rows(rows: Vec<BreakdownRow>, step_number: u32) -> SuppressionResult {
    let total = rows.len();
    let already_suppressed = rows
        .iter()
        .filter(|row| row.fte_days_available.is_suppressed())
        .count();

    let rows: Vec<BreakdownRow> = rows.into_iter().map(suppress).collect();
    let suppressed = rows
        .iter()
        .filter(|row| row.fte_days_available.is_suppressed())
        .count()
        - already_suppressed;

    debug!(rows = total, suppressed, "Applied disclosure control");

    let threshold = suppression_threshold();
    let audit_step = CompositionStep {
        step_number,
        breakdown: "suppression".to_string(),
        breakdown_type: "DISCLOSURE_CONTROL".to_string(),
        condition: format!("fte_days_available <= {}", threshold),
        input: serde_json::json!({
            "rows": total,
            "threshold": threshold.to_string()
        }),
        output: serde_json::json!({
            "rows_suppressed": suppressed
        }),
        reasoning: format!(
            "{} of {} rows have {} or fewer FTE days available and were blanked",
            suppressed, total, threshold
        ),
    };

    SuppressionResult {
        rows,
        suppressed,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BreakdownType;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_row(available: Measure, covid: Option<Measure>) -> BreakdownRow {
        BreakdownRow {
            breakdown_type: BreakdownType::Region,
            breakdown_value: Some("London".to_string()),
            labels: Default::default(),
            fte_days_lost: Measure::Value(dec("15")),
            fte_days_available: available,
            fte_days_lost_covid: covid,
            rate_percent: Measure::Value(dec("2.14")),
        }
    }

    /// SP-001: at the threshold the row is blanked
    #[test]
    fn test_threshold_is_inclusive() {
        let row = suppress(create_test_row(Measure::Value(dec("330")), None));
        assert_eq!(row.fte_days_lost, Measure::Suppressed);
        assert_eq!(row.fte_days_available, Measure::Suppressed);
        assert_eq!(row.rate_percent, Measure::Suppressed);
        assert_eq!(row.breakdown_value.as_deref(), Some("London"));
    }

    /// SP-002: above the threshold nothing changes
    #[test]
    fn test_above_threshold_unchanged() {
        let original = create_test_row(Measure::Value(dec("330.01")), None);
        assert_eq!(suppress(original.clone()), original);
    }

    /// SP-003: COVID days lost are blanked with the rest
    #[test]
    fn test_covid_measure_blanked() {
        let row = suppress(create_test_row(
            Measure::Value(dec("12")),
            Some(Measure::Value(dec("3"))),
        ));
        assert_eq!(row.fte_days_lost_covid, Some(Measure::Suppressed));

        let row = suppress(create_test_row(Measure::Value(dec("12")), None));
        assert_eq!(row.fte_days_lost_covid, None);
    }

    /// SP-004: placeholder rows are never suppressed
    #[test]
    fn test_placeholder_not_suppressed() {
        let mut placeholder = create_test_row(Measure::Missing, None);
        placeholder.rate_percent = Measure::NotApplicable;
        assert_eq!(suppress(placeholder.clone()), placeholder);
    }

    /// SP-005: suppression is idempotent
    #[test]
    fn test_suppression_is_idempotent() {
        let rows = vec![
            create_test_row(Measure::Value(dec("250")), None),
            create_test_row(Measure::Value(dec("700")), None),
        ];
        let first = suppress_rows(rows, 1);
        assert_eq!(first.suppressed, 1);

        let second = suppress_rows(first.rows.clone(), 2);
        assert_eq!(second.suppressed, 0);
        assert_eq!(second.rows, first.rows);
        assert_eq!(second.audit_step.output["rows_suppressed"], 0);
    }

    #[test]
    fn test_zero_available_is_suppressed() {
        let mut row = create_test_row(Measure::Value(Decimal::ZERO), None);
        row.rate_percent = Measure::Missing;
        let row = suppress(row);
        assert_eq!(row.rate_percent, Measure::Suppressed);
    }
}
