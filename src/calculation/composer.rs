//! Breakdown composition.
//!
//! A publication family is described as a [`FamilyPlan`]: an ordered list of
//! declarative [`BreakdownSpec`]s plus any fixed placeholder rows. [`compose`]
//! runs the aggregator once per spec, labels every group, computes its rate
//! and concatenates the results in plan order.

use std::time::Instant;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::error::{PublicationError, PublicationResult};
use crate::models::{
    AbsenceRecord, BreakdownRow, BreakdownType, Column, CompositionStep, CompositionTrace,
    CompositionWarning, Measure, PublicationFamily,
};

use super::aggregate::{aggregate, GroupField, GroupTotals};
use super::filter::RecordFilter;
use super::rate::absence_rate;

/// Where a row label comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelSource {
    /// The value of a grouping field.
    Group(GroupField),
    /// A fixed text.
    Literal(&'static str),
    /// A deliberately empty label.
    Null,
}

/// One declarative breakdown: what to filter, what to group by and how to
/// label the resulting rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownSpec {
    /// Name used in traces and errors.
    pub name: &'static str,
    /// Breakdown type stamped on every row.
    pub breakdown_type: BreakdownType,
    /// Grouping fields, in key order.
    pub group_by: Vec<GroupField>,
    /// Record filter applied before grouping.
    pub filter: RecordFilter,
    /// Source of the breakdown value.
    pub value: LabelSource,
    /// Column the breakdown value is published in.
    pub value_column: Column,
    /// Additional label columns.
    pub labels: Vec<(Column, LabelSource)>,
}

impl BreakdownSpec {
    /// Starts a spec over all records with no grouping and an empty value.
    pub fn new(name: &'static str, breakdown_type: BreakdownType) -> Self {
        Self {
            name,
            breakdown_type,
            group_by: Vec::new(),
            filter: RecordFilter::All,
            value: LabelSource::Null,
            value_column: Column::BreakdownValue,
            labels: Vec::new(),
        }
    }

    /// Sets the grouping fields.
    pub fn group_by(mut self, fields: &[GroupField]) -> Self {
        self.group_by = fields.to_vec();
        self
    }

    /// Sets the record filter.
    pub fn filter(mut self, filter: RecordFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the breakdown value and the column it is published in.
    pub fn value(mut self, column: Column, source: LabelSource) -> Self {
        self.value_column = column;
        self.value = source;
        self
    }

    /// Adds a label column.
    pub fn label(mut self, column: Column, source: LabelSource) -> Self {
        self.labels.push((column, source));
        self
    }
}

/// One step of a family plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    /// Aggregate the records per the spec.
    Aggregate(BreakdownSpec),
    /// Emit a fixed row for a category known to have no data.
    Placeholder {
        /// Name used in traces.
        name: &'static str,
        /// The row emitted.
        row: BreakdownRow,
    },
}

/// The ordered breakdowns of one output table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyPlan {
    /// The family the table belongs to.
    pub family: PublicationFamily,
    /// Steps, in output order.
    pub steps: Vec<PlanStep>,
    /// Whether rows carry COVID days lost.
    pub tracks_covid: bool,
}

impl FamilyPlan {
    /// Iterates over the aggregating specs of the plan.
    pub fn specs(&self) -> impl Iterator<Item = &BreakdownSpec> {
        self.steps.iter().filter_map(|step| match step {
            PlanStep::Aggregate(spec) => Some(spec),
            PlanStep::Placeholder { .. } => None,
        })
    }
}

/// Rows and trace produced by composing a plan.
#[derive(Debug, Clone)]
pub struct Composition {
    /// Rows, in plan order.
    pub rows: Vec<BreakdownRow>,
    /// One step per plan step, plus warnings.
    pub trace: CompositionTrace,
}

/// Composes every step of a plan against one immutable record set.
///
/// # Errors
///
/// - [`PublicationError::EmptyGroupResult`] when a spec's filter matches no
///   records.
/// - [`PublicationError::SchemaMismatch`] when a spec labels a row from a
///   field it does not group by.
///
/// Zero days available never fails: the row's rate is [`Measure::Missing`]
/// and a `DIVISION_UNDEFINED` warning is recorded.
pub fn compose(plan: &FamilyPlan, records: &[AbsenceRecord]) -> PublicationResult<Composition> {
    let start_time = Instant::now();
    let mut rows = Vec::new();
    let mut trace = CompositionTrace::default();

    for step in &plan.steps {
        let step_number = trace.next_step();
        match step {
            PlanStep::Aggregate(spec) => {
                let composed = compose_breakdown(plan, spec, records, step_number)?;
                rows.extend(composed.rows);
                trace.steps.push(composed.audit_step);
                trace.warnings.extend(composed.warnings);
            }
            PlanStep::Placeholder { name, row } => {
                rows.push(row.clone());
                trace.steps.push(CompositionStep {
                    step_number,
                    breakdown: name.to_string(),
                    breakdown_type: row.breakdown_type.label(),
                    condition: "fixed row".to_string(),
                    input: serde_json::json!({}),
                    output: serde_json::json!({
                        "breakdown_value": row.breakdown_value,
                        "rows": 1
                    }),
                    reasoning: format!(
                        "Placeholder row for {} with no reporting data",
                        row.breakdown_value.as_deref().unwrap_or("unnamed category")
                    ),
                });
            }
        }
    }

    trace.duration_us = start_time.elapsed().as_micros() as u64;
    info!(
        family = %plan.family,
        rows = rows.len(),
        warnings = trace.warnings.len(),
        "Composed family breakdowns"
    );

    Ok(Composition { rows, trace })
}

struct BreakdownResult {
    rows: Vec<BreakdownRow>,
    audit_step: CompositionStep,
    warnings: Vec<CompositionWarning>,
}

enum ResolvedLabel {
    Key(usize),
    Literal(&'static str),
    Null,
}

impl ResolvedLabel {
    fn apply(&self, key: &[String]) -> Option<String> {
        match self {
            ResolvedLabel::Key(index) => key.get(*index).cloned(),
            ResolvedLabel::Literal(text) => Some(text.to_string()),
            ResolvedLabel::Null => None,
        }
    }
}

fn resolve_label(
    plan: &FamilyPlan,
    spec: &BreakdownSpec,
    column: Column,
    source: &LabelSource,
) -> PublicationResult<ResolvedLabel> {
    match source {
        LabelSource::Group(field) => spec
            .group_by
            .iter()
            .position(|f| f == field)
            .map(ResolvedLabel::Key)
            .ok_or_else(|| PublicationError::SchemaMismatch {
                family: plan.family.to_string(),
                column: column.header().to_string(),
                context: format!(
                    "breakdown '{}' labels from '{}' which it does not group by",
                    spec.name,
                    field.name()
                ),
            }),
        LabelSource::Literal(text) => Ok(ResolvedLabel::Literal(*text)),
        LabelSource::Null => Ok(ResolvedLabel::Null),
    }
}

fn compose_breakdown(
    plan: &FamilyPlan,
    spec: &BreakdownSpec,
    records: &[AbsenceRecord],
    step_number: u32,
) -> PublicationResult<BreakdownResult> {
    let value = resolve_label(plan, spec, spec.value_column, &spec.value)?;
    let mut labels = Vec::with_capacity(spec.labels.len());
    for (column, source) in &spec.labels {
        labels.push((*column, resolve_label(plan, spec, *column, source)?));
    }

    let aggregation = aggregate(records, &spec.group_by, &spec.filter);
    let condition = spec.filter.describe();

    if aggregation.matched == 0 {
        return Err(PublicationError::EmptyGroupResult {
            family: plan.family.to_string(),
            breakdown: spec.name.to_string(),
            condition,
        });
    }

    let mut warnings = Vec::new();
    for (field, count) in &aggregation.dropped {
        let warning = if *field == GroupField::Reason {
            CompositionWarning::new(
                "UNKNOWN_BREAKDOWN_VALUE",
                format!(
                    "{} records in '{}' have no known absence reason and were excluded",
                    count, spec.name
                ),
                "medium",
            )
        } else {
            CompositionWarning::new(
                "NULL_GROUP_KEY",
                format!(
                    "{} records in '{}' have no {} and were excluded",
                    count,
                    spec.name,
                    field.name()
                ),
                "low",
            )
        };
        warn!(
            family = %plan.family,
            breakdown = spec.name,
            field = field.name(),
            records = count,
            "Records excluded from breakdown"
        );
        warnings.push(warning);
    }

    let mut rows = Vec::with_capacity(aggregation.groups.len());
    let mut total = GroupTotals::default();

    for (key, totals) in &aggregation.groups {
        total.days_lost += totals.days_lost;
        total.days_available += totals.days_available;
        total.records += totals.records;

        let rate_percent = match absence_rate(totals.days_lost, totals.days_available) {
            Ok(rate) => Measure::Value(rate),
            Err(err @ PublicationError::DivisionUndefined { .. }) => {
                warnings.push(CompositionWarning::new(
                    "DIVISION_UNDEFINED",
                    format!("{} in '{}' for group [{}]", err, spec.name, key.join(", ")),
                    "medium",
                ));
                Measure::Missing
            }
            Err(err) => return Err(err),
        };

        let breakdown_value = value.apply(key);
        let mut row = BreakdownRow {
            breakdown_type: spec.breakdown_type,
            breakdown_value: breakdown_value.clone(),
            labels: Default::default(),
            fte_days_lost: Measure::Value(totals.days_lost),
            fte_days_available: Measure::Value(totals.days_available),
            fte_days_lost_covid: plan
                .tracks_covid
                .then_some(Measure::Value(totals.days_lost_covid)),
            rate_percent,
        };
        row.set_label(spec.value_column, breakdown_value);
        for (column, label) in &labels {
            row.set_label(*column, label.apply(key));
        }
        rows.push(row);
    }

    debug!(
        family = %plan.family,
        breakdown = spec.name,
        records_matched = aggregation.matched,
        rows = rows.len(),
        "Composed breakdown"
    );

    let audit_step = CompositionStep {
        step_number,
        breakdown: spec.name.to_string(),
        breakdown_type: spec.breakdown_type.label(),
        condition: condition.clone(),
        input: serde_json::json!({
            "records": records.len(),
            "group_by": spec.group_by.iter().map(GroupField::name).collect::<Vec<_>>(),
            "filter": condition
        }),
        output: serde_json::json!({
            "records_matched": aggregation.matched,
            "records_dropped": aggregation.dropped_total(),
            "rows": rows.len(),
            "days_lost": total.days_lost.normalize().to_string(),
            "days_available": total.days_available.normalize().to_string()
        }),
        reasoning: format!(
            "{} of {} records matched; {} grouped into {} rows",
            aggregation.matched,
            records.len(),
            total.records,
            rows.len()
        ),
    };

    Ok(BreakdownResult {
        rows,
        audit_step,
        warnings,
    })
}

/// Sums the days available of a set of rows, skipping withheld figures.
pub fn total_days_available(rows: &[BreakdownRow]) -> Decimal {
    rows.iter()
        .filter_map(|row| row.fte_days_available.value())
        .sum()
}
