//! Final table assembly.
//!
//! Projects breakdown rows onto a family's published column order, applies
//! column renames and stamps the publication date. A row that cannot supply
//! a required column fails the family instead of losing the column.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{PublicationError, PublicationResult};
use crate::models::{BreakdownRow, Cell, Column, Measure, PublicationFamily, PublicationTable};

/// The published schema of one output table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// The table name.
    pub name: &'static str,
    /// Output columns, in order.
    pub columns: Vec<Column>,
    /// Renames as `(working column, published column)`.
    pub renames: Vec<(Column, Column)>,
}

impl TableSchema {
    /// Creates a schema with no renames.
    pub fn new(name: &'static str, columns: &[Column]) -> Self {
        Self {
            name,
            columns: columns.to_vec(),
            renames: Vec::new(),
        }
    }

    /// Publishes the working column `from` under the header of `to`.
    pub fn rename(mut self, from: Column, to: Column) -> Self {
        self.renames.push((from, to));
        self
    }

    fn source_column(&self, column: Column) -> Column {
        self.renames
            .iter()
            .find(|(_, to)| *to == column)
            .map(|(from, _)| *from)
            .unwrap_or(column)
    }
}

fn measure_cell(measure: Measure) -> Cell {
    match measure {
        Measure::Value(value) => Cell::Number(value),
        Measure::Suppressed => Cell::Blank,
        Measure::NotApplicable => Cell::NotApplicable,
        Measure::Missing => Cell::Null,
    }
}

fn mismatch(family: PublicationFamily, column: Column, context: String) -> PublicationError {
    PublicationError::SchemaMismatch {
        family: family.to_string(),
        column: column.header().to_string(),
        context,
    }
}

fn assemble_cell(
    family: PublicationFamily,
    schema: &TableSchema,
    row: &BreakdownRow,
    column: Column,
    publication_date: NaiveDate,
) -> PublicationResult<Cell> {
    let source = schema.source_column(column);
    let cell = match source {
        Column::Date => Cell::Date(publication_date),
        Column::BreakdownType => Cell::Text(row.breakdown_type.label()),
        Column::FteDaysLost => measure_cell(row.fte_days_lost),
        Column::FteDaysAvailable => measure_cell(row.fte_days_available),
        Column::SicknessAbsenceRatePercent => measure_cell(row.rate_percent),
        Column::FteDaysLostCovid => match row.fte_days_lost_covid {
            Some(measure) => measure_cell(measure),
            None => {
                return Err(mismatch(
                    family,
                    column,
                    format!(
                        "breakdown '{}' does not track COVID days lost",
                        row.breakdown_type.label()
                    ),
                ));
            }
        },
        label => match row.labels.get(&label) {
            Some(Some(text)) => Cell::Text(text.clone()),
            Some(None) => Cell::Null,
            None => {
                return Err(mismatch(
                    family,
                    column,
                    format!("missing from breakdown '{}'", row.breakdown_type.label()),
                ));
            }
        },
    };
    Ok(cell)
}

/// Assembles rows into the published table.
///
/// # Arguments
///
/// * `family` - The family the table belongs to, for error reporting
/// * `schema` - The published columns and renames
/// * `rows` - Suppressed breakdown rows, in output order
/// * `publication_date` - The date stamped into the `DATE` column
///
/// # Errors
///
/// Returns [`PublicationError::SchemaMismatch`] when the schema is empty or
/// repeats a column, or when a row cannot supply a required column.
pub fn assemble(
    family: PublicationFamily,
    schema: &TableSchema,
    rows: &[BreakdownRow],
    publication_date: NaiveDate,
) -> PublicationResult<PublicationTable> {
    if schema.columns.is_empty() {
        return Err(PublicationError::SchemaMismatch {
            family: family.to_string(),
            column: String::new(),
            context: format!("table '{}' has no columns", schema.name),
        });
    }
    for (index, column) in schema.columns.iter().enumerate() {
        if schema.columns[..index].contains(column) {
            return Err(mismatch(
                family,
                *column,
                format!("repeated in table '{}'", schema.name),
            ));
        }
    }

    let mut table = PublicationTable::new(schema.name, schema.columns.clone());
    for row in rows {
        let cells = schema
            .columns
            .iter()
            .map(|column| assemble_cell(family, schema, row, *column, publication_date))
            .collect::<PublicationResult<Vec<Cell>>>()?;
        table.rows.push(cells);
    }

    debug!(
        family = %family,
        table = schema.name,
        rows = table.rows.len(),
        columns = table.columns.len(),
        "Assembled publication table"
    );

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BreakdownType;
    use rust_decimal::Decimal;

    fn create_test_row() -> BreakdownRow {
        let mut row = BreakdownRow {
            breakdown_type: BreakdownType::ReportingOrg,
            breakdown_value: Some("RJ1".to_string()),
            labels: Default::default(),
            fte_days_lost: Measure::Value(Decimal::new(15, 0)),
            fte_days_available: Measure::Value(Decimal::new(700, 0)),
            fte_days_lost_covid: None,
            rate_percent: Measure::Value(Decimal::new(214, 2)),
        };
        row.set_label(Column::OrgCode, Some("RJ1".to_string()));
        row.set_label(Column::ClusterGroup, Some("Acute".to_string()));
        row.set_label(Column::NhseRegionCode, None);
        row
    }

    fn publication_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    }

    /// AS-001: columns follow the schema order with date and renames applied
    #[test]
    fn test_assemble_projects_and_renames() {
        let schema = TableSchema::new(
            "by_org",
            &[
                Column::Date,
                Column::NhseRegionCode,
                Column::OrgCode,
                Column::OrgType,
                Column::SicknessAbsenceRatePercent,
            ],
        )
        .rename(Column::ClusterGroup, Column::OrgType);

        let table = assemble(
            PublicationFamily::SicknessRates,
            &schema,
            &[create_test_row()],
            publication_date(),
        )
        .unwrap();

        assert_eq!(table.name, "by_org");
        assert_eq!(
            table.rows[0],
            vec![
                Cell::Date(publication_date()),
                Cell::Null,
                Cell::Text("RJ1".to_string()),
                Cell::Text("Acute".to_string()),
                Cell::Number(Decimal::new(214, 2)),
            ]
        );
        let csv = table.to_csv_string().unwrap();
        assert!(csv.starts_with("DATE,NHSE_REGION_CODE,ORG_CODE,ORG_TYPE,SICKNESS_ABSENCE_RATE_PERCENT"));
    }

    /// AS-002: a missing label column fails loudly
    #[test]
    fn test_missing_label_is_schema_mismatch() {
        let schema = TableSchema::new("bench", &[Column::OrgCode, Column::BenchmarkGroup]);

        match assemble(
            PublicationFamily::Benchmarking,
            &schema,
            &[create_test_row()],
            publication_date(),
        )
        .unwrap_err()
        {
            PublicationError::SchemaMismatch {
                family,
                column,
                context,
            } => {
                assert_eq!(family, "benchmarking");
                assert_eq!(column, "BENCHMARK_GROUP");
                assert!(context.contains("REPORTING_ORG"));
            }
            other => panic!("Expected SchemaMismatch, got {:?}", other),
        }
    }

    /// AS-003: COVID column requires COVID tracking
    #[test]
    fn test_untracked_covid_measure_is_schema_mismatch() {
        let schema = TableSchema::new("covid", &[Column::FteDaysLostCovid]);
        let result = assemble(
            PublicationFamily::Covid,
            &schema,
            &[create_test_row()],
            publication_date(),
        );
        assert!(matches!(
            result,
            Err(PublicationError::SchemaMismatch { .. })
        ));
    }

    /// AS-004: suppressed and not-applicable measures keep distinct cells
    #[test]
    fn test_withheld_measures() {
        let mut row = create_test_row();
        row.fte_days_lost = Measure::Suppressed;
        row.rate_percent = Measure::NotApplicable;
        row.fte_days_available = Measure::Missing;
        let schema = TableSchema::new(
            "rates",
            &[
                Column::FteDaysLost,
                Column::FteDaysAvailable,
                Column::SicknessAbsenceRatePercent,
            ],
        );

        let table = assemble(PublicationFamily::SicknessRates, &schema, &[row], publication_date())
            .unwrap();

        assert_eq!(table.rows[0], vec![Cell::Blank, Cell::Null, Cell::NotApplicable]);
    }

    #[test]
    fn test_repeated_column_rejected() {
        let schema = TableSchema::new("dup", &[Column::OrgCode, Column::OrgCode]);
        assert!(assemble(PublicationFamily::Covid, &schema, &[], publication_date()).is_err());
    }

    #[test]
    fn test_empty_rows_give_header_only_table() {
        let schema = TableSchema::new("empty", &[Column::Date, Column::OrgCode]);
        let table = assemble(PublicationFamily::Covid, &schema, &[], publication_date()).unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.to_csv_string().unwrap(), "DATE,ORG_CODE\n");
    }
}
