//! Assembled publication tables.
//!
//! A [`PublicationTable`] is the final, column-ordered form of one output
//! artifact. Cells keep the distinction between suppressed, not-applicable
//! and absent values until they are serialized.

use std::io;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::error::{PublicationError, PublicationResult};
use crate::reference::NOT_APPLICABLE_SENTINEL;

use super::Column;

/// A single output cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// A text label.
    Text(String),
    /// A published figure.
    Number(Decimal),
    /// A date stamp.
    Date(NaiveDate),
    /// A figure blanked by disclosure control.
    Blank,
    /// A figure for a category that does not apply.
    NotApplicable,
    /// No value.
    Null,
}

impl Cell {
    /// Renders the cell the way CSV outputs publish it.
    pub fn render(&self) -> String {
        self.render_with(NOT_APPLICABLE_SENTINEL)
    }

    /// Renders the cell with a custom not-applicable marker.
    pub fn render_with(&self, not_applicable: &str) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Number(value) => value.to_string(),
            Cell::Date(date) => date.format("%Y-%m-%d").to_string(),
            Cell::Blank | Cell::Null => String::new(),
            Cell::NotApplicable => not_applicable.to_string(),
        }
    }

    /// The text of a label cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The figure of a number cell.
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Cell::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.render())
    }
}

/// A named, column-ordered output table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicationTable {
    /// The table name.
    pub name: String,
    /// Output columns, in order.
    pub columns: Vec<Column>,
    /// Rows of cells, one per column.
    pub rows: Vec<Vec<Cell>>,
}

impl PublicationTable {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Returns the position of `column`.
    pub fn column_index(&self, column: Column) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }

    /// Returns the cell of `column` in row `row`.
    pub fn cell(&self, row: usize, column: Column) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|cells| cells.get(index))
    }

    /// Returns the first row whose text cells match every `(column, text)` key.
    pub fn find_row(&self, keys: &[(Column, &str)]) -> Option<&[Cell]> {
        let indexed: Vec<(usize, &str)> = keys
            .iter()
            .map(|(column, text)| self.column_index(*column).map(|index| (index, *text)))
            .collect::<Option<_>>()?;

        self.rows
            .iter()
            .find(|cells| {
                indexed
                    .iter()
                    .all(|(index, text)| cells[*index].as_text() == Some(*text))
            })
            .map(Vec::as_slice)
    }

    /// Writes the table as CSV with a header row.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> PublicationResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let to_error = |e: csv::Error| PublicationError::OutputError {
            path: self.name.clone(),
            message: e.to_string(),
        };

        csv_writer
            .write_record(self.columns.iter().map(Column::header))
            .map_err(to_error)?;
        for cells in &self.rows {
            csv_writer
                .write_record(cells.iter().map(Cell::render))
                .map_err(to_error)?;
        }
        csv_writer.flush().map_err(|e| PublicationError::OutputError {
            path: self.name.clone(),
            message: e.to_string(),
        })
    }

    /// Renders the table as a CSV string.
    pub fn to_csv_string(&self) -> PublicationResult<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| PublicationError::OutputError {
            path: self.name.clone(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_table() -> PublicationTable {
        let mut table = PublicationTable::new(
            "rates",
            vec![
                Column::BreakdownType,
                Column::BreakdownValue,
                Column::FteDaysAvailable,
                Column::SicknessAbsenceRatePercent,
            ],
        );
        table.rows.push(vec![
            Cell::Text("REGION".to_string()),
            Cell::Text("London".to_string()),
            Cell::Number(Decimal::new(700, 0)),
            Cell::Number(Decimal::new(214, 2)),
        ]);
        table.rows.push(vec![
            Cell::Text("ORGANISATION_TYPE".to_string()),
            Cell::Text("Special Health Authority".to_string()),
            Cell::Null,
            Cell::NotApplicable,
        ]);
        table.rows.push(vec![
            Cell::Text("REGION".to_string()),
            Cell::Text("Midlands".to_string()),
            Cell::Blank,
            Cell::Blank,
        ]);
        table
    }

    #[test]
    fn test_render_cells() {
        assert_eq!(Cell::Number(Decimal::new(800, 2)).render(), "8.00");
        assert_eq!(Cell::NotApplicable.render(), "9999");
        assert_eq!(Cell::NotApplicable.render_with("."), ".");
        assert_eq!(Cell::Blank.render(), "");
        assert_eq!(
            Cell::Date(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()).render(),
            "2024-03-31"
        );
    }

    #[test]
    fn test_csv_output() {
        let csv = create_test_table().to_csv_string().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "BREAKDOWN_TYPE,BREAKDOWN_VALUE,FTE_DAYS_AVAILABLE,SICKNESS_ABSENCE_RATE_PERCENT"
        );
        assert_eq!(lines[1], "REGION,London,700,2.14");
        assert_eq!(lines[2], "ORGANISATION_TYPE,Special Health Authority,,9999");
        assert_eq!(lines[3], "REGION,Midlands,,");
    }

    #[test]
    fn test_find_row_by_labels() {
        let table = create_test_table();
        let row = table
            .find_row(&[(Column::BreakdownType, "REGION"), (Column::BreakdownValue, "London")])
            .unwrap();
        assert_eq!(row[2], Cell::Number(Decimal::new(700, 0)));
        assert!(table.find_row(&[(Column::BreakdownValue, "Wales")]).is_none());
        assert!(table.find_row(&[(Column::OrgCode, "RJ1")]).is_none());
    }

    #[test]
    fn test_cell_lookup() {
        let table = create_test_table();
        assert_eq!(table.cell(1, Column::SicknessAbsenceRatePercent), Some(&Cell::NotApplicable));
        assert_eq!(table.cell(5, Column::BreakdownType), None);
        assert_eq!(table.cell(0, Column::Date), None);
    }

    #[test]
    fn test_table_serializes_rendered_cells() {
        let json = serde_json::to_value(create_test_table()).unwrap();
        assert_eq!(json["columns"][0], "BREAKDOWN_TYPE");
        assert_eq!(json["rows"][0][3], "2.14");
        assert_eq!(json["rows"][1][3], "9999");
    }
}
