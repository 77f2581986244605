//! Tagged sub-tables for the publication workbooks.
//!
//! The presentation layer pastes small blocks of figures into spreadsheet
//! templates at cells marked with a tag. This module slices published tables
//! into those blocks, in the fixed display orders of each template.

pub mod monthly;
pub mod reason;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::error::{PublicationError, PublicationResult};
use crate::models::{Cell, Column, PublicationTable};

/// Number of staff labels under each numbered tag of the staff-group tables.
///
/// Groups of one are tagged `<n>`; larger groups are tagged `<n>_a`, `<n>_b`
/// and so on in the reason workbook, and transposed under a single `<n>` tag
/// in the monthly workbook.
pub(crate) const STAFF_TAG_GROUPS: [usize; 7] = [1, 1, 11, 4, 4, 5, 1];

/// A block of cells destined for one tagged location in a workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedTable {
    /// The worksheet holding the tag.
    pub sheet: &'static str,
    /// The tag marking the top-left cell.
    pub tag: String,
    /// Rows of cells, pasted without headers.
    pub rows: Vec<Vec<Cell>>,
}

impl TaggedTable {
    /// Renders every cell with the given not-applicable marker.
    pub fn render(&self, not_applicable: &str) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.render_with(not_applicable)).collect())
            .collect()
    }
}

/// Position of a column the slicing needs.
pub(crate) fn required_column(table: &PublicationTable, column: Column) -> PublicationResult<usize> {
    table
        .column_index(column)
        .ok_or_else(|| PublicationError::SchemaMismatch {
            family: table.name.clone(),
            column: column.header().to_string(),
            context: "column required for workbook layout".to_string(),
        })
}

/// Rounds half-to-even, carrying exactly `places` decimal places.
pub(crate) fn round_figure(value: Decimal, places: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(places);
    rounded
}
