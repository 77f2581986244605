//! Monthly sickness absence rates workbook.
//!
//! All three tables read the sickness rates breakdowns table and publish
//! rates only: Table 1 by region, Table 2 by staff group and medical grade,
//! Table 3 by organisation type.

use tracing::debug;

use crate::error::{PublicationError, PublicationResult};
use crate::models::{Cell, Column, PublicationTable};
use crate::reference::{
    TABLE_1_REGION_ORDER, TABLE_2_STAFF_ORDER, TABLE_3_ORG_TYPE_ORDER, WORKBOOK_NOT_APPLICABLE,
};

use super::{STAFF_TAG_GROUPS, TaggedTable, required_column};

const TABLE_1_TYPES: &[&str] = &["ALL_ENGLAND", "REGION"];
const TABLE_2_TYPES: &[&str] = &[
    "ALL_ENGLAND",
    "MAJOR_STAFF_GROUPS",
    "MINOR_STAFF_GROUPS",
    "MINOR_STAFF_GRADES",
];
const TABLE_3_TYPES: &[&str] = &["ALL_ENGLAND", "ORGANISATION_TYPE"];

struct RateLookup<'a> {
    table: &'a PublicationTable,
    type_index: usize,
    value_index: usize,
    rate_index: usize,
}

impl<'a> RateLookup<'a> {
    fn new(table: &'a PublicationTable) -> PublicationResult<Self> {
        Ok(Self {
            table,
            type_index: required_column(table, Column::BreakdownType)?,
            value_index: required_column(table, Column::BreakdownValue)?,
            rate_index: required_column(table, Column::SicknessAbsenceRatePercent)?,
        })
    }

    /// The rate of the first row with one of `types` labelled `value`.
    fn rate(&self, types: &[&str], value: &str, tag: &str) -> PublicationResult<Cell> {
        self.table
            .rows
            .iter()
            .find(|cells| {
                cells[self.type_index]
                    .as_text()
                    .is_some_and(|kind| types.contains(&kind))
                    && cells[self.value_index].as_text() == Some(value)
            })
            .map(|cells| cells[self.rate_index].clone())
            .ok_or_else(|| PublicationError::RowNotFound {
                table: tag.to_string(),
                label: value.to_string(),
            })
    }
}

/// Table 1: one row of rates in region order.
pub fn table_1(breakdowns: &PublicationTable) -> PublicationResult<TaggedTable> {
    let lookup = RateLookup::new(breakdowns)?;
    let tag = "tag_table1";
    let row = TABLE_1_REGION_ORDER
        .iter()
        .map(|region| lookup.rate(TABLE_1_TYPES, region, tag))
        .collect::<PublicationResult<Vec<_>>>()?;

    Ok(TaggedTable {
        sheet: "Table 1",
        tag: tag.to_string(),
        rows: vec![row],
    })
}

/// Table 2: one tag per staff block, one rate per row.
pub fn table_2(breakdowns: &PublicationTable) -> PublicationResult<Vec<TaggedTable>> {
    let lookup = RateLookup::new(breakdowns)?;
    let mut tables = Vec::with_capacity(STAFF_TAG_GROUPS.len());
    let mut labels = TABLE_2_STAFF_ORDER.iter();

    for (number, size) in STAFF_TAG_GROUPS.iter().enumerate() {
        let tag = format!("tag_table2_{}", number + 1);
        let rows = labels
            .by_ref()
            .take(*size)
            .map(|label| lookup.rate(TABLE_2_TYPES, label, &tag).map(|cell| vec![cell]))
            .collect::<PublicationResult<Vec<_>>>()?;
        tables.push(TaggedTable {
            sheet: "Table 2",
            tag,
            rows,
        });
    }

    Ok(tables)
}

/// Table 3: one row of rates in organisation type order.
pub fn table_3(breakdowns: &PublicationTable) -> PublicationResult<TaggedTable> {
    let lookup = RateLookup::new(breakdowns)?;
    let tag = "tag_table_3";
    let row = TABLE_3_ORG_TYPE_ORDER
        .iter()
        .map(|org_type| {
            lookup
                .rate(TABLE_3_TYPES, org_type, tag)
                .map(|cell| match cell {
                    Cell::NotApplicable => Cell::Text(WORKBOOK_NOT_APPLICABLE.to_string()),
                    other => other,
                })
        })
        .collect::<PublicationResult<Vec<_>>>()?;

    Ok(TaggedTable {
        sheet: "Table 3",
        tag: tag.to_string(),
        rows: vec![row],
    })
}

/// Every tagged block of the monthly workbook, in template order.
pub fn monthly_tables(breakdowns: &PublicationTable) -> PublicationResult<Vec<TaggedTable>> {
    let mut tables = vec![table_1(breakdowns)?];
    tables.extend(table_2(breakdowns)?);
    tables.push(table_3(breakdowns)?);
    debug!(tables = tables.len(), "Sliced monthly workbook tables");
    Ok(tables)
}
