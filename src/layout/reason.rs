//! Sickness absence by reason and staff group workbook.
//!
//! Table 1 publishes each reason's share of a staff group's days lost;
//! Table 2 publishes the underlying counts. Both have one tagged row per
//! staff label, located by `(DATE, STAFF_GROUP)` in the reason table.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{PublicationError, PublicationResult};
use crate::models::{Cell, Column, PublicationTable};
use crate::reference::{ABSENCE_REASONS, ALL_REASONS, ALL_STAFF_GROUPS, TABLE_2_STAFF_ORDER};

use super::{STAFF_TAG_GROUPS, TaggedTable, required_column, round_figure};

const PERCENT_PLACES: u32 = 1;
const COUNT_PLACES: u32 = 0;
const ABSENT_COUNT: &str = "-";

/// Staff labels of the reason workbook paired with their tag suffixes.
fn staff_tags() -> Vec<(String, &'static str)> {
    let labels = std::iter::once(ALL_STAFF_GROUPS).chain(TABLE_2_STAFF_ORDER.iter().skip(1).copied());
    let suffixes = STAFF_TAG_GROUPS
        .iter()
        .enumerate()
        .flat_map(|(number, size)| {
            (0..*size).map(move |i| {
                if *size == 1 {
                    format!("{}", number + 1)
                } else {
                    format!("{}_{}", number + 1, char::from(b'a' + i as u8))
                }
            })
        });
    suffixes.zip(labels).collect()
}

/// Rows of one publication date keyed by staff group and reason.
struct ReasonIndex<'a> {
    rows: HashMap<(&'a str, &'a str), &'a [Cell]>,
    lost: usize,
    available: usize,
}

impl<'a> ReasonIndex<'a> {
    fn new(table: &'a PublicationTable, date: NaiveDate) -> PublicationResult<Self> {
        let date_index = required_column(table, Column::Date)?;
        let staff_index = required_column(table, Column::StaffGroup)?;
        let reason_index = required_column(table, Column::Reason)?;

        let mut rows = HashMap::new();
        for cells in &table.rows {
            if cells[date_index] != Cell::Date(date) {
                continue;
            }
            if let (Some(staff), Some(reason)) =
                (cells[staff_index].as_text(), cells[reason_index].as_text())
            {
                rows.entry((staff, reason)).or_insert(cells.as_slice());
            }
        }

        Ok(Self {
            rows,
            lost: required_column(table, Column::FteDaysLost)?,
            available: required_column(table, Column::FteDaysAvailable)?,
        })
    }

    fn get(&self, staff: &str, reason: &str) -> Option<&'a [Cell]> {
        self.rows.get(&(staff, reason)).copied()
    }

    fn all_reasons(&self, staff: &str, tag: &str) -> PublicationResult<&'a [Cell]> {
        self.get(staff, ALL_REASONS)
            .ok_or_else(|| PublicationError::RowNotFound {
                table: tag.to_string(),
                label: staff.to_string(),
            })
    }
}

fn percentage_row(index: &ReasonIndex<'_>, staff: &str, tag: &str) -> PublicationResult<Vec<Cell>> {
    let total = index.all_reasons(staff, tag)?[index.lost]
        .as_number()
        .filter(|total| !total.is_zero());

    Ok(ABSENCE_REASONS
        .iter()
        .map(|reason| {
            let Some(total) = total else {
                return Cell::Blank;
            };
            match index.get(staff, reason) {
                None => Cell::Number(round_figure(Decimal::ZERO, PERCENT_PLACES)),
                Some(cells) => match cells[index.lost].as_number() {
                    Some(lost) => Cell::Number(round_figure(
                        lost * Decimal::ONE_HUNDRED / total,
                        PERCENT_PLACES,
                    )),
                    None => Cell::Blank,
                },
            }
        })
        .collect())
}

fn count(cell: &Cell) -> Cell {
    match cell {
        Cell::Number(value) => Cell::Number(round_figure(*value, COUNT_PLACES)),
        other => other.clone(),
    }
}

fn count_row(index: &ReasonIndex<'_>, staff: &str, tag: &str) -> PublicationResult<Vec<Cell>> {
    let all = index.all_reasons(staff, tag)?;
    let mut row = vec![count(&all[index.available]), count(&all[index.lost])];
    row.extend(ABSENCE_REASONS.iter().map(|reason| match index.get(staff, reason) {
        Some(cells) => count(&cells[index.lost]),
        None => Cell::Text(ABSENT_COUNT.to_string()),
    }));
    Ok(row)
}

fn tagged_rows(
    sheet: &'static str,
    prefix: &str,
    index: &ReasonIndex<'_>,
    build_row: fn(&ReasonIndex<'_>, &str, &str) -> PublicationResult<Vec<Cell>>,
) -> PublicationResult<Vec<TaggedTable>> {
    staff_tags()
        .into_iter()
        .map(|(suffix, staff)| {
            let tag = format!("{}{}", prefix, suffix);
            let row = build_row(index, staff, &tag)?;
            Ok(TaggedTable {
                sheet,
                tag,
                rows: vec![row],
            })
        })
        .collect()
}

/// Table 1 (%): each reason's share of the staff group's days lost.
///
/// Shares are rounded half-to-even to one decimal place. A reason with no row
/// for the staff group publishes as zero; shares of a suppressed total are
/// blank.
pub fn table_1(reasons: &PublicationTable, date: NaiveDate) -> PublicationResult<Vec<TaggedTable>> {
    let index = ReasonIndex::new(reasons, date)?;
    tagged_rows("Table 1 (%)", "tag_table1_", &index, percentage_row)
}

/// Table 2 (Count): all-reasons days available and lost, then days lost per
/// reason, as whole days. A reason with no row publishes as `-`.
pub fn table_2(reasons: &PublicationTable, date: NaiveDate) -> PublicationResult<Vec<TaggedTable>> {
    let index = ReasonIndex::new(reasons, date)?;
    tagged_rows("Table 2 (Count)", "tag_table2_", &index, count_row)
}

/// Every tagged block of the reason workbook, in template order.
pub fn reason_tables(
    reasons: &PublicationTable,
    date: NaiveDate,
) -> PublicationResult<Vec<TaggedTable>> {
    let mut tables = table_1(reasons, date)?;
    tables.extend(table_2(reasons, date)?);
    debug!(tables = tables.len(), "Sliced reason workbook tables");
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    }

    fn create_test_reasons() -> PublicationTable {
        let mut table = PublicationTable::new(
            "reason_absence",
            vec![
                Column::Date,
                Column::StaffGroup,
                Column::Reason,
                Column::FteDaysLost,
                Column::FteDaysAvailable,
            ],
        );
        let mut push = |staff: &str, reason: &str, lost: Cell, available: Cell| {
            table.rows.push(vec![
                Cell::Date(date()),
                Cell::Text(staff.to_string()),
                Cell::Text(reason.to_string()),
                lost,
                available,
            ]);
        };

        push(
            ALL_STAFF_GROUPS,
            ALL_REASONS,
            Cell::Number(dec("300")),
            Cell::Number(dec("10000.5")),
        );
        push(ALL_STAFF_GROUPS, ABSENCE_REASONS[0], Cell::Number(dec("100")), Cell::Number(dec("10000.5")));
        push(ALL_STAFF_GROUPS, ABSENCE_REASONS[1], Cell::Number(dec("200.5")), Cell::Number(dec("10000.5")));
        for staff in TABLE_2_STAFF_ORDER.iter().skip(1) {
            push(staff, ALL_REASONS, Cell::Blank, Cell::Blank);
        }
        table
    }

    /// RW-001: one tag per staff label in template order
    #[test]
    fn test_tags_follow_template() {
        let tags: Vec<String> = table_1(&create_test_reasons(), date())
            .unwrap()
            .into_iter()
            .map(|t| t.tag)
            .collect();

        assert_eq!(tags.len(), 27);
        assert_eq!(tags[0], "tag_table1_1");
        assert_eq!(tags[1], "tag_table1_2");
        assert_eq!(tags[2], "tag_table1_3_a");
        assert_eq!(tags[12], "tag_table1_3_k");
        assert_eq!(tags[13], "tag_table1_4_a");
        assert_eq!(tags[25], "tag_table1_6_e");
        assert_eq!(tags[26], "tag_table1_7");
    }

    /// RW-002: reason shares of days lost, absent reasons as zero
    #[test]
    fn test_percentages() {
        let tables = table_1(&create_test_reasons(), date()).unwrap();
        let row = &tables[0].rows[0];

        assert_eq!(row.len(), ABSENCE_REASONS.len());
        assert_eq!(row[0].render(), "33.3");
        assert_eq!(row[1].render(), "66.8");
        assert_eq!(row[2].render(), "0.0");
    }

    /// RW-003: shares of a suppressed total are blank
    #[test]
    fn test_suppressed_total_blanks_percentages() {
        let tables = table_1(&create_test_reasons(), date()).unwrap();
        assert!(tables[1].rows[0].iter().all(|cell| *cell == Cell::Blank));
    }

    /// RW-004: counts are whole days with dashes for absent reasons
    #[test]
    fn test_counts() {
        let tables = table_2(&create_test_reasons(), date()).unwrap();
        let row = &tables[0].rows[0];

        assert_eq!(tables[0].tag, "tag_table2_1");
        assert_eq!(tables[0].sheet, "Table 2 (Count)");
        assert_eq!(row.len(), 2 + ABSENCE_REASONS.len());
        assert_eq!(row[0].render(), "10000");
        assert_eq!(row[1].render(), "300");
        assert_eq!(row[2].render(), "100");
        assert_eq!(row[3].render(), "200");
        assert_eq!(row[4].render(), "-");
    }

    /// RW-005: rows from another date are not used
    #[test]
    fn test_other_dates_ignored() {
        let later = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
        match table_2(&create_test_reasons(), later).unwrap_err() {
            PublicationError::RowNotFound { table, label } => {
                assert_eq!(table, "tag_table2_1");
                assert_eq!(label, "All staff groups");
            }
            other => panic!("Expected RowNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_reason_tables_cover_both_sheets() {
        let tables = reason_tables(&create_test_reasons(), date()).unwrap();
        assert_eq!(tables.len(), 54);
        assert_eq!(tables[27].tag, "tag_table2_1");
    }
}
