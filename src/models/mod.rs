//! Core data models for the publication engine.
//!
//! This module contains the record, row, table and trace types shared by
//! every publication family.

mod audit;
mod breakdown;
mod publication_table;
mod record;

pub use audit::{CompositionStep, CompositionTrace, CompositionWarning};
pub use breakdown::{
    BreakdownRow, BreakdownType, Column, Geography, Measure, PublicationFamily, StaffDimension,
};
pub use publication_table::{Cell, PublicationTable};
pub use record::{AbsenceRecord, OrgReference};
