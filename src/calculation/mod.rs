//! Calculation logic for the publication engine.
//!
//! This module contains the breakdown aggregator and its record filters, the
//! absence rate calculation, the declarative breakdown composer, the join to
//! the latest organisation reference, disclosure control and final table
//! assembly.

mod aggregate;
mod assembler;
mod composer;
mod filter;
mod join;
mod rate;
mod suppression;

pub use aggregate::{Aggregation, GroupField, GroupTotals, aggregate};
pub use assembler::{TableSchema, assemble};
pub use composer::{
    BreakdownSpec, Composition, FamilyPlan, LabelSource, PlanStep, compose, total_days_available,
};
pub use filter::RecordFilter;
pub use join::{JoinResult, OrgAttribute, join_latest_org};
pub use rate::absence_rate;
pub use suppression::{SuppressionResult, is_disclosive, suppress, suppress_rows};
