//! Sickness Absence Rates publication engine.
//!
//! This crate turns a flat set of NHS workforce absence records into the
//! monthly publication tables: sickness absence rates by region, staff group,
//! grade and organisation type, the organisation benchmarking tool, the COVID
//! absence table and the reason-by-staff-group table. Every family shares one
//! aggregation primitive, one rate calculation and one disclosure control rule.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod families;
pub mod layout;
pub mod models;
pub mod pipeline;
pub mod quality;
pub mod reference;
