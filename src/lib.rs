//! `EcoPackAI` Report
//!
//! Turns a stored packaging-recommendation payload into summary statistics,
//! chart definitions and exportable CSV and PDF reports.

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod loader;
pub mod logging;
pub mod prelude;
pub mod records;
pub mod result_set;
pub mod statistics;
pub mod store;
pub mod table;
