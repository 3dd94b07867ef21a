#![forbid(unsafe_code)]

//! Brute-force checking of proof obligations over finite ranges.
//!
//! Each obligation's top-level bindings are narrowed to the ranges in a
//! [`RangeTable`], the obligation is evaluated, and the outcome (with a
//! counterexample when it is false) is reported.

pub mod checker;
pub mod config;
pub mod error;
pub mod obligation;
pub mod ranges;
pub mod report;

pub use checker::Checker;
pub use config::{CheckerConfig, ConfigError};
pub use error::CheckError;
pub use obligation::ProofObligation;
pub use ranges::{DefaultRanges, RangeTable, TypeDesc};
pub use report::{Assignment, CheckOutcome, CheckSummary, ObligationReport, REPORT_SCHEMA};
