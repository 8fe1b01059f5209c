//! Transformation module.
//!
//! - Grouper: flat CSV rows to per-region series
//! - Pipeline: source to build output

pub mod grouper;
pub mod pipeline;

pub use grouper::{group_by_region, parse_date, GroupResult, SkippedRow};
pub use pipeline::*;
