//! Convenient re-exports for common schemadiff usage.
//!
//! # Example
//!
//! ```no_run
//! use schemadiff::prelude::*;
//!
//! let result = compare_blocking(CompareOptions::new(
//!     Source::parse("mysql://readonly@prod-db/shop").unwrap(),
//!     Source::parse("mysql://readonly@staging-db/shop").unwrap(),
//! ))
//! .unwrap();
//!
//! println!("{} comparisons", result.report.outcomes.len());
//! ```

// Async functions
pub use crate::api::{check_connection, compare, compare_with_sink, snapshot};

// Blocking functions
pub use crate::api::{check_connection_blocking, compare_blocking, snapshot_blocking};

// Options and results
pub use crate::api::{CheckResult, CompareOptions, CompareResult, SnapshotOptions, Source};

// Error types
pub use crate::api::Error;

// Core types
pub use crate::diff::ComparisonResult;
pub use crate::drift::{CategoryOutcome, DriftReport, OutcomeStatus, ReportSink};
pub use crate::filter::Filter;
pub use crate::model::MetadataCategory;
pub use crate::report::{render_json, render_text, TextSink};
pub use crate::snapshot::Snapshot;
