//! schemadiff - compare the metadata of two MySQL schemas.
//!
//! Reports tables, columns, indexes, triggers, and stored functions that
//! exist on one side but not the other. Intended for migration verification
//! and environment drift detection.
//!
//! # Quick Start
//!
//! ```no_run
//! use schemadiff::prelude::*;
//!
//! let result = compare_blocking(
//!     CompareOptions::new(
//!         Source::parse("mysql://readonly@prod-db/shop").unwrap(),
//!         Source::parse("snapshot:release-42.json").unwrap(),
//!     )
//!     .with_schemas("shop", "shop"),
//! )
//! .unwrap();
//!
//! print!("{}", render_text(&result.report));
//! ```
//!
//! # Modules
//!
//! - [`api`] - High-level API mirroring CLI commands
//! - [`drift`] - Comparison run across all metadata categories
//! - [`diff`] - Name-list comparison
//! - [`mysql`] - information_schema queries against a live server
//! - [`snapshot`] - Offline copies of a schema's metadata

pub mod api;
pub mod config;
pub mod diff;
pub mod drift;
pub mod filter;
pub mod model;
pub mod mysql;
pub mod prelude;
pub mod reader;
pub mod report;
pub mod snapshot;
pub mod util;
