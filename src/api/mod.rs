//! High-level API for embedding schemadiff in other applications.
//!
//! This module provides functions that mirror CLI commands with structured
//! inputs and outputs. Both async and blocking variants are available.
//!
//! # Example
//!
//! ```no_run
//! use schemadiff::api::{compare_blocking, CompareOptions, Source};
//!
//! let result = compare_blocking(
//!     CompareOptions::new(
//!         Source::parse("mysql://readonly@prod-db/shop").unwrap(),
//!         Source::parse("mysql://readonly@staging-db/shop").unwrap(),
//!     ),
//! )
//! .unwrap();
//!
//! println!("drift: {}", result.has_drift);
//! ```
//!
//! # Async vs Blocking
//!
//! Use async when you already have a tokio runtime. Blocking variants create
//! a new tokio runtime per call.

mod error;
mod options;
mod results;

pub use error::Error;
pub use options::{CompareOptions, SnapshotOptions, Source};
pub use results::{CheckResult, CompareResult};

use crate::drift::{detect_drift, DiscardSink, DriftOptions, ReportSink};
use crate::mysql::MySqlConnection;
use crate::reader::{MetadataReader, SchemaRef};
use crate::snapshot::{capture_snapshot, Snapshot};

// ============================================================================
// Helper functions
// ============================================================================

/// A source after it has been opened; owns the connection for the length of one call.
enum Opened {
    MySql(MySqlConnection),
    Snapshot(Snapshot),
}

impl Opened {
    async fn open(source: &Source) -> Result<Self, Error> {
        match source {
            Source::Url(url) => Ok(Opened::MySql(MySqlConnection::new(url).await?)),
            Source::Options(options) => Ok(Opened::MySql(
                MySqlConnection::connect_with(options.as_ref().clone()).await?,
            )),
            Source::Snapshot(path) => Ok(Opened::Snapshot(Snapshot::from_file(path)?)),
        }
    }

    fn reader(&self) -> &dyn MetadataReader {
        match self {
            Opened::MySql(connection) => connection,
            Opened::Snapshot(snapshot) => snapshot,
        }
    }

    fn schema(&self, source: &Source, explicit: Option<&str>) -> Result<String, Error> {
        if let Some(schema) = explicit {
            return Ok(schema.to_string());
        }
        let fallback = match self {
            Opened::MySql(_) => source.default_schema(),
            Opened::Snapshot(snapshot) => Some(snapshot.schema.clone()),
        };
        fallback.ok_or_else(|| {
            Error::config(format!(
                "No schema given for {} and the connection names no database",
                self.reader().describe()
            ))
        })
    }

    async fn close(self) {
        if let Opened::MySql(connection) = self {
            connection.close().await;
        }
    }
}

// ============================================================================
// Public API functions
// ============================================================================

/// Compare two schemas, handing each outcome to `sink` as soon as it is known.
pub async fn compare_with_sink(
    options: CompareOptions,
    sink: &mut dyn ReportSink,
) -> Result<CompareResult, Error> {
    let left = Opened::open(&options.left).await?;
    let right = match Opened::open(&options.right).await {
        Ok(right) => right,
        Err(e) => {
            left.close().await;
            return Err(e);
        }
    };

    let outcome = run_comparison(&options, &left, &right, sink).await;

    left.close().await;
    right.close().await;
    outcome
}

async fn run_comparison(
    options: &CompareOptions,
    left: &Opened,
    right: &Opened,
    sink: &mut dyn ReportSink,
) -> Result<CompareResult, Error> {
    let left_schema = left.schema(&options.left, options.left_schema.as_deref())?;
    let right_schema = right.schema(&options.right, options.right_schema.as_deref())?;

    let drift_options = DriftOptions {
        filter: options.filter.clone().unwrap_or_default(),
        keep_going: options.keep_going,
    };

    let report = detect_drift(
        SchemaRef::new(left.reader(), &left_schema),
        SchemaRef::new(right.reader(), &right_schema),
        &drift_options,
        sink,
    )
    .await?;

    Ok(CompareResult {
        has_drift: report.has_drift,
        report,
    })
}

/// Compare two schemas and return every outcome.
pub async fn compare(options: CompareOptions) -> Result<CompareResult, Error> {
    compare_with_sink(options, &mut DiscardSink).await
}

/// Capture the metadata names of one schema.
pub async fn snapshot(options: SnapshotOptions) -> Result<Snapshot, Error> {
    let opened = Opened::open(&options.source).await?;
    let captured = match opened.schema(&options.source, options.schema.as_deref()) {
        Ok(schema) => capture_snapshot(SchemaRef::new(opened.reader(), &schema))
            .await
            .map_err(Error::from),
        Err(e) => Err(e),
    };
    opened.close().await;
    captured
}

/// Open a source and, for live servers, verify it answers a ping.
pub async fn check_connection(source: &Source) -> Result<CheckResult, Error> {
    let opened = Opened::open(source).await?;
    let server = opened.reader().describe();
    opened.close().await;
    Ok(CheckResult { server })
}

// ============================================================================
// Blocking variants
// ============================================================================

fn create_runtime() -> Result<tokio::runtime::Runtime, Error> {
    tokio::runtime::Runtime::new().map_err(|e| Error::runtime(e.to_string()))
}

/// Blocking variant of [`compare`].
///
/// Creates a new tokio runtime for each call. For high-frequency usage,
/// prefer the async API with a shared runtime.
pub fn compare_blocking(options: CompareOptions) -> Result<CompareResult, Error> {
    create_runtime()?.block_on(compare(options))
}

/// Blocking variant of [`snapshot`].
pub fn snapshot_blocking(options: SnapshotOptions) -> Result<Snapshot, Error> {
    create_runtime()?.block_on(snapshot(options))
}

/// Blocking variant of [`check_connection`].
pub fn check_connection_blocking(source: &Source) -> Result<CheckResult, Error> {
    create_runtime()?.block_on(check_connection(source))
}
