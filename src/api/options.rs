use sqlx::mysql::MySqlConnectOptions;
use std::fmt;
use std::path::PathBuf;

use super::Error;
use crate::filter::Filter;
use crate::util::sanitize_url;

/// Where one side's metadata comes from.
#[derive(Clone)]
pub enum Source {
    /// `mysql://` or `mariadb://` connection URL.
    Url(String),
    /// Pre-built connection options, e.g. from a config file.
    Options(Box<MySqlConnectOptions>),
    /// JSON snapshot written by `schemadiff snapshot`.
    Snapshot(PathBuf),
}

impl Source {
    /// Accepts `snapshot:<path>`, a bare `*.json` path, or a `mysql://`/`mariadb://` URL.
    pub fn parse(value: &str) -> Result<Self, Error> {
        if let Some(path) = value.strip_prefix("snapshot:") {
            return Ok(Source::Snapshot(PathBuf::from(path)));
        }
        if value.starts_with("mysql://") || value.starts_with("mariadb://") {
            return Ok(Source::Url(value.to_string()));
        }
        if value.ends_with(".json") {
            return Ok(Source::Snapshot(PathBuf::from(value)));
        }
        Err(Error::invalid_source(format!(
            "{} is not a mysql:// URL or a snapshot path",
            sanitize_url(value)
        )))
    }

    /// Schema to compare when none is given explicitly: the database named in the connection.
    pub fn default_schema(&self) -> Option<String> {
        match self {
            Source::Url(url) => url
                .split_once("://")
                .and_then(|(_, rest)| rest.split_once('/'))
                .map(|(_, path)| path.split('?').next().unwrap_or_default().to_string())
                .filter(|name| !name.is_empty()),
            Source::Options(options) => options.get_database().map(str::to_string),
            Source::Snapshot(_) => None,
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => f.debug_tuple("Url").field(&sanitize_url(url)).finish(),
            Source::Options(options) => f
                .debug_tuple("Options")
                .field(&format!("{}:{}", options.get_host(), options.get_port()))
                .finish(),
            Source::Snapshot(path) => f.debug_tuple("Snapshot").field(path).finish(),
        }
    }
}

/// Options for comparing two schemas.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub left: Source,
    pub right: Source,
    /// Schema on the left side; defaults to the database named by the source.
    pub left_schema: Option<String>,
    /// Schema on the right side; defaults to the database named by the source.
    pub right_schema: Option<String>,
    /// Optional filter for including/excluding objects
    pub filter: Option<Filter>,
    /// Mark failed comparisons as not compared instead of aborting
    pub keep_going: bool,
}

impl CompareOptions {
    pub fn new(left: Source, right: Source) -> Self {
        Self {
            left,
            right,
            left_schema: None,
            right_schema: None,
            filter: None,
            keep_going: false,
        }
    }

    /// Set the schema names for both sides.
    pub fn with_schemas(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.left_schema = Some(left.into());
        self.right_schema = Some(right.into());
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn keep_going(mut self) -> Self {
        self.keep_going = true;
        self
    }
}

/// Options for capturing a snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub source: Source,
    pub schema: Option<String>,
}

impl SnapshotOptions {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}
