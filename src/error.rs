use std::path::PathBuf;

use thiserror::Error;

/// Problems with a story's date format string such as `"9999.12.31"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateFormatError {
    #[error("date format is empty")]
    Empty,
    #[error("date format segment `{segment}` is not a positive integer")]
    InvalidSegment { segment: String },
    #[error("date format `{format}` overflows the linearized date range")]
    Overflow { format: String },
}

/// Caller contract violations rejected by the layout engine.
///
/// Malformed individual events are never reported here; they are dropped
/// from the scene instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("chronological layout requires a story date format")]
    MissingDateFormat,
    #[error("canvas size {width}x{height} must be finite and positive")]
    InvalidCanvas { width: f64, height: f64 },
}

/// Crate-level error used by the CLI surface.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse story JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse story YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("theme error: {0}")]
    Theme(String),
    #[error(transparent)]
    DateFormat(#[from] DateFormatError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("export failed: {0}")]
    Export(String),
    #[error("{0}")]
    Usage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
