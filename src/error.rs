//! Error types for the liteswitch library.
//!
//! Errors are split by who can act on them:
//!
//! * [`ConvertError`] — a single file could not be converted. Stored inside
//!   [`crate::output::ConversionOutcome::Failure`] so a batch keeps going;
//!   [`ConvertError::kind`] maps it onto the user-facing taxonomy.
//!
//! * [`BatchError`] — the batch cannot start at all (no usable input).
//!
//! * [`RegistryError`] — lookups and construction of the conversion table.
//!
//! * [`BackendFailure`] — whatever a backend reports. The dispatcher never
//!   inspects it beyond its message.
//!
//! * [`ConfigError`] — builder validation.

use crate::format::Format;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single file failed.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input path has no extension to derive a source format from.
    #[error("Cannot tell the format of '{path}': the file has no extension")]
    UnknownSourceFormat { path: PathBuf },

    /// The extension is not a source format in the registry.
    #[error("'.{source_format}' files cannot be converted")]
    UnsupportedSource { source_format: Format },

    /// The source format is known but cannot reach the requested target.
    #[error(
        "'.{source_format}' files cannot be converted to '{target}' (available: {})",
        join_formats(.available)
    )]
    UnsupportedTarget {
        source_format: Format,
        target: Format,
        available: Vec<Format>,
    },

    /// No backend for the edge is usable on this machine.
    #[error("No converter available for {source_format} → {target}\n{diagnostic}")]
    BackendUnavailable {
        source_format: Format,
        target: Format,
        diagnostic: String,
    },

    /// The backend ran and failed. The message is passed through untouched.
    #[error("{backend} failed: {message}")]
    BackendError { backend: String, message: String },

    /// The backend reported success but its declared output does not exist.
    #[error("{backend} reported success but '{path}' was not created")]
    OutputMissing { backend: String, path: PathBuf },

    /// The input file does not exist.
    #[error("File not found: '{path}'")]
    PathNotFound { path: PathBuf },

    /// Another input of the same batch already produced this output.
    #[error("'{path}' was already written from '{first}' in this batch")]
    OutputConflict { path: PathBuf, first: PathBuf },
}

/// The user-facing error taxonomy, one variant per [`ConvertError`] case
/// plus the batch-level `FormatMismatch` skip reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    UnknownSourceFormat,
    UnsupportedSource,
    UnsupportedTarget,
    BackendUnavailable,
    BackendError,
    OutputMissing,
    PathNotFound,
    OutputConflict,
    FormatMismatch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::UnknownSourceFormat => "unknown source format",
            ErrorKind::UnsupportedSource => "unsupported source format",
            ErrorKind::UnsupportedTarget => "unsupported target format",
            ErrorKind::BackendUnavailable => "converter unavailable",
            ErrorKind::BackendError => "converter error",
            ErrorKind::OutputMissing => "output missing",
            ErrorKind::PathNotFound => "file not found",
            ErrorKind::OutputConflict => "output name taken",
            ErrorKind::FormatMismatch => "format mismatch",
        };
        f.write_str(s)
    }
}

impl ConvertError {
    /// Taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::UnknownSourceFormat { .. } => ErrorKind::UnknownSourceFormat,
            ConvertError::UnsupportedSource { .. } => ErrorKind::UnsupportedSource,
            ConvertError::UnsupportedTarget { .. } => ErrorKind::UnsupportedTarget,
            ConvertError::BackendUnavailable { .. } => ErrorKind::BackendUnavailable,
            ConvertError::BackendError { .. } => ErrorKind::BackendError,
            ConvertError::OutputMissing { .. } => ErrorKind::OutputMissing,
            ConvertError::PathNotFound { .. } => ErrorKind::PathNotFound,
            ConvertError::OutputConflict { .. } => ErrorKind::OutputConflict,
        }
    }

    /// One-line message for end users; the full text (including the backend
    /// diagnostic) goes to the log.
    pub fn summary(&self) -> String {
        match self {
            ConvertError::BackendUnavailable {
                source_format,
                target,
                ..
            } => format!("no converter available for {source_format} → {target}"),
            ConvertError::BackendError { backend, .. } => format!("{backend} failed"),
            other => other.to_string(),
        }
    }
}

/// Errors from building or querying the conversion registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The source format has no edges at all.
    #[error("unknown source format '{source_format}'")]
    UnknownSource { source_format: Format },

    /// The source format exists but has no edge to `target`.
    #[error("no conversion from '{source_format}' to '{target}'")]
    NoEdge {
        source_format: Format,
        target: Format,
        available: Vec<Format>,
    },

    /// A table declared the same `(source, target)` pair twice.
    #[error("duplicate conversion edge {source_format} → {target}")]
    DuplicateEdge { source_format: Format, target: Format },

    /// A table row holds something that is not a format token.
    #[error("'{token}' is not a valid format token")]
    InvalidToken { token: String },

    /// A source and target format are identical.
    #[error("conversion edge {format} → {format} converts a format to itself")]
    SelfEdge { format: Format },
}

/// A failure reported by a backend. Opaque to the dispatcher.
#[derive(Debug, Error)]
pub enum BackendFailure {
    /// The external program could not be started.
    #[error("could not start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external program exited with a failure status.
    #[error("'{program}' exited with {status}: {stderr}")]
    Process {
        program: String,
        status: String,
        stderr: String,
    },

    /// The external program succeeded but left no result where expected.
    #[error("'{program}' produced no output file in '{dir}'")]
    NoResult { program: String, dir: PathBuf },

    /// The in-process renderer failed.
    #[error("{0}")]
    Render(String),

    /// Image decoding or encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Any local I/O failure (temp dirs, moving results, writing files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal pre-conditions that stop a batch before any conversion.
#[derive(Debug, Error)]
pub enum BatchError {
    /// No input file can drive the batch.
    #[error("No usable input files among {inputs} path(s)")]
    NoUsableInput { inputs: usize },
}

/// Builder validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

fn join_formats(formats: &[Format]) -> String {
    if formats.is_empty() {
        return "none".to_string();
    }
    formats
        .iter()
        .map(Format::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
