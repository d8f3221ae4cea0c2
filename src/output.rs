//! Output naming and conversion outcomes.
//!
//! ## Naming contract
//!
//! Every output lives next to its input and is named from the input's stem
//! plus a fixed product suffix:
//!
//! ```text
//! a/report.docx  → pdf  → a/report_LiteSwitch.pdf
//! a/slides.pdf   → png  → a/slides_LiteSwitch_1.png, a/slides_LiteSwitch_2.png, …
//! ```
//!
//! Names never contain timestamps, so converting the same file twice
//! targets the same path and the second run overwrites the first.
//!
//! For paged outputs the *primary* artifact, the one reported in outcomes and
//! summaries, is always page 1.

use crate::error::{ConvertError, ErrorKind};
use crate::format::Format;
use crate::registry::Cardinality;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

// ── Naming ───────────────────────────────────────────────────────────────────

pub const DEFAULT_SUFFIX: &str = "LiteSwitch";

/// Derives output paths from input paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    suffix: String,
}

impl Default for OutputNaming {
    fn default() -> Self {
        Self::new(DEFAULT_SUFFIX)
    }
}

impl OutputNaming {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Where the conversion of `input` to `target` must write.
    pub fn plan(&self, input: &Path, target: &Format, cardinality: Cardinality) -> OutputPlan {
        let dir = input.parent().map(Path::to_path_buf).unwrap_or_default();
        let base = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = format!("{base}_{}", self.suffix);

        match cardinality {
            Cardinality::Single => OutputPlan::Single {
                path: dir.join(format!("{stem}.{}", target.extension())),
            },
            Cardinality::Paged => OutputPlan::Paged {
                dir,
                stem,
                extension: target.extension().to_string(),
            },
        }
    }
}

/// The declared output location(s) of one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputPlan {
    /// Exactly one file.
    Single { path: PathBuf },
    /// `<dir>/<stem>_<n>.<extension>` for n = 1, 2, … with no gaps.
    Paged {
        dir: PathBuf,
        stem: String,
        extension: String,
    },
}

impl OutputPlan {
    /// Path of page `n` (1-indexed). For a single-file plan this is the file.
    pub fn page(&self, n: usize) -> PathBuf {
        match self {
            OutputPlan::Single { path } => path.clone(),
            OutputPlan::Paged {
                dir,
                stem,
                extension,
            } => dir.join(format!("{stem}_{n}.{extension}")),
        }
    }

    /// The artifact reported as "the" output: the file, or page 1.
    pub fn primary(&self) -> PathBuf {
        self.page(1)
    }

    pub fn is_paged(&self) -> bool {
        matches!(self, OutputPlan::Paged { .. })
    }
}

// ── Per-file outcomes ────────────────────────────────────────────────────────

/// Result of one dispatcher call.
#[derive(Debug)]
pub enum ConversionOutcome {
    Success { input: PathBuf, output: PathBuf },
    Failure { input: PathBuf, error: ConvertError },
}

impl ConversionOutcome {
    pub fn input(&self) -> &Path {
        match self {
            ConversionOutcome::Success { input, .. } | ConversionOutcome::Failure { input, .. } => {
                input
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Success { .. })
    }

    pub fn output(&self) -> Option<&Path> {
        match self {
            ConversionOutcome::Success { output, .. } => Some(output),
            ConversionOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ConvertError> {
        match self {
            ConversionOutcome::Failure { error, .. } => Some(error),
            ConversionOutcome::Success { .. } => None,
        }
    }
}

/// One entry of a [`BatchOutcome`]: a dispatcher result or a skip.
#[derive(Debug)]
pub enum FileOutcome {
    Success {
        input: PathBuf,
        output: PathBuf,
    },
    Failure {
        input: PathBuf,
        error: ConvertError,
    },
    /// The file's format cannot reach the batch target.
    Skipped {
        input: PathBuf,
        source_format: Option<Format>,
        target: Format,
    },
}

impl From<ConversionOutcome> for FileOutcome {
    fn from(outcome: ConversionOutcome) -> Self {
        match outcome {
            ConversionOutcome::Success { input, output } => FileOutcome::Success { input, output },
            ConversionOutcome::Failure { input, error } => FileOutcome::Failure { input, error },
        }
    }
}

impl FileOutcome {
    pub fn input(&self) -> &Path {
        match self {
            FileOutcome::Success { input, .. }
            | FileOutcome::Failure { input, .. }
            | FileOutcome::Skipped { input, .. } => input,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FileOutcome::Failure { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, FileOutcome::Skipped { .. })
    }

    /// Taxonomy kind for failures and skips.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            FileOutcome::Success { .. } => None,
            FileOutcome::Failure { error, .. } => Some(error.kind()),
            FileOutcome::Skipped { .. } => Some(ErrorKind::FormatMismatch),
        }
    }

    fn record(&self) -> OutcomeRecord {
        match self {
            FileOutcome::Success { input, output } => OutcomeRecord {
                input: input.clone(),
                status: OutcomeStatus::Success,
                output: Some(output.clone()),
                kind: None,
                message: None,
            },
            FileOutcome::Failure { input, error } => OutcomeRecord {
                input: input.clone(),
                status: OutcomeStatus::Failure,
                output: None,
                kind: Some(error.kind()),
                message: Some(error.to_string()),
            },
            FileOutcome::Skipped {
                input,
                source_format,
                target,
            } => OutcomeRecord {
                input: input.clone(),
                status: OutcomeStatus::Skipped,
                output: None,
                kind: Some(ErrorKind::FormatMismatch),
                message: Some(skip_message(source_format.as_ref(), target)),
            },
        }
    }
}

fn skip_message(source: Option<&Format>, target: &Format) -> String {
    match source {
        Some(s) => format!("'.{s}' files cannot be converted to '{target}'"),
        None => format!("file has no extension, cannot convert to '{target}'"),
    }
}

// ── Batch outcome ────────────────────────────────────────────────────────────

/// Ordered per-file results of one batch.
///
/// `succeeded() + failed() + skipped() == len()` always holds since every
/// entry is exactly one of the three.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// The target every file was converted toward; `None` when the prompt was
    /// cancelled before one was chosen.
    pub target: Option<Format>,
    /// The format prompt was cancelled; no conversion was attempted.
    pub cancelled: bool,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchOutcome {
    pub fn new(target: Format) -> Self {
        Self {
            target: Some(target),
            cancelled: false,
            outcomes: Vec::new(),
        }
    }

    /// The empty outcome of a cancelled prompt.
    pub fn cancelled() -> Self {
        Self {
            target: None,
            cancelled: true,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: impl Into<FileOutcome>) {
        self.outcomes.push(outcome.into());
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    /// Best-effort success: at least one file converted.
    pub fn is_success(&self) -> bool {
        self.succeeded() > 0
    }

    pub fn failed_inputs(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter(|o| o.is_failure())
            .map(FileOutcome::input)
            .collect()
    }

    /// Serialisable view of the batch (for `--json` and logs).
    pub fn report(&self) -> BatchReport {
        BatchReport {
            target: self.target.clone(),
            cancelled: self.cancelled,
            succeeded: self.succeeded(),
            failed: self.failed(),
            skipped: self.skipped(),
            files: self.outcomes.iter().map(FileOutcome::record).collect(),
        }
    }

    /// Plain-language summary for end users. Failure lines carry only the
    /// short form of each error; `log_path` is where the full diagnostics are.
    pub fn summary(&self, log_path: Option<&Path>) -> String {
        if self.cancelled {
            return "Conversion cancelled; nothing was converted.".to_string();
        }

        let target = self
            .target
            .as_ref()
            .map(Format::label)
            .unwrap_or_else(|| "?".to_string());
        let mut out = format!(
            "Converted {} of {} file(s) to {} ({} failed, {} skipped).",
            self.succeeded(),
            self.len(),
            target,
            self.failed(),
            self.skipped()
        );

        for outcome in &self.outcomes {
            match outcome {
                FileOutcome::Success { .. } => {}
                FileOutcome::Failure { input, error } => {
                    let _ = write!(out, "\n  failed:  {}: {}", display_name(input), error.summary());
                }
                FileOutcome::Skipped {
                    input,
                    source_format,
                    target,
                } => {
                    let _ = write!(
                        out,
                        "\n  skipped: {}: {}",
                        display_name(input),
                        skip_message(source_format.as_ref(), target)
                    );
                }
            }
        }

        if self.failed() > 0 {
            if let Some(log) = log_path {
                let _ = write!(out, "\nDetails: {}", log.display());
            }
        }
        out
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// JSON shape of a [`BatchOutcome`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub target: Option<Format>,
    pub cancelled: bool,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub files: Vec<OutcomeRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Failure,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub input: PathBuf,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
