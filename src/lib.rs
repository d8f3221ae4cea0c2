//! # liteswitch
//!
//! Convert documents between office, PDF, text and image formats by routing
//! each file to the right backend: Microsoft Office automation on Windows,
//! LibreOffice (`soffice`) and pandoc everywhere, and PDFium in-process.
//!
//! The crate does no format conversion itself. It decides *which* backend
//! handles a `(source, target)` pair on this machine, runs it, checks that
//! the output really exists and names it predictably.
//!
//! ## Flow
//!
//! ```text
//! caller (CLI, shell menu)
//!  │
//!  ├─ BatchController  prompt for a target if needed, skip mismatched files
//!  ├─ Dispatcher       registry lookup, path checks, output naming
//!  ├─ Resolver         platform toolchain, memoised capability probes
//!  └─ Backend          Office / soffice / pandoc / PDFium
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use liteswitch::{BatchController, ConverterConfig, Format, Preselected};
//! use std::path::PathBuf;
//!
//! let config = ConverterConfig::default();
//! let controller = BatchController::from_config(&config);
//! let target = Format::parse("pdf").unwrap();
//! let inputs = vec![PathBuf::from("report.docx"), PathBuf::from("slides.pptx")];
//!
//! let outcome = controller
//!     .convert_batch(&inputs, Some(&target), &Preselected::cancel())
//!     .expect("at least one input");
//! println!("{}", outcome.summary(None));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `liteswitch` binary (clap + anyhow + tracing-subscriber + indicatif + dialoguer) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! liteswitch = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod batch;
pub mod capability;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod menu;
pub mod output;
pub mod platform;
pub mod progress;
pub mod prompt;
pub mod registry;
pub mod resolver;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{toolchain_for, Backend, ToolPaths, Toolchain};
pub use batch::BatchController;
pub use capability::{
    Availability, CapabilityCache, CapabilityProbe, Requirement, SystemProbe, Version,
};
pub use config::{default_log_path, ConverterConfig, ConverterConfigBuilder, PageSeparator};
pub use dispatch::Dispatcher;
pub use error::{BackendFailure, BatchError, ConfigError, ConvertError, ErrorKind, RegistryError};
pub use format::Format;
pub use menu::{menu_entries, MenuEntry, MenuGroup};
pub use output::{
    BatchOutcome, BatchReport, ConversionOutcome, FileOutcome, OutputNaming, OutputPlan,
};
pub use platform::Platform;
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
#[cfg(feature = "cli")]
pub use prompt::ConsolePrompt;
pub use prompt::{FormatPrompt, Preselected};
pub use registry::{Binding, Cardinality, Registry, Route};
pub use resolver::{Rejection, Resolver, Unavailable};
