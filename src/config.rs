//! Configuration for the converter.
//!
//! Everything the dispatcher and its backends can be tuned with lives in
//! [`ConverterConfig`], built through [`ConverterConfigBuilder`]. The CLI maps
//! its flags (and `LITESWITCH_*` environment variables) onto the builder.
//!
//! # Example
//! ```rust
//! use liteswitch::{ConverterConfig, PageSeparator};
//!
//! let config = ConverterConfig::builder()
//!     .output_suffix("Converted")
//!     .pandoc_program("/opt/pandoc/bin/pandoc")
//!     .page_separator(PageSeparator::HorizontalRule)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.output_suffix, "Converted");
//! ```

use crate::error::ConfigError;
use crate::output::DEFAULT_SUFFIX;
use crate::platform::Platform;
use crate::progress::{BatchProgressCallback, ProgressCallback};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Smallest accepted `max_rendered_pixels`.
pub const MIN_RENDERED_PIXELS: u32 = 100;

/// Largest accepted `max_rendered_pixels`.
pub const MAX_RENDERED_PIXELS: u32 = 20_000;

/// Converter settings. See the field docs for defaults.
#[derive(Clone)]
pub struct ConverterConfig {
    /// Inserted between an input's stem and the new extension. Default: `LiteSwitch`.
    pub output_suffix: String,

    /// Platform whose toolchain is used. Default: `None` (the host platform).
    pub platform: Option<Platform>,

    /// LibreOffice executable. Default: `soffice`.
    pub soffice_program: String,

    /// Pandoc executable. Default: `pandoc`.
    pub pandoc_program: String,

    /// PowerShell executable that hosts the Office automation scripts.
    /// Default: `powershell`.
    pub powershell_program: String,

    /// Longest edge, in pixels, of a rendered page image. Default: 2000.
    ///
    /// Caps memory for very large pages (posters, plans) independently of
    /// their physical size. The builder keeps it within
    /// `MIN_RENDERED_PIXELS..=MAX_RENDERED_PIXELS`.
    pub max_rendered_pixels: u32,

    /// Text placed between pages in txt / md output. Default: blank line.
    pub page_separator: PageSeparator,

    /// User password for encrypted PDF inputs.
    pub password: Option<String>,

    /// Receives per-file batch events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            output_suffix: DEFAULT_SUFFIX.to_string(),
            platform: None,
            soffice_program: "soffice".to_string(),
            pandoc_program: "pandoc".to_string(),
            powershell_program: "powershell".to_string(),
            max_rendered_pixels: 2000,
            page_separator: PageSeparator::default(),
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConverterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterConfig")
            .field("output_suffix", &self.output_suffix)
            .field("platform", &self.platform)
            .field("soffice_program", &self.soffice_program)
            .field("pandoc_program", &self.pandoc_program)
            .field("powershell_program", &self.powershell_program)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("page_separator", &self.page_separator)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl ConverterConfig {
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder {
            config: Self::default(),
        }
    }

    /// The configured platform, or the host's.
    pub fn effective_platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }
}

/// Builder for [`ConverterConfig`].
#[derive(Debug)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    pub fn output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.output_suffix = suffix.into();
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.config.platform = Some(platform);
        self
    }

    pub fn soffice_program(mut self, program: impl Into<String>) -> Self {
        self.config.soffice_program = program.into();
        self
    }

    pub fn pandoc_program(mut self, program: impl Into<String>) -> Self {
        self.config.pandoc_program = program.into();
        self
    }

    pub fn powershell_program(mut self, program: impl Into<String>) -> Self {
        self.config.powershell_program = program.into();
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.clamp(MIN_RENDERED_PIXELS, MAX_RENDERED_PIXELS);
        self
    }

    pub fn page_separator(mut self, sep: PageSeparator) -> Self {
        self.config.page_separator = sep;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn BatchProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ConverterConfig, ConfigError> {
        let suffix = self.config.output_suffix.trim().to_string();
        if suffix.is_empty() {
            return Err(ConfigError::Invalid("output suffix must not be empty".into()));
        }
        if suffix
            .chars()
            .any(|ch| ch == '/' || ch == '\\' || ch.is_whitespace())
        {
            return Err(ConfigError::Invalid(format!(
                "output suffix '{suffix}' must not contain separators or whitespace"
            )));
        }
        self.config.output_suffix = suffix;
        let c = &self.config;
        for (what, program) in [
            ("soffice", &c.soffice_program),
            ("pandoc", &c.pandoc_program),
            ("powershell", &c.powershell_program),
        ] {
            if program.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{what} program must not be empty")));
            }
        }
        Ok(self.config)
    }
}

/// Per-user log file: `<data-local>/liteswitch/liteswitch.log`.
///
/// `LITESWITCH_LOG_DIR` replaces the directory.
pub fn default_log_path() -> PathBuf {
    let dir = std::env::var_os("LITESWITCH_LOG_DIR")
        .map(PathBuf::from)
        .or_else(|| dirs::data_local_dir().map(|d| d.join("liteswitch")))
        .unwrap_or_else(|| std::env::temp_dir().join("liteswitch"));
    dir.join("liteswitch.log")
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How to separate pages in text and Markdown output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSeparator {
    /// No separator; pages joined with a blank line. (default)
    #[default]
    None,
    /// Horizontal rule: "\n\n---\n\n"
    HorizontalRule,
    /// HTML comment with page number: "<!-- page N -->"
    Comment,
    /// Custom string inserted between pages.
    Custom(String),
}

impl PageSeparator {
    /// Render the separator placed before page `page_num` (1-indexed).
    pub fn render(&self, page_num: usize) -> String {
        match self {
            PageSeparator::None => "\n\n".to_string(),
            PageSeparator::HorizontalRule => "\n\n---\n\n".to_string(),
            PageSeparator::Comment => format!("\n\n<!-- page {} -->\n\n", page_num),
            PageSeparator::Custom(s) => format!("\n\n{}\n\n", s),
        }
    }

    /// Parse a CLI token: `none`, `hr`, `comment`, anything else is custom.
    pub fn parse(s: &str) -> PageSeparator {
        match s.to_lowercase().as_str() {
            "none" | "" => PageSeparator::None,
            "hr" | "---" => PageSeparator::HorizontalRule,
            "comment" => PageSeparator::Comment,
            _ => PageSeparator::Custom(s.to_string()),
        }
    }
}
