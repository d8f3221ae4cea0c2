//! LibreOffice in headless mode.
//!
//! `soffice --convert-to` always names its result after the input stem and
//! writes into `--outdir`, so each run gets a private temp directory (which
//! also holds a throwaway user profile, letting conversions work while a
//! desktop LibreOffice is open). The result is then copied to the planned
//! output path.

use super::{place, run, Backend};
use crate::capability::Requirement;
use crate::error::BackendFailure;
use crate::format::Format;
use crate::output::OutputPlan;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Soffice {
    program: String,
    /// `--convert-to` argument, e.g. `pdf` or `docx:MS Word 2007 XML`.
    convert_to: String,
    infilter: Option<String>,
}

impl Soffice {
    pub fn new(program: impl Into<String>, convert_to: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            convert_to: convert_to.into(),
            infilter: None,
        }
    }

    pub fn with_infilter(mut self, filter: impl Into<String>) -> Self {
        self.infilter = Some(filter.into());
        self
    }

    /// Document export to `target`, for the targets LibreOffice writes well.
    pub fn export(program: &str, target: &Format) -> Option<Self> {
        let convert_to = match target.as_str() {
            "odt" => "odt",
            "docx" => "docx:MS Word 2007 XML",
            "txt" => "txt:Text (encoded):UTF8",
            "html" => "html",
            _ => return None,
        };
        Some(Self::new(program, convert_to))
    }

    /// Extension of the file soffice writes (the part before the filter name).
    fn result_extension(&self) -> &str {
        self.convert_to.split(':').next().unwrap_or(&self.convert_to)
    }

    fn command(&self, input: &Path, outdir: &Path, profile: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(format!("-env:UserInstallation={}", file_url(profile)))
            .arg("--headless")
            .arg("--norestore");
        if let Some(filter) = &self.infilter {
            cmd.arg(format!("--infilter={filter}"));
        }
        cmd.arg("--convert-to")
            .arg(&self.convert_to)
            .arg("--outdir")
            .arg(outdir)
            .arg(input);
        cmd
    }
}

/// `file://` URL for a local directory, as `-env:UserInstallation` expects.
fn file_url(path: &Path) -> String {
    let p = path.display().to_string().replace('\\', "/");
    if p.starts_with('/') {
        format!("file://{p}")
    } else {
        format!("file:///{p}")
    }
}

impl Backend for Soffice {
    fn name(&self) -> &str {
        "soffice"
    }

    fn requirement(&self) -> Requirement {
        Requirement::program(self.program.clone())
    }

    fn convert(&self, input: &Path, plan: &OutputPlan) -> Result<PathBuf, BackendFailure> {
        let work = tempfile::Builder::new().prefix("liteswitch-soffice").tempdir()?;
        let outdir = work.path().join("out");
        let profile = work.path().join("profile");
        std::fs::create_dir_all(&outdir)?;

        run(&self.program, self.command(input, &outdir, &profile))?;

        let mut name = input.file_stem().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(self.result_extension());
        let produced = outdir.join(name);
        if !produced.is_file() {
            return Err(BackendFailure::NoResult {
                program: self.program.clone(),
                dir: outdir,
            });
        }

        let output = plan.primary();
        debug!("soffice wrote {}, placing at {}", produced.display(), output.display());
        place(&produced, &output)?;
        Ok(output)
    }
}
