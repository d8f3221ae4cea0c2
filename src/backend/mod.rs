//! Backend functions and the per-platform toolchains that offer them.
//!
//! A [`Backend`] performs one concrete conversion (`input → planned output`)
//! and declares the [`Requirement`] it needs from the environment. Backends
//! are opaque to the dispatcher: whatever goes wrong inside surfaces as a
//! [`BackendFailure`] whose message is passed through untouched.
//!
//! A [`Toolchain`] lists, for each registry [`Binding`], the backends that can
//! perform it on one platform, most preferred first:
//!
//! | Route | Windows | Linux / macOS |
//! |---|---|---|
//! | office → pdf | Office automation, soffice | soffice |
//! | docx → odt/txt/md/tex/html | pandoc, soffice (odt/txt/html) | same |
//! | pdf → docx | Word automation, soffice | soffice |
//! | pdf → pptx | soffice | soffice |
//! | pdf → txt/html/md/png, image → pdf | PDFium | PDFium |
//!
//! The platform decision happens once, in [`toolchain_for`].

pub mod office;
pub mod pandoc;
pub mod pdfium;
pub mod soffice;
pub mod text;

use crate::capability::Requirement;
use crate::config::ConverterConfig;
use crate::error::BackendFailure;
use crate::output::OutputPlan;
use crate::platform::Platform;
use crate::registry::{Binding, Route};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::Arc;
use tracing::debug;

pub use office::{OfficeAction, OfficeApp, OfficeAutomation};
pub use pandoc::Pandoc;
pub use pdfium::{PdfiumBackend, PdfiumMode, RenderOptions};
pub use soffice::Soffice;

/// One concrete conversion implementation.
pub trait Backend: Send + Sync {
    /// Short name used in logs and error messages ("soffice", "pandoc", …).
    fn name(&self) -> &str;

    /// What must be present for [`Backend::convert`] to work.
    fn requirement(&self) -> Requirement;

    /// Convert `input` (an absolute path) and write the artifact(s) declared
    /// by `plan`. Returns the primary artifact path.
    fn convert(&self, input: &Path, plan: &OutputPlan) -> Result<PathBuf, BackendFailure>;
}

impl fmt::Debug for dyn Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Backend({})", self.name())
    }
}

/// The backends one platform offers for each binding.
pub trait Toolchain: Send + Sync {
    fn platform(&self) -> Platform;

    /// Candidate backends for `binding`, most preferred first. Empty when the
    /// platform has no way to perform it.
    fn candidates(&self, binding: &Binding) -> Vec<Arc<dyn Backend>>;
}

/// Program locations and render settings shared by both toolchains.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub soffice: String,
    pub pandoc: String,
    pub powershell: String,
    pub render: RenderOptions,
}

impl ToolPaths {
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self {
            soffice: config.soffice_program.clone(),
            pandoc: config.pandoc_program.clone(),
            powershell: config.powershell_program.clone(),
            render: RenderOptions {
                max_rendered_pixels: config.max_rendered_pixels,
                page_separator: config.page_separator.clone(),
                password: config.password.clone(),
            },
        }
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self::from_config(&ConverterConfig::default())
    }
}

/// Linux and macOS: LibreOffice, pandoc and PDFium.
#[derive(Debug, Clone)]
pub struct UnixToolchain {
    platform: Platform,
    tools: ToolPaths,
}

impl UnixToolchain {
    pub fn new(platform: Platform, tools: ToolPaths) -> Self {
        Self { platform, tools }
    }
}

impl Toolchain for UnixToolchain {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn candidates(&self, binding: &Binding) -> Vec<Arc<dyn Backend>> {
        portable_candidates(&self.tools, binding)
    }
}

/// Windows: Office automation first where it applies, then the portable
/// tools.
#[derive(Debug, Clone)]
pub struct WindowsToolchain {
    tools: ToolPaths,
}

impl WindowsToolchain {
    pub fn new(tools: ToolPaths) -> Self {
        Self { tools }
    }
}

impl Toolchain for WindowsToolchain {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn candidates(&self, binding: &Binding) -> Vec<Arc<dyn Backend>> {
        let mut candidates: Vec<Arc<dyn Backend>> = Vec::new();
        if let Some(office) = OfficeAutomation::for_route(&self.tools.powershell, binding.route) {
            candidates.push(Arc::new(office));
        }
        candidates.extend(portable_candidates(&self.tools, binding));
        candidates
    }
}

/// Select the toolchain for `platform`.
pub fn toolchain_for(platform: Platform, tools: ToolPaths) -> Arc<dyn Toolchain> {
    match platform {
        Platform::Windows => Arc::new(WindowsToolchain::new(tools)),
        Platform::Linux | Platform::MacOs => Arc::new(UnixToolchain::new(platform, tools)),
    }
}

fn portable_candidates(tools: &ToolPaths, binding: &Binding) -> Vec<Arc<dyn Backend>> {
    let mut out: Vec<Arc<dyn Backend>> = Vec::new();
    let render = |mode: PdfiumMode| -> Arc<dyn Backend> {
        Arc::new(PdfiumBackend::new(mode, tools.render.clone()))
    };

    match binding.route {
        Route::DocumentToPdf | Route::PresentationToPdf | Route::SpreadsheetToPdf => {
            out.push(Arc::new(Soffice::new(&tools.soffice, "pdf")));
        }
        Route::DocumentExport => {
            if let Some(pandoc) = Pandoc::for_target(&tools.pandoc, &binding.target) {
                out.push(Arc::new(pandoc));
            }
            if let Some(soffice) = Soffice::export(&tools.soffice, &binding.target) {
                out.push(Arc::new(soffice));
            }
        }
        Route::PdfToDocument => {
            out.push(Arc::new(
                Soffice::new(&tools.soffice, "docx:MS Word 2007 XML")
                    .with_infilter("writer_pdf_import"),
            ));
        }
        Route::PdfToPresentation => {
            out.push(Arc::new(
                Soffice::new(&tools.soffice, "pptx").with_infilter("impress_pdf_import"),
            ));
        }
        Route::PdfToText => out.push(render(PdfiumMode::Text)),
        Route::PdfToHtml => out.push(render(PdfiumMode::Html)),
        Route::PdfToMarkdown => out.push(render(PdfiumMode::Markdown)),
        Route::PdfToImages => out.push(render(PdfiumMode::PageImages)),
        Route::ImageToPdf => out.push(render(PdfiumMode::ImageToPdf)),
    }
    out
}

// ── Process helpers ──────────────────────────────────────────────────────────

/// Run `cmd` to completion, mapping spawn errors and failure exit codes to
/// [`BackendFailure`].
pub(crate) fn run(program: &str, mut cmd: Command) -> Result<Output, BackendFailure> {
    debug!("Running {:?}", cmd);
    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|source| BackendFailure::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stderr = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        return Err(BackendFailure::Process {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr,
        });
    }
    Ok(output)
}

/// Copy `from` to `to`, replacing any previous output. Copy rather than
/// rename since temp dirs often live on another filesystem.
pub(crate) fn place(from: &Path, to: &Path) -> Result<(), BackendFailure> {
    std::fs::copy(from, to)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Format;

    fn binding(source: &str, target: &str, route: Route) -> Binding {
        Binding {
            source: Format::parse(source).unwrap(),
            target: Format::parse(target).unwrap(),
            route,
        }
    }

    fn names(candidates: &[Arc<dyn Backend>]) -> Vec<String> {
        candidates.iter().map(|b| b.name().to_string()).collect()
    }

    #[test]
    fn windows_prefers_office_then_soffice() {
        let tc = toolchain_for(Platform::Windows, ToolPaths::default());
        let c = tc.candidates(&binding("docx", "pdf", Route::DocumentToPdf));
        assert_eq!(names(&c), vec!["Word", "soffice"]);
        assert!(matches!(c[0].requirement(), Requirement::Automation { .. }));
    }

    #[test]
    fn unix_has_no_office_automation() {
        let tc = toolchain_for(Platform::Linux, ToolPaths::default());
        let c = tc.candidates(&binding("pptx", "pdf", Route::PresentationToPdf));
        assert_eq!(names(&c), vec!["soffice"]);
        assert_eq!(tc.platform(), Platform::Linux);
    }

    #[test]
    fn export_prefers_pandoc_and_falls_back_where_soffice_can() {
        let tc = toolchain_for(Platform::Linux, ToolPaths::default());
        let odt = tc.candidates(&binding("docx", "odt", Route::DocumentExport));
        assert_eq!(names(&odt), vec!["pandoc", "soffice"]);
        let tex = tc.candidates(&binding("docx", "tex", Route::DocumentExport));
        assert_eq!(names(&tex), vec!["pandoc"]);
    }

    #[test]
    fn pdf_routes_use_the_renderer() {
        let tc = toolchain_for(Platform::MacOs, ToolPaths::default());
        for (target, route) in [
            ("txt", Route::PdfToText),
            ("html", Route::PdfToHtml),
            ("md", Route::PdfToMarkdown),
            ("png", Route::PdfToImages),
        ] {
            let c = tc.candidates(&binding("pdf", target, route));
            assert_eq!(c.len(), 1);
            assert_eq!(c[0].requirement(), Requirement::Renderer);
        }
    }

    #[test]
    fn every_standard_binding_has_a_candidate_everywhere() {
        for platform in [Platform::Windows, Platform::Linux, Platform::MacOs] {
            let tc = toolchain_for(platform, ToolPaths::default());
            for b in crate::registry::Registry::standard().bindings() {
                assert!(!tc.candidates(b).is_empty(), "{platform}: {b:?}");
            }
        }
    }

    #[test]
    fn failing_process_reports_status() {
        let mut cmd = Command::new("definitely-not-a-real-program-xyz");
        cmd.arg("--version");
        let err = run("definitely-not-a-real-program-xyz", cmd).unwrap_err();
        assert!(matches!(err, BackendFailure::Spawn { .. }));
    }
}
