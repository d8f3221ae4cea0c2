//! Microsoft Office automation (Windows only).
//!
//! Each conversion runs a short PowerShell script that creates the Office
//! COM server, opens the input invisibly, exports it and quits the
//! application even when the export throws. Input and output paths reach
//! the script through environment variables and never appear in its text.

use super::{run, Backend};
use crate::capability::Requirement;
use crate::error::BackendFailure;
use crate::output::OutputPlan;
use crate::registry::Route;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Environment variable holding the input path for the script.
pub const INPUT_VAR: &str = "LITESWITCH_IN";
/// Environment variable holding the output path for the script.
pub const OUTPUT_VAR: &str = "LITESWITCH_OUT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfficeApp {
    Word,
    PowerPoint,
    Excel,
}

impl OfficeApp {
    pub fn prog_id(self) -> &'static str {
        match self {
            OfficeApp::Word => "Word.Application",
            OfficeApp::PowerPoint => "PowerPoint.Application",
            OfficeApp::Excel => "Excel.Application",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OfficeApp::Word => "Word",
            OfficeApp::PowerPoint => "PowerPoint",
            OfficeApp::Excel => "Excel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfficeAction {
    /// Export the opened document as PDF.
    ExportPdf,
    /// Open a PDF in Word (PDF reflow) and save it as DOCX.
    PdfToDocx,
}

/// Runs one Office application through PowerShell.
#[derive(Debug, Clone)]
pub struct OfficeAutomation {
    powershell: String,
    app: OfficeApp,
    action: OfficeAction,
}

impl OfficeAutomation {
    pub fn new(powershell: impl Into<String>, app: OfficeApp, action: OfficeAction) -> Self {
        Self {
            powershell: powershell.into(),
            app,
            action,
        }
    }

    /// The Office application that handles `route`, if any.
    pub fn for_route(powershell: &str, route: Route) -> Option<Self> {
        let (app, action) = match route {
            Route::DocumentToPdf => (OfficeApp::Word, OfficeAction::ExportPdf),
            Route::PresentationToPdf => (OfficeApp::PowerPoint, OfficeAction::ExportPdf),
            Route::SpreadsheetToPdf => (OfficeApp::Excel, OfficeAction::ExportPdf),
            Route::PdfToDocument => (OfficeApp::Word, OfficeAction::PdfToDocx),
            _ => return None,
        };
        Some(Self::new(powershell, app, action))
    }

    pub fn app(&self) -> OfficeApp {
        self.app
    }

    /// The PowerShell script converting `$env:LITESWITCH_IN` into
    /// `$env:LITESWITCH_OUT`.
    pub fn script(&self) -> String {
        let input = format!("$env:{INPUT_VAR}");
        let output = format!("$env:{OUTPUT_VAR}");
        let body = match (self.app, self.action) {
            (OfficeApp::Word, OfficeAction::ExportPdf) => format!(
                "$app.Visible = $false\n\
                 $app.DisplayAlerts = 0\n\
                 $doc = $app.Documents.Open({input}, $false, $true)\n\
                 try {{ $doc.ExportAsFixedFormat({output}, 17) }} finally {{ $doc.Close($false) }}"
            ),
            (OfficeApp::Word, OfficeAction::PdfToDocx) => format!(
                "$app.Visible = $false\n\
                 $app.DisplayAlerts = 0\n\
                 $doc = $app.Documents.Open({input}, $false, $false)\n\
                 try {{ $doc.SaveAs2({output}, 16) }} finally {{ $doc.Close($false) }}"
            ),
            (OfficeApp::PowerPoint, _) => format!(
                "$pres = $app.Presentations.Open({input}, -1, 0, 0)\n\
                 try {{ $pres.SaveAs({output}, 32) }} finally {{ $pres.Close() }}"
            ),
            (OfficeApp::Excel, _) => format!(
                "$app.Visible = $false\n\
                 $app.DisplayAlerts = $false\n\
                 $wb = $app.Workbooks.Open({input}, 0, $true)\n\
                 try {{ $wb.ExportAsFixedFormat(0, {output}) }} finally {{ $wb.Close($false) }}"
            ),
        };
        format!(
            "$ErrorActionPreference = 'Stop'\n\
             $app = New-Object -ComObject {}\n\
             try {{\n{body}\n}} finally {{ $app.Quit() }}",
            self.app.prog_id()
        )
    }

    /// The PowerShell invocation converting `input` into `output`.
    pub fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.powershell);
        cmd.args([
            "-NoProfile",
            "-NonInteractive",
            "-ExecutionPolicy",
            "Bypass",
            "-Command",
        ])
        .arg(self.script())
        .env(INPUT_VAR, input)
        .env(OUTPUT_VAR, output);
        cmd
    }
}

impl Backend for OfficeAutomation {
    fn name(&self) -> &str {
        self.app.name()
    }

    fn requirement(&self) -> Requirement {
        Requirement::Automation {
            host: self.powershell.clone(),
            prog_id: self.app.prog_id().to_string(),
        }
    }

    fn convert(&self, input: &Path, plan: &OutputPlan) -> Result<PathBuf, BackendFailure> {
        let output = plan.primary();
        run(&self.powershell, self.command(input, &output))?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_map_to_applications() {
        let word = OfficeAutomation::for_route("powershell", Route::DocumentToPdf).unwrap();
        assert_eq!(word.app(), OfficeApp::Word);
        let excel = OfficeAutomation::for_route("powershell", Route::SpreadsheetToPdf).unwrap();
        assert_eq!(excel.requirement(), Requirement::Automation {
            host: "powershell".into(),
            prog_id: "Excel.Application".into(),
        });
        assert!(OfficeAutomation::for_route("powershell", Route::PdfToText).is_none());
    }

    fn env_of(cmd: &Command, key: &str) -> Option<String> {
        cmd.get_envs()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| v)
            .map(|v| v.to_string_lossy().into_owned())
    }

    #[test]
    fn word_script_exports_pdf_and_quits() {
        let word = OfficeAutomation::new("powershell", OfficeApp::Word, OfficeAction::ExportPdf);
        let s = word.script();
        assert!(s.contains("New-Object -ComObject Word.Application"));
        assert!(s.contains("Documents.Open($env:LITESWITCH_IN, $false, $true)"));
        assert!(s.contains("ExportAsFixedFormat($env:LITESWITCH_OUT, 17)"));
        assert!(s.contains("$app.Quit()"));
    }

    #[test]
    fn paths_travel_in_the_environment() {
        let ppt = OfficeAutomation::new("powershell", OfficeApp::PowerPoint, OfficeAction::ExportPdf);
        let input = Path::new("C:/dl/x\u{2019}; Start-Process calc; \u{2019}.pptx");
        let output = Path::new("C:/Bob's/deck_X.pdf");
        let cmd = ppt.command(input, output);

        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        let script = args.last().unwrap();
        assert!(!script.contains("Start-Process"), "{script}");
        assert!(!script.contains("Bob"), "{script}");
        assert!(!script.contains('\u{2019}'), "{script}");
        assert_eq!(script.matches('\'').count() % 2, 0, "{script}");
        assert_eq!(env_of(&cmd, INPUT_VAR).as_deref(), input.to_str());
        assert_eq!(env_of(&cmd, OUTPUT_VAR).as_deref(), output.to_str());
    }

    #[test]
    fn pdf_to_docx_saves_as_docx() {
        let word = OfficeAutomation::new("powershell", OfficeApp::Word, OfficeAction::PdfToDocx);
        assert!(word.script().contains("SaveAs2($env:LITESWITCH_OUT, 16)"));
    }
}
