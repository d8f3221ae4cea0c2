//! Pandoc document export.

use super::{run, Backend};
use crate::capability::{Requirement, Version};
use crate::error::BackendFailure;
use crate::format::Format;
use crate::output::OutputPlan;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Oldest pandoc whose writers and `-o` handling we rely on.
pub const MIN_PANDOC: Version = Version::new(2, 0);

#[derive(Debug, Clone)]
pub struct Pandoc {
    program: String,
    writer: &'static str,
}

/// Pandoc writer for a target format.
pub fn writer_for(target: &Format) -> Option<&'static str> {
    Some(match target.as_str() {
        "odt" => "odt",
        "docx" => "docx",
        "txt" => "plain",
        "md" => "markdown",
        "tex" => "latex",
        "html" => "html",
        _ => return None,
    })
}

impl Pandoc {
    pub fn for_target(program: &str, target: &Format) -> Option<Self> {
        writer_for(target).map(|writer| Self {
            program: program.to_string(),
            writer,
        })
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(input).arg("-t").arg(self.writer);
        // Text writers produce fragments unless asked for a full document.
        if matches!(self.writer, "html" | "latex") {
            cmd.arg("--standalone");
        }
        cmd.arg("-o").arg(output);
        cmd
    }
}

impl Backend for Pandoc {
    fn name(&self) -> &str {
        "pandoc"
    }

    fn requirement(&self) -> Requirement {
        Requirement::program_at_least(self.program.clone(), MIN_PANDOC)
    }

    fn convert(&self, input: &Path, plan: &OutputPlan) -> Result<PathBuf, BackendFailure> {
        let output = plan.primary();
        run(&self.program, self.command(input, &output))?;
        Ok(output)
    }
}
