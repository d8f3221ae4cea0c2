//! Choosing a target format when the caller did not name one.
//!
//! The batch controller only needs "pick one of these, or cancel". The CLI
//! supplies an interactive [`ConsolePrompt`]; tests and scripted callers use
//! [`Preselected`].

use crate::format::Format;

pub trait FormatPrompt {
    /// Offer `candidates` (in registry order) for a `source` file. `None`
    /// means the user cancelled.
    fn prompt_choice(&self, source: &Format, candidates: &[Format]) -> Option<Format>;
}

/// Answers every prompt with a fixed choice (`None` cancels).
#[derive(Debug, Clone, Default)]
pub struct Preselected(pub Option<Format>);

impl Preselected {
    pub fn choose(format: Format) -> Self {
        Self(Some(format))
    }

    pub fn cancel() -> Self {
        Self(None)
    }
}

impl FormatPrompt for Preselected {
    fn prompt_choice(&self, _source: &Format, _candidates: &[Format]) -> Option<Format> {
        self.0.clone()
    }
}

/// Terminal list selection. Esc or `q` cancels, as does a stdin that is not
/// a terminal.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default)]
pub struct ConsolePrompt;

#[cfg(feature = "cli")]
impl FormatPrompt for ConsolePrompt {
    fn prompt_choice(&self, source: &Format, candidates: &[Format]) -> Option<Format> {
        if candidates.is_empty() {
            return None;
        }
        let items: Vec<String> = candidates.iter().map(Format::label).collect();
        let selection = dialoguer::Select::new()
            .with_prompt(format!("Convert {} to", source.label()))
            .items(&items)
            .default(0)
            .interact_opt();

        match selection {
            Ok(Some(index)) => candidates.get(index).cloned(),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!("Format prompt unavailable: {}", e);
                None
            }
        }
    }
}
