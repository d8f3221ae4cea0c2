//! The batch controller: many inputs, one target format.
//!
//! Policy, in order:
//!
//! 1. With no target given, the first existing input whose format the
//!    registry knows (the *driver*) decides which targets are offered, and
//!    the prompt picks one. Cancelling returns an empty, cancelled outcome
//!    before anything is touched.
//! 2. Inputs that do not exist become `Failure(PathNotFound)` without a
//!    dispatcher call.
//! 3. Inputs whose own format cannot reach the target are `Skipped`, so a
//!    mixed selection converts whatever matches.
//! 4. An input whose planned output was already written by an earlier file
//!    of the same batch (`scan.png` and `scan.jpg` both plan
//!    `scan_LiteSwitch.pdf`) fails with `OutputConflict` and is not
//!    converted.
//! 5. Everything else goes through the dispatcher, one file at a time, in
//!    input order.
//!
//! Per-file failures never stop the batch. The batch counts as successful
//! when at least one file converted.

use crate::config::ConverterConfig;
use crate::dispatch::{absolute, Dispatcher};
use crate::error::{BatchError, ConvertError};
use crate::format::Format;
use crate::output::{BatchOutcome, ConversionOutcome, FileOutcome};
use crate::progress::ProgressCallback;
use crate::prompt::FormatPrompt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct BatchController {
    dispatcher: Dispatcher,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for BatchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchController")
            .field("dispatcher", &self.dispatcher)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn BatchProgressCallback>"))
            .finish()
    }
}

impl BatchController {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            progress: None,
        }
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        Self {
            dispatcher: Dispatcher::from_config(config),
            progress: config.progress_callback.clone(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Convert every input toward `target`, or toward the format chosen
    /// through `prompt` when `target` is `None`.
    ///
    /// Returns [`BatchError::NoUsableInput`] when `inputs` is empty, or when
    /// a target must be prompted for and no input can drive the prompt.
    pub fn convert_batch(
        &self,
        inputs: &[PathBuf],
        target: Option<&Format>,
        prompt: &dyn FormatPrompt,
    ) -> Result<BatchOutcome, BatchError> {
        if inputs.is_empty() {
            return Err(BatchError::NoUsableInput { inputs: 0 });
        }

        let target = match target {
            Some(t) => t.clone(),
            None => match self.choose_target(inputs, prompt)? {
                Some(t) => t,
                None => {
                    info!("Format selection cancelled; nothing converted");
                    return Ok(BatchOutcome::cancelled());
                }
            },
        };

        let total = inputs.len();
        let mut batch = BatchOutcome::new(target.clone());
        let mut produced: HashMap<PathBuf, PathBuf> = HashMap::new();
        if let Some(cb) = &self.progress {
            cb.on_batch_start(total, &target);
        }

        for (i, input) in inputs.iter().enumerate() {
            if let Some(cb) = &self.progress {
                cb.on_file_start(i + 1, total, input);
            }

            let outcome = self.convert_one(input, &target, &mut produced);
            if let Some(cb) = &self.progress {
                cb.on_file_complete(i + 1, total, input, outcome.is_success());
            }
            batch.push(outcome);
        }

        info!(
            "Batch to {}: {} succeeded, {} failed, {} skipped",
            target,
            batch.succeeded(),
            batch.failed(),
            batch.skipped()
        );
        if let Some(cb) = &self.progress {
            cb.on_batch_complete(batch.succeeded(), batch.failed(), batch.skipped());
        }
        Ok(batch)
    }

    /// `produced` maps each output written so far to the input it came from.
    fn convert_one(
        &self,
        input: &Path,
        target: &Format,
        produced: &mut HashMap<PathBuf, PathBuf>,
    ) -> FileOutcome {
        if !input.is_file() {
            warn!("{}: file not found", input.display());
            return ConversionOutcome::Failure {
                input: input.to_path_buf(),
                error: ConvertError::PathNotFound {
                    path: input.to_path_buf(),
                },
            }
            .into();
        }

        let source = Format::from_path(input);
        let binding = source
            .as_ref()
            .and_then(|s| self.dispatcher.registry().resolve(s, target).ok());
        let Some(binding) = binding else {
            debug!("{}: skipped, cannot reach {}", input.display(), target);
            return FileOutcome::Skipped {
                input: input.to_path_buf(),
                source_format: source,
                target: target.clone(),
            };
        };

        let planned = self
            .dispatcher
            .naming()
            .plan(&absolute(input), target, binding.cardinality())
            .primary();
        if let Some(first) = produced.get(&planned) {
            warn!(
                "{}: '{}' was already written from {}",
                input.display(),
                planned.display(),
                first.display()
            );
            return ConversionOutcome::Failure {
                input: input.to_path_buf(),
                error: ConvertError::OutputConflict {
                    path: planned,
                    first: first.clone(),
                },
            }
            .into();
        }

        let outcome = self.dispatcher.convert(input, target);
        if let ConversionOutcome::Success { output, .. } = &outcome {
            produced.insert(output.clone(), input.to_path_buf());
        }
        outcome.into()
    }

    /// Prompt for a target using the driver file's format. `Ok(None)` is a
    /// cancellation.
    fn choose_target(
        &self,
        inputs: &[PathBuf],
        prompt: &dyn FormatPrompt,
    ) -> Result<Option<Format>, BatchError> {
        let registry = self.dispatcher.registry();
        let (source, candidates) = inputs
            .iter()
            .filter(|p| p.is_file())
            .filter_map(|p| Format::from_path(p))
            .find_map(|f| registry.lookup(&f).map(|targets| (f, targets)))
            .ok_or(BatchError::NoUsableInput {
                inputs: inputs.len(),
            })?;

        debug!("Prompting for a target for .{} ({} candidates)", source, candidates.len());
        match prompt.prompt_choice(&source, &candidates) {
            Some(choice) if candidates.contains(&choice) => Ok(Some(choice)),
            Some(choice) => {
                warn!("'{}' is not a target for .{}; treating as cancelled", choice, source);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::Preselected;

    #[test]
    fn empty_input_list_is_fatal() {
        let controller = BatchController::from_config(&ConverterConfig::default());
        let err = controller
            .convert_batch(&[], None, &Preselected::cancel())
            .unwrap_err();
        assert!(matches!(err, BatchError::NoUsableInput { inputs: 0 }));
    }

    #[test]
    fn no_driver_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let song = dir.path().join("song.mp3");
        std::fs::write(&song, b"id3").unwrap();
        let inputs = vec![dir.path().join("missing.docx"), song];

        let controller = BatchController::from_config(&ConverterConfig::default());
        let err = controller
            .convert_batch(&inputs, None, &Preselected::cancel())
            .unwrap_err();
        assert!(matches!(err, BatchError::NoUsableInput { inputs: 2 }));
    }
}
