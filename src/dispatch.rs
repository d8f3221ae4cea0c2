//! The dispatcher: one input file, one target format, one outcome.
//!
//! ```text
//!  input path ──► source format ──► registry binding ──► input exists?
//!                      │                   │                  │
//!           UnknownSourceFormat   UnsupportedSource /   PathNotFound
//!                                 UnsupportedTarget
//!
//!  ──► resolve backend ──► backend.convert ──► output exists? ──► Success
//!            │                    │                  │
//!    BackendUnavailable      BackendError       OutputMissing
//! ```
//!
//! Artifacts left at the planned paths by an earlier run are removed before
//! the backend starts, and only the planned primary path counts as output.
//! Failed conversions are never retried; a backend may already have left a
//! partial file behind. Every failure is logged with its full diagnostic and
//! returned inside [`ConversionOutcome::Failure`].

use crate::backend::ToolPaths;
use crate::capability::CapabilityCache;
use crate::config::ConverterConfig;
use crate::error::{ConvertError, RegistryError};
use crate::format::Format;
use crate::output::{ConversionOutcome, OutputNaming};
use crate::registry::Registry;
use crate::resolver::Resolver;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    resolver: Resolver,
    naming: OutputNaming,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, resolver: Resolver, naming: OutputNaming) -> Self {
        Self {
            registry,
            resolver,
            naming,
        }
    }

    /// Standard registry, the configured (or host) platform's toolchain and
    /// real capability probing.
    pub fn from_config(config: &ConverterConfig) -> Self {
        let platform = config.effective_platform();
        let capabilities = Arc::new(CapabilityCache::system(config.powershell_program.clone()));
        let resolver = Resolver::new(platform, ToolPaths::from_config(config), capabilities);
        debug!("Dispatcher for {} with {:?}", platform, config);
        Self::new(
            Arc::new(Registry::standard().clone()),
            resolver,
            OutputNaming::new(config.output_suffix.clone()),
        )
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn naming(&self) -> &OutputNaming {
        &self.naming
    }

    /// Convert `input` to `target`.
    pub fn convert(&self, input: &Path, target: &Format) -> ConversionOutcome {
        match self.try_convert(input, target) {
            Ok(output) => {
                info!("{} → {}", input.display(), output.display());
                ConversionOutcome::Success {
                    input: input.to_path_buf(),
                    output,
                }
            }
            Err(error) => {
                warn!("{}: {}", input.display(), error);
                ConversionOutcome::Failure {
                    input: input.to_path_buf(),
                    error,
                }
            }
        }
    }

    fn try_convert(&self, input: &Path, target: &Format) -> Result<PathBuf, ConvertError> {
        let source = Format::from_path(input).ok_or_else(|| ConvertError::UnknownSourceFormat {
            path: input.to_path_buf(),
        })?;

        let binding = match self.registry.resolve(&source, target) {
            Ok(binding) => binding,
            Err(RegistryError::NoEdge { available, .. }) => {
                return Err(ConvertError::UnsupportedTarget {
                    source_format: source,
                    target: target.clone(),
                    available,
                })
            }
            Err(_) => {
                return Err(ConvertError::UnsupportedSource {
                    source_format: source,
                })
            }
        };

        let input = absolute(input);
        if !input.is_file() {
            return Err(ConvertError::PathNotFound { path: input });
        }

        let backend = self.resolver.resolve_backend(binding).map_err(|unavailable| {
            ConvertError::BackendUnavailable {
                source_format: source.clone(),
                target: target.clone(),
                diagnostic: unavailable.diagnostic(),
            }
        })?;

        let plan = self.naming.plan(&input, target, binding.cardinality());
        let primary = plan.primary();
        debug!("{} via {} → {:?}", input.display(), backend.name(), plan);

        // A previous run's artifacts must not stand in for this one.
        let previous: Vec<PathBuf> = if plan.is_paged() {
            (1..).map(|n| plan.page(n)).take_while(|p| p.exists()).collect()
        } else {
            vec![primary.clone()]
        };
        for path in &previous {
            remove_stale(path).map_err(|e| ConvertError::BackendError {
                backend: backend.name().to_string(),
                message: format!("cannot replace '{}': {}", path.display(), e),
            })?;
        }

        let output = backend
            .convert(&input, &plan)
            .map_err(|e| ConvertError::BackendError {
                backend: backend.name().to_string(),
                message: e.to_string(),
            })?;

        if output != primary {
            warn!(
                "{} returned '{}' instead of the planned '{}'",
                backend.name(),
                output.display(),
                primary.display()
            );
        }
        if output != primary || !primary.is_file() {
            return Err(ConvertError::OutputMissing {
                backend: backend.name().to_string(),
                path: primary,
            });
        }
        Ok(primary)
    }
}

fn remove_stale(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed previous output {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

pub(crate) fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
