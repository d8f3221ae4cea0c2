//! Backend resolution: from a registry binding to a usable backend.
//!
//! The resolver walks the toolchain's candidates for a binding in preference
//! order and returns the first whose requirement is available. It never
//! degrades to something the toolchain did not list; when nothing is usable
//! it returns [`Unavailable`] naming every candidate and why it was
//! rejected.
//!
//! Capability checks go through the injected [`CapabilityCache`], so each
//! requirement is probed at most once per process.

use crate::backend::{toolchain_for, Backend, ToolPaths, Toolchain};
use crate::capability::{Availability, CapabilityCache, Requirement};
use crate::format::Format;
use crate::platform::Platform;
use crate::registry::Binding;
use std::fmt::Write as _;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// A candidate that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub backend: String,
    pub requirement: Requirement,
    pub reason: Availability,
}

/// No candidate backend for a binding is usable here.
#[derive(Debug, Clone, Error)]
#[error("no converter available for {source_format} → {target} on {platform}")]
pub struct Unavailable {
    pub source_format: Format,
    pub target: Format,
    pub platform: Platform,
    pub rejections: Vec<Rejection>,
}

impl Unavailable {
    /// One line per probed candidate.
    pub fn diagnostic(&self) -> String {
        if self.rejections.is_empty() {
            return format!("  - no backend handles this conversion on {}", self.platform);
        }
        let mut out = String::new();
        for (i, r) in self.rejections.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = write!(out, "  - {} (needs {}): {}", r.backend, r.requirement, r.reason);
        }
        out
    }
}

pub struct Resolver {
    toolchain: Arc<dyn Toolchain>,
    capabilities: Arc<CapabilityCache>,
}

impl Resolver {
    /// Resolver for `platform`'s toolchain.
    pub fn new(platform: Platform, tools: ToolPaths, capabilities: Arc<CapabilityCache>) -> Self {
        Self::with_toolchain(toolchain_for(platform, tools), capabilities)
    }

    pub fn with_toolchain(toolchain: Arc<dyn Toolchain>, capabilities: Arc<CapabilityCache>) -> Self {
        Self {
            toolchain,
            capabilities,
        }
    }

    pub fn platform(&self) -> Platform {
        self.toolchain.platform()
    }

    pub fn capabilities(&self) -> &CapabilityCache {
        &self.capabilities
    }

    /// The first usable candidate for `binding`.
    pub fn resolve_backend(&self, binding: &Binding) -> Result<Arc<dyn Backend>, Unavailable> {
        let mut rejections = Vec::new();

        for backend in self.toolchain.candidates(binding) {
            let requirement = backend.requirement();
            match self.capabilities.availability(&requirement) {
                Availability::Available => {
                    info!(
                        "{} → {} via {}",
                        binding.source,
                        binding.target,
                        backend.name()
                    );
                    return Ok(backend);
                }
                reason => {
                    debug!("Rejected {} for {}: {}", backend.name(), binding.route, reason);
                    rejections.push(Rejection {
                        backend: backend.name().to_string(),
                        requirement,
                        reason,
                    });
                }
            }
        }

        Err(Unavailable {
            source_format: binding.source.clone(),
            target: binding.target.clone(),
            platform: self.platform(),
            rejections,
        })
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("platform", &self.platform())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}
