//! Host platform detection.
//!
//! The platform decides which [`crate::backend::Toolchain`] the resolver
//! builds. It is detected once at startup (or forced through configuration)
//! and never consulted inside a backend.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    #[cfg_attr(feature = "cli", value(name = "macos"))]
    MacOs,
}

impl Platform {
    /// The platform this binary was compiled for. Other Unix-likes map to
    /// [`Platform::Linux`] since they share the same external tools.
    pub fn current() -> Platform {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
