//! Capability probing: is an external program, automation server or the
//! in-process renderer usable on this machine?
//!
//! Probing can be slow (spawning `soffice --version` takes a second or more),
//! so results go through a [`CapabilityCache`] that checks each
//! [`Requirement`] at most once per process. A capability that was absent at
//! first probe stays absent; nothing is re-probed.
//!
//! The cache is handed to the [`crate::resolver::Resolver`] at construction,
//! which is how tests substitute a fake [`CapabilityProbe`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use tracing::debug;

// ── Requirement ──────────────────────────────────────────────────────────────

/// A `major.minor` program version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

static RE_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\.(\d+)").unwrap());

impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// First `N.N` found in `text`, e.g. the output of `pandoc --version`.
    pub fn parse(text: &str) -> Option<Version> {
        let caps = RE_VERSION.captures(text)?;
        Some(Version {
            major: caps[1].parse().ok()?,
            minor: caps[2].parse().ok()?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// What a backend needs from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Requirement {
    /// An executable on `PATH` (or an explicit path), optionally at least
    /// `min_version`.
    Program {
        name: String,
        min_version: Option<Version>,
    },
    /// A registered COM automation server, driven through `host`.
    Automation { host: String, prog_id: String },
    /// The PDFium shared library.
    Renderer,
}

impl Requirement {
    pub fn program(name: impl Into<String>) -> Self {
        Requirement::Program {
            name: name.into(),
            min_version: None,
        }
    }

    pub fn program_at_least(name: impl Into<String>, min: Version) -> Self {
        Requirement::Program {
            name: name.into(),
            min_version: Some(min),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Program {
                name,
                min_version: None,
            } => write!(f, "program '{name}'"),
            Requirement::Program {
                name,
                min_version: Some(v),
            } => write!(f, "program '{name}' >= {v}"),
            Requirement::Automation { prog_id, .. } => write!(f, "automation server '{prog_id}'"),
            Requirement::Renderer => f.write_str("PDFium library"),
        }
    }
}

/// Result of checking one [`Requirement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    NotFound(String),
    VersionMismatch { found: Version, required: Version },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Available => f.write_str("available"),
            Availability::NotFound(detail) => write!(f, "not found ({detail})"),
            Availability::VersionMismatch { found, required } => {
                write!(f, "version mismatch (found {found}, need >= {required})")
            }
        }
    }
}

// ── Probe ────────────────────────────────────────────────────────────────────

/// Raw environment checks. Implementations need not cache anything.
pub trait CapabilityProbe: Send + Sync {
    /// Whether `name` resolves to an executable.
    fn program_available(&self, name: &str) -> bool;

    /// Version reported by `name --version`, if it can be parsed.
    fn program_version(&self, name: &str) -> Option<Version> {
        let _ = name;
        None
    }

    /// Whether a COM server with this ProgID is registered.
    fn automation_available(&self, prog_id: &str) -> bool {
        let _ = prog_id;
        false
    }

    /// Whether the PDFium library can be located.
    fn renderer_available(&self) -> bool {
        false
    }
}

/// Evaluate `requirement` against `probe` without caching.
pub fn check(probe: &dyn CapabilityProbe, requirement: &Requirement) -> Availability {
    match requirement {
        Requirement::Program { name, min_version } => {
            if !probe.program_available(name) {
                return Availability::NotFound(format!("'{name}' is not on PATH"));
            }
            let Some(required) = *min_version else {
                return Availability::Available;
            };
            match probe.program_version(name) {
                Some(found) if found >= required => Availability::Available,
                Some(found) => Availability::VersionMismatch { found, required },
                None => Availability::NotFound(format!("could not read the version of '{name}'")),
            }
        }
        Requirement::Automation { prog_id, .. } => {
            if probe.automation_available(prog_id) {
                Availability::Available
            } else {
                Availability::NotFound(format!("'{prog_id}' is not registered"))
            }
        }
        Requirement::Renderer => {
            if probe.renderer_available() {
                Availability::Available
            } else {
                Availability::NotFound("no loadable pdfium library".to_string())
            }
        }
    }
}

/// Probes the real machine.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    powershell: String,
}

impl SystemProbe {
    pub fn new(powershell: impl Into<String>) -> Self {
        Self {
            powershell: powershell.into(),
        }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new("powershell")
    }
}

impl CapabilityProbe for SystemProbe {
    fn program_available(&self, name: &str) -> bool {
        match which::which(name) {
            Ok(path) => {
                debug!("Found {} at {}", name, path.display());
                true
            }
            Err(e) => {
                debug!("{} not found: {}", name, e);
                false
            }
        }
    }

    fn program_version(&self, name: &str) -> Option<Version> {
        let output = Command::new(name)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .ok()?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let version = Version::parse(&stdout);
        debug!("{} --version → {:?}", name, version);
        version
    }

    fn automation_available(&self, prog_id: &str) -> bool {
        if !cfg!(target_os = "windows") {
            return false;
        }
        let script = format!(
            "if ([type]::GetTypeFromProgID('{}')) {{ exit 0 }} else {{ exit 1 }}",
            prog_id.replace('\'', "''")
        );
        let status = Command::new(&self.powershell)
            .args(["-NoProfile", "-NonInteractive", "-Command", &script])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        matches!(status, Ok(s) if s.success())
    }

    fn renderer_available(&self) -> bool {
        match pdfium_locate::locate_pdfium_library() {
            Ok(lib) => {
                debug!("PDFium found: {}", lib);
                true
            }
            Err(e) => {
                debug!("PDFium unavailable: {}", e);
                false
            }
        }
    }
}

// ── Cache ────────────────────────────────────────────────────────────────────

/// Compute-once memo of [`Availability`] per [`Requirement`].
///
/// The lock is held across the probe, so two callers asking for the same
/// requirement never probe twice and both observe the first result.
pub struct CapabilityCache {
    probe: Arc<dyn CapabilityProbe>,
    memo: Mutex<HashMap<Requirement, Availability>>,
}

impl CapabilityCache {
    pub fn new(probe: Arc<dyn CapabilityProbe>) -> Self {
        Self {
            probe,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Cache backed by [`SystemProbe`].
    pub fn system(powershell: impl Into<String>) -> Self {
        Self::new(Arc::new(SystemProbe::new(powershell)))
    }

    pub fn availability(&self, requirement: &Requirement) -> Availability {
        let mut memo = self.memo.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(known) = memo.get(requirement) {
            return known.clone();
        }
        let result = check(self.probe.as_ref(), requirement);
        debug!("Probed {}: {}", requirement, result);
        memo.insert(requirement.clone(), result.clone());
        result
    }

    /// Number of requirements probed so far.
    pub fn probed(&self) -> usize {
        self.memo.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl fmt::Debug for CapabilityCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityCache")
            .field("probe", &"<dyn CapabilityProbe>")
            .field("probed", &self.probed())
            .finish()
    }
}
