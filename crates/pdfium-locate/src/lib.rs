//! # pdfium-locate
//!
//! Find an already-installed [PDFium](https://pdfium.googlesource.com/pdfium/)
//! shared library and bind `pdfium-render` to it.
//!
//! Nothing is downloaded. The library is looked up, in order, at:
//!
//! 1. `PDFIUM_LIB_PATH` — an explicit path to the library file.
//! 2. The per-user cache directory (see [`pdfium_cache_dir`]).
//! 3. The directory containing the running executable.
//! 4. The system loader search path (`LD_LIBRARY_PATH`, `PATH`, …).
//!
//! The first hit is remembered for the rest of the process.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pdfium_locate::{bind_pdfium, locate_pdfium_library};
//!
//! match locate_pdfium_library() {
//!     Ok(lib) => println!("pdfium found: {lib}"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! let pdfium = bind_pdfium().expect("PDFium unavailable");
//! ```
//!
//! ## Platform support
//!
//! | OS      | Library               |
//! |---------|-----------------------|
//! | macOS   | `libpdfium.dylib`     |
//! | Linux   | `libpdfium.so`        |
//! | Windows | `pdfium.dll`          |
//!
//! ## Environment variables
//!
//! - `PDFIUM_LIB_PATH` — path to an existing pdfium library.
//! - `PDFIUM_CACHE_DIR` — override the default cache directory.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use pdfium_render::prelude::Pdfium;
use thiserror::Error;

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned while locating or binding PDFium.
#[derive(Error, Debug)]
pub enum LocateError {
    /// The current OS has no known pdfium library name.
    #[error("Unsupported platform: {os}")]
    UnsupportedPlatform { os: String },

    /// No candidate location held a loadable library.
    #[error("PDFium library not found (tried: {})", format_tried(.tried))]
    NotFound { tried: Vec<String> },

    /// `pdfium-render` could not load the library.
    #[error("Failed to bind PDFium from '{location}': {reason}")]
    Bind { location: String, reason: String },
}

fn format_tried(tried: &[String]) -> String {
    if tried.is_empty() {
        "nothing".to_string()
    } else {
        tried.join(", ")
    }
}

// ── Library location ─────────────────────────────────────────────────────────

/// Where a usable pdfium library was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfiumLibrary {
    /// A library file at an explicit path.
    File(PathBuf),
    /// Resolved by the operating system loader.
    System,
}

impl fmt::Display for PdfiumLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfiumLibrary::File(p) => write!(f, "{}", p.display()),
            PdfiumLibrary::System => f.write_str("system library path"),
        }
    }
}

/// File name of the pdfium shared library on the current OS.
pub fn library_file_name() -> Result<&'static str, LocateError> {
    match std::env::consts::OS {
        "macos" => Ok("libpdfium.dylib"),
        "linux" | "freebsd" | "openbsd" | "netbsd" => Ok("libpdfium.so"),
        "windows" => Ok("pdfium.dll"),
        os => Err(LocateError::UnsupportedPlatform { os: os.to_string() }),
    }
}

/// Returns the per-user directory searched for a cached pdfium library.
///
/// Default locations:
/// - **macOS**: `~/Library/Caches/liteswitch/pdfium/`
/// - **Linux**: `~/.cache/liteswitch/pdfium/`
/// - **Windows**: `%LOCALAPPDATA%\liteswitch\pdfium\`
///
/// Override by setting `PDFIUM_CACHE_DIR`.
pub fn pdfium_cache_dir() -> PathBuf {
    if let Ok(override_dir) = std::env::var("PDFIUM_CACHE_DIR") {
        return PathBuf::from(override_dir);
    }

    let base = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir);

    base.join("liteswitch").join("pdfium")
}

/// Candidate library files in search order (the system loader is tried last
/// and is not listed here).
pub fn candidate_paths() -> Result<Vec<PathBuf>, LocateError> {
    let lib_name = library_file_name()?;
    let mut candidates = Vec::new();

    if let Ok(p) = std::env::var("PDFIUM_LIB_PATH") {
        candidates.push(PathBuf::from(p));
    }
    candidates.push(pdfium_cache_dir().join(lib_name));
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join(lib_name));
    }

    Ok(candidates)
}

// ── Thread-safe singleton cache ──────────────────────────────────────────────

static RESOLVED: OnceLock<PdfiumLibrary> = OnceLock::new();

// ── Public API ───────────────────────────────────────────────────────────────

/// Locates a loadable pdfium library.
///
/// A successful lookup is cached for the lifetime of the process; failures
/// are not, so a caller may retry after installing the library.
pub fn locate_pdfium_library() -> Result<PdfiumLibrary, LocateError> {
    if let Some(found) = RESOLVED.get() {
        return Ok(found.clone());
    }

    let found = search()?;
    let _ = RESOLVED.set(found.clone());
    Ok(found)
}

/// Binds to PDFium wherever [`locate_pdfium_library`] finds it.
pub fn bind_pdfium() -> Result<Pdfium, LocateError> {
    match locate_pdfium_library()? {
        PdfiumLibrary::File(path) => bind_pdfium_from_path(&path),
        PdfiumLibrary::System => Pdfium::bind_to_system_library()
            .map(Pdfium::new)
            .map_err(|e| LocateError::Bind {
                location: PdfiumLibrary::System.to_string(),
                reason: e.to_string(),
            }),
    }
}

/// Binds to a PDFium library at an explicit `path`.
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, LocateError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| LocateError::Bind {
            location: path.display().to_string(),
            reason: e.to_string(),
        })
}

// ── Internal helpers ─────────────────────────────────────────────────────────

fn search() -> Result<PdfiumLibrary, LocateError> {
    let mut tried = Vec::new();

    for path in candidate_paths()? {
        if path.is_file() {
            return Ok(PdfiumLibrary::File(path));
        }
        tried.push(path.display().to_string());
    }

    // Loading is the only reliable check for the system search path.
    match Pdfium::bind_to_system_library() {
        Ok(_) => Ok(PdfiumLibrary::System),
        Err(e) => {
            tried.push(format!("{} ({e})", PdfiumLibrary::System));
            Err(LocateError::NotFound { tried })
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
