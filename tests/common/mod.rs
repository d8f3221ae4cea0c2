//! Shared fakes for the integration tests: a capability probe with a fixed
//! set of installed programs and a toolchain whose single backend writes the
//! planned files itself.

#![allow(dead_code)]

use liteswitch::{
    Backend, BackendFailure, BatchController, BatchProgressCallback, Binding, CapabilityCache,
    CapabilityProbe, Dispatcher, Format, OutputNaming, OutputPlan, Platform, Registry,
    Requirement, Resolver, Toolchain,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const FAKE_TOOL: &str = "fake-tool";

/// Probe answering from a fixed set of program names.
pub struct InstalledPrograms(pub HashSet<&'static str>);

impl InstalledPrograms {
    pub fn all() -> Self {
        Self([FAKE_TOOL].into_iter().collect())
    }

    pub fn none() -> Self {
        Self(HashSet::new())
    }
}

impl CapabilityProbe for InstalledPrograms {
    fn program_available(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    /// Write every planned artifact (two pages for paged plans).
    Write,
    /// Return an error without touching the disk.
    Fail,
}

/// Backend that records calls and writes placeholder outputs.
pub struct RecordingBackend {
    behaviour: Behaviour,
    calls: AtomicUsize,
    inputs: Mutex<Vec<PathBuf>>,
}

impl RecordingBackend {
    pub fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<PathBuf> {
        self.inputs.lock().unwrap().clone()
    }
}

impl Backend for RecordingBackend {
    fn name(&self) -> &str {
        "recorder"
    }

    fn requirement(&self) -> Requirement {
        Requirement::program(FAKE_TOOL)
    }

    fn convert(&self, input: &Path, plan: &OutputPlan) -> Result<PathBuf, BackendFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().unwrap().push(input.to_path_buf());
        match self.behaviour {
            Behaviour::Fail => Err(BackendFailure::Render("renderer crashed on page 3".into())),
            Behaviour::Write => {
                let pages = if plan.is_paged() { 2 } else { 1 };
                for n in 1..=pages {
                    std::fs::write(plan.page(n), format!("converted from {}", input.display()))?;
                }
                Ok(plan.primary())
            }
        }
    }
}

/// Offers the recording backend for every binding.
pub struct RecordingToolchain(pub Arc<RecordingBackend>);

impl Toolchain for RecordingToolchain {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    fn candidates(&self, _binding: &Binding) -> Vec<Arc<dyn Backend>> {
        vec![self.0.clone() as Arc<dyn Backend>]
    }
}

pub fn dispatcher(backend: Arc<RecordingBackend>, probe: InstalledPrograms) -> Dispatcher {
    init_logging();
    let cache = Arc::new(CapabilityCache::new(Arc::new(probe)));
    Dispatcher::new(
        Arc::new(Registry::standard().clone()),
        Resolver::with_toolchain(Arc::new(RecordingToolchain(backend)), cache),
        OutputNaming::default(),
    )
}

pub fn controller(backend: Arc<RecordingBackend>) -> BatchController {
    BatchController::new(dispatcher(backend, InstalledPrograms::all()))
}

/// Route library logs through the test harness; `RUST_LOG=debug` to see them.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn fmt(token: &str) -> Format {
    Format::parse(token).unwrap()
}

/// Create `name` under `dir` with some bytes in it.
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"input").unwrap();
    path
}

/// Progress callback that records every event as a string.
#[derive(Default)]
pub struct EventLog(pub Mutex<Vec<String>>);

impl EventLog {
    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.0.lock().unwrap().push(event);
    }
}

impl BatchProgressCallback for EventLog {
    fn on_batch_start(&self, total_files: usize, target: &Format) {
        self.push(format!("start {total_files} {target}"));
    }

    fn on_file_start(&self, index: usize, total: usize, input: &Path) {
        let name = input.file_name().unwrap().to_string_lossy();
        self.push(format!("file {index}/{total} {name}"));
    }

    fn on_file_complete(&self, index: usize, _total: usize, _input: &Path, succeeded: bool) {
        self.push(format!("done {index} {succeeded}"));
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, skipped: usize) {
        self.push(format!("end {succeeded} {failed} {skipped}"));
    }
}
