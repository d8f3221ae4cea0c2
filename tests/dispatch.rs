//! Dispatcher behaviour against a recording backend.
//!
//! No external program is run: the toolchain offers one fake backend that
//! writes the planned files, and the capability probe decides whether that
//! backend counts as installed.

mod common;

use common::{dispatcher, fmt, touch, Behaviour, InstalledPrograms, RecordingBackend};
use liteswitch::{
    CapabilityCache, ConversionOutcome, Dispatcher, ErrorKind, OutputNaming, Platform, Registry,
    Resolver, ToolPaths,
};
use std::sync::Arc;

#[test]
fn extension_case_does_not_matter() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "REPORT.DOCX");
    let backend = RecordingBackend::new(Behaviour::Write);

    let outcome = dispatcher(backend.clone(), InstalledPrograms::all()).convert(&input, &fmt("pdf"));

    assert!(outcome.is_success(), "{:?}", outcome.error());
    assert_eq!(outcome.output(), Some(dir.path().join("REPORT_LiteSwitch.pdf").as_path()));
    assert_eq!(backend.calls(), 1);
}

#[test]
fn pdf_to_docx_lands_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "notes.pdf");
    let backend = RecordingBackend::new(Behaviour::Write);

    let outcome = dispatcher(backend.clone(), InstalledPrograms::all()).convert(&input, &fmt("docx"));

    match outcome {
        ConversionOutcome::Success { input: i, output } => {
            assert_eq!(i, input);
            assert_eq!(output, dir.path().join("notes_LiteSwitch.docx"));
            assert!(output.is_file());
        }
        ConversionOutcome::Failure { error, .. } => panic!("unexpected failure: {error}"),
    }
    assert_eq!(backend.inputs(), vec![input]);
}

#[test]
fn converting_twice_overwrites_the_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "letter.odt");
    let backend = RecordingBackend::new(Behaviour::Write);
    let d = dispatcher(backend.clone(), InstalledPrograms::all());

    let first = d.convert(&input, &fmt("pdf"));
    let second = d.convert(&input, &fmt("pdf"));

    assert_eq!(first.output(), second.output());
    assert_eq!(backend.calls(), 2);
    let outputs: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|n| n.to_string_lossy().contains("_LiteSwitch"))
        .collect();
    assert_eq!(outputs.len(), 1);
}

#[test]
fn paged_output_reports_first_page() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "slides.pdf");
    let backend = RecordingBackend::new(Behaviour::Write);

    let outcome = dispatcher(backend, InstalledPrograms::all()).convert(&input, &fmt("png"));

    assert_eq!(outcome.output(), Some(dir.path().join("slides_LiteSwitch_1.png").as_path()));
    assert!(dir.path().join("slides_LiteSwitch_2.png").is_file());
}

#[test]
fn unavailable_backend_is_never_invoked() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "deck.pptx");
    let backend = RecordingBackend::new(Behaviour::Write);

    let outcome = dispatcher(backend.clone(), InstalledPrograms::none()).convert(&input, &fmt("pdf"));

    let error = outcome.error().expect("must fail");
    assert_eq!(error.kind(), ErrorKind::BackendUnavailable);
    assert!(error.to_string().contains("fake-tool"), "{error}");
    assert_eq!(backend.calls(), 0);
    assert!(!dir.path().join("deck_LiteSwitch.pdf").exists());
}

#[test]
fn backend_message_is_passed_through() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "scan.pdf");
    let backend = RecordingBackend::new(Behaviour::Fail);

    let outcome = dispatcher(backend.clone(), InstalledPrograms::all()).convert(&input, &fmt("txt"));

    let error = outcome.error().expect("must fail");
    assert_eq!(error.kind(), ErrorKind::BackendError);
    assert!(error.to_string().contains("renderer crashed on page 3"));
    assert_eq!(backend.calls(), 1);
}

#[test]
fn format_errors_come_before_path_checks() {
    let dir = tempfile::tempdir().unwrap();
    let backend = RecordingBackend::new(Behaviour::Write);
    let d = dispatcher(backend.clone(), InstalledPrograms::all());

    let unknown = d.convert(&dir.path().join("song.mp3"), &fmt("pdf"));
    let no_edge = d.convert(&dir.path().join("photo.png"), &fmt("docx"));
    let missing = d.convert(&dir.path().join("missing.pdf"), &fmt("docx"));

    assert_eq!(unknown.error().map(|e| e.kind()), Some(ErrorKind::UnsupportedSource));
    assert_eq!(no_edge.error().map(|e| e.kind()), Some(ErrorKind::UnsupportedTarget));
    assert_eq!(missing.error().map(|e| e.kind()), Some(ErrorKind::PathNotFound));
    assert_eq!(backend.calls(), 0);
}

#[test]
fn unsupported_target_lists_alternatives() {
    let backend = RecordingBackend::new(Behaviour::Write);
    let outcome = dispatcher(backend, InstalledPrograms::all())
        .convert(std::path::Path::new("budget.xlsx"), &fmt("docx"));

    let message = outcome.error().expect("must fail").to_string();
    assert!(message.contains("available: pdf"), "{message}");
}

#[test]
fn custom_suffix_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "memo.docx");
    let backend = RecordingBackend::new(Behaviour::Write);
    let cache = Arc::new(CapabilityCache::new(Arc::new(InstalledPrograms::all())));
    let d = Dispatcher::new(
        Arc::new(Registry::standard().clone()),
        Resolver::with_toolchain(Arc::new(common::RecordingToolchain(backend)), cache),
        OutputNaming::new("converted"),
    );

    let outcome = d.convert(&input, &fmt("pdf"));
    assert_eq!(outcome.output(), Some(dir.path().join("memo_converted.pdf").as_path()));
}

#[test]
fn real_toolchain_without_tools_explains_every_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "report.docx");
    let cache = Arc::new(CapabilityCache::new(Arc::new(InstalledPrograms::none())));
    let d = Dispatcher::new(
        Arc::new(Registry::standard().clone()),
        Resolver::new(Platform::Linux, ToolPaths::default(), cache),
        OutputNaming::default(),
    );

    let outcome = d.convert(&input, &fmt("odt"));
    let message = outcome.error().expect("must fail").to_string();
    assert!(message.contains("pandoc"), "{message}");
    assert!(message.contains("soffice"), "{message}");
}

#[test]
fn pages_from_a_longer_previous_run_are_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "slides.pdf");
    for n in 1..=3 {
        touch(dir.path(), &format!("slides_LiteSwitch_{n}.png"));
    }
    let backend = RecordingBackend::new(Behaviour::Write);

    let outcome = dispatcher(backend, InstalledPrograms::all()).convert(&input, &fmt("png"));

    assert!(outcome.is_success(), "{:?}", outcome.error());
    assert!(dir.path().join("slides_LiteSwitch_2.png").is_file());
    assert!(!dir.path().join("slides_LiteSwitch_3.png").exists());
}

#[test]
fn failed_rerun_leaves_no_stale_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "report.docx");
    let stale = touch(dir.path(), "report_LiteSwitch.pdf");
    let backend = RecordingBackend::new(Behaviour::Fail);

    let outcome = dispatcher(backend, InstalledPrograms::all()).convert(&input, &fmt("pdf"));

    assert_eq!(outcome.error().map(|e| e.kind()), Some(ErrorKind::BackendError));
    assert!(!stale.exists());
}
