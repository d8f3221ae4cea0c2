//! Batch controller behaviour: skips, missing files, prompting, progress
//! events and the summary shown to users.

mod common;

use common::{controller, fmt, touch, Behaviour, EventLog, RecordingBackend};
use liteswitch::{BatchError, ErrorKind, FileOutcome, Preselected};
use std::sync::Arc;

#[test]
fn mismatched_file_in_the_middle_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        touch(dir.path(), "a.docx"),
        touch(dir.path(), "b.txt"),
        touch(dir.path(), "c.pptx"),
    ];
    let backend = RecordingBackend::new(Behaviour::Write);

    let batch = controller(backend.clone())
        .convert_batch(&inputs, Some(&fmt("pdf")), &Preselected::cancel())
        .unwrap();

    assert_eq!(batch.len(), 3);
    assert!(batch.outcomes[0].is_success());
    assert!(batch.outcomes[2].is_success());
    match &batch.outcomes[1] {
        FileOutcome::Skipped {
            input,
            source_format,
            target,
        } => {
            assert_eq!(input, &inputs[1]);
            assert_eq!(source_format.as_ref(), Some(&fmt("txt")));
            assert_eq!(target, &fmt("pdf"));
        }
        other => panic!("expected a skip, got {other:?}"),
    }
    assert_eq!(batch.outcomes[1].kind(), Some(ErrorKind::FormatMismatch));
    assert_eq!(backend.inputs(), vec![inputs[0].clone(), inputs[2].clone()]);
    assert!(dir.path().join("a_LiteSwitch.pdf").is_file());
    assert!(dir.path().join("c_LiteSwitch.pdf").is_file());
    assert!(!dir.path().join("b_LiteSwitch.pdf").exists());
}

#[test]
fn missing_file_is_a_failure_not_a_skip() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.pdf");
    let backend = RecordingBackend::new(Behaviour::Write);

    let batch = controller(backend.clone())
        .convert_batch(&[missing.clone()], Some(&fmt("docx")), &Preselected::cancel())
        .unwrap();

    assert_eq!(batch.succeeded(), 0);
    assert_eq!(batch.failed(), 1);
    assert_eq!(batch.skipped(), 0);
    assert!(!batch.is_success());
    assert_eq!(batch.outcomes[0].kind(), Some(ErrorKind::PathNotFound));
    assert_eq!(batch.failed_inputs(), vec![missing.as_path()]);
    assert_eq!(backend.calls(), 0);
}

#[test]
fn extensionless_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![touch(dir.path(), "README"), touch(dir.path(), "x.docx")];
    let backend = RecordingBackend::new(Behaviour::Write);

    let batch = controller(backend)
        .convert_batch(&inputs, Some(&fmt("pdf")), &Preselected::cancel())
        .unwrap();

    assert!(batch.outcomes[0].is_skipped());
    assert!(batch.outcomes[1].is_success());
}

#[test]
fn cancelled_prompt_converts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![touch(dir.path(), "deck.pptx")];
    let backend = RecordingBackend::new(Behaviour::Write);

    let batch = controller(backend.clone())
        .convert_batch(&inputs, None, &Preselected::cancel())
        .unwrap();

    assert!(batch.cancelled);
    assert!(batch.is_empty());
    assert_eq!(batch.target, None);
    assert_eq!(backend.calls(), 0);
    assert_eq!(
        batch.summary(None),
        "Conversion cancelled; nothing was converted."
    );
}

#[test]
fn prompt_choice_becomes_the_target() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![touch(dir.path(), "slides.pdf")];
    let backend = RecordingBackend::new(Behaviour::Write);

    let batch = controller(backend)
        .convert_batch(&inputs, None, &Preselected::choose(fmt("png")))
        .unwrap();

    assert_eq!(batch.target, Some(fmt("png")));
    match &batch.outcomes[0] {
        FileOutcome::Success { input, output } => {
            assert_eq!(input, &inputs[0]);
            assert_eq!(output, &dir.path().join("slides_LiteSwitch_1.png"));
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[test]
fn prompt_answer_outside_the_candidates_cancels() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![touch(dir.path(), "budget.xlsx")];
    let backend = RecordingBackend::new(Behaviour::Write);

    let batch = controller(backend.clone())
        .convert_batch(&inputs, None, &Preselected::choose(fmt("docx")))
        .unwrap();

    assert!(batch.cancelled);
    assert_eq!(backend.calls(), 0);
}

#[test]
fn driver_is_first_existing_known_file() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        dir.path().join("gone.docx"),
        touch(dir.path(), "song.mp3"),
        touch(dir.path(), "photo.png"),
    ];
    let backend = RecordingBackend::new(Behaviour::Write);

    // png only reaches pdf, so choosing pdf is valid for the driver.
    let batch = controller(backend)
        .convert_batch(&inputs, None, &Preselected::choose(fmt("pdf")))
        .unwrap();

    assert_eq!(batch.target, Some(fmt("pdf")));
    assert_eq!(batch.outcomes[0].kind(), Some(ErrorKind::PathNotFound));
    assert!(batch.outcomes[1].is_skipped());
    assert!(batch.outcomes[2].is_success());
}

#[test]
fn no_usable_input_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![touch(dir.path(), "song.mp3")];
    let backend = RecordingBackend::new(Behaviour::Write);

    let err = controller(backend)
        .convert_batch(&inputs, None, &Preselected::choose(fmt("pdf")))
        .unwrap_err();
    assert!(matches!(err, BatchError::NoUsableInput { inputs: 1 }));
}

#[test]
fn counts_always_add_up() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        touch(dir.path(), "one.docx"),
        dir.path().join("two.docx"),
        touch(dir.path(), "three.mp3"),
        touch(dir.path(), "four.odt"),
        touch(dir.path(), "five.md"),
    ];
    let backend = RecordingBackend::new(Behaviour::Write);

    let batch = controller(backend)
        .convert_batch(&inputs, Some(&fmt("pdf")), &Preselected::cancel())
        .unwrap();

    assert_eq!(batch.len(), inputs.len());
    assert_eq!(batch.succeeded() + batch.failed() + batch.skipped(), batch.len());
    assert_eq!((batch.succeeded(), batch.failed(), batch.skipped()), (2, 1, 2));
    for (outcome, input) in batch.outcomes.iter().zip(&inputs) {
        assert_eq!(outcome.input(), input.as_path());
    }
}

#[test]
fn backend_failure_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![touch(dir.path(), "a.pdf"), touch(dir.path(), "b.pdf")];
    let backend = RecordingBackend::new(Behaviour::Fail);

    let batch = controller(backend.clone())
        .convert_batch(&inputs, Some(&fmt("txt")), &Preselected::cancel())
        .unwrap();

    assert_eq!(backend.calls(), 2);
    assert_eq!(batch.failed(), 2);
    let summary = batch.summary(Some(std::path::Path::new("/var/log/liteswitch.log")));
    assert!(summary.starts_with("Converted 0 of 2 file(s)"), "{summary}");
    assert!(summary.contains("failed:  a.pdf: recorder failed"), "{summary}");
    assert!(!summary.contains("renderer crashed"), "{summary}");
    assert!(summary.ends_with("Details: /var/log/liteswitch.log"), "{summary}");
}

#[test]
fn progress_events_follow_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![touch(dir.path(), "a.docx"), touch(dir.path(), "b.txt")];
    let backend = RecordingBackend::new(Behaviour::Write);
    let log = Arc::new(EventLog::default());

    controller(backend)
        .with_progress(log.clone())
        .convert_batch(&inputs, Some(&fmt("pdf")), &Preselected::cancel())
        .unwrap();

    assert_eq!(
        log.events(),
        vec![
            "start 2 pdf",
            "file 1/2 a.docx",
            "done 1 true",
            "file 2/2 b.txt",
            "done 2 false",
            "end 1 0 1",
        ]
    );
}

#[test]
fn report_serialises_statuses() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![touch(dir.path(), "a.docx"), touch(dir.path(), "b.txt")];
    let backend = RecordingBackend::new(Behaviour::Write);

    let batch = controller(backend)
        .convert_batch(&inputs, Some(&fmt("pdf")), &Preselected::cancel())
        .unwrap();

    let json = serde_json::to_value(batch.report()).unwrap();
    assert_eq!(json["succeeded"], 1);
    assert_eq!(json["skipped"], 1);
    assert_eq!(json["files"][0]["status"], "success");
    assert_eq!(json["files"][1]["status"], "skipped");
    assert!(json["files"][0].get("kind").is_none());
}

#[test]
fn inputs_sharing_an_output_name_do_not_overwrite_each_other() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![touch(dir.path(), "scan.png"), touch(dir.path(), "scan.jpg")];
    let backend = RecordingBackend::new(Behaviour::Write);

    let batch = controller(backend.clone())
        .convert_batch(&inputs, Some(&fmt("pdf")), &Preselected::cancel())
        .unwrap();

    assert_eq!((batch.succeeded(), batch.failed(), batch.skipped()), (1, 1, 0));
    assert_eq!(backend.inputs(), vec![inputs[0].clone()]);
    assert_eq!(batch.outcomes[1].kind(), Some(ErrorKind::OutputConflict));
    let written = std::fs::read_to_string(dir.path().join("scan_LiteSwitch.pdf")).unwrap();
    assert!(written.ends_with("scan.png"), "{written}");
}
