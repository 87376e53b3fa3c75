//! End-to-end formatter runs against scripted compiler stand-ins.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use rstest::rstest;
use tempfile::TempDir;

use pain_format::{FORMAT_TEMP_FILE_NAME, FormatError, FormatOutcome, format_document};
use pain_lsp_host::{Document, PAIN_LANGUAGE_ID};

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("script should write");
    let mut permissions = fs::metadata(&path).expect("metadata").permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(&path, permissions).expect("permissions should apply");
    path
}

#[rstest]
fn a_successful_run_replaces_the_document() {
    let dir = TempDir::new().expect("temp dir");
    let compiler = write_script(dir.path(), "pain-compiler", "#!/bin/sh\nprintf formatted\n");
    let document = Document::new(dir.path().join("main.pain"), PAIN_LANGUAGE_ID, "fn main(){}");

    let outcome = format_document(&document, &compiler).expect("formatting should succeed");

    match outcome {
        FormatOutcome::Applied { edit, warning } => {
            assert_eq!(edit.new_text, "formatted");
            assert!(warning.is_none());
        }
        FormatOutcome::NotApplicable => panic!("expected an applied edit"),
    }
    assert!(!dir.path().join(FORMAT_TEMP_FILE_NAME).exists());
}

#[rstest]
fn the_formatter_reads_the_document_text_from_the_temp_file() {
    let dir = TempDir::new().expect("temp dir");
    let compiler = write_script(dir.path(), "pain-compiler", "#!/bin/sh\ncat \"$3\"\n");
    let document = Document::new(
        dir.path().join("main.pain"),
        PAIN_LANGUAGE_ID,
        "fn main() { shout(); }",
    );

    let outcome = format_document(&document, &compiler).expect("formatting should succeed");

    match outcome {
        FormatOutcome::Applied { edit, .. } => {
            assert_eq!(edit.new_text, "fn main() { shout(); }");
        }
        FormatOutcome::NotApplicable => panic!("expected an applied edit"),
    }
}

#[rstest]
fn stderr_on_success_surfaces_as_a_warning() {
    let dir = TempDir::new().expect("temp dir");
    let compiler = write_script(
        dir.path(),
        "pain-compiler",
        "#!/bin/sh\nprintf formatted\necho 'deprecated syntax' >&2\n",
    );
    let document = Document::new(dir.path().join("main.pain"), PAIN_LANGUAGE_ID, "fn main(){}");

    let outcome = format_document(&document, &compiler).expect("formatting should succeed");

    match outcome {
        FormatOutcome::Applied { edit, warning } => {
            assert_eq!(edit.new_text, "formatted");
            let warning = warning.expect("warning should be present");
            assert!(warning.contains("deprecated syntax"));
        }
        FormatOutcome::NotApplicable => panic!("expected an applied edit"),
    }
}

#[rstest]
fn a_failing_run_reports_the_exit_status_and_stderr() {
    let dir = TempDir::new().expect("temp dir");
    let compiler = write_script(
        dir.path(),
        "pain-compiler",
        "#!/bin/sh\necho 'parse error on line 2' >&2\nexit 3\n",
    );
    let document = Document::new(dir.path().join("main.pain"), PAIN_LANGUAGE_ID, "fn main(){}");

    let result = format_document(&document, &compiler);

    match result {
        Err(FormatError::Failed { status, stderr }) => {
            assert_eq!(status, 3);
            assert!(stderr.contains("parse error on line 2"));
        }
        other => panic!("expected a formatter failure, got {other:?}"),
    }
    assert!(!dir.path().join(FORMAT_TEMP_FILE_NAME).exists());
}

#[rstest]
fn a_missing_compiler_is_a_distinct_error() {
    let dir = TempDir::new().expect("temp dir");
    let document = Document::new(dir.path().join("main.pain"), PAIN_LANGUAGE_ID, "fn main(){}");

    let result = format_document(&document, &dir.path().join("pain-compiler-absent"));

    assert!(matches!(result, Err(FormatError::CompilerNotFound { .. })));
    assert!(!dir.path().join(FORMAT_TEMP_FILE_NAME).exists());
}
