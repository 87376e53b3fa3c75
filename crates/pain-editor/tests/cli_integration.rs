//! End-to-end runs of the `pain-editor` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use pain_format::FORMAT_TEMP_FILE_NAME;

/// Builds a command with the `PAIN_*` environment scrubbed so host settings
/// cannot leak into the assertions.
fn pain_editor() -> Command {
    let mut cmd = Command::cargo_bin("pain-editor").expect("binary should build");
    for variable in [
        "PAIN_CONFIG_PATH",
        "PAIN_LSP_PATH",
        "PAIN_COMPILER_PATH",
        "PAIN_LOG_FILTER",
        "PAIN_LOG_FORMAT",
    ] {
        cmd.env_remove(variable);
    }
    cmd
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, body).expect("script should write");
    let mut permissions = fs::metadata(&path).expect("metadata").permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(&path, permissions).expect("permissions should apply");
    path
}

#[test]
fn locate_server_defaults_to_path_resolution() {
    pain_editor()
        .args(["locate", "server"])
        .assert()
        .success()
        .stdout("pain-lsp\n");
}

#[test]
fn locate_honours_a_configured_override() {
    pain_editor()
        .args(["--lsp-path", "/custom/pain-lsp", "locate", "server"])
        .assert()
        .success()
        .stdout("/custom/pain-lsp\n");
}

#[test]
fn locate_finds_workspace_release_artefacts() {
    let workspace = TempDir::new().expect("temp workspace");
    let release = workspace.path().join("target").join("release");
    fs::create_dir_all(&release).expect("release dir");
    fs::write(release.join("pain-compiler"), b"").expect("artefact");

    pain_editor()
        .args(["locate", "formatter"])
        .arg("--workspace-root")
        .arg(workspace.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("release").and(predicate::str::contains("pain-compiler")));
}

#[test]
fn configuration_files_feed_the_locator() {
    let dir = TempDir::new().expect("temp dir");
    let config = dir.path().join("pain.toml");
    fs::write(&config, "compiler_path = \"/from-file/pain-compiler\"\n").expect("config");

    pain_editor()
        .arg("--config-path")
        .arg(&config)
        .args(["locate", "formatter"])
        .assert()
        .success()
        .stdout("/from-file/pain-compiler\n");
}

#[cfg(unix)]
#[test]
fn format_prints_the_formatted_document() {
    let dir = TempDir::new().expect("temp dir");
    let compiler = write_script(dir.path(), "pain-compiler", "#!/bin/sh\nprintf formatted\n");
    let document = dir.path().join("main.pain");
    fs::write(&document, "fn main(){}").expect("document");

    pain_editor()
        .arg("--compiler-path")
        .arg(&compiler)
        .arg("format")
        .arg(&document)
        .assert()
        .success()
        .stdout("formatted");

    assert!(!dir.path().join(FORMAT_TEMP_FILE_NAME).exists());
    assert_eq!(
        fs::read_to_string(&document).expect("document survives"),
        "fn main(){}"
    );
}

#[cfg(unix)]
#[test]
fn format_write_rewrites_the_file_in_place() {
    let dir = TempDir::new().expect("temp dir");
    let compiler = write_script(dir.path(), "pain-compiler", "#!/bin/sh\nprintf formatted\n");
    let document = dir.path().join("main.pain");
    fs::write(&document, "fn main(){}").expect("document");

    pain_editor()
        .arg("--compiler-path")
        .arg(&compiler)
        .arg("format")
        .arg(&document)
        .arg("--write")
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&document).expect("document rewritten"),
        "formatted"
    );
}

#[cfg(unix)]
#[test]
fn formatter_warnings_reach_stderr_but_the_edit_applies() {
    let dir = TempDir::new().expect("temp dir");
    let compiler = write_script(
        dir.path(),
        "pain-compiler",
        "#!/bin/sh\nprintf formatted\necho 'deprecated syntax' >&2\n",
    );
    let document = dir.path().join("main.pain");
    fs::write(&document, "fn main(){}").expect("document");

    pain_editor()
        .arg("--compiler-path")
        .arg(&compiler)
        .arg("format")
        .arg(&document)
        .assert()
        .success()
        .stdout("formatted")
        .stderr(predicate::str::contains("deprecated syntax"));
}

#[cfg(unix)]
#[test]
fn a_failing_formatter_leaves_the_document_untouched() {
    let dir = TempDir::new().expect("temp dir");
    let compiler = write_script(
        dir.path(),
        "pain-compiler",
        "#!/bin/sh\necho 'parse error' >&2\nexit 2\n",
    );
    let document = dir.path().join("main.pain");
    fs::write(&document, "fn main(){}").expect("document");

    pain_editor()
        .arg("--compiler-path")
        .arg(&compiler)
        .arg("format")
        .arg(&document)
        .arg("--write")
        .assert()
        .failure()
        .stderr(predicate::str::contains("formatting failed"));

    assert_eq!(
        fs::read_to_string(&document).expect("document survives"),
        "fn main(){}"
    );
    assert!(!dir.path().join(FORMAT_TEMP_FILE_NAME).exists());
}

#[cfg(unix)]
#[test]
fn formatting_an_out_of_scope_document_is_a_silent_no_op() {
    let dir = TempDir::new().expect("temp dir");
    let compiler = write_script(
        dir.path(),
        "pain-compiler",
        "#!/bin/sh\ntouch \"$(dirname \"$0\")/formatter-ran\"\n",
    );
    let document = dir.path().join("notes.txt");
    fs::write(&document, "plain notes").expect("document");

    pain_editor()
        .arg("--compiler-path")
        .arg(&compiler)
        .arg("format")
        .arg(&document)
        .assert()
        .success()
        .stdout("");

    assert!(
        !dir.path().join("formatter-ran").exists(),
        "the formatter must not run for out-of-scope documents"
    );
    assert!(!dir.path().join(FORMAT_TEMP_FILE_NAME).exists());
}

#[test]
fn check_reports_a_server_that_cannot_start() {
    let dir = TempDir::new().expect("temp dir");
    let missing = dir.path().join("pain-lsp-absent");

    pain_editor()
        .arg("--lsp-path")
        .arg(&missing)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("did not start"));
}

#[test]
fn missing_documents_are_reported() {
    let dir = TempDir::new().expect("temp dir");

    pain_editor()
        .arg("format")
        .arg(dir.path().join("absent.pain"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
