use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cmd() -> Command {
    Command::cargo_bin("trello-import").expect("binary exists")
}

#[test]
fn status_reports_unauthorized_with_empty_store() {
    let dir = tempdir().unwrap();
    cmd()
        .arg("status")
        .arg("--creds-file")
        .arg(dir.path().join("creds.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("authorized: false"));
}

#[test]
fn auth_then_status_reports_authorized() {
    let dir = tempdir().unwrap();
    let creds = dir.path().join("creds.json");

    cmd()
        .arg("auth")
        .args(["--key", "k", "--token", "t"])
        .arg("--creds-file")
        .arg(&creds)
        .assert()
        .success()
        .stdout(predicate::str::contains("Credentials saved"));

    cmd()
        .arg("status")
        .arg("--creds-file")
        .arg(&creds)
        .assert()
        .success()
        .stdout(predicate::str::contains("authorized: true"));
}

#[test]
fn auth_with_empty_token_clears_and_reports_unauthorized() {
    let dir = tempdir().unwrap();
    let creds = dir.path().join("creds.json");

    cmd()
        .arg("auth")
        .args(["--key", "k", "--token", "t"])
        .arg("--creds-file")
        .arg(&creds)
        .assert()
        .success();

    cmd()
        .arg("auth")
        .args(["--key", "k", "--token", ""])
        .arg("--creds-file")
        .arg(&creds)
        .assert()
        .success()
        .stdout(predicate::str::contains("Not authorized"));
}

#[test]
fn import_with_missing_config_file_fails() {
    let dir = tempdir().unwrap();
    cmd()
        .arg("import")
        .arg("--config")
        .arg(dir.path().join("nope.yaml"))
        .arg("--creds-file")
        .arg(dir.path().join("creds.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Import failed"));
}
