use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn base_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pagelift"));
    // Deterministic environment: credentials only come from what each test sets.
    for key in ["FTP_HOST", "FTP_USER", "FTP_PASSWORD", "REACT_APP_API_URL"] {
        cmd.env_remove(key);
    }
    cmd
}

fn with_creds(cmd: &mut Command) {
    cmd.env("FTP_HOST", "ftp.test.invalid")
        .env("FTP_USER", "deploy")
        .env("FTP_PASSWORD", "pw");
}

fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
}

#[test]
fn missing_credentials_exits_one_and_lists_candidates() {
    let tmp = TempDir::new().unwrap();

    let mut cmd = base_cmd();
    cmd.args([
        "--project-dir",
        tmp.path().to_str().unwrap(),
        "--skip-build",
        "--dry-run",
    ]);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(contains("missing FTP credentials"))
        .stderr(contains(tmp.path().join(".env").to_str().unwrap()));
}

#[test]
fn dry_run_prints_sorted_filtered_plan() {
    let tmp = TempDir::new().unwrap();
    write_tree(
        tmp.path(),
        &[
            ("build/.hidden", "nope"),
            ("build/.htaccess", "RewriteEngine On"),
            ("build/asset-manifest.json", "{}"),
            ("build/index.html", "<html></html>"),
            ("build/static/css/main.css", "body{}"),
        ],
    );

    let mut cmd = base_cmd();
    with_creds(&mut cmd);
    cmd.args([
        "--project-dir",
        tmp.path().to_str().unwrap(),
        "--skip-build",
        "--dry-run",
    ]);

    let assert = cmd
        .assert()
        .success()
        .stdout(contains("would upload www/.htaccess"))
        .stdout(contains("would upload www/index.html"))
        .stdout(contains("would upload www/static/css/main.css"))
        .stdout(contains("dry run: 4 files"))
        .stdout(predicate::str::contains(".hidden").not());

    // Lexicographic order per directory level.
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let htaccess = stdout.find("www/.htaccess").unwrap();
    let manifest = stdout.find("www/asset-manifest.json").unwrap();
    let index = stdout.find("www/index.html").unwrap();
    let css = stdout.find("www/static/css/main.css").unwrap();
    assert!(htaccess < manifest && manifest < index && index < css);
}

#[test]
fn empty_remote_base_strips_leading_slash() {
    let tmp = TempDir::new().unwrap();
    write_tree(tmp.path(), &[("build/index.html", "x")]);

    let mut cmd = base_cmd();
    with_creds(&mut cmd);
    cmd.args([
        "--project-dir",
        tmp.path().to_str().unwrap(),
        "--remote-base",
        "",
        "--skip-build",
        "--dry-run",
    ]);
    cmd.assert()
        .success()
        .stdout(contains("would upload index.html"))
        .stdout(predicate::str::contains("would upload /").not());
}

#[test]
fn failing_build_halts_before_upload() {
    let tmp = TempDir::new().unwrap();

    let mut cmd = base_cmd();
    with_creds(&mut cmd);
    cmd.args([
        "--project-dir",
        tmp.path().to_str().unwrap(),
        "--build-command",
        "sh -c 'echo kaboom >&2; exit 7'",
        "--dry-run",
    ]);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(contains("exited with status 7"))
        .stderr(contains("kaboom"))
        .stdout(predicate::str::contains("would upload").not());
}

#[test]
fn missing_build_output_is_reported() {
    let tmp = TempDir::new().unwrap();

    let mut cmd = base_cmd();
    with_creds(&mut cmd);
    cmd.args([
        "--project-dir",
        tmp.path().to_str().unwrap(),
        "--skip-build",
        "--dry-run",
    ]);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(contains("build output not found"));
}

#[test]
fn missing_project_dir_is_reported() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("no-such-project");

    let mut cmd = base_cmd();
    with_creds(&mut cmd);
    cmd.args(["--project-dir", missing.to_str().unwrap(), "--dry-run"]);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(contains("project directory not found"));
}

#[test]
fn env_file_credentials_with_quotes_work_end_to_end() {
    let tmp = TempDir::new().unwrap();
    write_tree(tmp.path(), &[("build/index.html", "x")]);
    let env_file = tmp.path().join("deploy.env");
    fs::write(
        &env_file,
        "# hosting account\nFTP_HOST=\"ftp.test.invalid\"\nFTP_USER='deploy'\nFTP_PASSWORD=pw\n",
    )
    .unwrap();

    let mut cmd = base_cmd();
    cmd.args([
        "--project-dir",
        tmp.path().to_str().unwrap(),
        "--env-file",
        env_file.to_str().unwrap(),
        "--skip-build",
        "--dry-run",
    ]);
    cmd.assert()
        .success()
        .stdout(contains("would upload www/index.html"));
}

#[test]
fn build_runs_before_plan_and_sees_injected_env() {
    let tmp = TempDir::new().unwrap();

    let mut cmd = base_cmd();
    with_creds(&mut cmd);
    cmd.args([
        "--project-dir",
        tmp.path().to_str().unwrap(),
        "--api-url",
        "http://localhost:9000/api",
        "--build-command",
        "sh -c 'mkdir -p build && echo \"$REACT_APP_API_URL\" > build/api.txt'",
        "--dry-run",
    ]);
    cmd.assert()
        .success()
        .stdout(contains("build OK"))
        .stdout(contains("would upload www/api.txt"));

    let captured = fs::read_to_string(tmp.path().join("build/api.txt")).unwrap();
    assert_eq!(captured.trim(), "http://localhost:9000/api");
}

#[test]
fn allow_dotfile_flag_overrides_default() {
    let tmp = TempDir::new().unwrap();
    write_tree(
        tmp.path(),
        &[
            ("build/.htaccess", "r"),
            ("build/.well-known/keys.txt", "k"),
            ("build/index.html", "x"),
        ],
    );

    let mut cmd = base_cmd();
    with_creds(&mut cmd);
    cmd.args([
        "--project-dir",
        tmp.path().to_str().unwrap(),
        "--allow-dotfile",
        ".well-known",
        "--skip-build",
        "--dry-run",
    ]);
    cmd.assert()
        .success()
        .stdout(contains("would upload www/.well-known/keys.txt"))
        // The override replaces the default list, so .htaccess is hidden again.
        .stdout(predicate::str::contains(".htaccess").not());
}
