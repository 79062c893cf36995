//! Tests of the `golden-check` executable.
//!
//! The stand-in generator is a shell script handed to `/bin/sh` via `--generator-arg`.

#![cfg(unix)]

use assert_fs::prelude::*;
use predicates::prelude::*;

const UPPERCASE_GENERATOR: &str = r#"tr '[:lower:]' '[:upper:]' < "$1" > "$2""#;

const JACKS: &str = "jacks or better 9/6\nKK hold\nQQ hold\n";
const DEUCES: &str = "full pay deuces wild\nwild royal hold\n";
const MULTI: &str = "multi-play jacks\nhands 3\n";

fn workspace() -> assert_fs::TempDir {
    let dir = assert_fs::TempDir::new().unwrap();

    for (input, golden, content) in [
        ("jacks-96.txt", "golden.txt", JACKS),
        ("fpdw_practical.txt", "golden_deuces.txt", DEUCES),
        ("multi-jacks.txt", "multi-golden.txt", MULTI),
    ] {
        dir.child("data").child(input).write_str(content).unwrap();
        dir.child("test")
            .child(golden)
            .write_str(&content.to_uppercase())
            .unwrap();
    }

    dir.child("artifacts").create_dir_all().unwrap();
    dir.child("generator.sh")
        .write_str(UPPERCASE_GENERATOR)
        .unwrap();

    dir
}

fn golden_check(dir: &assert_fs::TempDir) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("golden-check"));
    cmd.current_dir(dir.path())
        .env("NO_COLOR", "1")
        .env_remove("GOLDEN_CHECK_CONFIG")
        .env_remove("GOLDEN_GENERATOR")
        .env_remove("GOLDEN_DATA_DIR")
        .env_remove("GOLDEN_DIR")
        .env_remove("GOLDEN_MANIFEST")
        .env_remove("GOLDEN_VERBOSE");
    cmd
}

fn golden_check_with_paths(dir: &assert_fs::TempDir) -> assert_cmd::Command {
    let mut cmd = golden_check(dir);
    cmd.arg("--no-config")
        .arg("--generator")
        .arg("/bin/sh")
        .arg("--generator-arg")
        .arg(dir.path().join("generator.sh"))
        .arg("--data-dir")
        .arg(dir.path().join("data"))
        .arg("--golden-dir")
        .arg(dir.path().join("test"))
        .arg("--artifact-dir")
        .arg(dir.path().join("artifacts"));
    cmd
}

fn artifact_count(dir: &assert_fs::TempDir) -> usize {
    std::fs::read_dir(dir.path().join("artifacts"))
        .unwrap()
        .count()
}

#[test]
fn passing_suite_exits_zero() {
    let dir = workspace();

    golden_check_with_paths(&dir)
        .assert()
        .success()
        .stderr(predicate::str::contains("[strategy::jacks-96]... ok."))
        .stderr(predicate::str::contains("[strategy::fpdw_practical]... ok."))
        .stderr(predicate::str::contains("[strategy::multi-jacks]... ok."))
        .stderr(predicate::str::contains("3 passed, 0 failed"));

    assert_eq!(artifact_count(&dir), 0);
}

#[test]
fn mismatch_exits_one_and_shows_the_diff() {
    let dir = workspace();
    dir.child("test/golden.txt")
        .write_str("JACKS OR BETTER 9/6\nKK DISCARD\nQQ HOLD\n")
        .unwrap();

    golden_check_with_paths(&dir)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("DIFFERS from golden"))
        .stderr(predicate::str::contains("- KK DISCARD"))
        .stderr(predicate::str::contains("+ KK HOLD"))
        .stderr(predicate::str::contains("[strategy::multi-jacks]... ok."));

    assert_eq!(artifact_count(&dir), 0);
}

#[test]
fn list_prints_cases_without_running_them() {
    let dir = workspace();

    golden_check(&dir)
        .args(["--no-config", "--generator", "/nonexistent/strategy", "--list"])
        .assert()
        .success()
        .stdout(
            "strategy::jacks-96: test\n\
             strategy::fpdw_practical: test\n\
             strategy::multi-jacks: test\n",
        );
}

#[test]
fn filters_select_cases() {
    let dir = workspace();

    golden_check(&dir)
        .args(["--no-config", "--list", "--skip", "multi", "jacks"])
        .assert()
        .success()
        .stdout("strategy::jacks-96: test\n");
}

#[test]
fn terse_format_prints_one_line_per_case() {
    let dir = workspace();
    dir.child("test/multi-golden.txt")
        .write_str("something else\n")
        .unwrap();

    golden_check_with_paths(&dir)
        .args(["--format", "terse"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("strategy::jacks-96: pass\n"))
        .stderr(predicate::str::contains("strategy::multi-jacks: fail\n"));
}

#[test]
fn junit_report_goes_to_stdout() {
    let dir = workspace();

    golden_check_with_paths(&dir)
        .args(["--format", "junit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<testsuite"))
        .stdout(predicate::str::contains("strategy::fpdw_practical"));
}

#[test]
fn missing_generator_fails_every_case() {
    let dir = workspace();

    golden_check(&dir)
        .arg("--no-config")
        .arg("--generator")
        .arg(dir.path().join("no-such-generator"))
        .arg("--data-dir")
        .arg(dir.path().join("data"))
        .arg("--golden-dir")
        .arg(dir.path().join("test"))
        .args(["--format", "terse"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("strategy::jacks-96: error"))
        .stderr(predicate::str::contains("strategy::multi-jacks: error"));
}

#[test]
fn malformed_manifest_is_fatal() {
    let dir = workspace();
    dir.child("suite.yaml").write_str("cases: [ {").unwrap();

    golden_check_with_paths(&dir)
        .arg("--manifest")
        .arg(dir.path().join("suite.yaml"))
        .assert()
        .code(2);
}

#[test]
fn missing_explicit_config_is_fatal() {
    let dir = workspace();

    golden_check(&dir)
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .assert()
        .code(2);
}

#[test]
fn config_file_in_current_dir_is_honored() {
    let dir = workspace();
    dir.child("golden-check.toml")
        .write_str(
            r#"
generator = "/bin/sh"
generator-args = ["generator.sh"]
artifact-dir = "artifacts"
format = "terse"
"#,
        )
        .unwrap();

    golden_check(&dir)
        .assert()
        .success()
        .stderr(predicate::str::contains("strategy::jacks-96: pass\n"));

    assert_eq!(artifact_count(&dir), 0);
}

#[test]
fn manifest_replaces_the_builtin_suite() {
    let dir = workspace();
    dir.child("suite.yaml")
        .write_str(
            "name: smoke\n\
             cases:\n\
             - name: jacks\n  \
               input: jacks-96.txt\n  \
               golden: golden.txt\n",
        )
        .unwrap();

    golden_check_with_paths(&dir)
        .arg("--manifest")
        .arg(dir.path().join("suite.yaml"))
        .args(["--format", "terse"])
        .assert()
        .success()
        .stderr(predicate::str::contains("smoke::jacks: pass\n"));
}
