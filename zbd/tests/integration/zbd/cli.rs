use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;

use super::super::zbd;

#[test]
fn help() {
    zbd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("report"))
        .stdout(predicate::str::contains("finish"));
}

#[test]
fn report_help() {
    zbd()
        .args(["report", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--csv"))
        .stdout(predicate::str::contains("--ro <FILTER>"));
}

#[test]
fn version() {
    zbd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("zbd "));
}

#[test]
fn no_args() {
    zbd()
        .assert()
        .failure()
        .code(1);
}

#[test]
fn invalid_command() {
    zbd()
        .args(["frobnicate", "/dev/null"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("frobnicate"));
}

#[rstest]
#[case(&["report"])]
#[case(&["reset", "-ofst", "0"])]
#[case(&["open", "-i", "-v"])]
fn no_device(#[case] args: &[&str]) {
    zbd()
        .args(args)
        .assert()
        .failure()
        .code(1);
}

#[test]
fn unknown_filter() {
    zbd()
        .args(["report", "-ro", "xx", "/dev/null"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unknown report option \"xx\""));
}

#[rstest]
#[case("report", "-bogus")]
#[case("finish", "-bogus")]
#[case("reset", "--ofset")]
fn unknown_option(#[case] cmd: &str, #[case] opt: &str) {
    zbd()
        .args([cmd, opt, "/dev/null"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unexpected argument"));
}

/// Report options get past the command line on the management commands, so
/// the failure comes from opening the device
#[rstest]
#[case(&["reset", "-csv"])]
#[case(&["close", "-n"])]
#[case(&["open", "-ro", "em"])]
fn report_opts_on_manage(#[case] args: &[&str]) {
    zbd()
        .args(args)
        .arg("/nonexistent/zbd/device")
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(predicate::str::starts_with(
            "Open /nonexistent/zbd/device failed ("));
}

#[test]
fn not_a_number() {
    zbd()
        .args(["report", "-len", "lots", "/dev/null"])
        .assert()
        .failure()
        .code(1);
}
