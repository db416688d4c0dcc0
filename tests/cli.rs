use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn ravun() -> Command {
    Command::cargo_bin("ravun").expect("binary exists")
}

#[test]
fn run_hello_world() {
    ravun()
        .arg("run")
        .arg("demos/hello.ravun")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello, World!"));
}

#[test]
fn run_fibonacci_demo() {
    ravun()
        .arg("run")
        .arg("demos/fib.ravun")
        .assert()
        .success()
        .stdout(predicate::str::contains("34"));
}

#[test]
fn run_tour_demo() {
    ravun()
        .arg("run")
        .arg("demos/tour.ravun")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Hello, Ravun!")
                .and(predicate::str::contains("55"))
                .and(predicate::str::contains("[0, 1, 4, 9]")),
        );
}

#[test]
fn run_rejects_other_extensions() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("script.txt");
    fs::write(&path, "print(\"nope\");").expect("write script");

    ravun()
        .arg("run")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a Ravun script"));
}

#[test]
fn run_accepts_rv_extension() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("script.rv");
    fs::write(&path, "println(\"short extension\");").expect("write script");

    ravun()
        .arg("run")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("short extension"));
}

#[test]
fn run_fails_on_semantic_errors() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("bad.ravun");
    fs::write(&path, "let x: int = \"hi\";\n").expect("write script");

    ravun()
        .arg("run")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[semantic]"));
}

#[test]
fn warnings_alone_do_not_fail_a_run() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("warny.ravun");
    fs::write(
        &path,
        "fn main() {\n    let unused = 1;\n    println(\"still ran\");\n}\n",
    )
    .expect("write script");

    ravun()
        .arg("run")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("still ran"))
        .stderr(predicate::str::contains("warning[semantic]"));
}

#[test]
fn check_reports_positions() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("bad.ravun");
    fs::write(&path, "let ok = 1;\nprintln(missing);\n").expect("write script");

    ravun()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("2:").and(predicate::str::contains("missing")));
}

#[test]
fn check_can_dump_tokens_and_ast() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("ok.ravun");
    fs::write(&path, "println(\"hi\");\n").expect("write script");

    ravun()
        .arg("check")
        .arg(&path)
        .arg("--tokens")
        .arg("--ast")
        .assert()
        .success()
        .stdout(predicate::str::contains("Identifier").and(predicate::str::contains("Call")));
}

#[test]
fn read_int_parses_stdin() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("doubler.ravun");
    fs::write(&path, "let n = read_int();\nprintln(n * 2);\n").expect("write script");

    ravun()
        .arg("run")
        .arg(&path)
        .write_stdin("21\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("42"));

    ravun()
        .arg("run")
        .arg(&path)
        .write_stdin("twenty-one\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not parse"));
}

#[test]
fn eval_prints_the_result() {
    ravun()
        .arg("eval")
        .arg("1 + 2;")
        .assert()
        .success()
        .stdout(predicate::str::contains("3"));
}

#[test]
fn eval_reports_parse_errors() {
    ravun()
        .arg("eval")
        .arg("1 +")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[parse]"));
}
