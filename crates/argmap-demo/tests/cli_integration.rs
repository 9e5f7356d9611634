use std::process::{Command, Output};

fn demo() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_argmap-demo"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run(args: &[&str]) -> Output {
    demo()
        .args(args)
        .output()
        .expect("failed to run argmap-demo")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn no_arguments_prints_help() {
    let out = run(&[]);
    assert!(
        out.status.success(),
        "argmap-demo failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        stderr(&out),
    );
    let text = stdout(&out);
    assert!(
        text.starts_with("Usage: argmap-demo [OPTIONS]") && text.contains("--name, -n"),
        "unexpected help output:\n{text}"
    );
}

#[test]
fn help_flag_wins_over_missing_required() {
    let out = run(&["-h"]);
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));
    assert!(stdout(&out).contains("--skills\n[String]"));
}

#[test]
fn prints_parsed_arguments_as_json() {
    let out = run(&["-n", "Ada", "--age=36.5", r#"--skills=Budo,"Krav Maga""#, "-u"]);
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));

    let value: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("stdout is not JSON");
    assert_eq!(value["name"], "Ada");
    assert_eq!(value["age"], 36.5);
    assert_eq!(value["skills"], serde_json::json!(["Budo", "Krav Maga"]));
    assert_eq!(value["greeting"], "Hello");
    assert_eq!(value["unplugged"], false);
    assert_eq!(value["verbose"], false);
    assert_eq!(value["help"], false);
}

#[test]
fn missing_required_argument_fails() {
    let out = run(&["-v"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(
        stderr(&out).contains("error: --name was not provided but is a required argument"),
        "stderr:\n{}",
        stderr(&out)
    );
    assert!(out.stdout.is_empty());
}

#[test]
fn unknown_argument_fails() {
    let out = run(&["--name=Ada", "--colour=red"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(
        stderr(&out).contains("--colour=red could not be parsed as it is an unknown argument"),
        "stderr:\n{}",
        stderr(&out)
    );
}

#[test]
fn verbose_logs_to_stderr() {
    for flag in ["-v", "--verbose=yes"] {
        let out = run(&[flag, "-n", "Ada"]);
        assert!(out.status.success(), "stderr:\n{}", stderr(&out));
        assert!(
            stderr(&out).contains("parsed arguments"),
            "{flag}: stderr:\n{}",
            stderr(&out)
        );
        let value: serde_json::Value =
            serde_json::from_slice(&out.stdout).expect("stdout is not JSON");
        assert_eq!(value["verbose"], true);
    }
}

#[test]
fn quiet_by_default() {
    let out = run(&["-n", "Ada"]);
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));
    assert!(out.stderr.is_empty(), "stderr:\n{}", stderr(&out));
}
