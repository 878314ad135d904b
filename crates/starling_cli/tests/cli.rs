use std::path::PathBuf;
use std::process::{Command as Process, Output};

use pretty_assertions::assert_eq;
use starling_cli::cli::{Command, OutputFormat, ParseOptions};
use starling_cli::driver::{Driver, DriverError};
use starling_cli::execute;
use starling_session::diagnostics::Diagnostic;

fn options() -> ParseOptions {
    ParseOptions {
        max_errors: 100,
        max_nesting: 128,
        jobs: None,
    }
}

fn run(command: Command) -> (Result<(), DriverError>, String, Vec<Diagnostic>) {
    let mut driver = Driver::new(Vec::new());
    let mut out = Vec::new();
    let result = execute(command, &mut driver, &mut out);

    let out = String::from_utf8(out).unwrap();
    (result, out, driver.session.diagnostics)
}

fn starling(args: &[&str]) -> Output {
    Process::new(env!("CARGO_BIN_EXE_starling"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn write_source(name: &str, text: &str) -> PathBuf {
    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn lex_tokens() {
    let (result, out, diagnostics) = run(Command::Lex {
        input: "fun main() { \"hi\" }".to_owned(),
        source: true,
        format: OutputFormat::Debug,
    });

    assert!(result.is_ok());
    assert!(diagnostics.is_empty());
    assert_eq!(
        out,
        "0..3\tkeyword `fun`\n\
         4..8\tidentifier `main`\n\
         8..9\t`(`\n\
         9..10\t`)`\n\
         11..12\t`{`\n\
         13..17\tstring \"hi\"\n\
         18..19\t`}`\n\
         19..19\tend of file\n"
    );
}

#[test]
fn lex_json() {
    let (result, out, _) = run(Command::Lex {
        input: "x + x".to_owned(),
        source: true,
        format: OutputFormat::Json,
    });

    assert!(result.is_ok());

    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["strings"], serde_json::json!(["x"]));
    assert_eq!(json["tokens"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["tokens"][0]["span"]["start"], 0);
}

#[test]
fn parse_json() {
    let (result, out, diagnostics) = run(Command::Parse {
        inputs: vec!["fun a() {}".to_owned(), "struct B;".to_owned()],
        source: true,
        format: OutputFormat::Json,
        options: options(),
    });

    assert!(result.is_ok());
    assert!(diagnostics.is_empty());

    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    let files = json["files"].as_array().unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["name"], "<input>");
    assert_eq!(files[0]["errors"], serde_json::json!([]));
    assert_eq!(files[1]["module"]["items"].as_array().map(Vec::len), Some(1));

    // Files are parsed concurrently, so interning order varies.
    let strings = json["strings"].as_array().unwrap();
    assert!(strings.contains(&serde_json::json!("a")));
    assert!(strings.contains(&serde_json::json!("B")));
}

#[test]
fn check_reports_errors() {
    let (result, out, diagnostics) = run(Command::Check {
        inputs: vec!["fun f() { let = 1; }".to_owned(), "fun g() {}".to_owned()],
        source: true,
        options: options(),
    });

    assert!(matches!(result, Err(DriverError::HadErrors(1))));
    assert_eq!(out, "");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message.as_deref(),
        Some("expected a pattern, found `=`")
    );
}

#[test]
fn check_files() {
    let good = write_source("good.st", "/// Adds.\nfun add(a: Int, b: Int): Int { a + b }\n");
    let bad = write_source("bad.st", "fun f() { x }}\n");

    let (result, out, _) = run(Command::Check {
        inputs: vec![good.display().to_string()],
        source: false,
        options: options(),
    });
    assert!(result.is_ok());
    assert_eq!(out, "checked 1 file(s)\n");

    let (result, _, diagnostics) = run(Command::Check {
        inputs: vec![good.display().to_string(), bad.display().to_string()],
        source: false,
        options: options(),
    });
    assert!(result.is_err());
    assert!(!diagnostics.is_empty());
}

#[test]
fn binary_lex() {
    let output = starling(&["lex", "--source", "a"]);

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "0..1\tidentifier `a`\n1..1\tend of file\n"
    );
}

#[test]
fn binary_reports_failure() {
    let output = starling(&["check", "--color", "never", "--source", "fun f( {}"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("error"), "{stderr}");
    assert!(stderr.contains("aborting due to"), "{stderr}");
}

#[test]
fn binary_missing_file() {
    let output = starling(&["parse", "does-not-exist.st"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("couldn't read `does-not-exist.st`"), "{stderr}");
}
