//! Integration tests against the `dragonc` binary itself: `check`, `build`,
//! and `run`, each driven through a real temp file the way a user would.

use std::io::Write;
use std::process::Command;

fn dragonc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_dragonc"))
}

fn write_source(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".dragon")
        .tempfile()
        .expect("create temp source file");
    file.write_all(contents.as_bytes()).expect("write source");
    file
}

#[test]
fn check_accepts_a_well_typed_program() {
    let file = write_source("func main() { return 0; }");
    let output = dragonc()
        .arg("check")
        .arg(file.path())
        .output()
        .expect("run dragonc check");
    assert!(output.status.success());
}

#[test]
fn check_rejects_an_undeclared_variable() {
    let file = write_source("func main() { print y; return 0; }");
    let output = dragonc()
        .arg("check")
        .arg(file.path())
        .output()
        .expect("run dragonc check");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("semantic-error"), "stderr was: {}", stderr);
}

#[test]
fn build_prints_optimized_ir_to_stdout() {
    let file = write_source("func main() { print 1 + 2; return 0; }");
    let output = dragonc()
        .arg("build")
        .arg(file.path())
        .output()
        .expect("run dragonc build");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    // The optimizer should have folded `1 + 2` down to a single literal
    // assignment; no `BinaryOp` survives in the dump.
    assert!(!stdout.contains(" + "), "ir still has an add: {}", stdout);
    assert!(stdout.contains("print "), "ir was: {}", stdout);
}

#[test]
fn build_writes_ir_to_an_output_file_when_requested() {
    let src = write_source("func main() { return 0; }");
    let out_dir = tempfile::tempdir().expect("create temp dir");
    let out_path = out_dir.path().join("out.ir");

    let output = dragonc()
        .arg("build")
        .arg(src.path())
        .arg("--output")
        .arg(&out_path)
        .output()
        .expect("run dragonc build --output");
    assert!(output.status.success());
    let written = std::fs::read_to_string(&out_path).expect("read written ir");
    assert!(written.contains("func main:"));
}

#[test]
fn run_executes_the_program_and_prints_its_output() {
    let file = write_source(
        r#"
        func main() {
            print "hola, mundo";
            return 0;
        }
        "#,
    );
    let output = dragonc()
        .arg("run")
        .arg(file.path())
        .output()
        .expect("run dragonc run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "hola, mundo");
}

#[test]
fn bare_invocation_always_emits_ir_before_running() {
    let file = write_source("func main() { print 4; return 0; }");
    let output = dragonc()
        .arg(file.path())
        .output()
        .expect("run bare dragonc <path>");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("func main:"), "stdout was: {}", stdout);
    assert!(stdout.contains('4'));
}

#[test]
fn run_reports_a_vm_error_and_exits_nonzero_on_division_by_zero() {
    let file = write_source("func main() { int x = 10 / 0; print x; return 0; }");
    let output = dragonc()
        .arg("run")
        .arg(file.path())
        .output()
        .expect("run dragonc run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("vm-error"), "stderr was: {}", stderr);
}
