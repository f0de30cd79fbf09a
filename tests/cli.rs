//! End-to-end CLI tests driving the compiled `sprig` binary (`spec.md` §8).
//!
//! These exercise the file-runner mode's exit codes and stdout/stderr
//! exactly as the specification's test oracle describes, something a
//! library-level unit test can't observe, since exit codes only exist at
//! the process boundary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn script(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".sprig").expect("create temp script");
    write!(file, "{contents}").expect("write temp script");
    file
}

fn sprig() -> Command {
    Command::cargo_bin("sprig").expect("locate sprig binary")
}

#[test]
fn prints_sum_of_two_literals() {
    let file = script("print 1+2;");
    sprig()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("3\n"));
}

#[test]
fn variables_assignment_and_reassignment() {
    let file = script("var a=1; var b=2; print a+b; a=a+10; print a;");
    sprig()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("11\n12\n"));
}

#[test]
fn while_loop_counts_up() {
    let file = script("var i=0; while(i<3){ print i; i=i+1; }");
    sprig()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("0\n1\n2\n"));
}

#[test]
fn for_loop_counts_up() {
    let file = script("for(var i=0;i<3;i=i+1) print i;");
    sprig()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("0\n1\n2\n"));
}

#[test]
fn function_call_and_function_value_stringify() {
    let file = script("fun add(a,b){ print a+b; } add(2,3); print add;");
    sprig()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("5\n<fn add>\n"));
}

#[test]
fn string_concat_then_runtime_type_error_exits_70() {
    let file = script("print \"a\"+\"b\"; print 1+\"a\";");
    sprig()
        .arg(file.path())
        .assert()
        .code(70)
        .stdout(predicate::str::diff("ab\n"))
        .stderr(predicate::str::contains("Operands must be two numbers or two strings."));
}

#[test]
fn missing_expression_is_a_static_error_exiting_65_with_no_output() {
    let file = script("1+;");
    sprig()
        .arg(file.path())
        .assert()
        .code(65)
        .stdout(predicate::str::is_empty());
}

#[test]
fn reading_an_undefined_variable_is_a_runtime_error_exiting_70() {
    let file = script("print undefined;");
    sprig()
        .arg(file.path())
        .assert()
        .code(70)
        .stderr(predicate::str::contains("Undefined variable 'undefined'."));
}

#[test]
fn calling_a_string_is_a_runtime_error_exiting_70() {
    let file = script("\"x\"();");
    sprig()
        .arg(file.path())
        .assert()
        .code(70)
        .stderr(predicate::str::contains("Can only call functions and classes."));
}

#[test]
fn invalid_assignment_target_is_a_static_error_but_parsing_recovers() {
    let file = script("(a+b)=1;");
    sprig().arg(file.path()).assert().code(65);
}

#[test]
fn empty_program_exits_clean_with_no_output() {
    let file = script("");
    sprig()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn deeply_nested_grouping_evaluates_to_the_inner_literal() {
    let file = script("print ((((1))));");
    sprig()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("1\n"));
}

#[test]
fn division_by_zero_prints_infinity_instead_of_erroring() {
    let file = script("print 1/0;");
    sprig()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("Infinity\n"));
}

#[test]
fn clock_is_callable_with_zero_args_and_returns_a_number() {
    let file = script("print clock() >= 0;");
    sprig()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("true\n"));
}

#[test]
fn nonexistent_file_fails_without_claiming_65_or_70() {
    // A missing file is a driver-level I/O failure, not a language static
    // or runtime error, so it must not reuse exit code 65 or 70.
    sprig()
        .arg("/nonexistent/path/does-not-exist.sprig")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn repl_reads_from_stdin_and_echoes_prompts() {
    sprig()
        .write_stdin("print 1 + 1;\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("2"));
}

#[test]
fn repl_survives_a_bad_line_and_keeps_going() {
    sprig()
        .write_stdin("1+;\nprint 42;\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("42"));
}
