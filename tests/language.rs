use std::fs;

use kll::{
    config::{CallScope, Language, Options},
    error::{Diagnostic, RuntimeError},
    get_result,
    interpreter::{evaluator::core::MAX_CALL_DEPTH, value::function::Kwargs},
};
use pretty_assertions::assert_eq;
use walkdir::WalkDir;

/// Scripts under `tests/scripts/failing` must stop with a runtime
/// diagnostic; every other script must succeed.
#[test]
fn script_files_run() {
    let mut count = 0;

    for entry in
        WalkDir::new("tests/scripts").into_iter()
                                     .filter_map(Result::ok)
                                     .filter(|e| e.path().extension().is_some_and(|ext| ext == "kll"))
    {
        let path = entry.path();
        let content =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));
        let must_fail = path.components().any(|part| part.as_os_str() == "failing");

        count += 1;
        match get_result(&content, Options::default()) {
            Ok(value) if must_fail => {
                panic!("Script {path:?} succeeded with {value} but was expected to fail")
            },
            Err(Diagnostic::Parse(e)) if must_fail => {
                panic!("Script {path:?} has a syntax error: {e}")
            },
            Err(e) if !must_fail => {
                panic!("Script {:?} failed:\n{}", path, e.render(&content, Language::En))
            },
            _ => {},
        }
    }

    assert!(count > 0, "No scripts found in tests/scripts");
}

fn assert_success(src: &str) -> String {
    match get_result(src, Options::default()) {
        Ok(value) => value.to_string(),
        Err(e) => panic!("Script failed: {}", e.render(src, Language::En)),
    }
}

fn assert_failure(src: &str) -> Diagnostic {
    match get_result(src, Options::default()) {
        Ok(value) => panic!("Script succeeded with {value} but was expected to fail"),
        Err(e) => e,
    }
}

fn root_cause(diagnostic: &Diagnostic) -> &RuntimeError {
    match diagnostic {
        Diagnostic::Runtime(error) => error.root_cause(),
        Diagnostic::Parse(error) => panic!("expected a runtime error, got {error}"),
    }
}

#[test]
fn arithmetic_is_one_right_associative_level() {
    assert_eq!(assert_success("1 + 2 * 3"), "7");
    assert_eq!(assert_success("2 * 3 + 1"), "8");
    assert_eq!(assert_success("(2 * 3) + 1"), "7");
    assert_eq!(assert_success("10 - 4 - 3"), "9");
    assert_eq!(assert_success("-2 * 3"), "-6");
    assert_eq!(assert_success("7 / 2"), "3.5");
}

#[test]
fn strings_and_null_in_arithmetic() {
    assert_eq!(assert_success("\"a\" + 1 + 2"), "a3");
    assert_eq!(assert_success("\"total: \" + true"), "total: true");
    assert_eq!(assert_success("local n\nn + 1"), "null");
}

#[test]
fn locals_and_reassignment() {
    assert_eq!(assert_success("local x = 5; x = 10; x"), "10");
    assert_eq!(assert_success("var x = 1\nx = x + 1\nx"), "2");
    assert_eq!(assert_success("local x = 1\nlocal x\nx"), "null");
}

#[test]
fn if_block_locals_are_purged() {
    assert_eq!(assert_success("local x = 1\nif x {\n  local y = 2\n  x = y\n}\nx"), "2");
    let error = assert_failure("if 1 { local y = 2 }\ny");
    assert!(matches!(root_cause(&error), RuntimeError::VariableNotFound { name, .. } if name == "y"));
    assert_eq!(assert_success("if 0 { local y = 2 }\nexist y"), "false");
}

#[test]
fn globals_outlive_blocks() {
    assert_eq!(assert_success("if 1 { global g = 3 }\ng"), "3");
    assert_eq!(assert_success("function f() { global made = 9 }\nf()\nmade"), "9");
}

#[test]
fn constants_ignore_assignment() {
    assert_eq!(assert_success("true = 5"), "5");
    assert_eq!(assert_success("true = 5\ntrue"), "true");
    assert_eq!(assert_success("Math.pi = 3\nMath.pi"), "3.1415");
    assert_eq!(assert_success("__name__"), "__main__");
}

#[test]
fn logic_and_identity() {
    assert_eq!(assert_success("1 == 1"), "true");
    assert_eq!(assert_success("\"a\" == \"a\""), "true");
    assert_eq!(assert_success("1 == \"1\""), "false");
    assert_eq!(assert_success("true && false"), "false");
    assert_eq!(assert_success("0 || \"x\""), "true");
    assert_eq!(assert_success("local a = ctx.exec(\"\")\nlocal b = a\na == b"), "true");
    assert_eq!(assert_success("ctx.exec(\"\") == ctx.exec(\"\")"), "false");
}

#[test]
fn pointers_write_through() {
    assert_eq!(assert_success("local x = 1\nlocal p = pointer x\np = 5\nx"), "5");
    assert_eq!(assert_success("local x = 1\nlocal p = pointer x\nx = 7\np + 1"), "8");
    assert_eq!(assert_success("local x = 1\npointer x == pointer x"), "true");
}

#[test]
fn pointers_dangle_after_purge() {
    let src = "function f() {\n  local inner = 1\n  return pointer inner\n}\nlocal p = f()\np + 1";
    let error = assert_failure(src);
    assert!(matches!(root_cause(&error), RuntimeError::DanglingPointer { line: 6, .. }));
}

#[test]
fn pointer_targets_must_be_variables() {
    let error = assert_failure("local o = ctx.exec(\"local a = 1\")\npointer o.a");
    assert!(matches!(root_cause(&error), RuntimeError::UnsupportedPointerTarget { .. }));
    let error = assert_failure("pointer missing");
    assert!(matches!(root_cause(&error), RuntimeError::VariableNotFound { .. }));
}

#[test]
fn exist_checks_scope_and_globals() {
    assert_eq!(assert_success("exist undeclared"), "false");
    assert_eq!(assert_success("local a = 1\nexist a"), "true");
    assert_eq!(assert_success("exist console"), "true");
    let error = assert_failure("undeclared");
    assert!(matches!(root_cause(&error), RuntimeError::VariableNotFound { .. }));
}

#[test]
fn functions_bind_parameters() {
    let src = "function add(a, b = 10) {\n  return a + b\n}\n";
    assert_eq!(assert_success(&format!("{src}add(1)")), "11");
    assert_eq!(assert_success(&format!("{src}add(b = 2, 1)")), "3");
    assert_eq!(assert_success(&format!("{src}add(1, 2, 3)")), "3");
    assert_eq!(assert_success("local f = function (x) { return x * x }\nf(4)"), "16");
    assert_eq!(assert_success("function f() { 1 }\nf()"), "null");
    assert_eq!(assert_success("local n = 3\nn(1)"), "null");
}

#[test]
fn return_leaves_nested_blocks() {
    let src = "function sign(n) {\n  if n { return 1 }\n  return 0\n}\nsign(5) + sign(0)";
    assert_eq!(assert_success(src), "1");
    assert_eq!(assert_success("return 4\n5"), "4");
}

#[test]
fn shared_recursion_loses_outer_bindings() {
    let src = "function f(n) { local r = n; if n { f(n - 1) }; return r }; f(2)";
    let error = assert_failure(src);
    assert!(matches!(root_cause(&error), RuntimeError::VariableNotFound { name, .. } if name == "r"));

    let options = Options { call_scope: CallScope::Isolated,
                            ..Options::default() };
    assert_eq!(get_result(src, options).unwrap().to_string(), "2");
}

#[test]
fn isolated_recursion_computes() {
    let src = "function fact(n) {\n  if n - 1 { return n * fact(n - 1) }\n  return 1\n}\nfact(5)";
    let options = Options { call_scope: CallScope::Isolated,
                            ..Options::default() };
    assert_eq!(get_result(src, options).unwrap().to_string(), "120");
}

#[test]
fn runaway_recursion_is_a_diagnostic() {
    let src = "function forever(n) {\n  return forever(n + 1)\n}\nforever(0)";
    let error = assert_failure(src);
    assert_eq!(error, Diagnostic::Runtime(RuntimeError::RecursionLimit { limit: MAX_CALL_DEPTH }));
    assert_eq!(error.render(src, Language::En),
               format!("Runtime error: more than {MAX_CALL_DEPTH} nested calls\n"));

    let options = Options { call_scope: CallScope::Isolated,
                            ..Options::default() };
    assert!(get_result(src, options).is_err());
}

#[test]
fn deep_recursion_below_the_limit_runs() {
    let src = "function down(n) {\n  if n { return down(n - 1) }\n  return 0\n}\ndown(2000)";
    assert_eq!(assert_success(src), "0");
    assert_eq!(assert_success(&format!("{}1{}", "(".repeat(500), ")".repeat(500))), "1");
}

#[test]
fn functions_outliving_their_program_fail_cleanly() {
    let function = get_result("function f() { return 1 }\nf", Options::default()).unwrap();
    assert_eq!(function.call(&[], &Kwargs::new(), 0), Err(RuntimeError::ContextDropped));
}

#[test]
fn string_methods() {
    assert_eq!(assert_success("\"ab\".startswith(value = \"a\")"), "true");
    assert_eq!(assert_success("\"ab\".endswith(\"a\")"), "false");
    assert_eq!(assert_success("\"ab\".replace(old = \"a\", new = \"z\")"), "zb");
    assert_eq!(assert_success("\"aaa\".replace(\"a\", \"b\", 2)"), "bba");
    assert_eq!(assert_success("\" 42 \".number + 1"), "43");
    assert_eq!(assert_success("\"héllo\".length"), "5");
}

#[test]
fn number_attributes() {
    assert_eq!(assert_success("local n = 12.25\nn.floor"), "12");
    assert_eq!(assert_success("local n = 12.25\nn.length1"), "2");
    assert_eq!(assert_success("local n = 12.25\nn.length2"), "2");
    assert_eq!(assert_success("local n = 3\nn.is_int"), "true");
    assert_eq!(assert_success("local n = 3\nn.string + \"!\""), "3!");
}

#[test]
fn objects_through_ctx() {
    let src = "local o = ctx.exec(\"local count = 1\")\no.count = o.count + 1\no.missing = 3\n";
    assert_eq!(assert_success(&format!("{src}o.count")), "2");
    assert_eq!(assert_success(&format!("{src}o.missing")), "null");
    assert_eq!(assert_success("global g = 1\nlocal globals = ctx.globals\nglobals.g = 5\ng"), "5");
    assert_eq!(assert_success("global g = 1\nctx.globals.g = 5\ng"), "1");
}

#[test]
fn math_prelude() {
    assert_eq!(assert_success("Math.floor(2.5) + Math.ceil(x = 0.5)"), "3");
    assert_eq!(assert_success("Math.abs(-3)"), "3");
    assert_eq!(assert_success("Math.cos(0)"), "1");
}

#[test]
fn diagnostics_render_positions() {
    let src = "local a = 1\nb";
    let error = assert_failure(src);
    assert_eq!(error.render(src, Language::En),
               "Variable error: the variable 'b' does not exist line:2, column:1\nb\n^\n");
}

#[test]
fn call_failures_are_chained() {
    let src = "function f() {\n  missing\n}\nf()";
    let error = assert_failure(src);
    assert_eq!(error.render(src, Language::En),
               "Runtime error: call failed line:4, column:1\nf()\n^\nVariable error: the variable \
                'missing' does not exist line:2, column:3\n  missing\n  ^\n");
}

#[test]
fn syntax_errors_stop_before_running() {
    assert!(matches!(assert_failure("global g = 1\n12.5.3"), Diagnostic::Parse(_)));
    assert!(matches!(assert_failure("(1 + 2"), Diagnostic::Parse(_)));
    assert!(matches!(assert_failure("1 +"), Diagnostic::Parse(_)));
    assert!(matches!(assert_failure("local 5"), Diagnostic::Parse(_)));
    assert!(matches!(assert_failure(&vec!["1"; 5_000].join(" + ")), Diagnostic::Parse(_)));
}
