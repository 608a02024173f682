use std::{fs, rc::Rc};

use tracing::debug;

use crate::{
    error::{Diagnostic, RuntimeError, diagnostic::SourceFile},
    interpreter::{
        evaluator::{
            core::{Context, EvalResult},
            scope::Scope,
        },
        parser::core::parse_source,
        value::{
            core::Value,
            function::{Function, Kwargs, argument, text_argument},
            object::Object,
        },
    },
};

/// Builds the `ctx` record of `context`.
///
/// - `exec(text, locals)` runs `text` with `locals` (a fresh object when
///   omitted) as its root frame and returns that object.
/// - `import.module(src)` runs the file `src` as a module and returns the
///   module's root frame.
/// - `import.func(src)` parses the file `src` into a function without
///   parameters.
/// - `globals` is the globals object itself.
///
/// Runtime errors inside the executed text are wrapped in
/// `RuntimeError::InFile`, so they render against that text. Syntax errors
/// are reported as a native error whose message is the rendered diagnostic.
///
/// The callables only hold a
/// [`WeakContext`](crate::interpreter::evaluator::core::WeakContext);
/// calling them after the context is gone fails with
/// `RuntimeError::ContextDropped`.
#[must_use]
pub fn object(context: &Context) -> Object {
    let exec_context = context.downgrade();
    let module_context = context.downgrade();
    let func_context = context.downgrade();

    let import = Object::constant(native_functions! {
        "module" => move |args, kwargs, _| import_module(&module_context.upgrade()?, args, kwargs),
        "func"   => move |args, kwargs, _| import_func(&func_context.upgrade()?, args, kwargs),
    });

    let mut entries = native_functions! {
        "exec" => move |args, kwargs, _| exec(&exec_context.upgrade()?, args, kwargs),
    };
    entries.push(("import", Value::Object(import)));
    entries.push(("globals", Value::Object(context.globals().clone())));
    Object::constant(entries)
}

/// `ctx.exec(text, locals)`.
///
/// # Example
/// ```
/// use kll::{config::Options, interpreter::evaluator::core::Context};
///
/// let context = Context::new(Options::default());
/// let scope = context.root_scope("__main__");
/// let value = context.eval("local module = ctx.exec(\"local x = 40 + 2\")\nmodule.x", &scope)
///                    .unwrap();
/// assert_eq!(value.to_string(), "42");
/// ```
fn exec(context: &Context, args: &[Value], kwargs: &Kwargs) -> EvalResult<Value> {
    let file = Rc::new(SourceFile { name: "ctx.exec".to_string(),
                                    text: text_argument(args, kwargs, 0, "text"), });
    let locals = match argument(args, kwargs, 1, "locals") {
        Some(Value::Object(locals)) => locals.clone(),
        _ => Object::new(),
    };
    run(context, &file, &Scope::for_file(locals.clone(), Rc::clone(&file)))?;
    Ok(Value::Object(locals))
}

/// `ctx.import.module(src)`.
///
/// The module shares the globals of the importing program. Its root frame
/// holds `__name__` set to `src`.
fn import_module(context: &Context, args: &[Value], kwargs: &Kwargs) -> EvalResult<Value> {
    let file = read_source(&text_argument(args, kwargs, 0, "src"))?;
    debug!(module = %file.name, "importing module");

    let scope = context.file_scope(&file);
    run(context, &file, &scope)?;
    Ok(Value::Object(scope.locals().clone()))
}

/// `ctx.import.func(src)`.
///
/// The file is parsed, not run; calling the returned function runs it in a
/// root frame of its own.
fn import_func(context: &Context, args: &[Value], kwargs: &Kwargs) -> EvalResult<Value> {
    let file = read_source(&text_argument(args, kwargs, 0, "src"))?;
    let nodes = parse_source(&file.text).map_err(|error| {
                                            native_diagnostic(&Diagnostic::from(error), &file, context)
                                        })?;
    Ok(Value::Function(Rc::new(Function { name:       None,
                                          parameters: Vec::new(),
                                          body:       Rc::from(nodes),
                                          scope:      context.file_scope(&file),
                                          context:    context.downgrade(), })))
}

/// Runs the text of `file` in `scope`.
fn run(context: &Context, file: &Rc<SourceFile>, scope: &Scope) -> EvalResult<()> {
    context.exec(&file.text, scope).map_err(|diagnostic| match diagnostic {
        Diagnostic::Runtime(error) => error.in_file(Some(Rc::clone(file))),
        Diagnostic::Parse(_) => native_diagnostic(&diagnostic, file, context),
    })
}

fn read_source(src: &str) -> EvalResult<Rc<SourceFile>> {
    let text = fs::read_to_string(src).map_err(|error| {
                                          RuntimeError::Io { message: format!("{src}: {error}") }
                                      })?;
    Ok(Rc::new(SourceFile { name: src.to_string(),
                            text }))
}

fn native_diagnostic(diagnostic: &Diagnostic, file: &SourceFile, context: &Context) -> RuntimeError {
    RuntimeError::Native { message: diagnostic.render(&file.text, context.options().language)
                                              .trim_end()
                                              .to_string(), }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, path::PathBuf, process, rc::Rc};

    use super::*;
    use crate::config::{Language, Options};

    fn script_path(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("kll-ctx-{}-{name}.kll", process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    fn src_of(path: &PathBuf) -> String {
        path.display().to_string().replace('\\', "/")
    }

    fn run(source: &str) -> String {
        let context = Context::new(Options::default());
        let scope = context.root_scope("__main__");
        context.eval(source, &scope).unwrap().to_string()
    }

    fn fail(source: &str) -> Diagnostic {
        let context = Context::new(Options::default());
        let scope = context.root_scope("__main__");
        context.eval(source, &scope).unwrap_err()
    }

    #[test]
    fn exec_fills_the_given_locals() {
        assert_eq!(run("local env = ctx.exec(\"\")\nctx.exec(\"local y = 3\", env)\nenv.y"), "3");
        assert_eq!(run("local env = ctx.exec(\"\")\nctx.exec(locals = env, text = \"local y = 4\")\nenv.y"),
                   "4");
    }

    #[test]
    fn exec_sees_globals() {
        assert_eq!(run("global g = 1\nctx.exec(\"g = 2\")\ng"), "2");
    }

    #[test]
    fn exec_failure_points_into_the_executed_text() {
        let error = fail("ctx.exec(\"1 + y\")");
        let Diagnostic::Runtime(RuntimeError::CallFailed { cause, .. }) = error else {
            panic!("expected a failed call, got {error:?}");
        };
        let RuntimeError::InFile { file: Some(file),
                                   cause, } = *cause
        else {
            panic!("expected a file marker");
        };
        assert_eq!(file.name, "ctx.exec");
        assert!(matches!(*cause, RuntimeError::VariableNotFound { line: 1, column: 5, .. }));
    }

    #[test]
    fn exec_syntax_error_is_reported_as_native_error() {
        let error = fail("ctx.exec(\"(1\")");
        let Diagnostic::Runtime(RuntimeError::CallFailed { cause, .. }) = error else {
            panic!("expected a failed call, got {error:?}");
        };
        let RuntimeError::Native { message } = *cause else {
            panic!("expected a native error");
        };
        assert!(message.starts_with("Syntax error: parenthesis is never closed line:1, column:1"));
    }

    #[test]
    fn globals_is_the_globals_object() {
        assert_eq!(run("global answer = 42\nctx.globals.answer"), "42");
    }

    #[test]
    fn import_module_returns_its_root_frame() {
        let path = script_path("module", "local value = 6 * 7\n");
        let src = src_of(&path);
        let output = run(&format!("local m = ctx.import.module(\"{src}\")\nm.value"));
        let name = run(&format!("local m = ctx.import.module(\"{src}\")\nm.__name__"));
        fs::remove_file(&path).unwrap();
        assert_eq!(output, "42");
        assert_eq!(name, src);
    }

    #[test]
    fn import_func_defers_running_the_file() {
        let path = script_path("func", "global ran = 1\nreturn 5\n");
        let src = src_of(&path);
        let before = run(&format!("global ran = 0\nctx.import.func(\"{src}\")\nran"));
        let after = run(&format!("global ran = 0\nlocal f = ctx.import.func(\"{src}\")\nf() + ran"));
        fs::remove_file(&path).unwrap();
        assert_eq!(before, "0");
        assert_eq!(after, "6");
    }

    #[test]
    fn imported_errors_render_against_their_file() {
        let path = script_path("failing", "local ok = 1\nmissing + ok\n");
        let module = script_path("failing-module", "function broken() {\n  missing\n}\n");
        let (src, module_src) = (src_of(&path), src_of(&module));

        let main = format!("local f = ctx.import.func(\"{src}\")\nf()");
        let func_text = fail(&main).render(&main, Language::En);
        let main_module = format!("local m = ctx.import.module(\"{module_src}\")\nm.broken()");
        let module_text = fail(&main_module).render(&main_module, Language::En);
        fs::remove_file(&path).unwrap();
        fs::remove_file(&module).unwrap();

        assert_eq!(func_text,
                   format!("Runtime error: call failed line:2, column:1\nf()\n^\nRuntime error: \
                            inside {src}\nVariable error: the variable 'missing' does not exist \
                            line:2, column:1\nmissing + ok\n^\n"));
        assert!(module_text.ends_with(&format!("Runtime error: inside {module_src}\nVariable \
                                                error: the variable 'missing' does not exist \
                                                line:2, column:3\n  missing\n  ^\n")),
                "{module_text}");
    }

    #[test]
    fn missing_module_is_an_io_error() {
        let error = fail("ctx.import.module(\"/nonexistent/kll/module.kll\")");
        let Diagnostic::Runtime(RuntimeError::CallFailed { cause, .. }) = error else {
            panic!("expected a failed call");
        };
        assert!(matches!(*cause, RuntimeError::Io { .. }));
    }

    #[test]
    fn dropping_the_context_frees_the_globals() {
        let context = Context::new(Options::default());
        let scope = context.root_scope("__main__");
        context.eval("global marker = 1\nfunction keep() { return ctx }\nglobal kept = keep", &scope)
               .unwrap();
        let marker = Rc::downgrade(&context.globals().cell("marker").unwrap());
        let ctx = Rc::downgrade(&context.globals().cell("ctx").unwrap());

        drop(scope);
        drop(context);
        assert!(marker.upgrade().is_none());
        assert!(ctx.upgrade().is_none());
    }

    #[test]
    fn ctx_fails_once_its_context_is_gone() {
        let context = Context::new(Options::default());
        let exec = Value::Object(object(&context)).get_attribute("exec").unwrap();
        drop(context);
        assert_eq!(exec.call(&[Value::from("1")], &Kwargs::new(), 0),
                   Err(RuntimeError::ContextDropped));
    }
}
