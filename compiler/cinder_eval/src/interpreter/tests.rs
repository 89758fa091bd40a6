#![allow(clippy::unwrap_used, clippy::expect_used)]

use cinder_ir::{DeclRange, StringInterner, WrapPolicy};
use cinder_sema::{check_increment, CheckOptions, CompilationContext, PendingIncrement};
use pretty_assertions::assert_eq;

use super::Interpreter;
use crate::{buffer_handler, EvalError, EvalErrorKind, Globals, SharedPrintHandler, Value};

struct Harness {
    interner: StringInterner,
    ctx: CompilationContext,
    globals: Globals,
    print: SharedPrintHandler,
    options: CheckOptions,
    max_depth: usize,
    wrappers: u32,
}

impl Harness {
    fn new() -> Self {
        Harness {
            interner: StringInterner::new(),
            ctx: CompilationContext::new(),
            globals: Globals::new(),
            print: buffer_handler(),
            options: CheckOptions::default(),
            max_depth: super::DEFAULT_MAX_DEPTH,
            wrappers: 0,
        }
    }

    fn commit(&mut self, source: &str, policy: WrapPolicy) -> DeclRange {
        let text = match policy {
            WrapPolicy::Wrap => {
                self.wrappers += 1;
                format!("void __cinder_wrapper_{}() {{\n{source}\n}}", self.wrappers)
            }
            WrapPolicy::Raw => source.to_owned(),
        };
        let tokens = cinder_lexer::lex(&text, &self.interner).tokens;
        let mut pending = PendingIncrement::new(&self.ctx);
        let parsed = cinder_parse::parse(&tokens, &self.interner, &pending, policy).unwrap();
        let diags = check_increment(&parsed, &mut pending, &self.interner, self.options);
        assert!(!diags.has_errors(), "unexpected errors in {source:?}: {diags:?}");
        let staged = pending.finish();
        self.ctx.commit(staged).unwrap()
    }

    /// Execute every declaration of `range`, returning the last captured value.
    fn execute(&mut self, range: DeclRange) -> Result<Option<Value>, EvalError> {
        let mut interp = Interpreter::new(&self.ctx, &self.interner, &mut self.globals, &self.print)
            .with_max_depth(self.max_depth);
        let mut value = None;
        for decl in self.ctx.decls_in(range) {
            if let Some(v) = interp.execute(decl)? {
                value = Some(v);
            }
        }
        Ok(value)
    }

    fn run(&mut self, source: &str, policy: WrapPolicy) -> Result<Option<Value>, EvalError> {
        let range = self.commit(source, policy);
        self.execute(range)
    }

    fn value(&mut self, source: &str) -> Value {
        self.run(source, WrapPolicy::Wrap).unwrap().unwrap()
    }

    fn raw(&mut self, source: &str) {
        self.run(source, WrapPolicy::Raw).unwrap();
    }

    fn fails(&mut self, source: &str) -> EvalError {
        self.run(source, WrapPolicy::Wrap).unwrap_err()
    }
}

#[test]
fn test_expression_value() {
    let mut h = Harness::new();
    assert_eq!(h.value("1 + 2 * 3"), Value::Int(7));
    assert_eq!(h.value("7 / 2.0"), Value::Double(3.5));
    assert_eq!(h.value("'a' + 1 > 'a'"), Value::Bool(true));
}

#[test]
fn test_statements_without_value() {
    let mut h = Harness::new();
    assert_eq!(h.run("int unused = 3;", WrapPolicy::Wrap).unwrap(), None);
}

#[test]
fn test_globals_persist_across_increments() {
    let mut h = Harness::new();
    h.run("int x = 5;", WrapPolicy::Wrap).unwrap();
    assert_eq!(h.value("x * 2"), Value::Int(10));
    h.run("x += 3;", WrapPolicy::Wrap).unwrap();
    assert_eq!(h.value("x"), Value::Int(8));
}

#[test]
fn test_raw_variable_initializer_runs() {
    let mut h = Harness::new();
    h.raw("double ratio = 3 / 4.0;");
    assert_eq!(h.value("ratio"), Value::Double(0.75));
}

#[test]
fn test_recursive_function() {
    let mut h = Harness::new();
    h.raw("int fact(int n) { return n <= 1 ? 1 : n * fact(n - 1); }");
    assert_eq!(h.value("fact(10)"), Value::Int(3_628_800));
}

#[test]
fn test_loops_and_jumps() {
    let mut h = Harness::new();
    let sum = h.value(
        "int s = 0;\n\
         for (int i = 0; i < 10; i++) { if (i == 5) continue; if (i == 8) break; s += i; }\n\
         s",
    );
    assert_eq!(sum, Value::Int(23));
    assert_eq!(h.value("int n = 0; do { n++; } while (n < 3); n"), Value::Int(3));
    assert_eq!(h.value("int k = 10; while (k > 1) k = k / 2; k"), Value::Int(1));
}

#[test]
fn test_compound_assignment_converts_to_place_type() {
    let mut h = Harness::new();
    assert_eq!(h.value("int i = 7; i /= 2; i"), Value::Int(3));
    assert_eq!(h.value("double d = 1; d /= 4; d"), Value::Double(0.25));
    assert_eq!(h.value("char c = 'a'; c++; c"), Value::Char('b'));
    assert_eq!(h.value("int p = 1; int q = p++; q * 10 + p"), Value::Int(12));
}

#[test]
fn test_printf_and_puts_output() {
    let mut h = Harness::new();
    h.run("printf(\"%d-%s\\n\", 42, \"ok\");\nputs(\"done\");", WrapPolicy::Wrap)
        .unwrap();
    assert_eq!(h.print.get_output(), "42-ok\ndone\n");
}

#[test]
fn test_division_by_zero_has_span() {
    let mut h = Harness::new();
    h.run("int z = 0;", WrapPolicy::Wrap).unwrap();
    let err = h.fails("10 / z");
    assert_eq!(err.kind, EvalErrorKind::DivisionByZero);
    assert!(err.span.is_some());
}

#[test]
fn test_recursion_limit() {
    let mut h = Harness::new();
    h.max_depth = 64;
    h.raw("int down(int n) { return down(n + 1); }");
    assert_eq!(h.fails("down(0)").kind, EvalErrorKind::RecursionLimit(64));
}

#[test]
fn test_prototype_reaches_later_definition() {
    let mut h = Harness::new();
    h.raw("int twice(int x);");
    h.raw("int apply() { return twice(4); }");
    assert!(matches!(
        h.fails("apply()").kind,
        EvalErrorKind::UndefinedFunction(_)
    ));
    h.raw("int twice(int x) { return x * 2; }");
    assert_eq!(h.value("apply()"), Value::Int(8));
}

#[test]
fn test_redefinition_keeps_bound_calls() {
    let mut h = Harness::new();
    h.raw("int f() { return 1; }");
    h.raw("int g() { return f(); }");
    h.run("auto old = f;", WrapPolicy::Wrap).unwrap();
    h.raw("int f() { return 2; }");
    assert_eq!(h.value("f()"), Value::Int(2));
    assert_eq!(h.value("g()"), Value::Int(1));
    assert_eq!(h.value("old()"), Value::Int(1));
}

#[test]
fn test_throw_reports_value() {
    let mut h = Harness::new();
    assert_eq!(
        h.fails("throw 5;").kind,
        EvalErrorKind::Thrown(Some("5".to_owned()))
    );
    assert_eq!(h.fails("throw;").kind, EvalErrorKind::Thrown(None));
}

#[test]
fn test_deferred_names_resolve_at_run_time() {
    let mut h = Harness::new();
    h.options = CheckOptions {
        dynamic_lookup: true,
    };
    let range = h.commit("later + 1", WrapPolicy::Wrap);
    assert!(matches!(
        h.execute(range).unwrap_err().kind,
        EvalErrorKind::UnresolvedName(_)
    ));
    h.raw("int later = 41;");
    assert_eq!(h.execute(range).unwrap(), Some(Value::Int(42)));
}

#[test]
fn test_missing_return_yields_zero() {
    let mut h = Harness::new();
    h.raw("int maybe(int x) { if (x) return 5; }");
    assert_eq!(h.value("maybe(1)"), Value::Int(5));
    assert_eq!(h.value("maybe(0)"), Value::Int(0));
}

#[test]
fn test_logical_operators_short_circuit() {
    let mut h = Harness::new();
    h.raw("int hits = 0;");
    h.raw("bool touch() { hits++; return true; }");
    assert_eq!(h.value("false && touch()"), Value::Bool(false));
    assert_eq!(h.value("true || touch()"), Value::Bool(true));
    assert_eq!(h.value("hits"), Value::Int(0));
    assert_eq!(h.value("true && touch()"), Value::Bool(true));
    assert_eq!(h.value("hits"), Value::Int(1));
}

#[test]
fn test_enumerators_are_integers() {
    let mut h = Harness::new();
    h.raw("enum Color { Red, Green = 5, Blue };");
    assert_eq!(h.value("Blue"), Value::Int(6));
    assert_eq!(h.value("Color c = Green; c == Green"), Value::Bool(true));
}
