//! # Transformer Test Suite
//!
//! Tests drive source text through parse + analyze + transform and assert
//! on the printed target code: expression lowering through the runtime
//! helpers, statement rewrites (loops, switch cascades, labeled jumps,
//! try/catch), `this` and method handling, and the module-shape mapping.

use crate::analyzer::analyze;
use crate::diagnostics::DiagnosticBus;
use crate::generator::emit;
use crate::parser::{ParseMode, parse};
use crate::transformer::{ExportsRecord, transform};

/// Helper: full front half of the pipeline, returning printed body + bus
fn lower(source: &str) -> (String, DiagnosticBus) {
    let mut bus = DiagnosticBus::new(false);
    let outcome = parse(source, "test.js", ParseMode::Module, true, None, &mut bus)
        .expect("parse should succeed");
    let analysis = analyze(&outcome.ast, "test.js", &mut bus).expect("analysis should succeed");
    let transformation =
        transform(&outcome.ast, &analysis, "test.js", &mut bus).expect("transform should succeed");
    (emit(&transformation.module).code, bus)
}

fn lower_code(source: &str) -> String {
    lower(source).0
}

fn lower_exports(source: &str) -> ExportsRecord {
    let mut bus = DiagnosticBus::new(false);
    let outcome = parse(source, "test.js", ParseMode::Module, true, None, &mut bus).unwrap();
    let analysis = analyze(&outcome.ast, "test.js", &mut bus).unwrap();
    transform(&outcome.ast, &analysis, "test.js", &mut bus)
        .unwrap()
        .exports
}

fn has_code(bus: &DiagnosticBus, code: &str) -> bool {
    bus.records().iter().any(|r| r.code == code)
}

mod expression_tests {
    use super::*;

    #[test]
    fn plus_goes_through_the_coercion_helper() {
        assert!(lower_code("let s = a + b;").contains("s = js_plus(a, b)"));
    }

    #[test]
    fn numeric_literal_operands_use_the_direct_operator() {
        assert!(lower_code("let n = 1 + 2;").contains("n = 1 + 2"));
        assert!(lower_code("let m = 3 * 4;").contains("m = 3 * 4"));
    }

    #[test]
    fn strict_equality_is_direct() {
        assert!(lower_code("let e = a === b;").contains("e = a == b"));
        assert!(lower_code("let n = a !== b;").contains("n = a != b"));
    }

    #[test]
    fn loose_equality_uses_the_runtime() {
        assert!(lower_code("let e = a == b;").contains("e = loose_eq(a, b)"));
        assert!(lower_code("let n = a != b;").contains("n = not loose_eq(a, b)"));
    }

    #[test]
    fn logical_operators_select_an_operand() {
        assert!(lower_code("let x = a && b;").contains("x = js_and(a, b)"));
        assert!(lower_code("let y = a || b;").contains("y = js_or(a, b)"));
        assert!(lower_code("let z = a ?? b;").contains("z = js_nullish(a, b)"));
    }

    #[test]
    fn typeof_uses_the_runtime() {
        assert!(lower_code("let t = typeof a;").contains("t = js_typeof(a)"));
    }

    #[test]
    fn computed_member_access_goes_through_index_helpers() {
        assert!(lower_code("let v = o[k];").contains("v = js_getindex(o, k)"));
        assert!(lower_code("o[k] = 1;").contains("js_setindex(o, k, 1)"));
    }

    #[test]
    fn static_member_access_is_an_attribute() {
        assert!(lower_code("let v = o.field;").contains("v = o.field"));
    }

    #[test]
    fn null_and_undefined_are_distinct() {
        assert!(lower_code("let a = null;").contains("a = None"));
        assert!(lower_code("let b = undefined;").contains("b = JSUndefined"));
    }

    #[test]
    fn regex_literal_builds_a_runtime_regex() {
        assert!(lower_code("let r = /ab+c/gi;").contains("r = js_regex('ab+c', 'gi')"));
    }

    #[test]
    fn template_literal_concatenates_with_string_coercion() {
        let code = lower_code("let s = `Hello ${name}!`;");
        assert!(code.contains("s = 'Hello ' + js_str(name) + '!'"));
    }

    #[test]
    fn update_statement_reassigns_in_place() {
        assert!(lower_code("i++;").contains("i = js_plus(i, 1)"));
        assert!(lower_code("i--;").contains("i = js_sub(i, 1)"));
    }

    #[test]
    fn postfix_update_expression_yields_the_old_value() {
        let code = lower_code("let a = i++;");
        assert!(code.contains("_t1 = i"));
        assert!(code.contains("i = js_plus(_t1, 1)"));
        assert!(code.contains("a = _t1"));
    }

    #[test]
    fn compound_assignment_lowers_through_the_helper() {
        assert!(lower_code("i += 2;").contains("i = js_plus(i, 2)"));
        assert!(lower_code("i -= 1;").contains("i = js_sub(i, 1)"));
    }

    #[test]
    fn assignment_as_expression_is_lifted() {
        let code = lower_code("use(x = 5);");
        assert!(code.contains("x = 5"));
        assert!(code.contains("use(x)"));
    }

    #[test]
    fn conditional_expression_maps_directly() {
        assert!(lower_code("let m = c ? a : b;").contains("m = a if c else b"));
    }

    #[test]
    fn arrow_with_expression_body_becomes_a_lambda() {
        assert!(lower_code("let f = (a, b) => a + b;").contains("f = lambda a, b: js_plus(a, b)"));
    }

    #[test]
    fn arrow_with_block_body_is_lifted_to_a_def() {
        let code = lower_code("let g = (x) => { return x; };");
        assert!(code.contains("def _fn_1(x):"));
        assert!(code.contains("g = _fn_1"));
    }

    #[test]
    fn arrow_with_write_is_lifted_to_a_def() {
        let code = lower_code("let h = (x) => (total = x);");
        assert!(code.contains("def _fn_1(x):"));
    }

    #[test]
    fn function_expression_is_a_named_lifted_def() {
        let code = lower_code("let f = function helper(x) { return x; };");
        assert!(code.contains("def helper(x):"));
        assert!(code.contains("f = helper"));
    }

    #[test]
    fn object_literal_becomes_a_dict() {
        assert!(lower_code("let o = {a: 1, b: 2};").contains("o = {'a': 1, 'b': 2}"));
    }

    #[test]
    fn shorthand_properties_expand() {
        assert!(lower_code("let o = {a};").contains("o = {'a': a}"));
    }

    #[test]
    fn computed_keys_build_through_obj_set() {
        let code = lower_code("let o = {[k]: 1, a: 2};");
        assert!(code.contains("_t1 = {'a': 2}"));
        assert!(code.contains("obj_set(_t1, k, 1)"));
        assert!(code.contains("o = _t1"));
    }

    #[test]
    fn getters_degrade_to_plain_keys_with_a_diagnostic() {
        let (code, bus) = lower("let o = { get x() { return 1; } };");
        assert!(has_code(&bus, "JSR-GETTER"));
        assert!(code.contains("'x'"));
    }

    #[test]
    fn array_holes_become_the_sentinel_with_a_diagnostic() {
        let (code, bus) = lower("let a = [1, , 2];");
        assert!(code.contains("a = [1, JSUndefined, 2]"));
        assert!(has_code(&bus, "JSR-SPARSE-ARRAY"));
    }

    #[test]
    fn spread_arguments_unpack_through_the_runtime() {
        assert!(lower_code("f(...xs);").contains("f(*spread(xs))"));
        assert!(lower_code("let a = [1, ...xs];").contains("a = [1, *spread(xs)]"));
    }

    #[test]
    fn new_on_an_unknown_callee_uses_js_new() {
        assert!(lower_code("let d = new Foo(1);").contains("d = js_new(Foo, 1)"));
    }

    #[test]
    fn new_on_a_module_class_is_a_direct_call() {
        let code = lower_code("class Point {}\nlet p = new Point(1, 2);");
        assert!(code.contains("p = Point(1, 2)"));
        assert!(!code.contains("js_new"));
    }

    #[test]
    fn sequence_expression_runs_left_to_right() {
        let code = lower_code("let x = (a(), b());");
        let a_pos = code.find("a()").expect("a() emitted");
        let b_pos = code.find("x = b()").expect("b() emitted last");
        assert!(a_pos < b_pos);
    }

    #[test]
    fn delete_computed_member_uses_the_runtime() {
        assert!(lower_code("delete o[k];").contains("js_delete(o, k)"));
    }
}

mod statement_tests {
    use super::*;

    #[test]
    fn var_is_seeded_and_assigned_in_place() {
        let code = lower_code("function f(c) { if (c) { var y = 1; } return y; }");
        let seed = code.find("y = JSUndefined").expect("hoist seed");
        let assign = code.find("y = 1").expect("declaration-site assignment");
        assert!(seed < assign);
    }

    #[test]
    fn uninitialized_let_is_seeded_at_the_declaration_site() {
        assert!(lower_code("let x;").contains("x = JSUndefined"));
    }

    #[test]
    fn if_else_if_becomes_elif() {
        let code = lower_code("if (a) { f(); } else if (b) { g(); } else { h(); }");
        assert!(code.contains("if a:"));
        assert!(code.contains("elif b:"));
        assert!(code.contains("else:"));
    }

    #[test]
    fn c_style_for_becomes_while_with_trailing_update() {
        let code = lower_code("for (let i = 0; i < n; i += 1) { use(i); }");
        assert!(code.contains("i = 0"));
        assert!(code.contains("while i < n:"));
        let use_pos = code.find("use(i)").expect("body");
        let update_pos = code.rfind("i = js_plus(i, 1)").expect("update");
        assert!(use_pos < update_pos);
    }

    #[test]
    fn for_without_test_loops_forever() {
        assert!(lower_code("for (;;) { tick(); }").contains("while True:"));
    }

    #[test]
    fn for_in_iterates_keys() {
        assert!(lower_code("for (let k in obj) { use(k); }").contains("for k in js_keys(obj):"));
    }

    #[test]
    fn for_of_iterates_values() {
        assert!(lower_code("for (const x of arr) { use(x); }").contains("for x in js_iter(arr):"));
    }

    #[test]
    fn do_while_degrades_with_a_diagnostic() {
        let (code, bus) = lower("do { step(); } while (more());");
        assert!(code.contains("while True:"));
        assert!(code.contains("if not more():"));
        assert!(code.contains("break"));
        assert!(has_code(&bus, "JSR-DO-WHILE"));
        let step = code.find("step()").expect("body first");
        let test = code.find("if not more()").expect("test after body");
        assert!(step < test);
    }

    #[test]
    fn switch_evaluates_the_scrutinee_once() {
        let code = lower_code(
            "switch (x) { case 1: a(); break; case 2: b(); break; default: c(); }",
        );
        assert!(code.contains("_t1 = x"));
        assert!(code.contains("if _t1 == 1:"));
        assert!(code.contains("elif _t1 == 2:"));
        assert!(code.contains("else:"));
    }

    #[test]
    fn switch_preserves_fall_through() {
        let code = lower_code("switch (x) { case 1: a(); case 2: b(); break; default: c(); }");
        // The non-terminated first case cascades into the second case's body
        let first_branch = code
            .find("if _t1 == 1:")
            .expect("first branch");
        let a_pos = code.find("a()").expect("a()");
        let cascaded_b = code[first_branch..].find("b()").expect("cascaded b()");
        assert!(a_pos > first_branch);
        assert!(first_branch + cascaded_b > a_pos);
    }

    #[test]
    fn switch_true_uses_case_tests_as_conditions() {
        let code = lower_code(
            "switch (true) { case s >= 90: g(); break; case s >= 80: h(); break; default: i(); }",
        );
        assert!(code.contains("if s >= 90:"));
        assert!(code.contains("elif s >= 80:"));
        assert!(!code.contains("_t1"));
    }

    #[test]
    fn try_catch_unwraps_the_thrown_value() {
        let code = lower_code(
            "function risky(fn) { try { return fn(); } catch (err) { console.log(err.message); throw err; } finally { console.log('cleanup'); } }",
        );
        assert!(code.contains("except JsError as _t1:"));
        assert!(code.contains("err = _t1.value"));
        assert!(code.contains("raise JsError(err)"));
        assert!(code.contains("finally:"));
        assert!(code.contains("console.log('cleanup')"));
    }

    #[test]
    fn try_finally_without_catch_is_native() {
        let code = lower_code("try { a(); } finally { b(); }");
        assert!(code.contains("try:"));
        assert!(!code.contains("except"));
        assert!(code.contains("finally:"));
    }

    #[test]
    fn throw_wraps_any_value() {
        assert!(lower_code("throw 'bad';").contains("raise JsError('bad')"));
    }

    #[test]
    fn labeled_break_is_rewritten_with_a_flag() {
        let (code, bus) = lower(
            "outer: for (let i = 0; i < 3; i += 1) { for (let j = 0; j < 3; j += 1) { if (stop) { break outer; } } }",
        );
        assert!(code.contains("_brk_outer = False"));
        assert!(code.contains("_brk_outer = True"));
        assert!(code.contains("if _brk_outer:"));
        assert!(has_code(&bus, "JSR-LABELED"));
    }

    #[test]
    fn labeled_continue_resets_its_flag_at_the_labeled_loop() {
        let code = lower_code(
            "outer: for (let i = 0; i < 3; i += 1) { for (let j = 0; j < 3; j += 1) { continue outer; } }",
        );
        assert!(code.contains("_cnt_outer = False"));
        assert!(code.contains("_cnt_outer = True"));
        assert!(code.contains("continue"));
    }

    #[test]
    fn unused_labels_are_dropped() {
        let code = lower_code("skip: { use(); }");
        assert!(!code.contains("skip"));
        assert!(code.contains("use()"));
    }

    #[test]
    fn destructuring_declaration_flattens_through_a_temporary() {
        let code = lower_code("const {a, b} = obj;");
        assert!(code.contains("_t1 = obj"));
        assert!(code.contains("a = js_getindex(_t1, 'a')"));
        assert!(code.contains("b = js_getindex(_t1, 'b')"));
    }

    #[test]
    fn array_destructuring_uses_indices() {
        let code = lower_code("const [x, y] = pair;");
        assert!(code.contains("x = js_getindex(_t1, 0)"));
        assert!(code.contains("y = js_getindex(_t1, 1)"));
    }

    #[test]
    fn destructuring_defaults_apply_on_undefined() {
        let code = lower_code("const {a = 1} = obj;");
        assert!(code.contains("if a is JSUndefined:"));
        assert!(code.contains("a = 1"));
    }

    #[test]
    fn directive_prologues_are_dropped() {
        let code = lower_code("'use strict';\nlet x = 1;");
        assert!(!code.contains("use strict"));
        assert!(code.contains("x = 1"));
    }
}

mod function_tests {
    use super::*;

    #[test]
    fn default_parameters_map_to_target_defaults() {
        assert!(lower_code("function f(a, b = 2) { return a; }").contains("def f(a, b=2):"));
    }

    #[test]
    fn rest_parameters_become_a_star_parameter() {
        let code = lower_code("function f(...xs) { return xs; }");
        assert!(code.contains("def f(*xs):"));
        assert!(code.contains("xs = list(xs)"));
    }

    #[test]
    fn empty_function_body_is_pass() {
        assert!(lower_code("function noop() {}").contains("pass"));
    }

    #[test]
    fn constructor_function_takes_a_this_parameter() {
        let code = lower_code("function Point(x) { this.x = x; }\nvar p = new Point(1);");
        assert!(code.contains("def Point(this, x):"));
        assert!(code.contains("this.x = x"));
        assert!(code.contains("p = js_new(Point, 1)"));
    }

    #[test]
    fn constructor_function_expression_takes_a_this_parameter() {
        let code = lower_code("var Point = function (x) { this.x = x; };\nvar p = new Point(1);");
        assert!(code.contains("def Point(this, x):"));
        assert!(code.contains("this.x = x"));
        assert!(code.contains("p = js_new(Point, 1)"));
    }

    #[test]
    fn prototype_method_function_sees_the_instance() {
        let code = lower_code(
            "function Shape() {}\nShape.prototype.area = function () { return this.w; };",
        );
        assert!(code.contains("def _fn_1(this):"));
        assert!(code.contains("return this.w"));
    }

    #[test]
    fn anonymous_function_binding_names_the_def() {
        let code = lower_code("let handler = function (e) { return e; };");
        assert!(code.contains("def handler(e):"));
        assert!(!code.contains("_fn_"));
    }

    #[test]
    fn class_methods_bind_self_and_rewrite_this() {
        let code = lower_code(
            "class Person { constructor(name) { this.name = name; } greet() { return `Hello ${this.name}`; } }",
        );
        assert!(code.contains("class Person:"));
        assert!(code.contains("def __init__(self, name):"));
        assert!(code.contains("self.name = name"));
        assert!(code.contains("def greet(self):"));
        assert!(code.contains("return 'Hello ' + js_str(self.name)"));
    }

    #[test]
    fn class_extends_carries_the_base() {
        assert!(lower_code("class Dog extends Animal {}").contains("class Dog(Animal):"));
    }

    #[test]
    fn static_methods_drop_the_instance_parameter() {
        let code = lower_code("class MathUtil { static square(x) { return x * x; } }");
        assert!(code.contains("def square(x):"));
    }

    #[test]
    fn constructor_return_values_are_dropped() {
        let code = lower_code("class C { constructor() { return 42; } }");
        assert!(code.contains("return\n"));
        assert!(!code.contains("return 42"));
    }

    #[test]
    fn arrows_close_over_the_enclosing_self() {
        let code = lower_code(
            "class C { constructor() { this.n = 1; } bump() { let f = () => this.n; return f; } }",
        );
        assert!(code.contains("lambda: self.n"));
    }

    #[test]
    fn reserved_names_get_the_stable_suffix() {
        let code = lower_code("let print = 1; use(print);");
        assert!(code.contains("print_js = 1"));
        assert!(code.contains("use(print_js)"));
    }

    #[test]
    fn facade_globals_are_not_renamed() {
        let code = lower_code("console.log(Math.max(1, 2));");
        assert!(code.contains("console.log(Math.max(1, 2))"));
    }
}

mod module_mapping_tests {
    use super::*;

    #[test]
    fn default_import_pulls_the_default_name() {
        assert!(lower_code("import X from 'm';").contains("from m import _default as X"));
    }

    #[test]
    fn named_imports_map_to_from_imports() {
        assert!(lower_code("import {a, b as c} from 'm';").contains("from m import a, b as c"));
    }

    #[test]
    fn namespace_import_aliases_the_module() {
        assert!(lower_code("import * as ns from 'm';").contains("import m as ns"));
    }

    #[test]
    fn side_effect_import_is_bare() {
        assert!(lower_code("import 'setup-module';").contains("import setup_module"));
    }

    #[test]
    fn module_specifiers_sanitize_to_identifiers() {
        assert!(lower_code("import {a} from './utils.js';").contains("from utils import a"));
    }

    #[test]
    fn export_default_lands_in_the_conventional_name() {
        let code = lower_code("export default function main() { return 1; }");
        assert!(code.contains("def main():"));
        assert!(code.contains("_default = main"));
        let exports = lower_exports("export default function main() { return 1; }");
        assert!(exports.has_default);
    }

    #[test]
    fn named_exports_join_the_record() {
        let exports = lower_exports("export const x = 1; export function f() {}");
        assert_eq!(exports.names, vec!["x".to_string(), "f".to_string()]);
    }

    #[test]
    fn export_specifiers_join_the_record() {
        let exports = lower_exports("const a = 1; const b = 2; export { a, b };");
        assert_eq!(exports.names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn require_declaration_becomes_an_import() {
        assert!(lower_code("const fs = require('fs');").contains("import fs"));
    }

    #[test]
    fn aliased_require_uses_an_import_alias() {
        assert!(lower_code("const reader = require('fs');").contains("import fs as reader"));
    }

    #[test]
    fn destructured_require_flattens_to_a_from_import() {
        assert!(
            lower_code("const {readFile, writeFile} = require('fs');")
                .contains("from fs import readFile, writeFile")
        );
    }

    #[test]
    fn require_in_expression_position_hoists_an_alias() {
        let code = lower_code("let lib = wrap(require('util'));");
        assert!(code.contains("import util as _m_1"));
        assert!(code.contains("wrap(_m_1)"));
    }

    #[test]
    fn module_exports_assignment_feeds_the_record() {
        let (code, _) = lower("const a = 1; const b = 2; module.exports = { a, b };");
        assert!(code.contains("_module_exports = {'a': a, 'b': b}"));
        let exports = lower_exports("const a = 1; const b = 2; module.exports = { a, b };");
        assert_eq!(exports.names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn exports_property_assignment_surfaces_a_binding() {
        let code = lower_code("exports.answer = 42;");
        assert!(code.contains("answer = 42"));
        let exports = lower_exports("exports.answer = 42;");
        assert_eq!(exports.names, vec!["answer".to_string()]);
    }
}

mod degradation_tests {
    use super::*;

    #[test]
    fn unsupported_constructs_warn_and_leave_a_todo() {
        let (code, bus) = lower("async function f() { await g(); }");
        assert!(has_code(&bus, "JSR-UNSUPPORTED"));
        assert!(code.contains("TODO"));
    }

    #[test]
    fn eval_keeps_the_call_but_warns() {
        let (code, bus) = lower("eval('x');");
        assert!(has_code(&bus, "JSR-EVAL"));
        assert!(code.contains("eval('x')"));
    }

    #[test]
    fn with_statement_body_is_kept_with_a_todo() {
        let mut bus = DiagnosticBus::new(false);
        let outcome = parse(
            "with (obj) { use(); }",
            "test.js",
            ParseMode::Script,
            true,
            None,
            &mut bus,
        )
        .unwrap();
        let analysis = analyze(&outcome.ast, "test.js", &mut bus).unwrap();
        let transformation = transform(&outcome.ast, &analysis, "test.js", &mut bus).unwrap();
        let code = emit(&transformation.module).code;
        assert!(code.contains("use()"));
        assert!(code.contains("TODO"));
        assert!(has_code(&bus, "JSR-WITH"));
    }
}
