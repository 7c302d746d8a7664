//! # Analyzer Test Suite
//!
//! Tests cover scope construction, hoisting, reference resolution, capture
//! detection, `this` classification, risk patterns and module-shape
//! detection.

use crate::analyzer::{
    Analysis, Binding, BindingKind, ModuleShape, RiskFlag, ScopeKind, ThisKind, analyze,
};
use crate::diagnostics::{DiagnosticBus, Level};
use crate::parser::{ParseMode, parse};

/// Helper: parse and analyze a module source, returning analysis plus bus
fn analyze_source(source: &str) -> (Analysis, DiagnosticBus) {
    let mut bus = DiagnosticBus::new(false);
    let outcome = parse(source, "test.js", ParseMode::Module, true, None, &mut bus)
        .expect("parse should succeed");
    let analysis = analyze(&outcome.ast, "test.js", &mut bus).expect("analysis should succeed");
    (analysis, bus)
}

fn find_binding<'a>(analysis: &'a Analysis, name: &str) -> Option<&'a Binding> {
    analysis.bindings.iter().find(|b| b.name == name)
}

fn has_code(bus: &DiagnosticBus, code: &str) -> bool {
    bus.records().iter().any(|r| r.code == code)
}

mod scope_tests {
    use super::*;

    #[test]
    fn module_root_plus_function_scope() {
        let (analysis, _) = analyze_source("function foo() { let x = 1; }");
        assert_eq!(analysis.scopes.get(analysis.scopes.root()).kind, ScopeKind::Module);

        let foo = find_binding(&analysis, "foo").expect("foo binding");
        assert_eq!(foo.kind, BindingKind::Function);
        assert_eq!(foo.scope_id, analysis.scopes.root());

        let x = find_binding(&analysis, "x").expect("x binding");
        assert_eq!(x.kind, BindingKind::Let);
        assert_eq!(analysis.scopes.get(x.scope_id).kind, ScopeKind::Function);
    }

    #[test]
    fn blocks_open_block_scopes() {
        let (analysis, _) = analyze_source("{ let inner = 1; } let outer = 2;");
        let inner = find_binding(&analysis, "inner").expect("inner binding");
        assert_eq!(analysis.scopes.get(inner.scope_id).kind, ScopeKind::Block);
        let outer = find_binding(&analysis, "outer").expect("outer binding");
        assert_eq!(outer.scope_id, analysis.scopes.root());
    }

    #[test]
    fn for_of_const_binds_into_a_dedicated_scope() {
        let (analysis, _) = analyze_source("for (const x of arr) { x; }");
        let x = find_binding(&analysis, "x").expect("x binding");
        assert_eq!(x.kind, BindingKind::Const);
        assert_eq!(analysis.scopes.get(x.scope_id).kind, ScopeKind::Block);
        assert_eq!(x.references.len(), 1);
    }

    #[test]
    fn catch_parameter_gets_its_own_scope() {
        let (analysis, _) = analyze_source("try { a(); } catch (e) { e; }");
        let e = find_binding(&analysis, "e").expect("e binding");
        assert_eq!(e.kind, BindingKind::CatchParam);
        assert_eq!(analysis.scopes.get(e.scope_id).kind, ScopeKind::Catch);
        assert_eq!(e.references.len(), 1);
    }

    #[test]
    fn method_bodies_do_not_see_sibling_method_names() {
        let (analysis, bus) = analyze_source(
            "class C { a() { return 1; } b() { return a; } }",
        );
        // `a` inside b() must not resolve to the method name
        let a = find_binding(&analysis, "a").expect("method name binding");
        assert!(a.references.is_empty());
        assert!(has_code(&bus, "JSR-UNRESOLVED"));
    }
}

mod hoisting_tests {
    use super::*;

    #[test]
    fn var_in_block_hoists_to_function_scope() {
        let (analysis, _) = analyze_source("function f() { { var x = 1; } return x; }");
        let x = find_binding(&analysis, "x").expect("x binding");
        assert!(x.hoisted);
        assert_eq!(analysis.scopes.get(x.scope_id).kind, ScopeKind::Function);
        assert_eq!(x.references.len(), 1);
    }

    #[test]
    fn function_declarations_hoist_with_name() {
        let (analysis, bus) = analyze_source("use(); function use() {}");
        let use_fn = find_binding(&analysis, "use").expect("use binding");
        assert!(use_fn.hoisted);
        assert_eq!(use_fn.references.len(), 1);
        assert!(!has_code(&bus, "JSR-UNRESOLVED"));
    }

    #[test]
    fn var_redeclaration_merges() {
        let (analysis, bus) = analyze_source("var a = 1; var a = 2;");
        assert_eq!(
            analysis.bindings.iter().filter(|b| b.name == "a").count(),
            1
        );
        assert!(!has_code(&bus, "JSR-DUP-LET"));
    }
}

mod diagnostic_tests {
    use super::*;

    #[test]
    fn duplicate_let_is_an_error() {
        let (_, bus) = analyze_source("function f() { let x = 1; let x = 2; }");
        assert!(has_code(&bus, "JSR-DUP-LET"));
        assert!(bus.records().iter().any(|r| r.level == Level::Error));
    }

    #[test]
    fn inner_var_shadowing_block_binding_warns() {
        let (_, bus) = analyze_source("function f() { let x = 1; { var x = 2; } }");
        assert!(has_code(&bus, "JSR-VAR-SHADOW"));
    }

    #[test]
    fn unknown_global_reference_is_info() {
        let (_, bus) = analyze_source("mysteryName();");
        let record = bus
            .records()
            .iter()
            .find(|r| r.code == "JSR-UNRESOLVED")
            .expect("unresolved diagnostic");
        assert_eq!(record.level, Level::Info);
    }

    #[test]
    fn known_builtins_are_not_reported() {
        let (_, bus) = analyze_source("console.log(Math.max(1, 2));");
        assert!(!has_code(&bus, "JSR-UNRESOLVED"));
    }
}

mod this_classification_tests {
    use super::*;

    #[test]
    fn class_methods_bind_instance_this() {
        let (analysis, _) = analyze_source("class C { m() { return this; } }");
        let instance_count = analysis
            .this_kinds
            .values()
            .filter(|k| **k == ThisKind::Instance)
            .count();
        assert_eq!(instance_count, 1);
    }

    #[test]
    fn new_callee_is_classified_as_constructor() {
        let (analysis, _) = analyze_source(
            "function Point(x) { this.x = x; } let p = new Point(1);",
        );
        assert!(analysis.constructor_functions.contains("Point"));
        let constructor_count = analysis
            .this_kinds
            .values()
            .filter(|k| **k == ThisKind::Constructor)
            .count();
        assert_eq!(constructor_count, 1);
    }

    #[test]
    fn prototype_write_marks_constructor() {
        let (analysis, _) = analyze_source(
            "function Shape() {} Shape.prototype.area = function () { return 0; };",
        );
        assert!(analysis.constructor_functions.contains("Shape"));
    }

    #[test]
    fn variable_bound_function_expression_is_a_constructor() {
        let (analysis, _) = analyze_source(
            "var Point = function (x) { this.x = x; }; var p = new Point(1);",
        );
        assert!(analysis.constructor_functions.contains("Point"));
        assert!(analysis
            .this_kinds
            .values()
            .any(|k| *k == ThisKind::Constructor));
    }

    #[test]
    fn reassigned_function_expression_is_a_constructor() {
        let (analysis, _) = analyze_source(
            "let Maker; Maker = function () { this.ok = true; }; new Maker();",
        );
        assert!(analysis.constructor_functions.contains("Maker"));
        assert!(analysis
            .this_kinds
            .values()
            .any(|k| *k == ThisKind::Constructor));
    }

    #[test]
    fn whole_prototype_assignment_marks_the_constructor() {
        let (analysis, _) = analyze_source(
            "function Shape() {} Shape.prototype = { kind: 'shape' };",
        );
        assert!(analysis.constructor_functions.contains("Shape"));
    }

    #[test]
    fn prototype_method_body_sees_the_instance() {
        let (analysis, _) = analyze_source(
            "function Shape() {} Shape.prototype.area = function () { return this.w; };",
        );
        let constructor_count = analysis
            .this_kinds
            .values()
            .filter(|k| **k == ThisKind::Constructor)
            .count();
        // Shape itself plus the function assigned to its prototype
        assert_eq!(constructor_count, 2);
    }

    #[test]
    fn arrow_inherits_enclosing_method_this() {
        let (analysis, _) = analyze_source("class C { m() { let f = () => this; return f; } }");
        let instance_count = analysis
            .this_kinds
            .values()
            .filter(|k| **k == ThisKind::Instance)
            .count();
        // Method body plus the arrow inheriting from it
        assert_eq!(instance_count, 2);
    }

    #[test]
    fn module_level_arrow_has_no_this() {
        let (analysis, _) = analyze_source("let f = () => 1;");
        assert_eq!(analysis.this_kinds.values().next(), Some(&ThisKind::None));
    }

    #[test]
    fn top_level_this_warns() {
        let (outcome, bus) = analyze_source("let x = this;");
        assert!(has_code(&bus, "JSR-THIS"));
        assert!(outcome
            .risk_set
            .values()
            .any(|flags| flags.contains(&RiskFlag::TopLevelThis)));
    }

}

mod risk_tests {
    use super::*;

    #[test]
    fn eval_call_is_flagged() {
        let (analysis, bus) = analyze_source("eval('1 + 1');");
        assert!(has_code(&bus, "JSR-EVAL"));
        assert!(analysis
            .risk_set
            .values()
            .any(|flags| flags.contains(&RiskFlag::Eval)));
    }

    #[test]
    fn with_statement_is_flagged() {
        let mut bus = DiagnosticBus::new(false);
        let outcome = parse(
            "with (obj) { x = 1; }",
            "t.js",
            ParseMode::Script,
            true,
            None,
            &mut bus,
        )
        .expect("with parses in script mode");
        let analysis = analyze(&outcome.ast, "t.js", &mut bus).unwrap();
        assert!(has_code(&bus, "JSR-WITH"));
        assert!(analysis
            .scopes
            .iter()
            .any(|scope| scope.kind == ScopeKind::With));
    }

    #[test]
    fn arguments_usage_warns() {
        let (_, bus) = analyze_source("function f() { return arguments.length; }");
        assert!(has_code(&bus, "JSR-ARGUMENTS"));
    }

    #[test]
    fn dynamic_property_write_is_info() {
        let (analysis, bus) = analyze_source("function f(o, k) { o[k] = 1; }");
        assert!(has_code(&bus, "JSR-DYN-WRITE"));
        assert!(analysis
            .risk_set
            .values()
            .any(|flags| flags.contains(&RiskFlag::DynamicPropertyWrite)));
    }

    #[test]
    fn literal_key_write_is_not_flagged() {
        let (_, bus) = analyze_source("function f(o) { o['k'] = 1; }");
        assert!(!has_code(&bus, "JSR-DYN-WRITE"));
    }

    #[test]
    fn delete_computed_member_is_info() {
        let (_, bus) = analyze_source("function f(o, k) { delete o[k]; }");
        assert!(has_code(&bus, "JSR-DELETE"));
    }

    #[test]
    fn object_define_property_is_prototype_risk() {
        let (_, bus) = analyze_source("Object.defineProperty(o, 'x', {});");
        assert!(has_code(&bus, "JSR-PROTO"));
    }

    #[test]
    fn nested_destructuring_is_flagged() {
        let (analysis, bus) = analyze_source("const { a: { b } } = obj;");
        assert!(has_code(&bus, "JSR-DESTRUCTURE"));
        assert!(analysis
            .risk_set
            .values()
            .any(|flags| flags.contains(&RiskFlag::ComplexDestructuring)));
    }

    #[test]
    fn flat_destructuring_is_not_flagged() {
        let (_, bus) = analyze_source("const { a, b } = obj;");
        assert!(!has_code(&bus, "JSR-DESTRUCTURE"));
    }
}

mod module_shape_tests {
    use super::*;

    #[test]
    fn esm_shape_from_imports() {
        let (analysis, _) = analyze_source("import fs from 'fs'; export const x = 1;");
        assert_eq!(analysis.module_shape, ModuleShape::Esm);
    }

    #[test]
    fn commonjs_shape_from_require_and_exports() {
        let (analysis, _) = analyze_source(
            "const fs = require('fs'); module.exports = { fs };",
        );
        assert_eq!(analysis.module_shape, ModuleShape::CommonJs);
    }

    #[test]
    fn mixed_shape_warns() {
        let (analysis, bus) = analyze_source(
            "import fs from 'fs'; module.exports = fs;",
        );
        assert_eq!(analysis.module_shape, ModuleShape::Mixed);
        assert!(has_code(&bus, "JSR-MIXED-MODULE"));
    }

    #[test]
    fn script_shape_without_module_forms() {
        let mut bus = DiagnosticBus::new(false);
        let outcome = parse("var x = 1;", "t.js", ParseMode::Script, true, None, &mut bus).unwrap();
        let analysis = analyze(&outcome.ast, "t.js", &mut bus).unwrap();
        assert_eq!(analysis.module_shape, ModuleShape::Script);
    }
}

mod resolution_tests {
    use super::*;

    #[test]
    fn captured_bindings_are_marked() {
        let (analysis, _) = analyze_source(
            "function outer() { let n = 0; return function inner() { return n; }; }",
        );
        let n = find_binding(&analysis, "n").expect("n binding");
        assert!(n.captured);
    }

    #[test]
    fn same_function_references_are_not_captures() {
        let (analysis, _) = analyze_source("function f() { let n = 0; return n; }");
        let n = find_binding(&analysis, "n").expect("n binding");
        assert!(!n.captured);
    }

    #[test]
    fn assignments_are_counted() {
        let (analysis, _) = analyze_source("let a = 0; a = 1; a = 2; a;");
        let a = find_binding(&analysis, "a").expect("a binding");
        assert_eq!(a.assignments, 2);
        assert_eq!(a.references.len(), 3);
    }

    #[test]
    fn every_local_identifier_use_resolves_to_one_binding() {
        let (analysis, _) = analyze_source(
            "function f(a) { let b = a + 1; { const c = b; return c; } }",
        );
        for name in ["a", "b", "c"] {
            let binding = find_binding(&analysis, name).expect("binding exists");
            for reference in &binding.references {
                assert_eq!(
                    analysis.binding_map.get(reference).copied(),
                    Some(binding.id)
                );
            }
        }
    }
}
