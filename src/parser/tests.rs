//! # Parser Front-End Test Suite
//!
//! Tests cover the OXC bridge conversion into the owned source AST, content
//! hashing, BOM handling, tolerant vs. strict error behavior, and the AST
//! cache contract.

use crate::diagnostics::DiagnosticBus;
use crate::parser::ast_types::*;
use crate::parser::{ParseMode, ParseOutcome, content_hash, parse, strip_bom};

/// Helper: parse a module source with no cache, panicking on stage failure
fn parse_module(source: &str) -> ParseOutcome {
    let mut bus = DiagnosticBus::new(false);
    parse(source, "test.js", ParseMode::Module, true, None, &mut bus)
        .expect("parse should succeed")
}

fn first_statement(source: &str) -> Statement {
    parse_module(source).ast.body.into_iter().next().expect("one statement")
}

mod conversion_tests {
    use super::*;

    #[test]
    fn converts_let_declaration() {
        let stmt = first_statement("let x = 5;");
        match stmt {
            Statement::VariableDeclaration { declarations, kind, .. } => {
                assert_eq!(kind, VariableDeclarationKind::Let);
                assert_eq!(declarations.len(), 1);
                match &declarations[0].id {
                    Pattern::Identifier(id) => assert_eq!(id.name, "x"),
                    other => panic!("expected identifier pattern, got {other:?}"),
                }
                assert!(matches!(
                    declarations[0].init,
                    Some(Expression::Literal(Literal::Number { value, .. })) if value == 5.0
                ));
            }
            other => panic!("expected variable declaration, got {other:?}"),
        }
    }

    #[test]
    fn converts_class_with_constructor_and_method() {
        let stmt = first_statement(
            "class Person { constructor(name) { this.name = name; } greet() { return 1; } }",
        );
        let class = match stmt {
            Statement::ClassDeclaration(class) => class,
            other => panic!("expected class declaration, got {other:?}"),
        };
        assert_eq!(class.id.as_ref().map(|i| i.name.as_str()), Some("Person"));
        assert_eq!(class.body.len(), 2);
        match &class.body[0] {
            ClassElement::MethodDefinition { kind, value, .. } => {
                assert_eq!(*kind, MethodKind::Constructor);
                assert_eq!(value.params.len(), 1);
            }
            other => panic!("expected constructor, got {other:?}"),
        }
        match &class.body[1] {
            ClassElement::MethodDefinition { kind, key, .. } => {
                assert_eq!(*kind, MethodKind::Method);
                assert_eq!(key.static_name(), Some("greet"));
            }
            other => panic!("expected method, got {other:?}"),
        }
    }

    #[test]
    fn converts_template_literal_with_cooked_values() {
        let stmt = first_statement("let s = `Hello ${name}!`;");
        let init = match stmt {
            Statement::VariableDeclaration { declarations, .. } => {
                declarations.into_iter().next().unwrap().init.unwrap()
            }
            other => panic!("expected declaration, got {other:?}"),
        };
        match init {
            Expression::TemplateLiteral { quasis, expressions, .. } => {
                assert_eq!(quasis.len(), 2);
                assert_eq!(quasis[0].value, "Hello ");
                assert_eq!(quasis[1].value, "!");
                assert!(quasis[1].tail);
                assert_eq!(expressions.len(), 1);
            }
            other => panic!("expected template literal, got {other:?}"),
        }
    }

    #[test]
    fn converts_for_of_with_const_binding() {
        let stmt = first_statement("for (const x of arr) { use(x); }");
        match stmt {
            Statement::ForOfStatement { left, right, .. } => {
                match left {
                    ForHead::Declaration { kind, id } => {
                        assert_eq!(kind, VariableDeclarationKind::Const);
                        assert!(matches!(id, Pattern::Identifier(id) if id.name == "x"));
                    }
                    other => panic!("expected declaration head, got {other:?}"),
                }
                assert_eq!(right.as_identifier_name(), Some("arr"));
            }
            other => panic!("expected for-of, got {other:?}"),
        }
    }

    #[test]
    fn converts_switch_cases_and_default() {
        let stmt = first_statement(
            "switch (x) { case 1: a(); break; default: b(); }",
        );
        match stmt {
            Statement::SwitchStatement { cases, .. } => {
                assert_eq!(cases.len(), 2);
                assert!(cases[0].test.is_some());
                assert!(cases[1].test.is_none());
                assert_eq!(cases[0].consequent.len(), 2);
            }
            other => panic!("expected switch, got {other:?}"),
        }
    }

    #[test]
    fn converts_try_catch_finally() {
        let stmt = first_statement("try { a(); } catch (e) { b(e); } finally { c(); }");
        match stmt {
            Statement::TryStatement { block, handler, finalizer, .. } => {
                assert_eq!(block.len(), 1);
                let handler = handler.expect("catch clause");
                assert!(matches!(
                    handler.param,
                    Some(Pattern::Identifier(ref id)) if id.name == "e"
                ));
                assert_eq!(finalizer.expect("finally block").len(), 1);
            }
            other => panic!("expected try statement, got {other:?}"),
        }
    }

    #[test]
    fn converts_array_holes_and_spread() {
        let stmt = first_statement("let a = [1, , ...rest];");
        let init = match stmt {
            Statement::VariableDeclaration { declarations, .. } => {
                declarations.into_iter().next().unwrap().init.unwrap()
            }
            other => panic!("expected declaration, got {other:?}"),
        };
        match init {
            Expression::Array { elements, .. } => {
                assert_eq!(elements.len(), 3);
                assert!(matches!(elements[0], ArrayElement::Expression(_)));
                assert!(matches!(elements[1], ArrayElement::Hole { .. }));
                assert!(matches!(elements[2], ArrayElement::Spread { .. }));
            }
            other => panic!("expected array literal, got {other:?}"),
        }
    }

    #[test]
    fn converts_default_and_rest_parameters() {
        let stmt = first_statement("function f(a, b = 2, ...rest) {}");
        let func = match stmt {
            Statement::FunctionDeclaration(func) => func,
            other => panic!("expected function declaration, got {other:?}"),
        };
        assert_eq!(func.params.len(), 3);
        assert!(func.params[0].default.is_none());
        assert!(func.params[1].default.is_some());
        assert!(func.params[2].rest);
    }

    #[test]
    fn converts_commonjs_require_call_as_plain_call() {
        let stmt = first_statement("const fs = require('fs');");
        match stmt {
            Statement::VariableDeclaration { declarations, .. } => {
                match &declarations[0].init {
                    Some(Expression::Call { callee, .. }) => {
                        assert_eq!(callee.as_identifier_name(), Some("require"));
                    }
                    other => panic!("expected call initializer, got {other:?}"),
                }
            }
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn marks_generators_via_flag_and_await_as_unsupported() {
        let outcome = parse_module("async function f() { await g(); }");
        match &outcome.ast.body[0] {
            Statement::FunctionDeclaration(func) => {
                assert!(func.is_async);
                assert!(matches!(
                    func.body[0],
                    Statement::ExpressionStatement {
                        expression: Expression::Unsupported { .. },
                        ..
                    }
                ));
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn spans_carry_one_based_lines() {
        let outcome = parse_module("let a = 1;\nlet b = 2;\n");
        assert_eq!(outcome.ast.body[0].span().line, 1);
        assert_eq!(outcome.ast.body[1].span().line, 2);
        assert_eq!(outcome.ast.body[1].span().column, 0);
    }
}

mod hashing_tests {
    use super::*;

    #[test]
    fn identical_inputs_hash_identically() {
        assert_eq!(
            content_hash("let x = 1;", ParseMode::Module),
            content_hash("let x = 1;", ParseMode::Module)
        );
    }

    #[test]
    fn trailing_whitespace_changes_the_hash() {
        assert_ne!(
            content_hash("let x = 1;", ParseMode::Module),
            content_hash("let x = 1; ", ParseMode::Module)
        );
    }

    #[test]
    fn mode_is_part_of_the_key() {
        assert_ne!(
            content_hash("let x = 1;", ParseMode::Module),
            content_hash("let x = 1;", ParseMode::Script)
        );
    }

    #[test]
    fn bom_is_stripped_before_hashing() {
        assert_eq!(strip_bom("\u{feff}let x;"), "let x;");
        let with_bom = {
            let mut bus = DiagnosticBus::new(false);
            parse("\u{feff}let x;", "a.js", ParseMode::Module, true, None, &mut bus).unwrap()
        };
        let without = parse_module("let x;");
        assert_eq!(with_bom.hash, without.hash);
    }
}

mod error_tests {
    use super::*;

    #[test]
    fn tolerant_mode_records_diagnostics() {
        let mut bus = DiagnosticBus::new(false);
        let _ = parse("let x = ;", "bad.js", ParseMode::Module, true, None, &mut bus);
        assert!(!bus.is_empty());
        assert!(bus.records().iter().any(|r| r.code == "JSR-PARSE"));
    }

    #[test]
    fn strict_mode_aborts_on_first_error() {
        let mut bus = DiagnosticBus::new(false);
        let result = parse("let x = ;", "bad.js", ParseMode::Module, false, None, &mut bus);
        assert!(result.is_err());
    }

    #[test]
    fn valid_input_produces_no_diagnostics() {
        let mut bus = DiagnosticBus::new(false);
        let outcome = parse("let x = 1;", "ok.js", ParseMode::Module, false, None, &mut bus);
        assert!(outcome.is_ok());
        assert!(bus.is_empty());
    }
}

mod cache_tests {
    use super::*;
    use crate::parser::cache::AstCache;

    #[test]
    fn second_parse_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AstCache::new(dir.path());
        let mut bus = DiagnosticBus::new(false);

        let first = parse("let x = 1;", "a.js", ParseMode::Module, true, Some(&cache), &mut bus)
            .unwrap();
        assert!(!first.cache_hit);

        let second = parse("let x = 1;", "a.js", ParseMode::Module, true, Some(&cache), &mut bus)
            .unwrap();
        assert!(second.cache_hit);
        assert_eq!(first.hash, second.hash);
        assert_eq!(second.ast.body.len(), 1);
    }

    #[test]
    fn mode_mismatch_misses_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AstCache::new(dir.path());
        let mut bus = DiagnosticBus::new(false);

        let outcome = parse("let x = 1;", "a.js", ParseMode::Module, true, Some(&cache), &mut bus)
            .unwrap();
        // Same hash string cannot collide across modes because the mode is
        // hashed in, but a manually mixed-up entry must still be rejected.
        assert!(cache.load(&outcome.hash, ParseMode::Script).is_none());
    }

    #[test]
    fn corrupt_entries_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AstCache::new(dir.path());
        let hash = content_hash("let x = 1;", ParseMode::Module);
        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(dir.path().join(format!("{hash}.ast")), "not json").unwrap();
        assert!(cache.load(&hash, ParseMode::Module).is_none());
    }

    #[test]
    fn stale_schema_versions_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AstCache::new(dir.path());
        let hash = content_hash("let x = 1;", ParseMode::Module);
        let stale = serde_json::json!({
            "hash": hash,
            "mode": "module",
            "ast": { "body": [], "source_type": "Module",
                     "span": { "start": 0, "end": 0, "line": 0, "column": 0,
                               "end_line": 0, "end_column": 0 } },
            "meta": { "version": 0 }
        });
        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(
            dir.path().join(format!("{hash}.ast")),
            serde_json::to_string(&stale).unwrap(),
        )
        .unwrap();
        assert!(cache.load(&hash, ParseMode::Module).is_none());
    }
}
