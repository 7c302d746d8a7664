//! # Emitter Test Suite
//!
//! Tests build target ASTs directly and assert on the exact printed text:
//! statement forms, precedence-driven parenthesization, string and number
//! canonicalization, comment emission, runtime-name tracking, and the
//! assembled artifact (header, preamble, footer, trailing newline).

use crate::generator::{EmitterConfig, assemble, emit};
use crate::transformer::ExportsRecord;
use crate::transformer::py_ast::*;

/// Test helper for building target AST nodes
struct PyBuilder;

impl PyBuilder {
    fn module(body: Vec<PyStmt>) -> PyModule {
        PyModule { body }
    }

    fn assign(name: &str, value: PyExpr) -> PyStmt {
        PyStmt::new(PyStmtKind::Assign {
            target: PyExpr::name(name),
            value,
        })
    }

    fn expr_stmt(value: PyExpr) -> PyStmt {
        PyStmt::new(PyStmtKind::Expr { value })
    }

    fn ret(value: Option<PyExpr>) -> PyStmt {
        PyStmt::new(PyStmtKind::Return { value })
    }

    fn bin(left: PyExpr, op: PyBinOp, right: PyExpr) -> PyExpr {
        PyExpr::BinOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }
}

fn print(module: &PyModule) -> String {
    emit(module).code
}

mod statement_printing {
    use super::*;

    #[test]
    fn assignment_and_expression_statements() {
        let module = PyBuilder::module(vec![
            PyBuilder::assign("x", PyExpr::Num(5.0)),
            PyBuilder::expr_stmt(PyExpr::call(PyExpr::name("f"), vec![PyExpr::name("x")])),
        ]);
        assert_eq!(print(&module), "x = 5\nf(x)\n");
    }

    #[test]
    fn function_def_with_hoisted_statements_first() {
        let module = PyBuilder::module(vec![PyStmt::new(PyStmtKind::FunctionDef {
            name: "f".to_string(),
            params: vec![PyParam::plain("a")],
            hoisted: vec![PyBuilder::assign("y", PyExpr::name("JSUndefined"))],
            body: vec![PyBuilder::ret(Some(PyExpr::name("y")))],
        })]);
        assert_eq!(
            print(&module),
            "def f(a):\n    y = JSUndefined\n    return y\n"
        );
    }

    #[test]
    fn function_def_params_with_default_and_star() {
        let module = PyBuilder::module(vec![PyStmt::new(PyStmtKind::FunctionDef {
            name: "f".to_string(),
            params: vec![
                PyParam::plain("a"),
                PyParam {
                    name: "b".to_string(),
                    default: Some(PyExpr::Num(2.0)),
                    star: false,
                },
                PyParam {
                    name: "rest".to_string(),
                    default: None,
                    star: true,
                },
            ],
            hoisted: Vec::new(),
            body: vec![PyStmt::new(PyStmtKind::Pass)],
        })]);
        assert_eq!(print(&module), "def f(a, b=2, *rest):\n    pass\n");
    }

    #[test]
    fn class_def_with_base() {
        let module = PyBuilder::module(vec![PyStmt::new(PyStmtKind::ClassDef {
            name: "Dog".to_string(),
            base: Some(PyExpr::name("Animal")),
            body: vec![PyStmt::new(PyStmtKind::Pass)],
        })]);
        assert_eq!(print(&module), "class Dog(Animal):\n    pass\n");
    }

    #[test]
    fn if_elif_else_chain_is_flat() {
        let module = PyBuilder::module(vec![PyStmt::new(PyStmtKind::If {
            test: PyExpr::name("a"),
            body: vec![PyStmt::new(PyStmtKind::Pass)],
            orelse: vec![PyStmt::new(PyStmtKind::If {
                test: PyExpr::name("b"),
                body: vec![PyStmt::new(PyStmtKind::Pass)],
                orelse: vec![PyStmt::new(PyStmtKind::Continue)],
            })],
        })]);
        assert_eq!(
            print(&module),
            "if a:\n    pass\nelif b:\n    pass\nelse:\n    continue\n"
        );
    }

    #[test]
    fn try_except_finally() {
        let module = PyBuilder::module(vec![PyStmt::new(PyStmtKind::Try {
            body: vec![PyBuilder::expr_stmt(PyExpr::call(
                PyExpr::name("work"),
                vec![],
            ))],
            handler: Some(PyExcept {
                class_name: Some("JsError".to_string()),
                name: Some("e".to_string()),
                body: vec![PyStmt::new(PyStmtKind::Raise { exc: None })],
            }),
            finalbody: vec![PyBuilder::expr_stmt(PyExpr::call(
                PyExpr::name("cleanup"),
                vec![],
            ))],
        })]);
        assert_eq!(
            print(&module),
            "try:\n    work()\nexcept JsError as e:\n    raise\nfinally:\n    cleanup()\n"
        );
    }

    #[test]
    fn for_and_while_loops() {
        let module = PyBuilder::module(vec![
            PyStmt::new(PyStmtKind::For {
                target: PyExpr::name("x"),
                iter: PyExpr::helper("js_iter", vec![PyExpr::name("xs")]),
                body: vec![PyStmt::new(PyStmtKind::Break)],
            }),
            PyStmt::new(PyStmtKind::While {
                test: PyExpr::Bool(true),
                body: vec![PyStmt::new(PyStmtKind::Pass)],
            }),
        ]);
        assert_eq!(
            print(&module),
            "for x in js_iter(xs):\n    break\nwhile True:\n    pass\n"
        );
    }

    #[test]
    fn import_forms() {
        let module = PyBuilder::module(vec![
            PyStmt::new(PyStmtKind::Import {
                module: "fs".to_string(),
                alias: None,
            }),
            PyStmt::new(PyStmtKind::Import {
                module: "util".to_string(),
                alias: Some("_m_1".to_string()),
            }),
            PyStmt::new(PyStmtKind::ImportFrom {
                module: "m".to_string(),
                names: vec![
                    ("a".to_string(), None),
                    ("b".to_string(), Some("c".to_string())),
                ],
            }),
        ]);
        assert_eq!(
            print(&module),
            "import fs\nimport util as _m_1\nfrom m import a, b as c\n"
        );
    }

    #[test]
    fn comments_print_as_leading_lines() {
        let module = PyBuilder::module(vec![
            PyStmt::new(PyStmtKind::Pass).with_comment("TODO: degraded construct"),
        ]);
        assert_eq!(print(&module), "# TODO: degraded construct\npass\n");
    }

    #[test]
    fn nested_indentation_is_four_spaces() {
        let module = PyBuilder::module(vec![PyStmt::new(PyStmtKind::While {
            test: PyExpr::Bool(true),
            body: vec![PyStmt::new(PyStmtKind::If {
                test: PyExpr::name("done"),
                body: vec![PyStmt::new(PyStmtKind::Break)],
                orelse: Vec::new(),
            })],
        })]);
        assert_eq!(
            print(&module),
            "while True:\n    if done:\n        break\n"
        );
    }
}

mod expression_printing {
    use super::*;

    #[test]
    fn precedence_parenthesizes_mixed_arithmetic() {
        // (a + b) * c needs parens; a + b * c does not
        let grouped = PyBuilder::module(vec![PyBuilder::assign(
            "x",
            PyBuilder::bin(
                PyBuilder::bin(PyExpr::name("a"), PyBinOp::Add, PyExpr::name("b")),
                PyBinOp::Mult,
                PyExpr::name("c"),
            ),
        )]);
        assert_eq!(print(&grouped), "x = (a + b) * c\n");

        let natural = PyBuilder::module(vec![PyBuilder::assign(
            "x",
            PyBuilder::bin(
                PyExpr::name("a"),
                PyBinOp::Add,
                PyBuilder::bin(PyExpr::name("b"), PyBinOp::Mult, PyExpr::name("c")),
            ),
        )]);
        assert_eq!(print(&natural), "x = a + b * c\n");
    }

    #[test]
    fn string_literals_escape_and_prefer_single_quotes() {
        let module = PyBuilder::module(vec![
            PyBuilder::assign("a", PyExpr::string("hello")),
            PyBuilder::assign("b", PyExpr::string("it's")),
            PyBuilder::assign("c", PyExpr::string("line\nbreak")),
        ]);
        assert_eq!(
            print(&module),
            "a = 'hello'\nb = \"it's\"\nc = 'line\\nbreak'\n"
        );
    }

    #[test]
    fn numbers_print_integers_without_fraction() {
        let module = PyBuilder::module(vec![
            PyBuilder::assign("a", PyExpr::Num(3.0)),
            PyBuilder::assign("b", PyExpr::Num(2.5)),
            PyBuilder::assign("c", PyExpr::Num(-7.0)),
        ]);
        assert_eq!(print(&module), "a = 3\nb = 2.5\nc = -7\n");
    }

    #[test]
    fn dict_list_and_tuple_literals() {
        let module = PyBuilder::module(vec![
            PyBuilder::assign(
                "d",
                PyExpr::Dict(vec![(PyExpr::string("k"), PyExpr::Num(1.0))]),
            ),
            PyBuilder::assign("l", PyExpr::List(vec![PyExpr::Num(1.0), PyExpr::Num(2.0)])),
            PyBuilder::assign("t", PyExpr::Tuple(vec![PyExpr::Num(1.0)])),
        ]);
        assert_eq!(print(&module), "d = {'k': 1}\nl = [1, 2]\nt = (1,)\n");
    }

    #[test]
    fn lambda_and_conditional() {
        let module = PyBuilder::module(vec![PyBuilder::assign(
            "f",
            PyExpr::Lambda {
                params: vec!["x".to_string()],
                body: Box::new(PyExpr::Conditional {
                    test: Box::new(PyExpr::name("x")),
                    body: Box::new(PyExpr::Num(1.0)),
                    orelse: Box::new(PyExpr::Num(0.0)),
                }),
            },
        )]);
        assert_eq!(print(&module), "f = lambda x: 1 if x else 0\n");
    }

    #[test]
    fn attribute_subscript_and_starred() {
        let module = PyBuilder::module(vec![PyBuilder::expr_stmt(PyExpr::call(
            PyExpr::attr(PyExpr::name("console"), "log"),
            vec![
                PyExpr::subscript(PyExpr::name("xs"), PyExpr::Num(0.0)),
                PyExpr::Starred(Box::new(PyExpr::helper("spread", vec![PyExpr::name("ys")]))),
            ],
        ))]);
        assert_eq!(print(&module), "console.log(xs[0], *spread(ys))\n");
    }

    #[test]
    fn not_binds_looser_than_comparison() {
        let module = PyBuilder::module(vec![PyBuilder::assign(
            "x",
            PyExpr::UnaryOp {
                op: PyUnaryOp::Not,
                operand: Box::new(PyExpr::helper(
                    "loose_eq",
                    vec![PyExpr::name("a"), PyExpr::name("b")],
                )),
            },
        )]);
        assert_eq!(print(&module), "x = not loose_eq(a, b)\n");
    }
}

mod runtime_tracking {
    use super::*;

    #[test]
    fn referenced_helpers_are_collected() {
        let module = PyBuilder::module(vec![PyBuilder::assign(
            "s",
            PyExpr::helper("js_plus", vec![PyExpr::name("a"), PyExpr::name("b")]),
        )]);
        let result = emit(&module);
        assert!(result.runtime_names.contains("js_plus"));
        assert_eq!(result.runtime_names.len(), 1);
    }

    #[test]
    fn except_class_counts_as_a_reference() {
        let module = PyBuilder::module(vec![PyStmt::new(PyStmtKind::Try {
            body: vec![PyStmt::new(PyStmtKind::Pass)],
            handler: Some(PyExcept {
                class_name: Some("JsError".to_string()),
                name: None,
                body: vec![PyStmt::new(PyStmtKind::Pass)],
            }),
            finalbody: Vec::new(),
        })]);
        assert!(emit(&module).runtime_names.contains("JsError"));
    }

    #[test]
    fn plain_names_are_not_collected() {
        let module = PyBuilder::module(vec![PyBuilder::assign("x", PyExpr::name("y"))]);
        assert!(emit(&module).runtime_names.is_empty());
    }
}

mod assembly {
    use super::*;

    fn simple_module() -> PyModule {
        PyBuilder::module(vec![PyBuilder::assign(
            "x",
            PyExpr::helper("js_plus", vec![PyExpr::Num(1.0), PyExpr::Num(2.0)]),
        )])
    }

    #[test]
    fn header_names_the_source_basename() {
        let emitted = emit(&simple_module());
        let out = assemble(
            &emitted,
            &ExportsRecord::default(),
            "input.js",
            &EmitterConfig::default(),
        );
        assert!(out.starts_with("# Generated by js2py from input.js\n"));
    }

    #[test]
    fn runtime_preamble_lists_referenced_names() {
        let emitted = emit(&simple_module());
        let out = assemble(
            &emitted,
            &ExportsRecord::default(),
            "input.js",
            &EmitterConfig::default(),
        );
        assert!(out.contains("from js_runtime import js_plus\n"));
    }

    #[test]
    fn runtime_skip_suppresses_the_preamble() {
        let emitted = emit(&simple_module());
        let out = assemble(
            &emitted,
            &ExportsRecord::default(),
            "input.js",
            &EmitterConfig {
                include_runtime: false,
            },
        );
        assert!(!out.contains("js_runtime"));
    }

    #[test]
    fn no_preamble_without_runtime_references() {
        let module = PyBuilder::module(vec![PyBuilder::assign("x", PyExpr::Num(1.0))]);
        let emitted = emit(&module);
        let out = assemble(
            &emitted,
            &ExportsRecord::default(),
            "input.js",
            &EmitterConfig::default(),
        );
        assert!(!out.contains("js_runtime"));
    }

    #[test]
    fn export_footer_appears_iff_the_record_is_non_empty() {
        let emitted = emit(&simple_module());
        let mut exports = ExportsRecord::default();
        let without = assemble(&emitted, &exports, "input.js", &EmitterConfig::default());
        assert!(!without.contains("__all__"));

        exports.add("a");
        exports.add("b");
        exports.has_default = true;
        let with = assemble(&emitted, &exports, "input.js", &EmitterConfig::default());
        assert!(with.contains("__all__ = ['a', 'b', '_default']\n"));
    }

    #[test]
    fn output_ends_with_a_newline() {
        let emitted = emit(&simple_module());
        let out = assemble(
            &emitted,
            &ExportsRecord::default(),
            "input.js",
            &EmitterConfig::default(),
        );
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn printing_is_deterministic() {
        let module = simple_module();
        assert_eq!(print(&module), print(&module));
    }
}
