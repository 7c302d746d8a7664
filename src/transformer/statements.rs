//! # Statement Lowering Rules
//!
//! One rule per source statement kind. Declarations become assignments
//! (hoisted vars are seeded by the function's hoist sink), C-style loops
//! become while loops, do-while and labeled jumps are rewritten with the
//! documented degradations, switch statements become if/elif cascades that
//! preserve fall-through, and try/catch unwraps `JsError` back to the
//! thrown value.

use crate::analyzer::ThisKind;
use crate::diagnostics::codes;
use crate::parser::ast_types::{
    Arrow, ArrowBody, AssignTarget, CatchClause, Class, ClassElement, Expression, ForHead,
    ForInit, Function, Literal, MethodKind, Param, Pattern, PropertyKey, Span, Statement,
    SwitchCase, VariableDeclarationKind, VariableDeclarator,
};
use crate::transformer::py_ast::{
    PyCmpOp, PyExcept, PyExpr, PyParam, PyStmt, PyStmtKind, PyUnaryOp,
};
use crate::transformer::{Breakable, Ctx, LabelFrame, TransformResult, expressions, modules};

/// Lowers one statement into zero or more target statements
pub fn lower_statement(statement: &Statement, ctx: &mut Ctx) -> TransformResult<Vec<PyStmt>> {
    let mut out = Vec::new();
    match statement {
        Statement::VariableDeclaration { declarations, kind, .. } => {
            for declarator in declarations {
                lower_declarator(declarator, *kind, ctx, &mut out)?;
            }
        }
        Statement::FunctionDeclaration(func) => {
            let name = match &func.id {
                Some(id) => ctx.rename_identifier(&id.name, id.span),
                None => ctx.fresh_fn(),
            };
            let stmt = lower_plain_function(&name, func, ctx)?;
            out.push(stmt);
        }
        Statement::ClassDeclaration(class) => {
            let name = match &class.id {
                Some(id) => ctx.rename_identifier(&id.name, id.span),
                None => ctx.fresh_fn(),
            };
            let stmt = lower_class_with_sink(class, &name, ctx, &mut out)?;
            out.push(stmt);
        }
        Statement::ExpressionStatement { expression, span } => {
            lower_expression_statement(expression, *span, ctx, &mut out)?;
        }
        Statement::BlockStatement { body, .. } => {
            // The target has no block statement; block scoping was resolved
            // during analysis, so the contents flatten in place.
            for statement in body {
                out.extend(lower_statement(statement, ctx)?);
            }
        }
        Statement::ReturnStatement { argument, span } => {
            // Constructor return values are dropped: the initializer must
            // yield the instance.
            let value = match argument {
                Some(_) if ctx.in_constructor() => None,
                Some(argument) => Some(expressions::lower_expression(argument, ctx, &mut out)?),
                None => None,
            };
            out.push(PyStmt::at(PyStmtKind::Return { value }, *span));
        }
        Statement::IfStatement { test, consequent, alternate, span } => {
            let test = expressions::lower_expression(test, ctx, &mut out)?;
            let body = lower_suite(consequent, ctx)?;
            let orelse = match alternate {
                // elif chains stay flat: an else-if becomes the sole
                // statement of the orelse suite
                Some(alternate) => lower_statement(alternate, ctx)?,
                None => Vec::new(),
            };
            out.push(PyStmt::at(PyStmtKind::If { test, body, orelse }, *span));
        }
        Statement::ForStatement { init, test, update, body, span } => {
            lower_for(init, test, update, body, *span, ctx, &mut out)?;
        }
        Statement::ForInStatement { left, right, body, span } => {
            lower_for_each(left, right, body, "js_keys", *span, ctx, &mut out)?;
        }
        Statement::ForOfStatement { left, right, body, span } => {
            lower_for_each(left, right, body, "js_iter", *span, ctx, &mut out)?;
        }
        Statement::WhileStatement { test, body, span } => {
            let mut test_sink = Vec::new();
            let test = expressions::lower_expression(test, ctx, &mut test_sink)?;
            let body = lower_loop_body(body, ctx, &mut out)?;
            if test_sink.is_empty() {
                out.push(PyStmt::at(PyStmtKind::While { test, body }, *span));
            } else {
                // The test needs lifted statements; re-evaluate them at the
                // top of every iteration.
                let mut full = test_sink;
                full.push(PyStmt::new(PyStmtKind::If {
                    test: PyExpr::UnaryOp {
                        op: PyUnaryOp::Not,
                        operand: Box::new(test),
                    },
                    body: vec![PyStmt::new(PyStmtKind::Break)],
                    orelse: Vec::new(),
                }));
                full.extend(body);
                out.push(PyStmt::at(
                    PyStmtKind::While {
                        test: PyExpr::Bool(true),
                        body: full,
                    },
                    *span,
                ));
            }
        }
        Statement::DoWhileStatement { body, test, span } => {
            ctx.bus.info(
                ctx.file,
                span.line,
                span.column,
                codes::DO_WHILE,
                "do-while becomes while True with a trailing conditional break".to_string(),
            );
            let mut full = lower_loop_body(body, ctx, &mut out)?;
            let mut test_sink = Vec::new();
            let test = expressions::lower_expression(test, ctx, &mut test_sink)?;
            full.extend(test_sink);
            full.push(PyStmt::new(PyStmtKind::If {
                test: PyExpr::UnaryOp {
                    op: PyUnaryOp::Not,
                    operand: Box::new(test),
                },
                body: vec![PyStmt::new(PyStmtKind::Break)],
                orelse: Vec::new(),
            }));
            out.push(PyStmt::at(
                PyStmtKind::While {
                    test: PyExpr::Bool(true),
                    body: full,
                },
                *span,
            ));
        }
        Statement::SwitchStatement { discriminant, cases, span } => {
            lower_switch(discriminant, cases, *span, ctx, &mut out)?;
        }
        Statement::TryStatement { block, handler, finalizer, span } => {
            let body = lower_suite_from(block, ctx)?;
            let handler = match handler {
                Some(handler) => Some(lower_catch(handler, ctx)?),
                None => None,
            };
            let finalbody = match finalizer {
                Some(finalizer) => lower_suite_from(finalizer, ctx)?,
                None => Vec::new(),
            };
            // try/finally without a catch maps onto the native form
            out.push(PyStmt::at(
                PyStmtKind::Try {
                    body,
                    handler,
                    finalbody,
                },
                *span,
            ));
        }
        Statement::ThrowStatement { argument, span } => {
            let value = expressions::lower_expression(argument, ctx, &mut out)?;
            // Any value can be thrown; JsError carries it across the raise
            out.push(PyStmt::at(
                PyStmtKind::Raise {
                    exc: Some(PyExpr::helper("JsError", vec![value])),
                },
                *span,
            ));
        }
        Statement::BreakStatement { label, span } => {
            lower_break(label.as_deref(), *span, ctx, &mut out);
        }
        Statement::ContinueStatement { label, span } => {
            lower_continue(label.as_deref(), *span, ctx, &mut out);
        }
        Statement::LabeledStatement { label, body, span } => {
            lower_labeled(label, body, *span, ctx, &mut out)?;
        }
        Statement::EmptyStatement { .. } => {}
        Statement::WithStatement { object, body, span } => {
            // Risk was reported during analysis; evaluate the object for
            // its side effects and translate the body as-is.
            let object = expressions::lower_expression(object, ctx, &mut out)?;
            let mut stmt = PyStmt::at(PyStmtKind::Expr { value: object }, *span);
            stmt.comments
                .push("TODO: with statement scope is not preserved".to_string());
            out.push(stmt);
            out.extend(lower_statement(body, ctx)?);
        }
        Statement::ImportDeclaration { specifiers, source, span } => {
            out.extend(modules::lower_import(specifiers, source, *span, ctx));
        }
        Statement::ExportNamedDeclaration { declaration, specifiers, source, span } => {
            out.extend(modules::lower_export_named(
                declaration.as_deref(),
                specifiers,
                source.as_deref(),
                *span,
                ctx,
            )?);
        }
        Statement::ExportDefaultDeclaration { declaration, span } => {
            out.extend(modules::lower_export_default(declaration, *span, ctx)?);
        }
        Statement::Unsupported { construct, span } => {
            ctx.bus.warn(
                ctx.file,
                span.line,
                span.column,
                codes::UNSUPPORTED,
                format!("{construct} is outside the supported subset"),
            );
            let stmt = PyStmt::at(PyStmtKind::Pass, *span)
                .with_comment(format!("TODO: {construct} was not translated"));
            out.push(stmt);
        }
    }

    // Attach any pending TODO comments from expression lowering
    if !ctx.pending_comments.is_empty() {
        if let Some(first) = out.first_mut() {
            ctx.take_comments(first);
        } else {
            let mut stmt = PyStmt::new(PyStmtKind::Pass);
            ctx.take_comments(&mut stmt);
            out.push(stmt);
        }
    }
    Ok(out)
}

/// Lowers a statement used as a suite body; empty suites become `pass`
pub fn lower_suite(statement: &Statement, ctx: &mut Ctx) -> TransformResult<Vec<PyStmt>> {
    let out = lower_statement(statement, ctx)?;
    Ok(if out.is_empty() {
        vec![PyStmt::new(PyStmtKind::Pass)]
    } else {
        out
    })
}

/// Lowers a statement list used as a suite body
pub fn lower_suite_from(statements: &[Statement], ctx: &mut Ctx) -> TransformResult<Vec<PyStmt>> {
    let mut out = Vec::new();
    for statement in statements {
        out.extend(lower_statement(statement, ctx)?);
    }
    Ok(if out.is_empty() {
        vec![PyStmt::new(PyStmtKind::Pass)]
    } else {
        out
    })
}

fn lower_expression_statement(
    expression: &Expression,
    span: Span,
    ctx: &mut Ctx,
    out: &mut Vec<PyStmt>,
) -> TransformResult<()> {
    // Directive prologues ("use strict") have no target counterpart
    if matches!(expression, Expression::Literal(Literal::String { .. })) {
        return Ok(());
    }
    // CommonJS export shapes are module forms, not plain assignments
    if modules::try_lower_commonjs_export(expression, span, ctx, out)? {
        return Ok(());
    }
    match expression {
        Expression::Assignment { target, operator, value, .. } => {
            expressions::lower_assignment_statement(target, *operator, value, ctx, out)?;
        }
        Expression::Update { operator, target, .. } => {
            expressions::lower_update_statement(*operator, target, ctx, out)?;
        }
        other => {
            let value = expressions::lower_expression(other, ctx, out)?;
            out.push(PyStmt::at(PyStmtKind::Expr { value }, span));
        }
    }
    Ok(())
}

fn lower_declarator(
    declarator: &VariableDeclarator,
    kind: VariableDeclarationKind,
    ctx: &mut Ctx,
    out: &mut Vec<PyStmt>,
) -> TransformResult<()> {
    // `const {a} = require("m")` flattens into a from-import
    if modules::try_lower_require_declaration(declarator, ctx, out)? {
        return Ok(());
    }
    match &declarator.id {
        Pattern::Identifier(id) => {
            let name = ctx.rename_identifier(&id.name, id.span);
            match &declarator.init {
                // An anonymous function expression bound to a name becomes
                // a def under that name; no alias assignment needed
                Some(Expression::FunctionExpression(func)) if func.id.is_none() => {
                    out.push(lower_plain_function(&name, func, ctx)?);
                }
                Some(init) => {
                    let value = expressions::lower_expression(init, ctx, out)?;
                    out.push(PyStmt::at(
                        PyStmtKind::Assign {
                            target: PyExpr::Name(name),
                            value,
                        },
                        declarator.span,
                    ));
                }
                None => {
                    // Uninitialized vars were seeded by the hoist sink
                    if kind != VariableDeclarationKind::Var {
                        out.push(PyStmt::at(
                            PyStmtKind::Assign {
                                target: PyExpr::Name(name),
                                value: PyExpr::name("JSUndefined"),
                            },
                            declarator.span,
                        ));
                    }
                }
            }
        }
        pattern => {
            let init = match &declarator.init {
                Some(init) => expressions::lower_expression(init, ctx, out)?,
                None => PyExpr::name("JSUndefined"),
            };
            let tmp = ctx.fresh_temp();
            out.push(PyStmt::at(
                PyStmtKind::Assign {
                    target: PyExpr::name(tmp.clone()),
                    value: init,
                },
                declarator.span,
            ));
            lower_destructuring(pattern, PyExpr::name(tmp), ctx, out)?;
        }
    }
    Ok(())
}

/// Flattens a destructuring pattern into per-name assignments against a
/// temporary holding the source value.
pub fn lower_destructuring(
    pattern: &Pattern,
    source: PyExpr,
    ctx: &mut Ctx,
    out: &mut Vec<PyStmt>,
) -> TransformResult<()> {
    match pattern {
        Pattern::Identifier(id) => {
            let name = ctx.rename_identifier(&id.name, id.span);
            out.push(PyStmt::new(PyStmtKind::Assign {
                target: PyExpr::Name(name),
                value: source,
            }));
        }
        Pattern::Object { properties, rest, span } => {
            for property in properties {
                let key = match &property.key {
                    PropertyKey::Identifier { name, .. } => PyExpr::Str(name.clone()),
                    PropertyKey::String { value, .. } => PyExpr::Str(value.clone()),
                    PropertyKey::Number { value, .. } => PyExpr::Num(*value),
                    PropertyKey::Computed(expression) => {
                        expressions::lower_expression(expression, ctx, out)?
                    }
                };
                let extracted = PyExpr::helper("js_getindex", vec![source.clone(), key]);
                lower_destructured_value(&property.value, extracted, ctx, out)?;
            }
            if rest.is_some() {
                ctx.bus.warn(
                    ctx.file,
                    span.line,
                    span.column,
                    codes::UNSUPPORTED,
                    "rest element in destructuring is outside the supported subset".to_string(),
                );
                ctx.todo_comment("TODO: rest element was not translated");
            }
        }
        Pattern::Array { elements, rest, span } => {
            for (index, element) in elements.iter().enumerate() {
                let Some(element) = element else { continue };
                let extracted = PyExpr::helper(
                    "js_getindex",
                    vec![source.clone(), PyExpr::Num(index as f64)],
                );
                lower_destructured_value(element, extracted, ctx, out)?;
            }
            if rest.is_some() {
                ctx.bus.warn(
                    ctx.file,
                    span.line,
                    span.column,
                    codes::UNSUPPORTED,
                    "rest element in destructuring is outside the supported subset".to_string(),
                );
                ctx.todo_comment("TODO: rest element was not translated");
            }
        }
        Pattern::Assignment { target, default, .. } => {
            lower_destructured_value(
                &Pattern::Assignment {
                    target: target.clone(),
                    default: default.clone(),
                    span: pattern.span(),
                },
                source,
                ctx,
                out,
            )?;
        }
    }
    Ok(())
}

/// Assigns one extracted value to a sub-pattern, applying defaults
fn lower_destructured_value(
    pattern: &Pattern,
    extracted: PyExpr,
    ctx: &mut Ctx,
    out: &mut Vec<PyStmt>,
) -> TransformResult<()> {
    match pattern {
        Pattern::Identifier(id) => {
            let name = ctx.rename_identifier(&id.name, id.span);
            out.push(PyStmt::new(PyStmtKind::Assign {
                target: PyExpr::Name(name),
                value: extracted,
            }));
        }
        Pattern::Assignment { target, default, .. } => {
            lower_destructured_value(target, extracted, ctx, out)?;
            // The default applies when the extracted value is undefined
            if let Pattern::Identifier(id) = target.as_ref() {
                let name = ctx.rename_identifier(&id.name, id.span);
                let default = expressions::lower_expression(default, ctx, out)?;
                out.push(PyStmt::new(PyStmtKind::If {
                    test: PyExpr::Compare {
                        left: Box::new(PyExpr::name(name.clone())),
                        op: PyCmpOp::Is,
                        right: Box::new(PyExpr::name("JSUndefined")),
                    },
                    body: vec![PyStmt::new(PyStmtKind::Assign {
                        target: PyExpr::Name(name),
                        value: default,
                    })],
                    orelse: Vec::new(),
                }));
            }
        }
        nested => {
            // Nested pattern: bind the extracted value first, then recurse
            let tmp = ctx.fresh_temp();
            out.push(PyStmt::new(PyStmtKind::Assign {
                target: PyExpr::name(tmp.clone()),
                value: extracted,
            }));
            lower_destructuring(nested, PyExpr::name(tmp), ctx, out)?;
        }
    }
    Ok(())
}

// ---- loops --------------------------------------------------------------

/// Lowers a loop body inside a fresh breakable frame, then appends the
/// labeled-jump propagation statements after the loop.
fn lower_loop_body(
    body: &Statement,
    ctx: &mut Ctx,
    after_loop: &mut Vec<PyStmt>,
) -> TransformResult<Vec<PyStmt>> {
    let snapshot: Vec<(u32, u32)> = ctx
        .fn_state
        .labels
        .iter()
        .map(|f| (f.break_used, f.continue_used))
        .collect();

    ctx.fn_state.breakables.push(Breakable::Loop);
    ctx.fn_state.loop_depth += 1;
    let lowered = lower_suite(body, ctx)?;
    ctx.fn_state.loop_depth -= 1;
    ctx.fn_state.breakables.pop();

    let depth = ctx.fn_state.loop_depth;
    let mut propagation = Vec::new();
    for (i, (breaks_before, continues_before)) in snapshot.iter().enumerate() {
        let frame = &ctx.fn_state.labels[i];
        // Propagation stops at the labeled loop itself: its own depth sits
        // below the frame's body depth.
        if depth < frame.body_depth {
            continue;
        }
        if frame.break_used > *breaks_before {
            propagation.push(PyStmt::new(PyStmtKind::If {
                test: PyExpr::name(frame.break_flag.clone()),
                body: vec![PyStmt::new(PyStmtKind::Break)],
                orelse: Vec::new(),
            }));
        }
        if frame.continue_used > *continues_before {
            let body = if depth == frame.body_depth {
                vec![
                    PyStmt::new(PyStmtKind::Assign {
                        target: PyExpr::name(frame.continue_flag.clone()),
                        value: PyExpr::Bool(false),
                    }),
                    PyStmt::new(PyStmtKind::Continue),
                ]
            } else {
                vec![PyStmt::new(PyStmtKind::Break)]
            };
            propagation.push(PyStmt::new(PyStmtKind::If {
                test: PyExpr::name(frame.continue_flag.clone()),
                body,
                orelse: Vec::new(),
            }));
        }
    }
    after_loop.extend(propagation);
    Ok(lowered)
}

fn lower_for(
    init: &Option<ForInit>,
    test: &Option<Expression>,
    update: &Option<Expression>,
    body: &Statement,
    span: Span,
    ctx: &mut Ctx,
    out: &mut Vec<PyStmt>,
) -> TransformResult<()> {
    match init {
        Some(ForInit::VariableDeclaration { declarations, kind, .. }) => {
            for declarator in declarations {
                lower_declarator(declarator, *kind, ctx, out)?;
            }
        }
        Some(ForInit::Expression(expression)) => {
            lower_expression_statement(expression, span, ctx, out)?;
        }
        None => {}
    }

    let mut test_sink = Vec::new();
    let test = match test {
        Some(test) => expressions::lower_expression(test, ctx, &mut test_sink)?,
        None => PyExpr::Bool(true),
    };

    let mut after_loop = Vec::new();
    let mut loop_body = lower_loop_body(body, ctx, &mut after_loop)?;

    // The update expression runs at the end of every iteration
    if let Some(update) = update {
        let mut update_sink = Vec::new();
        let value = expressions::lower_expression(update, ctx, &mut update_sink)?;
        loop_body.extend(update_sink);
        if !matches!(value, PyExpr::Name(_)) {
            loop_body.push(PyStmt::new(PyStmtKind::Expr { value }));
        }
    }

    if test_sink.is_empty() {
        out.push(PyStmt::at(
            PyStmtKind::While {
                test,
                body: loop_body,
            },
            span,
        ));
    } else {
        let mut full = test_sink;
        full.push(PyStmt::new(PyStmtKind::If {
            test: PyExpr::UnaryOp {
                op: PyUnaryOp::Not,
                operand: Box::new(test),
            },
            body: vec![PyStmt::new(PyStmtKind::Break)],
            orelse: Vec::new(),
        }));
        full.extend(loop_body);
        out.push(PyStmt::at(
            PyStmtKind::While {
                test: PyExpr::Bool(true),
                body: full,
            },
            span,
        ));
    }
    out.extend(after_loop);
    Ok(())
}

fn lower_for_each(
    left: &ForHead,
    right: &Expression,
    body: &Statement,
    iter_helper: &str,
    span: Span,
    ctx: &mut Ctx,
    out: &mut Vec<PyStmt>,
) -> TransformResult<()> {
    let right = expressions::lower_expression(right, ctx, out)?;
    let iter = PyExpr::helper(iter_helper, vec![right]);

    // Resolve the loop target to a plain name, destructuring via a
    // temporary when needed.
    let (target, mut prologue) = match left {
        ForHead::Declaration { id: Pattern::Identifier(id), .. } => {
            (PyExpr::Name(ctx.rename_identifier(&id.name, id.span)), Vec::new())
        }
        ForHead::Declaration { id: pattern, .. } => {
            let tmp = ctx.fresh_temp();
            let mut prologue = Vec::new();
            lower_destructuring(pattern, PyExpr::name(tmp.clone()), ctx, &mut prologue)?;
            (PyExpr::name(tmp), prologue)
        }
        ForHead::Target(AssignTarget::Identifier(id)) => {
            (PyExpr::Name(ctx.rename_identifier(&id.name, id.span)), Vec::new())
        }
        ForHead::Target(target) => {
            let tmp = ctx.fresh_temp();
            let mut prologue = Vec::new();
            expressions::lower_assignment_statement(
                target,
                crate::parser::ast_types::AssignmentOperator::Assign,
                &Expression::Identifier(crate::parser::ast_types::Identifier {
                    name: tmp.clone(),
                    span: Span::SYNTHETIC,
                }),
                ctx,
                &mut prologue,
            )?;
            (PyExpr::name(tmp), prologue)
        }
    };

    let mut after_loop = Vec::new();
    let lowered_body = lower_loop_body(body, ctx, &mut after_loop)?;
    prologue.extend(lowered_body);

    out.push(PyStmt::at(
        PyStmtKind::For {
            target,
            iter,
            body: prologue,
        },
        span,
    ));
    out.extend(after_loop);
    Ok(())
}

// ---- switch -------------------------------------------------------------

/// Whether a case body runs into the next case
fn case_falls_through(consequent: &[Statement]) -> bool {
    !matches!(
        consequent.last(),
        Some(
            Statement::BreakStatement { label: None, .. }
                | Statement::ReturnStatement { .. }
                | Statement::ThrowStatement { .. }
                | Statement::ContinueStatement { .. }
        )
    )
}

/// Case body statements with a terminating plain break stripped
fn case_body(consequent: &[Statement]) -> &[Statement] {
    match consequent.last() {
        Some(Statement::BreakStatement { label: None, .. }) => {
            &consequent[..consequent.len() - 1]
        }
        _ => consequent,
    }
}

fn lower_switch(
    discriminant: &Expression,
    cases: &[SwitchCase],
    span: Span,
    ctx: &mut Ctx,
    out: &mut Vec<PyStmt>,
) -> TransformResult<()> {
    // switch(true) cascades use each case test as the branch condition
    let scrutinee = if matches!(
        discriminant,
        Expression::Literal(Literal::Boolean { value: true, .. })
    ) {
        None
    } else {
        let lowered = expressions::lower_expression(discriminant, ctx, out)?;
        let tmp = ctx.fresh_temp();
        out.push(PyStmt::new(PyStmtKind::Assign {
            target: PyExpr::name(tmp.clone()),
            value: lowered,
        }));
        Some(tmp)
    };

    // Fall-through: a non-terminated case body is concatenated with the
    // bodies of the following cases up to the first terminator.
    fn cascade(
        cases: &[SwitchCase],
        start: usize,
        ctx: &mut Ctx,
    ) -> TransformResult<Vec<PyStmt>> {
        let mut body: Vec<&Statement> = Vec::new();
        ctx.fn_state.breakables.push(Breakable::Switch);
        for case in cases.iter().skip(start) {
            body.extend(case_body(&case.consequent));
            if !case_falls_through(&case.consequent) {
                break;
            }
        }
        let mut lowered = Vec::new();
        for statement in body {
            lowered.extend(lower_statement(statement, ctx)?);
        }
        ctx.fn_state.breakables.pop();
        Ok(if lowered.is_empty() {
            vec![PyStmt::new(PyStmtKind::Pass)]
        } else {
            lowered
        })
    }

    let mut branches: Vec<(PyExpr, Vec<PyStmt>)> = Vec::new();
    let mut default_body: Option<Vec<PyStmt>> = None;

    for (index, case) in cases.iter().enumerate() {
        match &case.test {
            Some(test) => {
                let mut test_sink = Vec::new();
                let lowered_test = expressions::lower_expression(test, ctx, &mut test_sink)?;
                out.extend(test_sink);
                let condition = match &scrutinee {
                    Some(tmp) => PyExpr::Compare {
                        left: Box::new(PyExpr::name(tmp.clone())),
                        op: PyCmpOp::Eq,
                        right: Box::new(lowered_test),
                    },
                    None => lowered_test,
                };
                branches.push((condition, cascade(cases, index, ctx)?));
            }
            None => {
                default_body = Some(cascade(cases, index, ctx)?);
            }
        }
    }

    // Build the if/elif/else chain back-to-front
    let mut chain: Vec<PyStmt> = default_body.unwrap_or_default();
    for (condition, body) in branches.into_iter().rev() {
        chain = vec![PyStmt::at(
            PyStmtKind::If {
                test: condition,
                body,
                orelse: chain,
            },
            span,
        )];
    }
    out.extend(chain);
    Ok(())
}

// ---- jumps and labels ---------------------------------------------------

fn lower_break(label: Option<&str>, span: Span, ctx: &mut Ctx, out: &mut Vec<PyStmt>) {
    match label {
        None => match ctx.fn_state.breakables.last() {
            Some(Breakable::Loop) => out.push(PyStmt::at(PyStmtKind::Break, span)),
            Some(Breakable::Switch) => {
                // Trailing breaks are stripped during cascade construction;
                // a mid-case break has no direct target equivalent.
                ctx.bus.warn(
                    ctx.file,
                    span.line,
                    span.column,
                    codes::UNSUPPORTED,
                    "break inside a switch case body is not translated".to_string(),
                );
                out.push(
                    PyStmt::at(PyStmtKind::Pass, span)
                        .with_comment("TODO: break out of switch was not translated"),
                );
            }
            None => {
                out.push(PyStmt::at(PyStmtKind::Break, span));
            }
        },
        Some(label) => {
            let depth = ctx.fn_state.loop_depth;
            match ctx.fn_state.labels.iter_mut().rev().find(|f| f.label == label) {
                Some(frame) if depth == frame.body_depth => {
                    out.push(PyStmt::at(PyStmtKind::Break, span));
                }
                Some(frame) => {
                    frame.break_used += 1;
                    let flag = frame.break_flag.clone();
                    out.push(PyStmt::at(
                        PyStmtKind::Assign {
                            target: PyExpr::Name(flag),
                            value: PyExpr::Bool(true),
                        },
                        span,
                    ));
                    out.push(PyStmt::new(PyStmtKind::Break));
                }
                None => {
                    ctx.bus.warn(
                        ctx.file,
                        span.line,
                        span.column,
                        codes::LABELED,
                        format!("break {label} has no enclosing labeled loop"),
                    );
                    out.push(PyStmt::at(PyStmtKind::Break, span));
                }
            }
        }
    }
}

fn lower_continue(label: Option<&str>, span: Span, ctx: &mut Ctx, out: &mut Vec<PyStmt>) {
    match label {
        None => out.push(PyStmt::at(PyStmtKind::Continue, span)),
        Some(label) => {
            let depth = ctx.fn_state.loop_depth;
            match ctx.fn_state.labels.iter_mut().rev().find(|f| f.label == label) {
                Some(frame) if depth == frame.body_depth => {
                    out.push(PyStmt::at(PyStmtKind::Continue, span));
                }
                Some(frame) => {
                    frame.continue_used += 1;
                    let flag = frame.continue_flag.clone();
                    out.push(PyStmt::at(
                        PyStmtKind::Assign {
                            target: PyExpr::Name(flag),
                            value: PyExpr::Bool(true),
                        },
                        span,
                    ));
                    out.push(PyStmt::new(PyStmtKind::Break));
                }
                None => {
                    ctx.bus.warn(
                        ctx.file,
                        span.line,
                        span.column,
                        codes::LABELED,
                        format!("continue {label} has no enclosing labeled loop"),
                    );
                    out.push(PyStmt::at(PyStmtKind::Continue, span));
                }
            }
        }
    }
}

/// Scans for labeled jumps targeting `label`
fn label_is_used(statement: &Statement, label: &str) -> bool {
    match statement {
        Statement::BreakStatement { label: Some(l), .. }
        | Statement::ContinueStatement { label: Some(l), .. } => l == label,
        Statement::BlockStatement { body, .. } => body.iter().any(|s| label_is_used(s, label)),
        Statement::IfStatement { consequent, alternate, .. } => {
            label_is_used(consequent, label)
                || alternate.as_ref().is_some_and(|a| label_is_used(a, label))
        }
        Statement::ForStatement { body, .. }
        | Statement::ForInStatement { body, .. }
        | Statement::ForOfStatement { body, .. }
        | Statement::WhileStatement { body, .. }
        | Statement::DoWhileStatement { body, .. }
        | Statement::LabeledStatement { body, .. }
        | Statement::WithStatement { body, .. } => label_is_used(body, label),
        Statement::SwitchStatement { cases, .. } => cases
            .iter()
            .any(|c| c.consequent.iter().any(|s| label_is_used(s, label))),
        Statement::TryStatement { block, handler, finalizer, .. } => {
            block.iter().any(|s| label_is_used(s, label))
                || handler
                    .as_ref()
                    .is_some_and(|h| h.body.iter().any(|s| label_is_used(s, label)))
                || finalizer
                    .as_ref()
                    .is_some_and(|f| f.iter().any(|s| label_is_used(s, label)))
        }
        _ => false,
    }
}

fn lower_labeled(
    label: &str,
    body: &Statement,
    span: Span,
    ctx: &mut Ctx,
    out: &mut Vec<PyStmt>,
) -> TransformResult<()> {
    // Unused labels are dropped
    if !label_is_used(body, label) {
        out.extend(lower_statement(body, ctx)?);
        return Ok(());
    }

    let is_loop = matches!(
        body,
        Statement::ForStatement { .. }
            | Statement::ForInStatement { .. }
            | Statement::ForOfStatement { .. }
            | Statement::WhileStatement { .. }
            | Statement::DoWhileStatement { .. }
    );
    if !is_loop {
        ctx.bus.warn(
            ctx.file,
            span.line,
            span.column,
            codes::LABELED,
            format!("label {label} on a non-loop statement is not translated"),
        );
        out.extend(lower_statement(body, ctx)?);
        return Ok(());
    }

    ctx.bus.warn(
        ctx.file,
        span.line,
        span.column,
        codes::LABELED,
        format!("labeled jumps to {label} are rewritten with flag variables"),
    );

    let frame = LabelFrame {
        label: label.to_string(),
        break_flag: format!("_brk_{label}"),
        continue_flag: format!("_cnt_{label}"),
        body_depth: ctx.fn_state.loop_depth + 1,
        break_used: 0,
        continue_used: 0,
    };
    ctx.fn_state.labels.push(frame);

    // The flag propagation in lower_loop_body stops at the labeled loop by
    // depth, so the loop lowers through its plain rule.
    let lowered = lower_statement(body, ctx)?;

    let frame = ctx.fn_state.labels.pop().expect("label frame pushed above");
    if frame.break_used > 0 {
        out.push(PyStmt::new(PyStmtKind::Assign {
            target: PyExpr::Name(frame.break_flag),
            value: PyExpr::Bool(false),
        }));
    }
    if frame.continue_used > 0 {
        out.push(PyStmt::new(PyStmtKind::Assign {
            target: PyExpr::Name(frame.continue_flag),
            value: PyExpr::Bool(false),
        }));
    }
    out.extend(lowered);
    Ok(())
}

// ---- try/catch ----------------------------------------------------------

fn lower_catch(handler: &CatchClause, ctx: &mut Ctx) -> TransformResult<PyExcept> {
    let mut body = Vec::new();
    let bound_name = match &handler.param {
        Some(Pattern::Identifier(id)) => {
            let name = ctx.rename_identifier(&id.name, id.span);
            let raw = ctx.fresh_temp();
            // The except clause binds the JsError; the catch variable sees
            // the original thrown value.
            body.push(PyStmt::new(PyStmtKind::Assign {
                target: PyExpr::Name(name),
                value: PyExpr::attr(PyExpr::name(raw.clone()), "value"),
            }));
            Some(raw)
        }
        Some(other) => {
            let span = other.span();
            ctx.bus.warn(
                ctx.file,
                span.line,
                span.column,
                codes::UNSUPPORTED,
                "destructuring catch parameter is outside the supported subset".to_string(),
            );
            None
        }
        None => None,
    };
    for statement in &handler.body {
        body.extend(lower_statement(statement, ctx)?);
    }
    if body.is_empty() {
        body.push(PyStmt::new(PyStmtKind::Pass));
    }
    Ok(PyExcept {
        class_name: Some("JsError".to_string()),
        name: bound_name,
        body,
    })
}

// ---- functions and classes ----------------------------------------------

/// Lowers a function declaration/expression body into a def. The `self`
/// parameter and constructor behavior are driven by the analyzer's `this`
/// classification.
fn lower_function_def(
    name: &str,
    params: &[Param],
    body: &[Statement],
    span: Span,
    self_param: Option<&str>,
    is_constructor: bool,
    ctx: &mut Ctx,
) -> TransformResult<PyStmt> {
    let saved = ctx.enter_function(self_param.map(|s| s.to_string()), is_constructor);

    let mut py_params: Vec<PyParam> = Vec::new();
    if let Some(self_name) = self_param {
        py_params.push(PyParam::plain(self_name));
    }

    let mut prologue: Vec<PyStmt> = Vec::new();
    for (index, param) in params.iter().enumerate() {
        if param.rest {
            let rest_name = match &param.pattern {
                Pattern::Identifier(id) => ctx.rename_identifier(&id.name, id.span),
                _ => ctx.fresh_temp(),
            };
            py_params.push(PyParam {
                name: rest_name.clone(),
                default: None,
                star: true,
            });
            // Rest arguments arrive as a tuple; the body sees a list
            prologue.push(PyStmt::new(PyStmtKind::Assign {
                target: PyExpr::Name(rest_name.clone()),
                value: PyExpr::call(PyExpr::name("list"), vec![PyExpr::Name(rest_name)]),
            }));
            continue;
        }
        match &param.pattern {
            Pattern::Identifier(id) => {
                let param_name = ctx.rename_identifier(&id.name, id.span);
                let default = match &param.default {
                    Some(default) => {
                        Some(expressions::lower_expression(default, ctx, &mut prologue)?)
                    }
                    None => None,
                };
                py_params.push(PyParam {
                    name: param_name,
                    default,
                    star: false,
                });
            }
            pattern => {
                let synth = format!("_p{index}");
                py_params.push(PyParam::plain(synth.clone()));
                lower_destructuring(pattern, PyExpr::name(synth), ctx, &mut prologue)?;
            }
        }
    }

    let hoisted = ctx.hoist_sink_for(span);

    let mut lowered_body = prologue;
    for statement in body {
        lowered_body.extend(lower_statement(statement, ctx)?);
    }
    if lowered_body.is_empty() && hoisted.is_empty() {
        lowered_body.push(PyStmt::new(PyStmtKind::Pass));
    }

    ctx.leave_function(saved);

    Ok(PyStmt::at(
        PyStmtKind::FunctionDef {
            name: name.to_string(),
            params: py_params,
            hoisted,
            body: lowered_body,
        },
        span,
    ))
}

/// Non-method function: ordinary unless observed as a constructor, in which
/// case the runtime passes the synthesized instance as a leading parameter.
pub fn lower_plain_function(name: &str, func: &Function, ctx: &mut Ctx) -> TransformResult<PyStmt> {
    if func.is_generator || func.is_async {
        let what = if func.is_generator { "generator" } else { "async function" };
        ctx.bus.warn(
            ctx.file,
            func.span.line,
            func.span.column,
            codes::UNSUPPORTED,
            format!("{what} bodies are translated without their scheduling semantics"),
        );
        ctx.todo_comment(format!("TODO: {what} semantics were not translated"));
    }
    let is_constructor = ctx.this_kind_of(func.span) == ThisKind::Constructor;
    let self_param = if is_constructor { Some("this") } else { None };
    lower_function_def(
        name,
        &func.params,
        &func.body,
        func.span,
        self_param,
        false,
        ctx,
    )
}

/// Function expression: a named inner def lifted above the use site; its
/// value is a reference to the def's name.
pub fn lower_function_expression(
    func: &Function,
    ctx: &mut Ctx,
    sink: &mut Vec<PyStmt>,
) -> TransformResult<PyExpr> {
    let name = match &func.id {
        Some(id) => ctx.rename_identifier(&id.name, id.span),
        None => ctx.fresh_fn(),
    };
    let stmt = lower_plain_function(&name, func, ctx)?;
    sink.push(stmt);
    Ok(PyExpr::Name(name))
}

/// Arrow function that could not stay a lambda: a lifted def closing over
/// the enclosing `this`.
pub fn lower_arrow_function(
    arrow: &Arrow,
    ctx: &mut Ctx,
    sink: &mut Vec<PyStmt>,
) -> TransformResult<PyExpr> {
    let name = ctx.fresh_fn();
    let saved = ctx.enter_arrow();

    let mut py_params: Vec<PyParam> = Vec::new();
    let mut prologue: Vec<PyStmt> = Vec::new();
    for (index, param) in arrow.params.iter().enumerate() {
        if param.rest {
            let rest_name = match &param.pattern {
                Pattern::Identifier(id) => ctx.rename_identifier(&id.name, id.span),
                _ => ctx.fresh_temp(),
            };
            py_params.push(PyParam {
                name: rest_name.clone(),
                default: None,
                star: true,
            });
            prologue.push(PyStmt::new(PyStmtKind::Assign {
                target: PyExpr::Name(rest_name.clone()),
                value: PyExpr::call(PyExpr::name("list"), vec![PyExpr::Name(rest_name)]),
            }));
            continue;
        }
        match &param.pattern {
            Pattern::Identifier(id) => {
                let param_name = ctx.rename_identifier(&id.name, id.span);
                let default = match &param.default {
                    Some(default) => {
                        Some(expressions::lower_expression(default, ctx, &mut prologue)?)
                    }
                    None => None,
                };
                py_params.push(PyParam {
                    name: param_name,
                    default,
                    star: false,
                });
            }
            pattern => {
                let synth = format!("_p{index}");
                py_params.push(PyParam::plain(synth.clone()));
                lower_destructuring(pattern, PyExpr::name(synth), ctx, &mut prologue)?;
            }
        }
    }

    let hoisted = ctx.hoist_sink_for(arrow.span);
    let mut body = prologue;
    match &arrow.body {
        ArrowBody::Expression(expression) => {
            let mut expr_sink = Vec::new();
            let value = expressions::lower_expression(expression, ctx, &mut expr_sink)?;
            body.extend(expr_sink);
            body.push(PyStmt::new(PyStmtKind::Return { value: Some(value) }));
        }
        ArrowBody::Block(statements) => {
            for statement in statements {
                body.extend(lower_statement(statement, ctx)?);
            }
        }
    }
    if body.is_empty() && hoisted.is_empty() {
        body.push(PyStmt::new(PyStmtKind::Pass));
    }

    ctx.leave_function(saved);

    sink.push(PyStmt::at(
        PyStmtKind::FunctionDef {
            name: name.clone(),
            params: py_params,
            hoisted,
            body,
        },
        arrow.span,
    ));
    Ok(PyExpr::Name(name))
}

/// Class lowering: methods become defs with a leading `self`, the
/// constructor becomes the initializer, `this` rewrites to `self`.
pub fn lower_class_with_sink(
    class: &Class,
    name: &str,
    ctx: &mut Ctx,
    sink: &mut Vec<PyStmt>,
) -> TransformResult<PyStmt> {
    let base = match &class.super_class {
        Some(super_class) => Some(expressions::lower_expression(super_class, ctx, sink)?),
        None => None,
    };

    let mut body: Vec<PyStmt> = Vec::new();
    for element in &class.body {
        match element {
            ClassElement::MethodDefinition { key, value, kind, is_static, span } => {
                let method_name = match (key.static_name(), kind) {
                    (Some(_), MethodKind::Constructor) => "__init__".to_string(),
                    (Some(name), _) => {
                        if matches!(kind, MethodKind::Get | MethodKind::Set) {
                            ctx.bus.warn(
                                ctx.file,
                                span.line,
                                span.column,
                                codes::GETTER,
                                "class getter/setter becomes a plain method".to_string(),
                            );
                        }
                        name.to_string()
                    }
                    (None, _) => {
                        ctx.bus.warn(
                            ctx.file,
                            span.line,
                            span.column,
                            codes::UNSUPPORTED,
                            "computed method name is outside the supported subset".to_string(),
                        );
                        continue;
                    }
                };
                // Static methods drop the instance parameter
                let self_param = if *is_static { None } else { Some("self") };
                let is_constructor = matches!(kind, MethodKind::Constructor);
                let stmt = lower_function_def(
                    &method_name,
                    &value.params,
                    &value.body,
                    value.span,
                    self_param,
                    is_constructor,
                    ctx,
                )?;
                body.push(stmt);
            }
            ClassElement::PropertyDefinition { key, value, span, .. } => {
                let Some(prop_name) = key.static_name().map(|s| s.to_string()) else {
                    ctx.bus.warn(
                        ctx.file,
                        span.line,
                        span.column,
                        codes::UNSUPPORTED,
                        "computed class property name is outside the supported subset"
                            .to_string(),
                    );
                    continue;
                };
                let value = match value {
                    Some(value) => expressions::lower_expression(value, ctx, &mut body)?,
                    None => PyExpr::name("JSUndefined"),
                };
                body.push(PyStmt::at(
                    PyStmtKind::Assign {
                        target: PyExpr::name(prop_name),
                        value,
                    },
                    *span,
                ));
            }
        }
    }

    if body.is_empty() {
        body.push(PyStmt::new(PyStmtKind::Pass));
    }

    Ok(PyStmt::at(
        PyStmtKind::ClassDef {
            name: name.to_string(),
            base,
            body,
        },
        class.span,
    ))
}
