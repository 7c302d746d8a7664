//! # Expression Lowering Rules
//!
//! One rule per source expression kind. Rules receive the shared [`Ctx`] and
//! a statement sink: constructs with no expression-level equivalent in the
//! target (assignments, updates, lifted function definitions, dict builds
//! with computed keys) emit statements into the sink and yield a name.
//!
//! Operator semantics route through the runtime facade: `+` goes to
//! `js_plus` unless both operands are numeric literals, loose equality goes
//! to `loose_eq`, logical operators go to the operand-returning helpers,
//! indexing goes to `js_getindex`/`js_setindex`.

use crate::diagnostics::codes;
use crate::parser::ast_types::{
    ArrayElement, Arrow, ArrowBody, AssignTarget, BinaryOperator, CallArg, Expression, Literal,
    LogicalOperator, ObjectProperty, Pattern, PropertyKey, PropertyKind, Span, UnaryOperator,
    UpdateOperator,
};
use crate::transformer::py_ast::{PyBinOp, PyCmpOp, PyExpr, PyStmt, PyStmtKind, PyUnaryOp};
use crate::transformer::{Ctx, TransformResult, statements};

/// Lowers one source expression, emitting lifted statements into `sink`
pub fn lower_expression(
    expr: &Expression,
    ctx: &mut Ctx,
    sink: &mut Vec<PyStmt>,
) -> TransformResult<PyExpr> {
    match expr {
        Expression::Identifier(id) => Ok(lower_identifier(&id.name, id.span, ctx)),
        Expression::Literal(literal) => Ok(lower_literal(literal)),
        Expression::This { .. } => Ok(match ctx.current_self() {
            Some(name) => PyExpr::name(name),
            None => PyExpr::name("JSUndefined"),
        }),
        Expression::Binary { left, operator, right, .. } => {
            lower_binary(left, *operator, right, ctx, sink)
        }
        Expression::Logical { left, operator, right, .. } => {
            let left = lower_expression(left, ctx, sink)?;
            let right = lower_expression(right, ctx, sink)?;
            let helper = match operator {
                LogicalOperator::And => "js_and",
                LogicalOperator::Or => "js_or",
                LogicalOperator::NullishCoalescing => "js_nullish",
            };
            Ok(PyExpr::helper(helper, vec![left, right]))
        }
        Expression::Unary { operator, argument, span } => {
            lower_unary(*operator, argument, *span, ctx, sink)
        }
        Expression::Assignment { target, operator, value, span } => {
            lower_assignment_expression(target, *operator, value, *span, ctx, sink)
        }
        Expression::Update { operator, prefix, target, span } => {
            lower_update(*operator, *prefix, target, *span, ctx, sink)
        }
        Expression::Call { callee, arguments, span } => {
            lower_call(callee, arguments, *span, ctx, sink)
        }
        Expression::New { callee, arguments, .. } => {
            let args = lower_call_args(arguments, ctx, sink)?;
            // A `new` whose callee is a class declared in this module is a
            // plain constructor call; everything else goes through the
            // runtime class shim.
            if let Expression::Identifier(id) = callee.as_ref() {
                if ctx.resolves_to_class(id.span) {
                    let name = ctx.rename_identifier(&id.name, id.span);
                    return Ok(PyExpr::call(PyExpr::Name(name), args));
                }
            }
            let callee = lower_expression(callee, ctx, sink)?;
            let mut full = vec![callee];
            full.extend(args);
            Ok(PyExpr::helper("js_new", full))
        }
        Expression::Member { object, property, computed, .. } => {
            let object = lower_expression(object, ctx, sink)?;
            if *computed {
                let key = lower_expression(property, ctx, sink)?;
                Ok(PyExpr::helper("js_getindex", vec![object, key]))
            } else {
                let name = property
                    .as_identifier_name()
                    .unwrap_or_default()
                    .to_string();
                Ok(PyExpr::attr(object, name))
            }
        }
        Expression::Conditional { test, consequent, alternate, .. } => {
            let test = lower_expression(test, ctx, sink)?;
            let body = lower_expression(consequent, ctx, sink)?;
            let orelse = lower_expression(alternate, ctx, sink)?;
            Ok(PyExpr::Conditional {
                test: Box::new(test),
                body: Box::new(body),
                orelse: Box::new(orelse),
            })
        }
        Expression::Sequence { expressions, .. } => {
            let mut last = PyExpr::name("JSUndefined");
            for (i, expression) in expressions.iter().enumerate() {
                let lowered = lower_expression(expression, ctx, sink)?;
                if i + 1 == expressions.len() {
                    last = lowered;
                } else {
                    sink.push(PyStmt::new(PyStmtKind::Expr { value: lowered }));
                }
            }
            Ok(last)
        }
        Expression::FunctionExpression(func) => {
            statements::lower_function_expression(func, ctx, sink)
        }
        Expression::ArrowFunction(arrow) => lower_arrow(arrow, ctx, sink),
        Expression::ClassExpression(class) => {
            let name = match &class.id {
                Some(id) => ctx.rename_identifier(&id.name, id.span),
                None => ctx.fresh_fn(),
            };
            let stmt = statements::lower_class_with_sink(class, &name, ctx, sink)?;
            sink.push(stmt);
            Ok(PyExpr::Name(name))
        }
        Expression::Object { properties, span } => {
            lower_object_literal(properties, *span, ctx, sink)
        }
        Expression::Array { elements, .. } => {
            let mut out = Vec::with_capacity(elements.len());
            for element in elements {
                match element {
                    ArrayElement::Expression(expression) => {
                        out.push(lower_expression(expression, ctx, sink)?);
                    }
                    ArrayElement::Spread { argument, .. } => {
                        let argument = lower_expression(argument, ctx, sink)?;
                        out.push(PyExpr::Starred(Box::new(PyExpr::helper(
                            "spread",
                            vec![argument],
                        ))));
                    }
                    ArrayElement::Hole { span } => {
                        ctx.bus.info(
                            ctx.file,
                            span.line,
                            span.column,
                            codes::SPARSE_ARRAY,
                            "array hole becomes the undefined sentinel".to_string(),
                        );
                        out.push(PyExpr::name("JSUndefined"));
                    }
                }
            }
            Ok(PyExpr::List(out))
        }
        Expression::TemplateLiteral { quasis, expressions, .. } => {
            let mut parts: Vec<PyExpr> = Vec::new();
            for (i, quasi) in quasis.iter().enumerate() {
                if !quasi.value.is_empty() {
                    parts.push(PyExpr::Str(quasi.value.clone()));
                }
                if let Some(expression) = expressions.get(i) {
                    let lowered = lower_expression(expression, ctx, sink)?;
                    parts.push(PyExpr::helper("js_str", vec![lowered]));
                }
            }
            let mut iter = parts.into_iter();
            let first = iter.next().unwrap_or(PyExpr::Str(String::new()));
            Ok(iter.fold(first, |acc, part| PyExpr::BinOp {
                left: Box::new(acc),
                op: PyBinOp::Add,
                right: Box::new(part),
            }))
        }
        Expression::Unsupported { construct, span } => {
            ctx.bus.warn(
                ctx.file,
                span.line,
                span.column,
                codes::UNSUPPORTED,
                format!("{construct} is outside the supported subset"),
            );
            ctx.todo_comment(format!("TODO: {construct} was not translated"));
            Ok(PyExpr::name("JSUndefined"))
        }
    }
}

fn lower_identifier(name: &str, span: Span, ctx: &mut Ctx) -> PyExpr {
    match name {
        "undefined" => PyExpr::name("JSUndefined"),
        "NaN" => PyExpr::call(PyExpr::name("float"), vec![PyExpr::string("nan")]),
        "Infinity" => PyExpr::call(PyExpr::name("float"), vec![PyExpr::string("inf")]),
        _ => PyExpr::Name(ctx.rename_identifier(name, span)),
    }
}

fn lower_literal(literal: &Literal) -> PyExpr {
    match literal {
        Literal::String { value, .. } => PyExpr::Str(value.clone()),
        Literal::Number { value, .. } => PyExpr::Num(*value),
        Literal::Boolean { value, .. } => PyExpr::Bool(*value),
        Literal::Null { .. } => PyExpr::None,
        Literal::RegExp { pattern, flags, .. } => PyExpr::helper(
            "js_regex",
            vec![PyExpr::Str(pattern.clone()), PyExpr::Str(flags.clone())],
        ),
    }
}

/// Numeric literals (including negated ones) allow direct target operators
fn is_numeric_literal(expr: &Expression) -> bool {
    match expr {
        Expression::Literal(Literal::Number { .. }) => true,
        Expression::Unary { operator: UnaryOperator::Minus, argument, .. } => {
            matches!(argument.as_ref(), Expression::Literal(Literal::Number { .. }))
        }
        _ => false,
    }
}

fn lower_binary(
    left: &Expression,
    operator: BinaryOperator,
    right: &Expression,
    ctx: &mut Ctx,
    sink: &mut Vec<PyStmt>,
) -> TransformResult<PyExpr> {
    let both_numeric = is_numeric_literal(left) && is_numeric_literal(right);
    let left = lower_expression(left, ctx, sink)?;
    let right = lower_expression(right, ctx, sink)?;

    let direct = |op: PyBinOp, left: PyExpr, right: PyExpr| PyExpr::BinOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    };
    let compare = |op: PyCmpOp, left: PyExpr, right: PyExpr| PyExpr::Compare {
        left: Box::new(left),
        op,
        right: Box::new(right),
    };
    let coercing = |helper: &str, py_op: PyBinOp, left: PyExpr, right: PyExpr| {
        if both_numeric {
            direct(py_op, left, right)
        } else {
            PyExpr::helper(helper, vec![left, right])
        }
    };

    Ok(match operator {
        BinaryOperator::Add => coercing("js_plus", PyBinOp::Add, left, right),
        BinaryOperator::Subtract => coercing("js_sub", PyBinOp::Sub, left, right),
        BinaryOperator::Multiply => coercing("js_mul", PyBinOp::Mult, left, right),
        // Always numeric true division, never integer truncation
        BinaryOperator::Divide => coercing("js_div", PyBinOp::Div, left, right),
        BinaryOperator::Remainder => coercing("js_mod", PyBinOp::Mod, left, right),
        BinaryOperator::Exponentiation => direct(PyBinOp::Pow, left, right),
        BinaryOperator::StrictEqual => compare(PyCmpOp::Eq, left, right),
        BinaryOperator::StrictNotEqual => compare(PyCmpOp::NotEq, left, right),
        BinaryOperator::Equal => PyExpr::helper("loose_eq", vec![left, right]),
        BinaryOperator::NotEqual => PyExpr::UnaryOp {
            op: PyUnaryOp::Not,
            operand: Box::new(PyExpr::helper("loose_eq", vec![left, right])),
        },
        BinaryOperator::LessThan => compare(PyCmpOp::Lt, left, right),
        BinaryOperator::LessThanEqual => compare(PyCmpOp::LtE, left, right),
        BinaryOperator::GreaterThan => compare(PyCmpOp::Gt, left, right),
        BinaryOperator::GreaterThanEqual => compare(PyCmpOp::GtE, left, right),
        BinaryOperator::LeftShift => direct(PyBinOp::LShift, left, right),
        BinaryOperator::RightShift => direct(PyBinOp::RShift, left, right),
        BinaryOperator::UnsignedRightShift => PyExpr::helper("js_urshift", vec![left, right]),
        BinaryOperator::BitwiseAnd => direct(PyBinOp::BitAnd, left, right),
        BinaryOperator::BitwiseOr => direct(PyBinOp::BitOr, left, right),
        BinaryOperator::BitwiseXor => direct(PyBinOp::BitXor, left, right),
        BinaryOperator::In => PyExpr::helper("js_in", vec![left, right]),
        BinaryOperator::Instanceof => PyExpr::helper("js_instanceof", vec![left, right]),
    })
}

fn lower_unary(
    operator: UnaryOperator,
    argument: &Expression,
    span: Span,
    ctx: &mut Ctx,
    sink: &mut Vec<PyStmt>,
) -> TransformResult<PyExpr> {
    if operator == UnaryOperator::Delete {
        return lower_delete(argument, span, ctx, sink);
    }
    if operator == UnaryOperator::Typeof {
        let argument = lower_expression(argument, ctx, sink)?;
        return Ok(PyExpr::helper("js_typeof", vec![argument]));
    }
    let lowered = lower_expression(argument, ctx, sink)?;
    Ok(match operator {
        UnaryOperator::Plus => PyExpr::UnaryOp {
            op: PyUnaryOp::UAdd,
            operand: Box::new(lowered),
        },
        UnaryOperator::Minus => PyExpr::UnaryOp {
            op: PyUnaryOp::USub,
            operand: Box::new(lowered),
        },
        UnaryOperator::LogicalNot => PyExpr::UnaryOp {
            op: PyUnaryOp::Not,
            operand: Box::new(lowered),
        },
        UnaryOperator::BitwiseNot => PyExpr::UnaryOp {
            op: PyUnaryOp::Invert,
            operand: Box::new(lowered),
        },
        UnaryOperator::Void => PyExpr::helper("js_void", vec![lowered]),
        UnaryOperator::Typeof | UnaryOperator::Delete => unreachable!(),
    })
}

fn lower_delete(
    argument: &Expression,
    span: Span,
    ctx: &mut Ctx,
    sink: &mut Vec<PyStmt>,
) -> TransformResult<PyExpr> {
    match argument {
        Expression::Member { object, property, computed, .. } => {
            let object = lower_expression(object, ctx, sink)?;
            let key = if *computed {
                lower_expression(property, ctx, sink)?
            } else {
                PyExpr::Str(property.as_identifier_name().unwrap_or_default().to_string())
            };
            Ok(PyExpr::helper("js_delete", vec![object, key]))
        }
        _ => {
            ctx.bus.warn(
                ctx.file,
                span.line,
                span.column,
                codes::UNSUPPORTED,
                "delete of a non-member expression is not translated".to_string(),
            );
            Ok(PyExpr::Bool(true))
        }
    }
}

/// A lowered assignment target with side effects hoisted into temporaries
enum PreparedTarget {
    Name(String),
    Attribute { object: PyExpr, attr: String },
    Index { object: PyExpr, key: PyExpr },
}

impl PreparedTarget {
    fn read(&self) -> PyExpr {
        match self {
            PreparedTarget::Name(name) => PyExpr::name(name.clone()),
            PreparedTarget::Attribute { object, attr } => {
                PyExpr::attr(object.clone(), attr.clone())
            }
            PreparedTarget::Index { object, key } => {
                PyExpr::helper("js_getindex", vec![object.clone(), key.clone()])
            }
        }
    }

    fn write(&self, value: PyExpr) -> PyStmt {
        match self {
            PreparedTarget::Name(name) => PyStmt::new(PyStmtKind::Assign {
                target: PyExpr::name(name.clone()),
                value,
            }),
            PreparedTarget::Attribute { object, attr } => PyStmt::new(PyStmtKind::Assign {
                target: PyExpr::attr(object.clone(), attr.clone()),
                value,
            }),
            PreparedTarget::Index { object, key } => PyStmt::new(PyStmtKind::Expr {
                value: PyExpr::helper(
                    "js_setindex",
                    vec![object.clone(), key.clone(), value],
                ),
            }),
        }
    }
}

/// Lowers an assignment target; member objects and computed keys that are
/// not plain names are bound to temporaries so reads and writes agree.
fn prepare_target(
    target: &AssignTarget,
    ctx: &mut Ctx,
    sink: &mut Vec<PyStmt>,
) -> TransformResult<Option<PreparedTarget>> {
    match target {
        AssignTarget::Identifier(id) => {
            Ok(Some(PreparedTarget::Name(ctx.rename_identifier(&id.name, id.span))))
        }
        AssignTarget::Member { object, property, computed, .. } => {
            let object = lower_expression(object, ctx, sink)?;
            let object = bind_to_temp_unless_name(object, ctx, sink);
            if *computed {
                let key = lower_expression(property, ctx, sink)?;
                let key = bind_to_temp_unless_simple(key, ctx, sink);
                Ok(Some(PreparedTarget::Index { object, key }))
            } else {
                let attr = property
                    .as_identifier_name()
                    .unwrap_or_default()
                    .to_string();
                Ok(Some(PreparedTarget::Attribute { object, attr }))
            }
        }
        AssignTarget::Unsupported { construct, span } => {
            ctx.bus.warn(
                ctx.file,
                span.line,
                span.column,
                codes::UNSUPPORTED,
                format!("{construct} target is outside the supported subset"),
            );
            ctx.todo_comment(format!("TODO: {construct} target was not translated"));
            Ok(None)
        }
    }
}

fn bind_to_temp_unless_name(expr: PyExpr, ctx: &mut Ctx, sink: &mut Vec<PyStmt>) -> PyExpr {
    match expr {
        PyExpr::Name(_) => expr,
        other => {
            let tmp = ctx.fresh_temp();
            sink.push(PyStmt::new(PyStmtKind::Assign {
                target: PyExpr::name(tmp.clone()),
                value: other,
            }));
            PyExpr::name(tmp)
        }
    }
}

fn bind_to_temp_unless_simple(expr: PyExpr, ctx: &mut Ctx, sink: &mut Vec<PyStmt>) -> PyExpr {
    match expr {
        PyExpr::Name(_) | PyExpr::Str(_) | PyExpr::Num(_) | PyExpr::Bool(_) | PyExpr::None => expr,
        other => {
            let tmp = ctx.fresh_temp();
            sink.push(PyStmt::new(PyStmtKind::Assign {
                target: PyExpr::name(tmp.clone()),
                value: other,
            }));
            PyExpr::name(tmp)
        }
    }
}

/// Computes the stored value for a (possibly compound) assignment
fn combined_value(
    target: &PreparedTarget,
    operator: crate::parser::ast_types::AssignmentOperator,
    value: PyExpr,
) -> PyExpr {
    if let Some(op) = operator.binary_op() {
        let helper = match op {
            BinaryOperator::Add => Some("js_plus"),
            BinaryOperator::Subtract => Some("js_sub"),
            BinaryOperator::Multiply => Some("js_mul"),
            BinaryOperator::Divide => Some("js_div"),
            BinaryOperator::Remainder => Some("js_mod"),
            BinaryOperator::UnsignedRightShift => Some("js_urshift"),
            _ => None,
        };
        match helper {
            Some(helper) => PyExpr::helper(helper, vec![target.read(), value]),
            None => {
                let py_op = match op {
                    BinaryOperator::Exponentiation => PyBinOp::Pow,
                    BinaryOperator::LeftShift => PyBinOp::LShift,
                    BinaryOperator::RightShift => PyBinOp::RShift,
                    BinaryOperator::BitwiseAnd => PyBinOp::BitAnd,
                    BinaryOperator::BitwiseOr => PyBinOp::BitOr,
                    BinaryOperator::BitwiseXor => PyBinOp::BitXor,
                    _ => PyBinOp::Add,
                };
                PyExpr::BinOp {
                    left: Box::new(target.read()),
                    op: py_op,
                    right: Box::new(value),
                }
            }
        }
    } else if let Some(op) = operator.logical_op() {
        let helper = match op {
            LogicalOperator::And => "js_and",
            LogicalOperator::Or => "js_or",
            LogicalOperator::NullishCoalescing => "js_nullish",
        };
        PyExpr::helper(helper, vec![target.read(), value])
    } else {
        value
    }
}

/// Assignment in expression position: the write goes to the sink and the
/// expression yields the assigned value.
fn lower_assignment_expression(
    target: &AssignTarget,
    operator: crate::parser::ast_types::AssignmentOperator,
    value: &Expression,
    _span: Span,
    ctx: &mut Ctx,
    sink: &mut Vec<PyStmt>,
) -> TransformResult<PyExpr> {
    let Some(prepared) = prepare_target(target, ctx, sink)? else {
        return Ok(PyExpr::name("JSUndefined"));
    };
    let value = lower_expression(value, ctx, sink)?;
    let stored = combined_value(&prepared, operator, value);

    match &prepared {
        PreparedTarget::Name(name) => {
            sink.push(prepared.write(stored));
            Ok(PyExpr::name(name.clone()))
        }
        _ => {
            let tmp = ctx.fresh_temp();
            sink.push(PyStmt::new(PyStmtKind::Assign {
                target: PyExpr::name(tmp.clone()),
                value: stored,
            }));
            sink.push(prepared.write(PyExpr::name(tmp.clone())));
            Ok(PyExpr::name(tmp))
        }
    }
}

/// Statement-position assignment; avoids the result temporary
pub fn lower_assignment_statement(
    target: &AssignTarget,
    operator: crate::parser::ast_types::AssignmentOperator,
    value: &Expression,
    ctx: &mut Ctx,
    sink: &mut Vec<PyStmt>,
) -> TransformResult<()> {
    let Some(prepared) = prepare_target(target, ctx, sink)? else {
        return Ok(());
    };
    let value = lower_expression(value, ctx, sink)?;
    let stored = combined_value(&prepared, operator, value);
    sink.push(prepared.write(stored));
    Ok(())
}

/// `++x` / `x--`: compute old, assign new, yield old or new
fn lower_update(
    operator: UpdateOperator,
    prefix: bool,
    target: &AssignTarget,
    _span: Span,
    ctx: &mut Ctx,
    sink: &mut Vec<PyStmt>,
) -> TransformResult<PyExpr> {
    let Some(prepared) = prepare_target(target, ctx, sink)? else {
        return Ok(PyExpr::name("JSUndefined"));
    };
    let helper = match operator {
        UpdateOperator::Increment => "js_plus",
        UpdateOperator::Decrement => "js_sub",
    };
    if prefix {
        let new_value = PyExpr::helper(helper, vec![prepared.read(), PyExpr::Num(1.0)]);
        sink.push(prepared.write(new_value));
        Ok(prepared.read())
    } else {
        let old = ctx.fresh_temp();
        sink.push(PyStmt::new(PyStmtKind::Assign {
            target: PyExpr::name(old.clone()),
            value: prepared.read(),
        }));
        let new_value = PyExpr::helper(helper, vec![PyExpr::name(old.clone()), PyExpr::Num(1.0)]);
        sink.push(prepared.write(new_value));
        Ok(PyExpr::name(old))
    }
}

/// Update in statement position: no old-value temporary needed
pub fn lower_update_statement(
    operator: UpdateOperator,
    target: &AssignTarget,
    ctx: &mut Ctx,
    sink: &mut Vec<PyStmt>,
) -> TransformResult<()> {
    let Some(prepared) = prepare_target(target, ctx, sink)? else {
        return Ok(());
    };
    let helper = match operator {
        UpdateOperator::Increment => "js_plus",
        UpdateOperator::Decrement => "js_sub",
    };
    let new_value = PyExpr::helper(helper, vec![prepared.read(), PyExpr::Num(1.0)]);
    sink.push(prepared.write(new_value));
    Ok(())
}

pub fn lower_call_args(
    arguments: &[CallArg],
    ctx: &mut Ctx,
    sink: &mut Vec<PyStmt>,
) -> TransformResult<Vec<PyExpr>> {
    let mut out = Vec::with_capacity(arguments.len());
    for argument in arguments {
        match argument {
            CallArg::Expression(expression) => out.push(lower_expression(expression, ctx, sink)?),
            CallArg::Spread { argument, .. } => {
                let argument = lower_expression(argument, ctx, sink)?;
                out.push(PyExpr::Starred(Box::new(PyExpr::helper(
                    "spread",
                    vec![argument],
                ))));
            }
        }
    }
    Ok(out)
}

fn lower_call(
    callee: &Expression,
    arguments: &[CallArg],
    _span: Span,
    ctx: &mut Ctx,
    sink: &mut Vec<PyStmt>,
) -> TransformResult<PyExpr> {
    // `require("m")` becomes a hoisted import and the alias name
    if let Expression::Identifier(id) = callee {
        if id.name == "require" && ctx.analysis.resolved(id.span).is_none() {
            if let Some(CallArg::Expression(Expression::Literal(Literal::String {
                value, ..
            }))) = arguments.first()
            {
                let alias = ctx.require_alias(value);
                return Ok(PyExpr::name(alias));
            }
        }
    }
    let callee = lower_expression(callee, ctx, sink)?;
    let args = lower_call_args(arguments, ctx, sink)?;
    Ok(PyExpr::call(callee, args))
}

fn lower_object_literal(
    properties: &[ObjectProperty],
    _span: Span,
    ctx: &mut Ctx,
    sink: &mut Vec<PyStmt>,
) -> TransformResult<PyExpr> {
    let mut static_entries: Vec<(PyExpr, PyExpr)> = Vec::new();
    let mut computed_entries: Vec<(PyExpr, PyExpr)> = Vec::new();

    for property in properties {
        match property {
            ObjectProperty::Property { key, value, kind, span, .. } => {
                if matches!(kind, PropertyKind::Get | PropertyKind::Set) {
                    ctx.bus.warn(
                        ctx.file,
                        span.line,
                        span.column,
                        codes::GETTER,
                        "getter/setter becomes a plain property".to_string(),
                    );
                }
                let value = lower_expression(value, ctx, sink)?;
                match key {
                    PropertyKey::Identifier { name, .. } => {
                        static_entries.push((PyExpr::Str(name.clone()), value));
                    }
                    PropertyKey::String { value: key, .. } => {
                        static_entries.push((PyExpr::Str(key.clone()), value));
                    }
                    PropertyKey::Number { value: key, .. } => {
                        static_entries.push((PyExpr::Num(*key), value));
                    }
                    PropertyKey::Computed(expression) => {
                        let key = lower_expression(expression, ctx, sink)?;
                        computed_entries.push((key, value));
                    }
                }
            }
            ObjectProperty::Spread { span, .. } => {
                ctx.bus.warn(
                    ctx.file,
                    span.line,
                    span.column,
                    codes::UNSUPPORTED,
                    "object spread is outside the supported subset".to_string(),
                );
                ctx.todo_comment("TODO: object spread was not translated");
            }
        }
    }

    if computed_entries.is_empty() {
        return Ok(PyExpr::Dict(static_entries));
    }

    // Computed keys: build the static part first, then obj_set each pair
    let tmp = ctx.fresh_temp();
    sink.push(PyStmt::new(PyStmtKind::Assign {
        target: PyExpr::name(tmp.clone()),
        value: PyExpr::Dict(static_entries),
    }));
    for (key, value) in computed_entries {
        sink.push(PyStmt::new(PyStmtKind::Expr {
            value: PyExpr::helper("obj_set", vec![PyExpr::name(tmp.clone()), key, value]),
        }));
    }
    Ok(PyExpr::name(tmp))
}

/// Arrow functions: a lambda when the body is a single expression free of
/// writes; otherwise a named inner def lifted above the use site.
fn lower_arrow(arrow: &Arrow, ctx: &mut Ctx, sink: &mut Vec<PyStmt>) -> TransformResult<PyExpr> {
    if let ArrowBody::Expression(body) = &arrow.body {
        let simple_params = arrow
            .params
            .iter()
            .all(|p| matches!(p.pattern, Pattern::Identifier(_)) && p.default.is_none() && !p.rest);
        if simple_params && is_lambda_safe(body) {
            let saved = ctx.enter_arrow();
            let params: Vec<String> = arrow
                .params
                .iter()
                .map(|p| match &p.pattern {
                    Pattern::Identifier(id) => ctx.rename_identifier(&id.name, id.span),
                    _ => unreachable!("checked simple_params"),
                })
                .collect();
            let mut body_sink = Vec::new();
            let lowered = lower_expression(body, ctx, &mut body_sink)?;
            ctx.leave_function(saved);
            if body_sink.is_empty() {
                return Ok(PyExpr::Lambda {
                    params,
                    body: Box::new(lowered),
                });
            }
            // Lowering needed statements after all; fall through to a def,
            // discarding the speculative lowering.
        }
    }
    statements::lower_arrow_function(arrow, ctx, sink)
}

/// Syntactic check: expression lowers without a statement sink and performs
/// no writes, so it can live inside a lambda.
fn is_lambda_safe(expr: &Expression) -> bool {
    match expr {
        Expression::Assignment { .. }
        | Expression::Update { .. }
        | Expression::FunctionExpression(_)
        | Expression::ClassExpression(_)
        | Expression::Sequence { .. }
        | Expression::Unsupported { .. } => false,
        Expression::ArrowFunction(arrow) => match &arrow.body {
            ArrowBody::Expression(body) => is_lambda_safe(body),
            ArrowBody::Block(_) => false,
        },
        Expression::Identifier(_) | Expression::Literal(_) | Expression::This { .. } => true,
        Expression::Binary { left, right, .. } | Expression::Logical { left, right, .. } => {
            is_lambda_safe(left) && is_lambda_safe(right)
        }
        Expression::Unary { argument, .. } => is_lambda_safe(argument),
        Expression::Call { callee, arguments, .. }
        | Expression::New { callee, arguments, .. } => {
            is_lambda_safe(callee)
                && arguments.iter().all(|a| match a {
                    CallArg::Expression(e) | CallArg::Spread { argument: e, .. } => {
                        is_lambda_safe(e)
                    }
                })
        }
        Expression::Member { object, property, computed, .. } => {
            is_lambda_safe(object) && (!computed || is_lambda_safe(property))
        }
        Expression::Conditional { test, consequent, alternate, .. } => {
            is_lambda_safe(test) && is_lambda_safe(consequent) && is_lambda_safe(alternate)
        }
        Expression::Object { properties, .. } => properties.iter().all(|p| match p {
            ObjectProperty::Property { key, value, .. } => {
                !matches!(key, PropertyKey::Computed(_)) && is_lambda_safe(value)
            }
            ObjectProperty::Spread { .. } => false,
        }),
        Expression::Array { elements, .. } => elements.iter().all(|e| match e {
            ArrayElement::Expression(expression) => is_lambda_safe(expression),
            ArrayElement::Spread { argument, .. } => is_lambda_safe(argument),
            ArrayElement::Hole { .. } => true,
        }),
        Expression::TemplateLiteral { expressions, .. } => {
            expressions.iter().all(is_lambda_safe)
        }
    }
}
