//! # Module-Shape Mapping
//!
//! Lowers import and export forms of both module dialects. ESM imports map
//! onto target import statements (`import X from "m"` pulls the module's
//! `_default`), exports feed the record the emitter's footer prints.
//! CommonJS `require` calls hoist to `import m as _m_<n>`, and
//! `module.exports` / `exports.x` assignments land in the same export
//! record; on mixed-shape files ESM wins.

use crate::parser::ast_types::{
    AssignTarget, CallArg, Expression, ExportDefaultKind, ExportSpecifier, ImportSpecifier,
    Literal, ObjectProperty, Pattern, PropertyKind, Span, Statement, VariableDeclarator,
};
use crate::transformer::py_ast::{PyExpr, PyStmt, PyStmtKind};
use crate::transformer::{Ctx, TransformResult, expressions, statements};

/// Name under which a default export lands in the emitted module
pub const DEFAULT_EXPORT_NAME: &str = "_default";

/// Name of the conventional CommonJS export attribute
pub const MODULE_EXPORTS_NAME: &str = "_module_exports";

/// Maps a module specifier onto a target module name: basename, extension
/// dropped, non-identifier characters replaced.
pub fn sanitize_module_name(source: &str) -> String {
    let base = source
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(source)
        .trim_end_matches(".js")
        .trim_end_matches(".mjs")
        .trim_end_matches(".cjs");
    let mut out = String::with_capacity(base.len());
    for ch in base.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// ESM import declaration forms
pub fn lower_import(
    specifiers: &[ImportSpecifier],
    source: &str,
    span: Span,
    ctx: &mut Ctx,
) -> Vec<PyStmt> {
    let module = sanitize_module_name(source);

    // Side-effect-only import
    if specifiers.is_empty() {
        return vec![PyStmt::at(
            PyStmtKind::Import {
                module,
                alias: None,
            },
            span,
        )];
    }

    let mut out = Vec::new();
    let mut named: Vec<(String, Option<String>)> = Vec::new();
    for specifier in specifiers {
        match specifier {
            ImportSpecifier::Default { local } => {
                let local = ctx.rename_identifier(&local.name, local.span);
                named.push((DEFAULT_EXPORT_NAME.to_string(), Some(local)));
            }
            ImportSpecifier::Named { imported, local } => {
                let local_name = ctx.rename_identifier(&local.name, local.span);
                if *imported == local_name {
                    named.push((imported.clone(), None));
                } else {
                    named.push((imported.clone(), Some(local_name)));
                }
            }
            ImportSpecifier::Namespace { local } => {
                let local = ctx.rename_identifier(&local.name, local.span);
                out.push(PyStmt::at(
                    PyStmtKind::Import {
                        module: module.clone(),
                        alias: Some(local),
                    },
                    span,
                ));
            }
        }
    }
    if !named.is_empty() {
        out.push(PyStmt::at(
            PyStmtKind::ImportFrom {
                module,
                names: named,
            },
            span,
        ));
    }
    out
}

/// Named exports: the binding stays at module top level and joins the
/// export record; aliased specifiers get an alias assignment.
pub fn lower_export_named(
    declaration: Option<&Statement>,
    specifiers: &[ExportSpecifier],
    source: Option<&str>,
    span: Span,
    ctx: &mut Ctx,
) -> TransformResult<Vec<PyStmt>> {
    let mut out = Vec::new();

    if let Some(source) = source {
        // Re-export: pull the names in, then record them
        let module = sanitize_module_name(source);
        let names: Vec<(String, Option<String>)> = specifiers
            .iter()
            .map(|s| {
                if s.local == s.exported {
                    (s.local.clone(), None)
                } else {
                    (s.local.clone(), Some(s.exported.clone()))
                }
            })
            .collect();
        for specifier in specifiers {
            ctx.exports.add(&specifier.exported);
        }
        out.push(PyStmt::at(PyStmtKind::ImportFrom { module, names }, span));
        return Ok(out);
    }

    if let Some(declaration) = declaration {
        for name in declared_names(declaration) {
            ctx.exports.add(&name);
        }
        out.extend(statements::lower_statement(declaration, ctx)?);
    }

    for specifier in specifiers {
        ctx.exports.add(&specifier.exported);
        if specifier.local != specifier.exported {
            out.push(PyStmt::at(
                PyStmtKind::Assign {
                    target: PyExpr::name(specifier.exported.clone()),
                    value: PyExpr::name(specifier.local.clone()),
                },
                specifier.span,
            ));
        }
    }
    Ok(out)
}

/// Default export: `_default = expr` plus the record entry
pub fn lower_export_default(
    declaration: &ExportDefaultKind,
    span: Span,
    ctx: &mut Ctx,
) -> TransformResult<Vec<PyStmt>> {
    ctx.exports.has_default = true;
    let mut out = Vec::new();
    match declaration {
        ExportDefaultKind::Function(func) => {
            let name = match &func.id {
                Some(id) => ctx.rename_identifier(&id.name, id.span),
                None => ctx.fresh_fn(),
            };
            out.push(statements::lower_plain_function(&name, func, ctx)?);
            out.push(PyStmt::at(
                PyStmtKind::Assign {
                    target: PyExpr::name(DEFAULT_EXPORT_NAME),
                    value: PyExpr::Name(name),
                },
                span,
            ));
        }
        ExportDefaultKind::Class(class) => {
            let name = match &class.id {
                Some(id) => ctx.rename_identifier(&id.name, id.span),
                None => ctx.fresh_fn(),
            };
            let stmt = statements::lower_class_with_sink(class, &name, ctx, &mut out)?;
            out.push(stmt);
            out.push(PyStmt::at(
                PyStmtKind::Assign {
                    target: PyExpr::name(DEFAULT_EXPORT_NAME),
                    value: PyExpr::Name(name),
                },
                span,
            ));
        }
        ExportDefaultKind::Expression(expression) => {
            let value = expressions::lower_expression(expression, ctx, &mut out)?;
            out.push(PyStmt::at(
                PyStmtKind::Assign {
                    target: PyExpr::name(DEFAULT_EXPORT_NAME),
                    value,
                },
                span,
            ));
        }
    }
    Ok(out)
}

/// Names introduced by an exported declaration
fn declared_names(statement: &Statement) -> Vec<String> {
    match statement {
        Statement::VariableDeclaration { declarations, .. } => {
            let mut out = Vec::new();
            for declarator in declarations {
                let mut ids = Vec::new();
                declarator.id.bound_names(&mut ids);
                out.extend(ids.into_iter().map(|id| id.name.clone()));
            }
            out
        }
        Statement::FunctionDeclaration(func) => {
            func.id.iter().map(|id| id.name.clone()).collect()
        }
        Statement::ClassDeclaration(class) => {
            class.id.iter().map(|id| id.name.clone()).collect()
        }
        _ => Vec::new(),
    }
}

/// `const fs = require("fs")` and `const {a, b} = require("m")` flatten
/// into import statements. Returns `true` when the declarator was handled.
pub fn try_lower_require_declaration(
    declarator: &VariableDeclarator,
    ctx: &mut Ctx,
    out: &mut Vec<PyStmt>,
) -> TransformResult<bool> {
    let Some(Expression::Call { callee, arguments, .. }) = &declarator.init else {
        return Ok(false);
    };
    let Expression::Identifier(callee_id) = callee.as_ref() else {
        return Ok(false);
    };
    if callee_id.name != "require" || ctx.analysis.resolved(callee_id.span).is_some() {
        return Ok(false);
    }
    let Some(CallArg::Expression(Expression::Literal(Literal::String { value: source, .. }))) =
        arguments.first()
    else {
        return Ok(false);
    };
    let module = sanitize_module_name(source);

    match &declarator.id {
        Pattern::Identifier(id) => {
            let local = ctx.rename_identifier(&id.name, id.span);
            let alias = if local == module { None } else { Some(local) };
            out.push(PyStmt::at(
                PyStmtKind::Import { module, alias },
                declarator.span,
            ));
            Ok(true)
        }
        Pattern::Object { properties, rest, .. } if rest.is_none() => {
            // Destructured require flattens to a from-import when every
            // property is a plain name
            let mut names: Vec<(String, Option<String>)> = Vec::new();
            for property in properties {
                let (Some(key), Pattern::Identifier(local)) =
                    (property.key.static_name(), &property.value)
                else {
                    return Ok(false);
                };
                let local_name = ctx.rename_identifier(&local.name, local.span);
                if key == local_name {
                    names.push((key.to_string(), None));
                } else {
                    names.push((key.to_string(), Some(local_name)));
                }
            }
            out.push(PyStmt::at(
                PyStmtKind::ImportFrom { module, names },
                declarator.span,
            ));
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// CommonJS export assignments in statement position. Returns `true` when
/// the expression was a recognized export shape.
pub fn try_lower_commonjs_export(
    expression: &Expression,
    span: Span,
    ctx: &mut Ctx,
    out: &mut Vec<PyStmt>,
) -> TransformResult<bool> {
    let Expression::Assignment { target, operator, value, .. } = expression else {
        return Ok(false);
    };
    if !matches!(operator, crate::parser::ast_types::AssignmentOperator::Assign) {
        return Ok(false);
    }
    let AssignTarget::Member { object, property, computed: false, .. } = target else {
        return Ok(false);
    };

    // `module.exports = expr`
    if object.as_identifier_name() == Some("module")
        && property.as_identifier_name() == Some("exports")
    {
        // An object-literal payload with static keys defines the record
        if let Expression::Object { properties, .. } = value.as_ref() {
            let static_keys: Vec<&str> = properties
                .iter()
                .filter_map(|p| match p {
                    ObjectProperty::Property { key, kind: PropertyKind::Init, .. } => {
                        key.static_name()
                    }
                    _ => None,
                })
                .collect();
            if static_keys.len() == properties.len() {
                for key in static_keys {
                    ctx.exports.add(key);
                }
            }
        }
        let value = expressions::lower_expression(value, ctx, out)?;
        out.push(PyStmt::at(
            PyStmtKind::Assign {
                target: PyExpr::name(MODULE_EXPORTS_NAME),
                value,
            },
            span,
        ));
        return Ok(true);
    }

    // `exports.x = expr`: the binding surfaces as a module-level name
    if object.as_identifier_name() == Some("exports") {
        if let Some(exported) = property.as_identifier_name() {
            let exported = exported.to_string();
            ctx.exports.add(&exported);
            let value = expressions::lower_expression(value, ctx, out)?;
            out.push(PyStmt::at(
                PyStmtKind::Assign {
                    target: PyExpr::name(exported),
                    value,
                },
                span,
            ));
            return Ok(true);
        }
    }

    Ok(false)
}
