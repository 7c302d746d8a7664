//! # Transformer Component
//!
//! Third pipeline stage: turns the analyzed source AST into a target AST
//! whose observable behavior matches the source on the supported subset.
//! Semantic complexity that cannot be mapped directly is delegated to the
//! runtime facade (`js_plus`, `js_new`, `JsError`, …) or degraded with a
//! diagnostic plus a TODO comment at the affected site.
//!
//! ## Dispatch
//!
//! Both ASTs are closed tagged unions; lowering dispatches by node kind
//! through exhaustive matches in [`statements`] and [`expressions`]. The
//! [`Ctx`] carries everything a rule needs: the analysis result, the
//! temporary-name generator, the per-function hoist sink data, a statement
//! sink for expressions that must be lifted, and the rename log.

use std::collections::HashMap;

use thiserror::Error;

use crate::analyzer::{Analysis, BindingKind, ScopeId, ThisKind};
use crate::diagnostics::DiagnosticBus;
use crate::parser::ast_types::{Program, Span};

pub mod expressions;
pub mod identifier_renaming;
pub mod modules;
pub mod py_ast;
pub mod statements;

#[cfg(test)]
mod tests;

use py_ast::{PyExpr, PyModule, PyStmt, PyStmtKind};

/// Errors that can occur during transformation
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("internal transform error: {0}")]
    Internal(String),
}

/// Result type alias for transformer operations
pub type TransformResult<T> = Result<T, TransformError>;

/// Names exported by the translated module; drives the emitter footer
#[derive(Debug, Clone, Default)]
pub struct ExportsRecord {
    /// Exported names in first-export order
    pub names: Vec<String>,
    /// Whether a default export was seen (`_default` convention)
    pub has_default: bool,
}

impl ExportsRecord {
    pub fn add(&mut self, name: &str) {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && !self.has_default
    }
}

/// Output of the transform stage
#[derive(Debug, Clone)]
pub struct Transformation {
    pub module: PyModule,
    pub exports: ExportsRecord,
}

/// Loop-like constructs a `break` can target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakable {
    Loop,
    Switch,
}

/// Bookkeeping for one labeled loop being rewritten with flag variables
#[derive(Debug, Clone)]
pub struct LabelFrame {
    pub label: String,
    pub break_flag: String,
    pub continue_flag: String,
    /// Loop depth of the labeled loop's body
    pub body_depth: u32,
    pub break_used: u32,
    pub continue_used: u32,
}

/// Per-function lowering state saved and restored around function bodies
#[derive(Debug, Default)]
pub struct FnState {
    pub breakables: Vec<Breakable>,
    pub labels: Vec<LabelFrame>,
    pub loop_depth: u32,
}

/// Shared context threaded through all lowering rules
pub struct Ctx<'a> {
    pub analysis: &'a Analysis,
    pub file: &'a str,
    pub bus: &'a mut DiagnosticBus,
    /// Fresh-temporary counter (`_t1`, `_t2`, …)
    temp_counter: u32,
    /// Fresh inner-def counter (`_fn_1`, …)
    fn_counter: u32,
    /// Fresh require-import counter (`_m_1`, …)
    req_counter: u32,
    /// `require("m")` imports hoisted to module top, keyed by module name
    pub hoisted_imports: Vec<PyStmt>,
    hoisted_modules: HashMap<String, String>,
    /// Current `this` name per function-like frame (arrows copy the top)
    pub self_stack: Vec<Option<String>>,
    /// Whether the current function frame is a class initializer
    pub ctor_stack: Vec<bool>,
    /// Loop/label state of the current function
    pub fn_state: FnState,
    /// Comments waiting to be attached to the next emitted statement
    pub pending_comments: Vec<String>,
    /// Export record accumulated while lowering module forms
    pub exports: ExportsRecord,
    /// Applied renames per scope, recorded for inspection
    pub rename_log: HashMap<ScopeId, HashMap<String, String>>,
}

impl<'a> Ctx<'a> {
    pub fn new(analysis: &'a Analysis, file: &'a str, bus: &'a mut DiagnosticBus) -> Self {
        Self {
            analysis,
            file,
            bus,
            temp_counter: 0,
            fn_counter: 0,
            req_counter: 0,
            hoisted_imports: Vec::new(),
            hoisted_modules: HashMap::new(),
            self_stack: Vec::new(),
            ctor_stack: Vec::new(),
            fn_state: FnState::default(),
            pending_comments: Vec::new(),
            exports: ExportsRecord::default(),
            rename_log: HashMap::new(),
        }
    }

    /// Fresh temporary name
    pub fn fresh_temp(&mut self) -> String {
        self.temp_counter += 1;
        format!("_t{}", self.temp_counter)
    }

    /// Fresh name for a lifted anonymous function
    pub fn fresh_fn(&mut self) -> String {
        self.fn_counter += 1;
        format!("_fn_{}", self.fn_counter)
    }

    /// Hoisted alias for a `require("m")` import; stable per module name
    pub fn require_alias(&mut self, module: &str) -> String {
        if let Some(alias) = self.hoisted_modules.get(module) {
            return alias.clone();
        }
        self.req_counter += 1;
        let alias = format!("_m_{}", self.req_counter);
        let sanitized = modules::sanitize_module_name(module);
        self.hoisted_imports.push(PyStmt::new(PyStmtKind::Import {
            module: sanitized,
            alias: Some(alias.clone()),
        }));
        self.hoisted_modules.insert(module.to_string(), alias.clone());
        alias
    }

    /// The name `this` lowers to in the current frame, if any
    pub fn current_self(&self) -> Option<&str> {
        self.self_stack.last().and_then(|s| s.as_deref())
    }

    pub fn in_constructor(&self) -> bool {
        self.ctor_stack.last().copied().unwrap_or(false)
    }

    /// Enters a function-like frame, swapping in fresh loop/label state
    pub fn enter_function(&mut self, self_name: Option<String>, is_constructor: bool) -> FnState {
        self.self_stack.push(self_name);
        self.ctor_stack.push(is_constructor);
        std::mem::take(&mut self.fn_state)
    }

    /// Enters an arrow frame. Arrows keep the enclosing `this`, but their
    /// `return` is their own, so the constructor flag resets.
    pub fn enter_arrow(&mut self) -> FnState {
        let inherited = self.self_stack.last().cloned().unwrap_or(None);
        self.self_stack.push(inherited);
        self.ctor_stack.push(false);
        std::mem::take(&mut self.fn_state)
    }

    pub fn leave_function(&mut self, saved: FnState) {
        self.self_stack.pop();
        self.ctor_stack.pop();
        self.fn_state = saved;
    }

    /// Queues a TODO comment for the next emitted statement
    pub fn todo_comment(&mut self, text: impl Into<String>) {
        self.pending_comments.push(text.into());
    }

    /// Attaches queued comments to a freshly lowered statement
    pub fn take_comments(&mut self, stmt: &mut PyStmt) {
        if !self.pending_comments.is_empty() {
            stmt.comments.append(&mut self.pending_comments);
        }
    }

    /// Renames an identifier occurrence, recording the rewrite per scope.
    /// Unresolved globals keep their name unless it is a target keyword:
    /// they refer to the runtime facade (`console`, `Math`, …), not to a
    /// local binding.
    pub fn rename_identifier(&mut self, name: &str, span: Span) -> String {
        let binding = self.analysis.binding_map.get(&span);
        let renamed = match binding {
            Some(_) => identifier_renaming::rename(name),
            None => {
                if identifier_renaming::PYTHON_KEYWORDS.contains(&name) {
                    identifier_renaming::rename(name)
                } else {
                    name.to_string()
                }
            }
        };
        if renamed != name {
            let scope = binding
                .map(|id| self.analysis.binding(*id).scope_id)
                .unwrap_or(self.analysis.scopes.root());
            self.rename_log
                .entry(scope)
                .or_default()
                .insert(name.to_string(), renamed.clone());
        }
        renamed
    }

    /// Whether a callee identifier resolves to a class declared in this
    /// module; `new` on those becomes a direct constructor call.
    pub fn resolves_to_class(&self, span: Span) -> bool {
        self.analysis
            .resolved(span)
            .map(|binding| binding.kind == BindingKind::Class)
            .unwrap_or(false)
    }

    /// `this` classification of a function body by its span
    pub fn this_kind_of(&self, span: Span) -> ThisKind {
        self.analysis
            .this_kinds
            .get(&span)
            .copied()
            .unwrap_or(ThisKind::Ordinary)
    }

    /// Undefined-seeded hoist statements for the function scope opened at
    /// `span` (the hoist sink contents)
    pub fn hoist_sink_for(&mut self, span: Span) -> Vec<PyStmt> {
        let Some(&scope_id) = self.analysis.scope_map.get(&span) else {
            return Vec::new();
        };
        let scope = self.analysis.scopes.get(scope_id);
        let mut out = Vec::new();
        for &binding_id in &scope.bindings {
            let binding = self.analysis.binding(binding_id);
            if binding.kind == BindingKind::Var && binding.hoisted {
                let name = self.rename_identifier(&binding.name, binding.declaration);
                out.push(PyStmt::new(PyStmtKind::Assign {
                    target: PyExpr::Name(name),
                    value: PyExpr::name("JSUndefined"),
                }));
            }
        }
        out
    }
}

/// Transform entry point: lowers the whole program into a target module
/// plus its export record.
pub fn transform(
    ast: &Program,
    analysis: &Analysis,
    file: &str,
    bus: &mut DiagnosticBus,
) -> TransformResult<Transformation> {
    log::debug!("transforming {file}");

    let mut ctx = Ctx::new(analysis, file, bus);
    let mut body: Vec<PyStmt> = Vec::new();

    // Module-level hoist sink: seed hoisted vars before any statement
    let hoisted = ctx.hoist_sink_for(ast.span);
    body.extend(hoisted);

    for statement in &ast.body {
        let lowered = statements::lower_statement(statement, &mut ctx)?;
        body.extend(lowered);
    }

    // require() imports surface above everything else
    let mut final_body = std::mem::take(&mut ctx.hoisted_imports);
    final_body.extend(body);

    Ok(Transformation {
        module: PyModule { body: final_body },
        exports: ctx.exports,
    })
}
