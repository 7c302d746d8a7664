//! # Binder / Analyzer Component
//!
//! The analyzer performs the second pipeline stage: a single source-order
//! pass over the source AST that builds the scope tree, binds every
//! identifier reference to a declaration, classifies `this` usage per
//! function, and collects risk annotations for constructs whose semantics
//! the translation cannot fully preserve.
//!
//! ## Key Components
//!
//! - **Scope Builder**: arena scope tree, hoisting, reference resolution
//! - **Binding Records**: declaration site, references, capture and
//!   assignment tracking per name
//! - **Semantic Analysis**: `this` classification, prototype/dynamic risk
//!   patterns, module-shape detection

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagnostics::DiagnosticBus;
use crate::parser::ast_types::{Program, Span};

pub mod scope_builder;
pub mod semantic_analysis;

#[cfg(test)]
mod tests;

/// Unique identifier for scopes; index into the scope arena
pub type ScopeId = u32;

/// Unique identifier for bindings; index into the binding arena
pub type BindingId = u32;

/// Errors that can occur during analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("scope arena corrupt: missing scope {0}")]
    MissingScope(ScopeId),
    #[error("internal analysis error: {0}")]
    Internal(String),
}

/// Result type alias for analyzer operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Kinds of lexical scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeKind {
    /// Top level of a script input
    Global,
    /// Top level of a module input
    Module,
    /// Function or arrow body
    Function,
    /// Block statement or block-scoped for header
    Block,
    /// Class body; holds method names only
    ClassBody,
    /// Catch clause; binds only the parameter
    Catch,
    /// `with` statement body; resolution inside is ambiguous
    With,
}

/// Kinds of bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingKind {
    Var,
    Let,
    Const,
    Function,
    Class,
    Import,
    Param,
    CatchParam,
    Builtin,
}

/// One scope in the arena; parent/children are ids, not owning references
#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Bindings declared directly in this scope, in declaration order
    pub bindings: Vec<BindingId>,
    /// Name lookup for this scope
    pub names: HashMap<String, BindingId>,
}

/// Association of a name with its declaration site within a scope
#[derive(Debug, Clone)]
pub struct Binding {
    pub id: BindingId,
    pub name: String,
    pub kind: BindingKind,
    pub scope_id: ScopeId,
    /// Span of the declaring identifier
    pub declaration: Span,
    /// Spans of all references in source order
    pub references: Vec<Span>,
    /// Whether a nested function closes over this binding
    pub captured: bool,
    /// Number of write references
    pub assignments: u32,
    /// Whether the binding was hoisted above its textual position
    pub hoisted: bool,
}

/// Arena of scopes addressed by integer ids
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    pub fn root(&self) -> ScopeId {
        0
    }

    pub fn push(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = self.scopes.len() as ScopeId;
        self.scopes.push(Scope {
            id,
            kind,
            parent,
            children: Vec::new(),
            bindings: Vec::new(),
            names: HashMap::new(),
        });
        if let Some(parent) = parent {
            self.scopes[parent as usize].children.push(id);
        }
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id as usize]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id as usize]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    /// Nearest enclosing scope (including `from`) matching the predicate
    pub fn nearest(&self, from: ScopeId, pred: impl Fn(&Scope) -> bool) -> Option<ScopeId> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = self.get(id);
            if pred(scope) {
                return Some(id);
            }
            current = scope.parent;
        }
        None
    }
}

/// `this`-binding classification for a function body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThisKind {
    /// Method of a class; `this` is the instance
    Instance,
    /// Function observed to be used as a constructor
    Constructor,
    /// Ordinary function; `this` is undefined or the global object
    Ordinary,
    /// No `this` at all (module-level arrow)
    None,
}

/// Risk annotations attached to nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskFlag {
    TopLevelThis,
    Arguments,
    Eval,
    With,
    DynamicPropertyWrite,
    PrototypeMutation,
    ComplexDestructuring,
    DeleteComputed,
}

/// Classification of how the source declares imports and exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleShape {
    Script,
    Esm,
    CommonJs,
    Mixed,
}

/// Complete analysis result consumed by the transformer
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Scope tree with hierarchical relationships
    pub scopes: ScopeTree,
    /// Binding arena indexed by [`BindingId`]
    pub bindings: Vec<Binding>,
    /// Identifier occurrence span -> binding id
    pub binding_map: HashMap<Span, BindingId>,
    /// Node span -> risk flags
    pub risk_set: HashMap<Span, Vec<RiskFlag>>,
    /// Function/arrow span -> `this` classification
    pub this_kinds: HashMap<Span, ThisKind>,
    /// Scope-opening node span -> scope id
    pub scope_map: HashMap<Span, ScopeId>,
    /// Module shape of the whole file
    pub module_shape: ModuleShape,
    /// Names of functions observed to be used as constructors
    pub constructor_functions: HashSet<String>,
}

impl Analysis {
    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id as usize]
    }

    /// Binding a given identifier occurrence resolves to, if any
    pub fn resolved(&self, span: Span) -> Option<&Binding> {
        self.binding_map.get(&span).map(|id| self.binding(*id))
    }

    /// Whether a node carries the given risk flag
    pub fn has_risk(&self, span: Span, flag: RiskFlag) -> bool {
        self.risk_set
            .get(&span)
            .map(|flags| flags.contains(&flag))
            .unwrap_or(false)
    }
}

/// Names resolvable without a declaration; references to these are not
/// reported as unresolved globals.
pub const KNOWN_GLOBALS: &[&str] = &[
    "Array", "Boolean", "Date", "Error", "Function", "Infinity", "JSON", "Map", "Math", "NaN",
    "Number", "Object", "Promise", "RangeError", "RegExp", "Set", "String", "Symbol", "TypeError",
    "console", "decodeURIComponent", "encodeURIComponent", "eval", "exports", "globalThis",
    "isFinite", "isNaN", "module", "parseFloat", "parseInt", "require", "setInterval",
    "setTimeout", "clearInterval", "clearTimeout", "undefined", "arguments",
];

/// Main analysis entry point: builds scopes and bindings, then classifies
/// semantics. Diagnostics land on the bus; the returned [`Analysis`] is
/// immutable afterwards.
pub fn analyze(ast: &Program, file: &str, bus: &mut DiagnosticBus) -> AnalysisResult<Analysis> {
    log::debug!("analyzing {file}");

    let mut analysis = scope_builder::build_scopes(ast, file, bus)?;
    semantic_analysis::classify(ast, file, &mut analysis, bus);

    log::debug!(
        "analysis of {file} complete: {} scopes, {} bindings, {} risk nodes",
        analysis.scopes.len(),
        analysis.bindings.len(),
        analysis.risk_set.len()
    );

    Ok(analysis)
}
