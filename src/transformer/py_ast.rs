//! # Target AST Types
//!
//! The output-side Abstract Syntax Tree: a closed union modeling the Python
//! subset the emitter prints. The transformer allocates this tree fresh;
//! source AST nodes are never mutated.
//!
//! Every statement optionally carries a leading-comment list (used for
//! diagnostics and TODO annotations) and a source-location back-reference.
//! Function definitions carry their hoist sink: statements the emitter
//! interleaves before the body proper.

use serde::{Deserialize, Serialize};

use crate::parser::ast_types::Span;

/// A whole output module
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PyModule {
    pub body: Vec<PyStmt>,
}

/// Statement wrapper carrying leading comments and a source back-reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PyStmt {
    pub kind: PyStmtKind,
    /// Leading `#` comment lines
    pub comments: Vec<String>,
    /// Source location this statement was lowered from
    pub loc: Option<Span>,
}

impl PyStmt {
    pub fn new(kind: PyStmtKind) -> Self {
        Self {
            kind,
            comments: Vec::new(),
            loc: None,
        }
    }

    pub fn at(kind: PyStmtKind, loc: Span) -> Self {
        Self {
            kind,
            comments: Vec::new(),
            loc: Some(loc),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }
}

/// Python statement kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PyStmtKind {
    /// Bare expression statement
    Expr { value: PyExpr },
    /// `target = value`
    Assign { target: PyExpr, value: PyExpr },
    /// `target op= value`
    AugAssign {
        target: PyExpr,
        op: PyBinOp,
        value: PyExpr,
    },
    /// `def name(params): body`
    FunctionDef {
        name: String,
        params: Vec<PyParam>,
        /// Hoist sink: seeded undefined assignments printed before the body
        hoisted: Vec<PyStmt>,
        body: Vec<PyStmt>,
    },
    /// `class name(base): body`
    ClassDef {
        name: String,
        base: Option<PyExpr>,
        body: Vec<PyStmt>,
    },
    /// `if test: body` with optional elif/else chain in `orelse`
    If {
        test: PyExpr,
        body: Vec<PyStmt>,
        orelse: Vec<PyStmt>,
    },
    /// `for target in iter: body`
    For {
        target: PyExpr,
        iter: PyExpr,
        body: Vec<PyStmt>,
    },
    /// `while test: body`
    While { test: PyExpr, body: Vec<PyStmt> },
    /// `try: body except …: … finally: …`
    Try {
        body: Vec<PyStmt>,
        handler: Option<PyExcept>,
        finalbody: Vec<PyStmt>,
    },
    /// `raise exc` / bare `raise`
    Raise { exc: Option<PyExpr> },
    Return { value: Option<PyExpr> },
    Break,
    Continue,
    Pass,
    /// `import module` / `import module as alias`
    Import {
        module: String,
        alias: Option<String>,
    },
    /// `from module import a, b as c`
    ImportFrom {
        module: String,
        names: Vec<(String, Option<String>)>,
    },
}

/// Except clause; `class_name` is the caught exception type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PyExcept {
    pub class_name: Option<String>,
    pub name: Option<String>,
    pub body: Vec<PyStmt>,
}

/// Formal parameter of a function def
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PyParam {
    pub name: String,
    pub default: Option<PyExpr>,
    /// `*name` (rest parameter)
    pub star: bool,
}

impl PyParam {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            star: false,
        }
    }
}

/// Python expressions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PyExpr {
    Name(String),
    Str(String),
    Num(f64),
    Bool(bool),
    None,
    List(Vec<PyExpr>),
    Tuple(Vec<PyExpr>),
    Dict(Vec<(PyExpr, PyExpr)>),
    Call {
        func: Box<PyExpr>,
        args: Vec<PyExpr>,
    },
    Attribute {
        value: Box<PyExpr>,
        attr: String,
    },
    Subscript {
        value: Box<PyExpr>,
        index: Box<PyExpr>,
    },
    BinOp {
        left: Box<PyExpr>,
        op: PyBinOp,
        right: Box<PyExpr>,
    },
    UnaryOp {
        op: PyUnaryOp,
        operand: Box<PyExpr>,
    },
    BoolOp {
        op: PyBoolOp,
        values: Vec<PyExpr>,
    },
    Compare {
        left: Box<PyExpr>,
        op: PyCmpOp,
        right: Box<PyExpr>,
    },
    /// `body if test else orelse`
    Conditional {
        test: Box<PyExpr>,
        body: Box<PyExpr>,
        orelse: Box<PyExpr>,
    },
    Lambda {
        params: Vec<String>,
        body: Box<PyExpr>,
    },
    /// `*expr` in a call or display
    Starred(Box<PyExpr>),
}

impl PyExpr {
    pub fn name(name: impl Into<String>) -> Self {
        PyExpr::Name(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        PyExpr::Str(value.into())
    }

    pub fn attr(value: PyExpr, attr: impl Into<String>) -> Self {
        PyExpr::Attribute {
            value: Box::new(value),
            attr: attr.into(),
        }
    }

    pub fn subscript(value: PyExpr, index: PyExpr) -> Self {
        PyExpr::Subscript {
            value: Box::new(value),
            index: Box::new(index),
        }
    }

    pub fn call(func: PyExpr, args: Vec<PyExpr>) -> Self {
        PyExpr::Call {
            func: Box::new(func),
            args,
        }
    }

    /// Call of a runtime helper by name
    pub fn helper(name: &str, args: Vec<PyExpr>) -> Self {
        PyExpr::call(PyExpr::name(name), args)
    }
}

/// Binary operators of the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PyBinOp {
    Add,
    Sub,
    Mult,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitAnd,
    BitOr,
    BitXor,
}

/// Unary operators of the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PyUnaryOp {
    Not,
    USub,
    UAdd,
    Invert,
}

/// Boolean operators (short-circuiting)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PyBoolOp {
    And,
    Or,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PyCmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

/// Names exported by the runtime facade. The emitter inserts the runtime
/// import preamble iff one of these is referenced in the printed tree.
pub const RUNTIME_NAMES: &[&str] = &[
    "JSUndefined",
    "JsError",
    "js_plus",
    "js_sub",
    "js_mul",
    "js_div",
    "js_mod",
    "loose_eq",
    "js_and",
    "js_or",
    "js_nullish",
    "js_typeof",
    "js_truthy",
    "js_getindex",
    "js_setindex",
    "js_delete",
    "js_new",
    "js_keys",
    "js_iter",
    "js_regex",
    "js_str",
    "js_void",
    "js_in",
    "js_instanceof",
    "js_urshift",
    "obj_set",
    "spread",
    "console",
    "Array",
    "Object",
    "Date",
    "JSON",
    "Math",
];
