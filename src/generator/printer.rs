//! # Printer
//!
//! Walks the target AST and emits source text. The printer is a straight,
//! deterministic renderer: the same tree produces byte-identical output.
//! Indentation is four spaces, statements carry their leading comments as
//! `#` lines, and operator precedence drives parenthesization.
//!
//! While printing, every referenced runtime-facade name is recorded so the
//! assembler can build the import preamble.

use std::collections::BTreeSet;

use crate::transformer::py_ast::{
    PyBinOp, PyBoolOp, PyCmpOp, PyExcept, PyExpr, PyModule, PyParam, PyStmt, PyStmtKind,
    PyUnaryOp, RUNTIME_NAMES,
};

const INDENT: &str = "    ";

/// Precedence levels; higher binds tighter
mod prec {
    pub const LAMBDA: u8 = 1;
    pub const CONDITIONAL: u8 = 2;
    pub const OR: u8 = 3;
    pub const AND: u8 = 4;
    pub const NOT: u8 = 5;
    pub const COMPARE: u8 = 6;
    pub const BIT_OR: u8 = 7;
    pub const BIT_XOR: u8 = 8;
    pub const BIT_AND: u8 = 9;
    pub const SHIFT: u8 = 10;
    pub const ADD: u8 = 11;
    pub const MUL: u8 = 12;
    pub const UNARY: u8 = 13;
    pub const POWER: u8 = 14;
    pub const POSTFIX: u8 = 16;
    pub const ATOM: u8 = 17;
}

/// Target-code printer with runtime-reference tracking
pub struct Printer {
    output: String,
    indent: usize,
    runtime_used: BTreeSet<&'static str>,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
            runtime_used: BTreeSet::new(),
        }
    }

    /// Prints a whole module; returns the text and the set of runtime names
    /// the text references.
    pub fn print_module(mut self, module: &PyModule) -> (String, BTreeSet<&'static str>) {
        for stmt in &module.body {
            self.print_stmt(stmt);
        }
        (self.output, self.runtime_used)
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.output.push_str(INDENT);
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn print_comments(&mut self, stmt: &PyStmt) {
        for comment in &stmt.comments {
            let line = format!("# {comment}");
            self.line(&line);
        }
    }

    fn print_suite(&mut self, body: &[PyStmt]) {
        self.indent += 1;
        if body.is_empty() {
            self.line("pass");
        } else {
            for stmt in body {
                self.print_stmt(stmt);
            }
        }
        self.indent -= 1;
    }

    fn print_stmt(&mut self, stmt: &PyStmt) {
        self.print_comments(stmt);
        match &stmt.kind {
            PyStmtKind::Expr { value } => {
                let text = self.expr(value, 0);
                self.line(&text);
            }
            PyStmtKind::Assign { target, value } => {
                let target = self.expr(target, 0);
                let value = self.expr(value, 0);
                self.line(&format!("{target} = {value}"));
            }
            PyStmtKind::AugAssign { target, op, value } => {
                let target = self.expr(target, 0);
                let value = self.expr(value, 0);
                let op = binop_text(*op);
                self.line(&format!("{target} {op}= {value}"));
            }
            PyStmtKind::FunctionDef { name, params, hoisted, body } => {
                let params = self.params_text(params);
                self.line(&format!("def {name}({params}):"));
                // The hoist sink's seeded assignments come before the body
                let mut suite: Vec<&PyStmt> = hoisted.iter().collect();
                suite.extend(body.iter());
                self.indent += 1;
                if suite.is_empty() {
                    self.line("pass");
                } else {
                    for stmt in suite {
                        self.print_stmt(stmt);
                    }
                }
                self.indent -= 1;
            }
            PyStmtKind::ClassDef { name, base, body } => {
                match base {
                    Some(base) => {
                        let base = self.expr(base, 0);
                        self.line(&format!("class {name}({base}):"));
                    }
                    None => self.line(&format!("class {name}:")),
                }
                self.print_suite(body);
            }
            PyStmtKind::If { test, body, orelse } => self.print_if("if", test, body, orelse),
            PyStmtKind::For { target, iter, body } => {
                let target = self.expr(target, 0);
                let iter = self.expr(iter, 0);
                self.line(&format!("for {target} in {iter}:"));
                self.print_suite(body);
            }
            PyStmtKind::While { test, body } => {
                let test = self.expr(test, 0);
                self.line(&format!("while {test}:"));
                self.print_suite(body);
            }
            PyStmtKind::Try { body, handler, finalbody } => {
                self.line("try:");
                self.print_suite(body);
                if let Some(PyExcept { class_name, name, body }) = handler {
                    let clause = match (class_name, name) {
                        (Some(class_name), Some(name)) => {
                            self.mark_runtime(class_name);
                            format!("except {class_name} as {name}:")
                        }
                        (Some(class_name), None) => {
                            self.mark_runtime(class_name);
                            format!("except {class_name}:")
                        }
                        (None, _) => "except:".to_string(),
                    };
                    self.line(&clause);
                    self.print_suite(body);
                }
                if !finalbody.is_empty() {
                    self.line("finally:");
                    self.print_suite(finalbody);
                }
            }
            PyStmtKind::Raise { exc } => match exc {
                Some(exc) => {
                    let exc = self.expr(exc, 0);
                    self.line(&format!("raise {exc}"));
                }
                None => self.line("raise"),
            },
            PyStmtKind::Return { value } => match value {
                Some(value) => {
                    let value = self.expr(value, 0);
                    self.line(&format!("return {value}"));
                }
                None => self.line("return"),
            },
            PyStmtKind::Break => self.line("break"),
            PyStmtKind::Continue => self.line("continue"),
            PyStmtKind::Pass => self.line("pass"),
            PyStmtKind::Import { module, alias } => match alias {
                Some(alias) => self.line(&format!("import {module} as {alias}")),
                None => self.line(&format!("import {module}")),
            },
            PyStmtKind::ImportFrom { module, names } => {
                let names: Vec<String> = names
                    .iter()
                    .map(|(name, alias)| match alias {
                        Some(alias) => format!("{name} as {alias}"),
                        None => name.clone(),
                    })
                    .collect();
                self.line(&format!("from {module} import {}", names.join(", ")));
            }
        }
    }

    /// if/elif/else chains: a sole nested If in the else suite flattens
    fn print_if(&mut self, keyword: &str, test: &PyExpr, body: &[PyStmt], orelse: &[PyStmt]) {
        let test = self.expr(test, 0);
        self.line(&format!("{keyword} {test}:"));
        self.print_suite(body);
        match orelse {
            [] => {}
            [only] if matches!(&only.kind, PyStmtKind::If { .. }) && only.comments.is_empty() => {
                if let PyStmtKind::If { test, body, orelse } = &only.kind {
                    self.print_if("elif", test, body, orelse);
                }
            }
            _ => {
                self.line("else:");
                self.print_suite(orelse);
            }
        }
    }

    fn params_text(&mut self, params: &[PyParam]) -> String {
        let mut out = Vec::with_capacity(params.len());
        for param in params {
            if param.star {
                out.push(format!("*{}", param.name));
            } else if let Some(default) = &param.default {
                let default = self.expr(default, 0);
                out.push(format!("{}={default}", param.name));
            } else {
                out.push(param.name.clone());
            }
        }
        out.join(", ")
    }

    fn mark_runtime(&mut self, name: &str) {
        if let Some(&known) = RUNTIME_NAMES.iter().find(|n| **n == name) {
            self.runtime_used.insert(known);
        }
    }

    /// Renders an expression, parenthesizing when its precedence falls
    /// below the context's requirement.
    fn expr(&mut self, expr: &PyExpr, min_prec: u8) -> String {
        let (text, own_prec) = match expr {
            PyExpr::Name(name) => {
                self.mark_runtime(name);
                (name.clone(), prec::ATOM)
            }
            PyExpr::Str(value) => (string_literal(value), prec::ATOM),
            PyExpr::Num(value) => (number_literal(*value), prec::ATOM),
            PyExpr::Bool(value) => {
                ((if *value { "True" } else { "False" }).to_string(), prec::ATOM)
            }
            PyExpr::None => ("None".to_string(), prec::ATOM),
            PyExpr::List(elements) => {
                let parts: Vec<String> = elements.iter().map(|e| self.expr(e, 0)).collect();
                (format!("[{}]", parts.join(", ")), prec::ATOM)
            }
            PyExpr::Tuple(elements) => {
                let parts: Vec<String> = elements.iter().map(|e| self.expr(e, 0)).collect();
                let text = match parts.len() {
                    1 => format!("({},)", parts[0]),
                    _ => format!("({})", parts.join(", ")),
                };
                (text, prec::ATOM)
            }
            PyExpr::Dict(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| {
                        let key = self.expr(key, 0);
                        let value = self.expr(value, 0);
                        format!("{key}: {value}")
                    })
                    .collect();
                (format!("{{{}}}", parts.join(", ")), prec::ATOM)
            }
            PyExpr::Call { func, args } => {
                let func = self.expr(func, prec::POSTFIX);
                let args: Vec<String> = args.iter().map(|a| self.expr(a, 0)).collect();
                (format!("{func}({})", args.join(", ")), prec::POSTFIX)
            }
            PyExpr::Attribute { value, attr } => {
                let value = self.expr(value, prec::POSTFIX);
                (format!("{value}.{attr}"), prec::POSTFIX)
            }
            PyExpr::Subscript { value, index } => {
                let value = self.expr(value, prec::POSTFIX);
                let index = self.expr(index, 0);
                (format!("{value}[{index}]"), prec::POSTFIX)
            }
            PyExpr::BinOp { left, op, right } => {
                let op_prec = binop_prec(*op);
                // Left-associative except power
                let (left_min, right_min) = if *op == PyBinOp::Pow {
                    (op_prec + 1, op_prec)
                } else {
                    (op_prec, op_prec + 1)
                };
                let left = self.expr(left, left_min);
                let right = self.expr(right, right_min);
                (format!("{left} {} {right}", binop_text(*op)), op_prec)
            }
            PyExpr::UnaryOp { op, operand } => {
                let (text, op_prec) = match op {
                    PyUnaryOp::Not => {
                        let operand = self.expr(operand, prec::NOT);
                        (format!("not {operand}"), prec::NOT)
                    }
                    PyUnaryOp::USub => {
                        let operand = self.expr(operand, prec::UNARY);
                        (format!("-{operand}"), prec::UNARY)
                    }
                    PyUnaryOp::UAdd => {
                        let operand = self.expr(operand, prec::UNARY);
                        (format!("+{operand}"), prec::UNARY)
                    }
                    PyUnaryOp::Invert => {
                        let operand = self.expr(operand, prec::UNARY);
                        (format!("~{operand}"), prec::UNARY)
                    }
                };
                (text, op_prec)
            }
            PyExpr::BoolOp { op, values } => {
                let (joiner, op_prec) = match op {
                    PyBoolOp::And => (" and ", prec::AND),
                    PyBoolOp::Or => (" or ", prec::OR),
                };
                let parts: Vec<String> =
                    values.iter().map(|v| self.expr(v, op_prec + 1)).collect();
                (parts.join(joiner), op_prec)
            }
            PyExpr::Compare { left, op, right } => {
                let left = self.expr(left, prec::COMPARE + 1);
                let right = self.expr(right, prec::COMPARE + 1);
                (format!("{left} {} {right}", cmpop_text(*op)), prec::COMPARE)
            }
            PyExpr::Conditional { test, body, orelse } => {
                let body = self.expr(body, prec::CONDITIONAL + 1);
                let test = self.expr(test, prec::CONDITIONAL + 1);
                let orelse = self.expr(orelse, prec::CONDITIONAL);
                (format!("{body} if {test} else {orelse}"), prec::CONDITIONAL)
            }
            PyExpr::Lambda { params, body } => {
                let body = self.expr(body, prec::LAMBDA);
                let text = if params.is_empty() {
                    format!("lambda: {body}")
                } else {
                    format!("lambda {}: {body}", params.join(", "))
                };
                (text, prec::LAMBDA)
            }
            PyExpr::Starred(inner) => {
                let inner = self.expr(inner, prec::POSTFIX);
                (format!("*{inner}"), prec::POSTFIX)
            }
        };
        if own_prec < min_prec {
            format!("({text})")
        } else {
            text
        }
    }
}

fn binop_prec(op: PyBinOp) -> u8 {
    match op {
        PyBinOp::BitOr => prec::BIT_OR,
        PyBinOp::BitXor => prec::BIT_XOR,
        PyBinOp::BitAnd => prec::BIT_AND,
        PyBinOp::LShift | PyBinOp::RShift => prec::SHIFT,
        PyBinOp::Add | PyBinOp::Sub => prec::ADD,
        PyBinOp::Mult | PyBinOp::Div | PyBinOp::FloorDiv | PyBinOp::Mod => prec::MUL,
        PyBinOp::Pow => prec::POWER,
    }
}

fn binop_text(op: PyBinOp) -> &'static str {
    match op {
        PyBinOp::Add => "+",
        PyBinOp::Sub => "-",
        PyBinOp::Mult => "*",
        PyBinOp::Div => "/",
        PyBinOp::FloorDiv => "//",
        PyBinOp::Mod => "%",
        PyBinOp::Pow => "**",
        PyBinOp::LShift => "<<",
        PyBinOp::RShift => ">>",
        PyBinOp::BitAnd => "&",
        PyBinOp::BitOr => "|",
        PyBinOp::BitXor => "^",
    }
}

fn cmpop_text(op: PyCmpOp) -> &'static str {
    match op {
        PyCmpOp::Eq => "==",
        PyCmpOp::NotEq => "!=",
        PyCmpOp::Lt => "<",
        PyCmpOp::LtE => "<=",
        PyCmpOp::Gt => ">",
        PyCmpOp::GtE => ">=",
        PyCmpOp::Is => "is",
        PyCmpOp::IsNot => "is not",
        PyCmpOp::In => "in",
        PyCmpOp::NotIn => "not in",
    }
}

/// Renders a string literal, preferring single quotes
pub fn string_literal(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Renders a number: integral values print without a fraction
pub fn number_literal(value: f64) -> String {
    if value.is_nan() {
        return "float('nan')".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 {
            "float('inf')".to_string()
        } else {
            "-float('inf')".to_string()
        };
    }
    if value.fract() == 0.0 && value.abs() < 9e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
