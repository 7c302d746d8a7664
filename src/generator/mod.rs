//! # Emitter Component
//!
//! Fourth and fifth pipeline stages. [`emit`] prints the target AST into
//! source text (a deterministic straight rendering with no semantic
//! decisions) and reports which runtime-facade names the text references.
//! [`assemble`] builds the final artifact: header comment, runtime-import
//! preamble (iff helpers were referenced and the configuration includes the
//! runtime), module body, export footer (iff the record is non-empty), and
//! a guaranteed trailing newline.

use std::collections::BTreeSet;

use crate::transformer::ExportsRecord;
use crate::transformer::modules::DEFAULT_EXPORT_NAME;
use crate::transformer::py_ast::PyModule;

pub mod printer;

#[cfg(test)]
mod tests;

/// Module the emitted program imports its runtime facade from
pub const RUNTIME_MODULE: &str = "js_runtime";

/// Emitter configuration
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Whether to emit the runtime-import preamble
    pub include_runtime: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            include_runtime: true,
        }
    }
}

/// Result of the emit stage
#[derive(Debug, Clone)]
pub struct EmitResult {
    /// Printed module body
    pub code: String,
    /// Runtime-facade names referenced by the body
    pub runtime_names: BTreeSet<&'static str>,
}

/// Prints the target AST. Same tree, same bytes.
pub fn emit(module: &PyModule) -> EmitResult {
    let (code, runtime_names) = printer::Printer::new().print_module(module);
    EmitResult {
        code,
        runtime_names,
    }
}

/// Assembles the final artifact around the printed body.
pub fn assemble(
    emitted: &EmitResult,
    exports: &ExportsRecord,
    source_basename: &str,
    config: &EmitterConfig,
) -> String {
    let mut out = String::with_capacity(emitted.code.len() + 128);

    out.push_str(&format!(
        "# Generated by js2py from {source_basename}\n"
    ));

    if config.include_runtime && !emitted.runtime_names.is_empty() {
        let names: Vec<&str> = emitted.runtime_names.iter().copied().collect();
        out.push_str(&format!(
            "from {RUNTIME_MODULE} import {}\n",
            names.join(", ")
        ));
    }

    if !emitted.code.is_empty() {
        out.push('\n');
        out.push_str(&emitted.code);
    }

    if !exports.is_empty() {
        let mut names: Vec<String> = exports
            .names
            .iter()
            .map(|name| printer::string_literal(name))
            .collect();
        if exports.has_default {
            names.push(printer::string_literal(DEFAULT_EXPORT_NAME));
        }
        out.push('\n');
        out.push_str(&format!("__all__ = [{}]\n", names.join(", ")));
    }

    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}
