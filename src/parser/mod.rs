//! # Parser Front-End
//!
//! This module provides the first pipeline stage: JavaScript source text in,
//! owned source AST plus content hash out. Parsing itself is delegated to the
//! OXC parser; this bridge normalizes the input, converts the borrowed OXC
//! tree into the serializable [`ast_types`] tree, translates syntax errors
//! into diagnostics, and consults the AST cache keyed by content hash.
//!
//! ## Key Responsibilities
//!
//! - Strip the UTF-8 BOM and hash the normalized bytes together with the mode
//! - Bridge OXC parse results into the owned source AST
//! - Record syntax errors as `JSR-PARSE` diagnostics with source positions
//! - Serve cached ASTs without re-parsing (read-before-parse, write-after)

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::diagnostics::{DiagnosticBus, codes};

pub mod ast_types;
pub mod cache;

#[cfg(test)]
mod tests;

use ast_types::{AstBuilder, Program};

/// Parse mode; part of the cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    Script,
    Module,
}

impl ParseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseMode::Script => "script",
            ParseMode::Module => "module",
        }
    }
}

/// Errors that abort the parse stage
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: u32,
        column: u32,
    },
    #[error("parser panicked; no usable syntax tree for {file}")]
    Panicked { file: String },
}

/// Result type alias for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Outcome of the parse stage
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// The owned source AST
    pub ast: Program,
    /// Hex SHA-256 over the normalized source bytes and the mode
    pub hash: String,
    /// Whether the AST was served from the cache without re-parsing
    pub cache_hit: bool,
}

/// Strips a leading UTF-8 byte order mark, if present
pub fn strip_bom(source: &str) -> &str {
    source.strip_prefix('\u{feff}').unwrap_or(source)
}

/// Hex SHA-256 digest over the normalized source bytes and the parse mode
pub fn content_hash(source: &str, mode: ParseMode) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update([0u8]);
    hasher.update(mode.as_str().as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Parses JavaScript source text into the owned source AST.
///
/// In tolerant mode, syntax errors are recorded on the bus and a best-effort
/// tree is returned when the parser did not panic. In strict (non-tolerant)
/// mode the first syntax error aborts the stage.
///
/// When `cache` is given, a stored AST under the content hash is trusted
/// without re-parsing; a fresh parse is written back on miss.
pub fn parse(
    source: &str,
    file: &str,
    mode: ParseMode,
    tolerant: bool,
    cache: Option<&cache::AstCache>,
    bus: &mut DiagnosticBus,
) -> ParseResult<ParseOutcome> {
    let source = strip_bom(source);
    let hash = content_hash(source, mode);

    if let Some(cache) = cache {
        if let Some(ast) = cache.load(&hash, mode) {
            log::debug!("cache hit for {file} ({hash})");
            return Ok(ParseOutcome {
                ast,
                hash,
                cache_hit: true,
            });
        }
    }

    let allocator = Allocator::default();
    let source_type = match mode {
        ParseMode::Script => SourceType::default(),
        ParseMode::Module => SourceType::default().with_module(true),
    };
    let ret = Parser::new(&allocator, source, source_type).parse();

    let builder = AstBuilder::new(source);
    let mut first_error: Option<(String, u32, u32)> = None;
    for error in &ret.errors {
        let offset = error
            .labels
            .as_ref()
            .and_then(|labels| labels.first())
            .map(|label| label.offset() as u32)
            .unwrap_or(0);
        let (line, column) = builder.position(offset);
        let message = error.to_string();
        if first_error.is_none() {
            first_error = Some((message.clone(), line, column));
        }
        bus.error(file, line, column, codes::PARSE, message);
    }

    if ret.panicked {
        return Err(ParseError::Panicked {
            file: file.to_string(),
        });
    }
    if !tolerant {
        if let Some((message, line, column)) = first_error {
            return Err(ParseError::Syntax { message, line, column });
        }
    }

    let ast = Program::from_oxc(&ret.program, &builder);

    // Only clean parses are cached: a cache hit skips the parse stage, so a
    // stored tree must not owe any diagnostics.
    if let Some(cache) = cache {
        if ret.errors.is_empty() {
            // A lost write between concurrent invocations is fine: the
            // contents are a pure function of the hash.
            if let Err(err) = cache.store(&hash, mode, &ast) {
                log::warn!("failed to write AST cache entry {hash}: {err}");
            }
        }
    }

    Ok(ParseOutcome {
        ast,
        hash,
        cache_hit: false,
    })
}
