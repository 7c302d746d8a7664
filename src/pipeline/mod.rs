//! # Conversion Pipeline
//!
//! The linear five-stage dataflow: parse → analyze → transform → emit →
//! assemble. Every stage appends to the shared diagnostic bus and runs to
//! completion as a unit; in strict mode warnings promote to errors at the
//! boundaries between stages, and an error-carrying bus stops the pipeline
//! at the next boundary.
//!
//! The pipeline is single-threaded and synchronous; each stage fully
//! consumes its predecessor's output. Artifacts are immutable once
//! produced.

use std::path::Path;

use thiserror::Error;

use crate::analyzer::{self, AnalysisError};
use crate::diagnostics::DiagnosticBus;
use crate::generator::{self, EmitterConfig};
use crate::parser::{self, ParseError, ParseMode, cache::AstCache};
use crate::transformer::{self, ExportsRecord, TransformError};


/// Fully resolved configuration the core receives from the CLI
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Input path; only the basename appears in output and diagnostics
    pub file: String,
    pub mode: ParseMode,
    /// Strict mode: warnings become errors at stage boundaries and the
    /// parser aborts on the first syntax error
    pub strict: bool,
    /// Emit the runtime-import preamble
    pub include_runtime: bool,
    /// AST cache; `None` disables caching
    pub cache: Option<AstCache>,
}

impl ConvertConfig {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            mode: ParseMode::Module,
            strict: false,
            include_runtime: true,
            cache: None,
        }
    }

    fn basename(&self) -> &str {
        Path::new(&self.file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.file)
    }
}

/// Errors that abort a conversion
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    /// The bus carries error-level diagnostics; the caller reports them
    #[error("conversion stopped: diagnostics contain errors")]
    Diagnostics,
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Successful conversion artifact
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Final output text (header, preamble, body, footer)
    pub output: String,
    /// Export record of the translated module
    pub exports: ExportsRecord,
    /// Whether the parse stage was served from the cache
    pub cache_hit: bool,
}

/// Runs the whole pipeline over one source text.
pub fn convert(
    source: &str,
    config: &ConvertConfig,
    bus: &mut DiagnosticBus,
) -> PipelineResult<Conversion> {
    log::info!("converting {}", config.file);

    // Stage 1: parse
    let outcome = parser::parse(
        source,
        config.basename(),
        config.mode,
        !config.strict,
        config.cache.as_ref(),
        bus,
    )?;
    bus.finish_stage();
    if bus.has_errors() {
        return Err(PipelineError::Diagnostics);
    }

    // Stage 2: bind and analyze
    let analysis = analyzer::analyze(&outcome.ast, config.basename(), bus)?;
    bus.finish_stage();
    if bus.has_errors() {
        return Err(PipelineError::Diagnostics);
    }

    // Stage 3: transform
    let transformation = transformer::transform(&outcome.ast, &analysis, config.basename(), bus)?;
    bus.finish_stage();
    if bus.has_errors() {
        return Err(PipelineError::Diagnostics);
    }

    // Stage 4: emit
    let emitted = generator::emit(&transformation.module);

    // Stage 5: assemble
    let emitter_config = EmitterConfig {
        include_runtime: config.include_runtime,
    };
    let output = generator::assemble(
        &emitted,
        &transformation.exports,
        config.basename(),
        &emitter_config,
    );

    Ok(Conversion {
        output,
        exports: transformation.exports,
        cache_hit: outcome.cache_hit,
    })
}
