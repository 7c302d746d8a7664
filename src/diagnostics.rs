//! # Diagnostic Bus
//!
//! This module provides the diagnostic accumulator that is threaded through
//! every pipeline stage. Each stage appends structured records; the bus is
//! append-only for the duration of a run.
//!
//! ## Key Responsibilities
//!
//! - Collect diagnostics from all five pipeline stages with stable codes
//! - Promote warnings to errors at stage boundaries in strict mode
//! - Provide the total ordering (file, line, column, code) used for output
//! - Serialize the report file consumed by external tooling

use serde::Serialize;

/// Stable diagnostic codes shared across stages.
pub mod codes {
    pub const PARSE: &str = "JSR-PARSE";
    pub const DUP_LET: &str = "JSR-DUP-LET";
    pub const VAR_SHADOW: &str = "JSR-VAR-SHADOW";
    pub const UNRESOLVED: &str = "JSR-UNRESOLVED";
    pub const THIS: &str = "JSR-THIS";
    pub const EVAL: &str = "JSR-EVAL";
    pub const WITH: &str = "JSR-WITH";
    pub const ARGUMENTS: &str = "JSR-ARGUMENTS";
    pub const PROTO: &str = "JSR-PROTO";
    pub const DYN_WRITE: &str = "JSR-DYN-WRITE";
    pub const DELETE: &str = "JSR-DELETE";
    pub const DESTRUCTURE: &str = "JSR-DESTRUCTURE";
    pub const MIXED_MODULE: &str = "JSR-MIXED-MODULE";
    pub const DO_WHILE: &str = "JSR-DO-WHILE";
    pub const SPARSE_ARRAY: &str = "JSR-SPARSE-ARRAY";
    pub const GETTER: &str = "JSR-GETTER";
    pub const LABELED: &str = "JSR-LABELED";
    pub const UNSUPPORTED: &str = "JSR-UNSUPPORTED";
}

/// Severity level of a diagnostic record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// A single structured diagnostic record
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Source file the record refers to
    pub file: String,
    /// 1-based line number
    pub line: u32,
    /// 0-based column number
    pub column: u32,
    /// Severity level
    pub level: Level,
    /// Stable short code (see [`codes`])
    pub code: &'static str,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Sort key implementing the (file, line, column, code) total order
    fn sort_key(&self) -> (&str, u32, u32, &'static str) {
        (&self.file, self.line, self.column, self.code)
    }
}

/// Append-only diagnostic accumulator shared by all pipeline stages
#[derive(Debug, Default)]
pub struct DiagnosticBus {
    records: Vec<Diagnostic>,
    /// Promote warnings to errors at stage boundaries
    strict: bool,
}

impl DiagnosticBus {
    /// Creates a new bus; `strict` enables warn-to-error promotion
    pub fn new(strict: bool) -> Self {
        Self {
            records: Vec::new(),
            strict,
        }
    }

    /// Appends a record to the bus
    pub fn push(&mut self, record: Diagnostic) {
        log::debug!(
            "diagnostic {} at {}:{}:{}: {}",
            record.code,
            record.file,
            record.line,
            record.column,
            record.message
        );
        self.records.push(record);
    }

    /// Appends an info-level record
    pub fn info(&mut self, file: &str, line: u32, column: u32, code: &'static str, message: String) {
        self.push(Diagnostic {
            file: file.to_string(),
            line,
            column,
            level: Level::Info,
            code,
            message,
        });
    }

    /// Appends a warn-level record
    pub fn warn(&mut self, file: &str, line: u32, column: u32, code: &'static str, message: String) {
        self.push(Diagnostic {
            file: file.to_string(),
            line,
            column,
            level: Level::Warn,
            code,
            message,
        });
    }

    /// Appends an error-level record
    pub fn error(&mut self, file: &str, line: u32, column: u32, code: &'static str, message: String) {
        self.push(Diagnostic {
            file: file.to_string(),
            line,
            column,
            level: Level::Error,
            code,
            message,
        });
    }

    /// Marks a stage boundary. In strict mode every warning collected so far
    /// becomes an error; promotion never happens mid-stage.
    pub fn finish_stage(&mut self) {
        if self.strict {
            for record in &mut self.records {
                if record.level == Level::Warn {
                    record.level = Level::Error;
                }
            }
        }
    }

    /// Whether any error-level record exists
    pub fn has_errors(&self) -> bool {
        self.records.iter().any(|r| r.level == Level::Error)
    }

    /// Number of records collected so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the bus is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order
    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    /// Records sorted by (file, line, column, code)
    pub fn sorted(&self) -> Vec<Diagnostic> {
        let mut out = self.records.clone();
        out.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        out
    }

    /// Serializes the sorted records as the JSON report array
    pub fn to_report_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.sorted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus_with(records: &[(u32, u32, &'static str, Level)]) -> DiagnosticBus {
        let mut bus = DiagnosticBus::new(false);
        for (line, column, code, level) in records {
            bus.push(Diagnostic {
                file: "a.js".to_string(),
                line: *line,
                column: *column,
                level: *level,
                code,
                message: String::new(),
            });
        }
        bus
    }

    #[test]
    fn sorts_by_location_then_code() {
        let bus = bus_with(&[
            (3, 0, codes::EVAL, Level::Warn),
            (1, 4, codes::WITH, Level::Warn),
            (1, 4, codes::DO_WHILE, Level::Info),
            (1, 2, codes::THIS, Level::Warn),
        ]);
        let sorted = bus.sorted();
        let keys: Vec<(u32, u32, &str)> = sorted.iter().map(|r| (r.line, r.column, r.code)).collect();
        assert_eq!(
            keys,
            vec![
                (1, 2, codes::THIS),
                (1, 4, codes::DO_WHILE),
                (1, 4, codes::WITH),
                (3, 0, codes::EVAL),
            ]
        );
    }

    #[test]
    fn strict_mode_promotes_warnings_at_stage_boundary() {
        let mut bus = DiagnosticBus::new(true);
        bus.warn("a.js", 1, 0, codes::DO_WHILE, "degraded".to_string());
        assert!(!bus.has_errors());
        bus.finish_stage();
        assert!(bus.has_errors());
    }

    #[test]
    fn non_strict_mode_keeps_warnings() {
        let mut bus = DiagnosticBus::new(false);
        bus.warn("a.js", 1, 0, codes::DO_WHILE, "degraded".to_string());
        bus.finish_stage();
        assert!(!bus.has_errors());
    }

    #[test]
    fn info_never_promotes() {
        let mut bus = DiagnosticBus::new(true);
        bus.info("a.js", 2, 1, codes::SPARSE_ARRAY, "hole".to_string());
        bus.finish_stage();
        assert!(!bus.has_errors());
    }

    #[test]
    fn report_json_is_an_array_of_records() {
        let mut bus = DiagnosticBus::new(false);
        bus.error("a.js", 1, 0, codes::PARSE, "bad token".to_string());
        let json = bus.to_report_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["code"], "JSR-PARSE");
        assert_eq!(parsed[0]["level"], "error");
        assert_eq!(parsed[0]["line"], 1);
    }
}
