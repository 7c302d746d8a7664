//! # js2py
//!
//! Batch source-to-source translator from JavaScript (ES5 plus a defined
//! ES6 subset) to Python. The core is a linear five-stage pipeline (parse,
//! bind/analyze, transform, emit, assemble) with a diagnostic bus threaded
//! through every stage.
//!
//! Parsing is delegated to the OXC parser; the rest of the pipeline works
//! on owned, serializable trees. The emitted program targets a runtime
//! facade library (`js_runtime`) that carries the JavaScript-specific
//! semantics (`js_plus`, `loose_eq`, `js_new`, `JsError`, …); this crate
//! only emits calls against those names.

pub mod analyzer;
pub mod diagnostics;
pub mod generator;
pub mod parser;
pub mod pipeline;
pub mod transformer;
