//! Numeric expression parser and evaluator.
//!
//! Works over flat strings: a preprocessing pipeline rewrites glyphs,
//! constants, factorials, counting calls, and iterated constructs into plain
//! operator notation, then a recursive-descent grammar evaluates the result
//! on the fly into a real or complex [`Value`].

pub mod parser;
pub mod preprocess;
pub mod value;

use log::debug;

use crate::error::Result;
use crate::format::{format_complex, FormatOptions};

pub use value::Value;

/// Evaluate to a raw value; the solver and the preprocessing expansions use
/// this to recurse into sub-expressions.
pub fn evaluate_value(text: &str) -> Result<Value> {
    let prepared = preprocess::preprocess(text)?;
    parser::parse_value(&prepared)
}

/// Public numeric entry point: formatted result, or `None` on any parse or
/// evaluation failure. Never panics, never propagates an error.
pub fn evaluate(text: &str, opts: &FormatOptions) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    match evaluate_value(text) {
        Ok(value) => Some(format_complex(value.resolved(), opts)),
        Err(err) => {
            debug!("numeric evaluation failed: {err}");
            None
        }
    }
}
