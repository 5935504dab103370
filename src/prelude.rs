//! String-based convenience API for quick experimentation.

pub use crate::engine::{evaluate_cell, evaluate_text, AnsContext, CellResult};
pub use crate::format::{FormatOptions, NumberFormat};
pub use crate::node::MathNode;

/// Evaluate a flat expression string with default display settings.
pub fn eval(input: &str) -> Option<String> {
    crate::numeric::evaluate(input, &FormatOptions::default())
}

/// Solve a flat equation or system with default display settings.
pub fn solve(input: &str) -> Option<String> {
    evaluate_text(input, &FormatOptions::default())
}
