//! Formatting helpers: numeric rendering per the display settings,
//! expression pretty-printing, and solver output.

pub mod expr;
pub mod number;
pub mod solve;

pub use expr::pretty;
pub use number::{
    format_complex, format_f64, format_f64_with, FormatOptions, NumberFormat, SciThresholds,
};
pub use solve::{exact_display, format_equation_solution, format_system_solution};
