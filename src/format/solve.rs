use crate::expr::Expr;
use crate::solver::{EquationSolution, SolvedValue, SystemSolution};

use super::expr::pretty;
use super::number::{format_f64, FormatOptions};

/// Render a solved equation into the display string shown under the cell.
pub fn format_equation_solution(solution: &EquationSolution, opts: &FormatOptions) -> String {
    match solution {
        EquationSolution::NoSolution => "No solution".to_string(),
        EquationSolution::Infinite => "Infinite solutions".to_string(),
        EquationSolution::Single { var, value } => {
            format!("{var} = {}", format_value(value, opts))
        }
        EquationSolution::Pair { var, first, second } => format!(
            "{var} = {} or {var} = {}",
            format_value(first, opts),
            format_value(second, opts)
        ),
        EquationSolution::ComplexPair { var, re, im } => format!(
            "{var} = {} ± {}i",
            format_value(re, opts),
            format_value(im, opts)
        ),
    }
}

pub fn format_system_solution(solution: &SystemSolution, opts: &FormatOptions) -> String {
    solution
        .assignments
        .iter()
        .map(|(var, value)| format!("{var} = {}", format_value(value, opts)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_value(value: &SolvedValue, opts: &FormatOptions) -> String {
    match value {
        SolvedValue::Numeric(x) => format_f64(*x, opts),
        SolvedValue::Exact(expr) => exact_display(expr, opts),
    }
}

/// Display an exact result: integers as plain digits, everything else via
/// the pretty-printer.
pub fn exact_display(expr: &Expr, _opts: &FormatOptions) -> String {
    match expr {
        Expr::Int(n) => n.to_string(),
        other => pretty(other),
    }
}
