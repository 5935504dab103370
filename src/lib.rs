//! Symbolic and numeric evaluation engine for a scientific calculator.
//!
//! The pipeline: the UI edits a [`MathNode`] tree; [`serialize`] flattens it
//! to a PEMDAS string or persists it as JSON; [`convert`] rebuilds an exact
//! [`Expr`] from the structured tree; [`simplify`] applies the exact-algebra
//! rules; [`numeric`] evaluates flat strings with complex-number support;
//! [`solver`] handles equations and small linear systems; [`engine`] ties it
//! together per calculator cell.

pub mod convert;
pub mod engine;
pub mod error;
pub mod expr;
pub mod format;
pub mod node;
pub mod numeric;
pub mod prelude;
pub mod serialize;
pub mod simplify;
pub mod solver;

pub use convert::convert;
pub use engine::{evaluate_cell, evaluate_text, AnsContext, CellResult};
pub use error::{CalcError, Result};
pub use expr::{ConstKind, Expr, Rational, TrigFn};
pub use format::{format_f64, pretty, FormatOptions, NumberFormat};
pub use node::{is_complete, MathNode};
pub use numeric::evaluate;
pub use serialize::{
    nodes_from_json, nodes_to_json, state_from_json, state_to_json, to_pemdas, AppState,
    CellRecord,
};
pub use simplify::simplify;
pub use solver::{
    solve_equation, solve_equation_exact, solve_system, solve_system_exact, EquationSolution,
    SolvedValue, SystemSolution,
};
