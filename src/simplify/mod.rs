//! Exact simplification rules for the expression algebra.

mod rules;
mod surd;
mod trig;

pub use rules::{
    simplify, simplify_div, simplify_log, simplify_pow, simplify_prod, simplify_sum,
};
pub use surd::simplify_root;
pub use trig::simplify_trig;
