//! Equation and linear-system solving.
//!
//! The numeric path works over flat PEMDAS strings: coefficients are carved
//! out of each signed term and evaluated with the numeric parser. The exact
//! path in [`exact`] mirrors it over `Expr` trees so `x^2 = 2` can answer
//! `√2` instead of a decimal.

mod exact;

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::expr::Expr;
use crate::numeric;

pub use exact::{solve_equation_exact, solve_system_exact};

/// Tolerance for degenerate coefficients, duplicate roots, and singular
/// determinants.
pub const EPS: f64 = 1e-10;

/// One solved value, either a float or an exact expression.
#[derive(Clone, Debug, PartialEq)]
pub enum SolvedValue {
    Numeric(f64),
    Exact(Expr),
}

#[derive(Clone, Debug, PartialEq)]
pub enum EquationSolution {
    NoSolution,
    Infinite,
    Single {
        var: String,
        value: SolvedValue,
    },
    Pair {
        var: String,
        first: SolvedValue,
        second: SolvedValue,
    },
    /// Conjugate pair `var = re ± im·i`.
    ComplexPair {
        var: String,
        re: SolvedValue,
        im: SolvedValue,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SystemSolution {
    pub assignments: Vec<(String, SolvedValue)>,
}

/// How a flat input string should be routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Expression,
    Equation,
    System,
}

pub fn classify(text: &str) -> InputKind {
    if text.contains('\n') {
        InputKind::System
    } else if text.contains('=') {
        InputKind::Equation
    } else {
        InputKind::Expression
    }
}

/// Identifiers that never count as unknowns.
const RESERVED: &[&str] = &[
    "sin", "cos", "tan", "asin", "acos", "atan", "arcsin", "arccos", "arctan", "sinh", "cosh",
    "tanh", "asinh", "acosh", "atanh", "log", "ln", "sqrt", "abs", "arg", "re", "im", "sgn",
    "exp", "perm", "comb", "sum", "prod", "deriv", "integ", "rad", "ans", "e", "pi", "i",
];

/// Distinct free variables of a flat input, in sorted order. A letter run is
/// one identifier; runs matching a reserved function or constant name are
/// skipped.
pub fn free_variables(text: &str) -> Vec<String> {
    let mut vars = BTreeSet::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphabetic() {
                i += 1;
            }
            let run: String = chars[start..i].iter().collect();
            // a lone E after a digit is a scientific-notation marker
            let sci_marker = run == "E" && start > 0 && chars[start - 1].is_ascii_digit();
            if !sci_marker && !RESERVED.contains(&run.to_ascii_lowercase().as_str()) {
                vars.insert(run);
            }
        } else {
            i += 1;
        }
    }
    vars.into_iter().collect()
}

/// Solve a single equation numerically. Returns `None` when the input is not
/// an equation in exactly one unknown of degree at most two.
pub fn solve_equation(input: &str) -> Option<EquationSolution> {
    let (lhs, rhs) = input.split_once('=')?;
    if rhs.contains('=') {
        return None;
    }
    let vars = free_variables(input);
    if vars.len() != 1 {
        debug!("equation rejected: {} unknowns", vars.len());
        return None;
    }
    let var = vars[0].clone();

    let (a1, b1, c1) = quadratic_coeffs(lhs, &var)?;
    let (a2, b2, c2) = quadratic_coeffs(rhs, &var)?;
    let (a, b, c) = (a1 - a2, b1 - b2, c1 - c2);
    debug!("solving {var}: a={a} b={b} c={c}");

    if a.abs() < EPS {
        if b.abs() < EPS {
            return Some(if c.abs() < EPS {
                EquationSolution::Infinite
            } else {
                EquationSolution::NoSolution
            });
        }
        return Some(EquationSolution::Single {
            var,
            value: SolvedValue::Numeric(-c / b),
        });
    }

    let disc = b * b - 4.0 * a * c;
    if disc < -EPS {
        return Some(EquationSolution::ComplexPair {
            var,
            re: SolvedValue::Numeric(-b / (2.0 * a)),
            im: SolvedValue::Numeric(((-disc).sqrt() / (2.0 * a)).abs()),
        });
    }
    if disc.abs() < EPS {
        return Some(EquationSolution::Single {
            var,
            value: SolvedValue::Numeric(-b / (2.0 * a)),
        });
    }

    // citardauq: branch on the sign of b so the subtraction never cancels
    let sign = if b >= 0.0 { 1.0 } else { -1.0 };
    let q = -0.5 * (b + sign * disc.sqrt());
    let x1 = q / a;
    let x2 = c / q;
    if (x1 - x2).abs() < EPS {
        return Some(EquationSolution::Single {
            var,
            value: SolvedValue::Numeric(x1),
        });
    }
    Some(EquationSolution::Pair {
        var,
        first: SolvedValue::Numeric(x1),
        second: SolvedValue::Numeric(x2),
    })
}

/// Solve a square linear system of up to three unknowns via Cramer's rule.
pub fn solve_system(lines: &[&str]) -> Option<SystemSolution> {
    let mut rows = Vec::with_capacity(lines.len());
    for line in lines {
        rows.push(linear_coeffs(line)?);
    }

    let mut vars: BTreeSet<String> = BTreeSet::new();
    for (coeffs, _) in &rows {
        vars.extend(coeffs.keys().cloned());
    }
    let vars: Vec<String> = vars.into_iter().collect();
    if vars.is_empty() || vars.len() != rows.len() || vars.len() > 3 {
        debug!(
            "system rejected: {} unknowns over {} equations",
            vars.len(),
            rows.len()
        );
        return None;
    }

    let n = vars.len();
    let matrix: Vec<Vec<f64>> = rows
        .iter()
        .map(|(coeffs, _)| {
            vars.iter()
                .map(|v| coeffs.get(v).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();
    // rows hold lhs - rhs = 0, so the right-hand vector is the negated constant
    let rhs: Vec<f64> = rows.iter().map(|(_, constant)| -constant).collect();

    let det = determinant(&matrix);
    if det.abs() < EPS {
        debug!("system has no unique solution (det={det})");
        return None;
    }

    let mut assignments = Vec::with_capacity(n);
    for (col, var) in vars.iter().enumerate() {
        let mut replaced = matrix.clone();
        for row in 0..n {
            replaced[row][col] = rhs[row];
        }
        assignments.push((
            var.clone(),
            SolvedValue::Numeric(determinant(&replaced) / det),
        ));
    }
    Some(SystemSolution { assignments })
}

/// Recursive cofactor expansion along the first row; closed forms for the
/// 1×1 and 2×2 bases.
fn determinant(m: &[Vec<f64>]) -> f64 {
    match m.len() {
        0 => 1.0,
        1 => m[0][0],
        2 => m[0][0] * m[1][1] - m[0][1] * m[1][0],
        n => {
            let mut acc = 0.0;
            for col in 0..n {
                let minor: Vec<Vec<f64>> = m[1..]
                    .iter()
                    .map(|row| {
                        row.iter()
                            .enumerate()
                            .filter(|(c, _)| *c != col)
                            .map(|(_, v)| *v)
                            .collect()
                    })
                    .collect();
                let sign = if col % 2 == 0 { 1.0 } else { -1.0 };
                acc += sign * m[0][col] * determinant(&minor);
            }
            acc
        }
    }
}

/// Extract `(a, b, c)` from one side of a quadratic equation by splitting on
/// signed term boundaries. Degrees above two and divisions by the unknown
/// reject the whole side.
fn quadratic_coeffs(side: &str, var: &str) -> Option<(f64, f64, f64)> {
    let (mut a, mut b, mut c) = (0.0, 0.0, 0.0);
    for term in split_terms(side) {
        let (degree, coeff) = term_coeff(&term, var)?;
        match degree {
            0 => c += coeff,
            1 => b += coeff,
            _ => a += coeff,
        }
    }
    Some((a, b, c))
}

/// Split an expression string into signed top-level terms. A `+`/`-` opens a
/// new term only at depth zero and only when it is not a unary sign or a
/// scientific-notation exponent sign.
fn split_terms(s: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut prev: Option<char> = None;
    for ch in s.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        let splits = matches!(ch, '+' | '-')
            && depth == 0
            && !matches!(prev, None | Some('E' | 'ᴇ' | '^' | '*' | '/' | '+' | '-' | '('));
        if splits {
            if !current.is_empty() {
                terms.push(current.clone());
            }
            current.clear();
        }
        current.push(ch);
        prev = Some(ch);
    }
    if !current.is_empty() {
        terms.push(current);
    }
    terms
}

/// Classify one signed term against the unknown and evaluate its numeric
/// coefficient.
fn term_coeff(term: &str, var: &str) -> Option<(u8, f64)> {
    let Some(pos) = find_identifier(term, var) else {
        return Some((0, eval_real(term)?));
    };
    // a second occurrence (x*x) is outside the extractor's grammar
    if find_identifier(&term[pos + var.len()..], var).is_some() {
        return None;
    }
    // the unknown may not sit in a denominator
    if term[..pos].ends_with('/') {
        return None;
    }

    let after = &term[pos + var.len()..];
    let (degree, consumed) = if after.starts_with("^(2)") {
        (2u8, var.len() + 4)
    } else if after.starts_with("^2") && !after[2..].starts_with(|c: char| c.is_ascii_digit()) {
        (2u8, var.len() + 2)
    } else if after.starts_with('^') {
        return None;
    } else {
        (1u8, var.len())
    };

    let mut rest = String::new();
    rest.push_str(&term[..pos]);
    rest.push_str(&term[pos + consumed..]);
    let rest = rest
        .trim_end_matches('*')
        .trim_start_matches('*')
        .to_string();
    let coeff = match rest.as_str() {
        "" | "+" => 1.0,
        "-" => -1.0,
        other => {
            let stripped = other.trim_end_matches('*');
            if let Some(body) = stripped.strip_prefix('+') {
                eval_real(body)?
            } else if let Some(body) = stripped.strip_prefix('-') {
                -eval_real(body)?
            } else {
                eval_real(stripped)?
            }
        }
    };
    Some((degree, coeff))
}

/// Locate `ident` as a standalone run (neighbors are not alphanumeric).
fn find_identifier(haystack: &str, ident: &str) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let mut from = 0;
    while let Some(rel) = haystack[from..].find(ident) {
        let pos = from + rel;
        let before_ok = pos == 0 || !(bytes[pos - 1] as char).is_ascii_alphanumeric();
        let end = pos + ident.len();
        let after_ok = end >= bytes.len() || !(bytes[end] as char).is_ascii_alphanumeric();
        if before_ok && after_ok {
            return Some(pos);
        }
        from = pos + ident.len();
    }
    None
}

fn eval_real(text: &str) -> Option<f64> {
    let value = numeric::evaluate_value(text).ok()?;
    let z = value.resolved();
    if z.im.abs() > EPS {
        return None;
    }
    Some(z.re)
}

/// Parse one equation line into a sparse coefficient map plus constant, with
/// the right-hand side folded in negated: the row reads `Σ cᵢ·xᵢ + k = 0`.
fn linear_coeffs(line: &str) -> Option<(BTreeMap<String, f64>, f64)> {
    let (lhs, rhs) = line.split_once('=')?;
    if rhs.contains('=') {
        return None;
    }
    let mut coeffs = BTreeMap::new();
    let mut constant = 0.0;
    accumulate_side(lhs, 1.0, &mut coeffs, &mut constant)?;
    accumulate_side(rhs, -1.0, &mut coeffs, &mut constant)?;
    Some((coeffs, constant))
}

fn accumulate_side(
    side: &str,
    scale: f64,
    coeffs: &mut BTreeMap<String, f64>,
    constant: &mut f64,
) -> Option<()> {
    for term in split_terms(side) {
        let vars = free_variables(&term);
        match vars.len() {
            0 => *constant += scale * eval_real(&term)?,
            1 => {
                let (degree, coeff) = term_coeff(&term, &vars[0])?;
                if degree != 1 {
                    return None;
                }
                *coeffs.entry(vars[0].clone()).or_insert(0.0) += scale * coeff;
            }
            _ => return None,
        }
    }
    Some(())
}
