use std::collections::BTreeSet;

use log::debug;
use num_traits::{Signed, Zero};

use crate::expr::{prod_from, sum_from, Expr};
use crate::simplify::{simplify, simplify_div};

use super::{EquationSolution, SolvedValue, SystemSolution};

/// Exact single-equation solving: linear and quadratic over one unknown,
/// with `Expr` arithmetic all the way so `x^2 = 2` answers `√2`.
pub fn solve_equation_exact(lhs: &Expr, rhs: &Expr, var: &str) -> Option<EquationSolution> {
    let diff = simplify(&Expr::Sum(vec![lhs.clone(), rhs.negate()]));
    let [c, b, a] = poly_coeffs(&diff, var)?;
    debug!("exact solve {var}: a={a:?} b={b:?} c={c:?}");

    if a.is_zero() {
        if b.is_zero() {
            return Some(if c.is_zero() {
                EquationSolution::Infinite
            } else {
                EquationSolution::NoSolution
            });
        }
        let value = simplify(&Expr::div(c.negate(), b));
        return Some(EquationSolution::Single {
            var: var.to_string(),
            value: SolvedValue::Exact(value),
        });
    }

    let disc = simplify(&Expr::Sum(vec![
        Expr::Prod(vec![b.clone(), b.clone()]),
        Expr::Prod(vec![Expr::int(-4), a.clone(), c.clone()]),
    ]));
    let two_a = simplify(&Expr::Prod(vec![Expr::int(2), a.clone()]));

    if let Some(dr) = disc.as_rational() {
        if dr.is_negative() {
            let re = simplify(&Expr::div(b.negate(), two_a.clone()));
            let mut im = simplify(&Expr::div(
                Expr::sqrt(simplify(&disc.negate())),
                two_a,
            ));
            if im.to_f64() < 0.0 {
                im = simplify(&im.negate());
            }
            return Some(EquationSolution::ComplexPair {
                var: var.to_string(),
                re: SolvedValue::Exact(re),
                im: SolvedValue::Exact(im),
            });
        }
        if dr.is_zero() {
            let value = simplify(&Expr::div(b.negate(), two_a));
            return Some(EquationSolution::Single {
                var: var.to_string(),
                value: SolvedValue::Exact(value),
            });
        }
    }

    let sqrt_disc = simplify(&Expr::sqrt(disc));
    let first = simplify(&Expr::div(
        Expr::Sum(vec![b.negate(), sqrt_disc.clone()]),
        two_a.clone(),
    ));
    let second = simplify(&Expr::div(
        Expr::Sum(vec![b.negate(), sqrt_disc.negate()]),
        two_a,
    ));
    Some(EquationSolution::Pair {
        var: var.to_string(),
        first: SolvedValue::Exact(first),
        second: SolvedValue::Exact(second),
    })
}

/// Split a simplified expression into `[constant, linear, quadratic]`
/// coefficients over `var`. Any term outside that grammar (higher degree,
/// the unknown under a function or in a denominator) rejects the input.
fn poly_coeffs(expr: &Expr, var: &str) -> Option<[Expr; 3]> {
    let terms: Vec<Expr> = match expr {
        Expr::Sum(terms) => terms.clone(),
        other => vec![other.clone()],
    };
    let mut buckets: [Vec<Expr>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for term in terms {
        let (degree, coeff) = term_degree(&term, var)?;
        buckets[degree].push(coeff);
    }
    let [c, b, a] = buckets;
    Some([
        simplify(&sum_from(c)),
        simplify(&sum_from(b)),
        simplify(&sum_from(a)),
    ])
}

fn term_degree(term: &Expr, var: &str) -> Option<(usize, Expr)> {
    if !term.contains_var(var) {
        return Some((0, term.clone()));
    }
    match term {
        Expr::Var(name) if name == var => Some((1, Expr::int(1))),
        Expr::Pow(base, exp) => {
            if **base == Expr::var(var) && **exp == Expr::int(2) {
                Some((2, Expr::int(1)))
            } else {
                None
            }
        }
        Expr::Prod(factors) => {
            let mut degree = 0usize;
            let mut coeff_factors = Vec::new();
            for factor in factors {
                match term_degree(factor, var)? {
                    (0, c) => coeff_factors.push(c),
                    (d, c) if c.is_one() => degree += d,
                    _ => return None,
                }
                if degree > 2 {
                    return None;
                }
            }
            Some((degree, prod_from(coeff_factors)))
        }
        Expr::Div(num, den) => {
            if den.contains_var(var) {
                return None;
            }
            let (degree, coeff) = term_degree(num, var)?;
            Some((degree, simplify_div(coeff, (**den).clone())))
        }
        _ => None,
    }
}

/// Exact linear-system solving via Cramer's rule with `Expr` determinants.
pub fn solve_system_exact(equations: &[(Expr, Expr)]) -> Option<SystemSolution> {
    let diffs: Vec<Expr> = equations
        .iter()
        .map(|(lhs, rhs)| simplify(&Expr::Sum(vec![lhs.clone(), rhs.negate()])))
        .collect();

    let mut vars: BTreeSet<String> = BTreeSet::new();
    for diff in &diffs {
        vars.extend(diff.free_vars());
    }
    let vars: Vec<String> = vars.into_iter().collect();
    if vars.is_empty() || vars.len() != diffs.len() || vars.len() > 3 {
        return None;
    }

    let mut matrix: Vec<Vec<Expr>> = Vec::with_capacity(diffs.len());
    let mut rhs: Vec<Expr> = Vec::with_capacity(diffs.len());
    for diff in &diffs {
        let (row, constant) = linear_row(diff, &vars)?;
        matrix.push(row);
        rhs.push(simplify(&constant.negate()));
    }

    let det = det_expr(&matrix);
    if det.is_zero() {
        debug!("exact system is singular");
        return None;
    }

    let mut assignments = Vec::with_capacity(vars.len());
    for (col, var) in vars.iter().enumerate() {
        let mut replaced = matrix.clone();
        for (row, value) in rhs.iter().enumerate() {
            replaced[row][col] = value.clone();
        }
        let value = simplify(&Expr::div(det_expr(&replaced), det.clone()));
        assignments.push((var.clone(), SolvedValue::Exact(value)));
    }
    Some(SystemSolution { assignments })
}

/// Decompose one normalized equation into per-variable linear coefficients
/// plus a constant remainder.
fn linear_row(diff: &Expr, vars: &[String]) -> Option<(Vec<Expr>, Expr)> {
    let terms: Vec<Expr> = match diff {
        Expr::Sum(terms) => terms.clone(),
        other => vec![other.clone()],
    };
    let mut row = vec![Vec::new(); vars.len()];
    let mut constant = Vec::new();
    for term in terms {
        let term_vars: Vec<&String> = vars.iter().filter(|v| term.contains_var(v)).collect();
        match term_vars.len() {
            0 => constant.push(term),
            1 => {
                let idx = vars.iter().position(|v| v == term_vars[0]).unwrap();
                let (degree, coeff) = term_degree(&term, term_vars[0])?;
                if degree != 1 {
                    return None;
                }
                row[idx].push(coeff);
            }
            _ => return None,
        }
    }
    let row = row
        .into_iter()
        .map(|cs| simplify(&sum_from(cs)))
        .collect();
    Some((row, simplify(&sum_from(constant))))
}

fn det_expr(m: &[Vec<Expr>]) -> Expr {
    match m.len() {
        0 => Expr::int(1),
        1 => m[0][0].clone(),
        2 => simplify(&Expr::Sum(vec![
            Expr::Prod(vec![m[0][0].clone(), m[1][1].clone()]),
            Expr::Prod(vec![Expr::int(-1), m[0][1].clone(), m[1][0].clone()]),
        ])),
        n => {
            let mut terms = Vec::with_capacity(n);
            for col in 0..n {
                let minor: Vec<Vec<Expr>> = m[1..]
                    .iter()
                    .map(|row| {
                        row.iter()
                            .enumerate()
                            .filter(|(c, _)| *c != col)
                            .map(|(_, v)| v.clone())
                            .collect()
                    })
                    .collect();
                let mut factors = Vec::new();
                if col % 2 == 1 {
                    factors.push(Expr::int(-1));
                }
                factors.push(m[0][col].clone());
                factors.push(det_expr(&minor));
                terms.push(Expr::Prod(factors));
            }
            simplify(&Expr::Sum(terms))
        }
    }
}
