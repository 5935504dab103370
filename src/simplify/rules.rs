use std::collections::hash_map::Entry;
use std::collections::HashMap;

use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::expr::{prod_from, rational_expr, sum_from, ConstKind, Expr, Rational};

use super::surd::simplify_root;
use super::trig::simplify_trig;

/// Integer exponents above this stay symbolic.
const MAX_EXACT_POW: u32 = 100;
/// Iteration bound for detecting `log_b(b^n)` on integer arguments.
const MAX_LOG_STEPS: u32 = 100;
/// Largest `n` for which permutation/combination counts evaluate exactly.
const MAX_COUNT_ARG: i64 = 1000;

/// Simplify an expression bottom-up. Pure and total: subtrees that no rule
/// applies to come back unchanged rather than failing.
pub fn simplify(expr: &Expr) -> Expr {
    match expr {
        Expr::Int(_) | Expr::Const(_) | Expr::Var(_) => expr.clone(),
        Expr::Frac(r) => rational_expr(r.reduced()),
        Expr::Sum(terms) => simplify_sum(terms.iter().map(simplify).collect()),
        Expr::Prod(factors) => simplify_prod(factors.iter().map(simplify).collect()),
        Expr::Pow(base, exp) => simplify_pow(simplify(base), simplify(exp)),
        Expr::Root(radicand, index) => simplify_root(simplify(radicand), simplify(index)),
        Expr::Log { base, arg, natural } => simplify_log(simplify(base), simplify(arg), *natural),
        Expr::Trig(f, arg) => simplify_trig(*f, simplify(arg)),
        Expr::Abs(inner) => simplify_abs(simplify(inner)),
        Expr::Div(num, den) => simplify_div(simplify(num), simplify(den)),
        Expr::Perm(n, r) => simplify_perm(simplify(n), simplify(r)),
        Expr::Comb(n, r) => simplify_comb(simplify(n), simplify(r)),
    }
}

pub fn simplify_sum(terms: Vec<Expr>) -> Expr {
    let mut flat = Vec::new();
    for term in terms {
        flatten_sum_into(term, &mut flat);
    }

    // group like terms by signature, preserving first-occurrence order
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, (Rational, Expr)> = HashMap::new();
    for term in flat {
        if term.is_zero() {
            continue;
        }
        let (coeff, base) = term.split_coeff();
        if coeff.is_zero() {
            continue;
        }
        let key = format!("{base:?}");
        match groups.entry(key.clone()) {
            Entry::Occupied(mut slot) => slot.get_mut().0 += coeff,
            Entry::Vacant(slot) => {
                slot.insert((coeff, base));
                order.push(key);
            }
        }
    }

    let mut out = Vec::new();
    for key in &order {
        let (coeff, base) = &groups[key];
        if coeff.is_zero() {
            continue;
        }
        out.push(term_from(coeff.clone(), base.clone()));
    }
    sum_from(out)
}

fn flatten_sum_into(term: Expr, out: &mut Vec<Expr>) {
    match term {
        Expr::Sum(terms) => {
            for t in terms {
                flatten_sum_into(t, out);
            }
        }
        other => out.push(other),
    }
}

pub(super) fn term_from(coeff: Rational, base: Expr) -> Expr {
    if base.is_one() {
        return rational_expr(coeff);
    }
    if coeff.is_one() {
        return base;
    }
    let mut factors = vec![rational_expr(coeff)];
    factors.extend(base_factors(base));
    Expr::Prod(factors)
}

pub(super) fn base_factors(base: Expr) -> Vec<Expr> {
    match base {
        Expr::Prod(factors) => factors,
        other => vec![other],
    }
}

pub fn simplify_prod(factors: Vec<Expr>) -> Expr {
    let mut flat = Vec::new();
    for factor in factors {
        flatten_prod_into(factor, &mut flat);
    }

    let mut coeff = Rational::one();
    let mut pending_roots: Vec<(Expr, Expr)> = Vec::new();
    let mut others = Vec::new();
    for factor in flat {
        if factor.is_zero() {
            return Expr::int(0);
        }
        if let Some(r) = factor.as_rational() {
            coeff *= r;
            continue;
        }
        match factor {
            Expr::Root(radicand, index) => {
                // same-index roots multiply under one radical
                if let Some(at) = pending_roots.iter().position(|(_, i)| *i == *index) {
                    let merged = Expr::Prod(vec![pending_roots[at].0.clone(), *radicand]);
                    pending_roots[at].0 = merged;
                } else {
                    pending_roots.push((*radicand, *index));
                }
            }
            other => others.push(other),
        }
    }
    if coeff.is_zero() {
        return Expr::int(0);
    }

    // re-run extraction on each merged radical; it may surface numeric parts
    let mut roots = Vec::new();
    for (radicand, index) in pending_roots {
        let reduced = simplify_root(simplify(&radicand), index);
        absorb_factor(reduced, &mut coeff, &mut roots, &mut others);
    }
    if coeff.is_zero() {
        return Expr::int(0);
    }

    roots.sort_by_key(|e| format!("{e:?}"));
    others.sort_by_key(|e| format!("{e:?}"));

    let mut out = Vec::new();
    if roots.is_empty() && others.is_empty() {
        return rational_expr(coeff);
    }
    if !coeff.is_one() {
        out.push(rational_expr(coeff));
    }
    out.extend(roots);
    out.extend(others);
    prod_from(out)
}

fn absorb_factor(factor: Expr, coeff: &mut Rational, roots: &mut Vec<Expr>, others: &mut Vec<Expr>) {
    if let Some(r) = factor.as_rational() {
        *coeff *= r;
        return;
    }
    match factor {
        Expr::Root(..) => roots.push(factor),
        Expr::Prod(factors) => {
            for f in factors {
                absorb_factor(f, coeff, roots, others);
            }
        }
        other => others.push(other),
    }
}

fn flatten_prod_into(factor: Expr, out: &mut Vec<Expr>) {
    match factor {
        Expr::Prod(factors) => {
            for f in factors {
                flatten_prod_into(f, out);
            }
        }
        other => out.push(other),
    }
}

pub fn simplify_pow(base: Expr, exp: Expr) -> Expr {
    if let Some(e) = exp.as_rational() {
        if e.is_zero() {
            return Expr::int(1);
        }
        if e.is_one() {
            return base;
        }
        if base.is_zero() {
            if e.is_positive() {
                return Expr::int(0);
            }
            return Expr::Pow(base.boxed(), exp.boxed());
        }
    }
    if base.is_one() {
        return Expr::int(1);
    }

    if let (Some(b), Some(e)) = (base.as_rational(), exp.as_int()) {
        if let Some(mag) = e.abs().to_u32() {
            if mag <= MAX_EXACT_POW {
                let raised = Rational::new(b.numer().pow(mag), b.denom().pow(mag));
                if e.is_negative() {
                    if !raised.is_zero() {
                        return rational_expr(raised.recip());
                    }
                } else {
                    return rational_expr(raised);
                }
            }
        }
    }

    match (base, exp) {
        // nested powers combine exponents by multiplication
        (Expr::Pow(inner_base, inner_exp), exp) => {
            let combined = simplify(&Expr::Prod(vec![*inner_exp, exp]));
            simplify_pow(*inner_base, combined)
        }
        // fractional exponent p/q converts to a root
        (base, Expr::Frac(r)) => {
            let p = r.numer().clone();
            let q = r.denom().clone();
            simplify_root(simplify_pow(base, Expr::Int(p)), Expr::Int(q))
        }
        (base, exp) => {
            // negative integer exponent inverts
            if let Some(e) = exp.as_int() {
                if e.is_negative() {
                    return simplify_div(Expr::int(1), simplify_pow(base, Expr::Int(-e)));
                }
            }
            Expr::Pow(base.boxed(), exp.boxed())
        }
    }
}

pub fn simplify_div(num: Expr, den: Expr) -> Expr {
    if num.is_zero() && !den.is_zero() {
        return Expr::int(0);
    }
    if den.is_one() {
        return num;
    }
    if num == den && !num.is_zero() {
        return Expr::int(1);
    }

    if let (Some(n), Some(d)) = (num.as_rational(), den.as_rational()) {
        if d.is_zero() {
            return Expr::Div(num.boxed(), den.boxed());
        }
        return rational_expr(n / d);
    }

    // same-index roots combine under the radical
    if let (Expr::Root(rn, ri), Expr::Root(dn, di)) = (&num, &den) {
        if ri == di {
            return simplify_root(
                simplify_div((**rn).clone(), (**dn).clone()),
                (**ri).clone(),
            );
        }
    }

    // sums distribute termwise over a non-sum denominator
    if let Expr::Sum(terms) = &num {
        if !matches!(den, Expr::Sum(_)) {
            return simplify_sum(
                terms
                    .iter()
                    .map(|t| simplify_div(t.clone(), den.clone()))
                    .collect(),
            );
        }
    }

    // rational denominator: separate the numerator's rational factor
    if let Some(d) = den.as_rational() {
        if !d.is_zero() {
            let (c, base) = num.split_coeff();
            let rewrite = !c.is_one() || !d.is_integer() || d.is_negative();
            if base.is_one() {
                return rational_expr(c / d);
            }
            if rewrite {
                let q = c / d;
                if base.contains_transcendental() {
                    // coefficient leaves the fraction so surds and logs do
                    // not end up stacked inside nested quotients
                    return term_from(q, base);
                }
                let new_num = term_from(Rational::from_integer(q.numer().clone()), base);
                let q_den = q.denom().clone();
                if q_den.is_one() {
                    return new_num;
                }
                return Expr::Div(new_num.boxed(), Expr::Int(q_den).boxed());
            }
        }
    }

    Expr::Div(num.boxed(), den.boxed())
}

pub fn simplify_log(base: Expr, arg: Expr, natural: bool) -> Expr {
    if arg.is_one() {
        return Expr::int(0);
    }
    let effective_base = if natural {
        Expr::Const(ConstKind::E)
    } else {
        base.clone()
    };
    if arg == effective_base {
        return Expr::int(1);
    }
    if let Expr::Pow(b, e) = &arg {
        if **b == effective_base {
            return (**e).clone();
        }
    }
    // integer argument that is an exact power of an integer base
    if let (Some(b), Some(a)) = (effective_base.as_int(), arg.as_int()) {
        if b >= BigInt::from(2) && a >= BigInt::one() {
            let mut acc = b.clone();
            for i in 1..=MAX_LOG_STEPS {
                if acc == a {
                    return Expr::int(i64::from(i));
                }
                if acc > a {
                    break;
                }
                acc *= &b;
            }
        }
    }
    Expr::Log {
        base: base.boxed(),
        arg: arg.boxed(),
        natural,
    }
}

fn simplify_abs(inner: Expr) -> Expr {
    if let Some(r) = inner.as_rational() {
        return rational_expr(r.abs());
    }
    let (c, base) = inner.split_coeff();
    if !c.is_one() {
        return term_from(c.abs(), Expr::Abs(base.boxed()));
    }
    Expr::Abs(inner.boxed())
}

fn simplify_perm(n: Expr, r: Expr) -> Expr {
    if let Some((ni, ri)) = counting_args(&n, &r) {
        return Expr::Int(falling_factorial(&ni, &ri));
    }
    Expr::Perm(n.boxed(), r.boxed())
}

fn simplify_comb(n: Expr, r: Expr) -> Expr {
    if let Some((ni, ri)) = counting_args(&n, &r) {
        let num = falling_factorial(&ni, &ri);
        let den = falling_factorial(&ri, &ri);
        return rational_expr(Rational::new(num, den));
    }
    Expr::Comb(n.boxed(), r.boxed())
}

fn counting_args(n: &Expr, r: &Expr) -> Option<(BigInt, BigInt)> {
    let n = n.as_int()?;
    let r = r.as_int()?;
    if r.is_negative() || r > n || n > BigInt::from(MAX_COUNT_ARG) {
        return None;
    }
    Some((n, r))
}

fn falling_factorial(n: &BigInt, r: &BigInt) -> BigInt {
    let mut acc = BigInt::one();
    let mut term = n.clone();
    let mut left = r.clone();
    while left.is_positive() {
        acc *= &term;
        term -= 1;
        left -= 1;
    }
    acc
}
