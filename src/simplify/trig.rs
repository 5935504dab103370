use num_traits::{One, Zero};

use crate::expr::{ConstKind, Expr, Rational, TrigFn};

/// Exact trig evaluation. Arguments that are rational multiples of π hit the
/// π/6-π/4-π/3-π/2 grid for sin/cos/tan; the small-argument table covers the
/// inverse and hyperbolic functions at 0, 1 and -1. Everything else stays
/// symbolic.
pub fn simplify_trig(f: TrigFn, arg: Expr) -> Expr {
    if matches!(f, TrigFn::Sin | TrigFn::Cos | TrigFn::Tan) {
        if let Some(r) = pi_multiple(&arg) {
            let t = mod_two(&r);
            if grid_denominator(&t) {
                let exact = match f {
                    TrigFn::Sin => sin_exact(&t),
                    TrigFn::Cos => sin_exact(&mod_two(&(t.clone() + half()))),
                    TrigFn::Tan => tan_exact(&t),
                    _ => unreachable!(),
                };
                if let Some(value) = exact {
                    return value;
                }
            }
        }
    }
    if let Some(value) = special_small_arg(f, &arg) {
        return value;
    }
    Expr::Trig(f, arg.boxed())
}

/// Recognize `arg` as `r·π` and return `r`.
fn pi_multiple(arg: &Expr) -> Option<Rational> {
    match arg {
        Expr::Int(n) if n.is_zero() => Some(Rational::zero()),
        Expr::Const(ConstKind::Pi) => Some(Rational::one()),
        Expr::Prod(factors) => {
            let mut coeff = Rational::one();
            let mut pi_seen = false;
            for factor in factors {
                if let Some(r) = factor.as_rational() {
                    coeff *= r;
                } else if matches!(factor, Expr::Const(ConstKind::Pi)) && !pi_seen {
                    pi_seen = true;
                } else {
                    return None;
                }
            }
            pi_seen.then_some(coeff)
        }
        Expr::Div(num, den) => {
            let d = den.as_rational()?;
            if d.is_zero() {
                return None;
            }
            Some(pi_multiple(num)? / d)
        }
        _ => None,
    }
}

fn half() -> Rational {
    Rational::new(1.into(), 2.into())
}

fn mod_two(r: &Rational) -> Rational {
    let two = Rational::from_integer(2.into());
    r - (r / two.clone()).floor() * two
}

fn grid_denominator(t: &Rational) -> bool {
    let d = t.denom().clone();
    d == 1.into() || d == 2.into() || d == 3.into() || d == 4.into() || d == 6.into()
}

/// sin(t·π) for t in [0, 2).
fn sin_exact(t: &Rational) -> Option<Expr> {
    let one = Rational::one();
    if *t >= one {
        return sin_exact(&(t - one)).map(|e| e.negate().simplify());
    }
    let folded = if *t > half() { one - t } else { t.clone() };
    reference_sin(&folded)
}

fn reference_sin(t: &Rational) -> Option<Expr> {
    if t.is_zero() {
        return Some(Expr::int(0));
    }
    if *t == Rational::new(1.into(), 6.into()) {
        return Some(Expr::frac(1, 2));
    }
    if *t == Rational::new(1.into(), 4.into()) {
        return Some(Expr::div(Expr::sqrt(Expr::int(2)), Expr::int(2)));
    }
    if *t == Rational::new(1.into(), 3.into()) {
        return Some(Expr::div(Expr::sqrt(Expr::int(3)), Expr::int(2)));
    }
    if *t == half() {
        return Some(Expr::int(1));
    }
    None
}

/// tan(t·π); period 1, undefined at odd multiples of π/2.
fn tan_exact(t: &Rational) -> Option<Expr> {
    let one = Rational::one();
    let u = t - (t.clone()).floor();
    if u > half() {
        return tan_exact(&(one - u)).map(|e| e.negate().simplify());
    }
    if u.is_zero() {
        return Some(Expr::int(0));
    }
    if u == Rational::new(1.into(), 6.into()) {
        return Some(Expr::div(Expr::sqrt(Expr::int(3)), Expr::int(3)));
    }
    if u == Rational::new(1.into(), 4.into()) {
        return Some(Expr::int(1));
    }
    if u == Rational::new(1.into(), 3.into()) {
        return Some(Expr::sqrt(Expr::int(3)));
    }
    None
}

fn special_small_arg(f: TrigFn, arg: &Expr) -> Option<Expr> {
    let n = arg.as_int()?;
    let half_pi = || Expr::div(Expr::Const(ConstKind::Pi), Expr::int(2));
    let quarter_pi = || Expr::div(Expr::Const(ConstKind::Pi), Expr::int(4));
    if n.is_zero() {
        return match f {
            TrigFn::Sin
            | TrigFn::Tan
            | TrigFn::Asin
            | TrigFn::Atan
            | TrigFn::Sinh
            | TrigFn::Tanh
            | TrigFn::Asinh
            | TrigFn::Atanh => Some(Expr::int(0)),
            TrigFn::Cos | TrigFn::Cosh => Some(Expr::int(1)),
            TrigFn::Acos => Some(half_pi()),
            TrigFn::Acosh => None,
        };
    }
    if n.is_one() {
        return match f {
            TrigFn::Asin => Some(half_pi()),
            TrigFn::Acos => Some(Expr::int(0)),
            TrigFn::Atan => Some(quarter_pi()),
            TrigFn::Acosh => Some(Expr::int(0)),
            _ => None,
        };
    }
    if n == (-1).into() {
        return match f {
            TrigFn::Asin => Some(half_pi().negate().simplify()),
            TrigFn::Acos => Some(Expr::Const(ConstKind::Pi)),
            TrigFn::Atan => Some(quarter_pi().negate().simplify()),
            _ => None,
        };
    }
    None
}
