use num_traits::Signed;

use crate::expr::{ConstKind, Expr};

/// Precedence-aware string rendering of an exact expression.
pub fn pretty(expr: &Expr) -> String {
    pp(0, expr)
}

fn pp(ctx: u8, expr: &Expr) -> String {
    match expr {
        Expr::Int(n) => {
            let body = n.to_string();
            if n.is_negative() && ctx >= 2 {
                format!("({body})")
            } else {
                body
            }
        }
        Expr::Frac(r) => bracket(ctx, 2, format!("{}/{}", r.numer(), r.denom())),
        Expr::Const(c) => c.symbol().to_string(),
        Expr::Var(name) => name.clone(),

        Expr::Sum(terms) => {
            let mut body = String::new();
            for (i, term) in terms.iter().enumerate() {
                if i == 0 {
                    body.push_str(&pp(1, term));
                    continue;
                }
                let (coeff, _) = term.split_coeff();
                if coeff.is_negative() {
                    body.push('-');
                    body.push_str(&pp(2, &term.negate().simplify()));
                } else {
                    body.push('+');
                    body.push_str(&pp(2, term));
                }
            }
            bracket(ctx, 1, body)
        }

        Expr::Prod(factors) => {
            let mut body = String::new();
            for (i, factor) in factors.iter().enumerate() {
                let piece = if i == 0 {
                    // leading rational keeps its sign unparenthesized
                    match factor {
                        f if *f == Expr::int(-1) => "-".to_string(),
                        f if f.is_rational() => pp(1, f),
                        f => pp(2, f),
                    }
                } else {
                    pp(2, factor)
                };
                if body.is_empty() || body == "-" || juxtaposes(&body, &piece) {
                    body.push_str(&piece);
                } else {
                    body.push('*');
                    body.push_str(&piece);
                }
            }
            bracket(ctx, 2, body)
        }

        Expr::Pow(base, exp) => {
            let base_s = pp(4, base);
            let exp_s = match &**exp {
                Expr::Int(n) if !n.is_negative() => n.to_string(),
                other => format!("({})", pp(0, other)),
            };
            bracket(ctx, 3, format!("{base_s}^{exp_s}"))
        }

        Expr::Root(radicand, index) => {
            if **index == Expr::int(2) {
                match &**radicand {
                    Expr::Int(n) if !n.is_negative() => format!("√{n}"),
                    Expr::Var(v) => format!("√{v}"),
                    Expr::Const(c) => format!("√{}", c.symbol()),
                    other => format!("√({})", pp(0, other)),
                }
            } else {
                format!("({})^(1/{})", pp(0, radicand), pp(0, index))
            }
        }

        Expr::Log { base, arg, natural } => {
            if *natural {
                format!("ln({})", pp(0, arg))
            } else if **base == Expr::int(10) {
                format!("log({})", pp(0, arg))
            } else {
                format!("log_{}({})", pp(4, base), pp(0, arg))
            }
        }

        Expr::Trig(f, arg) => format!("{}({})", f.name(), pp(0, arg)),
        Expr::Abs(inner) => format!("|{}|", pp(0, inner)),
        Expr::Div(num, den) => bracket(ctx, 2, format!("{}/{}", pp(2, num), pp(3, den))),
        Expr::Perm(n, r) => format!("P({}, {})", pp(0, n), pp(0, r)),
        Expr::Comb(n, r) => format!("C({}, {})", pp(0, n), pp(0, r)),
    }
}

/// A digit followed by a radical, constant, or name reads naturally without
/// an explicit multiplication sign: `6√2`, `2π`, `3x`.
fn juxtaposes(left: &str, right: &str) -> bool {
    let Some(l) = left.chars().last() else {
        return false;
    };
    let Some(r) = right.chars().next() else {
        return false;
    };
    l.is_ascii_digit()
        && !left.contains('/')
        && (r == '√'
            || r.is_ascii_alphabetic()
            || ConstKind::from_symbol(&r.to_string()).is_some())
}

fn bracket(ctx: u8, prec: u8, body: String) -> String {
    if prec < ctx {
        format!("({body})")
    } else {
        body
    }
}
