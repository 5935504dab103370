//! Exact expression tree definitions and helpers.

use std::collections::BTreeSet;
use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::node::MathNode;

pub type Rational = BigRational;

/// Named constants recognized by the exact engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstKind {
    Pi,
    E,
    Phi,
    Epsilon0,
    Mu0,
    C0,
    ElementaryCharge,
}

impl ConstKind {
    pub fn value(self) -> f64 {
        match self {
            ConstKind::Pi => std::f64::consts::PI,
            ConstKind::E => std::f64::consts::E,
            ConstKind::Phi => 1.618_033_988_749_895,
            ConstKind::Epsilon0 => 8.854_187_812_8e-12,
            ConstKind::Mu0 => 1.256_637_062_12e-6,
            ConstKind::C0 => 299_792_458.0,
            ConstKind::ElementaryCharge => 1.602_176_634e-19,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ConstKind::Pi => "π",
            ConstKind::E => "e",
            ConstKind::Phi => "φ",
            ConstKind::Epsilon0 => "ε₀",
            ConstKind::Mu0 => "μ₀",
            ConstKind::C0 => "c₀",
            ConstKind::ElementaryCharge => "e⁻",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "π" | "pi" => Some(ConstKind::Pi),
            "e" => Some(ConstKind::E),
            "φ" | "phi" => Some(ConstKind::Phi),
            "ε₀" => Some(ConstKind::Epsilon0),
            "μ₀" => Some(ConstKind::Mu0),
            "c₀" => Some(ConstKind::C0),
            "e⁻" => Some(ConstKind::ElementaryCharge),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrigFn {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
}

impl TrigFn {
    pub fn name(self) -> &'static str {
        match self {
            TrigFn::Sin => "sin",
            TrigFn::Cos => "cos",
            TrigFn::Tan => "tan",
            TrigFn::Asin => "asin",
            TrigFn::Acos => "acos",
            TrigFn::Atan => "atan",
            TrigFn::Sinh => "sinh",
            TrigFn::Cosh => "cosh",
            TrigFn::Tanh => "tanh",
            TrigFn::Asinh => "asinh",
            TrigFn::Acosh => "acosh",
            TrigFn::Atanh => "atanh",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(TrigFn::Sin),
            "cos" => Some(TrigFn::Cos),
            "tan" => Some(TrigFn::Tan),
            "asin" | "arcsin" => Some(TrigFn::Asin),
            "acos" | "arccos" => Some(TrigFn::Acos),
            "atan" | "arctan" => Some(TrigFn::Atan),
            "sinh" => Some(TrigFn::Sinh),
            "cosh" => Some(TrigFn::Cosh),
            "tanh" => Some(TrigFn::Tanh),
            "asinh" | "arcsinh" => Some(TrigFn::Asinh),
            "acosh" | "arccosh" => Some(TrigFn::Acosh),
            "atanh" | "arctanh" => Some(TrigFn::Atanh),
            _ => None,
        }
    }

    pub fn eval(self, x: f64) -> f64 {
        match self {
            TrigFn::Sin => x.sin(),
            TrigFn::Cos => x.cos(),
            TrigFn::Tan => x.tan(),
            TrigFn::Asin => x.asin(),
            TrigFn::Acos => x.acos(),
            TrigFn::Atan => x.atan(),
            TrigFn::Sinh => x.sinh(),
            TrigFn::Cosh => x.cosh(),
            TrigFn::Tanh => x.tanh(),
            TrigFn::Asinh => x.asinh(),
            TrigFn::Acosh => x.acosh(),
            TrigFn::Atanh => x.atanh(),
        }
    }
}

/// Exact symbolic expression. Immutable: every operation rebuilds rather than
/// mutates, so a simplified tree can be shared freely with its inputs.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    Int(BigInt),
    Frac(Rational),
    Const(ConstKind),
    Sum(Vec<Expr>),
    Prod(Vec<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    /// radicand, index
    Root(Box<Expr>, Box<Expr>),
    Log {
        base: Box<Expr>,
        arg: Box<Expr>,
        natural: bool,
    },
    Trig(TrigFn, Box<Expr>),
    Abs(Box<Expr>),
    /// Symbolic quotient, distinct from `Frac` which is rational-only.
    Div(Box<Expr>, Box<Expr>),
    Perm(Box<Expr>, Box<Expr>),
    Comb(Box<Expr>, Box<Expr>),
    Var(String),
}

impl Expr {
    pub fn int(value: impl Into<BigInt>) -> Self {
        Expr::Int(value.into())
    }

    /// Build a rational literal, collapsing whole values to `Int`.
    pub fn frac(num: impl Into<BigInt>, den: impl Into<BigInt>) -> Self {
        rational_expr(Rational::new(num.into(), den.into()))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn sqrt(radicand: Expr) -> Self {
        Expr::Root(radicand.boxed(), Expr::int(2).boxed())
    }

    pub fn pow(base: Expr, exp: Expr) -> Self {
        Expr::Pow(base.boxed(), exp.boxed())
    }

    pub fn div(num: Expr, den: Expr) -> Self {
        Expr::Div(num.boxed(), den.boxed())
    }

    pub fn ln(arg: Expr) -> Self {
        Expr::Log {
            base: Expr::Const(ConstKind::E).boxed(),
            arg: arg.boxed(),
            natural: true,
        }
    }

    pub fn log(base: Expr, arg: Expr) -> Self {
        Expr::Log {
            base: base.boxed(),
            arg: arg.boxed(),
            natural: false,
        }
    }

    pub fn trig(function: TrigFn, arg: Expr) -> Self {
        Expr::Trig(function, arg.boxed())
    }

    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Expr::Int(n) => n.is_zero(),
            Expr::Frac(r) => r.is_zero(),
            _ => false,
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            Expr::Int(n) => n.is_one(),
            Expr::Frac(r) => r.is_one(),
            _ => false,
        }
    }

    pub fn is_rational(&self) -> bool {
        matches!(self, Expr::Int(_) | Expr::Frac(_))
    }

    pub fn is_integer(&self) -> bool {
        match self {
            Expr::Int(_) => true,
            Expr::Frac(r) => r.is_integer(),
            _ => false,
        }
    }

    pub fn as_rational(&self) -> Option<Rational> {
        match self {
            Expr::Int(n) => Some(Rational::from_integer(n.clone())),
            Expr::Frac(r) => Some(r.clone()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<BigInt> {
        match self {
            Expr::Int(n) => Some(n.clone()),
            Expr::Frac(r) if r.is_integer() => Some(r.to_integer()),
            _ => None,
        }
    }

    /// Factor this expression into numeric-coefficient × symbolic-base.
    /// Pure numbers report a base of `Int(1)`.
    pub fn split_coeff(&self) -> (Rational, Expr) {
        match self {
            Expr::Int(n) => (Rational::from_integer(n.clone()), Expr::int(1)),
            Expr::Frac(r) => (r.clone(), Expr::int(1)),
            Expr::Prod(factors) => {
                let mut coeff = Rational::one();
                let mut rest = Vec::new();
                for f in factors {
                    match f.as_rational() {
                        Some(r) => coeff *= r,
                        None => rest.push(f.clone()),
                    }
                }
                (coeff, prod_from(rest))
            }
            Expr::Div(num, den) => {
                if let Some(d) = den.as_rational() {
                    if !d.is_zero() {
                        let (c, base) = num.split_coeff();
                        return (c / d, base);
                    }
                }
                (Rational::one(), self.clone())
            }
            other => (Rational::one(), other.clone()),
        }
    }

    /// Canonical key grouping symbolically-like terms: two terms share a
    /// signature exactly when they differ only in numeric coefficient.
    pub fn term_signature(&self) -> String {
        let (_, base) = self.split_coeff();
        format!("{base:?}")
    }

    pub fn negate(&self) -> Expr {
        match self {
            Expr::Int(n) => Expr::Int(-n.clone()),
            Expr::Frac(r) => Expr::Frac(-r.clone()),
            Expr::Sum(terms) => Expr::Sum(terms.iter().map(Expr::negate).collect()),
            Expr::Prod(factors) => {
                // fold the sign into the leading rational factor when present
                if let Some(r) = factors.first().and_then(Expr::as_rational) {
                    let mut out = factors.clone();
                    out[0] = rational_expr(-r);
                    if out[0].is_one() {
                        out.remove(0);
                    }
                    prod_from(out)
                } else {
                    let mut out = Vec::with_capacity(factors.len() + 1);
                    out.push(Expr::int(-1));
                    out.extend(factors.iter().cloned());
                    Expr::Prod(out)
                }
            }
            other => Expr::Prod(vec![Expr::int(-1), other.clone()]),
        }
    }

    pub fn simplify(&self) -> Expr {
        crate::simplify::simplify(self)
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Expr::Int(n) => n.to_f64().unwrap_or(f64::NAN),
            Expr::Frac(r) => r.to_f64().unwrap_or(f64::NAN),
            Expr::Const(c) => c.value(),
            Expr::Sum(terms) => terms.iter().map(Expr::to_f64).sum(),
            Expr::Prod(factors) => factors.iter().map(Expr::to_f64).product(),
            Expr::Pow(base, exp) => base.to_f64().powf(exp.to_f64()),
            Expr::Root(radicand, index) => {
                let r = radicand.to_f64();
                let k = index.to_f64();
                if r < 0.0 && index.as_int().map_or(false, |n| n.is_odd()) {
                    -(-r).powf(1.0 / k)
                } else {
                    r.powf(1.0 / k)
                }
            }
            Expr::Log { base, arg, natural } => {
                if *natural {
                    arg.to_f64().ln()
                } else {
                    arg.to_f64().ln() / base.to_f64().ln()
                }
            }
            Expr::Trig(f, arg) => f.eval(arg.to_f64()),
            Expr::Abs(inner) => inner.to_f64().abs(),
            Expr::Div(num, den) => num.to_f64() / den.to_f64(),
            Expr::Perm(n, r) => falling_product(n.to_f64(), r.to_f64()),
            Expr::Comb(n, r) => {
                let nf = n.to_f64();
                let rf = r.to_f64();
                falling_product(nf, rf) / falling_product(rf, rf)
            }
            Expr::Var(_) => f64::NAN,
        }
    }

    /// Free variable names, in sorted order. Unresolved ANS references appear
    /// here under their fallback name (`ans<N>`).
    pub fn free_vars(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        self.collect_vars(&mut vars);
        vars
    }

    fn collect_vars(&self, vars: &mut BTreeSet<String>) {
        match self {
            Expr::Var(name) => {
                vars.insert(name.clone());
            }
            Expr::Int(_) | Expr::Frac(_) | Expr::Const(_) => {}
            Expr::Sum(items) | Expr::Prod(items) => {
                for item in items {
                    item.collect_vars(vars);
                }
            }
            Expr::Pow(a, b)
            | Expr::Root(a, b)
            | Expr::Div(a, b)
            | Expr::Perm(a, b)
            | Expr::Comb(a, b) => {
                a.collect_vars(vars);
                b.collect_vars(vars);
            }
            Expr::Log { base, arg, .. } => {
                base.collect_vars(vars);
                arg.collect_vars(vars);
            }
            Expr::Trig(_, arg) | Expr::Abs(arg) => arg.collect_vars(vars),
        }
    }

    pub fn contains_var(&self, name: &str) -> bool {
        self.free_vars().contains(name)
    }

    /// Whether a root, log, or trig call appears anywhere in the tree. Drives
    /// the display rule that pulls rational coefficients out of quotients.
    pub fn contains_transcendental(&self) -> bool {
        match self {
            Expr::Root(..) | Expr::Log { .. } | Expr::Trig(..) => true,
            Expr::Int(_) | Expr::Frac(_) | Expr::Const(_) | Expr::Var(_) => false,
            Expr::Sum(items) | Expr::Prod(items) => {
                items.iter().any(Expr::contains_transcendental)
            }
            Expr::Pow(a, b) | Expr::Div(a, b) | Expr::Perm(a, b) | Expr::Comb(a, b) => {
                a.contains_transcendental() || b.contains_transcendental()
            }
            Expr::Abs(inner) => inner.contains_transcendental(),
        }
    }

    /// Render to a display node tree for the UI.
    pub fn to_nodes(&self) -> Vec<MathNode> {
        match self {
            Expr::Int(n) => vec![MathNode::literal(n.to_string())],
            Expr::Frac(r) => vec![MathNode::fraction(
                vec![MathNode::literal(r.numer().to_string())],
                vec![MathNode::literal(r.denom().to_string())],
            )],
            Expr::Const(c) => vec![MathNode::constant(c.symbol())],
            Expr::Var(name) => vec![MathNode::literal(name.clone())],
            Expr::Sum(terms) => {
                let mut out = Vec::new();
                for (i, term) in terms.iter().enumerate() {
                    let (coeff, _) = term.split_coeff();
                    if i == 0 {
                        out.extend(term.to_nodes());
                    } else if coeff.is_negative() {
                        out.push(MathNode::literal("-"));
                        out.extend(term.negate().simplify().to_nodes());
                    } else {
                        out.push(MathNode::literal("+"));
                        out.extend(term.to_nodes());
                    }
                }
                out
            }
            Expr::Prod(factors) => {
                let mut out = Vec::new();
                for factor in factors {
                    if factor == &Expr::int(-1) && out.is_empty() {
                        out.push(MathNode::literal("-"));
                        continue;
                    }
                    if matches!(factor, Expr::Sum(_)) {
                        out.push(MathNode::parens(factor.to_nodes()));
                    } else {
                        out.extend(factor.to_nodes());
                    }
                }
                out
            }
            Expr::Pow(base, exp) => {
                let base_nodes = if base.is_rational() || matches!(**base, Expr::Var(_)) {
                    base.to_nodes()
                } else {
                    vec![MathNode::parens(base.to_nodes())]
                };
                vec![MathNode::exponent(base_nodes, exp.to_nodes())]
            }
            Expr::Root(radicand, index) => {
                if **index == Expr::int(2) {
                    vec![MathNode::sqrt(radicand.to_nodes())]
                } else {
                    vec![MathNode::root(index.to_nodes(), radicand.to_nodes())]
                }
            }
            Expr::Log { base, arg, natural } => vec![MathNode::Log {
                natural: *natural,
                base: base.to_nodes(),
                argument: arg.to_nodes(),
            }],
            Expr::Trig(f, arg) => vec![MathNode::trig(f.name(), arg.to_nodes())],
            Expr::Abs(inner) => vec![
                MathNode::literal("abs"),
                MathNode::parens(inner.to_nodes()),
            ],
            Expr::Div(num, den) => vec![MathNode::fraction(num.to_nodes(), den.to_nodes())],
            Expr::Perm(n, r) => vec![MathNode::Permutation {
                n: n.to_nodes(),
                r: r.to_nodes(),
            }],
            Expr::Comb(n, r) => vec![MathNode::Combination {
                n: n.to_nodes(),
                r: r.to_nodes(),
            }],
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::format::pretty(self))
    }
}

/// n·(n-1)·…·(n-r+1), the float fallback for permutation counts.
fn falling_product(n: f64, r: f64) -> f64 {
    let r = r.round();
    if r < 0.0 || !r.is_finite() {
        return f64::NAN;
    }
    let mut acc = 1.0;
    let mut term = n.round();
    let mut i = 0.0;
    while i < r {
        acc *= term;
        term -= 1.0;
        i += 1.0;
    }
    acc
}

/// Collapse a rational to the canonical `Expr`: whole values become `Int`.
pub fn rational_expr(r: Rational) -> Expr {
    if r.is_integer() {
        Expr::Int(r.to_integer())
    } else {
        Expr::Frac(r)
    }
}

/// Build a product without ever leaving a 0- or 1-ary `Prod` behind.
pub fn prod_from(mut factors: Vec<Expr>) -> Expr {
    match factors.len() {
        0 => Expr::int(1),
        1 => factors.remove(0),
        _ => Expr::Prod(factors),
    }
}

/// Build a sum without ever leaving a 0- or 1-ary `Sum` behind.
pub fn sum_from(mut terms: Vec<Expr>) -> Expr {
    match terms.len() {
        0 => Expr::int(0),
        1 => terms.remove(0),
        _ => Expr::Sum(terms),
    }
}

pub fn zero() -> Expr {
    Expr::int(0)
}

pub fn one() -> Expr {
    Expr::int(1)
}
