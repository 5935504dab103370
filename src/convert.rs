//! Node-tree to exact-expression conversion.
//!
//! Structured nodes convert recursively into pre-built expression tokens;
//! literal text is tokenized character by character. A token-level pass then
//! inserts the implicit multiplications the display form leaves out, and an
//! operator-precedence parser assembles the final [`Expr`].

use std::collections::HashMap;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::FromPrimitive;

use crate::error::{CalcError, Result};
use crate::expr::{rational_expr, sum_from, ConstKind, Expr, TrigFn};
use crate::node::MathNode;

/// Decimal literals with more fractional digits than this lose exactness.
const EXACT_DECIMAL_DIGITS: usize = 10;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Num(String),
    Op(char),
    Open,
    Close,
    Built(Expr),
}

/// Convert a node sequence into an exact expression. Unresolved ANS
/// references degrade to free variables named `ans<N>` so the result stays
/// structurally valid.
pub fn convert(nodes: &[MathNode], ans: Option<&HashMap<i64, Expr>>) -> Result<Expr> {
    let mut tokens = Vec::new();
    tokenize(nodes, ans, &mut tokens)?;
    let tokens = insert_implicit_mul(tokens);
    let mut parser = TokenParser {
        tokens: &tokens,
        pos: 0,
    };
    let expr = parser.parse_add_sub()?;
    if parser.pos != tokens.len() {
        return Err(CalcError::Parse("unexpected trailing tokens".into()));
    }
    Ok(expr)
}

fn tokenize(
    nodes: &[MathNode],
    ans: Option<&HashMap<i64, Expr>>,
    out: &mut Vec<Token>,
) -> Result<()> {
    for node in nodes {
        match node {
            MathNode::Literal { text } => tokenize_literal(text, out)?,
            MathNode::Fraction {
                numerator,
                denominator,
            } => out.push(Token::Built(Expr::div(
                convert(numerator, ans)?,
                convert(denominator, ans)?,
            ))),
            MathNode::Exponent { base, power } => out.push(Token::Built(Expr::pow(
                convert(base, ans)?,
                convert(power, ans)?,
            ))),
            MathNode::Root {
                index, radicand, ..
            } => out.push(Token::Built(Expr::Root(
                convert(radicand, ans)?.boxed(),
                convert(index, ans)?.boxed(),
            ))),
            MathNode::Log {
                natural,
                base,
                argument,
            } => out.push(Token::Built(Expr::Log {
                base: convert(base, ans)?.boxed(),
                arg: convert(argument, ans)?.boxed(),
                natural: *natural,
            })),
            MathNode::Trig { function, argument } => {
                let f = TrigFn::from_name(function)
                    .ok_or_else(|| CalcError::Parse(format!("unknown function {function}")))?;
                out.push(Token::Built(Expr::trig(f, convert(argument, ans)?)));
            }
            MathNode::Parenthesis { content } => {
                out.push(Token::Built(convert(content, ans)?));
            }
            MathNode::Permutation { n, r } => out.push(Token::Built(Expr::Perm(
                convert(n, ans)?.boxed(),
                convert(r, ans)?.boxed(),
            ))),
            MathNode::Combination { n, r } => out.push(Token::Built(Expr::Comb(
                convert(n, ans)?.boxed(),
                convert(r, ans)?.boxed(),
            ))),
            MathNode::Constant { symbol } => {
                let kind = ConstKind::from_symbol(symbol)
                    .ok_or_else(|| CalcError::Parse(format!("unknown constant {symbol}")))?;
                out.push(Token::Built(Expr::Const(kind)));
            }
            MathNode::Ans { index } => {
                let n = ans_index(index)?;
                out.push(Token::Built(resolve_ans(n, ans)));
            }
            MathNode::UnitVector { axis } => {
                out.push(Token::Built(Expr::var(axis.clone())));
            }
            MathNode::Newline
            | MathNode::Summation { .. }
            | MathNode::Product { .. }
            | MathNode::Derivative { .. }
            | MathNode::Integral { .. } => {
                return Err(CalcError::Unsupported(
                    "node has no exact representation".into(),
                ));
            }
        }
    }
    Ok(())
}

fn tokenize_literal(text: &str, out: &mut Vec<Token>) -> Result<()> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // scientific suffix belongs to the literal
                if i < chars.len() && chars[i] == 'E' {
                    let mut j = i + 1;
                    if matches!(chars.get(j), Some('+' | '-')) {
                        j += 1;
                    }
                    if chars.get(j).is_some_and(|c| c.is_ascii_digit()) {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                out.push(Token::Num(chars[start..i].iter().collect()));
                continue;
            }
            '+' | '-' | '*' | '/' | '^' => out.push(Token::Op(c)),
            '×' | '·' => out.push(Token::Op('*')),
            '÷' => out.push(Token::Op('/')),
            '(' => out.push(Token::Open),
            ')' => out.push(Token::Close),
            'π' | 'φ' => {
                let kind = ConstKind::from_symbol(&c.to_string()).unwrap();
                out.push(Token::Built(Expr::Const(kind)));
            }
            'ε' | 'μ' if chars.get(i + 1) == Some(&'₀') => {
                let symbol: String = [c, '₀'].iter().collect();
                let kind = ConstKind::from_symbol(&symbol).unwrap();
                out.push(Token::Built(Expr::Const(kind)));
                i += 1;
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphabetic() {
                    i += 1;
                }
                let run: String = chars[start..i].iter().collect();
                // subscripted constants typed as plain text
                if run == "c" && chars.get(i) == Some(&'₀') {
                    out.push(Token::Built(Expr::Const(ConstKind::C0)));
                    i += 1;
                    continue;
                }
                if run == "e" && chars.get(i) == Some(&'⁻') {
                    out.push(Token::Built(Expr::Const(ConstKind::ElementaryCharge)));
                    i += 1;
                    continue;
                }
                if run.eq_ignore_ascii_case("ans") {
                    let digit_start = i;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                    let digits: String = chars[digit_start..i].iter().collect();
                    let n: i64 = digits
                        .parse()
                        .map_err(|_| CalcError::Parse("ans reference without index".into()))?;
                    out.push(Token::Built(Expr::var(format!("ans{n}"))));
                    continue;
                }
                match run.as_str() {
                    "pi" => out.push(Token::Built(Expr::Const(ConstKind::Pi))),
                    "e" => out.push(Token::Built(Expr::Const(ConstKind::E))),
                    _ => out.push(Token::Built(Expr::var(run))),
                }
                continue;
            }
            other => {
                return Err(CalcError::Parse(format!("unexpected character {other:?}")));
            }
        }
        i += 1;
    }
    Ok(())
}

fn ans_index(index: &[MathNode]) -> Result<i64> {
    let mut text = String::new();
    for node in index {
        match node {
            MathNode::Literal { text: t } => text.push_str(t),
            _ => return Err(CalcError::Parse("ans index must be a literal".into())),
        }
    }
    text.trim()
        .parse()
        .map_err(|_| CalcError::Parse(format!("bad ans index {text:?}")))
}

fn resolve_ans(n: i64, ans: Option<&HashMap<i64, Expr>>) -> Expr {
    match ans.and_then(|map| map.get(&n)) {
        Some(expr) => expr.clone(),
        None => Expr::var(format!("ans{n}")),
    }
}

/// Insert `*` between adjacent tokens where the display form implies a
/// product: number→`(`, number→expr, `)`→`(`, `)`→number, `)`→expr,
/// expr→expr, expr→`(`, expr→number.
fn insert_implicit_mul(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Some(prev) = out.last() {
            let left_value = matches!(prev, Token::Num(_) | Token::Close | Token::Built(_));
            let insert = left_value
                && match &token {
                    Token::Open | Token::Built(_) => true,
                    Token::Num(_) => matches!(prev, Token::Close | Token::Built(_)),
                    _ => false,
                };
            if insert {
                out.push(Token::Op('*'));
            }
        }
        out.push(token);
    }
    out
}

struct TokenParser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenParser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn parse_add_sub(&mut self) -> Result<Expr> {
        let mut terms = vec![self.parse_mul_div()?];
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            let negate = *op == '-';
            self.pos += 1;
            let rhs = self.parse_mul_div()?;
            terms.push(if negate { rhs.negate() } else { rhs });
        }
        Ok(sum_from(terms))
    }

    fn parse_mul_div(&mut self) -> Result<Expr> {
        let mut acc = self.parse_pow()?;
        while let Some(Token::Op(op @ ('*' | '/'))) = self.peek() {
            let divide = *op == '/';
            self.pos += 1;
            let rhs = self.parse_pow()?;
            acc = if divide {
                Expr::div(acc, rhs)
            } else {
                match acc {
                    Expr::Prod(mut factors) => {
                        factors.push(rhs);
                        Expr::Prod(factors)
                    }
                    other => Expr::Prod(vec![other, rhs]),
                }
            };
        }
        Ok(acc)
    }

    fn parse_pow(&mut self) -> Result<Expr> {
        let base = self.parse_unary()?;
        if let Some(Token::Op('^')) = self.peek() {
            self.pos += 1;
            let exp = self.parse_pow()?;
            return Ok(Expr::pow(base, exp));
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                Ok(self.parse_unary()?.negate())
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.parse_unary()
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| CalcError::Parse("unexpected end of input".into()))?;
        self.pos += 1;
        match token {
            Token::Open => {
                let inner = self.parse_add_sub()?;
                match self.peek() {
                    Some(Token::Close) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    _ => Err(CalcError::Parse("missing closing parenthesis".into())),
                }
            }
            Token::Built(expr) => Ok(expr),
            Token::Num(text) => number_literal(&text),
            other => Err(CalcError::Parse(format!("unexpected token {other:?}"))),
        }
    }
}

/// Integer literals become exact `Int`; short decimals become exact `Frac`;
/// long or scientific literals round to an `Int` approximation.
fn number_literal(text: &str) -> Result<Expr> {
    if !text.contains('E') {
        if let Some((int_part, frac_part)) = text.split_once('.') {
            if frac_part.len() <= EXACT_DECIMAL_DIGITS && !frac_part.contains('.') {
                let digits = format!("{int_part}{frac_part}");
                let num: BigInt = digits
                    .parse()
                    .map_err(|_| CalcError::Parse(format!("bad number {text:?}")))?;
                let den = BigInt::from(10u32).pow(frac_part.len() as u32);
                return Ok(rational_expr(BigRational::new(num, den)));
            }
        } else {
            let num: BigInt = text
                .parse()
                .map_err(|_| CalcError::Parse(format!("bad number {text:?}")))?;
            return Ok(Expr::Int(num));
        }
    }
    let approx: f64 = text
        .parse()
        .map_err(|_| CalcError::Parse(format!("bad number {text:?}")))?;
    let rounded = BigInt::from_f64(approx.round())
        .ok_or_else(|| CalcError::Parse(format!("bad number {text:?}")))?;
    Ok(Expr::Int(rounded))
}
