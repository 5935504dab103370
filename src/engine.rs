//! Cell evaluation front door.
//!
//! Takes a complete node tree plus the caller's ANS context and display
//! settings, classifies the input, and routes it: exact conversion and
//! simplification first where it can produce a closed form, the numeric
//! evaluator or the solvers otherwise. Every failure collapses to `None`;
//! nothing here panics or propagates an error.

use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::convert::convert;
use crate::expr::Expr;
use crate::format::{
    exact_display, format_equation_solution, format_system_solution, FormatOptions,
};
use crate::node::{is_complete, MathNode};
use crate::numeric;
use crate::serialize::to_pemdas;
use crate::solver::{self, classify, InputKind};

/// Prior results the cell may reference, keyed by cell index. The string map
/// feeds the numeric path, the expression map the exact path.
#[derive(Clone, Debug, Default)]
pub struct AnsContext {
    pub values: HashMap<i64, String>,
    pub exprs: HashMap<i64, Expr>,
}

impl AnsContext {
    pub fn insert(&mut self, index: i64, value: impl Into<String>, expr: Option<Expr>) {
        self.values.insert(index, value.into());
        if let Some(expr) = expr {
            self.exprs.insert(index, expr);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CellResult {
    /// Display string for the answer line.
    pub text: String,
    /// The simplified exact form, when one was reached; downstream cells
    /// resolve their ANS references against it.
    pub exact: Option<Expr>,
}

/// Evaluate one cell. Returns `None` while the tree is incomplete and on any
/// evaluation failure; both read as a blank answer line.
pub fn evaluate_cell(
    nodes: &[MathNode],
    ans: &AnsContext,
    opts: &FormatOptions,
) -> Option<CellResult> {
    if !is_complete(nodes) {
        return None;
    }
    let flat = substitute_ans_values(&to_pemdas(nodes), ans);
    match classify(&flat) {
        InputKind::System => evaluate_system(nodes, &flat, ans, opts),
        InputKind::Equation => evaluate_equation(nodes, &flat, ans, opts),
        InputKind::Expression => evaluate_expression(nodes, &flat, ans, opts),
    }
}

/// Evaluate a flat input string directly (numeric paths only). Handy for
/// callers without a structured tree.
pub fn evaluate_text(input: &str, opts: &FormatOptions) -> Option<String> {
    match classify(input) {
        InputKind::Expression => numeric::evaluate(input, opts),
        InputKind::Equation => {
            solver::solve_equation(input).map(|s| format_equation_solution(&s, opts))
        }
        InputKind::System => {
            let lines: Vec<&str> = input.lines().filter(|l| !l.trim().is_empty()).collect();
            solver::solve_system(&lines).map(|s| format_system_solution(&s, opts))
        }
    }
}

fn evaluate_expression(
    nodes: &[MathNode],
    flat: &str,
    ans: &AnsContext,
    opts: &FormatOptions,
) -> Option<CellResult> {
    // percent and factorial live only in the numeric grammar
    if !flat.contains('%') && !flat.contains('!') {
        match convert(nodes, Some(&ans.exprs)) {
            Ok(expr) => {
                let simplified = expr.simplify();
                if simplified.free_vars().is_empty()
                    && is_presentable(&simplified)
                    && simplified.to_f64().is_finite()
                {
                    debug!("exact result: {simplified:?}");
                    return Some(CellResult {
                        text: exact_display(&simplified, opts),
                        exact: Some(simplified),
                    });
                }
            }
            Err(err) => debug!("exact conversion unavailable: {err}"),
        }
    }
    let text = numeric::evaluate(flat, opts)?;
    Some(CellResult { text, exact: None })
}

/// Closed exact forms worth displaying symbolically: rationals, constants,
/// and arithmetic over them. An unevaluated function call means the exact
/// engine gave up, so the numeric path takes over.
fn is_presentable(expr: &Expr) -> bool {
    match expr {
        Expr::Int(_) | Expr::Frac(_) | Expr::Const(_) => true,
        Expr::Sum(items) | Expr::Prod(items) => items.iter().all(is_presentable),
        Expr::Pow(a, b) | Expr::Root(a, b) | Expr::Div(a, b) => {
            is_presentable(a) && is_presentable(b)
        }
        _ => false,
    }
}

fn evaluate_equation(
    nodes: &[MathNode],
    flat: &str,
    ans: &AnsContext,
    opts: &FormatOptions,
) -> Option<CellResult> {
    if let Some((lhs_nodes, rhs_nodes)) = split_equation(nodes) {
        let exact = convert(&lhs_nodes, Some(&ans.exprs))
            .and_then(|lhs| Ok((lhs, convert(&rhs_nodes, Some(&ans.exprs))?)));
        if let Ok((lhs, rhs)) = exact {
            let mut vars: BTreeSet<String> = lhs.free_vars();
            vars.extend(rhs.free_vars());
            vars.remove("i");
            if vars.len() == 1 {
                let var = vars.iter().next().unwrap().clone();
                if let Some(solution) = solver::solve_equation_exact(&lhs, &rhs, &var) {
                    return Some(CellResult {
                        text: format_equation_solution(&solution, opts),
                        exact: None,
                    });
                }
            }
        }
    }
    let solution = solver::solve_equation(flat)?;
    Some(CellResult {
        text: format_equation_solution(&solution, opts),
        exact: None,
    })
}

fn evaluate_system(
    nodes: &[MathNode],
    flat: &str,
    ans: &AnsContext,
    opts: &FormatOptions,
) -> Option<CellResult> {
    let mut equations = Vec::new();
    let mut exact_ok = true;
    for line in nodes.split(|n| matches!(n, MathNode::Newline)) {
        let Some((lhs_nodes, rhs_nodes)) = split_equation(line) else {
            exact_ok = false;
            break;
        };
        match (
            convert(&lhs_nodes, Some(&ans.exprs)),
            convert(&rhs_nodes, Some(&ans.exprs)),
        ) {
            (Ok(lhs), Ok(rhs)) => equations.push((lhs, rhs)),
            _ => {
                exact_ok = false;
                break;
            }
        }
    }
    if exact_ok {
        if let Some(solution) = solver::solve_system_exact(&equations) {
            return Some(CellResult {
                text: format_system_solution(&solution, opts),
                exact: None,
            });
        }
    }

    let lines: Vec<&str> = flat.lines().filter(|l| !l.trim().is_empty()).collect();
    let solution = solver::solve_system(&lines)?;
    Some(CellResult {
        text: format_system_solution(&solution, opts),
        exact: None,
    })
}

/// Split a node sequence at its (single) `=` sign, which lives inside a
/// literal. Both sides must be non-empty.
fn split_equation(nodes: &[MathNode]) -> Option<(Vec<MathNode>, Vec<MathNode>)> {
    let mut lhs = Vec::new();
    let mut rhs = Vec::new();
    let mut seen = false;
    for node in nodes {
        match node {
            MathNode::Literal { text } if text.contains('=') => {
                if seen || text.matches('=').count() > 1 {
                    return None;
                }
                let (left, right) = text.split_once('=').unwrap();
                if !left.is_empty() {
                    lhs.push(MathNode::literal(left));
                }
                if !right.is_empty() {
                    rhs.push(MathNode::literal(right));
                }
                seen = true;
            }
            other => {
                if seen {
                    rhs.push(other.clone());
                } else {
                    lhs.push(other.clone());
                }
            }
        }
    }
    (seen && !lhs.is_empty() && !rhs.is_empty()).then_some((lhs, rhs))
}

/// Replace `ans<N>` references (case-insensitive) with the stored numeric
/// answer; unresolvable or non-numeric references degrade to 0.
fn substitute_ans_values(text: &str, ans: &AnsContext) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let is_ans = i + 3 <= chars.len()
            && chars[i..i + 3]
                .iter()
                .collect::<String>()
                .eq_ignore_ascii_case("ans")
            && (i == 0 || !chars[i - 1].is_ascii_alphanumeric());
        if is_ans {
            let mut j = i + 3;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            if j > i + 3 {
                let index: i64 = chars[i + 3..j]
                    .iter()
                    .collect::<String>()
                    .parse()
                    .unwrap_or(0);
                let replacement = ans
                    .values
                    .get(&index)
                    .and_then(|stored| numeric_answer(stored))
                    .unwrap_or_else(|| "0".to_string());
                out.push('(');
                out.push_str(&replacement);
                out.push(')');
                i = j;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Re-read a stored answer string as a number, tolerating the display
/// artifacts (thousands separators, the small-caps exponent glyph).
fn numeric_answer(stored: &str) -> Option<String> {
    let cleaned: String = stored
        .chars()
        .filter(|c| *c != ',')
        .map(|c| if c == 'ᴇ' { 'E' } else { c })
        .collect();
    let value = numeric::evaluate_value(&cleaned).ok()?;
    let z = value.resolved();
    if !z.re.is_finite() || !z.im.is_finite() {
        return None;
    }
    if z.im == 0.0 {
        Some(format!("{}", z.re))
    } else {
        Some(format!(
            "{}{}{}*i",
            z.re,
            if z.im < 0.0 { '-' } else { '+' },
            z.im.abs()
        ))
    }
}
