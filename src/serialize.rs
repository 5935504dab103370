//! Serialization: flat PEMDAS strings for the numeric parser and solver,
//! and lossless JSON persistence for cells and app state.

use serde::{Deserialize, Serialize};

use crate::node::MathNode;
use crate::numeric::preprocess::insert_implicit_mul;

/// Render a node sequence to a fully parenthesized expression string. Every
/// structured node becomes an explicit sub-expression (change of base for
/// logs happens textually here), then the same implicit-multiplication pass
/// the converter uses runs over the character stream, and a leading `+` is
/// dropped.
pub fn to_pemdas(nodes: &[MathNode]) -> String {
    let raw = seq(nodes);
    let inserted = insert_implicit_mul(&raw);
    match inserted.strip_prefix('+') {
        Some(rest) => rest.to_string(),
        None => inserted,
    }
}

fn seq(nodes: &[MathNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node);
    }
    out
}

fn write_node(out: &mut String, node: &MathNode) {
    match node {
        MathNode::Literal { text } => out.push_str(text),
        MathNode::Fraction {
            numerator,
            denominator,
        } => {
            out.push_str(&format!("(({})/({}))", seq(numerator), seq(denominator)));
        }
        MathNode::Exponent { base, power } => {
            // single plain literals keep the compact x^(2) shape the solver
            // term-splitter expects
            let base_text = seq(base);
            if is_plain_operand(&base_text) {
                out.push_str(&format!("{base_text}^({})", seq(power)));
            } else {
                out.push_str(&format!("(({base_text})^({}))", seq(power)));
            }
        }
        MathNode::Root {
            square,
            index,
            radicand,
        } => {
            if *square {
                out.push_str(&format!("sqrt({})", seq(radicand)));
            } else {
                out.push_str(&format!("(({})^(1/({})))", seq(radicand), seq(index)));
            }
        }
        MathNode::Log {
            natural,
            base,
            argument,
        } => {
            if *natural {
                out.push_str(&format!("ln({})", seq(argument)));
            } else {
                out.push_str(&format!("(ln({})/ln({}))", seq(argument), seq(base)));
            }
        }
        MathNode::Trig { function, argument } => {
            out.push_str(&format!("{function}({})", seq(argument)));
        }
        MathNode::Parenthesis { content } => {
            out.push_str(&format!("({})", seq(content)));
        }
        MathNode::Permutation { n, r } => {
            out.push_str(&format!("perm(({}),({}))", seq(n), seq(r)));
        }
        MathNode::Combination { n, r } => {
            out.push_str(&format!("comb(({}),({}))", seq(n), seq(r)));
        }
        MathNode::Summation {
            variable,
            lower,
            upper,
            body,
        } => {
            out.push_str(&format!(
                "sum({},({}),({}),({}))",
                seq(variable),
                seq(lower),
                seq(upper),
                seq(body)
            ));
        }
        MathNode::Product {
            variable,
            lower,
            upper,
            body,
        } => {
            out.push_str(&format!(
                "prod({},({}),({}),({}))",
                seq(variable),
                seq(lower),
                seq(upper),
                seq(body)
            ));
        }
        MathNode::Derivative { variable, at, body } => {
            out.push_str(&format!(
                "deriv({},({}),({}))",
                seq(variable),
                seq(at),
                seq(body)
            ));
        }
        MathNode::Integral {
            variable,
            lower,
            upper,
            body,
        } => {
            out.push_str(&format!(
                "integ({},({}),({}),({}))",
                seq(variable),
                seq(lower),
                seq(upper),
                seq(body)
            ));
        }
        MathNode::Ans { index } => {
            out.push_str(&format!("ans{}", seq(index)));
        }
        MathNode::Constant { symbol } => out.push_str(symbol),
        MathNode::UnitVector { axis } => out.push_str(axis),
        MathNode::Newline => out.push('\n'),
    }
}

/// A bare number or identifier needs no wrapping parens as an exponent base.
fn is_plain_operand(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.')
}

pub fn nodes_to_json(nodes: &[MathNode]) -> String {
    serde_json::to_string(nodes).unwrap_or_else(|_| "[]".to_string())
}

/// Deserialize a persisted node list. Never fails: corrupt state degrades to
/// a single empty literal, an empty cell rather than a crash.
pub fn nodes_from_json(text: &str) -> Vec<MathNode> {
    serde_json::from_str(text).unwrap_or_else(|_| vec![MathNode::literal("")])
}

/// One persisted calculator cell: its node tree, cached answer text, and
/// position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub nodes: Vec<MathNode>,
    pub answer: String,
    pub index: usize,
}

impl CellRecord {
    pub fn empty(index: usize) -> Self {
        CellRecord {
            nodes: vec![MathNode::literal("")],
            answer: String::new(),
            index,
        }
    }
}

/// Whole-app persisted state: ordered cells plus the active-cell index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub cells: Vec<CellRecord>,
    pub active: usize,
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            cells: vec![CellRecord::empty(0)],
            active: 0,
        }
    }
}

pub fn state_to_json(state: &AppState) -> String {
    serde_json::to_string(state).unwrap_or_else(|_| "{}".to_string())
}

pub fn state_from_json(text: &str) -> AppState {
    serde_json::from_str(text).unwrap_or_default()
}
