//! Structured expression tree as produced and consumed by the calculator UI.
//!
//! `MathNode` is the persisted form: a closed set of variants whose children
//! are ordered lists owned by value. The engine never mutates a node tree; it
//! converts it to an exact [`Expr`](crate::expr::Expr) or serializes it to a
//! flat PEMDAS string for numeric evaluation.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MathNode {
    Literal {
        text: String,
    },
    Fraction {
        numerator: Vec<MathNode>,
        denominator: Vec<MathNode>,
    },
    Exponent {
        base: Vec<MathNode>,
        power: Vec<MathNode>,
    },
    Root {
        square: bool,
        index: Vec<MathNode>,
        radicand: Vec<MathNode>,
    },
    Log {
        natural: bool,
        base: Vec<MathNode>,
        argument: Vec<MathNode>,
    },
    Trig {
        function: String,
        argument: Vec<MathNode>,
    },
    Parenthesis {
        content: Vec<MathNode>,
    },
    Permutation {
        n: Vec<MathNode>,
        r: Vec<MathNode>,
    },
    Combination {
        n: Vec<MathNode>,
        r: Vec<MathNode>,
    },
    Summation {
        variable: Vec<MathNode>,
        lower: Vec<MathNode>,
        upper: Vec<MathNode>,
        body: Vec<MathNode>,
    },
    Product {
        variable: Vec<MathNode>,
        lower: Vec<MathNode>,
        upper: Vec<MathNode>,
        body: Vec<MathNode>,
    },
    Derivative {
        variable: Vec<MathNode>,
        at: Vec<MathNode>,
        body: Vec<MathNode>,
    },
    Integral {
        variable: Vec<MathNode>,
        lower: Vec<MathNode>,
        upper: Vec<MathNode>,
        body: Vec<MathNode>,
    },
    Ans {
        index: Vec<MathNode>,
    },
    Constant {
        symbol: String,
    },
    UnitVector {
        axis: String,
    },
    Newline,
}

impl MathNode {
    pub fn literal(text: impl Into<String>) -> Self {
        MathNode::Literal { text: text.into() }
    }

    pub fn fraction(numerator: Vec<MathNode>, denominator: Vec<MathNode>) -> Self {
        MathNode::Fraction {
            numerator,
            denominator,
        }
    }

    pub fn exponent(base: Vec<MathNode>, power: Vec<MathNode>) -> Self {
        MathNode::Exponent { base, power }
    }

    pub fn sqrt(radicand: Vec<MathNode>) -> Self {
        MathNode::Root {
            square: true,
            index: vec![MathNode::literal("2")],
            radicand,
        }
    }

    pub fn root(index: Vec<MathNode>, radicand: Vec<MathNode>) -> Self {
        MathNode::Root {
            square: false,
            index,
            radicand,
        }
    }

    pub fn trig(function: impl Into<String>, argument: Vec<MathNode>) -> Self {
        MathNode::Trig {
            function: function.into(),
            argument,
        }
    }

    pub fn parens(content: Vec<MathNode>) -> Self {
        MathNode::Parenthesis { content }
    }

    pub fn constant(symbol: impl Into<String>) -> Self {
        MathNode::Constant {
            symbol: symbol.into(),
        }
    }

    pub fn ans(index: i64) -> Self {
        MathNode::Ans {
            index: vec![MathNode::literal(index.to_string())],
        }
    }

    /// Required child lists of this node, in declaration order. `Literal`,
    /// `Constant`, `UnitVector` and `Newline` have none.
    pub fn required_children(&self) -> Vec<&[MathNode]> {
        match self {
            MathNode::Literal { .. }
            | MathNode::Constant { .. }
            | MathNode::UnitVector { .. }
            | MathNode::Newline => Vec::new(),
            MathNode::Fraction {
                numerator,
                denominator,
            } => vec![numerator, denominator],
            MathNode::Exponent { base, power } => vec![base, power],
            MathNode::Root {
                index, radicand, ..
            } => vec![index, radicand],
            MathNode::Log { base, argument, .. } => vec![base, argument],
            MathNode::Trig { argument, .. } => vec![argument],
            MathNode::Parenthesis { content } => vec![content],
            MathNode::Permutation { n, r } | MathNode::Combination { n, r } => vec![n, r],
            MathNode::Summation {
                variable,
                lower,
                upper,
                body,
            }
            | MathNode::Product {
                variable,
                lower,
                upper,
                body,
            }
            | MathNode::Integral {
                variable,
                lower,
                upper,
                body,
            } => vec![variable, lower, upper, body],
            MathNode::Derivative { variable, at, body } => vec![variable, at, body],
            MathNode::Ans { index } => vec![index],
        }
    }
}

/// Whether a node sequence is ready for evaluation. An incomplete tree is the
/// normal state while the user is still typing, not an error: empty required
/// fields and dangling or doubled operators all report `false`.
pub fn is_complete(nodes: &[MathNode]) -> bool {
    if nodes.is_empty() {
        return false;
    }
    nodes
        .split(|n| matches!(n, MathNode::Newline))
        .all(sequence_complete)
}

fn sequence_complete(nodes: &[MathNode]) -> bool {
    if nodes.is_empty() {
        return false;
    }
    for node in nodes {
        for children in node.required_children() {
            if children.is_empty() || !sequence_complete(children) {
                return false;
            }
        }
    }
    let flat = flatten_symbols(nodes);
    flat.split('=').all(operators_well_formed) && parens_balanced(&flat)
}

/// Collapse a node sequence to its operator skeleton: literal text verbatim,
/// every structured node as a single value placeholder.
fn flatten_symbols(nodes: &[MathNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            MathNode::Literal { text } => out.push_str(text),
            MathNode::Newline => {}
            _ => out.push('#'),
        }
    }
    out
}

fn operators_well_formed(part: &str) -> bool {
    let chars: Vec<char> = part.chars().collect();
    if chars.is_empty() {
        return false;
    }
    let is_op = |c: char| matches!(c, '+' | '-' | '*' | '/' | '^');
    if matches!(chars[0], '*' | '/' | '^') {
        return false;
    }
    if is_op(*chars.last().unwrap()) {
        return false;
    }
    for pair in chars.windows(2) {
        if is_op(pair[0]) && is_op(pair[1]) {
            return false;
        }
        // an operator may not sit directly before a closing parenthesis
        if is_op(pair[0]) && pair[1] == ')' {
            return false;
        }
    }
    true
}

fn parens_balanced(s: &str) -> bool {
    let mut depth = 0i32;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_plain_literal() {
        assert!(is_complete(&[MathNode::literal("2+3")]));
    }

    #[test]
    fn trailing_operator_is_incomplete() {
        assert!(!is_complete(&[MathNode::literal("2+")]));
        assert!(!is_complete(&[MathNode::literal("2+*3")]));
    }

    #[test]
    fn empty_required_field_is_incomplete() {
        let frac = MathNode::fraction(vec![MathNode::literal("1")], vec![]);
        assert!(!is_complete(&[frac]));
    }

    #[test]
    fn leading_minus_is_complete() {
        assert!(is_complete(&[MathNode::literal("-5")]));
    }

    #[test]
    fn unbalanced_parens_are_incomplete() {
        assert!(!is_complete(&[MathNode::literal("(2+3")]));
    }
}
