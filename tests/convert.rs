use std::collections::HashMap;

use symcalc::{convert, ConstKind, Expr, MathNode, TrigFn};

fn lit(text: &str) -> MathNode {
    MathNode::literal(text)
}

fn converted(nodes: &[MathNode]) -> Expr {
    convert(nodes, None).expect("conversion should succeed")
}

#[test]
fn literal_arithmetic_parses_by_precedence() {
    assert_eq!(converted(&[lit("2+3")]).simplify(), Expr::int(5));
    assert_eq!(converted(&[lit("2+3*4")]).simplify(), Expr::int(14));
    assert_eq!(converted(&[lit("2^3^2")]).simplify(), Expr::int(512));
    assert_eq!(converted(&[lit("-5+2")]).simplify(), Expr::int(-3));
}

#[test]
fn decimals_become_exact_fractions() {
    assert_eq!(converted(&[lit("0.25")]), Expr::frac(1, 4));
    assert_eq!(converted(&[lit("1.5")]).simplify(), Expr::frac(3, 2));
}

#[test]
fn long_decimals_round_to_integer_approximations() {
    // more than ten fractional digits gives up on exactness
    let approx = converted(&[lit("0.123456789012345")]);
    assert_eq!(approx, Expr::int(0));
    assert_eq!(converted(&[lit("1.5E3")]), Expr::int(1500));
}

#[test]
fn implicit_multiplication_between_tokens() {
    assert_eq!(converted(&[lit("2(3)")]).simplify(), Expr::int(6));
    assert_eq!(converted(&[lit("(2)(3)")]).simplify(), Expr::int(6));
    assert_eq!(converted(&[lit("(2)3")]).simplify(), Expr::int(6));

    let nodes = [lit("2"), MathNode::sqrt(vec![lit("2")])];
    assert_eq!(
        converted(&nodes).simplify(),
        Expr::Prod(vec![Expr::int(2), Expr::sqrt(Expr::int(2))])
    );
}

#[test]
fn structured_nodes_convert_recursively() {
    let frac = MathNode::fraction(vec![lit("6")], vec![lit("8")]);
    assert_eq!(converted(&[frac]).simplify(), Expr::frac(3, 4));

    let root = MathNode::sqrt(vec![lit("72")]);
    assert_eq!(
        converted(&[root]).simplify(),
        Expr::Prod(vec![Expr::int(6), Expr::sqrt(Expr::int(2))])
    );

    let trig = MathNode::trig("sin", vec![MathNode::constant("π")]);
    assert_eq!(converted(&[trig]), Expr::trig(TrigFn::Sin, Expr::Const(ConstKind::Pi)));
}

#[test]
fn variables_and_constants_tokenize_from_literals() {
    let expr = converted(&[lit("x^(2)")]);
    assert_eq!(expr, Expr::pow(Expr::var("x"), Expr::int(2)));

    assert_eq!(converted(&[lit("pi")]), Expr::Const(ConstKind::Pi));
    assert_eq!(converted(&[lit("e")]), Expr::Const(ConstKind::E));

    // adjacency with a variable multiplies
    assert_eq!(
        converted(&[lit("2x")]),
        Expr::Prod(vec![Expr::int(2), Expr::var("x")])
    );
}

#[test]
fn ans_references_resolve_against_the_context() {
    let mut ans = HashMap::new();
    ans.insert(1, Expr::int(41));
    let nodes = [MathNode::ans(1), lit("+1")];
    assert_eq!(convert(&nodes, Some(&ans)).unwrap().simplify(), Expr::int(42));
}

#[test]
fn unresolved_ans_degrades_to_a_free_variable() {
    assert_eq!(converted(&[MathNode::ans(3)]), Expr::var("ans3"));
    assert_eq!(converted(&[lit("ans7")]), Expr::var("ans7"));
}

#[test]
fn incomplete_or_foreign_input_errors() {
    assert!(convert(&[lit("2+")], None).is_err());
    assert!(convert(&[lit("(2")], None).is_err());
    assert!(convert(&[lit("2=3")], None).is_err());
    let sum = MathNode::Summation {
        variable: vec![lit("k")],
        lower: vec![lit("1")],
        upper: vec![lit("2")],
        body: vec![lit("k")],
    };
    assert!(convert(&[sum], None).is_err());
}
