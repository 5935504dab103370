use symcalc::{evaluate_cell, AnsContext, Expr, FormatOptions, MathNode};

fn lit(text: &str) -> MathNode {
    MathNode::literal(text)
}

fn run(nodes: &[MathNode]) -> Option<String> {
    evaluate_cell(nodes, &AnsContext::default(), &FormatOptions::default()).map(|r| r.text)
}

#[test]
fn plain_arithmetic_prefers_the_exact_path() {
    let result = evaluate_cell(
        &[lit("2+3*4")],
        &AnsContext::default(),
        &FormatOptions::default(),
    )
    .expect("evaluates");
    assert_eq!(result.text, "14");
    assert_eq!(result.exact, Some(Expr::int(14)));
}

#[test]
fn surds_render_symbolically() {
    let nodes = [MathNode::sqrt(vec![lit("72")])];
    assert_eq!(run(&nodes).as_deref(), Some("6√2"));
}

#[test]
fn fractions_stay_exact() {
    let nodes = [MathNode::fraction(vec![lit("3")], vec![lit("4")])];
    assert_eq!(run(&nodes).as_deref(), Some("3/4"));
}

#[test]
fn unevaluable_exact_forms_fall_back_to_numeric() {
    // sin(1) has no exact value; the numeric evaluator answers
    let nodes = [MathNode::trig("sin", vec![lit("1")])];
    assert_eq!(run(&nodes).as_deref(), Some("0.841471"));

    // division by zero leaves the exact engine and lands on IEEE semantics
    assert_eq!(run(&[lit("1/0")]).as_deref(), Some("∞"));
}

#[test]
fn percent_input_routes_numerically() {
    assert_eq!(run(&[lit("50%+100")]).as_deref(), Some("150"));
}

#[test]
fn equations_solve_exactly_when_possible() {
    assert_eq!(
        run(&[lit("x^(2)-5x+6=0")]).as_deref(),
        Some("x = 3 or x = 2")
    );
    assert_eq!(run(&[lit("x^(2)+1=0")]).as_deref(), Some("x = 0 ± 1i"));
    assert_eq!(run(&[lit("2x+4=10")]).as_deref(), Some("x = 3"));
}

#[test]
fn quadratic_with_surd_roots() {
    assert_eq!(
        run(&[lit("x^(2)-2=0")]).as_deref(),
        Some("x = √2 or x = -√2")
    );
}

#[test]
fn systems_split_on_newlines() {
    let nodes = [lit("x+y=3"), MathNode::Newline, lit("x-y=1")];
    assert_eq!(run(&nodes).as_deref(), Some("x = 2, y = 1"));
}

#[test]
fn overdetermined_input_yields_nothing() {
    assert_eq!(run(&[lit("x+y=3")]), None);
}

#[test]
fn ans_references_feed_downstream_cells() {
    let mut ans = AnsContext::default();
    ans.insert(1, "41", Some(Expr::int(41)));
    let nodes = [MathNode::ans(1), lit("+1")];
    let result = evaluate_cell(&nodes, &ans, &FormatOptions::default()).expect("evaluates");
    assert_eq!(result.text, "42");
}

#[test]
fn missing_ans_degrades_to_zero_numerically() {
    let nodes = [lit("5+"), MathNode::ans(9)];
    assert_eq!(run(&nodes).as_deref(), Some("5"));
}

#[test]
fn incomplete_cells_are_not_evaluable() {
    assert_eq!(run(&[lit("2+")]), None);
    assert_eq!(run(&[MathNode::fraction(vec![lit("1")], vec![])]), None);
    assert_eq!(run(&[]), None);
}

#[test]
fn summation_nodes_evaluate_numerically() {
    let sum = MathNode::Summation {
        variable: vec![lit("k")],
        lower: vec![lit("1")],
        upper: vec![lit("10")],
        body: vec![lit("k")],
    };
    assert_eq!(run(&[sum]).as_deref(), Some("55"));
}
