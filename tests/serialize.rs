use symcalc::{
    nodes_from_json, nodes_to_json, state_from_json, state_to_json, to_pemdas, AppState,
    CellRecord, MathNode,
};

fn lit(text: &str) -> MathNode {
    MathNode::literal(text)
}

fn sample_tree() -> Vec<MathNode> {
    vec![
        lit("2+"),
        MathNode::fraction(vec![lit("1")], vec![lit("2")]),
        lit("*"),
        MathNode::sqrt(vec![lit("72")]),
        lit("-"),
        MathNode::trig("sin", vec![MathNode::constant("π")]),
        MathNode::Summation {
            variable: vec![lit("k")],
            lower: vec![lit("1")],
            upper: vec![lit("10")],
            body: vec![lit("k")],
        },
        MathNode::ans(3),
    ]
}

#[test]
fn json_round_trip_is_lossless() {
    let nodes = sample_tree();
    let json = nodes_to_json(&nodes);
    assert_eq!(nodes_from_json(&json), nodes);
}

#[test]
fn malformed_json_degrades_to_an_empty_cell() {
    assert_eq!(nodes_from_json("not json"), vec![lit("")]);
    assert_eq!(nodes_from_json("{\"type\":\"mystery\"}"), vec![lit("")]);
    assert_eq!(nodes_from_json(""), vec![lit("")]);
}

#[test]
fn app_state_round_trips() {
    let state = AppState {
        cells: vec![
            CellRecord {
                nodes: vec![lit("1+1")],
                answer: "2".to_string(),
                index: 0,
            },
            CellRecord {
                nodes: sample_tree(),
                answer: String::new(),
                index: 1,
            },
        ],
        active: 1,
    };
    assert_eq!(state_from_json(&state_to_json(&state)), state);
}

#[test]
fn corrupt_state_falls_back_to_default() {
    assert_eq!(state_from_json("{{{"), AppState::default());
}

#[test]
fn fractions_serialize_fully_parenthesized() {
    let nodes = vec![
        MathNode::fraction(vec![lit("1")], vec![lit("2")]),
        lit("+3"),
    ];
    assert_eq!(to_pemdas(&nodes), "((1)/(2))+3");
}

#[test]
fn adjacency_inserts_multiplication() {
    let nodes = vec![lit("2"), MathNode::fraction(vec![lit("1")], vec![lit("2")])];
    assert_eq!(to_pemdas(&nodes), "2*((1)/(2))");

    let nodes = vec![lit("3"), MathNode::sqrt(vec![lit("2")])];
    assert_eq!(to_pemdas(&nodes), "3*sqrt(2)");
}

#[test]
fn roots_and_logs_change_shape_textually() {
    assert_eq!(to_pemdas(&[MathNode::sqrt(vec![lit("2")])]), "sqrt(2)");
    assert_eq!(
        to_pemdas(&[MathNode::root(vec![lit("3")], vec![lit("8")])]),
        "((8)^(1/(3)))"
    );
    let log = MathNode::Log {
        natural: false,
        base: vec![lit("2")],
        argument: vec![lit("8")],
    };
    assert_eq!(to_pemdas(&[log]), "(ln(8)/ln(2))");
    let ln = MathNode::Log {
        natural: true,
        base: vec![lit("e")],
        argument: vec![lit("5")],
    };
    assert_eq!(to_pemdas(&[ln]), "ln(5)");
}

#[test]
fn exponent_bases_stay_compact_for_plain_operands() {
    let exp = MathNode::exponent(vec![lit("x")], vec![lit("2")]);
    assert_eq!(to_pemdas(&[exp]), "x^(2)");
    let exp = MathNode::exponent(vec![lit("1+x")], vec![lit("2")]);
    assert_eq!(to_pemdas(&[exp]), "((1+x)^(2))");
}

#[test]
fn iterated_nodes_serialize_to_calls() {
    let sum = MathNode::Summation {
        variable: vec![lit("k")],
        lower: vec![lit("1")],
        upper: vec![lit("10")],
        body: vec![lit("k")],
    };
    assert_eq!(to_pemdas(&[sum]), "sum(k,(1),(10),(k))");
    let integral = MathNode::Integral {
        variable: vec![lit("x")],
        lower: vec![lit("0")],
        upper: vec![lit("1")],
        body: vec![lit("x")],
    };
    assert_eq!(to_pemdas(&[integral]), "integ(x,(0),(1),(x))");
}

#[test]
fn ans_and_leading_plus() {
    assert_eq!(to_pemdas(&[MathNode::ans(3)]), "ans3");
    assert_eq!(to_pemdas(&[lit("+5")]), "5");
}
