use symcalc::format::format_equation_solution;
use symcalc::{
    solve_equation, solve_equation_exact, solve_system, solve_system_exact, EquationSolution,
    Expr, FormatOptions, SolvedValue,
};

fn numeric(value: &SolvedValue) -> f64 {
    match value {
        SolvedValue::Numeric(x) => *x,
        SolvedValue::Exact(e) => e.to_f64(),
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn quadratic_roots_via_citardauq() {
    let solution = solve_equation("x^(2)-5x+6=0").expect("solvable");
    match solution {
        EquationSolution::Pair { var, first, second } => {
            assert_eq!(var, "x");
            assert!(close(numeric(&first), 3.0));
            assert!(close(numeric(&second), 2.0));
        }
        other => panic!("expected a root pair, got {other:?}"),
    }
}

#[test]
fn complex_conjugate_pair() {
    let solution = solve_equation("x^(2)+1=0").expect("solvable");
    match &solution {
        EquationSolution::ComplexPair { var, re, im } => {
            assert_eq!(var, "x");
            assert!(close(numeric(re), 0.0));
            assert!(close(numeric(im), 1.0));
        }
        other => panic!("expected a complex pair, got {other:?}"),
    }
    assert_eq!(
        format_equation_solution(&solution, &FormatOptions::default()),
        "x = 0 ± 1i"
    );
}

#[test]
fn linear_equations() {
    match solve_equation("2x+4=10").expect("solvable") {
        EquationSolution::Single { value, .. } => assert!(close(numeric(&value), 3.0)),
        other => panic!("expected a single root, got {other:?}"),
    }
    assert_eq!(
        solve_equation("x+1=x+2"),
        Some(EquationSolution::NoSolution)
    );
    assert_eq!(solve_equation("x=x"), Some(EquationSolution::Infinite));
}

#[test]
fn equal_roots_collapse() {
    match solve_equation("x^(2)-2x+1=0").expect("solvable") {
        EquationSolution::Single { value, .. } => assert!(close(numeric(&value), 1.0)),
        other => panic!("expected one root, got {other:?}"),
    }
}

#[test]
fn extra_unknowns_are_rejected() {
    assert_eq!(solve_equation("x+y=3"), None);
    assert_eq!(solve_equation("x^(3)=1"), None);
}

#[test]
fn two_by_two_system() {
    let solution = solve_system(&["x+y=3", "x-y=1"]).expect("solvable");
    let values: Vec<(String, f64)> = solution
        .assignments
        .iter()
        .map(|(v, x)| (v.clone(), numeric(x)))
        .collect();
    assert_eq!(values.len(), 2);
    assert_eq!(values[0].0, "x");
    assert!(close(values[0].1, 2.0));
    assert_eq!(values[1].0, "y");
    assert!(close(values[1].1, 1.0));
}

#[test]
fn three_by_three_system() {
    let solution =
        solve_system(&["x+y+z=6", "x+y-z=0", "x-y+z=2"]).expect("solvable");
    let values: Vec<f64> = solution.assignments.iter().map(|(_, x)| numeric(x)).collect();
    assert!(close(values[0], 1.0));
    assert!(close(values[1], 2.0));
    assert!(close(values[2], 3.0));
}

#[test]
fn singular_systems_have_no_unique_solution() {
    assert_eq!(solve_system(&["x+y=2", "2x+2y=4"]), None);
}

#[test]
fn oversized_systems_are_rejected() {
    assert_eq!(
        solve_system(&["a+b+c+d=1", "a=1", "b=1", "c=1"]),
        None
    );
}

#[test]
fn exact_quadratic_keeps_surds() {
    let lhs = Expr::pow(Expr::var("x"), Expr::int(2));
    let rhs = Expr::int(2);
    match solve_equation_exact(&lhs, &rhs, "x").expect("solvable") {
        EquationSolution::Pair { first, second, .. } => {
            assert_eq!(first, SolvedValue::Exact(Expr::sqrt(Expr::int(2))));
            assert_eq!(
                second,
                SolvedValue::Exact(Expr::Prod(vec![
                    Expr::int(-1),
                    Expr::sqrt(Expr::int(2))
                ]))
            );
        }
        other => panic!("expected a root pair, got {other:?}"),
    }
}

#[test]
fn exact_linear_solution_is_rational() {
    let lhs = Expr::Sum(vec![
        Expr::Prod(vec![Expr::int(2), Expr::var("x")]),
        Expr::int(4),
    ]);
    let rhs = Expr::int(10);
    match solve_equation_exact(&lhs, &rhs, "x").expect("solvable") {
        EquationSolution::Single { value, .. } => {
            assert_eq!(value, SolvedValue::Exact(Expr::int(3)));
        }
        other => panic!("expected a single root, got {other:?}"),
    }
}

#[test]
fn exact_complex_pair() {
    let lhs = Expr::Sum(vec![
        Expr::pow(Expr::var("x"), Expr::int(2)),
        Expr::int(1),
    ]);
    let rhs = Expr::int(0);
    match solve_equation_exact(&lhs, &rhs, "x").expect("solvable") {
        EquationSolution::ComplexPair { re, im, .. } => {
            assert_eq!(re, SolvedValue::Exact(Expr::int(0)));
            assert_eq!(im, SolvedValue::Exact(Expr::int(1)));
        }
        other => panic!("expected a complex pair, got {other:?}"),
    }
}

#[test]
fn exact_system_via_expr_determinants() {
    let equations = vec![
        (
            Expr::Sum(vec![Expr::var("x"), Expr::var("y")]),
            Expr::int(3),
        ),
        (
            Expr::Sum(vec![Expr::var("x"), Expr::var("y").negate()]),
            Expr::int(1),
        ),
    ];
    let solution = solve_system_exact(&equations).expect("solvable");
    assert_eq!(
        solution.assignments,
        vec![
            ("x".to_string(), SolvedValue::Exact(Expr::int(2))),
            ("y".to_string(), SolvedValue::Exact(Expr::int(1))),
        ]
    );
}

#[test]
fn formatted_solutions() {
    let opts = FormatOptions::default();
    let pair = solve_equation("x^(2)-5x+6=0").unwrap();
    assert_eq!(
        format_equation_solution(&pair, &opts),
        "x = 3 or x = 2"
    );
    assert_eq!(
        format_equation_solution(&EquationSolution::NoSolution, &opts),
        "No solution"
    );
    assert_eq!(
        format_equation_solution(&EquationSolution::Infinite, &opts),
        "Infinite solutions"
    );
}
