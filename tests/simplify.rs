use num_rational::BigRational;
use symcalc::{ConstKind, Expr, TrigFn};

fn sqrt2() -> Expr {
    Expr::sqrt(Expr::int(2))
}

#[test]
fn fractions_reduce_to_lowest_terms() {
    let unreduced = Expr::Frac(BigRational::new_raw(6.into(), 8.into()));
    assert_eq!(unreduced.simplify(), Expr::frac(3, 4));
}

#[test]
fn whole_fractions_collapse_to_integers() {
    let unreduced = Expr::Frac(BigRational::new_raw(4.into(), 2.into()));
    assert_eq!(unreduced.simplify(), Expr::int(2));
}

#[test]
fn surd_extraction_pulls_square_factors() {
    let root = Expr::sqrt(Expr::int(72));
    assert_eq!(
        root.simplify(),
        Expr::Prod(vec![Expr::int(6), sqrt2()])
    );
}

#[test]
fn perfect_squares_leave_no_radical() {
    assert_eq!(Expr::sqrt(Expr::int(49)).simplify(), Expr::int(7));
}

#[test]
fn cube_roots_extract_by_index() {
    let root = Expr::Root(Expr::int(8).boxed(), Expr::int(3).boxed());
    assert_eq!(root.simplify(), Expr::int(2));
}

#[test]
fn negative_radicand_keeps_sign_outside_for_odd_index() {
    let root = Expr::Root(Expr::int(-8).boxed(), Expr::int(3).boxed());
    assert_eq!(root.simplify(), Expr::int(-2));
}

#[test]
fn like_terms_combine_coefficients() {
    let sum = Expr::Sum(vec![
        Expr::Prod(vec![Expr::int(3), sqrt2()]),
        Expr::Prod(vec![Expr::int(5), sqrt2()]),
    ]);
    assert_eq!(
        sum.simplify(),
        Expr::Prod(vec![Expr::int(8), sqrt2()])
    );
}

#[test]
fn cancelling_terms_vanish() {
    let x = Expr::var("x");
    let sum = Expr::Sum(vec![x.clone(), x.negate()]);
    assert_eq!(sum.simplify(), Expr::int(0));
}

#[test]
fn constant_terms_fold_together() {
    let sum = Expr::Sum(vec![
        Expr::int(1),
        Expr::var("x"),
        Expr::int(2),
        Expr::var("x"),
    ]);
    assert_eq!(
        sum.simplify(),
        Expr::Sum(vec![
            Expr::int(3),
            Expr::Prod(vec![Expr::int(2), Expr::var("x")])
        ])
    );
}

#[test]
fn product_folds_rationals_and_merges_roots() {
    let prod = Expr::Prod(vec![
        Expr::int(2),
        sqrt2(),
        Expr::int(3),
        sqrt2(),
    ]);
    // 2·√2·3·√2 = 6·√4 = 12
    assert_eq!(prod.simplify(), Expr::int(12));
}

#[test]
fn zero_factor_short_circuits() {
    let prod = Expr::Prod(vec![Expr::var("x"), Expr::int(0), sqrt2()]);
    assert_eq!(prod.simplify(), Expr::int(0));
}

#[test]
fn integer_powers_compute_exactly() {
    assert_eq!(
        Expr::pow(Expr::int(2), Expr::int(10)).simplify(),
        Expr::int(1024)
    );
    assert_eq!(
        Expr::pow(Expr::var("x"), Expr::int(0)).simplify(),
        Expr::int(1)
    );
    assert_eq!(
        Expr::pow(Expr::var("x"), Expr::int(1)).simplify(),
        Expr::var("x")
    );
}

#[test]
fn negative_exponents_invert_to_fractions() {
    assert_eq!(
        Expr::pow(Expr::int(2), Expr::int(-2)).simplify(),
        Expr::frac(1, 4)
    );
}

#[test]
fn fractional_exponents_become_roots() {
    assert_eq!(
        Expr::pow(Expr::int(8), Expr::frac(1, 3)).simplify(),
        Expr::int(2)
    );
    assert_eq!(
        Expr::pow(Expr::int(2), Expr::frac(1, 2)).simplify(),
        sqrt2()
    );
}

#[test]
fn nested_powers_multiply_exponents() {
    let nested = Expr::pow(Expr::pow(Expr::var("x"), Expr::int(2)), Expr::int(3));
    assert_eq!(
        nested.simplify(),
        Expr::pow(Expr::var("x"), Expr::int(6))
    );
}

#[test]
fn logs_of_exact_powers_resolve() {
    assert_eq!(
        Expr::log(Expr::int(2), Expr::int(8)).simplify(),
        Expr::int(3)
    );
    assert_eq!(
        Expr::log(Expr::int(10), Expr::int(1)).simplify(),
        Expr::int(0)
    );
    assert_eq!(Expr::ln(Expr::Const(ConstKind::E)).simplify(), Expr::int(1));
}

#[test]
fn sin_quarter_pi_is_half_root_two() {
    let arg = Expr::div(Expr::Const(ConstKind::Pi), Expr::int(4));
    assert_eq!(
        Expr::trig(TrigFn::Sin, arg).simplify(),
        Expr::div(sqrt2(), Expr::int(2))
    );
}

#[test]
fn trig_grid_values() {
    let pi = || Expr::Const(ConstKind::Pi);
    assert_eq!(
        Expr::trig(TrigFn::Sin, Expr::div(pi(), Expr::int(6))).simplify(),
        Expr::frac(1, 2)
    );
    assert_eq!(
        Expr::trig(TrigFn::Cos, Expr::div(pi(), Expr::int(3))).simplify(),
        Expr::frac(1, 2)
    );
    assert_eq!(
        Expr::trig(TrigFn::Tan, Expr::div(pi(), Expr::int(4))).simplify(),
        Expr::int(1)
    );
    assert_eq!(
        Expr::trig(TrigFn::Tan, Expr::div(pi(), Expr::int(6))).simplify(),
        Expr::div(Expr::sqrt(Expr::int(3)), Expr::int(3))
    );
    assert_eq!(Expr::trig(TrigFn::Sin, pi()).simplify(), Expr::int(0));
    assert_eq!(Expr::trig(TrigFn::Cos, Expr::int(0)).simplify(), Expr::int(1));
}

#[test]
fn inverse_trig_special_arguments() {
    assert_eq!(
        Expr::trig(TrigFn::Asin, Expr::int(1)).simplify(),
        Expr::div(Expr::Const(ConstKind::Pi), Expr::int(2))
    );
    assert_eq!(
        Expr::trig(TrigFn::Acos, Expr::int(-1)).simplify(),
        Expr::Const(ConstKind::Pi)
    );
    assert_eq!(Expr::trig(TrigFn::Atan, Expr::int(0)).simplify(), Expr::int(0));
    assert_eq!(Expr::trig(TrigFn::Cosh, Expr::int(0)).simplify(), Expr::int(1));
}

#[test]
fn unevaluable_trig_stays_symbolic() {
    let call = Expr::trig(TrigFn::Sin, Expr::int(2));
    assert_eq!(call.simplify(), call);
}

#[test]
fn division_separates_rational_coefficients() {
    let x = Expr::var("x");
    let fused = Expr::div(
        Expr::Prod(vec![Expr::int(6), x.clone()]),
        Expr::int(4),
    );
    assert_eq!(
        fused.simplify(),
        Expr::div(
            Expr::Prod(vec![Expr::int(3), x.clone()]),
            Expr::int(2)
        )
    );

    // a transcendental remainder pulls the coefficient out instead
    let pulled = Expr::div(
        Expr::Prod(vec![Expr::int(6), sqrt2()]),
        Expr::int(4),
    );
    assert_eq!(
        pulled.simplify(),
        Expr::Prod(vec![Expr::frac(3, 2), sqrt2()])
    );
}

#[test]
fn division_identities() {
    let x = Expr::var("x");
    assert_eq!(Expr::div(Expr::int(0), x.clone()).simplify(), Expr::int(0));
    assert_eq!(Expr::div(x.clone(), Expr::int(1)).simplify(), x.clone());
    assert_eq!(Expr::div(x.clone(), x.clone()).simplify(), Expr::int(1));
    assert_eq!(
        Expr::div(Expr::int(3), Expr::int(6)).simplify(),
        Expr::frac(1, 2)
    );
}

#[test]
fn same_index_roots_divide_under_the_radical() {
    let six = Expr::sqrt(Expr::int(6));
    assert_eq!(
        Expr::div(six, sqrt2()).simplify(),
        Expr::sqrt(Expr::int(3))
    );
}

#[test]
fn sums_distribute_over_rational_denominators() {
    let sum = Expr::Sum(vec![
        Expr::Prod(vec![Expr::int(2), Expr::var("x")]),
        Expr::int(4),
    ]);
    assert_eq!(
        Expr::div(sum, Expr::int(2)).simplify(),
        Expr::Sum(vec![Expr::var("x"), Expr::int(2)])
    );
}

#[test]
fn counting_operators_evaluate_exactly() {
    assert_eq!(
        Expr::Perm(Expr::int(5).boxed(), Expr::int(2).boxed()).simplify(),
        Expr::int(20)
    );
    assert_eq!(
        Expr::Comb(Expr::int(5).boxed(), Expr::int(2).boxed()).simplify(),
        Expr::int(10)
    );
    // out-of-range arguments stay symbolic
    let big = Expr::Perm(Expr::int(2000).boxed(), Expr::int(2).boxed());
    assert_eq!(big.simplify(), big);
}

#[test]
fn simplify_is_idempotent() {
    let x = Expr::var("x");
    let cases = vec![
        Expr::sqrt(Expr::int(72)),
        Expr::Sum(vec![
            Expr::Prod(vec![Expr::int(3), sqrt2()]),
            Expr::Prod(vec![Expr::int(5), sqrt2()]),
        ]),
        Expr::div(Expr::Prod(vec![Expr::int(6), x.clone()]), Expr::int(4)),
        Expr::div(Expr::Prod(vec![Expr::int(6), sqrt2()]), Expr::int(4)),
        Expr::trig(TrigFn::Sin, Expr::div(Expr::Const(ConstKind::Pi), Expr::int(4))),
        Expr::trig(TrigFn::Sin, Expr::int(2)),
        Expr::pow(Expr::var("x"), Expr::int(5)),
        Expr::Sum(vec![x.clone(), Expr::int(1), x.negate()]),
        Expr::div(Expr::int(1), Expr::int(0)),
        Expr::trig(TrigFn::Asin, Expr::int(-1)),
    ];
    for case in cases {
        let once = case.simplify();
        let twice = once.simplify();
        assert_eq!(once, twice, "not idempotent for {case:?}");
    }
}
