use mathex_ir::display::{NumberStyle, Padding};
use mathex_ir::{AggregateKind, Expr, Number, Operator};
use mathex_latex_backend::{render_latex, LatexRenderOptions, MatrixEnvironment};
use pretty_assertions::assert_eq;

fn latex(expr: &Expr) -> String {
    render_latex(expr, &LatexRenderOptions::default())
}

fn x() -> Expr {
    Expr::symbol("x")
}

#[test]
fn polynomial_uses_minus_for_negative_terms() {
    let expr = Expr::add(vec![
        Expr::mul(vec![Expr::int(2), Expr::pow(x(), Expr::int(2))]),
        Expr::mul(vec![Expr::int(-2), x()]),
        Expr::int(-12),
    ]);
    assert_eq!(latex(&expr), "2 x^{2} - 2 x - 12");
}

#[test]
fn minus_one_coefficient_is_a_sign() {
    assert_eq!(latex(&Expr::mul(vec![Expr::int(-1), x()])), "-x");
    let diff = Expr::add(vec![x(), Expr::mul(vec![Expr::int(-1), Expr::symbol("y")])]);
    assert_eq!(latex(&diff), "x - y");
}

#[test]
fn numbers_next_to_numbers_get_a_dot() {
    assert_eq!(latex(&Expr::mul(vec![Expr::int(2), Expr::int(3)])), "2 \\cdot 3");
    assert_eq!(latex(&Expr::mul(vec![x(), Expr::int(3)])), "x \\cdot 3");
    assert_eq!(
        latex(&Expr::mul(vec![x(), Expr::int(-3)])),
        "x \\left(-3\\right)"
    );
}

#[test]
fn fractions() {
    assert_eq!(latex(&Expr::div(Expr::int(1), x())), "\\frac{1}{x}");
    assert_eq!(latex(&Expr::div(Expr::int(-1), Expr::int(2))), "-\\frac{1}{2}");
}

#[test]
fn signed_zero_and_infinities() {
    assert_eq!(latex(&Expr::neg(Expr::int(0))), "-0");
    assert_eq!(latex(&Expr::float(-0.0)), "0");
    assert_eq!(latex(&Expr::float(f64::NEG_INFINITY)), "-\\infty");
    assert_eq!(latex(&Expr::float(f64::NAN)), "\\mathrm{NaN}");
}

#[test]
fn scientific_floats() {
    assert_eq!(latex(&Expr::float(1.5e25)), "1.5 \\cdot 10^{25}");
    assert_eq!(latex(&Expr::float(2e-7)), "2 \\cdot 10^{-7}");
}

#[test]
fn complex_numbers() {
    let z = |re, im| Expr::number(Number::Complex { re, im });
    assert_eq!(latex(&z(2.0, 3.0)), "2 + 3 i");
    assert_eq!(latex(&z(2.0, -1.0)), "2 - i");
    assert_eq!(latex(&z(0.0, 1.0)), "i");
    assert_eq!(latex(&z(0.0, -2.0)), "-2 i");
}

#[test]
fn powers_parenthesize_compound_bases() {
    assert_eq!(
        latex(&Expr::pow(Expr::int(-2), Expr::int(2))),
        "\\left(-2\\right)^{2}"
    );
    let sum = Expr::add(vec![x(), Expr::int(1)]);
    assert_eq!(latex(&Expr::pow(sum, Expr::int(2))), "\\left(x + 1\\right)^{2}");
}

#[test]
fn functions() {
    assert_eq!(latex(&Expr::func("sin", vec![x()])), "\\sin\\left(x\\right)");
    assert_eq!(latex(&Expr::func("sqrt", vec![x()])), "\\sqrt{x}");
    assert_eq!(
        latex(&Expr::func("nthroot", vec![x(), Expr::int(3)])),
        "\\sqrt[3]{x}"
    );
    assert_eq!(latex(&Expr::func("abs", vec![x()])), "\\left|x\\right|");
    assert_eq!(latex(&Expr::func("f", vec![x()])), "f\\left(x\\right)");
    assert_eq!(
        latex(&Expr::func("sign", vec![x()])),
        "\\operatorname{sign}\\left(x\\right)"
    );
}

#[test]
fn symbols() {
    assert_eq!(latex(&Expr::symbol("alpha")), "\\alpha");
    assert_eq!(latex(&Expr::symbol("x1")), "x_{1}");
    assert_eq!(latex(&Expr::symbol("speed")), "\\mathrm{speed}");
}

#[test]
fn aggregates() {
    let interval = Expr::aggregate(
        AggregateKind::Interval {
            left_closed: false,
            right_closed: true,
        },
        vec![Expr::int(0), Expr::int(1)],
    );
    assert_eq!(latex(&interval), "\\left(0, 1\\right]");

    let set = Expr::aggregate(AggregateKind::Set, vec![Expr::int(1), Expr::int(2)]);
    assert_eq!(latex(&set), "\\left\\{1, 2\\right\\}");

    let alt = Expr::aggregate(AggregateKind::AltVector, vec![Expr::int(1), x()]);
    assert_eq!(latex(&alt), "\\langle 1, x \\rangle");

    let matrix = Expr::Aggregate(mathex_ir::Aggregate::matrix(vec![
        vec![Expr::int(1), Expr::int(2)],
        vec![Expr::int(3), Expr::int(4)],
    ]));
    assert_eq!(
        latex(&matrix),
        "\\begin{bmatrix} 1 & 2 \\\\ 3 & 4 \\end{bmatrix}"
    );
    let options = LatexRenderOptions {
        matrix_environment: MatrixEnvironment::Pmatrix,
        ..LatexRenderOptions::default()
    };
    assert!(render_latex(&matrix, &options).starts_with("\\begin{pmatrix}"));
}

#[test]
fn blanks_are_hidden_unless_requested() {
    let expr = Expr::add(vec![Expr::int(1), Expr::Blank]);
    assert_eq!(latex(&expr), "1 + ");
    let options = LatexRenderOptions {
        display_blanks: true,
        ..LatexRenderOptions::default()
    };
    assert_eq!(render_latex(&expr, &options), "1 + \\_\\_");
}

#[test]
fn padding_skips_exponents() {
    let options = LatexRenderOptions {
        number_style: NumberStyle {
            padding: Some(Padding::Decimals(2)),
        },
        ..LatexRenderOptions::default()
    };
    let expr = Expr::mul(vec![Expr::int(2), Expr::pow(x(), Expr::int(2))]);
    assert_eq!(render_latex(&expr, &options), "2.00 x^{2}");
    assert_eq!(render_latex(&Expr::float(1.5), &options), "1.50");
}

#[test]
fn units_relations_and_logic() {
    let dollars = Expr::apply(Operator::Unit, vec![Expr::symbol("$"), Expr::int(5)]);
    assert_eq!(latex(&dollars), "\\$5");
    let percent = Expr::apply(Operator::Unit, vec![Expr::int(5), Expr::symbol("%")]);
    assert_eq!(latex(&percent), "5\\%");
    let degrees = Expr::apply(Operator::Unit, vec![Expr::int(30), Expr::symbol("deg")]);
    assert_eq!(latex(&degrees), "30^{\\circ}");

    let le = Expr::apply(Operator::LessEqual, vec![x(), Expr::int(1)]);
    assert_eq!(latex(&le), "x \\le 1");
    let both = Expr::apply(Operator::And, vec![le.clone(), Expr::symbol("p")]);
    assert_eq!(latex(&both), "x \\le 1 \\land p");
    let chain = Expr::apply(Operator::Less, vec![le, Expr::int(2)]);
    assert_eq!(latex(&chain), "x \\le 1 < 2");
}

#[test]
fn integrals() {
    let expr = Expr::apply(
        Operator::Integral,
        vec![x(), x(), Expr::int(0), Expr::int(1)],
    );
    assert_eq!(latex(&expr), "\\int_{0}^{1} x \\, dx");
    let indefinite = Expr::apply(
        Operator::Integral,
        vec![x(), x(), Expr::Blank, Expr::Blank],
    );
    assert_eq!(latex(&indefinite), "\\int x \\, dx");
}
