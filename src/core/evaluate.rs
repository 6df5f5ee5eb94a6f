//! Numeric evaluation of constant trees.
//!
//! Real operands use real arithmetic, so `1/-0` is `-inf` and `(-8)^(1/3)`
//! has no real value; complex operands go through `num-complex`.

use std::f64::consts::{E, PI};

use fxhash::FxHashMap;
use mathex_ir::{Expr, Number, Operator};
use num_complex::Complex64;

/// Values of free symbols.
pub type Bindings = FxHashMap<String, Complex64>;

fn real(v: f64) -> Complex64 {
    Complex64::new(v, 0.0)
}

fn is_real(c: Complex64) -> bool {
    c.im == 0.0
}

/// The value of `tree`, or `None` when it is not a defined constant.
pub fn evaluate(tree: &Expr, bindings: &Bindings) -> Option<Complex64> {
    let value = eval(tree, bindings)?;
    (!value.re.is_nan() && !value.im.is_nan()).then_some(value)
}

fn eval(expr: &Expr, bindings: &Bindings) -> Option<Complex64> {
    match expr {
        Expr::Number(n) => Some(Complex64::new(n.re(), n.im())),
        Expr::Symbol(name) => bindings.get(name).copied().or_else(|| constant(name)),
        Expr::Apply(apply) => {
            let args = apply.args.as_slice();
            match (apply.op, args) {
                (Operator::Add, terms) => terms
                    .iter()
                    .try_fold(real(0.0), |acc, t| Some(add(acc, eval(t, bindings)?))),
                (Operator::Multiply, factors) => factors
                    .iter()
                    .try_fold(real(1.0), |acc, f| Some(mul(acc, eval(f, bindings)?))),
                (Operator::Negate, [inner]) => eval(inner, bindings).map(|v| -v),
                (Operator::Divide, [num, den]) => {
                    Some(div(eval(num, bindings)?, eval(den, bindings)?))
                }
                (Operator::Power, [base, exp]) => {
                    Some(pow(eval(base, bindings)?, eval(exp, bindings)?))
                }
                (Operator::Apply, [callee, params @ ..]) => {
                    let name = callee.as_symbol()?;
                    let values = params
                        .iter()
                        .map(|p| eval(p, bindings))
                        .collect::<Option<Vec<_>>>()?;
                    builtin(name, &values)
                }
                (Operator::Unit, [Expr::Symbol(unit), magnitude]) if unit == "$" => {
                    eval(magnitude, bindings)
                }
                (Operator::Unit, [magnitude, Expr::Symbol(unit)]) => {
                    let v = eval(magnitude, bindings)?;
                    match unit.as_str() {
                        "deg" => Some(v * (PI / 180.0)),
                        "%" => Some(v / 100.0),
                        _ => None,
                    }
                }
                _ => None,
            }
        }
        Expr::Aggregate(_) | Expr::Blank => None,
    }
}

fn constant(name: &str) -> Option<Complex64> {
    match name {
        "pi" | "π" => Some(real(PI)),
        "e" => Some(real(E)),
        "i" => Some(Complex64::new(0.0, 1.0)),
        _ => None,
    }
}

fn add(a: Complex64, b: Complex64) -> Complex64 {
    if is_real(a) && is_real(b) {
        real(a.re + b.re)
    } else {
        a + b
    }
}

fn mul(a: Complex64, b: Complex64) -> Complex64 {
    if is_real(a) && is_real(b) {
        real(a.re * b.re)
    } else {
        a * b
    }
}

fn div(a: Complex64, b: Complex64) -> Complex64 {
    if is_real(a) && is_real(b) {
        real(a.re / b.re)
    } else {
        a / b
    }
}

fn pow(base: Complex64, exp: Complex64) -> Complex64 {
    if is_real(base) && is_real(exp) {
        let (b, e) = (base.re, exp.re);
        if b >= 0.0 || e.fract() == 0.0 {
            return real(b.powf(e));
        }
    }
    base.powc(exp)
}

/// Real-valued builtin applied to a real argument, complex otherwise.
fn unary(x: Complex64, on_real: fn(f64) -> f64, on_complex: fn(Complex64) -> Complex64) -> Complex64 {
    if is_real(x) {
        real(on_real(x.re))
    } else {
        on_complex(x)
    }
}

fn builtin(name: &str, args: &[Complex64]) -> Option<Complex64> {
    let value = match (name, args) {
        ("sin", [x]) => unary(*x, f64::sin, Complex64::sin),
        ("cos", [x]) => unary(*x, f64::cos, Complex64::cos),
        ("tan", [x]) => unary(*x, f64::tan, Complex64::tan),
        ("sec", [x]) => real(1.0) / unary(*x, f64::cos, Complex64::cos),
        ("csc", [x]) => real(1.0) / unary(*x, f64::sin, Complex64::sin),
        ("cot", [x]) => real(1.0) / unary(*x, f64::tan, Complex64::tan),
        ("asin" | "arcsin", [x]) if is_real(*x) && x.re.abs() <= 1.0 => real(x.re.asin()),
        ("asin" | "arcsin", [x]) => x.asin(),
        ("acos" | "arccos", [x]) if is_real(*x) && x.re.abs() <= 1.0 => real(x.re.acos()),
        ("acos" | "arccos", [x]) => x.acos(),
        ("atan" | "arctan", [x]) => unary(*x, f64::atan, Complex64::atan),
        ("arcsec", [x]) => (real(1.0) / x).acos(),
        ("arccsc", [x]) => (real(1.0) / x).asin(),
        ("arccot", [x]) => (real(1.0) / x).atan(),
        ("sinh", [x]) => unary(*x, f64::sinh, Complex64::sinh),
        ("cosh", [x]) => unary(*x, f64::cosh, Complex64::cosh),
        ("tanh", [x]) => unary(*x, f64::tanh, Complex64::tanh),
        ("sech", [x]) => real(1.0) / unary(*x, f64::cosh, Complex64::cosh),
        ("csch", [x]) => real(1.0) / unary(*x, f64::sinh, Complex64::sinh),
        ("coth", [x]) => real(1.0) / unary(*x, f64::tanh, Complex64::tanh),
        ("exp", [x]) => unary(*x, f64::exp, Complex64::exp),
        ("ln" | "log", [x]) if is_real(*x) && x.re >= 0.0 => real(x.re.ln()),
        ("ln" | "log", [x]) => x.ln(),
        ("log10", [x]) if is_real(*x) && x.re >= 0.0 => real(x.re.log10()),
        ("log10", [x]) => x.log10(),
        ("log", [x, base]) => x.ln() / base.ln(),
        ("sqrt", [x]) if is_real(*x) && x.re >= 0.0 => real(x.re.sqrt()),
        ("sqrt", [x]) => x.sqrt(),
        ("nthroot", [x, n]) if is_real(*x) && is_real(*n) => real(real_root(x.re, n.re)?),
        ("abs", [x]) => real(x.norm()),
        ("sign", [x]) if is_real(*x) => real(if x.re == 0.0 { 0.0 } else { x.re.signum() }),
        ("floor", [x]) if is_real(*x) => real(x.re.floor()),
        ("ceil", [x]) if is_real(*x) => real(x.re.ceil()),
        ("round", [x]) if is_real(*x) => real(x.re.round()),
        ("factorial", [x]) if is_real(*x) => real(factorial(x.re)?),
        ("min", values) if !values.is_empty() && values.iter().all(|v| is_real(*v)) => {
            real(values.iter().map(|v| v.re).fold(f64::INFINITY, f64::min))
        }
        ("max", values) if !values.is_empty() && values.iter().all(|v| is_real(*v)) => {
            real(values.iter().map(|v| v.re).fold(f64::NEG_INFINITY, f64::max))
        }
        ("conj", [x]) => x.conj(),
        ("re", [x]) => real(x.re),
        ("im", [x]) => real(x.im),
        ("arg", [x]) => real(x.arg()),
        _ => return None,
    };
    Some(value)
}

/// Largest `n` whose factorial is finite in `f64`.
const MAX_FINITE_FACTORIAL: f64 = 170.0;

/// `n!` for non-negative integers; overflows to infinity.
fn factorial(n: f64) -> Option<f64> {
    if n < 0.0 || n.fract() != 0.0 {
        return None;
    }
    if n > MAX_FINITE_FACTORIAL {
        return Some(f64::INFINITY);
    }
    Some((1..=n as u64).map(|k| k as f64).product())
}

/// Real `n`-th root; odd roots of negatives are negative.
fn real_root(x: f64, n: f64) -> Option<f64> {
    if n == 0.0 {
        return None;
    }
    if x >= 0.0 {
        return Some(x.powf(1.0 / n));
    }
    let odd = n.fract() == 0.0 && (n as i64) % 2 != 0;
    odd.then(|| -(-x).powf(1.0 / n))
}

/// A complex value as a number leaf; an imaginary part of zero collapses.
pub fn to_number(value: Complex64) -> Number {
    Number::complex(value.re, value.im)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parse::{parse, ParseOptions, Syntax};

    fn value_of(input: &str) -> Option<Complex64> {
        evaluate(
            &parse(input, Syntax::Text, &ParseOptions::default()),
            &Bindings::default(),
        )
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn arithmetic_and_constants() {
        assert_eq!(value_of("1 + 2*3"), Some(real(7.0)));
        assert!(close(value_of("2pi").unwrap().re, 2.0 * PI));
        assert_eq!(value_of("1/(0*(-1))"), Some(real(f64::NEG_INFINITY)));
        assert_eq!(value_of("0/0"), None);
    }

    #[test]
    fn units_convert() {
        assert!(close(value_of("sin(30deg)").unwrap().re, 0.5));
        assert_eq!(value_of("50%"), Some(real(0.5)));
        assert_eq!(value_of("$5"), Some(real(5.0)));
    }

    #[test]
    fn free_symbols_need_bindings() {
        let tree = parse("x^2 + 1", Syntax::Text, &ParseOptions::default());
        assert_eq!(evaluate(&tree, &Bindings::default()), None);
        let mut bindings = Bindings::default();
        bindings.insert("x".to_string(), real(3.0));
        assert_eq!(evaluate(&tree, &bindings), Some(real(10.0)));
    }

    #[test]
    fn factorials_are_bounded() {
        assert_eq!(value_of("5!"), Some(real(120.0)));
        assert_eq!(value_of("0!"), Some(real(1.0)));
        assert_eq!(value_of("171!"), Some(real(f64::INFINITY)));
        assert_eq!(value_of("100000000000!"), Some(real(f64::INFINITY)));
        assert_eq!(value_of("factorial(-3)"), None);
        assert_eq!(value_of("factorial(2.5)"), None);
    }

    #[test]
    fn complex_values() {
        let i_squared = value_of("i^2").unwrap();
        assert!(close(i_squared.re, -1.0) && close(i_squared.im, 0.0));
        let root = value_of("sqrt(-4)").unwrap();
        assert!(close(root.im, 2.0));
        assert_eq!(to_number(real(2.0)), Number::Int(2));
    }
}
