//! Display formatting: rounding and small-value suppression.
//!
//! The formatter turns a processed tree into a display tree. It never changes
//! the processed tree itself; padding is only recorded in the returned style
//! and applied by the serializers.

use mathex_ir::display::{NumberStyle, Padding};
use mathex_ir::{Expr, Number, Operator};

use crate::core::evaluate::{evaluate, to_number, Bindings};

/// Resolved display settings of one expression.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayContext {
    /// Decimals or significant digits to round to.
    pub rounding: Option<Padding>,
    pub pad_zeros: bool,
    /// Magnitudes below this display as zero.
    pub small_as_zero: Option<f64>,
    pub display_blanks: bool,
}

impl DisplayContext {
    pub fn number_style(&self) -> NumberStyle {
        NumberStyle {
            padding: self.rounding.filter(|_| self.pad_zeros),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Formatted {
    pub tree: Expr,
    /// Value of the display tree when it is a constant.
    pub value: Option<Number>,
    pub style: NumberStyle,
}

pub fn format(tree: &Expr, ctx: &DisplayContext) -> Formatted {
    let display = round_tree(tree, ctx);
    let value = evaluate(&display, &Bindings::default()).map(to_number);
    Formatted {
        tree: display,
        value,
        style: ctx.number_style(),
    }
}

fn round_tree(expr: &Expr, ctx: &DisplayContext) -> Expr {
    match expr {
        Expr::Number(n) => Expr::Number(round_number(n, ctx)),
        Expr::Apply(apply) if apply.op == Operator::Subscript => expr.clone(),
        other => other.map_children(|child| round_tree(child, ctx)),
    }
}

fn round_number(n: &Number, ctx: &DisplayContext) -> Number {
    match *n {
        Number::Int(v) => match ctx.rounding {
            Some(Padding::Digits(digits)) => Number::Int(round_int_digits(v, digits)),
            _ => Number::Int(v),
        },
        Number::Float(v) => Number::Float(round_real(v, ctx)),
        Number::Complex { re, im } => Number::complex(round_real(re, ctx), round_real(im, ctx)),
    }
}

fn round_real(v: f64, ctx: &DisplayContext) -> f64 {
    if !v.is_finite() {
        return v;
    }
    if ctx.small_as_zero.is_some_and(|t| v.abs() < t) {
        return 0.0;
    }
    let text = match ctx.rounding {
        Some(Padding::Decimals(d)) => format!("{:.*}", d, v),
        Some(Padding::Digits(n)) if n > 0 => format!("{:.*e}", n - 1, v),
        _ => return v,
    };
    text.parse::<f64>().unwrap_or(v)
}

/// `123456` to three significant digits is `123000`, halves away from zero.
fn round_int_digits(v: i64, digits: usize) -> i64 {
    let len = v.unsigned_abs().to_string().len();
    if digits == 0 || len <= digits {
        return v;
    }
    let Some(scale) = u32::try_from(len - digits)
        .ok()
        .and_then(|p| 10i64.checked_pow(p))
    else {
        return v;
    };
    let half = scale / 2 * v.signum();
    v.checked_add(half)
        .map(|shifted| shifted / scale * scale)
        .unwrap_or(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits(n: usize) -> DisplayContext {
        DisplayContext {
            rounding: Some(Padding::Digits(n)),
            ..DisplayContext::default()
        }
    }

    fn decimals(n: usize) -> DisplayContext {
        DisplayContext {
            rounding: Some(Padding::Decimals(n)),
            ..DisplayContext::default()
        }
    }

    fn significant_digits(v: f64) -> usize {
        let text = format!("{:e}", v.abs());
        let mantissa = text.split('e').next().unwrap_or("");
        mantissa.chars().filter(char::is_ascii_digit).count()
    }

    #[test]
    fn digits_bound_significant_figures() {
        for (v, d) in [(3.14159265, 3), (0.000123456, 2), (98765.4321, 4), (1.0 / 3.0, 5)] {
            let rounded = format(&Expr::float(v), &digits(d)).tree;
            let Some(Number::Float(r)) = rounded.as_number().copied() else {
                panic!("expected a float leaf for {}", v);
            };
            assert!(significant_digits(r) <= d, "{} rounded to {}", v, r);
        }
        assert_eq!(format(&Expr::float(3.14159), &digits(3)).tree, Expr::float(3.14));
    }

    #[test]
    fn decimals_round_fractional_part() {
        assert_eq!(format(&Expr::float(1.23456), &decimals(2)).tree, Expr::float(1.23));
        assert_eq!(format(&Expr::int(7), &decimals(2)).tree, Expr::int(7));
    }

    #[test]
    fn integers_round_to_digits() {
        assert_eq!(format(&Expr::int(123456), &digits(3)).tree, Expr::int(123000));
        assert_eq!(format(&Expr::int(-98765), &digits(2)).tree, Expr::int(-99000));
        assert_eq!(format(&Expr::int(42), &digits(3)).tree, Expr::int(42));
    }

    #[test]
    fn small_values_display_as_zero() {
        let ctx = DisplayContext {
            small_as_zero: Some(1e-14),
            ..DisplayContext::default()
        };
        assert_eq!(format(&Expr::float(1e-16), &ctx).tree, Expr::float(0.0));
        let complex = Expr::number(Number::Complex { re: 2.5, im: 1e-17 });
        assert_eq!(format(&complex, &ctx).tree, Expr::float(2.5));
    }

    #[test]
    fn subscripts_are_not_rounded() {
        let e = Expr::apply(Operator::Subscript, vec![Expr::symbol("x"), Expr::float(1.2345)]);
        assert_eq!(format(&e, &digits(2)).tree, e);
    }

    #[test]
    fn padding_is_recorded_only_with_pad_zeros() {
        let mut ctx = decimals(3);
        assert_eq!(format(&Expr::int(1), &ctx).style.padding, None);
        ctx.pad_zeros = true;
        assert_eq!(
            format(&Expr::int(1), &ctx).style.padding,
            Some(Padding::Decimals(3))
        );
    }

    #[test]
    fn constant_trees_have_a_value() {
        let sum = Expr::add(vec![Expr::float(0.5), Expr::int(1)]);
        assert_eq!(format(&sum, &DisplayContext::default()).value, Some(Number::Float(1.5)));
        assert_eq!(format(&Expr::symbol("x"), &DisplayContext::default()).value, None);
    }
}
