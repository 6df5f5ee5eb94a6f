//! Number display helpers shared by the LaTeX and plain-text backends.
//!
//! Rounding itself happens before serialization; these helpers only decide
//! how an already rounded value is spelled (zero padding, scientific form)
//! and how tightly a node binds when a backend decides on parentheses.

use crate::{Expr, Number, Operator};

/// How far numeric leaves are padded with trailing zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    /// Exactly this many digits after the decimal point.
    Decimals(usize),
    /// This many significant digits.
    Digits(usize),
}

/// Display-only number settings produced by the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumberStyle {
    pub padding: Option<Padding>,
}

/// Magnitudes at or above this switch to scientific form.
pub const SCI_UPPER: f64 = 1e21;
/// Nonzero magnitudes below this switch to scientific form.
pub const SCI_LOWER: f64 = 1e-6;

/// Spelling of a finite real: sign, digits and an optional power of ten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealText {
    pub negative: bool,
    pub mantissa: String,
    pub exponent: Option<i32>,
}

/// Spell a finite float. `-0.0` spells as `0`.
pub fn real_text(value: f64, padding: Option<Padding>) -> RealText {
    let negative = value < 0.0;
    let abs = value.abs();
    if abs != 0.0 && !(SCI_LOWER..SCI_UPPER).contains(&abs) {
        let formatted = match padding {
            Some(Padding::Digits(n)) if n > 0 => format!("{:.*e}", n - 1, abs),
            _ => format!("{:e}", abs),
        };
        let (mantissa, exponent) = match formatted.split_once('e') {
            Some((m, e)) => (m.to_string(), e.parse::<i32>().ok()),
            None => (formatted.clone(), None),
        };
        return RealText {
            negative,
            mantissa,
            exponent,
        };
    }
    let mantissa = match padding {
        Some(Padding::Decimals(d)) => format!("{:.*}", d, abs),
        Some(Padding::Digits(n)) => {
            let magnitude = if abs == 0.0 {
                0
            } else {
                abs.log10().floor() as i32
            };
            let decimals = n as i32 - 1 - magnitude;
            if decimals > 0 {
                format!("{:.*}", decimals as usize, abs)
            } else {
                format!("{}", abs)
            }
        }
        None => format!("{}", abs),
    };
    RealText {
        negative,
        mantissa,
        exponent: None,
    }
}

/// Spell an integer, padding with a fractional part when asked to.
pub fn int_text(value: i64, padding: Option<Padding>) -> RealText {
    let digits = value.unsigned_abs().to_string();
    let mantissa = match padding {
        Some(Padding::Decimals(d)) if d > 0 => format!("{}.{}", digits, "0".repeat(d)),
        Some(Padding::Digits(n)) if n > digits.len() && value != 0 => {
            format!("{}.{}", digits, "0".repeat(n - digits.len()))
        }
        Some(Padding::Digits(n)) if value == 0 && n > 1 => format!("0.{}", "0".repeat(n - 1)),
        _ => digits,
    };
    RealText {
        negative: value < 0,
        mantissa,
        exponent: None,
    }
}

pub const PREC_CONNECTIVE: u8 = 1;
pub const PREC_OR: u8 = 2;
pub const PREC_AND: u8 = 3;
pub const PREC_NOT: u8 = 4;
pub const PREC_RELATION: u8 = 5;
pub const PREC_SUM: u8 = 6;
pub const PREC_NEGATE: u8 = 7;
pub const PREC_PRODUCT: u8 = 8;
pub const PREC_POWER: u8 = 9;
pub const PREC_ATOM: u8 = 10;

/// Binding strength of a node as written in infix notation.
pub fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Number(n) => number_precedence(n),
        Expr::Apply(apply) => match apply.op {
            Operator::Implies
            | Operator::ImpliedBy
            | Operator::Iff
            | Operator::RightArrow
            | Operator::LeftArrow
            | Operator::LeftRightArrow => PREC_CONNECTIVE,
            Operator::Or => PREC_OR,
            Operator::And => PREC_AND,
            Operator::Not => PREC_NOT,
            Operator::Less
            | Operator::LessEqual
            | Operator::Greater
            | Operator::GreaterEqual
            | Operator::Equal
            | Operator::NotEqual
            | Operator::Perp
            | Operator::Parallel => PREC_RELATION,
            Operator::Add => PREC_SUM,
            Operator::Negate => PREC_NEGATE,
            Operator::Multiply | Operator::Divide | Operator::Integral | Operator::Unit => {
                PREC_PRODUCT
            }
            Operator::Power => PREC_POWER,
            Operator::Apply
            | Operator::Subscript
            | Operator::Prime
            | Operator::Vec
            | Operator::Overline
            | Operator::LineSegment => PREC_ATOM,
        },
        Expr::Symbol(_) | Expr::Aggregate(_) | Expr::Blank => PREC_ATOM,
    }
}

fn number_precedence(n: &Number) -> u8 {
    match n {
        Number::Int(v) if *v < 0 => PREC_NEGATE,
        Number::Int(_) => PREC_ATOM,
        Number::Float(v) if *v < 0.0 => PREC_NEGATE,
        Number::Float(v) if v.is_finite() && v.abs() >= SCI_UPPER => PREC_PRODUCT,
        Number::Float(v) if *v != 0.0 && v.abs() < SCI_LOWER => PREC_PRODUCT,
        Number::Float(_) => PREC_ATOM,
        Number::Complex { re, .. } if *re != 0.0 => PREC_SUM,
        Number::Complex { im, .. } if *im < 0.0 => PREC_NEGATE,
        Number::Complex { im, .. } if *im == 1.0 => PREC_ATOM,
        Number::Complex { .. } => PREC_PRODUCT,
    }
}

/// For a term written with a leading minus sign, the term without it.
///
/// Sums use this to print `a - b` instead of `a + -b`.
pub fn negated_term(expr: &Expr) -> Option<Expr> {
    match expr {
        Expr::Number(Number::Int(v)) if *v < 0 => v.checked_neg().map(Expr::int),
        Expr::Number(Number::Float(v)) if *v < 0.0 => Some(Expr::float(-v)),
        Expr::Apply(apply) => match apply.op {
            Operator::Negate if apply.args.len() == 1 => Some(apply.args[0].clone()),
            Operator::Multiply if apply.args.len() > 1 => {
                let first = apply.args[0].as_number()?;
                if !first.is_negative() || first.is_zero() {
                    return None;
                }
                let rest = &apply.args[1..];
                if first == &Number::Int(-1) || first == &Number::Float(-1.0) {
                    return Some(if rest.len() == 1 {
                        rest[0].clone()
                    } else {
                        Expr::mul(rest.to_vec())
                    });
                }
                let mut factors = Vec::with_capacity(apply.args.len());
                factors.push(negated_term(&apply.args[0])?);
                factors.extend(rest.iter().cloned());
                Some(Expr::mul(factors))
            }
            Operator::Divide if apply.args.len() == 2 => {
                let num = negated_term(&apply.args[0])?;
                Some(Expr::div(num, apply.args[1].clone()))
            }
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_zero_spells_as_zero() {
        let text = real_text(-0.0, None);
        assert!(!text.negative);
        assert_eq!(text.mantissa, "0");
    }

    #[test]
    fn large_and_small_values_use_powers_of_ten() {
        let big = real_text(1.5e25, None);
        assert_eq!(big.mantissa, "1.5");
        assert_eq!(big.exponent, Some(25));
        let small = real_text(2e-7, None);
        assert_eq!(small.mantissa, "2");
        assert_eq!(small.exponent, Some(-7));
        assert_eq!(real_text(2000.0, None).mantissa, "2000");
    }

    #[test]
    fn padding() {
        assert_eq!(real_text(1.5, Some(Padding::Decimals(3))).mantissa, "1.500");
        assert_eq!(real_text(1.5, Some(Padding::Digits(4))).mantissa, "1.500");
        assert_eq!(real_text(120.0, Some(Padding::Digits(2))).mantissa, "120");
        assert_eq!(int_text(7, Some(Padding::Decimals(2))).mantissa, "7.00");
        assert_eq!(int_text(12, Some(Padding::Digits(4))).mantissa, "12.00");
        assert_eq!(int_text(-3, None).mantissa, "3");
    }
}

#[cfg(test)]
mod layout_tests {
    use super::*;

    #[test]
    fn negated_terms() {
        let x = Expr::symbol("x");
        assert_eq!(
            negated_term(&Expr::mul(vec![Expr::int(-1), x.clone()])),
            Some(x.clone())
        );
        assert_eq!(
            negated_term(&Expr::mul(vec![Expr::int(-2), x.clone()])),
            Some(Expr::mul(vec![Expr::int(2), x.clone()]))
        );
        assert_eq!(negated_term(&Expr::int(-12)), Some(Expr::int(12)));
        assert_eq!(negated_term(&x), None);
        assert_eq!(negated_term(&Expr::float(-0.0)), None);
    }

    #[test]
    fn precedence_of_numbers() {
        assert_eq!(precedence(&Expr::int(-1)), PREC_NEGATE);
        assert_eq!(precedence(&Expr::float(1e30)), PREC_PRODUCT);
        assert_eq!(
            precedence(&Expr::number(Number::Complex { re: 1.0, im: 2.0 })),
            PREC_SUM
        );
    }
}
