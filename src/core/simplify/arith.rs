//! Numeric values used while folding.
//!
//! Integers and integer quotients stay exact as reduced ratios; floats
//! follow IEEE754, including the sign of zero; complex values go through
//! `num-complex`. A ratio cannot carry a negative zero, so an operation whose
//! exact result is a negative zero produces `Real(-0.0)`.

use mathex_ir::{Expr, Number, Operator};
use num_complex::Complex64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Value {
    /// `num / den`, lowest terms, `den > 0`.
    Ratio(i64, i64),
    Real(f64),
    Complex(Complex64),
}

/// Largest integer exponent folded exactly.
const MAX_EXACT_EXPONENT: i64 = 1024;

fn gcd(a: i64, b: i64) -> u64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Value {
    pub const ZERO: Value = Value::Ratio(0, 1);
    pub const ONE: Value = Value::Ratio(1, 1);

    pub fn int(v: i64) -> Self {
        Value::Ratio(v, 1)
    }

    /// Reduced `num / den`; `None` for a zero denominator or when the
    /// reduced form does not fit.
    pub fn ratio(num: i64, den: i64) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let Ok(g) = i64::try_from(gcd(num, den)) else {
            // Only `i64::MIN` and zero share a divisor of 2^63.
            return Some(if num == 0 { Value::ZERO } else { Value::ONE });
        };
        let (mut num, mut den) = (num / g, den / g);
        if den < 0 {
            num = num.checked_neg()?;
            den = den.checked_neg()?;
        }
        Some(Value::Ratio(num, den))
    }

    /// Integral floats become exact integers.
    pub fn from_f64(v: f64) -> Self {
        if v.fract() == 0.0 && v.abs() < 9.0e15 && !(v == 0.0 && v.is_sign_negative()) {
            Value::int(v as i64)
        } else {
            Value::Real(v)
        }
    }

    pub fn from_expr(expr: &Expr) -> Option<Self> {
        match expr {
            Expr::Number(Number::Int(v)) => Some(Value::int(*v)),
            Expr::Number(Number::Float(v)) => Some(Value::Real(*v)),
            Expr::Number(Number::Complex { re, im }) => {
                Some(Value::Complex(Complex64::new(*re, *im)))
            }
            Expr::Apply(apply) if apply.op == Operator::Divide && apply.args.len() == 2 => {
                match (&apply.args[0], &apply.args[1]) {
                    (Expr::Number(Number::Int(n)), Expr::Number(Number::Int(d))) => {
                        Value::ratio(*n, *d)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    pub fn to_expr(self) -> Expr {
        match self {
            Value::Ratio(n, 1) => Expr::int(n),
            Value::Ratio(n, d) => Expr::div(Expr::int(n), Expr::int(d)),
            Value::Real(v) => Expr::float(v),
            Value::Complex(c) => Expr::number(Number::complex(c.re, c.im)),
        }
    }

    pub fn to_f64(self) -> Option<f64> {
        match self {
            Value::Ratio(n, d) => Some(n as f64 / d as f64),
            Value::Real(v) => Some(v),
            Value::Complex(c) if c.im == 0.0 => Some(c.re),
            Value::Complex(_) => None,
        }
    }

    pub fn to_complex(self) -> Complex64 {
        match self {
            Value::Complex(c) => c,
            other => Complex64::new(other.to_f64().unwrap_or(f64::NAN), 0.0),
        }
    }

    pub fn as_integer(self) -> Option<i64> {
        match self {
            Value::Ratio(n, 1) => Some(n),
            Value::Real(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => Some(v as i64),
            _ => None,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Value::Ratio(n, _) => n == 0,
            Value::Real(v) => v == 0.0,
            Value::Complex(c) => c.re == 0.0 && c.im == 0.0,
        }
    }

    pub fn is_one(self) -> bool {
        match self {
            Value::Ratio(n, d) => n == 1 && d == 1,
            Value::Real(v) => v == 1.0,
            Value::Complex(c) => c.re == 1.0 && c.im == 0.0,
        }
    }

    /// Sign bit of a real value; negative zero counts as negative.
    pub fn is_negative(self) -> bool {
        match self {
            Value::Ratio(n, _) => n < 0,
            Value::Real(v) => !v.is_nan() && v.is_sign_negative(),
            Value::Complex(_) => false,
        }
    }

    pub fn neg(self) -> Value {
        match self {
            Value::Ratio(0, _) => Value::Real(-0.0),
            Value::Ratio(n, d) => match n.checked_neg() {
                Some(n) => Value::Ratio(n, d),
                None => Value::Real(-(n as f64) / d as f64),
            },
            Value::Real(v) => Value::Real(-v),
            Value::Complex(c) => Value::Complex(-c),
        }
    }

    pub fn add(self, other: Value) -> Value {
        match (self, other) {
            (Value::Ratio(a, b), Value::Ratio(c, d)) => {
                let exact = a
                    .checked_mul(d)
                    .zip(c.checked_mul(b))
                    .and_then(|(x, y)| x.checked_add(y))
                    .zip(b.checked_mul(d))
                    .and_then(|(num, den)| Value::ratio(num, den));
                exact.unwrap_or_else(|| self.float_op(other, |x, y| x + y))
            }
            (Value::Complex(_), _) | (_, Value::Complex(_)) => {
                Value::Complex(self.to_complex() + other.to_complex())
            }
            _ => self.float_op(other, |x, y| x + y),
        }
    }

    pub fn mul(self, other: Value) -> Value {
        match (self, other) {
            (Value::Ratio(a, b), Value::Ratio(c, d)) => {
                if a == 0 || c == 0 {
                    // Only the sign survives.
                    return if self.is_negative() != other.is_negative() {
                        Value::Real(-0.0)
                    } else {
                        Value::ZERO
                    };
                }
                a.checked_mul(c)
                    .zip(b.checked_mul(d))
                    .and_then(|(num, den)| Value::ratio(num, den))
                    .unwrap_or_else(|| self.float_op(other, |x, y| x * y))
            }
            (Value::Complex(_), _) | (_, Value::Complex(_)) => {
                Value::Complex(self.to_complex() * other.to_complex())
            }
            _ => self.float_op(other, |x, y| x * y),
        }
    }

    /// Quotient; `None` for `0/0` and other undefined results.
    pub fn div(self, other: Value) -> Option<Value> {
        if self.is_zero() && other.is_zero() {
            return None;
        }
        let result = match (self, other) {
            (Value::Ratio(a, _), Value::Ratio(0, _)) => {
                Value::Real(if a < 0 { f64::NEG_INFINITY } else { f64::INFINITY })
            }
            (Value::Ratio(a, b), Value::Ratio(c, d)) => a
                .checked_mul(d)
                .zip(b.checked_mul(c))
                .and_then(|(num, den)| Value::ratio(num, den))
                .unwrap_or_else(|| self.float_op(other, |x, y| x / y)),
            (Value::Complex(_), _) | (_, Value::Complex(_)) => {
                Value::Complex(self.to_complex() / other.to_complex())
            }
            _ => self.float_op(other, |x, y| x / y),
        };
        result.defined()
    }

    pub fn pow(self, exponent: Value) -> Option<Value> {
        if exponent.is_zero() {
            return Some(Value::ONE);
        }
        if let Some(k) = exponent.as_integer().filter(|k| k.unsigned_abs() <= MAX_EXACT_EXPONENT.unsigned_abs()) {
            return self.powi(k);
        }
        if let (Value::Ratio(n, d), Value::Ratio(1, root)) = (self, exponent) {
            if let Some(exact) = exact_root(n, root).zip(exact_root(d, root)) {
                return Value::ratio(exact.0, exact.1);
            }
        }
        let result = match (self, exponent) {
            (Value::Complex(_), _) | (_, Value::Complex(_)) => {
                Value::Complex(self.to_complex().powc(exponent.to_complex()))
            }
            _ => self.float_op(exponent, f64::powf),
        };
        result.defined()
    }

    fn powi(self, k: i64) -> Option<Value> {
        let mut result = Value::ONE;
        let mut base = self;
        let mut n = k.unsigned_abs();
        while n > 0 {
            if n & 1 == 1 {
                result = result.mul(base);
            }
            n >>= 1;
            if n > 0 {
                base = base.mul(base);
            }
        }
        if k < 0 {
            Value::ONE.div(result)
        } else {
            Some(result)
        }
    }

    pub fn abs(self) -> Value {
        match self {
            Value::Ratio(n, d) => match n.checked_abs() {
                Some(n) => Value::Ratio(n, d),
                None => Value::Real((n as f64).abs() / d as f64),
            },
            Value::Real(v) => Value::Real(v.abs()),
            Value::Complex(c) => Value::from_f64(c.norm()),
        }
    }

    fn float_op(self, other: Value, op: impl Fn(f64, f64) -> f64) -> Value {
        match (self.to_f64(), other.to_f64()) {
            (Some(a), Some(b)) => Value::Real(op(a, b)),
            _ => Value::Real(f64::NAN),
        }
    }

    /// `None` when the result is NaN.
    fn defined(self) -> Option<Value> {
        match self {
            Value::Real(v) if v.is_nan() => None,
            Value::Complex(c) if c.re.is_nan() || c.im.is_nan() => None,
            other => Some(other),
        }
    }
}

/// Exact `root`-th root of a non-negative integer.
fn exact_root(n: i64, root: i64) -> Option<i64> {
    if n < 0 || root < 2 || root > 64 {
        return None;
    }
    let guess = (n as f64).powf(1.0 / root as f64).round() as i64;
    (guess.saturating_sub(1)..=guess.saturating_add(1))
        .find(|g| *g >= 0 && u32::try_from(root).ok().and_then(|r| g.checked_pow(r)) == Some(n))
}

/// Builtins that evaluate without losing exactness: `abs`, perfect-power
/// `sqrt`/`nthroot`, `sign` and small `factorial`.
pub(crate) fn exact_builtin(name: &str, args: &[Expr]) -> Option<Expr> {
    let values: Option<Vec<Value>> = args.iter().map(Value::from_expr).collect();
    let values = values?;
    match (name, values.as_slice()) {
        ("abs", [v]) => Some(v.abs().to_expr()),
        ("sqrt", [Value::Ratio(n, d)]) => {
            let (n, d) = exact_root(*n, 2).zip(exact_root(*d, 2))?;
            Value::ratio(n, d).map(Value::to_expr)
        }
        ("nthroot", [Value::Ratio(n, d), Value::Ratio(k, 1)]) => {
            let (n, d) = exact_root(*n, *k).zip(exact_root(*d, *k))?;
            Value::ratio(n, d).map(Value::to_expr)
        }
        ("sign", [v]) => {
            let x = v.to_f64()?;
            let sign = if x > 0.0 {
                1
            } else if x < 0.0 {
                -1
            } else {
                0
            };
            Some(Expr::int(sign))
        }
        ("factorial", [Value::Ratio(n, 1)]) if (0..=20).contains(n) => {
            Some(Expr::int((1..=*n).product()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_stay_exact() {
        let third = Value::ratio(1, 3).unwrap();
        assert_eq!(third.add(third).add(third), Value::ONE);
        assert_eq!(Value::int(6).div(Value::int(4)), Value::ratio(3, 2));
        assert_eq!(Value::ratio(2, -4), Some(Value::Ratio(-1, 2)));
    }

    #[test]
    fn integer_boundaries_fall_back_to_floats() {
        let min = Value::int(i64::MIN);
        assert_eq!(min.div(Value::int(-1)), Some(Value::Real(9.223372036854775808e18)));
        assert_eq!(min.div(Value::int(2)), Some(Value::int(i64::MIN / 2)));
        assert_eq!(min.div(min), Some(Value::ONE));
        assert_eq!(Value::ratio(0, i64::MIN), Some(Value::ZERO));
        assert_eq!(Value::ratio(3, i64::MIN), None);
        assert_eq!(min.mul(Value::int(-1)), Value::Real(9.223372036854775808e18));
        assert_eq!(min.neg(), Value::Real(9.223372036854775808e18));
        assert!(matches!(min.pow(Value::int(2)), Some(Value::Real(_))));
        assert_eq!(Value::int(2).pow(min), Some(Value::Real(0.0)));
        assert_eq!(min.abs(), Value::Real(9.223372036854775808e18));
    }

    #[test]
    fn zero_signs_follow_ieee() {
        let neg_zero = Value::ZERO.mul(Value::int(-1));
        assert!(neg_zero.is_zero() && neg_zero.is_negative());
        assert_eq!(
            Value::ONE.div(neg_zero),
            Some(Value::Real(f64::NEG_INFINITY))
        );
        assert_eq!(Value::int(-2).div(Value::ZERO), Some(Value::Real(f64::NEG_INFINITY)));
        assert_eq!(Value::ZERO.div(Value::ZERO), None);
        assert_eq!(Value::ZERO.neg(), Value::Real(-0.0));
    }

    #[test]
    fn powers_of_i_are_exact() {
        let i = Value::Complex(Complex64::new(0.0, 1.0));
        assert_eq!(i.pow(Value::int(2)).map(Value::to_expr), Some(Expr::int(-1)));
        assert_eq!(i.pow(Value::int(4)).map(Value::to_expr), Some(Expr::int(1)));
        assert_eq!(
            i.pow(Value::int(3)).map(Value::to_expr),
            Some(Expr::number(Number::Complex { re: -0.0, im: -1.0 }))
        );
    }

    #[test]
    fn roots() {
        assert_eq!(Value::int(9).pow(Value::ratio(1, 2).unwrap()), Some(Value::int(3)));
        assert_eq!(
            exact_builtin("sqrt", &[Expr::int(16)]),
            Some(Expr::int(4))
        );
        assert_eq!(exact_builtin("sqrt", &[Expr::int(2)]), None);
        assert_eq!(
            exact_builtin("abs", &[Expr::int(-7)]),
            Some(Expr::int(7))
        );
        assert_eq!(
            exact_builtin("factorial", &[Expr::int(5)]),
            Some(Expr::int(120))
        );
    }
}
