//! Expression tree model shared by the parsers, rewriting passes and backends.
//!
//! Every value here is immutable in spirit: passes borrow a tree and build a
//! new one. Display settings (rounding, padding, blanks) are deliberately not
//! part of [`Expr`]; they travel next to a tree as a separate record.

pub mod display;
pub mod names;

use serde::{Deserialize, Serialize};

/// A numeric leaf.
///
/// Equality is bitwise for floats, so `+0.0` and `-0.0` are different leaves
/// while two NaNs compare equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Number {
    Int(i64),
    Float(#[serde(with = "float_repr")] f64),
    Complex {
        #[serde(with = "float_repr")]
        re: f64,
        #[serde(with = "float_repr")]
        im: f64,
    },
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => same_float(*a, *b),
            (Number::Complex { re: ar, im: ai }, Number::Complex { re: br, im: bi }) => {
                same_float(*ar, *br) && same_float(*ai, *bi)
            }
            _ => false,
        }
    }
}

fn same_float(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
}

/// Largest magnitude at which every integer is exactly representable as f64.
const EXACT_F64_INT: f64 = 9_007_199_254_740_992.0;

impl Number {
    /// Build a complex number, collapsing to a real leaf when the imaginary
    /// part is zero. Integral real parts collapse to `Int`.
    pub fn complex(re: f64, im: f64) -> Self {
        if im == 0.0 {
            if re.fract() == 0.0 && re.abs() < EXACT_F64_INT && !(re == 0.0 && re.is_sign_negative())
            {
                Number::Int(re as i64)
            } else {
                Number::Float(re)
            }
        } else {
            Number::Complex { re, im }
        }
    }

    /// Real part as f64 (ignores the imaginary part).
    pub fn re(&self) -> f64 {
        match self {
            Number::Int(v) => *v as f64,
            Number::Float(v) => *v,
            Number::Complex { re, .. } => *re,
        }
    }

    /// Imaginary part; zero for real leaves.
    pub fn im(&self) -> f64 {
        match self {
            Number::Complex { im, .. } => *im,
            _ => 0.0,
        }
    }

    /// Real value, `None` for complex leaves.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Number::Int(v) => Some(*v as f64),
            Number::Float(v) => Some(*v),
            Number::Complex { .. } => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Number::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Int(v) => *v == 0,
            Number::Float(v) => *v == 0.0,
            Number::Complex { re, im } => *re == 0.0 && *im == 0.0,
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            Number::Int(v) => *v == 1,
            Number::Float(v) => *v == 1.0,
            Number::Complex { .. } => false,
        }
    }

    /// True for negative reals, including `-0.0` and `-inf`.
    pub fn is_negative(&self) -> bool {
        match self {
            Number::Int(v) => *v < 0,
            Number::Float(v) => !v.is_nan() && v.is_sign_negative(),
            Number::Complex { .. } => false,
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Number::Complex { .. })
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Number::Int(_) => true,
            Number::Float(v) => v.is_finite(),
            Number::Complex { re, im } => re.is_finite() && im.is_finite(),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/// Floats go over the wire as JSON numbers when finite and as the strings
/// `"Infinity"`, `"-Infinity"` and `"NaN"` otherwise, so structured trees
/// survive a JSON round trip.
mod float_repr {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if *value > 0.0 {
            serializer.serialize_str("Infinity")
        } else {
            serializer.serialize_str("-Infinity")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Num(v) => Ok(v),
            Repr::Text(text) => match text.as_str() {
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                "NaN" => Ok(f64::NAN),
                other => Err(serde::de::Error::custom(format!(
                    "invalid float literal '{}'",
                    other
                ))),
            },
        }
    }
}

/// Operator tags of [`Apply`] nodes. The serde names are the structured-tree
/// tags seen by programmatic consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "-")]
    Negate,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "^")]
    Power,
    /// Function application: `args[0]` is the function, the rest are its arguments.
    #[serde(rename = "apply")]
    Apply,
    #[serde(rename = "_")]
    Subscript,
    #[serde(rename = "prime")]
    Prime,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "le")]
    LessEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "ge")]
    GreaterEqual,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "ne")]
    NotEqual,
    #[serde(rename = "not")]
    Not,
    #[serde(rename = "and")]
    And,
    #[serde(rename = "or")]
    Or,
    #[serde(rename = "implies")]
    Implies,
    #[serde(rename = "impliedby")]
    ImpliedBy,
    #[serde(rename = "iff")]
    Iff,
    #[serde(rename = "rightarrow")]
    RightArrow,
    #[serde(rename = "leftarrow")]
    LeftArrow,
    #[serde(rename = "leftrightarrow")]
    LeftRightArrow,
    #[serde(rename = "vec")]
    Vec,
    #[serde(rename = "perp")]
    Perp,
    #[serde(rename = "parallel")]
    Parallel,
    #[serde(rename = "linesegment")]
    LineSegment,
    #[serde(rename = "overline")]
    Overline,
    /// Integral pass-through: integrand, variable, lower bound, upper bound.
    #[serde(rename = "int")]
    Integral,
    /// Unit attachment: `[unit, magnitude]` for prefix units such as `$`,
    /// `[magnitude, unit]` for suffix units such as `%` and `deg`.
    #[serde(rename = "unit")]
    Unit,
}

impl Operator {
    pub fn is_relation(self) -> bool {
        matches!(
            self,
            Operator::Less
                | Operator::LessEqual
                | Operator::Greater
                | Operator::GreaterEqual
                | Operator::Equal
                | Operator::NotEqual
        )
    }

    pub fn is_connective(self) -> bool {
        matches!(
            self,
            Operator::Implies
                | Operator::ImpliedBy
                | Operator::Iff
                | Operator::RightArrow
                | Operator::LeftArrow
                | Operator::LeftRightArrow
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Apply {
    pub op: Operator,
    pub args: Vec<Expr>,
    /// `None` means "inherit from the enclosing configuration".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unordered: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateKind {
    Tuple,
    List,
    Set,
    Array,
    Interval { left_closed: bool, right_closed: bool },
    Vector,
    AltVector,
    /// Row-major entries, `rows * cols` of them.
    Matrix { rows: usize, cols: usize },
}

impl AggregateKind {
    /// Tuples, vectors and angle-bracket vectors interoperate in arithmetic.
    pub fn is_vector_like(self) -> bool {
        matches!(
            self,
            AggregateKind::Tuple | AggregateKind::Vector | AggregateKind::AltVector
        )
    }
}

/// A composite value. The number of entries is fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AggregateRepr", into = "AggregateRepr")]
pub struct Aggregate {
    kind: AggregateKind,
    entries: Vec<Expr>,
    unordered: Option<bool>,
}

#[derive(Serialize, Deserialize)]
struct AggregateRepr {
    kind: AggregateKind,
    entries: Vec<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unordered: Option<bool>,
}

impl TryFrom<AggregateRepr> for Aggregate {
    type Error = String;

    /// Matrices must carry exactly `rows * cols` entries.
    fn try_from(repr: AggregateRepr) -> Result<Self, Self::Error> {
        if let AggregateKind::Matrix { rows, cols } = repr.kind {
            if rows.checked_mul(cols) != Some(repr.entries.len()) {
                return Err(format!(
                    "matrix of {} x {} cannot hold {} entries",
                    rows,
                    cols,
                    repr.entries.len()
                ));
            }
        }
        Ok(Aggregate::new(repr.kind, repr.entries).with_unordered(repr.unordered))
    }
}

impl From<Aggregate> for AggregateRepr {
    fn from(agg: Aggregate) -> Self {
        AggregateRepr {
            kind: agg.kind,
            entries: agg.entries,
            unordered: agg.unordered,
        }
    }
}

impl Aggregate {
    /// Build an aggregate. Malformed shapes are repaired rather than
    /// rejected: an interval without exactly two entries becomes a tuple and
    /// a matrix is truncated or padded with [`Expr::Blank`] to `rows * cols`.
    /// A shape whose size overflows becomes an array of the given entries.
    pub fn new(kind: AggregateKind, mut entries: Vec<Expr>) -> Self {
        let kind = match kind {
            AggregateKind::Interval { .. } if entries.len() != 2 => AggregateKind::Tuple,
            AggregateKind::Matrix { rows, cols } => match rows.checked_mul(cols) {
                Some(len) => {
                    entries.resize(len, Expr::Blank);
                    kind
                }
                None => AggregateKind::Array,
            },
            other => other,
        };
        Self {
            kind,
            entries,
            unordered: None,
        }
    }

    /// Build a matrix from rows, padding short rows with blanks.
    pub fn matrix(rows: Vec<Vec<Expr>>) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        let row_count = rows.len();
        let mut entries = Vec::with_capacity(row_count * cols);
        for mut row in rows {
            row.resize(cols, Expr::Blank);
            entries.extend(row);
        }
        Self::new(
            AggregateKind::Matrix {
                rows: row_count,
                cols,
            },
            entries,
        )
    }

    pub fn with_unordered(mut self, unordered: Option<bool>) -> Self {
        self.unordered = unordered;
        self
    }

    /// Same kind and flags, new entries. The kind is re-validated.
    pub fn with_entries(&self, entries: Vec<Expr>) -> Self {
        Aggregate::new(self.kind, entries).with_unordered(self.unordered)
    }

    pub fn kind(&self) -> AggregateKind {
        self.kind
    }

    pub fn entries(&self) -> &[Expr] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Expr> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unordered(&self) -> Option<bool> {
        self.unordered
    }

    /// `(rows, cols)` for matrices.
    pub fn shape(&self) -> Option<(usize, usize)> {
        match self.kind {
            AggregateKind::Matrix { rows, cols } => Some((rows, cols)),
            _ => None,
        }
    }

    /// Row `i` of a matrix (empty for other kinds or out of range).
    pub fn row(&self, i: usize) -> &[Expr] {
        match self.kind {
            AggregateKind::Matrix { rows, cols } if i < rows => {
                &self.entries[i * cols..(i + 1) * cols]
            }
            _ => &[],
        }
    }

    fn compares_unordered(&self) -> bool {
        self.unordered == Some(true) || self.kind == AggregateKind::Set
    }
}

/// How [`Expr::equals`] treats nodes flagged `unordered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EqualityMode {
    /// Plain recursive comparison, operand order always matters.
    #[default]
    Structural,
    /// Immediate operands of flagged nodes (and of sets) compare as a multiset.
    RespectUnordered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expr {
    Number(Number),
    Symbol(String),
    Apply(Apply),
    Aggregate(Aggregate),
    /// An unparseable or omitted slot.
    Blank,
}

impl Expr {
    pub fn int(value: i64) -> Self {
        Expr::Number(Number::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Expr::Number(Number::Float(value))
    }

    pub fn number(value: Number) -> Self {
        Expr::Number(value)
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    pub fn apply(op: Operator, args: Vec<Expr>) -> Self {
        Expr::Apply(Apply {
            op,
            args,
            unordered: None,
        })
    }

    pub fn add(terms: Vec<Expr>) -> Self {
        Self::apply(Operator::Add, terms)
    }

    pub fn mul(factors: Vec<Expr>) -> Self {
        Self::apply(Operator::Multiply, factors)
    }

    pub fn neg(inner: Expr) -> Self {
        Self::apply(Operator::Negate, vec![inner])
    }

    pub fn div(num: Expr, den: Expr) -> Self {
        Self::apply(Operator::Divide, vec![num, den])
    }

    pub fn pow(base: Expr, exp: Expr) -> Self {
        Self::apply(Operator::Power, vec![base, exp])
    }

    /// Function application of `function` to `args`.
    pub fn call(function: Expr, args: Vec<Expr>) -> Self {
        let mut all = Vec::with_capacity(args.len() + 1);
        all.push(function);
        all.extend(args);
        Self::apply(Operator::Apply, all)
    }

    pub fn func(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::call(Expr::symbol(name), args)
    }

    pub fn aggregate(kind: AggregateKind, entries: Vec<Expr>) -> Self {
        Expr::Aggregate(Aggregate::new(kind, entries))
    }

    pub fn tuple(entries: Vec<Expr>) -> Self {
        Self::aggregate(AggregateKind::Tuple, entries)
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Expr::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expr::Symbol(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_apply(&self) -> Option<&Apply> {
        match self {
            Expr::Apply(apply) => Some(apply),
            _ => None,
        }
    }

    /// Operands if this node applies `op`.
    pub fn as_op(&self, op: Operator) -> Option<&[Expr]> {
        match self {
            Expr::Apply(apply) if apply.op == op => Some(&apply.args),
            _ => None,
        }
    }

    pub fn as_aggregate(&self) -> Option<&Aggregate> {
        match self {
            Expr::Aggregate(agg) => Some(agg),
            _ => None,
        }
    }

    /// Name of the applied function when the callee is a plain symbol.
    pub fn function_name(&self) -> Option<&str> {
        self.as_op(Operator::Apply)
            .and_then(|args| args.first())
            .and_then(Expr::as_symbol)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Expr::Number(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Expr::Blank)
    }

    pub fn is_zero(&self) -> bool {
        self.as_number().is_some_and(Number::is_zero)
    }

    pub fn is_one(&self) -> bool {
        self.as_number().is_some_and(Number::is_one)
    }

    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Expr::node_count).sum::<usize>()
    }

    pub fn children(&self) -> &[Expr] {
        match self {
            Expr::Apply(apply) => &apply.args,
            Expr::Aggregate(agg) => agg.entries(),
            _ => &[],
        }
    }

    pub fn contains_blank(&self) -> bool {
        self.is_blank() || self.children().iter().any(Expr::contains_blank)
    }

    /// Rebuild this node with every child mapped through `f`, keeping the
    /// operator, aggregate kind and `unordered` flag.
    pub fn map_children(&self, mut f: impl FnMut(&Expr) -> Expr) -> Expr {
        match self {
            Expr::Apply(apply) => Expr::Apply(Apply {
                op: apply.op,
                args: apply.args.iter().map(&mut f).collect(),
                unordered: apply.unordered,
            }),
            Expr::Aggregate(agg) => {
                Expr::Aggregate(agg.with_entries(agg.entries().iter().map(&mut f).collect()))
            }
            other => other.clone(),
        }
    }

    /// Equality under `mode`. With [`EqualityMode::RespectUnordered`] the
    /// immediate operands of a flagged node compare as a multiset; their own
    /// children follow their own flags.
    pub fn equals(&self, other: &Expr, mode: EqualityMode) -> bool {
        if mode == EqualityMode::Structural {
            return self == other;
        }
        match (self, other) {
            (Expr::Apply(a), Expr::Apply(b)) => {
                if a.op != b.op || a.args.len() != b.args.len() {
                    return false;
                }
                let unordered = a.unordered == Some(true) || b.unordered == Some(true);
                match (a.op, a.args.split_first(), b.args.split_first()) {
                    // The callee never permutes with its arguments.
                    (Operator::Apply, Some((f, a_rest)), Some((g, b_rest))) => {
                        f.equals(g, mode) && operands_equal(a_rest, b_rest, unordered, mode)
                    }
                    _ => operands_equal(&a.args, &b.args, unordered, mode),
                }
            }
            (Expr::Aggregate(a), Expr::Aggregate(b)) => {
                a.kind == b.kind
                    && operands_equal(
                        &a.entries,
                        &b.entries,
                        a.compares_unordered() || b.compares_unordered(),
                        mode,
                    )
            }
            _ => self == other,
        }
    }
}

fn operands_equal(left: &[Expr], right: &[Expr], unordered: bool, mode: EqualityMode) -> bool {
    if left.len() != right.len() {
        return false;
    }
    if !unordered {
        return left.iter().zip(right).all(|(l, r)| l.equals(r, mode));
    }
    let mut used = vec![false; right.len()];
    for l in left {
        let found = right
            .iter()
            .enumerate()
            .find(|(i, r)| !used[*i] && l.equals(r, mode))
            .map(|(i, _)| i);
        match found {
            Some(i) => used[i] = true,
            None => return false,
        }
    }
    true
}

impl From<Number> for Expr {
    fn from(value: Number) -> Self {
        Expr::Number(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_zero_leaves_differ() {
        assert_ne!(Expr::float(0.0), Expr::float(-0.0));
        assert_eq!(Expr::float(f64::NAN), Expr::float(f64::NAN));
        assert_ne!(Expr::int(0), Expr::neg(Expr::int(0)));
    }

    #[test]
    fn complex_collapses_to_real() {
        assert_eq!(Number::complex(-1.0, 0.0), Number::Int(-1));
        assert_eq!(Number::complex(0.5, 0.0), Number::Float(0.5));
        assert_eq!(Number::complex(-0.0, 0.0), Number::Float(-0.0));
        assert!(Number::complex(0.0, 1.0).is_complex());
    }

    #[test]
    fn interval_with_wrong_arity_becomes_tuple() {
        let agg = Aggregate::new(
            AggregateKind::Interval {
                left_closed: true,
                right_closed: false,
            },
            vec![Expr::int(1), Expr::int(2), Expr::int(3)],
        );
        assert_eq!(agg.kind(), AggregateKind::Tuple);
        assert_eq!(agg.len(), 3);
    }

    #[test]
    fn overflowing_matrix_shape_becomes_array() {
        let agg = Aggregate::new(
            AggregateKind::Matrix {
                rows: usize::MAX,
                cols: 2,
            },
            vec![Expr::int(1)],
        );
        assert_eq!(agg.kind(), AggregateKind::Array);
        assert_eq!(agg.len(), 1);
    }

    #[test]
    fn empty_calls_compare_without_panicking() {
        let empty = Expr::apply(Operator::Apply, vec![]);
        assert!(empty.equals(&empty, EqualityMode::RespectUnordered));
        let call = Expr::func("f", vec![Expr::symbol("x")]);
        assert!(!empty.equals(&call, EqualityMode::RespectUnordered));
    }

    #[test]
    fn ragged_matrix_is_padded() {
        let agg = Aggregate::matrix(vec![
            vec![Expr::int(1), Expr::int(2)],
            vec![Expr::int(3)],
        ]);
        assert_eq!(agg.shape(), Some((2, 2)));
        assert_eq!(agg.row(1), &[Expr::int(3), Expr::Blank]);
    }

    #[test]
    fn unordered_equality_is_shallow() {
        let x = Expr::symbol("x");
        let y = Expr::symbol("y");
        let a = Expr::Apply(Apply {
            op: Operator::Add,
            args: vec![x.clone(), Expr::mul(vec![x.clone(), y.clone()])],
            unordered: Some(true),
        });
        let b = Expr::Apply(Apply {
            op: Operator::Add,
            args: vec![Expr::mul(vec![x.clone(), y.clone()]), x.clone()],
            unordered: Some(true),
        });
        assert!(a.equals(&b, EqualityMode::RespectUnordered));
        assert!(!a.equals(&b, EqualityMode::Structural));

        // The inner product is not flagged, so its factors still must line up.
        let c = Expr::Apply(Apply {
            op: Operator::Add,
            args: vec![Expr::mul(vec![y, x.clone()]), x],
            unordered: Some(true),
        });
        assert!(!a.equals(&c, EqualityMode::RespectUnordered));
    }

    #[test]
    fn sets_compare_unordered() {
        let a = Expr::aggregate(AggregateKind::Set, vec![Expr::int(1), Expr::int(2)]);
        let b = Expr::aggregate(AggregateKind::Set, vec![Expr::int(2), Expr::int(1)]);
        assert!(a.equals(&b, EqualityMode::RespectUnordered));
    }

    #[test]
    fn node_count_counts_every_node() {
        let e = Expr::add(vec![Expr::int(1), Expr::mul(vec![Expr::int(2), Expr::symbol("x")])]);
        assert_eq!(e.node_count(), 5);
    }
}
