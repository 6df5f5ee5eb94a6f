//! Entry-wise arithmetic on tuples, vectors, arrays and matrices.
//!
//! These helpers only build the raw result (`Add`/`Multiply` entries); the
//! caller simplifies the entries afterwards.

use mathex_ir::{Aggregate, AggregateKind, Expr};

/// Aggregates that take part in arithmetic. Sets, lists and intervals do not.
pub(super) fn is_evaluable(agg: &Aggregate) -> bool {
    let kind = agg.kind();
    kind.is_vector_like()
        || matches!(kind, AggregateKind::Array | AggregateKind::Matrix { .. })
}

/// `(rows, cols)` for multiplication: vector-likes are columns.
fn matrix_shape(agg: &Aggregate) -> Option<(usize, usize)> {
    match agg.kind() {
        AggregateKind::Matrix { rows, cols } => Some((rows, cols)),
        kind if kind.is_vector_like() => Some((agg.len(), 1)),
        _ => None,
    }
}

/// Entry-wise sum, when the shapes agree.
pub(super) fn add(a: &Aggregate, b: &Aggregate) -> Option<Aggregate> {
    let compatible = match (a.kind(), b.kind()) {
        (ka, kb) if ka.is_vector_like() && kb.is_vector_like() => a.len() == b.len(),
        (AggregateKind::Matrix { .. }, AggregateKind::Matrix { .. }) => a.shape() == b.shape(),
        (AggregateKind::Array, AggregateKind::Array) => a.len() == b.len(),
        _ => false,
    };
    if !compatible {
        return None;
    }
    let entries = a
        .entries()
        .iter()
        .zip(b.entries())
        .map(|(x, y)| Expr::add(vec![x.clone(), y.clone()]))
        .collect();
    Some(a.with_entries(entries))
}

/// Every entry mapped through `f`.
pub(super) fn map_entries(agg: &Aggregate, f: impl FnMut(&Expr) -> Expr) -> Aggregate {
    agg.with_entries(agg.entries().iter().map(f).collect())
}

/// Matrix product. At least one side must be a matrix; vector-likes act as
/// columns.
pub(super) fn matmul(a: &Aggregate, b: &Aggregate) -> Option<Aggregate> {
    if a.shape().is_none() && b.shape().is_none() {
        return None;
    }
    let (rows, inner) = matrix_shape(a)?;
    let (inner_b, cols) = matrix_shape(b)?;
    if inner != inner_b || inner == 0 {
        return None;
    }
    let at = |m: &Aggregate, i: usize, j: usize, width: usize| m.entries()[i * width + j].clone();
    let result = (0..rows)
        .map(|i| {
            (0..cols)
                .map(|j| {
                    let terms: Vec<Expr> = (0..inner)
                        .map(|k| Expr::mul(vec![at(a, i, k, inner), at(b, k, j, cols)]))
                        .collect();
                    match terms.len() {
                        1 => terms.into_iter().next().unwrap_or(Expr::Blank),
                        _ => Expr::add(terms),
                    }
                })
                .collect()
        })
        .collect();
    Some(Aggregate::matrix(result))
}

/// Square matrix raised to a non-negative integer power. Each step's entries
/// go through `simplify` to keep the tree small.
pub(crate) fn power(
    m: &Aggregate,
    k: i64,
    simplify: impl Fn(&Expr) -> Expr,
) -> Option<Aggregate> {
    let (rows, cols) = m.shape()?;
    if rows != cols || !(0..=64).contains(&k) {
        return None;
    }
    let identity = Aggregate::matrix(
        (0..rows)
            .map(|i| (0..cols).map(|j| Expr::int(i64::from(i == j))).collect())
            .collect(),
    );
    let mut result = identity;
    for _ in 0..k {
        let product = matmul(&result, m)?;
        result = map_entries(&product, &simplify);
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Expr> {
        values.iter().copied().map(Expr::int).collect()
    }

    #[test]
    fn vector_like_sums_keep_the_left_kind() {
        let a = Aggregate::new(AggregateKind::Vector, ints(&[1, 2]));
        let b = Aggregate::new(AggregateKind::Tuple, ints(&[3, 4]));
        let sum = add(&a, &b).unwrap();
        assert_eq!(sum.kind(), AggregateKind::Vector);
        assert_eq!(sum.entries()[0], Expr::add(ints(&[1, 3])));

        let short = Aggregate::new(AggregateKind::Tuple, ints(&[3]));
        assert!(add(&a, &short).is_none());
        let set = Aggregate::new(AggregateKind::Set, ints(&[3, 4]));
        assert!(add(&a, &set).is_none());
    }

    #[test]
    fn column_times_row() {
        let column = Aggregate::matrix(vec![ints(&[1]), ints(&[2]), ints(&[3])]);
        let row = Aggregate::matrix(vec![ints(&[4, 5])]);
        let product = matmul(&column, &row).unwrap();
        assert_eq!(product.shape(), Some((3, 2)));
        assert_eq!(product.entries()[5], Expr::mul(ints(&[3, 5])));

        assert!(matmul(&row, &row).is_none());
    }

    #[test]
    fn matrix_power_zero_is_identity() {
        let m = Aggregate::matrix(vec![ints(&[1, 1]), ints(&[0, 1])]);
        let id = power(&m, 0, Expr::clone).unwrap();
        assert_eq!(id.entries(), ints(&[1, 0, 0, 1]).as_slice());
        assert!(power(&Aggregate::matrix(vec![ints(&[1, 2])]), 2, Expr::clone).is_none());
    }
}
