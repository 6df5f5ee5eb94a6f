//! Polynomial expansion.
//!
//! Products are distributed over sums bottom-up, then like terms are
//! collected with the `full` simplification rules.

use log::trace;
use mathex_ir::{Expr, Operator};

use crate::config::SimplifyMode;
use crate::core::simplify::arith::Value;
use crate::core::simplify::{full_pass, matrix_power, simplify};

/// Largest integer power of a sum that is multiplied out.
const MAX_EXPANDED_POWER: i64 = 64;

pub fn expand(tree: &Expr) -> Expr {
    let distributed = distribute(tree);
    trace!("distributed to {} nodes", distributed.node_count());
    simplify(&distributed, SimplifyMode::Full)
}

fn distribute(expr: &Expr) -> Expr {
    if expr.as_op(Operator::Subscript).is_some() {
        return expr.clone();
    }
    let expr = expr.map_children(distribute);
    let Expr::Apply(apply) = &expr else {
        return expr;
    };
    match (apply.op, apply.args.as_slice()) {
        (Operator::Multiply, factors) => distribute_product(factors).unwrap_or(expr),
        (Operator::Negate, [inner]) => match inner.as_op(Operator::Add) {
            Some(terms) => Expr::add(terms.iter().map(|t| Expr::neg(t.clone())).collect()),
            None => expr,
        },
        (Operator::Divide, [num, den]) => match num.as_op(Operator::Add) {
            Some(terms) => Expr::add(
                terms
                    .iter()
                    .map(|t| Expr::div(t.clone(), den.clone()))
                    .collect(),
            ),
            None => expr,
        },
        (Operator::Power, [base, exp]) => expand_power(base, exp).unwrap_or(expr),
        _ => expr,
    }
}

/// `a (b + c) d -> a b d + a c d`, keeping factor order.
fn distribute_product(factors: &[Expr]) -> Option<Expr> {
    if !factors.iter().any(|f| f.as_op(Operator::Add).is_some()) {
        return None;
    }
    let mut products: Vec<Vec<Expr>> = vec![Vec::with_capacity(factors.len())];
    for factor in factors {
        match factor.as_op(Operator::Add) {
            Some(terms) => {
                products = products
                    .iter()
                    .flat_map(|prefix| {
                        terms.iter().map(move |term| {
                            let mut next = prefix.clone();
                            next.push(term.clone());
                            next
                        })
                    })
                    .collect();
            }
            None => products.iter_mut().for_each(|p| p.push(factor.clone())),
        }
    }
    Some(Expr::add(products.into_iter().map(Expr::mul).collect()))
}

/// `(a + b)^k` and `M^k` for non-negative integers `k`.
fn expand_power(base: &Expr, exp: &Expr) -> Option<Expr> {
    let k = Value::from_expr(exp)?.as_integer()?;
    if !(0..=MAX_EXPANDED_POWER).contains(&k) {
        return None;
    }
    if let Some(agg) = base.as_aggregate() {
        return matrix_power(agg, k, full_pass).map(Expr::Aggregate);
    }
    base.as_op(Operator::Add)?;
    let mut acc = Expr::int(1);
    for _ in 0..k {
        let product = Expr::mul(vec![acc, base.clone()]);
        acc = simplify(&distribute(&product), SimplifyMode::Full);
    }
    Some(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parse::{parse, ParseOptions, Syntax};
    use mathex_ir::{Aggregate, AggregateKind};

    fn expanded(input: &str) -> Expr {
        expand(&parse(input, Syntax::Text, &ParseOptions::default()))
    }

    fn x() -> Expr {
        Expr::symbol("x")
    }

    #[test]
    fn product_of_binomials() {
        assert_eq!(
            expanded("(x-3)(2x+4)"),
            Expr::add(vec![
                Expr::mul(vec![Expr::int(2), Expr::pow(x(), Expr::int(2))]),
                Expr::mul(vec![Expr::int(-2), x()]),
                Expr::int(-12),
            ])
        );
    }

    #[test]
    fn square_of_a_sum() {
        assert_eq!(
            expanded("(x+1)^2"),
            Expr::add(vec![
                Expr::pow(x(), Expr::int(2)),
                Expr::mul(vec![Expr::int(2), x()]),
                Expr::int(1),
            ])
        );
        assert_eq!(expanded("(x+1)^0"), Expr::int(1));
    }

    #[test]
    fn negation_and_division_distribute() {
        assert_eq!(
            expanded("-(x+1)"),
            Expr::add(vec![Expr::mul(vec![Expr::int(-1), x()]), Expr::int(-1)])
        );
        let half = Expr::div(Expr::int(1), Expr::int(2));
        assert_eq!(
            expanded("(x+1)/2"),
            Expr::add(vec![Expr::mul(vec![half.clone(), x()]), half])
        );
    }

    #[test]
    fn difference_of_squares_cancels() {
        assert_eq!(
            expanded("(x+1)(x-1)"),
            Expr::add(vec![Expr::pow(x(), Expr::int(2)), Expr::int(-1)])
        );
    }

    #[test]
    fn matrix_square() {
        let m = Expr::Aggregate(Aggregate::matrix(vec![
            vec![Expr::int(1), Expr::int(1)],
            vec![Expr::int(0), Expr::int(1)],
        ]));
        let squared = expand(&Expr::pow(m, Expr::int(2)));
        assert_eq!(
            squared,
            Expr::aggregate(
                AggregateKind::Matrix { rows: 2, cols: 2 },
                vec![Expr::int(1), Expr::int(2), Expr::int(0), Expr::int(1)]
            )
        );
    }
}
