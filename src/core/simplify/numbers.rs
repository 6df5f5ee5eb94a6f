//! Numeric folding for the `numbers` and `numberspreserveorder` modes.

use mathex_ir::{Apply, Expr, Operator};

use super::arith::{exact_builtin, Value};

/// Where folded numbers may go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Placement {
    /// Constants of a sum move last, coefficients of a product first.
    Gather,
    /// Only neighbouring numbers merge; nothing moves.
    InPlace,
}

pub(super) fn fold(expr: &Expr, placement: Placement) -> Expr {
    let expr = expr.map_children(|child| fold(child, placement));
    let Expr::Apply(apply) = &expr else {
        return expr;
    };
    match (apply.op, apply.args.as_slice()) {
        (Operator::Negate, [inner]) => negate(inner),
        (Operator::Add, _) => fold_sum(apply, placement),
        (Operator::Multiply, _) => fold_product(apply, placement),
        (Operator::Divide, [num, den]) => quotient(num, den).unwrap_or(expr),
        (Operator::Power, [base, exp]) => power(base, exp).unwrap_or(expr),
        (Operator::Apply, [callee, args @ ..]) => callee
            .as_symbol()
            .and_then(|name| exact_builtin(name, args))
            .unwrap_or(expr),
        _ => expr,
    }
}

/// `-v` folds, `--x` cancels.
pub(super) fn negate(inner: &Expr) -> Expr {
    if let Some(v) = Value::from_expr(inner) {
        return v.neg().to_expr();
    }
    match inner.as_op(Operator::Negate) {
        Some([x]) => x.clone(),
        _ => Expr::neg(inner.clone()),
    }
}

/// `a / b` for numbers, `x / 1`.
pub(super) fn quotient(num: &Expr, den: &Expr) -> Option<Expr> {
    match (Value::from_expr(num), Value::from_expr(den)) {
        (Some(a), Some(b)) => a.div(b).map(Value::to_expr),
        (_, Some(b)) if b.is_one() => Some(num.clone()),
        _ => None,
    }
}

/// Numeric powers and the `x^0`, `x^1`, `1^x` identities.
pub(super) fn power(base: &Expr, exp: &Expr) -> Option<Expr> {
    let b = Value::from_expr(base);
    let e = Value::from_expr(exp);
    if let (Some(b), Some(e)) = (b, e) {
        let result = b.pow(e)?;
        // `2^(1/2)` stays exact rather than turning into a float.
        let exact_operands = matches!((b, e), (Value::Ratio(..), Value::Ratio(..)));
        if exact_operands && e.as_integer().is_none() && !matches!(result, Value::Ratio(..)) {
            return None;
        }
        return Some(result.to_expr());
    }
    if e.is_some_and(Value::is_zero) || b.is_some_and(Value::is_one) {
        return Some(Expr::int(1));
    }
    if e.is_some_and(Value::is_one) {
        return Some(base.clone());
    }
    None
}

fn rebuilt(apply: &Apply, mut args: Vec<Expr>, empty: Value) -> Expr {
    match args.len() {
        0 => empty.to_expr(),
        1 => args.pop().unwrap_or(Expr::Blank),
        _ => Expr::Apply(Apply {
            op: apply.op,
            args,
            unordered: apply.unordered,
        }),
    }
}

fn fold_sum(apply: &Apply, placement: Placement) -> Expr {
    let mut terms: Vec<Expr> = Vec::with_capacity(apply.args.len());
    match placement {
        Placement::Gather => {
            let mut constant: Option<Value> = None;
            for term in &apply.args {
                match Value::from_expr(term) {
                    Some(v) => constant = Some(constant.map_or(v, |c| c.add(v))),
                    None => terms.push(term.clone()),
                }
            }
            if let Some(c) = constant {
                if !c.is_zero() || terms.is_empty() {
                    terms.push(c.to_expr());
                }
            }
        }
        Placement::InPlace => {
            let mut last: Option<Value> = None;
            for term in &apply.args {
                match (Value::from_expr(term), last) {
                    (Some(v), Some(prev)) => {
                        let sum = prev.add(v);
                        terms.pop();
                        terms.push(sum.to_expr());
                        last = Some(sum);
                    }
                    (v, _) => {
                        terms.push(term.clone());
                        last = v;
                    }
                }
            }
            if terms.len() > 1 {
                terms.retain(|t| !Value::from_expr(t).is_some_and(Value::is_zero));
            }
        }
    }
    rebuilt(apply, terms, Value::ZERO)
}

fn fold_product(apply: &Apply, placement: Placement) -> Expr {
    let has_aggregate = apply.args.iter().any(|f| matches!(f, Expr::Aggregate(_)));
    let mut factors: Vec<Expr> = Vec::with_capacity(apply.args.len());
    match placement {
        Placement::Gather => {
            let mut coefficient: Option<Value> = None;
            for factor in &apply.args {
                match Value::from_expr(factor) {
                    Some(v) => coefficient = Some(coefficient.map_or(v, |c| c.mul(v))),
                    None => factors.push(factor.clone()),
                }
            }
            if let Some(c) = coefficient {
                if c.is_zero() && !has_aggregate {
                    return c.to_expr();
                }
                if !c.is_one() || factors.is_empty() {
                    factors.insert(0, c.to_expr());
                }
            }
        }
        Placement::InPlace => {
            let mut last: Option<Value> = None;
            for factor in &apply.args {
                match (Value::from_expr(factor), last) {
                    (Some(v), Some(prev)) => {
                        let product = prev.mul(v);
                        factors.pop();
                        factors.push(product.to_expr());
                        last = Some(product);
                    }
                    (v, _) => {
                        factors.push(factor.clone());
                        last = v;
                    }
                }
            }
            if !has_aggregate {
                if let Some(zero) = factors
                    .iter()
                    .filter_map(Value::from_expr)
                    .find(|v| v.is_zero())
                {
                    return zero.to_expr();
                }
            }
            if factors.len() > 1 {
                factors.retain(|f| !Value::from_expr(f).is_some_and(Value::is_one));
            }
        }
    }
    rebuilt(apply, factors, Value::ONE)
}
