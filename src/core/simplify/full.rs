//! The `full` rule set: numeric folding plus flattening, like terms,
//! canonical term order, the imaginary unit and aggregate arithmetic.

use mathex_ir::{Aggregate, Apply, Expr, Number, Operator};

use super::aggregate::{self, is_evaluable, map_entries};
use super::arith::{exact_builtin, Value};
use super::numbers;

/// One bottom-up pass.
pub(super) fn full(expr: &Expr) -> Expr {
    let expr = match expr {
        Expr::Symbol(name) if name == "i" => return Expr::number(Number::complex(0.0, 1.0)),
        // Subscripts are labels: `x_{1+1}` and `a_i` stay as written.
        Expr::Apply(apply) if apply.op == Operator::Subscript => return expr.clone(),
        Expr::Apply(apply) if apply.op == Operator::Apply && !apply.args.is_empty() => {
            let mut args = Vec::with_capacity(apply.args.len());
            args.push(apply.args[0].clone());
            args.extend(apply.args[1..].iter().map(full));
            node(apply, Operator::Apply, args)
        }
        other => other.map_children(full),
    };
    let Expr::Apply(apply) = &expr else {
        return expr;
    };
    match (apply.op, apply.args.as_slice()) {
        (Operator::Negate, [inner]) => match Value::from_expr(inner) {
            Some(v) => v.neg().to_expr(),
            None => product(apply, &[Expr::int(-1), inner.clone()]),
        },
        (Operator::Add, terms) => sum(apply, terms),
        (Operator::Multiply, factors) => product(apply, factors),
        (Operator::Divide, [num, den]) => quotient(num, den).unwrap_or(expr),
        (Operator::Power, [base, exp]) => power(base, exp).unwrap_or(expr),
        (Operator::Apply, [callee, args @ ..]) => callee
            .as_symbol()
            .and_then(|name| exact_builtin(name, args))
            .unwrap_or(expr),
        _ => expr,
    }
}

fn node(original: &Apply, op: Operator, args: Vec<Expr>) -> Expr {
    Expr::Apply(Apply {
        op,
        args,
        unordered: original.unordered,
    })
}

/// `op[args]`, or the only argument, or `empty` when there is none.
fn collapse(original: &Apply, op: Operator, mut args: Vec<Expr>, empty: Value) -> Expr {
    match args.len() {
        0 => empty.to_expr(),
        1 => args.pop().unwrap_or(Expr::Blank),
        _ => node(original, op, args),
    }
}

fn quotient(num: &Expr, den: &Expr) -> Option<Expr> {
    if let Some(folded) = numbers::quotient(num, den) {
        return Some(folded);
    }
    let d = Value::from_expr(den).filter(|d| !d.is_zero())?;
    if num.as_op(Operator::Add).is_some() {
        return None;
    }
    let reciprocal = Value::ONE.div(d)?;
    Some(full(&Expr::mul(vec![reciprocal.to_expr(), num.clone()])))
}

fn power(base: &Expr, exp: &Expr) -> Option<Expr> {
    if let Some(folded) = numbers::power(base, exp) {
        return Some(folded);
    }
    // (c^f)^e with integer exponents.
    let outer = Value::from_expr(exp)?.as_integer()?;
    match base.as_op(Operator::Power) {
        Some([inner, f]) => {
            let f = Value::from_expr(f)?.as_integer()?;
            let combined = f.checked_mul(outer)?;
            Some(full(&Expr::pow(inner.clone(), Expr::int(combined))))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

fn flatten_product(factors: &[Expr], coefficient: &mut Value, out: &mut Vec<Expr>) {
    for factor in factors {
        if let Some(v) = Value::from_expr(factor) {
            *coefficient = coefficient.mul(v);
            continue;
        }
        match factor {
            Expr::Apply(apply) if apply.op == Operator::Multiply => {
                flatten_product(&apply.args, coefficient, out)
            }
            Expr::Apply(apply) if apply.op == Operator::Negate && apply.args.len() == 1 => {
                *coefficient = coefficient.mul(Value::int(-1));
                flatten_product(&apply.args, coefficient, out)
            }
            other => out.push(other.clone()),
        }
    }
}

fn evaluable(expr: &Expr) -> Option<&Aggregate> {
    expr.as_aggregate().filter(|agg| is_evaluable(agg))
}

fn product(apply: &Apply, args: &[Expr]) -> Expr {
    let mut coefficient = Value::ONE;
    let mut flat = Vec::with_capacity(args.len());
    flatten_product(args, &mut coefficient, &mut flat);

    // Matrix products, left to right; scalars in between commute.
    let mut factors: Vec<Expr> = Vec::with_capacity(flat.len());
    let mut last_aggregate: Option<usize> = None;
    for factor in flat {
        if let Some(right) = evaluable(&factor) {
            let merged = last_aggregate
                .and_then(|i| evaluable(&factors[i]).map(|left| (i, left)))
                .and_then(|(i, left)| aggregate::matmul(left, right).map(|p| (i, p)));
            if let Some((i, product)) = merged {
                factors[i] = Expr::Aggregate(map_entries(&product, full));
                continue;
            }
            last_aggregate = Some(factors.len());
        }
        factors.push(factor);
    }

    let aggregates = factors.iter().filter(|f| f.as_aggregate().is_some()).count();
    if aggregates == 1 {
        if let Some(position) = factors.iter().position(|f| evaluable(f).is_some()) {
            let target = factors.remove(position);
            if let Some(agg) = evaluable(&target) {
                return scale(agg, coefficient, &factors);
            }
        }
    }
    if aggregates == 0 && coefficient.is_zero() {
        return coefficient.to_expr();
    }

    let mut factors = combine_powers(factors);
    if let Some(result) = conjugate_product(&mut factors) {
        let mut rest = vec![coefficient.to_expr(), result];
        rest.append(&mut factors);
        return full(&Expr::mul(rest));
    }
    if !coefficient.is_one() || factors.is_empty() {
        factors.insert(0, coefficient.to_expr());
    }
    collapse(apply, Operator::Multiply, factors, Value::ONE)
}

/// `c * s1 * s2 * [a, b]` -> `[c s1 s2 a, c s1 s2 b]`.
fn scale(agg: &Aggregate, coefficient: Value, scalars: &[Expr]) -> Expr {
    if coefficient.is_one() && scalars.is_empty() {
        return Expr::Aggregate(agg.clone());
    }
    let scaled = map_entries(agg, |entry| {
        let mut factors = Vec::with_capacity(scalars.len() + 2);
        factors.push(coefficient.to_expr());
        factors.extend(scalars.iter().cloned());
        factors.push(entry.clone());
        full(&Expr::mul(factors))
    });
    Expr::Aggregate(scaled)
}

/// Split `b^e` with a numeric exponent; anything else is `f^1`.
fn base_and_exponent(factor: &Expr) -> (Expr, Value) {
    if let Some([base, exp]) = factor.as_op(Operator::Power) {
        if let Some(e) = Value::from_expr(exp) {
            return (base.clone(), e);
        }
    }
    (factor.clone(), Value::ONE)
}

/// `x * x^2 -> x^3`; aggregates never merge.
fn combine_powers(factors: Vec<Expr>) -> Vec<Expr> {
    let mut groups: Vec<(Expr, Option<Value>)> = Vec::with_capacity(factors.len());
    for factor in factors {
        if factor.as_aggregate().is_some() {
            groups.push((factor, None));
            continue;
        }
        let (base, exp) = base_and_exponent(&factor);
        match groups
            .iter_mut()
            .find(|(b, e)| e.is_some() && *b == base)
        {
            Some((_, Some(total))) => *total = total.add(exp),
            _ => groups.push((base, Some(exp))),
        }
    }
    groups
        .into_iter()
        .filter_map(|(base, exp)| match exp {
            None => Some(base),
            Some(e) if e.is_zero() => None,
            Some(e) if e.is_one() => Some(base),
            Some(e) => Some(
                numbers::power(&base, &e.to_expr())
                    .unwrap_or_else(|| Expr::pow(base, e.to_expr())),
            ),
        })
        .collect()
}

/// Real and imaginary parts of a sum. Imaginary terms are kept as
/// `(coefficient, factors)` with the `i` stripped.
struct ComplexParts {
    real: Vec<Expr>,
    imaginary: Vec<(f64, Vec<Expr>)>,
}

fn complex_parts(expr: &Expr) -> Option<ComplexParts> {
    let terms = expr.as_op(Operator::Add)?;
    let mut parts = ComplexParts {
        real: Vec::new(),
        imaginary: Vec::new(),
    };
    for term in terms {
        match term {
            Expr::Number(Number::Complex { re, im }) => {
                if *re != 0.0 {
                    parts.real.push(Value::from_f64(*re).to_expr());
                }
                parts.imaginary.push((*im, Vec::new()));
            }
            Expr::Apply(apply) if apply.op == Operator::Multiply => {
                match apply.args.split_first() {
                    Some((Expr::Number(Number::Complex { re, im }), rest)) if *re == 0.0 => {
                        parts.imaginary.push((*im, rest.to_vec()))
                    }
                    _ => parts.real.push(term.clone()),
                }
            }
            other => parts.real.push(other.clone()),
        }
    }
    (!parts.imaginary.is_empty()).then_some(parts)
}

fn same_multiset(left: &[Expr], right: &[Expr]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut used = vec![false; right.len()];
    left.iter().all(|l| {
        match right.iter().enumerate().find(|(i, r)| !used[*i] && *r == l) {
            Some((i, _)) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

fn conjugates(a: &ComplexParts, b: &ComplexParts) -> bool {
    if !same_multiset(&a.real, &b.real) || a.imaginary.len() != b.imaginary.len() {
        return false;
    }
    let mut used = vec![false; b.imaginary.len()];
    a.imaginary.iter().all(|(k, rest)| {
        let found = b
            .imaginary
            .iter()
            .enumerate()
            .find(|(i, (m, other))| !used[*i] && *m == -*k && same_multiset(rest, other));
        match found {
            Some((i, _)) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

fn part_sum(terms: Vec<Expr>) -> Expr {
    match terms.len() {
        0 => Expr::int(0),
        1 => terms.into_iter().next().unwrap_or(Expr::Blank),
        _ => Expr::add(terms),
    }
}

/// `(a + bi)(a - bi) -> a^2 + b^2`. Removes the pair from `factors`.
fn conjugate_product(factors: &mut Vec<Expr>) -> Option<Expr> {
    let parts: Vec<Option<ComplexParts>> = factors.iter().map(complex_parts).collect();
    for i in 0..parts.len() {
        for j in i + 1..parts.len() {
            let (Some(a), Some(b)) = (&parts[i], &parts[j]) else {
                continue;
            };
            if !conjugates(a, b) {
                continue;
            }
            let real = part_sum(a.real.clone());
            let imaginary = part_sum(
                a.imaginary
                    .iter()
                    .map(|(k, rest)| {
                        let mut term = vec![Value::from_f64(*k).to_expr()];
                        term.extend(rest.iter().cloned());
                        full(&Expr::mul(term))
                    })
                    .collect(),
            );
            factors.remove(j);
            factors.remove(i);
            return Some(full(&Expr::add(vec![
                Expr::pow(real, Expr::int(2)),
                Expr::pow(imaginary, Expr::int(2)),
            ])));
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Sums
// ---------------------------------------------------------------------------

fn flatten_sum(terms: &[Expr], constant: &mut Option<Value>, out: &mut Vec<Expr>) {
    for term in terms {
        if let Some(v) = Value::from_expr(term) {
            *constant = Some(constant.map_or(v, |c| c.add(v)));
            continue;
        }
        match term.as_op(Operator::Add) {
            Some(inner) => flatten_sum(inner, constant, out),
            None => out.push(term.clone()),
        }
    }
}

/// `c * f1 * f2` -> `(c, [f1, f2])`.
fn split_coefficient(term: &Expr) -> (Value, Vec<Expr>) {
    if let Some(factors) = term.as_op(Operator::Multiply) {
        if let Some((first, rest)) = factors.split_first() {
            if let Some(c) = Value::from_expr(first) {
                return (c, rest.to_vec());
            }
        }
        return (Value::ONE, factors.to_vec());
    }
    (Value::ONE, vec![term.clone()])
}

fn with_coefficient(coefficient: Value, mut factors: Vec<Expr>) -> Expr {
    if coefficient.is_one() && !factors.is_empty() {
        return part_product(factors);
    }
    factors.insert(0, coefficient.to_expr());
    part_product(factors)
}

fn part_product(mut factors: Vec<Expr>) -> Expr {
    match factors.len() {
        1 => factors.pop().unwrap_or(Expr::Blank),
        _ => Expr::mul(factors),
    }
}

/// Polynomial degree used for term order.
fn degree(expr: &Expr) -> f64 {
    match expr {
        Expr::Symbol(_) => 1.0,
        Expr::Apply(apply) => match (apply.op, apply.args.as_slice()) {
            (Operator::Power, [base, exp]) => match Value::from_expr(exp).and_then(Value::to_f64) {
                Some(k) => k * degree(base),
                None => degree(base),
            },
            (Operator::Multiply, factors) => factors.iter().map(degree).sum(),
            (Operator::Divide, [num, den]) => degree(num) - degree(den),
            (Operator::Negate, [inner]) => degree(inner),
            _ => 0.0,
        },
        _ => 0.0,
    }
}

fn sum(apply: &Apply, args: &[Expr]) -> Expr {
    let mut constant: Option<Value> = None;
    let mut flat = Vec::with_capacity(args.len());
    flatten_sum(args, &mut constant, &mut flat);

    // Evaluable aggregates accumulate at the first one's position.
    let mut items: Vec<Expr> = Vec::with_capacity(flat.len());
    let mut accumulator: Option<usize> = None;
    for item in flat {
        if let Some(right) = evaluable(&item) {
            let merged = accumulator
                .and_then(|i| evaluable(&items[i]).map(|left| (i, left)))
                .and_then(|(i, left)| aggregate::add(left, right).map(|s| (i, s)));
            if let Some((i, total)) = merged {
                items[i] = Expr::Aggregate(map_entries(&total, full));
                continue;
            }
            if accumulator.is_none() {
                accumulator = Some(items.len());
            }
        }
        items.push(item);
    }
    let has_aggregates = items.iter().any(|item| item.as_aggregate().is_some());

    // Like terms.
    let mut groups: Vec<(Value, Vec<Expr>)> = Vec::with_capacity(items.len());
    let mut terms: Vec<Option<usize>> = Vec::with_capacity(items.len());
    let mut kept: Vec<Expr> = Vec::new();
    for item in items {
        if item.as_aggregate().is_some() {
            terms.push(None);
            kept.push(item);
            continue;
        }
        let (c, factors) = split_coefficient(&item);
        match groups
            .iter()
            .position(|(_, existing)| same_multiset(existing, &factors))
        {
            Some(g) => groups[g].0 = groups[g].0.add(c),
            None => {
                terms.push(Some(groups.len()));
                groups.push((c, factors));
            }
        }
    }
    let mut kept = kept.into_iter();
    let mut out: Vec<Expr> = Vec::with_capacity(terms.len() + 1);
    for slot in terms {
        match slot {
            None => out.extend(kept.next()),
            Some(g) => {
                let (c, factors) = groups[g].clone();
                if !c.is_zero() {
                    out.push(with_coefficient(c, factors));
                }
            }
        }
    }

    if !has_aggregates {
        let mut ranked: Vec<(f64, Expr)> = out.into_iter().map(|t| (degree(&t), t)).collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
        out = ranked.into_iter().map(|(_, t)| t).collect();
    }
    if let Some(c) = constant {
        if !c.is_zero() || out.is_empty() {
            out.push(c.to_expr());
        }
    }
    collapse(apply, Operator::Add, out, Value::ZERO)
}
