//! Rule-based simplification.
//!
//! Every mode is a bottom-up rewrite repeated until the tree stops changing,
//! so simplifying a simplified tree gives the same tree back.

mod aggregate;
pub(crate) mod arith;
mod full;
mod numbers;

use log::trace;
use mathex_ir::Expr;

use crate::config::SimplifyMode;

pub(crate) use aggregate::power as matrix_power;

/// Upper bound on rewrite passes; real trees settle in two or three.
const MAX_PASSES: usize = 12;

pub fn simplify(tree: &Expr, mode: SimplifyMode) -> Expr {
    let pass: fn(&Expr) -> Expr = match mode {
        SimplifyMode::None => return tree.clone(),
        SimplifyMode::Numbers => |e| numbers::fold(e, numbers::Placement::Gather),
        SimplifyMode::NumbersPreserveOrder => |e| numbers::fold(e, numbers::Placement::InPlace),
        SimplifyMode::Full => full::full,
    };
    fixpoint(tree, pass)
}

/// One `full` pass, for callers that drive their own iteration.
pub(crate) fn full_pass(tree: &Expr) -> Expr {
    full::full(tree)
}

fn fixpoint(tree: &Expr, pass: fn(&Expr) -> Expr) -> Expr {
    let mut current = pass(tree);
    for round in 1..MAX_PASSES {
        let next = pass(&current);
        if next == current {
            trace!("simplify settled after {} passes", round);
            return current;
        }
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parse::{parse, ParseOptions, Syntax};

    fn simplified(input: &str, mode: SimplifyMode) -> Expr {
        simplify(&parse(input, Syntax::Text, &ParseOptions::default()), mode)
    }

    #[test]
    fn none_is_identity() {
        let raw = parse("1+1", Syntax::Text, &ParseOptions::default());
        assert_eq!(simplify(&raw, SimplifyMode::None), raw);
    }

    #[test]
    fn one_plus_one() {
        assert_eq!(simplified("1+1", SimplifyMode::Full), Expr::int(2));
        assert_eq!(simplified("1+1", SimplifyMode::Numbers), Expr::int(2));
    }

    #[test]
    fn preserve_order_keeps_positions() {
        let x = Expr::symbol("x");
        assert_eq!(
            simplified("2*3*x + 1 + 1", SimplifyMode::NumbersPreserveOrder),
            Expr::add(vec![Expr::mul(vec![Expr::int(6), x.clone()]), Expr::int(2)])
        );
        assert_eq!(
            simplified("x*2*3", SimplifyMode::NumbersPreserveOrder),
            Expr::mul(vec![x, Expr::int(6)])
        );
    }

    #[test]
    fn every_mode_is_idempotent() {
        let inputs = [
            "3x + 2 - x + 4",
            "(x+1)(x-1)",
            "2^(1/2) * x * x",
            "1/((0)(-1))",
            "-(-(x))",
            "i^3 + (2,3) + (1,1)",
            "x/2 + x/3",
        ];
        for mode in [
            SimplifyMode::Numbers,
            SimplifyMode::NumbersPreserveOrder,
            SimplifyMode::Full,
        ] {
            for input in inputs {
                let once = simplified(input, mode);
                assert_eq!(simplify(&once, mode), once, "{} under {:?}", input, mode);
            }
        }
    }

    #[test]
    fn negative_zero_divisor() {
        assert_eq!(
            simplified("1/((0)(-1))", SimplifyMode::Full),
            Expr::float(f64::NEG_INFINITY)
        );
    }
}
