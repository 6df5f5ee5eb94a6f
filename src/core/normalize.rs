//! Normalization of raw parse trees.
//!
//! The parser leaves every `f(...)` as a raw call because only the
//! configuration knows whether `f` is a function. This pass decides,
//! substitutes `$name` references with their resolved trees and stamps the
//! `unordered` setting onto nodes that do not carry their own flag. Running
//! it again on the same raw tree with another context gives that context's
//! reading; running it on its own output changes nothing.

use fxhash::FxHashSet;
use indexmap::IndexMap;
use log::debug;
use mathex_ir::names::is_builtin_function;
use mathex_ir::{Apply, Expr, Operator};

use crate::config::EngineConfig;

/// Resolved trees of referenced expressions, keyed by name without `$`.
pub type References = IndexMap<String, Expr>;

pub struct NormalizeContext<'a> {
    pub function_symbols: &'a FxHashSet<String>,
    pub references_are_function_symbols: bool,
    pub unordered: bool,
    pub references: &'a References,
}

impl<'a> NormalizeContext<'a> {
    pub fn new(config: &'a EngineConfig, references: &'a References) -> Self {
        Self {
            function_symbols: &config.function_symbols,
            references_are_function_symbols: config.references_are_function_symbols,
            unordered: config.unordered,
            references,
        }
    }

    fn reference(&self, name: &str) -> Option<&Expr> {
        self.references.get(name.strip_prefix('$').unwrap_or(name))
    }

    /// Whether a raw call on `callee` applies a function.
    fn is_function(&self, callee: &Expr) -> bool {
        match callee {
            Expr::Symbol(name) if name.starts_with('$') => {
                self.references_are_function_symbols
                    || self
                        .reference(name)
                        .and_then(Expr::as_symbol)
                        .is_some_and(|target| self.is_function_name(target))
            }
            Expr::Symbol(name) => self.is_function_name(name),
            Expr::Apply(apply) if matches!(apply.op, Operator::Prime | Operator::Subscript) => {
                apply.args.first().is_some_and(|base| self.is_function(base))
            }
            _ => false,
        }
    }

    fn is_function_name(&self, name: &str) -> bool {
        is_builtin_function(name) || self.function_symbols.contains(name)
    }
}

pub fn normalize(raw: &Expr, ctx: &NormalizeContext) -> Expr {
    walk(raw, ctx).0
}

/// The rewritten node, and whether it is a product made from a call that
/// turned out to be a multiplication (it then merges into a parent product).
fn walk(expr: &Expr, ctx: &NormalizeContext) -> (Expr, bool) {
    match expr {
        Expr::Symbol(name) if name.starts_with('$') => match ctx.reference(name) {
            Some(tree) => (tree.clone(), false),
            None => {
                debug!("unresolved reference {}", name);
                (Expr::Blank, false)
            }
        },
        Expr::Apply(apply) if apply.op == Operator::Apply && !apply.args.is_empty() => {
            let callee = &apply.args[0];
            let args: Vec<Expr> = apply.args[1..].iter().map(|a| walk(a, ctx).0).collect();
            let function = walk(callee, ctx).0;
            if ctx.is_function(callee) {
                let mut all = Vec::with_capacity(args.len() + 1);
                all.push(function);
                all.extend(args);
                (flagged(apply, Operator::Apply, all, ctx), false)
            } else {
                let operand = match args.len() {
                    1 => args.into_iter().next().unwrap_or(Expr::Blank),
                    _ => Expr::tuple(args),
                };
                let product = Expr::mul(vec![function, stamp_unordered(operand, ctx)]);
                (stamp_unordered(product, ctx), true)
            }
        }
        Expr::Apply(apply) if apply.op == Operator::Multiply => {
            let mut factors = Vec::with_capacity(apply.args.len());
            for arg in &apply.args {
                match walk(arg, ctx) {
                    (Expr::Apply(inner), true) => factors.extend(inner.args),
                    (other, _) => factors.push(other),
                }
            }
            (flagged(apply, Operator::Multiply, factors, ctx), false)
        }
        Expr::Apply(apply) => {
            let args = apply.args.iter().map(|a| walk(a, ctx).0).collect();
            (flagged(apply, apply.op, args, ctx), false)
        }
        Expr::Aggregate(agg) => {
            let entries = agg.entries().iter().map(|e| walk(e, ctx).0).collect();
            let rebuilt = agg.with_entries(entries);
            let unordered = rebuilt.unordered().or(ctx.unordered.then_some(true));
            (Expr::Aggregate(rebuilt.with_unordered(unordered)), false)
        }
        other => (other.clone(), false),
    }
}

fn flagged(original: &Apply, op: Operator, args: Vec<Expr>, ctx: &NormalizeContext) -> Expr {
    Expr::Apply(Apply {
        op,
        args,
        unordered: original.unordered.or(ctx.unordered.then_some(true)),
    })
}

fn stamp_unordered(expr: Expr, ctx: &NormalizeContext) -> Expr {
    if !ctx.unordered {
        return expr;
    }
    match expr {
        Expr::Apply(mut apply) => {
            apply.unordered = apply.unordered.or(Some(true));
            Expr::Apply(apply)
        }
        Expr::Aggregate(agg) => {
            let unordered = agg.unordered().or(Some(true));
            Expr::Aggregate(agg.with_unordered(unordered))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parse::{parse, ParseOptions, Syntax};
    use mathex_ir::EqualityMode;

    fn run(input: &str, config: &EngineConfig, references: &References) -> Expr {
        let raw = parse(input, Syntax::Text, &config.parse_options());
        normalize(&raw, &NormalizeContext::new(config, references))
    }

    fn x() -> Expr {
        Expr::symbol("x")
    }

    #[test]
    fn undeclared_call_is_multiplication() {
        let config = EngineConfig::default();
        let refs = References::new();
        assert_eq!(
            run("f(x)", &config, &refs),
            Expr::mul(vec![Expr::symbol("f"), x()])
        );
        assert_eq!(
            run("f(x,y)", &config, &refs),
            Expr::mul(vec![
                Expr::symbol("f"),
                Expr::tuple(vec![x(), Expr::symbol("y")])
            ])
        );
        assert_eq!(
            run("2f(x)", &config, &refs),
            Expr::mul(vec![Expr::int(2), Expr::symbol("f"), x()])
        );
    }

    #[test]
    fn declared_and_builtin_functions_apply() {
        let mut config = EngineConfig::default();
        config.function_symbols.insert("f".to_string());
        let refs = References::new();
        assert_eq!(run("f(x)", &config, &refs), Expr::func("f", vec![x()]));
        assert_eq!(
            run("f'(x)", &config, &refs),
            Expr::call(
                Expr::apply(Operator::Prime, vec![Expr::symbol("f")]),
                vec![x()]
            )
        );
        assert_eq!(
            run("sin(x)", &EngineConfig::default(), &refs),
            Expr::func("sin", vec![x()])
        );
    }

    #[test]
    fn same_raw_tree_under_two_contexts() {
        let raw = parse("g(x)", Syntax::Text, &ParseOptions::default());
        let refs = References::new();
        let plain = EngineConfig::default();
        let mut declared = EngineConfig::default();
        declared.function_symbols.insert("g".to_string());

        let as_product = normalize(&raw, &NormalizeContext::new(&plain, &refs));
        let as_call = normalize(&raw, &NormalizeContext::new(&declared, &refs));
        assert_eq!(as_call, Expr::func("g", vec![x()]));
        assert_eq!(as_product, Expr::mul(vec![Expr::symbol("g"), x()]));
        // Normalizing the output again is a no-op.
        assert_eq!(
            normalize(&as_call, &NormalizeContext::new(&declared, &refs)),
            as_call
        );
    }

    #[test]
    fn references_are_substituted() {
        let config = EngineConfig::default();
        let mut refs = References::new();
        refs.insert("a".to_string(), Expr::int(5));
        assert_eq!(
            run("$a + 1", &config, &refs),
            Expr::add(vec![Expr::int(5), Expr::int(1)])
        );
        assert_eq!(
            run("$missing + 1", &config, &refs),
            Expr::add(vec![Expr::Blank, Expr::int(1)])
        );
    }

    #[test]
    fn references_as_functions() {
        let mut refs = References::new();
        refs.insert("g".to_string(), Expr::symbol("h"));

        let mut config = EngineConfig::default();
        assert_eq!(
            run("$g(x)", &config, &refs),
            Expr::mul(vec![Expr::symbol("h"), x()])
        );

        config.references_are_function_symbols = true;
        assert_eq!(run("$g(x)", &config, &refs), Expr::func("h", vec![x()]));

        let mut declared = EngineConfig::default();
        declared.function_symbols.insert("h".to_string());
        assert_eq!(run("$g(x)", &declared, &refs), Expr::func("h", vec![x()]));
    }

    #[test]
    fn unordered_is_stamped_on_unflagged_nodes() {
        let config = EngineConfig {
            unordered: true,
            ..EngineConfig::default()
        };
        let refs = References::new();
        let a = run("x + 2y", &config, &refs);
        let b = run("y*2 + x", &config, &refs);
        assert_eq!(a.as_apply().and_then(|apply| apply.unordered), Some(true));
        assert!(a.equals(&b, EqualityMode::RespectUnordered));
        assert!(!a.equals(&b, EqualityMode::Structural));
    }
}
