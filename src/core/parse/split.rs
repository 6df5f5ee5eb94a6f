//! Splitting of multi-letter identifiers into implicit products.

use fxhash::FxHashSet;
use mathex_ir::names::{is_builtin_function, is_greek};
use mathex_ir::Expr;

/// Pieces of an identifier: `xy2` gives `x`, `y2`. Names that are
/// builtins, Greek letters or declared function symbols stay whole.
pub(super) fn split_symbol(name: &str, function_symbols: &FxHashSet<String>) -> Vec<Expr> {
    if name.chars().count() <= 1
        || is_builtin_function(name)
        || is_greek(name)
        || function_symbols.contains(name)
    {
        return vec![Expr::symbol(name)];
    }

    let mut pieces: Vec<String> = Vec::new();
    for c in name.chars() {
        if c.is_ascii_digit() {
            if let Some(last) = pieces.last_mut() {
                last.push(c);
                continue;
            }
        }
        pieces.push(c.to_string());
    }
    pieces.into_iter().map(Expr::Symbol).collect()
}
