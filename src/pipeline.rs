//! The full processing pipeline and expression composition.
//!
//! `raw string -> parse -> normalize -> simplify -> expand -> format ->
//! serialize`. Every entry point is a pure function of its inputs; the
//! configuration is an explicit snapshot and no stage keeps state.

use indexmap::IndexMap;
use log::debug;
use mathex_ir::Expr;
use mathex_latex_backend::{render_latex, LatexRenderOptions};

use crate::config::{ConfigOverrides, EngineConfig};
use crate::core::expand::expand;
use crate::core::format::{format, DisplayContext, Formatted};
use crate::core::normalize::{normalize, NormalizeContext, References};
use crate::core::parse::{parse_with_report, ParseIssue, Syntax};
use crate::core::simplify::simplify;
use crate::core::text::{to_text, TextRenderOptions};

/// Everything the pipeline produced for one expression.
#[derive(Debug, Clone, PartialEq)]
pub struct MathResult {
    /// Parser output (or the spliced tree), before normalization.
    pub raw: Expr,
    /// Normalized, simplified and expanded tree.
    pub processed: Expr,
    pub formatted: Formatted,
    /// Display settings the result was formatted with.
    pub display: DisplayContext,
    pub latex: String,
    pub text: String,
    pub issues: Vec<ParseIssue>,
}

/// Processed children of a composed expression, by reference name.
pub type Children = IndexMap<String, MathResult>;

/// Parse and process one expression string.
pub fn process(input: &str, syntax: Syntax, config: &EngineConfig) -> MathResult {
    let (raw, issues) = parse_with_report(input, syntax, &config.parse_options());
    let mut result = process_tree(&raw, config, &References::new());
    result.issues = issues;
    result
}

/// Process a tree that did not come from the parser.
pub fn process_tree(raw: &Expr, config: &EngineConfig, references: &References) -> MathResult {
    run(raw, config, references, config.display_context())
}

/// Process `raw` as a node composed from `children`.
///
/// The node's configuration is `base` refined by its own `overrides`.
/// `$name` references resolve to the children's processed trees. A node
/// with exactly one child and no display attribute of its own shows numbers
/// the way that child does.
pub fn compose(
    raw: &Expr,
    children: &Children,
    overrides: &ConfigOverrides,
    base: &EngineConfig,
) -> MathResult {
    let config = base.extend(overrides);
    let references: References = children
        .iter()
        .map(|(name, child)| (name.clone(), child.processed.clone()))
        .collect();
    let display = match children.values().next() {
        Some(child) if children.len() == 1 && !overrides.sets_display() => child.display,
        _ => config.display_context(),
    };
    run(raw, &config, &references, display)
}

fn run(
    raw: &Expr,
    config: &EngineConfig,
    references: &References,
    display: DisplayContext,
) -> MathResult {
    let normalized = normalize(raw, &NormalizeContext::new(config, references));
    let simplified = simplify(&normalized, config.simplify);
    let processed = if config.expand {
        expand(&simplified)
    } else {
        simplified
    };
    debug!(
        "processed {} raw nodes into {} ({:?}, expand={})",
        raw.node_count(),
        processed.node_count(),
        config.simplify,
        config.expand
    );

    let formatted = format(&processed, &display);
    let latex = render_latex(
        &formatted.tree,
        &LatexRenderOptions {
            number_style: formatted.style,
            display_blanks: display.display_blanks,
            ..LatexRenderOptions::default()
        },
    );
    let text = to_text(
        &formatted.tree,
        &TextRenderOptions {
            number_style: formatted.style,
            display_blanks: display.display_blanks,
        },
    );
    MathResult {
        raw: raw.clone(),
        processed,
        formatted,
        display,
        latex,
        text,
        issues: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NumericSetting, SimplifyMode};
    use mathex_ir::display::Padding;
    use pretty_assertions::assert_eq;

    #[test]
    fn same_input_same_output() {
        let config = EngineConfig {
            simplify: SimplifyMode::Full,
            ..EngineConfig::default()
        };
        assert_eq!(
            process("2x + 3x", Syntax::Text, &config),
            process("2x + 3x", Syntax::Text, &config)
        );
    }

    #[test]
    fn composed_node_uses_its_own_configuration() {
        let child_config = EngineConfig::default();
        let child = process("1 + 1", Syntax::Text, &child_config);
        assert_eq!(child.latex, "1 + 1");

        let mut children = Children::new();
        children.insert("a".to_string(), child);
        let raw = crate::core::parse::parse(
            "2 * $a",
            Syntax::Text,
            &child_config.parse_options(),
        );
        let overrides = ConfigOverrides {
            simplify: Some(SimplifyMode::Full),
            ..ConfigOverrides::default()
        };
        let composed = compose(&raw, &children, &overrides, &child_config);
        assert_eq!(composed.processed, Expr::int(4));
        assert_eq!(composed.latex, "4");
    }

    #[test]
    fn single_child_passes_its_display_settings_through() {
        let rounded = EngineConfig {
            display_decimals: Some(NumericSetting::from(2)),
            pad_zeros: true,
            ..EngineConfig::default()
        };
        let child = process("0.5", Syntax::Text, &rounded);
        assert_eq!(child.latex, "0.50");

        let mut children = Children::new();
        children.insert("c".to_string(), child);
        let raw = Expr::symbol("$c");
        let base = EngineConfig::default();

        let inherited = compose(&raw, &children, &ConfigOverrides::default(), &base);
        assert_eq!(inherited.display.rounding, Some(Padding::Decimals(2)));
        assert_eq!(inherited.latex, "0.50");

        let local = ConfigOverrides {
            pad_zeros: Some(false),
            ..ConfigOverrides::default()
        };
        let own = compose(&raw, &children, &local, &base);
        assert_eq!(own.display.rounding, None);
        assert_eq!(own.latex, "0.5");
    }

    #[test]
    fn issues_are_reported_with_a_tree() {
        let result = process("1+", Syntax::Text, &EngineConfig::default());
        assert_eq!(result.issues.len(), 1);
        assert!(result.processed.contains_blank());
        assert_eq!(result.latex, "1 + ");
    }
}
