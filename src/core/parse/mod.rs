//! Text and LaTeX front ends.
//!
//! Both syntaxes are lexed into one token stream and read by one grammar, so
//! precedence and degradation behave identically. Parsing never fails:
//! whatever cannot be read becomes [`Expr::Blank`] and is described by a
//! [`ParseIssue`].

mod grammar;
mod latex_lexer;
mod split;
mod tex_lexer;
mod tex_token;
mod text_lexer;
mod token;

use fxhash::FxHashSet;
use log::debug;
use mathex_ir::Expr;
use serde::{Deserialize, Serialize};

/// Input syntax of an expression string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    #[default]
    Text,
    Latex,
}

/// Parser switches derived from the engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub split_symbols: bool,
    pub function_symbols: FxHashSet<String>,
    pub create_vectors: bool,
    pub create_intervals: bool,
    pub parse_scientific_notation: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            split_symbols: true,
            function_symbols: FxHashSet::default(),
            create_vectors: false,
            create_intervals: false,
            parse_scientific_notation: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    /// A token that cannot appear where it was found.
    UnexpectedToken,
    /// An operator or command is missing an operand.
    MissingOperand,
    /// A bracket, group or environment was never closed.
    Unclosed,
    /// A LaTeX command or character the parser does not know.
    UnknownCommand,
}

/// One degradation recorded while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseIssue {
    pub kind: IssueKind,
    /// Byte offset into the input.
    pub offset: usize,
    pub message: String,
}

/// Parse `input`; unreadable spans become blanks.
pub fn parse(input: &str, syntax: Syntax, options: &ParseOptions) -> Expr {
    parse_with_report(input, syntax, options).0
}

/// Parse `input` and report every span that degraded to a blank.
pub fn parse_with_report(
    input: &str,
    syntax: Syntax,
    options: &ParseOptions,
) -> (Expr, Vec<ParseIssue>) {
    let tokens = match syntax {
        Syntax::Text => text_lexer::lex_text(input, options),
        Syntax::Latex => latex_lexer::lex_latex(input, options),
    };
    let (expr, issues) = grammar::Parser::new(tokens, syntax, options, input.len()).parse();
    if !issues.is_empty() {
        debug!("parsed {:?} input with {} issue(s)", syntax, issues.len());
    }
    (expr, issues)
}
