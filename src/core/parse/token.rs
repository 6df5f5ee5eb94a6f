//! Token stream shared by the text and LaTeX front ends.
//!
//! Both lexers lower their input to [`Tok`] so that a single grammar decides
//! precedence, bracket kinds and degradation for either syntax.

use std::fmt;

use mathex_ir::Operator;

#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    /// Numeric literal as written (`12`, `0.5`, `2E-3`).
    Number(String),
    /// Letter run that may still be split into single-letter symbols.
    Ident(String),
    /// Symbol that is never split (Greek names, `\mathrm{..}` atoms).
    Atom(String),
    /// Builtin function name.
    Func(String),
    /// `$name` reference, stored without the dollar sign.
    Reference(String),
    Infinity,

    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Underscore,
    Prime,
    Bang,
    Percent,
    Degree,
    Dollar,
    Comma,

    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LAngle,
    RAngle,
    Pipe,
    /// TeX `{`: invisible grouping.
    GroupOpen,
    GroupClose,

    /// Comparison (`<`, `le`, `=`, ...).
    Rel(Operator),
    /// Implication-level connective.
    Connective(Operator),
    And,
    Or,
    Not,
    Perp,
    Parallel,

    Frac,
    Sqrt,
    Vec,
    Overline,
    Integral,
    Begin(String),
    End(String),
    RowSep,
    ColSep,

    /// Anything the lexer could not classify; the grammar turns it into a
    /// blank and reports it.
    Unknown(String),
}

impl Tok {
    /// Tokens that may open an operand, and therefore continue an implicit
    /// product.
    pub fn starts_operand(&self) -> bool {
        matches!(
            self,
            Tok::Number(_)
                | Tok::Ident(_)
                | Tok::Atom(_)
                | Tok::Func(_)
                | Tok::Reference(_)
                | Tok::Infinity
                | Tok::Dollar
                | Tok::LParen
                | Tok::LBracket
                | Tok::LBrace
                | Tok::LAngle
                | Tok::Pipe
                | Tok::GroupOpen
                | Tok::Frac
                | Tok::Sqrt
                | Tok::Vec
                | Tok::Overline
                | Tok::Integral
                | Tok::Begin(_)
                | Tok::Unknown(_)
        )
    }
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tok::Number(text) | Tok::Ident(text) | Tok::Atom(text) | Tok::Func(text) => {
                write!(f, "{}", text)
            }
            Tok::Reference(name) => write!(f, "${}", name),
            Tok::Unknown(text) => write!(f, "{}", text),
            Tok::Begin(env) => write!(f, "\\begin{{{}}}", env),
            Tok::End(env) => write!(f, "\\end{{{}}}", env),
            Tok::Rel(op) | Tok::Connective(op) => write!(f, "{:?}", op),
            other => write!(f, "{:?}", other),
        }
    }
}

/// A token with the byte offset it starts at and whether whitespace
/// preceded it.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub tok: Tok,
    pub offset: usize,
    pub spaced: bool,
}

impl Spanned {
    pub fn new(tok: Tok, offset: usize, spaced: bool) -> Self {
        Self {
            tok,
            offset,
            spaced,
        }
    }
}

/// Operator characters understood by both front ends.
pub fn unicode_operator(c: char) -> Option<Tok> {
    let tok = match c {
        '≤' => Tok::Rel(Operator::LessEqual),
        '≥' => Tok::Rel(Operator::GreaterEqual),
        '≠' => Tok::Rel(Operator::NotEqual),
        '⇒' => Tok::Connective(Operator::Implies),
        '⇐' => Tok::Connective(Operator::ImpliedBy),
        '⇔' => Tok::Connective(Operator::Iff),
        '→' => Tok::Connective(Operator::RightArrow),
        '←' => Tok::Connective(Operator::LeftArrow),
        '↔' => Tok::Connective(Operator::LeftRightArrow),
        '⊥' => Tok::Perp,
        '∥' => Tok::Parallel,
        '¬' => Tok::Not,
        '∧' => Tok::And,
        '∨' => Tok::Or,
        '·' | '×' | '⋅' => Tok::Star,
        '÷' => Tok::Slash,
        '−' => Tok::Minus,
        '∞' => Tok::Infinity,
        'π' => Tok::Atom("pi".to_string()),
        '√' => Tok::Func("sqrt".to_string()),
        '⟨' => Tok::LAngle,
        '⟩' => Tok::RAngle,
        '°' => Tok::Degree,
        _ => return None,
    };
    Some(tok)
}

/// Digit value of a Unicode superscript character, or `-` for `⁻`.
pub fn superscript_char(c: char) -> Option<char> {
    Some(match c {
        '⁰' => '0',
        '¹' => '1',
        '²' => '2',
        '³' => '3',
        '⁴' => '4',
        '⁵' => '5',
        '⁶' => '6',
        '⁷' => '7',
        '⁸' => '8',
        '⁹' => '9',
        '⁻' => '-',
        _ => return None,
    })
}

/// Digit value of a Unicode subscript character.
pub fn subscript_char(c: char) -> Option<char> {
    Some(match c {
        '₀' => '0',
        '₁' => '1',
        '₂' => '2',
        '₃' => '3',
        '₄' => '4',
        '₅' => '5',
        '₆' => '6',
        '₇' => '7',
        '₈' => '8',
        '₉' => '9',
        _ => return None,
    })
}
