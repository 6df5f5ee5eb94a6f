//! Raw TeX tokens, before they are lowered to the shared math token stream.

use std::fmt;

/// The smallest unit of TeX input.
///
/// Braces stay separate tokens so that command arguments (`\frac{a}{b}`)
/// can be read as groups rather than as characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TexToken {
    /// A control sequence like `\frac`. The name excludes the backslash.
    ControlSeq(String),
    /// `{`
    BeginGroup,
    /// `}`
    EndGroup,
    Char(char),
    /// Whitespace run, normalized to a single token.
    Space,
    /// `%` to end of line.
    Comment(String),
    /// `$`
    MathShift,
    /// `&`
    AlignTab,
    /// `^`
    Superscript,
    /// `_`
    Subscript,
}

impl TexToken {
    pub fn is_space(&self) -> bool {
        matches!(self, TexToken::Space | TexToken::Comment(_))
    }

    /// Returns the control sequence name if this is a ControlSeq token
    pub fn as_control_seq(&self) -> Option<&str> {
        match self {
            TexToken::ControlSeq(name) => Some(name),
            _ => None,
        }
    }

    /// Check if this is a specific control sequence
    pub fn is_cs(&self, name: &str) -> bool {
        matches!(self, TexToken::ControlSeq(n) if n == name)
    }
}

impl fmt::Display for TexToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TexToken::ControlSeq(name) => write!(f, "\\{}", name),
            TexToken::BeginGroup => write!(f, "{{"),
            TexToken::EndGroup => write!(f, "}}"),
            TexToken::Char(c) => write!(f, "{}", c),
            TexToken::Space => write!(f, " "),
            TexToken::Comment(text) => write!(f, "%{}", text),
            TexToken::MathShift => write!(f, "$"),
            TexToken::AlignTab => write!(f, "&"),
            TexToken::Superscript => write!(f, "^"),
            TexToken::Subscript => write!(f, "_"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_display() {
        assert_eq!(format!("{}", TexToken::ControlSeq("frac".into())), "\\frac");
        assert_eq!(format!("{}", TexToken::BeginGroup), "{");
        assert_eq!(format!("{}", TexToken::EndGroup), "}");
        assert_eq!(format!("{}", TexToken::Char('x')), "x");
        assert_eq!(format!("{}", TexToken::AlignTab), "&");
    }

    #[test]
    fn control_sequence_queries() {
        let token = TexToken::ControlSeq("sqrt".into());
        assert!(token.is_cs("sqrt"));
        assert_eq!(token.as_control_seq(), Some("sqrt"));
        assert!(TexToken::Comment("note".into()).is_space());
    }
}
