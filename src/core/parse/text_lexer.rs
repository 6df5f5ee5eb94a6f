//! Lexer for plain-text math input (`2x^2 + sin(x) <= 3`).

use lazy_static::lazy_static;
use log::trace;
use mathex_ir::names::{is_builtin_function, is_greek, UNICODE_GREEK};
use mathex_ir::Operator;
use phf::phf_map;
use regex::Regex;

use super::token::{subscript_char, superscript_char, unicode_operator, Spanned, Tok};
use super::ParseOptions;

lazy_static! {
    static ref NUMBER: Regex = Regex::new(r"^(?:\d+(?:\.\d*)?|\.\d+)").unwrap();
    static ref SCI_NUMBER: Regex =
        Regex::new(r"^(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").unwrap();
    static ref IDENT: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9]*").unwrap();
}

#[derive(Debug, Clone, Copy)]
enum Keyword {
    And,
    Or,
    Not,
    Implies,
    ImpliedBy,
    Iff,
    RightArrow,
    LeftArrow,
    LeftRightArrow,
    Degree,
    Infinity,
    Perp,
    Parallel,
}

static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "and" => Keyword::And,
    "or" => Keyword::Or,
    "not" => Keyword::Not,
    "implies" => Keyword::Implies,
    "impliedby" => Keyword::ImpliedBy,
    "iff" => Keyword::Iff,
    "rightarrow" => Keyword::RightArrow,
    "leftarrow" => Keyword::LeftArrow,
    "leftrightarrow" => Keyword::LeftRightArrow,
    "deg" => Keyword::Degree,
    "infinity" => Keyword::Infinity,
    "infty" => Keyword::Infinity,
    "perp" => Keyword::Perp,
    "parallel" => Keyword::Parallel,
};

/// ASCII operators, longest spelling first.
static OPERATORS: &[(&str, Tok)] = &[
    ("<=>", Tok::Connective(Operator::Iff)),
    ("<->", Tok::Connective(Operator::LeftRightArrow)),
    ("&lt;", Tok::Rel(Operator::Less)),
    ("&gt;", Tok::Rel(Operator::Greater)),
    ("&le;", Tok::Rel(Operator::LessEqual)),
    ("&ge;", Tok::Rel(Operator::GreaterEqual)),
    ("&ne;", Tok::Rel(Operator::NotEqual)),
    ("<=", Tok::Rel(Operator::LessEqual)),
    (">=", Tok::Rel(Operator::GreaterEqual)),
    ("!=", Tok::Rel(Operator::NotEqual)),
    ("=>", Tok::Connective(Operator::Implies)),
    ("->", Tok::Connective(Operator::RightArrow)),
    ("**", Tok::Caret),
    ("+", Tok::Plus),
    ("-", Tok::Minus),
    ("*", Tok::Star),
    ("/", Tok::Slash),
    ("^", Tok::Caret),
    ("_", Tok::Underscore),
    ("'", Tok::Prime),
    ("!", Tok::Bang),
    ("%", Tok::Percent),
    (",", Tok::Comma),
    ("(", Tok::LParen),
    (")", Tok::RParen),
    ("[", Tok::LBracket),
    ("]", Tok::RBracket),
    ("{", Tok::LBrace),
    ("}", Tok::RBrace),
    ("|", Tok::Pipe),
    ("=", Tok::Rel(Operator::Equal)),
    ("<", Tok::Rel(Operator::Less)),
    (">", Tok::Rel(Operator::Greater)),
];

pub fn lex_text(input: &str, options: &ParseOptions) -> Vec<Spanned> {
    let number: &Regex = if options.parse_scientific_notation {
        &*SCI_NUMBER
    } else {
        &*NUMBER
    };
    let mut out = Vec::new();
    let mut pos = 0;
    let mut spaced = false;

    while let Some(c) = input[pos..].chars().next() {
        let rest = &input[pos..];
        if c.is_whitespace() {
            spaced = true;
            pos += c.len_utf8();
            continue;
        }

        if superscript_char(c).is_some() || subscript_char(c).is_some() {
            pos += lex_unicode_script(rest, pos, spaced, &mut out);
            spaced = false;
            continue;
        }

        let (tok, len) = if let Some(m) = number.find(rest) {
            (Tok::Number(m.as_str().to_string()), m.end())
        } else if c == '$' {
            match IDENT.find(&rest[1..]) {
                Some(m) => (Tok::Reference(m.as_str().to_string()), 1 + m.end()),
                None => (Tok::Dollar, 1),
            }
        } else if let Some(m) = IDENT.find(rest) {
            (classify_word(m.as_str()), m.end())
        } else if let Some((spelling, tok)) = OPERATORS.iter().find(|(s, _)| rest.starts_with(s))
        {
            (tok.clone(), spelling.len())
        } else if let Some(name) = UNICODE_GREEK.get(&c) {
            (Tok::Atom(name.to_string()), c.len_utf8())
        } else if let Some(tok) = unicode_operator(c) {
            (tok, c.len_utf8())
        } else {
            (Tok::Unknown(c.to_string()), c.len_utf8())
        };

        out.push(Spanned::new(tok, pos, spaced));
        spaced = false;
        pos += len;
    }

    trace!("text lexer produced {} tokens", out.len());
    out
}

fn classify_word(word: &str) -> Tok {
    if let Some(keyword) = KEYWORDS.get(word) {
        return match keyword {
            Keyword::And => Tok::And,
            Keyword::Or => Tok::Or,
            Keyword::Not => Tok::Not,
            Keyword::Implies => Tok::Connective(Operator::Implies),
            Keyword::ImpliedBy => Tok::Connective(Operator::ImpliedBy),
            Keyword::Iff => Tok::Connective(Operator::Iff),
            Keyword::RightArrow => Tok::Connective(Operator::RightArrow),
            Keyword::LeftArrow => Tok::Connective(Operator::LeftArrow),
            Keyword::LeftRightArrow => Tok::Connective(Operator::LeftRightArrow),
            Keyword::Degree => Tok::Degree,
            Keyword::Infinity => Tok::Infinity,
            Keyword::Perp => Tok::Perp,
            Keyword::Parallel => Tok::Parallel,
        };
    }
    if is_builtin_function(word) {
        Tok::Func(word.to_string())
    } else if is_greek(word) {
        Tok::Atom(word.to_string())
    } else {
        Tok::Ident(word.to_string())
    }
}

/// `x²` lexes as `x ^ 2`, `x₁` as `x _ 1`. Returns the bytes consumed.
fn lex_unicode_script(rest: &str, offset: usize, spaced: bool, out: &mut Vec<Spanned>) -> usize {
    let superscript = rest.chars().next().and_then(superscript_char).is_some();
    let lookup: fn(char) -> Option<char> = if superscript {
        superscript_char
    } else {
        subscript_char
    };
    out.push(Spanned::new(
        if superscript { Tok::Caret } else { Tok::Underscore },
        offset,
        spaced,
    ));

    let mut consumed = 0;
    let mut digits = String::new();
    let mut digits_at = offset;
    for c in rest.chars() {
        let Some(mapped) = lookup(c) else { break };
        if mapped == '-' {
            if !digits.is_empty() {
                out.push(Spanned::new(
                    Tok::Number(std::mem::take(&mut digits)),
                    digits_at,
                    false,
                ));
            }
            out.push(Spanned::new(Tok::Minus, offset + consumed, false));
        } else {
            if digits.is_empty() {
                digits_at = offset + consumed;
            }
            digits.push(mapped);
        }
        consumed += c.len_utf8();
    }
    if !digits.is_empty() {
        out.push(Spanned::new(Tok::Number(digits), digits_at, false));
    }
    consumed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(input: &str) -> Vec<Tok> {
        lex_text(input, &ParseOptions::default())
            .into_iter()
            .map(|s| s.tok)
            .collect()
    }

    #[test]
    fn longest_operator_wins() {
        assert_eq!(
            toks("a<=>b"),
            vec![
                Tok::Ident("a".into()),
                Tok::Connective(Operator::Iff),
                Tok::Ident("b".into())
            ]
        );
        assert_eq!(toks("x&le;1")[1], Tok::Rel(Operator::LessEqual));
        assert_eq!(toks("x<-1")[1], Tok::Rel(Operator::Less));
    }

    #[test]
    fn arrow_words_are_connectives() {
        for (word, op) in [
            ("rightarrow", Operator::RightArrow),
            ("leftarrow", Operator::LeftArrow),
            ("leftrightarrow", Operator::LeftRightArrow),
        ] {
            assert_eq!(
                toks(&format!("a {} b", word)),
                vec![
                    Tok::Ident("a".into()),
                    Tok::Connective(op),
                    Tok::Ident("b".into())
                ],
                "{}",
                word
            );
        }
    }

    #[test]
    fn scientific_notation_is_opt_in() {
        assert_eq!(
            toks("2E3"),
            vec![Tok::Number("2".into()), Tok::Ident("E3".into())]
        );
        let sci = ParseOptions {
            parse_scientific_notation: true,
            ..ParseOptions::default()
        };
        let lexed: Vec<Tok> = lex_text("2E+3", &sci).into_iter().map(|s| s.tok).collect();
        assert_eq!(lexed, vec![Tok::Number("2E+3".into())]);
    }

    #[test]
    fn words_are_classified() {
        assert_eq!(
            toks("sin alpha xy and $f $"),
            vec![
                Tok::Func("sin".into()),
                Tok::Atom("alpha".into()),
                Tok::Ident("xy".into()),
                Tok::And,
                Tok::Reference("f".into()),
                Tok::Dollar,
            ]
        );
    }

    #[test]
    fn unicode_scripts() {
        assert_eq!(
            toks("x²"),
            vec![Tok::Ident("x".into()), Tok::Caret, Tok::Number("2".into())]
        );
        assert_eq!(
            toks("x⁻¹"),
            vec![
                Tok::Ident("x".into()),
                Tok::Caret,
                Tok::Minus,
                Tok::Number("1".into())
            ]
        );
        assert_eq!(
            toks("a₁₂"),
            vec![Tok::Ident("a".into()), Tok::Underscore, Tok::Number("12".into())]
        );
    }

    #[test]
    fn spacing_is_recorded() {
        let lexed = lex_text("f (x)", &ParseOptions::default());
        assert!(!lexed[0].spaced);
        assert!(lexed[1].spaced);
        assert_eq!(lexed[1].offset, 2);
    }
}
