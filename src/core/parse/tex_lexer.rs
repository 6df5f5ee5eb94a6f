//! TeX lexer.
//!
//! Converts a LaTeX math string into raw TeX tokens tagged with their byte
//! offsets. This follows standard TeX tokenization rules:
//! - Control sequence recognition
//! - Comment handling
//! - Space swallowing after alphabetic control sequences

use super::tex_token::TexToken;

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    /// Track if we just emitted a control sequence (for space swallowing)
    after_cs: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            chars: input.char_indices().peekable(),
            after_cs: false,
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn next_char(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    /// Read a control sequence name (letters only, or single non-letter)
    fn read_control_seq(&mut self) -> String {
        let mut name = String::new();

        if let Some(c) = self.peek_char() {
            if c.is_ascii_alphabetic() {
                while let Some(c) = self.peek_char() {
                    if c.is_ascii_alphabetic() {
                        name.push(c);
                        self.next_char();
                    } else {
                        break;
                    }
                }
                // TeX swallows spaces after alphabetic control sequences
                self.after_cs = true;
            } else {
                // Single non-letter control sequence like \% \{ \,
                name.push(c);
                self.next_char();
            }
        }

        name
    }

    fn read_comment(&mut self) -> String {
        let mut comment = String::new();
        while let Some(c) = self.peek_char() {
            if c == '\n' || c == '\r' {
                break;
            }
            comment.push(c);
            self.next_char();
        }
        comment
    }

    fn next_token(&mut self) -> Option<(usize, TexToken)> {
        if self.after_cs {
            self.skip_whitespace();
            self.after_cs = false;
        }

        let (offset, c) = self.next_char()?;

        let token = match c {
            '\\' => {
                let name = self.read_control_seq();
                if name.is_empty() {
                    // Lone backslash at end of input
                    TexToken::Char('\\')
                } else {
                    TexToken::ControlSeq(name)
                }
            }
            '{' => TexToken::BeginGroup,
            '}' => TexToken::EndGroup,
            '%' => TexToken::Comment(self.read_comment()),
            '$' => TexToken::MathShift,
            '&' => TexToken::AlignTab,
            '^' => TexToken::Superscript,
            '_' => TexToken::Subscript,
            '~' => TexToken::Space,
            c if c.is_whitespace() => {
                self.skip_whitespace();
                TexToken::Space
            }
            _ => TexToken::Char(c),
        };

        Some((offset, token))
    }
}

impl Iterator for Lexer<'_> {
    type Item = (usize, TexToken);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Convenience function to tokenize a string
pub fn tokenize(input: &str) -> Vec<(usize, TexToken)> {
    Lexer::new(input).collect()
}
