//! Lowers raw TeX tokens to the shared math token stream.

use log::trace;
use mathex_ir::names::{is_builtin_function, is_greek, UNICODE_GREEK};
use mathex_ir::Operator;
use phf::phf_map;

use super::tex_lexer::tokenize;
use super::tex_token::TexToken;
use super::token::{unicode_operator, Spanned, Tok};
use super::ParseOptions;

#[derive(Debug, Clone)]
enum Command {
    Token(Tok),
    /// Spacing and display-style switches.
    Skip,
    /// `\left`, `\right` and sizing commands: the delimiter that follows is
    /// lexed as usual, `.` is dropped.
    Delimiter,
    /// Font switches: the argument stays as a plain group.
    Style,
    /// `\operatorname{..}` and friends: the argument is one unsplittable name.
    Word,
    Begin,
    End,
}

static COMMANDS: phf::Map<&'static str, Command> = phf_map! {
    "frac" => Command::Token(Tok::Frac),
    "dfrac" => Command::Token(Tok::Frac),
    "tfrac" => Command::Token(Tok::Frac),
    "sqrt" => Command::Token(Tok::Sqrt),
    "cdot" => Command::Token(Tok::Star),
    "times" => Command::Token(Tok::Star),
    "ast" => Command::Token(Tok::Star),
    "div" => Command::Token(Tok::Slash),
    "lt" => Command::Token(Tok::Rel(Operator::Less)),
    "le" => Command::Token(Tok::Rel(Operator::LessEqual)),
    "leq" => Command::Token(Tok::Rel(Operator::LessEqual)),
    "leqslant" => Command::Token(Tok::Rel(Operator::LessEqual)),
    "gt" => Command::Token(Tok::Rel(Operator::Greater)),
    "ge" => Command::Token(Tok::Rel(Operator::GreaterEqual)),
    "geq" => Command::Token(Tok::Rel(Operator::GreaterEqual)),
    "geqslant" => Command::Token(Tok::Rel(Operator::GreaterEqual)),
    "ne" => Command::Token(Tok::Rel(Operator::NotEqual)),
    "neq" => Command::Token(Tok::Rel(Operator::NotEqual)),
    "implies" => Command::Token(Tok::Connective(Operator::Implies)),
    "Rightarrow" => Command::Token(Tok::Connective(Operator::Implies)),
    "Longrightarrow" => Command::Token(Tok::Connective(Operator::Implies)),
    "impliedby" => Command::Token(Tok::Connective(Operator::ImpliedBy)),
    "Leftarrow" => Command::Token(Tok::Connective(Operator::ImpliedBy)),
    "Longleftarrow" => Command::Token(Tok::Connective(Operator::ImpliedBy)),
    "iff" => Command::Token(Tok::Connective(Operator::Iff)),
    "Leftrightarrow" => Command::Token(Tok::Connective(Operator::Iff)),
    "Longleftrightarrow" => Command::Token(Tok::Connective(Operator::Iff)),
    "to" => Command::Token(Tok::Connective(Operator::RightArrow)),
    "rightarrow" => Command::Token(Tok::Connective(Operator::RightArrow)),
    "leftarrow" => Command::Token(Tok::Connective(Operator::LeftArrow)),
    "gets" => Command::Token(Tok::Connective(Operator::LeftArrow)),
    "leftrightarrow" => Command::Token(Tok::Connective(Operator::LeftRightArrow)),
    "lnot" => Command::Token(Tok::Not),
    "neg" => Command::Token(Tok::Not),
    "land" => Command::Token(Tok::And),
    "wedge" => Command::Token(Tok::And),
    "lor" => Command::Token(Tok::Or),
    "vee" => Command::Token(Tok::Or),
    "perp" => Command::Token(Tok::Perp),
    "parallel" => Command::Token(Tok::Parallel),
    "infty" => Command::Token(Tok::Infinity),
    "vec" => Command::Token(Tok::Vec),
    "overline" => Command::Token(Tok::Overline),
    "int" => Command::Token(Tok::Integral),
    "langle" => Command::Token(Tok::LAngle),
    "rangle" => Command::Token(Tok::RAngle),
    "{" => Command::Token(Tok::LBrace),
    "}" => Command::Token(Tok::RBrace),
    "lvert" => Command::Token(Tok::Pipe),
    "rvert" => Command::Token(Tok::Pipe),
    "vert" => Command::Token(Tok::Pipe),
    "$" => Command::Token(Tok::Dollar),
    "%" => Command::Token(Tok::Percent),
    "degree" => Command::Token(Tok::Degree),
    "circ" => Command::Token(Tok::Degree),
    "left" => Command::Delimiter,
    "right" => Command::Delimiter,
    "big" => Command::Delimiter,
    "Big" => Command::Delimiter,
    "bigg" => Command::Delimiter,
    "Bigg" => Command::Delimiter,
    "bigl" => Command::Delimiter,
    "bigr" => Command::Delimiter,
    "Bigl" => Command::Delimiter,
    "Bigr" => Command::Delimiter,
    "," => Command::Skip,
    ";" => Command::Skip,
    ":" => Command::Skip,
    "!" => Command::Skip,
    " " => Command::Skip,
    "quad" => Command::Skip,
    "qquad" => Command::Skip,
    "displaystyle" => Command::Skip,
    "textstyle" => Command::Skip,
    "limits" => Command::Skip,
    "nolimits" => Command::Skip,
    "mathbf" => Command::Style,
    "mathit" => Command::Style,
    "mathsf" => Command::Style,
    "mathbb" => Command::Style,
    "mathcal" => Command::Style,
    "mathnormal" => Command::Style,
    "boldsymbol" => Command::Style,
    "bm" => Command::Style,
    "operatorname" => Command::Word,
    "mathrm" => Command::Word,
    "text" => Command::Word,
    "textrm" => Command::Word,
    "textit" => Command::Word,
    "mbox" => Command::Word,
    "begin" => Command::Begin,
    "end" => Command::End,
};

/// HTML-escaped relations, as pasted from web forms: `&le;` and friends.
static ENTITIES: phf::Map<&'static str, Operator> = phf_map! {
    "lt" => Operator::Less,
    "gt" => Operator::Greater,
    "le" => Operator::LessEqual,
    "ge" => Operator::GreaterEqual,
    "ne" => Operator::NotEqual,
};

pub fn lex_latex(input: &str, options: &ParseOptions) -> Vec<Spanned> {
    let mut lowering = Lowering {
        raw: tokenize(input),
        pos: 0,
        out: Vec::new(),
        spaced: false,
        after_delimiter: false,
        scientific: options.parse_scientific_notation,
    };
    lowering.run();
    trace!("latex lexer produced {} tokens", lowering.out.len());
    lowering.out
}

struct Lowering {
    raw: Vec<(usize, TexToken)>,
    pos: usize,
    out: Vec<Spanned>,
    spaced: bool,
    after_delimiter: bool,
    scientific: bool,
}

impl Lowering {
    fn peek(&self) -> Option<&TexToken> {
        self.raw.get(self.pos).map(|(_, t)| t)
    }

    fn peek_char(&self, ahead: usize) -> Option<char> {
        match self.raw.get(self.pos + ahead) {
            Some((_, TexToken::Char(c))) => Some(*c),
            _ => None,
        }
    }

    fn emit(&mut self, tok: Tok, offset: usize) {
        self.out.push(Spanned::new(tok, offset, self.spaced));
        self.spaced = false;
    }

    fn run(&mut self) {
        while let Some((offset, token)) = self.raw.get(self.pos).cloned() {
            self.pos += 1;
            let after_delimiter = std::mem::take(&mut self.after_delimiter);
            match token {
                TexToken::Space | TexToken::Comment(_) => self.spaced = true,
                TexToken::MathShift => {}
                TexToken::BeginGroup => self.emit(Tok::GroupOpen, offset),
                TexToken::EndGroup => self.emit(Tok::GroupClose, offset),
                TexToken::AlignTab => match self.take_entity() {
                    Some(op) => self.emit(Tok::Rel(op), offset),
                    None => self.emit(Tok::ColSep, offset),
                },
                TexToken::Subscript => self.emit(Tok::Underscore, offset),
                TexToken::Superscript => {
                    if self.take_degree_script() {
                        self.emit(Tok::Degree, offset);
                    } else {
                        self.emit(Tok::Caret, offset);
                    }
                }
                TexToken::Char('.') if after_delimiter => {}
                TexToken::Char(c) => self.char_token(c, offset),
                TexToken::ControlSeq(name) => self.command(&name, offset),
            }
        }
    }

    /// After `&`: consumes `le;` and the like, leaving column separators alone.
    fn take_entity(&mut self) -> Option<Operator> {
        let name: String = (0..2).map_while(|i| self.peek_char(i)).collect();
        let op = ENTITIES.get(name.as_str()).copied()?;
        if self.peek_char(2) != Some(';') {
            return None;
        }
        self.pos += 3;
        Some(op)
    }

    /// `^\circ` and `^{\circ}` are degree marks, not powers.
    fn take_degree_script(&mut self) -> bool {
        match (self.peek(), self.raw.get(self.pos + 1).map(|(_, t)| t)) {
            (Some(t), _) if t.is_cs("circ") => {
                self.pos += 1;
                true
            }
            (Some(TexToken::BeginGroup), Some(t)) if t.is_cs("circ") => {
                if matches!(self.raw.get(self.pos + 2), Some((_, TexToken::EndGroup))) {
                    self.pos += 3;
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    fn char_token(&mut self, c: char, offset: usize) {
        if c.is_ascii_digit() || (c == '.' && self.peek_char(0).is_some_and(|n| n.is_ascii_digit()))
        {
            let text = self.read_number(c);
            self.emit(Tok::Number(text), offset);
            return;
        }
        if c.is_ascii_alphabetic() {
            let mut word = c.to_string();
            while let Some(n) = self.peek_char(0).filter(|n| n.is_ascii_alphanumeric()) {
                word.push(n);
                self.pos += 1;
            }
            self.emit(Tok::Ident(word), offset);
            return;
        }
        let tok = match c {
            '+' => Tok::Plus,
            '-' => Tok::Minus,
            '*' => Tok::Star,
            '/' => Tok::Slash,
            '=' => Tok::Rel(Operator::Equal),
            '<' => Tok::Rel(Operator::Less),
            '>' => Tok::Rel(Operator::Greater),
            '(' => Tok::LParen,
            ')' => Tok::RParen,
            '[' => Tok::LBracket,
            ']' => Tok::RBracket,
            ',' => Tok::Comma,
            '|' => Tok::Pipe,
            '!' => Tok::Bang,
            '\'' => Tok::Prime,
            other => match UNICODE_GREEK.get(&other) {
                Some(name) => Tok::Atom(name.to_string()),
                None => unicode_operator(other).unwrap_or_else(|| Tok::Unknown(other.to_string())),
            },
        };
        self.emit(tok, offset);
    }

    fn read_number(&mut self, first: char) -> String {
        let mut text = first.to_string();
        let mut seen_dot = first == '.';
        while let Some(c) = self.peek_char(0) {
            if c.is_ascii_digit() || (c == '.' && !seen_dot) {
                seen_dot |= c == '.';
                text.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.scientific && matches!(self.peek_char(0), Some('e' | 'E')) {
            let sign = matches!(self.peek_char(1), Some('+' | '-'));
            let digits_at = if sign { 2 } else { 1 };
            if self.peek_char(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digits_at {
                    if let Some(c) = self.peek_char(0) {
                        text.push(c);
                        self.pos += 1;
                    }
                }
                while let Some(c) = self.peek_char(0).filter(|c| c.is_ascii_digit()) {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }
        text
    }

    fn command(&mut self, name: &str, offset: usize) {
        if name == "\\" {
            self.emit(Tok::RowSep, offset);
            return;
        }
        match COMMANDS.get(name) {
            Some(Command::Token(tok)) => self.emit(tok.clone(), offset),
            Some(Command::Skip) => self.spaced = true,
            Some(Command::Delimiter) => self.after_delimiter = true,
            Some(Command::Style) => {}
            Some(Command::Word) => {
                let word = self.read_group_text();
                if word.is_empty() {
                    return;
                }
                if is_builtin_function(&word) {
                    self.emit(Tok::Func(word), offset);
                } else {
                    self.emit(Tok::Atom(word), offset);
                }
            }
            Some(Command::Begin) => {
                let env = self.read_group_text();
                if env == "array" {
                    // column specification
                    self.read_group_text();
                }
                self.emit(Tok::Begin(env), offset);
            }
            Some(Command::End) => {
                let env = self.read_group_text();
                self.emit(Tok::End(env), offset);
            }
            None if is_greek(name) => self.emit(Tok::Atom(name.to_string()), offset),
            None if is_builtin_function(name) => self.emit(Tok::Func(name.to_string()), offset),
            None => self.emit(Tok::Unknown(format!("\\{}", name)), offset),
        }
    }

    /// Raw text of the `{..}` argument that follows (or of a single
    /// character argument).
    fn read_group_text(&mut self) -> String {
        while self.peek().is_some_and(TexToken::is_space) {
            self.pos += 1;
        }
        match self.peek() {
            Some(TexToken::BeginGroup) => {
                self.pos += 1;
                let mut depth = 1usize;
                let mut text = String::new();
                while let Some((_, token)) = self.raw.get(self.pos) {
                    self.pos += 1;
                    match token {
                        TexToken::BeginGroup => depth += 1,
                        TexToken::EndGroup => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        other => text.push_str(&other.to_string()),
                    }
                }
                text.trim().to_string()
            }
            Some(TexToken::Char(c)) => {
                let c = *c;
                self.pos += 1;
                c.to_string()
            }
            _ => String::new(),
        }
    }
}
