//! Recursive-descent grammar over the shared token stream.
//!
//! Precedence, lowest first: top-level `,`; connectives (`implies`, arrows);
//! `or`; `and`; `not`; comparisons with `perp` and `parallel`; `+ -`; unary
//! minus; `* /` and juxtaposition; `^` (right associative); postfix `_ ' ! %
//! deg`; primaries.
//!
//! Identifier splitting happens at the token level: `xy^2` reads as the two
//! operands `x` and `y^2`, so postfix operators, powers and calls attach to
//! the last piece only.

use log::{debug, trace};
use mathex_ir::names::is_greek;
use mathex_ir::{Aggregate, AggregateKind, Expr, Operator};

use super::split::split_symbol;
use super::token::{Spanned, Tok};
use super::{IssueKind, ParseIssue, ParseOptions, Syntax};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bracket {
    Paren,
    Square,
}

pub(super) struct Parser<'a> {
    tokens: Vec<Spanned>,
    pos: usize,
    syntax: Syntax,
    options: &'a ParseOptions,
    issues: Vec<ParseIssue>,
    /// Open `|...|` pairs; a `|` in operator position closes one.
    abs_depth: usize,
    /// Non-zero inside subscripts, whose identifiers are never split.
    atomic: usize,
    end: usize,
}

impl<'a> Parser<'a> {
    pub(super) fn new(
        tokens: Vec<Spanned>,
        syntax: Syntax,
        options: &'a ParseOptions,
        end: usize,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            syntax,
            options,
            issues: Vec::new(),
            abs_depth: 0,
            atomic: 0,
            end,
        }
    }

    pub(super) fn parse(mut self) -> (Expr, Vec<ParseIssue>) {
        if self.tokens.is_empty() {
            return (Expr::Blank, self.issues);
        }
        trace!("parsing {} tokens", self.tokens.len());
        let first = self.list();
        if self.at_end() {
            return (first, self.issues);
        }

        // Trailing junk: report it and keep whatever can still be read.
        let mut factors = vec![first];
        while !self.at_end() {
            self.unexpected();
            factors.push(Expr::Blank);
            if self.starts_expression() {
                factors.push(self.list());
            }
        }
        (Expr::mul(factors), self.issues)
    }

    // ---- token helpers -------------------------------------------------

    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|s| &s.tok)
    }

    fn peek_spanned(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn at(&self, tok: &Tok) -> bool {
        self.peek() == Some(tok)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn bump(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.at(tok) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn offset(&self) -> usize {
        self.peek_spanned().map_or(self.end, |s| s.offset)
    }

    fn starts_expression(&self) -> bool {
        self.peek().is_some_and(|t| {
            t.starts_operand() || matches!(t, Tok::Minus | Tok::Plus | Tok::Not)
        })
    }

    fn issue(&mut self, kind: IssueKind, offset: usize, message: String) {
        debug!("parse issue at {}: {}", offset, message);
        self.issues.push(ParseIssue {
            kind,
            offset,
            message,
        });
    }

    fn missing_operand(&mut self) -> Expr {
        let message = match self.peek() {
            Some(tok) => format!("expected an operand before '{}'", tok),
            None => "expected an operand at end of input".to_string(),
        };
        self.issue(IssueKind::MissingOperand, self.offset(), message);
        Expr::Blank
    }

    fn unexpected(&mut self) {
        if let Some(spanned) = self.peek_spanned() {
            let message = format!("unexpected '{}'", spanned.tok);
            let offset = spanned.offset;
            self.issue(IssueKind::UnexpectedToken, offset, message);
        }
        self.bump();
    }

    fn expect_close(&mut self, close: &Tok, open_offset: usize, label: &str) {
        if !self.eat(close) {
            self.issue(
                IssueKind::Unclosed,
                open_offset,
                format!("'{}' is never closed", label),
            );
        }
    }

    // ---- precedence levels ---------------------------------------------

    fn list(&mut self) -> Expr {
        let first = self.connective();
        if !self.at(&Tok::Comma) {
            return first;
        }
        let mut entries = vec![first];
        while self.eat(&Tok::Comma) {
            entries.push(self.connective());
        }
        Expr::aggregate(AggregateKind::List, entries)
    }

    fn connective(&mut self) -> Expr {
        let mut left = self.disjunction();
        while let Some(Tok::Connective(op)) = self.peek() {
            let op = *op;
            self.bump();
            let right = self.disjunction();
            left = Expr::apply(op, vec![left, right]);
        }
        left
    }

    fn disjunction(&mut self) -> Expr {
        let mut left = self.conjunction();
        while self.eat(&Tok::Or) {
            let right = self.conjunction();
            left = Expr::apply(Operator::Or, vec![left, right]);
        }
        left
    }

    fn conjunction(&mut self) -> Expr {
        let mut left = self.negation();
        while self.eat(&Tok::And) {
            let right = self.negation();
            left = Expr::apply(Operator::And, vec![left, right]);
        }
        left
    }

    fn negation(&mut self) -> Expr {
        if self.eat(&Tok::Not) {
            let inner = self.negation();
            return Expr::apply(Operator::Not, vec![inner]);
        }
        self.relation()
    }

    fn relation(&mut self) -> Expr {
        let mut left = self.additive();
        loop {
            let op = match self.peek() {
                Some(Tok::Rel(op)) => *op,
                Some(Tok::Perp) => Operator::Perp,
                Some(Tok::Parallel) => Operator::Parallel,
                _ => break,
            };
            self.bump();
            let right = self.additive();
            left = Expr::apply(op, vec![left, right]);
        }
        left
    }

    fn additive(&mut self) -> Expr {
        let mut terms = vec![self.unary()];
        loop {
            if self.eat(&Tok::Plus) {
                terms.push(self.unary());
            } else if self.eat(&Tok::Minus) {
                let term = self.unary();
                terms.push(Expr::neg(term));
            } else {
                break;
            }
        }
        single_or(terms, Expr::add)
    }

    fn unary(&mut self) -> Expr {
        if self.eat(&Tok::Minus) {
            let inner = self.unary();
            return Expr::neg(inner);
        }
        if self.eat(&Tok::Plus) {
            return self.unary();
        }
        self.multiplicative()
    }

    fn multiplicative(&mut self) -> Expr {
        let mut factors = self.power_pieces();
        loop {
            match self.peek() {
                Some(Tok::Star) => {
                    self.bump();
                    let pieces = self.signed_pieces();
                    factors.extend(pieces);
                }
                Some(Tok::Slash) => {
                    self.bump();
                    let mut pieces = self.signed_pieces().into_iter();
                    let den = pieces.next().unwrap_or(Expr::Blank);
                    let num = single_or(std::mem::take(&mut factors), Expr::mul);
                    factors.push(Expr::div(num, den));
                    factors.extend(pieces);
                }
                Some(Tok::Pipe) if self.abs_depth > 0 => break,
                Some(tok) if tok.starts_operand() => {
                    let pieces = self.power_pieces();
                    factors.extend(pieces);
                }
                _ => break,
            }
        }
        single_or(factors, Expr::mul)
    }

    /// Operand after an explicit `*` or `/`, which may carry its own sign.
    fn signed_pieces(&mut self) -> Vec<Expr> {
        if self.eat(&Tok::Minus) {
            let mut pieces = self.signed_pieces();
            negate_first(&mut pieces);
            return pieces;
        }
        if self.eat(&Tok::Plus) {
            return self.signed_pieces();
        }
        self.power_pieces()
    }

    fn power_pieces(&mut self) -> Vec<Expr> {
        let mut pieces = self.postfix_pieces();
        if self.eat(&Tok::Caret) {
            let mut exponent = self.exponent_pieces().into_iter();
            let base = pieces.pop().unwrap_or(Expr::Blank);
            let first = exponent.next().unwrap_or(Expr::Blank);
            pieces.push(Expr::pow(base, first));
            pieces.extend(exponent);
        }
        pieces
    }

    fn exponent_pieces(&mut self) -> Vec<Expr> {
        if self.eat(&Tok::Minus) {
            let mut pieces = self.exponent_pieces();
            negate_first(&mut pieces);
            return pieces;
        }
        match self.syntax {
            Syntax::Latex => {
                let arg = self.tex_argument();
                if self.eat(&Tok::Caret) {
                    let mut rest = self.exponent_pieces().into_iter();
                    let exp = rest.next().unwrap_or(Expr::Blank);
                    let mut pieces = vec![Expr::pow(arg, exp)];
                    pieces.extend(rest);
                    pieces
                } else {
                    vec![arg]
                }
            }
            Syntax::Text => self.power_pieces(),
        }
    }

    fn postfix_pieces(&mut self) -> Vec<Expr> {
        let mut pieces = self.primary_pieces();
        loop {
            let Some(spanned) = self.peek_spanned() else {
                break;
            };
            let adjacent = !spanned.spaced || self.syntax == Syntax::Latex;
            let tok = spanned.tok.clone();
            let last = pieces.pop().unwrap_or(Expr::Blank);
            let next = match tok {
                Tok::Underscore => {
                    self.bump();
                    let sub = self.subscript_argument();
                    Expr::apply(Operator::Subscript, vec![last, sub])
                }
                Tok::Prime => {
                    self.bump();
                    Expr::apply(Operator::Prime, vec![last])
                }
                Tok::Bang => {
                    self.bump();
                    Expr::func("factorial", vec![last])
                }
                Tok::Percent => {
                    self.bump();
                    Expr::apply(Operator::Unit, vec![last, Expr::symbol("%")])
                }
                Tok::Degree => {
                    self.bump();
                    Expr::apply(Operator::Unit, vec![last, Expr::symbol("deg")])
                }
                Tok::LParen if adjacent && is_callable(&last) => {
                    let args = self.call_args();
                    Expr::call(last, args)
                }
                _ => {
                    pieces.push(last);
                    break;
                }
            };
            pieces.push(next);
        }
        pieces
    }

    fn subscript_argument(&mut self) -> Expr {
        self.atomic += 1;
        let sub = match self.syntax {
            Syntax::Latex => self.tex_argument(),
            Syntax::Text => {
                let mut pieces = self.primary_pieces().into_iter();
                pieces.next().unwrap_or(Expr::Blank)
            }
        };
        self.atomic -= 1;
        sub
    }

    /// A TeX macro argument: a `{..}` group or a single token. Multi-digit
    /// numbers and letter runs give up only their first character, so
    /// `x^23` is `x^{2} 3`.
    fn tex_argument(&mut self) -> Expr {
        let Some(spanned) = self.peek_spanned().cloned() else {
            return self.missing_operand();
        };
        match spanned.tok {
            Tok::GroupOpen => {
                self.bump();
                let saved = std::mem::replace(&mut self.abs_depth, 0);
                let inner = if self.at(&Tok::GroupClose) {
                    Expr::Blank
                } else {
                    self.list()
                };
                self.abs_depth = saved;
                self.expect_close(&Tok::GroupClose, spanned.offset, "{");
                inner
            }
            Tok::Number(text) if text.len() > 1 && text.starts_with(|c: char| c.is_ascii_digit()) => {
                let (head, tail) = text.split_at(1);
                self.tokens[self.pos] =
                    Spanned::new(Tok::Number(tail.to_string()), spanned.offset + 1, false);
                number_leaf(head)
            }
            Tok::Ident(text) if text.chars().count() > 1 => {
                let head_len = text.chars().next().map_or(0, char::len_utf8);
                let (head, tail) = text.split_at(head_len);
                let rest = if tail.starts_with(|c: char| c.is_ascii_digit()) {
                    Tok::Number(tail.to_string())
                } else {
                    Tok::Ident(tail.to_string())
                };
                self.tokens[self.pos] = Spanned::new(rest, spanned.offset + head_len, false);
                Expr::symbol(head)
            }
            _ => {
                let pieces = self.primary_pieces();
                single_or(pieces, Expr::mul)
            }
        }
    }

    fn call_args(&mut self) -> Vec<Expr> {
        let open = self.offset();
        self.bump();
        let args = self.entries(&[Tok::RParen]);
        self.expect_close(&Tok::RParen, open, "(");
        args
    }

    /// Comma-separated entries up to (not including) one of `closers`.
    fn entries(&mut self, closers: &[Tok]) -> Vec<Expr> {
        let saved = std::mem::replace(&mut self.abs_depth, 0);
        let mut entries = Vec::new();
        if !self.peek().is_some_and(|t| closers.contains(t)) {
            loop {
                entries.push(self.connective());
                if !self.eat(&Tok::Comma) {
                    break;
                }
            }
        }
        self.abs_depth = saved;
        entries
    }

    // ---- primaries -----------------------------------------------------

    fn primary_pieces(&mut self) -> Vec<Expr> {
        let Some(spanned) = self.peek_spanned().cloned() else {
            return vec![self.missing_operand()];
        };
        let offset = spanned.offset;
        match spanned.tok {
            Tok::Number(text) => {
                self.bump();
                vec![number_leaf(&text)]
            }
            Tok::Ident(name) => {
                self.bump();
                if self.atomic > 0 || !self.options.split_symbols {
                    vec![Expr::symbol(name)]
                } else {
                    split_symbol(&name, &self.options.function_symbols)
                }
            }
            Tok::Atom(name) => {
                self.bump();
                vec![Expr::symbol(name)]
            }
            Tok::Reference(name) => {
                self.bump();
                vec![Expr::symbol(format!("${}", name))]
            }
            Tok::Infinity => {
                self.bump();
                vec![Expr::float(f64::INFINITY)]
            }
            Tok::Func(name) => {
                self.bump();
                self.function(name)
            }
            Tok::Dollar => {
                self.bump();
                let mut pieces = self.postfix_pieces();
                if let Some(first) = pieces.first_mut() {
                    let magnitude = std::mem::replace(first, Expr::Blank);
                    *first = Expr::apply(Operator::Unit, vec![Expr::symbol("$"), magnitude]);
                }
                pieces
            }
            Tok::LParen => vec![self.bracket(Bracket::Paren, offset)],
            Tok::LBracket => vec![self.bracket(Bracket::Square, offset)],
            Tok::LBrace => {
                self.bump();
                let entries = self.entries(&[Tok::RBrace]);
                self.expect_close(&Tok::RBrace, offset, "{");
                vec![Expr::aggregate(AggregateKind::Set, entries)]
            }
            Tok::LAngle => {
                self.bump();
                let entries = self.entries(&[Tok::RAngle]);
                self.expect_close(&Tok::RAngle, offset, "⟨");
                vec![Expr::aggregate(AggregateKind::AltVector, entries)]
            }
            Tok::Pipe => {
                self.bump();
                self.abs_depth += 1;
                let inner = self.connective();
                self.abs_depth -= 1;
                self.expect_close(&Tok::Pipe, offset, "|");
                vec![Expr::func("abs", vec![inner])]
            }
            Tok::GroupOpen => vec![self.tex_argument()],
            Tok::Frac => {
                self.bump();
                let num = self.tex_argument();
                let den = self.tex_argument();
                vec![Expr::div(num, den)]
            }
            Tok::Sqrt => {
                self.bump();
                let index = if self.at(&Tok::LBracket) {
                    let open = self.offset();
                    self.bump();
                    let index = self.connective();
                    self.expect_close(&Tok::RBracket, open, "[");
                    Some(index)
                } else {
                    None
                };
                let radicand = self.tex_argument();
                vec![match index {
                    Some(n) => Expr::func("nthroot", vec![radicand, n]),
                    None => Expr::func("sqrt", vec![radicand]),
                }]
            }
            Tok::Vec => {
                self.bump();
                let arg = self.tex_argument();
                vec![Expr::apply(Operator::Vec, vec![arg])]
            }
            Tok::Overline => {
                self.bump();
                let arg = self.tex_argument();
                vec![overline(arg)]
            }
            Tok::Integral => {
                self.bump();
                vec![self.integral()]
            }
            Tok::Begin(env) => {
                self.bump();
                vec![self.environment(&env, offset)]
            }
            Tok::Unknown(text) => {
                self.bump();
                self.issue(
                    IssueKind::UnknownCommand,
                    offset,
                    format!("cannot read '{}'", text),
                );
                vec![Expr::Blank]
            }
            _ => vec![self.missing_operand()],
        }
    }

    /// Builtin function: `sin(x)`, `sin x`, `sin^2 x`, `\log_2 x`.
    fn function(&mut self, name: String) -> Vec<Expr> {
        let mut callee = Expr::symbol(name);
        if self.eat(&Tok::Underscore) {
            let sub = self.subscript_argument();
            callee = Expr::apply(Operator::Subscript, vec![callee, sub]);
        }
        let power = if self.eat(&Tok::Caret) {
            self.exponent_pieces().into_iter().next()
        } else {
            None
        };

        let mut rest = Vec::new();
        let args = if self.at(&Tok::LParen) {
            self.call_args()
        } else if self.syntax == Syntax::Latex && self.at(&Tok::GroupOpen) {
            vec![self.tex_argument()]
        } else {
            let mut pieces = self.power_pieces().into_iter();
            let arg = pieces.next().unwrap_or(Expr::Blank);
            rest.extend(pieces);
            vec![arg]
        };

        let mut applied = Expr::call(callee, args);
        if let Some(power) = power {
            applied = Expr::pow(applied, power);
        }
        let mut pieces = vec![applied];
        pieces.extend(rest);
        pieces
    }

    fn bracket(&mut self, open: Bracket, offset: usize) -> Expr {
        self.bump();
        let mut entries = self.entries(&[Tok::RParen, Tok::RBracket]);
        let close = if self.eat(&Tok::RParen) {
            Bracket::Paren
        } else if self.eat(&Tok::RBracket) {
            Bracket::Square
        } else {
            let label = if open == Bracket::Paren { "(" } else { "[" };
            self.issue(
                IssueKind::Unclosed,
                offset,
                format!("'{}' is never closed", label),
            );
            open
        };

        let two = entries.len() == 2;
        let kind = match entries.len() {
            0 if open == Bracket::Square && close == Bracket::Square => AggregateKind::Array,
            0 => AggregateKind::Tuple,
            1 => return entries.pop().unwrap_or(Expr::Blank),
            _ => match (open, close) {
                (Bracket::Paren, Bracket::Paren) => {
                    if two && self.options.create_intervals {
                        interval(open, close)
                    } else if self.options.create_vectors {
                        AggregateKind::Vector
                    } else {
                        AggregateKind::Tuple
                    }
                }
                (Bracket::Square, Bracket::Square) if !two => AggregateKind::Array,
                _ if two && self.options.create_intervals => interval(open, close),
                _ => AggregateKind::Tuple,
            },
        };
        Expr::aggregate(kind, entries)
    }

    /// `\int_a^b f \, dx`: integrand, variable, lower and upper bound, each
    /// blank when absent.
    fn integral(&mut self) -> Expr {
        let mut lower = Expr::Blank;
        let mut upper = Expr::Blank;
        loop {
            if self.eat(&Tok::Underscore) {
                lower = self.tex_argument();
            } else if self.eat(&Tok::Caret) {
                upper = self.tex_argument();
            } else {
                break;
            }
        }

        let mut terms = Vec::new();
        let mut var = Expr::Blank;
        loop {
            let term = if terms.is_empty() {
                self.unary()
            } else if self.eat(&Tok::Plus) {
                self.unary()
            } else if self.eat(&Tok::Minus) {
                Expr::neg(self.unary())
            } else {
                break;
            };
            let (term, found) = take_differential(term);
            terms.push(term);
            if let Some(found) = found {
                var = found;
                break;
            }
        }
        let integrand = single_or(terms, Expr::add);
        Expr::apply(Operator::Integral, vec![integrand, var, lower, upper])
    }

    /// Matrix-like environment body: `&` separates cells, `\\` rows.
    fn environment(&mut self, env: &str, offset: usize) -> Expr {
        trace!("reading environment '{}'", env);
        let mut rows: Vec<Vec<Expr>> = Vec::new();
        let mut row: Vec<Expr> = Vec::new();
        loop {
            let cell = match self.peek() {
                Some(Tok::ColSep | Tok::RowSep | Tok::End(_)) | None => Expr::Blank,
                Some(_) => self.connective(),
            };
            row.push(cell);
            match self.peek() {
                Some(Tok::ColSep) => self.bump(),
                Some(Tok::RowSep) => {
                    self.bump();
                    rows.push(std::mem::take(&mut row));
                }
                Some(Tok::End(_)) => {
                    self.bump();
                    rows.push(row);
                    break;
                }
                None => {
                    self.issue(
                        IssueKind::Unclosed,
                        offset,
                        format!("environment '{}' is never closed", env),
                    );
                    rows.push(row);
                    break;
                }
                Some(_) => self.unexpected(),
            }
        }
        // A trailing `\\` leaves an empty last row.
        if rows.len() > 1 && rows.last().is_some_and(|r| r.len() == 1 && r[0].is_blank()) {
            rows.pop();
        }
        Expr::Aggregate(Aggregate::matrix(rows))
    }
}

fn single_or(mut items: Vec<Expr>, build: fn(Vec<Expr>) -> Expr) -> Expr {
    if items.len() == 1 {
        items.pop().unwrap_or(Expr::Blank)
    } else {
        build(items)
    }
}

fn negate_first(pieces: &mut [Expr]) {
    if let Some(first) = pieces.first_mut() {
        let inner = std::mem::replace(first, Expr::Blank);
        *first = Expr::neg(inner);
    }
}

fn interval(open: Bracket, close: Bracket) -> AggregateKind {
    AggregateKind::Interval {
        left_closed: open == Bracket::Square,
        right_closed: close == Bracket::Square,
    }
}

fn number_leaf(text: &str) -> Expr {
    let parsed = if text.contains(|c| matches!(c, '.' | 'e' | 'E')) {
        text.parse::<f64>().map(Expr::float).ok()
    } else {
        text.parse::<i64>()
            .map(Expr::int)
            .or_else(|_| text.parse::<f64>().map(Expr::float))
            .ok()
    };
    parsed.unwrap_or(Expr::Blank)
}

/// Symbols, references and their primes or subscripts may be called.
fn is_callable(expr: &Expr) -> bool {
    match expr {
        Expr::Symbol(_) => true,
        Expr::Apply(apply) => {
            matches!(apply.op, Operator::Prime | Operator::Subscript)
                && apply.args.first().is_some_and(is_callable)
        }
        _ => false,
    }
}

/// `\overline{AB}` over plain points is a line segment.
fn overline(arg: Expr) -> Expr {
    if let Some(points) = arg.as_op(Operator::Multiply) {
        if points.len() > 1 && points.iter().all(|p| p.as_symbol().is_some()) {
            return Expr::apply(Operator::LineSegment, points.to_vec());
        }
    }
    Expr::apply(Operator::Overline, vec![arg])
}

/// Strip a trailing differential (`d x`, `dx`) from an integrand term.
fn take_differential(term: Expr) -> (Expr, Option<Expr>) {
    let differential = |name: &str| -> Option<Expr> {
        let rest = name.strip_prefix('d')?;
        (!rest.is_empty() && !is_greek(name)).then(|| Expr::symbol(rest))
    };

    match &term {
        Expr::Symbol(name) => match differential(name) {
            Some(var) => (Expr::int(1), Some(var)),
            None => (term, None),
        },
        Expr::Apply(apply) if apply.op == Operator::Negate && apply.args.len() == 1 => {
            match take_differential(apply.args[0].clone()) {
                (inner, Some(var)) => (Expr::neg(inner), Some(var)),
                (_, None) => (term, None),
            }
        }
        Expr::Apply(apply) if apply.op == Operator::Multiply => {
            let factors = &apply.args;
            let n = factors.len();
            let (keep, var) = match factors.as_slice() {
                [.., Expr::Symbol(d), Expr::Symbol(v)] if d == "d" => {
                    (n - 2, Expr::symbol(v.as_str()))
                }
                [.., Expr::Symbol(last)] => match differential(last) {
                    Some(var) => (n - 1, var),
                    None => return (term, None),
                },
                _ => return (term, None),
            };
            let rest = factors[..keep].to_vec();
            let integrand = match rest.len() {
                0 => Expr::int(1),
                1 => rest.into_iter().next().unwrap_or(Expr::Blank),
                _ => Expr::mul(rest),
            };
            (integrand, Some(var))
        }
        _ => (term, None),
    }
}

#[cfg(test)]
mod tests {
    use super::super::{parse, parse_with_report};
    use super::*;

    fn text(input: &str) -> Expr {
        parse(input, Syntax::Text, &ParseOptions::default())
    }

    fn latex(input: &str) -> Expr {
        parse(input, Syntax::Latex, &ParseOptions::default())
    }

    fn with_intervals() -> ParseOptions {
        ParseOptions {
            create_intervals: true,
            ..ParseOptions::default()
        }
    }

    fn x() -> Expr {
        Expr::symbol("x")
    }

    #[test]
    fn sums_and_products() {
        assert_eq!(
            text("2x+1"),
            Expr::add(vec![Expr::mul(vec![Expr::int(2), x()]), Expr::int(1)])
        );
        assert_eq!(
            text("x-y"),
            Expr::add(vec![x(), Expr::neg(Expr::symbol("y"))])
        );
        assert_eq!(text("-x^2"), Expr::neg(Expr::pow(x(), Expr::int(2))));
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(
            text("2^3^2"),
            Expr::pow(Expr::int(2), Expr::pow(Expr::int(3), Expr::int(2)))
        );
    }

    #[test]
    fn split_identifier_binds_power_to_last_letter() {
        assert_eq!(
            text("xy^2"),
            Expr::mul(vec![x(), Expr::pow(Expr::symbol("y"), Expr::int(2))])
        );
    }

    #[test]
    fn division_takes_the_next_operand_only() {
        assert_eq!(
            text("a/b c"),
            Expr::mul(vec![
                Expr::div(Expr::symbol("a"), Expr::symbol("b")),
                Expr::symbol("c")
            ])
        );
        assert_eq!(
            text("2*-3"),
            Expr::mul(vec![Expr::int(2), Expr::neg(Expr::int(3))])
        );
    }

    #[test]
    fn adjacent_parenthesis_is_a_call() {
        assert_eq!(text("f(x)"), Expr::func("f", vec![x()]));
        assert_eq!(text("f (x)"), Expr::mul(vec![Expr::symbol("f"), x()]));
        assert_eq!(
            text("sin^2 x"),
            Expr::pow(Expr::func("sin", vec![x()]), Expr::int(2))
        );
    }

    #[test]
    fn bracket_classification() {
        assert_eq!(
            text("(1,2)"),
            Expr::tuple(vec![Expr::int(1), Expr::int(2)])
        );
        let open_closed = parse("(1,2]", Syntax::Text, &with_intervals());
        assert_eq!(
            open_closed.as_aggregate().map(Aggregate::kind),
            Some(AggregateKind::Interval {
                left_closed: false,
                right_closed: true
            })
        );
        assert_eq!(
            text("[1,2)").as_aggregate().map(Aggregate::kind),
            Some(AggregateKind::Tuple)
        );
        assert_eq!(
            text("[1,2,3]").as_aggregate().map(Aggregate::kind),
            Some(AggregateKind::Array)
        );
        let vectors = ParseOptions {
            create_vectors: true,
            ..ParseOptions::default()
        };
        assert_eq!(
            parse("(1,2,3)", Syntax::Text, &vectors)
                .as_aggregate()
                .map(Aggregate::kind),
            Some(AggregateKind::Vector)
        );
        assert_eq!(text("(x)"), x());
    }

    #[test]
    fn absolute_value_bars() {
        assert_eq!(
            text("|x-1|"),
            Expr::func("abs", vec![Expr::add(vec![x(), Expr::neg(Expr::int(1))])])
        );
        assert_eq!(
            text("|a||b|"),
            Expr::mul(vec![
                Expr::func("abs", vec![Expr::symbol("a")]),
                Expr::func("abs", vec![Expr::symbol("b")])
            ])
        );
    }

    #[test]
    fn postfix_operators_and_units() {
        assert_eq!(
            text("5%"),
            Expr::apply(Operator::Unit, vec![Expr::int(5), Expr::symbol("%")])
        );
        assert_eq!(
            text("$5"),
            Expr::apply(Operator::Unit, vec![Expr::symbol("$"), Expr::int(5)])
        );
        assert_eq!(
            text("30deg"),
            Expr::apply(Operator::Unit, vec![Expr::int(30), Expr::symbol("deg")])
        );
        assert_eq!(
            text("x_1'"),
            Expr::apply(
                Operator::Prime,
                vec![Expr::apply(Operator::Subscript, vec![x(), Expr::int(1)])]
            )
        );
        assert_eq!(text("3!"), Expr::func("factorial", vec![Expr::int(3)]));
    }

    #[test]
    fn logic_and_relations() {
        assert_eq!(
            text("x <= 1 and p"),
            Expr::apply(
                Operator::And,
                vec![
                    Expr::apply(Operator::LessEqual, vec![x(), Expr::int(1)]),
                    Expr::symbol("p")
                ]
            )
        );
        assert_eq!(
            text("x<-1"),
            Expr::apply(Operator::Less, vec![x(), Expr::neg(Expr::int(1))])
        );
        assert_eq!(
            text("1,2"),
            Expr::aggregate(AggregateKind::List, vec![Expr::int(1), Expr::int(2)])
        );
    }

    #[test]
    fn arrow_words_match_their_symbols() {
        let (a, b) = (Expr::symbol("a"), Expr::symbol("b"));
        for (word, symbol, op) in [
            ("rightarrow", "->", Operator::RightArrow),
            ("leftarrow", "←", Operator::LeftArrow),
            ("leftrightarrow", "<->", Operator::LeftRightArrow),
        ] {
            let expected = Expr::apply(op, vec![a.clone(), b.clone()]);
            assert_eq!(text(&format!("a {} b", word)), expected);
            assert_eq!(text(&format!("a {} b", symbol)), expected);
        }
    }

    #[test]
    fn references_keep_their_dollar() {
        assert_eq!(
            text("$a + 1"),
            Expr::add(vec![Expr::symbol("$a"), Expr::int(1)])
        );
    }

    #[test]
    fn degradation_produces_blanks_and_issues() {
        let (expr, issues) = parse_with_report("", Syntax::Text, &ParseOptions::default());
        assert_eq!(expr, Expr::Blank);
        assert!(issues.is_empty());

        let (expr, issues) = parse_with_report("1+", Syntax::Text, &ParseOptions::default());
        assert_eq!(expr, Expr::add(vec![Expr::int(1), Expr::Blank]));
        assert_eq!(issues[0].kind, IssueKind::MissingOperand);

        let (expr, issues) = parse_with_report("(1+2", Syntax::Text, &ParseOptions::default());
        assert_eq!(expr, Expr::add(vec![Expr::int(1), Expr::int(2)]));
        assert_eq!(issues[0].kind, IssueKind::Unclosed);
        assert_eq!(issues[0].offset, 0);

        let (expr, issues) = parse_with_report("1)2", Syntax::Text, &ParseOptions::default());
        assert_eq!(expr, Expr::mul(vec![Expr::int(1), Expr::Blank, Expr::int(2)]));
        assert_eq!(issues[0].kind, IssueKind::UnexpectedToken);
        assert_eq!(issues[0].offset, 1);
    }

    #[test]
    fn latex_fraction_and_scripts() {
        assert_eq!(
            latex("\\frac{1}{2}x"),
            Expr::mul(vec![Expr::div(Expr::int(1), Expr::int(2)), x()])
        );
        assert_eq!(
            latex("x^23"),
            Expr::mul(vec![Expr::pow(x(), Expr::int(2)), Expr::int(3)])
        );
        assert_eq!(
            latex("x_{ab}"),
            Expr::apply(Operator::Subscript, vec![x(), Expr::symbol("ab")])
        );
        assert_eq!(
            latex("\\sin^2 x"),
            Expr::pow(Expr::func("sin", vec![x()]), Expr::int(2))
        );
    }

    #[test]
    fn latex_accepts_escaped_relations() {
        let (x, one) = (Expr::symbol("x"), Expr::int(1));
        assert_eq!(
            latex("x &le; 1"),
            Expr::apply(Operator::LessEqual, vec![x.clone(), one.clone()])
        );
        assert_eq!(latex("x&gt;1"), latex("x > 1"));
        assert_eq!(latex("x &lt; 1"), text("x &lt; 1"));
    }

    #[test]
    fn latex_roots() {
        assert_eq!(latex("\\sqrt{x}"), Expr::func("sqrt", vec![x()]));
        assert_eq!(
            latex("\\sqrt[3]{x}"),
            Expr::func("nthroot", vec![x(), Expr::int(3)])
        );
    }

    #[test]
    fn latex_interval_with_sized_delimiters() {
        let expr = parse("\\left[0,1\\right)", Syntax::Latex, &with_intervals());
        assert_eq!(
            expr,
            Expr::aggregate(
                AggregateKind::Interval {
                    left_closed: true,
                    right_closed: false
                },
                vec![Expr::int(0), Expr::int(1)]
            )
        );
    }

    #[test]
    fn latex_matrix_environment() {
        let expr = latex("\\begin{pmatrix}1&2\\\\3&4\\\\\\end{pmatrix}");
        let agg = expr.as_aggregate().expect("matrix");
        assert_eq!(agg.shape(), Some((2, 2)));
        assert_eq!(agg.row(1), &[Expr::int(3), Expr::int(4)]);
    }

    #[test]
    fn latex_integral_extracts_differential() {
        assert_eq!(
            latex("\\int_0^1 x^2 dx"),
            Expr::apply(
                Operator::Integral,
                vec![Expr::pow(x(), Expr::int(2)), x(), Expr::int(0), Expr::int(1)]
            )
        );
        assert_eq!(
            latex("\\int x"),
            Expr::apply(
                Operator::Integral,
                vec![x(), Expr::Blank, Expr::Blank, Expr::Blank]
            )
        );
    }

    #[test]
    fn latex_overline_of_points_is_a_segment() {
        assert_eq!(
            latex("\\overline{AB}"),
            Expr::apply(
                Operator::LineSegment,
                vec![Expr::symbol("A"), Expr::symbol("B")]
            )
        );
        assert_eq!(
            latex("\\overline{x}"),
            Expr::apply(Operator::Overline, vec![x()])
        );
    }

    #[test]
    fn latex_unknown_command_degrades() {
        let (expr, issues) =
            parse_with_report("\\foo + 1", Syntax::Latex, &ParseOptions::default());
        assert_eq!(expr, Expr::add(vec![Expr::Blank, Expr::int(1)]));
        assert_eq!(issues[0].kind, IssueKind::UnknownCommand);
    }

    #[test]
    fn latex_degree_script() {
        assert_eq!(
            latex("30^\\circ"),
            Expr::apply(Operator::Unit, vec![Expr::int(30), Expr::symbol("deg")])
        );
    }
}
