//! Expression tree to plain Unicode text.
//!
//! Follows the same layout rules as the LaTeX backend: operands are
//! parenthesized by precedence, sums print `a - b` for negated terms and
//! numbers in a product are separated by ` * `. Numeric scripts use Unicode
//! superscript and subscript digits (`x²`, `x₁`).

use mathex_ir::display::{
    int_text, negated_term, precedence, real_text, NumberStyle, Padding, RealText, PREC_AND,
    PREC_ATOM, PREC_CONNECTIVE, PREC_NEGATE, PREC_NOT, PREC_OR, PREC_POWER, PREC_PRODUCT,
    PREC_RELATION, PREC_SUM,
};
use mathex_ir::names::{split_trailing_digits, GREEK_UNICODE};
use mathex_ir::{Aggregate, AggregateKind, Apply, Expr, Number, Operator};

#[derive(Debug, Clone, Default)]
pub struct TextRenderOptions {
    pub number_style: NumberStyle,
    pub display_blanks: bool,
}

pub fn to_text(expr: &Expr, options: &TextRenderOptions) -> String {
    TextRenderer {
        options,
        padding: options.number_style.padding,
    }
    .render(expr)
}

struct TextRenderer<'a> {
    options: &'a TextRenderOptions,
    padding: Option<Padding>,
}

impl TextRenderer<'_> {
    fn render(&self, expr: &Expr) -> String {
        match expr {
            Expr::Number(n) => self.number(n),
            Expr::Symbol(name) => symbol(name),
            Expr::Apply(apply) => self.apply(apply),
            Expr::Aggregate(agg) => self.aggregate(agg),
            Expr::Blank => {
                if self.options.display_blanks {
                    "_".to_string()
                } else {
                    String::new()
                }
            }
        }
    }

    fn script(&self, expr: &Expr) -> String {
        TextRenderer {
            options: self.options,
            padding: None,
        }
        .render(expr)
    }

    fn wrapped(&self, expr: &Expr, parens: bool) -> String {
        let inner = self.render(expr);
        if parens {
            format!("({})", inner)
        } else {
            inner
        }
    }

    fn number(&self, n: &Number) -> String {
        match *n {
            Number::Int(v) => spell(&int_text(v, self.padding)),
            Number::Float(v) => self.real(v),
            Number::Complex { re, im } => {
                if re == 0.0 {
                    if im.is_sign_negative() {
                        format!("-{}", self.imaginary(im.abs()))
                    } else {
                        self.imaginary(im)
                    }
                } else {
                    let sign = if im.is_sign_negative() { " - " } else { " + " };
                    format!("{}{}{}", self.real(re), sign, self.imaginary(im.abs()))
                }
            }
        }
    }

    fn real(&self, v: f64) -> String {
        if v.is_nan() {
            "NaN".to_string()
        } else if v.is_infinite() {
            let text = if v > 0.0 { "∞" } else { "-∞" };
            text.to_string()
        } else {
            spell(&real_text(v, self.padding))
        }
    }

    fn imaginary(&self, magnitude: f64) -> String {
        if magnitude == 1.0 {
            "i".to_string()
        } else {
            format!("{}i", self.real(magnitude))
        }
    }

    fn apply(&self, apply: &Apply) -> String {
        let args = apply.args.as_slice();
        match apply.op {
            Operator::Add => self.sum(args),
            Operator::Multiply => self.product(args),
            Operator::Negate => match args.first() {
                Some(inner) => format!(
                    "-{}",
                    self.wrapped(inner, precedence(inner) <= PREC_NEGATE)
                ),
                None => "-".to_string(),
            },
            Operator::Divide => match args {
                [num, den] => format!(
                    "{}/{}",
                    self.wrapped(num, precedence(num) < PREC_PRODUCT),
                    self.wrapped(den, precedence(den) <= PREC_PRODUCT)
                ),
                _ => self.infix(args, "/", PREC_PRODUCT),
            },
            Operator::Power => match args {
                [base, exp] => {
                    let base = self.wrapped(base, precedence(base) < PREC_ATOM);
                    format!("{}{}", base, self.raised(exp, superscript, '^'))
                }
                _ => self.infix(args, "^", PREC_POWER),
            },
            Operator::Subscript => match args {
                [base, sub] => {
                    let base = self.wrapped(base, precedence(base) < PREC_ATOM);
                    format!("{}{}", base, self.raised(sub, subscript, '_'))
                }
                _ => self.infix(args, "_", PREC_ATOM),
            },
            Operator::Prime => match args.first() {
                Some(base) => format!("{}'", self.wrapped(base, precedence(base) < PREC_ATOM)),
                None => "'".to_string(),
            },
            Operator::Apply => self.call(args),
            Operator::Less => self.infix(args, " < ", PREC_RELATION),
            Operator::LessEqual => self.infix(args, " ≤ ", PREC_RELATION),
            Operator::Greater => self.infix(args, " > ", PREC_RELATION),
            Operator::GreaterEqual => self.infix(args, " ≥ ", PREC_RELATION),
            Operator::Equal => self.infix(args, " = ", PREC_RELATION),
            Operator::NotEqual => self.infix(args, " ≠ ", PREC_RELATION),
            Operator::Perp => self.infix(args, " ⊥ ", PREC_RELATION),
            Operator::Parallel => self.infix(args, " ∥ ", PREC_RELATION),
            Operator::Not => match args.first() {
                Some(inner) => format!("¬{}", self.wrapped(inner, precedence(inner) < PREC_NOT)),
                None => "¬".to_string(),
            },
            Operator::And => self.infix(args, " and ", PREC_AND),
            Operator::Or => self.infix(args, " or ", PREC_OR),
            Operator::Implies => self.infix(args, " ⇒ ", PREC_CONNECTIVE),
            Operator::ImpliedBy => self.infix(args, " ⇐ ", PREC_CONNECTIVE),
            Operator::Iff => self.infix(args, " ⇔ ", PREC_CONNECTIVE),
            Operator::RightArrow => self.infix(args, " → ", PREC_CONNECTIVE),
            Operator::LeftArrow => self.infix(args, " ← ", PREC_CONNECTIVE),
            Operator::LeftRightArrow => self.infix(args, " ↔ ", PREC_CONNECTIVE),
            Operator::Vec => combining(&self.joined(args, ""), '\u{20D7}'),
            Operator::Overline | Operator::LineSegment => {
                combining(&self.joined(args, ""), '\u{0305}')
            }
            Operator::Integral => self.integral(args),
            Operator::Unit => self.unit(args),
        }
    }

    /// A script in Unicode when every character has a script form,
    /// `^x` / `^(…)` otherwise.
    fn raised(&self, expr: &Expr, table: fn(char) -> Option<char>, marker: char) -> String {
        let text = self.script(expr);
        if !text.is_empty() {
            if let Some(converted) = text.chars().map(table).collect::<Option<String>>() {
                return converted;
            }
        }
        if precedence(expr) < PREC_ATOM || text.chars().count() > 1 {
            format!("{}({})", marker, text)
        } else {
            format!("{}{}", marker, text)
        }
    }

    fn joined(&self, args: &[Expr], sep: &str) -> String {
        args.iter()
            .map(|a| self.render(a))
            .collect::<Vec<_>>()
            .join(sep)
    }

    fn infix(&self, args: &[Expr], op: &str, level: u8) -> String {
        let mut out = String::new();
        for (i, arg) in args.iter().enumerate() {
            let prec = precedence(arg);
            let parens = if i == 0 { prec < level } else { prec <= level };
            if i > 0 {
                out.push_str(op);
            }
            out.push_str(&self.wrapped(arg, parens));
        }
        out
    }

    fn sum(&self, terms: &[Expr]) -> String {
        let mut out = String::new();
        for (i, term) in terms.iter().enumerate() {
            if i == 0 {
                out.push_str(&self.wrapped(term, precedence(term) <= PREC_SUM));
                continue;
            }
            match negated_term(term) {
                Some(positive) => {
                    out.push_str(" - ");
                    out.push_str(&self.wrapped(&positive, precedence(&positive) <= PREC_NEGATE));
                }
                None => {
                    out.push_str(" + ");
                    out.push_str(&self.wrapped(term, precedence(term) <= PREC_SUM));
                }
            }
        }
        out
    }

    fn product(&self, factors: &[Expr]) -> String {
        let minus_one = factors.len() > 1
            && matches!(factors[0].as_number(), Some(Number::Int(-1)));
        let (mut out, factors) = if minus_one {
            ("-".to_string(), &factors[1..])
        } else {
            (String::new(), factors)
        };
        for (i, factor) in factors.iter().enumerate() {
            let prec = precedence(factor);
            let leading = i == 0 && !minus_one;
            let negative_number = factor.as_number().is_some_and(Number::is_negative);
            let parens = if leading {
                prec < PREC_NEGATE
            } else {
                prec < PREC_PRODUCT || negative_number
            };
            let text = self.wrapped(factor, parens);
            if i > 0 {
                out.push_str(product_separator(&out, &text));
            }
            out.push_str(&text);
        }
        out
    }

    fn call(&self, args: &[Expr]) -> String {
        let Some((callee, params)) = args.split_first() else {
            return String::new();
        };
        match (callee.as_symbol(), params) {
            (Some("abs"), [x]) => return format!("|{}|", self.render(x)),
            (Some("factorial"), [x]) => {
                return format!("{}!", self.wrapped(x, precedence(x) < PREC_ATOM))
            }
            _ => {}
        }
        let head = self.wrapped(callee, precedence(callee) < PREC_ATOM);
        format!("{}({})", head, self.joined(params, ", "))
    }

    fn integral(&self, args: &[Expr]) -> String {
        let part = |i: usize| args.get(i).filter(|e| !e.is_blank());
        let mut out = "∫".to_string();
        if let Some(lower) = part(2) {
            out.push_str(&self.raised(lower, subscript, '_'));
        }
        if let Some(upper) = part(3) {
            out.push_str(&self.raised(upper, superscript, '^'));
        }
        if let Some(integrand) = args.first() {
            out.push(' ');
            out.push_str(&self.wrapped(integrand, precedence(integrand) <= PREC_SUM));
        }
        if let Some(var) = part(1) {
            out.push_str(" d");
            out.push_str(&self.render(var));
        }
        out
    }

    fn unit(&self, args: &[Expr]) -> String {
        match args {
            [Expr::Symbol(unit), magnitude] if unit == "$" => {
                format!("${}", self.wrapped(magnitude, precedence(magnitude) < PREC_ATOM))
            }
            [magnitude, Expr::Symbol(unit)] => {
                let base = self.wrapped(magnitude, precedence(magnitude) < PREC_ATOM);
                match unit.as_str() {
                    "%" => format!("{}%", base),
                    "deg" => format!("{}°", base),
                    other => format!("{} {}", base, other),
                }
            }
            _ => self.joined(args, " "),
        }
    }

    fn aggregate(&self, agg: &Aggregate) -> String {
        let entries = || self.joined(agg.entries(), ", ");
        match agg.kind() {
            AggregateKind::Tuple | AggregateKind::Vector => format!("({})", entries()),
            AggregateKind::List => entries(),
            AggregateKind::Set => format!("{{{}}}", entries()),
            AggregateKind::Array => format!("[{}]", entries()),
            AggregateKind::Interval {
                left_closed,
                right_closed,
            } => format!(
                "{}{}{}",
                if left_closed { "[" } else { "(" },
                entries(),
                if right_closed { "]" } else { ")" }
            ),
            AggregateKind::AltVector => format!("⟨{}⟩", entries()),
            AggregateKind::Matrix { rows, .. } => {
                let body = (0..rows)
                    .map(|r| format!("[{}]", self.joined(agg.row(r), ", ")))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{}]", body)
            }
        }
    }
}

/// ` * ` before a number, a space between two letters, nothing otherwise.
fn product_separator(before: &str, next: &str) -> &'static str {
    if next.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        " * "
    } else if before.ends_with(char::is_alphabetic) && next.starts_with(char::is_alphabetic) {
        " "
    } else {
        ""
    }
}

fn spell(text: &RealText) -> String {
    let sign = if text.negative { "-" } else { "" };
    match text.exponent {
        Some(exp) => {
            let power: Option<String> = exp.to_string().chars().map(superscript).collect();
            match power {
                Some(power) => format!("{}{} * 10{}", sign, text.mantissa, power),
                None => format!("{}{} * 10^{}", sign, text.mantissa, exp),
            }
        }
        None => format!("{}{}", sign, text.mantissa),
    }
}

fn symbol(name: &str) -> String {
    match name {
        "deg" => return "°".to_string(),
        _ => {}
    }
    let name = name.strip_prefix('$').unwrap_or(name);
    let (letters, digits) = split_trailing_digits(name);
    let head = match GREEK_UNICODE.get(letters) {
        Some(c) => c.to_string(),
        None => letters.to_string(),
    };
    let sub: Option<String> = digits.chars().map(subscript).collect();
    match sub {
        Some(sub) => format!("{}{}", head, sub),
        None => format!("{}_{}", head, digits),
    }
}

fn combining(text: &str, mark: char) -> String {
    text.chars().flat_map(|c| [c, mark]).collect()
}

fn superscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '-' => '⁻',
        _ => return None,
    })
}

fn subscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        _ => return None,
    })
}
