//! Expression tree to LaTeX backend.

use mathex_ir::display::{
    int_text, negated_term, precedence, real_text, NumberStyle, Padding, RealText, PREC_AND,
    PREC_ATOM, PREC_CONNECTIVE, PREC_NEGATE, PREC_NOT, PREC_OR, PREC_POWER, PREC_PRODUCT,
    PREC_RELATION, PREC_SUM,
};
use mathex_ir::names::{is_greek, split_trailing_digits, LATEX_OPERATOR_NAMES};
use mathex_ir::{Aggregate, AggregateKind, Apply, Expr, Number, Operator};

#[derive(Debug, Clone)]
pub struct LatexRenderOptions {
    pub number_style: NumberStyle,
    pub display_blanks: bool,
    pub matrix_environment: MatrixEnvironment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixEnvironment {
    Bmatrix,
    Pmatrix,
    Matrix,
}

impl MatrixEnvironment {
    fn name(self) -> &'static str {
        match self {
            MatrixEnvironment::Bmatrix => "bmatrix",
            MatrixEnvironment::Pmatrix => "pmatrix",
            MatrixEnvironment::Matrix => "matrix",
        }
    }
}

impl Default for LatexRenderOptions {
    fn default() -> Self {
        Self {
            number_style: NumberStyle::default(),
            display_blanks: false,
            matrix_environment: MatrixEnvironment::Bmatrix,
        }
    }
}

/// Render a display tree as LaTeX math (no surrounding `$`).
pub fn render_latex(expr: &Expr, options: &LatexRenderOptions) -> String {
    Renderer {
        options,
        padding: options.number_style.padding,
    }
    .render(expr)
}

struct Renderer<'a> {
    options: &'a LatexRenderOptions,
    /// Cleared inside exponents and subscripts.
    padding: Option<Padding>,
}

impl Renderer<'_> {
    fn render(&self, expr: &Expr) -> String {
        match expr {
            Expr::Number(n) => self.number(n),
            Expr::Symbol(name) => symbol(name),
            Expr::Apply(apply) => self.apply(apply),
            Expr::Aggregate(agg) => self.aggregate(agg),
            Expr::Blank => {
                if self.options.display_blanks {
                    "\\_\\_".to_string()
                } else {
                    String::new()
                }
            }
        }
    }

    fn script(&self, expr: &Expr) -> String {
        Renderer {
            options: self.options,
            padding: None,
        }
        .render(expr)
    }

    fn wrapped(&self, expr: &Expr, parens: bool) -> String {
        let inner = self.render(expr);
        if parens {
            format!("\\left({}\\right)", inner)
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
            "\\mathrm{NaN}".to_string()
        } else if v.is_infinite() {
            let text = if v > 0.0 { "\\infty" } else { "-\\infty" };
            text.to_string()
        } else {
            spell(&real_text(v, self.padding))
        }
    }

    fn imaginary(&self, magnitude: f64) -> String {
        if magnitude == 1.0 {
            "i".to_string()
        } else {
            format!("{} i", self.real(magnitude))
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
            Operator::Divide => self.fraction(args),
            Operator::Power => match args {
                [base, exp] => format!(
                    "{}^{{{}}}",
                    self.wrapped(base, precedence(base) < PREC_ATOM),
                    self.script(exp)
                ),
                _ => self.infix(args, "^", PREC_POWER),
            },
            Operator::Subscript => match args {
                [base, sub] => format!(
                    "{}_{{{}}}",
                    self.wrapped(base, precedence(base) < PREC_ATOM),
                    self.script(sub)
                ),
                _ => self.infix(args, "_", PREC_ATOM),
            },
            Operator::Prime => match args.first() {
                Some(base) => format!("{}'", self.wrapped(base, precedence(base) < PREC_ATOM)),
                None => "'".to_string(),
            },
            Operator::Apply => self.call(args),
            Operator::Less => self.infix(args, " < ", PREC_RELATION),
            Operator::LessEqual => self.infix(args, " \\le ", PREC_RELATION),
            Operator::Greater => self.infix(args, " > ", PREC_RELATION),
            Operator::GreaterEqual => self.infix(args, " \\ge ", PREC_RELATION),
            Operator::Equal => self.infix(args, " = ", PREC_RELATION),
            Operator::NotEqual => self.infix(args, " \\ne ", PREC_RELATION),
            Operator::Perp => self.infix(args, " \\perp ", PREC_RELATION),
            Operator::Parallel => self.infix(args, " \\parallel ", PREC_RELATION),
            Operator::Not => match args.first() {
                Some(inner) => format!(
                    "\\lnot {}",
                    self.wrapped(inner, precedence(inner) < PREC_NOT)
                ),
                None => "\\lnot".to_string(),
            },
            Operator::And => self.infix(args, " \\land ", PREC_AND),
            Operator::Or => self.infix(args, " \\lor ", PREC_OR),
            Operator::Implies => self.infix(args, " \\implies ", PREC_CONNECTIVE),
            Operator::ImpliedBy => self.infix(args, " \\impliedby ", PREC_CONNECTIVE),
            Operator::Iff => self.infix(args, " \\iff ", PREC_CONNECTIVE),
            Operator::RightArrow => self.infix(args, " \\rightarrow ", PREC_CONNECTIVE),
            Operator::LeftArrow => self.infix(args, " \\leftarrow ", PREC_CONNECTIVE),
            Operator::LeftRightArrow => self.infix(args, " \\leftrightarrow ", PREC_CONNECTIVE),
            Operator::Vec => format!("\\vec{{{}}}", self.joined(args, "")),
            Operator::Overline => format!("\\overline{{{}}}", self.joined(args, "")),
            Operator::LineSegment => format!("\\overline{{{}}}", self.joined(args, "")),
            Operator::Integral => self.integral(args),
            Operator::Unit => self.unit(args),
        }
    }

    fn joined(&self, args: &[Expr], sep: &str) -> String {
        args.iter()
            .map(|a| self.render(a))
            .collect::<Vec<_>>()
            .join(sep)
    }

    /// Left-associative infix chain: the left operand may sit at the same
    /// level, later operands are parenthesized unless they bind tighter.
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
                out.push_str(product_separator(&text));
            }
            out.push_str(&text);
        }
        out
    }

    fn fraction(&self, args: &[Expr]) -> String {
        match args {
            [num, den] => match negated_term(num) {
                Some(positive) => format!(
                    "-\\frac{{{}}}{{{}}}",
                    self.render(&positive),
                    self.render(den)
                ),
                None => format!("\\frac{{{}}}{{{}}}", self.render(num), self.render(den)),
            },
            _ => self.infix(args, " / ", PREC_PRODUCT),
        }
    }

    fn call(&self, args: &[Expr]) -> String {
        let Some((callee, params)) = args.split_first() else {
            return String::new();
        };
        let name = callee.as_symbol().unwrap_or("");
        match (name, params) {
            ("sqrt", [x]) => return format!("\\sqrt{{{}}}", self.render(x)),
            ("nthroot", [x, n]) => {
                return format!("\\sqrt[{}]{{{}}}", self.script(n), self.render(x))
            }
            ("abs", [x]) => return format!("\\left|{}\\right|", self.render(x)),
            ("conj", [x]) => return format!("\\overline{{{}}}", self.render(x)),
            ("factorial", [x]) => {
                return format!("{}!", self.wrapped(x, precedence(x) < PREC_ATOM))
            }
            _ => {}
        }
        let head = if LATEX_OPERATOR_NAMES.contains(name) {
            format!("\\{}", name)
        } else if !name.is_empty() && name.chars().count() > 1 && !is_greek(name) {
            format!("\\operatorname{{{}}}", name)
        } else {
            self.wrapped(callee, precedence(callee) < PREC_ATOM)
        };
        format!("{}\\left({}\\right)", head, self.joined(params, ", "))
    }

    fn integral(&self, args: &[Expr]) -> String {
        let part = |i: usize| args.get(i).filter(|e| !e.is_blank());
        let mut out = "\\int".to_string();
        if let Some(lower) = part(2) {
            out.push_str(&format!("_{{{}}}", self.script(lower)));
        }
        if let Some(upper) = part(3) {
            out.push_str(&format!("^{{{}}}", self.script(upper)));
        }
        if let Some(integrand) = args.first() {
            out.push(' ');
            out.push_str(&self.wrapped(integrand, precedence(integrand) <= PREC_SUM));
        }
        if let Some(var) = part(1) {
            out.push_str(" \\, d");
            out.push_str(&self.render(var));
        }
        out
    }

    fn unit(&self, args: &[Expr]) -> String {
        match args {
            [Expr::Symbol(unit), magnitude] if unit == "$" => {
                format!(
                    "\\${}",
                    self.wrapped(magnitude, precedence(magnitude) < PREC_ATOM)
                )
            }
            [magnitude, Expr::Symbol(unit)] => {
                let base = self.wrapped(magnitude, precedence(magnitude) < PREC_ATOM);
                match unit.as_str() {
                    "%" => format!("{}\\%", base),
                    "deg" => format!("{}^{{\\circ}}", base),
                    other => format!("{} \\mathrm{{{}}}", base, other),
                }
            }
            _ => self.joined(args, " "),
        }
    }

    fn aggregate(&self, agg: &Aggregate) -> String {
        let entries = || self.joined(agg.entries(), ", ");
        match agg.kind() {
            AggregateKind::Tuple | AggregateKind::Vector => {
                format!("\\left({}\\right)", entries())
            }
            AggregateKind::List => entries(),
            AggregateKind::Set => format!("\\left\\{{{}\\right\\}}", entries()),
            AggregateKind::Array => format!("\\left[{}\\right]", entries()),
            AggregateKind::Interval {
                left_closed,
                right_closed,
            } => format!(
                "\\left{}{}\\right{}",
                if left_closed { "[" } else { "(" },
                entries(),
                if right_closed { "]" } else { ")" }
            ),
            AggregateKind::AltVector => format!("\\langle {} \\rangle", entries()),
            AggregateKind::Matrix { rows, .. } => {
                let env = self.options.matrix_environment.name();
                let body = (0..rows)
                    .map(|r| self.joined(agg.row(r), " & "))
                    .collect::<Vec<_>>()
                    .join(" \\\\ ");
                format!("\\begin{{{}}} {} \\end{{{}}}", env, body, env)
            }
        }
    }
}

/// Separator between two adjacent factors: an explicit dot when the next
/// factor opens with a digit, plain juxtaposition otherwise.
fn product_separator(next: &str) -> &'static str {
    if next.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        " \\cdot "
    } else {
        " "
    }
}

fn spell(text: &RealText) -> String {
    let sign = if text.negative { "-" } else { "" };
    match text.exponent {
        Some(exp) => format!("{}{} \\cdot 10^{{{}}}", sign, text.mantissa, exp),
        None => format!("{}{}", sign, text.mantissa),
    }
}

fn symbol(name: &str) -> String {
    match name {
        "$" => return "\\$".to_string(),
        "%" => return "\\%".to_string(),
        "deg" => return "^{\\circ}".to_string(),
        _ => {}
    }
    let name = name.strip_prefix('$').unwrap_or(name);
    let (letters, digits) = split_trailing_digits(name);
    let head = if letters.chars().count() <= 1 || letters.chars().all(|c| c.is_ascii_digit()) {
        letters.to_string()
    } else if is_greek(letters) {
        format!("\\{}", letters)
    } else {
        format!("\\mathrm{{{}}}", letters)
    };
    if digits.is_empty() {
        head
    } else {
        format!("{}_{{{}}}", head, digits)
    }
}
