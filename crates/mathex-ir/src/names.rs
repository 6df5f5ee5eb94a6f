//! Name tables shared by the front ends and the backends.

use phf::{phf_map, phf_set};

/// Greek letter names (and `pi`-like constants) that are never split into
/// single-letter products.
pub static GREEK_LETTERS: phf::Set<&'static str> = phf_set! {
    "alpha", "beta", "gamma", "delta", "epsilon", "varepsilon", "zeta", "eta",
    "theta", "vartheta", "iota", "kappa", "lambda", "mu", "nu", "xi", "pi",
    "varpi", "rho", "varrho", "sigma", "varsigma", "tau", "upsilon", "phi",
    "varphi", "chi", "psi", "omega",
    "Gamma", "Delta", "Theta", "Lambda", "Xi", "Pi", "Sigma", "Upsilon",
    "Phi", "Psi", "Omega",
};

/// Unicode Greek characters accepted in text input.
pub static UNICODE_GREEK: phf::Map<char, &'static str> = phf_map! {
    'α' => "alpha", 'β' => "beta", 'γ' => "gamma", 'δ' => "delta",
    'ε' => "epsilon", 'ζ' => "zeta", 'η' => "eta", 'θ' => "theta",
    'ι' => "iota", 'κ' => "kappa", 'λ' => "lambda", 'μ' => "mu",
    'ν' => "nu", 'ξ' => "xi", 'π' => "pi", 'ρ' => "rho", 'σ' => "sigma",
    'τ' => "tau", 'υ' => "upsilon", 'φ' => "phi", 'χ' => "chi",
    'ψ' => "psi", 'ω' => "omega",
    'Γ' => "Gamma", 'Δ' => "Delta", 'Θ' => "Theta", 'Λ' => "Lambda",
    'Ξ' => "Xi", 'Π' => "Pi", 'Σ' => "Sigma", 'Φ' => "Phi", 'Ψ' => "Psi",
    'Ω' => "Omega",
};

/// Reverse of [`UNICODE_GREEK`] for plain-text output.
pub static GREEK_UNICODE: phf::Map<&'static str, char> = phf_map! {
    "alpha" => 'α', "beta" => 'β', "gamma" => 'γ', "delta" => 'δ',
    "epsilon" => 'ε', "varepsilon" => 'ε', "zeta" => 'ζ', "eta" => 'η',
    "theta" => 'θ', "vartheta" => 'ϑ', "iota" => 'ι', "kappa" => 'κ',
    "lambda" => 'λ', "mu" => 'μ', "nu" => 'ν', "xi" => 'ξ', "pi" => 'π',
    "varpi" => 'ϖ', "rho" => 'ρ', "varrho" => 'ϱ', "sigma" => 'σ',
    "varsigma" => 'ς', "tau" => 'τ', "upsilon" => 'υ', "phi" => 'φ',
    "varphi" => 'ϕ', "chi" => 'χ', "psi" => 'ψ', "omega" => 'ω',
    "Gamma" => 'Γ', "Delta" => 'Δ', "Theta" => 'Θ', "Lambda" => 'Λ',
    "Xi" => 'Ξ', "Pi" => 'Π', "Sigma" => 'Σ', "Upsilon" => 'Υ',
    "Phi" => 'Φ', "Psi" => 'Ψ', "Omega" => 'Ω',
};

/// Functions that are always applied, whatever the function-symbol
/// configuration says.
pub static BUILTIN_FUNCTIONS: phf::Set<&'static str> = phf_set! {
    "sin", "cos", "tan", "sec", "csc", "cot",
    "arcsin", "arccos", "arctan", "arcsec", "arccsc", "arccot",
    "asin", "acos", "atan",
    "sinh", "cosh", "tanh", "sech", "csch", "coth",
    "exp", "log", "ln", "log10", "sqrt", "nthroot", "abs", "sign",
    "floor", "ceil", "round", "factorial", "min", "max", "det", "conj",
    "re", "im", "arg",
};

/// Builtins that have a dedicated LaTeX operator command (`\sin`, `\log`, ...).
pub static LATEX_OPERATOR_NAMES: phf::Set<&'static str> = phf_set! {
    "sin", "cos", "tan", "sec", "csc", "cot", "arcsin", "arccos", "arctan",
    "sinh", "cosh", "tanh", "coth", "exp", "log", "ln", "det", "min", "max",
    "arg",
};

pub fn is_greek(name: &str) -> bool {
    GREEK_LETTERS.contains(name)
}

pub fn is_builtin_function(name: &str) -> bool {
    BUILTIN_FUNCTIONS.contains(name)
}

/// Split a symbol name into its letters and a trailing digit run:
/// `"x12"` gives `("x", "12")`, `"xy"` gives `("xy", "")`.
pub fn split_trailing_digits(name: &str) -> (&str, &str) {
    let cut = name
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)
        .unwrap_or(name.len());
    if cut == 0 {
        (name, "")
    } else {
        name.split_at(cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_digits() {
        assert_eq!(split_trailing_digits("x12"), ("x", "12"));
        assert_eq!(split_trailing_digits("xy"), ("xy", ""));
        assert_eq!(split_trailing_digits("12"), ("12", ""));
    }

    #[test]
    fn tables_agree() {
        for (ch, name) in UNICODE_GREEK.entries() {
            assert!(is_greek(name), "{} missing from GREEK_LETTERS", name);
            assert_eq!(GREEK_UNICODE.get(*name), Some(ch));
        }
    }
}
