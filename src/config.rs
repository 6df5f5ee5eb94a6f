//! Engine configuration.
//!
//! A configuration is an immutable snapshot handed to every stage. Nested
//! expressions refine it with [`ConfigOverrides`] through an explicit merge
//! ([`EngineConfig::extend`]), never by mutation.

use fxhash::FxHashSet;
use mathex_ir::display::Padding;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::format::DisplayContext;
use crate::core::parse::ParseOptions;
use crate::utils::{MathexError, MathexResult};

/// Threshold used when `displaySmallAsZero` is simply `true`.
pub const DEFAULT_SMALL_AS_ZERO: f64 = 1e-14;

/// Largest accepted `displayDecimals` / `displayDigits`.
const MAX_DISPLAY_PRECISION: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimplifyMode {
    #[default]
    None,
    Numbers,
    NumbersPreserveOrder,
    Full,
}

/// A numeric setting as it arrived on the wire. Anything that is not a
/// number (or a numeric string) is kept but inert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericSetting {
    Number(f64),
    Other(Value),
}

impl NumericSetting {
    /// The setting as a non-negative count, truncated toward zero.
    pub fn count(&self) -> Option<usize> {
        let value = match self {
            NumericSetting::Number(v) => *v,
            NumericSetting::Other(Value::String(s)) => s.trim().parse::<f64>().ok()?,
            NumericSetting::Other(_) => return None,
        };
        (value.is_finite() && value >= 0.0).then(|| value.trunc() as usize)
    }
}

impl From<usize> for NumericSetting {
    fn from(value: usize) -> Self {
        NumericSetting::Number(value as f64)
    }
}

/// `displaySmallAsZero`: a flag or an explicit threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SmallAsZero {
    Flag(bool),
    Threshold(f64),
    Other(Value),
}

impl Default for SmallAsZero {
    fn default() -> Self {
        SmallAsZero::Flag(false)
    }
}

impl SmallAsZero {
    pub fn threshold(&self) -> Option<f64> {
        match self {
            SmallAsZero::Flag(true) => Some(DEFAULT_SMALL_AS_ZERO),
            SmallAsZero::Threshold(t) if t.is_finite() && *t > 0.0 => Some(*t),
            _ => None,
        }
    }
}

/// Fully resolved configuration of one expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub simplify: SimplifyMode,
    pub expand: bool,
    pub split_symbols: bool,
    pub function_symbols: FxHashSet<String>,
    pub references_are_function_symbols: bool,
    pub create_vectors: bool,
    pub create_intervals: bool,
    pub unordered: bool,
    pub parse_scientific_notation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_digits: Option<NumericSetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_decimals: Option<NumericSetting>,
    pub pad_zeros: bool,
    pub display_small_as_zero: SmallAsZero,
    pub display_blanks: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            simplify: SimplifyMode::None,
            expand: false,
            split_symbols: true,
            function_symbols: FxHashSet::default(),
            references_are_function_symbols: false,
            create_vectors: false,
            create_intervals: false,
            unordered: false,
            parse_scientific_notation: false,
            display_digits: None,
            display_decimals: None,
            pad_zeros: false,
            display_small_as_zero: SmallAsZero::default(),
            display_blanks: false,
        }
    }
}

impl EngineConfig {
    /// Read a configuration record from JSON; missing fields take defaults.
    pub fn from_json(json: &str) -> MathexResult<Self> {
        serde_json::from_str(json).map_err(MathexError::InvalidConfig)
    }

    /// A new configuration with every field set in `overrides` replaced.
    /// Sets replace rather than union: an explicit empty `functionSymbols`
    /// means no function symbols.
    pub fn extend(&self, overrides: &ConfigOverrides) -> EngineConfig {
        let mut merged = self.clone();
        macro_rules! replace {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = &overrides.$field {
                        merged.$field = value.clone();
                    }
                )*
            };
        }
        replace!(
            simplify,
            expand,
            split_symbols,
            function_symbols,
            references_are_function_symbols,
            create_vectors,
            create_intervals,
            unordered,
            parse_scientific_notation,
            pad_zeros,
            display_small_as_zero,
            display_blanks,
        );
        if let Some(digits) = &overrides.display_digits {
            merged.display_digits = Some(digits.clone());
        }
        if let Some(decimals) = &overrides.display_decimals {
            merged.display_decimals = Some(decimals.clone());
        }
        merged
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            split_symbols: self.split_symbols,
            function_symbols: self.function_symbols.clone(),
            create_vectors: self.create_vectors,
            create_intervals: self.create_intervals,
            parse_scientific_notation: self.parse_scientific_notation,
        }
    }

    /// Display settings with invalid values dropped. A valid
    /// `displayDecimals` wins over `displayDigits`.
    pub fn display_context(&self) -> DisplayContext {
        let decimals = self
            .display_decimals
            .as_ref()
            .and_then(NumericSetting::count)
            .filter(|d| *d <= MAX_DISPLAY_PRECISION)
            .map(Padding::Decimals);
        let digits = self
            .display_digits
            .as_ref()
            .and_then(NumericSetting::count)
            .filter(|d| (1..=MAX_DISPLAY_PRECISION).contains(d))
            .map(Padding::Digits);
        DisplayContext {
            rounding: decimals.or(digits),
            pad_zeros: self.pad_zeros,
            small_as_zero: self.display_small_as_zero.threshold(),
            display_blanks: self.display_blanks,
        }
    }
}

/// Locally set attributes of a composed expression. `None` inherits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigOverrides {
    pub simplify: Option<SimplifyMode>,
    pub expand: Option<bool>,
    pub split_symbols: Option<bool>,
    pub function_symbols: Option<FxHashSet<String>>,
    pub references_are_function_symbols: Option<bool>,
    pub create_vectors: Option<bool>,
    pub create_intervals: Option<bool>,
    pub unordered: Option<bool>,
    pub parse_scientific_notation: Option<bool>,
    pub display_digits: Option<NumericSetting>,
    pub display_decimals: Option<NumericSetting>,
    pub pad_zeros: Option<bool>,
    pub display_small_as_zero: Option<SmallAsZero>,
    pub display_blanks: Option<bool>,
}

impl ConfigOverrides {
    pub fn from_json(json: &str) -> MathexResult<Self> {
        serde_json::from_str(json).map_err(MathexError::InvalidConfig)
    }

    /// Whether any display attribute is set locally.
    pub fn sets_display(&self) -> bool {
        self.display_digits.is_some()
            || self.display_decimals.is_some()
            || self.pad_zeros.is_some()
            || self.display_small_as_zero.is_some()
            || self.display_blanks.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(config.split_symbols);
        assert_eq!(config.simplify, SimplifyMode::None);
    }

    #[test]
    fn camel_case_fields() {
        let config = EngineConfig::from_json(
            r#"{"simplify":"numberspreserveorder","functionSymbols":["f","g"],
                "displayDigits":3,"displaySmallAsZero":1e-8,"padZeros":true}"#,
        )
        .unwrap();
        assert_eq!(config.simplify, SimplifyMode::NumbersPreserveOrder);
        assert!(config.function_symbols.contains("g"));
        assert_eq!(config.display_context().rounding, Some(Padding::Digits(3)));
        assert_eq!(config.display_context().small_as_zero, Some(1e-8));
        assert!(config.pad_zeros);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"simplify": 3"#),
            Err(MathexError::InvalidConfig(_))
        ));
        assert!(EngineConfig::from_json(r#"{"simplify": "sometimes"}"#).is_err());
    }

    #[test]
    fn non_numeric_display_settings_are_inert() {
        let config = EngineConfig::from_json(
            r#"{"displayDigits":"abc","displayDecimals":{"x":1},"displaySmallAsZero":"yes"}"#,
        )
        .unwrap();
        let ctx = config.display_context();
        assert_eq!(ctx.rounding, None);
        assert_eq!(ctx.small_as_zero, None);
    }

    #[test]
    fn decimals_win_over_digits() {
        let config = EngineConfig {
            display_digits: Some(4.into()),
            display_decimals: Some(2.into()),
            ..EngineConfig::default()
        };
        assert_eq!(config.display_context().rounding, Some(Padding::Decimals(2)));

        let fallback = EngineConfig {
            display_digits: Some(4.into()),
            display_decimals: Some(NumericSetting::Other(Value::Bool(true))),
            ..EngineConfig::default()
        };
        assert_eq!(fallback.display_context().rounding, Some(Padding::Digits(4)));
    }

    #[test]
    fn small_as_zero_flag_uses_default_threshold() {
        assert_eq!(SmallAsZero::Flag(true).threshold(), Some(DEFAULT_SMALL_AS_ZERO));
        assert_eq!(SmallAsZero::Flag(false).threshold(), None);
        assert_eq!(SmallAsZero::Threshold(-1.0).threshold(), None);
    }

    #[test]
    fn overrides_replace_sets() {
        let mut base = EngineConfig::default();
        base.function_symbols.insert("f".to_string());
        let overrides = ConfigOverrides {
            function_symbols: Some(FxHashSet::default()),
            simplify: Some(SimplifyMode::Full),
            ..ConfigOverrides::default()
        };
        let merged = base.extend(&overrides);
        assert!(merged.function_symbols.is_empty());
        assert_eq!(merged.simplify, SimplifyMode::Full);
        assert!(!overrides.sets_display());
        // The base snapshot is untouched.
        assert!(base.function_symbols.contains("f"));
    }
}
