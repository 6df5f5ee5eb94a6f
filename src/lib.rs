//! # Mathex
//!
//! A symbolic expression engine. Mathex reads mathematics written as plain
//! text or LaTeX, normalizes it, simplifies it to a chosen degree, formats
//! its numbers and renders it back as LaTeX, Unicode text or a structured
//! tree.
//!
//! ## Example
//!
//! ```rust
//! use mathex::{process, EngineConfig, SimplifyMode, Syntax};
//!
//! let config = EngineConfig {
//!     expand: true,
//!     simplify: SimplifyMode::Full,
//!     ..EngineConfig::default()
//! };
//! let result = process("(x-3)(2x+4)", Syntax::Text, &config);
//! assert_eq!(result.latex, "2 x^{2} - 2 x - 12");
//! ```

pub mod config;
pub mod core;
pub mod pipeline;
pub mod structured;
pub mod utils;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::{ConfigOverrides, EngineConfig, NumericSetting, SimplifyMode, SmallAsZero};
pub use crate::core::evaluate::{evaluate, Bindings};
pub use crate::core::expand::expand;
pub use crate::core::format::{format, DisplayContext, Formatted};
pub use crate::core::normalize::References;
pub use crate::core::parse::{parse, parse_with_report, IssueKind, ParseIssue, ParseOptions, Syntax};
pub use crate::core::simplify::simplify;
pub use crate::core::text::{to_text, TextRenderOptions};
pub use mathex_ir::{Aggregate, AggregateKind, Expr, Number, Operator};
pub use mathex_latex_backend::{render_latex, LatexRenderOptions};
pub use pipeline::{compose, process, process_tree, Children, MathResult};
pub use structured::{from_structured_json, to_structured_json, to_structured_value};
pub use utils::{MathexError, MathexResult};
