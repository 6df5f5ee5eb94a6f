//! Lossless structured form of expression trees.
//!
//! The JSON form is the serde encoding of [`Expr`]. Non-finite floats are
//! written as the strings `"Infinity"`, `"-Infinity"` and `"NaN"`, and the
//! sign of zero survives the round trip.

use mathex_ir::Expr;
use serde_json::Value;

use crate::utils::{MathexError, MathexResult};

pub fn to_structured_value(tree: &Expr) -> MathexResult<Value> {
    serde_json::to_value(tree).map_err(MathexError::Serialize)
}

pub fn to_structured_json(tree: &Expr, pretty: bool) -> MathexResult<String> {
    let json = if pretty {
        serde_json::to_string_pretty(tree)
    } else {
        serde_json::to_string(tree)
    };
    json.map_err(MathexError::Serialize)
}

pub fn from_structured_json(json: &str) -> MathexResult<Expr> {
    serde_json::from_str(json).map_err(MathexError::InvalidTree)
}
