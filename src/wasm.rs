//! WASM bindings for mathex
//!
//! This module exposes the processing pipeline to a JavaScript host.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use serde::Serialize;

#[cfg(feature = "wasm")]
use crate::{process, EngineConfig, ParseIssue, Syntax};

/// Result of `processMath`
#[cfg(feature = "wasm")]
#[derive(Serialize)]
pub struct ProcessResult {
    pub latex: String,
    pub text: String,
    /// Structured form of the processed tree
    pub tree: serde_json::Value,
    pub issues: Vec<ParseIssue>,
    /// Set when the configuration or the tree could not be read or written
    pub error: Option<String>,
}

/// Serialize a value to JsValue without panicking.
#[cfg(feature = "wasm")]
fn to_js_value<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or_else(|e| {
        let error_obj = ProcessResult {
            latex: String::new(),
            text: String::new(),
            tree: serde_json::Value::Null,
            issues: vec![],
            error: Some(format!("Serialization error: {}", e)),
        };
        serde_wasm_bindgen::to_value(&error_obj).unwrap_or(JsValue::NULL)
    })
}

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Process one expression.
///
/// # Arguments
/// * `input` - expression source
/// * `syntax` - `"text"` or `"latex"`
/// * `config` - configuration object; missing fields take defaults
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "processMath")]
pub fn process_math(input: &str, syntax: &str, config: JsValue) -> JsValue {
    let syntax = match syntax {
        "latex" => Syntax::Latex,
        _ => Syntax::Text,
    };
    let config: EngineConfig = if config.is_undefined() || config.is_null() {
        EngineConfig::default()
    } else {
        match serde_wasm_bindgen::from_value(config) {
            Ok(config) => config,
            Err(e) => {
                return to_js_value(&ProcessResult {
                    latex: String::new(),
                    text: String::new(),
                    tree: serde_json::Value::Null,
                    issues: vec![],
                    error: Some(format!("invalid configuration: {}", e)),
                })
            }
        }
    };

    let result = process(input, syntax, &config);
    let (tree, error) = match crate::to_structured_value(&result.processed) {
        Ok(tree) => (tree, None),
        Err(e) => (serde_json::Value::Null, Some(e.to_string())),
    };
    to_js_value(&ProcessResult {
        latex: result.latex,
        text: result.text,
        tree,
        issues: result.issues,
        error,
    })
}

/// Render a structured tree (JSON) as LaTeX.
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "treeToLatex")]
pub fn tree_to_latex(json: &str) -> Result<String, JsValue> {
    let tree = crate::from_structured_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(crate::render_latex(&tree, &crate::LatexRenderOptions::default()))
}
