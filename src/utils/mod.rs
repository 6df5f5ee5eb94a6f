//! Utility modules

pub mod error;

pub use error::{MathexError, MathexResult};
