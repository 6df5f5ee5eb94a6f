//! Engine stages, in pipeline order: parse, normalize, simplify, expand,
//! format. The serializers for LaTeX live in `mathex-latex-backend`; plain
//! text is rendered by [`text`].

pub mod evaluate;
pub mod expand;
pub mod format;
pub mod normalize;
pub mod parse;
pub mod simplify;
pub mod text;
