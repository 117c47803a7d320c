//! Plume CSS Stylesheet Toolkit
//!
//! Byte-level CSS parsing into a flat, mutable rule model, cascade
//! flattening and serialization back to compact or indented CSS.
//! Supports CSS nesting, media query combination, selector lists and
//! shorthand expansion/recreation. Color literals are rewritten through
//! `plume-color`.

pub mod error;
pub mod flatten;
pub mod media;
pub mod parser;
pub mod rules;
pub mod scanner;
pub mod serializer;
pub mod shorthand;
pub mod specificity;
mod colors;
mod stylesheet;

pub use error::{CssError, ParseWarning, WarningKind};
pub use flatten::flatten;
pub use media::{MediaQualifier, MediaQuery, combine_media_queries};
pub use parser::{ParserOptions, resolve_nested_selector};
pub use rules::{AtRule, AtRuleContent, Declaration, ImportStatement, NestingStyle, Rule, StyleNode};
pub use serializer::reconstruct_nested_selector;
pub use specificity::calculate_specificity;
pub use stylesheet::{Stylesheet, parse_stylesheet};

pub use plume_color::{ColorConversion, ColorError, ColorFormat, SourceFormat, Variant};
