//! Typed random value primitives and template tokens.
//!
//! Every generator takes the caller's RNG so a seeded RNG gives
//! reproducible output.

pub mod numeric;
pub mod point;
pub mod text;
pub mod timestamp;
pub mod tokens;
pub mod uuid;

pub use tokens::{expand_template, lookup, tokens, Token};
