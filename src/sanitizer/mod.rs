// Line sanitizing helpers
//
// Decoding of raw stream lines and dialect-specific entity rewriting applied
// to every interior line of a record before it is accumulated.

pub mod decoder;
pub mod entities;

pub use decoder::{decode_line, decode_line_with, FALLBACK_ENCODINGS};
pub use entities::{normalize_entities_legacy, normalize_entities_modern};
