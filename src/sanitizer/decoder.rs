//! Line decoding with encoding fallback.
//!
//! Bulk grant files are nominally UTF-8, but older weekly files mix in
//! Windows-1252 bytes (smart quotes, degree signs) on individual lines. Each
//! line is therefore decoded on its own:
//! - strict UTF-8 first
//! - then each fallback encoding in order
//! - then lossy UTF-8 as the last resort
//!
//! # Examples
//!
//! ```
//! use grantxml::sanitizer::decode_line;
//!
//! assert_eq!(decode_line(b"<PDAT>plain</PDAT>\n"), "<PDAT>plain</PDAT>\n");
//! // 0x93/0x94 are curly quotes in Windows-1252
//! assert_eq!(decode_line(b"\x93quoted\x94"), "\u{201C}quoted\u{201D}");
//! ```

use encoding_rs::Encoding;
use log::debug;

/// Encodings tried, in order, after strict UTF-8 fails.
pub const FALLBACK_ENCODINGS: [&Encoding; 1] = [encoding_rs::WINDOWS_1252];

fn skip_utf8_bom(raw: &[u8]) -> &[u8] {
    raw.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(raw)
}

/// Decodes one raw line into text. Never fails.
pub fn decode_line(raw: &[u8]) -> String {
    decode_line_with(raw, &FALLBACK_ENCODINGS)
}

/// Decodes one raw line trying the given fallback encodings after UTF-8.
pub fn decode_line_with(raw: &[u8], fallbacks: &[&'static Encoding]) -> String {
    let raw = skip_utf8_bom(raw);
    if let Ok(text) = std::str::from_utf8(raw) {
        return text.to_string();
    }
    for encoding in fallbacks {
        let (decoded, had_errors) = encoding.decode_without_bom_handling(raw);
        if !had_errors {
            debug!("Line decoded with fallback encoding {}", encoding.name());
            return decoded.into_owned();
        }
    }
    debug!("Line decoded lossily, {} bytes", raw.len());
    String::from_utf8_lossy(raw).into_owned()
}
