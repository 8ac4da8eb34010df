//! Entity normalization for record interior lines.
//!
//! Grant files reference HTML and ISO SGML character entities that are
//! declared only in their DTDs. A fragment cut out of the file has no DTD, so
//! every such entity must be rewritten before the fragment can be parsed on
//! its own:
//!
//! - the five XML entities and numeric references are kept
//! - known named entities become numeric character references
//! - unknown named entities and bare `&` are escaped as `&amp;`
//!
//! The legacy (`PATDOC`) rule set also knows the ISO SGML entity names that the
//! old Green Book conversion used for punctuation and Greek letters.
//!
//! # Examples
//!
//! ```
//! use grantxml::sanitizer::{normalize_entities_legacy, normalize_entities_modern};
//!
//! assert_eq!(normalize_entities_modern("5&deg; C &amp; up"), "5&#176; C &amp; up");
//! assert_eq!(normalize_entities_legacy("&lsqb;0001&rsqb;"), "&#91;0001&#93;");
//! assert_eq!(normalize_entities_modern("AT&T"), "AT&amp;T");
//! ```

use std::fmt::Write;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENTITY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]+;|#[xX][0-9A-Fa-f]+;|[A-Za-z][A-Za-z0-9]*;)?")
        .expect("valid entity pattern")
});

const XML_ENTITIES: [&str; 5] = ["amp", "lt", "gt", "quot", "apos"];

/// Rewrites entities of a modern (`us-patent-grant`) line.
pub fn normalize_entities_modern(line: &str) -> String {
    normalize_with(line, |_| None)
}

/// Rewrites entities of a legacy (`PATDOC`) line.
pub fn normalize_entities_legacy(line: &str) -> String {
    normalize_with(line, sgml_entity)
}

fn normalize_with(line: &str, extra: fn(&str) -> Option<char>) -> String {
    if !line.contains('&') {
        return line.to_string();
    }
    ENTITY_REGEX
        .replace_all(line, |caps: &Captures| {
            let Some(reference) = caps.get(1) else {
                return "&amp;".to_string();
            };
            let reference = reference.as_str();
            if reference.starts_with('#') {
                return format!("&{}", reference);
            }
            let name = &reference[..reference.len() - 1];
            if XML_ENTITIES.contains(&name) {
                return format!("&{}", reference);
            }
            if let Some(ch) = extra(name) {
                return format!("&#{};", ch as u32);
            }
            match htmlescape::decode_html(&format!("&{};", name)) {
                Ok(decoded) => {
                    let mut out = String::with_capacity(8);
                    for ch in decoded.chars() {
                        let _ = write!(out, "&#{};", ch as u32);
                    }
                    out
                }
                Err(_) => format!("&amp;{}", reference),
            }
        })
        .into_owned()
}

// ISO 8879 entity names found in PATDOC files that are not HTML 4 entities.
fn sgml_entity(name: &str) -> Option<char> {
    let ch = match name {
        "lsqb" => '[',
        "rsqb" => ']',
        "lcub" => '{',
        "rcub" => '}',
        "lpar" => '(',
        "rpar" => ')',
        "plus" => '+',
        "equals" => '=',
        "hyphen" => '-',
        "dash" => '\u{2010}',
        "excl" => '!',
        "num" => '#',
        "dollar" => '$',
        "percnt" => '%',
        "ast" => '*',
        "commat" => '@',
        "lowbar" => '_',
        "sol" => '/',
        "bsol" => '\\',
        "colon" => ':',
        "semi" => ';',
        "quest" => '?',
        "verbar" => '|',
        "grave" => '`',
        "horbar" => '\u{2015}',
        "ohm" => '\u{2126}',
        "angst" => '\u{212B}',
        "agr" => '\u{3B1}',
        "bgr" => '\u{3B2}',
        "ggr" => '\u{3B3}',
        "dgr" => '\u{3B4}',
        "egr" => '\u{3B5}',
        "zgr" => '\u{3B6}',
        "eegr" => '\u{3B7}',
        "thgr" => '\u{3B8}',
        "igr" => '\u{3B9}',
        "kgr" => '\u{3BA}',
        "lgr" => '\u{3BB}',
        "mgr" => '\u{3BC}',
        "ngr" => '\u{3BD}',
        "xgr" => '\u{3BE}',
        "pgr" => '\u{3C0}',
        "rgr" => '\u{3C1}',
        "sgr" => '\u{3C3}',
        "tgr" => '\u{3C4}',
        "phgr" => '\u{3C6}',
        "khgr" => '\u{3C7}',
        "psgr" => '\u{3C8}',
        "ohgr" => '\u{3C9}',
        "Dgr" => '\u{394}',
        "THgr" => '\u{398}',
        "Lgr" => '\u{39B}',
        "Pgr" => '\u{3A0}',
        "Sgr" => '\u{3A3}',
        "PHgr" => '\u{3A6}',
        "OHgr" => '\u{3A9}',
        _ => return None,
    };
    Some(ch)
}
