//! Field extraction from grant fragments.
//!
//! Both dialects are read with the same element-path walker; only the path
//! rules differ. A rule matches when its path is a suffix of the current
//! element stack, so `["B110", "DNUM", "PDAT"]` matches
//! `PATDOC/SDOBI/B100/B110/DNUM/PDAT`.

use chrono::NaiveDate;
use log::debug;
use quick_xml::events::Event;

use crate::context::ProcessContext;
use crate::extract::grant_record::{GrantRecord, Inventor, ProcessedGrant};
use crate::segmenter::XmlFormat;
use crate::{GrantError, Result};

/// Turns one record fragment into a structured payload.
pub trait DataExtractor {
    /// Extracts the payload of `fragment`.
    ///
    /// # Errors
    ///
    /// Returns an error when the fragment is not well-formed XML or lacks the
    /// data every record must carry. The error aborts the run.
    fn extract(&mut self, fragment: &str, ctx: &ProcessContext) -> Result<ProcessedGrant>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GrantField {
    GrantId,
    Kind,
    IssueDate,
    AppId,
    AppDate,
    InventorFirstName,
    InventorLastName,
    InventorCity,
    InventorCountry,
}

struct DialectRules {
    title_element: &'static str,
    inventor_element: &'static str,
    fields: &'static [(&'static [&'static str], GrantField)],
}

const MODERN_RULES: DialectRules = DialectRules {
    title_element: "invention-title",
    inventor_element: "inventor",
    fields: &[
        (&["publication-reference", "document-id", "doc-number"], GrantField::GrantId),
        (&["publication-reference", "document-id", "kind"], GrantField::Kind),
        (&["publication-reference", "document-id", "date"], GrantField::IssueDate),
        (&["application-reference", "document-id", "doc-number"], GrantField::AppId),
        (&["application-reference", "document-id", "date"], GrantField::AppDate),
        (&["addressbook", "first-name"], GrantField::InventorFirstName),
        (&["addressbook", "last-name"], GrantField::InventorLastName),
        (&["addressbook", "address", "city"], GrantField::InventorCity),
        (&["addressbook", "address", "country"], GrantField::InventorCountry),
    ],
};

const LEGACY_RULES: DialectRules = DialectRules {
    title_element: "B540",
    inventor_element: "B721",
    fields: &[
        (&["B110", "DNUM", "PDAT"], GrantField::GrantId),
        (&["B130", "PDAT"], GrantField::Kind),
        (&["B140", "DATE", "PDAT"], GrantField::IssueDate),
        (&["B210", "DNUM", "PDAT"], GrantField::AppId),
        (&["B220", "DATE", "PDAT"], GrantField::AppDate),
        (&["NAM", "FNM", "PDAT"], GrantField::InventorFirstName),
        (&["NAM", "SNM", "STEXT", "PDAT"], GrantField::InventorLastName),
        (&["ADR", "CITY", "PDAT"], GrantField::InventorCity),
        (&["ADR", "CTRY", "PDAT"], GrantField::InventorCountry),
    ],
};

fn rules_for(format: XmlFormat) -> &'static DialectRules {
    match format {
        XmlFormat::GXml4 => &MODERN_RULES,
        XmlFormat::GXml2 => &LEGACY_RULES,
    }
}

/// Default extractor for `us-patent-grant` and `PATDOC` fragments.
#[derive(Debug, Default)]
pub struct GrantExtractor;

impl GrantExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Parses a fragment of the given dialect into a [`GrantRecord`].
    pub fn parse_record(fragment: &str, format: XmlFormat) -> Result<GrantRecord> {
        let rules = rules_for(format);
        let mut reader = quick_xml::Reader::from_str(fragment);
        let mut path: Vec<String> = Vec::with_capacity(16);
        let mut record = GrantRecord::default();
        let mut text = String::new();

        loop {
            text.clear();
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if name == rules.inventor_element {
                        record.inventors.push(Inventor::default());
                    }
                    path.push(name);
                    continue;
                }
                Event::End(_) => {
                    path.pop();
                    continue;
                }
                Event::Text(t) => text.push_str(&String::from_utf8_lossy(&t)),
                Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
                Event::GeneralRef(r) => resolve_reference(&String::from_utf8_lossy(&r), &mut text),
                Event::Eof => break,
                _ => continue,
            }
            append_text(&mut record, rules, &path, &text);
        }

        if !path.is_empty() {
            return Err(GrantError::invalid_data_format(format!(
                "Unclosed element {} in {} fragment",
                path.join("/"),
                format.root_element()
            )));
        }
        finish_record(&mut record);
        if record.grant_id.is_empty() {
            return Err(GrantError::invalid_data_format(format!(
                "No grant document number in {} fragment",
                format.root_element()
            )));
        }
        Ok(record)
    }
}

impl DataExtractor for GrantExtractor {
    fn extract(&mut self, fragment: &str, ctx: &ProcessContext) -> Result<ProcessedGrant> {
        let record = Self::parse_record(fragment, ctx.xml_format)?;
        debug!("Extracted grant {} with {} inventors", record.grant_id, record.inventors.len());
        Ok(record.into_processed(&ctx.source_file_id))
    }
}

fn resolve_reference(name: &str, text: &mut String) {
    let ch = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    };
    match ch {
        Some(ch) => text.push(ch),
        None => match quick_xml::escape::resolve_xml_entity(name) {
            Some(resolved) => text.push_str(resolved),
            None => {
                text.push('&');
                text.push_str(name);
                text.push(';');
            }
        },
    }
}

fn path_ends_with(path: &[String], suffix: &[&str]) -> bool {
    path.len() >= suffix.len()
        && path[path.len() - suffix.len()..].iter().zip(suffix).all(|(a, b)| a == b)
}

fn append_text(record: &mut GrantRecord, rules: &DialectRules, path: &[String], text: &str) {
    if path.iter().any(|name| name == rules.title_element) {
        record.title.push_str(text);
        return;
    }
    let Some(field) = rules
        .fields
        .iter()
        .find(|(suffix, _)| path_ends_with(path, suffix))
        .map(|(_, field)| *field)
    else {
        return;
    };
    let in_inventor = path.iter().any(|name| name == rules.inventor_element);
    let target = match field {
        GrantField::GrantId => &mut record.grant_id,
        GrantField::Kind => &mut record.kind,
        GrantField::IssueDate => &mut record.issue_date,
        GrantField::AppId => &mut record.app_id,
        GrantField::AppDate => &mut record.app_date,
        inventor_field => {
            if !in_inventor {
                return;
            }
            let Some(inventor) = record.inventors.last_mut() else {
                return;
            };
            match inventor_field {
                GrantField::InventorFirstName => &mut inventor.first_name,
                GrantField::InventorLastName => &mut inventor.last_name,
                GrantField::InventorCity => &mut inventor.city,
                _ => &mut inventor.country,
            }
        }
    };
    target.push_str(text);
}

fn collapse_whitespace(value: &mut String) {
    let collapsed = value.split_whitespace().collect::<Vec<&str>>().join(" ");
    *value = collapsed;
}

// YYYYMMDD to ISO; USPTO zero-fills unknown day/month, those stay as they are.
fn normalize_date(value: &mut String) {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y%m%d") {
        *value = date.format("%Y-%m-%d").to_string();
    }
}

fn finish_record(record: &mut GrantRecord) {
    for value in [
        &mut record.grant_id,
        &mut record.kind,
        &mut record.title,
        &mut record.issue_date,
        &mut record.app_id,
        &mut record.app_date,
    ] {
        collapse_whitespace(value);
    }
    normalize_date(&mut record.issue_date);
    normalize_date(&mut record.app_date);
    for inventor in record.inventors.iter_mut() {
        for value in [
            &mut inventor.first_name,
            &mut inventor.last_name,
            &mut inventor.city,
            &mut inventor.country,
        ] {
            collapse_whitespace(value);
        }
    }
}
