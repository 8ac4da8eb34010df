//! Grant file dialects and their record boundary markers.

use serde::{Deserialize, Serialize};

use crate::sanitizer::{normalize_entities_legacy, normalize_entities_modern};
use crate::{GrantError, Result};

/// XML generation of a grant bulk file.
///
/// The dialect is a property of the file being processed and is chosen by the
/// caller; it is never sniffed from content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum XmlFormat {
    /// `us-patent-grant` files (ST.36 based, 2005 onwards)
    #[default]
    #[serde(rename = "gXML4")]
    GXml4,
    /// `PATDOC` files (ST.32 based, 2001 to 2004)
    #[serde(rename = "gXML2")]
    GXml2,
}

/// How a single line relates to record boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Open,
    Close,
    Interior,
}

impl XmlFormat {
    /// Parses a dialect label such as `gXML4`.
    pub fn from_label(label: &str) -> Result<Self> {
        match label.to_lowercase().as_str() {
            "gxml4" => Ok(XmlFormat::GXml4),
            "gxml2" => Ok(XmlFormat::GXml2),
            _ => Err(GrantError::invalid_parameter(format!("Unsupported xml format: {}", label))),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            XmlFormat::GXml4 => "gXML4",
            XmlFormat::GXml2 => "gXML2",
        }
    }

    /// Root element name of one record.
    pub fn root_element(&self) -> &'static str {
        match self {
            XmlFormat::GXml4 => "us-patent-grant",
            XmlFormat::GXml2 => "PATDOC",
        }
    }

    pub fn open_marker(&self) -> &'static str {
        match self {
            XmlFormat::GXml4 => "<us-patent-grant",
            XmlFormat::GXml2 => "<PATDOC",
        }
    }

    pub fn close_marker(&self) -> &'static str {
        match self {
            XmlFormat::GXml4 => "</us-patent-grant",
            XmlFormat::GXml2 => "</PATDOC",
        }
    }

    /// Bare opening tag that starts every fragment. Marker attributes are dropped.
    pub fn open_tag(&self) -> &'static str {
        match self {
            XmlFormat::GXml4 => "<us-patent-grant>",
            XmlFormat::GXml2 => "<PATDOC>",
        }
    }

    pub fn close_tag(&self) -> &'static str {
        match self {
            XmlFormat::GXml4 => "</us-patent-grant>",
            XmlFormat::GXml2 => "</PATDOC>",
        }
    }

    /// Classifies a decoded line. The open marker wins when both appear.
    pub fn classify(&self, line: &str) -> LineKind {
        if line.contains(self.open_marker()) {
            LineKind::Open
        } else if line.contains(self.close_marker()) {
            LineKind::Close
        } else {
            LineKind::Interior
        }
    }

    /// Applies this dialect's entity rules to an interior line.
    pub fn normalize_entities(&self, line: &str) -> String {
        match self {
            XmlFormat::GXml4 => normalize_entities_modern(line),
            XmlFormat::GXml2 => normalize_entities_legacy(line),
        }
    }
}
