//! Serializable run configuration.
//!
//! # Examples
//!
//! ```
//! use grantxml::context::{DatabaseInsertMode, ProcessConfig};
//! use grantxml::segmenter::XmlFormat;
//!
//! let json = r#"{
//!     "xml_format": "gXML2",
//!     "document_type": "grant",
//!     "url_link": "https://bulkdata.uspto.gov/data/patent/grant/redbook/bibliographic/2002/pgb020101.zip",
//!     "output_modes": { "csv": false, "database": true },
//!     "database_insert_mode": "bulk",
//!     "csv_directory": "/tmp/grant_csv"
//! }"#;
//! let config = ProcessConfig::from_json_str(json)?;
//! assert_eq!(config.xml_format, XmlFormat::GXml2);
//! assert_eq!(config.database_insert_mode, DatabaseInsertMode::Bulk);
//! assert_eq!(config.source_file_id()?, "pgb020101");
//! # Ok::<(), grantxml::GrantError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::extract::DocumentType;
use crate::segmenter::XmlFormat;
use crate::{GrantError, Result};

/// Where extracted rows go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputModes {
    /// Keep CSV files after the run
    pub csv: bool,
    /// Write rows to the database
    pub database: bool,
}

impl OutputModes {
    /// Builds output modes from command arguments such as `["csv", "database"]`.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let mut modes = OutputModes::default();
        for arg in args {
            match arg.as_ref().to_lowercase().as_str() {
                "csv" => modes.csv = true,
                "database" => modes.database = true,
                other => return Err(GrantError::invalid_parameter(format!("Unknown output mode: {}", other))),
            }
        }
        Ok(modes)
    }
}

/// How rows reach the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseInsertMode {
    /// One insert per record while the file streams
    #[default]
    Streaming,
    /// CSV files are loaded once the whole file is segmented
    Bulk,
}

/// How several bulk-load results combine into one file verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkVerdict {
    /// The last table loaded decides
    #[default]
    LastLoad,
    /// Every table must load
    AllLoads,
}

/// Configuration of one run, without live handles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Dialect of the bulk file
    pub xml_format: XmlFormat,
    /// Kind of documents the file holds
    pub document_type: DocumentType,
    /// Source file id; derived from `url_link` when empty
    pub file_name: String,
    /// URL the bulk file was downloaded from
    pub url_link: String,
    pub output_modes: OutputModes,
    pub database_insert_mode: DatabaseInsertMode,
    /// Directory for CSV output, `~` is expanded
    pub csv_directory: String,
    /// Process log file, `~` is expanded
    pub process_log_path: String,
    pub bulk_verdict: BulkVerdict,
}

impl ProcessConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// The source file id: `file_name`, or the last `url_link` segment without extension.
    pub fn source_file_id(&self) -> Result<String> {
        if !self.file_name.is_empty() {
            return Ok(self.file_name.clone());
        }
        if self.url_link.is_empty() {
            return Err(GrantError::invalid_parameter("Either file_name or url_link is required"));
        }
        let url = Url::parse(&self.url_link)?;
        let segment = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| GrantError::invalid_parameter(format!("No file name in url: {}", self.url_link)))?;
        let stem = Path::new(segment)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| segment.to_string());
        Ok(stem)
    }

    pub fn csv_directory_path(&self) -> PathBuf {
        expand_path(&self.csv_directory)
    }

    pub fn process_log_file(&self) -> PathBuf {
        expand_path(&self.process_log_path)
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_file_id() {
        let cases = [
            ("", "https://bulkdata.uspto.gov/data/patent/grant/redbook/bibliographic/2014/ipgb20140107_wk01.zip", "ipgb20140107_wk01"),
            ("", "file:///data/pgb020101.xml", "pgb020101"),
            ("custom", "https://example.com/ignored.zip", "custom"),
        ];
        for (file_name, url_link, expected) in cases {
            let config = ProcessConfig {
                file_name: file_name.to_string(),
                url_link: url_link.to_string(),
                ..Default::default()
            };
            assert_eq!(config.source_file_id().unwrap(), expected, "{} / {}", file_name, url_link);
        }
        assert!(ProcessConfig::default().source_file_id().is_err());
        let config = ProcessConfig { url_link: "not a url".to_string(), ..Default::default() };
        assert!(config.source_file_id().is_err());
    }

    #[test]
    fn test_output_modes_from_args() {
        let modes = OutputModes::from_args(&["csv", "DATABASE"]).unwrap();
        assert!(modes.csv && modes.database);
        assert_eq!(OutputModes::from_args::<&str>(&[]).unwrap(), OutputModes::default());
        assert!(OutputModes::from_args(&["xml"]).is_err());
    }

    #[test]
    fn test_json_defaults() {
        let config = ProcessConfig::from_json_str(r#"{"file_name": "ipg140107"}"#).unwrap();
        assert_eq!(config.xml_format, XmlFormat::GXml4);
        assert_eq!(config.database_insert_mode, DatabaseInsertMode::Streaming);
        assert_eq!(config.bulk_verdict, BulkVerdict::LastLoad);
        assert!(!config.output_modes.csv);

        let json = serde_json::to_string(&ProcessConfig {
            bulk_verdict: BulkVerdict::AllLoads,
            ..Default::default()
        })
        .unwrap();
        assert!(json.contains("\"all_loads\""));
        assert!(ProcessConfig::from_json_str("{\"xml_format\": \"gXML9\"}").is_err());
    }
}
