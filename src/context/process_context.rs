//! Per-run processing context.

use std::fmt;
use std::path::PathBuf;

use crate::context::process_config::{BulkVerdict, DatabaseInsertMode, OutputModes, ProcessConfig};
use crate::extract::DocumentType;
use crate::segmenter::XmlFormat;
use crate::storage::{CsvHandleTable, GrantDatabase};
use crate::{GrantError, Result};

/// State of one run, owned by the caller and lent to every stage.
pub struct ProcessContext {
    pub xml_format: XmlFormat,
    pub document_type: DocumentType,
    pub source_file_id: String,
    pub source_url: String,
    pub output_modes: OutputModes,
    pub insert_mode: DatabaseInsertMode,
    pub csv_directory: PathBuf,
    pub bulk_verdict: BulkVerdict,
    /// Open CSV files, empty until the run opens them
    pub csv_handles: CsvHandleTable,
    pub database: Option<Box<dyn GrantDatabase>>,
}

impl fmt::Debug for ProcessContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessContext")
            .field("xml_format", &self.xml_format)
            .field("document_type", &self.document_type)
            .field("source_file_id", &self.source_file_id)
            .field("source_url", &self.source_url)
            .field("output_modes", &self.output_modes)
            .field("insert_mode", &self.insert_mode)
            .field("csv_directory", &self.csv_directory)
            .field("bulk_verdict", &self.bulk_verdict)
            .field("csv_handles", &self.csv_handles.len())
            .field("database", &self.database.is_some())
            .finish()
    }
}

impl ProcessContext {
    /// Builds a context from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source file id cannot be determined, or if
    /// database output is requested without a database.
    pub fn from_config(config: &ProcessConfig, database: Option<Box<dyn GrantDatabase>>) -> Result<Self> {
        if config.output_modes.database && database.is_none() {
            return Err(GrantError::invalid_parameter("Database output requested without a database connection"));
        }
        Ok(Self {
            xml_format: config.xml_format,
            document_type: config.document_type,
            source_file_id: config.source_file_id()?,
            source_url: config.url_link.clone(),
            output_modes: config.output_modes,
            insert_mode: config.database_insert_mode,
            csv_directory: config.csv_directory_path(),
            bulk_verdict: config.bulk_verdict,
            csv_handles: CsvHandleTable::empty(),
            database,
        })
    }

    /// CSV files are needed for CSV output and for bulk database loads.
    pub fn requires_csv_handles(&self) -> bool {
        self.output_modes.csv || self.requires_bulk_load()
    }

    pub fn requires_bulk_load(&self) -> bool {
        self.output_modes.database && self.insert_mode == DatabaseInsertMode::Bulk
    }

    pub fn requires_streaming_insert(&self) -> bool {
        self.output_modes.database && self.insert_mode == DatabaseInsertMode::Streaming
    }

    /// CSV files survive a successful run only when CSV output was requested.
    pub fn keeps_csv_files(&self) -> bool {
        self.output_modes.csv
    }

    /// Name used in status lines: the source URL, or the file id without one.
    pub fn display_source(&self) -> &str {
        if self.source_url.is_empty() { &self.source_file_id } else { &self.source_url }
    }
}
