//! Process log recording which bulk files have been loaded.
//!
//! The log is a headerless CSV file with one `link,document_type,status,time`
//! row per bulk file. A caller queues files as `Unprocessed`; a successful run
//! rewrites its row to `Processed`.

use std::path::{Path, PathBuf};

use chrono::Local;
use log::debug;

use crate::context::ProcessContext;
use crate::Result;

pub const STATUS_PROCESSED: &str = "Processed";
pub const STATUS_UNPROCESSED: &str = "Unprocessed";

/// Records the completion of a run.
pub trait ProcessLogWriter {
    fn write_completion(&mut self, ctx: &ProcessContext) -> Result<()>;
}

/// [`ProcessLogWriter`] backed by a CSV file.
#[derive(Debug, Clone)]
pub struct FileProcessLog {
    path: PathBuf,
}

impl FileProcessLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all rows; a missing log reads as empty.
    pub fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(|s| s.to_string()).collect());
        }
        Ok(rows)
    }

    fn write_rows(&self, rows: &[Vec<String>]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut writer = csv::WriterBuilder::new().flexible(true).from_path(&self.path)?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Adds `link` as unprocessed unless it is already listed.
    pub fn queue(&mut self, link: &str, document_type: &str) -> Result<()> {
        let mut rows = self.read_rows()?;
        if rows.iter().any(|row| row.first().map(String::as_str) == Some(link)) {
            return Ok(());
        }
        rows.push(vec![link.to_string(), document_type.to_string(), STATUS_UNPROCESSED.to_string(), String::new()]);
        self.write_rows(&rows)
    }

    pub fn status_of(&self, link: &str) -> Result<Option<String>> {
        Ok(self
            .read_rows()?
            .into_iter()
            .find(|row| row.first().map(String::as_str) == Some(link))
            .and_then(|row| row.get(2).cloned()))
    }
}

impl ProcessLogWriter for FileProcessLog {
    fn write_completion(&mut self, ctx: &ProcessContext) -> Result<()> {
        let link = ctx.display_source().to_string();
        let finished = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let mut rows = self.read_rows()?;
        let mut found = false;
        for row in rows.iter_mut().filter(|row| row.first() == Some(&link)) {
            row.resize(4, String::new());
            row[1] = ctx.document_type.as_str().to_string();
            row[2] = STATUS_PROCESSED.to_string();
            row[3] = finished.clone();
            found = true;
        }
        if !found {
            rows.push(vec![link.clone(), ctx.document_type.as_str().to_string(), STATUS_PROCESSED.to_string(), finished]);
        }
        self.write_rows(&rows)?;
        debug!("Process log {} marks {} as processed", self.path.display(), link);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ProcessConfig;

    fn context(url: &str) -> ProcessContext {
        let config = ProcessConfig { url_link: url.to_string(), ..Default::default() };
        ProcessContext::from_config(&config, None).unwrap()
    }

    #[test]
    fn test_completion_rewrites_queued_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = FileProcessLog::new(dir.path().join("logs").join("grant_process_log.csv"));
        let first = "https://bulkdata.uspto.gov/data/patent/grant/redbook/bibliographic/2014/ipgb20140107_wk01.zip";
        let second = "https://bulkdata.uspto.gov/data/patent/grant/redbook/bibliographic/2014/ipgb20140114_wk02.zip";
        log.queue(first, "grant").unwrap();
        log.queue(second, "grant").unwrap();
        log.queue(first, "grant").unwrap();
        assert_eq!(log.read_rows().unwrap().len(), 2);

        log.write_completion(&context(second)).unwrap();
        assert_eq!(log.status_of(first).unwrap().as_deref(), Some(STATUS_UNPROCESSED));
        assert_eq!(log.status_of(second).unwrap().as_deref(), Some(STATUS_PROCESSED));
        assert_eq!(log.read_rows().unwrap().len(), 2);
    }

    #[test]
    fn test_completion_appends_unknown_link() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = FileProcessLog::new(dir.path().join("log.csv"));
        assert_eq!(log.status_of("x").unwrap(), None);
        log.write_completion(&context("file:///data/pgb020101.zip")).unwrap();
        let rows = log.read_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "file:///data/pgb020101.zip");
        assert_eq!(rows[0][2], STATUS_PROCESSED);
    }
}
