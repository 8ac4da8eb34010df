//! CSV handle table for one run.
//!
//! One CSV file is opened per output table of the document type, named
//! `<source_file_id>_<table_key>.csv`, with a header row. Handles are keyed by
//! table key and kept in table order, which is also the bulk-load order.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, warn};

use crate::extract::{DocumentType, TableSchema};
use crate::{GrantError, Result};

/// One CSV output file.
#[derive(Debug)]
pub struct CsvHandle {
    pub table: &'static TableSchema,
    pub path: PathBuf,
    writer: Option<csv::Writer<File>>,
    rows_written: u64,
}

impl CsvHandle {
    fn create(table: &'static TableSchema, path: PathBuf) -> Result<Self> {
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(table.columns)?;
        Ok(Self { table, path, writer: Some(writer), rows_written: 0 })
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    fn write_rows(&mut self, rows: &[Vec<String>]) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            GrantError::general_error(format!("CSV file already closed: {}", self.path.display()))
        })?;
        for row in rows {
            if row.len() != self.table.columns.len() {
                return Err(GrantError::invalid_data_format(format!(
                    "Row for {} has {} fields, expected {}",
                    self.table.key,
                    row.len(),
                    self.table.columns.len()
                )));
            }
            writer.write_record(row)?;
        }
        self.rows_written += rows.len() as u64;
        Ok(())
    }

    // Returns true when this call released the writer.
    fn close(&mut self) -> Result<bool> {
        match self.writer.take() {
            Some(mut writer) => {
                writer.flush()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Table of open CSV handles, keyed by table key.
#[derive(Debug, Default)]
pub struct CsvHandleTable {
    handles: IndexMap<String, CsvHandle>,
}

impl CsvHandleTable {
    /// Creates an empty table; closing or deleting it is a no-op.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Opens one CSV file per table of `document_type` inside `dir`.
    pub fn open<P: AsRef<Path>>(document_type: DocumentType, source_file_id: &str, dir: P) -> Result<Self> {
        if source_file_id.is_empty() {
            return Err(GrantError::invalid_parameter("Source file id cannot be empty"));
        }
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let mut handles = IndexMap::new();
        for table in document_type.tables() {
            let path = dir.join(format!("{}_{}.csv", source_file_id, table.key));
            debug!("Opening CSV file {}", path.display());
            handles.insert(table.key.to_string(), CsvHandle::create(table, path)?);
        }
        Ok(Self { handles })
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&CsvHandle> {
        self.handles.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CsvHandle)> {
        self.handles.iter()
    }

    pub fn write_rows(&mut self, key: &str, rows: &[Vec<String>]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let handle = self
            .handles
            .get_mut(key)
            .ok_or_else(|| GrantError::invalid_parameter(format!("No CSV file open for {}", key)))?;
        handle.write_rows(rows)
    }

    /// Flushes and releases every open writer. Handles already closed are skipped.
    ///
    /// Returns the number of handles closed by this call.
    pub fn close_all(&mut self) -> Result<usize> {
        let mut closed = 0;
        for handle in self.handles.values_mut() {
            if handle.close()? {
                closed += 1;
            }
        }
        Ok(closed)
    }

    /// Closes and removes every CSV file, then empties the table.
    pub fn delete_all(&mut self) -> Result<()> {
        self.close_all()?;
        for (_, handle) in self.handles.drain(..) {
            match fs::remove_file(&handle.path) {
                Ok(()) => debug!("Deleted CSV file {}", handle.path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!("CSV file already gone: {}", handle.path.display())
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    pub fn all_closed(&self) -> bool {
        self.handles.values().all(|handle| !handle.is_open())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant_row(id: &str) -> Vec<String> {
        [id, "B2", "Title, with comma", "2014-01-07", "12873341", "2010-09-01", "ipg140107"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_open_write_close() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = CsvHandleTable::open(DocumentType::Grant, "ipg140107", dir.path()).unwrap();
        assert_eq!(table.len(), 2);
        let keys: Vec<&String> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["patent_grant", "grant_inventor"]);

        table.write_rows("patent_grant", &[grant_row("08621662"), grant_row("08621663")]).unwrap();
        assert_eq!(table.close_all().unwrap(), 2);
        assert_eq!(table.close_all().unwrap(), 0);
        assert!(table.all_closed());

        let path = dir.path().join("ipg140107_patent_grant.csv");
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("grant_id,kind,title"));
        assert!(lines[1].contains("\"Title, with comma\""));
        assert_eq!(table.get("patent_grant").unwrap().rows_written(), 2);

        let err = table.write_rows("patent_grant", &[grant_row("1")]).unwrap_err();
        assert!(matches!(err, GrantError::GeneralError { .. }));
    }

    #[test]
    fn test_rejects_bad_rows_and_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = CsvHandleTable::open(DocumentType::Grant, "ipg140107", dir.path()).unwrap();
        assert!(table.write_rows("patent_grant", &[vec!["too".to_string(), "short".to_string()]]).is_err());
        assert!(table.write_rows("application", &[grant_row("1")]).is_err());
        assert!(CsvHandleTable::open(DocumentType::Grant, "", dir.path()).is_err());
    }

    #[test]
    fn test_delete_all() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = CsvHandleTable::open(DocumentType::Grant, "ipg140107", dir.path()).unwrap();
        let paths: Vec<PathBuf> = table.iter().map(|(_, h)| h.path.clone()).collect();
        assert!(paths.iter().all(|p| p.exists()));
        table.delete_all().unwrap();
        assert!(paths.iter().all(|p| !p.exists()));
        assert!(table.is_empty());

        let mut empty = CsvHandleTable::empty();
        assert_eq!(empty.close_all().unwrap(), 0);
        empty.delete_all().unwrap();
    }
}
