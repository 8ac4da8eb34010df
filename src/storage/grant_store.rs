use crate::context::ProcessContext;
use crate::extract::ProcessedGrant;
use crate::{GrantError, Result};

/// Persists one extracted record according to the configured output modes.
pub trait RecordStore {
    fn store(&mut self, grant: ProcessedGrant, ctx: &mut ProcessContext) -> Result<()>;
}

/// Default store: CSV rows when CSV files are open, plus per-record database
/// inserts in streaming mode.
#[derive(Debug, Default)]
pub struct GrantStore {
    stored: u64,
}

impl GrantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(&self) -> u64 {
        self.stored
    }
}

impl RecordStore for GrantStore {
    fn store(&mut self, grant: ProcessedGrant, ctx: &mut ProcessContext) -> Result<()> {
        let streaming = ctx.requires_streaming_insert();
        if ctx.requires_csv_handles() {
            for table in &grant.tables {
                ctx.csv_handles.write_rows(table.table.key, &table.rows)?;
            }
        }
        if streaming {
            let database = ctx.database.as_mut().ok_or_else(|| {
                GrantError::invalid_parameter("Streaming insert requested without a database connection")
            })?;
            for table in &grant.tables {
                database.insert_rows(table.table, &table.rows)?;
            }
        }
        self.stored += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DatabaseInsertMode, OutputModes, ProcessConfig};
    use crate::extract::{GrantRecord, Inventor};
    use crate::storage::{CsvHandleTable, SqliteDatabase};

    fn record(id: &str) -> ProcessedGrant {
        GrantRecord {
            grant_id: id.to_string(),
            kind: "B2".to_string(),
            inventors: vec![Inventor { last_name: "Smith".to_string(), ..Default::default() }],
            ..Default::default()
        }
        .into_processed("ipg140107")
    }

    fn context(csv: bool, database: bool, mode: DatabaseInsertMode, dir: &std::path::Path) -> ProcessContext {
        let config = ProcessConfig {
            file_name: "ipg140107".to_string(),
            output_modes: OutputModes { csv, database },
            database_insert_mode: mode,
            csv_directory: dir.to_string_lossy().into_owned(),
            ..Default::default()
        };
        let database: Option<Box<dyn crate::storage::GrantDatabase>> = if database {
            Some(Box::new(SqliteDatabase::open_in_memory().unwrap()))
        } else {
            None
        };
        let mut ctx = ProcessContext::from_config(&config, database).unwrap();
        if ctx.requires_csv_handles() {
            ctx.csv_handles = CsvHandleTable::open(ctx.document_type, &ctx.source_file_id, &ctx.csv_directory).unwrap();
        }
        ctx
    }

    #[test]
    fn test_store_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(true, false, DatabaseInsertMode::Streaming, dir.path());
        let mut store = GrantStore::new();
        store.store(record("1"), &mut ctx).unwrap();
        store.store(record("2"), &mut ctx).unwrap();
        assert_eq!(store.stored(), 2);
        assert_eq!(ctx.csv_handles.get("patent_grant").unwrap().rows_written(), 2);
        assert_eq!(ctx.csv_handles.get("grant_inventor").unwrap().rows_written(), 2);
    }

    #[test]
    fn test_store_streaming_and_bulk() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(false, true, DatabaseInsertMode::Streaming, dir.path());
        GrantStore::new().store(record("1"), &mut ctx).unwrap();
        assert!(ctx.csv_handles.is_empty());

        // bulk mode only fills CSV files; the database is loaded at finalization
        let mut ctx = context(false, true, DatabaseInsertMode::Bulk, dir.path());
        GrantStore::new().store(record("1"), &mut ctx).unwrap();
        assert_eq!(ctx.csv_handles.get("patent_grant").unwrap().rows_written(), 1);
    }
}
