//! Closing step of a run.
//!
//! The finalizer walks `Open → CsvClosed → {BulkLoaded | StreamingDone} →
//! LogWritten → Done`. CSV handles are always closed first. In bulk mode the
//! rows of any previous run of the same source file are removed before the
//! CSV files are loaded, so re-running a file never duplicates rows.
//!
//! With [`BulkVerdict::LastLoad`] the result of the last bulk load decides the
//! outcome, so an earlier failed table can be masked by a later success. That
//! case is logged at `warn`. [`BulkVerdict::AllLoads`] requires every load to
//! succeed.

use std::time::Instant;

use chrono::Local;
use log::{debug, error, info, warn};

use crate::context::{BulkVerdict, ProcessContext};
use crate::pipeline::outcome::RunOutcome;
use crate::storage::ProcessLogWriter;
use crate::{GrantError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeStage {
    Open,
    CsvClosed,
    BulkLoaded,
    StreamingDone,
    LogWritten,
    Done,
}

pub struct Finalizer<'a> {
    process_log: &'a mut dyn ProcessLogWriter,
    stage: FinalizeStage,
}

impl<'a> Finalizer<'a> {
    pub fn new(process_log: &'a mut dyn ProcessLogWriter) -> Self {
        Self { process_log, stage: FinalizeStage::Open }
    }

    pub fn stage(&self) -> FinalizeStage {
        self.stage
    }

    /// Finalizes the run that started at `started`.
    ///
    /// A failed bulk load is reported as [`RunOutcome::Failure`] and leaves the
    /// CSV files on disk. Errors closing or deleting CSV files, clearing
    /// previous records or writing the process log are returned.
    pub fn finalize(&mut self, ctx: &mut ProcessContext, started: Instant) -> Result<RunOutcome> {
        let closed = ctx.csv_handles.close_all()?;
        debug!("Closed {} CSV files for {}", closed, ctx.source_file_id);
        self.stage = FinalizeStage::CsvClosed;

        let file_processed = if ctx.requires_bulk_load() {
            let loaded = bulk_load(ctx)?;
            self.stage = FinalizeStage::BulkLoaded;
            loaded
        } else {
            self.stage = FinalizeStage::StreamingDone;
            true
        };

        let elapsed = started.elapsed().as_secs_f64();
        let finished = Local::now().format("%c");
        if file_processed {
            self.process_log.write_completion(ctx)?;
            self.stage = FinalizeStage::LogWritten;
            if !ctx.keeps_csv_files() {
                ctx.csv_handles.delete_all()?;
            }
            let message = format!(
                "Loaded {} data for {} into database. Time: {:.2}s Finished Time: {}",
                ctx.document_type,
                ctx.display_source(),
                elapsed,
                finished
            );
            println!("{}", message);
            info!("{}", message);
            self.stage = FinalizeStage::Done;
            Ok(RunOutcome::Success)
        } else {
            let message = format!(
                "Failed to bulk load {} data for {} into database. Time: {:.2}s Finished Time: {}",
                ctx.document_type,
                ctx.display_source(),
                elapsed,
                finished
            );
            println!("{}", message);
            error!("{}", message);
            self.stage = FinalizeStage::Done;
            Ok(RunOutcome::Failure)
        }
    }
}

fn bulk_load(ctx: &mut ProcessContext) -> Result<bool> {
    let document_type = ctx.document_type;
    let ProcessContext { database, csv_handles, source_file_id, bulk_verdict, .. } = ctx;
    let database = database
        .as_mut()
        .ok_or_else(|| GrantError::invalid_parameter("Bulk load requested without a database connection"))?;

    database.remove_previous_file_records(document_type, source_file_id)?;

    let mut file_processed = true;
    let mut failed = Vec::new();
    for (key, handle) in csv_handles.iter() {
        let loaded = database.load_csv_bulk_data(document_type, key, handle);
        if !loaded {
            failed.push(key.as_str());
        }
        file_processed = match bulk_verdict {
            BulkVerdict::LastLoad => loaded,
            BulkVerdict::AllLoads => file_processed && loaded,
        };
    }
    if file_processed && !failed.is_empty() {
        warn!(
            "Bulk load of {} failed for {} but the last load succeeded",
            source_file_id,
            failed.join(", ")
        );
    }
    Ok(file_processed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::context::{DatabaseInsertMode, OutputModes, ProcessConfig};
    use crate::pipeline::testing::{init_logger, CountingLog, ScriptedDatabase};
    use crate::storage::{CsvHandleTable, GrantDatabase};

    fn bulk_context(dir: &std::path::Path, database: ScriptedDatabase, verdict: BulkVerdict) -> ProcessContext {
        let config = ProcessConfig {
            url_link: "https://bulkdata.uspto.gov/data/patent/grant/redbook/bibliographic/2014/ipgb20140107_wk01.zip"
                .to_string(),
            output_modes: OutputModes { csv: false, database: true },
            database_insert_mode: DatabaseInsertMode::Bulk,
            csv_directory: dir.to_string_lossy().into_owned(),
            bulk_verdict: verdict,
            ..Default::default()
        };
        let database: Box<dyn GrantDatabase> = Box::new(database);
        let mut ctx = ProcessContext::from_config(&config, Some(database)).unwrap();
        ctx.csv_handles = CsvHandleTable::open(ctx.document_type, &ctx.source_file_id, &ctx.csv_directory).unwrap();
        ctx
    }

    fn csv_paths(ctx: &ProcessContext) -> Vec<std::path::PathBuf> {
        ctx.csv_handles.iter().map(|(_, handle)| handle.path.clone()).collect()
    }

    #[test]
    fn test_last_load_wins() {
        init_logger();
        let dir = tempfile::tempdir().unwrap();
        let (database, calls) = ScriptedDatabase::new(&[false, true]);
        let mut ctx = bulk_context(dir.path(), database, BulkVerdict::LastLoad);
        let paths = csv_paths(&ctx);
        let writes = Rc::new(Cell::new(0));
        let mut log = CountingLog(writes.clone());

        let mut finalizer = Finalizer::new(&mut log);
        assert_eq!(finalizer.finalize(&mut ctx, Instant::now()).unwrap(), RunOutcome::Success);
        assert_eq!(finalizer.stage(), FinalizeStage::Done);
        assert_eq!(calls.borrow().removed, ["ipgb20140107_wk01"]);
        assert_eq!(calls.borrow().loaded, ["patent_grant", "grant_inventor"]);
        assert_eq!(writes.get(), 1);
        assert!(ctx.csv_handles.is_empty());
        assert!(paths.iter().all(|p| !p.exists()));
    }

    #[test]
    fn test_all_loads_keeps_csv_on_failure() {
        init_logger();
        let dir = tempfile::tempdir().unwrap();
        let (database, calls) = ScriptedDatabase::new(&[false, true]);
        let mut ctx = bulk_context(dir.path(), database, BulkVerdict::AllLoads);
        let paths = csv_paths(&ctx);
        let writes = Rc::new(Cell::new(0));
        let mut log = CountingLog(writes.clone());

        let outcome = Finalizer::new(&mut log).finalize(&mut ctx, Instant::now()).unwrap();
        assert_eq!(outcome, RunOutcome::Failure);
        assert_eq!(calls.borrow().loaded.len(), 2);
        assert_eq!(writes.get(), 0);
        assert!(ctx.csv_handles.all_closed());
        assert!(paths.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_last_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (database, _calls) = ScriptedDatabase::new(&[true, false]);
        let mut ctx = bulk_context(dir.path(), database, BulkVerdict::LastLoad);
        let mut log = CountingLog::default();
        let outcome = Finalizer::new(&mut log).finalize(&mut ctx, Instant::now()).unwrap();
        assert_eq!(outcome, RunOutcome::Failure);
        assert_eq!(ctx.csv_handles.len(), 2);
    }

    #[test]
    fn test_csv_only_run_keeps_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProcessConfig {
            file_name: "pgb020101".to_string(),
            output_modes: OutputModes { csv: true, database: false },
            csv_directory: dir.path().to_string_lossy().into_owned(),
            ..Default::default()
        };
        let mut ctx = ProcessContext::from_config(&config, None).unwrap();
        ctx.csv_handles = CsvHandleTable::open(ctx.document_type, &ctx.source_file_id, &ctx.csv_directory).unwrap();
        let writes = Rc::new(Cell::new(0));
        let mut log = CountingLog(writes.clone());

        let mut finalizer = Finalizer::new(&mut log);
        assert_eq!(finalizer.stage(), FinalizeStage::Open);
        assert_eq!(finalizer.finalize(&mut ctx, Instant::now()).unwrap(), RunOutcome::Success);
        assert_eq!(writes.get(), 1);
        assert!(ctx.csv_handles.all_closed());
        assert!(csv_paths(&ctx).iter().all(|p| p.exists()));
    }
}
