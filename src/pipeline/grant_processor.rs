//! End-to-end processing of one grant bulk file.
//!
//! [`GrantProcessor`] owns the extraction, storage and process-log
//! collaborators and drives a run over a caller supplied container and
//! context:
//!
//! 1. the container is asked for a line stream; without one the run is
//!    [`RunOutcome::Aborted`] and nothing is created or logged;
//! 2. CSV files are opened when CSV output or bulk loading needs them;
//! 3. every line is decoded and segmented, and each complete record is
//!    extracted and stored before the next line is read;
//! 4. the [`Finalizer`] closes the run.
//!
//! An extraction or storage error stops the run at once. The CSV files are
//! closed and kept, and the error is returned.
//!
//! # Examples
//!
//! ```
//! use grantxml::context::{OutputModes, ProcessConfig, ProcessContext};
//! use grantxml::pipeline::{GrantProcessor, RunOutcome};
//! use grantxml::source::ReaderExtractor;
//!
//! let dir = std::env::temp_dir().join("grantxml-doc-example");
//! let config = ProcessConfig {
//!     file_name: "ipg140107".to_string(),
//!     output_modes: OutputModes { csv: true, database: false },
//!     csv_directory: dir.join("csv").to_string_lossy().into_owned(),
//!     process_log_path: dir.join("process_log.csv").to_string_lossy().into_owned(),
//!     ..Default::default()
//! };
//! let xml = "<us-patent-grant lang=\"EN\">\n\
//!     <publication-reference><document-id><doc-number>08621662</doc-number></document-id></publication-reference>\n\
//!     </us-patent-grant>\n";
//! let mut ctx = ProcessContext::from_config(&config, None)?;
//! let mut processor = GrantProcessor::from_config(&config);
//! let outcome = processor.process_xml_grant_content(&mut ReaderExtractor::new(xml.as_bytes()), &mut ctx)?;
//! assert_eq!(outcome, RunOutcome::Success);
//! # std::fs::remove_dir_all(&dir).ok();
//! # Ok::<(), grantxml::GrantError>(())
//! ```

use std::time::Instant;

use log::{error, info, warn};

use crate::context::{ProcessConfig, ProcessContext};
use crate::extract::{DataExtractor, GrantExtractor};
use crate::pipeline::dispatcher::RecordDispatcher;
use crate::pipeline::finalizer::Finalizer;
use crate::pipeline::outcome::RunOutcome;
use crate::pipeline::progress::{ProgressReportFn, ProgressState};
use crate::sanitizer::decode_line;
use crate::segmenter::RecordSegmenter;
use crate::source::{ContainerExtractor, LineStream};
use crate::storage::{CsvHandleTable, FileProcessLog, GrantStore, ProcessLogWriter, RecordStore};
use crate::Result;

pub struct GrantProcessor {
    extractor: Box<dyn DataExtractor>,
    store: Box<dyn RecordStore>,
    process_log: Box<dyn ProcessLogWriter>,
    progress_interval: u64,
    reporter: Option<ProgressReportFn>,
}

impl GrantProcessor {
    /// Processor with the default extractor and store.
    pub fn new(process_log: Box<dyn ProcessLogWriter>) -> Self {
        Self {
            extractor: Box::new(GrantExtractor::new()),
            store: Box::new(GrantStore::new()),
            process_log,
            progress_interval: 0,
            reporter: None,
        }
    }

    /// Processor logging completions to the configured process log file.
    pub fn from_config(config: &ProcessConfig) -> Self {
        Self::new(Box::new(FileProcessLog::new(config.process_log_file())))
    }

    pub fn with_extractor(mut self, extractor: Box<dyn DataExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_store(mut self, store: Box<dyn RecordStore>) -> Self {
        self.store = store;
        self
    }

    /// Calls `reporter` every `interval` dispatched records.
    pub fn with_progress(mut self, interval: u64, reporter: ProgressReportFn) -> Self {
        self.progress_interval = interval;
        self.reporter = Some(reporter);
        self
    }

    /// Processes the bulk file behind `container` into the outputs of `ctx`.
    ///
    /// # Errors
    ///
    /// Returns an error when a line cannot be read, a record cannot be
    /// extracted or stored, or the CSV files, database or process log fail
    /// during finalization. A failed bulk load is not an error; it is
    /// reported as [`RunOutcome::Failure`].
    pub fn process_xml_grant_content(
        &mut self,
        container: &mut dyn ContainerExtractor,
        ctx: &mut ProcessContext,
    ) -> Result<RunOutcome> {
        let started = Instant::now();
        let Some(stream) = container.extract_stream(ctx) else {
            ctx.csv_handles.close_all()?;
            warn!("No {} content available for {}", ctx.xml_format.label(), ctx.display_source());
            return Ok(RunOutcome::Aborted);
        };

        if ctx.requires_csv_handles() {
            ctx.csv_handles = CsvHandleTable::open(ctx.document_type, &ctx.source_file_id, &ctx.csv_directory)?;
        }

        if let Err(e) = self.segment_and_dispatch(stream, ctx) {
            if let Err(close_error) = ctx.csv_handles.close_all() {
                warn!("Failed to close CSV files for {}: {}", ctx.source_file_id, close_error);
            }
            error!("Processing {} stopped: {}", ctx.display_source(), e);
            return Err(e);
        }

        Finalizer::new(&mut *self.process_log).finalize(ctx, started)
    }

    fn segment_and_dispatch(&mut self, stream: LineStream<'_>, ctx: &mut ProcessContext) -> Result<()> {
        let mut segmenter = RecordSegmenter::new(ctx.xml_format);
        let mut dispatcher = RecordDispatcher::new(&mut *self.extractor, &mut *self.store);
        let mut progress = ProgressState::new(ctx.display_source(), self.progress_interval, self.reporter);

        for raw in stream {
            let line = decode_line(&raw?);
            segmenter.push_line(&line, |fragment| dispatcher.dispatch(fragment, ctx))?;
            progress.report(dispatcher.dispatched());
        }

        let stats = segmenter.finish();
        info!(
            "Segmented {}: {} lines, {} records, {} lines outside records, {} orphan close markers, {} partial records dropped",
            ctx.source_file_id,
            stats.lines_read,
            dispatcher.dispatched(),
            stats.lines_outside_records,
            stats.orphan_close_markers,
            stats.partial_records_dropped
        );
        Ok(())
    }
}
