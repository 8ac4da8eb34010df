//! The record pipeline: dispatch loop, finalization and the processor that
//! runs them over one bulk file.

pub mod dispatcher;
pub mod finalizer;
pub mod grant_processor;
pub mod outcome;
pub mod progress;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::RecordDispatcher;
pub use finalizer::{FinalizeStage, Finalizer};
pub use grant_processor::GrantProcessor;
pub use outcome::RunOutcome;
pub use progress::{log_progress, ProgressReportFn, ProgressState};
