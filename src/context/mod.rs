//! Run configuration and per-run context.
//!
//! [`ProcessConfig`] is the serializable description of a run, loadable from
//! JSON. [`ProcessContext`] adds the live handles (CSV files, database) and is
//! lent mutably to every stage of the run.

pub mod process_config;
pub mod process_context;

pub use process_config::{BulkVerdict, DatabaseInsertMode, OutputModes, ProcessConfig};
pub use process_context::ProcessContext;
