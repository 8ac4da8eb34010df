//! Storage collaborators.
//!
//! CSV handle management, the database interface with its SQLite
//! implementation, the per-record store and the process log.

pub mod csv_handler;
pub mod database;
pub mod grant_store;
pub mod process_log;

pub use csv_handler::{CsvHandle, CsvHandleTable};
pub use database::{GrantDatabase, SqliteDatabase};
pub use grant_store::{GrantStore, RecordStore};
pub use process_log::{FileProcessLog, ProcessLogWriter, STATUS_PROCESSED, STATUS_UNPROCESSED};
