//! # grantxml - USPTO Patent Grant Bulk File Ingestion
//!
//! This crate reads the weekly patent grant bulk files published by the USPTO
//! and loads one record at a time into CSV files and/or a database. Two
//! historical XML dialects are supported:
//!
//! - **gXML4** (2005 onwards): one `<us-patent-grant>` document per grant
//! - **gXML2** (2002-2004): one `<PATDOC>` document per grant, with SGML entities
//!
//! A bulk file is a concatenation of complete XML documents, so it cannot be
//! parsed as a whole. Instead it is streamed line by line, cut into
//! self-contained record fragments, and each fragment is extracted and stored
//! before the next one is read.
//!
//! ## Features
//!
//! - **Streaming segmentation**: memory bounded by the largest single record
//! - **Encoding repair**: lines that are not UTF-8 are decoded as Windows-1252
//! - **Entity normalization**: HTML and SGML named entities become XML-safe references
//! - **Output modes**: CSV files, per-record database inserts, or CSV bulk loads
//! - **Re-run safety**: bulk loads first remove the rows of a previous run of the same file
//! - **Process log**: completed files are marked in a CSV process log
//!
//! ## Quick Start
//!
//! ```no_run
//! use grantxml::context::{ProcessConfig, ProcessContext};
//! use grantxml::pipeline::{GrantProcessor, RunOutcome};
//! use grantxml::source::ZipXmlExtractor;
//! use grantxml::storage::{GrantDatabase, SqliteDatabase};
//!
//! # fn main() -> grantxml::Result<()> {
//! let config = ProcessConfig::from_json_file("grant_config.json")?;
//! let database: Box<dyn GrantDatabase> = Box::new(SqliteDatabase::open("grants.sqlite")?);
//! let mut ctx = ProcessContext::from_config(&config, Some(database))?;
//!
//! let mut container = ZipXmlExtractor::new("ipg140107.zip");
//! let mut processor = GrantProcessor::from_config(&config);
//! match processor.process_xml_grant_content(&mut container, &mut ctx)? {
//!     RunOutcome::Success => println!("done"),
//!     RunOutcome::Failure => println!("bulk load failed, CSV files kept"),
//!     RunOutcome::Aborted => println!("no XML in archive"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **Input**: [`source`] for archive and file containers producing raw lines
//! - **Sanitizing**: [`sanitizer`] for line decoding and entity normalization
//! - **Segmentation**: [`segmenter`] for dialects and the record boundary state machine
//! - **Extraction**: [`extract`] for record payloads and table layouts
//! - **Storage**: [`storage`] for CSV files, the database and the process log
//! - **Pipeline**: [`pipeline`] for dispatch, finalization and the end-to-end processor
//! - **Context**: [`context`] for run configuration and per-run state
//!
//! ## Error Handling
//!
//! All fallible operations return a [`Result<T>`] type, where errors are represented by
//! [`GrantError`]. The crate uses the `snafu` library for error handling with
//! context and backtraces.

pub mod context;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod sanitizer;
pub mod segmenter;
pub mod source;
pub mod storage;

pub use context::{ProcessConfig, ProcessContext};
pub use pipeline::{GrantProcessor, RunOutcome};
pub use segmenter::XmlFormat;

pub use error::{GrantError, Result, snafu};
