//! Record extraction.
//!
//! This module defines the payload produced for each record fragment, the
//! output table layout per document type, and the default quick-xml based
//! extractor for both grant dialects.

pub mod schema;
pub mod grant_record;
pub mod grant_extractor;

pub use schema::{DocumentType, TableSchema, FILE_NAME_COLUMN, PATENT_GRANT_TABLE, GRANT_INVENTOR_TABLE};
pub use grant_record::{GrantRecord, Inventor, ProcessedGrant, TableRows};
pub use grant_extractor::{DataExtractor, GrantExtractor};
