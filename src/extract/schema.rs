//! Output table layout per document type.
//!
//! A table key names the CSV file, the database table and the entry in the
//! CSV handle table at once. Every table ends with a `file_name` column that
//! records which bulk file produced the row; the duplicate-run guard deletes
//! by that column.

use serde::{Deserialize, Serialize};

use crate::{GrantError, Result};

/// Column holding the source file id in every table.
pub const FILE_NAME_COLUMN: &str = "file_name";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub key: &'static str,
    pub columns: &'static [&'static str],
}

pub const PATENT_GRANT_TABLE: TableSchema = TableSchema {
    key: "patent_grant",
    columns: &["grant_id", "kind", "title", "issue_date", "app_id", "app_date", FILE_NAME_COLUMN],
};

pub const GRANT_INVENTOR_TABLE: TableSchema = TableSchema {
    key: "grant_inventor",
    columns: &["grant_id", "position", "first_name", "last_name", "city", "country", FILE_NAME_COLUMN],
};

const GRANT_TABLES: [TableSchema; 2] = [PATENT_GRANT_TABLE, GRANT_INVENTOR_TABLE];

/// Kind of bulk document a run processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    #[default]
    Grant,
}

impl DocumentType {
    pub fn from_label(label: &str) -> Result<Self> {
        match label.to_lowercase().as_str() {
            "grant" => Ok(DocumentType::Grant),
            _ => Err(GrantError::invalid_parameter(format!("Unsupported document type: {}", label))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Grant => "grant",
        }
    }

    /// Tables written for this document type, in load order.
    pub fn tables(&self) -> &'static [TableSchema] {
        match self {
            DocumentType::Grant => &GRANT_TABLES,
        }
    }

    pub fn table(&self, key: &str) -> Result<&'static TableSchema> {
        self.tables()
            .iter()
            .find(|table| table.key == key)
            .ok_or_else(|| GrantError::invalid_parameter(format!("Unknown table {} for {}", key, self.as_str())))
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_carries_file_name() {
        for table in DocumentType::Grant.tables() {
            assert_eq!(table.columns.last(), Some(&FILE_NAME_COLUMN), "{}", table.key);
        }
        assert_eq!(DocumentType::Grant.table("grant_inventor").unwrap().columns.len(), 7);
        assert!(DocumentType::Grant.table("application").is_err());
    }
}
