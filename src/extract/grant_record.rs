//! Structured payload extracted from one grant fragment.

use crate::extract::schema::{TableSchema, GRANT_INVENTOR_TABLE, PATENT_GRANT_TABLE};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventor {
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub country: String,
}

/// Bibliographic data of one grant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantRecord {
    pub grant_id: String,
    pub kind: String,
    pub title: String,
    pub issue_date: String,
    pub app_id: String,
    pub app_date: String,
    pub inventors: Vec<Inventor>,
}

/// Rows destined for one output table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRows {
    pub table: &'static TableSchema,
    pub rows: Vec<Vec<String>>,
}

/// Extraction result handed from the extractor to the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedGrant {
    pub grant_id: String,
    pub tables: Vec<TableRows>,
}

impl GrantRecord {
    /// Flattens the record into table rows tagged with the source file id.
    pub fn into_processed(self, file_name: &str) -> ProcessedGrant {
        let grant_row = vec![
            self.grant_id.clone(),
            self.kind,
            self.title,
            self.issue_date,
            self.app_id,
            self.app_date,
            file_name.to_string(),
        ];
        let inventor_rows = self
            .inventors
            .into_iter()
            .enumerate()
            .map(|(i, inventor)| {
                vec![
                    self.grant_id.clone(),
                    (i + 1).to_string(),
                    inventor.first_name,
                    inventor.last_name,
                    inventor.city,
                    inventor.country,
                    file_name.to_string(),
                ]
            })
            .collect();
        ProcessedGrant {
            grant_id: self.grant_id,
            tables: vec![
                TableRows { table: &PATENT_GRANT_TABLE, rows: vec![grant_row] },
                TableRows { table: &GRANT_INVENTOR_TABLE, rows: inventor_rows },
            ],
        }
    }
}
