//! Database collaborator for streaming inserts and CSV bulk loads.

use std::path::Path;

use log::{debug, error, info};
use rusqlite::{params_from_iter, Connection};

use crate::extract::{DocumentType, TableSchema, FILE_NAME_COLUMN};
use crate::storage::csv_handler::CsvHandle;
use crate::{GrantError, Result};

/// Persistence operations the pipeline needs from a database.
pub trait GrantDatabase {
    /// Inserts rows of one table immediately (streaming mode).
    fn insert_rows(&mut self, table: &TableSchema, rows: &[Vec<String>]) -> Result<()>;

    /// Deletes every row a previous run of `source_file_id` committed.
    fn remove_previous_file_records(&mut self, document_type: DocumentType, source_file_id: &str) -> Result<()>;

    /// Loads a closed CSV file into the table named by `key`.
    ///
    /// Failures are logged and reported as `false`, never raised.
    fn load_csv_bulk_data(&mut self, document_type: DocumentType, key: &str, handle: &CsvHandle) -> bool;
}

/// SQLite implementation of [`GrantDatabase`].
pub struct SqliteDatabase {
    conn: Connection,
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn insert_sql(table: &TableSchema, columns: &[&str]) -> String {
    let column_list = columns.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", ");
    let placeholders = (1..=columns.len()).map(|i| format!("?{}", i)).collect::<Vec<_>>().join(", ");
    format!("INSERT INTO {} ({}) VALUES ({})", quote_ident(table.key), column_list, placeholders)
}

impl SqliteDatabase {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wraps an existing connection and creates the grant tables if missing.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self { conn };
        db.create_tables(DocumentType::Grant)?;
        Ok(db)
    }

    fn create_tables(&self, document_type: DocumentType) -> Result<()> {
        for table in document_type.tables() {
            let columns = table
                .columns
                .iter()
                .map(|c| format!("{} TEXT NOT NULL", quote_ident(c)))
                .collect::<Vec<_>>()
                .join(", ");
            self.conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table} ({columns});
                 CREATE INDEX IF NOT EXISTS {index} ON {table} ({file_name});",
                table = quote_ident(table.key),
                columns = columns,
                index = quote_ident(&format!("{}_{}_idx", table.key, FILE_NAME_COLUMN)),
                file_name = quote_ident(FILE_NAME_COLUMN),
            ))?;
        }
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn row_count(&self, table: &TableSchema) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(table.key)),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn copy_csv(&mut self, table: &TableSchema, handle: &CsvHandle) -> Result<u64> {
        if handle.is_open() {
            return Err(GrantError::general_error(format!(
                "CSV file still open: {}",
                handle.path.display()
            )));
        }
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(&handle.path)?;
        let headers = reader.headers()?.clone();
        let columns: Vec<&str> = headers.iter().collect();
        if columns != table.columns {
            return Err(GrantError::invalid_data_format(format!(
                "CSV header of {} does not match table {}",
                handle.path.display(),
                table.key
            )));
        }

        let tx = self.conn.transaction()?;
        let mut loaded = 0u64;
        {
            let mut stmt = tx.prepare(&insert_sql(table, &columns))?;
            for record in reader.records() {
                let record = record?;
                stmt.execute(params_from_iter(record.iter()))?;
                loaded += 1;
            }
        }
        tx.commit()?;
        Ok(loaded)
    }
}

impl GrantDatabase for SqliteDatabase {
    fn insert_rows(&mut self, table: &TableSchema, rows: &[Vec<String>]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(&insert_sql(table, table.columns))?;
            for row in rows {
                stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn remove_previous_file_records(&mut self, document_type: DocumentType, source_file_id: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        let mut removed = 0usize;
        for table in document_type.tables() {
            removed += tx.execute(
                &format!("DELETE FROM {} WHERE {} = ?1", quote_ident(table.key), quote_ident(FILE_NAME_COLUMN)),
                [source_file_id],
            )?;
        }
        tx.commit()?;
        if removed > 0 {
            info!("Removed {} rows of previous {} run for {}", removed, document_type, source_file_id);
        }
        Ok(())
    }

    fn load_csv_bulk_data(&mut self, document_type: DocumentType, key: &str, handle: &CsvHandle) -> bool {
        let table = match document_type.table(key) {
            Ok(table) => table,
            Err(e) => {
                error!("Bulk load of {} failed: {}", handle.path.display(), e);
                return false;
            }
        };
        match self.copy_csv(table, handle) {
            Ok(loaded) => {
                debug!("Bulk loaded {} rows from {} into {}", loaded, handle.path.display(), key);
                true
            }
            Err(e) => {
                error!("Bulk load of {} into {} failed: {}", handle.path.display(), key, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{GRANT_INVENTOR_TABLE, PATENT_GRANT_TABLE};
    use crate::storage::csv_handler::CsvHandleTable;

    fn grant_row(id: &str, file_name: &str) -> Vec<String> {
        [id, "B1", "Clamp", "2002-01-01", "09496862", "2000-02-02", file_name]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn write_csv(dir: &Path, file_name: &str, ids: &[&str]) -> CsvHandleTable {
        let mut table = CsvHandleTable::open(DocumentType::Grant, file_name, dir).unwrap();
        let rows: Vec<Vec<String>> = ids.iter().map(|id| grant_row(id, file_name)).collect();
        table.write_rows("patent_grant", &rows).unwrap();
        table.close_all().unwrap();
        table
    }

    #[test]
    fn test_streaming_insert_and_remove() {
        let mut db = SqliteDatabase::open_in_memory().unwrap();
        db.insert_rows(&PATENT_GRANT_TABLE, &[grant_row("1", "pgb020101"), grant_row("2", "pgb020101")]).unwrap();
        db.insert_rows(&PATENT_GRANT_TABLE, &[grant_row("3", "pgb020108")]).unwrap();
        assert_eq!(db.row_count(&PATENT_GRANT_TABLE).unwrap(), 3);

        db.remove_previous_file_records(DocumentType::Grant, "pgb020101").unwrap();
        assert_eq!(db.row_count(&PATENT_GRANT_TABLE).unwrap(), 1);
    }

    #[test]
    fn test_bulk_load_twice_does_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let table = write_csv(dir.path(), "pgb020101", &["06334220", "06334221", "06334222"]);
        let mut db = SqliteDatabase::open_in_memory().unwrap();

        for _ in 0..2 {
            db.remove_previous_file_records(DocumentType::Grant, "pgb020101").unwrap();
            for (key, handle) in table.iter() {
                assert!(db.load_csv_bulk_data(DocumentType::Grant, key, handle));
            }
        }
        assert_eq!(db.row_count(&PATENT_GRANT_TABLE).unwrap(), 3);
        assert_eq!(db.row_count(&GRANT_INVENTOR_TABLE).unwrap(), 0);
        let duplicates: i64 = db
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM (SELECT grant_id FROM patent_grant GROUP BY grant_id HAVING COUNT(*) > 1)",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(duplicates, 0);
    }

    #[test]
    fn test_bulk_load_failures_return_false() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = SqliteDatabase::open_in_memory().unwrap();

        let open_table = CsvHandleTable::open(DocumentType::Grant, "open", dir.path()).unwrap();
        let handle = open_table.get("patent_grant").unwrap();
        assert!(!db.load_csv_bulk_data(DocumentType::Grant, "patent_grant", handle));

        let closed = write_csv(dir.path(), "closed", &["1"]);
        let handle = closed.get("patent_grant").unwrap();
        assert!(!db.load_csv_bulk_data(DocumentType::Grant, "grant_inventor", handle));
        assert!(!db.load_csv_bulk_data(DocumentType::Grant, "unknown_table", handle));

        std::fs::remove_file(&handle.path).unwrap();
        assert!(!db.load_csv_bulk_data(DocumentType::Grant, "patent_grant", handle));
        assert_eq!(db.row_count(&PATENT_GRANT_TABLE).unwrap(), 0);
    }
}
