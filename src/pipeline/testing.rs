//! Recording doubles of the storage collaborators shared by pipeline tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::context::ProcessContext;
use crate::extract::{DocumentType, TableSchema};
use crate::storage::{CsvHandle, GrantDatabase, ProcessLogWriter};
use crate::Result;

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Default)]
pub(crate) struct DatabaseCalls {
    pub inserted_rows: usize,
    pub removed: Vec<String>,
    pub loaded: Vec<String>,
}

/// Database whose bulk loads return scripted results, `true` once exhausted.
pub(crate) struct ScriptedDatabase {
    pub results: VecDeque<bool>,
    pub calls: Rc<RefCell<DatabaseCalls>>,
}

impl ScriptedDatabase {
    pub fn new(results: &[bool]) -> (Self, Rc<RefCell<DatabaseCalls>>) {
        let calls = Rc::new(RefCell::new(DatabaseCalls::default()));
        (Self { results: results.iter().copied().collect(), calls: calls.clone() }, calls)
    }
}

impl GrantDatabase for ScriptedDatabase {
    fn insert_rows(&mut self, _table: &TableSchema, rows: &[Vec<String>]) -> Result<()> {
        self.calls.borrow_mut().inserted_rows += rows.len();
        Ok(())
    }

    fn remove_previous_file_records(&mut self, _document_type: DocumentType, source_file_id: &str) -> Result<()> {
        self.calls.borrow_mut().removed.push(source_file_id.to_string());
        Ok(())
    }

    fn load_csv_bulk_data(&mut self, _document_type: DocumentType, key: &str, handle: &CsvHandle) -> bool {
        assert!(!handle.is_open(), "bulk load of an open CSV file");
        self.calls.borrow_mut().loaded.push(key.to_string());
        self.results.pop_front().unwrap_or(true)
    }
}

/// Process log counting completion writes.
#[derive(Default)]
pub(crate) struct CountingLog(pub Rc<Cell<u32>>);

impl ProcessLogWriter for CountingLog {
    fn write_completion(&mut self, _ctx: &ProcessContext) -> Result<()> {
        self.0.set(self.0.get() + 1);
        Ok(())
    }
}
