use log::debug;

use crate::context::ProcessContext;
use crate::extract::DataExtractor;
use crate::storage::RecordStore;
use crate::Result;

/// Runs every fragment through extraction and then storage, one at a time.
///
/// Errors from either collaborator are returned unchanged; the caller aborts
/// the run on the first one.
pub struct RecordDispatcher<'a> {
    extractor: &'a mut dyn DataExtractor,
    store: &'a mut dyn RecordStore,
    dispatched: u64,
}

impl<'a> RecordDispatcher<'a> {
    pub fn new(extractor: &'a mut dyn DataExtractor, store: &'a mut dyn RecordStore) -> Self {
        Self { extractor, store, dispatched: 0 }
    }

    pub fn dispatch(&mut self, fragment: &str, ctx: &mut ProcessContext) -> Result<()> {
        let payload = self.extractor.extract(fragment, ctx)?;
        let grant_id = payload.grant_id.clone();
        self.store.store(payload, ctx)?;
        self.dispatched += 1;
        debug!("Dispatched record #{} ({})", self.dispatched, grant_id);
        Ok(())
    }

    /// Number of records fully stored so far.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}
