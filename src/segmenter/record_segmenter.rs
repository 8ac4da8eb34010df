//! Record boundary state machine.
//!
//! [`RecordSegmenter`] consumes decoded lines one at a time and hands every
//! complete record fragment to a caller supplied sink. The fragment buffer is
//! owned by the segmenter and reused across records, so memory stays bounded
//! by the largest single record rather than by the file.
//!
//! # Examples
//!
//! ```
//! use grantxml::segmenter::{RecordSegmenter, XmlFormat};
//!
//! let lines = [
//!     "<?xml version=\"1.0\"?>\n",
//!     "<PATDOC DTD=\"2.4\">\n",
//!     "<SDOBI><B100><B110><DNUM><PDAT>06334220</PDAT></DNUM></B110></B100></SDOBI>\n",
//!     "</PATDOC>\n",
//! ];
//! let mut segmenter = RecordSegmenter::new(XmlFormat::GXml2);
//! let mut fragments = Vec::new();
//! for line in lines {
//!     segmenter.push_line(line, |fragment| {
//!         fragments.push(fragment.to_string());
//!         Ok(())
//!     })?;
//! }
//! let stats = segmenter.finish();
//! assert_eq!(fragments.len(), 1);
//! assert!(fragments[0].starts_with("<PATDOC>"));
//! assert_eq!(stats.fragments_emitted, 1);
//! # Ok::<(), grantxml::GrantError>(())
//! ```

use log::{debug, warn};

use crate::segmenter::dialect::{LineKind, XmlFormat};
use crate::Result;

/// Initial fragment buffer capacity; one grant record is typically 20-200KB.
const INITIAL_BUFFER_CAPACITY: usize = 64 * 1024;

/// Whether the segmenter is currently inside a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentState {
    #[default]
    OutsideRecord,
    InsideRecord,
}

/// Counters describing one segmentation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentStats {
    /// Total lines pushed
    pub lines_read: u64,
    /// Complete fragments handed to the sink
    pub fragments_emitted: u64,
    /// Interior lines seen while outside any record
    pub lines_outside_records: u64,
    /// Close markers seen while outside any record
    pub orphan_close_markers: u64,
    /// Partial records dropped, by a restart or by end of stream
    pub partial_records_dropped: u64,
}

pub struct RecordSegmenter {
    format: XmlFormat,
    state: SegmentState,
    buffer: String,
    stats: SegmentStats,
}

impl RecordSegmenter {
    pub fn new(format: XmlFormat) -> Self {
        Self {
            format,
            state: SegmentState::OutsideRecord,
            buffer: String::with_capacity(INITIAL_BUFFER_CAPACITY),
            stats: SegmentStats::default(),
        }
    }

    pub fn format(&self) -> XmlFormat {
        self.format
    }

    pub fn state(&self) -> SegmentState {
        self.state
    }

    pub fn stats(&self) -> &SegmentStats {
        &self.stats
    }

    /// Feeds one decoded line.
    ///
    /// When the line closes a record, `on_fragment` is called with the complete
    /// fragment before this method returns. An error from the sink is returned
    /// unchanged and leaves the segmenter outside any record.
    pub fn push_line<F>(&mut self, line: &str, on_fragment: F) -> Result<()>
    where
        F: FnOnce(&str) -> Result<()>,
    {
        self.stats.lines_read += 1;
        match (self.format.classify(line), self.state) {
            (LineKind::Open, state) => {
                if state == SegmentState::InsideRecord {
                    warn!(
                        "Record restarted before {} at line {}, dropping {} buffered bytes",
                        self.format.close_tag(),
                        self.stats.lines_read,
                        self.buffer.len()
                    );
                    self.stats.partial_records_dropped += 1;
                }
                self.buffer.clear();
                self.buffer.push_str(self.format.open_tag());
                self.state = SegmentState::InsideRecord;
            }
            (LineKind::Close, SegmentState::InsideRecord) => {
                self.buffer.push_str(self.format.close_tag());
                self.state = SegmentState::OutsideRecord;
                self.stats.fragments_emitted += 1;
                let result = on_fragment(&self.buffer);
                self.buffer.clear();
                result?;
            }
            (LineKind::Close, SegmentState::OutsideRecord) => {
                warn!(
                    "Ignoring {} without opening marker at line {}",
                    self.format.close_tag(),
                    self.stats.lines_read
                );
                self.stats.orphan_close_markers += 1;
            }
            (LineKind::Interior, SegmentState::InsideRecord) => {
                let normalized = self.format.normalize_entities(line);
                self.buffer.push_str(&normalized);
            }
            (LineKind::Interior, SegmentState::OutsideRecord) => {
                self.stats.lines_outside_records += 1;
            }
        }
        Ok(())
    }

    /// Ends the pass. A record still open at this point is dropped, never emitted.
    pub fn finish(&mut self) -> SegmentStats {
        if self.state == SegmentState::InsideRecord {
            debug!(
                "Stream ended inside {} record, dropping {} buffered bytes",
                self.format.root_element(),
                self.buffer.len()
            );
            self.stats.partial_records_dropped += 1;
            self.state = SegmentState::OutsideRecord;
        }
        self.buffer.clear();
        self.stats
    }
}
