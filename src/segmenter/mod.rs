//! Record segmentation for grant bulk files.
//!
//! This module turns a stream of decoded lines into self-contained record
//! fragments. It contains the dialect definitions (boundary markers, bare
//! tags, entity rules) and the boundary state machine that applies them.

pub mod dialect;
pub mod record_segmenter;

pub use dialect::{LineKind, XmlFormat};
pub use record_segmenter::{RecordSegmenter, SegmentState, SegmentStats};
