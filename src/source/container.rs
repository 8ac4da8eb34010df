//! Container extractors producing the raw line stream of a bulk file.
//!
//! Weekly grant files are distributed as zip archives holding one large XML
//! document. Extractors report any failure to reach that document as `None`
//! after logging it; the run then aborts without touching any output.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{error, info};
use zip::ZipArchive;

use crate::context::ProcessContext;
use crate::source::line_stream::{ByteLines, LineStream};
use crate::{GrantError, Result};

const STREAM_BUFFER_SIZE: usize = 1024 * 1024;

/// Produces the raw line stream of one bulk file.
pub trait ContainerExtractor {
    /// Returns the stream, or `None` when no usable content exists.
    fn extract_stream(&mut self, ctx: &ProcessContext) -> Option<LineStream<'_>>;
}

fn is_xml_entry(name: &str) -> bool {
    let name = name.to_lowercase();
    !name.ends_with('/') && (name.ends_with(".xml") || name.ends_with(".sgm") || name.ends_with(".sgml"))
}

/// Streams the first XML entry of a zip archive.
pub struct ZipXmlExtractor {
    zip_path: PathBuf,
    archive: Option<ZipArchive<BufReader<File>>>,
}

impl ZipXmlExtractor {
    pub fn new<P: AsRef<Path>>(zip_path: P) -> Self {
        Self { zip_path: zip_path.as_ref().to_path_buf(), archive: None }
    }

    fn open_entry(&mut self) -> Result<LineStream<'_>> {
        let file = File::open(&self.zip_path)?;
        let archive = self.archive.insert(ZipArchive::new(BufReader::new(file))?);
        let name = archive
            .file_names()
            .find(|name| is_xml_entry(name))
            .map(str::to_string)
            .ok_or_else(|| {
                GrantError::invalid_data_format(format!("No XML entry in {}", self.zip_path.display()))
            })?;
        info!("Streaming {} from {}", name, self.zip_path.display());
        let entry = archive.by_name(&name)?;
        Ok(Box::new(ByteLines::new(BufReader::with_capacity(STREAM_BUFFER_SIZE, entry))))
    }
}

impl ContainerExtractor for ZipXmlExtractor {
    fn extract_stream(&mut self, _ctx: &ProcessContext) -> Option<LineStream<'_>> {
        let zip_path = self.zip_path.clone();
        match self.open_entry() {
            Ok(stream) => Some(stream),
            Err(e) => {
                error!("Failed to extract XML from {}: {}", zip_path.display(), e);
                None
            }
        }
    }
}

/// Streams an uncompressed XML file.
pub struct XmlFileExtractor {
    path: PathBuf,
}

impl XmlFileExtractor {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl ContainerExtractor for XmlFileExtractor {
    fn extract_stream(&mut self, _ctx: &ProcessContext) -> Option<LineStream<'_>> {
        match File::open(&self.path) {
            Ok(file) => Some(Box::new(ByteLines::new(BufReader::with_capacity(STREAM_BUFFER_SIZE, file)))),
            Err(e) => {
                error!("Failed to open {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

/// Streams an in-memory or already opened reader, once.
pub struct ReaderExtractor<R: BufRead> {
    reader: Option<R>,
}

impl<R: BufRead> ReaderExtractor<R> {
    pub fn new(reader: R) -> Self {
        Self { reader: Some(reader) }
    }

    /// An extractor that never yields a stream.
    pub fn unavailable() -> Self {
        Self { reader: None }
    }
}

impl<R: BufRead> ContainerExtractor for ReaderExtractor<R> {
    fn extract_stream(&mut self, _ctx: &ProcessContext) -> Option<LineStream<'_>> {
        let reader = self.reader.take()?;
        Some(Box::new(ByteLines::new(reader)))
    }
}
