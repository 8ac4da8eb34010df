//! Input side of a run: containers and the raw line stream they produce.

pub mod container;
pub mod line_stream;

pub use container::{ContainerExtractor, ReaderExtractor, XmlFileExtractor, ZipXmlExtractor};
pub use line_stream::{ByteLines, LineStream};
