//! Legacy PPT (OLE/CFB) reader for PowerPoint 97-2003 presentations.
//!
//! Decodes the binary record format of the "PowerPoint Document" stream into
//! the `ppt97-core` document model: slides, shapes, styled text and images.
//! Record types the decoder does not use are skipped by their declared
//! length; grammar violations in mandatory structures abort the load.

pub mod blip;
pub mod color;
pub mod cursor;
pub mod document;
pub mod officeart;
pub mod parser;
pub mod persist;
pub mod record;
pub mod record_types;
pub mod slide;
pub mod text;

#[cfg(test)]
mod fixture;

pub use parser::{PptParser, PptStreams};
pub use record::{read_header, RecordHeader};
