//! Core document model and error types for the PowerPoint 97 binary reader.
//!
//! The decoder in `ppt97-reader` projects a `.ppt` file into these plain
//! data types; nothing here knows about the binary record format.

pub mod error;
pub mod types;

pub use error::{Error, Result, Violation};
pub use types::{
    Alignment, Border, Bullet, Color, Geometry, Group, ImageFormat, Line, NotesPage, Paragraph,
    Picture, Presentation, RichText, Shadow, Shape, ShapeKind, Size, Slide, TextRun,
};
