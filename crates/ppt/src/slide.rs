//! Slide and notes containers.
//!
//! Both carry a Drawing with the shapes and, after it, the color scheme the
//! shapes' colors index into. The scheme is located before any shape is
//! decoded.

use crate::color::ColorScheme;
use crate::cursor::ByteCursor;
use crate::officeart::{decode_drawing, DrawingContext, ShapeIds};
use crate::record::{expect_record, peek_record, skip_unknown, RecordHeader, Records};
use crate::record_types::*;
use ppt97_core::{Result, Shape};

const SLIDE_ATOM_LEN: u32 = 0x18;
const NOTES_ATOM_LEN: u32 = 0x08;

/// A decoded SlideContainer or NotesContainer, shapes not yet decoded.
#[derive(Debug, Clone)]
pub struct DrawingPage {
    /// NotesAtom.slideIdRef; absent for slides.
    pub slide_id_ref: Option<u32>,
    pub scheme: Option<ColorScheme>,
    drawing: RecordHeader,
}

impl DrawingPage {
    /// Decode the shapes of the page's drawing.
    pub fn shapes(
        &self,
        data: &[u8],
        ctx: &DrawingContext,
        ids: &mut ShapeIds,
    ) -> Result<Vec<Shape>> {
        decode_drawing(data, &self.drawing, ctx, ids)
    }
}

/// SlideContainer: SlideAtom, optional show info, headers/footers and sync
/// info, the Drawing, then the color scheme.
pub fn read_slide(data: &[u8], header: &RecordHeader) -> Result<DrawingPage> {
    let bound = header.end();

    let atom = expect_record(data, header.payload_offset(), bound, RT_SLIDE_ATOM)?;
    atom.expect_version(2)?;
    atom.expect_instance(0)?;
    atom.expect_length(SLIDE_ATOM_LEN)?;
    let mut pos = atom.end();

    for optional in [
        RT_SLIDE_SHOW_SLIDE_INFO_ATOM,
        RT_HEADERS_FOOTERS,
        RT_ROUND_TRIP_SLIDE_SYNC_INFO12,
    ] {
        if let Some(found) = peek_record(data, pos, bound, optional)? {
            pos = found.end();
        }
    }

    let drawing = expect_record(data, pos, bound, RT_DRAWING)?;
    let scheme = read_scheme(data, drawing.end(), bound)?;

    Ok(DrawingPage {
        slide_id_ref: None,
        scheme,
        drawing,
    })
}

/// NotesContainer: NotesAtom, the Drawing, then the color scheme.
pub fn read_notes(data: &[u8], header: &RecordHeader) -> Result<DrawingPage> {
    let bound = header.end();

    let atom = expect_record(data, header.payload_offset(), bound, RT_NOTES_ATOM)?;
    atom.expect_version(1)?;
    atom.expect_instance(0)?;
    atom.expect_length(NOTES_ATOM_LEN)?;
    let slide_id_ref = ByteCursor::new(data).u32(atom.payload_offset())?;

    let drawing = expect_record(data, atom.end(), bound, RT_DRAWING)?;
    let scheme = read_scheme(data, drawing.end(), bound)?;

    Ok(DrawingPage {
        slide_id_ref: Some(slide_id_ref),
        scheme,
        drawing,
    })
}

/// The color scheme right after the drawing; anything after it is skipped.
fn read_scheme(data: &[u8], pos: usize, bound: usize) -> Result<Option<ColorScheme>> {
    let mut scheme = None;
    let mut rest = pos;
    if let Some(atom) = peek_record(data, pos, bound, RT_COLOR_SCHEME_ATOM)? {
        scheme = Some(ColorScheme::parse(atom.payload(data)?)?);
        rest = atom.end();
    }
    for record in Records::new(data, rest, bound) {
        skip_unknown(&record?, "slide");
    }
    Ok(scheme)
}
