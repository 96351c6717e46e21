//! The DocumentContainer and the document-wide tables it carries.

use crate::cursor::ByteCursor;
use crate::record::{peek_record, read_bounded, skip_unknown, RecordHeader, Records};
use crate::record_types::*;
use crate::text::{read_text_block, TextBlock};
use ppt97_core::{Result, Size};
use std::collections::HashMap;

const DOCUMENT_ATOM_LEN: u32 = 0x28;
const SLIDE_PERSIST_ATOM_LEN: u32 = 0x14;
const FONT_NAME_LEN: usize = 64;

/// SlideListWithText instances.
const SLIDE_LIST_SLIDES: u16 = 0;
const SLIDE_LIST_NOTES: u16 = 2;

/// CString instances inside an ExHyperlink.
const HYPERLINK_TARGET: u16 = 1;
const HYPERLINK_LOCATION: u16 = 3;

/// One SlidePersistAtom and the outline text that follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideEntry {
    pub persist_id: u32,
    pub slide_id: u32,
    pub outline: Vec<TextBlock>,
}

/// Tables read from the DocumentContainer before any slide is decoded.
#[derive(Debug, Clone, Default)]
pub struct DocumentTables {
    pub slide_size: Option<Size>,
    pub notes_size: Option<Size>,
    /// Face names, indexed by font reference.
    pub fonts: Vec<String>,
    /// Hyperlink targets by ExHyperlinkAtom id.
    pub hyperlinks: HashMap<u32, String>,
    /// Slides in presentation order; `None` without a slide list.
    pub slides: Option<Vec<SlideEntry>>,
    pub notes: Vec<SlideEntry>,
}

impl DocumentTables {
    /// The slide list entry for a slide's persist id.
    pub fn slide_entry(&self, persist_id: u32) -> Option<&SlideEntry> {
        self.slides
            .as_ref()?
            .iter()
            .find(|entry| entry.persist_id == persist_id)
    }
}

/// Decode the DocumentContainer at `header`.
pub fn decode_document(data: &[u8], header: &RecordHeader) -> Result<DocumentTables> {
    let cursor = ByteCursor::new(data);
    let mut tables = DocumentTables::default();
    let mut pos = header.payload_offset();

    if let Some(atom) = peek_record(data, pos, header.end(), RT_DOCUMENT_ATOM)? {
        atom.expect_version(1)?;
        atom.expect_instance(0)?;
        atom.expect_length(DOCUMENT_ATOM_LEN)?;
        let at = atom.payload_offset();
        tables.slide_size = Some(Size {
            width: cursor.i32(at)?,
            height: cursor.i32(at + 4)?,
        });
        tables.notes_size = Some(Size {
            width: cursor.i32(at + 8)?,
            height: cursor.i32(at + 12)?,
        });
        pos = atom.end();
    }

    for child in Records::new(data, pos, header.end()) {
        let child = child?;
        match child.rec_type {
            RT_EX_OBJ_LIST => read_hyperlinks(data, &child, &mut tables.hyperlinks)?,
            RT_ENVIRONMENT => tables.fonts = read_fonts(data, &child)?,
            RT_SLIDE_LIST_WITH_TEXT => match child.instance {
                SLIDE_LIST_SLIDES => tables.slides = Some(read_slide_list(data, &child)?),
                SLIDE_LIST_NOTES => tables.notes = read_slide_list(data, &child)?,
                _ => skip_unknown(&child, "document"),
            },
            _ => skip_unknown(&child, "document"),
        }
    }

    log::debug!(
        "Document tables: {} fonts, {} hyperlinks, {} listed slides",
        tables.fonts.len(),
        tables.hyperlinks.len(),
        tables.slides.as_ref().map_or(0, Vec::len)
    );
    Ok(tables)
}

fn utf16(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn read_hyperlinks(
    data: &[u8],
    list: &RecordHeader,
    hyperlinks: &mut HashMap<u32, String>,
) -> Result<()> {
    let cursor = ByteCursor::new(data);
    for child in list.children(data) {
        let child = child?;
        if child.rec_type != RT_EX_HYPERLINK {
            skip_unknown(&child, "ExObjList");
            continue;
        }

        let mut id = None;
        let mut target = None;
        let mut location = None;
        for field in child.children(data) {
            let field = field?;
            match (field.rec_type, field.instance) {
                (RT_EX_HYPERLINK_ATOM, _) => {
                    field.expect_length(4)?;
                    id = Some(cursor.u32(field.payload_offset())?);
                }
                (RT_CSTRING, HYPERLINK_TARGET) => target = Some(utf16(field.payload(data)?)),
                (RT_CSTRING, HYPERLINK_LOCATION) => location = Some(utf16(field.payload(data)?)),
                _ => skip_unknown(&field, "ExHyperlink"),
            }
        }

        match (id, target.filter(|t| !t.is_empty()).or(location)) {
            (Some(id), Some(url)) => {
                hyperlinks.insert(id, url);
            }
            (Some(id), None) => log::debug!("Hyperlink {} has no target", id),
            (None, _) => log::warn!("ExHyperlink at offset {} has no id", child.offset),
        }
    }
    Ok(())
}

fn read_fonts(data: &[u8], environment: &RecordHeader) -> Result<Vec<String>> {
    let mut fonts = Vec::new();
    for child in environment.children(data) {
        let child = child?;
        if child.rec_type != RT_FONT_COLLECTION {
            skip_unknown(&child, "Environment");
            continue;
        }
        for entity in child.children(data) {
            let entity = entity?;
            if entity.rec_type != RT_FONT_ENTITY_ATOM {
                skip_unknown(&entity, "FontCollection");
                continue;
            }
            entity.expect_min_length(FONT_NAME_LEN as u32)?;
            let name = utf16(&entity.payload(data)?[..FONT_NAME_LEN]);
            fonts.push(name.trim_end_matches('\0').to_string());
        }
    }
    Ok(fonts)
}

/// SlidePersistAtoms in order, each owning the text blocks up to the next.
fn read_slide_list(data: &[u8], list: &RecordHeader) -> Result<Vec<SlideEntry>> {
    let cursor = ByteCursor::new(data);
    let bound = list.end();
    let mut pos = list.payload_offset();
    let mut entries: Vec<SlideEntry> = Vec::new();

    while pos < bound {
        let next = read_bounded(data, pos, bound)?;
        if next.rec_type == RT_SLIDE_PERSIST_ATOM {
            next.expect_length(SLIDE_PERSIST_ATOM_LEN)?;
            entries.push(SlideEntry {
                persist_id: cursor.u32(next.payload_offset())?,
                slide_id: cursor.u32(next.payload_offset() + 12)?,
                outline: Vec::new(),
            });
            pos = next.end();
            continue;
        }

        match read_text_block(data, pos, bound)? {
            Some((block, after)) => {
                match entries.last_mut() {
                    Some(entry) => entry.outline.push(block),
                    None => log::warn!("Dropping outline text before the first slide"),
                }
                pos = after;
            }
            None => {
                skip_unknown(&next, "SlideListWithText");
                pos = next.end();
            }
        }
    }

    Ok(entries)
}
