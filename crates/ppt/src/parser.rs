//! PPT file parser implementation.
//!
//! Loads PowerPoint 97-2003 (.ppt) files from their OLE/CFB container. The
//! "PowerPoint Document" stream is addressed through the persist directory:
//! the Current User stream points at the latest UserEditAtom, whose edit
//! chain yields the offset of every persisted object. The DocumentContainer
//! supplies document-wide tables (fonts, hyperlinks, slide list), after which
//! each listed slide and its notes page are decoded in presentation order.

use crate::blip::BlipStore;
use crate::document::{decode_document, DocumentTables};
use crate::officeart::{DrawingContext, ShapeIds};
use crate::persist::{object_header, resolve, ResolvedDocument};
use crate::record_types::{RT_DOCUMENT, RT_NOTES, RT_SLIDE};
use crate::slide::{read_notes, read_slide, DrawingPage};
use crate::text::{TextBlock, TextContext};
use cfb::CompoundFile;
use ppt97_core::{Error, NotesPage, Presentation, Result, Slide, Violation};
use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Seek};

const DOCUMENT_STREAM: &str = "/PowerPoint Document";
const CURRENT_USER_STREAM: &str = "/Current User";
const PICTURES_STREAM: &str = "/Pictures";

/// The raw streams a load works from, fully buffered.
#[derive(Debug, Clone, Default)]
pub struct PptStreams {
    pub document: Vec<u8>,
    pub current_user: Vec<u8>,
    pub pictures: Option<Vec<u8>>,
}

impl PptStreams {
    /// Read the streams out of a compound file.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut cfb = CompoundFile::open(reader)
            .map_err(|e| Error::CfbError(format!("Failed to open CFB container: {}", e)))?;

        let document = read_stream(&mut cfb, DOCUMENT_STREAM)?
            .ok_or_else(|| Error::MissingStream(DOCUMENT_STREAM.to_string()))?;
        let current_user = read_stream(&mut cfb, CURRENT_USER_STREAM)?
            .ok_or_else(|| Error::MissingStream(CURRENT_USER_STREAM.to_string()))?;
        let pictures = read_stream(&mut cfb, PICTURES_STREAM)?;

        log::debug!(
            "Read streams: document={} bytes, current user={} bytes, pictures={:?} bytes",
            document.len(),
            current_user.len(),
            pictures.as_ref().map(Vec::len)
        );

        Ok(Self {
            document,
            current_user,
            pictures,
        })
    }
}

fn read_stream<R: Read + Seek>(cfb: &mut CompoundFile<R>, path: &str) -> Result<Option<Vec<u8>>> {
    if !cfb.is_stream(path) {
        return Ok(None);
    }

    let mut stream = cfb
        .open_stream(path)
        .map_err(|e| Error::CfbError(format!("Failed to open {} stream: {}", path, e)))?;

    let mut data = Vec::new();
    stream.read_to_end(&mut data)?;
    Ok(Some(data))
}

/// Persisted objects of interest, by persist id.
#[derive(Default)]
struct PersistedObjects {
    document: Option<DocumentTables>,
    slides: BTreeMap<u32, DrawingPage>,
    notes: BTreeMap<u32, DrawingPage>,
}

/// Parser for legacy PPT (OLE/CFB) files.
#[derive(Debug, Clone)]
pub struct PptParser {
    include_notes: bool,
    include_pictures: bool,
}

impl PptParser {
    /// Create a new PPT parser that decodes notes and pictures.
    pub fn new() -> Self {
        Self {
            include_notes: true,
            include_pictures: true,
        }
    }

    /// Decode notes pages and attach them to their slides.
    pub fn with_notes(mut self, include: bool) -> Self {
        self.include_notes = include;
        self
    }

    /// Decode the Pictures stream. When off, picture shapes are dropped.
    pub fn with_pictures(mut self, include: bool) -> Self {
        self.include_pictures = include;
        self
    }

    /// Parse a PPT file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<Presentation> {
        let streams = PptStreams::from_reader(reader)?;
        self.load(&streams)
    }

    /// Decode a presentation from already extracted streams.
    ///
    /// Any structural violation aborts the load; no partial presentation is
    /// returned.
    pub fn load(&self, streams: &PptStreams) -> Result<Presentation> {
        let data = streams.document.as_slice();
        let resolved = resolve(data, &streams.current_user)?;
        let blips = self.load_pictures(streams)?;
        let objects = self.dispatch(data, &resolved)?;

        let doc_persist_id = resolved.current_edit().doc_persist_id_ref;
        let tables = objects
            .document
            .ok_or(Violation::MissingPersistObject(doc_persist_id))?;

        let mut notes_by_slide: HashMap<u32, (u32, DrawingPage)> = HashMap::new();
        for (persist_id, page) in objects.notes {
            if let Some(slide_id) = page.slide_id_ref {
                notes_by_slide.insert(slide_id, (persist_id, page));
            }
        }

        let order: Vec<(u32, Option<u32>)> = match &tables.slides {
            Some(list) => list
                .iter()
                .map(|entry| (entry.persist_id, Some(entry.slide_id)))
                .collect(),
            None => objects.slides.keys().map(|&id| (id, None)).collect(),
        };

        let mut presentation = Presentation::new();
        presentation.slide_size = tables.slide_size;
        presentation.notes_size = tables.notes_size;
        let mut ids = ShapeIds::new();

        for (persist_id, slide_id) in order {
            let Some(page) = objects.slides.get(&persist_id) else {
                log::warn!("Slide list refers to persist id {} with no slide", persist_id);
                continue;
            };

            let outline = tables
                .slide_entry(persist_id)
                .map_or(&[][..], |entry| entry.outline.as_slice());
            let ctx = drawing_context(&tables, page, blips.as_ref(), outline);

            let mut slide = Slide::new(presentation.slides.len() + 1);
            slide.slide_id = slide_id;
            slide.shapes = page.shapes(data, &ctx, &mut ids)?;

            if let Some((notes_persist_id, notes_page)) =
                slide_id.and_then(|id| notes_by_slide.remove(&id))
            {
                let outline = tables
                    .notes
                    .iter()
                    .find(|entry| entry.persist_id == notes_persist_id)
                    .map_or(&[][..], |entry| entry.outline.as_slice());
                let ctx = drawing_context(&tables, &notes_page, blips.as_ref(), outline);
                slide.notes = Some(NotesPage {
                    shapes: notes_page.shapes(data, &ctx, &mut ids)?,
                });
            }

            log::debug!(
                "Slide {} (persist id {}): {} shapes, notes: {}",
                slide.number,
                persist_id,
                slide.shapes.len(),
                slide.notes.is_some()
            );
            presentation.add_slide(slide);
        }

        for slide_id in notes_by_slide.keys() {
            log::warn!("Dropping notes page for unknown slide id {}", slide_id);
        }

        if presentation.slides.is_empty() {
            log::warn!("No slides decoded from the document");
        }

        Ok(presentation)
    }

    fn load_pictures(&self, streams: &PptStreams) -> Result<Option<BlipStore>> {
        if !self.include_pictures {
            return Ok(None);
        }
        match &streams.pictures {
            Some(pictures) => BlipStore::decode(pictures).map(Some),
            None => Ok(Some(BlipStore::default())),
        }
    }

    /// Visit every persisted object in id order and read the ones the
    /// presentation is assembled from.
    fn dispatch(&self, data: &[u8], resolved: &ResolvedDocument) -> Result<PersistedObjects> {
        let doc_persist_id = resolved.current_edit().doc_persist_id_ref;
        let mut objects = PersistedObjects::default();

        for (persist_id, offset) in resolved.directory.iter() {
            let header = object_header(data, persist_id, offset)?;
            match header.rec_type {
                RT_DOCUMENT if persist_id == doc_persist_id => {
                    objects.document = Some(decode_document(data, &header)?);
                }
                RT_SLIDE => {
                    objects.slides.insert(persist_id, read_slide(data, &header)?);
                }
                RT_NOTES if self.include_notes => {
                    objects.notes.insert(persist_id, read_notes(data, &header)?);
                }
                _ => log::trace!(
                    "Ignoring persisted {} (0x{:04X}) with id {}",
                    header.name(),
                    header.rec_type,
                    persist_id
                ),
            }
        }

        Ok(objects)
    }
}

impl Default for PptParser {
    fn default() -> Self {
        Self::new()
    }
}

fn drawing_context<'a>(
    tables: &'a DocumentTables,
    page: &'a DrawingPage,
    blips: Option<&'a BlipStore>,
    outline: &'a [TextBlock],
) -> DrawingContext<'a> {
    DrawingContext {
        text: TextContext {
            fonts: &tables.fonts,
            hyperlinks: &tables.hyperlinks,
            scheme: page.scheme.as_ref(),
        },
        blips,
        outline,
    }
}
