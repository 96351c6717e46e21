//! Text blocks and their run-length formatting tables.
//!
//! A text block is a TextHeaderAtom followed by the flat text (TextBytesAtom
//! or TextCharsAtom) and an optional StyleTextPropAtom. The StyleTextPropAtom
//! holds two tables of runs over that text: paragraph runs (TextPFRun) and
//! character runs (TextCFRun). Each run carries a mask; a field is stored
//! only when its mask bit is set, in a fixed order.

use crate::color::{ColorIndex, ColorScheme};
use crate::cursor::ByteCursor;
use crate::record::{peek_record, read_bounded, skip_unknown};
use crate::record_types::*;
use ppt97_core::{Alignment, Bullet, Paragraph, Result, TextRun};
use std::collections::HashMap;

const CR: u16 = 0x000D;
const VERTICAL_TAB: u16 = 0x000B;
const SPACE: u16 = 0x0020;

/// Default bullet when a paragraph enables bullets without a character.
const DEFAULT_BULLET: char = '\u{2022}';

/// InteractiveInfo instance for mouse clicks.
const MOUSE_CLICK: u16 = 0;

/// TextPFException mask bits.
pub mod pf_mask {
    pub const HAS_BULLET: u32 = 1 << 0;
    pub const BULLET_HAS_FONT: u32 = 1 << 1;
    pub const BULLET_HAS_COLOR: u32 = 1 << 2;
    pub const BULLET_HAS_SIZE: u32 = 1 << 3;
    pub const BULLET_FONT: u32 = 1 << 4;
    pub const BULLET_COLOR: u32 = 1 << 5;
    pub const BULLET_SIZE: u32 = 1 << 6;
    pub const BULLET_CHAR: u32 = 1 << 7;
    pub const LEFT_MARGIN: u32 = 1 << 8;
    pub const INDENT: u32 = 1 << 10;
    pub const ALIGN: u32 = 1 << 11;
    pub const LINE_SPACING: u32 = 1 << 12;
    pub const SPACE_BEFORE: u32 = 1 << 13;
    pub const SPACE_AFTER: u32 = 1 << 14;
    pub const DEFAULT_TAB_SIZE: u32 = 1 << 15;
    pub const FONT_ALIGN: u32 = 1 << 16;
    pub const CHAR_WRAP: u32 = 1 << 17;
    pub const WORD_WRAP: u32 = 1 << 18;
    pub const OVERFLOW: u32 = 1 << 19;
    pub const TAB_STOPS: u32 = 1 << 20;
    pub const TEXT_DIRECTION: u32 = 1 << 21;

    pub const BULLET_FLAGS: u32 = HAS_BULLET | BULLET_HAS_FONT | BULLET_HAS_COLOR | BULLET_HAS_SIZE;
    pub const WRAP_FLAGS: u32 = CHAR_WRAP | WORD_WRAP | OVERFLOW;
}

/// TextCFException mask bits. The style bits double as fontStyle bits.
pub mod cf_mask {
    pub const BOLD: u32 = 1 << 0;
    pub const ITALIC: u32 = 1 << 1;
    pub const UNDERLINE: u32 = 1 << 2;
    pub const SHADOW: u32 = 1 << 4;
    pub const FEHINT: u32 = 1 << 5;
    pub const KUMI: u32 = 1 << 7;
    pub const EMBOSS: u32 = 1 << 9;
    pub const PP9_RT: u32 = 0xF << 10;
    pub const TYPEFACE: u32 = 1 << 16;
    pub const SIZE: u32 = 1 << 17;
    pub const COLOR: u32 = 1 << 18;
    pub const POSITION: u32 = 1 << 19;
    pub const PP10_EXT: u32 = 1 << 20;
    pub const OLD_EA_TYPEFACE: u32 = 1 << 21;
    pub const ANSI_TYPEFACE: u32 = 1 << 22;
    pub const SYMBOL_TYPEFACE: u32 = 1 << 23;
    pub const NEW_EA_TYPEFACE: u32 = 1 << 24;
    pub const CS_TYPEFACE: u32 = 1 << 25;
    pub const PP11_EXT: u32 = 1 << 26;

    pub const FONT_STYLE: u32 = BOLD | ITALIC | UNDERLINE | SHADOW | FEHINT | KUMI | EMBOSS | PP9_RT;
}

#[derive(Debug, Clone, Copy)]
enum Encoding {
    U16,
    I16,
    U32,
    ColorIndex,
    /// u16 count followed by `count` 4-byte tab stops.
    TabStops,
}

/// A field stored when any bit of `mask` is set.
#[derive(Debug, Clone, Copy)]
struct MaskedField<F> {
    mask: u32,
    field: F,
    encoding: Encoding,
}

const fn masked<F>(mask: u32, field: F, encoding: Encoding) -> MaskedField<F> {
    MaskedField {
        mask,
        field,
        encoding,
    }
}

#[derive(Debug, Clone, Copy)]
enum Value {
    Int(i32),
    Color(ColorIndex),
    Skipped,
}

impl Value {
    fn int(self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }
}

/// Walk `fields` in order, decoding the ones `mask` selects.
///
/// Returns the offset just past the last decoded field.
fn decode_masked<F: Copy>(
    cursor: &ByteCursor,
    mut pos: usize,
    mask: u32,
    fields: &[MaskedField<F>],
    mut apply: impl FnMut(F, Value),
) -> Result<usize> {
    for entry in fields {
        if mask & entry.mask == 0 {
            continue;
        }
        let (value, size) = match entry.encoding {
            Encoding::U16 => (Value::Int(i32::from(cursor.u16(pos)?)), 2),
            Encoding::I16 => (Value::Int(i32::from(cursor.i16(pos)?)), 2),
            Encoding::U32 => (Value::Int(cursor.u32(pos)? as i32), 4),
            Encoding::ColorIndex => {
                let b = cursor.bytes(pos, 4)?;
                (Value::Color(ColorIndex::from_bytes([b[0], b[1], b[2], b[3]])), 4)
            }
            Encoding::TabStops => {
                let count = cursor.u16(pos)? as usize;
                let size = 2 + count * 4;
                cursor.bytes(pos, size)?;
                (Value::Skipped, size)
            }
        };
        apply(entry.field, value);
        pos += size;
    }
    Ok(pos)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParagraphField {
    BulletFlags,
    BulletChar,
    BulletFont,
    BulletSize,
    BulletColor,
    Alignment,
    LineSpacing,
    SpaceBefore,
    SpaceAfter,
    LeftMargin,
    Indent,
    DefaultTabSize,
    TabStops,
    FontAlign,
    WrapFlags,
    TextDirection,
}

const PF_FIELDS: &[MaskedField<ParagraphField>] = &[
    masked(pf_mask::BULLET_FLAGS, ParagraphField::BulletFlags, Encoding::U16),
    masked(pf_mask::BULLET_CHAR, ParagraphField::BulletChar, Encoding::U16),
    masked(pf_mask::BULLET_FONT, ParagraphField::BulletFont, Encoding::U16),
    masked(pf_mask::BULLET_SIZE, ParagraphField::BulletSize, Encoding::I16),
    masked(pf_mask::BULLET_COLOR, ParagraphField::BulletColor, Encoding::ColorIndex),
    masked(pf_mask::ALIGN, ParagraphField::Alignment, Encoding::U16),
    masked(pf_mask::LINE_SPACING, ParagraphField::LineSpacing, Encoding::I16),
    masked(pf_mask::SPACE_BEFORE, ParagraphField::SpaceBefore, Encoding::I16),
    masked(pf_mask::SPACE_AFTER, ParagraphField::SpaceAfter, Encoding::I16),
    masked(pf_mask::LEFT_MARGIN, ParagraphField::LeftMargin, Encoding::I16),
    masked(pf_mask::INDENT, ParagraphField::Indent, Encoding::I16),
    masked(pf_mask::DEFAULT_TAB_SIZE, ParagraphField::DefaultTabSize, Encoding::U16),
    masked(pf_mask::TAB_STOPS, ParagraphField::TabStops, Encoding::TabStops),
    masked(pf_mask::FONT_ALIGN, ParagraphField::FontAlign, Encoding::U16),
    masked(pf_mask::WRAP_FLAGS, ParagraphField::WrapFlags, Encoding::U16),
    masked(pf_mask::TEXT_DIRECTION, ParagraphField::TextDirection, Encoding::U16),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharField {
    Style,
    Typeface,
    OldEaTypeface,
    AnsiTypeface,
    SymbolTypeface,
    Size,
    Color,
    Position,
    Pp10Ext,
    NewEaTypeface,
    CsTypeface,
    Pp11Ext,
}

const CF_FIELDS: &[MaskedField<CharField>] = &[
    masked(cf_mask::FONT_STYLE, CharField::Style, Encoding::U16),
    masked(cf_mask::TYPEFACE, CharField::Typeface, Encoding::U16),
    masked(cf_mask::OLD_EA_TYPEFACE, CharField::OldEaTypeface, Encoding::U16),
    masked(cf_mask::ANSI_TYPEFACE, CharField::AnsiTypeface, Encoding::U16),
    masked(cf_mask::SYMBOL_TYPEFACE, CharField::SymbolTypeface, Encoding::U16),
    masked(cf_mask::SIZE, CharField::Size, Encoding::I16),
    masked(cf_mask::COLOR, CharField::Color, Encoding::ColorIndex),
    masked(cf_mask::POSITION, CharField::Position, Encoding::I16),
    masked(cf_mask::PP10_EXT, CharField::Pp10Ext, Encoding::U32),
    masked(cf_mask::NEW_EA_TYPEFACE, CharField::NewEaTypeface, Encoding::U16),
    masked(cf_mask::CS_TYPEFACE, CharField::CsTypeface, Encoding::U16),
    masked(cf_mask::PP11_EXT, CharField::Pp11Ext, Encoding::U32),
];

/// Paragraph properties of one TextPFRun. `None` means "inherit".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphFormat {
    pub level: u16,
    pub has_bullet: Option<bool>,
    pub bullet_char: Option<u16>,
    pub bullet_font: Option<u16>,
    pub bullet_size: Option<i16>,
    pub bullet_color: Option<ColorIndex>,
    pub alignment: Option<u16>,
    pub line_spacing: Option<i16>,
    pub space_before: Option<i16>,
    pub space_after: Option<i16>,
    pub left_margin: Option<i16>,
    pub indent: Option<i16>,
}

impl ParagraphFormat {
    fn decode(cursor: &ByteCursor, pos: usize, mask: u32, level: u16) -> Result<(Self, usize)> {
        let mut format = ParagraphFormat {
            level,
            ..Default::default()
        };
        let end = decode_masked(cursor, pos, mask, PF_FIELDS, |field, value| {
            let int = value.int();
            match field {
                ParagraphField::BulletFlags => {
                    if mask & pf_mask::HAS_BULLET != 0 {
                        format.has_bullet = int.map(|flags| flags & 1 != 0);
                    }
                }
                ParagraphField::BulletChar => format.bullet_char = int.map(|v| v as u16),
                ParagraphField::BulletFont => format.bullet_font = int.map(|v| v as u16),
                ParagraphField::BulletSize => format.bullet_size = int.map(|v| v as i16),
                ParagraphField::BulletColor => {
                    if let Value::Color(color) = value {
                        format.bullet_color = Some(color);
                    }
                }
                ParagraphField::Alignment => format.alignment = int.map(|v| v as u16),
                ParagraphField::LineSpacing => format.line_spacing = int.map(|v| v as i16),
                ParagraphField::SpaceBefore => format.space_before = int.map(|v| v as i16),
                ParagraphField::SpaceAfter => format.space_after = int.map(|v| v as i16),
                ParagraphField::LeftMargin => format.left_margin = int.map(|v| v as i16),
                ParagraphField::Indent => format.indent = int.map(|v| v as i16),
                ParagraphField::DefaultTabSize
                | ParagraphField::TabStops
                | ParagraphField::FontAlign
                | ParagraphField::WrapFlags
                | ParagraphField::TextDirection => {}
            }
        })?;
        Ok((format, end))
    }
}

/// Character properties of one TextCFRun. `None` means "inherit".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharFormat {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub shadow: Option<bool>,
    pub emboss: Option<bool>,
    pub font: Option<u16>,
    pub ea_font: Option<u16>,
    pub ansi_font: Option<u16>,
    pub symbol_font: Option<u16>,
    pub size: Option<i16>,
    pub color: Option<ColorIndex>,
    pub position: Option<i16>,
}

impl CharFormat {
    fn decode(cursor: &ByteCursor, pos: usize, mask: u32) -> Result<(Self, usize)> {
        let mut format = CharFormat::default();
        let end = decode_masked(cursor, pos, mask, CF_FIELDS, |field, value| {
            let int = value.int();
            match field {
                CharField::Style => {
                    let style = int.unwrap_or(0) as u32;
                    let flag = |bit: u32| (mask & bit != 0).then_some(style & bit != 0);
                    format.bold = flag(cf_mask::BOLD);
                    format.italic = flag(cf_mask::ITALIC);
                    format.underline = flag(cf_mask::UNDERLINE);
                    format.shadow = flag(cf_mask::SHADOW);
                    format.emboss = flag(cf_mask::EMBOSS);
                }
                CharField::Typeface => format.font = int.map(|v| v as u16),
                CharField::OldEaTypeface => format.ea_font = int.map(|v| v as u16),
                CharField::AnsiTypeface => format.ansi_font = int.map(|v| v as u16),
                CharField::SymbolTypeface => format.symbol_font = int.map(|v| v as u16),
                CharField::Size => format.size = int.map(|v| v as i16),
                CharField::Color => {
                    if let Value::Color(color) = value {
                        format.color = Some(color);
                    }
                }
                CharField::Position => format.position = int.map(|v| v as i16),
                CharField::Pp10Ext
                | CharField::NewEaTypeface
                | CharField::CsTypeface
                | CharField::Pp11Ext => {}
            }
        })?;
        Ok((format, end))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphRun {
    pub length: u32,
    pub format: ParagraphFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharRun {
    pub length: u32,
    pub format: CharFormat,
}

/// Decoded StyleTextPropAtom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleTextProps {
    pub paragraphs: Vec<ParagraphRun>,
    pub characters: Vec<CharRun>,
}

impl StyleTextProps {
    /// Decode both run tables. Each table is read until its runs cover
    /// `text_len` code units.
    pub fn parse(payload: &[u8], text_len: usize) -> Result<Self> {
        let cursor = ByteCursor::new(payload);
        let mut pos = 0;

        let mut paragraphs = Vec::new();
        let mut covered = 0usize;
        while covered < text_len {
            let length = cursor.u32(pos)?;
            let level = cursor.u16(pos + 4)?;
            let mask = cursor.u32(pos + 6)?;
            let (format, next) = ParagraphFormat::decode(&cursor, pos + 10, mask, level)?;
            paragraphs.push(ParagraphRun { length, format });
            covered = covered.saturating_add(length as usize);
            pos = next;
        }

        let mut characters = Vec::new();
        let mut covered = 0usize;
        while covered < text_len {
            let length = cursor.u32(pos)?;
            let mask = cursor.u32(pos + 4)?;
            let (format, next) = CharFormat::decode(&cursor, pos + 8, mask)?;
            characters.push(CharRun { length, format });
            covered = covered.saturating_add(length as usize);
            pos = next;
        }

        Ok(Self {
            paragraphs,
            characters,
        })
    }

    pub fn paragraph_len(&self) -> usize {
        self.paragraphs.iter().map(|r| r.length as usize).sum()
    }

    pub fn char_len(&self) -> usize {
        self.characters.iter().map(|r| r.length as usize).sum()
    }
}

/// A hyperlink covering `[start, end)` of a block's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSpan {
    pub start: usize,
    pub end: usize,
    pub hyperlink_id: u32,
}

/// One decoded text block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBlock {
    pub text_type: u32,
    /// UTF-16 code units with vertical tabs already mapped to spaces.
    pub units: Vec<u16>,
    pub style: Option<StyleTextProps>,
    pub links: Vec<LinkSpan>,
}

/// Document-wide lookups needed to turn formatting into output runs.
#[derive(Debug, Clone, Copy)]
pub struct TextContext<'a> {
    pub fonts: &'a [String],
    pub hyperlinks: &'a HashMap<u32, String>,
    pub scheme: Option<&'a ColorScheme>,
}

impl<'a> TextContext<'a> {
    fn font(&self, index: Option<u16>) -> Option<String> {
        index.and_then(|i| self.fonts.get(i as usize).cloned())
    }
}

/// Read a text block starting at `pos`.
///
/// Returns `None` when no TextHeaderAtom follows the optional leading
/// hyperlink records. Otherwise returns the block and the offset of the
/// first record that does not belong to it.
pub fn read_text_block(
    data: &[u8],
    pos: usize,
    bound: usize,
) -> Result<Option<(TextBlock, usize)>> {
    let mut links = Vec::new();
    let mut pos = read_links(data, pos, bound, &mut links)?;

    let header = match peek_record(data, pos, bound, RT_TEXT_HEADER_ATOM)? {
        Some(header) => header,
        None => return Ok(None),
    };
    header.expect_length(4)?;
    let text_type = ByteCursor::new(data).u32(header.payload_offset())?;
    pos = header.end();

    let mut units: Vec<u16> = Vec::new();
    if let Some(chars) = peek_record(data, pos, bound, RT_TEXT_CHARS_ATOM)? {
        units = chars
            .payload(data)?
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        pos = chars.end();
    } else if let Some(bytes) = peek_record(data, pos, bound, RT_TEXT_BYTES_ATOM)? {
        units = bytes.payload(data)?.iter().map(|&b| u16::from(b)).collect();
        pos = bytes.end();
    }
    for unit in units.iter_mut() {
        if *unit == VERTICAL_TAB {
            *unit = SPACE;
        }
    }

    let mut style = None;
    if let Some(props) = peek_record(data, pos, bound, RT_STYLE_TEXT_PROP_ATOM)? {
        match StyleTextProps::parse(props.payload(data)?, units.len()) {
            Ok(decoded) => style = Some(decoded),
            Err(e) => log::warn!(
                "Dropping formatting of text at offset {}: {}",
                props.offset,
                e
            ),
        }
        pos = props.end();
    }

    while pos < bound {
        let next = read_bounded(data, pos, bound)?;
        match next.rec_type {
            RT_TEXT_HEADER_ATOM | RT_SLIDE_PERSIST_ATOM | RT_OUTLINE_TEXT_REF_ATOM => break,
            RT_INTERACTIVE_INFO => {
                let mut trailing = Vec::new();
                let after = read_links(data, pos, bound, &mut trailing)?;
                // Links directly ahead of a header belong to that block.
                if peek_record(data, after, bound, RT_TEXT_HEADER_ATOM)?.is_some() {
                    break;
                }
                links.append(&mut trailing);
                pos = after;
            }
            _ => {
                skip_unknown(&next, "text block");
                pos = next.end();
            }
        }
    }

    Ok(Some((
        TextBlock {
            text_type,
            units,
            style,
            links,
        },
        pos,
    )))
}

/// Consume InteractiveInfo containers, each optionally followed by its
/// TxInteractiveInfoAtom range.
fn read_links(data: &[u8], mut pos: usize, bound: usize, links: &mut Vec<LinkSpan>) -> Result<usize> {
    let cursor = ByteCursor::new(data);
    while let Some(info) = peek_record(data, pos, bound, RT_INTERACTIVE_INFO)? {
        pos = info.end();

        let mut hyperlink_id = None;
        for child in info.children(data) {
            let child = child?;
            if child.rec_type == RT_INTERACTIVE_INFO_ATOM {
                child.expect_min_length(12)?;
                hyperlink_id = Some(cursor.u32(child.payload_offset() + 4)?);
            } else {
                skip_unknown(&child, "interactive info");
            }
        }

        if let Some(range) = peek_record(data, pos, bound, RT_TEXT_INTERACTIVE_INFO_ATOM)? {
            range.expect_length(8)?;
            let begin = cursor.i32(range.payload_offset())?;
            let end = cursor.i32(range.payload_offset() + 4)?;
            pos = range.end();

            if let (MOUSE_CLICK, Some(hyperlink_id)) = (info.instance, hyperlink_id) {
                if begin >= 0 && end >= begin {
                    links.push(LinkSpan {
                        start: begin as usize,
                        end: end as usize,
                        hyperlink_id,
                    });
                }
            }
        }
    }
    Ok(pos)
}

impl TextBlock {
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn text(&self) -> String {
        String::from_utf16_lossy(&self.units)
    }

    /// Project the block into output paragraphs.
    ///
    /// Paragraphs break at every CR, inside character runs too, and where a
    /// paragraph run ends without one. Output runs break at character-run
    /// boundaries and at hyperlink span edges, so a link applies to a run
    /// only when the span matches it exactly.
    pub fn paragraphs(&self, ctx: &TextContext) -> Vec<Paragraph> {
        let len = self.units.len();
        if let Some(style) = &self.style {
            if style.paragraph_len() != style.char_len() {
                log::warn!(
                    "Paragraph runs cover {} units but character runs cover {}",
                    style.paragraph_len(),
                    style.char_len()
                );
            }
        }

        let default_format = CharFormat::default();
        let mut segments: Vec<(usize, usize, &CharFormat)> = Vec::new();
        let mut covered = 0usize;
        if let Some(style) = &self.style {
            for run in &style.characters {
                if covered >= len {
                    break;
                }
                let end = covered.saturating_add(run.length as usize).min(len);
                segments.push((covered, end, &run.format));
                covered = end;
            }
        }
        if covered < len {
            segments.push((covered, len, &default_format));
        }

        let breaks = self.paragraph_run_breaks();
        let mut paragraphs = Vec::new();
        let mut current = self.new_paragraph(0, ctx);
        for (seg_start, seg_end, format) in segments {
            let mut start = seg_start;
            while start < seg_end {
                let cr = self.units[start..seg_end]
                    .iter()
                    .position(|&u| u == CR)
                    .map(|p| start + p);
                let run_break = breaks.iter().copied().find(|&b| b > start && b < seg_end);
                let limit = cr.unwrap_or(seg_end).min(run_break.unwrap_or(seg_end));
                let stop = self.next_link_edge(start, limit);

                if stop > start {
                    current.runs.push(self.run(start, stop, format, ctx));
                }
                if cr == Some(stop) {
                    paragraphs.push(std::mem::replace(
                        &mut current,
                        self.new_paragraph(stop + 1, ctx),
                    ));
                    start = stop + 1;
                } else {
                    if breaks.contains(&stop) {
                        paragraphs.push(std::mem::replace(
                            &mut current,
                            self.new_paragraph(stop, ctx),
                        ));
                    }
                    start = stop;
                }
            }
        }
        paragraphs.push(current);
        paragraphs
    }

    fn next_link_edge(&self, from: usize, limit: usize) -> usize {
        self.links
            .iter()
            .flat_map(|link| [link.start, link.end])
            .filter(|&edge| edge > from && edge < limit)
            .min()
            .unwrap_or(limit)
    }

    /// Interior offsets where a paragraph run ends on something other than CR.
    fn paragraph_run_breaks(&self) -> Vec<usize> {
        let Some(style) = &self.style else {
            return Vec::new();
        };
        let len = self.units.len();
        let mut breaks = Vec::new();
        let mut end = 0usize;
        for run in &style.paragraphs {
            end = end.saturating_add(run.length as usize);
            if end >= len {
                break;
            }
            if end > 0 && self.units[end - 1] != CR {
                breaks.push(end);
            }
        }
        breaks
    }

    fn paragraph_format(&self, pos: usize) -> Option<&ParagraphFormat> {
        let runs = &self.style.as_ref()?.paragraphs;
        let mut start = 0usize;
        for run in runs {
            let end = start.saturating_add(run.length as usize);
            if pos < end {
                return Some(&run.format);
            }
            start = end;
        }
        runs.last().map(|run| &run.format)
    }

    fn new_paragraph(&self, pos: usize, ctx: &TextContext) -> Paragraph {
        let Some(format) = self.paragraph_format(pos) else {
            return Paragraph::default();
        };

        let bullet = if format.has_bullet == Some(true) {
            let character = format
                .bullet_char
                .and_then(|c| char::from_u32(u32::from(c)))
                .filter(|&c| c != '\0')
                .unwrap_or(DEFAULT_BULLET);
            Bullet::Char {
                character,
                font_name: ctx.font(format.bullet_font),
                color: format.bullet_color.and_then(|c| c.resolve(ctx.scheme)),
            }
        } else {
            Bullet::None
        };

        Paragraph {
            alignment: format.alignment.map(Alignment::from_raw).unwrap_or_default(),
            bullet,
            level: format.level,
            left_margin: format.left_margin,
            indent: format.indent,
            runs: Vec::new(),
        }
    }

    fn run(&self, start: usize, end: usize, format: &CharFormat, ctx: &TextContext) -> TextRun {
        let hyperlink = self
            .links
            .iter()
            .find(|link| link.start == start && link.end == end)
            .and_then(|link| ctx.hyperlinks.get(&link.hyperlink_id).cloned());

        TextRun {
            text: String::from_utf16_lossy(&self.units[start..end]),
            bold: format.bold.unwrap_or(false),
            italic: format.italic.unwrap_or(false),
            underline: format.underline.unwrap_or(false),
            font_name: ctx.font(format.font),
            size: format.size.filter(|&s| s > 0).map(|s| s as u16),
            color: format.color.and_then(|c| c.resolve(ctx.scheme)),
            hyperlink,
        }
    }
}
