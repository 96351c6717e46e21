//! OfficeArt drawings: shape containers, groups and their property tables.
//!
//! A slide's Drawing wraps an OfficeArtDgContainer whose SpgrContainer is
//! the top-level group. Within every group the first SpContainer describes
//! the group itself (its coordinate space and anchor) and is never emitted.

use crate::blip::BlipStore;
use crate::color::{resolve_color_ref, ColorScheme};
use crate::cursor::ByteCursor;
use crate::record::{expect_record, peek_record, read_bounded, skip_unknown, RecordHeader, Records};
use crate::record_types::*;
use crate::text::{read_text_block, TextBlock, TextContext};
use ppt97_core::{
    Border, Geometry, Group, Line, Paragraph, Picture, Result, RichText, Shadow, Shape, ShapeKind,
    Violation,
};
use std::collections::HashMap;

/// OfficeArtFOPT property ids.
pub mod prop {
    pub const ROTATION: u16 = 0x0004;
    pub const TXID: u16 = 0x0080;
    pub const PIB: u16 = 0x0104;
    pub const SHAPE_PATH: u16 = 0x0144;
    pub const FILL_TYPE: u16 = 0x0180;
    pub const FILL_COLOR: u16 = 0x0181;
    pub const FILL_STYLE_BOOLEANS: u16 = 0x01BF;
    pub const LINE_COLOR: u16 = 0x01C0;
    pub const LINE_WIDTH: u16 = 0x01CB;
    pub const LINE_STYLE_BOOLEANS: u16 = 0x01FF;
    pub const SHADOW_COLOR: u16 = 0x0201;
    pub const SHADOW_OFFSET_X: u16 = 0x0205;
    pub const SHADOW_OFFSET_Y: u16 = 0x0206;
    pub const SHADOW_STYLE_BOOLEANS: u16 = 0x023F;
}

const PROP_ID_MASK: u16 = 0x3FFF;
const PROP_COMPLEX: u16 = 0x8000;
const FOPT_ENTRY_LEN: usize = 6;

// Bit of the value within each *StyleBooleanProperties; the matching
// "use" bit sits 16 above it.
const FILLED_BIT: u32 = 4;
const LINE_BIT: u32 = 3;
const SHADOW_BIT: u32 = 1;

// OfficeArtFSP.grfPersistent
pub const FSP_GROUP: u32 = 0x0001;
pub const FSP_CHILD: u32 = 0x0002;
pub const FSP_PATRIARCH: u32 = 0x0004;
pub const FSP_DELETED: u32 = 0x0008;
pub const FSP_FLIP_H: u32 = 0x0040;
pub const FSP_FLIP_V: u32 = 0x0080;
pub const FSP_HAVE_ANCHOR: u32 = 0x0200;
pub const FSP_HAVE_SPT: u32 = 0x0800;

/// msosptLine
const SHAPE_TYPE_LINE: u16 = 20;
/// msoshapeLines
const SHAPE_PATH_LINES: u32 = 0;

const CLIENT_ANCHOR_LEN: u32 = 8;
const CLIENT_ANCHOR_LARGE_LEN: u32 = 16;

const EMU_PER_POINT: f64 = 12700.0;
const EMU_PER_PIXEL: i32 = 9525;
const DEFAULT_LINE_WIDTH: u32 = 9525;
const DEFAULT_SHADOW_OFFSET: i32 = 25400;
const DEFAULT_FILL_COLOR: u32 = 0x00FF_FFFF;
const DEFAULT_LINE_COLOR: u32 = 0x0000_0000;
const DEFAULT_SHADOW_COLOR: u32 = 0x0080_8080;

/// Simple properties from the FOPT tables of one shape.
#[derive(Debug, Clone, Default)]
pub struct ShapeProperties {
    values: HashMap<u16, u32>,
}

impl ShapeProperties {
    /// Decode an OfficeArtFOPT (or secondary/tertiary) record.
    ///
    /// The instance holds the entry count. Complex data trailing the table
    /// is not needed and stays unread.
    pub fn parse(data: &[u8], header: &RecordHeader) -> Result<Self> {
        header.expect_version(3)?;
        let count = header.instance as usize;
        let table_len = count * FOPT_ENTRY_LEN;
        if table_len > header.length as usize {
            return Err(header.bad_length(format!(">= {}", table_len)));
        }

        let cursor = ByteCursor::new(data);
        let mut values = HashMap::with_capacity(count);
        for i in 0..count {
            let at = header.payload_offset() + i * FOPT_ENTRY_LEN;
            let raw_id = cursor.u16(at)?;
            let value = cursor.u32(at + 2)?;
            if raw_id & PROP_COMPLEX != 0 {
                continue;
            }
            values.insert(raw_id & PROP_ID_MASK, value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, id: u16) -> Option<u32> {
        self.values.get(&id).copied()
    }

    fn merge(&mut self, other: ShapeProperties) {
        self.values.extend(other.values);
    }

    /// A flag of a style-boolean property, only when its "use" bit is set.
    fn flag(&self, id: u16, bit: u32) -> Option<bool> {
        let value = self.get(id)?;
        (value & (1 << (bit + 16)) != 0).then_some(value & (1 << bit) != 0)
    }

    /// Whether a style is on: the explicit flag when given, otherwise
    /// whether its color is set.
    fn enabled(&self, booleans: u16, bit: u32, color: u16) -> bool {
        self.flag(booleans, bit)
            .unwrap_or_else(|| self.get(color).is_some())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    fn read(cursor: &ByteCursor, at: usize) -> Result<Self> {
        Ok(Self {
            left: cursor.i32(at)?,
            top: cursor.i32(at + 4)?,
            right: cursor.i32(at + 8)?,
            bottom: cursor.i32(at + 12)?,
        })
    }
}

/// A group's child coordinate space and where it lands in its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupFrame {
    pub space: Rect,
    pub bounds: Rect,
}

impl GroupFrame {
    /// Map a child anchor from the group space into the group bounds.
    pub fn map(&self, child: Rect) -> Rect {
        let (sw, sh) = (i64::from(self.space.width()), i64::from(self.space.height()));
        if sw == 0 || sh == 0 {
            return child;
        }
        let (bw, bh) = (i64::from(self.bounds.width()), i64::from(self.bounds.height()));
        let x = |v: i32| {
            (i64::from(self.bounds.left) + (i64::from(v) - i64::from(self.space.left)) * bw / sw)
                as i32
        };
        let y = |v: i32| {
            (i64::from(self.bounds.top) + (i64::from(v) - i64::from(self.space.top)) * bh / sh)
                as i32
        };
        Rect {
            left: x(child.left),
            top: y(child.top),
            right: x(child.right),
            bottom: y(child.bottom),
        }
    }
}

/// Shape ids handed out during one load, starting at 1.
#[derive(Debug)]
pub struct ShapeIds {
    next: u32,
}

impl ShapeIds {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }
}

impl Default for ShapeIds {
    fn default() -> Self {
        Self::new()
    }
}

/// What shapes of one slide or notes page need to resolve references.
#[derive(Debug, Clone, Copy)]
pub struct DrawingContext<'a> {
    pub text: TextContext<'a>,
    /// `None` when pictures are not decoded.
    pub blips: Option<&'a BlipStore>,
    /// Outline text blocks of the slide, for OutlineTextRefAtom.
    pub outline: &'a [TextBlock],
}

/// OfficeArtFSP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeRecord {
    pub shape_type: u16,
    pub spid: u32,
    pub flags: u32,
}

/// The fields of one SpContainer, in their mandated order.
#[derive(Debug, Clone)]
struct SpParts {
    group_space: Option<Rect>,
    shape: ShapeRecord,
    props: ShapeProperties,
    child_anchor: Option<Rect>,
    client_anchor: Option<Rect>,
    textbox: Option<RecordHeader>,
}

impl SpParts {
    fn read(data: &[u8], container: &RecordHeader) -> Result<Self> {
        let cursor = ByteCursor::new(data);
        let bound = container.end();
        let mut pos = container.payload_offset();

        let mut group_space = None;
        if let Some(fspgr) = peek_record(data, pos, bound, OFFICE_ART_FSPGR)? {
            fspgr.expect_version(1)?;
            fspgr.expect_length(16)?;
            group_space = Some(Rect::read(&cursor, fspgr.payload_offset())?);
            pos = fspgr.end();
        }

        let fsp = expect_record(data, pos, bound, OFFICE_ART_FSP)?;
        fsp.expect_version(2)?;
        fsp.expect_length(8)?;
        let shape = ShapeRecord {
            shape_type: fsp.instance,
            spid: cursor.u32(fsp.payload_offset())?,
            flags: cursor.u32(fsp.payload_offset() + 4)?,
        };
        pos = fsp.end();

        if let Some(fpspl) = peek_record(data, pos, bound, OFFICE_ART_FPSPL)? {
            pos = fpspl.end();
        }

        let mut props = ShapeProperties::default();
        for rec_type in [OFFICE_ART_FOPT, OFFICE_ART_SECONDARY_FOPT, OFFICE_ART_TERTIARY_FOPT] {
            if let Some(table) = peek_record(data, pos, bound, rec_type)? {
                props.merge(ShapeProperties::parse(data, &table)?);
                pos = table.end();
            }
        }

        let mut child_anchor = None;
        if let Some(anchor) = peek_record(data, pos, bound, OFFICE_ART_CHILD_ANCHOR)? {
            anchor.expect_length(16)?;
            child_anchor = Some(Rect::read(&cursor, anchor.payload_offset())?);
            pos = anchor.end();
        }

        let mut client_anchor = None;
        if let Some(anchor) = peek_record(data, pos, bound, OFFICE_ART_CLIENT_ANCHOR)? {
            client_anchor = Some(read_client_anchor(&cursor, &anchor)?);
            pos = anchor.end();
        }

        if let Some(client_data) = peek_record(data, pos, bound, OFFICE_ART_CLIENT_DATA)? {
            pos = client_data.end();
        }

        let mut textbox = None;
        if let Some(found) = peek_record(data, pos, bound, OFFICE_ART_CLIENT_TEXTBOX)? {
            textbox = Some(found);
            pos = found.end();
        }

        while pos < bound {
            let next = read_bounded(data, pos, bound)?;
            match next.rec_type {
                OFFICE_ART_SECONDARY_FOPT | OFFICE_ART_TERTIARY_FOPT => {
                    props.merge(ShapeProperties::parse(data, &next)?)
                }
                _ => skip_unknown(&next, "shape container"),
            }
            pos = next.end();
        }

        Ok(Self {
            group_space,
            shape,
            props,
            child_anchor,
            client_anchor,
            textbox,
        })
    }

    /// The shape's rectangle in slide coordinates.
    fn anchor_in(&self, parent: Option<&GroupFrame>) -> Option<Rect> {
        match (self.child_anchor, parent) {
            (Some(child), Some(frame)) => Some(frame.map(child)),
            _ => self.client_anchor.or(self.child_anchor),
        }
    }

    fn geometry(&self, rect: Rect, scheme: Option<&ColorScheme>) -> Geometry {
        let props = &self.props;
        let rotation = props
            .get(prop::ROTATION)
            .map(|v| f64::from(v as i32) / 65536.0)
            .unwrap_or(0.0);

        let fill = if props.enabled(prop::FILL_STYLE_BOOLEANS, FILLED_BIT, prop::FILL_COLOR) {
            resolve_color_ref(
                props.get(prop::FILL_COLOR).unwrap_or(DEFAULT_FILL_COLOR),
                scheme,
            )
        } else {
            None
        };

        let border = props
            .enabled(prop::LINE_STYLE_BOOLEANS, LINE_BIT, prop::LINE_COLOR)
            .then(|| Border {
                color: resolve_color_ref(
                    props.get(prop::LINE_COLOR).unwrap_or(DEFAULT_LINE_COLOR),
                    scheme,
                ),
                width: f64::from(props.get(prop::LINE_WIDTH).unwrap_or(DEFAULT_LINE_WIDTH))
                    / EMU_PER_POINT,
            });

        let shadow = (props.flag(prop::SHADOW_STYLE_BOOLEANS, SHADOW_BIT) == Some(true)).then(|| {
            let offset = |id| props.get(id).map(|v| v as i32).unwrap_or(DEFAULT_SHADOW_OFFSET);
            let (dx, dy) = (offset(prop::SHADOW_OFFSET_X), offset(prop::SHADOW_OFFSET_Y));
            Shadow {
                color: resolve_color_ref(
                    props.get(prop::SHADOW_COLOR).unwrap_or(DEFAULT_SHADOW_COLOR),
                    scheme,
                ),
                offset_x: dx,
                offset_y: dy,
                distance: f64::from(dx).hypot(f64::from(dy)) / EMU_PER_POINT,
                direction: shadow_direction(dx, dy),
            }
        });

        Geometry {
            x: rect.left,
            y: rect.top,
            width: rect.width(),
            height: rect.height(),
            rotation,
            flip_h: self.shape.flags & FSP_FLIP_H != 0,
            flip_v: self.shape.flags & FSP_FLIP_V != 0,
            border,
            shadow,
            fill,
        }
    }

    fn is_line(&self) -> bool {
        self.shape.shape_type == SHAPE_TYPE_LINE
            || self.props.get(prop::SHAPE_PATH) == Some(SHAPE_PATH_LINES)
    }
}

/// PowerPoint's 8-byte client anchor: top, left, right, bottom.
fn read_client_anchor(cursor: &ByteCursor, anchor: &RecordHeader) -> Result<Rect> {
    match anchor.length {
        CLIENT_ANCHOR_LEN => {
            let at = anchor.payload_offset();
            Ok(Rect {
                top: i32::from(cursor.i16(at)?),
                left: i32::from(cursor.i16(at + 2)?),
                right: i32::from(cursor.i16(at + 4)?),
                bottom: i32::from(cursor.i16(at + 6)?),
            })
        }
        CLIENT_ANCHOR_LARGE_LEN => Err(Violation::UnsupportedAnchor(anchor.length).into()),
        _ => Err(anchor.bad_length(format!("0x{:X}", CLIENT_ANCHOR_LEN))),
    }
}

/// Shadow direction in degrees, clockwise from the positive x axis.
///
/// Only resolved when the pixel offsets have equal magnitude.
pub fn shadow_direction(offset_x: i32, offset_y: i32) -> Option<f64> {
    let (px, py) = (offset_x / EMU_PER_PIXEL, offset_y / EMU_PER_PIXEL);
    if px == 0 || px.abs() != py.abs() {
        return None;
    }
    Some(match (px > 0, py > 0) {
        (true, true) => 45.0,
        (false, true) => 135.0,
        (false, false) => 225.0,
        (true, false) => 315.0,
    })
}

/// Decode a Drawing record into the shapes of its top-level group.
pub fn decode_drawing(
    data: &[u8],
    drawing: &RecordHeader,
    ctx: &DrawingContext,
    ids: &mut ShapeIds,
) -> Result<Vec<Shape>> {
    let dg = expect_record(data, drawing.payload_offset(), drawing.end(), OFFICE_ART_DG_CONTAINER)?;
    let bound = dg.end();
    let mut pos = dg.payload_offset();

    let fdg = expect_record(data, pos, bound, OFFICE_ART_FDG)?;
    pos = fdg.end();
    if let Some(rules) = peek_record(data, pos, bound, OFFICE_ART_FRIT_CONTAINER)? {
        pos = rules.end();
    }
    let root = expect_record(data, pos, bound, OFFICE_ART_SPGR_CONTAINER)?;
    pos = root.end();

    let shapes = decode_group(data, &root, ctx, ids)?;

    for rest in Records::new(data, pos, bound) {
        skip_unknown(&rest?, "drawing");
    }
    Ok(shapes)
}

/// One SpgrContainer being decoded.
struct GroupLevel<'d> {
    children: Records<'d>,
    /// Frame of the enclosing group, for this group's own anchor.
    parent: Option<GroupFrame>,
    own: Option<(GroupFrame, SpParts)>,
    first_child: bool,
    /// Shape id of a nested group; the top-level group has none.
    id: Option<u32>,
    shapes: Vec<Shape>,
}

impl<'d> GroupLevel<'d> {
    fn new(data: &'d [u8], group: &RecordHeader, parent: Option<GroupFrame>, id: Option<u32>) -> Self {
        Self {
            children: group.children(data),
            parent,
            own: None,
            first_child: true,
            id,
            shapes: Vec::new(),
        }
    }

    fn frame(&self) -> Option<GroupFrame> {
        self.own.as_ref().map(|(frame, _)| *frame)
    }
}

/// Decode an SpgrContainer and every group nested in it.
///
/// Nested groups are decoded on an explicit stack of levels. Each nested
/// group takes its id before its members and is emitted as a
/// `ShapeKind::Group` once its children are exhausted.
fn decode_group(
    data: &[u8],
    group: &RecordHeader,
    ctx: &DrawingContext,
    ids: &mut ShapeIds,
) -> Result<Vec<Shape>> {
    let mut stack = vec![GroupLevel::new(data, group, None, None)];

    while let Some(level) = stack.last_mut() {
        let Some(child) = level.children.next() else {
            let Some(done) = stack.pop() else { break };
            let geometry = done
                .own
                .map(|(frame, parts)| parts.geometry(frame.bounds, ctx.text.scheme))
                .unwrap_or_default();
            match (stack.last_mut(), done.id) {
                (Some(parent), Some(id)) => parent.shapes.push(Shape {
                    id,
                    geometry,
                    kind: ShapeKind::Group(Group {
                        shapes: done.shapes,
                    }),
                }),
                _ => return Ok(done.shapes),
            }
            continue;
        };

        let child = child?;
        match child.rec_type {
            OFFICE_ART_SP_CONTAINER if level.first_child => {
                level.first_child = false;
                let parts = SpParts::read(data, &child)?;
                level.own = parts.anchor_in(level.parent.as_ref()).map(|bounds| {
                    let frame = GroupFrame {
                        space: parts.group_space.unwrap_or(bounds),
                        bounds,
                    };
                    (frame, parts)
                });
            }
            OFFICE_ART_SP_CONTAINER => {
                let frame = level.frame();
                if let Some(shape) = decode_shape(data, &child, frame.as_ref(), ctx, ids)? {
                    level.shapes.push(shape);
                }
            }
            OFFICE_ART_SPGR_CONTAINER => {
                level.first_child = false;
                let frame = level.frame();
                let id = ids.next_id();
                stack.push(GroupLevel::new(data, &child, frame, Some(id)));
            }
            _ => skip_unknown(&child, "group"),
        }
    }

    Ok(Vec::new())
}

/// Classify one SpContainer: picture, then line, then text.
fn decode_shape(
    data: &[u8],
    container: &RecordHeader,
    parent: Option<&GroupFrame>,
    ctx: &DrawingContext,
    ids: &mut ShapeIds,
) -> Result<Option<Shape>> {
    let parts = SpParts::read(data, container)?;
    if parts.shape.flags & FSP_DELETED != 0 {
        return Ok(None);
    }

    let kind = if let Some(pib) = parts.props.get(prop::PIB) {
        let Some(blips) = ctx.blips else {
            log::trace!("Skipping picture shape {}: pictures disabled", parts.shape.spid);
            return Ok(None);
        };
        match blips.get(pib) {
            Some(blip) => ShapeKind::Picture(Picture {
                blip_index: pib,
                format: blip.format,
                byte_len: blip.data.len(),
                data: blip.data.clone(),
            }),
            None => {
                log::warn!(
                    "Shape {} refers to picture {} but only {} were decoded",
                    parts.shape.spid,
                    pib,
                    blips.len()
                );
                return Ok(None);
            }
        }
    } else if parts.is_line() {
        ShapeKind::Line(Line {
            color: resolve_color_ref(
                parts.props.get(prop::LINE_COLOR).unwrap_or(DEFAULT_LINE_COLOR),
                ctx.text.scheme,
            ),
        })
    } else if let Some(textbox) = parts.textbox {
        let paragraphs = decode_textbox(data, &textbox, ctx)?;
        if paragraphs.is_empty() {
            return Ok(None);
        }
        ShapeKind::RichText(RichText { paragraphs })
    } else {
        return Ok(None);
    };

    let rect = parts.anchor_in(parent).unwrap_or_default();
    Ok(Some(Shape {
        id: ids.next_id(),
        geometry: parts.geometry(rect, ctx.text.scheme),
        kind,
    }))
}

/// Paragraphs of every non-empty text block in a client textbox.
fn decode_textbox(
    data: &[u8],
    textbox: &RecordHeader,
    ctx: &DrawingContext,
) -> Result<Vec<Paragraph>> {
    let cursor = ByteCursor::new(data);
    let bound = textbox.end();
    let mut pos = textbox.payload_offset();
    let mut paragraphs = Vec::new();

    while pos < bound {
        if let Some(outline_ref) = peek_record(data, pos, bound, RT_OUTLINE_TEXT_REF_ATOM)? {
            outline_ref.expect_length(4)?;
            let index = cursor.u32(outline_ref.payload_offset())? as usize;
            match ctx.outline.get(index) {
                Some(block) if !block.is_empty() => {
                    paragraphs.extend(block.paragraphs(&ctx.text));
                }
                Some(_) => {}
                None => log::warn!("Outline text reference {} has no text block", index),
            }
            pos = outline_ref.end();
            continue;
        }

        match read_text_block(data, pos, bound)? {
            Some((block, next)) => {
                if !block.is_empty() {
                    paragraphs.extend(block.paragraphs(&ctx.text));
                }
                pos = next;
            }
            None => {
                let skipped = read_bounded(data, pos, bound)?;
                skip_unknown(&skipped, "client textbox");
                pos = skipped.end();
            }
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::*;
    use crate::record::read_header;
    use ppt97_core::{Color, Error, ImageFormat};

    fn shapes_of(group: Vec<u8>, ctx: &DrawingContext) -> Result<Vec<Shape>> {
        let header = read_header(&group, 0)?;
        let mut ids = ShapeIds::new();
        decode_group(&group, &header, ctx, &mut ids)
    }

    fn with_ctx<T>(blips: Option<&BlipStore>, f: impl FnOnce(&DrawingContext) -> T) -> T {
        let hyperlinks = HashMap::new();
        let ctx = DrawingContext {
            text: TextContext {
                fonts: &[],
                hyperlinks: &hyperlinks,
                scheme: None,
            },
            blips,
            outline: &[],
        };
        f(&ctx)
    }

    fn plain_shape(shape_type: u16, props: &[(u16, u32)]) -> Vec<u8> {
        sp_container(&[
            fsp(shape_type, 0x401, FSP_HAVE_ANCHOR),
            fopt(props),
            client_anchor(10, 20, 120, 60),
        ])
    }

    #[test]
    fn test_first_container_is_group_anchor() {
        let group = spgr_container(&[
            patriarch_anchor(),
            text_box(0x401, (0, 0, 100, 50), "one"),
            text_box(0x402, (50, 0, 100, 100), "two"),
        ]);
        let shapes = with_ctx(None, |ctx| shapes_of(group, ctx)).unwrap();

        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].id, 1);
        assert_eq!(shapes[1].id, 2);
        match &shapes[1].kind {
            ShapeKind::RichText(text) => assert_eq!(text.text(), "two"),
            other => panic!("expected text, got {:?}", other),
        }
        assert_eq!(shapes[1].geometry.y, 50);
        assert_eq!(shapes[1].geometry.height, 50);
    }

    #[test]
    fn test_nested_group_maps_child_anchors() {
        let member = sp_container(&[
            fsp(202, 0x403, FSP_CHILD | FSP_HAVE_ANCHOR),
            child_anchor(0, 0, 50, 50),
            client_textbox(&[text_header(4), text_bytes("inner")]),
        ]);
        let nested = spgr_container(&[
            group_anchor((0, 0, 100, 100), client_anchor(10, 20, 220, 110)),
            member,
        ]);
        let group = spgr_container(&[patriarch_anchor(), nested]);
        let shapes = with_ctx(None, |ctx| shapes_of(group, ctx)).unwrap();

        assert_eq!(shapes.len(), 1);
        let outer = &shapes[0];
        assert_eq!(
            (outer.geometry.x, outer.geometry.y, outer.geometry.width, outer.geometry.height),
            (20, 10, 200, 100)
        );
        let ShapeKind::Group(group) = &outer.kind else {
            panic!("expected group, got {:?}", outer.kind);
        };
        assert_eq!(group.shapes.len(), 1);
        let inner = &group.shapes[0].geometry;
        assert_eq!((inner.x, inner.y, inner.width, inner.height), (20, 10, 100, 50));
        assert_eq!(group.shapes[0].id, 2);
    }

    #[test]
    fn test_deeply_nested_groups() {
        let depth = 10_000;
        let anchor = patriarch_anchor();
        let mut group = Vec::with_capacity(depth * 8 + anchor.len());
        for level in 0..depth {
            let length = anchor.len() + 8 * (depth - 1 - level);
            group.extend_from_slice(&0x000F_u16.to_le_bytes());
            group.extend_from_slice(&OFFICE_ART_SPGR_CONTAINER.to_le_bytes());
            group.extend_from_slice(&(length as u32).to_le_bytes());
        }
        group.extend(anchor);

        let shapes = with_ctx(None, |ctx| shapes_of(group, ctx)).unwrap();

        let mut nested = 0;
        let mut members = &shapes;
        while let Some(Shape {
            id,
            kind: ShapeKind::Group(inner),
            ..
        }) = members.first()
        {
            nested += 1;
            assert_eq!(*id, nested as u32);
            members = &inner.shapes;
        }
        assert_eq!(nested, depth - 1);
        assert!(members.is_empty());
    }

    #[test]
    fn test_picture_resolves_one_based() {
        let mut jpeg = vec![0u8; 17];
        jpeg.extend_from_slice(b"jpg");
        let mut stream = record(0, 0x6E0, OFFICE_ART_BLIP_PNG, &[0u8; 17]);
        stream.extend(record(0, 0x46A, OFFICE_ART_BLIP_JPEG, &jpeg));
        let store = BlipStore::decode(&stream).unwrap();

        let group = spgr_container(&[patriarch_anchor(), plain_shape(75, &[(0x4104, 2)])]);
        let shapes = with_ctx(Some(&store), |ctx| shapes_of(group, ctx)).unwrap();
        match &shapes[0].kind {
            ShapeKind::Picture(picture) => {
                assert_eq!(picture.blip_index, 2);
                assert_eq!(picture.format, ImageFormat::Jpeg);
                assert_eq!(picture.data, b"jpg");
                assert_eq!(picture.byte_len, 3);
            }
            other => panic!("expected picture, got {:?}", other),
        }
    }

    #[test]
    fn test_unresolvable_picture_emits_nothing() {
        let store = BlipStore::default();
        let group = spgr_container(&[patriarch_anchor(), plain_shape(75, &[(0x4104, 1)])]);
        let with_store = with_ctx(Some(&store), |ctx| shapes_of(group.clone(), ctx)).unwrap();
        assert!(with_store.is_empty());
        let disabled = with_ctx(None, |ctx| shapes_of(group, ctx)).unwrap();
        assert!(disabled.is_empty());
    }

    #[test]
    fn test_line_classification() {
        let group = spgr_container(&[
            patriarch_anchor(),
            plain_shape(SHAPE_TYPE_LINE, &[(prop::LINE_COLOR, 0x0000_00FF)]),
            plain_shape(1, &[(prop::SHAPE_PATH, SHAPE_PATH_LINES)]),
            plain_shape(1, &[]),
        ]);
        let shapes = with_ctx(None, |ctx| shapes_of(group, ctx)).unwrap();
        assert_eq!(shapes.len(), 2);
        match &shapes[0].kind {
            ShapeKind::Line(line) => assert_eq!(line.color, Some(Color::new(0xFF, 0, 0))),
            other => panic!("expected line, got {:?}", other),
        }
        assert!(matches!(shapes[1].kind, ShapeKind::Line(_)));
    }

    #[test]
    fn test_rotation_flips_and_styles() {
        let container = sp_container(&[
            fsp(SHAPE_TYPE_LINE, 0x401, FSP_HAVE_ANCHOR | FSP_FLIP_H),
            fopt(&[
                (prop::ROTATION, 90 << 16),
                (prop::FILL_COLOR, 0x0000_FF00),
                (prop::LINE_COLOR, 0x0000_0000),
                (prop::LINE_WIDTH, 25400),
                (prop::SHADOW_OFFSET_X, 38100),
                (prop::SHADOW_OFFSET_Y, 38100),
                (prop::SHADOW_STYLE_BOOLEANS, (1 << 17) | (1 << 1)),
            ]),
            client_anchor(0, 0, 10, 10),
        ]);
        let group = spgr_container(&[patriarch_anchor(), container]);
        let shapes = with_ctx(None, |ctx| shapes_of(group, ctx)).unwrap();
        let geometry = &shapes[0].geometry;

        assert_eq!(geometry.rotation, 90.0);
        assert!(geometry.flip_h);
        assert!(!geometry.flip_v);
        assert_eq!(geometry.fill, Some(Color::new(0, 0xFF, 0)));
        let border = geometry.border.as_ref().unwrap();
        assert_eq!(border.color, Some(Color::new(0, 0, 0)));
        assert_eq!(border.width, 2.0);
        let shadow = geometry.shadow.as_ref().unwrap();
        assert_eq!(shadow.direction, Some(45.0));
        assert!((shadow.distance - 4.2426).abs() < 1e-3);
    }

    #[test]
    fn test_style_booleans_override_colors() {
        let group = spgr_container(&[
            patriarch_anchor(),
            plain_shape(
                SHAPE_TYPE_LINE,
                &[
                    (prop::FILL_COLOR, 0x0000_FF00),
                    (prop::FILL_STYLE_BOOLEANS, 1 << 20),
                    (prop::LINE_STYLE_BOOLEANS, (1 << 19) | (1 << 3)),
                    (prop::SHADOW_COLOR, 0),
                ],
            ),
        ]);
        let shapes = with_ctx(None, |ctx| shapes_of(group, ctx)).unwrap();
        let geometry = &shapes[0].geometry;
        assert_eq!(geometry.fill, None);
        let border = geometry.border.as_ref().unwrap();
        assert_eq!(border.color, Some(Color::new(0, 0, 0)));
        assert_eq!(border.width, 0.75);
        // A shadow color alone does not turn the shadow on.
        assert!(geometry.shadow.is_none());
    }

    #[test]
    fn test_shadow_direction_quadrants() {
        let px = EMU_PER_PIXEL * 3;
        assert_eq!(shadow_direction(px, px), Some(45.0));
        assert_eq!(shadow_direction(-px, px), Some(135.0));
        assert_eq!(shadow_direction(-px, -px), Some(225.0));
        assert_eq!(shadow_direction(px, -px), Some(315.0));
        assert_eq!(shadow_direction(px, 2 * px), None);
        assert_eq!(shadow_direction(0, 0), None);
    }

    #[test]
    fn test_scheme_colors_need_scheme() {
        let mut colors = [Color::new(0, 0, 0); 8];
        colors[4] = Color::new(1, 2, 3);
        let scheme = ColorScheme::new(colors);
        let hyperlinks = HashMap::new();
        let ctx = DrawingContext {
            text: TextContext {
                fonts: &[],
                hyperlinks: &hyperlinks,
                scheme: Some(&scheme),
            },
            blips: None,
            outline: &[],
        };
        let group = spgr_container(&[
            patriarch_anchor(),
            plain_shape(SHAPE_TYPE_LINE, &[(prop::FILL_COLOR, 0x0800_0004)]),
        ]);
        let with_scheme = shapes_of(group.clone(), &ctx).unwrap();
        assert_eq!(with_scheme[0].geometry.fill, Some(Color::new(1, 2, 3)));

        let without = with_ctx(None, |ctx| shapes_of(group, ctx)).unwrap();
        assert_eq!(without[0].geometry.fill, None);
    }

    #[test]
    fn test_large_client_anchor_is_unsupported() {
        let container = sp_container(&[
            fsp(SHAPE_TYPE_LINE, 0x401, FSP_HAVE_ANCHOR),
            atom(OFFICE_ART_CLIENT_ANCHOR, &[0u8; 16]),
        ]);
        let group = spgr_container(&[patriarch_anchor(), container]);
        let err = with_ctx(None, |ctx| shapes_of(group, ctx)).unwrap_err();
        assert!(matches!(
            err,
            Error::StructuralViolation(Violation::UnsupportedAnchor(16))
        ));
    }

    #[test]
    fn test_missing_fsp_is_fatal() {
        let container = sp_container(&[fopt(&[]), client_anchor(0, 0, 1, 1)]);
        let group = spgr_container(&[patriarch_anchor(), container]);
        let err = with_ctx(None, |ctx| shapes_of(group, ctx)).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_unknown_records_in_containers_are_skipped() {
        let container = sp_container(&[
            fsp(202, 0x401, FSP_HAVE_ANCHOR),
            client_anchor(0, 0, 10, 10),
            client_textbox(&[
                atom(0x0FA6, &[0u8; 10]),
                text_header(4),
                text_bytes("kept"),
            ]),
            atom(0xF122 + 100, &[1, 2, 3]),
        ]);
        let group = spgr_container(&[patriarch_anchor(), atom(0x1234, &[0; 4]), container]);
        let shapes = with_ctx(None, |ctx| shapes_of(group, ctx)).unwrap();
        assert_eq!(shapes.len(), 1);
        match &shapes[0].kind {
            ShapeKind::RichText(text) => assert_eq!(text.text(), "kept"),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_outline_reference_uses_slide_blocks() {
        let outline_data = [text_header(0), text_bytes("Title")].concat();
        let (block, _) = read_text_block(&outline_data, 0, outline_data.len())
            .unwrap()
            .unwrap();
        let outline = vec![block];
        let hyperlinks = HashMap::new();
        let ctx = DrawingContext {
            text: TextContext {
                fonts: &[],
                hyperlinks: &hyperlinks,
                scheme: None,
            },
            blips: None,
            outline: &outline,
        };

        let container = sp_container(&[
            fsp(1, 0x401, FSP_HAVE_ANCHOR),
            client_anchor(0, 0, 10, 10),
            client_textbox(&[atom(RT_OUTLINE_TEXT_REF_ATOM, &0u32.to_le_bytes())]),
        ]);
        let group = spgr_container(&[patriarch_anchor(), container]);
        let shapes = shapes_of(group, &ctx).unwrap();
        match &shapes[0].kind {
            ShapeKind::RichText(text) => assert_eq!(text.text(), "Title"),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_textbox_emits_nothing() {
        let container = sp_container(&[
            fsp(202, 0x401, FSP_HAVE_ANCHOR),
            client_anchor(0, 0, 10, 10),
            client_textbox(&[text_header(4)]),
        ]);
        let group = spgr_container(&[patriarch_anchor(), container]);
        let shapes = with_ctx(None, |ctx| shapes_of(group, ctx)).unwrap();
        assert!(shapes.is_empty());
    }

    #[test]
    fn test_decode_drawing_path() {
        let data = drawing(&[text_box(0x401, (0, 0, 10, 10), "Hi")]);
        let header = read_header(&data, 0).unwrap();
        let mut ids = ShapeIds::new();
        let shapes = with_ctx(None, |ctx| decode_drawing(&data, &header, ctx, &mut ids)).unwrap();
        assert_eq!(shapes.len(), 1);
    }
}
