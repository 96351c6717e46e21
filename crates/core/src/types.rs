//! Domain types for representing a decoded presentation.
//!
//! Coordinates are in master units (1/576 inch) as stored in the file;
//! line widths and shadow distances are in points.

use serde::{Deserialize, Serialize};

/// A width/height pair in master units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

/// Represents an entire presentation with its decoded content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Presentation {
    /// Slide size from the DocumentAtom, if the document carried one.
    pub slide_size: Option<Size>,

    /// Notes page size from the DocumentAtom.
    pub notes_size: Option<Size>,

    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

impl Presentation {
    /// Create an empty presentation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slide to the presentation.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    /// Get all paragraph text from all slides, flattened, in shape order.
    pub fn all_lines(&self) -> Vec<String> {
        self.slides.iter().flat_map(|s| s.text_lines()).collect()
    }
}

/// A single decoded slide.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Slide {
    /// 1-based slide number.
    pub number: usize,

    /// The slide id from the slide list, when the document provided one.
    pub slide_id: Option<u32>,

    /// Shapes in drawing order.
    pub shapes: Vec<Shape>,

    /// The notes page attached to this slide.
    pub notes: Option<NotesPage>,
}

impl Slide {
    /// Create a new slide with the given number.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    /// Add a shape to this slide.
    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Paragraph text of every rich-text shape on the slide, groups included.
    pub fn text_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for shape in &self.shapes {
            shape.collect_text(&mut lines);
        }
        lines
    }
}

/// A notes page and its shapes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotesPage {
    pub shapes: Vec<Shape>,
}

impl NotesPage {
    pub fn text_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for shape in &self.shapes {
            shape.collect_text(&mut lines);
        }
        lines
    }
}

/// One emitted shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    /// Identifier unique within one loaded presentation.
    pub id: u32,

    pub geometry: Geometry,

    pub kind: ShapeKind,
}

impl Shape {
    fn collect_text(&self, lines: &mut Vec<String>) {
        let mut pending = vec![self];
        while let Some(shape) = pending.pop() {
            match &shape.kind {
                ShapeKind::RichText(text) => {
                    lines.extend(text.paragraphs.iter().map(Paragraph::text));
                }
                ShapeKind::Group(group) => pending.extend(group.shapes.iter().rev()),
                ShapeKind::Picture(_) | ShapeKind::Line(_) => {}
            }
        }
    }
}

/// What a shape renders as.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeKind {
    Picture(Picture),
    Line(Line),
    RichText(RichText),
    Group(Group),
}

/// Position, size and visual decoration of a shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,

    /// Clockwise rotation in degrees.
    pub rotation: f64,

    pub flip_h: bool,
    pub flip_v: bool,

    pub border: Option<Border>,
    pub shadow: Option<Shadow>,
    pub fill: Option<Color>,
}

/// Shape outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Border {
    /// `None` when the color refers to a scheme the slide does not define.
    pub color: Option<Color>,
    /// Width in points.
    pub width: f64,
}

/// Drop shadow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: Option<Color>,

    /// Offsets in EMUs as stored in the file.
    pub offset_x: i32,
    pub offset_y: i32,

    /// Distance between shape and shadow, in points.
    pub distance: f64,

    /// Direction in degrees clockwise from the positive x axis.
    ///
    /// Only resolved when the horizontal and vertical pixel offsets have the
    /// same magnitude, which snaps it to one of the four diagonals.
    pub direction: Option<f64>,
}

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The color packed as `0xRRGGBB`.
    pub fn to_rgb(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }

    /// Uppercase hex form, e.g. `FF8000`.
    pub fn to_hex(self) -> String {
        format!("{:06X}", self.to_rgb())
    }
}

/// Encoding of an embedded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

/// A picture shape and its image bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Picture {
    /// 1-based index into the Pictures stream.
    pub blip_index: u32,

    pub format: ImageFormat,

    /// Size of the image bytes, kept in serialized output.
    pub byte_len: usize,

    /// Raw image bytes; not serialized.
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// A straight line shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub color: Option<Color>,
}

/// A text-bearing shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    pub paragraphs: Vec<Paragraph>,
}

impl RichText {
    /// All paragraphs joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Members of a group, positioned in slide coordinates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Group {
    pub shapes: Vec<Shape>,
}

// Nested groups are unlinked one level at a time so dropping a deep tree
// does not recurse once per level.
impl Drop for Group {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.shapes);
        while let Some(mut shape) = pending.pop() {
            if let ShapeKind::Group(group) = &mut shape.kind {
                pending.append(&mut group.shapes);
            }
        }
    }
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
    Distributed,
    ThaiDistributed,
    JustifyLow,
}

impl Alignment {
    /// Map a TextPFException alignment value. Unknown values fall back to left.
    pub fn from_raw(value: u16) -> Self {
        match value {
            1 => Alignment::Center,
            2 => Alignment::Right,
            3 => Alignment::Justify,
            4 => Alignment::Distributed,
            5 => Alignment::ThaiDistributed,
            6 => Alignment::JustifyLow,
            _ => Alignment::Left,
        }
    }
}

/// Paragraph bullet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Bullet {
    #[default]
    None,
    Char {
        character: char,
        font_name: Option<String>,
        color: Option<Color>,
    },
}

/// A paragraph of styled runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub alignment: Alignment,
    pub bullet: Bullet,

    /// Outline indent level, 0-based.
    pub level: u16,

    /// Left margin in master units, when the paragraph overrides it.
    pub left_margin: Option<i16>,

    /// First-line indent in master units, when the paragraph overrides it.
    pub indent: Option<i16>,

    pub runs: Vec<TextRun>,
}

impl Paragraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A run of uniformly formatted text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub font_name: Option<String>,

    /// Font size in points.
    pub size: Option<u16>,

    pub color: Option<Color>,

    /// Target of a hyperlink covering exactly this run.
    pub hyperlink: Option<String>,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}
