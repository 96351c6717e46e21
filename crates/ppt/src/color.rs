//! Slide color schemes and the two color encodings that refer to them.

use crate::cursor::ByteCursor;
use ppt97_core::{Color, Result};

/// `ColorIndexStruct.index` value meaning "use the literal RGB".
const LITERAL_RGB_INDEX: u8 = 0xFE;

// OfficeArtCOLORREF flag byte
const COLORREF_SCHEME_INDEX: u8 = 0x08;
const COLORREF_SYS_INDEX: u8 = 0x10;

/// The eight colors of a SlideSchemeColorSchemeAtom.
///
/// Index order: background, text, shadow, title text, fill, accent,
/// accent+hyperlink, accent+followed hyperlink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    colors: [Color; 8],
}

impl ColorScheme {
    pub fn new(colors: [Color; 8]) -> Self {
        Self { colors }
    }

    pub fn parse(payload: &[u8]) -> Result<Self> {
        let cursor = ByteCursor::new(payload);
        let mut colors = [Color::new(0, 0, 0); 8];
        for (i, color) in colors.iter_mut().enumerate() {
            let rgb = cursor.bytes(i * 4, 4)?;
            *color = Color::new(rgb[0], rgb[1], rgb[2]);
        }
        Ok(Self { colors })
    }

    pub fn get(&self, index: u8) -> Option<Color> {
        self.colors.get(index as usize).copied()
    }
}

/// A text color: either literal RGB or an index into the slide scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorIndex {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub index: u8,
}

impl ColorIndex {
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            red: bytes[0],
            green: bytes[1],
            blue: bytes[2],
            index: bytes[3],
        }
    }

    pub fn resolve(self, scheme: Option<&ColorScheme>) -> Option<Color> {
        if self.index == LITERAL_RGB_INDEX {
            Some(Color::new(self.red, self.green, self.blue))
        } else {
            scheme.and_then(|s| s.get(self.index))
        }
    }
}

/// Resolve an OfficeArtCOLORREF property value.
///
/// Scheme references need the slide scheme; system colors are never resolved.
pub fn resolve_color_ref(value: u32, scheme: Option<&ColorScheme>) -> Option<Color> {
    let [r, g, b, flags] = value.to_le_bytes();
    if flags & COLORREF_SCHEME_INDEX != 0 {
        return scheme.and_then(|s| s.get(r));
    }
    if flags & COLORREF_SYS_INDEX != 0 {
        return None;
    }
    Some(Color::new(r, g, b))
}
