//! Record headers and bounded traversal of record sequences.
//!
//! Every record starts with an 8-byte header:
//! - 2 bytes: recVer (low 4 bits) + recInstance (high 12 bits)
//! - 2 bytes: recType
//! - 4 bytes: recLen
//!
//! A record whose type the decoder does not handle is skipped by advancing
//! exactly `8 + recLen` bytes, which lands on the next sibling header.

use crate::cursor::ByteCursor;
use crate::record_types::record_name;
use ppt97_core::{Error, Result, Violation};

/// Size of a record header in bytes.
pub const HEADER_LEN: usize = 8;

/// A decoded record header positioned in its stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub version: u8,
    pub instance: u16,
    pub rec_type: u16,
    pub length: u32,
    /// Absolute offset of the header itself.
    pub offset: usize,
}

impl RecordHeader {
    /// Absolute offset of the first payload byte.
    pub fn payload_offset(&self) -> usize {
        self.offset.saturating_add(HEADER_LEN)
    }

    /// Absolute offset one past the last payload byte (the next sibling header).
    pub fn end(&self) -> usize {
        self.payload_offset().saturating_add(self.length as usize)
    }

    pub fn name(&self) -> &'static str {
        record_name(self.rec_type)
    }

    /// Borrow the payload bytes.
    pub fn payload<'a>(&self, data: &'a [u8]) -> Result<&'a [u8]> {
        ByteCursor::new(data).bytes(self.payload_offset(), self.length as usize)
    }

    /// Children of a container record.
    pub fn children<'a>(&self, data: &'a [u8]) -> Records<'a> {
        Records::new(data, self.payload_offset(), self.end())
    }

    pub fn expect_version(&self, expected: u8) -> Result<()> {
        if self.version != expected {
            return Err(Violation::BadVersion {
                offset: self.offset,
                rec_type: self.rec_type,
                expected,
                found: self.version,
            }
            .into());
        }
        Ok(())
    }

    pub fn expect_instance(&self, expected: u16) -> Result<()> {
        if self.instance != expected {
            return Err(Violation::BadInstance {
                offset: self.offset,
                rec_type: self.rec_type,
                expected,
                found: self.instance,
            }
            .into());
        }
        Ok(())
    }

    pub fn expect_length(&self, expected: u32) -> Result<()> {
        if self.length != expected {
            return Err(self.bad_length(format!("0x{:X}", expected)));
        }
        Ok(())
    }

    /// Check the payload is at least `min` bytes long.
    pub fn expect_min_length(&self, min: u32) -> Result<()> {
        if self.length < min {
            return Err(self.bad_length(format!(">= 0x{:X}", min)));
        }
        Ok(())
    }

    pub(crate) fn bad_length(&self, expected: String) -> Error {
        Violation::BadLength {
            offset: self.offset,
            rec_type: self.rec_type,
            expected,
            found: self.length,
        }
        .into()
    }
}

/// Decode the 8-byte record header at `offset`.
pub fn read_header(data: &[u8], offset: usize) -> Result<RecordHeader> {
    let available = data.len().saturating_sub(offset);
    if available < HEADER_LEN {
        return Err(Error::TruncatedHeader { offset, available });
    }

    let cursor = ByteCursor::new(data);
    let ver_instance = cursor.u16(offset)?;

    Ok(RecordHeader {
        version: (ver_instance & 0x000F) as u8,
        instance: ver_instance >> 4,
        rec_type: cursor.u16(offset + 2)?,
        length: cursor.u32(offset + 4)?,
        offset,
    })
}

/// Read a header that must lie entirely within `[offset, bound)`.
pub fn read_bounded(data: &[u8], offset: usize, bound: usize) -> Result<RecordHeader> {
    let bound = bound.min(data.len());
    let available = bound.saturating_sub(offset);
    if available < HEADER_LEN {
        return Err(Error::TruncatedHeader { offset, available });
    }

    let header = read_header(data, offset)?;
    if header.end() > bound {
        return Err(Violation::Overrun {
            offset,
            rec_type: header.rec_type,
            end: header.end(),
            bound,
        }
        .into());
    }
    Ok(header)
}

/// Read the mandatory record of type `rec_type` at `offset`.
pub fn expect_record(
    data: &[u8],
    offset: usize,
    bound: usize,
    rec_type: u16,
) -> Result<RecordHeader> {
    let header = read_bounded(data, offset, bound)?;
    if header.rec_type != rec_type {
        return Err(Violation::UnexpectedRecord {
            offset,
            expected: rec_type,
            found: header.rec_type,
        }
        .into());
    }
    Ok(header)
}

/// Probe for an optional record of type `rec_type` at `offset`.
///
/// A different type, or no room left for a header, means the record is
/// absent. A matching record that overruns `bound` is still an error.
pub fn peek_record(
    data: &[u8],
    offset: usize,
    bound: usize,
    rec_type: u16,
) -> Result<Option<RecordHeader>> {
    let bound = bound.min(data.len());
    if bound.saturating_sub(offset) < HEADER_LEN {
        return Ok(None);
    }
    let header = read_header(data, offset)?;
    if header.rec_type != rec_type {
        return Ok(None);
    }
    read_bounded(data, offset, bound).map(Some)
}

/// Iterator over the sibling records tiling `[start, bound)`.
///
/// Yields each header and advances by `8 + recLen`. The first error ends
/// the iteration.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    data: &'a [u8],
    pos: usize,
    bound: usize,
}

impl<'a> Records<'a> {
    pub fn new(data: &'a [u8], start: usize, bound: usize) -> Self {
        Self {
            data,
            pos: start,
            bound,
        }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<RecordHeader>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.bound {
            return None;
        }

        match read_bounded(self.data, self.pos, self.bound) {
            Ok(header) => {
                self.pos = header.end();
                Some(Ok(header))
            }
            Err(e) => {
                self.pos = self.bound;
                Some(Err(e))
            }
        }
    }
}

/// Log a record the decoder is skipping.
pub(crate) fn skip_unknown(header: &RecordHeader, context: &str) {
    log::trace!(
        "{}: skipping {} (0x{:04X}) at offset {}, {} bytes",
        context,
        header.name(),
        header.rec_type,
        header.offset,
        header.length
    );
}
