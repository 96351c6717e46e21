//! Error types for PowerPoint 97 decoding.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// OLE/CFB container error.
    #[error("OLE/CFB error: {0}")]
    CfbError(String),

    /// A stream the decoder cannot work without is absent from the container.
    #[error("Missing mandatory stream: {0}")]
    MissingStream(String),

    /// A fixed-size read ran past the end of its buffer.
    #[error("Truncated data at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Fewer than 8 bytes remain where a record header is required.
    #[error("Truncated record header at offset {offset} ({available} bytes available)")]
    TruncatedHeader { offset: usize, available: usize },

    /// The stream does not follow the record grammar. Always fatal.
    #[error("Structural violation: {0}")]
    StructuralViolation(#[from] Violation),
}

impl Error {
    /// Whether this error is a grammar violation rather than an I/O or container failure.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::StructuralViolation(_) | Error::TruncatedHeader { .. } | Error::Truncated { .. }
        )
    }
}

/// The kind of structural violation that aborted a decode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A mandatory record had the wrong type.
    #[error("expected record 0x{expected:04X} at offset {offset}, found 0x{found:04X}")]
    UnexpectedRecord {
        offset: usize,
        expected: u16,
        found: u16,
    },

    /// A fixed-size record declared an unexpected length.
    #[error("record 0x{rec_type:04X} at offset {offset} has length {found}, expected {expected}")]
    BadLength {
        offset: usize,
        rec_type: u16,
        expected: String,
        found: u32,
    },

    #[error("record 0x{rec_type:04X} at offset {offset} has version 0x{found:X}, expected 0x{expected:X}")]
    BadVersion {
        offset: usize,
        rec_type: u16,
        expected: u8,
        found: u8,
    },

    #[error("record 0x{rec_type:04X} at offset {offset} has instance 0x{found:03X}, expected 0x{expected:03X}")]
    BadInstance {
        offset: usize,
        rec_type: u16,
        expected: u16,
        found: u16,
    },

    /// A child record extends past the end of its parent.
    #[error("record 0x{rec_type:04X} at offset {offset} overruns its container (ends at {end}, bound {bound})")]
    Overrun {
        offset: usize,
        rec_type: u16,
        end: usize,
        bound: usize,
    },

    /// The Current User stream carries the encrypted-document token.
    #[error("document is encrypted (header token 0x{0:08X})")]
    Encrypted(u32),

    #[error("unrecognized Current User header token 0x{0:08X}")]
    BadHeaderToken(u32),

    #[error("CurrentUserAtom size is 0x{0:X}, expected 0x14")]
    BadCurrentUserSize(u32),

    #[error("UserEditAtom docPersistIdRef is {0}, expected 1")]
    BadDocPersistIdRef(u32),

    /// Following `offsetLastEdit` revisited an edit already seen.
    #[error("user edit chain loops back to offset {0}")]
    EditChainCycle(usize),

    /// A persist id the document depends on has no directory entry.
    #[error("persist object {0} is not in the persist directory")]
    MissingPersistObject(u32),

    /// A Pictures stream entry is not a JPEG or PNG blip.
    #[error("unsupported blip type 0x{rec_type:04X} at offset {offset}")]
    UnsupportedBlip { offset: usize, rec_type: u16 },

    /// A client anchor uses the 16-byte rectangle form.
    #[error("unsupported client anchor of {0} bytes")]
    UnsupportedAnchor(u32),
}
