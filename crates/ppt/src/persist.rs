//! Persist directory resolution.
//!
//! The Current User stream points at the most recent UserEditAtom in the
//! PowerPoint Document stream. Each UserEditAtom points at the persist
//! directory written by that edit and at the previous edit. Replaying the
//! directories oldest-first yields the latest byte offset of every persisted
//! object.
//!
//! Nothing here is tolerant: any mismatch aborts the load, because every
//! later offset depends on this map.

use crate::cursor::ByteCursor;
use crate::record::{expect_record, read_header, RecordHeader};
use crate::record_types::{RT_CURRENT_USER_ATOM, RT_PERSIST_DIRECTORY_ATOM, RT_USER_EDIT_ATOM};
use ppt97_core::{Error, Result, Violation};
use std::collections::{BTreeMap, HashSet};

/// Required value of `CurrentUserAtom.size`.
pub const CURRENT_USER_SIZE: u32 = 0x14;

/// Header token of an unencrypted document.
pub const HEADER_TOKEN: u32 = 0xE391_C05F;

/// Header token of an encrypted document.
pub const HEADER_TOKEN_ENCRYPTED: u32 = 0xF3D1_C4DF;

/// Lengths a UserEditAtom may declare (without and with `encryptSessionPersistIdRef`).
const USER_EDIT_LENGTHS: [u32; 2] = [0x1C, 0x20];

/// The persist id every UserEditAtom must name for the DocumentContainer.
pub const DOCUMENT_PERSIST_ID: u32 = 1;

/// The atom at the start of the Current User stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUserAtom {
    /// Offset of the current UserEditAtom in the PowerPoint Document stream.
    pub offset_to_current_edit: u32,
}

impl CurrentUserAtom {
    /// Parse the Current User stream.
    ///
    /// # Format
    ///
    /// - Bytes 0-7: record header (type 0x0FF6)
    /// - Bytes 8-11: size (must be 0x14)
    /// - Bytes 12-15: header token
    /// - Bytes 16-19: offset to current edit
    ///
    /// The version fields and user name that follow are not read.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = expect_record(data, 0, data.len(), RT_CURRENT_USER_ATOM)?;
        header.expect_version(0)?;
        header.expect_instance(0)?;
        let cursor = ByteCursor::new(data);
        let base = header.payload_offset();

        let size = cursor.u32(base)?;
        if size != CURRENT_USER_SIZE {
            return Err(Violation::BadCurrentUserSize(size).into());
        }

        match cursor.u32(base + 4)? {
            HEADER_TOKEN => {}
            HEADER_TOKEN_ENCRYPTED => return Err(Violation::Encrypted(HEADER_TOKEN_ENCRYPTED).into()),
            other => return Err(Violation::BadHeaderToken(other).into()),
        }

        Ok(Self {
            offset_to_current_edit: cursor.u32(base + 8)?,
        })
    }
}

/// One save of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserEditAtom {
    /// Offset of the previous UserEditAtom, or 0 for the first edit.
    pub offset_last_edit: u32,
    pub offset_persist_directory: u32,
    pub doc_persist_id_ref: u32,
}

impl UserEditAtom {
    pub fn parse(data: &[u8], offset: usize) -> Result<Self> {
        let header = expect_record(data, offset, data.len(), RT_USER_EDIT_ATOM)?;
        header.expect_version(0)?;
        header.expect_instance(0)?;
        if !USER_EDIT_LENGTHS.contains(&header.length) {
            return Err(header.bad_length("0x1C or 0x20".to_string()));
        }

        let cursor = ByteCursor::new(data);
        let base = header.payload_offset();

        let doc_persist_id_ref = cursor.u32(base + 16)?;
        if doc_persist_id_ref != DOCUMENT_PERSIST_ID {
            return Err(Violation::BadDocPersistIdRef(doc_persist_id_ref).into());
        }

        Ok(Self {
            offset_last_edit: cursor.u32(base + 8)?,
            offset_persist_directory: cursor.u32(base + 12)?,
            doc_persist_id_ref,
        })
    }
}

/// Consolidated mapping from persist ids to stream offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistDirectory {
    entries: BTreeMap<u32, u32>,
}

impl PersistDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the stream offset for a persist id.
    pub fn get(&self, persist_id: u32) -> Option<u32> {
        self.entries.get(&persist_id).copied()
    }

    /// Get the stream offset for a persist id the document cannot do without.
    pub fn require(&self, persist_id: u32) -> Result<usize> {
        self.get(persist_id)
            .map(|offset| offset as usize)
            .ok_or_else(|| Violation::MissingPersistObject(persist_id).into())
    }

    /// `(persist_id, offset)` pairs in ascending persist id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.entries.iter().map(|(&id, &offset)| (id, offset))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, persist_id: u32, offset: u32) {
        self.entries.insert(persist_id, offset);
    }

    /// Apply the PersistDirectoryAtom at `offset`.
    ///
    /// The payload is a sequence of fragments, each a packed
    /// `persistId (20 bits) | cPersist (12 bits)` followed by `cPersist`
    /// offsets. Fragments later in the atom overwrite earlier ones.
    pub fn apply_atom(&mut self, data: &[u8], offset: usize) -> Result<()> {
        let header = expect_record(data, offset, data.len(), RT_PERSIST_DIRECTORY_ATOM)?;
        let cursor = ByteCursor::new(data);
        let end = header.end();
        let mut pos = header.payload_offset();

        while pos < end {
            if end - pos < 4 {
                return Err(header.bad_length("a whole number of fragments".to_string()));
            }
            let info = cursor.u32(pos)?;
            let base_id = info & 0x000F_FFFF;
            let count = (info >> 20) as usize;
            pos += 4;

            if (end - pos) / 4 < count {
                return Err(header.bad_length(format!(
                    "room for {} offsets after id {}",
                    count, base_id
                )));
            }
            for i in 0..count {
                let stream_offset = cursor.u32(pos + i * 4)?;
                self.insert(base_id + i as u32, stream_offset);
            }
            pos += count * 4;
        }

        Ok(())
    }
}

/// Everything persist resolution learned about the document.
#[derive(Debug, Clone)]
pub struct ResolvedDocument {
    /// Edits from most recent to first.
    pub edits: Vec<UserEditAtom>,
    pub directory: PersistDirectory,
}

impl ResolvedDocument {
    /// The most recent edit.
    pub fn current_edit(&self) -> &UserEditAtom {
        &self.edits[0]
    }

    /// Stream offset of the DocumentContainer.
    pub fn document_offset(&self) -> Result<usize> {
        self.directory.require(self.current_edit().doc_persist_id_ref)
    }
}

/// Follow Current User → UserEditAtom chain → persist directories.
pub fn resolve(document: &[u8], current_user: &[u8]) -> Result<ResolvedDocument> {
    let current_user = CurrentUserAtom::parse(current_user)?;

    let mut edits = Vec::new();
    let mut visited = HashSet::new();
    let mut offset = current_user.offset_to_current_edit as usize;
    loop {
        if !visited.insert(offset) {
            return Err(Violation::EditChainCycle(offset).into());
        }
        let edit = UserEditAtom::parse(document, offset)?;
        edits.push(edit);
        if edit.offset_last_edit == 0 {
            break;
        }
        offset = edit.offset_last_edit as usize;
    }

    let mut directory = PersistDirectory::new();
    for edit in edits.iter().rev() {
        directory.apply_atom(document, edit.offset_persist_directory as usize)?;
    }

    log::debug!(
        "Resolved persist directory: {} edits, {} objects, current edit at {}",
        edits.len(),
        directory.len(),
        current_user.offset_to_current_edit
    );

    Ok(ResolvedDocument {
        edits,
        directory,
    })
}

/// Peek the header of the persisted object at `offset`.
pub(crate) fn object_header(document: &[u8], persist_id: u32, offset: u32) -> Result<RecordHeader> {
    read_header(document, offset as usize).map_err(|e| match e {
        Error::TruncatedHeader { .. } => Violation::MissingPersistObject(persist_id).into(),
        other => other,
    })
}
