//! Byte builders for synthetic PowerPoint streams used in tests.

use crate::officeart::{FSP_GROUP, FSP_HAVE_ANCHOR, FSP_HAVE_SPT, FSP_PATRIARCH};
use crate::parser::PptStreams;
use crate::persist::{CURRENT_USER_SIZE, HEADER_TOKEN};
use crate::record_types::*;

pub fn record(version: u8, instance: u16, rec_type: u16, payload: &[u8]) -> Vec<u8> {
    let ver_instance = (u16::from(version) & 0x000F) | (instance << 4);
    let mut out = Vec::with_capacity(8 + payload.len());
    out.extend_from_slice(&ver_instance.to_le_bytes());
    out.extend_from_slice(&rec_type.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

pub fn atom(rec_type: u16, payload: &[u8]) -> Vec<u8> {
    record(0, 0, rec_type, payload)
}

pub fn container(rec_type: u16, children: &[Vec<u8>]) -> Vec<u8> {
    container_instance(rec_type, 0, children)
}

pub fn container_instance(rec_type: u16, instance: u16, children: &[Vec<u8>]) -> Vec<u8> {
    record(0xF, instance, rec_type, &children.concat())
}

fn le32(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn le32i(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

// Persist layer

pub fn current_user_stream(offset_to_current_edit: u32) -> Vec<u8> {
    current_user_stream_with(CURRENT_USER_SIZE, HEADER_TOKEN, offset_to_current_edit)
}

pub fn current_user_stream_with(size: u32, token: u32, offset_to_current_edit: u32) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&size.to_le_bytes());
    payload.extend_from_slice(&token.to_le_bytes());
    payload.extend_from_slice(&offset_to_current_edit.to_le_bytes());
    payload.extend_from_slice(&3u16.to_le_bytes()); // lenUserName
    payload.extend_from_slice(&0x03F4u16.to_le_bytes());
    payload.push(3);
    payload.push(0);
    payload.extend_from_slice(&[0, 0]);
    payload.extend_from_slice(b"ppt");
    payload.extend_from_slice(&8u32.to_le_bytes()); // relVersion
    atom(RT_CURRENT_USER_ATOM, &payload)
}

pub fn user_edit(offset_last_edit: u32, offset_persist_directory: u32) -> Vec<u8> {
    user_edit_with(offset_last_edit, offset_persist_directory, 1)
}

pub fn user_edit_with(
    offset_last_edit: u32,
    offset_persist_directory: u32,
    doc_persist_id_ref: u32,
) -> Vec<u8> {
    let mut payload = le32(&[0x100]); // lastSlideIdRef
    payload.extend_from_slice(&0u16.to_le_bytes());
    payload.push(0);
    payload.push(3);
    payload.extend(le32(&[
        offset_last_edit,
        offset_persist_directory,
        doc_persist_id_ref,
        16,
    ]));
    payload.extend_from_slice(&[1, 0, 0, 0]); // lastView, unused
    atom(RT_USER_EDIT_ATOM, &payload)
}

pub fn persist_directory_atom(fragments: &[(u32, &[u32])]) -> Vec<u8> {
    let mut payload = Vec::new();
    for (base_id, offsets) in fragments {
        let info = (base_id & 0x000F_FFFF) | ((offsets.len() as u32) << 20);
        payload.extend_from_slice(&info.to_le_bytes());
        payload.extend(le32(offsets));
    }
    atom(RT_PERSIST_DIRECTORY_ATOM, &payload)
}

// Text

pub fn text_header(kind: u32) -> Vec<u8> {
    atom(RT_TEXT_HEADER_ATOM, &kind.to_le_bytes())
}

pub fn text_bytes(text: &str) -> Vec<u8> {
    let bytes: Vec<u8> = text.chars().map(|c| c as u32 as u8).collect();
    atom(RT_TEXT_BYTES_ATOM, &bytes)
}

pub fn text_chars(text: &str) -> Vec<u8> {
    let bytes: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
    atom(RT_TEXT_CHARS_ATOM, &bytes)
}

/// One TextPFRun: count, indent level, mask and the already-encoded fields.
pub fn pf_run(count: u32, indent_level: u16, mask: u32, fields: &[u8]) -> Vec<u8> {
    let mut out = count.to_le_bytes().to_vec();
    out.extend_from_slice(&indent_level.to_le_bytes());
    out.extend_from_slice(&mask.to_le_bytes());
    out.extend_from_slice(fields);
    out
}

/// One TextCFRun: count, mask and the already-encoded fields.
pub fn cf_run(count: u32, mask: u32, fields: &[u8]) -> Vec<u8> {
    let mut out = count.to_le_bytes().to_vec();
    out.extend_from_slice(&mask.to_le_bytes());
    out.extend_from_slice(fields);
    out
}

pub fn style_text_prop(pf_runs: &[Vec<u8>], cf_runs: &[Vec<u8>]) -> Vec<u8> {
    let mut payload = pf_runs.concat();
    payload.extend(cf_runs.concat());
    atom(RT_STYLE_TEXT_PROP_ATOM, &payload)
}

/// A MouseClick interactive info container followed by its text range atom.
pub fn hyperlink_range(hyperlink_id: u32, begin: i32, end: i32) -> Vec<u8> {
    let mut info = le32(&[0, hyperlink_id]);
    info.extend_from_slice(&[4, 0, 0, 0, 8, 0, 0, 0]); // action = hyperlink
    let mut out = container(RT_INTERACTIVE_INFO, &[atom(RT_INTERACTIVE_INFO_ATOM, &info)]);
    out.extend(atom(RT_TEXT_INTERACTIVE_INFO_ATOM, &le32i(&[begin, end])));
    out
}

// OfficeArt

pub fn fsp(shape_type: u16, spid: u32, flags: u32) -> Vec<u8> {
    record(2, shape_type, OFFICE_ART_FSP, &le32(&[spid, flags]))
}

pub fn fspgr(left: i32, top: i32, right: i32, bottom: i32) -> Vec<u8> {
    record(1, 0, OFFICE_ART_FSPGR, &le32i(&[left, top, right, bottom]))
}

pub fn fopt(props: &[(u16, u32)]) -> Vec<u8> {
    let mut payload = Vec::new();
    for (id, value) in props {
        payload.extend_from_slice(&id.to_le_bytes());
        payload.extend_from_slice(&value.to_le_bytes());
    }
    record(3, props.len() as u16, OFFICE_ART_FOPT, &payload)
}

pub fn client_anchor(top: i16, left: i16, right: i16, bottom: i16) -> Vec<u8> {
    let payload: Vec<u8> = [top, left, right, bottom]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    atom(OFFICE_ART_CLIENT_ANCHOR, &payload)
}

pub fn child_anchor(left: i32, top: i32, right: i32, bottom: i32) -> Vec<u8> {
    atom(OFFICE_ART_CHILD_ANCHOR, &le32i(&[left, top, right, bottom]))
}

pub fn client_textbox(children: &[Vec<u8>]) -> Vec<u8> {
    container(OFFICE_ART_CLIENT_TEXTBOX, children)
}

pub fn sp_container(children: &[Vec<u8>]) -> Vec<u8> {
    container(OFFICE_ART_SP_CONTAINER, children)
}

pub fn spgr_container(children: &[Vec<u8>]) -> Vec<u8> {
    container(OFFICE_ART_SPGR_CONTAINER, children)
}

/// The anchor-only SpContainer that opens every group.
pub fn group_anchor(space: (i32, i32, i32, i32), anchor: Vec<u8>) -> Vec<u8> {
    sp_container(&[
        fspgr(space.0, space.1, space.2, space.3),
        fsp(0, 0x400, FSP_GROUP | FSP_HAVE_ANCHOR),
        anchor,
    ])
}

pub fn patriarch_anchor() -> Vec<u8> {
    sp_container(&[fspgr(0, 0, 0, 0), fsp(0, 0x400, FSP_GROUP | FSP_PATRIARCH)])
}

/// A top-level text box at the given client anchor.
pub fn text_box(spid: u32, anchor: (i16, i16, i16, i16), text: &str) -> Vec<u8> {
    sp_container(&[
        fsp(202, spid, FSP_HAVE_ANCHOR | FSP_HAVE_SPT),
        client_anchor(anchor.0, anchor.1, anchor.2, anchor.3),
        client_textbox(&[text_header(4), text_bytes(text)]),
    ])
}

pub fn drawing(shapes: &[Vec<u8>]) -> Vec<u8> {
    let mut group = vec![patriarch_anchor()];
    group.extend_from_slice(shapes);
    container(
        RT_DRAWING,
        &[container(
            OFFICE_ART_DG_CONTAINER,
            &[
                record(0, 1, OFFICE_ART_FDG, &le32(&[shapes.len() as u32 + 1, 0x401])),
                spgr_container(&group),
            ],
        )],
    )
}

// Slides and document

pub fn slide_atom(master_id_ref: u32, notes_id_ref: u32) -> Vec<u8> {
    let mut payload = le32(&[0]);
    payload.extend_from_slice(&[0u8; 8]);
    payload.extend(le32(&[master_id_ref, notes_id_ref]));
    payload.extend_from_slice(&[0u8; 4]);
    record(2, 0, RT_SLIDE_ATOM, &payload)
}

pub fn slide_container(shapes: &[Vec<u8>]) -> Vec<u8> {
    container(RT_SLIDE, &[slide_atom(0x8000_0000, 0), drawing(shapes)])
}

pub fn notes_container(slide_id_ref: u32, shapes: &[Vec<u8>]) -> Vec<u8> {
    let mut payload = le32(&[slide_id_ref]);
    payload.extend_from_slice(&[0u8; 4]);
    container(
        RT_NOTES,
        &[record(1, 0, RT_NOTES_ATOM, &payload), drawing(shapes)],
    )
}

pub fn color_scheme(colors: [u32; 8]) -> Vec<u8> {
    atom(RT_COLOR_SCHEME_ATOM, &le32(&colors))
}

pub fn document_atom(width: i32, height: i32) -> Vec<u8> {
    let mut payload = le32i(&[width, height, 4320, 5760]);
    payload.extend(le32i(&[1, 2])); // serverZoom
    payload.extend(le32(&[0, 0])); // notes/handout master refs
    payload.extend_from_slice(&1u16.to_le_bytes());
    payload.extend_from_slice(&0u16.to_le_bytes());
    payload.extend_from_slice(&[0, 0, 0, 1]);
    record(1, 0, RT_DOCUMENT_ATOM, &payload)
}

pub fn slide_persist_atom(persist_id: u32, slide_id: u32) -> Vec<u8> {
    atom(RT_SLIDE_PERSIST_ATOM, &le32(&[persist_id, 0, 0, slide_id, 0]))
}

pub fn cstring(instance: u16, text: &str) -> Vec<u8> {
    let bytes: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
    record(0, instance, RT_CSTRING, &bytes)
}

pub fn hyperlink(id: u32, target: &str) -> Vec<u8> {
    container(
        RT_EX_HYPERLINK,
        &[atom(RT_EX_HYPERLINK_ATOM, &id.to_le_bytes()), cstring(1, target)],
    )
}

pub fn font_entity(instance: u16, name: &str) -> Vec<u8> {
    let mut payload = vec![0u8; 0x44];
    for (i, unit) in name.encode_utf16().take(31).enumerate() {
        payload[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
    }
    record(0, instance, RT_FONT_ENTITY_ATOM, &payload)
}

pub fn environment(fonts: &[&str]) -> Vec<u8> {
    let entities: Vec<Vec<u8>> = fonts
        .iter()
        .enumerate()
        .map(|(i, name)| font_entity(i as u16, name))
        .collect();
    container(RT_ENVIRONMENT, &[container(RT_FONT_COLLECTION, &entities)])
}

/// Assembles a PowerPoint Document stream with a single edit.
#[derive(Debug, Default)]
pub struct StreamBuilder {
    data: Vec<u8>,
    persist: Vec<(u32, u32)>,
    pictures: Option<Vec<u8>>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and register it under `persist_id`.
    pub fn persisted(mut self, persist_id: u32, bytes: Vec<u8>) -> Self {
        self.persist.push((persist_id, self.data.len() as u32));
        self.data.extend(bytes);
        self
    }

    pub fn pictures(mut self, pictures: Vec<u8>) -> Self {
        self.pictures = Some(pictures);
        self
    }

    pub fn finish(mut self) -> PptStreams {
        let offsets: Vec<(u32, Vec<u32>)> =
            self.persist.iter().map(|&(id, off)| (id, vec![off])).collect();
        let fragments: Vec<(u32, &[u32])> = offsets
            .iter()
            .map(|(id, offs)| (*id, offs.as_slice()))
            .collect();

        let directory_offset = self.data.len() as u32;
        self.data.extend(persist_directory_atom(&fragments));
        let edit_offset = self.data.len() as u32;
        self.data.extend(user_edit(0, directory_offset));

        PptStreams {
            document: self.data,
            current_user: current_user_stream(edit_offset),
            pictures: self.pictures,
        }
    }
}
