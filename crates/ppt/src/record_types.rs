//! Record type constants for the PowerPoint binary format and OfficeArt.

// PowerPoint document records
pub const RT_DOCUMENT: u16 = 0x03E8;
pub const RT_DOCUMENT_ATOM: u16 = 0x03E9;
pub const RT_END_DOCUMENT_ATOM: u16 = 0x03EA;
pub const RT_SLIDE: u16 = 0x03EE;
pub const RT_SLIDE_ATOM: u16 = 0x03EF;
pub const RT_NOTES: u16 = 0x03F0;
pub const RT_NOTES_ATOM: u16 = 0x03F1;
pub const RT_ENVIRONMENT: u16 = 0x03F2;
pub const RT_SLIDE_PERSIST_ATOM: u16 = 0x03F3;
pub const RT_MAIN_MASTER: u16 = 0x03F8;
pub const RT_SLIDE_SHOW_SLIDE_INFO_ATOM: u16 = 0x03F9;
pub const RT_EX_OBJ_LIST: u16 = 0x0409;
pub const RT_EX_OBJ_LIST_ATOM: u16 = 0x040A;
pub const RT_DRAWING: u16 = 0x040C;
pub const RT_FONT_COLLECTION: u16 = 0x07D5;
pub const RT_COLOR_SCHEME_ATOM: u16 = 0x07F0;
pub const RT_OUTLINE_TEXT_REF_ATOM: u16 = 0x0F9E;
pub const RT_TEXT_HEADER_ATOM: u16 = 0x0F9F;
pub const RT_TEXT_CHARS_ATOM: u16 = 0x0FA0;
pub const RT_STYLE_TEXT_PROP_ATOM: u16 = 0x0FA1;
pub const RT_MASTER_TEXT_PROP_ATOM: u16 = 0x0FA2;
pub const RT_TEXT_RULER_ATOM: u16 = 0x0FA6;
pub const RT_TEXT_BYTES_ATOM: u16 = 0x0FA8;
pub const RT_TEXT_SPECIAL_INFO_ATOM: u16 = 0x0FAA;
pub const RT_FONT_ENTITY_ATOM: u16 = 0x0FB7;
pub const RT_CSTRING: u16 = 0x0FBA;
pub const RT_EX_HYPERLINK_ATOM: u16 = 0x0FD3;
pub const RT_EX_HYPERLINK: u16 = 0x0FD7;
pub const RT_HEADERS_FOOTERS: u16 = 0x0FD9;
pub const RT_TEXT_INTERACTIVE_INFO_ATOM: u16 = 0x0FDF;
pub const RT_SLIDE_LIST_WITH_TEXT: u16 = 0x0FF0;
pub const RT_INTERACTIVE_INFO: u16 = 0x0FF2;
pub const RT_INTERACTIVE_INFO_ATOM: u16 = 0x0FF3;
pub const RT_USER_EDIT_ATOM: u16 = 0x0FF5;
pub const RT_CURRENT_USER_ATOM: u16 = 0x0FF6;
pub const RT_PERSIST_DIRECTORY_ATOM: u16 = 0x1772;
pub const RT_ROUND_TRIP_SLIDE_SYNC_INFO12: u16 = 0x3714;

// OfficeArt (drawing) records
pub const OFFICE_ART_DG_CONTAINER: u16 = 0xF002;
pub const OFFICE_ART_SPGR_CONTAINER: u16 = 0xF003;
pub const OFFICE_ART_SP_CONTAINER: u16 = 0xF004;
pub const OFFICE_ART_SOLVER_CONTAINER: u16 = 0xF005;
pub const OFFICE_ART_FDG: u16 = 0xF008;
pub const OFFICE_ART_FSPGR: u16 = 0xF009;
pub const OFFICE_ART_FSP: u16 = 0xF00A;
pub const OFFICE_ART_FOPT: u16 = 0xF00B;
pub const OFFICE_ART_CLIENT_TEXTBOX: u16 = 0xF00D;
pub const OFFICE_ART_CHILD_ANCHOR: u16 = 0xF00F;
pub const OFFICE_ART_CLIENT_ANCHOR: u16 = 0xF010;
pub const OFFICE_ART_CLIENT_DATA: u16 = 0xF011;
pub const OFFICE_ART_BLIP_JPEG: u16 = 0xF01D;
pub const OFFICE_ART_BLIP_PNG: u16 = 0xF01E;
pub const OFFICE_ART_FRIT_CONTAINER: u16 = 0xF118;
pub const OFFICE_ART_FPSPL: u16 = 0xF11D;
pub const OFFICE_ART_SECONDARY_FOPT: u16 = 0xF121;
pub const OFFICE_ART_TERTIARY_FOPT: u16 = 0xF122;

/// Human-readable name for trace logging of skipped records.
pub fn record_name(rec_type: u16) -> &'static str {
    match rec_type {
        RT_DOCUMENT => "Document",
        RT_DOCUMENT_ATOM => "DocumentAtom",
        RT_END_DOCUMENT_ATOM => "EndDocumentAtom",
        RT_SLIDE => "Slide",
        RT_SLIDE_ATOM => "SlideAtom",
        RT_NOTES => "Notes",
        RT_NOTES_ATOM => "NotesAtom",
        RT_ENVIRONMENT => "Environment",
        RT_SLIDE_PERSIST_ATOM => "SlidePersistAtom",
        RT_MAIN_MASTER => "MainMaster",
        RT_SLIDE_SHOW_SLIDE_INFO_ATOM => "SlideShowSlideInfoAtom",
        RT_EX_OBJ_LIST => "ExObjList",
        RT_EX_OBJ_LIST_ATOM => "ExObjListAtom",
        RT_DRAWING => "Drawing",
        RT_FONT_COLLECTION => "FontCollection",
        RT_COLOR_SCHEME_ATOM => "ColorSchemeAtom",
        RT_OUTLINE_TEXT_REF_ATOM => "OutlineTextRefAtom",
        RT_TEXT_HEADER_ATOM => "TextHeaderAtom",
        RT_TEXT_CHARS_ATOM => "TextCharsAtom",
        RT_STYLE_TEXT_PROP_ATOM => "StyleTextPropAtom",
        RT_MASTER_TEXT_PROP_ATOM => "MasterTextPropAtom",
        RT_TEXT_RULER_ATOM => "TextRulerAtom",
        RT_TEXT_BYTES_ATOM => "TextBytesAtom",
        RT_TEXT_SPECIAL_INFO_ATOM => "TextSpecialInfoAtom",
        RT_FONT_ENTITY_ATOM => "FontEntityAtom",
        RT_CSTRING => "CString",
        RT_EX_HYPERLINK_ATOM => "ExHyperlinkAtom",
        RT_EX_HYPERLINK => "ExHyperlink",
        RT_HEADERS_FOOTERS => "HeadersFooters",
        RT_TEXT_INTERACTIVE_INFO_ATOM => "TextInteractiveInfoAtom",
        RT_SLIDE_LIST_WITH_TEXT => "SlideListWithText",
        RT_INTERACTIVE_INFO => "InteractiveInfo",
        RT_INTERACTIVE_INFO_ATOM => "InteractiveInfoAtom",
        RT_USER_EDIT_ATOM => "UserEditAtom",
        RT_CURRENT_USER_ATOM => "CurrentUserAtom",
        RT_PERSIST_DIRECTORY_ATOM => "PersistDirectoryAtom",
        RT_ROUND_TRIP_SLIDE_SYNC_INFO12 => "RoundTripSlideSyncInfo12",
        OFFICE_ART_DG_CONTAINER => "OfficeArtDgContainer",
        OFFICE_ART_SPGR_CONTAINER => "OfficeArtSpgrContainer",
        OFFICE_ART_SP_CONTAINER => "OfficeArtSpContainer",
        OFFICE_ART_SOLVER_CONTAINER => "OfficeArtSolverContainer",
        OFFICE_ART_FDG => "OfficeArtFDG",
        OFFICE_ART_FSPGR => "OfficeArtFSPGR",
        OFFICE_ART_FSP => "OfficeArtFSP",
        OFFICE_ART_FOPT => "OfficeArtFOPT",
        OFFICE_ART_CLIENT_TEXTBOX => "OfficeArtClientTextbox",
        OFFICE_ART_CHILD_ANCHOR => "OfficeArtChildAnchor",
        OFFICE_ART_CLIENT_ANCHOR => "OfficeArtClientAnchor",
        OFFICE_ART_CLIENT_DATA => "OfficeArtClientData",
        OFFICE_ART_BLIP_JPEG => "OfficeArtBlipJPEG",
        OFFICE_ART_BLIP_PNG => "OfficeArtBlipPNG",
        OFFICE_ART_FRIT_CONTAINER => "OfficeArtFRITContainer",
        OFFICE_ART_FPSPL => "OfficeArtFPSPL",
        OFFICE_ART_SECONDARY_FOPT => "OfficeArtSecondaryFOPT",
        OFFICE_ART_TERTIARY_FOPT => "OfficeArtTertiaryFOPT",
        _ => "Unknown",
    }
}
