//! Embedded image extraction from the Pictures stream.
//!
//! The stream is a flat sequence of OfficeArtBlip records with no enclosing
//! container, so an unsupported blip type cannot be stepped over safely and
//! aborts the decode.

use crate::record::{read_bounded, HEADER_LEN};
use crate::record_types::{OFFICE_ART_BLIP_JPEG, OFFICE_ART_BLIP_PNG};
use ppt97_core::{ImageFormat, Result, Violation};

const UID_LEN: usize = 16;
const TAG_LEN: usize = 1;

/// Instances whose blip carries a second UID before the tag byte.
const TWO_UID_INSTANCES: [u16; 3] = [0x46B, 0x6E1, 0x6E3];

/// One embedded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blip {
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

/// Images of the Pictures stream in stream order, addressed 1-based.
#[derive(Debug, Clone, Default)]
pub struct BlipStore {
    blips: Vec<Blip>,
}

impl BlipStore {
    /// Scan the whole Pictures stream from offset 0.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut blips = Vec::new();
        let mut pos = 0;

        while pos < data.len() {
            if data.len() - pos < HEADER_LEN {
                log::debug!(
                    "Ignoring {} trailing bytes in Pictures stream",
                    data.len() - pos
                );
                break;
            }

            let header = read_bounded(data, pos, data.len())?;
            let format = match header.rec_type {
                OFFICE_ART_BLIP_JPEG => ImageFormat::Jpeg,
                OFFICE_ART_BLIP_PNG => ImageFormat::Png,
                other => {
                    return Err(Violation::UnsupportedBlip {
                        offset: pos,
                        rec_type: other,
                    }
                    .into())
                }
            };

            let uids = if TWO_UID_INSTANCES.contains(&header.instance) {
                2
            } else {
                1
            };
            let prefix = uids * UID_LEN + TAG_LEN;
            if (header.length as usize) < prefix {
                return Err(header.bad_length(format!(">= {}", prefix)));
            }

            let payload = header.payload(data)?;
            blips.push(Blip {
                format,
                data: payload[prefix..].to_vec(),
            });
            pos = header.end();
        }

        log::debug!("Decoded {} pictures", blips.len());
        Ok(Self { blips })
    }

    /// The image a shape's 1-based `pib` refers to.
    pub fn get(&self, pib: u32) -> Option<&Blip> {
        let index = (pib as usize).checked_sub(1)?;
        self.blips.get(index)
    }

    pub fn len(&self) -> usize {
        self.blips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blips.is_empty()
    }
}
