use bytes::{Bytes, BytesMut};
use tracing::{trace, warn};

use crate::crc32::section_crc_is_valid;

const SECTION_HEADER_LENGTH: usize = 3;
const CRC_LENGTH: usize = 4;
/// Stuffing value that can never start a section.
const TABLE_ID_FORBIDDEN: u8 = 0xFF;

/// Output of feeding one packet payload into a [`SectionAssembler`].
#[derive(Debug, Default)]
pub(crate) struct Assembled {
    /// Completed sections, CRC_32 field removed.
    pub sections: Vec<Bytes>,
    /// Sections discarded because of a bad CRC.
    pub crc_failures: usize,
}

/// Reassembles PSI sections that span transport packets.
///
/// Nothing is collected until a payload unit start is seen; the pointer field
/// of that packet locates the first section.
#[derive(Debug)]
pub(crate) struct SectionAssembler {
    buffer: BytesMut,
    total_length: usize,
    section_syntax_indicator: bool,
    waiting_for_payload_start: bool,
    validate_crc: bool,
}

impl SectionAssembler {
    pub fn new(validate_crc: bool) -> Self {
        Self {
            buffer: BytesMut::with_capacity(1024),
            total_length: 0,
            section_syntax_indicator: false,
            waiting_for_payload_start: true,
            validate_crc,
        }
    }

    /// Drop any partial section and wait for the next payload unit start.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.total_length = 0;
        self.waiting_for_payload_start = true;
    }

    pub fn push(&mut self, payload: &[u8], payload_unit_start: bool) -> Assembled {
        let mut assembled = Assembled::default();
        let mut data = payload;

        let mut payload_start = 0;
        if payload_unit_start {
            let Some((&pointer_field, rest)) = data.split_first() else {
                return assembled;
            };
            payload_start = pointer_field as usize;
            data = rest;
        }

        if self.waiting_for_payload_start {
            if !payload_unit_start {
                return assembled;
            }
            if payload_start > data.len() {
                trace!(payload_start, "Pointer field points past the packet");
                return assembled;
            }
            self.waiting_for_payload_start = false;
            self.buffer.clear();
            self.total_length = 0;
            data = &data[payload_start..];
        }

        while !data.is_empty() {
            let wanted = if self.buffer.len() < SECTION_HEADER_LENGTH {
                if self.buffer.is_empty() && data[0] == TABLE_ID_FORBIDDEN {
                    // No more sections in this packet.
                    self.waiting_for_payload_start = true;
                    break;
                }
                SECTION_HEADER_LENGTH - self.buffer.len()
            } else {
                self.total_length - self.buffer.len()
            };

            let take = wanted.min(data.len());
            self.buffer.extend_from_slice(&data[..take]);
            data = &data[take..];

            if self.buffer.len() == SECTION_HEADER_LENGTH && self.total_length == 0 {
                let byte1 = self.buffer[1];
                self.section_syntax_indicator = (byte1 & 0x80) != 0;
                let section_length = (((byte1 as usize) & 0x0F) << 8) | self.buffer[2] as usize;
                self.total_length = section_length + SECTION_HEADER_LENGTH;
            }

            if self.total_length != 0
                && self.buffer.len() == self.total_length
                && !self.complete_section(&mut assembled)
            {
                break;
            }
        }

        assembled
    }

    /// Returns false when the rest of the packet must be skipped.
    fn complete_section(&mut self, assembled: &mut Assembled) -> bool {
        let section = self.buffer.split().freeze();
        self.total_length = 0;

        if !self.section_syntax_indicator {
            assembled.sections.push(section);
            return true;
        }

        if section.len() < SECTION_HEADER_LENGTH + CRC_LENGTH
            || (self.validate_crc && !section_crc_is_valid(&section))
        {
            warn!(
                table_id = section[0],
                length = section.len(),
                "Discarding PSI section with invalid CRC"
            );
            assembled.crc_failures += 1;
            self.waiting_for_payload_start = true;
            return false;
        }

        assembled
            .sections
            .push(section.slice(..section.len() - CRC_LENGTH));
        true
    }
}
