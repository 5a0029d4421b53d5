use bytes::{Buf, Bytes};

use crate::descriptor::{EsInfo, read_es_info};
use crate::stream_type::StreamType;

/// Table id of a TS_program_map_section
pub const PMT_TABLE_ID: u8 = 0x02;

/// Bytes between the table id and program_info_length: section syntax and
/// length, program_number, version and section numbers, PCR_PID.
const HEADER_AFTER_TABLE_ID: usize = 9;
const STREAM_ENTRY_LENGTH: usize = 5;

/// One elementary stream entry of the PMT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PmtStream {
    /// Stream type written in the table
    pub declared_type: StreamType,
    /// Declared type, or the descriptor result when declared as private data
    pub stream_type: StreamType,
    pub elementary_pid: u16,
    pub es_info: EsInfo,
}

/// Program Map Table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pmt {
    pub program_number: u16,
    pub version_number: u8,
    /// Carried for completeness; the demuxer does not use it.
    pub pcr_pid: u16,
    pub streams: Vec<PmtStream>,
}

impl Pmt {
    /// Parse a PMT section with its CRC_32 field already removed.
    ///
    /// Returns `None` for any other table id or a truncated header. Entries
    /// whose ES-info length runs past the section are clamped to it.
    pub fn parse(section: Bytes) -> Option<Self> {
        let mut data = section;
        if data.remaining() < 1 + HEADER_AFTER_TABLE_ID + 2 || data.get_u8() != PMT_TABLE_ID {
            return None;
        }

        data.advance(2); // section_syntax_indicator, section_length
        let program_number = data.get_u16();
        let version_number = (data.get_u8() >> 1) & 0x1F;
        data.advance(2); // section_number, last_section_number
        let pcr_pid = data.get_u16() & 0x1FFF;

        let program_info_length = (data.get_u16() & 0x0FFF) as usize;
        data.advance(program_info_length.min(data.remaining()));

        let mut streams = Vec::new();
        while data.remaining() >= STREAM_ENTRY_LENGTH {
            let declared_type = StreamType::from(data.get_u8());
            let elementary_pid = data.get_u16() & 0x1FFF;
            let es_info_length = (data.get_u16() & 0x0FFF) as usize;
            let descriptors = data.split_to(es_info_length.min(data.remaining()));
            let es_info = read_es_info(descriptors);

            let stream_type = if declared_type == StreamType::PrivateData {
                es_info.stream_type
            } else {
                declared_type
            };

            streams.push(PmtStream {
                declared_type,
                stream_type,
                elementary_pid,
                es_info,
            });
        }

        Some(Pmt {
            program_number,
            version_number,
            pcr_pid,
            streams,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::pmt_section;

    fn parse(section: &[u8]) -> Option<Pmt> {
        Pmt::parse(Bytes::copy_from_slice(&section[..section.len() - 4]))
    }

    #[test]
    fn test_streams() {
        let lang: &[u8] = &[0x0A, 0x04, b'e', b'n', b'g', 0x00];
        let section = pmt_section(1, &[(0x1B, 0x101, &[]), (0x0F, 0x102, lang)]);
        let pmt = parse(&section).unwrap();
        assert_eq!(pmt.program_number, 1);
        assert_eq!(pmt.pcr_pid, 0x1FFF);
        assert_eq!(pmt.streams.len(), 2);
        assert_eq!(pmt.streams[0].stream_type, StreamType::H264);
        assert_eq!(pmt.streams[0].elementary_pid, 0x101);
        assert_eq!(pmt.streams[1].stream_type, StreamType::AdtsAac);
        assert_eq!(pmt.streams[1].es_info.language.as_deref(), Some("eng"));
        assert_eq!(&pmt.streams[1].es_info.descriptors[..], lang);
    }

    #[test]
    fn test_private_data_resolved_by_registration() {
        let ac3: &[u8] = &[0x05, 0x04, b'A', b'C', b'-', b'3'];
        let section = pmt_section(1, &[(0x06, 0x103, ac3)]);
        let pmt = parse(&section).unwrap();
        assert_eq!(pmt.streams[0].declared_type, StreamType::PrivateData);
        assert_eq!(pmt.streams[0].stream_type, StreamType::Ac3);
    }

    #[test]
    fn test_private_data_without_descriptors_is_undetermined() {
        let section = pmt_section(1, &[(0x06, 0x103, &[])]);
        let pmt = parse(&section).unwrap();
        assert_eq!(pmt.streams[0].stream_type, StreamType::Undetermined);
    }

    #[test]
    fn test_registration_does_not_override_declared_type() {
        let hevc: &[u8] = &[0x05, 0x04, b'H', b'E', b'V', b'C'];
        let section = pmt_section(1, &[(0x1B, 0x101, hevc)]);
        let pmt = parse(&section).unwrap();
        assert_eq!(pmt.streams[0].stream_type, StreamType::H264);
        assert_eq!(pmt.streams[0].es_info.stream_type, StreamType::H265);
    }

    #[test]
    fn test_wrong_table_id_is_ignored() {
        let mut section = pmt_section(1, &[(0x1B, 0x101, &[])]);
        section[0] = 0x00;
        assert!(parse(&section).is_none());
    }

    #[test]
    fn test_overlong_es_info_is_clamped() {
        let section = pmt_section(1, &[(0x1B, 0x101, &[])]);
        let mut data = section[..section.len() - 4].to_vec();
        let entry_len_offset = data.len() - 2;
        data[entry_len_offset] = 0xF0;
        data[entry_len_offset + 1] = 0x40;
        data.extend_from_slice(&[0x0A, 0x04, b'f', b'r', b'a', 0x00]);

        let pmt = Pmt::parse(Bytes::from(data)).unwrap();
        assert_eq!(pmt.streams.len(), 1);
        assert_eq!(pmt.streams[0].es_info.language.as_deref(), Some("fra"));
    }
}
