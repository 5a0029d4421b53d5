use bytes::Buf;

/// Table id of a program_association_section
pub const PAT_TABLE_ID: u8 = 0x00;

/// Bytes between the table id and the first program entry: section syntax
/// and length, transport_stream_id, version and section numbers.
const HEADER_AFTER_TABLE_ID: usize = 7;

/// One program entry of the PAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatProgram {
    pub program_number: u16,
    pub pmt_pid: u16,
}

/// Program Association Table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pat {
    pub transport_stream_id: u16,
    pub version_number: u8,
    /// Network PID announced by program number 0, if any
    pub network_pid: Option<u16>,
    pub programs: Vec<PatProgram>,
}

impl Pat {
    /// Parse a PAT section with its CRC_32 field already removed.
    ///
    /// Returns `None` for any other table id or a truncated header.
    pub fn parse(section: &[u8]) -> Option<Self> {
        let mut reader = section;
        if reader.remaining() < 1 + HEADER_AFTER_TABLE_ID || reader.get_u8() != PAT_TABLE_ID {
            return None;
        }

        reader.advance(2); // section_syntax_indicator, section_length
        let transport_stream_id = reader.get_u16();
        let version_number = (reader.get_u8() >> 1) & 0x1F;
        reader.advance(2); // section_number, last_section_number

        let mut network_pid = None;
        let mut programs = Vec::with_capacity(reader.remaining() / 4);
        for _ in 0..reader.remaining() / 4 {
            let program_number = reader.get_u16();
            let pid = reader.get_u16() & 0x1FFF;
            if program_number == 0 {
                network_pid = Some(pid);
            } else {
                programs.push(PatProgram {
                    program_number,
                    pmt_pid: pid,
                });
            }
        }

        Some(Pat {
            transport_stream_id,
            version_number,
            network_pid,
            programs,
        })
    }
}
