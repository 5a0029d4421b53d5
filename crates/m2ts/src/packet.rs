/// Sync byte that starts every transport packet
pub const SYNC_BYTE: u8 = 0x47;

/// Size of a transport packet without any framing prefix or suffix
pub const TS_PACKET_SIZE: usize = 188;

/// PAT PID (always 0x0000)
pub const PID_PAT: u16 = 0x0000;

/// NULL PID (always 0x1FFF)
pub const PID_NULL: u16 = 0x1FFF;

/// Number of distinct PIDs; also the stride used to keep track ids unique.
pub const PID_SPACE: usize = 0x2000;

/// Physical unit layout of the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PacketFormat {
    /// Plain 188-byte transport packets.
    Ts188,
    /// 4-byte arrival timestamp prefix followed by a 188-byte packet.
    #[default]
    M2ts192,
    /// 188-byte packet followed by 16 bytes of Reed-Solomon parity.
    Ts204,
}

impl PacketFormat {
    /// Total size of one physical unit.
    pub const fn unit_size(self) -> usize {
        match self {
            Self::Ts188 => 188,
            Self::M2ts192 => 192,
            Self::Ts204 => 204,
        }
    }

    /// Number of opaque bytes preceding the sync byte.
    pub const fn prefix_len(self) -> usize {
        match self {
            Self::Ts188 => 0,
            Self::M2ts192 => 4,
            Self::Ts204 => 0,
        }
    }

    /// Distance from a sync byte to the start of the following unit.
    pub const fn stride_from_sync(self) -> usize {
        self.unit_size() - self.prefix_len()
    }
}

/// Decoded transport packet header.
///
/// Covers the three bytes following the sync byte (ISO/IEC 13818-1, 2.4.3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Transport Error Indicator
    pub transport_error_indicator: bool,
    /// Payload Unit Start Indicator
    pub payload_unit_start_indicator: bool,
    /// Transport Priority
    pub transport_priority: bool,
    /// Packet Identifier
    pub pid: u16,
    /// Transport Scrambling Control (unused by the demuxer)
    pub transport_scrambling_control: u8,
    /// Adaptation field present
    pub has_adaptation_field: bool,
    /// Payload present
    pub has_payload: bool,
    /// Continuity Counter
    pub continuity_counter: u8,
}

impl PacketHeader {
    /// Number of header bytes after the sync byte.
    pub const LEN: usize = 3;

    /// Decode the header bytes that follow the sync byte.
    pub fn parse(bytes: [u8; Self::LEN]) -> Self {
        let [byte1, byte2, byte3] = bytes;
        Self {
            transport_error_indicator: (byte1 & 0x80) != 0,
            payload_unit_start_indicator: (byte1 & 0x40) != 0,
            transport_priority: (byte1 & 0x20) != 0,
            pid: ((byte1 as u16 & 0x1F) << 8) | byte2 as u16,
            transport_scrambling_control: (byte3 >> 6) & 0x03,
            has_adaptation_field: (byte3 & 0x20) != 0,
            has_payload: (byte3 & 0x10) != 0,
            continuity_counter: byte3 & 0x0F,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_fields() {
        // PUSI, PID 0x101, adaptation + payload, cc 7
        let header = PacketHeader::parse([0x41, 0x01, 0x37]);
        assert!(!header.transport_error_indicator);
        assert!(header.payload_unit_start_indicator);
        assert!(!header.transport_priority);
        assert_eq!(header.pid, 0x0101);
        assert_eq!(header.transport_scrambling_control, 0);
        assert!(header.has_adaptation_field);
        assert!(header.has_payload);
        assert_eq!(header.continuity_counter, 7);
    }

    #[test]
    fn test_header_error_and_max_pid() {
        let header = PacketHeader::parse([0xBF, 0xFF, 0xC0]);
        assert!(header.transport_error_indicator);
        assert!(header.transport_priority);
        assert_eq!(header.pid, PID_NULL);
        assert_eq!(header.transport_scrambling_control, 0x03);
        assert!(!header.has_adaptation_field);
        assert!(!header.has_payload);
    }

    #[test]
    fn test_format_geometry() {
        assert_eq!(PacketFormat::default(), PacketFormat::M2ts192);
        assert_eq!(PacketFormat::M2ts192.stride_from_sync(), TS_PACKET_SIZE);
        assert_eq!(PacketFormat::Ts188.stride_from_sync(), TS_PACKET_SIZE);
        assert_eq!(PacketFormat::Ts204.stride_from_sync(), 204);
    }
}
