use crate::{M2tsError, Result, packet::PacketFormat};

/// How continuity counters and track keys are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemuxMode {
    /// Per-PID continuity checks; tracks are keyed by elementary PID and the
    /// tables are parsed once.
    #[default]
    Strict,
    /// No continuity checks; tracks are keyed by stream type and tables stay
    /// bound so re-announcements are reprocessed. Meant for inputs that are a
    /// concatenation of independently continuous segments.
    Relaxed,
}

/// Demuxer configuration.
#[derive(Debug, Clone)]
pub struct DemuxerConfig {
    pub mode: DemuxMode,
    pub packet_format: PacketFormat,
    /// Whether to validate CRC-32/MPEG-2 on PAT/PMT sections
    pub validate_crc: bool,
    /// Capacity of the framing buffer, in physical units
    pub buffer_packets: usize,
}

impl Default for DemuxerConfig {
    fn default() -> Self {
        Self {
            mode: DemuxMode::Strict,
            packet_format: PacketFormat::M2ts192,
            validate_crc: true,
            buffer_packets: Self::DEFAULT_BUFFER_PACKETS,
        }
    }
}

impl DemuxerConfig {
    pub const DEFAULT_BUFFER_PACKETS: usize = 5;
    pub const MIN_BUFFER_PACKETS: usize = 2;

    pub fn new() -> Self {
        Self::default()
    }

    /// Set the continuity / track keying mode.
    pub fn with_mode(mut self, mode: DemuxMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the physical unit layout.
    pub fn with_packet_format(mut self, format: PacketFormat) -> Self {
        self.packet_format = format;
        self
    }

    /// Enable or disable CRC-32/MPEG-2 validation on PAT/PMT sections.
    pub fn with_crc_validation(mut self, enable: bool) -> Self {
        self.validate_crc = enable;
        self
    }

    /// Set the framing buffer capacity in physical units.
    pub fn with_buffer_packets(mut self, packets: usize) -> Self {
        self.buffer_packets = packets;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer_packets < Self::MIN_BUFFER_PACKETS {
            return Err(M2tsError::InvalidConfig(format!(
                "buffer must hold at least {} packets, got {}",
                Self::MIN_BUFFER_PACKETS,
                self.buffer_packets
            )));
        }
        Ok(())
    }

    pub(crate) fn buffer_capacity(&self) -> usize {
        self.buffer_packets * self.packet_format.unit_size()
    }
}
