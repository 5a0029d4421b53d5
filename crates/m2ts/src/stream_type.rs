/// Elementary stream type as declared in the PMT or resolved from descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamType {
    /// MPEG-2 video / H.262 (0x02)
    Mpeg2Video,
    /// MPEG-1 audio (0x03)
    Mpeg1Audio,
    /// MPEG-2 half sample rate audio (0x04)
    Mpeg2Audio,
    /// PES private data; the real type is carried by descriptors (0x06)
    PrivateData,
    /// AAC with ADTS framing (0x0F)
    AdtsAac,
    /// ID3 timed metadata (0x15)
    Id3,
    /// H.264 / AVC (0x1B)
    H264,
    /// H.265 / HEVC (0x24)
    H265,
    /// AC-3 (0x81)
    Ac3,
    /// HDMV DTS (0x82)
    HdmvDts,
    /// SCTE-35 splice information (0x86)
    SpliceInfo,
    /// Enhanced AC-3 (0x87)
    Eac3,
    /// DTS (0x8A)
    Dts,
    /// Any other code
    Unknown(u8),
    /// Declared as private data and no descriptor identified it
    Undetermined,
}

impl StreamType {
    /// Wire code, or `None` for [`StreamType::Undetermined`].
    pub const fn code(self) -> Option<u8> {
        Some(match self {
            Self::Mpeg2Video => 0x02,
            Self::Mpeg1Audio => 0x03,
            Self::Mpeg2Audio => 0x04,
            Self::PrivateData => 0x06,
            Self::AdtsAac => 0x0F,
            Self::Id3 => 0x15,
            Self::H264 => 0x1B,
            Self::H265 => 0x24,
            Self::Ac3 => 0x81,
            Self::HdmvDts => 0x82,
            Self::SpliceInfo => 0x86,
            Self::Eac3 => 0x87,
            Self::Dts => 0x8A,
            Self::Unknown(code) => code,
            Self::Undetermined => return None,
        })
    }

    /// Base for track ids when tracks are keyed by stream type.
    ///
    /// Undetermined streams use 0x100, outside the range of wire codes.
    pub const fn track_base(self) -> u32 {
        match self.code() {
            Some(code) => code as u32,
            None => 0x100,
        }
    }

    pub const fn is_video(self) -> bool {
        matches!(self, Self::Mpeg2Video | Self::H264 | Self::H265)
    }

    pub const fn is_audio(self) -> bool {
        matches!(
            self,
            Self::Mpeg1Audio
                | Self::Mpeg2Audio
                | Self::AdtsAac
                | Self::Ac3
                | Self::HdmvDts
                | Self::Eac3
                | Self::Dts
        )
    }
}

impl From<u8> for StreamType {
    fn from(code: u8) -> Self {
        match code {
            0x02 => Self::Mpeg2Video,
            0x03 => Self::Mpeg1Audio,
            0x04 => Self::Mpeg2Audio,
            0x06 => Self::PrivateData,
            0x0F => Self::AdtsAac,
            0x15 => Self::Id3,
            0x1B => Self::H264,
            0x24 => Self::H265,
            0x81 => Self::Ac3,
            0x82 => Self::HdmvDts,
            0x86 => Self::SpliceInfo,
            0x87 => Self::Eac3,
            0x8A => Self::Dts,
            other => Self::Unknown(other),
        }
    }
}
