use bytes::{Buf, Bytes};

use crate::stream_type::StreamType;

/// Registration descriptor (tag 0x05)
pub const TAG_REGISTRATION: u8 = 0x05;
/// ISO 639 language descriptor (tag 0x0A)
pub const TAG_ISO_639_LANGUAGE: u8 = 0x0A;
/// AC-3 audio descriptor (tag 0x6A)
pub const TAG_AC3: u8 = 0x6A;
/// Enhanced AC-3 audio descriptor (tag 0x7A)
pub const TAG_EAC3: u8 = 0x7A;
/// DTS audio descriptor (tag 0x7B)
pub const TAG_DTS: u8 = 0x7B;

/// Pack a four character code the way registration descriptors carry it.
pub const fn format_identifier(code: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*code)
}

pub const FORMAT_AC3: u32 = format_identifier(b"AC-3");
pub const FORMAT_EAC3: u32 = format_identifier(b"EAC3");
pub const FORMAT_HEVC: u32 = format_identifier(b"HEVC");

/// Zero-copy descriptor reference.
#[derive(Debug, Clone)]
pub struct DescriptorRef {
    pub tag: u8,
    pub data: Bytes,
}

/// Iterator over descriptors in a TLV descriptor loop.
///
/// Each descriptor is `[tag: u8][length: u8][data: length bytes]`. A body
/// whose declared length runs past the loop is truncated to the loop end and
/// ends the iteration.
#[derive(Debug, Clone)]
pub struct DescriptorIterator {
    data: Bytes,
}

impl DescriptorIterator {
    /// Create a new descriptor iterator from a descriptor loop byte sequence.
    pub fn new(data: Bytes) -> Self {
        DescriptorIterator { data }
    }
}

impl Iterator for DescriptorIterator {
    type Item = DescriptorRef;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.remaining() < 2 {
            self.data.advance(self.data.remaining());
            return None;
        }
        let tag = self.data.get_u8();
        let length = (self.data.get_u8() as usize).min(self.data.remaining());
        let data = self.data.split_to(length);
        Some(DescriptorRef { tag, data })
    }
}

/// Stream information gathered from an elementary stream's descriptor loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsInfo {
    /// Stream type implied by the descriptors, or `Undetermined`
    pub stream_type: StreamType,
    /// ISO 639 language code
    pub language: Option<String>,
    /// The raw descriptor loop
    pub descriptors: Bytes,
}

impl EsInfo {
    /// Info for a stream with no descriptors.
    pub fn empty(stream_type: StreamType) -> Self {
        Self {
            stream_type,
            language: None,
            descriptors: Bytes::new(),
        }
    }
}

/// Walk an ES-info descriptor loop and resolve stream type and language.
///
/// `descriptors` must be exactly the loop; later descriptors override the
/// stream type set by earlier ones.
pub fn read_es_info(descriptors: Bytes) -> EsInfo {
    let mut stream_type = StreamType::Undetermined;
    let mut language = None;

    for descriptor in DescriptorIterator::new(descriptors.clone()) {
        match descriptor.tag {
            TAG_REGISTRATION => {
                if let Some(identifier) = parse_registration_descriptor(&descriptor.data) {
                    match identifier {
                        FORMAT_AC3 => stream_type = StreamType::Ac3,
                        FORMAT_EAC3 => stream_type = StreamType::Eac3,
                        FORMAT_HEVC => stream_type = StreamType::H265,
                        _ => {}
                    }
                }
            }
            TAG_AC3 => stream_type = StreamType::Ac3,
            TAG_EAC3 => stream_type = StreamType::Eac3,
            TAG_DTS => stream_type = StreamType::Dts,
            TAG_ISO_639_LANGUAGE => {
                // Audio type is ignored.
                if let Some(code) = parse_iso639_language(&descriptor.data) {
                    language = Some(code);
                }
            }
            _ => {}
        }
    }

    EsInfo {
        stream_type,
        language,
        descriptors,
    }
}

/// Parse a registration descriptor (tag 0x05).
///
/// Returns the packed format_identifier if the body holds at least 4 bytes.
pub fn parse_registration_descriptor(data: &[u8]) -> Option<u32> {
    let mut data = data;
    (data.remaining() >= 4).then(|| data.get_u32())
}

/// Parse the first language of an ISO 639 language descriptor (tag 0x0A).
pub fn parse_iso639_language(data: &[u8]) -> Option<String> {
    let code = data.get(..3)?;
    let code = String::from_utf8_lossy(code);
    let trimmed = code.trim_matches(|c: char| c <= ' ');
    Some(trimmed.to_owned())
}
