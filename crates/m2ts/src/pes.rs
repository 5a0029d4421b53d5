use bytes::{Buf, BytesMut};
use tracing::{debug, trace};

use crate::output::{Sample, TrackInfo};
use crate::reader::{PayloadCursor, PayloadFlags, PayloadReader, ReaderContext, TrackIdGenerator};
use crate::stream_type::StreamType;
use crate::{M2tsError, Result};

/// Padding stream
pub const STREAM_ID_PADDING: u8 = 0xBE;

const PES_START_CODE_LENGTH: usize = 6;
const OPTIONAL_HEADER_LENGTH: usize = 3;

/// Parse a 33-bit PTS or DTS timestamp from 5 bytes.
///
/// Layout: `[marker(4) | ts32..30 | 1 | ts29..15 | 1 | ts14..0 | 1]`
fn parse_timestamp(data: &[u8]) -> u64 {
    (((data[0] as u64 >> 1) & 0x07) << 30)
        | ((data[1] as u64) << 22)
        | (((data[2] as u64 >> 1) & 0x7F) << 15)
        | ((data[3] as u64) << 7)
        | ((data[4] as u64 >> 1) & 0x7F)
}

/// Check if a stream_id has an optional PES header (PTS/DTS fields).
fn has_optional_pes_header(stream_id: u8) -> bool {
    // ISO 13818-1 Table 2-18
    !matches!(
        stream_id,
        0xBC   // program_stream_map
        | 0xBE // padding_stream
        | 0xBF // private_stream_2
        | 0xF0 // ECM_stream
        | 0xF1 // EMM_stream
        | 0xFF // program_stream_directory
        | 0xF2 // DSMCC_stream
        | 0xF8 // ITU-T Rec. H.222.1 type E
    )
}

fn insufficient(expected: usize, actual: usize) -> M2tsError {
    M2tsError::InsufficientData { expected, actual }
}

/// Parsed PES packet header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PesHeader {
    pub stream_id: u8,
    /// Zero when the packet length is unbounded
    pub pes_packet_length: u16,
    pub pts: Option<u64>,
    pub dts: Option<u64>,
    pub data_alignment_indicator: bool,
    /// Offset to elementary stream data (past the PES header)
    pub payload_offset: usize,
}

impl PesHeader {
    /// Parse a PES header from bytes starting with the 0x000001 start code.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < PES_START_CODE_LENGTH {
            return Err(insufficient(PES_START_CODE_LENGTH, data.len()));
        }
        if data[..3] != [0x00, 0x00, 0x01] {
            return Err(M2tsError::InvalidPesStartCode);
        }

        let stream_id = data[3];
        let pes_packet_length = u16::from_be_bytes([data[4], data[5]]);

        if !has_optional_pes_header(stream_id) {
            return Ok(PesHeader {
                stream_id,
                pes_packet_length,
                pts: None,
                dts: None,
                data_alignment_indicator: false,
                payload_offset: PES_START_CODE_LENGTH,
            });
        }

        let fixed_end = PES_START_CODE_LENGTH + OPTIONAL_HEADER_LENGTH;
        if data.len() < fixed_end {
            return Err(insufficient(fixed_end, data.len()));
        }

        let data_alignment_indicator = (data[6] & 0x04) != 0;
        let pts_dts_flags = (data[7] >> 6) & 0x03;
        let header_end = fixed_end + data[8] as usize;

        let timestamps_end = match pts_dts_flags {
            0b00 => fixed_end,
            0b01 => return Err(M2tsError::InvalidPtsDtsFlags(pts_dts_flags)),
            0b10 => fixed_end + 5,
            _ => fixed_end + 10,
        };
        let required = timestamps_end.max(header_end);
        if data.len() < required {
            return Err(insufficient(required, data.len()));
        }

        let (pts, dts) = match pts_dts_flags {
            0b10 => (Some(parse_timestamp(&data[9..14])), None),
            0b11 => (
                Some(parse_timestamp(&data[9..14])),
                Some(parse_timestamp(&data[14..19])),
            ),
            _ => (None, None),
        };

        Ok(PesHeader {
            stream_id,
            pes_packet_length,
            pts,
            dts,
            data_alignment_indicator,
            payload_offset: header_end,
        })
    }

    /// Total packet size including the start code, if bounded.
    pub fn packet_size(&self) -> Option<usize> {
        (self.pes_packet_length != 0)
            .then(|| PES_START_CODE_LENGTH + self.pes_packet_length as usize)
    }
}

/// Payload reader that reassembles PES packets into [`Sample`]s.
///
/// A packet is complete once its declared length has arrived, or at the next
/// payload unit start when the length is unbounded. Data seen before the
/// first payload unit start is dropped.
#[derive(Debug)]
pub struct PesReader {
    stream_type: StreamType,
    language: Option<String>,
    track_id: Option<u32>,
    buffer: BytesMut,
    random_access: bool,
    started: bool,
}

impl PesReader {
    pub fn new(stream_type: StreamType, language: Option<String>) -> Self {
        Self {
            stream_type,
            language,
            track_id: None,
            buffer: BytesMut::new(),
            random_access: false,
            started: false,
        }
    }

    pub fn track_id(&self) -> Option<u32> {
        self.track_id
    }

    fn declared_size(&self) -> Option<usize> {
        if self.buffer.len() < PES_START_CODE_LENGTH {
            return None;
        }
        match u16::from_be_bytes([self.buffer[4], self.buffer[5]]) {
            0 => None,
            length => Some(PES_START_CODE_LENGTH + length as usize),
        }
    }

    fn flush(&mut self, ctx: &mut ReaderContext<'_>) {
        if !self.started || self.buffer.is_empty() {
            return;
        }
        self.started = false;
        let mut packet = self.buffer.split();

        let header = match PesHeader::parse(&packet) {
            Ok(header) => header,
            Err(error) => {
                trace!(stream_type = ?self.stream_type, %error, "Dropping malformed PES packet");
                return;
            }
        };
        let Some(track_id) = self.track_id else {
            return;
        };

        if let Some(size) = header.packet_size() {
            packet.truncate(size);
        }
        packet.advance(header.payload_offset.min(packet.len()));

        let dts_us = header.dts.map(|dts| ctx.timestamps.adjust_ts_timestamp(dts));
        let pts_us = header.pts.map(|pts| ctx.timestamps.adjust_ts_timestamp(pts));

        ctx.output.sample(Sample {
            track_id,
            stream_type: self.stream_type,
            pts_us,
            dts_us,
            random_access: self.random_access,
            data: packet.freeze(),
        });
    }
}

impl PayloadReader for PesReader {
    fn init(&mut self, ctx: &mut ReaderContext<'_>, track_ids: &mut TrackIdGenerator) {
        let track_id = track_ids.generate_new_id();
        self.track_id = Some(track_id);
        debug!(track_id, stream_type = ?self.stream_type, "PES track created");
        ctx.output.add_track(&TrackInfo {
            track_id,
            stream_type: self.stream_type,
            language: self.language.clone(),
        });
    }

    fn seek(&mut self) {
        self.buffer.clear();
        self.started = false;
    }

    fn consume(
        &mut self,
        payload: &mut PayloadCursor<'_>,
        flags: PayloadFlags,
        ctx: &mut ReaderContext<'_>,
    ) -> Result<()> {
        if flags.payload_unit_start {
            self.flush(ctx);
            self.buffer.clear();
            self.started = true;
            self.random_access = flags.random_access;
        }

        if !self.started {
            payload.advance(payload.remaining());
            return Ok(());
        }

        self.buffer.extend_from_slice(payload.chunk());
        payload.advance(payload.remaining());

        if self
            .declared_size()
            .is_some_and(|size| self.buffer.len() >= size)
        {
            self.flush(ctx);
        }
        Ok(())
    }
}
