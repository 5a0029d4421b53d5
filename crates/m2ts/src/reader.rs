//! Contract between the demuxer and per-stream payload readers.
//!
//! The demuxer owns every reader. The output sink and the timestamp adjuster
//! are lent to a reader through [`ReaderContext`] for the duration of a call
//! and must not be retained.

use bytes::Buf;

use crate::Result;
use crate::descriptor::EsInfo;
use crate::output::DemuxOutput;
use crate::stream_type::StreamType;
use crate::timestamp::TimestampAdjuster;

/// Track ids handed out by one generator are `base + n * increment`.
pub const TRACK_ID_INCREMENT: u32 = 8192;

/// Per-packet flags passed along with a payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayloadFlags {
    /// The payload starts a new PES packet or PSI section
    pub payload_unit_start: bool,
    /// The adaptation field set random_access_indicator
    pub random_access: bool,
}

/// Payload of a single transport packet.
///
/// Reading past the end of the packet panics.
#[derive(Debug)]
pub struct PayloadCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> PayloadCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Length of the payload; the cursor never moves past it.
    pub fn limit(&self) -> usize {
        self.data.len()
    }
}

impl Buf for PayloadCursor<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    fn chunk(&self) -> &[u8] {
        &self.data[self.position..]
    }

    fn advance(&mut self, cnt: usize) {
        assert!(
            cnt <= self.remaining(),
            "cannot advance past the payload end: {} > {}",
            cnt,
            self.remaining()
        );
        self.position += cnt;
    }
}

/// Borrowed collaborators available to a reader during a call.
pub struct ReaderContext<'a> {
    pub output: &'a mut dyn DemuxOutput,
    pub timestamps: &'a mut TimestampAdjuster,
}

/// Hands out globally unique track ids for one track key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackIdGenerator {
    base: u32,
    increment: u32,
    next: u32,
    current: Option<u32>,
}

impl TrackIdGenerator {
    pub fn new(base: u32, increment: u32) -> Self {
        Self {
            base,
            increment,
            next: base,
            current: None,
        }
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn generate_new_id(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.wrapping_add(self.increment);
        self.current = Some(id);
        id
    }

    /// Last id handed out.
    pub fn track_id(&self) -> Option<u32> {
        self.current
    }
}

/// Consumer of one elementary stream's packet payloads.
pub trait PayloadReader {
    /// Called once, right after the reader is bound to a PID.
    fn init(&mut self, ctx: &mut ReaderContext<'_>, track_ids: &mut TrackIdGenerator);

    /// Drop any partially assembled data.
    fn seek(&mut self);

    /// Consume the payload of one packet. The cursor must not be advanced
    /// past its limit.
    fn consume(
        &mut self,
        payload: &mut PayloadCursor<'_>,
        flags: PayloadFlags,
        ctx: &mut ReaderContext<'_>,
    ) -> Result<()>;
}

/// Outcome of asking a factory for a reader.
pub enum ReaderCreation {
    Supported(Box<dyn PayloadReader>),
    Unsupported,
}

impl std::fmt::Debug for ReaderCreation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Supported(_) => f.write_str("Supported(..)"),
            Self::Unsupported => f.write_str("Unsupported"),
        }
    }
}

/// Creates payload readers for stream types found in the PMT.
pub trait PayloadReaderFactory {
    fn create(&mut self, stream_type: StreamType, es_info: &EsInfo) -> ReaderCreation;
}

impl<F: PayloadReaderFactory + ?Sized> PayloadReaderFactory for &mut F {
    fn create(&mut self, stream_type: StreamType, es_info: &EsInfo) -> ReaderCreation {
        (**self).create(stream_type, es_info)
    }
}
