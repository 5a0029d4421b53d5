//! Pull-based demultiplexer for M2TS (192-byte unit) MPEG-2 transport streams.
//!
//! The demuxer resolves the Program Association and Program Map Tables at
//! runtime, tracks per-PID continuity, and routes elementary stream payload
//! to [`PayloadReader`]s created by a caller-supplied [`PayloadReaderFactory`].
//! [`DefaultReaderFactory`] reassembles PES packets into [`Sample`]s.
//!
//! ```no_run
//! use m2ts::{
//!     CollectingOutput, DefaultReaderFactory, DemuxerConfig, M2tsDemuxer, ReadResult,
//!     SliceSource, TimestampAdjuster,
//! };
//!
//! # fn main() -> m2ts::Result<()> {
//! let data = std::fs::read("clip.m2ts")?;
//! let mut source = SliceSource::new(data);
//! let mut demuxer = M2tsDemuxer::new(
//!     DemuxerConfig::default(),
//!     DefaultReaderFactory::new(),
//!     TimestampAdjuster::default(),
//!     CollectingOutput::new(),
//! )?;
//! if demuxer.sniff(&mut source)? {
//!     while demuxer.read(&mut source)? == ReadResult::Continue {}
//! }
//! println!("{} samples", demuxer.output().samples.len());
//! # Ok(())
//! # }
//! ```

pub mod adaptation_field;
mod buffer;
pub mod config;
pub mod continuity;
pub mod crc32;
pub mod demuxer;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod output;
pub mod packet;
pub mod pat;
pub mod pes;
pub mod pmt;
pub mod reader;
mod registry;
mod section;
pub mod source;
pub mod stream_type;
pub mod timestamp;

#[cfg(test)]
mod test_utils;

pub use config::{DemuxMode, DemuxerConfig};
pub use crc32::mpeg2_crc32;
pub use demuxer::{DemuxStats, M2tsDemuxer, ReadResult, sniff};
pub use descriptor::{DescriptorIterator, DescriptorRef, EsInfo};
pub use error::M2tsError;
pub use factory::DefaultReaderFactory;
pub use output::{CollectingOutput, DemuxOutput, Sample, TrackInfo};
pub use packet::{PID_NULL, PID_PAT, PacketFormat, PacketHeader};
pub use pes::{PesHeader, PesReader};
pub use reader::{
    PayloadCursor, PayloadFlags, PayloadReader, PayloadReaderFactory, ReaderContext,
    ReaderCreation, TrackIdGenerator,
};
pub use source::{ByteSource, ReadSource, SliceSource};
pub use stream_type::StreamType;
pub use timestamp::TimestampAdjuster;

/// Result type for demuxing operations
pub type Result<T> = std::result::Result<T, M2tsError>;
