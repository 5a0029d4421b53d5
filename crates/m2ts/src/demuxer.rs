use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::adaptation_field::AdaptationField;
use crate::buffer::PacketBuffer;
use crate::config::{DemuxMode, DemuxerConfig};
use crate::continuity::{ContinuityStatus, ContinuityTracker};
use crate::descriptor::EsInfo;
use crate::output::DemuxOutput;
use crate::packet::{PID_PAT, PacketFormat, PacketHeader, SYNC_BYTE, TS_PACKET_SIZE};
use crate::pat::Pat;
use crate::pmt::Pmt;
use crate::reader::{
    PayloadCursor, PayloadFlags, PayloadReaderFactory, ReaderContext, ReaderCreation,
    TRACK_ID_INCREMENT, TrackIdGenerator,
};
use crate::registry::{ReaderId, ReaderRegistry, Slot, TableKind, TrackKey};
use crate::source::ByteSource;
use crate::stream_type::StreamType;
use crate::timestamp::TimestampAdjuster;
use crate::{M2tsError, Result};

/// Number of physical units checked by [`sniff`].
pub const SNIFF_PACKET_COUNT: usize = 5;

/// Offset of the payload in a packet without adaptation field.
const PAYLOAD_OFFSET: usize = 1 + PacketHeader::LEN;

/// Outcome of a single [`M2tsDemuxer::read`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadResult {
    /// Call `read` again
    Continue,
    /// The source is exhausted
    EndOfInput,
}

/// Counters collected while demuxing. Cleared on seek.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DemuxStats {
    /// Packets located in the input, including dropped ones
    pub packets: usize,
    /// Packets dropped because transport_error_indicator was set
    pub dropped_errors: usize,
    /// Packets dropped as duplicates
    pub duplicates: usize,
    /// Continuity counter jumps
    pub discontinuities: usize,
    /// Bytes skipped to find a sync byte
    pub resync_bytes: usize,
    /// PSI sections handed to the table parsers
    pub sections: usize,
    /// PSI sections discarded for a bad CRC
    pub crc_failures: usize,
}

/// Check whether `source` starts with [`SNIFF_PACKET_COUNT`] units of the
/// given layout. Nothing is consumed; the peek position is reset afterwards.
pub fn sniff<S: ByteSource + ?Sized>(format: PacketFormat, source: &mut S) -> Result<bool> {
    let result = sniff_units(format, source);
    source.reset_peek();
    result
}

fn sniff_units<S: ByteSource + ?Sized>(format: PacketFormat, source: &mut S) -> Result<bool> {
    let mut sync = [0u8; 1];
    for _ in 0..SNIFF_PACKET_COUNT {
        if !source.advance_peek(format.prefix_len())? || !source.peek_fully(&mut sync)? {
            return Ok(false);
        }
        if sync[0] != SYNC_BYTE {
            return Ok(false);
        }
        if !source.advance_peek(format.stride_from_sync() - 1)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Pull-based M2TS demultiplexer.
///
/// Each [`read`](Self::read) consumes at most one physical unit. The PAT is
/// bound at PID 0 from the start; PMTs and elementary stream readers are
/// bound as the tables are parsed. Payload for PIDs nothing is bound to is
/// dropped.
pub struct M2tsDemuxer<O, F> {
    mode: DemuxMode,
    packet_format: PacketFormat,
    output: O,
    factory: F,
    timestamps: TimestampAdjuster,
    buffer: PacketBuffer,
    continuity: ContinuityTracker,
    registry: ReaderRegistry,
    /// Relaxed mode: shared reader for ID3 streams, created with the first PMT
    metadata_reader: Option<ReaderId>,
    tracks_ended: bool,
    stats: DemuxStats,
}

impl<O: DemuxOutput, F: PayloadReaderFactory> M2tsDemuxer<O, F> {
    /// Create a demuxer and declare the output unseekable.
    pub fn new(
        config: DemuxerConfig,
        factory: F,
        timestamps: TimestampAdjuster,
        mut output: O,
    ) -> Result<Self> {
        config.validate()?;
        output.declare_unseekable();
        Ok(Self {
            mode: config.mode,
            packet_format: config.packet_format,
            output,
            factory,
            timestamps,
            buffer: PacketBuffer::new(config.packet_format, config.buffer_capacity()),
            continuity: ContinuityTracker::new(config.mode),
            registry: ReaderRegistry::new(config.validate_crc),
            metadata_reader: None,
            tracks_ended: false,
            stats: DemuxStats::default(),
        })
    }

    /// [`sniff`] with this demuxer's packet layout.
    pub fn sniff<S: ByteSource + ?Sized>(&self, source: &mut S) -> Result<bool> {
        sniff(self.packet_format, source)
    }

    /// Advance by at most one physical unit.
    pub fn read<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<ReadResult> {
        if !self.buffer.fill(source)? {
            return Ok(ReadResult::EndOfInput);
        }

        let next = self.buffer.next_packet();
        let skipped = self.buffer.take_skipped();
        if skipped > 0 {
            self.stats.resync_bytes += skipped;
            trace!(skipped, "Skipped bytes searching for sync byte");
        }
        let Some(bounds) = next else {
            trace!("Waiting for more data to complete packet");
            return Ok(ReadResult::Continue);
        };

        let mut packet = [0u8; TS_PACKET_SIZE];
        packet.copy_from_slice(self.buffer.packet(&bounds));
        self.buffer.finish(&bounds);

        self.process_packet(&packet)?;
        Ok(ReadResult::Continue)
    }

    /// Drop all stream state. Tables are rediscovered from the next PAT and
    /// elementary payload is dropped until then.
    pub fn seek(&mut self, position: u64, time_us: i64) {
        debug!(position, time_us, "Resetting demuxer");
        self.timestamps.reset(0);
        self.buffer.reset();
        self.continuity.reset();
        self.registry.reset();
        self.metadata_reader = None;
        self.tracks_ended = false;
        self.stats = DemuxStats::default();
    }

    /// Counters since construction or the last seek.
    pub fn stats(&self) -> DemuxStats {
        DemuxStats {
            duplicates: self.continuity.duplicate_count(),
            discontinuities: self.continuity.discontinuity_count(),
            ..self.stats
        }
    }

    /// The output sink.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// The output sink, mutably.
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Consume the demuxer and return its output sink.
    pub fn into_output(self) -> O {
        self.output
    }

    /// The adjuster applied to sample timestamps.
    pub fn timestamp_adjuster(&self) -> &TimestampAdjuster {
        &self.timestamps
    }

    fn process_packet(&mut self, packet: &[u8; TS_PACKET_SIZE]) -> Result<()> {
        self.stats.packets += 1;

        let header = PacketHeader::parse([packet[1], packet[2], packet[3]]);
        let pid = header.pid;
        if header.transport_error_indicator {
            self.stats.dropped_errors += 1;
            trace!(pid, "Dropping packet with transport error");
            return Ok(());
        }

        let discontinuity = match self.continuity.check(&header) {
            ContinuityStatus::Ok => false,
            ContinuityStatus::Duplicate => {
                trace!(pid, cc = header.continuity_counter, "Dropping duplicate packet");
                return Ok(());
            }
            ContinuityStatus::Discontinuity { expected, actual } => {
                warn!(pid, expected, actual, "Continuity counter discontinuity");
                true
            }
        };

        let mut offset = PAYLOAD_OFFSET;
        let mut random_access = false;
        if header.has_adaptation_field {
            let length = packet[PAYLOAD_OFFSET] as usize;
            offset = (PAYLOAD_OFFSET + 1 + length).min(TS_PACKET_SIZE);
            if let Some(field) = AdaptationField::parse(&packet[PAYLOAD_OFFSET + 1..offset]) {
                random_access = field.random_access_indicator;
                if field.discontinuity_indicator {
                    debug!(pid, "Discontinuity indicator set");
                }
                if let Some(pcr) = field.pcr() {
                    trace!(pid, pcr = pcr.as_27mhz(), "Program clock reference");
                }
            }
        }

        if !header.has_payload {
            return Ok(());
        }
        if discontinuity {
            self.registry.reset_pid(pid);
        }

        let payload = &packet[offset..];
        let flags = PayloadFlags {
            payload_unit_start: header.payload_unit_start_indicator,
            random_access,
        };

        match self.registry.slot_mut(pid) {
            None => Ok(()),
            Some(Slot::Table { kind, assembler }) => {
                let kind = *kind;
                let assembled = assembler.push(payload, flags.payload_unit_start);
                self.stats.crc_failures += assembled.crc_failures;
                for section in assembled.sections {
                    self.stats.sections += 1;
                    self.handle_section(pid, kind, section);
                }
                Ok(())
            }
            Some(Slot::Stream(id)) => {
                let id = *id;
                let Some(reader) = self.registry.reader_mut(id) else {
                    return Ok(());
                };
                let mut ctx = ReaderContext {
                    output: &mut self.output,
                    timestamps: &mut self.timestamps,
                };
                let mut cursor = PayloadCursor::new(payload);
                reader
                    .consume(&mut cursor, flags, &mut ctx)
                    .map_err(|error| M2tsError::reader(pid, error))?;
                assert!(
                    cursor.position() <= cursor.limit(),
                    "payload reader for PID {pid:#06x} read past the packet end"
                );
                Ok(())
            }
        }
    }

    fn handle_section(&mut self, pid: u16, kind: TableKind, section: Bytes) {
        match kind {
            TableKind::Pat => match Pat::parse(&section) {
                Some(pat) => self.handle_pat(pat),
                None => trace!(pid, table_id = section[0], "Ignoring non-PAT section"),
            },
            TableKind::Pmt => match Pmt::parse(section) {
                Some(pmt) => self.handle_pmt(pid, pmt),
                None => trace!(pid, "Ignoring non-PMT section"),
            },
        }
    }

    fn handle_pat(&mut self, pat: Pat) {
        debug!(
            transport_stream_id = pat.transport_stream_id,
            programs = pat.programs.len(),
            "Parsed PAT"
        );
        for program in pat.programs {
            if self.registry.bind_table(program.pmt_pid, TableKind::Pmt) {
                debug!(
                    program_number = program.program_number,
                    pmt_pid = program.pmt_pid,
                    "Bound PMT reader"
                );
            }
        }
    }

    fn handle_pmt(&mut self, pmt_pid: u16, pmt: Pmt) {
        let relaxed = self.mode == DemuxMode::Relaxed;
        debug!(
            pmt_pid,
            program_number = pmt.program_number,
            streams = pmt.streams.len(),
            "Parsed PMT"
        );

        if relaxed && self.metadata_reader.is_none() {
            self.metadata_reader = self.create_reader(
                StreamType::Id3,
                &EsInfo::empty(StreamType::Id3),
                StreamType::Id3.track_base(),
            );
        }

        for stream in pmt.streams {
            let key = if relaxed {
                TrackKey::StreamType(stream.stream_type)
            } else {
                TrackKey::Pid(stream.elementary_pid)
            };
            if !self.registry.record_track_key(key) {
                trace!(pid = stream.elementary_pid, ?key, "Track already bound");
                continue;
            }

            let reader = if relaxed && stream.stream_type == StreamType::Id3 {
                self.metadata_reader
            } else {
                let base = match key {
                    TrackKey::Pid(pid) => pid as u32,
                    TrackKey::StreamType(stream_type) => stream_type.track_base(),
                };
                self.create_reader(stream.stream_type, &stream.es_info, base)
            };

            let Some(id) = reader else {
                debug!(
                    pid = stream.elementary_pid,
                    stream_type = ?stream.stream_type,
                    "Unsupported stream type"
                );
                continue;
            };
            if self.registry.bind_stream(stream.elementary_pid, id) {
                debug!(
                    pid = stream.elementary_pid,
                    stream_type = ?stream.stream_type,
                    language = ?stream.es_info.language,
                    "Bound payload reader"
                );
            }
        }

        if !self.tracks_ended {
            self.tracks_ended = true;
            debug!("All tracks announced");
            self.output.end_tracks();
        }
        if !relaxed {
            self.registry.unbind(PID_PAT);
            self.registry.unbind(pmt_pid);
        }
    }

    fn create_reader(
        &mut self,
        stream_type: StreamType,
        es_info: &EsInfo,
        track_base: u32,
    ) -> Option<ReaderId> {
        match self.factory.create(stream_type, es_info) {
            ReaderCreation::Unsupported => None,
            ReaderCreation::Supported(mut reader) => {
                let mut ctx = ReaderContext {
                    output: &mut self.output,
                    timestamps: &mut self.timestamps,
                };
                reader.init(
                    &mut ctx,
                    &mut TrackIdGenerator::new(track_base, TRACK_ID_INCREMENT),
                );
                Some(self.registry.add_reader(reader))
            }
        }
    }
}
