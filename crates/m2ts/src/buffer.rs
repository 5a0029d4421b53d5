use crate::packet::{PacketFormat, SYNC_BYTE, TS_PACKET_SIZE};
use crate::source::ByteSource;
use memchr::memchr;
use std::io;

/// Location of one aligned transport packet inside the working buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PacketBounds {
    /// Offset of the sync byte.
    pub sync: usize,
    /// Offset one past the last transport packet byte.
    pub packet_end: usize,
    /// Offset where the next physical unit starts.
    pub unit_end: usize,
}

/// Reusable framing buffer with an explicit read cursor and fill limit.
///
/// Holds a few physical units at a time; bytes between `position` and
/// `limit` are buffered but not yet consumed.
#[derive(Debug)]
pub(crate) struct PacketBuffer {
    data: Box<[u8]>,
    position: usize,
    limit: usize,
    format: PacketFormat,
    /// Bytes passed over while searching for sync, not yet reported.
    skipped: usize,
}

impl PacketBuffer {
    pub fn new(format: PacketFormat, capacity: usize) -> Self {
        debug_assert!(capacity >= 2 * format.unit_size());
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            position: 0,
            limit: 0,
            format,
            skipped: 0,
        }
    }

    #[inline]
    pub fn bytes_left(&self) -> usize {
        self.limit - self.position
    }

    pub fn reset(&mut self) {
        self.position = 0;
        self.limit = 0;
        self.skipped = 0;
    }

    /// Bytes skipped to find a sync byte since the last call.
    ///
    /// Includes bytes dropped while no sync byte was buffered at all.
    pub fn take_skipped(&mut self) -> usize {
        std::mem::take(&mut self.skipped)
    }

    /// Make at least one physical unit available past the cursor.
    ///
    /// Returns `Ok(false)` when the source ends before a full unit could be
    /// buffered.
    pub fn fill<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> io::Result<bool> {
        let unit_size = self.format.unit_size();
        if self.data.len() - self.position < unit_size {
            let left = self.bytes_left();
            self.data.copy_within(self.position..self.limit, 0);
            self.position = 0;
            self.limit = left;
        }

        while self.bytes_left() < unit_size {
            let read = source.read(&mut self.data[self.limit..])?;
            if read == 0 {
                return Ok(false);
            }
            self.limit += read;
        }
        Ok(true)
    }

    /// Locate the next packet, resynchronizing on the sync byte if the
    /// expected position does not hold one.
    ///
    /// Returns `None` when the packet is not fully buffered yet; the cursor
    /// is then left at the start of the candidate unit so the next call sees
    /// it again once more bytes have arrived.
    pub fn next_packet(&mut self) -> Option<PacketBounds> {
        let start = self.position;
        let prefix = self.format.prefix_len();
        let expected_sync = start + prefix;
        if expected_sync >= self.limit {
            return None;
        }

        let sync = if self.data[expected_sync] == SYNC_BYTE {
            Some(expected_sync)
        } else {
            memchr(SYNC_BYTE, &self.data[expected_sync..self.limit]).map(|o| expected_sync + o)
        };

        let Some(sync) = sync else {
            self.position = self.limit.saturating_sub(prefix).max(start);
            self.skipped += self.position - start;
            return None;
        };
        self.skipped += sync - expected_sync;

        let unit_end = sync + self.format.stride_from_sync();
        if unit_end > self.limit {
            self.position = sync - prefix;
            return None;
        }

        self.position = sync + 1;
        Some(PacketBounds {
            sync,
            packet_end: sync + TS_PACKET_SIZE,
            unit_end,
        })
    }

    /// The transport packet (sync byte included) described by `bounds`.
    #[inline]
    pub fn packet(&self, bounds: &PacketBounds) -> &[u8] {
        &self.data[bounds.sync..bounds.packet_end]
    }

    /// Mark the unit described by `bounds` as consumed.
    #[inline]
    pub fn finish(&mut self, bounds: &PacketBounds) {
        debug_assert!(bounds.unit_end <= self.limit);
        self.position = bounds.unit_end;
    }
}
