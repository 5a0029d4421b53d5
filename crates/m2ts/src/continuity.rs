use crate::config::DemuxMode;
use crate::packet::{PID_SPACE, PacketHeader};

/// Continuity counter status for a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuityStatus {
    /// Counter follows the previous one, or this is the first packet of the PID
    Ok,
    /// Same counter as the previous packet while carrying a payload
    Duplicate,
    /// Counter jumped; the bound reader must drop its partial state
    Discontinuity { expected: u8, actual: u8 },
}

/// Per-PID continuity counter state.
#[derive(Debug)]
pub struct ContinuityTracker {
    mode: DemuxMode,
    /// Last continuity counter value for each PID
    counters: Box<[u8; PID_SPACE]>,
    /// Whether a PID has seen at least one packet
    seen: Box<[bool; PID_SPACE]>,
    duplicate_count: usize,
    discontinuity_count: usize,
}

impl ContinuityTracker {
    pub fn new(mode: DemuxMode) -> Self {
        Self {
            mode,
            counters: Box::new([0; PID_SPACE]),
            seen: Box::new([false; PID_SPACE]),
            duplicate_count: 0,
            discontinuity_count: 0,
        }
    }

    /// Classify a packet and record its counter.
    ///
    /// In relaxed mode every packet is [`ContinuityStatus::Ok`]. In strict
    /// mode the first packet of a PID is treated as if it followed `cc - 1`,
    /// and the stored counter always moves to the packet's value.
    pub fn check(&mut self, header: &PacketHeader) -> ContinuityStatus {
        if self.mode == DemuxMode::Relaxed {
            return ContinuityStatus::Ok;
        }

        let pid_idx = header.pid as usize;
        let cc = header.continuity_counter;
        let previous = if self.seen[pid_idx] {
            Some(self.counters[pid_idx])
        } else {
            None
        };
        self.seen[pid_idx] = true;
        self.counters[pid_idx] = cc;

        let Some(previous) = previous else {
            return ContinuityStatus::Ok;
        };

        if previous == cc {
            if header.has_payload {
                self.duplicate_count += 1;
                ContinuityStatus::Duplicate
            } else {
                ContinuityStatus::Ok
            }
        } else {
            let expected = (previous + 1) & 0x0F;
            if cc == expected {
                ContinuityStatus::Ok
            } else {
                self.discontinuity_count += 1;
                ContinuityStatus::Discontinuity {
                    expected,
                    actual: cc,
                }
            }
        }
    }

    /// Last recorded counter for `pid`, if any packet has been seen.
    #[cfg(test)]
    fn last_counter(&self, pid: u16) -> Option<u8> {
        let pid_idx = pid as usize;
        (pid_idx < PID_SPACE && self.seen[pid_idx]).then(|| self.counters[pid_idx])
    }

    /// Number of duplicate packets observed.
    pub fn duplicate_count(&self) -> usize {
        self.duplicate_count
    }

    /// Number of discontinuities observed.
    pub fn discontinuity_count(&self) -> usize {
        self.discontinuity_count
    }

    pub fn reset(&mut self) {
        self.counters.fill(0);
        self.seen.fill(false);
        self.duplicate_count = 0;
        self.discontinuity_count = 0;
    }
}
