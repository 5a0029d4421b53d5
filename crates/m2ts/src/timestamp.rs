/// PTS/DTS values are 33-bit counters at 90 kHz.
pub const MAX_PTS_PLUS_ONE: i64 = 1 << 33;

/// Convert a 90 kHz timestamp to microseconds.
pub const fn pts_to_us(pts: i64) -> i64 {
    pts * 1_000_000 / 90_000
}

/// Maps wrapping 33-bit transport timestamps onto a continuous microsecond
/// timeline.
///
/// The first adjusted timestamp after construction or [`reset`](Self::reset)
/// lands on the origin; later timestamps keep their distance to it. Each
/// incoming timestamp is unwrapped to the candidate closest to the previous
/// one, so the 33-bit rollover is invisible to callers.
#[derive(Debug, Clone)]
pub struct TimestampAdjuster {
    origin_us: i64,
    offset_us: Option<i64>,
    /// Last unwrapped timestamp, 90 kHz
    last_pts: Option<i64>,
}

impl TimestampAdjuster {
    pub fn new(origin_us: i64) -> Self {
        Self {
            origin_us,
            offset_us: None,
            last_pts: None,
        }
    }

    /// Forget the current timeline; the next timestamp lands on `origin_us`.
    pub fn reset(&mut self, origin_us: i64) {
        self.origin_us = origin_us;
        self.offset_us = None;
        self.last_pts = None;
    }

    pub fn origin_us(&self) -> i64 {
        self.origin_us
    }

    /// Offset applied to unwrapped timestamps, once known.
    pub fn offset_us(&self) -> Option<i64> {
        self.offset_us
    }

    /// Adjust a raw 33-bit 90 kHz timestamp.
    pub fn adjust_ts_timestamp(&mut self, pts: u64) -> i64 {
        let pts = (pts as i64) & (MAX_PTS_PLUS_ONE - 1);
        let unwrapped = match self.last_pts {
            Some(last) => {
                // Pick the wrap count that puts pts closest to the last value.
                let wraps = (last + MAX_PTS_PLUS_ONE / 2).div_euclid(MAX_PTS_PLUS_ONE);
                let below = pts + MAX_PTS_PLUS_ONE * (wraps - 1);
                let above = pts + MAX_PTS_PLUS_ONE * wraps;
                if (below - last).abs() < (above - last).abs() {
                    below
                } else {
                    above
                }
            }
            None => pts,
        };
        self.last_pts = Some(unwrapped);
        self.adjust_sample_timestamp(pts_to_us(unwrapped))
    }

    /// Adjust a timestamp already expressed in microseconds.
    pub fn adjust_sample_timestamp(&mut self, time_us: i64) -> i64 {
        let offset = *self.offset_us.get_or_insert(self.origin_us - time_us);
        time_us + offset
    }
}

impl Default for TimestampAdjuster {
    fn default() -> Self {
        Self::new(0)
    }
}
