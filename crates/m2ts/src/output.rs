//! Sink for everything the demuxer and its payload readers produce.

use bytes::Bytes;

use crate::stream_type::StreamType;

/// Description of a discovered elementary stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub track_id: u32,
    pub stream_type: StreamType,
    pub language: Option<String>,
}

/// One reassembled access unit handed out by a payload reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub track_id: u32,
    pub stream_type: StreamType,
    /// Presentation time in microseconds, after timestamp adjustment
    pub pts_us: Option<i64>,
    /// Decode time in microseconds, after timestamp adjustment
    pub dts_us: Option<i64>,
    /// Set when the first packet of the sample carried the random access indicator
    pub random_access: bool,
    pub data: Bytes,
}

/// Receiver of demuxer output.
///
/// The demuxer calls [`declare_unseekable`](DemuxOutput::declare_unseekable)
/// once at construction and [`end_tracks`](DemuxOutput::end_tracks) once per
/// lifetime. Track and sample callbacks come from payload readers.
pub trait DemuxOutput {
    fn declare_unseekable(&mut self);

    fn end_tracks(&mut self);

    fn add_track(&mut self, _track: &TrackInfo) {}

    fn sample(&mut self, _sample: Sample) {}
}

impl<T: DemuxOutput + ?Sized> DemuxOutput for &mut T {
    fn declare_unseekable(&mut self) {
        (**self).declare_unseekable();
    }

    fn end_tracks(&mut self) {
        (**self).end_tracks();
    }

    fn add_track(&mut self, track: &TrackInfo) {
        (**self).add_track(track);
    }

    fn sample(&mut self, sample: Sample) {
        (**self).sample(sample);
    }
}

/// Output that keeps everything in memory.
#[derive(Debug, Default, Clone)]
pub struct CollectingOutput {
    pub unseekable: bool,
    pub end_tracks_count: usize,
    pub tracks: Vec<TrackInfo>,
    pub samples: Vec<Sample>,
}

impl CollectingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples of one track, in delivery order.
    pub fn samples_for(&self, track_id: u32) -> impl Iterator<Item = &Sample> {
        self.samples.iter().filter(move |s| s.track_id == track_id)
    }
}

impl DemuxOutput for CollectingOutput {
    fn declare_unseekable(&mut self) {
        self.unseekable = true;
    }

    fn end_tracks(&mut self) {
        self.end_tracks_count += 1;
    }

    fn add_track(&mut self, track: &TrackInfo) {
        self.tracks.push(track.clone());
    }

    fn sample(&mut self, sample: Sample) {
        self.samples.push(sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(track_id: u32) -> Sample {
        Sample {
            track_id,
            stream_type: StreamType::AdtsAac,
            pts_us: Some(0),
            dts_us: None,
            random_access: false,
            data: Bytes::from_static(b"frame"),
        }
    }

    fn announce<O: DemuxOutput>(mut output: O) {
        output.declare_unseekable();
        output.end_tracks();
        output.sample(sample(1));
    }

    #[test]
    fn test_collecting_output() {
        let mut output = CollectingOutput::new();
        announce(&mut output);
        output.sample(sample(2));
        output.sample(sample(1));

        assert!(output.unseekable);
        assert_eq!(output.end_tracks_count, 1);
        assert_eq!(output.samples_for(1).count(), 2);
        assert_eq!(output.samples_for(2).count(), 1);
    }
}
