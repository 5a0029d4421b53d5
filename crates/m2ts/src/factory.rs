use crate::descriptor::EsInfo;
use crate::pes::PesReader;
use crate::reader::{PayloadReaderFactory, ReaderCreation};
use crate::stream_type::StreamType;

/// Factory that hands out a [`PesReader`] for audio, video and ID3 streams.
///
/// Splice information, private data and unidentified streams are reported as
/// unsupported.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultReaderFactory;

impl DefaultReaderFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn supports(stream_type: StreamType) -> bool {
        stream_type.is_audio() || stream_type.is_video() || stream_type == StreamType::Id3
    }
}

impl PayloadReaderFactory for DefaultReaderFactory {
    fn create(&mut self, stream_type: StreamType, es_info: &EsInfo) -> ReaderCreation {
        if !Self::supports(stream_type) {
            return ReaderCreation::Unsupported;
        }
        ReaderCreation::Supported(Box::new(PesReader::new(
            stream_type,
            es_info.language.clone(),
        )))
    }
}
