//! Error types for the M2TS demuxer.
//!
//! Malformed container data is recovered locally and never shows up here;
//! these variants cover I/O failures, bad configuration and errors raised by
//! externally supplied payload readers.

use thiserror::Error;

/// Errors that can occur while demultiplexing.
#[derive(Error, Debug)]
pub enum M2tsError {
    /// An I/O error occurred while reading from the byte source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The demuxer configuration is not usable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A payload reader failed while consuming the payload of `pid`.
    #[error("payload reader for PID {pid:#06x} failed: {source}")]
    Reader {
        /// PID whose payload was being consumed.
        pid: u16,
        /// Error reported by the reader.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A PES packet did not start with the 0x000001 prefix.
    #[error("invalid PES start code")]
    InvalidPesStartCode,

    /// PTS_DTS_flags used the forbidden value 0b01.
    #[error("invalid PTS_DTS_flags: {0:#04b}")]
    InvalidPtsDtsFlags(u8),

    /// Not enough bytes were available to decode a structure.
    #[error("insufficient data: expected {expected} bytes, got {actual}")]
    InsufficientData {
        /// Number of bytes required.
        expected: usize,
        /// Number of bytes available.
        actual: usize,
    },
}

impl M2tsError {
    /// Wrap an arbitrary reader error, tagging it with the PID being consumed.
    pub fn reader<E>(pid: u16, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        M2tsError::Reader {
            pid,
            source: error.into(),
        }
    }
}
