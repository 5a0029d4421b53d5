//! Byte sources the demuxer pulls from.
//!
//! A source is read sequentially and can be peeked ahead of the read
//! position without consuming anything, which is what sniffing needs.

use bytes::{Buf, Bytes, BytesMut};
use std::io::{self, Read};

/// Sequential, peekable byte input.
pub trait ByteSource {
    /// Read up to `buf.len()` bytes at the read position. `Ok(0)` means end
    /// of input. Reading resets the peek position to the new read position.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Fill `buf` from the peek position and advance it. Returns `false` if
    /// the input ends first.
    fn peek_fully(&mut self, buf: &mut [u8]) -> io::Result<bool>;

    /// Advance the peek position by `len` bytes. Returns `false` if the input
    /// ends first.
    fn advance_peek(&mut self, len: usize) -> io::Result<bool>;

    /// Move the peek position back to the read position.
    fn reset_peek(&mut self);
}

/// In-memory source over a complete buffer.
#[derive(Debug, Clone, Default)]
pub struct SliceSource {
    data: Bytes,
    position: usize,
    peek_position: usize,
}

impl SliceSource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            position: 0,
            peek_position: 0,
        }
    }

    /// Bytes not yet read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

impl ByteSource for SliceSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(self.remaining());
        buf[..len].copy_from_slice(&self.data[self.position..self.position + len]);
        self.position += len;
        self.peek_position = self.position;
        Ok(len)
    }

    fn peek_fully(&mut self, buf: &mut [u8]) -> io::Result<bool> {
        let end = self.peek_position + buf.len();
        if end > self.data.len() {
            return Ok(false);
        }
        buf.copy_from_slice(&self.data[self.peek_position..end]);
        self.peek_position = end;
        Ok(true)
    }

    fn advance_peek(&mut self, len: usize) -> io::Result<bool> {
        let end = self.peek_position + len;
        if end > self.data.len() {
            return Ok(false);
        }
        self.peek_position = end;
        Ok(true)
    }

    fn reset_peek(&mut self) {
        self.peek_position = self.position;
    }
}

/// Source over any [`Read`] implementation.
///
/// Peeked bytes are kept in an internal buffer until they are read.
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: R,
    peeked: BytesMut,
    peek_position: usize,
}

impl<R: Read> ReadSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            peeked: BytesMut::new(),
            peek_position: 0,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn read_inner(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.inner.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }

    /// Make sure at least `len` bytes are buffered for peeking.
    fn fill_peeked(&mut self, len: usize) -> io::Result<bool> {
        let mut chunk = [0u8; 4096];
        while self.peeked.len() < len {
            let want = (len - self.peeked.len()).min(chunk.len());
            let read = self.read_inner(&mut chunk[..want])?;
            if read == 0 {
                return Ok(false);
            }
            self.peeked.extend_from_slice(&chunk[..read]);
        }
        Ok(true)
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.peeked.is_empty() {
            self.peek_position = 0;
            return self.read_inner(buf);
        }
        let len = buf.len().min(self.peeked.len());
        buf[..len].copy_from_slice(&self.peeked[..len]);
        self.peeked.advance(len);
        self.peek_position = 0;
        Ok(len)
    }

    fn peek_fully(&mut self, buf: &mut [u8]) -> io::Result<bool> {
        let end = self.peek_position + buf.len();
        if !self.fill_peeked(end)? {
            return Ok(false);
        }
        buf.copy_from_slice(&self.peeked[self.peek_position..end]);
        self.peek_position = end;
        Ok(true)
    }

    fn advance_peek(&mut self, len: usize) -> io::Result<bool> {
        let end = self.peek_position + len;
        if !self.fill_peeked(end)? {
            return Ok(false);
        }
        self.peek_position = end;
        Ok(true)
    }

    fn reset_peek(&mut self) {
        self.peek_position = 0;
    }
}
