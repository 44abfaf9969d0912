// src/raw_data/cursor.rs
use crate::error::{PlxError, Result};
use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// Trait alias for Read + Seek
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Sequential reader over a fixed-size source.
///
/// The source length is measured once when the cursor is created. Every read
/// is checked against the remaining length first, so a short source fails
/// with [`PlxError::TruncatedInput`] instead of a partial read.
pub struct BinaryCursor<R> {
    inner: R,
    position: u64,
    len: u64,
}

impl<R: ReadSeek> BinaryCursor<R> {
    pub fn new(mut inner: R) -> Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(BinaryCursor {
            inner,
            position: 0,
            len,
        })
    }

    /// Total length of the source in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.position)
    }

    pub fn at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Move to an absolute offset. Offsets past the end are allowed; the next
    /// read reports the truncation.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        self.position = offset;
        Ok(())
    }

    /// Advance `count` bytes without reading them
    pub fn skip(&mut self, count: u64) -> Result<()> {
        self.ensure_available(count)?;
        if count > 0 {
            let target = self.position + count;
            self.seek(target)?;
        }
        Ok(())
    }

    /// Read exactly `count` bytes into a new buffer
    pub fn read_exact(&mut self, count: usize) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.read_exact_into(&mut buffer, count)?;
        Ok(buffer)
    }

    /// Read exactly `count` bytes into `buffer`, replacing its contents.
    ///
    /// The length check happens before `buffer` is resized, so a corrupt
    /// count cannot trigger a huge allocation.
    pub fn read_exact_into(&mut self, buffer: &mut Vec<u8>, count: usize) -> Result<()> {
        self.ensure_available(count as u64)?;
        buffer.clear();
        buffer.resize(count, 0);
        self.fill(buffer)
    }

    /// Fill `buf` completely
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        self.ensure_available(buf.len() as u64)?;
        self.fill(buf)
    }

    /// Read one fixed-size record, distinguishing a clean end of stream.
    ///
    /// Returns `Ok(false)` when no bytes remain, `Ok(true)` when `buf` was
    /// filled, and `TruncatedInput` when only part of a record is left.
    pub fn read_record(&mut self, buf: &mut [u8]) -> Result<bool> {
        if self.at_end() {
            return Ok(false);
        }
        self.read_into(buf)?;
        Ok(true)
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn ensure_available(&self, needed: u64) -> Result<()> {
        let available = self.remaining();
        if needed > available {
            return Err(PlxError::TruncatedInput {
                offset: self.position,
                needed,
                available,
            });
        }
        Ok(())
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.position += buf.len() as u64;
                Ok(())
            }
            // The source shrank underneath us
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => Err(PlxError::TruncatedInput {
                offset: self.position,
                needed: buf.len() as u64,
                available: self.remaining(),
            }),
            Err(err) => Err(err.into()),
        }
    }
}
