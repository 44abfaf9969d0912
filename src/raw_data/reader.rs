// src/raw_data/reader.rs
use crate::error::Result;
use crate::utils::decode_fixed_string;
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::io::{self, Cursor, Read};

/// Field-by-field reader over one fixed-size little-endian record.
///
/// Header records are read from the source in one piece and then decoded
/// here, so the layout of each record lives in a single `parse` function.
pub struct RecordReader<'a> {
    inner: Cursor<&'a [u8]>,
}

impl<'a> RecordReader<'a> {
    pub fn new(record: &'a [u8]) -> Self {
        RecordReader {
            inner: Cursor::new(record),
        }
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> usize {
        self.inner.position() as usize
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.inner.read_u8()?)
    }

    pub fn i16(&mut self) -> Result<i16> {
        Ok(self.inner.read_i16::<LittleEndian>()?)
    }

    pub fn u16(&mut self) -> Result<u16> {
        Ok(self.inner.read_u16::<LittleEndian>()?)
    }

    pub fn i32(&mut self) -> Result<i32> {
        Ok(self.inner.read_i32::<LittleEndian>()?)
    }

    pub fn u32(&mut self) -> Result<u32> {
        Ok(self.inner.read_u32::<LittleEndian>()?)
    }

    pub fn f64(&mut self) -> Result<f64> {
        Ok(self.inner.read_f64::<LittleEndian>()?)
    }

    pub fn i16_array<const N: usize>(&mut self) -> Result<[i16; N]> {
        let mut values = [0i16; N];
        self.inner.read_i16_into::<LittleEndian>(&mut values)?;
        Ok(values)
    }

    pub fn i32_array<const N: usize>(&mut self) -> Result<[i32; N]> {
        let mut values = [0i32; N];
        self.inner.read_i32_into::<LittleEndian>(&mut values)?;
        Ok(values)
    }

    /// Null-padded string stored in a `len`-byte field
    pub fn fixed_string(&mut self, len: usize) -> Result<String> {
        let mut bytes = vec![0u8; len];
        self.inner.read_exact(&mut bytes)?;
        Ok(decode_fixed_string(&bytes))
    }

    /// Skip padding or reserved bytes
    pub fn skip(&mut self, len: usize) -> Result<()> {
        let target = self.inner.position() + len as u64;
        if target > self.inner.get_ref().len() as u64 {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        self.inner.set_position(target);
        Ok(())
    }
}

/// Decode little-endian 16-bit sample words into `out`.
///
/// `bytes.len()` must be exactly `2 * out.len()`.
pub fn decode_words(bytes: &[u8], out: &mut [i16]) {
    LittleEndian::read_i16_into(bytes, out);
}
