//! Data blocks: the variable-length records that follow the headers
//!
//! Every block starts with a 16-byte header. When `NumberOfWaveforms > 0`
//! the header is followed by `NumberOfWaveforms * NumberOfWordsInWaveform`
//! signed 16-bit words, which must be consumed before the next header can be
//! read.

mod decoder;

pub use decoder::read_block;

use crate::types::BlockType;
use byteorder::{ByteOrder, LittleEndian};
use smallvec::SmallVec;

/// Trailing sample words of one block. Spike waveforms fit inline.
pub type Samples = SmallVec<[i16; 64]>;

/// Raw 16-byte block header as stored in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub block_type: i16,
    pub upper_timestamp: u16,
    pub lower_timestamp: u32,
    pub channel: i16,
    pub unit: i16,
    pub number_of_waveforms: i16,
    pub words_per_waveform: i16,
}

impl BlockHeader {
    pub const SIZE: usize = 16;

    pub fn parse(buf: &[u8; Self::SIZE]) -> Self {
        BlockHeader {
            block_type: LittleEndian::read_i16(&buf[0..2]),
            upper_timestamp: LittleEndian::read_u16(&buf[2..4]),
            lower_timestamp: LittleEndian::read_u32(&buf[4..8]),
            channel: LittleEndian::read_i16(&buf[8..10]),
            unit: LittleEndian::read_i16(&buf[10..12]),
            number_of_waveforms: LittleEndian::read_i16(&buf[12..14]),
            words_per_waveform: LittleEndian::read_i16(&buf[14..16]),
        }
    }

    /// The 40-bit tick count, recomposed from its two stored parts
    pub fn timestamp(&self) -> u64 {
        (u64::from(self.upper_timestamp) << 32) | u64::from(self.lower_timestamp)
    }

    /// Number of sample words that follow this header.
    ///
    /// Zero whenever `number_of_waveforms <= 0`, whatever the word count says.
    pub fn word_count(&self) -> usize {
        trailing_words(self.number_of_waveforms, self.words_per_waveform)
    }
}

/// One decoded data block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBlock {
    pub block_type: BlockType,
    /// Tick count since the start of acquisition
    pub timestamp: u64,
    /// Channel number, interpreted per `block_type`
    pub channel: i16,
    /// Unit number, interpreted per `block_type`
    pub unit: i16,
    pub number_of_waveforms: i16,
    pub words_per_waveform: i16,
    /// Trailing words; empty when the block has none or they were skipped
    pub samples: Samples,
}

impl DataBlock {
    pub fn from_parts(header: BlockHeader, samples: Samples) -> Self {
        DataBlock {
            block_type: BlockType::from_i16(header.block_type),
            timestamp: header.timestamp(),
            channel: header.channel,
            unit: header.unit,
            number_of_waveforms: header.number_of_waveforms,
            words_per_waveform: header.words_per_waveform,
            samples,
        }
    }

    /// Number of trailing words this block occupies in the stream
    pub fn word_count(&self) -> usize {
        trailing_words(self.number_of_waveforms, self.words_per_waveform)
    }

    /// Bytes this block occupies in the stream, header included
    pub fn encoded_len(&self) -> u64 {
        BlockHeader::SIZE as u64 + 2 * self.word_count() as u64
    }

    pub fn has_samples(&self) -> bool {
        !self.samples.is_empty()
    }

    /// The samples split into individual waveforms
    pub fn waveforms(&self) -> impl Iterator<Item = &[i16]> {
        let width = self.words_per_waveform.max(1) as usize;
        self.samples.chunks(width)
    }
}

fn trailing_words(number_of_waveforms: i16, words_per_waveform: i16) -> usize {
    if number_of_waveforms <= 0 || words_per_waveform <= 0 {
        return 0;
    }
    number_of_waveforms as usize * words_per_waveform as usize
}
