// src/block/decoder.rs
use crate::block::{BlockHeader, DataBlock, Samples};
use crate::error::Result;
use crate::options::WaveformPolicy;
use crate::raw_data::{decode_words, BinaryCursor, ReadSeek};

/// Decode the next block at the cursor.
///
/// Returns `Ok(None)` at a clean end of stream. The trailing words are always
/// consumed, either decoded into the block or skipped, so on success the
/// cursor sits on the next block header. `scratch` holds the raw word bytes
/// and is reused across calls.
pub fn read_block<R: ReadSeek>(
    cursor: &mut BinaryCursor<R>,
    policy: WaveformPolicy,
    scratch: &mut Vec<u8>,
) -> Result<Option<DataBlock>> {
    let mut buf = [0u8; BlockHeader::SIZE];
    if !cursor.read_record(&mut buf)? {
        return Ok(None);
    }
    let header = BlockHeader::parse(&buf);
    let word_count = header.word_count();

    let samples = match policy {
        WaveformPolicy::Materialize => {
            cursor.read_exact_into(scratch, word_count * 2)?;
            let mut samples = Samples::from_elem(0, word_count);
            decode_words(scratch, &mut samples);
            samples
        }
        WaveformPolicy::Skip => {
            cursor.skip(word_count as u64 * 2)?;
            Samples::new()
        }
    };

    Ok(Some(DataBlock::from_parts(header, samples)))
}
