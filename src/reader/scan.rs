// src/reader/scan.rs
use crate::block::{read_block, DataBlock};
use crate::error::Result;
use crate::options::WaveformPolicy;
use crate::raw_data::{BinaryCursor, ReadSeek};
use std::iter::FusedIterator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Pending,
    Running,
    Finished,
}

/// Sequential iterator over the data blocks of one file.
///
/// The cursor is moved to the first data block on the first call to `next`.
/// A clean end of stream ends the iteration. A structural error is yielded
/// once, after which the iterator is exhausted.
///
/// # Example
///
/// ```no_run
/// use plx_rs::{BlockType, PlxReader};
///
/// let mut reader = PlxReader::open("session.plx").unwrap();
/// let mut spikes = 0;
/// for block in reader.scan() {
///     if block.unwrap().block_type == BlockType::Spike {
///         spikes += 1;
///     }
/// }
/// println!("{} spikes", spikes);
/// ```
pub struct BlockIter<'a, R: ReadSeek> {
    cursor: &'a mut BinaryCursor<R>,
    start: u64,
    policy: WaveformPolicy,
    scratch: Vec<u8>,
    state: ScanState,
    blocks_read: u64,
}

impl<'a, R: ReadSeek> BlockIter<'a, R> {
    pub(crate) fn new(cursor: &'a mut BinaryCursor<R>, start: u64, policy: WaveformPolicy) -> Self {
        BlockIter {
            cursor,
            start,
            policy,
            scratch: Vec::new(),
            state: ScanState::Pending,
            blocks_read: 0,
        }
    }

    pub fn policy(&self) -> WaveformPolicy {
        self.policy
    }

    /// Number of blocks yielded so far
    pub fn blocks_read(&self) -> u64 {
        self.blocks_read
    }

    /// Byte offset of the next block header
    pub fn position(&self) -> u64 {
        match self.state {
            ScanState::Pending => self.start,
            _ => self.cursor.position(),
        }
    }

    /// Bytes left in the source after the current position
    pub fn remaining(&self) -> u64 {
        self.cursor.len().saturating_sub(self.position())
    }

    fn finish<T>(&mut self, result: T) -> T {
        self.state = ScanState::Finished;
        result
    }
}

impl<'a, R: ReadSeek> Iterator for BlockIter<'a, R> {
    type Item = Result<DataBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            ScanState::Finished => return None,
            ScanState::Pending => {
                if let Err(err) = self.cursor.seek(self.start) {
                    return self.finish(Some(Err(err)));
                }
                log::debug!("Scanning data blocks from offset {}", self.start);
                self.state = ScanState::Running;
            }
            ScanState::Running => {}
        }

        let offset = self.cursor.position();
        match read_block(self.cursor, self.policy, &mut self.scratch) {
            Ok(Some(block)) => {
                log::trace!(
                    "Block {} at offset {}: {:?} channel {} unit {} tick {} ({} words)",
                    self.blocks_read,
                    offset,
                    block.block_type,
                    block.channel,
                    block.unit,
                    block.timestamp,
                    block.word_count()
                );
                self.blocks_read += 1;
                Some(Ok(block))
            }
            Ok(None) => {
                log::debug!("Scan finished after {} blocks", self.blocks_read);
                self.finish(None)
            }
            Err(err) => {
                log::debug!("Scan stopped at offset {}: {}", offset, err);
                self.finish(Some(Err(err)))
            }
        }
    }
}

impl<'a, R: ReadSeek> FusedIterator for BlockIter<'a, R> {}
