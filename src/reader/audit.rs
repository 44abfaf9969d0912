// src/reader/audit.rs
use crate::block::DataBlock;
use crate::error::Result;
use crate::header::{FileHeader, AD_COUNT_OFFSET, COUNT_TABLE_CHANNELS, COUNT_TABLE_UNITS, EVENT_COUNT_SLOTS};
use crate::options::WaveformPolicy;
use crate::raw_data::ReadSeek;
use crate::reader::PlxReader;
use crate::types::BlockType;
use std::fmt;

/// Which header summary table a count comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountTable {
    /// `TSCounts[channel][unit]`
    SpikeTimestamps,
    /// `WFCounts[channel][unit]`
    Waveforms,
    /// `EVCounts[channel]` for event channels
    Events,
    /// `EVCounts[300 + channel]` for A/D channels
    AdSamples,
}

impl fmt::Display for CountTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CountTable::SpikeTimestamps => "TSCounts",
            CountTable::Waveforms => "WFCounts",
            CountTable::Events => "EVCounts (events)",
            CountTable::AdSamples => "EVCounts (A/D)",
        };
        f.write_str(name)
    }
}

/// A declared summary count that differs from what the block stream holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountMismatch {
    pub table: CountTable,
    /// Channel number as used by the table
    pub channel: usize,
    /// Unit column, only for the spike tables
    pub unit: Option<usize>,
    pub declared: i32,
    pub observed: u64,
}

impl fmt::Display for CountMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} channel {}", self.table, self.channel)?;
        if let Some(unit) = self.unit {
            write!(f, " unit {}", unit)?;
        }
        write!(f, ": header declares {}, found {}", self.declared, self.observed)
    }
}

/// Comparison of the header summary tables against one full scan.
///
/// Mismatches are reported, never treated as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountAudit {
    /// Blocks scanned
    pub blocks: u64,
    /// Blocks whose channel or unit falls outside every summary table
    pub untracked: u64,
    pub mismatches: Vec<CountMismatch>,
}

impl CountAudit {
    /// Tally `blocks` and compare the totals with `header`
    pub fn from_blocks<I>(header: &FileHeader, blocks: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<DataBlock>>,
    {
        let mut tally = Tally::new();
        for block in blocks {
            tally.add(&block?);
        }
        let audit = tally.compare(header);
        for mismatch in &audit.mismatches {
            log::warn!("Summary count mismatch: {}", mismatch);
        }
        Ok(audit)
    }

    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn mismatches_in(&self, table: CountTable) -> impl Iterator<Item = &CountMismatch> + '_ {
        self.mismatches.iter().filter(move |m| m.table == table)
    }
}

struct Tally {
    blocks: u64,
    untracked: u64,
    timestamps: Vec<[u64; COUNT_TABLE_UNITS]>,
    waveforms: Vec<[u64; COUNT_TABLE_UNITS]>,
    events: Vec<u64>,
}

impl Tally {
    fn new() -> Self {
        Tally {
            blocks: 0,
            untracked: 0,
            timestamps: vec![[0; COUNT_TABLE_UNITS]; COUNT_TABLE_CHANNELS],
            waveforms: vec![[0; COUNT_TABLE_UNITS]; COUNT_TABLE_CHANNELS],
            events: vec![0; EVENT_COUNT_SLOTS],
        }
    }

    fn add(&mut self, block: &DataBlock) {
        self.blocks += 1;
        let tracked = match block.block_type {
            BlockType::Spike => self.add_spike(block),
            BlockType::ExternalEvent => match event_slot(block.channel) {
                Some(slot) => {
                    self.events[slot] += 1;
                    true
                }
                None => false,
            },
            BlockType::AdData => match ad_slot(block.channel) {
                Some(slot) => {
                    self.events[slot] += block.word_count() as u64;
                    true
                }
                None => false,
            },
            BlockType::Unknown(_) => false,
        };
        if !tracked {
            self.untracked += 1;
        }
    }

    fn add_spike(&mut self, block: &DataBlock) -> bool {
        let (Ok(channel), Ok(unit)) = (usize::try_from(block.channel), usize::try_from(block.unit)) else {
            return false;
        };
        if channel >= COUNT_TABLE_CHANNELS || unit >= COUNT_TABLE_UNITS {
            return false;
        }
        self.timestamps[channel][unit] += 1;
        if block.number_of_waveforms > 0 {
            self.waveforms[channel][unit] += block.number_of_waveforms as u64;
        }
        true
    }

    fn compare(self, header: &FileHeader) -> CountAudit {
        let mut mismatches = Vec::new();
        compare_unit_table(CountTable::SpikeTimestamps, &header.ts_counts, &self.timestamps, &mut mismatches);
        compare_unit_table(CountTable::Waveforms, &header.wf_counts, &self.waveforms, &mut mismatches);

        for (index, (&declared, &observed)) in header.ev_counts.iter().zip(&self.events).enumerate().skip(1) {
            if i64::from(declared) == observed as i64 {
                continue;
            }
            let (table, channel) = if index < AD_COUNT_OFFSET {
                (CountTable::Events, index)
            } else {
                (CountTable::AdSamples, index - AD_COUNT_OFFSET)
            };
            mismatches.push(CountMismatch {
                table,
                channel,
                unit: None,
                declared,
                observed,
            });
        }

        CountAudit {
            blocks: self.blocks,
            untracked: self.untracked,
            mismatches,
        }
    }
}

fn event_slot(channel: i16) -> Option<usize> {
    usize::try_from(channel).ok().filter(|&c| c > 0 && c < AD_COUNT_OFFSET)
}

fn ad_slot(channel: i16) -> Option<usize> {
    usize::try_from(channel)
        .ok()
        .map(|c| AD_COUNT_OFFSET + c)
        .filter(|&slot| slot < EVENT_COUNT_SLOTS)
}

fn compare_unit_table(
    table: CountTable,
    declared: &[[i32; COUNT_TABLE_UNITS]],
    observed: &[[u64; COUNT_TABLE_UNITS]],
    out: &mut Vec<CountMismatch>,
) {
    for (channel, (declared_row, observed_row)) in declared.iter().zip(observed).enumerate() {
        for (unit, (&declared, &observed)) in declared_row.iter().zip(observed_row).enumerate() {
            if i64::from(declared) != observed as i64 {
                out.push(CountMismatch {
                    table,
                    channel,
                    unit: Some(unit),
                    declared,
                    observed,
                });
            }
        }
    }
}

impl<R: ReadSeek> PlxReader<R> {
    /// Scan the whole file and check the header's summary tables against it
    pub fn audit_counts(&mut self) -> Result<CountAudit> {
        let (blocks, context) = self.scan_parts(WaveformPolicy::Skip);
        CountAudit::from_blocks(context.header, blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{BlockWriter, PlxFileBuilder};

    fn blocks() -> BlockWriter {
        let mut blocks = BlockWriter::new();
        blocks
            .spike(10, 1, 1, &[1, 2])
            .spike(20, 1, 1, &[])
            .spike(30, 200, 1, &[])
            .event(40, 3, 0)
            .ad(50, 0, &[1, 2, 3, 4])
            .raw(9, 0, 60, 0, 0, 0, 0, &[]);
        blocks
    }

    #[test]
    fn test_consistent_header() {
        let bytes = PlxFileBuilder::new()
            .ts_count(1, 1, 2)
            .wf_count(1, 1, 1)
            .ev_count(3, 1)
            .ev_count(300, 4)
            .blocks(&blocks())
            .build();
        let mut reader = PlxReader::from_bytes(bytes).unwrap();
        let audit = reader.audit_counts().unwrap();
        assert!(audit.is_consistent(), "{:?}", audit.mismatches);
        assert_eq!(audit.blocks, 6);
        // Spike on channel 200 and the unknown block
        assert_eq!(audit.untracked, 2);
    }

    #[test]
    fn test_mismatches_reported() {
        let bytes = PlxFileBuilder::new()
            .ts_count(1, 1, 5)
            .wf_count(1, 1, 1)
            .ev_count(3, 1)
            .ev_count(7, 2)
            .blocks(&blocks())
            .build();
        let mut reader = PlxReader::from_bytes(bytes).unwrap();
        let audit = reader.audit_counts().unwrap();

        assert_eq!(
            audit.mismatches_in(CountTable::SpikeTimestamps).collect::<Vec<_>>(),
            vec![&CountMismatch {
                table: CountTable::SpikeTimestamps,
                channel: 1,
                unit: Some(1),
                declared: 5,
                observed: 2,
            }]
        );
        assert_eq!(audit.mismatches_in(CountTable::Waveforms).count(), 0);

        let events: Vec<&CountMismatch> = audit.mismatches_in(CountTable::Events).collect();
        assert_eq!(events.len(), 1);
        assert_eq!((events[0].channel, events[0].declared, events[0].observed), (7, 2, 0));

        let ad: Vec<&CountMismatch> = audit.mismatches_in(CountTable::AdSamples).collect();
        assert_eq!((ad[0].channel, ad[0].declared, ad[0].observed), (0, 0, 4));
    }

    #[test]
    fn test_mismatch_display() {
        let mismatch = CountMismatch {
            table: CountTable::SpikeTimestamps,
            channel: 2,
            unit: Some(0),
            declared: 10,
            observed: 9,
        };
        assert_eq!(mismatch.to_string(), "TSCounts channel 2 unit 0: header declares 10, found 9");
    }
}
