// src/test_util.rs
//! In-memory PLX files for unit tests
#![allow(dead_code)]

use crate::header::FileHeader;
use crate::metadata::{DspChannelHeader, EventChannelHeader, SlowChannelHeader};
use crate::types::BlockType;
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

const TS_COUNTS_OFFSET: usize = 256;
const WF_COUNTS_OFFSET: usize = 2856;
const EV_COUNTS_OFFSET: usize = 5456;

fn put_str(buf: &mut [u8], offset: usize, capacity: usize, value: &str) {
    let bytes = value.as_bytes();
    let len = bytes.len().min(capacity - 1);
    buf[offset..offset + len].copy_from_slice(&bytes[..len]);
}

fn put_i32(buf: &mut [u8], offset: usize, value: i32) {
    LittleEndian::write_i32(&mut buf[offset..offset + 4], value);
}

/// A 1020-byte DSP channel header record
pub(crate) fn dsp_record(channel: i32, name: &str, gain: i32) -> Vec<u8> {
    let mut record = vec![0u8; DspChannelHeader::SIZE];
    put_str(&mut record, 0, 32, name);
    put_i32(&mut record, 64, channel);
    put_i32(&mut record, 80, gain);
    record
}

/// A 296-byte event channel header record
pub(crate) fn event_record(channel: i32, name: &str) -> Vec<u8> {
    let mut record = vec![0u8; EventChannelHeader::SIZE];
    put_str(&mut record, 0, 32, name);
    put_i32(&mut record, 32, channel);
    record
}

/// A 296-byte slow (A/D) channel header record
pub(crate) fn slow_record(channel: i32, name: &str, ad_freq: i32, gain: i32) -> Vec<u8> {
    let mut record = vec![0u8; SlowChannelHeader::SIZE];
    put_str(&mut record, 0, 32, name);
    put_i32(&mut record, 32, channel);
    put_i32(&mut record, 36, ad_freq);
    put_i32(&mut record, 40, gain);
    put_i32(&mut record, 44, 1);
    record
}

/// Appends encoded data blocks
#[derive(Debug, Default, Clone)]
pub(crate) struct BlockWriter {
    bytes: Vec<u8>,
}

impl BlockWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Write a block header followed by `samples`, which need not match the
    /// declared word count
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn raw(
        &mut self,
        block_type: i16,
        upper: u16,
        lower: u32,
        channel: i16,
        unit: i16,
        number_of_waveforms: i16,
        words_per_waveform: i16,
        samples: &[i16],
    ) -> &mut Self {
        let out = &mut self.bytes;
        out.write_i16::<LittleEndian>(block_type).unwrap();
        out.write_u16::<LittleEndian>(upper).unwrap();
        out.write_u32::<LittleEndian>(lower).unwrap();
        out.write_i16::<LittleEndian>(channel).unwrap();
        out.write_i16::<LittleEndian>(unit).unwrap();
        out.write_i16::<LittleEndian>(number_of_waveforms).unwrap();
        out.write_i16::<LittleEndian>(words_per_waveform).unwrap();
        for &sample in samples {
            out.write_i16::<LittleEndian>(sample).unwrap();
        }
        self
    }

    /// Spike block; an empty waveform writes a timestamp-only spike
    pub(crate) fn spike(&mut self, ticks: u64, channel: i16, unit: i16, waveform: &[i16]) -> &mut Self {
        let waveforms = if waveform.is_empty() { 0 } else { 1 };
        let (upper, lower) = split_ticks(ticks);
        self.raw(BlockType::SPIKE_TAG, upper, lower, channel, unit, waveforms, waveform.len() as i16, waveform)
    }

    pub(crate) fn event(&mut self, ticks: u64, channel: i16, unit: i16) -> &mut Self {
        let (upper, lower) = split_ticks(ticks);
        self.raw(BlockType::EXTERNAL_EVENT_TAG, upper, lower, channel, unit, 0, 0, &[])
    }

    pub(crate) fn ad(&mut self, ticks: u64, channel: i16, samples: &[i16]) -> &mut Self {
        let (upper, lower) = split_ticks(ticks);
        self.raw(BlockType::AD_DATA_TAG, upper, lower, channel, 0, 1, samples.len() as i16, samples)
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

fn split_ticks(ticks: u64) -> (u16, u32) {
    ((ticks >> 32) as u16, ticks as u32)
}

/// Builds a complete PLX file in memory
#[derive(Debug, Clone)]
pub(crate) struct PlxFileBuilder {
    header: Vec<u8>,
    dsp: Vec<Vec<u8>>,
    events: Vec<Vec<u8>>,
    slow: Vec<Vec<u8>>,
    counts: (Option<i32>, Option<i32>, Option<i32>),
    blocks: Vec<u8>,
}

impl Default for PlxFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlxFileBuilder {
    pub(crate) fn new() -> Self {
        let mut header = vec![0u8; FileHeader::SIZE];
        LittleEndian::write_u32(&mut header[0..4], FileHeader::MAGIC);
        put_i32(&mut header, 4, 107);
        put_i32(&mut header, 136, 40000);
        PlxFileBuilder {
            header,
            dsp: Vec::new(),
            events: Vec::new(),
            slow: Vec::new(),
            counts: (None, None, None),
            blocks: Vec::new(),
        }
    }

    pub(crate) fn magic(mut self, magic: u32) -> Self {
        LittleEndian::write_u32(&mut self.header[0..4], magic);
        self
    }

    pub(crate) fn version(mut self, version: i32) -> Self {
        put_i32(&mut self.header, 4, version);
        self
    }

    pub(crate) fn comment(mut self, comment: &str) -> Self {
        put_str(&mut self.header, 8, 128, comment);
        self
    }

    pub(crate) fn ad_frequency(mut self, frequency: i32) -> Self {
        put_i32(&mut self.header, 136, frequency);
        self
    }

    pub(crate) fn created(mut self, year: i32, month: i32, day: i32, hour: i32, minute: i32, second: i32) -> Self {
        for (i, value) in [year, month, day, hour, minute, second].into_iter().enumerate() {
            put_i32(&mut self.header, 160 + 4 * i, value);
        }
        self
    }

    pub(crate) fn dsp_channel(mut self, channel: i32, name: &str, gain: i32) -> Self {
        self.dsp.push(dsp_record(channel, name, gain));
        self
    }

    pub(crate) fn event_channel(mut self, channel: i32, name: &str) -> Self {
        self.events.push(event_record(channel, name));
        self
    }

    pub(crate) fn slow_channel(mut self, channel: i32, name: &str, ad_freq: i32, gain: i32) -> Self {
        self.slow.push(slow_record(channel, name, ad_freq, gain));
        self
    }

    pub(crate) fn ts_count(mut self, channel: usize, unit: usize, count: i32) -> Self {
        put_i32(&mut self.header, TS_COUNTS_OFFSET + 4 * (channel * 5 + unit), count);
        self
    }

    pub(crate) fn wf_count(mut self, channel: usize, unit: usize, count: i32) -> Self {
        put_i32(&mut self.header, WF_COUNTS_OFFSET + 4 * (channel * 5 + unit), count);
        self
    }

    pub(crate) fn ev_count(mut self, index: usize, count: i32) -> Self {
        put_i32(&mut self.header, EV_COUNTS_OFFSET + 4 * index, count);
        self
    }

    /// Override the channel counts written to the header; `None` keeps the
    /// number of records added
    pub(crate) fn declared_counts(mut self, dsp: Option<i32>, events: Option<i32>, slow: Option<i32>) -> Self {
        self.counts = (dsp, events, slow);
        self
    }

    pub(crate) fn blocks(mut self, blocks: &BlockWriter) -> Self {
        self.blocks.extend_from_slice(blocks.as_bytes());
        self
    }

    /// Offset of the first data block in the built file
    pub(crate) fn data_start(&self) -> u64 {
        (FileHeader::SIZE
            + self.dsp.len() * DspChannelHeader::SIZE
            + self.events.len() * EventChannelHeader::SIZE
            + self.slow.len() * SlowChannelHeader::SIZE) as u64
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut header = self.header.clone();
        put_i32(&mut header, 140, self.counts.0.unwrap_or(self.dsp.len() as i32));
        put_i32(&mut header, 144, self.counts.1.unwrap_or(self.events.len() as i32));
        put_i32(&mut header, 148, self.counts.2.unwrap_or(self.slow.len() as i32));

        let mut out = header;
        for record in self.dsp.iter().chain(&self.events).chain(&self.slow) {
            out.extend_from_slice(record);
        }
        out.extend_from_slice(&self.blocks);
        out
    }
}
