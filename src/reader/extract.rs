// src/reader/extract.rs
//! Per-channel extraction built on a full scan.
//!
//! Each operation restarts at the first data block, keeps the blocks that
//! match the requested channel and converts them to physical units.
use crate::block::DataBlock;
use crate::classify::{
    checked_clock, checked_gain, checked_ticks_per_sample, ClassifiedRecord, ClassifyContext, ContinuousSample,
};
use crate::error::Result;
use crate::options::WaveformPolicy;
use crate::raw_data::{BinaryCursor, ReadSeek};
use crate::reader::scan::BlockIter;
use crate::reader::PlxReader;
use crate::types::{BlockType, ChannelClass, SortedUnit};
use bytes::Bytes;
use std::io::Cursor;

/// Time of one spike
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpikeEvent {
    pub ticks: u64,
    pub seconds: f64,
    pub unit: SortedUnit,
}

/// One spike with its waveform
#[derive(Debug, Clone, PartialEq)]
pub struct SpikeWaveform {
    pub ticks: u64,
    pub seconds: f64,
    pub unit: SortedUnit,
    pub samples: Vec<i16>,
    pub volts: Vec<f64>,
}

/// One external event occurrence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExternalEvent {
    pub ticks: u64,
    pub seconds: f64,
    /// Digital word, only on the strobed channel
    pub strobed: Option<i16>,
}

/// Every sample of one A/D channel, concatenated across blocks
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousData {
    pub channel: i32,
    /// Tick of the first sample of the first block
    pub first_timestamp: Option<u64>,
    /// Number of blocks the samples came from
    pub blocks: usize,
    pub samples: Vec<ContinuousSample>,
}

/// One extraction to run over a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractRequest {
    /// `unit: None` matches every unit
    SpikeTimestamps { channel: i32, unit: Option<SortedUnit> },
    SpikeWaveforms { channel: i32, unit: Option<SortedUnit> },
    EventTimestamps { channel: i32 },
    Continuous { channel: i32 },
}

impl ExtractRequest {
    /// Only waveform and continuous extraction need the sample words
    pub fn waveform_policy(&self) -> WaveformPolicy {
        match self {
            ExtractRequest::SpikeTimestamps { .. } | ExtractRequest::EventTimestamps { .. } => {
                WaveformPolicy::Skip
            }
            ExtractRequest::SpikeWaveforms { .. } | ExtractRequest::Continuous { .. } => {
                WaveformPolicy::Materialize
            }
        }
    }
}

/// Result of one [`ExtractRequest`]
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    SpikeTimestamps(Vec<SpikeEvent>),
    SpikeWaveforms(Vec<SpikeWaveform>),
    EventTimestamps(Vec<ExternalEvent>),
    Continuous(ContinuousData),
}

impl Extracted {
    /// Number of extracted items (spikes, events or samples)
    pub fn len(&self) -> usize {
        match self {
            Extracted::SpikeTimestamps(spikes) => spikes.len(),
            Extracted::SpikeWaveforms(spikes) => spikes.len(),
            Extracted::EventTimestamps(events) => events.len(),
            Extracted::Continuous(data) => data.samples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: ReadSeek> PlxReader<R> {
    /// Timestamps of every spike on a DSP channel, optionally for one unit.
    ///
    /// Fails before scanning when the timestamp clock is not positive.
    pub fn spike_timestamps(&mut self, channel: i32, unit: Option<SortedUnit>) -> Result<Vec<SpikeEvent>> {
        let (blocks, context) = self.scan_parts(WaveformPolicy::Skip);
        spike_timestamps(blocks, context, channel, unit)
    }

    /// Waveforms of every spike on a DSP channel.
    ///
    /// Spikes stored without samples are left out. Fails before scanning
    /// when the channel has no descriptor, a zero gain or the timestamp
    /// clock is not positive.
    pub fn spike_waveforms(&mut self, channel: i32, unit: Option<SortedUnit>) -> Result<Vec<SpikeWaveform>> {
        let (blocks, context) = self.scan_parts(WaveformPolicy::Materialize);
        spike_waveforms(blocks, context, channel, unit)
    }

    /// Every occurrence of an external event channel
    pub fn event_timestamps(&mut self, channel: i32) -> Result<Vec<ExternalEvent>> {
        let (blocks, context) = self.scan_parts(WaveformPolicy::Skip);
        event_timestamps(blocks, context, channel)
    }

    /// All samples of a 0-based A/D channel.
    ///
    /// Fails before scanning when the channel has no descriptor or its
    /// frequency or gain cannot be used for conversion.
    pub fn continuous(&mut self, channel: i32) -> Result<ContinuousData> {
        let (blocks, context) = self.scan_parts(WaveformPolicy::Materialize);
        continuous(blocks, context, channel)
    }

    pub fn extract(&mut self, request: &ExtractRequest) -> Result<Extracted> {
        let (blocks, context) = self.scan_parts(request.waveform_policy());
        run(request, blocks, context)
    }
}

impl PlxReader<Cursor<Bytes>> {
    /// Run several extractions at once, one thread per request.
    ///
    /// Every thread scans its own cursor over the shared buffer. Results are
    /// returned in request order.
    pub fn extract_parallel(&self, requests: &[ExtractRequest]) -> Vec<Result<Extracted>> {
        let source = self.source();
        let data_start = self.data_start;
        let context = self.context();
        log::debug!("Running {} extractions in parallel", requests.len());

        let (tx, rx) = crossbeam_channel::unbounded();
        std::thread::scope(|scope| {
            for (slot, request) in requests.iter().enumerate() {
                let tx = tx.clone();
                let bytes = source.clone();
                scope.spawn(move || {
                    let result = BinaryCursor::new(Cursor::new(bytes)).and_then(|mut cursor| {
                        let blocks = BlockIter::new(&mut cursor, data_start, request.waveform_policy());
                        run(request, blocks, context)
                    });
                    let _ = tx.send((slot, result));
                });
            }
        });
        drop(tx);

        let mut results: Vec<Option<Result<Extracted>>> = requests.iter().map(|_| None).collect();
        for (slot, result) in rx.iter() {
            results[slot] = Some(result);
        }
        results.into_iter().flatten().collect()
    }
}

fn run<I>(request: &ExtractRequest, blocks: I, context: ClassifyContext<'_>) -> Result<Extracted>
where
    I: Iterator<Item = Result<DataBlock>>,
{
    Ok(match *request {
        ExtractRequest::SpikeTimestamps { channel, unit } => {
            Extracted::SpikeTimestamps(spike_timestamps(blocks, context, channel, unit)?)
        }
        ExtractRequest::SpikeWaveforms { channel, unit } => {
            Extracted::SpikeWaveforms(spike_waveforms(blocks, context, channel, unit)?)
        }
        ExtractRequest::EventTimestamps { channel } => {
            Extracted::EventTimestamps(event_timestamps(blocks, context, channel)?)
        }
        ExtractRequest::Continuous { channel } => Extracted::Continuous(continuous(blocks, context, channel)?),
    })
}

fn is_on(block: &DataBlock, block_type: BlockType, channel: i32) -> bool {
    block.block_type == block_type && i32::from(block.channel) == channel
}

fn unit_matches(filter: Option<SortedUnit>, unit: SortedUnit) -> bool {
    filter.map_or(true, |wanted| wanted == unit)
}

fn spike_timestamps<I>(
    blocks: I,
    context: ClassifyContext<'_>,
    channel: i32,
    unit: Option<SortedUnit>,
) -> Result<Vec<SpikeEvent>>
where
    I: Iterator<Item = Result<DataBlock>>,
{
    checked_clock(ChannelClass::Dsp, channel, context.header.ad_frequency)?;

    let mut spikes = Vec::new();
    for block in blocks {
        let block = block?;
        if !is_on(&block, BlockType::Spike, channel) {
            continue;
        }
        if let ClassifiedRecord::Spike(spike) = context.classify(&block) {
            if unit_matches(unit, spike.unit) {
                spikes.push(SpikeEvent {
                    ticks: spike.ticks,
                    seconds: spike.seconds()?,
                    unit: spike.unit,
                });
            }
        }
    }
    Ok(spikes)
}

fn spike_waveforms<I>(
    blocks: I,
    context: ClassifyContext<'_>,
    channel: i32,
    unit: Option<SortedUnit>,
) -> Result<Vec<SpikeWaveform>>
where
    I: Iterator<Item = Result<DataBlock>>,
{
    let dsp = context.channels.lookup_dsp(channel)?;
    checked_gain(ChannelClass::Dsp, channel, dsp.gain)?;
    checked_clock(ChannelClass::Dsp, channel, context.header.ad_frequency)?;

    let mut spikes = Vec::new();
    for block in blocks {
        let block = block?;
        if !is_on(&block, BlockType::Spike, channel) || !block.has_samples() {
            continue;
        }
        if let ClassifiedRecord::Spike(spike) = context.classify(&block) {
            if unit_matches(unit, spike.unit) {
                spikes.push(SpikeWaveform {
                    ticks: spike.ticks,
                    seconds: spike.seconds()?,
                    unit: spike.unit,
                    samples: spike.waveform.to_vec(),
                    volts: spike.volts()?,
                });
            }
        }
    }
    Ok(spikes)
}

fn event_timestamps<I>(blocks: I, context: ClassifyContext<'_>, channel: i32) -> Result<Vec<ExternalEvent>>
where
    I: Iterator<Item = Result<DataBlock>>,
{
    checked_clock(ChannelClass::Event, channel, context.header.ad_frequency)?;

    let mut events = Vec::new();
    for block in blocks {
        let block = block?;
        if !is_on(&block, BlockType::ExternalEvent, channel) {
            continue;
        }
        if let ClassifiedRecord::Event(event) = context.classify(&block) {
            events.push(ExternalEvent {
                ticks: event.ticks,
                seconds: event.seconds()?,
                strobed: event.strobed_value(),
            });
        }
    }
    Ok(events)
}

fn continuous<I>(blocks: I, context: ClassifyContext<'_>, channel: i32) -> Result<ContinuousData>
where
    I: Iterator<Item = Result<DataBlock>>,
{
    let slow = context.channels.lookup_slow(channel)?;
    if checked_ticks_per_sample(context.header.ad_frequency, slow)? == 0 {
        log::warn!(
            "A/D channel {} samples at {} Hz, faster than the {} Hz timestamp clock; sample ticks will not advance",
            channel,
            slow.ad_freq,
            context.header.ad_frequency
        );
    }
    checked_gain(ChannelClass::Slow, channel, slow.gain)?;

    let mut data = ContinuousData {
        channel,
        first_timestamp: None,
        blocks: 0,
        samples: Vec::new(),
    };
    for block in blocks {
        let block = block?;
        if !is_on(&block, BlockType::AdData, channel) {
            continue;
        }
        if let ClassifiedRecord::Continuous(record) = context.classify(&block) {
            if data.first_timestamp.is_none() {
                data.first_timestamp = Some(record.first_timestamp);
            }
            data.blocks += 1;
            data.samples.extend(record.timed_samples()?);
        }
    }
    log::debug!(
        "A/D channel {}: {} samples from {} blocks",
        channel,
        data.samples.len(),
        data.blocks
    );
    Ok(data)
}
