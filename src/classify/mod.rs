//! Record classification and unit conversion
//!
//! [`classify`] turns a raw [`DataBlock`] into a [`ClassifiedRecord`], giving
//! the block's `channel` and `unit` fields their per-type meaning. Physical
//! unit projections (volts, per-sample timestamps) are computed on request
//! from the classified record, so a missing or misconfigured channel only
//! affects the record that asks for it.
//!
//! ```
//! use plx_rs::classify::{spike_volts, continuous_volts, sample_ticks};
//!
//! assert_eq!(spike_volts(2048, 1), 3.0);
//! assert_eq!(continuous_volts(2048, 1), 5.0);
//! assert_eq!(sample_ticks(1000, 2, 40), 1080);
//! ```

mod convert;

pub use convert::*;

use crate::block::DataBlock;
use crate::error::{PlxError, Result};
use crate::header::FileHeader;
use crate::metadata::{ChannelIndex, DspChannelHeader, EventChannelHeader, SlowChannelHeader};
use crate::types::{BlockType, ChannelClass, SortedUnit, STROBED_CHANNEL};

/// Read-only decoding context shared by every record of one file
#[derive(Debug, Clone, Copy)]
pub struct ClassifyContext<'a> {
    pub header: &'a FileHeader,
    pub channels: &'a ChannelIndex,
}

impl<'a> ClassifyContext<'a> {
    pub fn new(header: &'a FileHeader, channels: &'a ChannelIndex) -> Self {
        ClassifyContext { header, channels }
    }

    pub fn classify<'b>(&self, block: &'b DataBlock) -> ClassifiedRecord<'b>
    where
        'a: 'b,
    {
        classify(block, *self)
    }
}

/// Non-fatal problems noticed while classifying a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataQualityWarning {
    /// A/D blocks carry exactly one waveform
    UnexpectedWaveformCount { found: i16 },
    /// A/D blocks carry unit 0
    UnexpectedUnit { found: i16 },
}

/// A spike (type 1) record
#[derive(Debug, Clone, Copy)]
pub struct SpikeRecord<'a> {
    /// 1-based DSP channel
    pub channel: i32,
    pub unit: SortedUnit,
    pub ticks: u64,
    /// Raw waveform words, empty for timestamp-only spikes
    pub waveform: &'a [i16],
    ad_frequency: i32,
    dsp: Option<&'a DspChannelHeader>,
}

impl<'a> SpikeRecord<'a> {
    pub fn has_waveform(&self) -> bool {
        !self.waveform.is_empty()
    }

    /// Spike time in seconds on the file's timestamp clock
    pub fn seconds(&self) -> Result<f64> {
        checked_seconds(ChannelClass::Dsp, self.channel, self.ticks, self.ad_frequency)
    }

    /// The DSP channel descriptor for this spike
    pub fn channel_header(&self) -> Result<&'a DspChannelHeader> {
        self.dsp.ok_or(PlxError::ChannelNotFound {
            class: ChannelClass::Dsp,
            channel: self.channel,
        })
    }

    /// Waveform converted to volts with the DSP channel's gain
    pub fn volts(&self) -> Result<Vec<f64>> {
        let gain = checked_gain(ChannelClass::Dsp, self.channel, self.channel_header()?.gain)?;
        Ok(self.waveform.iter().map(|&raw| spike_volts(raw, gain)).collect())
    }
}

/// What an external event carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Plain,
    /// Event on the strobed channel with its digital word
    Strobed(i16),
}

/// An external event (type 4) record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventRecord<'a> {
    /// 1-based event channel
    pub channel: i32,
    pub ticks: u64,
    pub kind: EventKind,
    ad_frequency: i32,
    event: Option<&'a EventChannelHeader>,
}

impl<'a> EventRecord<'a> {
    /// The event channel descriptor for this event
    pub fn channel_header(&self) -> Result<&'a EventChannelHeader> {
        self.event.ok_or(PlxError::ChannelNotFound {
            class: ChannelClass::Event,
            channel: self.channel,
        })
    }

    pub fn seconds(&self) -> Result<f64> {
        checked_seconds(ChannelClass::Event, self.channel, self.ticks, self.ad_frequency)
    }

    pub fn strobed_value(&self) -> Option<i16> {
        match self.kind {
            EventKind::Strobed(value) => Some(value),
            EventKind::Plain => None,
        }
    }
}

/// One continuous sample with its time and voltage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuousSample {
    pub ticks: u64,
    pub seconds: f64,
    pub raw: i16,
    pub volts: f64,
}

/// A continuous A/D (type 5) record
#[derive(Debug, Clone)]
pub struct ContinuousRecord<'a> {
    /// 0-based A/D channel
    pub channel: i32,
    /// Tick of the first sample
    pub first_timestamp: u64,
    pub samples: &'a [i16],
    pub warnings: Vec<DataQualityWarning>,
    ad_frequency: i32,
    slow: Option<&'a SlowChannelHeader>,
}

impl<'a> ContinuousRecord<'a> {
    pub fn channel_header(&self) -> Result<&'a SlowChannelHeader> {
        self.slow.ok_or(PlxError::ChannelNotFound {
            class: ChannelClass::Slow,
            channel: self.channel,
        })
    }

    /// Ticks between consecutive samples, `ADFrequency / ADFreq`
    pub fn ticks_per_sample(&self) -> Result<u64> {
        checked_ticks_per_sample(self.ad_frequency, self.channel_header()?)
    }

    /// Tick of sample `index`
    pub fn sample_ticks(&self, index: usize) -> Result<u64> {
        Ok(sample_ticks(self.first_timestamp, index, self.ticks_per_sample()?))
    }

    fn gain(&self) -> Result<i32> {
        checked_gain(ChannelClass::Slow, self.channel, self.channel_header()?.gain)
    }

    pub fn volts(&self) -> Result<Vec<f64>> {
        let gain = self.gain()?;
        Ok(self.samples.iter().map(|&raw| continuous_volts(raw, gain)).collect())
    }

    /// Every sample with its tick, time in seconds and voltage
    pub fn timed_samples(&self) -> Result<Vec<ContinuousSample>> {
        let step = self.ticks_per_sample()?;
        let gain = self.gain()?;
        Ok(self
            .samples
            .iter()
            .enumerate()
            .map(|(i, &raw)| {
                let ticks = sample_ticks(self.first_timestamp, i, step);
                ContinuousSample {
                    ticks,
                    seconds: ticks_to_seconds(ticks, self.ad_frequency),
                    raw,
                    volts: continuous_volts(raw, gain),
                }
            })
            .collect())
    }
}

/// Sample spacing of a slow channel, rejecting frequencies that are not positive.
///
/// A channel sampled faster than the timestamp clock gets a spacing of 0.
pub(crate) fn checked_ticks_per_sample(ad_frequency: i32, slow: &SlowChannelHeader) -> Result<u64> {
    ticks_per_sample(ad_frequency, slow.ad_freq).ok_or_else(|| {
        PlxError::invalid_config(
            ChannelClass::Slow,
            slow.channel,
            format!(
                "timestamp frequency {} and A/D frequency {} must both be positive",
                ad_frequency, slow.ad_freq
            ),
        )
    })
}

/// The file's timestamp clock, which must be positive to turn ticks into seconds
pub(crate) fn checked_clock(class: ChannelClass, channel: i32, ad_frequency: i32) -> Result<i32> {
    if ad_frequency <= 0 {
        return Err(PlxError::invalid_config(
            class,
            channel,
            format!("timestamp frequency {} must be positive", ad_frequency),
        ));
    }
    Ok(ad_frequency)
}

fn checked_seconds(class: ChannelClass, channel: i32, ticks: u64, ad_frequency: i32) -> Result<f64> {
    Ok(ticks_to_seconds(ticks, checked_clock(class, channel, ad_frequency)?))
}

pub(crate) fn checked_gain(class: ChannelClass, channel: i32, gain: i32) -> Result<i32> {
    if gain == 0 {
        return Err(PlxError::invalid_config(class, channel, "gain is zero"));
    }
    Ok(gain)
}

/// A data block with its type-specific meaning resolved
#[derive(Debug, Clone)]
pub enum ClassifiedRecord<'a> {
    Spike(SpikeRecord<'a>),
    Event(EventRecord<'a>),
    Continuous(ContinuousRecord<'a>),
    /// Reserved or unrecognized block type, raw fields untouched
    Unknown { tag: i16, block: &'a DataBlock },
}

impl<'a> ClassifiedRecord<'a> {
    pub fn ticks(&self) -> u64 {
        match self {
            ClassifiedRecord::Spike(spike) => spike.ticks,
            ClassifiedRecord::Event(event) => event.ticks,
            ClassifiedRecord::Continuous(continuous) => continuous.first_timestamp,
            ClassifiedRecord::Unknown { block, .. } => block.timestamp,
        }
    }

    pub fn channel_class(&self) -> Option<ChannelClass> {
        match self {
            ClassifiedRecord::Spike(_) => Some(ChannelClass::Dsp),
            ClassifiedRecord::Event(_) => Some(ChannelClass::Event),
            ClassifiedRecord::Continuous(_) => Some(ChannelClass::Slow),
            ClassifiedRecord::Unknown { .. } => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ClassifiedRecord::Unknown { .. })
    }
}

/// Interpret a block according to its type tag
pub fn classify<'a>(block: &'a DataBlock, context: ClassifyContext<'a>) -> ClassifiedRecord<'a> {
    let ad_frequency = context.header.ad_frequency;
    let channel = i32::from(block.channel);

    match block.block_type {
        BlockType::Spike => ClassifiedRecord::Spike(SpikeRecord {
            channel,
            unit: SortedUnit::from_raw(block.unit),
            ticks: block.timestamp,
            waveform: &block.samples,
            ad_frequency,
            dsp: context.channels.lookup_dsp(channel).ok(),
        }),
        BlockType::ExternalEvent => {
            let kind = if channel == STROBED_CHANNEL {
                EventKind::Strobed(block.unit)
            } else {
                EventKind::Plain
            };
            ClassifiedRecord::Event(EventRecord {
                channel,
                ticks: block.timestamp,
                kind,
                ad_frequency,
                event: context.channels.lookup_event(channel).ok(),
            })
        }
        BlockType::AdData => {
            let mut warnings = Vec::new();
            if block.number_of_waveforms != 1 {
                log::warn!(
                    "A/D block on channel {} at tick {} has {} waveforms, expected 1",
                    channel,
                    block.timestamp,
                    block.number_of_waveforms
                );
                warnings.push(DataQualityWarning::UnexpectedWaveformCount {
                    found: block.number_of_waveforms,
                });
            }
            if block.unit != 0 {
                warnings.push(DataQualityWarning::UnexpectedUnit { found: block.unit });
            }
            ClassifiedRecord::Continuous(ContinuousRecord {
                channel,
                first_timestamp: block.timestamp,
                samples: &block.samples,
                warnings,
                ad_frequency,
                slow: context.channels.lookup_slow(channel).ok(),
            })
        }
        BlockType::Unknown(tag) => ClassifiedRecord::Unknown { tag, block },
    }
}
