// src/header/file_header.rs
use crate::error::{PlxError, Result};
use crate::raw_data::RecordReader;
use std::fmt;

/// Rows of the spike summary tables (`TSCounts`, `WFCounts`)
pub const COUNT_TABLE_CHANNELS: usize = 130;
/// Columns of the spike summary tables, unit 0 (unsorted) to 4 (d)
pub const COUNT_TABLE_UNITS: usize = 5;
/// Length of `EVCounts`
pub const EVENT_COUNT_SLOTS: usize = 512;
/// First `EVCounts` index holding A/D sample counts
pub const AD_COUNT_OFFSET: usize = 300;

/// When the recording was created, as stored in the file header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CreationDate {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
}

impl fmt::Display for CreationDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// One positive entry of a (channel, unit) summary table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitCount {
    pub channel: usize,
    pub unit: usize,
    pub count: i32,
}

/// Fixed-size record at the start of every PLX file.
///
/// The summary tables are advisory. Nothing in this crate uses them to
/// bound a read; see [`crate::reader::CountAudit`] for checking them.
#[derive(Debug, Clone, PartialEq)]
pub struct FileHeader {
    pub magic: u32,
    pub version: i32,
    pub comment: String,
    /// Timestamp clock in ticks per second
    pub ad_frequency: i32,
    pub num_dsp_channels: i32,
    pub num_event_channels: i32,
    pub num_slow_channels: i32,
    pub num_points_wave: i32,
    pub num_points_pre_threshold: i32,
    pub created: CreationDate,
    pub fast_read: i32,
    pub waveform_frequency: i32,
    pub last_timestamp: f64,
    pub trodalness: u8,
    pub data_trodalness: u8,
    pub bits_per_spike_sample: u8,
    pub bits_per_slow_sample: u8,
    pub spike_max_magnitude_mv: u16,
    pub slow_max_magnitude_mv: u16,
    pub spike_pre_amp_gain: u16,
    pub acquiring_software: String,
    pub processing_software: String,
    /// `TSCounts[channel][unit]`
    pub ts_counts: Vec<[i32; COUNT_TABLE_UNITS]>,
    /// `WFCounts[channel][unit]`
    pub wf_counts: Vec<[i32; COUNT_TABLE_UNITS]>,
    /// `EVCounts[index]`, events below 300 and A/D samples from 300
    pub ev_counts: Vec<i32>,
}

impl FileHeader {
    pub const SIZE: usize = 7504;
    /// "PLEX" read as a little-endian u32
    pub const MAGIC: u32 = 0x58454C50;

    const COMMENT_LEN: usize = 128;
    const SOFTWARE_NAME_LEN: usize = 18;
    const PADDING_LEN: usize = 10;

    /// Decode a header from exactly [`FileHeader::SIZE`] bytes
    pub fn parse(record: &[u8]) -> Result<Self> {
        if record.len() < Self::SIZE {
            return Err(PlxError::MalformedHeader {
                expected: Self::SIZE,
                found: record.len() as u64,
            });
        }

        let mut r = RecordReader::new(&record[..Self::SIZE]);
        let magic = r.u32()?;
        let version = r.i32()?;
        let comment = r.fixed_string(Self::COMMENT_LEN)?;
        let ad_frequency = r.i32()?;
        let num_dsp_channels = r.i32()?;
        let num_event_channels = r.i32()?;
        let num_slow_channels = r.i32()?;
        let num_points_wave = r.i32()?;
        let num_points_pre_threshold = r.i32()?;
        let created = CreationDate {
            year: r.i32()?,
            month: r.i32()?,
            day: r.i32()?,
            hour: r.i32()?,
            minute: r.i32()?,
            second: r.i32()?,
        };
        let fast_read = r.i32()?;
        let waveform_frequency = r.i32()?;
        let last_timestamp = r.f64()?;
        let trodalness = r.u8()?;
        let data_trodalness = r.u8()?;
        let bits_per_spike_sample = r.u8()?;
        let bits_per_slow_sample = r.u8()?;
        let spike_max_magnitude_mv = r.u16()?;
        let slow_max_magnitude_mv = r.u16()?;
        let spike_pre_amp_gain = r.u16()?;
        let acquiring_software = r.fixed_string(Self::SOFTWARE_NAME_LEN)?;
        let processing_software = r.fixed_string(Self::SOFTWARE_NAME_LEN)?;
        r.skip(Self::PADDING_LEN)?;

        let mut ts_counts = Vec::with_capacity(COUNT_TABLE_CHANNELS);
        for _ in 0..COUNT_TABLE_CHANNELS {
            ts_counts.push(r.i32_array::<COUNT_TABLE_UNITS>()?);
        }
        let mut wf_counts = Vec::with_capacity(COUNT_TABLE_CHANNELS);
        for _ in 0..COUNT_TABLE_CHANNELS {
            wf_counts.push(r.i32_array::<COUNT_TABLE_UNITS>()?);
        }
        let ev_counts = r.i32_array::<EVENT_COUNT_SLOTS>()?.to_vec();
        debug_assert_eq!(r.position(), Self::SIZE);

        Ok(FileHeader {
            magic,
            version,
            comment,
            ad_frequency,
            num_dsp_channels,
            num_event_channels,
            num_slow_channels,
            num_points_wave,
            num_points_pre_threshold,
            created,
            fast_read,
            waveform_frequency,
            last_timestamp,
            trodalness,
            data_trodalness,
            bits_per_spike_sample,
            bits_per_slow_sample,
            spike_max_magnitude_mv,
            slow_max_magnitude_mv,
            spike_pre_amp_gain,
            acquiring_software,
            processing_software,
            ts_counts,
            wf_counts,
            ev_counts,
        })
    }

    pub fn has_valid_magic(&self) -> bool {
        self.magic == Self::MAGIC
    }

    pub fn created(&self) -> CreationDate {
        self.created
    }

    /// Convert a tick count to seconds using the file's master clock
    pub fn ticks_to_seconds(&self, ticks: u64) -> f64 {
        crate::classify::ticks_to_seconds(ticks, self.ad_frequency)
    }

    /// Declared spike timestamp counts with a positive value
    pub fn spike_counts(&self) -> impl Iterator<Item = UnitCount> + '_ {
        positive_unit_counts(&self.ts_counts)
    }

    /// Declared waveform counts with a positive value
    pub fn waveform_counts(&self) -> impl Iterator<Item = UnitCount> + '_ {
        positive_unit_counts(&self.wf_counts)
    }

    /// `(event channel, count)` for event channels 1..=299 with a positive count
    pub fn event_counts(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let slots = self.ev_counts.get(1..AD_COUNT_OFFSET).unwrap_or(&[]);
        slots
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, count)| count > 0)
            .map(|(i, count)| ((i + 1) as i32, count))
    }

    /// `(0-based A/D channel, sample count)` with a positive count
    pub fn ad_counts(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let slots = self.ev_counts.get(AD_COUNT_OFFSET..).unwrap_or(&[]);
        slots
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, count)| count > 0)
            .map(|(i, count)| (i as i32, count))
    }

    /// Declared spike count for a table cell, `None` outside the table
    pub fn declared_spike_count(&self, channel: usize, unit: usize) -> Option<i32> {
        self.ts_counts.get(channel)?.get(unit).copied()
    }

    pub fn declared_waveform_count(&self, channel: usize, unit: usize) -> Option<i32> {
        self.wf_counts.get(channel)?.get(unit).copied()
    }

    pub fn declared_event_count(&self, channel: usize) -> Option<i32> {
        if channel >= AD_COUNT_OFFSET {
            return None;
        }
        self.ev_counts.get(channel).copied()
    }

    pub fn declared_ad_count(&self, channel: usize) -> Option<i32> {
        self.ev_counts.get(AD_COUNT_OFFSET + channel).copied()
    }
}

fn positive_unit_counts(table: &[[i32; COUNT_TABLE_UNITS]]) -> impl Iterator<Item = UnitCount> + '_ {
    table.iter().enumerate().flat_map(|(channel, units)| {
        units
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, count)| count > 0)
            .map(move |(unit, count)| UnitCount { channel, unit, count })
    })
}
