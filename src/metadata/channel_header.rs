// src/metadata/channel_header.rs
use crate::error::Result;
use crate::raw_data::RecordReader;
use crate::types::ChannelClass;

const NAME_LEN: usize = 32;
const COMMENT_LEN: usize = 128;

/// Number of units a DSP channel can sort (templates, boxes, fits)
pub const MAX_SORT_UNITS: usize = 5;
/// Points per sort template
pub const TEMPLATE_POINTS: usize = 64;

/// Descriptor of a spike (DSP) channel, including its sorting parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DspChannelHeader {
    pub name: String,
    pub sig_name: String,
    /// 1-based DSP channel number
    pub channel: i32,
    pub waveform_rate: i32,
    pub sig: i32,
    pub reference: i32,
    /// Divisor applied when converting waveform values to volts
    pub gain: i32,
    pub filter: i32,
    pub threshold: i32,
    /// 1 - boxes, 2 - templates
    pub method: i32,
    pub num_units: i32,
    pub templates: [[i16; TEMPLATE_POINTS]; MAX_SORT_UNITS],
    pub fit: [i32; MAX_SORT_UNITS],
    pub sort_width: i32,
    pub boxes: [[[i16; 4]; 2]; MAX_SORT_UNITS],
    pub sort_begin: i32,
    pub comment: String,
    pub source_id: u8,
    pub channel_id: u16,
}

impl DspChannelHeader {
    pub const SIZE: usize = 1020;

    pub fn parse(record: &[u8]) -> Result<Self> {
        let mut r = RecordReader::new(record);
        let name = r.fixed_string(NAME_LEN)?;
        let sig_name = r.fixed_string(NAME_LEN)?;
        let channel = r.i32()?;
        let waveform_rate = r.i32()?;
        let sig = r.i32()?;
        let reference = r.i32()?;
        let gain = r.i32()?;
        let filter = r.i32()?;
        let threshold = r.i32()?;
        let method = r.i32()?;
        let num_units = r.i32()?;

        let mut templates = [[0i16; TEMPLATE_POINTS]; MAX_SORT_UNITS];
        for template in templates.iter_mut() {
            *template = r.i16_array::<TEMPLATE_POINTS>()?;
        }
        let fit = r.i32_array::<MAX_SORT_UNITS>()?;
        let sort_width = r.i32()?;

        let mut boxes = [[[0i16; 4]; 2]; MAX_SORT_UNITS];
        for unit_boxes in boxes.iter_mut() {
            for sort_box in unit_boxes.iter_mut() {
                *sort_box = r.i16_array::<4>()?;
            }
        }
        let sort_begin = r.i32()?;
        let comment = r.fixed_string(COMMENT_LEN)?;
        let source_id = r.u8()?;
        r.skip(1)?;
        let channel_id = r.u16()?;
        // 10 x i32 padding
        r.skip(40)?;
        debug_assert_eq!(r.position(), Self::SIZE);

        Ok(DspChannelHeader {
            name,
            sig_name,
            channel,
            waveform_rate,
            sig,
            reference,
            gain,
            filter,
            threshold,
            method,
            num_units,
            templates,
            fit,
            sort_width,
            boxes,
            sort_begin,
            comment,
            source_id,
            channel_id,
        })
    }
}

/// Descriptor of an external event channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventChannelHeader {
    pub name: String,
    /// 1-based event channel number; 257 is the strobed channel
    pub channel: i32,
    pub comment: String,
    pub source_id: u8,
    pub channel_id: u16,
}

impl EventChannelHeader {
    pub const SIZE: usize = 296;

    pub fn parse(record: &[u8]) -> Result<Self> {
        let mut r = RecordReader::new(record);
        let name = r.fixed_string(NAME_LEN)?;
        let channel = r.i32()?;
        let comment = r.fixed_string(COMMENT_LEN)?;
        let source_id = r.u8()?;
        r.skip(1)?;
        let channel_id = r.u16()?;
        r.skip(32 * 4)?;
        debug_assert_eq!(r.position(), Self::SIZE);

        Ok(EventChannelHeader {
            name,
            channel,
            comment,
            source_id,
            channel_id,
        })
    }
}

/// Descriptor of a slow (continuous A/D) channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlowChannelHeader {
    pub name: String,
    /// 0-based A/D channel number
    pub channel: i32,
    /// Sampling rate of this channel in Hz
    pub ad_freq: i32,
    /// Divisor applied when converting samples to volts
    pub gain: i32,
    pub enabled: i32,
    pub pre_amp_gain: i32,
    pub spike_channel: i32,
    pub comment: String,
    pub source_id: u8,
    pub channel_id: u16,
}

impl SlowChannelHeader {
    pub const SIZE: usize = 296;

    pub fn parse(record: &[u8]) -> Result<Self> {
        let mut r = RecordReader::new(record);
        let name = r.fixed_string(NAME_LEN)?;
        let channel = r.i32()?;
        let ad_freq = r.i32()?;
        let gain = r.i32()?;
        let enabled = r.i32()?;
        let pre_amp_gain = r.i32()?;
        let spike_channel = r.i32()?;
        let comment = r.fixed_string(COMMENT_LEN)?;
        let source_id = r.u8()?;
        r.skip(1)?;
        let channel_id = r.u16()?;
        r.skip(27 * 4)?;
        debug_assert_eq!(r.position(), Self::SIZE);

        Ok(SlowChannelHeader {
            name,
            channel,
            ad_freq,
            gain,
            enabled,
            pre_amp_gain,
            spike_channel,
            comment,
            source_id,
            channel_id,
        })
    }
}

/// A channel descriptor of any class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelDescriptor<'a> {
    Dsp(&'a DspChannelHeader),
    Event(&'a EventChannelHeader),
    Slow(&'a SlowChannelHeader),
}

impl<'a> ChannelDescriptor<'a> {
    pub fn class(&self) -> ChannelClass {
        match self {
            ChannelDescriptor::Dsp(_) => ChannelClass::Dsp,
            ChannelDescriptor::Event(_) => ChannelClass::Event,
            ChannelDescriptor::Slow(_) => ChannelClass::Slow,
        }
    }

    pub fn channel(&self) -> i32 {
        match self {
            ChannelDescriptor::Dsp(h) => h.channel,
            ChannelDescriptor::Event(h) => h.channel,
            ChannelDescriptor::Slow(h) => h.channel,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            ChannelDescriptor::Dsp(h) => &h.name,
            ChannelDescriptor::Event(h) => &h.name,
            ChannelDescriptor::Slow(h) => &h.name,
        }
    }

    /// Voltage divisor, for the classes that carry one
    pub fn gain(&self) -> Option<i32> {
        match self {
            ChannelDescriptor::Dsp(h) => Some(h.gain),
            ChannelDescriptor::Event(_) => None,
            ChannelDescriptor::Slow(h) => Some(h.gain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{dsp_record, event_record, slow_record};

    #[test]
    fn test_record_sizes() {
        assert_eq!(dsp_record(1, "sig001", 32).len(), DspChannelHeader::SIZE);
        assert_eq!(event_record(1, "Event001").len(), EventChannelHeader::SIZE);
        assert_eq!(slow_record(0, "AD01", 1000, 1).len(), SlowChannelHeader::SIZE);
    }

    #[test]
    fn test_parse_dsp_header() {
        let record = dsp_record(3, "sig003", 32);
        let header = DspChannelHeader::parse(&record).unwrap();
        assert_eq!(header.name, "sig003");
        assert_eq!(header.channel, 3);
        assert_eq!(header.gain, 32);
        assert_eq!(header.templates[4], [0i16; TEMPLATE_POINTS]);
    }

    #[test]
    fn test_parse_event_header() {
        let record = event_record(257, "Strobed");
        let header = EventChannelHeader::parse(&record).unwrap();
        assert_eq!(header.name, "Strobed");
        assert_eq!(header.channel, 257);
        assert_eq!(header.comment, "");
    }

    #[test]
    fn test_parse_slow_header() {
        let record = slow_record(2, "AD03", 1000, 5);
        let header = SlowChannelHeader::parse(&record).unwrap();
        assert_eq!(header.name, "AD03");
        assert_eq!(header.channel, 2);
        assert_eq!(header.ad_freq, 1000);
        assert_eq!(header.gain, 5);
    }

    #[test]
    fn test_short_record_fails() {
        let record = vec![0u8; SlowChannelHeader::SIZE - 4];
        assert!(SlowChannelHeader::parse(&record).is_err());
    }

    #[test]
    fn test_descriptor_accessors() {
        let slow = SlowChannelHeader::parse(&slow_record(0, "AD01", 2000, 4)).unwrap();
        let descriptor = ChannelDescriptor::Slow(&slow);
        assert_eq!(descriptor.class(), ChannelClass::Slow);
        assert_eq!(descriptor.channel(), 0);
        assert_eq!(descriptor.name(), "AD01");
        assert_eq!(descriptor.gain(), Some(4));

        let event = EventChannelHeader::parse(&event_record(2, "Event002")).unwrap();
        assert_eq!(ChannelDescriptor::Event(&event).gain(), None);
    }
}
