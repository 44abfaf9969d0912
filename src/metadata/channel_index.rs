// src/metadata/channel_index.rs
use crate::error::{PlxError, Result};
use crate::metadata::{ChannelDescriptor, DspChannelHeader, EventChannelHeader, SlowChannelHeader};
use crate::types::ChannelClass;
use std::collections::HashMap;

/// The three channel-descriptor arrays plus a per-class lookup by channel number.
///
/// Arrays keep file order. When a channel number appears twice in one
/// class, lookups resolve to the first descriptor.
#[derive(Debug, Clone, Default)]
pub struct ChannelIndex {
    dsp: Vec<DspChannelHeader>,
    events: Vec<EventChannelHeader>,
    slow: Vec<SlowChannelHeader>,
    dsp_by_channel: HashMap<i32, usize>,
    events_by_channel: HashMap<i32, usize>,
    slow_by_channel: HashMap<i32, usize>,
}

impl ChannelIndex {
    pub fn new(
        dsp: Vec<DspChannelHeader>,
        events: Vec<EventChannelHeader>,
        slow: Vec<SlowChannelHeader>,
    ) -> Self {
        let dsp_by_channel = index_by_channel(ChannelClass::Dsp, dsp.iter().map(|h| h.channel));
        let events_by_channel = index_by_channel(ChannelClass::Event, events.iter().map(|h| h.channel));
        let slow_by_channel = index_by_channel(ChannelClass::Slow, slow.iter().map(|h| h.channel));

        ChannelIndex {
            dsp,
            events,
            slow,
            dsp_by_channel,
            events_by_channel,
            slow_by_channel,
        }
    }

    pub fn dsp_channels(&self) -> &[DspChannelHeader] {
        &self.dsp
    }

    pub fn event_channels(&self) -> &[EventChannelHeader] {
        &self.events
    }

    pub fn slow_channels(&self) -> &[SlowChannelHeader] {
        &self.slow
    }

    /// Descriptors of one class in file order
    pub fn channels(&self, class: ChannelClass) -> Vec<ChannelDescriptor<'_>> {
        match class {
            ChannelClass::Dsp => self.dsp.iter().map(ChannelDescriptor::Dsp).collect(),
            ChannelClass::Event => self.events.iter().map(ChannelDescriptor::Event).collect(),
            ChannelClass::Slow => self.slow.iter().map(ChannelDescriptor::Slow).collect(),
        }
    }

    pub fn len(&self, class: ChannelClass) -> usize {
        match class {
            ChannelClass::Dsp => self.dsp.len(),
            ChannelClass::Event => self.events.len(),
            ChannelClass::Slow => self.slow.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dsp.is_empty() && self.events.is_empty() && self.slow.is_empty()
    }

    pub fn lookup_dsp(&self, channel: i32) -> Result<&DspChannelHeader> {
        self.dsp_by_channel
            .get(&channel)
            .map(|&i| &self.dsp[i])
            .ok_or(PlxError::ChannelNotFound { class: ChannelClass::Dsp, channel })
    }

    pub fn lookup_event(&self, channel: i32) -> Result<&EventChannelHeader> {
        self.events_by_channel
            .get(&channel)
            .map(|&i| &self.events[i])
            .ok_or(PlxError::ChannelNotFound { class: ChannelClass::Event, channel })
    }

    pub fn lookup_slow(&self, channel: i32) -> Result<&SlowChannelHeader> {
        self.slow_by_channel
            .get(&channel)
            .map(|&i| &self.slow[i])
            .ok_or(PlxError::ChannelNotFound { class: ChannelClass::Slow, channel })
    }

    pub fn lookup(&self, class: ChannelClass, channel: i32) -> Result<ChannelDescriptor<'_>> {
        match class {
            ChannelClass::Dsp => self.lookup_dsp(channel).map(ChannelDescriptor::Dsp),
            ChannelClass::Event => self.lookup_event(channel).map(ChannelDescriptor::Event),
            ChannelClass::Slow => self.lookup_slow(channel).map(ChannelDescriptor::Slow),
        }
    }

    pub fn contains(&self, class: ChannelClass, channel: i32) -> bool {
        match class {
            ChannelClass::Dsp => self.dsp_by_channel.contains_key(&channel),
            ChannelClass::Event => self.events_by_channel.contains_key(&channel),
            ChannelClass::Slow => self.slow_by_channel.contains_key(&channel),
        }
    }
}

fn index_by_channel(class: ChannelClass, channels: impl Iterator<Item = i32>) -> HashMap<i32, usize> {
    let mut map = HashMap::new();
    for (position, channel) in channels.enumerate() {
        if let Some(&first) = map.get(&channel) {
            log::warn!(
                "{} channel {} is described twice (headers {} and {}); using the first",
                class,
                channel,
                first,
                position
            );
            continue;
        }
        map.insert(channel, position);
    }
    map
}
