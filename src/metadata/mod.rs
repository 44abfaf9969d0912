// src/metadata/mod.rs
mod channel_header;
mod channel_index;

pub use channel_header::{
    ChannelDescriptor, DspChannelHeader, EventChannelHeader, SlowChannelHeader, MAX_SORT_UNITS,
    TEMPLATE_POINTS,
};
pub use channel_index::ChannelIndex;
