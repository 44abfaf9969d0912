// src/types.rs
use std::fmt;

/// Event channel whose `Unit` field carries a strobed digital word
pub const STROBED_CHANNEL: i32 = 257;

/// The three channel-descriptor arrays stored in a PLX file.
///
/// Channel numbers are only unique within one class: DSP channel 1 and
/// event channel 1 are unrelated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelClass {
    /// Spike (DSP) channels, 1-based
    Dsp,
    /// External event channels, 1-based
    Event,
    /// Slow (continuous A/D) channels, 0-based
    Slow,
}

impl ChannelClass {
    pub const ALL: [ChannelClass; 3] = [ChannelClass::Dsp, ChannelClass::Event, ChannelClass::Slow];

    pub fn name(&self) -> &'static str {
        match self {
            ChannelClass::Dsp => "DSP",
            ChannelClass::Event => "event",
            ChannelClass::Slow => "A/D",
        }
    }
}

impl fmt::Display for ChannelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type tag of a data block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Spike,
    ExternalEvent,
    AdData,
    /// Reserved or unrecognized tag, kept verbatim
    Unknown(i16),
}

impl BlockType {
    pub const SPIKE_TAG: i16 = 1;
    pub const EXTERNAL_EVENT_TAG: i16 = 4;
    pub const AD_DATA_TAG: i16 = 5;

    pub fn from_i16(value: i16) -> Self {
        match value {
            Self::SPIKE_TAG => BlockType::Spike,
            Self::EXTERNAL_EVENT_TAG => BlockType::ExternalEvent,
            Self::AD_DATA_TAG => BlockType::AdData,
            other => BlockType::Unknown(other),
        }
    }

    pub fn to_i16(self) -> i16 {
        match self {
            BlockType::Spike => Self::SPIKE_TAG,
            BlockType::ExternalEvent => Self::EXTERNAL_EVENT_TAG,
            BlockType::AdData => Self::AD_DATA_TAG,
            BlockType::Unknown(tag) => tag,
        }
    }

    /// Channel class that block channel numbers of this type refer to
    pub fn channel_class(&self) -> Option<ChannelClass> {
        match self {
            BlockType::Spike => Some(ChannelClass::Dsp),
            BlockType::ExternalEvent => Some(ChannelClass::Event),
            BlockType::AdData => Some(ChannelClass::Slow),
            BlockType::Unknown(_) => None,
        }
    }
}

/// Sorted unit of a spike record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortedUnit {
    /// Unit 0: unsorted or invalid
    Unsorted,
    A,
    B,
    C,
    D,
    /// Value outside 0..=4
    Other(i16),
}

impl SortedUnit {
    pub fn from_raw(unit: i16) -> Self {
        match unit {
            0 => SortedUnit::Unsorted,
            1 => SortedUnit::A,
            2 => SortedUnit::B,
            3 => SortedUnit::C,
            4 => SortedUnit::D,
            other => SortedUnit::Other(other),
        }
    }

    pub fn raw(&self) -> i16 {
        match self {
            SortedUnit::Unsorted => 0,
            SortedUnit::A => 1,
            SortedUnit::B => 2,
            SortedUnit::C => 3,
            SortedUnit::D => 4,
            SortedUnit::Other(raw) => *raw,
        }
    }

    /// Letter label (`a`..`d`) for sorted units
    pub fn label(&self) -> Option<char> {
        match self {
            SortedUnit::A => Some('a'),
            SortedUnit::B => Some('b'),
            SortedUnit::C => Some('c'),
            SortedUnit::D => Some('d'),
            SortedUnit::Unsorted | SortedUnit::Other(_) => None,
        }
    }

    pub fn is_sorted(&self) -> bool {
        self.label().is_some()
    }
}

impl fmt::Display for SortedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortedUnit::Unsorted => f.write_str("unsorted"),
            SortedUnit::Other(raw) => write!(f, "unit {}", raw),
            sorted => match sorted.label() {
                Some(label) => write!(f, "{}", label),
                None => Ok(()),
            },
        }
    }
}
