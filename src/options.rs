// src/options.rs

/// What the block decoder does with the sample words that trail a block header.
///
/// Either way the words are consumed, so the stream stays aligned on the
/// next block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaveformPolicy {
    /// Decode the words into `DataBlock::samples`
    #[default]
    Materialize,
    /// Seek past the words and leave `samples` empty
    Skip,
}

/// Options controlling how a PLX source is opened and scanned
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Capacity of the `BufReader` used for file sources
    pub buffer_capacity: usize,
    /// Reject files whose header does not start with the PLX magic number.
    /// Off by default; headers are otherwise taken as read.
    pub verify_magic: bool,
    /// Default policy for `PlxReader::scan`
    pub waveforms: WaveformPolicy,
}

impl ReaderOptions {
    pub const DEFAULT_BUFFER_CAPACITY: usize = 65536;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }

    pub fn with_magic_check(mut self, verify: bool) -> Self {
        self.verify_magic = verify;
        self
    }

    pub fn with_waveforms(mut self, policy: WaveformPolicy) -> Self {
        self.waveforms = policy;
        self
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            buffer_capacity: Self::DEFAULT_BUFFER_CAPACITY,
            verify_magic: false,
            waveforms: WaveformPolicy::Materialize,
        }
    }
}
