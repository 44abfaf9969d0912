// src/lib.rs
//! # plx-rs
//!
//! A Rust library for reading PLX files, the binary container written by
//! Plexon neurophysiology acquisition systems.
//!
//! A PLX file holds a fixed 7504-byte file header, three arrays of channel
//! headers (DSP spike channels, external event channels and slow A/D
//! channels) and then a stream of variable-length data blocks: spikes with
//! optional waveforms, external events and continuous A/D fragments.
//!
//! ## Features
//!
//! - **Streaming**: data blocks are decoded one at a time from any `Read + Seek`
//! - **Strict framing**: every block's trailing words are consumed, so a short
//!   file is reported as [`PlxError::TruncatedInput`] instead of misaligned data
//! - **Typed records**: raw blocks are classified into spikes, events and
//!   continuous fragments with unit conversion on request
//! - **Memory-mapped and async opening** behind the `mmap` and `async` features
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use plx_rs::*;
//!
//! fn main() -> Result<()> {
//!     let mut reader = PlxReader::open("session.plx")?;
//!
//!     println!("Recorded {}", reader.header().created());
//!     for channel in reader.dsp_channels() {
//!         println!("DSP {}: {} (gain {})", channel.channel, channel.name, channel.gain);
//!     }
//!
//!     let mut spikes = 0;
//!     for block in reader.scan() {
//!         if block?.block_type == BlockType::Spike {
//!             spikes += 1;
//!         }
//!     }
//!     println!("{} spikes", spikes);
//!     Ok(())
//! }
//! ```
//!
//! ### Classifying records
//!
//! ```rust,no_run
//! use plx_rs::*;
//!
//! fn main() -> Result<()> {
//!     let mut reader = PlxReader::open("session.plx")?;
//!     let blocks = reader.read_all_blocks()?;
//!
//!     for block in &blocks {
//!         match reader.classify(block) {
//!             ClassifiedRecord::Spike(spike) => {
//!                 println!("spike ch{} {} at {:.6}s", spike.channel, spike.unit, spike.seconds()?);
//!             }
//!             ClassifiedRecord::Event(event) => {
//!                 println!("event ch{} at {:.6}s", event.channel, event.seconds()?);
//!             }
//!             ClassifiedRecord::Continuous(ad) => match ad.volts() {
//!                 Ok(volts) => println!("A/D ch{}: {} samples", ad.channel, volts.len()),
//!                 Err(err) => eprintln!("A/D ch{}: {}", ad.channel, err),
//!             },
//!             ClassifiedRecord::Unknown { tag, .. } => println!("unknown block type {}", tag),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Extracting one channel
//!
//! ```rust,no_run
//! use plx_rs::*;
//!
//! fn main() -> Result<()> {
//!     let mut reader = PlxReader::open("session.plx")?;
//!
//!     let spikes = reader.spike_timestamps(1, Some(SortedUnit::A))?;
//!     let lfp = reader.continuous(0)?;
//!     println!("{} spikes, {} A/D samples", spikes.len(), lfp.samples.len());
//!     Ok(())
//! }
//! ```
//!
//! ### Async opening
//!
//! ```rust,no_run
//! # #[cfg(feature = "async")]
//! use plx_rs::*;
//!
//! # #[cfg(feature = "async")]
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let reader = PlxReader::open_async("session.plx").await?;
//!     let results = reader.extract_parallel(&[
//!         ExtractRequest::EventTimestamps { channel: 257 },
//!         ExtractRequest::Continuous { channel: 0 },
//!     ]);
//!     println!("{} extractions", results.len());
//!     Ok(())
//! }
//! # #[cfg(not(feature = "async"))]
//! # fn main() {}
//! ```

// Modules
pub mod block;
pub mod classify;
pub mod error;
pub mod header;
pub mod metadata;
pub mod options;
pub mod raw_data;
pub mod reader;
pub mod types;

mod utils;

// Re-export commonly used types at the crate root for convenience
pub use error::{PlxError, Result};

// Type exports
pub use types::{BlockType, ChannelClass, SortedUnit, STROBED_CHANNEL};

pub use options::{ReaderOptions, WaveformPolicy};

// Header and metadata exports
pub use header::{CreationDate, FileHeader, Headers};
pub use metadata::{ChannelDescriptor, ChannelIndex, DspChannelHeader, EventChannelHeader, SlowChannelHeader};

// Block and record exports
pub use block::{BlockHeader, DataBlock};
pub use classify::{
    classify, ClassifiedRecord, ClassifyContext, ContinuousRecord, ContinuousSample, DataQualityWarning, EventKind,
    EventRecord, SpikeRecord,
};

// Reader exports
pub use reader::{
    BlockIter, ContinuousData, CountAudit, CountMismatch, CountTable, ExternalEvent, ExtractRequest, Extracted,
    PlxReader, SpikeEvent, SpikeWaveform,
};

// Prelude module for glob imports
pub mod prelude {
    //! Convenient imports for common use cases.
    //!
    //! ```rust
    //! use plx_rs::prelude::*;
    //! ```

    pub use crate::classify::ClassifiedRecord;
    pub use crate::error::{PlxError, Result};
    pub use crate::options::{ReaderOptions, WaveformPolicy};
    pub use crate::reader::{ExtractRequest, PlxReader};
    pub use crate::types::{BlockType, ChannelClass, SortedUnit};
}

/// Magic number at the start of every PLX file ("PLEX" little-endian)
pub const PLX_MAGIC: u32 = FileHeader::MAGIC;

/// The library version
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
pub(crate) mod test_util;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert_eq!(PLX_MAGIC, 0x58454C50);
        assert_eq!(&PLX_MAGIC.to_le_bytes(), b"PLEX");
        assert!(!LIBRARY_VERSION.is_empty());
    }

    #[test]
    fn test_record_sizes() {
        assert_eq!(FileHeader::SIZE, 7504);
        assert_eq!(DspChannelHeader::SIZE, 1020);
        assert_eq!(EventChannelHeader::SIZE, 296);
        assert_eq!(SlowChannelHeader::SIZE, 296);
        assert_eq!(BlockHeader::SIZE, 16);
    }

    #[test]
    fn test_end_to_end_two_spikes() {
        let mut blocks = test_util::BlockWriter::new();
        blocks.spike(1000, 1, 1, &[]);
        blocks.spike(2000, 1, 1, &[5, -5, 10]);
        let bytes = test_util::PlxFileBuilder::new()
            .dsp_channel(1, "sig001", 1)
            .blocks(&blocks)
            .build();

        let mut reader = PlxReader::from_bytes(bytes).unwrap();
        let all = reader.read_all_blocks().unwrap();
        let lengths: Vec<usize> = all.iter().map(|b| b.samples.len()).collect();
        assert_eq!(lengths, vec![0, 3]);
        assert!(all.iter().all(|b| b.block_type == BlockType::Spike));
    }
}
