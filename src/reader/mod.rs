// src/reader/mod.rs
mod audit;
mod extract;
mod scan;
mod sync_reader;

pub use audit::{CountAudit, CountMismatch, CountTable};
pub use extract::{ContinuousData, ExternalEvent, ExtractRequest, Extracted, SpikeEvent, SpikeWaveform};
pub use scan::BlockIter;
pub use sync_reader::PlxReader;
