// src/reader/sync_reader.rs
use crate::block::DataBlock;
use crate::classify::{ClassifiedRecord, ClassifyContext};
use crate::error::Result;
use crate::header::{decode_headers, FileHeader};
use crate::metadata::{ChannelDescriptor, ChannelIndex, DspChannelHeader, EventChannelHeader, SlowChannelHeader};
use crate::options::{ReaderOptions, WaveformPolicy};
use crate::raw_data::{BinaryCursor, ReadSeek};
use crate::reader::scan::BlockIter;
use crate::types::ChannelClass;
use bytes::Bytes;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

#[cfg(feature = "mmap")]
use memmap2::Mmap;

/// Synchronous PLX file reader.
///
/// Opening a reader decodes the file header and every channel header; the
/// data blocks are only read by [`PlxReader::scan`] and the extraction
/// methods, each of which restarts from the first data block.
pub struct PlxReader<R: ReadSeek> {
    pub(crate) cursor: BinaryCursor<R>,
    pub(crate) header: FileHeader,
    pub(crate) channels: ChannelIndex,
    pub(crate) data_start: u64,
    pub(crate) options: ReaderOptions,
}

/// Constructor for standard file I/O
impl PlxReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, ReaderOptions::default())
    }

    pub fn open_with_options(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Opening PLX file {}", path.display());
        let file = File::open(path)?;
        let source = BufReader::with_capacity(options.buffer_capacity, file);
        PlxReader::with_options(source, options)
    }
}

/// Constructor for memory-mapped file I/O (requires "mmap" feature)
#[cfg(feature = "mmap")]
impl PlxReader<Cursor<Mmap>> {
    pub fn open_mmap(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_mmap_with_options(path, ReaderOptions::default())
    }

    pub fn open_mmap_with_options(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        PlxReader::with_options(Cursor::new(mmap), options)
    }
}

/// Constructors for in-memory sources
impl PlxReader<Cursor<Bytes>> {
    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self> {
        Self::from_bytes_with_options(data, ReaderOptions::default())
    }

    pub fn from_bytes_with_options(data: impl Into<Bytes>, options: ReaderOptions) -> Result<Self> {
        PlxReader::with_options(Cursor::new(data.into()), options)
    }

    /// Read a whole file on the tokio runtime, then decode its headers
    #[cfg(feature = "async")]
    pub async fn open_async(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_async_with_options(path, ReaderOptions::default()).await
    }

    #[cfg(feature = "async")]
    pub async fn open_async_with_options(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Self> {
        let data = tokio::fs::read(path.as_ref()).await?;
        Self::from_bytes_with_options(data, options)
    }

    /// The shared buffer behind this reader
    pub fn source(&self) -> &Bytes {
        self.cursor.get_ref().get_ref()
    }
}

/// Generic implementation for all PlxReader variants
impl<R: ReadSeek> PlxReader<R> {
    pub fn new(source: R) -> Result<Self> {
        Self::with_options(source, ReaderOptions::default())
    }

    pub fn with_options(source: R, options: ReaderOptions) -> Result<Self> {
        let mut cursor = BinaryCursor::new(source)?;
        let headers = decode_headers(&mut cursor, options.verify_magic)?;
        let channels = ChannelIndex::new(headers.dsp, headers.events, headers.slow);

        Ok(PlxReader {
            cursor,
            header: headers.file,
            channels,
            data_start: headers.data_start,
            options,
        })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn channels(&self, class: ChannelClass) -> Vec<ChannelDescriptor<'_>> {
        self.channels.channels(class)
    }

    pub fn dsp_channels(&self) -> &[DspChannelHeader] {
        self.channels.dsp_channels()
    }

    pub fn event_channels(&self) -> &[EventChannelHeader] {
        self.channels.event_channels()
    }

    pub fn slow_channels(&self) -> &[SlowChannelHeader] {
        self.channels.slow_channels()
    }

    pub fn channel_index(&self) -> &ChannelIndex {
        &self.channels
    }

    /// Offset of the first data block
    pub fn data_start(&self) -> u64 {
        self.data_start
    }

    /// Total size of the source in bytes
    pub fn len(&self) -> u64 {
        self.cursor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.is_empty()
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Current byte offset of the underlying cursor
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn context(&self) -> ClassifyContext<'_> {
        ClassifyContext::new(&self.header, &self.channels)
    }

    pub fn classify<'a>(&'a self, block: &'a DataBlock) -> ClassifiedRecord<'a> {
        self.context().classify(block)
    }

    /// Iterate over every data block from the start of the block stream,
    /// using the reader's default waveform policy
    pub fn scan(&mut self) -> BlockIter<'_, R> {
        let policy = self.options.waveforms;
        self.scan_with(policy)
    }

    pub fn scan_with(&mut self, policy: WaveformPolicy) -> BlockIter<'_, R> {
        BlockIter::new(&mut self.cursor, self.data_start, policy)
    }

    /// Decode every block into memory
    pub fn read_all_blocks(&mut self) -> Result<Vec<DataBlock>> {
        self.scan().collect()
    }

    /// Split borrow used by scans that classify as they go
    pub(crate) fn scan_parts(&mut self, policy: WaveformPolicy) -> (BlockIter<'_, R>, ClassifyContext<'_>) {
        let blocks = BlockIter::new(&mut self.cursor, self.data_start, policy);
        (blocks, ClassifyContext::new(&self.header, &self.channels))
    }
}
