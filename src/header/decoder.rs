// src/header/decoder.rs
use crate::error::{PlxError, Result};
use crate::header::FileHeader;
use crate::metadata::{DspChannelHeader, EventChannelHeader, SlowChannelHeader};
use crate::raw_data::{BinaryCursor, ReadSeek};
use crate::types::ChannelClass;

/// Everything in front of the data-block stream
#[derive(Debug, Clone)]
pub struct Headers {
    pub file: FileHeader,
    pub dsp: Vec<DspChannelHeader>,
    pub events: Vec<EventChannelHeader>,
    pub slow: Vec<SlowChannelHeader>,
    /// Offset of the first data block
    pub data_start: u64,
}

impl Headers {
    /// Data-start offset implied by the record sizes and the decoded counts
    pub fn expected_data_start(&self) -> u64 {
        FileHeader::SIZE as u64
            + self.dsp.len() as u64 * DspChannelHeader::SIZE as u64
            + self.events.len() as u64 * EventChannelHeader::SIZE as u64
            + self.slow.len() as u64 * SlowChannelHeader::SIZE as u64
    }
}

/// Decode the file header and the three channel-header arrays.
///
/// The arrays are positional: DSP headers, then event headers, then slow
/// headers, each `count * record size` bytes with the count taken from the
/// file header. The cursor is left at the first data block.
pub fn decode_headers<R: ReadSeek>(cursor: &mut BinaryCursor<R>, verify_magic: bool) -> Result<Headers> {
    cursor.seek(0)?;

    if cursor.remaining() < FileHeader::SIZE as u64 {
        return Err(PlxError::MalformedHeader {
            expected: FileHeader::SIZE,
            found: cursor.remaining(),
        });
    }
    let record = cursor.read_exact(FileHeader::SIZE)?;
    let file = FileHeader::parse(&record)?;

    if verify_magic && !file.has_valid_magic() {
        return Err(PlxError::InvalidMagic {
            expected: FileHeader::MAGIC,
            found: file.magic,
        });
    }
    log::debug!(
        "PLX header: version {}, {} Hz, {} DSP / {} event / {} slow channels",
        file.version,
        file.ad_frequency,
        file.num_dsp_channels,
        file.num_event_channels,
        file.num_slow_channels
    );

    let dsp = read_channel_array(
        cursor,
        ChannelClass::Dsp,
        file.num_dsp_channels,
        DspChannelHeader::SIZE,
        DspChannelHeader::parse,
    )?;
    let events = read_channel_array(
        cursor,
        ChannelClass::Event,
        file.num_event_channels,
        EventChannelHeader::SIZE,
        EventChannelHeader::parse,
    )?;
    let slow = read_channel_array(
        cursor,
        ChannelClass::Slow,
        file.num_slow_channels,
        SlowChannelHeader::SIZE,
        SlowChannelHeader::parse,
    )?;

    let headers = Headers {
        file,
        dsp,
        events,
        slow,
        data_start: cursor.position(),
    };
    debug_assert_eq!(headers.data_start, headers.expected_data_start());
    log::debug!("PLX data blocks start at offset {}", headers.data_start);

    Ok(headers)
}

fn read_channel_array<R, T>(
    cursor: &mut BinaryCursor<R>,
    class: ChannelClass,
    count: i32,
    record_size: usize,
    parse: fn(&[u8]) -> Result<T>,
) -> Result<Vec<T>>
where
    R: ReadSeek,
{
    if count < 0 {
        log::warn!("Negative {} channel count {} in file header, reading none", class, count);
        return Ok(Vec::new());
    }
    if count == 0 {
        return Ok(Vec::new());
    }

    let needed = count as u64 * record_size as u64;
    let len = usize::try_from(needed).map_err(|_| PlxError::TruncatedInput {
        offset: cursor.position(),
        needed,
        available: cursor.remaining(),
    })?;
    let bytes = cursor.read_exact(len)?;
    bytes.chunks_exact(record_size).map(parse).collect()
}
