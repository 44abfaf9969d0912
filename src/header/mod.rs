// src/header/mod.rs
mod decoder;
mod file_header;

pub use decoder::{decode_headers, Headers};
pub use file_header::{
    CreationDate, FileHeader, UnitCount, AD_COUNT_OFFSET, COUNT_TABLE_CHANNELS, COUNT_TABLE_UNITS,
    EVENT_COUNT_SLOTS,
};
