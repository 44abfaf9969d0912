//! Low-level byte access for PLX sources
//!
//! - [`BinaryCursor`] reads a fixed-size source sequentially with
//!   "exactly N bytes or fail" semantics
//! - [`RecordReader`] decodes the fields of one fixed-size record
//!
//! # Example
//!
//! ```
//! use plx_rs::raw_data::{BinaryCursor, RecordReader};
//! use std::io::Cursor;
//!
//! let data = vec![0x10u8, 0x27, 0, 0, 1, 0];
//! let mut cursor = BinaryCursor::new(Cursor::new(data)).unwrap();
//!
//! let record = cursor.read_exact(4).unwrap();
//! let mut fields = RecordReader::new(&record);
//! assert_eq!(fields.i32().unwrap(), 10000);
//! assert_eq!(cursor.remaining(), 2);
//! ```

mod cursor;
mod reader;

pub use cursor::{BinaryCursor, ReadSeek};
pub use reader::{decode_words, RecordReader};
