// src/error.rs
use crate::types::ChannelClass;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlxError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Truncated input at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedInput { offset: u64, needed: u64, available: u64 },

    #[error("Malformed file header: expected {expected} bytes, found {found}")]
    MalformedHeader { expected: usize, found: u64 },

    #[error("Invalid PLX magic number: expected {expected:#010x}, found {found:#010x}")]
    InvalidMagic { expected: u32, found: u32 },

    #[error("{class} channel {channel} not found")]
    ChannelNotFound { class: ChannelClass, channel: i32 },

    #[error("Invalid configuration for {class} channel {channel}: {reason}")]
    InvalidChannelConfig {
        class: ChannelClass,
        channel: i32,
        reason: String,
    },
}

impl PlxError {
    /// Structural errors mean the stream position can no longer be trusted,
    /// so the current scan must stop. Semantic errors only affect one record.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            PlxError::Io(_)
                | PlxError::TruncatedInput { .. }
                | PlxError::MalformedHeader { .. }
                | PlxError::InvalidMagic { .. }
        )
    }

    pub(crate) fn invalid_config(class: ChannelClass, channel: i32, reason: impl Into<String>) -> Self {
        PlxError::InvalidChannelConfig {
            class,
            channel,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlxError>;
