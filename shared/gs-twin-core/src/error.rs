//! Error types shared across the digital twin's component crates.

use thiserror::Error;

/// Errors the twin can report at its untrusted-input boundaries (command
/// stream decoding, bus transactions). The core pipeline itself has no
/// exception channel — these are raised by the decoders and bus model that
/// sit in front of it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TwinError {
    #[error("vertex field `{field}` = {value} exceeds its {width}-bit range")]
    VertexFieldOutOfRange {
        field: &'static str,
        value: u32,
        width: u32,
    },

    #[error("bus address {addr:#x} is not aligned to {align} bytes")]
    Misaligned { addr: u32, align: u32 },

    #[error(
        "INCR burst at {addr:#x} of {beats} beats ({beat_bytes} bytes each) crosses a 4KiB boundary"
    )]
    BurstCrosses4K {
        addr: u32,
        beats: u32,
        beat_bytes: u32,
    },

    #[error(
        "texture load region invalid: s {s_start}..={s_end}, t-half {t_half_start}..={t_half_end}"
    )]
    InvalidTextureRegion {
        s_start: u32,
        s_end: u32,
        t_half_start: u32,
        t_half_end: u32,
    },

    #[error("texture buffer index {buffer} out of range (0..4)")]
    InvalidTextureBuffer { buffer: u8 },

    #[error("unknown command opcode {opcode:#04x} at word offset {word_index}")]
    UnknownOpcode { opcode: u8, word_index: usize },

    #[error("command stream ended with {remaining} words of a pending command undelivered")]
    TruncatedCommand { remaining: usize },

    #[error("divider retriggered before the previous division completed")]
    DividerBusy,

    #[error("attempted division by zero")]
    DivisionByZero,

    #[error("image export failed: {0}")]
    ImageExport(String),
}

pub type Result<T> = std::result::Result<T, TwinError>;
