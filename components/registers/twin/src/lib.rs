//! Single source of truth for the rasterizer's memory-mapped control block
//! and the handful of hardware constants (texture bank geometry, vertex
//! field widths) that every component crate needs to agree on.
//!
//! Byte offsets below are load-bearing: they are read verbatim out of the
//! reference driver's register accessors, not re-derived.

#![allow(clippy::unreadable_literal)]

use num_traits::PrimInt;

/// Byte offsets of each 32-bit control register within the rasterizer's
/// register block.
pub mod offsets {
    pub const IRQ_STATUS: u32 = 0x00;
    pub const IRQ_MASK: u32 = 0x04;
    pub const FB_BASE: u32 = 0x08;
    pub const Z_BASE: u32 = 0x0C;
    pub const IDLE: u32 = 0x10;
    pub const CMD_ADDR_64: u32 = 0x14;
    pub const CMD_WORDS: u32 = 0x18;
    pub const CMD_CTRL: u32 = 0x1C;
    pub const CMD_DMA_IDLE: u32 = 0x20;
    pub const CMD_IDLE: u32 = 0x24;
    /// One past the last defined register; the size of the block.
    pub const BLOCK_BYTES: u32 = 0x28;
}

/// Bit positions within `IRQ_STATUS`/`IRQ_MASK`.
pub mod irq {
    pub const COMMAND_DONE: u32 = 1 << 0;
    pub const COMMAND_DMA_DONE: u32 = 1 << 1;
    pub const ALL: u32 = COMMAND_DONE | COMMAND_DMA_DONE;
}

/// Hardware constants shared by every component crate.
pub mod constants {
    /// Number of independent texture SRAM banks.
    pub const TEXTURE_BANK_COUNT: usize = 4;
    /// Texture bank width and height, in texels.
    pub const TEXTURE_BANK_SIZE: usize = 128;
    /// Texels packed per 48-bit SRAM word.
    pub const TEXTURE_TEXELS_PER_WORD: usize = 2;
    /// Depth of each texture bank's backing memory, in 48-bit words.
    pub const TEXTURE_BANK_WORDS: usize =
        (TEXTURE_BANK_SIZE * TEXTURE_BANK_SIZE) / TEXTURE_TEXELS_PER_WORD;

    /// Bytes per frame buffer pixel (packed BGR, no padding).
    pub const FRAMEBUFFER_BYTES_PER_PIXEL: usize = 3;
    /// Bytes per depth buffer element.
    pub const DEPTH_BYTES_PER_PIXEL: usize = 2;
    /// Depth value written by a buffer clear; a fresh pixel's interpolated
    /// z always passes the `fetched_z < z` test against this.
    pub const DEPTH_CLEAR_VALUE: u16 = 0;

    /// AXI INCR bursts may not cross this many bytes.
    pub const AXI_4K_BOUNDARY: u32 = 4096;
    /// Width, in bytes, of one memory bus beat.
    pub const BUS_BEAT_BYTES: u32 = 8;
    /// Maximum beats in a single INCR burst (4-bit length field, `len+1`).
    pub const MAX_BURST_BEATS: u32 = 16;
    /// Maximum outstanding bursts the buffer clearer may have in flight.
    pub const MAX_OUTSTANDING_BURSTS: u32 = 64;

    /// Packed `ScreenVertex` field widths, in bits, in ascending bit-offset
    /// order: x, y, z, (r|s), (g|t), b.
    pub const VERTEX_FIELD_WIDTHS: [u32; 6] = [11, 11, 16, 8, 8, 8];
}

/// Extract a bitfield from a register value, returned widened to the
/// caller's integer type of choice.
pub fn field<T: PrimInt>(word: u32, lo: u32, width: u32) -> T {
    let mask: u32 = if width >= 32 { u32::MAX } else { (1u32 << width) - 1 };
    T::from((word >> lo) & mask).unwrap_or_else(T::zero)
}
