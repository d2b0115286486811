//! Command processor, component I: decodes the byte-coded command stream
//! the host driver DMAs in, and drives the triangle walker, texture bank
//! writes, and buffer clears it names.
//!
//! The processor owns its own edge walker (so `DRAW_TRIANGLE` fully walks
//! a triangle before the next command is even decoded) and calls straight
//! into [`gs_buffer_clearer`] for `CLEAR_BUFFER`. It knows nothing about
//! interpolation, depth testing, texture sampling, or pixel writing —
//! those all happen downstream, through the [`RasterSink`] the caller
//! supplies, so this crate stays decoupled from the rest of the pipeline.

use bits::extract_bits;
use gs_buffer_clearer::BufferClearer;
use gs_memory::BurstMemory;
use gs_rasterizer::EdgeWalker;
use gs_twin_core::{ScreenVertex, Triangle, TwinError};
use log::warn;

pub const OPCODE_DRAW_TRIANGLE: u8 = 0x01;
pub const OPCODE_LOAD_TEXTURE: u8 = 0x02;
pub const OPCODE_WAIT_IDLE: u8 = 0x03;
pub const OPCODE_CLEAR_BUFFER: u8 = 0x04;
pub const OPCODE_WAIT_CLEAR_IDLE: u8 = 0x05;

/// Everything downstream of command decoding: where covered pixels, raw
/// texture writes, and the two wait barriers go. `gs-twin` implements this
/// to wire in the interpolator, depth tester, texture banks, and pixel
/// writer without this crate needing to depend on any of them.
pub trait RasterSink {
    fn draw_pixel(&mut self, mem: &mut BurstMemory, sample: gs_twin_core::PixelSample);
    fn texture_write(&mut self, buffer: u8, addr: u16, data: u64);
    fn wait_idle(&mut self);
    fn wait_clear_idle(&mut self);
}

pub struct CommandProcessor {
    walker: EdgeWalker,
}

impl CommandProcessor {
    pub fn new(divider_unroll: u32) -> Self {
        Self { walker: EdgeWalker::new(divider_unroll) }
    }

    /// Run the entire command stream found in `stream`, dispatching each
    /// command as it's decoded. `target_mem` is the memory `CLEAR_BUFFER`
    /// writes into (the same address space as the frame/depth buffers).
    pub fn run(
        &mut self,
        stream: &[u8],
        target_mem: &mut BurstMemory,
        sink: &mut impl RasterSink,
    ) -> Result<(), TwinError> {
        let mut i = 0usize;
        while i + 4 <= stream.len() {
            let header = read_u32(stream, i)?;
            i += 4;
            let opcode = (header & 0x3F) as u8;

            match opcode {
                OPCODE_DRAW_TRIANGLE => {
                    let texture_enable = extract_bits(header as u64, 6, 1) != 0;
                    let texture_buffer = extract_bits(header as u64, 7, 2) as u8;
                    let mut vertices = [ScreenVertex { x: 0, y: 0, z: 0, attr0: 0, attr1: 0, b: 0 }; 3];
                    for v in vertices.iter_mut() {
                        let word = read_u64(stream, i)?;
                        *v = ScreenVertex::unpack(word);
                        i += 8;
                    }
                    let triangle = Triangle::new(vertices, texture_enable, texture_buffer);
                    for sample in self.walker.walk(triangle) {
                        sink.draw_pixel(target_mem, sample);
                    }
                }
                OPCODE_LOAD_TEXTURE => {
                    let buffer = extract_bits(header as u64, 6, 2) as u8;
                    let s_hi = extract_bits(header as u64, 8, 1) as u32;
                    let s_start = extract_bits(header as u64, 9, 6) as u32 | (s_hi << 6);
                    let s_end = extract_bits(header as u64, 15, 6) as u32 | (s_hi << 6);
                    let t_hi = extract_bits(header as u64, 21, 1) as u32;
                    let t_half_start = extract_bits(header as u64, 22, 5) as u32 | (t_hi << 5);
                    let t_half_end = extract_bits(header as u64, 27, 5) as u32 | (t_hi << 5);

                    if s_end < s_start || t_half_end < t_half_start {
                        return Err(TwinError::InvalidTextureRegion { s_start, s_end, t_half_start, t_half_end });
                    }

                    for s in s_start..=s_end {
                        for t_half in t_half_start..=t_half_end {
                            if i + 6 > stream.len() {
                                return Err(TwinError::TruncatedCommand { remaining: stream.len() - i });
                            }
                            let mut buf = [0u8; 8];
                            buf[..6].copy_from_slice(&stream[i..i + 6]);
                            i += 6;
                            let data = u64::from_le_bytes(buf);
                            let addr = (s * 64 + t_half) as u16;
                            sink.texture_write(buffer, addr, data);
                        }
                    }
                }
                OPCODE_WAIT_IDLE => sink.wait_idle(),
                OPCODE_CLEAR_BUFFER => {
                    let pattern = extract_bits(header as u64, 8, 24) as u32;
                    let addr_128 = read_u32(stream, i)?;
                    i += 4;
                    let words = read_u32(stream, i)?;
                    i += 4;
                    BufferClearer::clear(target_mem, addr_128 << 7, words, pattern)?;
                }
                OPCODE_WAIT_CLEAR_IDLE => sink.wait_clear_idle(),
                other => {
                    warn!("command processor: unknown opcode {other:#04x} at word {}, skipping", i / 4 - 1);
                }
            }
        }
        Ok(())
    }
}

fn read_u32(stream: &[u8], i: usize) -> Result<u32, TwinError> {
    stream
        .get(i..i + 4)
        .map(|b| u32::from_le_bytes(b.try_into().unwrap()))
        .ok_or(TwinError::TruncatedCommand { remaining: stream.len().saturating_sub(i) })
}

fn read_u64(stream: &[u8], i: usize) -> Result<u64, TwinError> {
    stream
        .get(i..i + 8)
        .map(|b| u64::from_le_bytes(b.try_into().unwrap()))
        .ok_or(TwinError::TruncatedCommand { remaining: stream.len().saturating_sub(i) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        pixels: usize,
        texture_writes: Vec<(u8, u16, u64)>,
        wait_idles: u32,
        wait_clear_idles: u32,
    }

    impl RasterSink for RecordingSink {
        fn draw_pixel(&mut self, _mem: &mut BurstMemory, _sample: gs_twin_core::PixelSample) {
            self.pixels += 1;
        }
        fn texture_write(&mut self, buffer: u8, addr: u16, data: u64) {
            self.texture_writes.push((buffer, addr, data));
        }
        fn wait_idle(&mut self) {
            self.wait_idles += 1;
        }
        fn wait_clear_idle(&mut self) {
            self.wait_clear_idles += 1;
        }
    }

    fn draw_triangle_command() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(OPCODE_DRAW_TRIANGLE as u32).to_le_bytes());
        let verts = [
            ScreenVertex::new(0, 0, 100, 10, 20, 30).unwrap(),
            ScreenVertex::new(10, 0, 100, 10, 20, 30).unwrap(),
            ScreenVertex::new(0, 10, 100, 10, 20, 30).unwrap(),
        ];
        for v in verts {
            bytes.extend_from_slice(&v.pack().to_le_bytes());
        }
        bytes
    }

    #[test]
    fn decodes_and_walks_a_triangle() {
        let mut cp = CommandProcessor::new(24);
        let mut mem = BurstMemory::new(4096);
        let mut sink = RecordingSink::default();
        cp.run(&draw_triangle_command(), &mut mem, &mut sink).unwrap();
        assert!(sink.pixels > 0);
    }

    #[test]
    fn wait_idle_reaches_the_sink() {
        let mut cp = CommandProcessor::new(24);
        let mut mem = BurstMemory::new(4096);
        let mut sink = RecordingSink::default();
        let cmd = (OPCODE_WAIT_IDLE as u32).to_le_bytes();
        cp.run(&cmd, &mut mem, &mut sink).unwrap();
        assert_eq!(sink.wait_idles, 1);
    }

    #[test]
    fn clear_buffer_writes_directly_to_memory() {
        let mut cp = CommandProcessor::new(24);
        let mut mem = BurstMemory::new(4096);
        let mut sink = RecordingSink::default();
        let mut cmd = Vec::new();
        let pattern: u32 = 0x00_030201;
        let header = (OPCODE_CLEAR_BUFFER as u32) | (pattern << 8);
        cmd.extend_from_slice(&header.to_le_bytes());
        cmd.extend_from_slice(&0u32.to_le_bytes());
        cmd.extend_from_slice(&8u32.to_le_bytes());
        cp.run(&cmd, &mut mem, &mut sink).unwrap();
        assert_eq!(mem.read_bytes(0, 3), &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn load_texture_emits_one_write_per_texel_pair() {
        let mut cp = CommandProcessor::new(24);
        let mut mem = BurstMemory::new(4096);
        let mut sink = RecordingSink::default();
        let mut cmd = Vec::new();
        // s in [0,0], t_half in [0,1]: two texel-pair writes, s_hi=0, t_hi=0.
        let header = (OPCODE_LOAD_TEXTURE as u32) | (1 << 27);
        cmd.extend_from_slice(&header.to_le_bytes());
        cmd.extend_from_slice(&[0u8; 12]);
        cp.run(&cmd, &mut mem, &mut sink).unwrap();
        assert_eq!(sink.texture_writes.len(), 2);
        assert_eq!(sink.texture_writes[0].1, 0);
        assert_eq!(sink.texture_writes[1].1, 1);
    }

    #[test]
    fn inverted_texture_region_is_rejected() {
        let mut cp = CommandProcessor::new(24);
        let mut mem = BurstMemory::new(4096);
        let mut sink = RecordingSink::default();
        // s_start_lo (bits 9..15) = 5, s_end_lo (bits 15..21) = 2: end < start.
        let header = (OPCODE_LOAD_TEXTURE as u32) | (5 << 9) | (2 << 15);
        let cmd = header.to_le_bytes();
        assert!(matches!(cp.run(&cmd, &mut mem, &mut sink), Err(TwinError::InvalidTextureRegion { .. })));
    }

    #[test]
    fn unknown_opcode_is_skipped_not_fatal() {
        let mut cp = CommandProcessor::new(24);
        let mut mem = BurstMemory::new(4096);
        let mut sink = RecordingSink::default();
        let cmd = 0x3Fu32.to_le_bytes();
        assert!(cp.run(&cmd, &mut mem, &mut sink).is_ok());
    }
}
