//! The shared per-pixel pipeline downstream of command decoding:
//! interpolate, depth-test, texture-sample (if enabled), then write. Both
//! [`crate::SequentialRasterizer`] and [`crate::PipelinedRasterizer`] are
//! built on this so they can never disagree about which pixels end up in
//! the frame buffer — only about what they additionally count along the
//! way.

use gs_command_processor::RasterSink;
use gs_early_z::{DepthReader, DepthTester};
use gs_memory::BurstMemory;
use gs_pixel_write::PixelWriter;
use gs_rasterizer::Interpolator;
use gs_texture::TextureBanks;
use gs_twin_core::PixelSample;

use crate::config::RasterConfig;

pub struct RasterCore {
    pub config: RasterConfig,
    pub banks: TextureBanks,
    pub depth_reader: DepthReader,
}

/// What happened to one pixel, for the pipelined variant's counters.
pub struct PixelOutcome {
    pub depth_coalesced: bool,
    pub depth_passed: bool,
}

impl RasterCore {
    pub fn new(config: RasterConfig) -> Self {
        Self { config, banks: TextureBanks::new(), depth_reader: DepthReader::new() }
    }

    /// Run one [`PixelSample`] through interpolation, texture sampling,
    /// and the depth test, writing the frame/depth buffers on a pass.
    pub fn process_pixel(&mut self, mem: &mut BurstMemory, sample: PixelSample) -> PixelOutcome {
        let interpolated = Interpolator::interpolate(&sample);

        let color = if interpolated.texture_enable {
            self.banks
                .sample(interpolated.texture_buffer, interpolated.attr0, interpolated.attr1)
                .unwrap_or(0)
        } else {
            // Matches the reference interpolator's `Cat(b, g, r)` packing:
            // b occupies the low (first-written) byte, r the high byte, so
            // the resulting bytes land in the frame buffer's B,G,R order.
            (interpolated.attr0 as u32) << 16 | (interpolated.attr1 as u32) << 8 | interpolated.attr2 as u32
        };

        let (depth_passed, depth_coalesced) =
            DepthTester::test_and_write(&mut self.depth_reader, mem, self.config.z_base, self.config.width, &interpolated);
        if depth_passed {
            PixelWriter::write_pixel(mem, self.config.fb_base, self.config.width, interpolated.x, interpolated.y, color);
        }

        PixelOutcome { depth_coalesced, depth_passed }
    }

    pub fn texture_write(&mut self, buffer: u8, addr: u16, data: u64) {
        let _ = self.banks.write(buffer, addr, data);
    }

    /// Repoint the frame/depth buffer bases, the way writing `FB_BASE`/
    /// `Z_BASE` does on the real register file before a `CMD_CTRL` trigger.
    pub fn set_base_addrs(&mut self, fb_base: u32, z_base: u32) {
        self.config.fb_base = fb_base;
        self.config.z_base = z_base;
    }
}

/// Adapts a [`RasterCore`] to the [`RasterSink`] trait the command
/// processor drives, forwarding every pixel through
/// [`RasterCore::process_pixel`] and discarding the per-pixel outcome —
/// used by [`crate::SequentialRasterizer`], which doesn't keep performance
/// counters.
pub struct SinkAdapter<'a> {
    pub core: &'a mut RasterCore,
}

impl RasterSink for SinkAdapter<'_> {
    fn draw_pixel(&mut self, mem: &mut BurstMemory, sample: PixelSample) {
        self.core.process_pixel(mem, sample);
    }

    fn texture_write(&mut self, buffer: u8, addr: u16, data: u64) {
        self.core.texture_write(buffer, addr, data);
    }

    fn wait_idle(&mut self) {}
    fn wait_clear_idle(&mut self) {}
}
