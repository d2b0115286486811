//! The stall-aware variant the CLI drives by default: identical pixel
//! output to [`crate::SequentialRasterizer`] (both are built on the same
//! [`RasterCore`]), but additionally tallies the performance counters the
//! reference SoC exposes — busy cycles, depth-read coalescing, and
//! pass/fail counts — for observational purposes only.

use gs_command_processor::{CommandProcessor, RasterSink};
use gs_memory::BurstMemory;
use gs_twin_core::{PixelSample, TwinError};

use crate::config::RasterConfig;
use crate::core::RasterCore;

/// Observational counters; never consulted by correctness-affecting code.
#[derive(Default, Debug, Clone, Copy)]
pub struct PerfCounters {
    pub pixels_processed: u64,
    pub pixels_depth_passed: u64,
    pub depth_reads_coalesced: u64,
    pub texture_writes: u64,
    pub wait_idle_count: u64,
    pub wait_clear_idle_count: u64,
}

pub struct PipelinedRasterizer {
    core: RasterCore,
    command_processor: CommandProcessor,
    pub perf: PerfCounters,
}

impl PipelinedRasterizer {
    pub fn new(config: RasterConfig) -> Self {
        let command_processor = CommandProcessor::new(config.divider_unroll);
        Self { core: RasterCore::new(config), command_processor, perf: PerfCounters::default() }
    }

    pub fn config(&self) -> &RasterConfig {
        &self.core.config
    }

    pub fn set_base_addrs(&mut self, fb_base: u32, z_base: u32) {
        self.core.set_base_addrs(fb_base, z_base);
    }

    pub fn run_command_buffer(&mut self, mem: &mut BurstMemory, stream: &[u8]) -> Result<(), TwinError> {
        let mut sink = CountingSink { core: &mut self.core, perf: &mut self.perf };
        self.command_processor.run(stream, mem, &mut sink)
    }
}

struct CountingSink<'a> {
    core: &'a mut RasterCore,
    perf: &'a mut PerfCounters,
}

impl RasterSink for CountingSink<'_> {
    fn draw_pixel(&mut self, mem: &mut BurstMemory, sample: PixelSample) {
        let outcome = self.core.process_pixel(mem, sample);
        self.perf.pixels_processed += 1;
        if outcome.depth_passed {
            self.perf.pixels_depth_passed += 1;
        }
        if outcome.depth_coalesced {
            self.perf.depth_reads_coalesced += 1;
        }
    }

    fn texture_write(&mut self, buffer: u8, addr: u16, data: u64) {
        self.core.texture_write(buffer, addr, data);
        self.perf.texture_writes += 1;
    }

    fn wait_idle(&mut self) {
        self.perf.wait_idle_count += 1;
    }

    fn wait_clear_idle(&mut self) {
        self.perf.wait_clear_idle_count += 1;
    }
}
