//! The scalar reference rasterizer: walks triangles and drains commands
//! with no bookkeeping beyond what correctness requires. This is the
//! golden oracle the pipelined variant and the integration tests are
//! checked against (§8's round-trip property).

use gs_command_processor::CommandProcessor;
use gs_memory::BurstMemory;
use gs_twin_core::TwinError;

use crate::config::RasterConfig;
use crate::core::{RasterCore, SinkAdapter};

pub struct SequentialRasterizer {
    core: RasterCore,
    command_processor: CommandProcessor,
}

impl SequentialRasterizer {
    pub fn new(config: RasterConfig) -> Self {
        let command_processor = CommandProcessor::new(config.divider_unroll);
        Self { core: RasterCore::new(config), command_processor }
    }

    pub fn config(&self) -> &RasterConfig {
        &self.core.config
    }

    pub fn set_base_addrs(&mut self, fb_base: u32, z_base: u32) {
        self.core.set_base_addrs(fb_base, z_base);
    }

    /// Fully execute a decoded command stream against `mem`, which must
    /// contain the frame buffer, depth buffer, and (if the stream has a
    /// `LOAD_TEXTURE`) nothing texture-related — texture banks are
    /// modeled separately from main memory, matching the reference's
    /// dedicated texture SRAM.
    pub fn run_command_buffer(&mut self, mem: &mut BurstMemory, stream: &[u8]) -> Result<(), TwinError> {
        let mut sink = SinkAdapter { core: &mut self.core };
        self.command_processor.run(stream, mem, &mut sink)
    }
}
