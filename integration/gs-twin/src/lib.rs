//! Top-level digital twin: the register block a host driver pokes, the
//! memory it DMAs command buffers and renders into, and the rasterizer
//! variant that actually executes them.
//!
//! [`Twin`] is the facade a CLI or test harness talks to: it never exposes
//! [`SequentialRasterizer`]/[`PipelinedRasterizer`] internals directly,
//! mirroring how a real driver only ever sees the register block and main
//! memory, never the pipeline stages behind them.

pub mod config;
pub mod core;
pub mod pipelined;
pub mod registers;
pub mod sequential;

use std::path::Path;

use gpu_registers::offsets;
use gs_memory::BurstMemory;
use gs_twin_core::TwinError;

pub use config::RasterConfig;
pub use pipelined::{PerfCounters, PipelinedRasterizer};
pub use registers::RegisterFile;
pub use sequential::SequentialRasterizer;

/// The command-decoder boundary has no exception channel of its own in the
/// reference design (§7): a malformed command stream or misaligned bus
/// transaction is an `assert` in the gateware testbench. Here it's a
/// recoverable `TwinError` so a host driver can report it instead of
/// crashing the process, but it's still logged at the point the reference
/// design would have asserted, for the same reason a hardware simulator
/// dumps its assertion message before halting.
fn trap(err: &TwinError) {
    log::error!("rasterizer boundary assertion: {err}");
}

/// The whole rasterizer peripheral: register block, address space, and the
/// pipelined engine the CLI drives by default. A `CMD_CTRL` toggle write
/// synchronously drains the named command buffer before the write call
/// returns — there's no background thread, matching how every other
/// software-twin call in this crate is a whole-operation function rather
/// than a cycle-stepped one (§5's software-parallel execution mode).
pub struct Twin {
    mem: BurstMemory,
    regs: RegisterFile,
    rasterizer: PipelinedRasterizer,
}

impl Twin {
    pub fn new(config: RasterConfig, mem_size: usize) -> Self {
        Self { mem: BurstMemory::new(mem_size), regs: RegisterFile::new(), rasterizer: PipelinedRasterizer::new(config) }
    }

    pub fn mem(&self) -> &BurstMemory {
        &self.mem
    }

    pub fn mem_mut(&mut self) -> &mut BurstMemory {
        &mut self.mem
    }

    pub fn perf(&self) -> &PerfCounters {
        &self.rasterizer.perf
    }

    pub fn read_register(&self, offset: u32) -> u32 {
        self.regs.read(offset)
    }

    /// Write a control register. A `CMD_CTRL` toggle runs the command
    /// buffer named by `CMD_ADDR_64`/`CMD_WORDS` to completion, raising
    /// `IRQ_STATUS` bits on the way out exactly as [`RegisterFile::mark_complete`]
    /// describes.
    pub fn write_register(&mut self, offset: u32, value: u32) -> Result<(), TwinError> {
        let triggered = self.regs.write(offset, value);
        if triggered {
            self.run_named_command_buffer()?;
        }
        Ok(())
    }

    pub fn irq_pending(&self) -> bool {
        self.regs.irq_line_asserted()
    }

    /// Read the command stream out of memory at `CMD_ADDR_64 << 6` for
    /// `CMD_WORDS` 32-bit words, run it, and mark the engine idle again.
    fn run_named_command_buffer(&mut self) -> Result<(), TwinError> {
        let addr = self.regs.cmd_addr_64() << 6;
        let len = (self.regs.cmd_words() as usize) * 4;
        let stream = self.mem.read_bytes(addr, len).to_vec();
        self.rasterizer.set_base_addrs(self.regs.fb_base(), self.regs.z_base());
        self.rasterizer.run_command_buffer(&mut self.mem, &stream).inspect_err(trap)?;
        self.regs.mark_complete();
        Ok(())
    }

    /// Run a command stream directly, bypassing the register file's
    /// `CMD_ADDR_64`/`CMD_CTRL` dance — convenient for tests and the CLI,
    /// which already have the stream in hand rather than staged in `mem`.
    pub fn submit_command_buffer(&mut self, stream: &[u8]) -> Result<(), TwinError> {
        let config = *self.rasterizer.config();
        self.rasterizer.set_base_addrs(config.fb_base, config.z_base);
        self.rasterizer.run_command_buffer(&mut self.mem, stream).inspect_err(trap)
    }

    pub fn scanout(&self, path: &Path) -> Result<(), TwinError> {
        let config = self.rasterizer.config();
        gs_display::Display::scanout(&self.mem, config.fb_base, config.width, config.height, path)
    }

    pub fn capture(&self) -> Vec<u8> {
        let config = self.rasterizer.config();
        gs_display::Display::capture(&self.mem, config.fb_base, config.width, config.height)
    }
}
