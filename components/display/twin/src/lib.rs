//! Display scanout stand-in. The reference design's HDMI output and video
//! timing generator are out of scope for this twin (there's no pixel clock
//! to be faithful to in software); what tests and the CLI actually need is
//! a way to pull the rendered frame out of memory and compare or save it,
//! so this crate is a thin wrapper over the frame buffer's PNG export.

use std::path::Path;

use gs_memory::BurstMemory;
use gs_twin_core::TwinError;

pub struct Display;

impl Display {
    /// Read out the current frame and write it to `path` as a PNG.
    pub fn scanout(mem: &BurstMemory, fb_base: u32, width: u32, height: u32, path: &Path) -> Result<(), TwinError> {
        gs_memory::framebuffer::export_png(mem, fb_base, width, height, path)
    }

    /// Read out the current frame as tightly packed BGR8 bytes, for
    /// golden-image comparison in tests.
    pub fn capture(mem: &BurstMemory, fb_base: u32, width: u32, height: u32) -> Vec<u8> {
        gs_memory::framebuffer::read_frame(mem, fb_base, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_matches_frame_buffer_contents() {
        let mut mem = BurstMemory::new(64);
        mem.write_bytes(0, &[1, 2, 3, 4, 5, 6]);
        let frame = Display::capture(&mem, 0, 2, 1);
        assert_eq!(frame, vec![1, 2, 3, 4, 5, 6]);
    }
}
