//! Frame buffer addressing and PNG export. The frame buffer is packed BGR8,
//! row-major, no padding, living at `fb_base` inside the shared
//! [`BurstMemory`](crate::bus::BurstMemory).

use gpu_registers::constants::FRAMEBUFFER_BYTES_PER_PIXEL;
use gs_twin_core::TwinError;

use crate::bus::BurstMemory;

/// Byte address of pixel `(x, y)` within a `width`-pixel-wide frame buffer
/// based at `fb_base`.
pub fn pixel_addr(fb_base: u32, width: u32, x: u32, y: u32) -> u32 {
    fb_base + (y * width + x) * FRAMEBUFFER_BYTES_PER_PIXEL as u32
}

/// Read back the full frame buffer as tightly packed `(width*height*3)`
/// BGR8 bytes, for golden-image comparison or PNG export.
pub fn read_frame(mem: &BurstMemory, fb_base: u32, width: u32, height: u32) -> Vec<u8> {
    let len = (width * height * FRAMEBUFFER_BYTES_PER_PIXEL as u32) as usize;
    mem.read_bytes(fb_base, len).to_vec()
}

/// Export the frame buffer to a PNG file, converting BGR8 to the `image`
/// crate's RGB8 pixel order.
pub fn export_png(
    mem: &BurstMemory,
    fb_base: u32,
    width: u32,
    height: u32,
    path: &std::path::Path,
) -> Result<(), TwinError> {
    let bgr = read_frame(mem, fb_base, width, height);
    let mut rgb = vec![0u8; bgr.len()];
    for (chunk_in, chunk_out) in bgr.chunks_exact(3).zip(rgb.chunks_exact_mut(3)) {
        chunk_out[0] = chunk_in[2];
        chunk_out[1] = chunk_in[1];
        chunk_out[2] = chunk_in[0];
    }
    let buf = image::RgbImage::from_raw(width, height, rgb)
        .expect("frame buffer byte length matches width*height*3");
    buf.save(path).map_err(|e| TwinError::ImageExport(e.to_string()))
}
