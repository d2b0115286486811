//! Depth reader and depth tester, components D and E of the rasterizer
//! pipeline: fetch the stored depth for a covered pixel and compare it
//! against the interpolated depth before the pixel is allowed to write.

use gs_memory::{depthbuffer, BurstMemory};
use gs_twin_core::InterpolatedPixel;

/// Fetches the stored depth for a pixel, coalescing repeated reads of the
/// same 8-byte depth word the way the reference depth reader does (four
/// adjacent pixels share a beat, so a left-to-right scan re-reads the same
/// word up to four times running).
#[derive(Default)]
pub struct DepthReader {
    last_word_addr: Option<u32>,
    last_word: u64,
}

impl DepthReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the depth at `(x, y)`, reusing the last beat read if it's the
    /// same word. Returns the stored depth and whether the read was
    /// coalesced (served from the cached beat rather than the bus).
    pub fn fetch(&mut self, mem: &mut BurstMemory, z_base: u32, width: u32, x: u32, y: u32) -> (u16, bool) {
        let (word_addr, bit_offset) = depthbuffer::word_and_bit_offset(z_base, width, x, y);
        let coalesced = self.last_word_addr == Some(word_addr);
        let word = if coalesced {
            self.last_word
        } else {
            let word = mem.read_beat(word_addr).expect("depth word address is always 8-byte aligned");
            self.last_word_addr = Some(word_addr);
            self.last_word = word;
            word
        };
        (((word >> bit_offset) & 0xFFFF) as u16, coalesced)
    }

    /// Fold a just-committed depth write into the cached beat, if it's the
    /// one currently latched. Real hardware never needs this: the load
    /// queue (§4.D) only coalesces requests still in flight, and by the
    /// time a later pixel revisits the same word its entry has long since
    /// drained. This model fetches and writes synchronously per pixel
    /// instead of running reads and writes as separate in-flight streams,
    /// so without this the cache would otherwise go stale the moment two
    /// triangles overlap at a word boundary that survived as `last_word_addr`.
    fn note_write(&mut self, word_addr: u32, bit_offset: u32, z: u16) {
        if self.last_word_addr == Some(word_addr) {
            let mask = !(0xFFFFu64 << bit_offset);
            self.last_word = (self.last_word & mask) | ((z as u64) << bit_offset);
        }
    }
}

/// The depth comparison itself: a pixel passes when its interpolated depth
/// is strictly greater than what's already stored (larger z is nearer,
/// per §3; ties lose, matching the reference `fetched_z < z` gate).
pub struct DepthTester;

impl DepthTester {
    pub fn passes(fetched_z: u16, z: u16) -> bool {
        fetched_z < z
    }

    /// Fetch-then-test in one call, and write the new depth through on a
    /// pass, mirroring the pipeline's read-compare-write ordering for a
    /// single pixel. Returns `(passed, coalesced)`.
    pub fn test_and_write(
        reader: &mut DepthReader,
        mem: &mut BurstMemory,
        z_base: u32,
        width: u32,
        pixel: &InterpolatedPixel,
    ) -> (bool, bool) {
        let (fetched, coalesced) = reader.fetch(mem, z_base, width, pixel.x, pixel.y);
        if Self::passes(fetched, pixel.z) {
            depthbuffer::write_depth(mem, z_base, width, pixel.x, pixel.y, pixel.z);
            let (word_addr, bit_offset) = depthbuffer::word_and_bit_offset(z_base, width, pixel.x, pixel.y);
            reader.note_write(word_addr, bit_offset, pixel.z);
            (true, coalesced)
        } else {
            (false, coalesced)
        }
    }
}
