//! Buffer clearer, component H of the rasterizer pipeline: fills a byte
//! range with a repeating 3-byte pattern via 16-beat INCR bursts, each beat
//! packing the pattern's bytes phase-shifted so that the byte at absolute
//! position `p` is always `pattern_bytes[p % 3]`.

use gs_memory::BurstMemory;
use gs_twin_core::TwinError;
use gpu_registers::constants::MAX_BURST_BEATS;

/// Build the 8 pattern bytes for one beat, given which 3-beat phase (the
/// beat's index modulo 3) it falls in. Byte `j` within the beat holds
/// `pattern_bytes[(j - phase) mod 3]`, which is exactly the rotation that
/// keeps every *absolute* byte position's value fixed regardless of how the
/// 3-byte pattern happens to divide across 8-byte beats.
fn beat_bytes(pattern_bytes: [u8; 3], phase: u32) -> [u8; 8] {
    std::array::from_fn(|j| {
        let idx = (j as i64 - phase as i64).rem_euclid(3) as usize;
        pattern_bytes[idx]
    })
}

pub struct BufferClearer;

impl BufferClearer {
    /// Clear `words` 8-byte beats starting at `base_addr` (a byte address,
    /// 128-byte aligned — the caller has already shifted the wire-format
    /// `addr_128` left by 7) with the 24-bit `pattern`, split into bursts
    /// of at most [`MAX_BURST_BEATS`].
    pub fn clear(mem: &mut BurstMemory, base_addr: u32, words: u32, pattern: u32) -> Result<(), TwinError> {
        let pattern_bytes = [(pattern & 0xFF) as u8, ((pattern >> 8) & 0xFF) as u8, ((pattern >> 16) & 0xFF) as u8];

        let mut addr = base_addr;
        let mut beat_index: u64 = 0;
        let mut remaining = words;
        while remaining > 0 {
            let chunk = remaining.min(MAX_BURST_BEATS);
            let beats: Vec<u64> = (0..chunk)
                .map(|i| {
                    let phase = ((beat_index + i as u64) % 3) as u32;
                    u64::from_le_bytes(beat_bytes(pattern_bytes, phase))
                })
                .collect();
            mem.write_burst(addr, &beats)?;
            addr += chunk * 8;
            beat_index += chunk as u64;
            remaining -= chunk;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_byte_matches_pattern_rotation_regardless_of_beat_boundary() {
        let mut mem = BurstMemory::new(4096);
        let pattern = 0x00_CC_BB_AA;
        BufferClearer::clear(&mut mem, 0, 20, pattern).unwrap();
        let bytes = mem.read_bytes(0, 160);
        for (i, b) in bytes.iter().enumerate() {
            let expected = match i % 3 {
                0 => 0xAA,
                1 => 0xBB,
                _ => 0xCC,
            };
            assert_eq!(*b, expected, "byte {i}");
        }
    }

    #[test]
    fn long_clear_splits_into_bounded_bursts() {
        let mut mem = BurstMemory::new(4096);
        BufferClearer::clear(&mut mem, 0, 40, 0x00_020100).unwrap();
        assert!(mem.transactions.iter().all(|t| t.beats <= MAX_BURST_BEATS));
        assert_eq!(mem.transactions.iter().map(|t| t.beats).sum::<u32>(), 40);
    }
}
