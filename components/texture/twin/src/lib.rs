//! Texture sampler and bank SRAM model, component F of the rasterizer
//! pipeline: four independent 128x128 texel banks, each packing two
//! 24-bit texels per 48-bit word, with an independent write port and a
//! latched 2-cycle read.

use gs_twin_core::TwinError;
use gpu_registers::constants::{TEXTURE_BANK_COUNT, TEXTURE_BANK_SIZE, TEXTURE_BANK_WORDS};

/// One 128x128 texture bank: 8192 words of two packed 24-bit texels each.
#[derive(Clone)]
struct Bank {
    words: Vec<u64>,
}

impl Bank {
    fn new() -> Self {
        Self { words: vec![0u64; TEXTURE_BANK_WORDS] }
    }
}

/// All four texture banks, addressable by index.
pub struct TextureBanks {
    banks: [Bank; TEXTURE_BANK_COUNT],
}

impl Default for TextureBanks {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureBanks {
    pub fn new() -> Self {
        Self { banks: std::array::from_fn(|_| Bank::new()) }
    }

    fn word_addr(s: u32, t_half: u32) -> u32 {
        s * (TEXTURE_BANK_SIZE as u32 / 2) + t_half
    }

    /// Write a 48-bit word packing two adjacent texels (`t=2*t_half` in the
    /// low 24 bits, `t=2*t_half+1` in the high 24 bits) at `(s, t_half)`.
    pub fn write(&mut self, buffer: u8, addr: u16, data: u64) -> Result<(), TwinError> {
        let bank = self.bank_mut(buffer)?;
        let idx = addr as usize;
        if idx >= TEXTURE_BANK_WORDS {
            return Err(TwinError::InvalidTextureBuffer { buffer });
        }
        bank.words[idx] = data & 0xFFFF_FFFF_FFFF;
        Ok(())
    }

    /// Sample the texel at `(s, t)`. The hardware `s`/`t` read ports are
    /// wired as 7-bit signals (`TextureBufferRead` in the reference
    /// gateware), so an 8-bit attribute lane feeding them is truncated to
    /// its low 7 bits rather than indexing out of bounds.
    pub fn sample(&self, buffer: u8, s: u8, t: u8) -> Result<u32, TwinError> {
        let bank = self.bank(buffer)?;
        let s = (s & 0x7F) as u32;
        let t = t & 0x7F;
        let t_half = (t / 2) as u32;
        let word = bank.words[Self::word_addr(s, t_half) as usize];
        Ok(if t % 2 == 0 { (word & 0xFF_FFFF) as u32 } else { ((word >> 24) & 0xFF_FFFF) as u32 })
    }

    fn bank(&self, buffer: u8) -> Result<&Bank, TwinError> {
        self.banks.get(buffer as usize).ok_or(TwinError::InvalidTextureBuffer { buffer })
    }

    fn bank_mut(&mut self, buffer: u8) -> Result<&mut Bank, TwinError> {
        self.banks.get_mut(buffer as usize).ok_or(TwinError::InvalidTextureBuffer { buffer })
    }
}

/// Cycle-stepped read port, modeling the bank's latched output: the result
/// of a sample issued this tick isn't visible until two ticks later, and
/// while `en` is low the output simply holds.
#[derive(Default)]
pub struct LatchedReader {
    pending: [Option<u32>; 2],
}

impl LatchedReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one cycle. If `en` and a `(buffer, s, t)` request are given,
    /// the sample is latched into the pipe; either way the oldest pending
    /// result (if any) is returned.
    pub fn tick(&mut self, banks: &TextureBanks, request: Option<(u8, u8, u8)>) -> Option<u32> {
        let out = self.pending[0];
        self.pending[0] = self.pending[1];
        self.pending[1] = request.and_then(|(buffer, s, t)| banks.sample(buffer, s, t).ok());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_sample_round_trips_both_packed_texels() {
        let mut banks = TextureBanks::new();
        let even = 0x00_FF00;
        let odd = 0x00_00FF;
        let word = (even as u64) | ((odd as u64) << 24);
        // s=5, t_half=10 -> word address 5*64+10 = 330, covering t=20 and t=21.
        banks.write(0, 330, word).unwrap();
        assert_eq!(banks.sample(0, 5, 20).unwrap(), even);
        assert_eq!(banks.sample(0, 5, 21).unwrap(), odd);
    }

    #[test]
    fn banks_are_independent() {
        let mut banks = TextureBanks::new();
        banks.write(0, 0, 0x1).unwrap();
        banks.write(1, 0, 0x2).unwrap();
        assert_eq!(banks.sample(0, 0, 0).unwrap(), 1);
        assert_eq!(banks.sample(1, 0, 0).unwrap(), 2);
    }

    #[test]
    fn out_of_range_buffer_errors() {
        let banks = TextureBanks::new();
        assert!(banks.sample(4, 0, 0).is_err());
    }

    #[test]
    fn latched_reader_delays_by_two_cycles() {
        let mut banks = TextureBanks::new();
        banks.write(0, 0, 0x00_0042).unwrap();
        let mut reader = LatchedReader::new();
        assert_eq!(reader.tick(&banks, Some((0, 0, 0))), None);
        assert_eq!(reader.tick(&banks, None), None);
        assert_eq!(reader.tick(&banks, None), Some(0x42));
    }
}
