//! A software model of the AXI-like burst memory bus every external port
//! (pixel, depth, command, texture-load) transacts over: address + length +
//! burst type, masked 8-byte write beats, and the 4KiB INCR-crossing rule.

use gs_twin_core::TwinError;
use gpu_registers::constants::{AXI_4K_BOUNDARY, BUS_BEAT_BYTES, MAX_BURST_BEATS};
use log::trace;

/// AXI burst addressing mode. Only `Incr` is exercised by this design; the
/// others are modeled for completeness of the bus contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BurstType {
    Fixed,
    Incr,
    Wrap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionKind {
    Read,
    Write,
}

/// A single address-phase transaction as observed on the bus, recorded for
/// test introspection (e.g. asserting a 4KiB-crossing write split into two
/// single-beat transactions rather than one two-beat burst).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub addr: u32,
    pub beats: u32,
    pub burst: BurstType,
}

/// A flat byte-addressable memory with burst-transaction bookkeeping. Stands
/// in for the DDR behind the Zynq's AXI HP ports: frame buffer, depth
/// buffer, and command stream all live in this one address space, exactly
/// as they do in the real SoC.
pub struct BurstMemory {
    bytes: Vec<u8>,
    pub transactions: Vec<Transaction>,
}

impl BurstMemory {
    pub fn new(size_bytes: usize) -> Self {
        Self { bytes: vec![0u8; size_bytes], transactions: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn check_incr_bounds(addr: u32, beats: u32, beat_bytes: u32) -> Result<(), TwinError> {
        if beats == 0 || beats > MAX_BURST_BEATS {
            return Err(TwinError::Misaligned { addr, align: beat_bytes });
        }
        if addr % beat_bytes != 0 {
            return Err(TwinError::Misaligned { addr, align: beat_bytes });
        }
        let span = beats * beat_bytes;
        let first_boundary = addr / AXI_4K_BOUNDARY;
        let last_boundary = (addr + span - 1) / AXI_4K_BOUNDARY;
        if beats > 1 && first_boundary != last_boundary {
            return Err(TwinError::BurstCrosses4K { addr, beats, beat_bytes });
        }
        Ok(())
    }

    /// Issue a single aligned 8-byte read beat.
    pub fn read_beat(&mut self, addr: u32) -> Result<u64, TwinError> {
        Self::check_incr_bounds(addr, 1, BUS_BEAT_BYTES)?;
        self.transactions.push(Transaction {
            kind: TransactionKind::Read,
            addr,
            beats: 1,
            burst: BurstType::Incr,
        });
        let i = addr as usize;
        let mut data = [0u8; 8];
        data.copy_from_slice(&self.bytes[i..i + 8]);
        Ok(u64::from_le_bytes(data))
    }

    /// Issue a single masked 8-byte write beat. `strb` bit `n` gates byte
    /// `n` of `data`.
    pub fn write_beat(&mut self, addr: u32, data: u64, strb: u8) -> Result<(), TwinError> {
        Self::check_incr_bounds(addr, 1, BUS_BEAT_BYTES)?;
        self.transactions.push(Transaction {
            kind: TransactionKind::Write,
            addr,
            beats: 1,
            burst: BurstType::Incr,
        });
        let bytes = data.to_le_bytes();
        let base = addr as usize;
        for (n, byte) in bytes.iter().enumerate() {
            if strb & (1 << n) != 0 {
                self.bytes[base + n] = *byte;
            }
        }
        trace!("write_beat addr={addr:#x} strb={strb:#05b}");
        Ok(())
    }

    /// Issue a multi-beat INCR write burst, all beats fully written (no
    /// byte masking) — used by the buffer clearer. Rejects bursts that
    /// cross a 4KiB boundary; the caller is responsible for splitting those
    /// into separate bursts, as the reference hardware does.
    pub fn write_burst(&mut self, addr: u32, beats: &[u64]) -> Result<(), TwinError> {
        Self::check_incr_bounds(addr, beats.len() as u32, BUS_BEAT_BYTES)?;
        self.transactions.push(Transaction {
            kind: TransactionKind::Write,
            addr,
            beats: beats.len() as u32,
            burst: BurstType::Incr,
        });
        for (n, beat) in beats.iter().enumerate() {
            let base = addr as usize + n * BUS_BEAT_BYTES as usize;
            self.bytes[base..base + 8].copy_from_slice(&beat.to_le_bytes());
        }
        Ok(())
    }

    /// Issue a multi-beat INCR write burst with a per-beat strobe — the
    /// pixel writer's non-page-crossing split write, which spans two beats
    /// but only part of each.
    pub fn write_burst_masked(&mut self, addr: u32, beats: &[(u64, u8)]) -> Result<(), TwinError> {
        Self::check_incr_bounds(addr, beats.len() as u32, BUS_BEAT_BYTES)?;
        self.transactions.push(Transaction {
            kind: TransactionKind::Write,
            addr,
            beats: beats.len() as u32,
            burst: BurstType::Incr,
        });
        for (n, (data, strb)) in beats.iter().enumerate() {
            let base = addr as usize + n * BUS_BEAT_BYTES as usize;
            let bytes = data.to_le_bytes();
            for (k, byte) in bytes.iter().enumerate() {
                if strb & (1 << k) != 0 {
                    self.bytes[base + k] = *byte;
                }
            }
        }
        Ok(())
    }

    pub fn read_bytes(&self, addr: u32, len: usize) -> &[u8] {
        let i = addr as usize;
        &self.bytes[i..i + len]
    }

    pub fn write_bytes(&mut self, addr: u32, data: &[u8]) {
        let i = addr as usize;
        self.bytes[i..i + data.len()].copy_from_slice(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_beat_write_respects_strobe() {
        let mut mem = BurstMemory::new(4096);
        mem.write_beat(0, 0xAABBCCDD_11223344, 0b0000_1111).unwrap();
        let word = mem.read_beat(0).unwrap();
        assert_eq!(word, 0x00000000_11223344);
    }

    #[test]
    fn burst_crossing_4k_is_rejected() {
        let mut mem = BurstMemory::new(8192);
        // Two beats starting 8 bytes before the 4KiB boundary cross it.
        let res = mem.write_burst(4096 - 8, &[1, 2]);
        assert!(matches!(res, Err(TwinError::BurstCrosses4K { .. })));
    }

    #[test]
    fn single_beat_at_boundary_is_fine_either_side() {
        let mut mem = BurstMemory::new(8192);
        mem.write_beat(4096 - 8, 0xAAAA_AAAA_AAAA_AAAA, 0xFF).unwrap();
        mem.write_beat(4096, 0xBBBB_BBBB_BBBB_BBBB, 0xFF).unwrap();
    }

    #[test]
    fn misaligned_access_rejected() {
        let mut mem = BurstMemory::new(4096);
        assert!(matches!(mem.read_beat(3), Err(TwinError::Misaligned { .. })));
    }
}
