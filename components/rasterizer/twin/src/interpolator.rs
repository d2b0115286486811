//! Perspective-free barycentric interpolation of depth and the two
//! attribute lanes (flat color or texture coordinate), component C of the
//! rasterizer pipeline.
//!
//! Hardware runs this as a four-stage pipeline (one multiply-accumulate
//! lane per vertex, then a final add-and-round), stalling in lockstep with
//! its downstream consumer. The twin has no downstream backpressure to
//! model correctness against, so [`Interpolator::interpolate`] collapses
//! the four stages into one pure function; [`StageOccupancy`] exists only
//! so the pipelined top level has something to feed its stall counters.

use gs_twin_core::{InterpolatedPixel, PixelSample};
use qfixed::round_shift;

pub struct Interpolator;

impl Interpolator {
    /// Interpolate a single covered pixel's depth and attribute lanes.
    ///
    /// Each lane is `round_shift(sum_i(weight_i * attr_i), 24)`, the same
    /// rounding rule the reference FPGA design applies uniformly to color
    /// and depth.
    pub fn interpolate(sample: &PixelSample) -> InterpolatedPixel {
        let z_sum: u64 = (0..3)
            .map(|i| sample.weights[i].raw() * sample.attrs[i].z as u64)
            .sum();
        let attr0_sum: u64 = (0..3).map(|i| sample.weights[i].mul_u8(sample.attrs[i].attr0)).sum();
        let attr1_sum: u64 = (0..3).map(|i| sample.weights[i].mul_u8(sample.attrs[i].attr1)).sum();
        let b_sum: u64 = (0..3).map(|i| sample.weights[i].mul_u8(sample.attrs[i].b)).sum();

        InterpolatedPixel {
            x: sample.x,
            y: sample.y,
            z: round_shift(z_sum, 24) as u16,
            texture_enable: sample.texture_enable,
            texture_buffer: sample.texture_buffer,
            attr0: round_shift(attr0_sum, 24) as u8,
            attr1: round_shift(attr1_sum, 24) as u8,
            attr2: round_shift(b_sum, 24) as u8,
        }
    }
}

/// Tracks how many of the interpolator's four pipeline stages are
/// currently occupied, purely for the pipelined top level's stall
/// histogram. Has no bearing on the values [`Interpolator::interpolate`]
/// produces.
#[derive(Default, Debug, Clone, Copy)]
pub struct StageOccupancy {
    occupied: u8,
}

impl StageOccupancy {
    pub const STAGES: u8 = 4;

    pub fn push(&mut self) {
        self.occupied = (self.occupied + 1).min(Self::STAGES);
    }

    pub fn pop(&mut self) {
        self.occupied = self.occupied.saturating_sub(1);
    }

    pub fn is_full(&self) -> bool {
        self.occupied == Self::STAGES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_twin_core::VertexAttrs;
    use qfixed::UQ0_24;

    fn sample(weights: [u32; 3], attrs: [VertexAttrs; 3]) -> PixelSample {
        PixelSample {
            x: 0,
            y: 0,
            weights: [
                UQ0_24::from_raw(weights[0] as u64),
                UQ0_24::from_raw(weights[1] as u64),
                UQ0_24::from_raw(weights[2] as u64),
            ],
            attrs,
            texture_enable: false,
            texture_buffer: 0,
        }
    }

    #[test]
    fn vertex_weight_one_reproduces_its_own_attributes() {
        let one = 1u32 << 24;
        let attrs = [
            VertexAttrs { z: 1000, attr0: 10, attr1: 20, b: 30 },
            VertexAttrs { z: 2000, attr0: 40, attr1: 50, b: 60 },
            VertexAttrs { z: 3000, attr0: 70, attr1: 80, b: 90 },
        ];
        let s = sample([one, 0, 0], attrs);
        let out = Interpolator::interpolate(&s);
        assert_eq!(out.z, 1000);
        assert_eq!(out.attr0, 10);
        assert_eq!(out.attr1, 20);
        assert_eq!(out.attr2, 30);
    }

    #[test]
    fn even_split_averages_attributes() {
        let third = (1u32 << 24) / 3;
        let attrs = [
            VertexAttrs { z: 0, attr0: 0, attr1: 0, b: 0 },
            VertexAttrs { z: 0, attr0: 90, attr1: 90, b: 90 },
            VertexAttrs { z: 0, attr0: 180, attr1: 180, b: 180 },
        ];
        let s = sample([third, third, third], attrs);
        let out = Interpolator::interpolate(&s);
        assert!((out.attr0 as i32 - 90).abs() <= 1);
    }

    #[test]
    fn stage_occupancy_saturates_and_drains() {
        let mut occ = StageOccupancy::default();
        for _ in 0..6 {
            occ.push();
        }
        assert!(occ.is_full());
        occ.pop();
        assert!(!occ.is_full());
    }
}
