//! Scan-converts an accepted triangle into covered pixels, using
//! incrementally-updated integer edge functions (Pineda's algorithm) and
//! the [`Divider`] to compute a single 1/area reciprocal per triangle.
//!
//! Two entry points are provided: [`EdgeWalker::walk`] runs a triangle to
//! completion in one call (the software-parallel scheduling model used
//! elsewhere in this twin), and [`EdgeWalker::tick`] steps exactly one
//! hardware cycle at a time, honoring a downstream `ready` signal, for
//! tests that care about the walker's bit-exact cycle timing.

use gs_twin_core::{max3, min3, orient2d, PixelSample, ScreenPoint, Triangle};
use qfixed::UQ0_24;

use crate::divider::Divider;

/// Result of advancing the walker by one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepResult {
    /// No triangle staged and no walk in progress.
    Idle,
    /// A triangle is being processed but no pixel was emitted this cycle
    /// (computing orientation, waiting on the divider, stalled on
    /// backpressure, or walking a covered-but-outside pixel).
    Busy,
    /// A covered pixel was emitted this cycle.
    Emitted(PixelSample),
}

#[derive(Debug, Clone, Copy)]
struct OrientedBounds {
    triangle: Triangle,
    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,
    a01: i64,
    b01: i64,
    a12: i64,
    b12: i64,
    a20: i64,
    b20: i64,
    w0_row: i64,
    w1_row: i64,
    w2_row: i64,
}

#[derive(Debug, Clone, Copy)]
struct WalkState {
    bounds: OrientedBounds,
    area_recip: u32,
    x: i32,
    y: i32,
    w0: i64,
    w1: i64,
    w2: i64,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    CalcOrient(Triangle),
    WaitDiv(OrientedBounds),
    Walking(WalkState),
}

pub struct EdgeWalker {
    divider: Divider,
    phase: Phase,
}

impl EdgeWalker {
    pub fn new(divider_unroll: u32) -> Self {
        Self { divider: Divider::new(divider_unroll), phase: Phase::Idle }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// Stage a new triangle. Only valid while idle; the command processor
    /// is responsible for not submitting a second triangle before this one
    /// drains.
    pub fn submit(&mut self, triangle: Triangle) {
        debug_assert!(self.is_idle(), "edge walker triangle port is not free");
        self.phase = Phase::CalcOrient(triangle);
    }

    fn bounds_for(triangle: Triangle) -> Option<OrientedBounds> {
        let pts = triangle.points();
        let area = orient2d(pts[0], pts[1], pts[2]);
        if area <= 0 {
            return None;
        }
        let min_x = min3(pts[0].x, pts[1].x, pts[2].x).max(0);
        let max_x = max3(pts[0].x, pts[1].x, pts[2].x);
        let min_y = min3(pts[0].y, pts[1].y, pts[2].y).max(0);
        let max_y = max3(pts[0].y, pts[1].y, pts[2].y);

        let a01 = (pts[0].y - pts[1].y) as i64;
        let b01 = (pts[1].x - pts[0].x) as i64;
        let a12 = (pts[1].y - pts[2].y) as i64;
        let b12 = (pts[2].x - pts[1].x) as i64;
        let a20 = (pts[2].y - pts[0].y) as i64;
        let b20 = (pts[0].x - pts[2].x) as i64;

        let p0 = ScreenPoint::new(min_x, min_y);
        let w0_row = orient2d(pts[1], pts[2], p0);
        let w1_row = orient2d(pts[2], pts[0], p0);
        let w2_row = orient2d(pts[0], pts[1], p0);

        Some(OrientedBounds {
            triangle,
            min_x,
            max_x,
            min_y,
            max_y,
            a01,
            b01,
            a12,
            b12,
            a20,
            b20,
            w0_row,
            w1_row,
            w2_row,
        })
    }

    fn pixel_sample(bounds: &OrientedBounds, area_recip: u32, x: i32, y: i32, w0: i64, w1: i64, w2: i64) -> PixelSample {
        let scale = |w: i64| -> UQ0_24 {
            let product = (w as u64).wrapping_mul(area_recip as u64);
            UQ0_24::from_raw(product)
        };
        let t = &bounds.triangle;
        PixelSample {
            x: x as u32,
            y: y as u32,
            weights: [scale(w0), scale(w1), scale(w2)],
            attrs: [t.vertices[0].attrs(), t.vertices[1].attrs(), t.vertices[2].attrs()],
            texture_enable: t.texture_enable,
            texture_buffer: t.texture_buffer,
        }
    }

    /// Advance exactly one hardware cycle. `downstream_ready` gates whether
    /// a covered pixel this cycle may actually be consumed; when it can't,
    /// the walker holds position and retries next cycle.
    pub fn tick(&mut self, downstream_ready: bool) -> StepResult {
        match self.phase {
            Phase::Idle => StepResult::Idle,
            Phase::CalcOrient(triangle) => {
                match Self::bounds_for(triangle) {
                    None => {
                        self.phase = Phase::Idle;
                        StepResult::Idle
                    }
                    Some(bounds) => {
                        let area = orient2d(
                            bounds.triangle.points()[0],
                            bounds.triangle.points()[1],
                            bounds.triangle.points()[2],
                        );
                        self.divider
                            .trigger(0x00FF_FFFF, area as u32)
                            .expect("edge walker never triggers a busy divider");
                        self.phase = Phase::WaitDiv(bounds);
                        StepResult::Busy
                    }
                }
            }
            Phase::WaitDiv(bounds) => {
                match self.divider.tick() {
                    None => StepResult::Busy,
                    Some(area_recip) => {
                        self.phase = Phase::Walking(WalkState {
                            bounds,
                            area_recip,
                            x: bounds.min_x,
                            y: bounds.min_y,
                            w0: bounds.w0_row,
                            w1: bounds.w1_row,
                            w2: bounds.w2_row,
                        });
                        StepResult::Busy
                    }
                }
            }
            Phase::Walking(mut ws) => {
                if ws.y > ws.bounds.max_y {
                    self.phase = Phase::Idle;
                    return StepResult::Idle;
                }
                let inside = ws.w0 >= 0 && ws.w1 >= 0 && ws.w2 >= 0;
                if inside && !downstream_ready {
                    return StepResult::Busy;
                }
                let emitted = if inside {
                    Some(Self::pixel_sample(&ws.bounds, ws.area_recip, ws.x, ws.y, ws.w0, ws.w1, ws.w2))
                } else {
                    None
                };

                ws.x += 1;
                ws.w0 += ws.bounds.a12;
                ws.w1 += ws.bounds.a20;
                ws.w2 += ws.bounds.a01;
                if ws.x > ws.bounds.max_x {
                    ws.x = ws.bounds.min_x;
                    ws.y += 1;
                    ws.bounds.w0_row += ws.bounds.b12;
                    ws.bounds.w1_row += ws.bounds.b20;
                    ws.bounds.w2_row += ws.bounds.b01;
                    ws.w0 = ws.bounds.w0_row;
                    ws.w1 = ws.bounds.w1_row;
                    ws.w2 = ws.bounds.w2_row;
                }
                self.phase = Phase::Walking(ws);

                match emitted {
                    Some(sample) => StepResult::Emitted(sample),
                    None => StepResult::Busy,
                }
            }
        }
    }

    /// Run a triangle to completion, collecting every covered pixel in
    /// row-major order. Used by the software-parallel rasterizer variants.
    pub fn walk(&mut self, triangle: Triangle) -> Vec<PixelSample> {
        debug_assert!(self.is_idle());
        self.submit(triangle);
        let mut samples = Vec::new();
        loop {
            match self.tick(true) {
                StepResult::Idle => break,
                StepResult::Busy => {}
                StepResult::Emitted(sample) => samples.push(sample),
            }
        }
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_twin_core::ScreenVertex;

    fn triangle(v0: (u16, u16), v1: (u16, u16), v2: (u16, u16)) -> Triangle {
        Triangle::new(
            [
                ScreenVertex::new(v0.0, v0.1, 100, 0xFF, 0, 0).unwrap(),
                ScreenVertex::new(v1.0, v1.1, 100, 0, 0xFF, 0).unwrap(),
                ScreenVertex::new(v2.0, v2.1, 100, 0, 0, 0xFF).unwrap(),
            ],
            false,
            0,
        )
    }

    #[test]
    fn ccw_triangle_covers_expected_pixel_count() {
        let mut walker = EdgeWalker::new(4);
        let tri = triangle((0, 0), (10, 0), (0, 10));
        let samples = walker.walk(tri);
        // Top-left fill convention over a right triangle of leg 10: the
        // standard `(w0|w1|w2) >= 0` inclusive test covers 66 pixels.
        assert_eq!(samples.len(), 66);
        assert!(walker.is_idle());
    }

    #[test]
    fn cw_triangle_is_rejected() {
        let mut walker = EdgeWalker::new(4);
        let tri = triangle((0, 0), (0, 10), (10, 0));
        let samples = walker.walk(tri);
        assert!(samples.is_empty());
    }

    #[test]
    fn weights_sum_to_approximately_one_for_covered_pixels() {
        let mut walker = EdgeWalker::new(4);
        let tri = triangle((0, 0), (100, 0), (0, 100));
        let samples = walker.walk(tri);
        for s in &samples {
            let sum: u64 = s.weights.iter().map(|w| w.raw()).sum();
            // The reciprocal is a truncated (floor) division, so the sum
            // of scaled weights lands at or just under 1.0 in UQ0.24
            // (2^24), never over it.
            assert!(sum <= (1u64 << 24), "sum={sum:#x}");
            assert!(sum > 0);
        }
    }

    #[test]
    fn cycle_stepped_walk_matches_whole_triangle_walk() {
        let mut whole = EdgeWalker::new(4);
        let tri = triangle((0, 0), (10, 0), (0, 10));
        let expected = whole.walk(tri);

        let mut stepped = EdgeWalker::new(4);
        stepped.submit(tri);
        let mut got = Vec::new();
        loop {
            match stepped.tick(true) {
                StepResult::Idle => break,
                StepResult::Busy => {}
                StepResult::Emitted(sample) => got.push(sample),
            }
        }
        assert_eq!(got.len(), expected.len());
        for (a, b) in got.iter().zip(expected.iter()) {
            assert_eq!((a.x, a.y), (b.x, b.y));
        }
    }

    #[test]
    fn backpressure_holds_position_until_ready() {
        let mut walker = EdgeWalker::new(4);
        let tri = triangle((0, 0), (2, 0), (0, 2));
        walker.submit(tri);
        // Drain orient + divider cycles without consuming any pixel.
        loop {
            match walker.phase {
                Phase::Walking(_) => break,
                _ => {
                    walker.tick(true);
                }
            }
        }
        // Now stall repeatedly on the first covered pixel.
        for _ in 0..5 {
            assert_eq!(walker.tick(false), StepResult::Busy);
        }
        // Finally accept it.
        match walker.tick(true) {
            StepResult::Emitted(_) => {}
            other => panic!("expected emission once ready, got {other:?}"),
        }
    }
}
