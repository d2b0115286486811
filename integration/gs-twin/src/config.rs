//! Construction-time configuration, mirroring the register file's
//! `fb_base`/`z_base`/`width` fields and the gateware `Raster` peripheral's
//! synthesis-time `width` generic.

/// Parameters fixed for the lifetime of a [`crate::Twin`], the way the
/// reference design fixes `width` at synthesis and `fb_base`/`z_base` at
/// the first frame setup.
#[derive(Clone, Copy, Debug)]
pub struct RasterConfig {
    pub width: u32,
    pub height: u32,
    pub fb_base: u32,
    pub z_base: u32,
    /// Unroll factor passed to every [`gs_rasterizer::Divider`] this twin
    /// creates; must divide 24.
    pub divider_unroll: u32,
}

impl RasterConfig {
    pub fn new(width: u32, height: u32, fb_base: u32, z_base: u32) -> Self {
        Self { width, height, fb_base, z_base, divider_unroll: 4 }
    }
}
