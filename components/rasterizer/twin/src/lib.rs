//! Edge walker, divider, and interpolator components of the digital twin's
//! rasterizer core (spec components A, B, C).

pub mod divider;
pub mod edge_walker;
pub mod interpolator;

pub use divider::{divide_exact, Divider};
pub use edge_walker::EdgeWalker;
pub use interpolator::Interpolator;
