//! Traits at the seam between the raster engine and pixel storage
//!
//! The engine draws into anything implementing [`Surface`]; the drawing
//! operations themselves come from the blanket [`Canvas`] extension.

pub mod surface;

pub use crate::raster::Canvas;
pub use surface::{batched, Surface};
