//! Board-agnostic rendering core for Prism displays
//!
//! This crate contains all pixel logic that does not depend on a specific
//! bus or panel controller:
//!
//! - Pixel formats, palettes and color conversion
//! - Off-screen sprites with rotation, clipping and scrolling
//! - Shape rasterization and rotate/zoom blits onto any [`Surface`]
//! - Panel lifecycle state machine
//! - Configuration type definitions and loading

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;
#[cfg(test)]
extern crate std;

// Must come first so the logging macros are visible to later modules
mod fmt;

pub mod color;
pub mod compose;
pub mod config;
pub mod error;
pub mod geometry;
pub mod raster;
pub mod sprite;
pub mod state;
pub mod traits;

pub use color::{Color, ColorConverter, ColorOrder, Palette, PixelFormat};
pub use compose::PushOptions;
pub use error::{ConfigError, Error, ProtocolError, Result};
pub use geometry::Rect;
pub use raster::{Canvas, Pattern};
pub use sprite::Sprite;
pub use traits::Surface;
