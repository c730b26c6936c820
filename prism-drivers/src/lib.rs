//! Transports and panel controllers for Prism displays
//!
//! This crate turns the `prism-hal` peripheral traits into something a
//! display controller can be driven over:
//!
//! - Bus transports (SPI, I2C, 8/16-bit parallel, RGB scan-out)
//! - A transaction manager that nests bus locks and owns DMA buffers
//! - A generic [`panel::Panel`] driven by data-only device profiles
//!
//! A panel implements [`prism_core::Surface`], so everything in
//! `prism-core` (shapes, sprites, rotate/zoom) draws onto it directly.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;
#[cfg(test)]
extern crate std;

// Must come first so the logging macros are visible to later modules
mod fmt;

pub mod bus;
pub mod panel;
pub mod transaction;

#[cfg(test)]
mod mock;

pub use bus::{Bus, I2cTransport, ParallelTransport, RgbTransport, SpiTransport};
pub use panel::{DeviceProfile, Panel};
pub use transaction::{TransactionGuard, TransactionManager};
