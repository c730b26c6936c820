//! Prism Hardware Abstraction Layer
//!
//! This crate defines the hardware traits that display transports are
//! built on. Chip-specific HALs implement them; the transports in
//! `prism-drivers` consume them. Nothing here knows about pixels.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  prism-drivers (Panel, transports)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  prism-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  chip HAL     │       │ embedded-hal  │
//! │ (SPI + DMA)   │       │   adapters    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Control lines (CS, DC, RST, busy)
//! - [`spi::SpiBus`] - SPI master
//! - [`i2c::I2cBus`] - I2C master
//! - [`parallel::ParallelBus`] - 8/16-bit Intel 8080 style data bus
//! - [`rgb::RgbInterface`] - RGB scan-out frame buffer
//! - [`dma::DmaChannel`] - Memory-to-peripheral block transfers

#![no_std]
#![deny(unsafe_code)]

pub mod dma;
pub mod gpio;
pub mod i2c;
pub mod parallel;
pub mod rgb;
pub mod spi;

#[cfg(feature = "embedded-hal")]
pub mod compat;

// Re-export key traits at crate root for convenience
pub use dma::{DmaChannel, NoDma};
pub use gpio::{InputPin, NoPin, OutputPin};
pub use i2c::{I2cBus, I2cConfig};
pub use parallel::ParallelBus;
pub use rgb::{RgbInterface, RgbTiming};
pub use spi::{Mode, SpiBus, SpiConfig};
