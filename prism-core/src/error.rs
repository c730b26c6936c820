//! Error taxonomy shared by every Prism layer
//!
//! Bus and panel failures bubble up as [`Error`]. Geometry that falls off
//! a surface is clipped instead of reported.

/// Errors that can occur anywhere in the rendering and transport pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Invalid configuration detected before the device was used
    Config(ConfigError),
    /// Hardware did not acknowledge, or DMA missed its deadline
    ///
    /// The transaction was aborted and the bus state reset; the caller
    /// may retry once.
    BusTimeout,
    /// Sprite storage could not be reserved
    Allocation,
    /// The device or caller broke the expected protocol
    Protocol(ProtocolError),
    /// Zero, negative or non-finite zoom factor
    DegenerateTransform,
}

/// Configuration problems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Pixel format combination does not exist
    InvalidPixelFormat,
    /// Palette conversion requested without a palette
    MissingPalette,
    /// Palette has more entries than the format can index
    PaletteTooLarge,
    /// Zero-sized or overflowing dimensions
    InvalidGeometry,
    /// Panel does not fit inside controller memory
    PanelOutOfMemory,
    /// Pin or bus parameter out of range
    InvalidBus,
    /// No device profile with the configured name
    UnknownDevice,
    /// Configuration text could not be parsed
    Parse,
    /// Binary configuration could not be encoded or decoded
    Encoding,
    /// Stored configuration was written by an incompatible version
    VersionMismatch,
}

/// Protocol violations, by the device or by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Write attempted while the panel is not `Ready`
    NotReady,
    /// Pixel stream without a prior address window
    NoWindow,
    /// Device answered with an unexpected identification
    UnexpectedResponse,
    /// Init table truncated or missing its sentinel
    MalformedInitTable,
    /// Read-back requested from a write-only target
    NotReadable,
    /// Operation the transport cannot express
    Unsupported,
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "configuration error: {:?}", e),
            Error::BusTimeout => f.write_str("bus timeout"),
            Error::Allocation => f.write_str("frame buffer allocation failed"),
            Error::Protocol(e) => write!(f, "protocol error: {:?}", e),
            Error::DegenerateTransform => f.write_str("degenerate transform"),
        }
    }
}

/// Result alias used throughout Prism
pub type Result<T, E = Error> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        let e: Error = ConfigError::MissingPalette.into();
        assert_eq!(e, Error::Config(ConfigError::MissingPalette));

        let e: Error = ProtocolError::NotReady.into();
        assert_eq!(e, Error::Protocol(ProtocolError::NotReady));
    }
}
