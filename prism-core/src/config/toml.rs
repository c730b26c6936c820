//! TOML configuration text
//!
//! ```toml
//! device = "st7789"
//! rotation = 1
//!
//! [panel]
//! panel_width = 240
//! panel_height = 240
//! offset_y = 80
//! invert = true
//!
//! [bus]
//! kind = "spi"
//! freq_write = 40000000
//! dma_channel = 0
//! ```
//!
//! Missing keys take their defaults.

use super::types::DisplayConfig;
use crate::error::ConfigError;

/// Parse and validate a display configuration
pub fn parse_toml(input: &str) -> Result<DisplayConfig, ConfigError> {
    let config: DisplayConfig = match ::toml::from_str(input) {
        Ok(config) => config,
        Err(_) => {
            warn!("config text rejected");
            return Err(ConfigError::Parse);
        }
    };
    config.validate()?;
    info!(
        "config: {} {}x{} rotation {}",
        config.device.as_str(),
        config.panel.panel_width,
        config.panel.panel_height,
        config.rotation
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BusKind;

    const ST7789: &str = r#"
# 240x240 module on a 240x320 controller
device = "st7789"
rotation = 1

[panel]
memory_width = 240
memory_height = 320
panel_width = 240
panel_height = 240
offset_y = 80
invert = true

[bus]
kind = "spi"
freq_write = 62500000
dma_channel = 1
"#;

    #[test]
    fn test_parse_full() {
        let config = parse_toml(ST7789).unwrap();
        assert_eq!(config.device.as_str(), "st7789");
        assert_eq!(config.rotation, 1);
        assert_eq!(config.panel.panel_height, 240);
        assert_eq!(config.panel.offset_y, 80);
        assert!(config.panel.invert);
        assert!(config.panel.readable);
        assert_eq!(config.bus.kind, BusKind::Spi);
        assert_eq!(config.bus.freq_write, 62_500_000);
        assert_eq!(config.bus.freq_read, 16_000_000);
        assert_eq!(config.bus.dma_channel, Some(1));
    }

    #[test]
    fn test_parse_i2c_bus() {
        let text = "device = \"gc9a01\"\n[bus]\nkind = \"i2c\"\ni2c_address = 61\n";
        let config = parse_toml(text).unwrap();
        assert_eq!(config.bus.kind, BusKind::I2c);
        assert_eq!(config.bus.i2c_address, 0x3D);
        assert_eq!(config.bus.dma_channel, None);
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let text = "device = \"ili9341\"\n[panel]\npanel_width = 300\n";
        assert_eq!(parse_toml(text), Err(ConfigError::PanelOutOfMemory));
    }

    #[test]
    fn test_syntax_error() {
        assert_eq!(parse_toml("device = "), Err(ConfigError::Parse));
        assert_eq!(
            parse_toml("device = \"ili9341\"\nrotation = \"left\"\n"),
            Err(ConfigError::Parse)
        );
    }
}
