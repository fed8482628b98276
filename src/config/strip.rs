// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::str::FromStr;

use serde::Deserialize;

use crate::{color::ChannelOrder, sink::Driver};

use super::error::ConfigError;

pub const DEFAULT_DRIVER: Driver = Driver::Terminal;
pub const DEFAULT_PIXEL_COUNT: usize = 16;
pub const DEFAULT_CHANNEL_ORDER: ChannelOrder = ChannelOrder::Rgbw;
pub const DEFAULT_BRIGHTNESS: f32 = 0.2;

/// A YAML representation of the LED strip.
#[derive(Deserialize, Clone, Debug, Default)]
pub(super) struct Strip {
    /// The sink driver (terminal, mock).
    driver: Option<String>,

    /// The number of pixels on the strip.
    pixel_count: Option<usize>,

    /// The wire order of the channels (rgb, grb, rgbw, grbw).
    channel_order: Option<String>,

    /// The output brightness, 0.0 to 1.0.
    brightness: Option<f32>,
}

/// Validated strip settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripSettings {
    pub driver: Driver,
    pub pixel_count: usize,
    pub channel_order: ChannelOrder,
    pub brightness: f32,
}

impl Default for StripSettings {
    fn default() -> Self {
        StripSettings {
            driver: DEFAULT_DRIVER,
            pixel_count: DEFAULT_PIXEL_COUNT,
            channel_order: DEFAULT_CHANNEL_ORDER,
            brightness: DEFAULT_BRIGHTNESS,
        }
    }
}

impl Strip {
    /// Gets the sink driver.
    fn driver(&self) -> Result<Driver, ConfigError> {
        self.driver
            .as_ref()
            .map_or(Ok(DEFAULT_DRIVER), |driver| Driver::from_str(driver))
    }

    /// Gets the pixel count. A strip needs at least one pixel.
    fn pixel_count(&self) -> Result<usize, ConfigError> {
        match self.pixel_count {
            Some(0) => Err(ConfigError::Invalid(
                "pixel_count must be at least 1".to_string(),
            )),
            Some(pixel_count) => Ok(pixel_count),
            None => Ok(DEFAULT_PIXEL_COUNT),
        }
    }

    /// Gets the channel order.
    fn channel_order(&self) -> Result<ChannelOrder, ConfigError> {
        self.channel_order
            .as_ref()
            .map_or(Ok(DEFAULT_CHANNEL_ORDER), |order| {
                ChannelOrder::from_str(order)
            })
    }

    /// Gets the brightness.
    fn brightness(&self) -> Result<f32, ConfigError> {
        let brightness = self.brightness.unwrap_or(DEFAULT_BRIGHTNESS);
        if !(0.0..=1.0).contains(&brightness) {
            return Err(ConfigError::Invalid(format!(
                "brightness {} is outside 0.0..=1.0",
                brightness
            )));
        }
        Ok(brightness)
    }

    /// Validates the strip configuration.
    pub(super) fn settings(&self) -> Result<StripSettings, ConfigError> {
        Ok(StripSettings {
            driver: self.driver()?,
            pixel_count: self.pixel_count()?,
            channel_order: self.channel_order()?,
            brightness: self.brightness()?,
        })
    }
}

#[cfg(test)]
mod test {
    use config::{Config, File, FileFormat};

    use crate::{color::ChannelOrder, config::ConfigError, sink::Driver};

    use super::{Strip, StripSettings};

    fn parse(yaml: &str) -> Result<StripSettings, ConfigError> {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize::<Strip>()?
            .settings()
    }

    #[test]
    fn test_defaults() {
        let settings = Strip::default().settings().unwrap();
        assert_eq!(StripSettings::default(), settings);
        assert_eq!(ChannelOrder::Rgbw, settings.channel_order);
        assert_eq!(Driver::Terminal, settings.driver);
        assert_eq!(16, settings.pixel_count);
    }

    #[test]
    fn test_full_strip() {
        let settings = parse(
            r#"
            driver: mock
            pixel_count: 24
            channel_order: grb
            brightness: 0.5
            "#,
        )
        .unwrap();

        assert_eq!(Driver::Mock, settings.driver);
        assert_eq!(24, settings.pixel_count);
        assert_eq!(ChannelOrder::Grb, settings.channel_order);
        assert_eq!(0.5, settings.brightness);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            parse("pixel_count: 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            parse("brightness: 1.5"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            parse("channel_order: bgr"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            parse("driver: spi"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            parse("pixel_count: lots"),
            Err(ConfigError::Load(_))
        ));
    }
}
