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
use std::{fmt, io, str::FromStr};

use crate::{
    color::{ChannelOrder, Color},
    config::{ConfigError, StripSettings},
};

pub mod mock;
pub mod terminal;

/// An addressable LED strip. Writes are buffered until `flush`.
///
/// Only the animation engine writes to a sink, so implementations don't need to
/// guard against concurrent use.
pub trait PixelSink: fmt::Display + Send {
    /// Sets the pixel at `index` in the buffer.
    fn set(&mut self, index: usize, color: Color) -> io::Result<()>;

    /// Pushes the buffer out to the strip.
    fn flush(&mut self) -> io::Result<()>;

    /// The fixed number of pixels on the strip.
    fn pixel_count(&self) -> usize;

    /// The fixed wire order of the strip.
    fn channel_order(&self) -> ChannelOrder;

    /// The brightness the sink applies on output, 0.0..=1.0.
    fn brightness(&self) -> f32;

    /// Sets every pixel in the buffer to `color`.
    fn fill(&mut self, color: Color) -> io::Result<()> {
        for index in 0..self.pixel_count() {
            self.set(index, color)?;
        }
        Ok(())
    }
}

/// The sink implementations that can be selected from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// Renders the strip as colored blocks on stdout.
    Terminal,
    /// Records frames in memory.
    Mock,
}

impl FromStr for Driver {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(Driver::Terminal),
            "mock" => Ok(Driver::Mock),
            _ => Err(ConfigError::Invalid(format!("unknown sink driver '{}'", s))),
        }
    }
}

/// Gets a sink for the given strip settings.
pub fn get_sink(settings: &StripSettings) -> Box<dyn PixelSink> {
    match settings.driver {
        Driver::Terminal => Box::new(terminal::Sink::new(
            io::stdout(),
            settings.pixel_count,
            settings.channel_order,
            settings.brightness,
        )),
        Driver::Mock => Box::new(
            mock::Sink::new(settings.pixel_count, settings.channel_order)
                .with_brightness(settings.brightness),
        ),
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use crate::{color::ChannelOrder, config::StripSettings};

    use super::{get_sink, Driver};

    #[test]
    fn test_driver_parse() {
        assert_eq!(Driver::Terminal, Driver::from_str("Terminal").unwrap());
        assert_eq!(Driver::Mock, Driver::from_str("mock").unwrap());
        assert!(Driver::from_str("spi").is_err());
    }

    #[test]
    fn test_get_sink() {
        let sink = get_sink(&StripSettings {
            driver: Driver::Mock,
            pixel_count: 12,
            channel_order: ChannelOrder::Rgb,
            brightness: 0.5,
        });
        assert_eq!(12, sink.pixel_count());
        assert_eq!(ChannelOrder::Rgb, sink.channel_order());
        assert_eq!(0.5, sink.brightness());
    }
}
