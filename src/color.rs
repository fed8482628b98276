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
use std::{fmt, str::FromStr};

use crate::config::ConfigError;

/// A pixel color. The white channel is only carried by RGBW strips and stays
/// at 0 unless explicitly set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub w: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, w: 0 }
    }

    pub const fn rgbw(r: u8, g: u8, b: u8, w: u8) -> Color {
        Color { r, g, b, w }
    }

    /// Scales every channel by `numerator / denominator` using integer
    /// truncation. Results are clamped to 255 and a zero denominator yields black.
    pub fn scale(&self, numerator: u32, denominator: u32) -> Color {
        if denominator == 0 {
            return Color::BLACK;
        }
        let channel = |c: u8| -> u8 { (u32::from(c) * numerator / denominator).min(255) as u8 };

        Color {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
            w: channel(self.w),
        }
    }

    /// Applies a sink brightness in the range 0.0..=1.0.
    pub fn with_brightness(&self, brightness: f32) -> Color {
        let brightness = brightness.clamp(0.0, 1.0);
        let channel = |c: u8| -> u8 { (f32::from(c) * brightness) as u8 };

        Color {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
            w: channel(self.w),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.w > 0 {
            write!(f, "{:02x}", self.w)?;
        }
        Ok(())
    }
}

/// Maps a position on the color wheel to a hue. The wheel transitions
/// green -> red -> blue -> green over three segments of width 85.
/// Positions outside 0..=255 are black.
pub fn wheel(pos: i32) -> Color {
    match pos {
        0..=84 => {
            let pos = pos as u8;
            Color::rgb(pos * 3, 255 - pos * 3, 0)
        }
        85..=169 => {
            let pos = (pos - 85) as u8;
            Color::rgb(255 - pos * 3, 0, pos * 3)
        }
        170..=255 => {
            let pos = (pos - 170) as u8;
            Color::rgb(0, pos * 3, 255 - pos * 3)
        }
        _ => Color::BLACK,
    }
}

/// The physical order of the channels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Grb,
    Rgbw,
    Grbw,
}

impl ChannelOrder {
    /// The number of channels per pixel.
    pub fn channels(&self) -> usize {
        match self {
            ChannelOrder::Rgb | ChannelOrder::Grb => 3,
            ChannelOrder::Rgbw | ChannelOrder::Grbw => 4,
        }
    }

    /// Drops the white channel for strips that don't carry one.
    pub fn normalize(&self, color: Color) -> Color {
        match self.channels() {
            3 => Color { w: 0, ..color },
            _ => color,
        }
    }

    /// Appends the color to the buffer in wire order.
    pub fn encode(&self, color: Color, buffer: &mut Vec<u8>) {
        match self {
            ChannelOrder::Rgb => buffer.extend_from_slice(&[color.r, color.g, color.b]),
            ChannelOrder::Grb => buffer.extend_from_slice(&[color.g, color.r, color.b]),
            ChannelOrder::Rgbw => buffer.extend_from_slice(&[color.r, color.g, color.b, color.w]),
            ChannelOrder::Grbw => buffer.extend_from_slice(&[color.g, color.r, color.b, color.w]),
        }
    }
}

impl FromStr for ChannelOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rgb" => Ok(ChannelOrder::Rgb),
            "grb" => Ok(ChannelOrder::Grb),
            "rgbw" => Ok(ChannelOrder::Rgbw),
            "grbw" => Ok(ChannelOrder::Grbw),
            _ => Err(ConfigError::Invalid(format!(
                "unsupported channel order '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for ChannelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelOrder::Rgb => "RGB",
            ChannelOrder::Grb => "GRB",
            ChannelOrder::Rgbw => "RGBW",
            ChannelOrder::Grbw => "GRBW",
        };
        write!(f, "{}", name)
    }
}
