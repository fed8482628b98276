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
use std::{
    fmt,
    io::{self, Write},
};

use crate::color::{ChannelOrder, Color};

/// Draws the strip on a single terminal line using 24-bit ANSI backgrounds.
pub struct Sink<W: Write + Send> {
    writer: W,
    pixels: Vec<Color>,
    channel_order: ChannelOrder,
    brightness: f32,
}

impl<W: Write + Send> Sink<W> {
    pub fn new(writer: W, pixel_count: usize, channel_order: ChannelOrder, brightness: f32) -> Self {
        Sink {
            writer,
            pixels: vec![Color::BLACK; pixel_count],
            channel_order,
            brightness,
        }
    }

    #[cfg(test)]
    fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> super::PixelSink for Sink<W> {
    fn set(&mut self, index: usize, color: Color) -> io::Result<()> {
        let color = self.channel_order.normalize(color);
        match self.pixels.get_mut(index) {
            Some(pixel) => {
                *pixel = color;
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("pixel {} out of range", index),
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        write!(self.writer, "\r")?;
        for pixel in self.pixels.iter() {
            let pixel = pixel.with_brightness(self.brightness);
            // A terminal has no white channel, so fold it into the others.
            write!(
                self.writer,
                "\x1b[48;2;{};{};{}m  ",
                pixel.r.saturating_add(pixel.w),
                pixel.g.saturating_add(pixel.w),
                pixel.b.saturating_add(pixel.w)
            )?;
        }
        write!(self.writer, "\x1b[0m")?;
        self.writer.flush()
    }

    fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    fn channel_order(&self) -> ChannelOrder {
        self.channel_order
    }

    fn brightness(&self) -> f32 {
        self.brightness
    }
}

impl<W: Write + Send> fmt::Display for Sink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pixels, {} (Terminal)",
            self.pixels.len(),
            self.channel_order
        )
    }
}

#[cfg(test)]
mod test {
    use crate::{
        color::{ChannelOrder, Color},
        sink::PixelSink,
    };

    use super::Sink;

    #[test]
    fn test_flush_writes_blocks() {
        let mut sink = Sink::new(Vec::new(), 2, ChannelOrder::Grbw, 0.5);
        sink.set(0, Color::rgb(200, 100, 0)).unwrap();
        sink.set(1, Color::rgbw(0, 0, 0, 100)).unwrap();
        sink.flush().unwrap();

        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert_eq!(
            "\r\x1b[48;2;100;50;0m  \x1b[48;2;50;50;50m  \x1b[0m",
            output
        );
    }

    #[test]
    fn test_white_dropped_for_rgb() {
        let mut sink = Sink::new(Vec::new(), 1, ChannelOrder::Rgb, 1.0);
        sink.set(0, Color::rgbw(0, 0, 0, 255)).unwrap();
        sink.flush().unwrap();

        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert_eq!("\r\x1b[48;2;0;0;0m  \x1b[0m", output);
    }
}
