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
use std::{collections::VecDeque, fmt, io, sync::Arc};

use parking_lot::Mutex;

use crate::color::{ChannelOrder, Color};

/// The number of flushed frames a mock sink keeps around.
const MAX_RECORDED_FRAMES: usize = 4096;

#[derive(Default)]
struct Recording {
    pixels: Vec<Color>,
    frames: VecDeque<Vec<Color>>,
    writes: usize,
    flushes: usize,
    fail_flush_after: Option<usize>,
}

/// A mock sink. Doesn't drive anything, but records every flushed frame.
/// Clones share the same recording, so a test can keep one while the engine
/// owns another.
#[derive(Clone)]
pub struct Sink {
    pixel_count: usize,
    channel_order: ChannelOrder,
    brightness: f32,
    recording: Arc<Mutex<Recording>>,
}

impl Sink {
    /// Creates a new mock sink with every pixel off.
    pub fn new(pixel_count: usize, channel_order: ChannelOrder) -> Sink {
        Sink {
            pixel_count,
            channel_order,
            brightness: 1.0,
            recording: Arc::new(Mutex::new(Recording {
                pixels: vec![Color::BLACK; pixel_count],
                ..Default::default()
            })),
        }
    }

    pub fn with_brightness(mut self, brightness: f32) -> Sink {
        self.brightness = brightness;
        self
    }

    /// The current contents of the pixel buffer.
    pub fn pixels(&self) -> Vec<Color> {
        self.recording.lock().pixels.clone()
    }

    /// The flushed frames, oldest first.
    pub fn frames(&self) -> Vec<Vec<Color>> {
        self.recording.lock().frames.iter().cloned().collect()
    }

    pub fn last_frame(&self) -> Option<Vec<Color>> {
        self.recording.lock().frames.back().cloned()
    }

    /// The number of successful flushes.
    pub fn flush_count(&self) -> usize {
        self.recording.lock().flushes
    }

    /// The number of pixel writes, including ones never flushed.
    pub fn write_count(&self) -> usize {
        self.recording.lock().writes
    }

    /// The pixel buffer as it would go out on the wire.
    pub fn wire(&self) -> Vec<u8> {
        let recording = self.recording.lock();
        let mut buffer = Vec::with_capacity(self.pixel_count * self.channel_order.channels());
        for pixel in recording.pixels.iter() {
            self.channel_order.encode(*pixel, &mut buffer);
        }
        buffer
    }

    /// Makes every flush after the given number of successful ones fail.
    pub fn fail_flush_after(&self, flushes: usize) {
        self.recording.lock().fail_flush_after = Some(flushes);
    }
}

impl super::PixelSink for Sink {
    fn set(&mut self, index: usize, color: Color) -> io::Result<()> {
        let mut recording = self.recording.lock();
        let color = self.channel_order.normalize(color);
        match recording.pixels.get_mut(index) {
            Some(pixel) => *pixel = color,
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("pixel {} out of range", index),
                ))
            }
        }
        recording.writes += 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut recording = self.recording.lock();
        if recording
            .fail_flush_after
            .is_some_and(|limit| recording.flushes >= limit)
        {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock flush failure"));
        }

        if recording.frames.len() == MAX_RECORDED_FRAMES {
            recording.frames.pop_front();
        }
        let frame = recording.pixels.clone();
        recording.frames.push_back(frame);
        recording.flushes += 1;
        Ok(())
    }

    fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    fn channel_order(&self) -> ChannelOrder {
        self.channel_order
    }

    fn brightness(&self) -> f32 {
        self.brightness
    }
}

impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pixels, {} (Mock)",
            self.pixel_count, self.channel_order
        )
    }
}
