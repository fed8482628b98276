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
use std::{fmt, io, time::Duration};

use crate::{color::Color, error::Error, sink::PixelSink, sleep::InterruptibleSleep};

mod library;
mod renderers;

pub use library::AnimationLibrary;

/// Which edge a directional sweep starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// A third of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Left,
    Center,
    Right,
}

/// How an animation routine ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every frame was rendered and every sleep ran to completion.
    Completed,
    /// The cancellation predicate failed at a checkpoint.
    Cancelled,
}

impl Outcome {
    fn from_completed(completed: bool) -> Outcome {
        if completed {
            Outcome::Completed
        } else {
            Outcome::Cancelled
        }
    }
}

/// An animation routine with its parameters. Colors and timings come from the
/// library's fixed theme table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Animation {
    /// Fills the strip and holds.
    Solid { color: Color },
    /// A triangular brightness envelope over `steps` frames.
    Pulse {
        color: Color,
        steps: u32,
        delay: Duration,
    },
    /// A bright band of half-width N/2 traveling along the strip.
    Flow {
        color: Color,
        steps: u32,
        delay: Duration,
    },
    /// A symmetric pair of hot pixels sweeping from one side toward the other.
    DirectionalGradient {
        side: Side,
        primary: Color,
        secondary: Color,
        delay: Duration,
    },
    /// Lights one third of the strip and holds. On strips shorter than three
    /// pixels a side lights its end pixel and the center lights everything.
    PositionalIndicator {
        zone: Zone,
        primary: Color,
        secondary: Color,
    },
    /// A linear ramp from `min` to `max` brightness (out of 255) and back.
    Breathe {
        color: Color,
        steps: u32,
        min: u8,
        max: u8,
        delay: Duration,
    },
    /// The color wheel spread across the strip, rotated one position per frame
    /// for 255 frames.
    RainbowCycle { delay: Duration },
}

impl Animation {
    /// Runs the routine until it finishes or the context's predicate fails.
    /// Sink failures are returned as-is; they are never retried here.
    pub fn play(&self, ctx: &mut Context<'_>) -> Result<Outcome, Error> {
        if ctx.len() == 0 {
            return Ok(Outcome::from_completed(ctx.hold()));
        }

        match *self {
            Animation::Solid { color } => renderers::solid(ctx, color),
            Animation::Pulse {
                color,
                steps,
                delay,
            } => renderers::pulse(ctx, color, steps, delay),
            Animation::Flow {
                color,
                steps,
                delay,
            } => renderers::flow(ctx, color, steps, delay),
            Animation::DirectionalGradient {
                side,
                primary,
                secondary,
                delay,
            } => renderers::directional_gradient(ctx, side, primary, secondary, delay),
            Animation::PositionalIndicator {
                zone,
                primary,
                secondary,
            } => renderers::positional_indicator(ctx, zone, primary, secondary),
            Animation::Breathe {
                color,
                steps,
                min,
                max,
                delay,
            } => renderers::breathe(ctx, color, steps, min, max, delay),
            Animation::RainbowCycle { delay } => renderers::rainbow_cycle(ctx, delay),
        }
    }
}

impl fmt::Display for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Animation::Solid { color } => write!(f, "solid {}", color),
            Animation::Pulse {
                color,
                steps,
                delay,
            } => write!(f, "pulse {} ({} steps, {:?})", color, steps, delay),
            Animation::Flow {
                color,
                steps,
                delay,
            } => write!(f, "flow {} ({} steps, {:?})", color, steps, delay),
            Animation::DirectionalGradient {
                side,
                primary,
                secondary,
                delay,
            } => write!(
                f,
                "sweep {:?} {} on {} ({:?})",
                side, primary, secondary, delay
            ),
            Animation::PositionalIndicator {
                zone,
                primary,
                secondary,
            } => write!(f, "zone {:?} {} on {}", zone, primary, secondary),
            Animation::Breathe {
                color,
                steps,
                min,
                max,
                delay,
            } => write!(
                f,
                "breathe {} ({}..{}, {} steps, {:?})",
                color, min, max, steps, delay
            ),
            Animation::RainbowCycle { delay } => write!(f, "rainbow ({:?})", delay),
        }
    }
}

/// Everything a routine may touch while it runs: the strip, the sleeper and
/// the predicate telling it whether its state is still wanted.
pub struct Context<'a> {
    sink: &'a mut dyn PixelSink,
    sleeper: &'a InterruptibleSleep,
    still_current: &'a dyn Fn() -> bool,
    /// How long static routines hold their frame before returning.
    hold: Duration,
}

impl<'a> Context<'a> {
    pub fn new(
        sink: &'a mut dyn PixelSink,
        sleeper: &'a InterruptibleSleep,
        still_current: &'a dyn Fn() -> bool,
        hold: Duration,
    ) -> Context<'a> {
        Context {
            sink,
            sleeper,
            still_current,
            hold,
        }
    }

    /// The number of pixels on the strip.
    pub fn len(&self) -> usize {
        self.sink.pixel_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checkpoint: false once the routine should stop.
    pub fn is_current(&self) -> bool {
        (self.still_current)()
    }

    pub fn set(&mut self, index: usize, color: Color) -> io::Result<()> {
        self.sink.set(index, color)
    }

    pub fn fill(&mut self, color: Color) -> io::Result<()> {
        self.sink.fill(color)
    }

    /// Flushes the frame to the strip.
    pub fn show(&mut self) -> io::Result<()> {
        self.sink.flush()
    }

    /// Sleeps interruptibly. Returns false if the routine should stop.
    pub fn wait(&self, duration: Duration) -> bool {
        self.sleeper.sleep(duration, self.still_current)
    }

    /// Holds the current frame for the configured hold time.
    pub fn hold(&self) -> bool {
        self.wait(self.hold)
    }
}
