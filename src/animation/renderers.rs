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
use std::{io, time::Duration};

use crate::{
    color::{wheel, Color},
    error::Error,
};

use super::{Context, Outcome, Side, Zone};

/// Paints and shows a single frame, then sleeps for `delay`. Returns false if
/// the routine was cancelled before or after the frame.
fn frame<F>(ctx: &mut Context<'_>, delay: Duration, paint: F) -> Result<bool, Error>
where
    F: FnOnce(&mut Context<'_>) -> io::Result<()>,
{
    if !ctx.is_current() {
        return Ok(false);
    }
    paint(ctx)?;
    ctx.show()?;
    Ok(ctx.wait(delay))
}

/// Paints every pixel with the color returned for its index.
fn paint_each<F>(ctx: &mut Context<'_>, color_at: F) -> io::Result<()>
where
    F: Fn(usize) -> Color,
{
    for index in 0..ctx.len() {
        ctx.set(index, color_at(index))?;
    }
    Ok(())
}

/// Distance between two pixels when the strip is treated as a ring.
fn ring_distance(a: usize, b: usize, len: usize) -> usize {
    let forward = (a + len - b) % len;
    forward.min(len - forward)
}

pub(super) fn solid(ctx: &mut Context<'_>, color: Color) -> Result<Outcome, Error> {
    if !ctx.is_current() {
        return Ok(Outcome::Cancelled);
    }
    ctx.fill(color)?;
    ctx.show()?;
    Ok(Outcome::from_completed(ctx.hold()))
}

pub(super) fn pulse(
    ctx: &mut Context<'_>,
    color: Color,
    steps: u32,
    delay: Duration,
) -> Result<Outcome, Error> {
    let half = (steps / 2).max(1);

    for step in 0..steps {
        let level = if step <= half { step } else { steps - step };
        let scaled = color.scale(level, half);
        if !frame(ctx, delay, |ctx| ctx.fill(scaled))? {
            return Ok(Outcome::Cancelled);
        }
    }
    Ok(Outcome::Completed)
}

pub(super) fn flow(
    ctx: &mut Context<'_>,
    color: Color,
    steps: u32,
    delay: Duration,
) -> Result<Outcome, Error> {
    let len = ctx.len();
    let half = (len / 2).max(1);
    let period = 2 * len;

    for step in 0..steps as usize {
        let head = step % period;
        let painted = frame(ctx, delay, |ctx| {
            paint_each(ctx, |index| {
                let fade = half.saturating_sub(head.abs_diff(index));
                color.scale(fade as u32, half as u32)
            })
        })?;
        if !painted {
            return Ok(Outcome::Cancelled);
        }
    }
    Ok(Outcome::Completed)
}

pub(super) fn directional_gradient(
    ctx: &mut Context<'_>,
    side: Side,
    primary: Color,
    secondary: Color,
    delay: Duration,
) -> Result<Outcome, Error> {
    let len = ctx.len();
    let origin = match side {
        Side::Left => 0,
        Side::Right => len / 2,
    };
    let near = primary.scale(1, 2);

    for step in 0..(len / 2).max(1) {
        let a = (origin + step) % len;
        let b = (origin + len - 1 - step) % len;
        let painted = frame(ctx, delay, |ctx| {
            paint_each(ctx, |index| {
                match ring_distance(index, a, len).min(ring_distance(index, b, len)) {
                    0 => primary,
                    1 => near,
                    _ => secondary,
                }
            })
        })?;
        if !painted {
            return Ok(Outcome::Cancelled);
        }
    }
    Ok(Outcome::Completed)
}

pub(super) fn positional_indicator(
    ctx: &mut Context<'_>,
    zone: Zone,
    primary: Color,
    secondary: Color,
) -> Result<Outcome, Error> {
    if !ctx.is_current() {
        return Ok(Outcome::Cancelled);
    }

    let len = ctx.len();
    let third = len / 3;
    // Strips shorter than three pixels still light an end pixel for a side.
    let edge = third.max(1);
    paint_each(ctx, |index| {
        let lit = match zone {
            Zone::Left => index < edge,
            Zone::Right => index >= len - edge,
            Zone::Center => third == 0 || (index >= third && index < len - third),
        };
        if lit {
            primary
        } else {
            secondary
        }
    })?;
    ctx.show()?;
    Ok(Outcome::from_completed(ctx.hold()))
}

pub(super) fn breathe(
    ctx: &mut Context<'_>,
    color: Color,
    steps: u32,
    min: u8,
    max: u8,
    delay: Duration,
) -> Result<Outcome, Error> {
    let steps = steps.max(1);
    let level = |k: u32| -> u32 {
        let (min, max) = (i64::from(min), i64::from(max));
        (min + (max - min) * i64::from(k) / i64::from(steps)) as u32
    };

    // Up to the peak, then back down without repeating it.
    let ramp = (0..=steps).chain((0..steps).rev());
    for k in ramp {
        let scaled = color.scale(level(k), 255);
        if !frame(ctx, delay, |ctx| ctx.fill(scaled))? {
            return Ok(Outcome::Cancelled);
        }
    }
    Ok(Outcome::Completed)
}

pub(super) fn rainbow_cycle(ctx: &mut Context<'_>, delay: Duration) -> Result<Outcome, Error> {
    let len = ctx.len();

    for offset in 0..255 {
        let painted = frame(ctx, delay, |ctx| {
            paint_each(ctx, |index| wheel(((index * 256 / len + offset) & 255) as i32))
        })?;
        if !painted {
            return Ok(Outcome::Cancelled);
        }
    }
    Ok(Outcome::Completed)
}
