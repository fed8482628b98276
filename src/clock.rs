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
    thread,
    time::{Duration, Instant},
};

use parking_lot::Mutex;

use crate::sleep::ChangeSignal;

/// A monotonic time source with a sleep primitive.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;

    /// Blocks the calling thread for the given duration.
    fn sleep(&self, duration: Duration);

    /// Parks on `signal` until its generation moves past `seen` or `timeout`
    /// has passed on this clock. Returns true if a change was observed.
    fn wait(&self, signal: &ChangeSignal, seen: u64, timeout: Duration) -> bool {
        signal.wait(seen, timeout)
    }
}

/// The wall clock.
#[derive(Default)]
pub struct SystemClock {}

impl SystemClock {
    pub fn new() -> SystemClock {
        SystemClock {}
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        spin_sleep::sleep(duration);
    }
}

/// A clock that only moves when told to. Sleeping and waiting advance it
/// instantly.
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> ManualClock {
        ManualClock {
            now: Mutex::new(Instant::now()),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, duration: Duration) {
        *self.now.lock() += duration;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }

    fn wait(&self, signal: &ChangeSignal, seen: u64, timeout: Duration) -> bool {
        if signal.generation() != seen {
            return true;
        }
        self.advance(timeout);
        // Let the thread that would notify us run.
        thread::yield_now();
        signal.generation() != seen
    }
}
