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
use std::{sync::Arc, time::Duration};

use parking_lot::{Condvar, Mutex};

use crate::clock::Clock;

/// The largest quantum a sleeper may use. This caps how long a stale animation
/// can keep painting after a transition was accepted.
pub const MAX_QUANTUM: Duration = Duration::from_millis(100);

/// A change signal is bumped whenever the controller's target changes. Sleepers
/// park on it so that a transition wakes them before their quantum expires.
#[derive(Clone, Default)]
pub struct ChangeSignal {
    /// Incremented on every notification.
    generation: Arc<Mutex<u64>>,
    /// Wakes everything parked on the generation.
    condvar: Arc<Condvar>,
}

impl ChangeSignal {
    /// Creates a new change signal.
    pub fn new() -> ChangeSignal {
        ChangeSignal::default()
    }

    /// The current generation. Read this before checking a predicate and pass it
    /// to `wait` so that a change in between is never missed.
    pub fn generation(&self) -> u64 {
        *self.generation.lock()
    }

    /// Bumps the generation and wakes all waiters.
    pub fn notify(&self) {
        let mut generation = self.generation.lock();
        *generation = generation.wrapping_add(1);
        self.condvar.notify_all();
    }

    /// Waits until the generation moves past `seen` or the timeout expires.
    /// Returns true if a change was observed.
    pub fn wait(&self, seen: u64, timeout: Duration) -> bool {
        let mut generation = self.generation.lock();
        if *generation != seen {
            return true;
        }
        let _ = self
            .condvar
            .wait_while_for(&mut generation, |generation| *generation == seen, timeout);
        *generation != seen
    }
}

/// A sleep that gives up as soon as its predicate fails.
///
/// Time is cut into quanta of at most `MAX_QUANTUM`. The predicate is evaluated
/// before the first quantum and after every quantum. With a change signal
/// attached, each quantum is spent parked on the signal through the clock's
/// `wait`, so a notification ends it early.
pub struct InterruptibleSleep {
    clock: Arc<dyn Clock>,
    quantum: Duration,
    signal: Option<ChangeSignal>,
}

impl InterruptibleSleep {
    /// Creates a new sleeper. The quantum is clamped to 1ms..=MAX_QUANTUM.
    pub fn new(clock: Arc<dyn Clock>, quantum: Duration) -> InterruptibleSleep {
        InterruptibleSleep {
            clock,
            quantum: quantum.clamp(Duration::from_millis(1), MAX_QUANTUM),
            signal: None,
        }
    }

    /// Attaches a change signal used to wake the sleeper mid-quantum.
    pub fn with_signal(mut self, signal: ChangeSignal) -> InterruptibleSleep {
        self.signal = Some(signal);
        self
    }

    pub fn quantum(&self) -> Duration {
        self.quantum
    }

    /// Sleeps for `total`. Returns true only if the whole duration elapsed with
    /// `still_current` holding at every check, false the moment it fails.
    pub fn sleep(&self, total: Duration, still_current: &dyn Fn() -> bool) -> bool {
        let deadline = self.clock.now() + total;

        loop {
            let seen = self.signal.as_ref().map(|signal| signal.generation());
            if !still_current() {
                return false;
            }

            let now = self.clock.now();
            if now >= deadline {
                return true;
            }

            let slice = (deadline - now).min(self.quantum);
            match (&self.signal, seen) {
                (Some(signal), Some(seen)) => {
                    self.clock.wait(signal, seen, slice);
                }
                _ => self.clock.sleep(slice),
            }
        }
    }
}
