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
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info};

use crate::{clock::Clock, error::Error, sleep::ChangeSignal, state::State};

/// A request to move the indicator to a new state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRequest {
    /// The state to move to.
    pub target: State,
    /// How long the target must stay before a non-forced request may replace it.
    pub min_dwell: Duration,
    /// Ignore the dwell time of the state being replaced.
    pub force: bool,
}

impl TransitionRequest {
    /// Creates a request with no dwell time that respects the current dwell.
    pub fn new(target: State) -> TransitionRequest {
        TransitionRequest {
            target,
            min_dwell: Duration::ZERO,
            force: false,
        }
    }

    pub fn min_dwell(mut self, min_dwell: Duration) -> TransitionRequest {
        self.min_dwell = min_dwell;
        self
    }

    pub fn force(mut self, force: bool) -> TransitionRequest {
        self.force = force;
        self
    }
}

/// A point-in-time copy of the controller's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSnapshot {
    /// The state the engine has adopted and is rendering.
    pub current: Option<State>,
    /// The latest accepted target. May run ahead of `current`.
    pub requested: Option<State>,
    /// When `requested` was accepted.
    pub state_start_time: Instant,
    /// The minimum dwell of `requested`.
    pub min_dwell_for_current: Duration,
}

/// The lifecycle of the engine attached to a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Stopped,
    Running,
    Draining,
}

/// What the engine should do at the top of a render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Adoption {
    /// Shutdown has been requested.
    Shutdown,
    /// Nothing has been requested yet.
    Idle,
    /// Render the given state.
    Render(State),
}

struct Inner {
    snapshot: ControllerSnapshot,
    shutdown: bool,
    /// Set when the engine exited on a sink failure. Cleared by the next start.
    faulted: bool,
    engine: EngineState,
}

/// Owns the current/requested state and decides which transitions are honored.
///
/// Every field of the snapshot is updated under one lock, so a reader can never
/// pair a new state with a stale dwell time. The lock is only held for the
/// compare-and-set, never across a sleep or pixel I/O.
pub struct StateController {
    inner: Mutex<Inner>,
    /// Notified when the engine changes lifecycle state.
    engine_changed: Condvar,
    /// Notified when the target changes or shutdown is requested.
    signal: ChangeSignal,
    clock: Arc<dyn Clock>,
}

impl StateController {
    /// Creates a new controller with nothing requested.
    pub fn new(clock: Arc<dyn Clock>) -> StateController {
        StateController {
            inner: Mutex::new(Inner {
                snapshot: ControllerSnapshot {
                    current: None,
                    requested: None,
                    state_start_time: clock.now(),
                    min_dwell_for_current: Duration::ZERO,
                },
                shutdown: false,
                faulted: false,
                engine: EngineState::Stopped,
            }),
            engine_changed: Condvar::new(),
            signal: ChangeSignal::new(),
            clock,
        }
    }

    /// Requests a transition to `target`. Returns true if it was accepted.
    ///
    /// The request is dropped if `target` is already the latest accepted state,
    /// if the controller has been stopped, or if `force` is false and the latest
    /// accepted state hasn't stayed for its minimum dwell. On acceptance
    /// `min_dwell` becomes the dwell of `target` itself.
    pub fn request(&self, target: State, min_dwell: Duration, force: bool) -> bool {
        self.submit(
            TransitionRequest::new(target)
                .min_dwell(min_dwell)
                .force(force),
        )
    }

    /// Submits a transition request. See `request`.
    pub fn submit(&self, request: TransitionRequest) -> bool {
        let now = self.clock.now();
        let from = {
            let mut inner = self.inner.lock();
            if inner.shutdown {
                debug!(state = %request.target, "Controller stopped, ignoring request.");
                return false;
            }

            let snapshot = &mut inner.snapshot;
            if snapshot.requested == Some(request.target) {
                debug!(state = %request.target, "Already in requested state.");
                return false;
            }

            let elapsed = now.saturating_duration_since(snapshot.state_start_time);
            if !request.force && elapsed < snapshot.min_dwell_for_current {
                debug!(
                    state = %request.target,
                    remaining = ?(snapshot.min_dwell_for_current - elapsed),
                    "Dwell time not elapsed, rejecting transition."
                );
                return false;
            }

            let from = snapshot.requested;
            snapshot.requested = Some(request.target);
            snapshot.state_start_time = now;
            snapshot.min_dwell_for_current = request.min_dwell;
            from
        };

        info!(
            from = ?from,
            to = %request.target,
            min_dwell = ?request.min_dwell,
            force = request.force,
            "Transition accepted."
        );
        self.signal.notify();
        true
    }

    /// The state the engine is rendering.
    pub fn current(&self) -> Option<State> {
        self.inner.lock().snapshot.current
    }

    /// The latest accepted target.
    pub fn requested(&self) -> Option<State> {
        self.inner.lock().snapshot.requested
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        self.inner.lock().snapshot
    }

    pub fn engine_state(&self) -> EngineState {
        self.inner.lock().engine
    }

    /// True once the engine has died on a sink failure. Requests are rejected
    /// until a new engine is started.
    pub fn is_faulted(&self) -> bool {
        self.inner.lock().faulted
    }

    /// Clears the target, asks the engine to shut down and waits until it has
    /// cleared the strip. Returns immediately if no engine is attached.
    pub fn stop(&self) {
        {
            let mut inner = self.inner.lock();
            inner.shutdown = true;
            inner.snapshot.requested = None;
        }
        self.signal.notify();

        let mut inner = self.inner.lock();
        self.engine_changed
            .wait_while(&mut inner, |inner| inner.engine != EngineState::Stopped);
    }

    /// The signal bumped on every change the engine must react to.
    pub(crate) fn signal(&self) -> ChangeSignal {
        self.signal.clone()
    }

    /// Attaches an engine. Only one engine may write to the strip at a time.
    pub(crate) fn engine_started(&self) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        if inner.engine != EngineState::Stopped {
            return Err(Error::EngineRunning);
        }
        inner.engine = EngineState::Running;
        inner.shutdown = false;
        inner.faulted = false;
        inner.snapshot.current = None;
        self.engine_changed.notify_all();
        Ok(())
    }

    /// Reconciles `current` with `requested` and reports what to render.
    pub(crate) fn adopt(&self) -> Adoption {
        let mut inner = self.inner.lock();
        if inner.shutdown {
            return Adoption::Shutdown;
        }
        inner.snapshot.current = inner.snapshot.requested;
        match inner.snapshot.current {
            Some(state) => Adoption::Render(state),
            None => Adoption::Idle,
        }
    }

    /// The cancellation predicate: true while `state` is still the target and
    /// no shutdown has been requested.
    pub(crate) fn is_target(&self, state: State) -> bool {
        let inner = self.inner.lock();
        !inner.shutdown && inner.snapshot.requested == Some(state)
    }

    pub(crate) fn engine_draining(&self) {
        let mut inner = self.inner.lock();
        inner.engine = EngineState::Draining;
        self.engine_changed.notify_all();
    }

    /// Marks the engine as dead after a sink failure. Nothing will render a
    /// later request, so the target is cleared and new requests are rejected.
    pub(crate) fn engine_failed(&self) {
        {
            let mut inner = self.inner.lock();
            inner.shutdown = true;
            inner.faulted = true;
            inner.snapshot.requested = None;
        }
        self.signal.notify();
    }

    /// Detaches the engine and wakes anyone blocked in `stop`.
    pub(crate) fn engine_stopped(&self) {
        let mut inner = self.inner.lock();
        inner.engine = EngineState::Stopped;
        inner.snapshot.current = None;
        self.engine_changed.notify_all();
    }
}

#[cfg(test)]
mod test {
    use std::{sync::Arc, thread, time::Duration};

    use crate::{
        clock::{Clock, ManualClock},
        error::Error,
        state::State,
        testutil::eventually,
    };

    use super::{Adoption, EngineState, StateController, TransitionRequest};

    fn new_controller() -> (Arc<ManualClock>, StateController) {
        let clock = Arc::new(ManualClock::new());
        (clock.clone(), StateController::new(clock))
    }

    #[test]
    fn test_first_request_accepted() {
        let (clock, controller) = new_controller();
        clock.advance(Duration::from_millis(10));

        assert!(controller.request(State::Idle, Duration::ZERO, false));

        let snapshot = controller.snapshot();
        assert_eq!(None, snapshot.current);
        assert_eq!(Some(State::Idle), snapshot.requested);
        assert_eq!(clock.now(), snapshot.state_start_time);
        assert_eq!(Duration::ZERO, snapshot.min_dwell_for_current);
    }

    #[test]
    fn test_same_state_is_noop() {
        let (clock, controller) = new_controller();
        assert!(controller.request(State::Idle, Duration::from_millis(100), false));
        assert_eq!(Adoption::Render(State::Idle), controller.adopt());
        assert_eq!(Some(State::Idle), controller.current());

        clock.advance(Duration::from_secs(1));
        let before = controller.snapshot();
        assert!(!controller.request(State::Idle, Duration::ZERO, false));
        assert!(!controller.request(State::Idle, Duration::from_secs(3), true));
        assert_eq!(before, controller.snapshot());
    }

    #[test]
    fn test_dwell_rejects_until_elapsed() {
        let (clock, controller) = new_controller();
        assert!(controller.request(State::AccessGranted, Duration::from_millis(500), false));
        let before = controller.snapshot();

        clock.advance(Duration::from_millis(100));
        assert!(!controller.request(State::Idle, Duration::ZERO, false));
        assert_eq!(before, controller.snapshot());

        clock.advance(Duration::from_millis(399));
        assert!(!controller.request(State::Idle, Duration::ZERO, false));

        clock.advance(Duration::from_millis(1));
        assert!(controller.request(State::Idle, Duration::ZERO, false));
        assert_eq!(Some(State::Idle), controller.requested());
    }

    #[test]
    fn test_dwell_guards_incoming_state() {
        let (clock, controller) = new_controller();
        // Authenticating carries no dwell and is replaced at once. Idle carries
        // its own 300ms dwell.
        assert!(controller.request(State::Authenticating, Duration::ZERO, false));
        assert!(controller.request(State::Idle, Duration::from_millis(300), false));
        clock.advance(Duration::from_millis(200));
        assert!(!controller.request(State::Error, Duration::ZERO, false));
        clock.advance(Duration::from_millis(100));
        assert!(controller.request(State::Error, Duration::ZERO, false));
    }

    #[test]
    fn test_force_ignores_dwell() {
        let (clock, controller) = new_controller();
        assert!(controller.request(State::AccessGranted, Duration::from_secs(10), false));
        clock.advance(Duration::from_millis(1));

        assert!(controller.submit(
            TransitionRequest::new(State::Error)
                .min_dwell(Duration::from_millis(50))
                .force(true)
        ));

        let snapshot = controller.snapshot();
        assert_eq!(Some(State::Error), snapshot.requested);
        assert_eq!(clock.now(), snapshot.state_start_time);
        assert_eq!(Duration::from_millis(50), snapshot.min_dwell_for_current);
    }

    #[test]
    fn test_requested_races_ahead_of_current() {
        let (_, controller) = new_controller();
        assert!(controller.request(State::Idle, Duration::ZERO, false));
        assert_eq!(Adoption::Render(State::Idle), controller.adopt());
        assert!(controller.request(State::Thinking, Duration::ZERO, false));

        assert_eq!(Some(State::Idle), controller.current());
        assert_eq!(Some(State::Thinking), controller.requested());
        assert!(!controller.is_target(State::Idle));
        assert!(controller.is_target(State::Thinking));

        assert_eq!(Adoption::Render(State::Thinking), controller.adopt());
        assert_eq!(Some(State::Thinking), controller.current());
    }

    #[test]
    fn test_adopt_idle_and_shutdown() {
        let (_, controller) = new_controller();
        assert_eq!(Adoption::Idle, controller.adopt());
        controller.stop();
        assert_eq!(Adoption::Shutdown, controller.adopt());
    }

    #[test]
    fn test_stop_without_engine_returns() {
        let (_, controller) = new_controller();
        assert!(controller.request(State::Idle, Duration::ZERO, false));
        controller.stop();
        assert_eq!(None, controller.requested());
        assert!(!controller.is_target(State::Idle));
        assert!(!controller.request(State::Error, Duration::ZERO, true));
    }

    #[test]
    fn test_second_engine_refused() {
        let (_, controller) = new_controller();
        assert!(controller.engine_started().is_ok());
        assert!(matches!(controller.engine_started(), Err(Error::EngineRunning)));
        controller.engine_stopped();
        assert!(controller.engine_started().is_ok());
    }

    #[test]
    fn test_failed_engine_rejects_requests() {
        let (_, controller) = new_controller();
        assert!(controller.engine_started().is_ok());
        assert!(controller.request(State::Listening, Duration::ZERO, false));

        controller.engine_failed();
        controller.engine_stopped();
        assert!(controller.is_faulted());
        assert_eq!(None, controller.requested());
        assert!(!controller.request(State::Error, Duration::ZERO, true));
        assert_eq!(Adoption::Shutdown, controller.adopt());

        // A fresh engine clears the fault.
        assert!(controller.engine_started().is_ok());
        assert!(!controller.is_faulted());
        assert!(controller.request(State::Error, Duration::ZERO, false));
    }

    #[test]
    fn test_stop_waits_for_engine() {
        let (_, controller) = new_controller();
        let controller = Arc::new(controller);
        assert!(controller.engine_started().is_ok());

        let join = {
            let controller = controller.clone();
            thread::spawn(move || controller.stop())
        };

        eventually(
            || controller.adopt() == Adoption::Shutdown,
            "Shutdown was never requested",
        );
        assert!(!join.is_finished());
        assert_eq!(EngineState::Running, controller.engine_state());

        controller.engine_draining();
        controller.engine_stopped();
        assert!(join.join().is_ok());
        assert_eq!(EngineState::Stopped, controller.engine_state());
    }

    #[test]
    fn test_concurrent_requests_keep_tuple_consistent() {
        let (_, controller) = new_controller();
        let controller = Arc::new(controller);

        let joins: Vec<_> = State::ALL
            .into_iter()
            .map(|state| {
                let controller = controller.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        controller.request(state, Duration::from_millis(state as u64), true);
                    }
                })
            })
            .collect();
        for join in joins {
            assert!(join.join().is_ok());
        }

        let snapshot = controller.snapshot();
        let requested = snapshot.requested.expect("a state should be requested");
        assert_eq!(
            Duration::from_millis(requested as u64),
            snapshot.min_dwell_for_current
        );
    }
}
