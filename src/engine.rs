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
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::{debug, error, info, span, Level};

use crate::{
    animation::{AnimationLibrary, Context, Outcome},
    clock::Clock,
    color::Color,
    controller::{Adoption, StateController},
    error::Error,
    sink::PixelSink,
    sleep::{InterruptibleSleep, MAX_QUANTUM},
    state::State,
};

/// Timing knobs of the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// The longest span between cancellation checks. At most `MAX_QUANTUM`.
    pub quantum: Duration,
    /// How long static animations hold their frame before being replayed.
    pub hold: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            quantum: MAX_QUANTUM,
            hold: Duration::from_secs(1),
        }
    }
}

/// Reports the engine as stopped when the worker exits, even by panic, so
/// that `StateController::stop` never waits forever.
struct Detach<'a>(&'a StateController);

impl Drop for Detach<'_> {
    fn drop(&mut self) {
        self.0.engine_stopped();
    }
}

/// The render loop. A single worker thread that owns the pixel sink, adopts the
/// controller's requested state and plays its animation until preempted.
pub struct Engine {
    controller: Arc<StateController>,
    join_handle: Option<JoinHandle<Result<(), Error>>>,
}

impl Engine {
    /// Starts the render loop on its own thread.
    ///
    /// Fails if the library doesn't cover every state or if another engine is
    /// already attached to the controller. Frame delays, holds and idle waits
    /// are all measured on `clock`.
    pub fn start(
        controller: Arc<StateController>,
        library: AnimationLibrary,
        sink: Box<dyn PixelSink>,
        clock: Arc<dyn Clock>,
        settings: EngineSettings,
    ) -> Result<Engine, Error> {
        library.validate()?;
        controller.engine_started()?;

        let join_handle = {
            let controller = controller.clone();
            thread::Builder::new()
                .name("animation-engine".to_string())
                .spawn(move || {
                    let _detach = Detach(&controller);
                    render(&controller, &library, sink, clock, settings)
                })
        };

        match join_handle {
            Ok(join_handle) => Ok(Engine {
                controller,
                join_handle: Some(join_handle),
            }),
            Err(e) => {
                controller.engine_stopped();
                Err(Error::Thread(e.to_string()))
            }
        }
    }

    /// The controller this engine renders for.
    pub fn controller(&self) -> &Arc<StateController> {
        &self.controller
    }

    /// Waits for the worker to exit, which happens once the controller is
    /// stopped or the sink fails. Returns the sink failure, if any.
    pub fn join(mut self) -> Result<(), Error> {
        self.join_worker()
    }

    /// Stops the controller, waits for the strip to be cleared and joins the worker.
    pub fn stop_and_join(mut self) -> Result<(), Error> {
        self.controller.stop();
        self.join_worker()
    }

    fn join_worker(&mut self) -> Result<(), Error> {
        match self.join_handle.take() {
            Some(join_handle) => match join_handle.join() {
                Ok(result) => result,
                Err(_) => Err(Error::Thread("animation engine panicked".to_string())),
            },
            None => Ok(()),
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.join_handle.is_none() {
            return;
        }
        self.controller.stop();
        if let Err(e) = self.join_worker() {
            error!(err = %e, "Animation engine exited with an error.");
        }
    }
}

/// The body of the worker thread.
fn render(
    controller: &StateController,
    library: &AnimationLibrary,
    mut sink: Box<dyn PixelSink>,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
) -> Result<(), Error> {
    let span = span!(Level::INFO, "animation engine");
    let _enter = span.enter();

    info!(
        sink = %sink,
        quantum = ?settings.quantum,
        hold = ?settings.hold,
        "Animation engine started."
    );

    if let Err(e) = render_loop(controller, library, sink.as_mut(), clock, settings) {
        error!(err = %e, "Animation engine failed, stopping.");
        controller.engine_failed();
        return Err(e);
    }

    controller.engine_draining();
    sink.fill(Color::BLACK)?;
    sink.flush()?;
    info!("Animation engine stopped, strip cleared.");
    Ok(())
}

/// Adopts and renders until shutdown is requested.
fn render_loop(
    controller: &StateController,
    library: &AnimationLibrary,
    sink: &mut dyn PixelSink,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
) -> Result<(), Error> {
    let signal = controller.signal();
    let sleeper =
        InterruptibleSleep::new(clock.clone(), settings.quantum).with_signal(signal.clone());
    let mut last: Option<State> = None;

    loop {
        let seen = signal.generation();
        let state = match controller.adopt() {
            Adoption::Shutdown => return Ok(()),
            Adoption::Idle => {
                clock.wait(&signal, seen, sleeper.quantum());
                continue;
            }
            Adoption::Render(state) => state,
        };

        let animation = library.get(state)?;
        if last != Some(state) {
            info!(state = %state, animation = %animation, "Rendering state.");
            last = Some(state);
        }

        let still_current = || controller.is_target(state);
        let mut ctx = Context::new(sink, &sleeper, &still_current, settings.hold);
        if animation.play(&mut ctx)? == Outcome::Cancelled {
            debug!(state = %state, "Animation preempted.");
        }
    }
}
