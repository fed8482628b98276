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
use std::{str::FromStr, sync::Arc, time::Duration};

use tracing::{info, warn};

use crate::{
    animation::AnimationLibrary,
    clock::SystemClock,
    controller::StateController,
    engine::{Engine, EngineSettings},
    error::Error,
    sink::PixelSink,
    state::State,
};

/// The control surface of a status light: a controller with a running engine.
pub struct Indicator {
    controller: Arc<StateController>,
    engine: Engine,
}

impl Indicator {
    /// Starts the engine on the given sink with the standard animation theme.
    pub fn start(settings: EngineSettings, sink: Box<dyn PixelSink>) -> Result<Indicator, Error> {
        Indicator::start_with_library(settings, sink, AnimationLibrary::standard())
    }

    /// Starts the engine on the given sink with a custom animation library.
    pub fn start_with_library(
        settings: EngineSettings,
        sink: Box<dyn PixelSink>,
        library: AnimationLibrary,
    ) -> Result<Indicator, Error> {
        let clock = Arc::new(SystemClock::new());
        let controller = Arc::new(StateController::new(clock.clone()));
        info!(sink = %sink, "Starting indicator.");
        let engine = Engine::start(controller.clone(), library, sink, clock, settings)?;

        Ok(Indicator { controller, engine })
    }

    /// Requests a transition by state name. Unknown names are rejected here and
    /// never reach the engine. Returns whether the transition was accepted, or
    /// `EngineFailed` once the engine has died on a sink failure.
    pub fn request_transition(
        &self,
        state_name: &str,
        min_dwell: Duration,
        force: bool,
    ) -> Result<bool, Error> {
        let state = match State::from_str(state_name) {
            Ok(state) => state,
            Err(e) => {
                warn!(state = state_name, "Unknown state requested.");
                return Err(e);
            }
        };
        if self.controller.is_faulted() {
            warn!(state = %state, "Animation engine has failed, rejecting transition.");
            return Err(Error::EngineFailed);
        }
        Ok(self.controller.request(state, min_dwell, force))
    }

    /// The controller behind this indicator.
    pub fn controller(&self) -> &Arc<StateController> {
        &self.controller
    }

    /// Stops the engine, clears the strip and waits for the worker to exit.
    /// Returns the sink failure that stopped the engine, if there was one.
    pub fn stop_and_join(self) -> Result<(), Error> {
        info!("Stopping indicator.");
        self.engine.stop_and_join()
    }
}
