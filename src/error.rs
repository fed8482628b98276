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

use crate::config::ConfigError;

/// Errors raised by the indicator. A rejected transition is not an error:
/// `StateController::request` reports it through its boolean return.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid strip or engine settings. Raised before the engine starts.
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    /// A state name that doesn't exist, or a state without a registered animation.
    #[error("Unknown state: {0}")]
    UnknownState(String),

    /// The pixel sink failed to write or flush. Fatal to the engine.
    #[error("Pixel sink I/O error: {0}")]
    HardwareIo(#[from] std::io::Error),

    /// A second engine was started against a controller that already has one.
    #[error("An animation engine is already running for this controller")]
    EngineRunning,

    /// The engine died on a sink failure and no longer accepts transitions.
    /// The failure itself is returned when the engine is joined.
    #[error("The animation engine stopped after a pixel sink failure")]
    EngineFailed,

    /// The render thread couldn't be spawned or joined.
    #[error("Render thread error: {0}")]
    Thread(String),
}
