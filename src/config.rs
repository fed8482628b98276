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
use std::{path::Path, str::FromStr};

use ::config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::{engine::EngineSettings, state::State};

mod error;
mod strip;
mod timing;

pub use error::ConfigError;
pub use strip::StripSettings;

/// The prefix of environment variables that override the config file, e.g.
/// `STATUSLIGHT_STRIP__PIXEL_COUNT=30`.
pub const ENV_PREFIX: &str = "STATUSLIGHT";

/// The YAML representation of a status light.
#[derive(Deserialize, Debug, Default)]
struct Device {
    /// The LED strip.
    strip: Option<strip::Strip>,

    /// Render loop timing.
    engine: Option<timing::Timing>,

    /// The state to show as soon as the engine starts.
    initial_state: Option<String>,
}

/// Validated settings for a status light.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub strip: StripSettings,
    pub engine: EngineSettings,
    pub initial_state: Option<State>,
}

impl Device {
    fn settings(&self) -> Result<Settings, ConfigError> {
        let strip = self.strip.clone().unwrap_or_default().settings()?;
        let engine = self.engine.clone().unwrap_or_default().settings()?;
        let initial_state = self
            .initial_state
            .as_ref()
            .map(|state| {
                State::from_str(state)
                    .map_err(|_| ConfigError::Invalid(format!("unknown initial state '{}'", state)))
            })
            .transpose()?;

        Ok(Settings {
            strip,
            engine,
            initial_state,
        })
    }
}

impl Settings {
    /// Loads settings from a YAML file. Environment variables prefixed with
    /// `STATUSLIGHT_` override values from the file.
    pub fn load(path: &Path) -> Result<Settings, ConfigError> {
        Config::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Device>()?
            .settings()
    }

    /// Parses settings from a YAML string.
    pub fn parse(yaml: &str) -> Result<Settings, ConfigError> {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize::<Device>()?
            .settings()
    }
}
