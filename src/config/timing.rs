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
use std::time::Duration;

use duration_string::DurationString;
use serde::Deserialize;

use crate::{engine::EngineSettings, sleep::MAX_QUANTUM};

use super::error::ConfigError;

/// A YAML representation of the render loop timing.
#[derive(Deserialize, Clone, Debug, Default)]
pub(super) struct Timing {
    /// The longest span between cancellation checks, e.g. "50ms".
    quantum: Option<String>,

    /// How long static animations hold before being replayed, e.g. "1s".
    hold: Option<String>,
}

fn parse_duration(duration: &Option<String>, default: Duration) -> Result<Duration, ConfigError> {
    duration.as_ref().map_or(Ok(default), |duration| {
        Ok(DurationString::from_string(duration.clone())
            .map_err(|_| ConfigError::Duration(duration.clone()))?
            .into())
    })
}

impl Timing {
    /// Gets the quantum. Must be positive and no larger than `MAX_QUANTUM`.
    fn quantum(&self, default: Duration) -> Result<Duration, ConfigError> {
        let quantum = parse_duration(&self.quantum, default)?;
        if quantum.is_zero() || quantum > MAX_QUANTUM {
            return Err(ConfigError::Invalid(format!(
                "quantum {:?} must be greater than zero and at most {:?}",
                quantum, MAX_QUANTUM
            )));
        }
        Ok(quantum)
    }

    /// Gets the hold time. Must be positive.
    fn hold(&self, default: Duration) -> Result<Duration, ConfigError> {
        let hold = parse_duration(&self.hold, default)?;
        if hold.is_zero() {
            return Err(ConfigError::Invalid(
                "hold must be greater than zero".to_string(),
            ));
        }
        Ok(hold)
    }

    /// Validates the timing configuration.
    pub(super) fn settings(&self) -> Result<EngineSettings, ConfigError> {
        let defaults = EngineSettings::default();
        Ok(EngineSettings {
            quantum: self.quantum(defaults.quantum)?,
            hold: self.hold(defaults.hold)?,
        })
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use config::{Config, File, FileFormat};

    use crate::{config::ConfigError, engine::EngineSettings};

    use super::Timing;

    fn parse(yaml: &str) -> Result<EngineSettings, ConfigError> {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize::<Timing>()?
            .settings()
    }

    #[test]
    fn test_defaults() {
        let settings = Timing::default().settings().unwrap();
        assert_eq!(Duration::from_millis(100), settings.quantum);
        assert_eq!(Duration::from_secs(1), settings.hold);
    }

    #[test]
    fn test_durations() {
        let settings = parse("quantum: 25ms\nhold: 2s").unwrap();
        assert_eq!(Duration::from_millis(25), settings.quantum);
        assert_eq!(Duration::from_secs(2), settings.hold);
    }

    #[test]
    fn test_quantum_bounds() {
        assert!(parse("quantum: 100ms").is_ok());
        assert!(matches!(
            parse("quantum: 101ms"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(parse("quantum: 0ms"), Err(ConfigError::Invalid(_))));
        assert!(matches!(parse("hold: 0s"), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_duration() {
        match parse("quantum: soon") {
            Err(ConfigError::Duration(duration)) => assert_eq!("soon", duration),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
