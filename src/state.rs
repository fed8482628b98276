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
use std::{fmt, str::FromStr};

use crate::error::Error;

/// A logical device status. Every state is rendered by exactly one animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum State {
    Idle,
    DetectingPresence,
    Authenticating,
    AccessGranted,
    AccessDenied,
    Error,
    DeviceNotFound,
    NetworkIssue,
    FaceLeft,
    FaceRight,
    FaceUnclear,
    Initializing,

    /// The assistant ring is waiting for speech.
    Listening,
    /// The assistant ring is processing a query.
    Thinking,
    /// The assistant ring is playing back a response.
    Speaking,
}

impl State {
    /// Every state, in declaration order.
    pub const ALL: [State; 15] = [
        State::Idle,
        State::DetectingPresence,
        State::Authenticating,
        State::AccessGranted,
        State::AccessDenied,
        State::Error,
        State::DeviceNotFound,
        State::NetworkIssue,
        State::FaceLeft,
        State::FaceRight,
        State::FaceUnclear,
        State::Initializing,
        State::Listening,
        State::Thinking,
        State::Speaking,
    ];

    /// The canonical name of the state.
    pub fn name(&self) -> &'static str {
        match self {
            State::Idle => "idle",
            State::DetectingPresence => "detecting_presence",
            State::Authenticating => "authenticating",
            State::AccessGranted => "access_granted",
            State::AccessDenied => "access_denied",
            State::Error => "error",
            State::DeviceNotFound => "device_not_found",
            State::NetworkIssue => "network_issue",
            State::FaceLeft => "face_left",
            State::FaceRight => "face_right",
            State::FaceUnclear => "face_unclear",
            State::Initializing => "initializing",
            State::Listening => "listening",
            State::Thinking => "thinking",
            State::Speaking => "speaking",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for State {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        State::ALL
            .into_iter()
            .find(|state| state.name() == normalized)
            .ok_or_else(|| Error::UnknownState(s.to_string()))
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::State;
    use crate::error::Error;

    #[test]
    fn test_names_round_trip() {
        for state in State::ALL {
            assert_eq!(state, State::from_str(state.name()).unwrap());
        }
    }

    #[test]
    fn test_lenient_parsing() {
        assert_eq!(State::FaceLeft, State::from_str("Face-Left").unwrap());
        assert_eq!(State::Idle, State::from_str("  IDLE ").unwrap());
    }

    #[test]
    fn test_unknown_state() {
        match State::from_str("celebrating") {
            Err(Error::UnknownState(name)) => assert_eq!("celebrating", name),
            other => panic!("expected unknown state error, got {:?}", other),
        }
    }
}
