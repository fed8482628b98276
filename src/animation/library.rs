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
use std::{collections::HashMap, time::Duration};

use crate::{color::Color, error::Error, state::State};

use super::{Animation, Side, Zone};

const TEAL: Color = Color::rgb(0, 180, 160);
const BLUE: Color = Color::rgb(0, 80, 255);
const SKY: Color = Color::rgb(0, 120, 255);
const CYAN: Color = Color::rgb(0, 200, 255);
const DEEP_CYAN: Color = Color::rgb(0, 20, 40);
const GREEN: Color = Color::rgb(0, 255, 0);
const RED: Color = Color::rgb(255, 0, 0);
const ORANGE: Color = Color::rgb(255, 100, 0);
const YELLOW: Color = Color::rgb(255, 180, 0);
const AMBER: Color = Color::rgb(255, 140, 0);
const DIM_AMBER: Color = Color::rgb(20, 10, 0);
const PURPLE: Color = Color::rgb(160, 0, 255);
const ROYAL: Color = Color::rgb(0, 90, 255);

const fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// The closed mapping from states to the animations that render them.
#[derive(Debug, Clone, Default)]
pub struct AnimationLibrary {
    animations: HashMap<State, Animation>,
}

impl AnimationLibrary {
    /// Creates an empty library.
    pub fn new() -> AnimationLibrary {
        AnimationLibrary::default()
    }

    /// The standard theme covering every state.
    pub fn standard() -> AnimationLibrary {
        let mut library = AnimationLibrary::new();
        let pulse = |color, steps, delay| Animation::Pulse {
            color,
            steps,
            delay: millis(delay),
        };
        let flow = |color, steps, delay| Animation::Flow {
            color,
            steps,
            delay: millis(delay),
        };
        let sweep = |side| Animation::DirectionalGradient {
            side,
            primary: CYAN,
            secondary: DEEP_CYAN,
            delay: millis(60),
        };

        library.register(
            State::Idle,
            Animation::Breathe {
                color: TEAL,
                steps: 40,
                min: 20,
                max: 160,
                delay: millis(50),
            },
        );
        library.register(
            State::Initializing,
            Animation::RainbowCycle { delay: millis(20) },
        );
        library.register(State::DetectingPresence, flow(BLUE, 32, 40));
        library.register(State::Authenticating, pulse(SKY, 20, 40));
        library.register(State::AccessGranted, Animation::Solid { color: GREEN });
        library.register(State::AccessDenied, pulse(RED, 10, 40));
        library.register(State::Error, pulse(RED, 6, 60));
        library.register(State::DeviceNotFound, pulse(ORANGE, 20, 50));
        library.register(State::NetworkIssue, flow(YELLOW, 32, 50));
        library.register(State::FaceLeft, sweep(Side::Left));
        library.register(State::FaceRight, sweep(Side::Right));
        library.register(
            State::FaceUnclear,
            Animation::PositionalIndicator {
                zone: Zone::Center,
                primary: AMBER,
                secondary: DIM_AMBER,
            },
        );
        library.register(State::Listening, flow(CYAN, 32, 30));
        library.register(State::Thinking, pulse(PURPLE, 24, 40));
        library.register(
            State::Speaking,
            Animation::Breathe {
                color: ROYAL,
                steps: 16,
                min: 60,
                max: 255,
                delay: millis(30),
            },
        );
        library
    }

    /// Registers the animation for a state, replacing any previous one.
    pub fn register(&mut self, state: State, animation: Animation) {
        self.animations.insert(state, animation);
    }

    /// Gets the animation for a state.
    pub fn get(&self, state: State) -> Result<&Animation, Error> {
        self.animations
            .get(&state)
            .ok_or_else(|| Error::UnknownState(state.to_string()))
    }

    /// Verifies that every state has an animation.
    pub fn validate(&self) -> Result<(), Error> {
        match State::ALL
            .iter()
            .find(|state| !self.animations.contains_key(*state))
        {
            Some(missing) => Err(Error::UnknownState(missing.to_string())),
            None => Ok(()),
        }
    }
}
