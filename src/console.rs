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
    io,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender};
use duration_string::DurationString;
use tracing::{info, span, warn, Level};

use crate::{animation::AnimationLibrary, error::Error, indicator::Indicator, state::State};

const STOP: &str = "stop";
const STATES: &str = "states";
const FORCE: &str = "force";

/// Console events that drive the indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Requests a transition. The name is checked by the indicator.
    Transition {
        state: String,
        min_dwell: Duration,
        force: bool,
    },

    /// Stops the indicator and ends the console.
    Stop,

    /// Lists the known states.
    States,
}

/// Reads one command and sends the matching event. Returns false once the
/// reader is exhausted, after sending a final `Stop`.
pub fn monitor_io<R, W>(events_tx: &Sender<Event>, mut reader: R, mut writer: W) -> io::Result<bool>
where
    R: io::BufRead,
    W: io::Write,
{
    write!(
        writer,
        "Command (<state> [<dwell>] [{}], {}, {}): ",
        FORCE, STOP, STATES
    )?;
    writer.flush()?;
    let mut input = String::default();
    if reader.read_line(&mut input)? == 0 {
        events_tx
            .send(Event::Stop)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        return Ok(false);
    }

    if let Some(event) = parse(&input) {
        events_tx
            .send(event)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    }
    Ok(true)
}

/// Parses a command line. Blank and malformed lines produce no event.
fn parse(input: &str) -> Option<Event> {
    let lowered = input.trim().to_lowercase();
    let mut words = lowered.split_whitespace();
    let command = words.next()?;

    match command {
        STOP => return Some(Event::Stop),
        STATES => return Some(Event::States),
        _ => {}
    }

    let mut min_dwell = Duration::ZERO;
    let mut force = false;
    for word in words {
        if word == FORCE {
            force = true;
            continue;
        }
        match DurationString::from_string(word.to_string()) {
            Ok(duration) => min_dwell = duration.into(),
            Err(_) => {
                warn!(input = input.trim(), "Unrecognized input");
                return None;
            }
        }
    }

    Some(Event::Transition {
        state: command.to_string(),
        min_dwell,
        force,
    })
}

/// Reads commands from stdin on a dedicated thread until stdin closes.
pub fn monitor_stdin(events_tx: Sender<Event>) -> JoinHandle<io::Result<()>> {
    thread::spawn(move || {
        let span = span!(Level::INFO, "keyboard driver");
        let _enter = span.enter();

        info!("Keyboard driver started.");

        while monitor_io(&events_tx, io::stdin().lock(), io::stdout())? {}
        Ok(())
    })
}

fn reply<W: io::Write>(writer: &mut W, message: &str) {
    if let Err(e) = writeln!(writer, "{}", message) {
        warn!(err = %e, "Unable to write to console.");
    }
}

/// Applies console events to the indicator until a `Stop` arrives, every
/// sender is gone or the engine has failed, then stops the indicator. The
/// sink failure, if any, is returned.
pub fn run<W: io::Write>(
    indicator: Indicator,
    events_rx: &Receiver<Event>,
    mut writer: W,
) -> Result<(), Error> {
    let span = span!(Level::INFO, "console");
    let _enter = span.enter();

    let library = AnimationLibrary::standard();
    while let Ok(event) = events_rx.recv() {
        match event {
            Event::Transition {
                state,
                min_dwell,
                force,
            } => match indicator.request_transition(&state, min_dwell, force) {
                Ok(true) => reply(&mut writer, &format!("{}: accepted", state)),
                Ok(false) => reply(&mut writer, &format!("{}: rejected", state)),
                Err(Error::EngineFailed) => {
                    reply(&mut writer, &Error::EngineFailed.to_string());
                    break;
                }
                Err(e) => reply(&mut writer, &e.to_string()),
            },
            Event::States => {
                for state in State::ALL {
                    let line = match library.get(state) {
                        Ok(animation) => format!("{:<20}{}", state, animation),
                        Err(_) => state.to_string(),
                    };
                    reply(&mut writer, &line);
                }
            }
            Event::Stop => break,
        }
    }

    indicator.stop_and_join()
}

#[cfg(test)]
mod test {
    use std::{
        io::{self, BufReader, BufWriter},
        time::Duration,
    };

    use crossbeam_channel::unbounded;

    use crate::{
        color::{ChannelOrder, Color},
        controller::EngineState,
        engine::EngineSettings,
        error::Error,
        indicator::Indicator,
        sink::mock,
        testutil::eventually,
    };

    use super::{monitor_io, run, Event};

    fn get_event(input: &str) -> Result<Option<Event>, io::Error> {
        let (sender, receiver) = unbounded::<Event>();

        let reader = BufReader::new(input.as_bytes());
        let writer = BufWriter::new(Vec::new());
        monitor_io(&sender, reader, writer)?;

        // Force the sender to close.
        drop(sender);
        Ok(receiver.recv().ok())
    }

    fn transition(state: &str, min_dwell: Duration, force: bool) -> Event {
        Event::Transition {
            state: state.to_string(),
            min_dwell,
            force,
        }
    }

    #[test]
    fn test_keyboard_events() -> Result<(), io::Error> {
        assert_eq!(
            transition("thinking", Duration::ZERO, false),
            get_event("thinking\n")?.unwrap()
        );
        assert_eq!(
            transition("error", Duration::from_secs(2), true),
            get_event("Error 2s force\n")?.unwrap()
        );
        assert_eq!(
            transition("idle", Duration::ZERO, true),
            get_event("idle force\n")?.unwrap()
        );
        assert_eq!(
            transition("face_left", Duration::from_millis(300), false),
            get_event("  face_left 300ms  \n")?.unwrap()
        );
        assert_eq!(Event::Stop, get_event("stop\n")?.unwrap());
        assert_eq!(Event::States, get_event("STATES\n")?.unwrap());
        assert_eq!(None, get_event("\n")?);
        assert_eq!(None, get_event("idle later\n")?);
        Ok(())
    }

    #[test]
    fn test_end_of_input_stops() -> Result<(), io::Error> {
        let (sender, receiver) = unbounded::<Event>();
        let more = monitor_io(&sender, BufReader::new("".as_bytes()), io::sink())?;

        assert!(!more);
        assert_eq!(Ok(Event::Stop), receiver.try_recv());
        Ok(())
    }

    #[test]
    fn test_run_applies_events() {
        let sink = mock::Sink::new(4, ChannelOrder::Rgb);
        let indicator = Indicator::start(
            EngineSettings {
                quantum: Duration::from_millis(10),
                hold: Duration::from_millis(50),
            },
            Box::new(sink.clone()),
        )
        .unwrap();

        let (sender, receiver) = unbounded::<Event>();
        for event in [
            transition("access_granted", Duration::from_secs(60), false),
            transition("idle", Duration::ZERO, false),
            transition("disco", Duration::ZERO, false),
            Event::States,
            Event::Stop,
            transition("idle", Duration::ZERO, true),
        ] {
            sender.send(event).unwrap();
        }

        let mut output = Vec::new();
        assert!(run(indicator, &receiver, &mut output).is_ok());

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!("access_granted: accepted", lines[0]);
        assert_eq!("idle: rejected", lines[1]);
        assert_eq!("Unknown state: disco", lines[2]);
        assert!(lines[3].starts_with("idle"));
        assert!(lines[3].contains("breathe"));
        assert_eq!(3 + 15, lines.len());

        // The event after stop is never applied.
        assert_eq!(1, receiver.len());
        assert_eq!(Some(vec![Color::BLACK; 4]), sink.last_frame());
    }

    #[test]
    fn test_run_ends_on_engine_failure() {
        let sink = mock::Sink::new(4, ChannelOrder::Rgb);
        sink.fail_flush_after(0);
        let indicator = Indicator::start(
            EngineSettings {
                quantum: Duration::from_millis(10),
                hold: Duration::from_millis(50),
            },
            Box::new(sink.clone()),
        )
        .unwrap();
        let controller = indicator.controller().clone();

        let (sender, receiver) = unbounded::<Event>();
        sender
            .send(transition("thinking", Duration::ZERO, false))
            .unwrap();
        let join = std::thread::spawn(move || {
            let mut output = Vec::new();
            let result = run(indicator, &receiver, &mut output);
            (result, String::from_utf8(output).unwrap())
        });

        eventually(
            || controller.engine_state() == EngineState::Stopped,
            "Engine never stopped after sink failure",
        );
        sender
            .send(transition("error", Duration::ZERO, true))
            .unwrap();

        let (result, output) = join.join().unwrap();
        assert!(matches!(result, Err(Error::HardwareIo(_))));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            vec![
                "thinking: accepted",
                "The animation engine stopped after a pixel sink failure"
            ],
            lines
        );
        assert_eq!(0, sink.flush_count());
    }
}
