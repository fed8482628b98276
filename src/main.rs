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
use std::{error::Error, io, path::PathBuf, thread, time::Duration};

use clap::{crate_version, Parser, Subcommand};
use duration_string::DurationString;
use statuslight::{
    animation::AnimationLibrary, config::Settings, console, indicator::Indicator, sink,
    state::State,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const SYSTEMD_SERVICE: &str = r#"
[Unit]
Description=status light

[Service]
Type=simple
Restart=on-failure
EnvironmentFile=-/etc/default/statuslight
ExecStart=/usr/local/bin/statuslight run "$STATUSLIGHT_CONFIG"

[Install]
WantedBy=multi-user.target
Alias=statuslight.service
"#;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "An animated LED strip status indicator."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists every state and the animation that renders it.
    States {},
    /// Renders a single state for a while, then clears the strip.
    Show {
        /// The state to render, e.g. access_granted.
        state: String,
        /// How long to render the state for.
        #[arg[short, long, default_value = "5s"]]
        duration: String,
        /// The path to the status light config. Defaults apply without one.
        #[arg[short, long]]
        config: Option<String>,
    },
    /// Starts the status light and reads state commands from stdin.
    Run {
        /// The path to the status light config.
        config_path: String,
    },
    /// Prints a systemd service definition to stdout.
    Systemd {},
}

fn load_settings(path: Option<&str>) -> Result<Settings, Box<dyn Error>> {
    match path {
        Some(path) => Ok(Settings::load(&PathBuf::from(path))?),
        None => Ok(Settings::default()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::States {} => {
            let library = AnimationLibrary::standard();
            println!("States (count: {}):", State::ALL.len());
            for state in State::ALL {
                println!("- {:<20}{}", state, library.get(state)?);
            }
        }
        Commands::Show {
            state,
            duration,
            config,
        } => {
            let duration: Duration = DurationString::from_string(duration)?.into();
            let settings = load_settings(config.as_deref())?;
            let indicator = Indicator::start(settings.engine, sink::get_sink(&settings.strip))?;

            if let Err(e) = indicator.request_transition(&state, Duration::ZERO, true) {
                indicator.stop_and_join()?;
                return Err(e.into());
            }
            thread::sleep(duration);
            indicator.stop_and_join()?;
            println!();
        }
        Commands::Run { config_path } => {
            let settings = load_settings(Some(&config_path))?;
            let indicator = Indicator::start(settings.engine, sink::get_sink(&settings.strip))?;
            if let Some(initial_state) = settings.initial_state {
                indicator.controller().request(initial_state, Duration::ZERO, true);
            }

            let (events_tx, events_rx) = crossbeam_channel::unbounded();
            // The keyboard thread stays blocked on stdin after a stop command,
            // so it is left behind rather than joined.
            let _keyboard = console::monitor_stdin(events_tx);
            console::run(indicator, &events_rx, io::stdout())?;
            info!("Status light stopped.");
        }
        Commands::Systemd {} => {
            println!("{}", SYSTEMD_SERVICE);
        }
    }

    Ok(())
}
