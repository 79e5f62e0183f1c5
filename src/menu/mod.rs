//! The interactive numbered menu.
//!
//! The loop reads one choice per line from any [`BufRead`] and writes prompts and results to
//! any [`Write`], so it can be driven from a terminal or from a script.

mod command;
mod tracker;

use std::io::{self, BufRead, Write};

use log::{error, info, warn};

use crate::{
    frame_source::FrameSource,
    session::{ConfigError, SessionState, Thresholds},
};

pub use command::Command;
pub use tracker::{Tracker, TrackerPaths};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    AwaitingInput,
    Running(Command),
    Exiting,
}

/// Run the menu until the user exits, input ends, or the frame source runs dry.
///
/// The tracker is consumed so its frame source is released on return. The final session is
/// returned. Only failures to read the input or write the output are errors.
pub fn run_menu<S: FrameSource>(
    mut tracker: Tracker<S>,
    mut input: impl BufRead,
    mut output: impl Write,
) -> io::Result<SessionState> {
    let mut state = MenuState::AwaitingInput;

    loop {
        state = match state {
            MenuState::AwaitingInput => await_choice(&tracker, &mut input, &mut output)?,
            MenuState::Running(cmd) => run_command(&mut tracker, cmd, &mut input, &mut output)?,
            MenuState::Exiting => break,
        };
    }

    if tracker.saves_on_exit() && !tracker.session().counts().is_empty() {
        save_data(&tracker, &mut output)?;
    }
    writeln!(output, "Exiting.")?;
    output.flush()?;

    Ok(tracker.into_session())
}

fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn print_menu<S: FrameSource>(tracker: &Tracker<S>, output: &mut impl Write) -> io::Result<()> {
    let session = tracker.session();
    let thresholds = session.thresholds();

    writeln!(output)?;
    writeln!(output, "Debris Tracker Menu:")?;
    for cmd in Command::ALL {
        match cmd {
            Command::ToggleVisualization => {
                let state = if session.visualization() { "on" } else { "off" };
                writeln!(output, "{cmd} (currently {state})")?;
            }
            Command::SetMinArea => writeln!(output, "{cmd} (currently {})", thresholds.min_area())?,
            Command::SetMaxArea => writeln!(output, "{cmd} (currently {})", thresholds.max_area())?,
            _ => writeln!(output, "{cmd}")?,
        }
    }
    write!(output, "Enter your choice: ")?;
    output.flush()
}

fn await_choice<S: FrameSource>(
    tracker: &Tracker<S>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<MenuState> {
    print_menu(tracker, output)?;

    let Some(line) = read_line(input)? else {
        info!("End of input, exiting");
        return Ok(MenuState::Exiting);
    };

    let next = match Command::from_choice(&line) {
        Some(Command::Exit) => MenuState::Exiting,
        Some(cmd) => MenuState::Running(cmd),
        None => {
            warn!("Invalid menu choice {line:?}");
            writeln!(
                output,
                "Invalid choice \"{line}\". Please enter a number from 1 to {}.",
                Command::ALL.len()
            )?;
            MenuState::AwaitingInput
        }
    };

    Ok(next)
}

fn run_command<S: FrameSource>(
    tracker: &mut Tracker<S>,
    cmd: Command,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<MenuState> {
    match cmd {
        Command::ToggleVisualization => {
            let enabled = tracker.session_mut().toggle_visualization();
            let state = if enabled { "enabled" } else { "disabled" };
            writeln!(output, "Visualization {state}.")?;
            Ok(MenuState::AwaitingInput)
        }
        Command::SaveData => {
            save_data(tracker, output)?;
            Ok(MenuState::AwaitingInput)
        }
        Command::PlotCounts => {
            match tracker.plot() {
                Ok(()) => writeln!(output, "Plot saved to {}.", tracker.paths().plot.display())?,
                Err(e) => {
                    error!("{e}");
                    writeln!(output, "Could not plot: {e}")?;
                }
            }
            Ok(MenuState::AwaitingInput)
        }
        Command::SetMinArea => prompt_area(
            tracker.session_mut(),
            "Enter minimum area",
            SessionState::set_min_area,
            input,
            output,
        ),
        Command::SetMaxArea => prompt_area(
            tracker.session_mut(),
            "Enter maximum area",
            SessionState::set_max_area,
            input,
            output,
        ),
        Command::ProcessFrames => process_frames(tracker, input, output),
        Command::LoadData => {
            match tracker.load_data() {
                Ok((counts, sightings)) => {
                    let paths = tracker.paths();
                    writeln!(
                        output,
                        "Loaded {counts} frame counts from {} and {sightings} sightings from {}.",
                        paths.counts_csv.display(),
                        paths.sightings_csv.display()
                    )?
                }
                Err(e) => {
                    error!("{e}");
                    writeln!(output, "Could not load: {e}")?;
                }
            }
            Ok(MenuState::AwaitingInput)
        }
        Command::Exit => Ok(MenuState::Exiting),
    }
}

fn save_data<S: FrameSource>(tracker: &Tracker<S>, output: &mut impl Write) -> io::Result<()> {
    match tracker.save_data() {
        Ok(()) => {
            let paths = tracker.paths();
            writeln!(
                output,
                "Saved {} frame counts to {} and {} sightings to {}.",
                tracker.session().counts().len(),
                paths.counts_csv.display(),
                tracker.session().sightings().len(),
                paths.sightings_csv.display()
            )
        }
        Err(e) => {
            error!("{e}");
            writeln!(output, "Could not save: {e}")
        }
    }
}

//re-prompts until the value is accepted. A blank line goes back to the menu.
fn prompt_area(
    session: &mut SessionState,
    prompt: &str,
    apply: fn(&mut SessionState, i64) -> Result<Thresholds, ConfigError>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<MenuState> {
    loop {
        write!(output, "{prompt} (blank to cancel): ")?;
        output.flush()?;

        let Some(line) = read_line(input)? else {
            return Ok(MenuState::Exiting);
        };
        if line.is_empty() {
            writeln!(output, "Cancelled.")?;
            return Ok(MenuState::AwaitingInput);
        }

        let result = line
            .parse::<i64>()
            .map_err(|_| ConfigError::NotANumber)
            .and_then(|value| apply(session, value));

        match result {
            Ok(t) => {
                writeln!(
                    output,
                    "Area range is now {} to {}.",
                    t.min_area(),
                    t.max_area()
                )?;
                return Ok(MenuState::AwaitingInput);
            }
            Err(e) => {
                warn!("Rejected area {line:?}: {e}");
                writeln!(output, "Invalid area: {e}.")?;
            }
        }
    }
}

fn process_frames<S: FrameSource>(
    tracker: &mut Tracker<S>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<MenuState> {
    let limit = loop {
        write!(output, "Number of frames to process (blank for all): ")?;
        output.flush()?;

        let Some(line) = read_line(input)? else {
            return Ok(MenuState::Exiting);
        };
        if line.is_empty() {
            break None;
        }
        match line.parse::<u64>() {
            Ok(n) => break Some(n),
            Err(_) => writeln!(output, "Please enter a whole number of frames.")?,
        }
    };

    let mut processed = 0u64;
    let mut counted = 0u64;
    while limit.map_or(true, |n| processed < n) {
        match tracker.process_next_frame() {
            Ok(Some(rec)) => {
                processed += 1;
                counted += u64::from(rec.region_count);
            }
            Ok(None) => {
                info!("Frame source exhausted after {processed} frames");
                writeln!(
                    output,
                    "Processed {processed} frames, {counted} debris counted. No more frames."
                )?;
                return Ok(MenuState::Exiting);
            }
            Err(e) => {
                error!("{e}");
                writeln!(output, "Stopped processing: {e}")?;
                return Ok(MenuState::AwaitingInput);
            }
        }
    }

    writeln!(output, "Processed {processed} frames, {counted} debris counted.")?;
    Ok(MenuState::AwaitingInput)
}
