use std::{
    io::{self, BufRead, Write},
    sync::mpsc,
    thread,
};

use color_eyre::eyre::{self, Context};

use super::{
    app::{App, Event, Flow},
    command::HELP,
};
use crate::camera::CameraBackend;

/// Forwards the lines of `input` as [`Event::Input`] on a thread of its own. The thread
/// is never joined since reading stdin can't be interrupted.
pub fn spawn_reader<R>(input: R, events: mpsc::Sender<Event>) -> io::Result<()>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("input".to_string())
        .spawn(move || {
            for line in input.lines() {
                match line {
                    Ok(line) => {
                        if events.send(Event::Input(line)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        log::error!("Could not read the input: {e}");
                        break;
                    }
                }
            }
            let _ = events.send(Event::InputClosed);
        })?;
    Ok(())
}

/// The UI loop. Prints log lines to `out` and hands every event to `app` until it wants
/// to quit, then waits for the background work to stop.
pub fn run<B, W>(mut app: App<B>, events: mpsc::Receiver<Event>, mut out: W) -> eyre::Result<()>
where
    B: CameraBackend + Send + Sync + 'static,
    W: Write,
{
    writeln!(out, "Type a command and press enter.\n{HELP}").wrap_err("failed to write")?;
    app.start_detection()
        .wrap_err("failed to start the camera detection")?;

    for event in events.iter() {
        if let Event::Log(line) = &event {
            writeln!(out, "{line}").wrap_err("failed to write")?;
        }
        if app.handle(event) == Flow::Quit {
            break;
        }
    }

    log::info!("Quitting");
    app.shutdown();
    for event in events.try_iter() {
        if let Event::Log(line) = event {
            writeln!(out, "{line}").wrap_err("failed to write")?;
        }
    }
    out.flush().wrap_err("failed to flush")?;

    Ok(())
}
