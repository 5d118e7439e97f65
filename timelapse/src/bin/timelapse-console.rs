use std::{io, path::PathBuf, sync::mpsc, sync::Arc};

use clap::Parser;
use color_eyre::eyre::{self, Context};
use timelapse::{
    camera,
    encoder::{Encoder, FfmpegEncoder},
    frontend::{app, console, App},
};
use timelapse_common::bin_common::init::{init_eyre, init_logger_with, Sink};

#[derive(Parser, Debug)]
#[command()]
/// Interactive timelapse capture and video creation.
struct Cli {
    /// Which camera to use
    #[arg(long, default_value_t = 0)]
    camera: u32,

    /// A file to additionally write the logs to
    #[arg(long)]
    logfile: Option<PathBuf>,
}

fn main() -> eyre::Result<()> {
    init_eyre()?;
    let cli = Cli::parse();

    let (tx, rx) = mpsc::channel();
    init_logger_with(
        Sink::Callback(Box::new(app::log_sink(tx.clone()))),
        cli.logfile.as_deref(),
    )?;

    let encoder: Option<Arc<dyn Encoder + Send + Sync>> = match FfmpegEncoder::locate() {
        Some(ffmpeg) => {
            log::info!("Using ffmpeg at: {}", ffmpeg.binary().display());
            Some(Arc::new(ffmpeg))
        }
        None => {
            log::warn!("No ffmpeg was found, videos can't be created");
            None
        }
    };

    console::spawn_reader(io::BufReader::new(io::stdin()), tx.clone())
        .wrap_err("failed to start reading the input")?;

    let app = App::new(camera::default_backend(cli.camera), encoder, tx);
    console::run(app, rx, io::stdout())
}
