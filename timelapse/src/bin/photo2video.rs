use std::{num::NonZeroU32, path::PathBuf};

use clap::Parser;
use color_eyre::eyre::{self, Context};
use timelapse::encoder::{self, FfmpegEncoder, DEFAULT_OUTPUT_NAME};
use timelapse_common::bin_common::init::{init_eyre, init_logger};

#[derive(Parser, Debug)]
#[command()]
/// Turns a folder of photos into a video, ordered by the time in their names.
struct Cli {
    /// Folder with the photos
    #[arg(long, short = 'i')]
    input_dir: PathBuf,

    /// Name of the video, `.mp4` is added unless it has an extension already
    #[arg(long, short = 'o', default_value = DEFAULT_OUTPUT_NAME)]
    output: PathBuf,

    /// Frames per second
    #[arg(long, default_value = "24")]
    fps: NonZeroU32,

    /// The ffmpeg binary to use. Looks in the current directory and then in PATH by
    /// default.
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// A file to additionally write the logs to
    #[arg(long)]
    logfile: Option<PathBuf>,
}

fn main() -> eyre::Result<()> {
    init_eyre()?;
    let cli = Cli::parse();
    init_logger(cli.logfile.as_deref())?;

    if !cli.input_dir.is_dir() {
        eyre::bail!("the input dir does not exist: {}", cli.input_dir.display());
    }

    let encoder = match cli.ffmpeg {
        Some(binary) => FfmpegEncoder::new(binary),
        None => FfmpegEncoder::locate().ok_or_else(|| {
            eyre::eyre!("could not find ffmpeg, place it here or in PATH, or use --ffmpeg")
        })?,
    };
    log::info!("Using ffmpeg at: {}", encoder.binary().display());

    let output = match (cli.output.parent(), cli.output.file_name()) {
        (Some(dir), Some(name)) => encoder::video_path(dir, &name.to_string_lossy()),
        _ => eyre::bail!("not a file name: {}", cli.output.display()),
    };

    encoder::create_timelapse(&encoder, &cli.input_dir, &output, cli.fps)
        .wrap_err("failed to create the video")?;

    Ok(())
}
