use std::{ffi::OsString, num::NonZeroU32, path::PathBuf, time::Duration};

use clap::Parser;
use color_eyre::eyre::{self, Context};
use timelapse::{
    camera::{self, Resolution},
    capture::{self, Ctx, Outcome, Session},
};
use timelapse_common::{
    bin_common::{
        init::{init_eyre, init_logger},
        termination::Cookie,
    },
    utils::{cancel::CancelToken, fsutils::read_optional_file, time::shot_count},
};

#[derive(Parser, Debug)]
#[command()]
/// Takes a photo with the webcam at a fixed interval.
///
/// When started without any arguments, they are read from `.timelapserc` in the current
/// directory instead.
struct Cli {
    /// Time between two photos
    #[arg(long, short = 'i')]
    interval: humantime::Duration,

    /// How many photos to take
    #[arg(long, short = 'n', required_unless_present = "duration")]
    count: Option<NonZeroU32>,

    /// Take photos for this long instead of a fixed number of them
    #[arg(long, short = 'd', conflicts_with = "count")]
    duration: Option<humantime::Duration>,

    /// Capture at this resolution, like 1920x1080, if the camera supports it. Picks
    /// automatically otherwise.
    #[arg(long, short = 'r')]
    resolution: Option<Resolution>,

    /// Don't stamp the time in the corner of the photos
    #[arg(long)]
    no_timestamp: bool,

    /// Where to save the photos
    #[arg(long, short = 'o', default_value = "./PhotoCaptured")]
    outdir: PathBuf,

    /// Which camera to use
    #[arg(long, default_value_t = 0)]
    camera: u32,

    /// A file to additionally write the logs to
    #[arg(long)]
    logfile: Option<PathBuf>,
}

fn cli_arguments() -> eyre::Result<Cli> {
    const ARGS_FILE: &str = ".timelapserc";
    let mut args: Vec<OsString> = std::env::args_os().collect();

    if args.len() == 1 {
        if let Some(flags) = read_optional_file(ARGS_FILE)
            .wrap_err_with(|| format!("Could not read config file at: {ARGS_FILE}"))?
        {
            args.extend(
                flags
                    .split_whitespace()
                    .map(|s| std::ffi::OsStr::new(s).to_owned()),
            );
        }
    }

    Ok(Cli::parse_from(args))
}

fn photo_count(cli: &Cli) -> eyre::Result<u32> {
    let interval: Duration = cli.interval.into();
    let count = match (cli.count, cli.duration) {
        (Some(count), _) => count.get(),
        (None, Some(duration)) => {
            let count = shot_count(duration.into(), interval);
            u32::try_from(count).wrap_err("that is way too many photos")?
        }
        (None, None) => unreachable!("clap requires one of them"),
    };
    if count == 0 {
        eyre::bail!("the duration is shorter than the interval, there is nothing to capture");
    }
    Ok(count)
}

fn main() -> eyre::Result<()> {
    init_eyre()?;
    let cli = cli_arguments()?;
    init_logger(cli.logfile.as_deref())?;
    log::debug!("CLI arguments: {cli:#?}");

    let session = Session {
        interval: cli.interval.into(),
        count: photo_count(&cli)?,
        resolution: cli.resolution,
        output_dir: cli.outdir.clone(),
        timestamp: !cli.no_timestamp,
    };

    let cookie = Cookie::new(CancelToken::new()).wrap_err("failed to set signal handlers")?;
    let backend = camera::default_backend(cli.camera);
    let outcome = capture::run(&backend, &session, Ctx::new(cookie.token()))?;

    match outcome {
        Outcome::Completed(_) => Ok(()),
        Outcome::Stopped(report) => {
            log::warn!("Stopped early, {} photos were saved", report.saved.len());
            Ok(())
        }
        Outcome::CameraUnavailable => Err(eyre::eyre!("the camera could not be used")),
    }
}
