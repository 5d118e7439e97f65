use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::NaiveDateTime;
use color_eyre::eyre::{self, Context};
use image::{codecs::jpeg::JpegEncoder, ColorType, RgbImage};
use timelapse_common::{
    duration,
    utils::{cancel::CancelToken, fsutils},
};

use super::{
    naming::{overlay_text, photo_filename},
    overlay::TimestampLayout,
};
use crate::camera::{
    resolution::{self, CANDIDATES},
    Camera, CameraBackend, CameraGuard, Resolution,
};

const JPEG_QUALITY: u8 = 95;

/// What to capture.
#[derive(Clone, Debug)]
pub struct Session {
    pub interval: Duration,
    pub count: u32,
    /// `None` selects one automatically
    pub resolution: Option<Resolution>,
    pub output_dir: PathBuf,
    pub timestamp: bool,
}

/// How hard to try opening the camera.
#[derive(Clone, Copy, Debug)]
pub struct Retry {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for Retry {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: duration!(2 S),
        }
    }
}

pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// The wall clock, in local time
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Sent after every saved photo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    /// 1-based
    pub shot: u32,
    pub total: u32,
    pub path: PathBuf,
}

#[derive(Clone, Copy)]
pub struct Ctx<'env> {
    pub cancel: &'env CancelToken,
    pub progress: &'env dyn Fn(Progress),
    pub clock: &'env dyn Clock,
    pub retry: Retry,
}

fn no_progress(_: Progress) {}

impl<'env> Ctx<'env> {
    pub fn new(cancel: &'env CancelToken) -> Self {
        Self {
            cancel,
            progress: &no_progress,
            clock: &LocalClock,
            retry: Retry::default(),
        }
    }

    pub fn with_progress(self, progress: &'env dyn Fn(Progress)) -> Self {
        Self { progress, ..self }
    }

    pub fn with_clock(self, clock: &'env dyn Clock) -> Self {
        Self { clock, ..self }
    }

    pub fn with_retry(self, retry: Retry) -> Self {
        Self { retry, ..self }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// What the camera reported after the resolution was set, `None` if it was never
    /// opened
    pub resolution: Option<Resolution>,
    pub saved: Vec<PathBuf>,
    pub failed_reads: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Went through every shot, some of which may have failed
    Completed(Report),
    /// Cancelled before all shots were taken
    Stopped(Report),
    /// The camera could not be opened, nothing was captured
    CameraUnavailable,
}

impl Outcome {
    pub fn report(&self) -> Option<&Report> {
        match self {
            Outcome::Completed(report) | Outcome::Stopped(report) => Some(report),
            Outcome::CameraUnavailable => None,
        }
    }
}

enum Opened<C: Camera> {
    Ready {
        camera: CameraGuard<C>,
        resolution: Resolution,
        first_frame: RgbImage,
    },
    Cancelled,
    Unavailable,
}

/// Runs a whole capture session. Problems with the camera are logged and reflected in
/// the [`Outcome`], only failing to write the photos is an error.
pub fn run<B>(backend: &B, session: &Session, ctx: Ctx<'_>) -> eyre::Result<Outcome>
where
    B: CameraBackend + ?Sized,
{
    log::info!(
        "Capturing {} photos, one every {}, into {}",
        session.count,
        humantime::Duration::from(session.interval),
        session.output_dir.display()
    );
    fsutils::ensure_dir(&session.output_dir).wrap_err_with(|| {
        format!(
            "failed to create the output dir at: {}",
            session.output_dir.display()
        )
    })?;

    let (mut camera, resolution, first_frame) = match open_camera(backend, session, ctx) {
        Opened::Ready {
            camera,
            resolution,
            first_frame,
        } => (camera, resolution, first_frame),
        Opened::Cancelled => {
            log::info!("Capture stopped");
            return Ok(Outcome::Stopped(Report::default()));
        }
        Opened::Unavailable => return Ok(Outcome::CameraUnavailable),
    };

    let layout = session.timestamp.then(|| {
        let sample = overlay_text(ctx.clock.now());
        TimestampLayout::compute(first_frame.width(), first_frame.height(), &sample)
    });
    drop(first_frame);

    let mut report = Report {
        resolution: Some(resolution),
        ..Report::default()
    };
    let mut stopped = false;

    for shot in 1..=session.count {
        if ctx.cancel.is_cancelled() {
            stopped = true;
            break;
        }

        match camera.read_frame() {
            Ok(frame) => {
                let taken = ctx.clock.now();
                let frame = match &layout {
                    Some(layout) => layout.stamp(frame, &overlay_text(taken)),
                    None => frame,
                };

                let path = session.output_dir.join(photo_filename(taken, shot));
                save_jpeg(&frame, &path)
                    .wrap_err_with(|| format!("failed to save photo {shot}"))?;
                log::info!(
                    "Saved photo {shot}/{} to {}",
                    session.count,
                    path.display()
                );

                (ctx.progress)(Progress {
                    shot,
                    total: session.count,
                    path: path.clone(),
                });
                report.saved.push(path);
            }
            Err(e) => {
                log::warn!("Could not capture frame {shot}: {e}");
                report.failed_reads += 1;
                // the next shot is taken right away
                continue;
            }
        }

        if shot < session.count && ctx.cancel.wait_timeout(session.interval) {
            stopped = true;
            break;
        }
    }

    drop(camera);
    if stopped {
        log::info!("Capture stopped");
    }
    log::info!(
        "Capture finished, saved {} photos ({} failed)",
        report.saved.len(),
        report.failed_reads
    );

    Ok(if stopped {
        Outcome::Stopped(report)
    } else {
        Outcome::Completed(report)
    })
}

fn open_camera<B>(backend: &B, session: &Session, ctx: Ctx<'_>) -> Opened<B::Camera>
where
    B: CameraBackend + ?Sized,
{
    let attempts = ctx.retry.attempts;
    for attempt in 1..=attempts {
        if ctx.cancel.is_cancelled() {
            return Opened::Cancelled;
        }

        log::info!("Opening the camera (attempt {attempt}/{attempts})");
        match backend.open_guarded() {
            Err(e) if e.is_permanent() => {
                log::error!("{e}");
                return Opened::Unavailable;
            }
            Err(e) => log::warn!("{e}"),
            Ok(mut camera) => {
                let accepted = resolution::probe(&mut *camera, &CANDIDATES);
                let Some(chosen) = resolution::choose(&accepted, session.resolution)
                else {
                    log::error!("The camera accepted none of the usual resolutions");
                    return Opened::Unavailable;
                };

                log::info!("Selected resolution: {chosen}");
                if let Err(e) = camera.set_resolution(chosen) {
                    log::warn!("{e}");
                }
                let actual = camera.resolution();
                log::info!("The camera resolution is now: {actual}");

                match camera.read_frame() {
                    Ok(first_frame) => {
                        log::info!("The camera is ready");
                        return Opened::Ready {
                            camera,
                            resolution: actual,
                            first_frame,
                        };
                    }
                    Err(e) => log::warn!("The camera opened, but: {e}"),
                }
            }
        }

        if attempt < attempts {
            log::info!(
                "Trying again in {}",
                humantime::Duration::from(ctx.retry.delay)
            );
            if ctx.cancel.wait_timeout(ctx.retry.delay) {
                return Opened::Cancelled;
            }
        }
    }

    log::error!("Could not get the camera working after {attempts} attempts, giving up");
    Opened::Unavailable
}

fn save_jpeg(frame: &RgbImage, path: &Path) -> eyre::Result<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("could not create: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
        .encode(frame.as_raw(), frame.width(), frame.height(), ColorType::Rgb8)
        .wrap_err("failed to encode the jpeg")?;
    std::io::Write::flush(&mut writer).wrap_err("failed to flush")?;
    Ok(())
}
