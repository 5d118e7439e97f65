use std::{
    fmt,
    sync::{mpsc, Arc},
    thread::{self, JoinHandle},
};

use color_eyre::eyre;
use timelapse_common::utils::cancel::CancelToken;

use super::{
    command::{Command, CommandError, ResolutionChoice, HELP},
    settings::Settings,
};
use crate::{
    camera::{self, CameraBackend, Resolution},
    capture::{self, Ctx, Outcome, Progress, Retry},
    encoder::{self, Encoder},
};

/// Things the UI thread reacts to. Background threads only ever send these.
#[derive(Debug)]
pub enum Event {
    /// A formatted log line
    Log(String),
    /// A line typed by the user
    Input(String),
    InputClosed,
    /// The detection finished, empty if the camera couldn't be used
    Resolutions(Vec<Resolution>),
    Progress(Progress),
    CaptureFinished(eyre::Result<Outcome>),
    EncodeFinished(Result<encoder::Report, encoder::EncodeError>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Detecting,
    Idle,
    Capturing,
    /// A stop was requested, waiting for the capture thread to notice
    Stopping,
    Encoding,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Detecting => "detecting the camera",
            Phase::Idle => "idle",
            Phase::Capturing => "capturing",
            Phase::Stopping => "stopping",
            Phase::Encoding => "encoding",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Why a command was not carried out.
#[derive(thiserror::Error, Debug)]
pub enum Refusal {
    #[error(transparent)]
    Parse(#[from] CommandError),
    #[error("busy {0}, try again later")]
    Busy(Phase),
    #[error("the camera is still being detected")]
    Detecting,
    #[error("the camera does not support {0}, it supports: {1}")]
    UnsupportedResolution(Resolution, String),
    #[error("the camera could not be initialized, there is nothing to capture with")]
    NoCamera,
    #[error("the duration is shorter than the interval, there is nothing to capture")]
    NoShots,
    #[error("not capturing")]
    NotCapturing,
    #[error("no ffmpeg was found, place it next to the program or in PATH")]
    NoEncoder,
    #[error("failed to start a thread")]
    Spawn(#[source] std::io::Error),
}

/// The console's state machine. Long running work happens on named threads that report
/// back through [`Event`]s.
pub struct App<B> {
    backend: Arc<B>,
    encoder: Option<Arc<dyn Encoder + Send + Sync>>,
    events: mpsc::Sender<Event>,
    retry: Retry,

    settings: Settings,
    phase: Phase,
    resolutions: Vec<Resolution>,
    cancel: CancelToken,
    last_progress: Option<Progress>,
    workers: Vec<JoinHandle<()>>,
}

impl<B> App<B>
where
    B: CameraBackend + Send + Sync + 'static,
{
    pub fn new(
        backend: B,
        encoder: Option<Arc<dyn Encoder + Send + Sync>>,
        events: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            backend: Arc::new(backend),
            encoder,
            events,
            retry: Retry::default(),
            settings: Settings::default(),
            phase: Phase::Detecting,
            resolutions: Vec::new(),
            cancel: CancelToken::new(),
            last_progress: None,
            workers: Vec::new(),
        }
    }

    pub fn with_retry(self, retry: Retry) -> Self {
        Self { retry, ..self }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn resolutions(&self) -> &[Resolution] {
        &self.resolutions
    }

    /// Starts probing the camera in the background.
    pub fn start_detection(&mut self) -> Result<(), Refusal> {
        log::info!("Detecting which resolutions the camera supports...");
        self.phase = Phase::Detecting;
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        self.spawn("detect", move || {
            let accepted = match camera::detect_resolutions(&*backend) {
                Ok(accepted) => accepted,
                Err(e) => {
                    log::error!("{e}");
                    Vec::new()
                }
            };
            let _ = events.send(Event::Resolutions(accepted));
        })
    }

    /// Reacts to one event. Refused input is logged, not returned.
    pub fn handle(&mut self, event: Event) -> Flow {
        match event {
            Event::Log(_) => (),
            Event::Input(line) => {
                if line.trim().is_empty() {
                    return Flow::Continue;
                }
                let executed = line
                    .parse::<Command>()
                    .map_err(Refusal::from)
                    .and_then(|cmd| self.execute(cmd));
                match executed {
                    Ok(flow) => return flow,
                    Err(e) => log::warn!("Input error: {e}"),
                }
            }
            Event::InputClosed => return Flow::Quit,
            Event::Resolutions(accepted) => self.detection_finished(accepted),
            Event::Progress(progress) => self.last_progress = Some(progress),
            Event::CaptureFinished(result) => self.capture_finished(result),
            Event::EncodeFinished(result) => self.encode_finished(result),
        }
        Flow::Continue
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow, Refusal> {
        match command {
            Command::Interval(amount) => {
                self.settings.interval = amount;
                log::info!("Interval set to {amount}");
            }
            Command::Duration(amount) => {
                self.settings.duration = amount;
                log::info!("Duration set to {amount}");
            }
            Command::Resolution(choice) => self.choose_resolution(choice)?,
            Command::Timestamp(on) => {
                self.settings.timestamp = on;
                log::info!("Timestamp {}", if on { "on" } else { "off" });
            }
            Command::SaveDir(dir) => {
                log::info!("Photos will be saved to {}", dir.display());
                self.settings.save_dir = dir;
            }
            Command::Start => self.start_capture()?,
            Command::Stop => self.stop_capture()?,
            Command::SourceDir(dir) => {
                log::info!("Photos will be read from {}", dir.display());
                self.settings.source_dir = dir;
            }
            Command::OutputName(name) => {
                self.settings.output_name = name;
                log::info!("The video will be {}", self.settings.video_path().display());
            }
            Command::OutputDir(dir) => {
                self.settings.output_dir = dir;
                log::info!("The video will be {}", self.settings.video_path().display());
            }
            Command::Fps(fps) => {
                self.settings.fps = fps;
                log::info!("Frame rate set to {fps}");
            }
            Command::Encode => self.start_encode()?,
            Command::Status => self.log_status(),
            Command::Help => log::info!("Commands:\n{HELP}"),
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Cancels a running capture and waits for all background threads.
    pub fn shutdown(mut self) {
        self.cancel.cancel();
        if self.phase == Phase::Encoding {
            log::info!("Waiting for the video to finish");
        }
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::error!("A background thread panicked");
            }
        }
    }

    fn spawn<F>(&mut self, name: &str, work: F) -> Result<(), Refusal>
    where
        F: FnOnce() + Send + 'static,
    {
        self.workers.retain(|worker| !worker.is_finished());
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(work)
            .map_err(Refusal::Spawn)?;
        self.workers.push(handle);
        Ok(())
    }

    fn require_idle(&self) -> Result<(), Refusal> {
        match self.phase {
            Phase::Idle => Ok(()),
            Phase::Detecting => Err(Refusal::Detecting),
            phase => Err(Refusal::Busy(phase)),
        }
    }

    fn detection_finished(&mut self, accepted: Vec<Resolution>) {
        self.phase = Phase::Idle;
        match accepted.last() {
            Some(&largest) => {
                let list = join(&accepted);
                log::info!("The camera supports: {list}");
                if self.settings.resolution.is_none() {
                    self.settings.resolution = Some(ResolutionChoice::Fixed(largest));
                    log::info!("Resolution set to {largest}");
                }
            }
            None => {
                log::error!("Camera initialization failed, capturing is not possible")
            }
        }
        self.resolutions = accepted;
    }

    fn choose_resolution(&mut self, choice: ResolutionChoice) -> Result<(), Refusal> {
        if let ResolutionChoice::Fixed(res) = choice {
            if self.phase == Phase::Detecting {
                return Err(Refusal::Detecting);
            }
            if !self.resolutions.contains(&res) {
                return Err(Refusal::UnsupportedResolution(res, join(&self.resolutions)));
            }
        }
        self.settings.resolution = Some(choice);
        match choice {
            ResolutionChoice::Auto => log::info!("Resolution will be selected automatically"),
            ResolutionChoice::Fixed(res) => log::info!("Resolution set to {res}"),
        }
        Ok(())
    }

    fn start_capture(&mut self) -> Result<(), Refusal> {
        self.require_idle()?;
        if self.resolutions.is_empty() {
            return Err(Refusal::NoCamera);
        }
        let session = self.settings.session().ok_or(Refusal::NoShots)?;
        log::info!(
            "Starting: one photo every {}, for {}, {} photos in total",
            self.settings.interval,
            self.settings.duration,
            session.count
        );

        self.cancel = CancelToken::new();
        self.last_progress = None;
        let cancel = self.cancel.clone();
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        let retry = self.retry;

        self.spawn("capture", move || {
            let progress = |progress: Progress| {
                let _ = events.send(Event::Progress(progress));
            };
            let ctx = Ctx::new(&cancel).with_progress(&progress).with_retry(retry);
            let result = capture::run(&*backend, &session, ctx);
            let _ = events.send(Event::CaptureFinished(result));
        })?;
        self.phase = Phase::Capturing;
        Ok(())
    }

    fn stop_capture(&mut self) -> Result<(), Refusal> {
        match self.phase {
            Phase::Capturing => {
                log::info!("Stopping after the current photo...");
                self.cancel.cancel();
                self.phase = Phase::Stopping;
                Ok(())
            }
            Phase::Stopping => Ok(()),
            _ => Err(Refusal::NotCapturing),
        }
    }

    fn capture_finished(&mut self, result: eyre::Result<Outcome>) {
        self.phase = Phase::Idle;
        match result {
            Ok(Outcome::Completed(report)) => log::info!(
                "Capture complete, {} photos saved in {}",
                report.saved.len(),
                self.settings.save_dir.display()
            ),
            Ok(Outcome::Stopped(report)) => log::info!(
                "Capture stopped by the user after {} photos",
                report.saved.len()
            ),
            Ok(Outcome::CameraUnavailable) => {
                log::error!("Could not open the camera, nothing was captured")
            }
            Err(e) => log::error!("Capture failed: {e:?}"),
        }
    }

    fn start_encode(&mut self) -> Result<(), Refusal> {
        self.require_idle()?;
        let encoder = self.encoder.clone().ok_or(Refusal::NoEncoder)?;
        let source_dir = self.settings.source_dir.clone();
        let output = self.settings.video_path();
        let fps = self.settings.fps;
        let events = self.events.clone();

        self.spawn("encode", move || {
            let result = encoder::create_timelapse(&*encoder, &source_dir, &output, fps);
            let _ = events.send(Event::EncodeFinished(result));
        })?;
        self.phase = Phase::Encoding;
        Ok(())
    }

    fn encode_finished(&mut self, result: Result<encoder::Report, encoder::EncodeError>) {
        self.phase = Phase::Idle;
        match result {
            Ok(report) => log::info!(
                "Video created from {} photos: {}",
                report.frames,
                report.output.display()
            ),
            Err(e) => {
                let e = eyre::Report::new(e).wrap_err("Creating the video failed");
                log::error!("{e:?}");
            }
        }
    }

    fn log_status(&self) {
        let progress = match &self.last_progress {
            Some(p) if matches!(self.phase, Phase::Capturing | Phase::Stopping) => {
                format!(" ({}/{})", p.shot, p.total)
            }
            _ => String::new(),
        };
        let resolutions = if self.resolutions.is_empty() {
            "none".to_string()
        } else {
            join(&self.resolutions)
        };
        log::info!(
            "Status: {}{progress}\nsupported:   {resolutions}\n{}",
            self.phase,
            self.settings
        );
    }
}

fn join(resolutions: &[Resolution]) -> String {
    resolutions
        .iter()
        .map(|res| res.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Turns log lines into [`Event::Log`], for [`Sink::Callback`](timelapse_common::bin_common::init::Sink).
pub fn log_sink(events: mpsc::Sender<Event>) -> impl Fn(String) + Send + Sync {
    let events = std::sync::Mutex::new(events);
    move |line| {
        if let Ok(events) = events.lock() {
            let _ = events.send(Event::Log(line));
        }
    }
}
