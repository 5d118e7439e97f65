mod common;

use std::{
    path::Path,
    sync::{mpsc, Arc},
    time::Duration,
};

use common::*;
use timelapse::{
    camera::Resolution,
    capture::Retry,
    encoder::Encoder,
    frontend::{
        app::{Event, Refusal},
        command::ResolutionChoice,
        App, Command, Flow, Phase,
    },
};

const VGA: Resolution = Resolution::new(640, 480);
const HD: Resolution = Resolution::new(1280, 720);

struct Harness {
    app: App<FakeBackend>,
    events: mpsc::Receiver<Event>,
}

impl Harness {
    fn new(backend: FakeBackend, encoder: Option<Arc<dyn Encoder + Send + Sync>>) -> Self {
        let (tx, rx) = mpsc::channel();
        let app = App::new(backend, encoder, tx).with_retry(Retry {
            attempts: 1,
            delay: Duration::ZERO,
        });
        Self { app, events: rx }
    }

    fn detected(backend: FakeBackend) -> Self {
        let mut harness = Self::new(backend, None);
        harness.app.start_detection().unwrap();
        harness.until(|event| matches!(event, Event::Resolutions(_)));
        harness
    }

    fn run(&mut self, line: &str) -> Result<Flow, Refusal> {
        self.app.execute(line.parse()?)
    }

    /// Feeds events to the app until one matching `done` has been handled.
    fn until(&mut self, done: impl Fn(&Event) -> bool) {
        loop {
            let event = self
                .events
                .recv_timeout(Duration::from_secs(30))
                .expect("timed out waiting for an event");
            let finished = done(&event);
            self.app.handle(event);
            if finished {
                return;
            }
        }
    }

    fn set_save_dir(&mut self, dir: &Path) {
        self.app
            .execute(Command::SaveDir(dir.to_path_buf()))
            .unwrap();
    }
}

#[test]
fn detection_picks_the_largest() {
    let harness = Harness::detected(FakeBackend::new(&[VGA, HD]));
    assert_eq!(Phase::Idle, harness.app.phase());
    assert_eq!(&[VGA, HD], harness.app.resolutions());
    assert_eq!(
        Some(ResolutionChoice::Fixed(HD)),
        harness.app.settings().resolution
    );
}

#[test]
fn capture_waits_for_detection() {
    let mut harness = Harness::new(FakeBackend::new(&[VGA]), None);
    assert_eq!(Phase::Detecting, harness.app.phase());
    assert!(matches!(harness.run("start"), Err(Refusal::Detecting)));
    assert!(matches!(
        harness.run("resolution 640x480"),
        Err(Refusal::Detecting)
    ));
}

#[test]
fn failed_detection() {
    let harness = Harness::detected(FakeBackend::new(&[VGA]).failing_opens(1));
    assert_eq!(Phase::Idle, harness.app.phase());
    assert!(harness.app.resolutions().is_empty());
    assert_eq!(None, harness.app.settings().resolution);
}

#[test]
fn no_capture_without_a_camera() {
    let mut harness = Harness::detected(FakeBackend::new(&[VGA]).failing_opens(1));
    assert!(matches!(harness.run("start"), Err(Refusal::NoCamera)));
    assert_eq!(Phase::Idle, harness.app.phase());
    assert!(matches!(harness.run("encode"), Err(Refusal::NoEncoder)));
}

#[test]
fn resolution_must_be_detected() {
    let mut harness = Harness::detected(FakeBackend::new(&[VGA, HD]));

    assert!(matches!(
        harness.run("resolution 1920x1080"),
        Err(Refusal::UnsupportedResolution(..))
    ));
    harness.run("resolution 640x480").unwrap();
    assert_eq!(
        Some(ResolutionChoice::Fixed(VGA)),
        harness.app.settings().resolution
    );
    harness.run("resolution auto").unwrap();
    assert_eq!(
        Some(ResolutionChoice::Auto),
        harness.app.settings().resolution
    );
}

#[test]
fn too_short_to_capture() {
    let mut harness = Harness::detected(FakeBackend::new(&[VGA]));
    harness.run("interval 2 min").unwrap();
    harness.run("duration 1 min").unwrap();
    assert!(matches!(harness.run("start"), Err(Refusal::NoShots)));
    assert_eq!(Phase::Idle, harness.app.phase());
}

#[test]
fn bad_input_is_not_fatal() {
    let mut harness = Harness::detected(FakeBackend::new(&[VGA]));
    let flow = harness.app.handle(Event::Input("interval -3 s".to_string()));
    assert_eq!(Flow::Continue, flow);
    let flow = harness.app.handle(Event::Input("   ".to_string()));
    assert_eq!(Flow::Continue, flow);
    assert!(matches!(harness.run("stop"), Err(Refusal::NotCapturing)));
    assert_eq!(Flow::Quit, harness.app.handle(Event::Input("quit".to_string())));
}

#[test]
fn capture_runs_in_the_background() -> color_eyre::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut harness = Harness::detected(FakeBackend::new(&[VGA]));
    harness.set_save_dir(dir.path());
    harness.run("interval 0.25 s")?;
    harness.run("duration 0.5 s")?;

    harness.run("start")?;
    assert_eq!(Phase::Capturing, harness.app.phase());
    assert!(matches!(harness.run("encode"), Err(Refusal::Busy(Phase::Capturing))));

    harness.until(|event| matches!(event, Event::CaptureFinished(_)));
    assert_eq!(Phase::Idle, harness.app.phase());
    assert_eq!(2, file_names(dir.path()).len());
    Ok(())
}

#[test]
fn stop_ends_the_capture() -> color_eyre::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut harness = Harness::detected(FakeBackend::new(&[VGA]));
    harness.set_save_dir(dir.path());
    harness.run("interval 10 min")?;
    harness.run("duration 10 hours")?;

    harness.run("start")?;
    harness.until(|event| matches!(event, Event::Progress(_)));
    harness.run("stop")?;
    assert_eq!(Phase::Stopping, harness.app.phase());

    harness.until(|event| matches!(event, Event::CaptureFinished(_)));
    assert_eq!(Phase::Idle, harness.app.phase());
    assert_eq!(1, file_names(dir.path()).len());
    Ok(())
}

#[test]
fn encode_needs_an_encoder() {
    let mut harness = Harness::detected(FakeBackend::new(&[VGA]));
    assert!(matches!(harness.run("encode"), Err(Refusal::NoEncoder)));
}

#[test]
fn encode_runs_in_the_background() -> color_eyre::Result<()> {
    let photos = tempfile::tempdir()?;
    let videos = tempfile::tempdir()?;
    write_image(photos.path(), "photo_2025-01-01_10-00-00_2.jpg", 8, 8);
    write_image(photos.path(), "photo_2025-01-01_10-00-00_1.jpg", 8, 8);

    let encoder = Arc::new(RecordingEncoder::default());
    let recording: Arc<dyn Encoder + Send + Sync> = encoder.clone();
    let mut harness = Harness::new(FakeBackend::new(&[VGA]), Some(recording));
    harness.app.start_detection().unwrap();
    harness.until(|event| matches!(event, Event::Resolutions(_)));

    harness.app.execute(Command::SourceDir(photos.path().into()))?;
    harness.app.execute(Command::OutputDir(videos.path().into()))?;
    harness.run("output-name garden")?;
    harness.run("fps 30")?;
    harness.run("encode")?;
    assert_eq!(Phase::Encoding, harness.app.phase());

    harness.until(|event| matches!(event, Event::EncodeFinished(_)));
    assert_eq!(Phase::Idle, harness.app.phase());
    let calls = encoder.calls();
    assert_eq!(1, calls.len());
    assert_eq!(videos.path().join("garden.mp4"), calls[0].output);
    assert_eq!(30, calls[0].fps);
    assert_eq!(
        vec![
            "photo_2025-01-01_10-00-00_1.jpg",
            "photo_2025-01-01_10-00-00_2.jpg"
        ],
        names_of(&calls[0].inputs)
    );
    Ok(())
}

#[test]
fn shutdown_stops_a_capture() -> color_eyre::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut harness = Harness::detected(FakeBackend::new(&[VGA]));
    harness.set_save_dir(dir.path());
    harness.run("interval 1 h")?;
    harness.run("duration 10 h")?;
    harness.run("start")?;
    harness.until(|event| matches!(event, Event::Progress(_)));

    harness.app.shutdown();
    assert_eq!(1, file_names(dir.path()).len());
    Ok(())
}
