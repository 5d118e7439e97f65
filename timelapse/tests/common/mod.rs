// NOTE: every test will complain about the functions it doesn't use
#![allow(unused)]

use std::{
    collections::HashSet,
    num::NonZeroU32,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc, Mutex,
    },
};

use chrono::{NaiveDate, NaiveDateTime};
use image::RgbImage;
use timelapse::{
    camera::{Camera, CameraBackend, CameraError, Resolution},
    capture::Clock,
    encoder::{EncodeError, Encoder},
};

/// What a camera reports before anything is set, never one of the candidates.
pub const INITIAL_RESOLUTION: Resolution = Resolution::new(320, 240);

/// A camera that does what it's told to.
#[derive(Debug, Default)]
pub struct FakeBackend {
    /// The resolutions it can be set to
    pub supported: Vec<Resolution>,
    /// This many opens fail before they start working
    pub failed_opens: u32,
    /// Which reads fail, counted from 1 over all reads of every camera opened
    pub failed_reads: HashSet<u32>,
    pub opens: Arc<AtomicU32>,
    pub releases: Arc<AtomicU32>,
    reads: Arc<AtomicU32>,
}

impl FakeBackend {
    pub fn new(supported: &[Resolution]) -> Self {
        Self {
            supported: supported.to_vec(),
            ..Self::default()
        }
    }

    pub fn failing_opens(self, failed_opens: u32) -> Self {
        Self {
            failed_opens,
            ..self
        }
    }

    pub fn failing_reads(self, reads: &[u32]) -> Self {
        Self {
            failed_reads: reads.iter().copied().collect(),
            ..self
        }
    }

    pub fn opens(&self) -> u32 {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> u32 {
        self.releases.load(Ordering::SeqCst)
    }
}

pub struct FakeCamera {
    resolution: Resolution,
    supported: Vec<Resolution>,
    failed_reads: HashSet<u32>,
    reads: Arc<AtomicU32>,
    releases: Arc<AtomicU32>,
    released: bool,
}

impl CameraBackend for FakeBackend {
    type Camera = FakeCamera;

    fn open(&self) -> Result<Self::Camera, CameraError> {
        let open = self.opens.fetch_add(1, Ordering::SeqCst) + 1;
        if open <= self.failed_opens {
            return Err(CameraError::Open(format!("fake open {open} fails")));
        }
        Ok(FakeCamera {
            resolution: INITIAL_RESOLUTION,
            supported: self.supported.clone(),
            failed_reads: self.failed_reads.clone(),
            reads: Arc::clone(&self.reads),
            releases: Arc::clone(&self.releases),
            released: false,
        })
    }
}

impl Camera for FakeCamera {
    fn set_resolution(&mut self, resolution: Resolution) -> Result<(), CameraError> {
        // Like real cameras, silently keep the old one
        if self.supported.contains(&resolution) {
            self.resolution = resolution;
        }
        Ok(())
    }

    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn read_frame(&mut self) -> Result<RgbImage, CameraError> {
        let read = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failed_reads.contains(&read) {
            return Err(CameraError::Read(format!("fake read {read} fails")));
        }
        Ok(RgbImage::from_pixel(
            self.resolution.width,
            self.resolution.height,
            image::Rgb([40, 120, 200]),
        ))
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Always 2025-07-04 23:38:59
pub struct FixedClock;

pub fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 7, 4)
        .unwrap()
        .and_hms_opt(23, 38, 59)
        .unwrap()
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        fixed_time()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeCall {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub fps: u32,
}

/// Remembers what it was asked to encode and writes a placeholder video.
#[derive(Debug, Default)]
pub struct RecordingEncoder {
    pub calls: Mutex<Vec<EncodeCall>>,
}

impl RecordingEncoder {
    pub fn calls(&self) -> Vec<EncodeCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Encoder for RecordingEncoder {
    fn encode(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        fps: NonZeroU32,
    ) -> Result<(), EncodeError> {
        self.calls.lock().unwrap().push(EncodeCall {
            inputs: inputs.to_vec(),
            output: output.to_path_buf(),
            fps: fps.get(),
        });
        std::fs::write(output, b"not really a video").map_err(EncodeError::Spawn)
    }
}

/// Writes a small image to `dir/name`, the format is taken from the extension.
pub fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, height, image::Rgb([10, 200, 30]))
        .save(&path)
        .expect("could not write test image");
    path
}

/// The file names in `dir`, sorted
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("dir exists")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn names_of(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

pub fn fps(fps: u32) -> NonZeroU32 {
    NonZeroU32::new(fps).unwrap()
}
