use std::{fmt, num::NonZeroU32, path::PathBuf, time::Duration};

use timelapse_common::utils::time::{self, Amount, Unit};

use super::command::ResolutionChoice;
use crate::{
    capture::Session,
    encoder::{self, DEFAULT_FPS, DEFAULT_OUTPUT_NAME},
};

pub const DEFAULT_SAVE_DIR: &str = "./PhotoCaptured";

/// Everything the user can set in the console.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub interval: Amount,
    pub duration: Amount,
    /// `None` until the user picks one or the detected default is filled in
    pub resolution: Option<ResolutionChoice>,
    pub timestamp: bool,
    pub save_dir: PathBuf,

    pub source_dir: PathBuf,
    pub output_name: String,
    pub output_dir: PathBuf,
    pub fps: NonZeroU32,
}

impl Default for Settings {
    fn default() -> Self {
        let one = |unit| Amount::new(1.0, unit).expect("one is positive");
        Self {
            interval: one(Unit::Seconds),
            duration: one(Unit::Hours),
            resolution: None,
            timestamp: true,
            save_dir: DEFAULT_SAVE_DIR.into(),
            source_dir: DEFAULT_SAVE_DIR.into(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            output_dir: ".".into(),
            fps: NonZeroU32::new(DEFAULT_FPS).expect("not zero"),
        }
    }
}

impl Settings {
    /// How many photos the interval and duration give, at least one.
    pub fn shot_count(&self) -> Option<u32> {
        let count = time::shot_count(self.duration.to_duration(), self.interval.to_duration());
        u32::try_from(count).ok().filter(|&count| count >= 1)
    }

    /// `None` if the duration is too short for a single photo.
    pub fn session(&self) -> Option<Session> {
        Some(Session {
            interval: self.interval_duration(),
            count: self.shot_count()?,
            resolution: match self.resolution {
                Some(ResolutionChoice::Fixed(res)) => Some(res),
                Some(ResolutionChoice::Auto) | None => None,
            },
            output_dir: self.save_dir.clone(),
            timestamp: self.timestamp,
        })
    }

    pub fn interval_duration(&self) -> Duration {
        self.interval.to_duration()
    }

    pub fn video_path(&self) -> PathBuf {
        encoder::video_path(&self.output_dir, &self.output_name)
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolution = match self.resolution {
            Some(ResolutionChoice::Fixed(res)) => res.to_string(),
            Some(ResolutionChoice::Auto) => "auto".to_string(),
            None => "not detected yet".to_string(),
        };
        let shots = match self.shot_count() {
            Some(count) => count.to_string(),
            None => "none".to_string(),
        };

        writeln!(f, "interval:    {}", self.interval)?;
        writeln!(f, "duration:    {} ({shots} photos)", self.duration)?;
        writeln!(f, "resolution:  {resolution}")?;
        writeln!(f, "timestamp:   {}", if self.timestamp { "on" } else { "off" })?;
        writeln!(f, "save-dir:    {}", self.save_dir.display())?;
        writeln!(f, "source-dir:  {}", self.source_dir.display())?;
        writeln!(f, "video:       {}", self.video_path().display())?;
        write!(f, "fps:         {}", self.fps)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::camera::Resolution;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(Some(3600), settings.shot_count());
        assert_eq!(
            PathBuf::from("./timelapse_output.mp4"),
            settings.video_path()
        );
        assert_eq!(24, settings.fps.get());
    }

    #[test]
    fn shots_round_down() {
        let settings = Settings {
            interval: Amount::new(7.0, Unit::Seconds).unwrap(),
            duration: Amount::new(1.0, Unit::Minutes).unwrap(),
            ..Settings::default()
        };
        assert_eq!(Some(8), settings.shot_count());
    }

    #[test]
    fn too_short_for_one_shot() {
        let settings = Settings {
            interval: Amount::new(2.0, Unit::Minutes).unwrap(),
            duration: Amount::new(1.0, Unit::Minutes).unwrap(),
            ..Settings::default()
        };
        assert_eq!(None, settings.shot_count());
        assert!(settings.session().is_none());
    }

    #[test]
    fn session_resolution() {
        let mut settings = Settings::default();
        assert_eq!(None, settings.session().unwrap().resolution);

        settings.resolution = Some(ResolutionChoice::Fixed(Resolution::new(640, 480)));
        assert_eq!(
            Some(Resolution::new(640, 480)),
            settings.session().unwrap().resolution
        );

        settings.resolution = Some(ResolutionChoice::Auto);
        assert_eq!(None, settings.session().unwrap().resolution);
    }
}
