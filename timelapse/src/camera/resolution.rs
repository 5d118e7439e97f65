use std::{fmt, str::FromStr};

use super::Camera;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Standard resolutions tried when probing a device, in the order they are tried.
pub const CANDIDATES: [Resolution; 9] = [
    Resolution::new(640, 480),
    Resolution::new(800, 600),
    Resolution::new(1024, 768),
    Resolution::new(1280, 720),
    Resolution::new(1280, 800),
    Resolution::new(1366, 768),
    Resolution::new(1920, 1080),
    Resolution::new(2560, 1440),
    Resolution::new(3840, 2160),
];

/// What automatic selection aims for.
pub const AUTO_TARGET: Resolution = Resolution::new(1280, 720);

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Manhattan distance between the two
    pub fn distance(self, other: Resolution) -> u32 {
        self.width.abs_diff(other.width) + self.height.abs_diff(other.height)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("'{0}' is not a resolution, expected something like 1280x720")]
pub struct ResolutionError(String);

impl FromStr for Resolution {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ResolutionError(s.to_string());
        let (width, height) = s
            .trim()
            .split_once(|c: char| c == 'x' || c == 'X')
            .ok_or_else(err)?;
        let width: u32 = width.parse().map_err(|_| err())?;
        let height: u32 = height.parse().map_err(|_| err())?;
        if width == 0 || height == 0 {
            return Err(err());
        }
        Ok(Self { width, height })
    }
}

/// Tries every candidate on the camera and keeps those the camera reports back exactly.
pub fn probe<C: Camera + ?Sized>(
    camera: &mut C,
    candidates: &[Resolution],
) -> Vec<Resolution> {
    log::info!("Probing which resolutions the camera supports");
    let mut accepted = Vec::new();
    for &candidate in candidates {
        if let Err(e) = camera.set_resolution(candidate) {
            log::debug!("Not supported: {candidate} ({e})");
            continue;
        }

        let actual = camera.resolution();
        if actual == candidate {
            log::info!("Supported resolution: {candidate}");
            accepted.push(candidate);
        } else {
            log::debug!("Asked for {candidate}, got {actual}");
        }
    }
    accepted
}

/// The accepted resolution closest to [`AUTO_TARGET`]. The first one wins on ties.
pub fn select_auto(accepted: &[Resolution]) -> Option<Resolution> {
    select_closest(accepted, AUTO_TARGET)
}

pub fn select_closest(accepted: &[Resolution], target: Resolution) -> Option<Resolution> {
    accepted
        .iter()
        .copied()
        .min_by_key(|res| res.distance(target))
}

/// Use `requested` if the camera accepted it, otherwise pick automatically.
pub fn choose(
    accepted: &[Resolution],
    requested: Option<Resolution>,
) -> Option<Resolution> {
    match requested {
        Some(requested) if accepted.contains(&requested) => Some(requested),
        Some(requested) => {
            log::warn!(
                "The camera does not support {requested}, selecting one automatically"
            );
            select_auto(accepted)
        }
        None => select_auto(accepted),
    }
}
