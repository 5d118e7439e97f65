//! Putting the photos of a directory in the order they were taken.

use std::{
    ffi::OsString,
    io,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use timelapse_common::utils::fsutils;

/// What a photo name says about when it was taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PhotoName {
    pub taken: NaiveDateTime,
    pub index: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// By the time and index in the name. Files without them were left out.
    Timestamp { skipped: usize },
    /// No file had a time in its name, so they are sorted by name instead
    Filename,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ordered {
    pub files: Vec<PathBuf>,
    pub strategy: Strategy,
}

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^photo_([0-9]{4})-([0-9]{2})-([0-9]{2})_([0-9]{2})-([0-9]{2})-([0-9]{2})_([0-9]+)",
        )
        .expect("the pattern is valid")
    })
}

/// Parses names like `photo_2025-07-04_23-38-59_168.jpg`. Only the start of the name has
/// to match, and the time has to be a real one.
pub fn parse_photo_name(name: &str) -> Option<PhotoName> {
    let caps = pattern().captures(name)?;
    let num = |i: usize| -> Option<u32> { caps.get(i)?.as_str().parse().ok() };

    let date = NaiveDate::from_ymd_opt(num(1)? as i32, num(2)?, num(3)?)?;
    let taken = date.and_hms_opt(num(4)?, num(5)?, num(6)?)?;
    let index = caps.get(7)?.as_str().parse().ok()?;
    Some(PhotoName { taken, index })
}

fn file_name(path: &Path) -> OsString {
    path.file_name().map(|n| n.to_owned()).unwrap_or_default()
}

/// Orders by (time, index) if at least one of the files has them in its name, otherwise
/// by file name.
pub fn order(files: Vec<PathBuf>) -> Ordered {
    let total = files.len();
    let mut named: Vec<(PhotoName, OsString, PathBuf)> = files
        .iter()
        .filter_map(|path| {
            let name = file_name(path);
            let parsed = parse_photo_name(name.to_str()?)?;
            Some((parsed, name, path.clone()))
        })
        .collect();

    if named.is_empty() {
        let mut files = files;
        files.sort_by_key(|path| file_name(path));
        return Ordered {
            files,
            strategy: Strategy::Filename,
        };
    }

    named.sort_by(|(a, a_name, _), (b, b_name, _)| {
        a.cmp(b).then_with(|| a_name.cmp(b_name))
    });
    Ordered {
        strategy: Strategy::Timestamp {
            skipped: total - named.len(),
        },
        files: named.into_iter().map(|(_, _, path)| path).collect(),
    }
}

/// The images in `dir`, in order.
pub fn ordered_images(dir: impl AsRef<Path>) -> io::Result<Ordered> {
    let files = fsutils::image_files(dir)?;
    Ok(order(files))
}
