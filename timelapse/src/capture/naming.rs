use chrono::NaiveDateTime;

pub const PHOTO_PREFIX: &str = "photo_";
pub const PHOTO_EXTENSION: &str = "jpg";

/// How the capture time is written in file names. No colons, Windows can't have them.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// How the capture time is written on the photo itself.
pub const OVERLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// `photo_<timestamp>_<shot>.jpg`
pub fn photo_filename(taken: NaiveDateTime, shot: u32) -> String {
    format!(
        "{PHOTO_PREFIX}{}_{shot}.{PHOTO_EXTENSION}",
        taken.format(FILE_TIMESTAMP_FORMAT)
    )
}

pub fn overlay_text(taken: NaiveDateTime) -> String {
    taken.format(OVERLAY_TIMESTAMP_FORMAT).to_string()
}
