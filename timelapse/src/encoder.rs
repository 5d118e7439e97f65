pub mod ffmpeg;

use std::{
    io,
    num::NonZeroU32,
    path::{Path, PathBuf},
    process::ExitStatus,
};

use timelapse_common::utils::fsutils;

use crate::sequence::{self, Strategy};

pub use ffmpeg::FfmpegEncoder;

pub const DEFAULT_FPS: u32 = 24;
pub const DEFAULT_OUTPUT_NAME: &str = "timelapse_output";
pub const VIDEO_EXTENSION: &str = "mp4";

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("there are no images to encode")]
    NoImages,
    #[error("failed to list the images in {dir}")]
    ListImages {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to create the dir for the video at {dir}")]
    OutputDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("the encoder does not exist at: {0}")]
    EncoderMissing(PathBuf),
    #[error("failed to read the first image at {path}")]
    FirstImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write the list of images for the encoder")]
    ConcatList(#[source] io::Error),
    #[error("failed to start the encoder")]
    Spawn(#[source] io::Error),
    #[error("the encoder failed ({status}): {stderr}")]
    Failed { status: ExitStatus, stderr: String },
}

/// Something that turns an ordered list of images into a video.
pub trait Encoder {
    fn encode(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        fps: NonZeroU32,
    ) -> Result<(), EncodeError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub output: PathBuf,
    pub frames: usize,
    pub strategy: Strategy,
}

/// `<dir>/<name>.mp4`, the extension is only added if `name` doesn't have one.
pub fn video_path(dir: impl AsRef<Path>, name: &str) -> PathBuf {
    let name = match name.trim() {
        "" => DEFAULT_OUTPUT_NAME,
        name => name,
    };
    let path = dir.as_ref().join(name);
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(VIDEO_EXTENSION)
    }
}

/// Turns all images in `input_dir` into a video at `output`.
pub fn create_timelapse<E>(
    encoder: &E,
    input_dir: &Path,
    output: &Path,
    fps: NonZeroU32,
) -> Result<Report, EncodeError>
where
    E: Encoder + ?Sized,
{
    log::info!("Looking for images in: {}", input_dir.display());
    let ordered =
        sequence::ordered_images(input_dir).map_err(|source| EncodeError::ListImages {
            dir: input_dir.to_path_buf(),
            source,
        })?;

    match ordered.strategy {
        Strategy::Timestamp { skipped: 0 } => {
            log::info!("Ordering {} images by their timestamps", ordered.files.len())
        }
        Strategy::Timestamp { skipped } => log::warn!(
            "Ordering {} images by their timestamps, ignoring {skipped} without one",
            ordered.files.len()
        ),
        Strategy::Filename => log::warn!(
            "No image has a timestamp in its name, ordering {} images by name",
            ordered.files.len()
        ),
    }

    if ordered.files.is_empty() {
        return Err(EncodeError::NoImages);
    }

    if let Some(dir) = output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fsutils::ensure_dir(dir).map_err(|source| EncodeError::OutputDir {
            dir: dir.to_path_buf(),
            source,
        })?;
    }

    encoder.encode(&ordered.files, output, fps)?;
    log::info!("Video saved as: {}", output.display());

    Ok(Report {
        output: output.to_path_buf(),
        frames: ordered.files.len(),
        strategy: ordered.strategy,
    })
}
