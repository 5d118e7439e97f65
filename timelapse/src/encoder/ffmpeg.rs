use std::{
    io::{self, Write},
    num::NonZeroU32,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use super::{EncodeError, Encoder};

#[cfg(windows)]
const BINARY_NAME: &str = "ffmpeg.exe";
#[cfg(not(windows))]
const BINARY_NAME: &str = "ffmpeg";

/// Runs an `ffmpeg` binary with the concat demuxer. Encodes H.264 in yuv420p, which
/// about everything can play.
#[derive(Clone, Debug)]
pub struct FfmpegEncoder {
    binary: PathBuf,
}

impl FfmpegEncoder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Uses the binary from [`locate_ffmpeg`].
    pub fn locate() -> Option<Self> {
        locate_ffmpeg().map(Self::new)
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

/// An ffmpeg in the current directory wins over one in `PATH`.
pub fn locate_ffmpeg() -> Option<PathBuf> {
    let local = Path::new(".").join(BINARY_NAME);
    if local.is_file() {
        return Some(local);
    }
    which::which("ffmpeg").ok()
}

impl Encoder for FfmpegEncoder {
    fn encode(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        fps: NonZeroU32,
    ) -> Result<(), EncodeError> {
        if !self.binary.exists() {
            return Err(EncodeError::EncoderMissing(self.binary.clone()));
        }

        let first = inputs.first().ok_or(EncodeError::NoImages)?;
        let (width, height) =
            image::image_dimensions(first).map_err(|source| EncodeError::FirstImage {
                path: first.clone(),
                source,
            })?;
        let (width, height) = even_dimensions(width, height);
        log::info!(
            "Encoding {} images at {fps} fps and {width}x{height} into {}",
            inputs.len(),
            output.display()
        );

        let mut list = tempfile::Builder::new()
            .prefix("timelapse-")
            .suffix(".txt")
            .tempfile()
            .map_err(EncodeError::ConcatList)?;
        write_concat_list(list.as_file_mut(), inputs, fps).map_err(EncodeError::ConcatList)?;

        let mut command = Command::new(&self.binary);
        command
            .args(["-hide_banner", "-y", "-f", "concat", "-safe", "0", "-i"])
            .arg(list.path())
            .arg("-vf")
            .arg(format!("scale={width}:{height}"))
            .arg("-r")
            .arg(fps.to_string())
            .args(["-vsync", "cfr", "-c:v", "libx264", "-pix_fmt", "yuv420p"])
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        log::debug!("Running: {command:?}");

        let result = command.output().map_err(EncodeError::Spawn)?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            log::error!("ffmpeg said:\n{stderr}");
            return Err(EncodeError::Failed {
                status: result.status,
                stderr,
            });
        }

        Ok(())
    }
}

/// yuv420p needs both to be even
fn even_dimensions(width: u32, height: u32) -> (u32, u32) {
    let even = |x: u32| (x & !1).max(2);
    (even(width), even(height))
}

/// Writes a list for ffmpeg's concat demuxer where every image is shown for one frame.
pub fn write_concat_list(
    mut writer: impl Write,
    inputs: &[PathBuf],
    fps: NonZeroU32,
) -> io::Result<()> {
    let frame_duration = 1.0 / f64::from(fps.get());
    let cwd = std::env::current_dir()?;

    writeln!(writer, "ffconcat version 1.0")?;
    for input in inputs {
        writeln!(writer, "file {}", quote(&cwd.join(input))?)?;
        writeln!(writer, "duration {frame_duration:.6}")?;
    }
    // The duration of the last entry is ignored unless it is repeated. The repeat shows
    // up as one extra frame of the last image, which is fine.
    if let Some(last) = inputs.last() {
        writeln!(writer, "file {}", quote(&cwd.join(last))?)?;
    }
    writer.flush()
}

/// Single quotes the path for the concat list. ffmpeg reads the list as UTF-8, so other
/// paths can't be written.
fn quote(path: &Path) -> io::Result<String> {
    let path = path.to_str().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("the path is not valid UTF-8: {}", path.display()),
        )
    })?;
    Ok(format!("'{}'", path.replace('\'', r"'\''")))
}
