use image::RgbImage;
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraIndex, RequestedFormat, RequestedFormatType},
};

use super::{Camera, CameraBackend, CameraError, Resolution};

/// Opens cameras through the native platform API (V4L2, MSMF or AVFoundation).
#[derive(Clone, Copy, Debug)]
pub struct WebcamBackend {
    index: u32,
}

pub struct Webcam {
    inner: nokhwa::Camera,
    streaming: bool,
}

impl WebcamBackend {
    pub fn new(index: u32) -> Self {
        Self { index }
    }
}

impl CameraBackend for WebcamBackend {
    type Camera = Webcam;

    fn open(&self) -> Result<Self::Camera, CameraError> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut inner = nokhwa::Camera::new(CameraIndex::Index(self.index), requested)
            .map_err(|e| CameraError::Open(e.to_string()))?;
        inner
            .open_stream()
            .map_err(|e| CameraError::Open(e.to_string()))?;
        log::debug!("Opened camera {}: {}", self.index, inner.info().human_name());
        Ok(Webcam {
            inner,
            streaming: true,
        })
    }
}

impl Camera for Webcam {
    fn set_resolution(&mut self, resolution: Resolution) -> Result<(), CameraError> {
        self.inner
            .set_resolution(nokhwa::utils::Resolution::new(
                resolution.width,
                resolution.height,
            ))
            .map_err(|e| CameraError::Resolution {
                resolution,
                reason: e.to_string(),
            })
    }

    fn resolution(&self) -> Resolution {
        let res = self.inner.resolution();
        Resolution::new(res.width(), res.height())
    }

    fn read_frame(&mut self) -> Result<RgbImage, CameraError> {
        let buffer = self
            .inner
            .frame()
            .map_err(|e| CameraError::Read(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::Read(e.to_string()))?;
        let (width, height) = (decoded.width(), decoded.height());
        RgbImage::from_raw(width, height, decoded.into_raw())
            .ok_or_else(|| CameraError::Read("decoded frame has the wrong size".to_string()))
    }

    fn release(&mut self) {
        if !self.streaming {
            return;
        }
        self.streaming = false;
        if let Err(e) = self.inner.stop_stream() {
            log::warn!("Failed to stop the camera stream: {e}");
        }
    }
}
