pub mod resolution;
#[cfg(feature = "webcam")]
pub mod webcam;

use std::ops::{Deref, DerefMut};

use image::RgbImage;

pub use resolution::Resolution;

#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("could not open the camera: {0}")]
    Open(String),
    #[error("the camera refused the resolution {resolution}: {reason}")]
    Resolution {
        resolution: Resolution,
        reason: String,
    },
    #[error("could not read a frame: {0}")]
    Read(String),
    #[error("no camera backend was compiled in, rebuild with the `webcam` feature")]
    Unsupported,
}

impl CameraError {
    /// Retrying won't help
    pub fn is_permanent(&self) -> bool {
        matches!(self, CameraError::Unsupported)
    }
}

/// An opened camera device.
pub trait Camera {
    /// Asks the device to capture at `resolution`. The device may settle on something
    /// else, check [`Camera::resolution`] afterwards.
    fn set_resolution(&mut self, resolution: Resolution) -> Result<(), CameraError>;

    /// The resolution the device currently reports.
    fn resolution(&self) -> Resolution;

    fn read_frame(&mut self) -> Result<RgbImage, CameraError>;

    /// Stops the stream and lets go of the device. Calling it again should be harmless.
    fn release(&mut self);
}

/// Something that can open camera devices.
pub trait CameraBackend {
    type Camera: Camera;

    fn open(&self) -> Result<Self::Camera, CameraError>;

    /// Opens a camera that gets released when the guard goes out of scope.
    fn open_guarded(&self) -> Result<CameraGuard<Self::Camera>, CameraError> {
        self.open().map(CameraGuard)
    }
}

/// Releases the camera on drop.
pub struct CameraGuard<C: Camera>(C);

impl<C: Camera> Deref for CameraGuard<C> {
    type Target = C;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<C: Camera> DerefMut for CameraGuard<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<C: Camera> Drop for CameraGuard<C> {
    fn drop(&mut self) {
        self.0.release();
        log::debug!("Camera released");
    }
}

/// Used when the crate is built without any real camera support.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBackend;

pub enum NoCamera {}

impl Camera for NoCamera {
    fn set_resolution(&mut self, _: Resolution) -> Result<(), CameraError> {
        match *self {}
    }

    fn resolution(&self) -> Resolution {
        match *self {}
    }

    fn read_frame(&mut self) -> Result<RgbImage, CameraError> {
        match *self {}
    }

    fn release(&mut self) {
        match *self {}
    }
}

impl CameraBackend for NoBackend {
    type Camera = NoCamera;

    fn open(&self) -> Result<Self::Camera, CameraError> {
        Err(CameraError::Unsupported)
    }
}

/// The backend the binaries use for camera number `index`.
#[cfg(feature = "webcam")]
pub fn default_backend(index: u32) -> webcam::WebcamBackend {
    webcam::WebcamBackend::new(index)
}

/// The backend the binaries use for camera number `index`.
#[cfg(not(feature = "webcam"))]
pub fn default_backend(index: u32) -> NoBackend {
    log::debug!("Built without webcam support, camera {index} can't be opened");
    NoBackend
}

/// Opens the camera once, probes it with [`resolution::CANDIDATES`] and releases it again.
pub fn detect_resolutions<B>(backend: &B) -> Result<Vec<Resolution>, CameraError>
where
    B: CameraBackend + ?Sized,
{
    let mut camera = backend.open_guarded()?;
    Ok(resolution::probe(&mut *camera, &resolution::CANDIDATES))
}
