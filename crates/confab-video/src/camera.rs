use thiserror::Error;

use crate::source::VideoSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraFacing {
    Front,
    Back,
    Unspecified,
}

/// A physical capture device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub id: String,
    pub name: String,
    pub facing: CameraFacing,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no camera device available")]
    NoDevice,
    #[error("camera device busy: {0}")]
    DeviceBusy(String),
    #[error("capture failed: {0}")]
    Failed(String),
}

/// Device camera capture, consumed as the internal local video source.
///
/// Implementations deliver frames into registered sinks while started.
/// `stop` must be a no-op when not capturing.
pub trait CameraCapture: VideoSource {
    fn start(&self) -> Result<(), CaptureError>;
    fn stop(&self);
    /// Switch to the next available device, returning the new active one.
    fn switch_camera(&self) -> Result<CameraDevice, CaptureError>;
    /// The device frames are currently captured from.
    fn active_camera(&self) -> Option<CameraDevice>;
}
