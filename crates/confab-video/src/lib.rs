//! Video frame plumbing shared by capture backends and confab-core.
//!
//! Defines the frame value type, the source/sink seam, and the camera
//! capture collaborator trait. No platform capture code lives here;
//! backends implement [`CameraCapture`] per platform.

pub mod camera;
pub mod frame;
pub mod source;

pub use camera::{CameraCapture, CameraDevice, CameraFacing, CaptureError};
pub use frame::{VideoFrame, VideoRotation};
pub use source::{VideoSink, VideoSinkRegistry, VideoSource};
