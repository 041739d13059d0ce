use bytes::Bytes;

/// Rotation to apply before rendering or encoding a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoRotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

/// A single captured video frame.
///
/// Pixel data is reference-counted: cloning a frame is cheap and shares
/// the underlying buffer.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub rotation: VideoRotation,
    /// Capture timestamp in microseconds.
    pub timestamp_us: i64,
    /// Planar I420 pixel data.
    pub data: Bytes,
}
