use serde::{Deserialize, Serialize};

use crate::errors::ConfabError;

/// Bitrate configuration for the transmitted local video stream.
///
/// `max_bit_rate_kbps == None` means the transport auto-adjusts the
/// bitrate from participant and video counts. The controller passes the
/// absence through untouched; it never resolves a value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalVideoConfiguration {
    max_bit_rate_kbps: Option<u32>,
}

impl LocalVideoConfiguration {
    /// No explicit cap; the transport picks the bitrate.
    pub fn auto() -> Self {
        Self {
            max_bit_rate_kbps: None,
        }
    }

    /// Cap the transmitted stream at `kbps`. Zero is rejected; use
    /// [`auto`](Self::auto) for no cap.
    pub fn with_max_bit_rate(kbps: u32) -> Result<Self, ConfabError> {
        if kbps == 0 {
            return Err(ConfabError::InvalidParameter(
                "max_bit_rate_kbps must be positive".into(),
            ));
        }
        Ok(Self {
            max_bit_rate_kbps: Some(kbps),
        })
    }

    pub fn max_bit_rate_kbps(&self) -> Option<u32> {
        self.max_bit_rate_kbps
    }
}

/// Which kind of source is currently transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalVideoKind {
    Camera,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VideoResolution {
    #[default]
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VideoPriority {
    Lowest,
    Low,
    #[default]
    Medium,
    High,
    Highest,
}

/// Desired subscription parameters for one remote video source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VideoSubscriptionConfiguration {
    pub priority: VideoPriority,
    pub target_resolution: VideoResolution,
}

/// Identifies one remote attendee's outgoing video stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteVideoSource {
    pub attendee_id: String,
    pub stream_id: u32,
}
