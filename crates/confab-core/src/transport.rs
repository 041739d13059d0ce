use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use confab_video::VideoSink;

use crate::config::LocalVideoConfiguration;
use crate::data_message::DataMessage;
use crate::errors::ConfabError;
use crate::subscriptions::SubscriptionDiff;

/// Credentials for joining a primary meeting as a promoted attendee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingCredentials {
    pub attendee_id: String,
    pub external_user_id: String,
    pub join_token: String,
}

/// Negotiation outcomes delivered on the channel returned by
/// [`MediaTransport::promote_to_primary_meeting`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryMeetingEvent {
    Promoted,
    Demoted { reason: String },
}

/// The native media engine, consumed as an opaque collaborator.
///
/// Implementations own their retry/backoff policy; failures are
/// returned as-is and never retried by the controller.
#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// Activate the media session.
    async fn start_session(&self) -> Result<(), ConfabError>;

    /// Tear down the media session and everything attached to it.
    async fn stop_session(&self) -> Result<(), ConfabError>;

    /// Attach the outgoing video track and return the ingest sink that
    /// frames are fed into. `config` is the optional bitrate hint;
    /// `None` lets the transport auto-adjust.
    async fn attach_local_video(
        &self,
        config: Option<LocalVideoConfiguration>,
    ) -> Result<Arc<dyn VideoSink>, ConfabError>;

    /// Update the bitrate hint of the attached outgoing track.
    async fn update_local_video(
        &self,
        config: Option<LocalVideoConfiguration>,
    ) -> Result<(), ConfabError>;

    /// Detach the outgoing video track. When this returns, the previous
    /// source is no longer wired to the session.
    async fn detach_local_video(&self) -> Result<(), ConfabError>;

    /// Coarse switch for remote video reception, independent of any
    /// specific subscription.
    async fn start_remote_video(&self) -> Result<(), ConfabError>;
    async fn stop_remote_video(&self) -> Result<(), ConfabError>;

    /// Apply a net subscription change.
    async fn update_subscriptions(&self, diff: &SubscriptionDiff) -> Result<(), ConfabError>;

    /// Set the per-tile pause flag.
    async fn set_remote_paused(&self, video_id: u32, paused: bool) -> Result<(), ConfabError>;

    /// Transmit a validated data message.
    async fn send_data_message(&self, message: &DataMessage) -> Result<(), ConfabError>;

    /// Begin primary meeting promotion; negotiation outcomes arrive on
    /// the returned channel.
    async fn promote_to_primary_meeting(
        &self,
        credentials: &MeetingCredentials,
    ) -> Result<mpsc::UnboundedReceiver<PrimaryMeetingEvent>, ConfabError>;

    /// End a previous promotion.
    async fn demote_from_primary_meeting(&self) -> Result<(), ConfabError>;
}
