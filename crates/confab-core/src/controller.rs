use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{Mutex, mpsc};

use confab_video::{CameraCapture, CameraDevice, VideoSink, VideoSource};

use crate::config::{
    LocalVideoConfiguration, LocalVideoKind, RemoteVideoSource, VideoSubscriptionConfiguration,
};
use crate::data_message::DataMessage;
use crate::errors::ConfabError;
use crate::events::{ConfabEvent, ConfabEventListener, EventEmitter, ListenerId};
use crate::subscriptions::SubscriptionSet;
use crate::transport::{MediaTransport, MeetingCredentials, PrimaryMeetingEvent};

/// The local video source currently wired to the transport.
enum LocalVideo {
    Empty,
    Camera {
        sink: Arc<dyn VideoSink>,
    },
    External {
        source: Arc<dyn VideoSource>,
        sink: Arc<dyn VideoSink>,
    },
}

impl LocalVideo {
    fn kind(&self) -> Option<LocalVideoKind> {
        match self {
            LocalVideo::Empty => None,
            LocalVideo::Camera { .. } => Some(LocalVideoKind::Camera),
            LocalVideo::External { .. } => Some(LocalVideoKind::External),
        }
    }
}

/// Everything guarded by the controller's single lock.
struct ControllerState {
    started: bool,
    local: LocalVideo,
    /// Last configuration handed to the transport; survives source
    /// replacement until a later call supplies a new one.
    local_config: Option<LocalVideoConfiguration>,
    remote_video: bool,
    subscriptions: SubscriptionSet,
    /// Per-tile pause flags, keyed by video id. Independent of
    /// subscription membership; flags outlive unsubscription.
    pause_flags: HashMap<u32, bool>,
    promoted: bool,
}

/// Mediates local video source selection and remote subscription
/// reconciliation between the application and the media transport.
///
/// At most one local source is wired to the transport at any time;
/// every source change goes through detach-then-attach. All state sits
/// behind one mutex held across transport awaits, so concurrent calls
/// are linearized in call order and a detach always completes before
/// the next attach starts.
pub struct VideoSourceController {
    transport: Arc<dyn MediaTransport>,
    camera: Arc<dyn CameraCapture>,
    emitter: EventEmitter,
    state: Mutex<ControllerState>,
}

impl VideoSourceController {
    pub fn new(transport: Arc<dyn MediaTransport>, camera: Arc<dyn CameraCapture>) -> Self {
        Self {
            transport,
            camera,
            emitter: EventEmitter::new(),
            state: Mutex::new(ControllerState {
                started: false,
                local: LocalVideo::Empty,
                local_config: None,
                remote_video: false,
                subscriptions: SubscriptionSet::new(),
                pause_flags: HashMap::new(),
                promoted: false,
            }),
        }
    }

    /// Register a listener for controller events.
    pub fn add_listener(&self, listener: Arc<dyn ConfabEventListener>) -> ListenerId {
        self.emitter.add_listener(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) {
        self.emitter.remove_listener(id);
    }

    /// Activate the transport session. Calling again while started is a
    /// no-op.
    pub async fn start(&self) -> Result<(), ConfabError> {
        let mut state = self.state.lock().await;
        if state.started {
            tracing::debug!("start: already started");
            return Ok(());
        }
        self.transport.start_session().await?;
        state.started = true;
        tracing::info!("video subsystem started");
        self.emitter.emit(ConfabEvent::Started);
        Ok(())
    }

    /// Tear down all local and remote video state and release the
    /// transport. A no-op when not started.
    ///
    /// Queued behind in-flight operations on the state lock, so teardown
    /// always observes and wins over whatever was running.
    pub async fn stop_and_destroy(&self) -> Result<(), ConfabError> {
        let mut state = self.state.lock().await;
        if !state.started {
            tracing::debug!("stop_and_destroy: not started");
            return Ok(());
        }
        if let Err(e) = self.detach_local(&mut state).await {
            tracing::warn!("stop_and_destroy: detach failed: {e}");
        }
        state.local_config = None;
        state.subscriptions.clear();
        state.pause_flags.clear();
        state.remote_video = false;
        state.promoted = false;
        state.started = false;
        let result = self.transport.stop_session().await;
        tracing::info!("video subsystem stopped and destroyed");
        self.emitter.emit(ConfabEvent::Stopped);
        result
    }

    /// Select the transmitted local video source.
    ///
    /// `source = None` selects the internal camera capture; `Some` wires
    /// the caller-supplied source and registers the transport's ingest
    /// sink on it. `config = Some` replaces the bitrate configuration;
    /// `None` keeps whatever was applied last. Calling again for the
    /// source that is already transmitting only updates the
    /// configuration; capture is not restarted. A no-op when the
    /// controller is not started.
    pub async fn start_local_video(
        &self,
        source: Option<Arc<dyn VideoSource>>,
        config: Option<LocalVideoConfiguration>,
    ) -> Result<(), ConfabError> {
        let mut state = self.state.lock().await;
        if !state.started {
            tracing::debug!("start_local_video: not started, ignoring");
            return Ok(());
        }

        let provided = config;
        let effective = provided.or(state.local_config);

        let same_source = match (&state.local, &source) {
            (LocalVideo::Camera { .. }, None) => true,
            (LocalVideo::External { source: current, .. }, Some(requested)) => {
                Arc::ptr_eq(current, requested)
            }
            _ => false,
        };
        if same_source {
            if provided.is_some() {
                self.transport.update_local_video(effective).await?;
                state.local_config = effective;
                tracing::debug!("start_local_video: source kept, configuration updated");
            }
            return Ok(());
        }

        // Unwire the previous source before attaching the new one; there
        // is never a moment with two sources wired.
        self.detach_local(&mut state).await?;

        match source {
            None => {
                self.camera
                    .start()
                    .map_err(|e| ConfabError::Capture(e.to_string()))?;
                let sink = match self.transport.attach_local_video(effective).await {
                    Ok(sink) => sink,
                    Err(e) => {
                        self.camera.stop();
                        return Err(e);
                    }
                };
                self.camera.add_video_sink(sink.clone());
                state.local = LocalVideo::Camera { sink };
                state.local_config = effective;
                tracing::info!("local video started from camera capture");
                self.emitter.emit(ConfabEvent::LocalVideoStarted {
                    kind: LocalVideoKind::Camera,
                });
            }
            Some(source) => {
                let sink = self.transport.attach_local_video(effective).await?;
                source.add_video_sink(sink.clone());
                state.local = LocalVideo::External { source, sink };
                state.local_config = effective;
                tracing::info!("local video started from external source");
                self.emitter.emit(ConfabEvent::LocalVideoStarted {
                    kind: LocalVideoKind::External,
                });
            }
        }
        Ok(())
    }

    /// Detach whatever local source is active; a no-op when none is.
    pub async fn stop_local_video(&self) -> Result<(), ConfabError> {
        let mut state = self.state.lock().await;
        if matches!(state.local, LocalVideo::Empty) {
            tracing::debug!("stop_local_video: no active source");
            return Ok(());
        }
        self.detach_local(&mut state).await?;
        tracing::info!("local video stopped");
        self.emitter.emit(ConfabEvent::LocalVideoStopped);
        Ok(())
    }

    /// Enable remote video reception at the transport level. Independent
    /// of any specific subscription.
    pub async fn start_remote_video(&self) -> Result<(), ConfabError> {
        let mut state = self.state.lock().await;
        if !state.started {
            tracing::debug!("start_remote_video: not started, ignoring");
            return Ok(());
        }
        self.transport.start_remote_video().await?;
        state.remote_video = true;
        self.emitter.emit(ConfabEvent::RemoteVideoStarted);
        Ok(())
    }

    pub async fn stop_remote_video(&self) -> Result<(), ConfabError> {
        let mut state = self.state.lock().await;
        if !state.started {
            tracing::debug!("stop_remote_video: not started, ignoring");
            return Ok(());
        }
        self.transport.stop_remote_video().await?;
        state.remote_video = false;
        self.emitter.emit(ConfabEvent::RemoteVideoStopped);
        Ok(())
    }

    /// The device the internal capture is using, or `None` when a custom
    /// source is transmitted or no local video is active.
    pub async fn active_camera(&self) -> Option<CameraDevice> {
        let state = self.state.lock().await;
        match state.local {
            LocalVideo::Camera { .. } => self.camera.active_camera(),
            _ => None,
        }
    }

    /// Switch the internal capture to the next device. Returns `None`
    /// without touching the camera unless the internal capture source is
    /// active.
    pub async fn switch_camera(&self) -> Result<Option<CameraDevice>, ConfabError> {
        let state = self.state.lock().await;
        match state.local {
            LocalVideo::Camera { .. } => self
                .camera
                .switch_camera()
                .map(Some)
                .map_err(|e| ConfabError::Capture(e.to_string())),
            _ => {
                tracing::debug!("switch_camera: internal capture not active");
                Ok(None)
            }
        }
    }

    /// Set the pause flag of one remote video tile.
    ///
    /// The flag is independent of subscription membership: pausing never
    /// removes the tile's subscription, and flags survive
    /// unsubscription. A tile is known once its stream id appears in the
    /// subscription set or it has carried a flag before; anything else
    /// fails with `NotFound`.
    pub async fn set_remote_paused(&self, paused: bool, video_id: u32) -> Result<(), ConfabError> {
        let mut state = self.state.lock().await;
        if !state.started {
            tracing::debug!("set_remote_paused: not started, ignoring");
            return Ok(());
        }
        let known = state.pause_flags.contains_key(&video_id)
            || state.subscriptions.contains_stream(video_id);
        if !known {
            return Err(ConfabError::NotFound(format!("unknown video id {video_id}")));
        }
        self.transport.set_remote_paused(video_id, paused).await?;
        state.pause_flags.insert(video_id, paused);
        self.emitter.emit(ConfabEvent::RemotePauseChanged { video_id, paused });
        Ok(())
    }

    /// Validate and transmit an application data message.
    ///
    /// An invalid topic or oversized payload fails with
    /// `InvalidParameter` before any transport call.
    pub async fn send_data_message(
        &self,
        topic: &str,
        data: impl Into<Bytes>,
        lifetime_ms: u32,
    ) -> Result<(), ConfabError> {
        let message = DataMessage::new(topic, data, lifetime_ms)?;
        let state = self.state.lock().await;
        if !state.started {
            tracing::debug!("send_data_message: not started, ignoring");
            return Ok(());
        }
        self.transport.send_data_message(&message).await
    }

    /// Reconcile the desired remote subscriptions.
    ///
    /// `removed` is applied first, then `added_or_updated`; a source in
    /// both batches ends up added/updated. Only the net change is
    /// forwarded, and the authoritative set is updated after the
    /// transport accepts it; a call that changes nothing makes no
    /// transport call. A no-op when not started.
    pub async fn update_video_source_subscriptions(
        &self,
        added_or_updated: HashMap<RemoteVideoSource, VideoSubscriptionConfiguration>,
        removed: Vec<RemoteVideoSource>,
    ) -> Result<(), ConfabError> {
        let mut state = self.state.lock().await;
        if !state.started {
            tracing::debug!("update_video_source_subscriptions: not started, ignoring");
            return Ok(());
        }
        let diff = state.subscriptions.reconcile(added_or_updated, removed);
        if diff.is_empty() {
            tracing::debug!("update_video_source_subscriptions: no net change");
            return Ok(());
        }
        self.transport.update_subscriptions(&diff).await?;
        state.subscriptions.commit(&diff);
        tracing::info!(
            added_or_updated = diff.added_or_updated.len(),
            removed = diff.removed.len(),
            "subscriptions updated"
        );
        self.emitter.emit(ConfabEvent::SubscriptionsUpdated(diff));
        Ok(())
    }

    /// Ask the transport to promote this attendee into the primary
    /// meeting. Negotiation outcomes arrive on the returned channel.
    ///
    /// When not started the returned channel is already closed and no
    /// promotion is attempted.
    pub async fn promote_to_primary_meeting(
        &self,
        credentials: &MeetingCredentials,
    ) -> Result<mpsc::UnboundedReceiver<PrimaryMeetingEvent>, ConfabError> {
        let mut state = self.state.lock().await;
        if !state.started {
            tracing::debug!("promote_to_primary_meeting: not started, ignoring");
            let (_tx, rx) = mpsc::unbounded_channel();
            return Ok(rx);
        }
        let rx = self.transport.promote_to_primary_meeting(credentials).await?;
        state.promoted = true;
        tracing::info!(attendee_id = %credentials.attendee_id, "primary meeting promotion requested");
        self.emitter.emit(ConfabEvent::PrimaryMeetingPromoted);
        Ok(rx)
    }

    /// Leave the primary meeting. A no-op when never promoted.
    pub async fn demote_from_primary_meeting(&self) -> Result<(), ConfabError> {
        let mut state = self.state.lock().await;
        if !state.promoted {
            tracing::debug!("demote_from_primary_meeting: not promoted");
            return Ok(());
        }
        self.transport.demote_from_primary_meeting().await?;
        state.promoted = false;
        self.emitter.emit(ConfabEvent::PrimaryMeetingDemoted);
        Ok(())
    }

    /// Whether the transport session is active.
    pub async fn is_started(&self) -> bool {
        self.state.lock().await.started
    }

    /// Kind of the currently transmitted source, if any.
    pub async fn local_video_kind(&self) -> Option<LocalVideoKind> {
        self.state.lock().await.local.kind()
    }

    pub async fn is_remote_video_started(&self) -> bool {
        self.state.lock().await.remote_video
    }

    /// Desired configuration for one remote source, if subscribed.
    pub async fn subscription(
        &self,
        source: &RemoteVideoSource,
    ) -> Option<VideoSubscriptionConfiguration> {
        self.state.lock().await.subscriptions.configuration(source).copied()
    }

    /// Unwire the active source and leave the state `Empty`. Internal
    /// capture is stopped; external sources get their sink removed.
    async fn detach_local(&self, state: &mut ControllerState) -> Result<(), ConfabError> {
        match std::mem::replace(&mut state.local, LocalVideo::Empty) {
            LocalVideo::Empty => Ok(()),
            LocalVideo::Camera { sink } => {
                self.camera.remove_video_sink(&sink);
                self.camera.stop();
                self.transport.detach_local_video().await
            }
            LocalVideo::External { source, sink } => {
                source.remove_video_sink(&sink);
                self.transport.detach_local_video().await
            }
        }
    }
}
