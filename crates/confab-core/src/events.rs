use std::sync::{Arc, RwLock};

use crate::config::LocalVideoKind;
use crate::subscriptions::SubscriptionDiff;

/// Events emitted by the controller to registered listeners.
#[derive(Debug, Clone)]
pub enum ConfabEvent {
    Started,
    Stopped,
    LocalVideoStarted { kind: LocalVideoKind },
    LocalVideoStopped,
    RemoteVideoStarted,
    RemoteVideoStopped,
    SubscriptionsUpdated(SubscriptionDiff),
    RemotePauseChanged { video_id: u32, paused: bool },
    PrimaryMeetingPromoted,
    PrimaryMeetingDemoted,
}

/// Trait for receiving events from the controller.
/// Implementations must be Send + Sync (called from tokio tasks).
pub trait ConfabEventListener: Send + Sync {
    fn on_event(&self, event: ConfabEvent);
}

/// Handle returned by [`EventEmitter::add_listener`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

/// Internal event emitter that dispatches to registered listeners.
#[derive(Clone)]
pub struct EventEmitter {
    inner: Arc<RwLock<EmitterInner>>,
}

struct EmitterInner {
    next_id: u64,
    listeners: Vec<(ListenerId, Arc<dyn ConfabEventListener>)>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(EmitterInner {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn ConfabEventListener>) -> ListenerId {
        let mut inner = self.inner.write().unwrap();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.push((id, listener));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) {
        self.inner.write().unwrap().listeners.retain(|(lid, _)| *lid != id);
    }

    pub fn emit(&self, event: ConfabEvent) {
        let listeners: Vec<_> = self
            .inner
            .read()
            .unwrap()
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in &listeners {
            listener.on_event(event.clone());
        }
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}
