use std::sync::{Arc, Mutex};

use crate::frame::VideoFrame;

/// Consumes frames produced by a [`VideoSource`].
///
/// Implementations must be Send + Sync (frames may arrive from capture
/// threads).
pub trait VideoSink: Send + Sync {
    fn on_video_frame(&self, frame: &VideoFrame);
}

/// A producer of video frames.
///
/// Sinks are identified by `Arc` pointer identity: removing a sink
/// requires the same `Arc` that was added.
pub trait VideoSource: Send + Sync {
    fn add_video_sink(&self, sink: Arc<dyn VideoSink>);
    fn remove_video_sink(&self, sink: &Arc<dyn VideoSink>);
}

/// Sink bookkeeping for [`VideoSource`] implementations.
///
/// Adding the same sink twice keeps a single registration. Dispatch
/// clones the sink list out of the lock before fan-out, so a sink may
/// add or remove sinks from its frame callback without deadlocking.
pub struct VideoSinkRegistry {
    sinks: Mutex<Vec<Arc<dyn VideoSink>>>,
}

impl VideoSinkRegistry {
    pub fn new() -> Self {
        Self {
            sinks: Mutex::new(Vec::new()),
        }
    }

    pub fn add(&self, sink: Arc<dyn VideoSink>) {
        let mut sinks = self.sinks.lock().unwrap();
        if !sinks.iter().any(|s| Arc::ptr_eq(s, &sink)) {
            sinks.push(sink);
        }
    }

    pub fn remove(&self, sink: &Arc<dyn VideoSink>) {
        self.sinks.lock().unwrap().retain(|s| !Arc::ptr_eq(s, sink));
    }

    /// Deliver `frame` to every registered sink.
    pub fn dispatch(&self, frame: &VideoFrame) {
        let sinks = self.sinks.lock().unwrap().clone();
        for sink in &sinks {
            sink.on_video_frame(frame);
        }
    }

    pub fn len(&self) -> usize {
        self.sinks.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.lock().unwrap().is_empty()
    }
}

impl Default for VideoSinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::VideoRotation;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink {
        frames: AtomicUsize,
    }

    impl CountingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                frames: AtomicUsize::new(0),
            })
        }

        fn count(&self) -> usize {
            self.frames.load(Ordering::SeqCst)
        }
    }

    impl VideoSink for CountingSink {
        fn on_video_frame(&self, _frame: &VideoFrame) {
            self.frames.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn test_frame() -> VideoFrame {
        VideoFrame {
            width: 4,
            height: 4,
            rotation: VideoRotation::Deg0,
            timestamp_us: 0,
            data: Bytes::from_static(&[0u8; 24]),
        }
    }

    #[test]
    fn dispatches_to_all_sinks() {
        let registry = VideoSinkRegistry::new();
        let a = CountingSink::new();
        let b = CountingSink::new();
        registry.add(a.clone());
        registry.add(b.clone());

        registry.dispatch(&test_frame());

        assert_eq!(a.count(), 1);
        assert_eq!(b.count(), 1);
    }

    #[test]
    fn adding_same_sink_twice_registers_once() {
        let registry = VideoSinkRegistry::new();
        let sink = CountingSink::new();
        registry.add(sink.clone());
        registry.add(sink.clone());

        assert_eq!(registry.len(), 1);
        registry.dispatch(&test_frame());
        assert_eq!(sink.count(), 1);
    }

    #[test]
    fn removed_sink_no_longer_receives_frames() {
        let registry = VideoSinkRegistry::new();
        let sink = CountingSink::new();
        registry.add(sink.clone());

        let as_dyn: Arc<dyn VideoSink> = sink.clone();
        registry.remove(&as_dyn);

        assert!(registry.is_empty());
        registry.dispatch(&test_frame());
        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn remove_is_by_identity_not_type() {
        let registry = VideoSinkRegistry::new();
        let kept = CountingSink::new();
        let other = CountingSink::new();
        registry.add(kept.clone());

        let as_dyn: Arc<dyn VideoSink> = other;
        registry.remove(&as_dyn);

        assert_eq!(registry.len(), 1);
    }
}
