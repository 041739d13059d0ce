use std::collections::HashMap;

use crate::config::{RemoteVideoSource, VideoSubscriptionConfiguration};

/// Net change produced by one reconcile call; this is what gets
/// forwarded to the transport, never the full set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionDiff {
    pub added_or_updated: HashMap<RemoteVideoSource, VideoSubscriptionConfiguration>,
    pub removed: Vec<RemoteVideoSource>,
}

impl SubscriptionDiff {
    pub fn is_empty(&self) -> bool {
        self.added_or_updated.is_empty() && self.removed.is_empty()
    }
}

/// The authoritative set of desired remote video subscriptions.
///
/// Mutated only through [`reconcile`](Self::reconcile) +
/// [`commit`](Self::commit); sources mentioned in neither input batch
/// keep their configuration.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    entries: HashMap<RemoteVideoSource, VideoSubscriptionConfiguration>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the net change `(added_or_updated, removed)` would make.
    ///
    /// A source present in both batches is treated as added/updated and
    /// its removal ignored (last writer wins). Removals of absent
    /// sources and updates equal to the current configuration are
    /// dropped, so a no-change call yields an empty diff.
    ///
    /// Does not mutate; pair with [`commit`](Self::commit) once the
    /// transport has accepted the change.
    pub fn reconcile(
        &self,
        added_or_updated: HashMap<RemoteVideoSource, VideoSubscriptionConfiguration>,
        removed: Vec<RemoteVideoSource>,
    ) -> SubscriptionDiff {
        let mut diff = SubscriptionDiff::default();

        for source in removed {
            if added_or_updated.contains_key(&source) {
                continue;
            }
            if self.entries.contains_key(&source) {
                diff.removed.push(source);
            }
        }

        for (source, config) in added_or_updated {
            if self.entries.get(&source) == Some(&config) {
                continue;
            }
            diff.added_or_updated.insert(source, config);
        }

        diff
    }

    /// Fold an accepted diff into the authoritative set.
    pub fn commit(&mut self, diff: &SubscriptionDiff) {
        for source in &diff.removed {
            self.entries.remove(source);
        }
        for (source, config) in &diff.added_or_updated {
            self.entries.insert(source.clone(), *config);
        }
    }

    pub fn configuration(
        &self,
        source: &RemoteVideoSource,
    ) -> Option<&VideoSubscriptionConfiguration> {
        self.entries.get(source)
    }

    /// Whether any subscribed source carries this stream id.
    pub fn contains_stream(&self, stream_id: u32) -> bool {
        self.entries.keys().any(|s| s.stream_id == stream_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{VideoPriority, VideoResolution};

    fn source(attendee: &str, stream: u32) -> RemoteVideoSource {
        RemoteVideoSource {
            attendee_id: attendee.to_string(),
            stream_id: stream,
        }
    }

    fn config(priority: VideoPriority) -> VideoSubscriptionConfiguration {
        VideoSubscriptionConfiguration {
            priority,
            target_resolution: VideoResolution::High,
        }
    }

    fn apply(
        set: &mut SubscriptionSet,
        added: Vec<(RemoteVideoSource, VideoSubscriptionConfiguration)>,
        removed: Vec<RemoteVideoSource>,
    ) -> SubscriptionDiff {
        let diff = set.reconcile(added.into_iter().collect(), removed);
        set.commit(&diff);
        diff
    }

    #[test]
    fn add_then_remove_leaves_set_without_key() {
        let mut set = SubscriptionSet::new();
        let a = source("attendee-a", 1);

        apply(&mut set, vec![(a.clone(), config(VideoPriority::High))], vec![]);
        assert!(set.configuration(&a).is_some());

        let diff = apply(&mut set, vec![], vec![a.clone()]);
        assert!(set.configuration(&a).is_none());
        assert_eq!(diff.removed, vec![a]);
    }

    #[test]
    fn update_overwrites_instead_of_duplicating() {
        let mut set = SubscriptionSet::new();
        let a = source("attendee-a", 1);

        apply(&mut set, vec![(a.clone(), config(VideoPriority::Low))], vec![]);
        apply(&mut set, vec![(a.clone(), config(VideoPriority::High))], vec![]);

        assert_eq!(set.len(), 1);
        assert_eq!(set.configuration(&a).unwrap().priority, VideoPriority::High);
    }

    #[test]
    fn key_in_both_batches_resolves_to_added() {
        let mut set = SubscriptionSet::new();
        let a = source("attendee-a", 1);

        let diff = apply(
            &mut set,
            vec![(a.clone(), config(VideoPriority::Medium))],
            vec![a.clone()],
        );

        assert!(diff.removed.is_empty());
        assert!(set.configuration(&a).is_some());
    }

    #[test]
    fn removing_absent_source_is_dropped_from_diff() {
        let mut set = SubscriptionSet::new();
        let diff = apply(&mut set, vec![], vec![source("nobody", 9)]);
        assert!(diff.is_empty());
    }

    #[test]
    fn update_equal_to_current_is_dropped_from_diff() {
        let mut set = SubscriptionSet::new();
        let a = source("attendee-a", 1);

        apply(&mut set, vec![(a.clone(), config(VideoPriority::High))], vec![]);
        let diff = apply(&mut set, vec![(a, config(VideoPriority::High))], vec![]);

        assert!(diff.is_empty());
    }

    #[test]
    fn unmentioned_sources_keep_their_configuration() {
        let mut set = SubscriptionSet::new();
        let a = source("attendee-a", 1);
        let b = source("attendee-b", 2);

        apply(
            &mut set,
            vec![
                (a.clone(), config(VideoPriority::High)),
                (b.clone(), config(VideoPriority::Low)),
            ],
            vec![],
        );
        apply(&mut set, vec![], vec![a]);

        assert_eq!(set.configuration(&b).unwrap().priority, VideoPriority::Low);
    }

    #[test]
    fn contains_stream_matches_by_stream_id() {
        let mut set = SubscriptionSet::new();
        apply(
            &mut set,
            vec![(source("attendee-a", 5), config(VideoPriority::Medium))],
            vec![],
        );

        assert!(set.contains_stream(5));
        assert!(!set.contains_stream(6));
    }
}
