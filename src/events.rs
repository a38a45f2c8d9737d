// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Observer registry for gesture and buffer-read notifications.

use crate::hand::Hand;
use crate::results::{BufferReadEvent, EventKind, GestureEvent};

/// Callback invoked with each matching gesture event.
pub type GestureCallback = Box<dyn FnMut(&GestureEvent) + Send>;

/// Callback invoked after the classifier reads a buffer window.
pub type BufferReadCallback = Box<dyn FnMut(&BufferReadEvent) + Send>;

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Which gesture events a listener receives.
///
/// `None` fields match everything. A hand filter matches events for that hand
/// and events for both hands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub kind: Option<EventKind>,
    pub hand: Option<Hand>,
}

impl EventFilter {
    #[must_use]
    pub const fn all() -> Self {
        Self {
            kind: None,
            hand: None,
        }
    }

    /// Only debounced, one-shot events.
    #[must_use]
    pub const fn confirmed() -> Self {
        Self {
            kind: Some(EventKind::Confirmed),
            hand: None,
        }
    }

    /// Only the per-cycle state updates.
    #[must_use]
    pub const fn defaults() -> Self {
        Self {
            kind: Some(EventKind::Default),
            hand: None,
        }
    }

    #[must_use]
    pub const fn for_hand(mut self, hand: Hand) -> Self {
        self.hand = Some(hand);
        self
    }

    #[must_use]
    pub fn matches(&self, event: &GestureEvent) -> bool {
        self.kind.is_none_or(|kind| kind == event.kind) && self.hand.is_none_or(|hand| event.hand.covers(hand))
    }
}

/// Ordered listener lists. Listeners run synchronously in subscription order.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    gesture_listeners: Vec<(SubscriptionId, EventFilter, GestureCallback)>,
    buffer_listeners: Vec<(SubscriptionId, Hand, BufferReadCallback)>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    const fn next_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn subscribe(&mut self, filter: EventFilter, callback: GestureCallback) -> SubscriptionId {
        let id = self.next_id();
        self.gesture_listeners.push((id, filter, callback));
        id
    }

    pub fn subscribe_buffer_read(&mut self, hand: Hand, callback: BufferReadCallback) -> SubscriptionId {
        let id = self.next_id();
        self.buffer_listeners.push((id, hand, callback));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listener_count();
        self.gesture_listeners.retain(|(sid, _, _)| *sid != id);
        self.buffer_listeners.retain(|(sid, _, _)| *sid != id);
        self.listener_count() != before
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.gesture_listeners.len() + self.buffer_listeners.len()
    }

    pub fn publish(&mut self, event: &GestureEvent) {
        for (_, filter, callback) in &mut self.gesture_listeners {
            if filter.matches(event) {
                callback(event);
            }
        }
    }

    /// Deliver a buffer-read notification to the listeners of the buffer that was read.
    pub fn publish_buffer_read(&mut self, event: &BufferReadEvent) {
        for (_, hand, callback) in &mut self.buffer_listeners {
            if event.buffer == *hand {
                callback(event);
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("gesture_listeners", &self.gesture_listeners.len())
            .field("buffer_listeners", &self.buffer_listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::gesture::GestureLabel;
    use crate::hand::GestureHand;

    fn counter(bus: &mut EventBus, filter: EventFilter) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        bus.subscribe(
            filter,
            Box::new(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        );
        count
    }

    #[test]
    fn test_filters() {
        let mut bus = EventBus::new();
        let all = counter(&mut bus, EventFilter::all());
        let confirmed = counter(&mut bus, EventFilter::confirmed());
        let left = counter(&mut bus, EventFilter::defaults().for_hand(Hand::Left));

        bus.publish(&GestureEvent::confirmed(GestureLabel::Bloom, GestureHand::Right, false));
        bus.publish(&GestureEvent::default_event(GestureLabel::Bloom, GestureHand::Left, false));
        bus.publish(&GestureEvent::default_event(GestureLabel::None, GestureHand::BothHands, false));
        bus.publish(&GestureEvent::nothing_tracked());

        assert_eq!(all.load(Ordering::SeqCst), 4);
        assert_eq!(confirmed.load(Ordering::SeqCst), 1);
        assert_eq!(left.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_buffer_read_reaches_only_its_hand() {
        let mut bus = EventBus::new();
        let tops = Arc::new(parking_lot::Mutex::new(Vec::new()));
        for hand in Hand::BOTH {
            let t = Arc::clone(&tops);
            bus.subscribe_buffer_read(hand, Box::new(move |read| t.lock().push((hand, read.top_index))));
        }

        let mut event = BufferReadEvent {
            buffer: Hand::Right,
            hand: GestureHand::BothHands,
            top_index: 7,
            frames_per_gesture: 5,
            total_samples: 20,
        };
        bus.publish_buffer_read(&event);
        assert_eq!(*tops.lock(), vec![(Hand::Right, 7)]);

        event.buffer = Hand::Left;
        event.top_index = 2;
        bus.publish_buffer_read(&event);
        assert_eq!(*tops.lock(), vec![(Hand::Right, 7), (Hand::Left, 2)]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let id = bus.subscribe(EventFilter::all(), Box::new(|_| {}));
        assert_eq!(bus.listener_count(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.listener_count(), 0);
    }
}
