// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Majority-vote and cooldown filtering of classifier labels.

use std::collections::VecDeque;

use tracing::debug;

use crate::config::GestureConfig;
use crate::gesture::GestureLabel;
use crate::hand::{GestureHand, Hand};
use crate::results::GestureEvent;

/// Per-hand debounce state.
///
/// Keeps the last `window_size` raw labels and the last confirmed gesture. A label
/// is confirmed when it wins the vote, is enabled in the mask, is not `Others`,
/// and either differs from the last confirmed gesture or that gesture's cooldown
/// has elapsed.
#[derive(Debug, Clone)]
pub struct GestureDebouncer {
    hand: Hand,
    recent: VecDeque<GestureLabel>,
    window_size: usize,
    last_confirmed: GestureLabel,
    elapsed: f32,
}

impl GestureDebouncer {
    #[must_use]
    pub fn new(hand: Hand, window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            hand,
            recent: std::iter::repeat_n(GestureLabel::None, window_size).collect(),
            window_size,
            last_confirmed: GestureLabel::None,
            elapsed: 0.0,
        }
    }

    #[must_use]
    pub const fn hand(&self) -> Hand {
        self.hand
    }

    #[must_use]
    pub const fn window_size(&self) -> usize {
        self.window_size
    }

    #[must_use]
    pub const fn last_confirmed(&self) -> GestureLabel {
        self.last_confirmed
    }

    /// Seconds since the last confirmation.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Recent raw labels, oldest first.
    pub fn recent_labels(&self) -> impl Iterator<Item = GestureLabel> + '_ {
        self.recent.iter().copied()
    }

    /// Change the window size. The window is refilled with `None`.
    pub fn resize(&mut self, window_size: usize) {
        self.window_size = window_size.max(1);
        self.recent = std::iter::repeat_n(GestureLabel::None, self.window_size).collect();
    }

    /// Advance the cooldown timer.
    pub fn advance(&mut self, dt_seconds: f32) {
        self.elapsed += dt_seconds;
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.resize(self.window_size);
        self.last_confirmed = GestureLabel::None;
        self.elapsed = 0.0;
    }

    fn votes(&self, label: GestureLabel) -> usize {
        self.recent.iter().filter(|&&l| l == label).count()
    }

    /// Record one raw label and return the resulting events.
    ///
    /// # Returns
    ///
    /// The confirmed event (if any) followed by the default event for this cycle.
    pub fn push(&mut self, label: GestureLabel, was_interpolated: bool, config: &GestureConfig) -> Vec<GestureEvent> {
        if self.recent.len() >= self.window_size {
            self.recent.pop_front();
        }
        self.recent.push_back(label);

        let hand = GestureHand::from(self.hand);
        let mut events = Vec::with_capacity(2);

        let cooldown_over = label != self.last_confirmed
            || self.elapsed > config.cooldowns[self.last_confirmed.index()];
        let enabled = config.mask[label.index()];

        if cooldown_over
            && enabled
            && label != GestureLabel::Others
            && self.votes(label) >= config.required_votes(self.window_size)
        {
            debug!(hand = %self.hand, %label, "gesture confirmed");
            self.elapsed = 0.0;
            self.last_confirmed = label;
            events.push(GestureEvent::confirmed(label, hand, was_interpolated));
        }

        events.push(GestureEvent::default_event(label, hand, was_interpolated));
        events
    }
}
