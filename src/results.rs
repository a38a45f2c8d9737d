// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Result types produced by the gesture pipeline.
//!
//! Classifier outputs are wrapped in [`GestureScores`] and [`Classification`];
//! debounced outputs are delivered as [`GestureEvent`]s, and every forward pass
//! also produces a [`BufferReadEvent`].

use std::fmt;

use ndarray::Array1;

use crate::gesture::GestureLabel;
use crate::hand::{GestureHand, Hand};
use crate::utils::argmax;

/// Timing information for one classification (in milliseconds).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Speed {
    /// Time spent sampling and normalizing the window.
    pub preprocess: Option<f64>,
    /// Time spent in the forward pass.
    pub inference: Option<f64>,
    /// Time spent reducing scores to a label.
    pub postprocess: Option<f64>,
}

impl Speed {
    /// Create a new Speed instance with all timings.
    ///
    /// # Arguments
    ///
    /// * `preprocess` - Time in milliseconds.
    /// * `inference` - Time in milliseconds.
    /// * `postprocess` - Time in milliseconds.
    #[must_use]
    pub const fn new(preprocess: f64, inference: f64, postprocess: f64) -> Self {
        Self {
            preprocess: Some(preprocess),
            inference: Some(inference),
            postprocess: Some(postprocess),
        }
    }

    /// Sum of preprocess, inference, and postprocess times in milliseconds.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.preprocess.unwrap_or(0.0)
            + self.inference.unwrap_or(0.0)
            + self.postprocess.unwrap_or(0.0)
    }
}

/// Per-label scores from one forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureScores {
    /// Probability per label index, shape (`num_labels`,).
    pub data: Array1<f32>,
}

impl GestureScores {
    #[must_use]
    pub const fn new(data: Array1<f32>) -> Self {
        Self { data }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Index of the highest score, `None` when there are no finite scores.
    #[must_use]
    pub fn top1(&self) -> Option<usize> {
        argmax(self.data.as_slice()?).map(|(i, _)| i)
    }

    /// Highest score, 0.0 when empty.
    #[must_use]
    pub fn top1conf(&self) -> f32 {
        self.top1().map_or(0.0, |i| self.data[i])
    }

    /// Indices of the `k` highest scores, best first.
    #[must_use]
    pub fn top_k(&self, k: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.data.len()).collect();
        indices.sort_by(|&a, &b| self.data[b].total_cmp(&self.data[a]));
        indices.truncate(k);
        indices
    }

    /// Label of the highest score. Indices past the label set map to `Others`.
    #[must_use]
    pub fn label(&self) -> GestureLabel {
        self.top1().map_or(GestureLabel::None, GestureLabel::from_index)
    }
}

/// Outcome of one classifier forward pass for one hand.
#[derive(Debug, Clone)]
pub struct Classification {
    pub hand: Hand,
    pub label: GestureLabel,
    pub scores: GestureScores,
    pub speed: Speed,
}

/// Whether an event is the per-cycle state update or a debounced trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Emitted every cycle with the raw (unconfirmed) label.
    Default,
    /// Emitted only when a gesture passes the debounce policy.
    Confirmed,
}

/// A gesture notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureEvent {
    pub kind: EventKind,
    pub label: GestureLabel,
    pub hand: GestureHand,
    /// The window that produced this label contained synthesized frames.
    pub was_interpolated: bool,
}

impl GestureEvent {
    /// A default event. `Others` is reported as `None`.
    #[must_use]
    pub fn default_event(label: GestureLabel, hand: GestureHand, was_interpolated: bool) -> Self {
        let label = if label == GestureLabel::Others {
            GestureLabel::None
        } else {
            label
        };
        Self {
            kind: EventKind::Default,
            label,
            hand,
            was_interpolated,
        }
    }

    #[must_use]
    pub const fn confirmed(label: GestureLabel, hand: GestureHand, was_interpolated: bool) -> Self {
        Self {
            kind: EventKind::Confirmed,
            label,
            hand,
            was_interpolated,
        }
    }

    /// The event emitted when no hand is tracked at all.
    #[must_use]
    pub const fn nothing_tracked() -> Self {
        Self {
            kind: EventKind::Default,
            label: GestureLabel::None,
            hand: GestureHand::Unknown,
            was_interpolated: false,
        }
    }

    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.kind == EventKind::Confirmed
    }
}

impl fmt::Display for GestureEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_confirmed() { "confirmed" } else { "default" };
        write!(f, "{kind} {} ({} hand)", self.label, self.hand)?;
        if self.was_interpolated {
            write!(f, " [interpolated]")?;
        }
        Ok(())
    }
}

/// Notification that the classifier read a window out of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferReadEvent {
    /// Hand that was read. Only this hand's listeners receive the event.
    pub buffer: Hand,
    /// Handedness of the frame that triggered the read (`BothHands` when both hands were tracked).
    pub hand: GestureHand,
    /// Write index of `buffer` at the time of the read.
    pub top_index: usize,
    pub frames_per_gesture: usize,
    pub total_samples: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_total() {
        let speed = Speed::new(1.0, 2.5, 0.5);
        assert!((speed.total() - 4.0).abs() < f64::EPSILON);
        assert!(Speed::default().total().abs() < f64::EPSILON);
    }

    #[test]
    fn test_scores_top() {
        let scores = GestureScores::new(Array1::from_vec(vec![0.1, 0.6, 0.3]));
        assert_eq!(scores.top1(), Some(1));
        assert!((scores.top1conf() - 0.6).abs() < f32::EPSILON);
        assert_eq!(scores.top_k(2), vec![1, 2]);
        assert_eq!(scores.label(), GestureLabel::Others);
    }

    #[test]
    fn test_scores_label_out_of_range() {
        let mut data = vec![0.0; 30];
        data[27] = 1.0;
        assert_eq!(GestureScores::new(Array1::from_vec(data)).label(), GestureLabel::Others);
        assert_eq!(GestureScores::new(Array1::from_vec(vec![])).label(), GestureLabel::None);
    }

    #[test]
    fn test_default_event_reports_others_as_none() {
        let event = GestureEvent::default_event(GestureLabel::Others, GestureHand::Left, false);
        assert_eq!(event.label, GestureLabel::None);
        assert!(!event.is_confirmed());

        let confirmed = GestureEvent::confirmed(GestureLabel::Punch, GestureHand::Right, true);
        assert!(confirmed.is_confirmed());
        assert_eq!(confirmed.to_string(), "confirmed punch (right hand) [interpolated]");
    }
}
