// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Gesture label definitions.
//!
//! This module defines the discrete labels the gesture classifier emits,
//! along with the default per-label notification policy.

use std::fmt;
use std::str::FromStr;

use crate::hand::ParseEnumError;

/// Number of gesture labels the classifier distinguishes.
pub const GESTURE_COUNT: usize = 25;

/// Gesture labels, in classifier output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureLabel {
    /// No gesture.
    #[default]
    None,
    /// Unclassified motion. Never confirmed; reported as `None`.
    Others,
    Bloom,
    AirTap,
    SnapFinger,
    FingerThrow,
    HandThrow,
    Shoot,
    Punch,
    Milk,
    Bye,
    HandSwipe,
    ThumbTap,
    TurnKnob,
    Finish,
    Eat,
    Twinkle,
    Hobby,
    Beard,
    Nose,
    ComeOn,
    Flick,
    Darts,
    Chop,
    ReverseSwipe,
}

impl GestureLabel {
    /// All labels in classifier output order.
    pub const ALL: [Self; GESTURE_COUNT] = [
        Self::None,
        Self::Others,
        Self::Bloom,
        Self::AirTap,
        Self::SnapFinger,
        Self::FingerThrow,
        Self::HandThrow,
        Self::Shoot,
        Self::Punch,
        Self::Milk,
        Self::Bye,
        Self::HandSwipe,
        Self::ThumbTap,
        Self::TurnKnob,
        Self::Finish,
        Self::Eat,
        Self::Twinkle,
        Self::Hobby,
        Self::Beard,
        Self::Nose,
        Self::ComeOn,
        Self::Flick,
        Self::Darts,
        Self::Chop,
        Self::ReverseSwipe,
    ];

    /// Label for a classifier output index. Indices past the label set map to `Others`.
    #[must_use]
    pub fn from_index(idx: usize) -> Self {
        Self::ALL.get(idx).copied().unwrap_or(Self::Others)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Others => "others",
            Self::Bloom => "bloom",
            Self::AirTap => "air-tap",
            Self::SnapFinger => "snap-finger",
            Self::FingerThrow => "finger-throw",
            Self::HandThrow => "hand-throw",
            Self::Shoot => "shoot",
            Self::Punch => "punch",
            Self::Milk => "milk",
            Self::Bye => "bye",
            Self::HandSwipe => "hand-swipe",
            Self::ThumbTap => "thumb-tap",
            Self::TurnKnob => "turn-knob",
            Self::Finish => "finish",
            Self::Eat => "eat",
            Self::Twinkle => "twinkle",
            Self::Hobby => "hobby",
            Self::Beard => "beard",
            Self::Nose => "nose",
            Self::ComeOn => "come-on",
            Self::Flick => "flick",
            Self::Darts => "darts",
            Self::Chop => "chop",
            Self::ReverseSwipe => "reverse-swipe",
        }
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GestureLabel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == normalized || label.as_str().replace('-', "") == normalized)
            .ok_or_else(|| ParseEnumError::new("gesture", s))
    }
}

/// Default re-trigger interval (seconds) per label.
///
/// Tap-like gestures repeat faster than sweeping ones.
#[must_use]
pub const fn default_cooldowns() -> [f32; GESTURE_COUNT] {
    let mut table = [0.5; GESTURE_COUNT];
    table[GestureLabel::AirTap as usize] = 0.2;
    table[GestureLabel::ThumbTap as usize] = 0.2;
    table[GestureLabel::ComeOn as usize] = 0.2;
    table
}

/// Default enable mask per label. `Milk` and `Bye` are disabled.
#[must_use]
pub const fn default_mask() -> [bool; GESTURE_COUNT] {
    let mut mask = [true; GESTURE_COUNT];
    mask[GestureLabel::Milk as usize] = false;
    mask[GestureLabel::Bye as usize] = false;
    mask
}
