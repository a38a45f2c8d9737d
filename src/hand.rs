// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Hand tracking input types.
//!
//! This module defines the per-frame recognition record fed into the gesture
//! pipeline: joint positions for each hand, per-pose confidence levels and the
//! combined handedness classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::argmax;

/// Maximum number of joints tracked per hand.
pub const MAX_JOINTS: usize = 25;

/// Number of joints used for gesture classification.
pub const CLASSIFIER_JOINTS: usize = 14;

/// Number of per-pose confidence levels reported per hand.
pub const POSE_COUNT: usize = 15;

/// A 3D point in camera space (meters).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Linear interpolation from `self` (t = 0) to `other` (t = 1).
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    #[must_use]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[must_use]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl From<[f32; 3]> for Point3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Point3> for [f32; 3] {
    fn from(p: Point3) -> Self {
        [p.x, p.y, p.z]
    }
}

/// Which physical hand(s) a recognition frame represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    /// Right hand only.
    Right,
    /// Left hand only.
    Left,
    /// No hand in view.
    #[default]
    NoHand,
    /// Fingertip only.
    Tip,
    /// Both hands.
    BothHands,
    /// Recognition could not decide.
    Unknown,
}

impl Handedness {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Right => "right",
            Self::Left => "left",
            Self::NoHand => "no_hand",
            Self::Tip => "tip",
            Self::BothHands => "both_hands",
            Self::Unknown => "unknown",
        }
    }

    /// Returns whether the frame carries data for at least one hand.
    #[must_use]
    pub const fn has_hand(&self) -> bool {
        matches!(self, Self::Right | Self::Left | Self::BothHands)
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Handedness {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "right" | "right_hand" => Ok(Self::Right),
            "left" | "left_hand" => Ok(Self::Left),
            "none" | "no_hand" => Ok(Self::NoHand),
            "tip" => Ok(Self::Tip),
            "both" | "both_hands" => Ok(Self::BothHands),
            "unknown" => Ok(Self::Unknown),
            _ => Err(ParseEnumError::new("handedness", s)),
        }
    }
}

/// The hand a ring buffer or debouncer tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub const BOTH: [Self; 2] = [Self::Left, Self::Right];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    #[must_use]
    pub const fn handedness(self) -> Handedness {
        match self {
            Self::Left => Handedness::Left,
            Self::Right => Handedness::Right,
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hand attribution of an emitted gesture event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureHand {
    #[default]
    Unknown,
    Right,
    Left,
    BothHands,
}

impl GestureHand {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Right => "right",
            Self::Left => "left",
            Self::BothHands => "both",
        }
    }

    /// Returns whether an event for this hand concerns `hand`.
    #[must_use]
    pub fn covers(self, hand: Hand) -> bool {
        match self {
            Self::BothHands => true,
            Self::Left => hand == Hand::Left,
            Self::Right => hand == Hand::Right,
            Self::Unknown => false,
        }
    }
}

impl From<Hand> for GestureHand {
    fn from(hand: Hand) -> Self {
        match hand {
            Hand::Left => Self::Left,
            Hand::Right => Self::Right,
        }
    }
}

impl fmt::Display for GestureHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Joint indices within a hand's point array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum HandPoint {
    PinkyTip,
    PinkyJoint,
    RingTip,
    RingJoint,
    MidTip,
    MidJoint,
    IndexTip,
    IndexJoint,
    ThumbTip,
    ThumbJoint,
    ThumbRoot,
    WristPinkySide,
    WristThumbSide,
    /// Anchor joint: non-positive depth means the hand was not measured.
    HandCenter,
    ArmCenter,
    PinkyRoot,
    RingRoot,
    MidRoot,
    IndexRoot,
    Wrist,
    PinkyJoint1st,
    RingJoint1st,
    MidJoint1st,
    IndexJoint1st,
    ThumbRootWrist,
}

impl HandPoint {
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Static hand pose, derived from the per-pose confidence levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PoseIndex {
    Fist,
    Shot,
    Peace,
    ThumbIn,
    PinkyOut,
    OpenPalm,
    Pistol,
    Ok,
    MiddleAndRingIn,
    ThreeFingers,
    ThumbUp,
    Tel,
    Fox,
    PreSnap,
    Heart,
    /// No pose recognized.
    #[default]
    NoPose,
}

impl PoseIndex {
    const ALL: [Self; POSE_COUNT] = [
        Self::Fist,
        Self::Shot,
        Self::Peace,
        Self::ThumbIn,
        Self::PinkyOut,
        Self::OpenPalm,
        Self::Pistol,
        Self::Ok,
        Self::MiddleAndRingIn,
        Self::ThreeFingers,
        Self::ThumbUp,
        Self::Tel,
        Self::Fox,
        Self::PreSnap,
        Self::Heart,
    ];

    /// Pose for a confidence-level index, `NoPose` when out of range.
    #[must_use]
    pub fn from_index(idx: usize) -> Self {
        Self::ALL.get(idx).copied().unwrap_or(Self::NoPose)
    }

    /// Numeric code written into the classifier input (999 for `NoPose`).
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::NoPose => 999,
            other => other as u32,
        }
    }

    /// Pick the most confident pose; `NoPose` when no level is positive.
    #[must_use]
    pub fn from_levels(levels: &[f32]) -> Self {
        match argmax(levels) {
            Some((idx, level)) if level > 0.0 => Self::from_index(idx),
            _ => Self::NoPose,
        }
    }
}

/// Joint positions and pose confidences for one hand in one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandJoints {
    /// Joint positions in camera space (meters), indexed by [`HandPoint`].
    #[serde(default)]
    pub points: Vec<Point3>,
    /// Per-pose confidence levels, indexed by [`PoseIndex`].
    #[serde(default)]
    pub pose_levels: Vec<f32>,
}

impl HandJoints {
    #[must_use]
    pub const fn new(points: Vec<Point3>, pose_levels: Vec<f32>) -> Self {
        Self {
            points,
            pose_levels,
        }
    }

    /// Whether the anchor joint was measured (present with positive depth).
    #[must_use]
    pub fn is_tracked(&self) -> bool {
        self.points
            .get(HandPoint::HandCenter.index())
            .is_some_and(|p| p.z > 0.0)
    }

    #[must_use]
    pub fn pose(&self) -> PoseIndex {
        PoseIndex::from_levels(&self.pose_levels)
    }

    /// Joint `idx`, or the origin when the recognizer supplied fewer joints.
    #[must_use]
    pub fn point(&self, idx: usize) -> Point3 {
        self.points.get(idx).copied().unwrap_or_default()
    }
}

/// One recognition result: both hands plus the combined handedness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointFrame {
    pub handedness: Handedness,
    #[serde(default)]
    pub left: HandJoints,
    #[serde(default)]
    pub right: HandJoints,
    /// Accelerometer gravity vector in camera space, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravity: Option<Point3>,
}

impl JointFrame {
    #[must_use]
    pub const fn new(handedness: Handedness, left: HandJoints, right: HandJoints) -> Self {
        Self {
            handedness,
            left,
            right,
            gravity: None,
        }
    }

    /// A frame with no hand in view.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_gravity(mut self, gravity: Point3) -> Self {
        self.gravity = Some(gravity);
        self
    }

    #[must_use]
    pub const fn hand(&self, hand: Hand) -> &HandJoints {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }
}

/// Error returned when parsing an invalid enum string.
#[derive(Debug, Clone)]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}
