// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pipeline configuration.
//!
//! This module defines the [`GestureConfig`] struct, which controls the continuity
//! tolerance, debounce policy, frame rate and coordinate conventions of the gesture
//! pipeline.

use std::fmt;

use crate::error::{GestureError, Result};
use crate::gesture::{GESTURE_COUNT, GestureLabel, default_cooldowns, default_mask};
use crate::orientation::{DeviceOrientation, RecogMode};

/// Recognition frame rate, which also fixes the estimation window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameRateMode {
    /// 30 FPS, estimation window of 4.
    #[default]
    Standard,
    /// 15 FPS, estimation window of 2.
    Reduced,
}

impl FrameRateMode {
    /// Mode for a frames-per-second value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for anything other than 30 or 15.
    pub fn from_fps(fps: u32) -> Result<Self> {
        match fps {
            30 => Ok(Self::Standard),
            15 => Ok(Self::Reduced),
            other => Err(GestureError::ConfigError(format!(
                "unsupported frame rate {other} (expected 30 or 15)"
            ))),
        }
    }

    #[must_use]
    pub const fn fps(self) -> u32 {
        match self {
            Self::Standard => 30,
            Self::Reduced => 15,
        }
    }

    /// Number of recent labels the debouncer votes over, and the sampling stride.
    #[must_use]
    pub const fn estimation_window(self) -> usize {
        match self {
            Self::Standard => 4,
            Self::Reduced => 2,
        }
    }
}

impl fmt::Display for FrameRateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fps", self.fps())
    }
}

/// Configuration for the gesture pipeline.
///
/// Uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use hand_gesture_inference::{DeviceOrientation, FrameRateMode, GestureConfig};
///
/// let config = GestureConfig::new()
///     .with_max_off_frame(2)
///     .with_threshold(0.5)
///     .with_frame_rate(FrameRateMode::Reduced)
///     .with_orientation(DeviceOrientation::Portrait);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Number of consecutive lost frames bridged before a buffer resets.
    pub max_off_frame: usize,
    /// Fraction of the label window that must agree before a gesture is confirmed.
    pub threshold: f32,
    /// Recognition frame rate.
    pub frame_rate: FrameRateMode,
    /// Device orientation used for axis remapping.
    pub orientation: DeviceOrientation,
    /// Recognition mode used for axis remapping.
    pub recog_mode: RecogMode,
    /// Rotate joints to cancel device roll when a frame carries gravity.
    pub adjust_by_gravity: bool,
    /// Start estimation as soon as the pipeline is built.
    pub auto_start: bool,
    /// Per-label re-trigger interval in seconds.
    pub cooldowns: [f32; GESTURE_COUNT],
    /// Per-label enable mask for confirmed events.
    pub mask: [bool; GESTURE_COUNT],
    /// Number of intra-op threads for ONNX Runtime.
    /// Setting this to `0` allows ONNX Runtime to choose.
    pub num_threads: usize,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            max_off_frame: 1,
            threshold: 0.75,
            frame_rate: FrameRateMode::Standard,
            orientation: DeviceOrientation::LandscapeLeft,
            recog_mode: RecogMode::OneHandHold,
            adjust_by_gravity: true,
            auto_start: false,
            cooldowns: default_cooldowns(),
            mask: default_mask(),
            num_threads: 0,
        }
    }
}

impl GestureConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lost-frame tolerance.
    ///
    /// # Arguments
    ///
    /// * `frames` - Consecutive lost frames bridged by interpolation or copy.
    #[must_use]
    pub const fn with_max_off_frame(mut self, frames: usize) -> Self {
        self.max_off_frame = frames;
        self
    }

    /// Set the debounce vote threshold.
    ///
    /// # Arguments
    ///
    /// * `threshold` - Fraction of the window in (0.0, 1.0].
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_frame_rate(mut self, mode: FrameRateMode) -> Self {
        self.frame_rate = mode;
        self
    }

    #[must_use]
    pub const fn with_orientation(mut self, orientation: DeviceOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub const fn with_recog_mode(mut self, mode: RecogMode) -> Self {
        self.recog_mode = mode;
        self
    }

    #[must_use]
    pub const fn with_adjust_by_gravity(mut self, enabled: bool) -> Self {
        self.adjust_by_gravity = enabled;
        self
    }

    #[must_use]
    pub const fn with_auto_start(mut self, enabled: bool) -> Self {
        self.auto_start = enabled;
        self
    }

    /// Set the re-trigger interval for one label.
    ///
    /// # Arguments
    ///
    /// * `label` - Gesture whose cooldown changes.
    /// * `seconds` - Minimum time before the same gesture confirms again.
    #[must_use]
    pub const fn with_cooldown(mut self, label: GestureLabel, seconds: f32) -> Self {
        self.cooldowns[label.index()] = seconds;
        self
    }

    /// Enable or disable confirmed events for one label.
    #[must_use]
    pub const fn with_enabled(mut self, label: GestureLabel, enabled: bool) -> Self {
        self.mask[label.index()] = enabled;
        self
    }

    /// Set the number of threads for inference.
    ///
    /// # Arguments
    ///
    /// * `threads` - The number of intra-op threads. Set to `0` for auto-configuration.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Check that all values are in range.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the threshold is outside (0, 1] or any cooldown
    /// is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(GestureError::ConfigError(format!(
                "threshold must be in (0, 1], got {}",
                self.threshold
            )));
        }
        if let Some((idx, value)) = self
            .cooldowns
            .iter()
            .enumerate()
            .find(|(_, c)| !c.is_finite() || **c < 0.0)
        {
            return Err(GestureError::ConfigError(format!(
                "cooldown for '{}' must be a non-negative number of seconds, got {value}",
                GestureLabel::from_index(idx)
            )));
        }
        Ok(())
    }

    /// Votes needed in a window of `window` labels: `ceil(threshold * window)`.
    #[must_use]
    pub fn required_votes(&self, window: usize) -> usize {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let votes = (self.threshold * window as f32 - 1e-4).ceil() as usize;
        votes.max(1)
    }
}
