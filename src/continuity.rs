// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Tracking continuity across brief recognition dropouts.
//!
//! [`TrackingContinuity`] decides, for every incoming frame, whether a ring buffer
//! should write it, hold, bridge a gap with interpolated frames, repeat its last
//! valid frame or reset. It owns only counters and flags; the buffer carries out
//! the returned [`ContinuityStep`].

use std::fmt;

/// What the buffer must do with the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuityStep {
    /// Write the frame, optionally after clearing the buffer and after
    /// synthesizing `interpolate` bridging frames.
    Write { reset_first: bool, interpolate: usize },
    /// Keep the buffer as is; it is still usable.
    Hold,
    /// Repeat the last valid frame.
    CopyLastValid,
    /// Clear the buffer; there is nothing to fall back on.
    Reset,
}

/// Observable continuity state, derived from the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContinuityState {
    /// Writing verified frames.
    Normal,
    /// Hand identity just switched; decision deferred for one frame.
    AwaitingInterpolation,
    /// Holding across a gap that will be interpolated on resume.
    Bridging,
    /// Repeating the last valid frame while tracking is lost.
    CopyingLastValid,
    /// Nothing recognized; the next valid frame starts over.
    Reset,
}

impl ContinuityState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::AwaitingInterpolation => "awaiting-interpolation",
            Self::Bridging => "bridging",
            Self::CopyingLastValid => "copying-last-valid",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for ContinuityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Loss/interpolation/resume state machine for one hand.
#[derive(Debug, Clone)]
pub struct TrackingContinuity {
    max_off_frame: usize,
    off_frame: usize,
    needs_interpolation: bool,
    needs_copy: bool,
    recognized: bool,
}

impl TrackingContinuity {
    #[must_use]
    pub const fn new(max_off_frame: usize) -> Self {
        Self {
            max_off_frame,
            off_frame: 0,
            needs_interpolation: false,
            needs_copy: false,
            recognized: false,
        }
    }

    #[must_use]
    pub const fn max_off_frame(&self) -> usize {
        self.max_off_frame
    }

    pub const fn set_max_off_frame(&mut self, frames: usize) {
        self.max_off_frame = frames;
    }

    /// Consecutive frames since the last written valid frame.
    #[must_use]
    pub const fn off_frame(&self) -> usize {
        self.off_frame
    }

    /// Whether the hand counts as recognized for the caller.
    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        self.recognized
    }

    #[must_use]
    pub const fn state(&self) -> ContinuityState {
        if self.needs_interpolation {
            if self.off_frame <= 1 {
                ContinuityState::AwaitingInterpolation
            } else {
                ContinuityState::Bridging
            }
        } else if self.needs_copy {
            ContinuityState::CopyingLastValid
        } else if self.recognized {
            ContinuityState::Normal
        } else {
            ContinuityState::Reset
        }
    }

    /// Clear the gap flags and counter. Recognition status is kept.
    pub const fn clear(&mut self) {
        self.needs_interpolation = false;
        self.needs_copy = false;
        self.off_frame = 0;
    }

    /// Step for a frame in which this hand is tracked.
    ///
    /// `switched` is true when the frame is attributed to the other hand while a
    /// last valid frame exists.
    pub fn on_tracked(&mut self, switched: bool) -> ContinuityStep {
        let mut reset_first = false;

        if switched {
            if self.needs_copy {
                return self.begin_copy();
            }
            if !self.needs_interpolation {
                self.needs_interpolation = true;
                self.off_frame += 1;
                return ContinuityStep::Hold;
            }
            if self.off_frame < self.max_off_frame {
                self.off_frame += 1;
                return ContinuityStep::Hold;
            }
            self.clear();
            reset_first = true;
        }

        let interpolate = if self.needs_interpolation {
            self.needs_interpolation = false;
            self.off_frame
        } else {
            0
        };

        self.needs_copy = false;
        self.off_frame = 0;
        self.recognized = true;

        ContinuityStep::Write {
            reset_first,
            interpolate,
        }
    }

    /// Step for a frame in which this hand is not tracked.
    pub fn on_lost(&mut self, has_last_valid: bool) -> ContinuityStep {
        if self.needs_interpolation {
            if self.off_frame < self.max_off_frame {
                self.off_frame += 1;
                return ContinuityStep::Hold;
            }
            self.needs_interpolation = false;
            self.recognized = false;
        }

        if self.recognized && has_last_valid {
            return self.begin_copy();
        }

        self.recognized = false;
        ContinuityStep::Reset
    }

    // Copying stops one frame earlier than bridging: the copy that reaches
    // `max_off_frame - 1` is still written but marks the hand unrecognized.
    const fn begin_copy(&mut self) -> ContinuityStep {
        if self.off_frame + 1 < self.max_off_frame {
            self.needs_copy = true;
            self.off_frame += 1;
        } else {
            self.needs_copy = false;
            self.recognized = false;
        }
        ContinuityStep::CopyLastValid
    }
}
