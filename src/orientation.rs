// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Device orientation, recognition mode and the buffer axis remap.
//!
//! Joint coordinates arrive in camera space. Before they enter a ring buffer the
//! x/y axes are swapped and sign-flipped according to a fixed table keyed by
//! device orientation, tracked hand and recognition mode, so the classifier always
//! sees data in one canonical frame.

use std::f32::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

use crate::hand::{Hand, ParseEnumError, Point3};

/// Scale from camera-space meters to buffer units (millimeters).
pub const BUFFER_SCALE: f32 = 1000.0;

/// Physical orientation of the capturing device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceOrientation {
    Portrait,
    PortraitUpsideDown,
    #[default]
    LandscapeLeft,
    LandscapeRight,
}

impl DeviceOrientation {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::PortraitUpsideDown => "portrait-upside-down",
            Self::LandscapeLeft => "landscape-left",
            Self::LandscapeRight => "landscape-right",
        }
    }

    /// Image-plane roll (radians) at which gravity points straight "down" for this orientation.
    #[must_use]
    pub const fn nominal_roll(self) -> f32 {
        match self {
            Self::LandscapeLeft => 0.0,
            Self::Portrait => FRAC_PI_2,
            Self::LandscapeRight => PI,
            Self::PortraitUpsideDown => 3.0 * FRAC_PI_2,
        }
    }
}

impl fmt::Display for DeviceOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeviceOrientation {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "portrait" => Ok(Self::Portrait),
            "portrait-upside-down" | "upside-down" => Ok(Self::PortraitUpsideDown),
            "landscape-left" | "landscape" => Ok(Self::LandscapeLeft),
            "landscape-right" => Ok(Self::LandscapeRight),
            _ => Err(ParseEnumError::new("orientation", s)),
        }
    }
}

/// How the device is held relative to the tracked hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecogMode {
    /// Device held in one hand, camera facing away from the user.
    #[default]
    OneHandHold,
    /// Camera facing the user; mirrors x and inverts depth.
    FaceToFace,
    /// Head-mounted display.
    HeadMount,
}

impl RecogMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneHandHold => "one-hand-hold",
            Self::FaceToFace => "face-to-face",
            Self::HeadMount => "head-mount",
        }
    }
}

impl fmt::Display for RecogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecogMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "one-hand-hold" | "hold" => Ok(Self::OneHandHold),
            "face-to-face" | "face" => Ok(Self::FaceToFace),
            "head-mount" | "hmd" => Ok(Self::HeadMount),
            _ => Err(ParseEnumError::new("recognition mode", s)),
        }
    }
}

/// Fixed axis remap for one (orientation, hand, mode) combination.
///
/// Camera x is written to buffer axis `x_target` scaled by `multipliers[x_target]`,
/// camera y to `y_target` scaled by `multipliers[y_target]`, and depth to axis 2
/// scaled by `depth_scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRemap {
    pub x_target: usize,
    pub y_target: usize,
    pub multipliers: [f32; 2],
    pub depth_scale: f32,
}

impl AxisRemap {
    /// Look up the remap for the given inputs. Pure table lookup.
    #[must_use]
    pub fn new(orientation: DeviceOrientation, hand: Hand, mode: RecogMode) -> Self {
        let (x_target, y_target, mut multipliers) = match orientation {
            DeviceOrientation::LandscapeLeft => (0, 1, [BUFFER_SCALE, BUFFER_SCALE]),
            DeviceOrientation::PortraitUpsideDown => (1, 0, [-BUFFER_SCALE, BUFFER_SCALE]),
            DeviceOrientation::LandscapeRight => (0, 1, [-BUFFER_SCALE, -BUFFER_SCALE]),
            DeviceOrientation::Portrait => (1, 0, [BUFFER_SCALE, -BUFFER_SCALE]),
        };

        if hand == Hand::Left {
            multipliers[0] = -multipliers[0];
        }

        let mut depth_scale = BUFFER_SCALE;
        if mode == RecogMode::FaceToFace {
            multipliers[0] = -multipliers[0];
            depth_scale = -BUFFER_SCALE;
        }

        Self {
            x_target,
            y_target,
            multipliers,
            depth_scale,
        }
    }

    /// Write one camera-space point into a buffer joint triple.
    pub fn apply(&self, point: Point3, out: &mut [f32; 3]) {
        out[self.x_target] = point.x * self.multipliers[self.x_target];
        out[self.y_target] = point.y * self.multipliers[self.y_target];
        out[2] = point.z * self.depth_scale;
    }
}

/// Residual image-plane roll between measured gravity and the orientation's nominal down.
///
/// Result is wrapped into `(-PI, PI]`.
#[must_use]
pub fn gravity_roll(gravity: Point3, orientation: DeviceOrientation) -> f32 {
    let measured = gravity.x.atan2(-gravity.y);
    let mut residual = measured - orientation.nominal_roll();
    while residual > PI {
        residual -= 2.0 * PI;
    }
    while residual <= -PI {
        residual += 2.0 * PI;
    }
    residual
}

/// Rotate `point` about `center` in the x-y plane by `angle` radians.
#[must_use]
pub fn rotate_about(point: Point3, center: Point3, angle: f32) -> Point3 {
    let (sin, cos) = angle.sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point3::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
        point.z,
    )
}
