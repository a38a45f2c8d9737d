// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Window preprocessing for gesture classification.
//!
//! This module samples a gesture window out of a [`RingBuffer`], normalizes each
//! sampled frame against the hand's own extent and flattens the result into the
//! classifier's input row.

#![allow(clippy::cast_precision_loss)]

use ndarray::Array2;

use crate::buffer::{BufferEntry, JOINT_VALUES, RING_BUFFER_SIZE, RingBuffer};
use crate::hand::{CLASSIFIER_JOINTS, HandPoint, Point3};

// ================================================================================================
// Constants
// ================================================================================================

/// Auxiliary values per frame: centroid, palm normal and centroid velocity.
pub const AUX_VALUES: usize = 9;

/// Classifier input values per sampled frame: joints, pose code, auxiliary channels.
pub const FRAME_INPUT_LEN: usize = JOINT_VALUES + 1 + AUX_VALUES;

const SCALE_EPSILON: f32 = 1e-6;

// ================================================================================================
// Window Sampling
// ================================================================================================

/// Sampling layout of one classifier window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureWindow {
    /// Frames fed to the network per inference.
    pub frames_per_gesture: usize,
    /// Buffer entries spanned by the window.
    pub total_samples: usize,
}

impl GestureWindow {
    /// Window spanning `frames_per_gesture` samples spaced `estimation_window` apart.
    #[must_use]
    pub const fn new(frames_per_gesture: usize, estimation_window: usize) -> Self {
        Self {
            frames_per_gesture,
            total_samples: frames_per_gesture * estimation_window,
        }
    }

    /// Buffer entries between consecutive samples.
    #[must_use]
    pub const fn stride(&self) -> usize {
        if self.frames_per_gesture == 0 {
            0
        } else {
            self.total_samples / self.frames_per_gesture
        }
    }

    /// Fewest stored entries that still let every sample land on written data.
    #[must_use]
    pub const fn min_samples(&self) -> usize {
        self.frames_per_gesture.saturating_sub(1) * self.stride() + 1
    }

    /// Ring slots sampled for a window ending just before `window_start`, oldest first.
    #[must_use]
    pub fn indices(&self, window_start: usize) -> Vec<usize> {
        let newest = (window_start + RING_BUFFER_SIZE - 1) % RING_BUFFER_SIZE;
        let stride = self.stride();
        (0..self.frames_per_gesture)
            .map(|k| {
                let back = ((self.frames_per_gesture - 1 - k) * stride) % RING_BUFFER_SIZE;
                (newest + RING_BUFFER_SIZE - back) % RING_BUFFER_SIZE
            })
            .collect()
    }
}

/// Copy the sampled entries of a window ending before `window_start` out of `buffer`, oldest first.
#[must_use]
pub fn extract_window(buffer: &RingBuffer, window_start: usize, window: &GestureWindow) -> Vec<BufferEntry> {
    window
        .indices(window_start)
        .into_iter()
        .filter_map(|idx| buffer.entry(idx).copied())
        .collect()
}

// ================================================================================================
// Normalization
// ================================================================================================

/// One sampled frame, translated to its centroid and scaled to unit extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedFrame {
    pub joints: [f32; JOINT_VALUES],
    /// Pose code of the source entry.
    pub pose_code: f32,
    /// Centroid of the joints in buffer units.
    pub centroid: Point3,
    /// Unit normal of the palm plane, zero when degenerate.
    pub palm_normal: Point3,
}

/// Normalize one buffer entry.
///
/// Joints are translated so their centroid is the origin and divided by the
/// largest joint distance from the centroid (1 when all joints coincide).
#[must_use]
pub fn normalize(entry: &BufferEntry) -> NormalizedFrame {
    let points: [Point3; CLASSIFIER_JOINTS] = std::array::from_fn(|i| entry.joint(i));

    let mut sum = Point3::default();
    for p in &points {
        sum = Point3::new(sum.x + p.x, sum.y + p.y, sum.z + p.z);
    }
    let n = CLASSIFIER_JOINTS as f32;
    let centroid = Point3::new(sum.x / n, sum.y / n, sum.z / n);

    let extent = points
        .iter()
        .map(|p| p.sub(centroid).length())
        .fold(0.0_f32, f32::max);
    let scale = if extent > SCALE_EPSILON { extent } else { 1.0 };

    let mut joints = [0.0; JOINT_VALUES];
    for (i, p) in points.iter().enumerate() {
        let d = p.sub(centroid);
        joints[i * 3] = d.x / scale;
        joints[i * 3 + 1] = d.y / scale;
        joints[i * 3 + 2] = d.z / scale;
    }

    NormalizedFrame {
        joints,
        pose_code: entry.pose.code() as f32,
        centroid,
        palm_normal: palm_normal(&points),
    }
}

fn palm_normal(points: &[Point3; CLASSIFIER_JOINTS]) -> Point3 {
    let center = points[HandPoint::HandCenter.index()];
    let pinky = points[HandPoint::WristPinkySide.index()].sub(center);
    let thumb = points[HandPoint::WristThumbSide.index()].sub(center);
    let normal = pinky.cross(thumb);
    let len = normal.length();
    if len > SCALE_EPSILON {
        Point3::new(normal.x / len, normal.y / len, normal.z / len)
    } else {
        Point3::default()
    }
}

// ================================================================================================
// Flattening
// ================================================================================================

/// Build the `(1, frames * FRAME_INPUT_LEN)` classifier input from sampled entries.
///
/// # Arguments
///
/// * `entries` - Sampled window, oldest first.
/// * `stride` - Buffer entries between consecutive samples.
/// * `fps` - Recognition frame rate, used to express centroid velocity per second.
///
/// # Returns
///
/// A single-row array laid out per frame as joints, pose code, centroid, palm
/// normal and centroid velocity. The first frame's velocity is zero.
#[must_use]
pub fn flatten_window(entries: &[BufferEntry], stride: usize, fps: u32) -> Array2<f32> {
    let mut input = Array2::<f32>::zeros((1, entries.len() * FRAME_INPUT_LEN));
    let dt_scale = fps as f32 / stride.max(1) as f32;
    let mut previous: Option<Point3> = None;

    for (k, entry) in entries.iter().enumerate() {
        let frame = normalize(entry);
        let velocity = previous.map_or(Point3::default(), |prev| {
            let d = frame.centroid.sub(prev);
            Point3::new(d.x * dt_scale, d.y * dt_scale, d.z * dt_scale)
        });
        previous = Some(frame.centroid);

        let base = k * FRAME_INPUT_LEN;
        let mut row = input.row_mut(0);
        for (i, v) in frame.joints.iter().enumerate() {
            row[base + i] = *v;
        }
        let aux = base + JOINT_VALUES;
        row[aux] = frame.pose_code;
        for (j, p) in [frame.centroid, frame.palm_normal, velocity].iter().enumerate() {
            row[aux + 1 + j * 3] = p.x;
            row[aux + 2 + j * 3] = p.y;
            row[aux + 3 + j * 3] = p.z;
        }
    }

    input
}
