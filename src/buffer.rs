// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Per-hand ring buffer of orientation-normalized joint data.
//!
//! Each [`RingBuffer`] keeps the most recent [`RING_BUFFER_SIZE`] frames for one
//! hand. Incoming frames pass through the [`TrackingContinuity`] policy, an optional
//! gravity tilt correction and the fixed [`AxisRemap`] before they are stored.

use tracing::debug;

use crate::continuity::{ContinuityState, ContinuityStep, TrackingContinuity};
use crate::hand::{CLASSIFIER_JOINTS, Hand, HandJoints, HandPoint, Handedness, JointFrame, Point3, PoseIndex};
use crate::orientation::{AxisRemap, DeviceOrientation, RecogMode, gravity_roll, rotate_about};

/// Number of frames each ring buffer holds.
pub const RING_BUFFER_SIZE: usize = 60;

/// Scalar values per stored frame: x, y, z for each classifier joint.
pub const JOINT_VALUES: usize = CLASSIFIER_JOINTS * 3;

/// One stored frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferEntry {
    /// Remapped joint triples, `[x0, y0, z0, x1, ...]`.
    pub joints: [f32; JOINT_VALUES],
    pub pose: PoseIndex,
    /// Synthesized by interpolation or copied from the last valid frame.
    pub interpolated: bool,
}

impl Default for BufferEntry {
    fn default() -> Self {
        Self {
            joints: [0.0; JOINT_VALUES],
            pose: PoseIndex::NoPose,
            interpolated: false,
        }
    }
}

impl BufferEntry {
    /// Joint `idx` as a point.
    #[must_use]
    pub fn joint(&self, idx: usize) -> Point3 {
        let base = idx * 3;
        Point3::new(self.joints[base], self.joints[base + 1], self.joints[base + 2])
    }
}

/// Pending request to run gesture estimation on the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimationRequest {
    pub handedness: Handedness,
    pub was_interpolated: bool,
}

/// Fixed-capacity circular buffer for one hand.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    hand: Hand,
    slots: Box<[BufferEntry]>,
    top_index: usize,
    data_count: usize,
    continuity: TrackingContinuity,
    last_valid: Option<JointFrame>,
    pending: Option<EstimationRequest>,
    orientation: DeviceOrientation,
    recog_mode: RecogMode,
    adjust_by_gravity: bool,
}

impl RingBuffer {
    /// Create an empty buffer for `hand`.
    ///
    /// # Arguments
    ///
    /// * `hand` - The hand this buffer tracks.
    /// * `max_off_frame` - Lost-frame tolerance of the continuity policy.
    #[must_use]
    pub fn new(hand: Hand, max_off_frame: usize) -> Self {
        Self {
            hand,
            slots: vec![BufferEntry::default(); RING_BUFFER_SIZE].into_boxed_slice(),
            top_index: 0,
            data_count: 0,
            continuity: TrackingContinuity::new(max_off_frame),
            last_valid: None,
            pending: None,
            orientation: DeviceOrientation::default(),
            recog_mode: RecogMode::default(),
            adjust_by_gravity: true,
        }
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
    pub const fn hand(&self) -> Hand {
        self.hand
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        RING_BUFFER_SIZE
    }

    /// Slot the next write goes to.
    #[must_use]
    pub const fn top_index(&self) -> usize {
        self.top_index
    }

    #[must_use]
    pub const fn data_count(&self) -> usize {
        self.data_count
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data_count == 0
    }

    #[must_use]
    pub fn entry(&self, idx: usize) -> Option<&BufferEntry> {
        self.slots.get(idx)
    }

    /// Most recently written entry.
    #[must_use]
    pub fn latest(&self) -> Option<&BufferEntry> {
        if self.data_count == 0 {
            return None;
        }
        self.slots.get((self.top_index + RING_BUFFER_SIZE - 1) % RING_BUFFER_SIZE)
    }

    #[must_use]
    pub const fn last_valid(&self) -> Option<&JointFrame> {
        self.last_valid.as_ref()
    }

    #[must_use]
    pub const fn continuity_state(&self) -> ContinuityState {
        self.continuity.state()
    }

    #[must_use]
    pub const fn orientation(&self) -> DeviceOrientation {
        self.orientation
    }

    /// Change the device orientation. Stored data is cleared when it changes.
    pub fn set_orientation(&mut self, orientation: DeviceOrientation) {
        if self.orientation != orientation {
            self.orientation = orientation;
            self.reset();
        }
    }

    pub const fn set_recog_mode(&mut self, mode: RecogMode) {
        self.recog_mode = mode;
    }

    pub const fn set_adjust_by_gravity(&mut self, enabled: bool) {
        self.adjust_by_gravity = enabled;
    }

    pub const fn set_max_off_frame(&mut self, frames: usize) {
        self.continuity.set_max_off_frame(frames);
    }

    /// Take the estimation request raised by the last successful fill, if any.
    pub fn take_estimation_request(&mut self) -> Option<EstimationRequest> {
        self.pending.take()
    }

    /// Feed one recognition frame through the continuity policy.
    ///
    /// # Returns
    ///
    /// `false` when the buffer was reset and holds nothing usable; the caller
    /// must skip inference for this cycle.
    pub fn fill(&mut self, frame: &JointFrame) -> bool {
        let lost = !frame.handedness.has_hand() || !frame.hand(self.hand).is_tracked();

        let step = if lost {
            self.continuity.on_lost(self.last_valid.is_some())
        } else {
            let switched = frame.handedness != Handedness::BothHands
                && frame.handedness != self.hand.handedness()
                && self.last_valid.is_some();
            self.continuity.on_tracked(switched)
        };

        match step {
            ContinuityStep::Hold => true,
            ContinuityStep::CopyLastValid => {
                self.copy_from_last_valid();
                true
            }
            ContinuityStep::Reset => {
                if self.data_count > 0 {
                    debug!(hand = %self.hand, "tracking lost, buffer reset");
                }
                self.reset();
                self.last_valid = None;
                false
            }
            ContinuityStep::Write {
                reset_first,
                interpolate,
            } => {
                if reset_first {
                    debug!(hand = %self.hand, "hand switched beyond tolerance, buffer reset");
                    self.reset();
                }
                self.write_tracked(frame, interpolate);
                true
            }
        }
    }

    /// Zero all slots and clear the continuity flags. The last valid frame is kept.
    pub fn reset(&mut self) {
        self.slots.fill(BufferEntry::default());
        self.top_index = 0;
        self.data_count = 0;
        self.continuity.clear();
    }

    #[allow(clippy::cast_precision_loss)]
    fn write_tracked(&mut self, frame: &JointFrame, interpolate: usize) {
        let current = frame.hand(self.hand);
        let current_points = classifier_points(current);

        if interpolate > 0
            && let Some(last) = self.last_valid.take()
        {
            let last_joints = last.hand(self.hand);
            let last_points = classifier_points(last_joints);
            let pose = last_joints.pose();
            debug!(hand = %self.hand, frames = interpolate, "bridging gap with interpolated frames");

            for j in 0..interpolate {
                let t = (j + 1) as f32 / (interpolate + 1) as f32;
                let points: [Point3; CLASSIFIER_JOINTS] =
                    std::array::from_fn(|i| last_points[i].lerp(current_points[i], t));
                self.write_entry(&points, pose, frame.gravity, true);
            }
        }

        self.write_entry(&current_points, current.pose(), frame.gravity, false);
        self.pending = Some(EstimationRequest {
            handedness: frame.handedness,
            was_interpolated: interpolate > 0,
        });
        self.last_valid = Some(frame.clone());
    }

    fn copy_from_last_valid(&mut self) {
        let Some(last) = self.last_valid.take() else {
            return;
        };
        debug!(hand = %self.hand, off_frame = self.continuity.off_frame(), "repeating last valid frame");

        let joints = last.hand(self.hand);
        self.write_entry(&classifier_points(joints), joints.pose(), last.gravity, true);
        self.pending = Some(EstimationRequest {
            handedness: last.handedness,
            was_interpolated: true,
        });
        self.last_valid = Some(last);
    }

    fn write_entry(
        &mut self,
        points: &[Point3; CLASSIFIER_JOINTS],
        pose: PoseIndex,
        gravity: Option<Point3>,
        interpolated: bool,
    ) {
        let roll = match gravity {
            Some(g) if self.adjust_by_gravity => gravity_roll(g, self.orientation),
            _ => 0.0,
        };
        let center = points[HandPoint::HandCenter.index()];
        let remap = AxisRemap::new(self.orientation, self.hand, self.recog_mode);

        let mut entry = BufferEntry {
            pose,
            interpolated,
            ..BufferEntry::default()
        };
        for (i, &point) in points.iter().enumerate() {
            let point = if roll == 0.0 {
                point
            } else {
                rotate_about(point, center, -roll)
            };
            let mut triple = [0.0; 3];
            remap.apply(point, &mut triple);
            entry.joints[i * 3..i * 3 + 3].copy_from_slice(&triple);
        }

        self.slots[self.top_index] = entry;
        self.top_index = (self.top_index + 1) % RING_BUFFER_SIZE;
        self.data_count = (self.data_count + 1).min(RING_BUFFER_SIZE);
    }
}

fn classifier_points(joints: &HandJoints) -> [Point3; CLASSIFIER_JOINTS] {
    std::array::from_fn(|i| joints.point(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::POSE_COUNT;

    fn hand_at(x: f32, pose: usize) -> HandJoints {
        let mut levels = vec![0.0; POSE_COUNT];
        levels[pose] = 1.0;
        HandJoints::new(vec![Point3::new(x, 0.0, 0.4); CLASSIFIER_JOINTS], levels)
    }

    fn right_frame(x: f32) -> JointFrame {
        JointFrame::new(Handedness::Right, HandJoints::default(), hand_at(x, 0))
    }

    /// Right hand data present but attributed to the left hand.
    fn switched_frame(x: f32) -> JointFrame {
        JointFrame::new(Handedness::Left, HandJoints::default(), hand_at(x, 0))
    }

    #[test]
    fn test_count_saturates_at_capacity() {
        let mut buffer = RingBuffer::new(Hand::Right, 1);
        let mut previous = 0;
        for i in 0..100 {
            assert!(buffer.fill(&right_frame(0.001 * i as f32)));
            assert!(buffer.data_count() >= previous);
            assert!(buffer.data_count() <= RING_BUFFER_SIZE);
            previous = buffer.data_count();
        }
        assert_eq!(buffer.data_count(), RING_BUFFER_SIZE);
        assert_eq!(buffer.top_index(), 100 % RING_BUFFER_SIZE);
    }

    #[test]
    fn test_write_applies_axis_remap() {
        let mut buffer = RingBuffer::new(Hand::Right, 1);
        assert!(buffer.fill(&right_frame(0.1)));
        let entry = buffer.latest().unwrap();
        assert!((entry.joints[0] - 100.0).abs() < 1e-3);
        assert!((entry.joints[2] - 400.0).abs() < 1e-3);
        assert_eq!(entry.pose, PoseIndex::Fist);
        assert!(!entry.interpolated);

        let request = buffer.take_estimation_request().unwrap();
        assert_eq!(request.handedness, Handedness::Right);
        assert!(!request.was_interpolated);
        assert!(buffer.take_estimation_request().is_none());
    }

    #[test]
    fn test_one_frame_gap_interpolates_midpoint() {
        let mut buffer = RingBuffer::new(Hand::Right, 1);
        buffer.fill(&right_frame(0.1));
        buffer.take_estimation_request();

        assert!(buffer.fill(&switched_frame(0.5)));
        assert_eq!(buffer.data_count(), 1);
        assert!(buffer.take_estimation_request().is_none());

        assert!(buffer.fill(&right_frame(0.3)));
        assert_eq!(buffer.data_count(), 3);

        let mid = buffer.entry(1).unwrap();
        assert!(mid.interpolated);
        assert!((mid.joints[0] - 200.0).abs() < 1e-3);
        let real = buffer.entry(2).unwrap();
        assert!(!real.interpolated);
        assert!((real.joints[0] - 300.0).abs() < 1e-3);

        assert!(buffer.take_estimation_request().unwrap().was_interpolated);
    }

    fn assert_bridged(buffer: &mut RingBuffer) {
        assert_eq!(buffer.data_count(), 4);
        for (slot, x) in [(1, 100.0), (2, 200.0)] {
            let entry = buffer.entry(slot).unwrap();
            assert!(entry.interpolated);
            assert_eq!(entry.pose, PoseIndex::Fist);
            assert!((entry.joints[0] - x).abs() < 1e-2);
        }
        let real = buffer.entry(3).unwrap();
        assert!(!real.interpolated);
        assert!((real.joints[0] - 300.0).abs() < 1e-2);

        assert!(buffer.take_estimation_request().unwrap().was_interpolated);
        assert!(buffer.take_estimation_request().is_none());
    }

    #[test]
    fn test_two_frame_gap_interpolates_thirds() {
        let mut buffer = RingBuffer::new(Hand::Right, 3);
        buffer.fill(&right_frame(0.0));
        buffer.take_estimation_request();

        for _ in 0..2 {
            assert!(buffer.fill(&switched_frame(0.9)));
            assert!(buffer.take_estimation_request().is_none());
        }
        assert_eq!(buffer.data_count(), 1);
        assert_eq!(buffer.continuity_state(), ContinuityState::Bridging);

        assert!(buffer.fill(&right_frame(0.3)));
        assert_eq!(buffer.continuity_state(), ContinuityState::Normal);
        assert_bridged(&mut buffer);
    }

    #[test]
    fn test_lost_frame_while_bridging_extends_gap() {
        let mut buffer = RingBuffer::new(Hand::Right, 3);
        buffer.fill(&right_frame(0.0));
        buffer.take_estimation_request();

        assert!(buffer.fill(&switched_frame(0.9)));
        assert_eq!(buffer.continuity_state(), ContinuityState::AwaitingInterpolation);
        assert!(buffer.fill(&JointFrame::empty()));
        assert_eq!(buffer.continuity_state(), ContinuityState::Bridging);
        assert_eq!(buffer.data_count(), 1);
        assert!(buffer.take_estimation_request().is_none());

        assert!(buffer.fill(&right_frame(0.3)));
        assert_bridged(&mut buffer);
    }

    #[test]
    fn test_lost_frame_copies_last_valid() {
        let mut buffer = RingBuffer::new(Hand::Right, 2);
        buffer.fill(&right_frame(0.1));

        assert!(buffer.fill(&JointFrame::empty()));
        assert_eq!(buffer.data_count(), 2);
        let copy = buffer.latest().unwrap();
        assert!(copy.interpolated);
        assert!((copy.joints[0] - 100.0).abs() < 1e-3);
        assert_eq!(buffer.continuity_state(), ContinuityState::CopyingLastValid);

        // Last copy inside the tolerance; the hand is no longer recognized.
        assert!(buffer.fill(&JointFrame::empty()));
        assert_eq!(buffer.data_count(), 3);
        assert_eq!(buffer.continuity_state(), ContinuityState::Reset);

        assert!(!buffer.fill(&JointFrame::empty()));
        assert!(buffer.is_empty());
        assert!(buffer.last_valid().is_none());
    }

    #[test]
    fn test_lost_before_any_data_returns_false() {
        let mut buffer = RingBuffer::new(Hand::Left, 1);
        assert!(!buffer.fill(&JointFrame::empty()));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_anchor_without_depth_counts_as_lost() {
        let mut buffer = RingBuffer::new(Hand::Right, 1);
        let mut joints = hand_at(0.1, 0);
        joints.points[HandPoint::HandCenter.index()].z = 0.0;
        let frame = JointFrame::new(Handedness::Right, HandJoints::default(), joints);
        assert!(!buffer.fill(&frame));
    }

    #[test]
    fn test_orientation_change_resets_but_keeps_last_valid() {
        let mut buffer = RingBuffer::new(Hand::Right, 1);
        buffer.fill(&right_frame(0.1));
        buffer.set_orientation(DeviceOrientation::LandscapeLeft);
        assert_eq!(buffer.data_count(), 1);

        buffer.set_orientation(DeviceOrientation::Portrait);
        assert!(buffer.is_empty());
        assert_eq!(buffer.top_index(), 0);
        assert!(buffer.last_valid().is_some());
    }

    #[test]
    fn test_gravity_tilt_rotates_about_hand_center() {
        let mut points = vec![Point3::new(0.0, 0.0, 0.4); CLASSIFIER_JOINTS];
        points[0] = Point3::new(0.1, 0.0, 0.4);
        let joints = HandJoints::new(points, vec![]);
        // Gravity along +x reads as a quarter turn in landscape.
        let frame = JointFrame::new(Handedness::Right, HandJoints::default(), joints)
            .with_gravity(Point3::new(9.8, 0.0, 0.0));

        let mut buffer = RingBuffer::new(Hand::Right, 1);
        buffer.fill(&frame);
        let joint = buffer.latest().unwrap().joint(0);
        assert!(joint.x.abs() < 1e-2);
        assert!((joint.y + 100.0).abs() < 1e-2);

        let mut flat = RingBuffer::new(Hand::Right, 1).with_adjust_by_gravity(false);
        flat.fill(&frame);
        assert!((flat.latest().unwrap().joint(0).x - 100.0).abs() < 1e-3);
    }
}
