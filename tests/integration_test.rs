// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Integration tests for the gesture pipeline

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ndarray::Array2;
use parking_lot::Mutex;

use hand_gesture_inference::buffer::JOINT_VALUES;
use hand_gesture_inference::hand::{CLASSIFIER_JOINTS, POSE_COUNT};
use hand_gesture_inference::{
    DeviceOrientation, EventFilter, FRAME_INPUT_LEN, FrameReader, GestureClassifier, GestureConfig, GestureEvent,
    GestureHand, GestureLabel, GestureModel, GesturePipeline, Hand, HandJoints, Handedness, JointFrame,
    OnnxGestureModel, Point3, Result,
};

const DT: f32 = 1.0 / 30.0;

/// Votes for the label whose index equals the newest frame's pose code.
struct PoseLabelModel {
    frames: usize,
}

impl GestureModel for PoseLabelModel {
    fn input_len(&self) -> usize {
        self.frames * FRAME_INPUT_LEN
    }

    fn forward(&mut self, input: &Array2<f32>) -> Result<Vec<f32>> {
        let pose_slot = (self.frames - 1) * FRAME_INPUT_LEN + JOINT_VALUES;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let winner = input[[0, pose_slot]] as usize;
        let mut out = vec![0.0; 25];
        if let Some(v) = out.get_mut(winner) {
            *v = 1.0;
        }
        Ok(out)
    }
}

fn hand_joints(pose: usize) -> HandJoints {
    #[allow(clippy::cast_precision_loss)]
    let points = (0..CLASSIFIER_JOINTS)
        .map(|i| Point3::new(0.01 * i as f32, 0.005 * (i % 3) as f32, 0.4))
        .collect();
    let mut levels = vec![0.0; POSE_COUNT];
    levels[pose] = 1.0;
    HandJoints::new(points, levels)
}

fn right_frame(pose: usize) -> JointFrame {
    JointFrame::new(Handedness::Right, HandJoints::default(), hand_joints(pose))
}

fn both_frame(pose: usize) -> JointFrame {
    JointFrame::new(Handedness::BothHands, hand_joints(pose), hand_joints(pose))
}

fn pipeline_with(config: GestureConfig, frames: usize) -> GesturePipeline {
    let classifier = GestureClassifier::new(Box::new(PoseLabelModel { frames }));
    GesturePipeline::new(config.with_auto_start(true), classifier).unwrap()
}

fn step(pipeline: &mut GesturePipeline, frame: JointFrame) -> Vec<GestureEvent> {
    pipeline.submit(frame);
    pipeline.tick(DT)
}

fn confirmed(events: &[GestureEvent]) -> Vec<GestureLabel> {
    events.iter().filter(|e| e.is_confirmed()).map(|e| e.label).collect()
}

#[test]
fn test_gesture_confirmed_after_window_and_votes() {
    // Two frames per gesture at a window of 4: the classifier needs 5 buffered entries.
    let mut pipeline = pipeline_with(GestureConfig::new(), 2);
    let punch = GestureLabel::Punch.index();

    for _ in 0..4 {
        let events = step(&mut pipeline, right_frame(punch));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].label, GestureLabel::None);
        assert_eq!(events[0].hand, GestureHand::Right);
        assert!(!events[0].is_confirmed());
    }

    for _ in 0..2 {
        let events = step(&mut pipeline, right_frame(punch));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].label, GestureLabel::Punch);
        assert!(!events[0].is_confirmed());
    }

    let events = step(&mut pipeline, right_frame(punch));
    assert_eq!(events.len(), 2);
    assert!(events[0].is_confirmed());
    assert_eq!(events[0].label, GestureLabel::Punch);
    assert_eq!(events[1].label, GestureLabel::Punch);
    assert!(!events[1].is_confirmed());

    assert_eq!(pipeline.debouncer(Hand::Right).last_confirmed(), GestureLabel::Punch);
    assert_eq!(pipeline.forward_passes(), 3);
    assert!(pipeline.mean_speed().is_some());
}

#[test]
fn test_subscribers_receive_events() {
    let mut pipeline = pipeline_with(GestureConfig::new(), 2);
    let received = Arc::new(Mutex::new(Vec::new()));
    let reads = Arc::new(AtomicUsize::new(0));

    let sink = Arc::clone(&received);
    pipeline.subscribe(
        EventFilter::confirmed().for_hand(Hand::Right),
        Box::new(move |event| sink.lock().push(*event)),
    );
    let counter = Arc::clone(&reads);
    pipeline.subscribe_buffer_read(
        Hand::Right,
        Box::new(move |read| {
            assert_eq!(read.frames_per_gesture, 2);
            assert_eq!(read.total_samples, 8);
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    for _ in 0..7 {
        step(&mut pipeline, right_frame(GestureLabel::Shoot.index()));
    }

    let received = received.lock();
    assert_eq!(received.len(), 1);
    assert!(received[0].is_confirmed());
    assert_eq!(reads.load(Ordering::SeqCst), 3);
}

#[test]
fn test_buffer_read_carries_own_buffer_index() {
    let mut pipeline = pipeline_with(GestureConfig::new(), 2);
    let reads = Arc::new(Mutex::new(Vec::new()));
    for hand in Hand::BOTH {
        let sink = Arc::clone(&reads);
        pipeline.subscribe_buffer_read(
            hand,
            Box::new(move |read| {
                assert_eq!(read.buffer, hand);
                sink.lock().push((hand, read.hand, read.top_index));
            }),
        );
    }

    // The right buffer runs ten frames ahead; the left one stays empty.
    for _ in 0..10 {
        step(&mut pipeline, right_frame(GestureLabel::Bloom.index()));
    }
    assert!(pipeline.buffer(Hand::Left).is_empty());

    for _ in 0..5 {
        step(&mut pipeline, both_frame(GestureLabel::Bloom.index()));
    }

    let reads = reads.lock();
    let left: Vec<_> = reads.iter().filter(|r| r.0 == Hand::Left).collect();
    let right: Vec<_> = reads.iter().filter(|r| r.0 == Hand::Right).map(|r| r.2).collect();

    // Left is read once, when its own buffer reaches five entries.
    assert_eq!(left, vec![&(Hand::Left, GestureHand::BothHands, 5)]);
    assert_eq!(right, (5..=15).collect::<Vec<_>>());
    assert_eq!(reads.last(), Some(&(Hand::Right, GestureHand::BothHands, 15)));
}

#[test]
fn test_short_gap_repeats_last_frame() {
    let mut pipeline = pipeline_with(GestureConfig::new().with_max_off_frame(1), 2);

    step(&mut pipeline, right_frame(GestureLabel::Bloom.index()));
    let events = step(&mut pipeline, JointFrame::empty());
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].hand, GestureHand::Right);
    assert!(events[0].was_interpolated);
    assert_eq!(pipeline.buffer(Hand::Right).data_count(), 2);

    let events = step(&mut pipeline, right_frame(GestureLabel::Bloom.index()));
    assert!(!events[0].was_interpolated);
    assert_eq!(pipeline.buffer(Hand::Right).data_count(), 3);
}

#[test]
fn test_long_gap_resets_and_reports_nothing_tracked() {
    let mut pipeline = pipeline_with(GestureConfig::new().with_max_off_frame(1), 2);

    for _ in 0..6 {
        step(&mut pipeline, right_frame(GestureLabel::Bloom.index()));
    }
    step(&mut pipeline, JointFrame::empty());
    let events = step(&mut pipeline, JointFrame::empty());

    assert_eq!(events, vec![GestureEvent::nothing_tracked()]);
    assert!(pipeline.buffer(Hand::Right).is_empty());
    assert!(pipeline.buffer(Hand::Right).last_valid().is_none());
}

#[test]
fn test_failed_model_load_keeps_pipeline_running() {
    let classifier = GestureClassifier::from_load(OnnxGestureModel::load("missing-gesture-model.onnx"));
    assert!(!classifier.is_enabled());
    let mut pipeline = GesturePipeline::new(GestureConfig::new().with_auto_start(true), classifier).unwrap();

    for _ in 0..20 {
        let events = step(&mut pipeline, right_frame(GestureLabel::Punch.index()));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].label, GestureLabel::None);
        assert!(!events[0].is_confirmed());
    }
    assert_eq!(pipeline.buffer(Hand::Right).data_count(), 20);
    assert!(pipeline.mean_speed().is_none());
}

#[test]
fn test_masked_label_never_confirms() {
    let config = GestureConfig::new().with_enabled(GestureLabel::Punch, false);
    let mut pipeline = pipeline_with(config, 2);

    for _ in 0..30 {
        let events = step(&mut pipeline, right_frame(GestureLabel::Punch.index()));
        assert!(confirmed(&events).is_empty());
    }
}

#[test]
fn test_cooldown_limits_retrigger() {
    let config = GestureConfig::new().with_cooldown(GestureLabel::Punch, 0.5);
    let mut pipeline = pipeline_with(config, 2);

    let mut total = 0;
    for _ in 0..35 {
        total += confirmed(&step(&mut pipeline, right_frame(GestureLabel::Punch.index()))).len();
    }
    // First confirmation on frame 7, then again once half a second has passed at 30 FPS.
    assert_eq!(total, 2);
}

#[test]
fn test_orientation_change_restarts_window() {
    let mut pipeline = pipeline_with(GestureConfig::new(), 2);
    for _ in 0..6 {
        step(&mut pipeline, right_frame(GestureLabel::Bloom.index()));
    }
    pipeline.set_orientation(DeviceOrientation::Portrait);
    assert!(pipeline.buffer(Hand::Right).is_empty());

    let events = step(&mut pipeline, right_frame(GestureLabel::Bloom.index()));
    assert_eq!(events[0].label, GestureLabel::None);
}

#[test]
fn test_replay_recorded_frames() {
    let mut text = String::new();
    for _ in 0..7 {
        text.push_str(&serde_json::to_string(&right_frame(GestureLabel::Bloom.index())).unwrap());
        text.push('\n');
    }

    let mut pipeline = pipeline_with(GestureConfig::new(), 2);
    let mut labels = Vec::new();
    for frame in FrameReader::from_reader(Cursor::new(text)) {
        labels.extend(confirmed(&step(&mut pipeline, frame.unwrap())));
    }
    assert_eq!(labels, vec![GestureLabel::Bloom]);
}
