// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Per-tick gesture pipeline.
//!
//! [`GesturePipeline`] owns one [`RingBuffer`] and one [`GestureDebouncer`] per
//! hand, the shared [`GestureClassifier`] and the [`EventBus`]. Frames arrive
//! through a [`FrameSender`], which may live on another thread; everything else
//! runs inside [`GesturePipeline::tick`].

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::buffer::RingBuffer;
use crate::classifier::GestureClassifier;
use crate::config::{FrameRateMode, GestureConfig};
use crate::debounce::GestureDebouncer;
use crate::error::Result;
use crate::events::{BufferReadCallback, EventBus, EventFilter, GestureCallback, SubscriptionId};
use crate::gesture::GestureLabel;
use crate::hand::{GestureHand, Hand, Handedness, JointFrame};
use crate::orientation::{DeviceOrientation, RecogMode};
use crate::results::{BufferReadEvent, GestureEvent, Speed};

#[derive(Debug, Default)]
struct SlotState {
    frame: Option<JointFrame>,
    new_data: bool,
}

/// Producer handle for the latest recognition frame.
///
/// Only the newest frame is kept; a frame submitted before the previous one was
/// consumed replaces it.
#[derive(Debug, Clone, Default)]
pub struct FrameSender {
    slot: Arc<Mutex<SlotState>>,
}

impl FrameSender {
    pub fn submit(&self, frame: JointFrame) {
        let mut slot = self.slot.lock();
        slot.frame = Some(frame);
        slot.new_data = true;
    }

    fn take_new(&self) -> Option<JointFrame> {
        let mut slot = self.slot.lock();
        if !slot.new_data {
            return None;
        }
        slot.new_data = false;
        slot.frame.clone()
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    frames: u32,
    elapsed: f32,
    measured: f32,
}

impl FpsCounter {
    fn update(&mut self, dt_seconds: f32, consumed: bool) {
        if consumed {
            self.frames += 1;
        }
        self.elapsed += dt_seconds;
        if self.elapsed >= 1.0 {
            #[allow(clippy::cast_precision_loss)]
            let frames = self.frames as f32;
            self.measured = frames / self.elapsed;
            self.frames = 0;
            self.elapsed = 0.0;
        }
    }
}

/// Gesture recognition context for one tracking session.
///
/// # Example
///
/// ```
/// use hand_gesture_inference::{GestureClassifier, GestureConfig, GesturePipeline, JointFrame};
///
/// let config = GestureConfig::new().with_auto_start(true);
/// let mut pipeline = GesturePipeline::new(config, GestureClassifier::disabled())?;
/// pipeline.submit(JointFrame::empty());
/// let events = pipeline.tick(1.0 / 30.0);
/// assert_eq!(events.len(), 1);
/// # Ok::<(), hand_gesture_inference::GestureError>(())
/// ```
#[derive(Debug)]
pub struct GesturePipeline {
    config: GestureConfig,
    left: RingBuffer,
    right: RingBuffer,
    classifier: GestureClassifier,
    left_debouncer: GestureDebouncer,
    right_debouncer: GestureDebouncer,
    bus: EventBus,
    sender: FrameSender,
    estimating: bool,
    fps: FpsCounter,
    last_speed: Option<Speed>,
    speed_sum: [f64; 3],
    forward_passes: usize,
}

impl GesturePipeline {
    /// Build a pipeline.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `config` fails validation.
    pub fn new(config: GestureConfig, classifier: GestureClassifier) -> Result<Self> {
        config.validate()?;
        let window = config.frame_rate.estimation_window();
        let buffer = |hand| {
            RingBuffer::new(hand, config.max_off_frame)
                .with_orientation(config.orientation)
                .with_recog_mode(config.recog_mode)
                .with_adjust_by_gravity(config.adjust_by_gravity)
        };

        Ok(Self {
            left: buffer(Hand::Left),
            right: buffer(Hand::Right),
            classifier,
            left_debouncer: GestureDebouncer::new(Hand::Left, window),
            right_debouncer: GestureDebouncer::new(Hand::Right, window),
            bus: EventBus::new(),
            sender: FrameSender::default(),
            estimating: config.auto_start,
            fps: FpsCounter::default(),
            last_speed: None,
            speed_sum: [0.0; 3],
            forward_passes: 0,
            config,
        })
    }

    /// A handle that can submit frames from any thread.
    #[must_use]
    pub fn frame_sender(&self) -> FrameSender {
        self.sender.clone()
    }

    pub fn submit(&self, frame: JointFrame) {
        self.sender.submit(frame);
    }

    /// Advance the session by `dt_seconds`.
    ///
    /// When estimation is running and a new frame has been submitted since the
    /// last tick, the cooldown timers advance and the frame is processed.
    pub fn tick(&mut self, dt_seconds: f32) -> Vec<GestureEvent> {
        if !self.estimating {
            return Vec::new();
        }
        let frame = self.sender.take_new();
        self.fps.update(dt_seconds, frame.is_some());

        let Some(frame) = frame else {
            return Vec::new();
        };
        self.left_debouncer.advance(dt_seconds);
        self.right_debouncer.advance(dt_seconds);
        self.process_frame(&frame)
    }

    /// Fill both buffers with `frame`, classify and debounce.
    ///
    /// All returned events have already been published to subscribers.
    pub fn process_frame(&mut self, frame: &JointFrame) -> Vec<GestureEvent> {
        let mut events = Vec::new();

        let left_ok = self.left.fill(frame);
        if left_ok {
            self.estimate(Hand::Left, &mut events);
        }
        let right_ok = self.right.fill(frame);
        if right_ok {
            self.estimate(Hand::Right, &mut events);
        }
        if !left_ok && !right_ok {
            events.push(GestureEvent::nothing_tracked());
        }

        for event in &events {
            self.bus.publish(event);
        }
        events
    }

    fn estimate(&mut self, hand: Hand, events: &mut Vec<GestureEvent>) {
        let (buffer, debouncer) = match hand {
            Hand::Left => (&mut self.left, &mut self.left_debouncer),
            Hand::Right => (&mut self.right, &mut self.right_debouncer),
        };
        let Some(request) = buffer.take_estimation_request() else {
            return;
        };

        let estimation_window = self.config.frame_rate.estimation_window();
        let Some(classification) =
            self.classifier
                .classify(buffer, estimation_window, self.config.frame_rate.fps())
        else {
            events.push(GestureEvent::default_event(
                GestureLabel::None,
                hand.into(),
                request.was_interpolated,
            ));
            return;
        };

        let window = self.classifier.window(estimation_window);
        let read_hand = if request.handedness == Handedness::BothHands {
            GestureHand::BothHands
        } else {
            hand.into()
        };
        self.bus.publish_buffer_read(&BufferReadEvent {
            buffer: hand,
            hand: read_hand,
            top_index: buffer.top_index(),
            frames_per_gesture: window.frames_per_gesture,
            total_samples: window.total_samples,
        });

        let speed = classification.speed;
        self.speed_sum[0] += speed.preprocess.unwrap_or(0.0);
        self.speed_sum[1] += speed.inference.unwrap_or(0.0);
        self.speed_sum[2] += speed.postprocess.unwrap_or(0.0);
        self.forward_passes += 1;
        self.last_speed = Some(speed);
        events.extend(debouncer.push(classification.label, request.was_interpolated, &self.config));
    }

    pub fn start_estimation(&mut self) {
        if !self.estimating {
            debug!("gesture estimation started");
        }
        self.estimating = true;
    }

    pub fn stop_estimation(&mut self) {
        if self.estimating {
            debug!("gesture estimation stopped");
        }
        self.estimating = false;
    }

    #[must_use]
    pub const fn is_estimating(&self) -> bool {
        self.estimating
    }

    /// Change the device orientation. Buffers holding data remapped for the old
    /// orientation are cleared.
    pub fn set_orientation(&mut self, orientation: DeviceOrientation) {
        self.config.orientation = orientation;
        self.left.set_orientation(orientation);
        self.right.set_orientation(orientation);
    }

    pub fn set_recog_mode(&mut self, mode: RecogMode) {
        self.config.recog_mode = mode;
        self.left.set_recog_mode(mode);
        self.right.set_recog_mode(mode);
    }

    /// Switch frame rate. Both label windows are resized and refilled.
    pub fn set_frame_rate(&mut self, mode: FrameRateMode) {
        if self.config.frame_rate == mode {
            return;
        }
        debug!(%mode, "frame rate changed");
        self.config.frame_rate = mode;
        let window = mode.estimation_window();
        self.left_debouncer.resize(window);
        self.right_debouncer.resize(window);
    }

    pub fn subscribe(&mut self, filter: EventFilter, callback: GestureCallback) -> SubscriptionId {
        self.bus.subscribe(filter, callback)
    }

    pub fn subscribe_buffer_read(&mut self, hand: Hand, callback: BufferReadCallback) -> SubscriptionId {
        self.bus.subscribe_buffer_read(hand, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    #[must_use]
    pub const fn config(&self) -> &GestureConfig {
        &self.config
    }

    #[must_use]
    pub const fn buffer(&self, hand: Hand) -> &RingBuffer {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    #[must_use]
    pub const fn debouncer(&self, hand: Hand) -> &GestureDebouncer {
        match hand {
            Hand::Left => &self.left_debouncer,
            Hand::Right => &self.right_debouncer,
        }
    }

    #[must_use]
    pub const fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    /// Frames consumed per second, measured over the last full second.
    #[must_use]
    pub const fn measured_fps(&self) -> f32 {
        self.fps.measured
    }

    /// Timing of the most recent forward pass.
    #[must_use]
    pub const fn last_speed(&self) -> Option<Speed> {
        self.last_speed
    }

    /// Number of classifier forward passes run so far.
    #[must_use]
    pub const fn forward_passes(&self) -> usize {
        self.forward_passes
    }

    /// Mean timing over all forward passes.
    #[must_use]
    pub fn mean_speed(&self) -> Option<Speed> {
        if self.forward_passes == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.forward_passes as f64;
        Some(Speed::new(
            self.speed_sum[0] / n,
            self.speed_sum[1] / n,
            self.speed_sum[2] / n,
        ))
    }
}
