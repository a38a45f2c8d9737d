// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Windowed gesture classification over a ring buffer.
//!
//! The [`GestureClassifier`] owns the network (if it initialized) and turns the
//! most recent window of a [`RingBuffer`] into one [`Classification`]. A classifier
//! whose model failed to load stays disabled for the whole session.

use std::time::Instant;

use tracing::{debug, warn};

use crate::buffer::RingBuffer;
use crate::error::{GestureError, Result};
use crate::model::GestureModel;
use crate::postprocessing::decode_label;
use crate::preprocessing::{FRAME_INPUT_LEN, GestureWindow, extract_window, flatten_window};
use crate::results::{Classification, Speed};

/// Runs the gesture network over buffered windows.
pub struct GestureClassifier {
    model: Option<Box<dyn GestureModel>>,
    frames_per_gesture: usize,
}

impl GestureClassifier {
    /// Wrap an initialized model.
    ///
    /// A model that consumes less than one frame per pass is rejected and the
    /// classifier starts disabled.
    #[must_use]
    pub fn new(model: Box<dyn GestureModel>) -> Self {
        let frames_per_gesture = model.frames_per_gesture();
        if frames_per_gesture == 0 {
            warn!(
                input_len = model.input_len(),
                "gesture model input shorter than one frame, classification disabled"
            );
            return Self::disabled();
        }
        Self {
            model: Some(model),
            frames_per_gesture,
        }
    }

    /// Build from a model load attempt. A failed load disables classification.
    #[must_use]
    pub fn from_load<M: GestureModel + 'static>(loaded: Result<M>) -> Self {
        match loaded {
            Ok(model) => Self::new(Box::new(model)),
            Err(e) => {
                warn!(error = %e, "gesture classifier failed to initialize, classification disabled");
                Self::disabled()
            }
        }
    }

    /// A classifier that never runs.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            model: None,
            frames_per_gesture: 0,
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.model.is_some()
    }

    #[must_use]
    pub const fn frames_per_gesture(&self) -> usize {
        self.frames_per_gesture
    }

    /// Sampling layout for the given estimation window size.
    #[must_use]
    pub const fn window(&self, estimation_window: usize) -> GestureWindow {
        GestureWindow::new(self.frames_per_gesture, estimation_window)
    }

    /// Whether `buffer` holds enough entries for a full window.
    #[must_use]
    pub fn has_enough_samples(&self, buffer: &RingBuffer, estimation_window: usize) -> bool {
        self.is_enabled() && buffer.data_count() >= self.window(estimation_window).min_samples()
    }

    /// Classify the window ending just before `window_start`.
    ///
    /// # Arguments
    ///
    /// * `buffer` - Buffer to sample.
    /// * `window_start` - Write index the window ends at (usually the buffer's top index).
    /// * `window` - Sampling layout.
    /// * `fps` - Recognition frame rate.
    ///
    /// # Errors
    ///
    /// Returns `ClassifierDisabled` when no model is loaded, `InputError` when the
    /// buffer is too short for the window and `InferenceError` when the forward
    /// pass fails or the window does not match the model input.
    pub fn forward(
        &mut self,
        buffer: &RingBuffer,
        window_start: usize,
        window: GestureWindow,
        fps: u32,
    ) -> Result<Classification> {
        let Some(model) = self.model.as_mut() else {
            return Err(GestureError::ClassifierDisabled);
        };
        if buffer.data_count() < window.min_samples() {
            return Err(GestureError::InputError(format!(
                "buffer holds {} entries, window needs {}",
                buffer.data_count(),
                window.min_samples()
            )));
        }

        let start_preprocess = Instant::now();
        let entries = extract_window(buffer, window_start, &window);
        let input = flatten_window(&entries, window.stride(), fps);
        let preprocess_time = start_preprocess.elapsed().as_secs_f64() * 1000.0;

        let expected = model.input_len();
        if input.len() != expected {
            return Err(GestureError::InferenceError(format!(
                "window provides {} values, model expects {expected}",
                input.len()
            )));
        }

        let start_inference = Instant::now();
        let output = model.forward(&input)?;
        let inference_time = start_inference.elapsed().as_secs_f64() * 1000.0;

        let start_postprocess = Instant::now();
        let (label, scores) = decode_label(&output);
        let postprocess_time = start_postprocess.elapsed().as_secs_f64() * 1000.0;

        debug!(hand = %buffer.hand(), %label, conf = scores.top1conf(), "window classified");

        Ok(Classification {
            hand: buffer.hand(),
            label,
            scores,
            speed: Speed::new(preprocess_time, inference_time, postprocess_time),
        })
    }

    /// Classify the newest window of `buffer` if the buffer is deep enough.
    ///
    /// Returns `None` when disabled, when the buffer is too short, or when the
    /// forward pass fails (logged).
    pub fn classify(&mut self, buffer: &RingBuffer, estimation_window: usize, fps: u32) -> Option<Classification> {
        if !self.has_enough_samples(buffer, estimation_window) {
            return None;
        }
        let window = self.window(estimation_window);
        match self.forward(buffer, buffer.top_index(), window, fps) {
            Ok(classification) => Some(classification),
            Err(e) => {
                warn!(hand = %buffer.hand(), error = %e, "gesture forward pass failed");
                None
            }
        }
    }
}

impl std::fmt::Debug for GestureClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureClassifier")
            .field("enabled", &self.is_enabled())
            .field("frames_per_gesture", &self.frames_per_gesture)
            .field("input_len", &(self.frames_per_gesture * FRAME_INPUT_LEN))
            .finish()
    }
}
