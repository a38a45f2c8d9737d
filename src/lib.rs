// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Hand Gesture Inference Library
//!
//! Streaming hand-gesture recognition over per-frame hand-joint tracking results.
//! Each recognition frame is written into a per-hand ring buffer that bridges
//! short tracking gaps, an ONNX gesture network classifies the newest window of
//! buffered frames, and a per-hand debouncer turns the raw label stream into
//! stable gesture events.
//!
//! ## Features
//!
//! - **Tracking continuity** - Interpolates across brief occlusions, repeats the last valid frame, resets on long gaps
//! - **Orientation aware** - Fixed axis remap tables per device orientation, hand and recognition mode
//! - **Gravity compensation** - Optional tilt correction from the accelerometer
//! - **ONNX Runtime** - Gesture network runs through ONNX Runtime with CPU, `CoreML` or CUDA
//! - **Debounced events** - Majority vote, per-label cooldowns and an enable mask
//! - **Graceful degradation** - A model that fails to load disables classification, not the pipeline
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use hand_gesture_inference::{
//!     EventFilter, GestureClassifier, GestureConfig, GesturePipeline, JointFrame, OnnxGestureModel,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GestureConfig::new().with_auto_start(true);
//!     let classifier = GestureClassifier::from_load(OnnxGestureModel::load("gesture.onnx"));
//!     let mut pipeline = GesturePipeline::new(config, classifier)?;
//!
//!     pipeline.subscribe(
//!         EventFilter::confirmed(),
//!         Box::new(|event| println!("{event}")),
//!     );
//!
//!     // Frames usually come from a tracker callback on another thread.
//!     let sender = pipeline.frame_sender();
//!     sender.submit(JointFrame::empty());
//!
//!     // Drive the pipeline from the update loop.
//!     let events = pipeline.tick(1.0 / 30.0);
//!     println!("{} events", events.len());
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Replay a recorded session
//! hand-gesture predict --model gesture.onnx --source session.jsonl
//!
//! # Portrait device at 15 FPS, confirmed events only
//! hand-gesture predict -m gesture.onnx -s session.jsonl --orientation portrait --fps 15 --confirmed-only
//!
//! # Read frames from stdin
//! cat session.jsonl | hand-gesture predict -m gesture.onnx -s -
//! ```
//!
//! **CLI Options:**
//!
//! | Option | Short | Description | Default |
//! |--------|-------|-------------|---------|
//! | `--model` | `-m` | Path to ONNX gesture model | `gesture.onnx` |
//! | `--source` | `-s` | JSON-lines recording, `-` for stdin | required |
//! | `--orientation` | | Device orientation | `landscape-left` |
//! | `--mode` | | Recognition mode | `one-hand-hold` |
//! | `--max-off-frame` | | Tracking gap tolerance in frames | `1` |
//! | `--threshold` | | Debounce vote fraction | `0.75` |
//! | `--fps` | | Recognition frame rate (30 or 15) | `30` |
//! | `--threads` | | ONNX intra-op threads | `0` (auto) |
//! | `--confirmed-only` | | Print confirmed events only | `false` |
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`hand`] | Joint frames, handedness and pose types |
//! | [`gesture`] | Gesture labels and default policies |
//! | [`buffer`] | Per-hand ring buffer ([`RingBuffer`]) |
//! | [`continuity`] | Tracking gap state machine ([`TrackingContinuity`]) |
//! | [`orientation`] | Axis remap tables and gravity roll |
//! | [`classifier`] | Windowed classification ([`GestureClassifier`]) |
//! | [`model`] | ONNX gesture model ([`OnnxGestureModel`]) |
//! | [`debounce`] | Vote and cooldown filter ([`GestureDebouncer`]) |
//! | [`pipeline`] | Per-tick orchestration ([`GesturePipeline`]) |
//! | [`events`] | Event subscriptions ([`EventBus`]) |
//! | [`source`] | JSON-lines recordings ([`FrameReader`]) |
//! | [`config`] | Pipeline configuration ([`GestureConfig`]) |
//! | [`error`] | Error types ([`GestureError`], [`Result`]) |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `cuda` | NVIDIA CUDA acceleration |
//! | `coreml` | Apple `CoreML` (macOS/iOS) |
//!
//! ## License
//!
//! This project is licensed under [AGPL-3.0](https://ultralytics.com/license).

// Modules
pub mod buffer;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod continuity;
pub mod debounce;
pub mod error;
pub mod events;
pub mod gesture;
pub mod hand;
pub mod metadata;
pub mod model;
pub mod orientation;
pub mod pipeline;
pub mod postprocessing;
pub mod preprocessing;
pub mod results;
pub mod source;
pub mod utils;

// Re-export main types for convenience
pub use buffer::{BufferEntry, EstimationRequest, RING_BUFFER_SIZE, RingBuffer};
pub use classifier::GestureClassifier;
pub use config::{FrameRateMode, GestureConfig};
pub use continuity::{ContinuityState, TrackingContinuity};
pub use debounce::GestureDebouncer;
pub use error::{GestureError, Result};
pub use events::{EventBus, EventFilter, SubscriptionId};
pub use gesture::{GESTURE_COUNT, GestureLabel};
pub use hand::{GestureHand, Hand, HandJoints, HandPoint, Handedness, JointFrame, Point3, PoseIndex};
pub use model::{GestureModel, OnnxGestureModel};
pub use orientation::{DeviceOrientation, RecogMode};
pub use pipeline::{FrameSender, GesturePipeline};
pub use results::{BufferReadEvent, Classification, EventKind, GestureEvent, GestureScores, Speed};
pub use source::{FrameReader, FrameSource};

// Re-export metadata for advanced use
pub use metadata::ModelMetadata;

// Re-export preprocessing utilities
pub use preprocessing::{FRAME_INPUT_LEN, GestureWindow};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
