// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::collections::BTreeMap;
use std::process;
use std::time::Instant;

use crate::cli::args::PredictArgs;
use crate::utils::pluralize;
use crate::{
    DeviceOrientation, FrameRateMode, FrameReader, FrameSource, GestureClassifier, GestureConfig, GestureEvent,
    GestureLabel, GesturePipeline, OnnxGestureModel, RecogMode, VERSION,
};
use crate::{failure, section, success, verbose, warning};

/// Per-run counters printed at the end of a replay.
#[derive(Debug, Default)]
struct ReplaySummary {
    frames: usize,
    skipped: usize,
    default_events: usize,
    confirmed: BTreeMap<usize, usize>,
}

impl ReplaySummary {
    fn record(&mut self, event: &GestureEvent) {
        if event.is_confirmed() {
            *self.confirmed.entry(event.label.index()).or_insert(0) += 1;
        } else {
            self.default_events += 1;
        }
    }

    fn confirmed_total(&self) -> usize {
        self.confirmed.values().sum()
    }
}

/// Replay a recorded session through the gesture pipeline.
#[allow(clippy::cast_precision_loss, clippy::too_many_lines)]
pub fn run_prediction(args: &PredictArgs) {
    let orientation: DeviceOrientation = args.orientation.parse().unwrap_or_else(|e| {
        failure!("{e}");
        process::exit(1);
    });
    let mode: RecogMode = args.mode.parse().unwrap_or_else(|e| {
        failure!("{e}");
        process::exit(1);
    });
    let frame_rate = FrameRateMode::from_fps(args.fps).unwrap_or_else(|e| {
        failure!("{e}");
        process::exit(1);
    });

    let config = GestureConfig::new()
        .with_orientation(orientation)
        .with_recog_mode(mode)
        .with_max_off_frame(args.max_off_frame)
        .with_threshold(args.threshold)
        .with_frame_rate(frame_rate)
        .with_threads(args.threads)
        .with_auto_start(true);

    println!("Hand Gesture {VERSION} 🚀 Rust ONNX");
    let classifier = match OnnxGestureModel::load_with_threads(&args.model, config.num_threads) {
        Ok(model) => {
            let metadata = model.metadata();
            verbose!(
                "{} summary: {} labels, {} frames per gesture",
                args.model,
                metadata.num_labels(),
                metadata.frames_per_gesture
            );
            GestureClassifier::new(Box::new(model))
        }
        Err(e) => {
            warning!("{e}. Classification disabled, buffering continues.");
            GestureClassifier::disabled()
        }
    };

    let mut pipeline = match GesturePipeline::new(config, classifier) {
        Ok(p) => p,
        Err(e) => {
            failure!("{e}");
            process::exit(1);
        }
    };

    let source = FrameSource::from(args.source.as_str());
    let reader = match FrameReader::open(&source) {
        Ok(r) => r,
        Err(e) => {
            failure!("{e}");
            process::exit(1);
        }
    };

    section!("Replaying {source} at {frame_rate} ({orientation}, {mode})");

    let dt = 1.0 / frame_rate.fps() as f32;
    let mut summary = ReplaySummary::default();
    let start = Instant::now();

    for frame in reader {
        let frame = match frame {
            Ok(f) => f,
            Err(e) => {
                warning!("Skipping {e}");
                summary.skipped += 1;
                continue;
            }
        };
        summary.frames += 1;
        pipeline.submit(frame);

        for event in pipeline.tick(dt) {
            summary.record(&event);
            if event.is_confirmed() {
                success!("{:>6} {event}", summary.frames);
            } else if !args.confirmed_only {
                verbose!("{:>6} {event}", summary.frames);
            }
        }
    }

    section!("Summary");
    verbose!(
        "{} {} replayed ({} skipped) in {:.1}s, {} default {}",
        summary.frames,
        if summary.frames == 1 { "frame" } else { "frames" },
        summary.skipped,
        start.elapsed().as_secs_f64(),
        summary.default_events,
        if summary.default_events == 1 { "event" } else { "events" }
    );
    if summary.confirmed_total() == 0 {
        verbose!("No confirmed gestures");
    } else {
        verbose!("Confirmed: {}", format_gesture_counts(&summary.confirmed));
    }

    if let Some(speed) = pipeline.mean_speed() {
        verbose!(
            "Speed: {:.1}ms preprocess, {:.1}ms inference, {:.1}ms postprocess per window over {} forward passes",
            speed.preprocess.unwrap_or(0.0),
            speed.inference.unwrap_or(0.0),
            speed.postprocess.unwrap_or(0.0),
            pipeline.forward_passes()
        );
    } else if pipeline.classifier().is_enabled() {
        verbose!("Speed: no forward passes (buffers never held a full window)");
    }
}

/// Format confirmed counts per label, e.g. "2 punches, 1 bloom".
fn format_gesture_counts(counts: &BTreeMap<usize, usize>) -> String {
    counts
        .iter()
        .map(|(&idx, &count)| {
            let name = GestureLabel::from_index(idx).as_str();
            let name = if count > 1 {
                pluralize(name)
            } else {
                name.to_string()
            };
            format!("{count} {name}")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::GestureHand;

    #[test]
    fn test_format_gesture_counts() {
        let mut counts = BTreeMap::new();
        counts.insert(GestureLabel::Punch.index(), 2);
        counts.insert(GestureLabel::Bloom.index(), 1);
        assert_eq!(format_gesture_counts(&counts), "1 bloom, 2 punches");
        assert_eq!(format_gesture_counts(&BTreeMap::new()), "");
    }

    #[test]
    fn test_summary_record() {
        let mut summary = ReplaySummary::default();
        summary.record(&GestureEvent::confirmed(GestureLabel::Chop, GestureHand::Left, false));
        summary.record(&GestureEvent::confirmed(GestureLabel::Chop, GestureHand::Right, false));
        summary.record(&GestureEvent::nothing_tracked());
        assert_eq!(summary.confirmed_total(), 2);
        assert_eq!(summary.default_events, 1);
        assert_eq!(summary.confirmed.get(&GestureLabel::Chop.index()), Some(&2));
    }
}
