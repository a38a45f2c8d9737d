// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::{Args, Parser, Subcommand};

/// Default gesture model path.
pub const DEFAULT_MODEL: &str = "gesture.onnx";

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Predict Options:
    --model, -m <MODEL>        Path to ONNX gesture model [default: gesture.onnx]
    --source, -s <SOURCE>      JSON-lines recording of joint frames, or - for stdin
    --orientation <ORIENT>     portrait, portrait-upside-down, landscape-left, landscape-right
    --mode <MODE>              one-hand-hold, face-to-face, head-mount
    --max-off-frame <N>        Tracking gap tolerance in frames [default: 1]
    --threshold <FRAC>         Debounce vote fraction in (0, 1] [default: 0.75]
    --fps <FPS>                Recognition frame rate, 30 or 15 [default: 30]
    --threads <N>              ONNX intra-op threads, 0 for auto [default: 0]
    --confirmed-only           Print confirmed gesture events only
    --verbose                  Show verbose output

Examples:
    hand-gesture predict --model gesture.onnx --source session.jsonl
    hand-gesture predict -m gesture.onnx -s session.jsonl --fps 15 --confirmed-only
    hand-gesture predict -m gesture.onnx -s session.jsonl --orientation portrait --mode face-to-face
    cat session.jsonl | hand-gesture predict -m gesture.onnx -s -"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded tracking session through the gesture pipeline
    Predict(PredictArgs),
}

/// Arguments for the predict command.
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Path to ONNX gesture model
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// JSON-lines recording of joint frames (- for stdin)
    #[arg(short, long)]
    pub source: String,

    /// Device orientation
    #[arg(long, default_value = "landscape-left")]
    pub orientation: String,

    /// Recognition mode
    #[arg(long, default_value = "one-hand-hold")]
    pub mode: String,

    /// Frames a tracking gap may last before the buffer resets
    #[arg(long, default_value_t = 1)]
    pub max_off_frame: usize,

    /// Fraction of the label window that must agree to confirm a gesture
    #[arg(long, default_value_t = 0.75)]
    pub threshold: f32,

    /// Recognition frame rate (30 or 15)
    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// ONNX intra-op threads (0 = auto)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Print confirmed gesture events only
    #[arg(long, default_value_t = false)]
    pub confirmed_only: bool,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_predict_args_defaults() {
        let args = Cli::parse_from(["app", "predict", "--source", "session.jsonl"]);
        match args.command {
            Commands::Predict(predict_args) => {
                assert_eq!(predict_args.model, DEFAULT_MODEL);
                assert_eq!(predict_args.source, "session.jsonl");
                assert_eq!(predict_args.orientation, "landscape-left");
                assert_eq!(predict_args.max_off_frame, 1);
                assert!((predict_args.threshold - 0.75).abs() < f32::EPSILON);
                assert_eq!(predict_args.fps, 30);
                assert!(!predict_args.confirmed_only);
                assert!(predict_args.verbose);
            }
        }
    }

    #[test]
    fn test_predict_args_custom() {
        let args = Cli::parse_from([
            "app",
            "predict",
            "-m",
            "custom.onnx",
            "-s",
            "-",
            "--orientation",
            "portrait",
            "--mode",
            "face-to-face",
            "--max-off-frame",
            "3",
            "--threshold",
            "0.5",
            "--fps",
            "15",
            "--confirmed-only",
            "--verbose",
            "false",
        ]);
        match args.command {
            Commands::Predict(predict_args) => {
                assert_eq!(predict_args.model, "custom.onnx");
                assert_eq!(predict_args.source, "-");
                assert_eq!(predict_args.mode, "face-to-face");
                assert_eq!(predict_args.max_off_frame, 3);
                assert!((predict_args.threshold - 0.5).abs() < f32::EPSILON);
                assert_eq!(predict_args.fps, 15);
                assert!(predict_args.confirmed_only);
                assert!(!predict_args.verbose);
            }
        }
    }

    #[test]
    fn test_source_required() {
        assert!(Cli::try_parse_from(["app", "predict"]).is_err());
    }
}
