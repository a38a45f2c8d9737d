// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Hand gesture CLI.

use clap::Parser;

use hand_gesture_inference::cli::args::{Cli, Commands};
use hand_gesture_inference::cli::logging::{init_tracing, set_verbose};
use hand_gesture_inference::cli::predict::run_prediction;

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Predict(args) => {
            set_verbose(args.verbose);
            init_tracing(args.verbose);
            run_prediction(args);
        }
    }
}
