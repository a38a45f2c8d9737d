// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Terminal output for the CLI.
//!
//! The coloured macros are named `warning!` and `failure!` so they can sit next to
//! `tracing::{warn, error}` in one scope. Library diagnostics are `tracing` events,
//! shown through the subscriber installed by [`init_tracing`].

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Global verbosity flag.
static VERBOSE: AtomicBool = AtomicBool::new(true);

/// Set the global verbosity flag.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

/// Check if verbose output is enabled.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Level of library diagnostics printed to stderr.
#[must_use]
pub const fn tracing_level(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::WARN }
}

/// Install the global `tracing` subscriber.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing(verbose: bool) -> bool {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing_level(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).is_ok()
}

/// Macro for warning messages.
#[macro_export]
macro_rules! warning {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "WARNING ⚠️".yellow().bold(), format!($($arg)*));
    }}
}

/// Macro for error messages.
#[macro_export]
macro_rules! failure {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "Error:".red().bold(), format!($($arg)*));
    }}
}

/// Macro for confirmed gesture lines.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        println!("{} {}", "✅".green(), format!($($arg)*));
    }}
}

/// Macro for verbose messages.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        if $crate::cli::logging::is_verbose() {
            println!("{}", format!($($arg)*));
        }
    }
}

/// Macro for section headers.
#[macro_export]
macro_rules! section {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        if $crate::cli::logging::is_verbose() {
            println!();
            println!("{}", format!($($arg)*).cyan().bold());
        }
    }}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_toggle() {
        set_verbose(true);
        assert!(is_verbose());

        set_verbose(false);
        assert!(!is_verbose());

        set_verbose(true);
        assert!(is_verbose());
    }

    #[test]
    fn test_tracing_level() {
        assert_eq!(tracing_level(true), Level::DEBUG);
        assert_eq!(tracing_level(false), Level::WARN);
    }

    #[test]
    fn test_macros_coexist_with_tracing() {
        use tracing::{error, warn};

        warning!("terminal warning");
        failure!("terminal failure");
        warn!("diagnostic warning");
        error!("diagnostic error");
    }
}
