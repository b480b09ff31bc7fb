//! Logging setup for the dualpack CLI.
//!
//! Events go to stderr so `dualpack plan` can print JSON on stdout.
//!
//! ```rust,no_run
//! use dualpack_cli::logger::init_logger;
//!
//! init_logger(false, false, false, None);
//! tracing::info!("Bundling ui...");
//! ```

use dualpack_bundler::LogLevel;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// The filter is chosen in this order:
/// 1. `--verbose`: debug for every dualpack crate
/// 2. `--quiet`: errors only
/// 3. `RUST_LOG`
/// 4. `fallback` (the workspace `log` setting), else info
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool, fallback: Option<LogLevel>) {
    init_logger_with_filter(filter(verbose, quiet, fallback), no_color);
}

/// Initialize the subscriber with an explicit filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .without_time()
        .compact();

    // A second initialization (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn filter(verbose: bool, quiet: bool, fallback: Option<LogLevel>) -> EnvFilter {
    if verbose {
        EnvFilter::new(LogLevel::Debug.directive())
    } else if quiet {
        EnvFilter::new(LogLevel::Error.directive())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(fallback.unwrap_or_default().directive()))
    }
}

/// Whether colored output should be enabled.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them, otherwise the
/// terminal decides.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn no_color_wins_over_force_color() {
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(!should_use_colors());
        unsafe {
            std::env::remove_var("NO_COLOR");
        }
        assert!(should_use_colors());
        unsafe {
            std::env::remove_var("FORCE_COLOR");
        }
    }

    #[test]
    #[serial]
    fn flags_take_precedence_over_environment() {
        unsafe {
            std::env::set_var("RUST_LOG", "dualpack_bundler=trace");
        }
        assert_eq!(
            filter(true, false, None).to_string(),
            EnvFilter::new(LogLevel::Debug.directive()).to_string()
        );
        assert_eq!(
            filter(false, true, Some(LogLevel::Trace)).to_string(),
            EnvFilter::new(LogLevel::Error.directive()).to_string()
        );
        unsafe {
            std::env::remove_var("RUST_LOG");
        }
    }

    #[test]
    #[serial]
    fn fallback_level_applies_without_rust_log() {
        unsafe {
            std::env::remove_var("RUST_LOG");
        }
        assert_eq!(
            filter(false, false, Some(LogLevel::Warn)).to_string(),
            EnvFilter::new(LogLevel::Warn.directive()).to_string()
        );
    }
}
