//! Terminal output for people.
//!
//! Build progress itself is logged through `tracing`; this module covers the
//! CLI's own status lines, the artifact summary and the startup spinner.
//! Everything goes to stderr.

mod format;
mod messages;
mod spinner;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::print_build_summary;
pub use messages::{error, info, success, warning};
pub use spinner::Spinner;

static QUIET: AtomicBool = AtomicBool::new(false);

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS"]
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

/// Configure colors and verbosity from the global flags.
///
/// Call once, early in `main`.
pub fn init(no_color: bool, quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
    owo_colors::set_override(!no_color && crate::logger::should_use_colors());
}

pub(crate) fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Whether interactive widgets (spinners) make sense.
pub fn is_interactive() -> bool {
    !is_quiet() && !is_ci() && console::user_attended_stderr()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn detects_ci_variables() {
        unsafe {
            std::env::set_var("GITHUB_ACTIONS", "true");
        }
        assert!(is_ci());
        assert!(!is_interactive());
        unsafe {
            std::env::remove_var("GITHUB_ACTIONS");
        }
    }

    #[test]
    #[serial]
    fn quiet_disables_widgets() {
        init(true, true);
        assert!(is_quiet());
        assert!(!is_interactive());
        init(true, false);
        assert!(!is_quiet());
    }
}
