//! Status lines. All of them are dropped in quiet mode except errors.

use owo_colors::{OwoColorize, Stream::Stderr, Style};

pub fn success(message: &str) {
    if !super::is_quiet() {
        eprintln!("{} {}", "✓".if_supports_color(Stderr, |t| t.style(Style::new().green().bold())), message);
    }
}

pub fn info(message: &str) {
    if !super::is_quiet() {
        eprintln!("{} {}", "ℹ".if_supports_color(Stderr, |t| t.style(Style::new().blue().bold())), message);
    }
}

pub fn warning(message: &str) {
    if !super::is_quiet() {
        eprintln!(
            "{} {}",
            "⚠".if_supports_color(Stderr, |t| t.style(Style::new().yellow().bold())),
            message.if_supports_color(Stderr, |t| t.yellow())
        );
    }
}

pub fn error(message: &str) {
    eprintln!(
        "{} {}",
        "✗".if_supports_color(Stderr, |t| t.style(Style::new().red().bold())),
        message.if_supports_color(Stderr, |t| t.red())
    );
}
