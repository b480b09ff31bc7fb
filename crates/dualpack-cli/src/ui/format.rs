use console::Term;
use dualpack_bundler::driver::{format_bytes, format_duration};
use dualpack_bundler::BuildReport;
use owo_colors::{OwoColorize, Stream::Stderr};

/// Print the artifacts of a finished build with a total line.
pub fn print_build_summary(report: &BuildReport) {
    if super::is_quiet() || report.artifacts.is_empty() {
        return;
    }

    let width = usize::from(Term::stderr().size().1).min(80);
    eprintln!();
    eprintln!("{}", "─".repeat(width));
    for line in summary_lines(report) {
        eprintln!("  {} {line}", "▸".if_supports_color(Stderr, |t| t.blue()));
    }
    eprintln!("{}", "─".repeat(width));

    let total: u64 = report.artifacts.iter().map(|artifact| artifact.size).sum();
    eprintln!(
        "  {} {} in {}",
        "Total:".if_supports_color(Stderr, |t| t.bold()),
        format_bytes(total).if_supports_color(Stderr, |t| t.green()),
        format_duration(report.elapsed)
    );
}

fn summary_lines(report: &BuildReport) -> Vec<String> {
    let name_width = report
        .artifacts
        .iter()
        .map(|artifact| artifact.file_name.len())
        .max()
        .unwrap_or(0);
    report
        .artifacts
        .iter()
        .map(|artifact| {
            format!(
                "{:<name_width$}  {}",
                artifact.file_name,
                format_bytes(artifact.size)
            )
        })
        .collect()
}
