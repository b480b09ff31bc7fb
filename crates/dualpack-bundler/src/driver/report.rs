//! Artifact size reporting.

use std::time::Duration;

use crate::engine::BundleOutput;

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size with decimal units and up to three decimals.
///
/// ```
/// use dualpack_bundler::driver::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 Byte");
/// assert_eq!(format_bytes(1500), "1.5 KB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Byte".to_string();
    }

    let mut unit = 0;
    let mut scale = 1u64;
    while unit + 1 < UNITS.len() && bytes >= scale * 1000 {
        scale *= 1000;
        unit += 1;
    }

    let value = format!("{:.3}", bytes as f64 / scale as f64);
    let value = value.trim_end_matches('0').trim_end_matches('.');
    format!("{value} {}", UNITS[unit])
}

/// Seconds with two decimals, e.g. `1.25s`.
pub fn format_duration(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

pub(crate) fn log_artifacts(output: &BundleOutput) {
    for artifact in &output.artifacts {
        tracing::info!("  {} {}", artifact.file_name, format_bytes(artifact.size));
    }
}
