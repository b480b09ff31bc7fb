//! Process-backed engine and config adjusters.
//!
//! Both speak JSON over stdio: the build descriptor goes in on stdin, and
//! whatever the process prints on stdout comes back.

mod adjuster;
mod process;

pub use adjuster::{ProcessAdjuster, ProcessAdjusterLoader};
pub use process::{EngineCommand, ProcessEngine};

use std::io::ErrorKind;
use std::path::Path;
use std::process::{Output, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// A command line plus the extra environment it runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Invocation<'a> {
    pub program: &'a str,
    pub args: &'a [String],
    pub cwd: &'a Path,
    pub env: Vec<(&'static str, String)>,
}

/// Spawn `invocation`, write `input` to its stdin and collect its output.
///
/// A child that exits without reading its stdin is not an error.
pub(crate) async fn run_with_input(invocation: &Invocation<'_>, input: &[u8]) -> std::io::Result<Output> {
    let mut child = Command::new(invocation.program)
        .args(invocation.args)
        .current_dir(invocation.cwd)
        .envs(invocation.env.iter().map(|(key, value)| (*key, value.as_str())))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        match stdin.write_all(input).await {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::BrokenPipe => {}
            Err(err) => return Err(err),
        }
        drop(stdin);
    }

    child.wait_with_output().await
}

/// Trimmed stderr, or the exit status when stderr is empty.
pub(crate) fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("process exited with {}", output.status)
    } else {
        stderr.to_string()
    }
}
