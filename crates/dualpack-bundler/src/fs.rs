//! Output directory housekeeping.

use std::path::Path;

use path_clean::PathClean;

use crate::{Error, Result};

/// Remove `output_path` before a build.
///
/// Refuses the workspace root itself and anything outside it. A missing
/// directory is not an error.
pub async fn delete_output_dir(workspace_root: &Path, output_path: &Path) -> Result<()> {
    let root = workspace_root.clean();
    let output = if output_path.is_absolute() {
        output_path.clean()
    } else {
        root.join(output_path).clean()
    };

    if output == root || !output.starts_with(&root) {
        return Err(Error::InvalidOutputPath(format!(
            "refusing to delete {} (outside the workspace or the workspace itself)",
            output.display()
        )));
    }

    match tokio::fs::remove_dir_all(&output).await {
        Ok(()) => {
            tracing::debug!(path = %output.display(), "deleted output directory");
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(Error::io(
            format!("Failed to delete output directory {}", output.display()),
            err,
        )),
    }
}
