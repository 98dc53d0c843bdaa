//! Hand a rendered PNG to the desktop's image viewer.

use std::{io::Write, path::PathBuf, process::Command};

use tracing::debug;

use crate::core::error::GraphError;

/// Write `png` to a temporary file that outlives this process and open it.
///
/// Returns once the viewer has been spawned; the file is left for the viewer.
pub fn show(png: &[u8]) -> Result<PathBuf, GraphError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("qd-")
        .suffix(".png")
        .tempfile()?;
    tmp.write_all(png)?;
    tmp.flush()?;
    let (_, path) = tmp.keep().map_err(|e| GraphError::Io(e.error))?;

    debug!(path = %path.display(), "opening viewer");
    viewer_command(&path)
        .spawn()
        .map_err(|e| GraphError::Viewer(e.to_string()))?;
    Ok(path)
}

#[cfg(target_os = "macos")]
fn viewer_command(path: &std::path::Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(windows)]
fn viewer_command(path: &std::path::Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(not(any(target_os = "macos", windows)))]
fn viewer_command(path: &std::path::Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}
