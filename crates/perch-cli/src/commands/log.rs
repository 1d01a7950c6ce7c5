//! The `perch log` command: read-side viewer for the append-only log.

use std::path::Path;

/// Placeholder shown when no log file exists yet.
pub const NO_LOGS_PLACEHOLDER: &str = "No logs found.";

/// Load the log as display lines: whole file, split into lines, each
/// trimmed. A missing file yields the single placeholder line; the viewer
/// never creates the file.
pub fn read_log_lines(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => contents.lines().map(|l| l.trim().to_string()).collect(),
        Err(_) => vec![NO_LOGS_PLACEHOLDER.to_string()],
    }
}

/// Run the command: print every display line.
pub fn run(path: &Path) -> anyhow::Result<()> {
    tracing::debug!(path = %path.display(), "reading log file");
    for line in read_log_lines(path) {
        println!("{line}");
    }
    Ok(())
}
