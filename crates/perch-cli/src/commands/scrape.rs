//! The `perch scrape` command: end-to-end scrape-and-log.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;
use chrono::Local;

use perch_browser::{scrape_post, SessionConfig};
use perch_extract::{format_log_entry, project_record, project_user};

/// Scrape one post, append the formatted block to the log file, and
/// return the block.
///
/// Failures are terminal: nothing is appended and no retry happens.
pub async fn scrape_and_log(url: &str, log_path: &Path) -> anyhow::Result<String> {
    tracing::info!(url, "starting scrape");
    let payload = scrape_post(url, &SessionConfig::default()).await?;

    let record = project_record(&payload);
    let user = project_user(&payload);
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let entry = format_log_entry(&record, &user, &timestamp);

    append_entry(log_path, &entry)?;
    tracing::info!(path = %log_path.display(), "log entry appended");

    Ok(entry)
}

/// Append one block to the log file, creating it on first use.
fn append_entry(path: &Path, entry: &str) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to append log entry to {}", path.display()))?;
    file.write_all(entry.as_bytes())
        .with_context(|| format!("failed to append log entry to {}", path.display()))
}

/// Run the command: print the block on success, `Error: ...` on failure.
pub async fn run(url: &str, log_path: &Path) -> anyhow::Result<()> {
    match scrape_and_log(url, log_path).await {
        Ok(entry) => {
            print!("{entry}");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(error = %e, "scrape failed");
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_creates_file_on_first_use() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        assert!(!path.exists());

        append_entry(&path, "first\n").unwrap();
        assert!(path.exists());
        append_entry(&path, "second\n").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn append_failure_is_a_filesystem_error_not_a_driver_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-subdir").join("log.txt");

        let err = append_entry(&path, "entry\n").unwrap_err();
        let display = format!("{err:#}");
        assert!(display.contains("failed to append log entry"));
        assert!(!display.contains("CDP"));
    }
}
