//! Headless Chrome process management.
//!
//! Discovers a Chrome/Chromium binary, spawns it headless with an
//! ephemeral DevTools port and a throwaway profile directory, and waits
//! for the default page target to expose its WebSocket endpoint.
//!
//! [`BrowserProcess`] owns the child process and the profile directory;
//! dropping it kills the browser and deletes the profile, so every exit
//! path out of a scrape session tears the whole context down.

use std::env;
use std::net::TcpListener;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use tempfile::TempDir;

use crate::config::SessionConfig;
use crate::error::ScrapeError;

/// How long to wait for the DevTools endpoint after spawning Chrome.
const DEVTOOLS_DEADLINE: Duration = Duration::from_secs(10);

/// Poll interval while waiting for the DevTools endpoint.
const DEVTOOLS_POLL: Duration = Duration::from_millis(100);

/// A running headless browser bound to one scrape session.
pub struct BrowserProcess {
    child: Child,
    /// WebSocket URL of the default page target.
    pub ws_url: String,
    // Deleted on drop; keeps invocations cookie- and cache-isolated.
    _profile_dir: TempDir,
}

impl BrowserProcess {
    /// Spawn a headless browser and wait for its page target to come up.
    pub async fn launch(config: &SessionConfig) -> Result<Self, ScrapeError> {
        let profile_dir = TempDir::new().map_err(|e| ScrapeError::SessionLaunch {
            reason: format!("failed to create profile dir: {e}"),
        })?;

        let port = pick_ephemeral_port()?;
        let args = build_launch_args(port, profile_dir.path(), config.viewport);

        let mut last_error = None;
        let mut child = None;
        for candidate in binary_candidates(config.binary_path.as_deref()) {
            let mut cmd = Command::new(&candidate);
            cmd.args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
            match cmd.spawn() {
                Ok(proc) => {
                    tracing::info!(binary = %candidate, port, "launched headless browser");
                    child = Some(proc);
                    break;
                }
                Err(e) => {
                    last_error = Some(format!("{candidate}: {e}"));
                }
            }
        }

        let mut child = child.ok_or_else(|| ScrapeError::SessionLaunch {
            reason: last_error.unwrap_or_else(|| "no browser binary found".to_string()),
        })?;

        let ws_url = match wait_for_page_target(port).await {
            Ok(ws) => ws,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };

        Ok(Self {
            child,
            ws_url,
            _profile_dir: profile_dir,
        })
    }
}

impl Drop for BrowserProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        tracing::debug!("headless browser terminated");
    }
}

/// Command-line arguments for one isolated headless session.
pub fn build_launch_args(port: u16, profile_dir: &Path, viewport: (u32, u32)) -> Vec<String> {
    let (width, height) = viewport;
    vec![
        "--headless=new".to_string(),
        "--disable-gpu".to_string(),
        format!("--remote-debugging-port={port}"),
        "--remote-debugging-address=127.0.0.1".to_string(),
        format!("--user-data-dir={}", profile_dir.display()),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        format!("--window-size={width},{height}"),
        "about:blank".to_string(),
    ]
}

/// Binaries to try, most preferred first: explicit config, environment
/// override, then well-known install locations and bare command names.
pub fn binary_candidates(configured: Option<&str>) -> Vec<String> {
    let mut candidates = Vec::new();
    if let Some(path) = configured {
        if !path.trim().is_empty() {
            candidates.push(path.to_string());
        }
    }
    if let Ok(env_path) = env::var("PERCH_BROWSER_BIN") {
        if !env_path.trim().is_empty() {
            candidates.push(env_path);
        }
    }
    candidates.extend(
        [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/google-chrome",
            "/usr/bin/chromium-browser",
            "/usr/bin/chromium",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    candidates.extend(
        ["google-chrome", "chromium", "chrome"]
            .iter()
            .map(|s| s.to_string()),
    );
    candidates
}

fn pick_ephemeral_port() -> Result<u16, ScrapeError> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|e| ScrapeError::SessionLaunch {
        reason: format!("port bind failed: {e}"),
    })?;
    let port = listener
        .local_addr()
        .map_err(|e| ScrapeError::SessionLaunch {
            reason: format!("port lookup failed: {e}"),
        })?
        .port();
    Ok(port)
}

/// Poll the DevTools HTTP endpoint until the default page target appears,
/// then return its WebSocket URL.
async fn wait_for_page_target(port: u16) -> Result<String, ScrapeError> {
    let url = format!("http://127.0.0.1:{port}/json");
    let deadline = tokio::time::Instant::now() + DEVTOOLS_DEADLINE;

    while tokio::time::Instant::now() < deadline {
        if let Ok(resp) = reqwest::get(&url).await {
            if let Ok(targets) = resp.json::<serde_json::Value>().await {
                if let Some(ws) = first_page_target(&targets) {
                    return Ok(ws);
                }
            }
        }
        tokio::time::sleep(DEVTOOLS_POLL).await;
    }

    Err(ScrapeError::SessionLaunch {
        reason: format!("timed out waiting for DevTools endpoint on {url}"),
    })
}

/// Pick the WebSocket URL of the first `page` target in a `/json` listing.
pub fn first_page_target(targets: &serde_json::Value) -> Option<String> {
    targets.as_array()?.iter().find_map(|t| {
        if t.get("type").and_then(|v| v.as_str()) == Some("page") {
            t.get("webSocketDebuggerUrl")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        } else {
            None
        }
    })
}
