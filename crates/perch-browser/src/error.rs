//! Error types for the perch-browser crate.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while driving a scrape session.
///
/// One variant per terminal failure category; nothing here is retried
/// internally. Callers receive exactly one of these per `scrape_post` call.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The target URL was empty or whitespace-only.
    #[error("target URL is empty")]
    EmptyUrl,

    /// The headless browser process could not be started.
    #[error("failed to launch headless browser: {reason}")]
    SessionLaunch { reason: String },

    /// Failed to establish a WebSocket connection to the DevTools endpoint.
    #[error("failed to connect to DevTools at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// A CDP command returned an error response.
    #[error("CDP error {code}: {message}")]
    Cdp { code: i64, message: String },

    /// A CDP command timed out waiting for a response.
    #[error("CDP command '{method}' timed out after {duration:?}")]
    CommandTimeout { method: String, duration: Duration },

    /// A protocol-level error (serialization, unexpected message format,
    /// dropped connection).
    #[error("CDP protocol error: {detail}")]
    Protocol { detail: String },

    /// The browser reported a navigation error (bad URL, DNS failure, ...).
    #[error("navigation failed: {reason}")]
    NavigationFailed { reason: String },

    /// The page did not finish loading within the allotted time.
    #[error("page load timed out after {duration:?}")]
    NavigationTimeout { duration: Duration },

    /// The readiness marker never appeared (deleted/private post, or the
    /// marker has drifted from the platform's current markup).
    #[error("post never rendered: selector {selector:?} not found within {duration:?}")]
    ContentNotFound { selector: String, duration: Duration },

    /// The page loaded but no captured XHR matched the target API marker.
    #[error("no XHR response matched {marker:?}")]
    NoMatchingResponse { marker: String },

    /// The matching response body could not be decoded into the expected
    /// payload shape.
    #[error("malformed payload: {detail}")]
    MalformedPayload { detail: String },
}
