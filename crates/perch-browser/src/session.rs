//! Scrape session: navigate, intercept, capture.
//!
//! One [`scrape_post`] call drives exactly one page load in an isolated
//! headless browser and returns the tweet-detail JSON payload captured
//! from the page's own background API traffic. Nothing from the session
//! outlives the call except that payload.
//!
//! The capture works by enabling the CDP `Network` domain before
//! navigation and buffering every `Network.responseReceived` event whose
//! resource type is `XHR`, in arrival order. Bodies are left on the
//! browser side until a response is actually selected, then fetched once
//! via `Network.getResponseBody`.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use serde_json::Value;

use crate::cdp::{CdpClient, CdpEvent};
use crate::config::SessionConfig;
use crate::error::ScrapeError;
use crate::launch::BrowserProcess;

/// DOM marker meaning "a post is rendered". Tracks the platform's markup
/// and needs updating when that drifts.
pub const TWEET_READY_SELECTOR: &str = "[data-testid='tweet']";

/// URL substring identifying the tweet-detail API call among XHRs.
pub const TWEET_DETAIL_MARKER: &str = "TweetResultByRestId";

/// Deadline for `Page.loadEventFired` after navigation starts.
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Deadline for the readiness marker to appear after the page loads.
const RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Interval between readiness-marker polls.
const RENDER_POLL: Duration = Duration::from_millis(250);

/// Resource kind of an observed network response. Only XHR responses are
/// buffered; everything else (images, stylesheets, documents) is noise
/// for this pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Xhr,
    Other,
}

impl ResourceKind {
    /// Map a CDP `Network.responseReceived` resource type string.
    pub fn from_cdp(resource_type: &str) -> Self {
        match resource_type {
            "XHR" => ResourceKind::Xhr,
            _ => ResourceKind::Other,
        }
    }
}

/// One observed network response. The body stays in the browser until
/// explicitly fetched.
#[derive(Debug, Clone)]
pub struct InterceptedResponse {
    /// CDP request id, used to fetch the body later.
    pub request_id: String,
    /// Response URL.
    pub url: String,
    /// Resource kind as reported by the browser.
    pub kind: ResourceKind,
}

impl InterceptedResponse {
    /// Build from `Network.responseReceived` event params. Returns `None`
    /// for frames missing the fields we need.
    pub fn from_event_params(params: &Value) -> Option<Self> {
        let request_id = params.get("requestId")?.as_str()?.to_string();
        let url = params
            .get("response")?
            .get("url")?
            .as_str()?
            .to_string();
        let kind = params
            .get("type")
            .and_then(|t| t.as_str())
            .map(ResourceKind::from_cdp)
            .unwrap_or(ResourceKind::Other);
        Some(Self {
            request_id,
            url,
            kind,
        })
    }
}

/// Decide whether a CDP event marks the end of the tracked page load.
///
/// With a frame id, only `Page.frameStoppedLoading` for that exact frame
/// counts; otherwise any `Page.loadEventFired` does.
pub fn is_load_complete(event: &CdpEvent, frame_id: Option<&str>) -> bool {
    match frame_id {
        Some(id) => {
            event.method == "Page.frameStoppedLoading"
                && event.params.get("frameId").and_then(|v| v.as_str()) == Some(id)
        }
        None => event.method == "Page.loadEventFired",
    }
}

/// Scan buffered responses in arrival order and return the first whose
/// URL contains `marker`.
pub fn select_target_response<'a>(
    responses: &'a [InterceptedResponse],
    marker: &str,
) -> Option<&'a InterceptedResponse> {
    responses.iter().find(|r| r.url.contains(marker))
}

/// Decode a `Network.getResponseBody` reply into raw bytes.
pub fn decode_body(reply: &Value) -> Result<Vec<u8>, ScrapeError> {
    let body = reply
        .get("body")
        .and_then(|b| b.as_str())
        .ok_or_else(|| ScrapeError::Protocol {
            detail: "Network.getResponseBody returned no 'body' field".to_string(),
        })?;

    if reply
        .get("base64Encoded")
        .and_then(|b| b.as_bool())
        .unwrap_or(false)
    {
        B64.decode(body).map_err(|e| ScrapeError::MalformedPayload {
            detail: format!("invalid base64 response body: {e}"),
        })
    } else {
        Ok(body.as_bytes().to_vec())
    }
}

/// Unwrap the tweet subtree from the raw API response document.
pub fn unwrap_tweet_result(document: Value) -> Result<Value, ScrapeError> {
    document
        .get("data")
        .and_then(|d| d.get("tweetResult"))
        .and_then(|t| t.get("result"))
        .cloned()
        .ok_or_else(|| ScrapeError::MalformedPayload {
            detail: "response has no data.tweetResult.result subtree".to_string(),
        })
}

/// Scrape a single post page and return its raw tweet payload.
///
/// Launches an isolated headless browser, navigates to `url`, waits for
/// the post to render, and captures the body of the first XHR whose URL
/// contains [`TWEET_DETAIL_MARKER`]. The browser is torn down on every
/// exit path, success or not.
pub async fn scrape_post(url: &str, config: &SessionConfig) -> Result<Value, ScrapeError> {
    if url.trim().is_empty() {
        return Err(ScrapeError::EmptyUrl);
    }

    // Ownership of the process handle guarantees teardown: the child is
    // killed when `process` drops, on any return below.
    let process = BrowserProcess::launch(config).await?;
    let client = CdpClient::connect(&process.ws_url).await?;

    let mut session = Session {
        client,
        responses: Vec::new(),
    };
    session.prepare(config).await?;
    session.capture(url).await
}

/// One live scrape session: a connected CDP client plus the response
/// buffer for the current page load.
struct Session {
    client: CdpClient,
    responses: Vec<InterceptedResponse>,
}

impl Session {
    /// Enable the CDP domains the capture needs and fix the viewport.
    async fn prepare(&mut self, config: &SessionConfig) -> Result<(), ScrapeError> {
        self.client
            .enable_domains(&["Page", "Runtime", "Network"])
            .await?;

        let (width, height) = config.viewport;
        self.client
            .send_command(
                "Emulation.setDeviceMetricsOverride",
                serde_json::json!({
                    "width": width,
                    "height": height,
                    "deviceScaleFactor": 1,
                    "mobile": false,
                }),
            )
            .await?;
        Ok(())
    }

    /// Navigate, wait, select, fetch. The heart of the driver.
    async fn capture(&mut self, url: &str) -> Result<Value, ScrapeError> {
        tracing::info!(url, "navigating to post page");

        // Discard anything the initial about:blank page emitted so its
        // load signals cannot satisfy the wait below.
        self.drain_events();

        let reply = self
            .client
            .send_command("Page.navigate", serde_json::json!({ "url": url }))
            .await?;
        if let Some(error_text) = reply.get("errorText").and_then(|v| v.as_str()) {
            return Err(ScrapeError::NavigationFailed {
                reason: error_text.to_string(),
            });
        }
        let frame_id = reply
            .get("frameId")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        self.wait_until_loaded(frame_id.as_deref()).await?;
        self.wait_for_render().await?;

        // Late responses may still be queued after the marker appeared.
        self.drain_events();

        let target = select_target_response(&self.responses, TWEET_DETAIL_MARKER)
            .cloned()
            .ok_or_else(|| ScrapeError::NoMatchingResponse {
                marker: TWEET_DETAIL_MARKER.to_string(),
            })?;

        tracing::debug!(
            url = %target.url,
            buffered = self.responses.len(),
            "matched tweet-detail response"
        );

        let body_reply = self
            .client
            .send_command(
                "Network.getResponseBody",
                serde_json::json!({ "requestId": target.request_id }),
            )
            .await?;
        let bytes = decode_body(&body_reply)?;

        let document: Value =
            serde_json::from_slice(&bytes).map_err(|e| ScrapeError::MalformedPayload {
                detail: format!("response body is not valid JSON: {e}"),
            })?;

        unwrap_tweet_result(document)
    }

    /// Block until the navigated frame finishes loading, buffering XHR
    /// responses observed on the way.
    ///
    /// When `Page.navigate` reported a frame id the wait keys on
    /// `Page.frameStoppedLoading` for that frame, so load signals from
    /// the browser's initial page cannot end the wait early. Without a
    /// frame id it falls back to `Page.loadEventFired`.
    async fn wait_until_loaded(&mut self, frame_id: Option<&str>) -> Result<(), ScrapeError> {
        let deadline = tokio::time::Instant::now() + NAVIGATION_TIMEOUT;

        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Err(ScrapeError::NavigationTimeout {
                    duration: NAVIGATION_TIMEOUT,
                });
            }

            match tokio::time::timeout(remaining, self.client.recv_event()).await {
                Ok(Some(event)) => {
                    let loaded = is_load_complete(&event, frame_id);
                    self.record_event(event);
                    if loaded {
                        return Ok(());
                    }
                }
                Ok(None) => {
                    return Err(ScrapeError::Protocol {
                        detail: "WebSocket closed while waiting for page load".to_string(),
                    });
                }
                Err(_) => {
                    return Err(ScrapeError::NavigationTimeout {
                        duration: NAVIGATION_TIMEOUT,
                    });
                }
            }
        }
    }

    /// Poll for the readiness marker until it appears or the deadline
    /// passes. Queued network events are drained between polls so the
    /// buffer keeps arrival order.
    async fn wait_for_render(&mut self) -> Result<(), ScrapeError> {
        let deadline = tokio::time::Instant::now() + RENDER_TIMEOUT;
        let probe = format!(
            "document.querySelector({}) !== null",
            serde_json::json!(TWEET_READY_SELECTOR)
        );

        loop {
            self.drain_events();

            let reply = self
                .client
                .send_command(
                    "Runtime.evaluate",
                    serde_json::json!({ "expression": probe, "returnByValue": true }),
                )
                .await?;
            let present = reply
                .get("result")
                .and_then(|r| r.get("value"))
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            if present {
                return Ok(());
            }

            if tokio::time::Instant::now() + RENDER_POLL > deadline {
                return Err(ScrapeError::ContentNotFound {
                    selector: TWEET_READY_SELECTOR.to_string(),
                    duration: RENDER_TIMEOUT,
                });
            }
            tokio::time::sleep(RENDER_POLL).await;
        }
    }

    /// Move queued events into the response buffer without blocking.
    fn drain_events(&mut self) {
        while let Some(event) = self.client.try_recv_event() {
            self.record_event(event);
        }
    }

    /// Buffer an `Network.responseReceived` event if it is an XHR.
    fn record_event(&mut self, event: CdpEvent) {
        if event.method != "Network.responseReceived" {
            return;
        }
        if let Some(response) = InterceptedResponse::from_event_params(&event.params) {
            if response.kind == ResourceKind::Xhr {
                tracing::trace!(url = %response.url, "buffered XHR response");
                self.responses.push(response);
            }
        }
    }
}
