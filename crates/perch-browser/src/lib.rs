//! Headless-browser session driver for single-post capture.
//!
//! Drives one isolated headless Chrome session per call over the Chrome
//! DevTools Protocol: navigate to a post page, observe the page's own XHR
//! traffic, wait for the post to render, and return the JSON payload of
//! the first response matching the tweet-detail API marker.
//!
//! # Architecture
//!
//! - **`cdp`**: WebSocket client with JSON-RPC command/response
//!   correlation and an event queue.
//! - **`launch`**: Chrome binary discovery, headless spawn with an
//!   ephemeral DevTools port and a throwaway profile, teardown on drop.
//! - **`session`**: the capture pipeline ([`scrape_post`]).
//!
//! # Example (conceptual)
//!
//! ```ignore
//! use perch_browser::{scrape_post, SessionConfig};
//!
//! let payload = scrape_post("https://x.com/user/status/123", &SessionConfig::default()).await?;
//! ```

pub mod cdp;
pub mod config;
pub mod error;
pub mod launch;
pub mod session;

pub use config::SessionConfig;
pub use error::ScrapeError;
pub use session::{scrape_post, InterceptedResponse, ResourceKind};
pub use session::{TWEET_DETAIL_MARKER, TWEET_READY_SELECTOR};
