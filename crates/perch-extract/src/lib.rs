//! Projection of raw tweet payloads into flat records and log entries.
//!
//! Everything here is pure: given the nested JSON subtree captured by the
//! browser driver, project a fixed-schema [`FlatTweetRecord`], an author
//! [`UserSummary`], and a formatted log block. Missing paths are data,
//! not errors; projection never fails.

pub mod path;
pub mod poll;
pub mod record;
pub mod report;
pub mod user;

pub use record::{project_record, FlatTweetRecord};
pub use report::format_log_entry;
pub use user::{project_user, UserSummary};
