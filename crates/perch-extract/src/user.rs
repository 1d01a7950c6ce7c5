//! Author sub-fields for log output.
//!
//! The author lives in a sibling subtree of the same raw payload
//! (`core.user_results.result`). These fields are formatted into the log
//! entry but are not part of the flat record schema.

use serde::Serialize;
use serde_json::Value;

use crate::path::{bool_at, int_at, lookup, string_at};

/// Root of the author subtree inside the raw payload.
const USER_RESULT: &[&str] = &["core", "user_results", "result"];

/// Author fields pulled from the payload, each independently optional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub name: Option<String>,
    pub followers_count: Option<i64>,
    pub favourites_count: Option<i64>,
    pub profile_image_url: Option<String>,
    pub description: Option<String>,
    pub verified: Option<bool>,
    pub screen_name: Option<String>,
    pub location: Option<String>,
}

/// Project the author subtree. A payload without one yields a summary of
/// all-`None` fields; the call never fails.
pub fn project_user(payload: &Value) -> UserSummary {
    let empty = Value::Null;
    let user = lookup(payload, USER_RESULT).unwrap_or(&empty);

    UserSummary {
        name: string_at(user, &["legacy", "name"]),
        followers_count: int_at(user, &["legacy", "followers_count"]),
        favourites_count: int_at(user, &["legacy", "favourites_count"]),
        profile_image_url: string_at(user, &["legacy", "profile_image_url_https"]),
        description: string_at(user, &["legacy", "description"]),
        verified: bool_at(user, &["legacy", "verified"]),
        screen_name: string_at(user, &["legacy", "screen_name"]),
        location: string_at(user, &["legacy", "location"]),
    }
}
