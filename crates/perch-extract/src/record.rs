//! Flat tweet record projection.
//!
//! [`project_record`] is a pure function from the raw payload subtree to a
//! fixed-schema flat record. Source paths live in constant tables so the
//! schema reads as data; every lookup is optional and missing paths
//! mechanically become `None` or an empty list.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::path::{bool_at, int_at, string_at, strings_at};
use crate::poll::poll_from_payload;

// Scalar source paths, relative to the payload root.
const CREATED_AT: &[&str] = &["legacy", "created_at"];
const FAVORITE_COUNT: &[&str] = &["legacy", "favorite_count"];
const BOOKMARK_COUNT: &[&str] = &["legacy", "bookmark_count"];
const QUOTE_COUNT: &[&str] = &["legacy", "quote_count"];
const REPLY_COUNT: &[&str] = &["legacy", "reply_count"];
const RETWEET_COUNT: &[&str] = &["legacy", "retweet_count"];
const FULL_TEXT: &[&str] = &["legacy", "full_text"];
const IS_QUOTE: &[&str] = &["legacy", "is_quote_status"];
const IS_RETWEET: &[&str] = &["legacy", "retweeted"];
const LANGUAGE: &[&str] = &["legacy", "lang"];
const USER_ID: &[&str] = &["legacy", "user_id_str"];
const TWEET_ID: &[&str] = &["legacy", "id_str"];
const CONVERSATION_ID: &[&str] = &["legacy", "conversation_id_str"];
const SOURCE: &[&str] = &["source"];
const VIEWS: &[&str] = &["views", "count"];

// Entity list paths: (array path, item key).
const URLS: (&[&str], &str) = (&["legacy", "entities", "urls"], "expanded_url");
const URLS2: (&[&str], &str) = (&["legacy", "entities", "url", "urls"], "expanded_url");
const MEDIA: (&[&str], &str) = (&["legacy", "entities", "media"], "media_url_https");
const USER_MENTIONS: (&[&str], &str) = (&["legacy", "entities", "user_mentions"], "screen_name");
const HASHTAGS: (&[&str], &str) = (&["legacy", "entities", "hashtags"], "text");

/// The projected output of one scrape.
///
/// Every field is always present; scalars may be `None` when the source
/// path did not resolve, lists default to empty, and `poll` is empty when
/// the post carries no poll. Identifiers stay strings because they can
/// exceed the safe integer range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatTweetRecord {
    pub created_at: Option<String>,
    pub attached_urls: Vec<String>,
    pub attached_urls2: Vec<String>,
    pub attached_media: Vec<String>,
    pub tagged_users: Vec<String>,
    pub tagged_hashtags: Vec<String>,
    pub favorite_count: Option<i64>,
    pub bookmark_count: Option<i64>,
    pub quote_count: Option<i64>,
    pub reply_count: Option<i64>,
    pub retweet_count: Option<i64>,
    pub text: Option<String>,
    pub is_quote: Option<bool>,
    pub is_retweet: Option<bool>,
    pub language: Option<String>,
    pub user_id: Option<String>,
    pub id: Option<String>,
    pub conversation_id: Option<String>,
    pub source: Option<String>,
    pub views: Option<String>,
    pub poll: BTreeMap<String, Value>,
}

/// Project the raw payload into a [`FlatTweetRecord`].
///
/// Pure and infallible: malformed or partial payloads produce a record
/// full of `None`s and empty lists, never an error.
pub fn project_record(payload: &Value) -> FlatTweetRecord {
    FlatTweetRecord {
        created_at: string_at(payload, CREATED_AT),
        attached_urls: strings_at(payload, URLS.0, URLS.1),
        attached_urls2: strings_at(payload, URLS2.0, URLS2.1),
        attached_media: strings_at(payload, MEDIA.0, MEDIA.1),
        tagged_users: strings_at(payload, USER_MENTIONS.0, USER_MENTIONS.1),
        tagged_hashtags: strings_at(payload, HASHTAGS.0, HASHTAGS.1),
        favorite_count: int_at(payload, FAVORITE_COUNT),
        bookmark_count: int_at(payload, BOOKMARK_COUNT),
        quote_count: int_at(payload, QUOTE_COUNT),
        reply_count: int_at(payload, REPLY_COUNT),
        retweet_count: int_at(payload, RETWEET_COUNT),
        text: string_at(payload, FULL_TEXT),
        is_quote: bool_at(payload, IS_QUOTE),
        is_retweet: bool_at(payload, IS_RETWEET),
        language: string_at(payload, LANGUAGE),
        user_id: string_at(payload, USER_ID),
        id: string_at(payload, TWEET_ID),
        conversation_id: string_at(payload, CONVERSATION_ID),
        source: string_at(payload, SOURCE),
        views: string_at(payload, VIEWS),
        poll: poll_from_payload(payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> Value {
        serde_json::json!({
            "legacy": {
                "created_at": "Mon Jan 01 12:00:00 +0000 2024",
                "full_text": "testing #rust with @someone https://t.co/x",
                "favorite_count": 10,
                "bookmark_count": 2,
                "quote_count": 1,
                "reply_count": 3,
                "retweet_count": 4,
                "is_quote_status": false,
                "retweeted": false,
                "lang": "en",
                "user_id_str": "44196397",
                "id_str": "1744000000000000001",
                "conversation_id_str": "1744000000000000001",
                "entities": {
                    "urls": [ { "expanded_url": "https://example.com/post" } ],
                    "media": [ { "media_url_https": "https://pbs.example/img.jpg" } ],
                    "user_mentions": [ { "screen_name": "someone" } ],
                    "hashtags": [ { "text": "rust" } ]
                }
            },
            "source": "<a href=\"https://example.com\">Web App</a>",
            "views": { "count": "12345" }
        })
    }

    #[test]
    fn full_payload_projects_every_field() {
        let record = project_record(&full_payload());
        assert_eq!(
            record.created_at.as_deref(),
            Some("Mon Jan 01 12:00:00 +0000 2024")
        );
        assert_eq!(record.attached_urls, vec!["https://example.com/post"]);
        assert_eq!(record.attached_media, vec!["https://pbs.example/img.jpg"]);
        assert_eq!(record.tagged_users, vec!["someone"]);
        assert_eq!(record.tagged_hashtags, vec!["rust"]);
        assert_eq!(record.favorite_count, Some(10));
        assert_eq!(record.bookmark_count, Some(2));
        assert_eq!(record.quote_count, Some(1));
        assert_eq!(record.reply_count, Some(3));
        assert_eq!(record.retweet_count, Some(4));
        assert_eq!(record.is_quote, Some(false));
        assert_eq!(record.is_retweet, Some(false));
        assert_eq!(record.language.as_deref(), Some("en"));
        assert_eq!(record.user_id.as_deref(), Some("44196397"));
        assert_eq!(record.id.as_deref(), Some("1744000000000000001"));
        assert_eq!(record.views.as_deref(), Some("12345"));
        assert!(record.poll.is_empty());
    }

    #[test]
    fn missing_media_is_empty_list_and_projection_succeeds() {
        let mut payload = full_payload();
        payload["legacy"]["entities"]
            .as_object_mut()
            .unwrap()
            .remove("media");
        let record = project_record(&payload);
        assert_eq!(record.attached_media, Vec::<String>::new());
        // Rest of the projection is unaffected.
        assert_eq!(record.favorite_count, Some(10));
    }

    #[test]
    fn empty_payload_projects_to_defaults() {
        let record = project_record(&serde_json::json!({}));
        assert!(record.created_at.is_none());
        assert!(record.text.is_none());
        assert!(record.attached_urls.is_empty());
        assert!(record.attached_urls2.is_empty());
        assert!(record.tagged_users.is_empty());
        assert!(record.favorite_count.is_none());
        assert!(record.views.is_none());
        assert!(record.poll.is_empty());
    }

    #[test]
    fn identifiers_stay_strings_beyond_safe_integer_range() {
        let payload = serde_json::json!({
            "legacy": { "id_str": "9223372036854775807" }
        });
        let record = project_record(&payload);
        assert_eq!(record.id.as_deref(), Some("9223372036854775807"));
    }

    #[test]
    fn secondary_url_list_projects_independently() {
        let payload = serde_json::json!({
            "legacy": { "entities": { "url": { "urls": [
                { "expanded_url": "https://example.com/profile-link" }
            ] } } }
        });
        let record = project_record(&payload);
        assert_eq!(record.attached_urls2, vec!["https://example.com/profile-link"]);
        assert!(record.attached_urls.is_empty());
    }

    #[test]
    fn projection_is_idempotent() {
        let payload = full_payload();
        let first = project_record(&payload);
        let second = project_record(&payload);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn poll_rides_along_in_the_record() {
        let mut payload = full_payload();
        payload["card"] = serde_json::json!({ "legacy": { "binding_values": [
            { "key": "duration_minutes", "value": { "string_value": "1440" } }
        ] } });
        let record = project_record(&payload);
        assert_eq!(record.poll["duration"], "1440");
    }
}
