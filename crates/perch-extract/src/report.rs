//! Log-entry formatting.
//!
//! Renders one append-only log block from a projected record, the author
//! summary, and a caller-supplied timestamp. The layout is fixed: blank
//! line, timestamp, blank line, author lines, blank line, tweet lines,
//! blank line, two dash separators, two blank lines.
//!
//! The record's poll, language, identifier, source, and views fields are
//! computed but deliberately not written here; the log block carries only
//! the fields below.

use std::fmt::Display;

use crate::record::FlatTweetRecord;
use crate::user::UserSummary;

const SEPARATOR_WIDTH: usize = 83;

/// Format one log block. Pure: the timestamp is injected by the caller
/// (expected shape `YYYY-MM-DD HH:MM:SS`), so identical inputs produce
/// identical text.
pub fn format_log_entry(
    record: &FlatTweetRecord,
    user: &UserSummary,
    timestamp: &str,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{timestamp}\n\n"));

    out.push_str(&format!("Name: {}\n", opt(&user.name)));
    out.push_str(&format!("Followers Count: {}\n", opt(&user.followers_count)));
    out.push_str(&format!("Favourites Count: {}\n", opt(&user.favourites_count)));
    out.push_str(&format!("Profile Image URL: {}\n", opt(&user.profile_image_url)));
    out.push_str(&format!("Description: {}\n", opt(&user.description)));
    out.push_str(&format!("Verified: {}\n", opt(&user.verified)));
    out.push_str(&format!("Screen Name: {}\n", opt(&user.screen_name)));
    out.push_str(&format!("Location: {}\n\n", opt(&user.location)));

    out.push_str(&format!("Created At: {}\n", opt(&record.created_at)));
    out.push_str(&format!("Attached URLs: {}\n", list(&record.attached_urls)));
    out.push_str(&format!("Attached Media: {}\n", list(&record.attached_media)));
    out.push_str(&format!("Tagged Users: {}\n", list(&record.tagged_users)));
    out.push_str(&format!("Tagged Hashtags: {}\n", list(&record.tagged_hashtags)));
    out.push_str(&format!("Favorite Count: {}\n", opt(&record.favorite_count)));
    out.push_str(&format!("Bookmark Count: {}\n", opt(&record.bookmark_count)));
    out.push_str(&format!("Quote Count: {}\n", opt(&record.quote_count)));
    out.push_str(&format!("Reply Count: {}\n", opt(&record.reply_count)));
    out.push_str(&format!("Retweet Count: {}\n", opt(&record.retweet_count)));
    out.push_str(&format!("Text: {}\n", opt(&record.text)));
    out.push_str(&format!("Is Quote: {}\n", opt(&record.is_quote)));
    out.push_str(&format!("Is Retweet: {}\n\n", opt(&record.is_retweet)));

    let separator = "-".repeat(SEPARATOR_WIDTH);
    out.push_str(&format!("{separator}\n{separator}\n\n\n"));

    out
}

/// Render an optional scalar; absent values print as `null`.
fn opt<T: Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "null".to_string(),
    }
}

/// Render a string list as a JSON array.
fn list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::project_record;
    use crate::user::project_user;

    fn sample() -> (FlatTweetRecord, UserSummary) {
        let payload = serde_json::json!({
            "legacy": {
                "created_at": "Mon Jan 01 12:00:00 +0000 2024",
                "full_text": "hello world",
                "favorite_count": 5,
                "retweeted": false,
                "is_quote_status": false
            },
            "core": { "user_results": { "result": { "legacy": {
                "name": "Ada Lovelace",
                "screen_name": "ada"
            } } } }
        });
        (project_record(&payload), project_user(&payload))
    }

    #[test]
    fn block_starts_with_blank_line_then_timestamp() {
        let (record, user) = sample();
        let block = format_log_entry(&record, &user, "2024-01-01 12:34:56");
        assert!(block.starts_with("\n2024-01-01 12:34:56\n\n"));
    }

    #[test]
    fn block_ends_with_two_separators_and_two_blank_lines() {
        let (record, user) = sample();
        let block = format_log_entry(&record, &user, "2024-01-01 12:34:56");
        let separator = "-".repeat(SEPARATOR_WIDTH);
        assert!(block.ends_with(&format!("{separator}\n{separator}\n\n\n")));
    }

    #[test]
    fn labels_appear_in_fixed_order() {
        let (record, user) = sample();
        let block = format_log_entry(&record, &user, "2024-01-01 12:34:56");
        let labels = [
            "Name:",
            "Followers Count:",
            "Favourites Count:",
            "Profile Image URL:",
            "Description:",
            "Verified:",
            "Screen Name:",
            "Location:",
            "Created At:",
            "Attached URLs:",
            "Attached Media:",
            "Tagged Users:",
            "Tagged Hashtags:",
            "Favorite Count:",
            "Bookmark Count:",
            "Quote Count:",
            "Reply Count:",
            "Retweet Count:",
            "Text:",
            "Is Quote:",
            "Is Retweet:",
        ];
        let mut cursor = 0;
        for label in labels {
            let at = block[cursor..]
                .find(label)
                .unwrap_or_else(|| panic!("label {label:?} missing or out of order"));
            cursor += at + label.len();
        }
    }

    #[test]
    fn computed_but_unlogged_fields_stay_out() {
        let payload = serde_json::json!({
            "legacy": { "lang": "en", "id_str": "123", "user_id_str": "456" },
            "source": "Web App",
            "views": { "count": "9" }
        });
        let record = project_record(&payload);
        let user = project_user(&payload);
        let block = format_log_entry(&record, &user, "2024-01-01 12:34:56");
        assert!(!block.contains("Language:"));
        assert!(!block.contains("Source:"));
        assert!(!block.contains("Views:"));
        assert!(!block.contains("Conversation"));
    }

    #[test]
    fn absent_scalars_render_as_null_and_lists_as_json() {
        let (record, user) = sample();
        let block = format_log_entry(&record, &user, "2024-01-01 12:34:56");
        assert!(block.contains("Location: null\n"));
        assert!(block.contains("Attached Media: []\n"));
        assert!(block.contains("Favorite Count: 5\n"));
        assert!(block.contains("Is Retweet: false\n"));
    }

    #[test]
    fn formatting_is_idempotent() {
        let (record, user) = sample();
        let first = format_log_entry(&record, &user, "2024-01-01 12:34:56");
        let second = format_log_entry(&record, &user, "2024-01-01 12:34:56");
        assert_eq!(first, second);
    }

    #[test]
    fn media_lists_render_with_contents() {
        let payload = serde_json::json!({
            "legacy": { "entities": { "media": [
                { "media_url_https": "https://pbs.example/a.jpg" }
            ] } }
        });
        let record = project_record(&payload);
        let user = project_user(&payload);
        let block = format_log_entry(&record, &user, "2024-01-01 00:00:00");
        assert!(block.contains("Attached Media: [\"https://pbs.example/a.jpg\"]\n"));
    }
}
