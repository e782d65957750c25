use chrono::{TimeZone, Utc};

use crate::mastodon::{Account, Status};

/// A status with the given engagement counts and author follower count.
pub(crate) fn status(reblogs: u64, favourites: u64, replies: u64, followers: i64) -> Status {
    let id = format!("{}-{}-{}", reblogs, favourites, replies);
    Status {
        uri: format!("https://example.social/users/alice/statuses/{}", id),
        url: Some(format!("https://example.social/@alice/{}", id)),
        id,
        created_at: Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap(),
        content: "<p>post</p>".to_string(),
        account: Account {
            id: "1".to_string(),
            acct: "alice".to_string(),
            display_name: "Alice".to_string(),
            followers_count: followers,
        },
        favourites_count: favourites,
        reblogs_count: reblogs,
        replies_count: replies,
        in_reply_to_id: None,
        reblogged: None,
        favourited: None,
        bookmarked: None,
        reblog: None,
    }
}
