use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderMap, LINK};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};
use url::Url;

use crate::timeline::Timeline;

/// Stop paginating once this many statuses have been seen.
const TIMELINE_LIMIT: usize = 1000;
const PAGE_SIZE: &str = "40";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub acct: String,
    #[serde(default)]
    pub display_name: String,
    /// `-1` when the instance hides the count.
    pub followers_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    pub id: String,
    pub uri: String,
    #[serde(default)]
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub content: String,
    pub account: Account,
    pub favourites_count: u64,
    pub reblogs_count: u64,
    pub replies_count: u64,
    #[serde(default)]
    pub in_reply_to_id: Option<String>,
    #[serde(default)]
    pub reblogged: Option<bool>,
    #[serde(default)]
    pub favourited: Option<bool>,
    #[serde(default)]
    pub bookmarked: Option<bool>,
    #[serde(default)]
    pub reblog: Option<Box<Status>>,
}

impl Status {
    /// The public URL, falling back to the ActivityPub URI.
    pub fn permalink(&self) -> &str {
        self.url.as_deref().unwrap_or(&self.uri)
    }

    /// Whether the status belongs in a digest for the account `own_id`:
    /// not a reply, not already interacted with, not our own.
    fn is_unseen_by(&self, own_id: &str) -> bool {
        self.in_reply_to_id.is_none()
            && !self.reblogged.unwrap_or(false)
            && !self.favourited.unwrap_or(false)
            && !self.bookmarked.unwrap_or(false)
            && self.account.id != own_id
    }
}

#[derive(Clone)]
pub struct MastodonClient {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl MastodonClient {
    pub fn new(base_url: &str, access_token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid Mastodon base URL: {}", base_url))?;

        Ok(Self {
            client,
            base_url,
            access_token,
        })
    }

    /// The account that owns the access token.
    pub async fn verify_credentials(&self) -> Result<Account> {
        let url = self
            .base_url
            .join("/api/v1/accounts/verify_credentials")
            .context("Failed to build credentials URL")?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("Failed to verify Mastodon credentials")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Mastodon API returned error: {} - {}", status, error_text);
        }

        response
            .json::<Account>()
            .await
            .context("Failed to parse Mastodon account")
    }

    /// Fetch the last `hours` of `timeline`, split into original posts and boosts.
    ///
    /// Boosts are unwrapped to the boosted status. Replies, statuses we already
    /// reblogged/favourited/bookmarked, our own statuses and duplicate URLs are
    /// dropped.
    pub async fn fetch_posts_and_boosts(
        &self,
        hours: u32,
        timeline: &Timeline,
    ) -> Result<(Vec<Status>, Vec<Status>)> {
        let me = self.verify_credentials().await?;
        let start = timeline_start(Utc::now(), hours)?;

        let mut posts = Vec::new();
        let mut boosts = Vec::new();
        let mut seen_urls = HashSet::new();
        let mut total_seen = 0;

        let mut next_page = Some(self.timeline_url(timeline, start)?);

        while let Some(page_url) = next_page.take() {
            if total_seen >= TIMELINE_LIMIT {
                break;
            }

            let (page, prev) = self.fetch_page(page_url).await?;
            if page.is_empty() {
                break;
            }
            debug!(statuses = page.len(), "fetched timeline page");

            for mut status in page {
                total_seen += 1;

                let (status, is_boost) = match status.reblog.take() {
                    Some(reblogged) => (*reblogged, true),
                    None => (status, false),
                };

                if !status.is_unseen_by(&me.id) {
                    continue;
                }
                if !seen_urls.insert(status.permalink().to_string()) {
                    continue;
                }

                if is_boost {
                    boosts.push(status);
                } else {
                    posts.push(status);
                }
            }

            next_page = prev;
        }

        info!(
            timeline = %timeline,
            seen = total_seen,
            posts = posts.len(),
            boosts = boosts.len(),
            "fetched timeline"
        );

        Ok((posts, boosts))
    }

    async fn fetch_page(&self, url: Url) -> Result<(Vec<Status>, Option<Url>)> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("Failed to fetch timeline from Mastodon")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Mastodon API returned error: {} - {}", status, error_text);
        }

        let prev = prev_page_url(response.headers());

        let statuses = response
            .json::<Vec<Status>>()
            .await
            .context("Failed to parse Mastodon timeline response")?;

        Ok((statuses, prev))
    }

    fn timeline_url(&self, timeline: &Timeline, since: DateTime<Utc>) -> Result<Url> {
        let (path, local) = timeline.endpoint();
        let mut url = self
            .base_url
            .join(&path)
            .with_context(|| format!("Failed to build timeline URL for {}", timeline))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("min_id", &datetime_to_id(since).to_string())
                .append_pair("limit", PAGE_SIZE);
            if local {
                query.append_pair("local", "true");
            }
        }

        Ok(url)
    }
}

/// Mastodon ids are snowflakes: milliseconds since the epoch shifted left 16 bits.
/// The oldest moment a digest covering `hours` looks back to.
pub(crate) fn timeline_start(now: DateTime<Utc>, hours: u32) -> Result<DateTime<Utc>> {
    now.checked_sub_signed(Duration::hours(i64::from(hours)))
        .with_context(|| format!("Cannot look back {} hours from {}", hours, now))
}

pub(crate) fn datetime_to_id(at: DateTime<Utc>) -> u64 {
    (at.timestamp_millis().max(0) as u64) << 16
}

fn prev_page_url(headers: &HeaderMap) -> Option<Url> {
    let header = headers.get(LINK)?.to_str().ok()?;
    let link = parse_link_rel(header, "prev")?;
    match Url::parse(&link) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(link = %link, error = %e, "ignoring malformed pagination link");
            None
        }
    }
}

/// Find the target of the `rel` relation in an RFC 8288 `Link` header.
pub(crate) fn parse_link_rel(header: &str, rel: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let target = target.strip_prefix('<')?.strip_suffix('>')?;

        let quoted = format!("rel=\"{}\"", rel);
        let bare = format!("rel={}", rel);
        pieces
            .map(str::trim)
            .any(|param| param == quoted || param == bare)
            .then(|| target.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const STATUS_JSON: &str = r#"{
        "id": "109",
        "uri": "https://example.social/users/alice/statuses/109",
        "url": "https://example.social/@alice/109",
        "created_at": "2026-02-01T15:30:00.000Z",
        "content": "<p>hello</p>",
        "account": {
            "id": "1",
            "acct": "alice@example.social",
            "display_name": "Alice",
            "followers_count": 100
        },
        "favourites_count": 3,
        "reblogs_count": 2,
        "replies_count": 1,
        "in_reply_to_id": null,
        "reblogged": false,
        "favourited": false,
        "bookmarked": false,
        "reblog": null
    }"#;

    #[test]
    fn test_status_deserializes() {
        let status: Status = serde_json::from_str(STATUS_JSON).unwrap();
        assert_eq!(status.favourites_count, 3);
        assert_eq!(status.reblogs_count, 2);
        assert_eq!(status.replies_count, 1);
        assert_eq!(status.account.followers_count, 100);
        assert_eq!(status.permalink(), "https://example.social/@alice/109");
        assert!(status.reblog.is_none());
    }

    #[test]
    fn test_status_missing_followers_is_an_error() {
        let broken = STATUS_JSON.replace("\"followers_count\": 100", "\"followers\": 100");
        assert!(serde_json::from_str::<Status>(&broken).is_err());
    }

    #[test]
    fn test_hidden_follower_count_is_accepted() {
        let hidden = STATUS_JSON.replace("\"followers_count\": 100", "\"followers_count\": -1");
        let status: Status = serde_json::from_str(&hidden).unwrap();
        assert_eq!(status.account.followers_count, -1);
    }

    #[test]
    fn test_permalink_falls_back_to_uri() {
        let no_url = STATUS_JSON.replace(
            "\"url\": \"https://example.social/@alice/109\"",
            "\"url\": null",
        );
        let status: Status = serde_json::from_str(&no_url).unwrap();
        assert_eq!(
            status.permalink(),
            "https://example.social/users/alice/statuses/109"
        );
    }

    #[test]
    fn test_is_unseen_by_filters_interactions() {
        let status: Status = serde_json::from_str(STATUS_JSON).unwrap();
        assert!(status.is_unseen_by("2"));
        assert!(!status.is_unseen_by("1"));

        let mut reply = status.clone();
        reply.in_reply_to_id = Some("7".to_string());
        assert!(!reply.is_unseen_by("2"));

        let mut favourited = status.clone();
        favourited.favourited = Some(true);
        assert!(!favourited.is_unseen_by("2"));

        let mut bookmarked = status;
        bookmarked.bookmarked = Some(true);
        assert!(!bookmarked.is_unseen_by("2"));
    }

    #[test]
    fn test_datetime_to_id() {
        let at = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let id = datetime_to_id(at);
        assert_eq!(id >> 16, at.timestamp_millis() as u64);
        assert_eq!(id & 0xffff, 0);
    }

    #[test]
    fn test_parse_link_rel() {
        let header = "<https://example.social/api/v1/timelines/home?max_id=100>; rel=\"next\", \
                      <https://example.social/api/v1/timelines/home?min_id=200>; rel=\"prev\"";
        assert_eq!(
            parse_link_rel(header, "prev").as_deref(),
            Some("https://example.social/api/v1/timelines/home?min_id=200")
        );
        assert_eq!(
            parse_link_rel(header, "next").as_deref(),
            Some("https://example.social/api/v1/timelines/home?max_id=100")
        );
        assert_eq!(parse_link_rel(header, "last"), None);
    }

    #[test]
    fn test_parse_link_rel_malformed() {
        assert_eq!(parse_link_rel("garbage", "prev"), None);
        assert_eq!(parse_link_rel("", "prev"), None);
    }

    #[test]
    fn test_timeline_url_home() {
        let client = MastodonClient::new("https://example.social", "t".to_string()).unwrap();
        let since = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let url = client.timeline_url(&Timeline::Home, since).unwrap();

        assert_eq!(url.path(), "/api/v1/timelines/home");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("min_id".to_string(), datetime_to_id(since).to_string())));
        assert!(query.contains(&("limit".to_string(), "40".to_string())));
        assert!(!query.iter().any(|(k, _)| k == "local"));
    }

    #[test]
    fn test_timeline_url_local_and_hashtag() {
        let client = MastodonClient::new("https://example.social", "t".to_string()).unwrap();
        let since = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        let local = client.timeline_url(&Timeline::Local, since).unwrap();
        assert_eq!(local.path(), "/api/v1/timelines/public");
        assert!(local
            .query_pairs()
            .any(|(k, v)| k == "local" && v == "true"));

        let tag = client
            .timeline_url(&Timeline::Hashtag("rust lang".to_string()), since)
            .unwrap();
        assert_eq!(tag.path(), "/api/v1/timelines/tag/rust%20lang");
    }

    #[test]
    fn test_timeline_start() {
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        assert_eq!(
            timeline_start(now, 12).unwrap(),
            Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_timeline_start_out_of_range() {
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        assert!(timeline_start(now, u32::MAX).is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(MastodonClient::new("not a url", "t".to_string()).is_err());
    }
}
