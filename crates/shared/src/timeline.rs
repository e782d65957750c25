use std::fmt;

/// Which Mastodon timeline a digest summarizes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Timeline {
    #[default]
    Home,
    Local,
    Federated,
    Hashtag(String),
    List(String),
}

impl Timeline {
    /// Loose parse of `home`, `local`, `federated`, `hashtag:<tag>` or
    /// `list:<id>`. Anything unrecognized falls back to the home timeline so
    /// the rendered digest stays readable.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        let (kind, id) = match normalized.split_once(':') {
            Some((kind, id)) => (kind, id.trim()),
            None => (normalized.as_str(), ""),
        };

        match (kind, id) {
            ("home", _) => Timeline::Home,
            ("local", _) => Timeline::Local,
            ("federated", _) => Timeline::Federated,
            ("hashtag", tag) if !tag.is_empty() => {
                Timeline::Hashtag(tag.trim_start_matches('#').to_string())
            }
            ("list", list_id) if !list_id.is_empty() => Timeline::List(list_id.to_string()),
            _ => Timeline::Home,
        }
    }

    /// API path and whether `local=true` must be added to the query.
    pub(crate) fn endpoint(&self) -> (String, bool) {
        match self {
            Timeline::Home => ("/api/v1/timelines/home".to_string(), false),
            Timeline::Local => ("/api/v1/timelines/public".to_string(), true),
            Timeline::Federated => ("/api/v1/timelines/public".to_string(), false),
            Timeline::Hashtag(tag) => (
                format!("/api/v1/timelines/tag/{}", urlencoding::encode(tag)),
                false,
            ),
            Timeline::List(list_id) => (
                format!("/api/v1/timelines/list/{}", urlencoding::encode(list_id)),
                false,
            ),
        }
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeline::Home => f.write_str("home"),
            Timeline::Local => f.write_str("local"),
            Timeline::Federated => f.write_str("federated"),
            Timeline::Hashtag(tag) => write!(f, "hashtag:{}", tag),
            Timeline::List(list_id) => write!(f, "list:{}", list_id),
        }
    }
}
