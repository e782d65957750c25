use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::sync::{Arc, OnceLock};

use crate::breakdown::Breakdown;
use crate::mastodon::Status;
use crate::scorers::Scorer;

/// A fetched status bound to the scorer of the current digest run.
///
/// Score and breakdown are computed together on first access and cached for
/// the lifetime of the record.
#[derive(Debug)]
pub struct ScoredPost {
    pub info: Status,
    scorer: Arc<dyn Scorer>,
    cache: OnceLock<(f64, Breakdown)>,
}

impl ScoredPost {
    pub fn new(info: Status, scorer: Arc<dyn Scorer>) -> Self {
        Self {
            info,
            scorer,
            cache: OnceLock::new(),
        }
    }

    pub fn url(&self) -> &str {
        self.info.permalink()
    }

    pub fn favourites(&self) -> u64 {
        self.info.favourites_count
    }

    pub fn reblogs(&self) -> u64 {
        self.info.reblogs_count
    }

    pub fn replies(&self) -> u64 {
        self.info.replies_count
    }

    pub fn score(&self) -> f64 {
        self.scored().0
    }

    pub fn breakdown(&self) -> &Breakdown {
        &self.scored().1
    }

    pub fn breakdown_string(&self) -> String {
        self.breakdown().to_string()
    }

    /// Link to the post on the reader's own instance.
    pub fn home_url(&self, mastodon_base_url: &str) -> String {
        format!(
            "{}/@{}/{}",
            mastodon_base_url, self.info.account.acct, self.info.id
        )
    }

    pub fn is_scored(&self) -> bool {
        self.cache.get().is_some()
    }

    fn scored(&self) -> &(f64, Breakdown) {
        self.cache.get_or_init(|| self.scorer.score(&self.info))
    }
}

impl Serialize for ScoredPost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ScoredPost", 4)?;
        state.serialize_field("url", self.url())?;
        state.serialize_field("score", &self.score())?;
        state.serialize_field("breakdown", self.breakdown())?;
        state.serialize_field("info", &self.info)?;
        state.end()
    }
}

/// Everything the renderer needs for one digest.
#[derive(Debug, Serialize)]
pub struct Digest {
    pub hours: u32,
    pub posts: Vec<ScoredPost>,
    pub boosts: Vec<ScoredPost>,
    pub mastodon_base_url: String,
    pub rendered_at: String,
    pub timeline_name: String,
    pub threshold: &'static str,
    pub scorer: &'static str,
    pub scorer_values: Breakdown,
}

impl Digest {
    pub fn new(
        hours: u32,
        posts: Vec<ScoredPost>,
        boosts: Vec<ScoredPost>,
        mastodon_base_url: impl Into<String>,
        timeline_name: impl Into<String>,
        threshold: &'static str,
        scorer: &dyn Scorer,
    ) -> Self {
        Self {
            hours,
            posts,
            boosts,
            mastodon_base_url: mastodon_base_url.into(),
            rendered_at: chrono::Utc::now()
                .format("%B %d, %Y at %H:%M:%S UTC")
                .to_string(),
            timeline_name: timeline_name.into(),
            threshold,
            scorer: scorer.name(),
            scorer_values: scorer.values(),
        }
    }
}
