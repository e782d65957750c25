use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::mastodon::{MastodonClient, Status};
use crate::models::{Digest, ScoredPost};
use crate::scorers::Scorer;
use crate::thresholds::{self, Threshold};
use crate::timeline::Timeline;

/// Whether posts and boosts are thresholded against their own score
/// distributions or against one shared distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Pooling {
    #[default]
    Independent,
    Pooled,
}

#[derive(Debug, Clone)]
pub struct DigestOptions {
    pub hours: u32,
    pub timeline: Timeline,
    pub threshold: Threshold,
    pub mastodon_base_url: String,
    /// Keep at most this many posts (and boosts), highest scores first.
    pub limit: Option<usize>,
    pub pooling: Pooling,
}

impl DigestOptions {
    pub fn new(hours: u32, timeline: Timeline, threshold: Threshold, base_url: &str) -> Self {
        Self {
            hours,
            timeline,
            threshold,
            mastodon_base_url: base_url.to_string(),
            limit: None,
            pooling: Pooling::default(),
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_pooling(mut self, pooling: Pooling) -> Self {
        self.pooling = pooling;
        self
    }
}

/// Fetch the timeline and assemble a digest. `Ok(None)` when nothing made
/// the cut.
pub async fn fetch_digest(
    client: &MastodonClient,
    scorer: Arc<dyn Scorer>,
    options: &DigestOptions,
) -> Result<Option<Digest>> {
    let (posts, boosts) = client
        .fetch_posts_and_boosts(options.hours, &options.timeline)
        .await
        .context("Failed to fetch posts and boosts")?;

    Ok(build_digest(posts, boosts, scorer, options))
}

/// Score, threshold, sort and package already-fetched posts and boosts.
///
/// Returns `None` when both collections end up empty.
pub fn build_digest(
    posts: Vec<Status>,
    boosts: Vec<Status>,
    scorer: Arc<dyn Scorer>,
    options: &DigestOptions,
) -> Option<Digest> {
    let wrap = |statuses: Vec<Status>| -> Vec<ScoredPost> {
        statuses
            .into_iter()
            .map(|status| ScoredPost::new(status, Arc::clone(&scorer)))
            .collect()
    };
    let posts = wrap(posts);
    let boosts = wrap(boosts);

    let (mut posts, mut boosts) = match options.pooling {
        Pooling::Independent => (
            options.threshold.posts_meeting_criteria(posts),
            options.threshold.posts_meeting_criteria(boosts),
        ),
        Pooling::Pooled => {
            let scores: Vec<f64> = posts
                .iter()
                .chain(boosts.iter())
                .map(ScoredPost::score)
                .collect();
            match options.threshold.cutoff(&scores) {
                Some(cutoff) => (
                    thresholds::retain_at_or_above(posts, cutoff),
                    thresholds::retain_at_or_above(boosts, cutoff),
                ),
                None => (posts, boosts),
            }
        }
    };

    sort_by_score(&mut posts);
    sort_by_score(&mut boosts);

    if let Some(limit) = options.limit {
        posts.truncate(limit);
        boosts.truncate(limit);
    }

    if posts.is_empty() && boosts.is_empty() {
        info!("no posts or boosts met the threshold");
        return None;
    }

    info!(
        posts = posts.len(),
        boosts = boosts.len(),
        scorer = scorer.name(),
        threshold = options.threshold.name(),
        "assembled digest"
    );

    Some(Digest::new(
        options.hours,
        posts,
        boosts,
        options.mastodon_base_url.as_str(),
        options.timeline.to_string(),
        options.threshold.name(),
        scorer.as_ref(),
    ))
}

/// Highest score first; ties keep their relative order.
fn sort_by_score(posts: &mut [ScoredPost]) {
    posts.sort_by(|a, b| b.score().total_cmp(&a.score()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::status;
    use crate::scorers::{AllFactorsWeightedScorer, SimpleScorer, SimpleWeightedScorer};

    fn options(threshold: Threshold) -> DigestOptions {
        DigestOptions::new(12, Timeline::Home, threshold, "https://my.instance")
    }

    fn ladder(n: u64) -> Vec<Status> {
        (0..n).map(|i| status(i, i, 0, 100)).collect()
    }

    #[test]
    fn test_empty_input_yields_none() {
        let digest = build_digest(
            Vec::new(),
            Vec::new(),
            Arc::new(SimpleWeightedScorer::default()),
            &options(Threshold::Normal),
        );
        assert!(digest.is_none());
    }

    #[test]
    fn test_posts_and_boosts_use_separate_distributions() {
        // Boosts score far higher than posts; separately thresholded, the
        // best post still makes it.
        let posts = ladder(10);
        let boosts: Vec<Status> = (100..110).map(|i| status(i, i, 0, 100)).collect();

        let digest = build_digest(
            posts,
            boosts,
            Arc::new(SimpleScorer::default()),
            &options(Threshold::Normal),
        )
        .unwrap();

        assert_eq!(digest.posts.len(), 1);
        assert_eq!(digest.posts[0].reblogs(), 9);
        assert_eq!(digest.boosts.len(), 1);
        assert_eq!(digest.boosts[0].reblogs(), 109);
    }

    #[test]
    fn test_pooled_distribution_can_drop_all_posts() {
        let posts = ladder(10);
        let boosts: Vec<Status> = (100..110).map(|i| status(i, i, 0, 100)).collect();

        let digest = build_digest(
            posts,
            boosts,
            Arc::new(SimpleScorer::default()),
            &options(Threshold::Normal).with_pooling(Pooling::Pooled),
        )
        .unwrap();

        assert!(digest.posts.is_empty());
        assert!(!digest.boosts.is_empty());
    }

    #[test]
    fn test_sorted_descending_and_stable() {
        // Chronological scorer: every post gets the same timestamp score, so
        // the stable sort keeps fetch order.
        let posts: Vec<Status> = (1..=5).map(|i| status(i, 0, 0, 100)).collect();
        let digest = build_digest(
            posts,
            Vec::new(),
            Arc::new(AllFactorsWeightedScorer::default()),
            &options(Threshold::Lax),
        )
        .unwrap();
        let order: Vec<u64> = digest.posts.iter().map(|p| p.reblogs()).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5]);

        let posts = vec![status(1, 1, 0, 100), status(5, 5, 0, 100), status(5, 5, 0, 100)];
        let digest = build_digest(
            posts,
            Vec::new(),
            Arc::new(SimpleScorer::default()),
            &options(Threshold::Lax),
        )
        .unwrap();
        let scores: Vec<f64> = digest.posts.iter().map(|p| p.score()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_limit_truncates_each_collection() {
        let posts: Vec<Status> = (1..=6).map(|_| status(3, 3, 0, 100)).collect();
        let boosts: Vec<Status> = (1..=6).map(|_| status(2, 2, 0, 100)).collect();
        let digest = build_digest(
            posts,
            boosts,
            Arc::new(SimpleScorer::default()),
            &options(Threshold::Normal).with_limit(Some(5)),
        )
        .unwrap();
        assert_eq!(digest.posts.len(), 5);
        assert_eq!(digest.boosts.len(), 5);
    }

    #[test]
    fn test_digest_metadata() {
        let scorer = Arc::new(AllFactorsWeightedScorer::new(1.0, 1.0, 1.0, false));
        let digest = build_digest(
            ladder(3),
            Vec::new(),
            scorer,
            &DigestOptions::new(
                6,
                Timeline::Hashtag("rust".to_string()),
                Threshold::Strict,
                "https://my.instance",
            ),
        )
        .unwrap();

        assert_eq!(digest.hours, 6);
        assert_eq!(digest.timeline_name, "hashtag:rust");
        assert_eq!(digest.threshold, "strict");
        assert_eq!(digest.scorer, "AllFactorsWeighted");
        assert_eq!(digest.scorer_values.len(), 4);
        assert_eq!(digest.mastodon_base_url, "https://my.instance");
    }
}
