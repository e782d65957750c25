//! Scoring strategies.
//!
//! A scorer turns a status's engagement counts into a single comparable
//! number plus a [`Breakdown`] explaining how it got there. The engagement
//! family (`Simple`, `ExtendedSimple` and their `Weighted` variants) takes a
//! geometric mean of the counts; `AllFactorsWeighted` lets the caller weight
//! each factor individually.
//!
//! Scorers are looked up by display name through the static table returned
//! by [`scorers`].

use std::fmt;
use std::sync::Arc;

use crate::breakdown::Breakdown;
use crate::mastodon::Status;
use crate::weights::{InverseFollowerWeight, UniformWeight, Weight};

pub trait Scorer: fmt::Debug + Send + Sync {
    /// Display name used by selection lists.
    fn name(&self) -> &'static str;

    /// Score a status, returning the score and its breakdown.
    fn score(&self, status: &Status) -> (f64, Breakdown);

    /// Configuration values; empty for parameterless scorers.
    fn values(&self) -> Breakdown {
        Breakdown::new()
    }
}

fn geometric_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().product::<f64>().powf(1.0 / values.len() as f64)
}

/// Which engagement counts feed the geometric mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Engagement {
    ReblogsFavourites,
    ReblogsFavouritesReplies,
}

impl Engagement {
    fn counts(self, status: &Status) -> Vec<(&'static str, u64)> {
        let mut counts = vec![
            ("reblogs", status.reblogs_count),
            ("favourites", status.favourites_count),
        ];
        if self == Engagement::ReblogsFavouritesReplies {
            counts.push(("replies", status.replies_count));
        }
        counts
    }

    fn equation(self) -> &'static str {
        match self {
            Engagement::ReblogsFavourites => "(Geometric mean of reblogs, favourites) * weight",
            Engagement::ReblogsFavouritesReplies => {
                "(Geometric mean of reblogs, favourites, replies) * weight"
            }
        }
    }

    /// Geometric mean of every count + 1, times `weight`. Zero when there is
    /// no engagement at all.
    fn score(self, status: &Status, weight: &dyn Weight) -> (f64, Breakdown) {
        let counts = self.counts(status);

        let engagement_score = if counts.iter().all(|(_, count)| *count == 0) {
            0.0
        } else {
            let inflated: Vec<f64> = counts.iter().map(|(_, count)| *count as f64 + 1.0).collect();
            geometric_mean(&inflated)
        };
        let weight = weight.weight(status);

        let mut breakdown = Breakdown::new();
        for (key, count) in counts {
            breakdown.set(key, count);
        }
        breakdown.set("engagement_score", engagement_score);
        breakdown.set("weight", weight);
        breakdown.set("equation", self.equation());

        (engagement_score * weight, breakdown)
    }
}

/// Layer `weight` on top of a base scorer's result.
fn reweight(base: (f64, Breakdown), weight: &dyn Weight, status: &Status) -> (f64, Breakdown) {
    let (score, mut breakdown) = base;
    let weight = weight.weight(status);
    breakdown.set("weight", weight);
    (score * weight, breakdown)
}

/// Geometric mean of reblogs and favourites.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleScorer {
    weight: UniformWeight,
}

impl SimpleScorer {
    pub const NAME: &'static str = "Simple";
}

impl Scorer for SimpleScorer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, status: &Status) -> (f64, Breakdown) {
        Engagement::ReblogsFavourites.score(status, &self.weight)
    }
}

/// [`SimpleScorer`] scaled by the inverse square root of the author's followers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleWeightedScorer {
    base: SimpleScorer,
    weight: InverseFollowerWeight,
}

impl SimpleWeightedScorer {
    pub const NAME: &'static str = "SimpleWeighted";
}

impl Scorer for SimpleWeightedScorer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, status: &Status) -> (f64, Breakdown) {
        reweight(self.base.score(status), &self.weight, status)
    }
}

/// Geometric mean of reblogs, favourites and replies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendedSimpleScorer {
    weight: UniformWeight,
}

impl ExtendedSimpleScorer {
    pub const NAME: &'static str = "ExtendedSimple";
}

impl Scorer for ExtendedSimpleScorer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, status: &Status) -> (f64, Breakdown) {
        Engagement::ReblogsFavouritesReplies.score(status, &self.weight)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendedSimpleWeightedScorer {
    base: ExtendedSimpleScorer,
    weight: InverseFollowerWeight,
}

impl ExtendedSimpleWeightedScorer {
    pub const NAME: &'static str = "ExtendedSimpleWeighted";
}

impl Scorer for ExtendedSimpleWeightedScorer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, status: &Status) -> (f64, Breakdown) {
        reweight(self.base.score(status), &self.weight, status)
    }
}

/// Caller-weighted geometric mean of favourites, reblogs and replies.
///
/// Each factor is `(count + 1) * factor_weight`; factors weighted at zero are
/// left out of the mean. With every weight at zero the score is the post's
/// creation time, which turns the digest into a chronological feed. Weights
/// are expected in `[0.0, 2.0]`; validating them is up to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AllFactorsWeightedScorer {
    favourites_weight: f64,
    reblogs_weight: f64,
    replies_weight: f64,
    inverse_follower_boost: bool,
}

impl AllFactorsWeightedScorer {
    pub const NAME: &'static str = "AllFactorsWeighted";

    pub fn new(
        favourites_weight: f64,
        reblogs_weight: f64,
        replies_weight: f64,
        inverse_follower_boost: bool,
    ) -> Self {
        Self {
            favourites_weight,
            reblogs_weight,
            replies_weight,
            inverse_follower_boost,
        }
    }
}

impl Scorer for AllFactorsWeightedScorer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, status: &Status) -> (f64, Breakdown) {
        if status.reblogs_count == 0 && status.favourites_count == 0 && status.replies_count == 0
        {
            return (
                0.0,
                Breakdown::new().with("message", "No reblogs, favourites, or replies."),
            );
        }

        if self.reblogs_weight == 0.0 && self.favourites_weight == 0.0 && self.replies_weight == 0.0
        {
            let timestamp = status.created_at.timestamp_micros() as f64 / 1_000_000.0;
            return (
                timestamp,
                Breakdown::new().with(
                    "message",
                    "No engagement component, score is post timestamp.",
                ),
            );
        }

        let favourites_factor = (status.favourites_count as f64 + 1.0) * self.favourites_weight;
        let reblogs_factor = (status.reblogs_count as f64 + 1.0) * self.reblogs_weight;
        let replies_factor = (status.replies_count as f64 + 1.0) * self.replies_weight;

        let weighted: Vec<f64> = [favourites_factor, reblogs_factor, replies_factor]
            .into_iter()
            .filter(|factor| *factor > 0.0)
            .collect();
        let engagement_score = geometric_mean(&weighted);

        let inverse_follower_weight = if self.inverse_follower_boost {
            InverseFollowerWeight.weight(status)
        } else {
            1.0
        };

        let mut breakdown = Breakdown::new()
            .with("reblogs", status.reblogs_count)
            .with("replies", status.replies_count)
            .with("favourites", status.favourites_count)
            .with("favourites_factor", favourites_factor)
            .with("reblogs_factor", reblogs_factor)
            .with("replies_factor", replies_factor)
            .with("engagement_score", engagement_score)
            .with("inverse_follower_weight", inverse_follower_weight)
            .with(
                "equation",
                "(Geometric mean of favourites_factor, reblogs_factor, replies_factor) * inverse_follower_weight",
            );
        breakdown.extend(self.values());

        (engagement_score * inverse_follower_weight, breakdown)
    }

    fn values(&self) -> Breakdown {
        Breakdown::new()
            .with("favourites_weight", self.favourites_weight)
            .with("reblogs_weight", self.reblogs_weight)
            .with("replies_weight", self.replies_weight)
            .with("inverse_follower_boost", self.inverse_follower_boost)
    }
}

/// A selectable scorer: display name plus a constructor for a fresh instance.
#[derive(Debug, Clone, Copy)]
pub struct ScorerEntry {
    pub name: &'static str,
    pub build: fn() -> Arc<dyn Scorer>,
}

fn build<S: Scorer + Default + 'static>() -> Arc<dyn Scorer> {
    Arc::new(S::default())
}

static SCORERS: [ScorerEntry; 5] = [
    ScorerEntry {
        name: SimpleScorer::NAME,
        build: build::<SimpleScorer>,
    },
    ScorerEntry {
        name: SimpleWeightedScorer::NAME,
        build: build::<SimpleWeightedScorer>,
    },
    ScorerEntry {
        name: ExtendedSimpleScorer::NAME,
        build: build::<ExtendedSimpleScorer>,
    },
    ScorerEntry {
        name: ExtendedSimpleWeightedScorer::NAME,
        build: build::<ExtendedSimpleWeightedScorer>,
    },
    ScorerEntry {
        name: AllFactorsWeightedScorer::NAME,
        build: build::<AllFactorsWeightedScorer>,
    },
];

/// Every concrete scorer, in selection-list order.
pub fn scorers() -> &'static [ScorerEntry] {
    &SCORERS
}

pub fn scorer_names() -> Vec<&'static str> {
    SCORERS.iter().map(|entry| entry.name).collect()
}

/// Build a fresh scorer by display name.
pub fn scorer_from_name(name: &str) -> Option<Arc<dyn Scorer>> {
    SCORERS
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| (entry.build)())
}
