use anyhow::Result;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::models::ScoredPost;

/// How selective the digest is, as a percentile of the batch's scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Threshold {
    Lax,
    #[default]
    Normal,
    Strict,
}

impl Threshold {
    const ALL: [Threshold; 3] = [Threshold::Lax, Threshold::Normal, Threshold::Strict];

    pub fn all() -> &'static [Threshold] {
        &Self::ALL
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.name()).collect()
    }

    pub fn percentile(self) -> u8 {
        match self {
            Threshold::Lax => 90,
            Threshold::Normal => 95,
            Threshold::Strict => 98,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Threshold::Lax => "lax",
            Threshold::Normal => "normal",
            Threshold::Strict => "strict",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// The score a post needs to reach to make the cut in `scores`.
    pub fn cutoff(self, scores: &[f64]) -> Option<f64> {
        percentile(scores, f64::from(self.percentile()))
    }

    /// Keep the posts scoring at or above this threshold's percentile of
    /// their own batch, in their original order.
    pub fn posts_meeting_criteria(self, posts: Vec<ScoredPost>) -> Vec<ScoredPost> {
        let scores: Vec<f64> = posts.iter().map(ScoredPost::score).collect();
        let Some(cutoff) = self.cutoff(&scores) else {
            return posts;
        };

        let kept = retain_at_or_above(posts, cutoff);
        debug!(
            threshold = self.name(),
            cutoff,
            total = scores.len(),
            kept = kept.len(),
            "applied threshold"
        );
        kept
    }
}

pub(crate) fn retain_at_or_above(posts: Vec<ScoredPost>, cutoff: f64) -> Vec<ScoredPost> {
    posts.into_iter().filter(|post| post.score() >= cutoff).collect()
}

/// Percentile of `values` with linear interpolation between the closest
/// ranks, `p` in `[0, 100]`. `None` for an empty slice.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Threshold {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown threshold: {}. Use one of: {}",
                s,
                Self::names().join(", ")
            )
        })
    }
}
