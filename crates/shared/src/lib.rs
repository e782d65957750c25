// Public modules
pub mod breakdown;
pub mod config;
pub mod digest;
pub mod io;
pub mod mastodon;
pub mod models;
pub mod renderer;
pub mod scorers;
pub mod thresholds;
pub mod timeline;
pub mod weights;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use breakdown::{Breakdown, BreakdownValue};
pub use config::{format_base_url, Config};
pub use digest::{build_digest, fetch_digest, DigestOptions, Pooling};
pub use io::{ensure_output_dir, save_digest};
pub use mastodon::{Account, MastodonClient, Status};
pub use models::{Digest, ScoredPost};
pub use renderer::{DigestRenderer, Theme};
pub use scorers::{
    scorer_from_name, scorer_names, scorers, AllFactorsWeightedScorer,
    ExtendedSimpleScorer, ExtendedSimpleWeightedScorer, Scorer, ScorerEntry, SimpleScorer,
    SimpleWeightedScorer,
};
pub use thresholds::Threshold;
pub use timeline::Timeline;
pub use weights::{InverseFollowerWeight, UniformWeight, Weight};
