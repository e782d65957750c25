use std::fmt;

use crate::mastodon::Status;

/// A multiplicative weight derived from a post's attributes.
pub trait Weight: fmt::Debug + Send + Sync {
    fn weight(&self, status: &Status) -> f64;
}

/// Every post weighs the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniformWeight;

impl Weight for UniformWeight {
    fn weight(&self, _status: &Status) -> f64 {
        1.0
    }
}

/// Dampens large accounts by `1 / sqrt(followers)`.
///
/// Accounts with zero followers, or a hidden count (reported as `-1`), get a
/// weight of zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InverseFollowerWeight;

impl Weight for InverseFollowerWeight {
    fn weight(&self, status: &Status) -> f64 {
        let followers = status.account.followers_count;
        if followers <= 0 {
            0.0
        } else {
            1.0 / (followers as f64).sqrt()
        }
    }
}
