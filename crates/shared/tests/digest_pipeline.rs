// End-to-end scoring, thresholding and assembly over synthetic timelines.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use shared::{
    build_digest, scorer_from_name, Account, AllFactorsWeightedScorer, DigestOptions,
    DigestRenderer, Scorer, ScoredPost, SimpleWeightedScorer, Status, Theme, Threshold, Timeline,
};

fn status(id: usize, reblogs: u64, favourites: u64, followers: i64) -> Status {
    Status {
        id: id.to_string(),
        uri: format!("https://example.social/users/bob/statuses/{}", id),
        url: Some(format!("https://example.social/@bob/{}", id)),
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, id as u32).unwrap(),
        content: format!("<p>post {}</p>", id),
        account: Account {
            id: "42".to_string(),
            acct: "bob@example.social".to_string(),
            display_name: "Bob".to_string(),
            followers_count: followers,
        },
        favourites_count: favourites,
        reblogs_count: reblogs,
        replies_count: 0,
        in_reply_to_id: None,
        reblogged: None,
        favourited: None,
        bookmarked: None,
        reblog: None,
    }
}

fn ladder() -> Vec<Status> {
    (0..10).map(|i| status(i, i as u64, i as u64, 100)).collect()
}

fn options(threshold: Threshold) -> DigestOptions {
    DigestOptions::new(12, Timeline::Home, threshold, "https://my.instance")
}

#[test]
fn test_ladder_scores_strictly_increase() {
    let scorer: Arc<dyn Scorer> = Arc::new(SimpleWeightedScorer::default());
    let scores: Vec<f64> = ladder()
        .into_iter()
        .map(|s| ScoredPost::new(s, scorer.clone()).score())
        .collect();

    assert_eq!(scores[0], 0.0);
    assert!(scores.windows(2).all(|w| w[0] < w[1]));
    assert!((scores[9] - 1.0).abs() < 1e-9);
}

#[test]
fn test_ladder_normal_threshold_keeps_top_post() {
    let digest = build_digest(
        ladder(),
        Vec::new(),
        Arc::new(SimpleWeightedScorer::default()),
        &options(Threshold::Normal),
    )
    .expect("digest");

    assert_eq!(digest.posts.len(), 1);
    assert_eq!(digest.posts[0].info.id, "9");
    assert_eq!(digest.posts[0].reblogs(), 9);
    assert!(digest.boosts.is_empty());
    assert_eq!(digest.scorer, "SimpleWeighted");
    assert_eq!(digest.threshold, "normal");
}

#[test]
fn test_ladder_lax_threshold_keeps_more() {
    let normal = build_digest(
        ladder(),
        ladder(),
        Arc::new(SimpleWeightedScorer::default()),
        &options(Threshold::Normal),
    )
    .expect("digest");
    let lax = build_digest(
        ladder(),
        ladder(),
        Arc::new(SimpleWeightedScorer::default()),
        &options(Threshold::Lax),
    )
    .expect("digest");

    assert!(lax.posts.len() >= normal.posts.len());
    assert_eq!(lax.posts.len(), lax.boosts.len());
}

#[test]
fn test_empty_timeline_yields_no_digest() {
    for name in ["Simple", "SimpleWeighted", "ExtendedSimple", "AllFactorsWeighted"] {
        let scorer = scorer_from_name(name).expect("registered scorer");
        assert!(build_digest(Vec::new(), Vec::new(), scorer, &options(Threshold::Strict)).is_none());
    }
}

#[test]
fn test_chronological_feed_when_all_weights_zero() {
    let digest = build_digest(
        ladder(),
        Vec::new(),
        Arc::new(AllFactorsWeightedScorer::new(0.0, 0.0, 0.0, false)),
        &options(Threshold::Lax),
    )
    .expect("digest");

    // The newest post with engagement wins; the zero-engagement post scores 0.
    assert_eq!(digest.posts[0].info.id, "9");
    assert_eq!(
        digest.posts[0].score(),
        digest.posts[0].info.created_at.timestamp() as f64
    );
}

#[test]
fn test_digest_renders_and_serializes() {
    let digest = build_digest(
        ladder(),
        ladder(),
        Arc::new(AllFactorsWeightedScorer::new(1.0, 1.0, 0.0, true)),
        &options(Threshold::Normal).with_limit(Some(5)),
    )
    .expect("digest");

    let html = DigestRenderer::render(&digest, Theme::Default);
    assert!(html.contains("https://my.instance/@bob@example.social/9"));
    assert!(html.contains("Scored with AllFactorsWeighted"));

    let json = serde_json::to_value(&digest).unwrap();
    assert_eq!(json["scorer"], "AllFactorsWeighted");
    assert_eq!(json["scorer_values"]["favourites_weight"], 1.0);
    assert_eq!(json["scorer_values"]["inverse_follower_boost"], true);
    assert_eq!(json["posts"][0]["info"]["id"], "9");
}
