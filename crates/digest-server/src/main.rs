//! HTTP front end for comparing feed configurations side by side.

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use shared::{
    fetch_digest, AllFactorsWeightedScorer, Config, DigestOptions, DigestRenderer,
    MastodonClient, Threshold, Timeline,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_HOURS: u32 = 12;
const MAX_HOURS: u32 = 24;
const DEFAULT_ADDR: &str = "127.0.0.1:5000";
const FEED_LIMIT: usize = 5;
const MAX_FACTOR_WEIGHT: f64 = 2.0;

#[derive(Clone)]
struct AppState {
    client: MastodonClient,
    mastodon_base_url: Arc<str>,
}

/// Body of `POST /feed/generate`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FeedRequest {
    hours: Option<u32>,
    favourites_weight: Option<f64>,
    reblogs_weight: Option<f64>,
    replies_weight: Option<f64>,
    inverse_follower_boost: Option<bool>,
    threshold: Option<String>,
    timeline: Option<String>,
}

impl FeedRequest {
    /// Validate the request into a scorer and digest options.
    fn into_parts(
        self,
        mastodon_base_url: &str,
    ) -> Result<(AllFactorsWeightedScorer, DigestOptions), String> {
        let weight = |name: &str, value: Option<f64>| -> Result<f64, String> {
            let value = value.unwrap_or(0.0);
            if !(0.0..=MAX_FACTOR_WEIGHT).contains(&value) {
                return Err(format!(
                    "{} must be between 0.0 and {:.1}, got {}",
                    name, MAX_FACTOR_WEIGHT, value
                ));
            }
            Ok(value)
        };

        let scorer = AllFactorsWeightedScorer::new(
            weight("favourites_weight", self.favourites_weight)?,
            weight("reblogs_weight", self.reblogs_weight)?,
            weight("replies_weight", self.replies_weight)?,
            self.inverse_follower_boost.unwrap_or(false),
        );

        let hours = match self.hours {
            None | Some(0) => DEFAULT_HOURS,
            Some(hours) if hours > MAX_HOURS => {
                return Err(format!(
                    "hours must be between 1 and {}, got {}",
                    MAX_HOURS, hours
                ));
            }
            Some(hours) => hours,
        };

        let threshold = match self.threshold.as_deref() {
            None | Some("") => Threshold::default(),
            Some(name) => {
                Threshold::from_name(name).ok_or_else(|| format!("Unknown threshold: {}", name))?
            }
        };

        let timeline = Timeline::parse(self.timeline.as_deref().unwrap_or("home"));

        let options = DigestOptions::new(hours, timeline, threshold, mastodon_base_url)
            .with_limit(Some(FEED_LIMIT));

        Ok((scorer, options))
    }
}

async fn index() -> Html<String> {
    Html(DigestRenderer::comparison_page())
}

async fn generate_feed(
    State(state): State<AppState>,
    Json(request): Json<FeedRequest>,
) -> Response {
    let (scorer, options) = match request.into_parts(&state.mastodon_base_url) {
        Ok(parts) => parts,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    match fetch_digest(&state.client, Arc::new(scorer), &options).await {
        Ok(Some(digest)) => Html(DigestRenderer::render_fragment(&digest)).into_response(),
        Ok(None) => Html(String::new()).into_response(),
        Err(e) => {
            error!(error = ?e, "failed to generate feed");
            (StatusCode::BAD_GATEWAY, format!("Failed to generate feed: {}", e)).into_response()
        }
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/feed/generate", post(generate_feed))
        .with_state(state)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let client = MastodonClient::new(&config.mastodon_base_url, config.mastodon_token.clone())?;
    let state = AppState {
        client,
        mastodon_base_url: Arc::from(config.mastodon_base_url.as_str()),
    };

    let addr = std::env::var("DIGEST_SERVER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(%addr, "digest server listening");
    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}
