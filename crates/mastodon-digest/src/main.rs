use anyhow::{Context, Result};
use clap::builder::PossibleValuesParser;
use clap::Parser;
use shared::{
    ensure_output_dir, fetch_digest, save_digest, scorer_from_name, scorer_names, Config,
    DigestOptions, DigestRenderer, MastodonClient, Pooling, Theme, Threshold, Timeline,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mastodon-digest")]
#[command(about = "Build a ranked digest of the most engaging posts on a Mastodon timeline")]
struct Args {
    /// The timeline to summarize: 'home', 'local', 'federated', 'list:id' or 'hashtag:tag'
    #[arg(short = 'f', default_value = "home")]
    timeline: String,

    /// The number of hours to include in the digest
    #[arg(short = 'n', default_value = "12", value_parser = clap::value_parser!(u32).range(1..=24))]
    hours: u32,

    /// Post scoring criteria. Simple scorers take a geometric mean of boosts and
    /// favourites, Extended scorers add replies, Weighted scorers divide by the
    /// square root of the author's followers.
    #[arg(short = 's', default_value = "SimpleWeighted", value_parser = PossibleValuesParser::new(scorer_names()))]
    scorer: String,

    /// Post threshold: lax = 90th percentile, normal = 95th, strict = 98th
    #[arg(short = 't', default_value = "normal", value_parser = PossibleValuesParser::new(Threshold::names()))]
    threshold: String,

    /// Output directory for the rendered digest
    #[arg(short = 'o', default_value = "./render/")]
    output_dir: PathBuf,

    /// Theme used to render the digest
    #[arg(long, default_value = "default", value_parser = PossibleValuesParser::new(Theme::names()))]
    theme: String,

    /// Keep at most this many posts and boosts
    #[arg(short, long)]
    limit: Option<usize>,

    /// Threshold posts and boosts against one shared score distribution
    #[arg(long)]
    pooled: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    ensure_output_dir(&args.output_dir)?;

    let scorer = scorer_from_name(&args.scorer)
        .ok_or_else(|| anyhow::anyhow!("Unknown scorer: {}", args.scorer))?;
    let threshold: Threshold = args.threshold.parse()?;
    let theme: Theme = args.theme.parse()?;
    let timeline = Timeline::parse(&args.timeline);

    let config = Config::from_env()?;

    println!("📚 Building digest from the past {} hours...", args.hours);
    let client = MastodonClient::new(&config.mastodon_base_url, config.mastodon_token)?;

    let pooling = if args.pooled {
        Pooling::Pooled
    } else {
        Pooling::Independent
    };
    let options = DigestOptions::new(args.hours, timeline, threshold, &config.mastodon_base_url)
        .with_limit(args.limit)
        .with_pooling(pooling);

    let Some(digest) = fetch_digest(&client, scorer, &options)
        .await
        .context("Failed to build digest")?
    else {
        anyhow::bail!("No posts or boosts were found for the provided digest arguments. Exiting.");
    };

    println!(
        "✓ {} posts and {} boosts made the {} cut",
        digest.posts.len(),
        digest.boosts.len(),
        digest.threshold
    );

    println!("\n📝 Rendering digest...");
    let html = DigestRenderer::render(&digest, theme);
    let filepath = save_digest(&html, &args.output_dir).context("Failed to save digest")?;

    println!("\n✅ Digest saved to: {}", filepath.display());

    Ok(())
}
