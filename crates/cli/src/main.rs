use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{Catalog, Dataset, ItemId, RatingProfile, RatingValue, UserId};
use recommender::{EngineConfig, Recommendation, RecommendationEngine};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Neighbor-based item recommender
#[derive(Parser)]
#[command(name = "neighbor-recs")]
#[command(about = "Recommend catalog items from the ratings of similar users", long_about = None)]
struct Cli {
    /// Path to the catalog file (id,title,...,tags)
    #[arg(long, default_value = "data/movies_small.csv")]
    movies: PathBuf,

    /// Path to the ratings file (user,item,rating,...)
    #[arg(long, default_value = "data/ratings_small.csv")]
    ratings: PathBuf,

    /// Minimum rating that counts as an endorsement
    #[arg(long, default_value_t = recommender::DEFAULT_CUTOFF)]
    cutoff: RatingValue,

    /// Extra score-tied entries kept before the final tie-break sort
    #[arg(long, default_value_t = recommender::DEFAULT_SAME_SCORE_WINDOW)]
    window: usize,

    /// Score candidates on a single thread
    #[arg(long)]
    sequential: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get recommendations for an ad-hoc profile
    Recommend {
        /// A rating as ITEM:RATING, e.g. 302156:4.5 (repeatable)
        #[arg(long = "rate", value_parser = parse_rating, required = true)]
        ratings: Vec<(ItemId, RatingValue)>,

        /// Number of recommendations to return
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Show the score of each recommendation
        #[arg(long)]
        explain: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a user's profile and recommendations for them
    User {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,

        /// Number of recommendations to return
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Time recommendations for random users
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Recommendations per request
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = EngineConfig::new()
        .with_cutoff(cli.cutoff)
        .with_same_score_window(cli.window)
        .with_parallel_scoring(!cli.sequential);
    let engine = RecommendationEngine::new(config).context("Invalid engine configuration")?;
    info!("Engine configuration: {:?}", engine.config());

    let start = Instant::now();
    let dataset = Dataset::load_from_files(&cli.movies, &cli.ratings)
        .context("Failed to load catalog and ratings")?;
    println!(
        "{} Loaded {} items and {} users in {:?}",
        "✓".green(),
        dataset.catalog.len(),
        dataset.ratings.len(),
        start.elapsed()
    );

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            ratings,
            limit,
            explain,
            json,
        } => handle_recommend(&engine, &dataset, ratings, limit, explain, json)?,
        Commands::User { user_id, limit } => handle_user(&engine, &dataset, user_id, limit)?,
        Commands::Benchmark { requests, limit } => {
            handle_benchmark(&engine, &dataset, requests, limit)?
        }
    }

    Ok(())
}

/// Parse `ITEM:RATING`
fn parse_rating(s: &str) -> std::result::Result<(ItemId, RatingValue), String> {
    let (item, rating) = s
        .split_once(':')
        .ok_or_else(|| format!("expected ITEM:RATING, got '{}'", s))?;
    let item_id: ItemId = item
        .trim()
        .parse()
        .map_err(|e| format!("invalid item id '{}': {}", item, e))?;
    let rating: RatingValue = rating
        .trim()
        .parse()
        .map_err(|e| format!("invalid rating '{}': {}", rating, e))?;
    if !rating.is_finite() || rating <= 0.0 {
        return Err(format!("rating must be a positive number, got {}", rating));
    }
    Ok((item_id, rating))
}

/// Handle the 'recommend' command
fn handle_recommend(
    engine: &RecommendationEngine,
    dataset: &Dataset,
    ratings: Vec<(ItemId, RatingValue)>,
    limit: usize,
    explain: bool,
    json: bool,
) -> Result<()> {
    let target: RatingProfile = ratings.into_iter().collect();
    for item_id in target.keys() {
        if !dataset.catalog.contains(*item_id) {
            warn!("Target item {} is not in the catalog", item_id);
            println!("{} item {} is not in the catalog", "!".yellow(), item_id);
        }
    }

    let recommendations = engine
        .recommend_scored(&target, &dataset.ratings, &dataset.catalog.item_ids(), limit)
        .context("Failed to compute recommendations")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&recommendations).context("Failed to encode JSON")?
        );
    } else {
        print_recommendations(&recommendations, &dataset.catalog, explain);
    }
    Ok(())
}

/// Handle the 'user' command
fn handle_user(
    engine: &RecommendationEngine,
    dataset: &Dataset,
    user_id: UserId,
    limit: usize,
) -> Result<()> {
    let profile = dataset
        .ratings
        .profile(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;

    println!("{}", format!("User ID: {}", user_id).bold().blue());
    let avg_rating = profile.values().sum::<RatingValue>() / profile.len() as RatingValue;
    println!("{}Number of ratings: {}", "• ".cyan(), profile.len());
    println!("{}Average rating: {:.2}", "• ".cyan(), avg_rating);

    let mut top_rated: Vec<(&ItemId, &RatingValue)> = profile.iter().collect();
    top_rated.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
    println!("Top rated items:");
    for (item_id, rating) in top_rated.iter().take(5) {
        println!("  - {} (Rating: {})", display_name(&dataset.catalog, **item_id), rating);
    }

    let recommendations = engine
        .recommend_for_user(user_id, &dataset.ratings, &dataset.catalog.item_ids(), limit)
        .context("Failed to compute recommendations")?;
    print_recommendations(&recommendations, &dataset.catalog, true);
    Ok(())
}

/// Handle the 'benchmark' command
fn handle_benchmark(
    engine: &RecommendationEngine,
    dataset: &Dataset,
    requests: usize,
    limit: usize,
) -> Result<()> {
    let user_ids = dataset.ratings.user_ids();
    if user_ids.is_empty() || requests == 0 {
        return Err(anyhow!("Nothing to benchmark: no users or no requests"));
    }
    let known = dataset.catalog.item_ids();
    info!("Running {} requests over {} users", requests, user_ids.len());

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    for _ in 0..requests {
        let user_id = user_ids[rand::random_range(0..user_ids.len())];
        let start = Instant::now();
        engine.recommend_for_user(user_id, &dataset.ratings, &known, limit)?;
        timings.push(start.elapsed());
    }

    let total_time: Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let p50 = timings[timings.len() / 2];
    let p95 = timings[((timings.len() as f32 * 0.95) as usize).min(timings.len() - 1)];
    let p99 = timings[((timings.len() as f32 * 0.99) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / total_time.as_secs_f32();
    info!("Benchmark finished: p50 {:?}, p99 {:?}", p50, p99);

    println!("Benchmark results:");
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

fn display_name(catalog: &Catalog, item_id: ItemId) -> String {
    match catalog.get(item_id) {
        Some(entry) => entry.name.clone(),
        None => format!("#{}", item_id),
    }
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[Recommendation], catalog: &Catalog, explain: bool) {
    println!("{}", "Recommendations:".bold().blue());
    if recommendations.is_empty() {
        println!("  (no similar users endorse anything new)");
        return;
    }

    for (rank, rec) in recommendations.iter().enumerate() {
        let tags = catalog
            .get(rec.item_id)
            .map(|entry| entry.tags.join(", "))
            .unwrap_or_default();
        println!(
            "{}. {} [{}] (id {})",
            (rank + 1).to_string().green(),
            display_name(catalog, rec.item_id),
            tags,
            rec.item_id
        );
        if explain {
            println!("   Score: {:.6}", rec.score);
        }
    }
}
