//! Command-line interface for the basket engine's offline tooling.
//!
//! `train` runs one batch training cycle and persists the artifact;
//! `recommend`, `popular`, and `model-info` answer queries against a
//! persisted artifact, printing JSON responses to stdout.

#![forbid(unsafe_code)]

use std::sync::Arc;

use basket_core::{
    DEFAULT_POPULAR, DEFAULT_RECOMMENDATIONS, FsArtifactStore, InteractionRecord,
    InteractionSource, MetadataLookup, ModelArtifact, RankedItem, RecommendationService,
    TrainingConfig, save_model,
};
use basket_data::{JsonCatalog, JsonlInteractions};
use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use eyre::WrapErr;
use serde::Serialize;

/// Run the CLI with the current process arguments.
///
/// # Errors
///
/// Returns any training, persistence, or request failure wrapped with
/// context for the terminal.
pub fn run() -> eyre::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Train(args) => train(&args),
        Command::Recommend(args) => recommend(&args),
        Command::Popular(args) => popular(&args),
        Command::ModelInfo(args) => model_info(&args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "basket",
    about = "Batch training and query tooling for the basket recommendation engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Train a model from interaction history and persist the artifact.
    Train(TrainArgs),
    /// Personalised recommendations for one user.
    Recommend(RecommendArgs),
    /// Globally popular items.
    Popular(PopularArgs),
    /// Describe the persisted model.
    ModelInfo(StoreArgs),
}

#[derive(Debug, Args)]
struct TrainArgs {
    /// JSON-lines file of interaction records; omitted means training on
    /// the synthetic sample set.
    #[arg(long, value_name = "path")]
    interactions: Option<Utf8PathBuf>,
    #[command(flatten)]
    store: StoreArgs,
    /// Upper bound on the latent rank.
    #[arg(long, value_name = "r")]
    rank: Option<usize>,
    /// Trailing window, in days, the interaction source covers.
    #[arg(long, value_name = "days")]
    window_days: Option<u32>,
}

#[derive(Debug, Args)]
struct RecommendArgs {
    /// User to recommend for.
    #[arg(long)]
    user: i64,
    /// Number of recommendations.
    #[arg(short = 'n', long = "count", value_name = "n", default_value_t = DEFAULT_RECOMMENDATIONS)]
    count: usize,
    #[command(flatten)]
    query: QueryArgs,
}

#[derive(Debug, Args)]
struct PopularArgs {
    /// Number of popular items.
    #[arg(short = 'n', long = "count", value_name = "n", default_value_t = DEFAULT_POPULAR)]
    count: usize,
    #[command(flatten)]
    query: QueryArgs,
}

#[derive(Debug, Args)]
struct QueryArgs {
    #[command(flatten)]
    store: StoreArgs,
    /// Catalogue JSON for item metadata; omitted means placeholders only.
    #[arg(long, value_name = "path")]
    catalog: Option<Utf8PathBuf>,
    /// Skip metadata enrichment entirely.
    #[arg(long)]
    no_metadata: bool,
}

#[derive(Debug, Args)]
struct StoreArgs {
    /// Directory holding the persisted model artifact.
    #[arg(long = "model-dir", value_name = "dir", default_value = "artifacts")]
    model_dir: Utf8PathBuf,
}

#[derive(Debug, Serialize)]
struct TrainSummary {
    n_users: usize,
    n_items: usize,
    matrix_shape: [usize; 2],
    rank: usize,
    reconstruction_mse: f64,
    trained_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct RecommendResponse {
    user_id: i64,
    recommendations: Vec<RankedItem>,
    count: usize,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct PopularResponse {
    popular_items: Vec<RankedItem>,
    count: usize,
    timestamp: DateTime<Utc>,
}

fn train(args: &TrainArgs) -> eyre::Result<()> {
    let mut config = TrainingConfig::default();
    if let Some(rank) = args.rank {
        config.max_rank = rank;
    }
    if let Some(window_days) = args.window_days {
        config.window_days = window_days;
    }

    let records: Vec<InteractionRecord> = match &args.interactions {
        Some(path) => JsonlInteractions::new(path.clone())
            .fetch()
            .wrap_err("failed to read interaction history")?,
        None => Vec::new(),
    };

    let artifact = basket_core::train(&records, &config).wrap_err("training failed")?;
    let store = FsArtifactStore::new(args.store.model_dir.clone());
    save_model(&store, basket_core::DEFAULT_MODEL_KEY, &artifact)
        .wrap_err("failed to persist the model artifact")?;

    print_json(&summary_of(&artifact))
}

fn summary_of(artifact: &ModelArtifact) -> TrainSummary {
    TrainSummary {
        n_users: artifact.users.len(),
        n_items: artifact.items.len(),
        matrix_shape: [artifact.matrix.nrows(), artifact.matrix.ncols()],
        rank: artifact.rank(),
        reconstruction_mse: artifact.projection.reconstruction_mse,
        trained_at: artifact.trained_at,
    }
}

fn recommend(args: &RecommendArgs) -> eyre::Result<()> {
    let service = service_for(&args.query)?;
    let recommendations = service.recommendations(
        args.user,
        Some(args.count),
        !args.query.no_metadata,
    )?;
    print_json(&RecommendResponse {
        user_id: args.user,
        count: recommendations.len(),
        recommendations,
        timestamp: Utc::now(),
    })
}

fn popular(args: &PopularArgs) -> eyre::Result<()> {
    let service = service_for(&args.query)?;
    let popular_items = service.popular(Some(args.count), !args.query.no_metadata)?;
    print_json(&PopularResponse {
        count: popular_items.len(),
        popular_items,
        timestamp: Utc::now(),
    })
}

fn model_info(args: &StoreArgs) -> eyre::Result<()> {
    let store: Arc<FsArtifactStore> = Arc::new(FsArtifactStore::new(args.model_dir.clone()));
    let service = RecommendationService::new(store, Arc::new(JsonCatalog::empty()));
    print_json(&service.model_info())
}

fn service_for(args: &QueryArgs) -> eyre::Result<RecommendationService> {
    let metadata: Arc<dyn MetadataLookup> = match &args.catalog {
        Some(path) => Arc::new(
            JsonCatalog::load(path).wrap_err("failed to load the metadata catalogue")?,
        ),
        None => Arc::new(JsonCatalog::empty()),
    };
    let store = Arc::new(FsArtifactStore::new(args.store.model_dir.clone()));
    Ok(RecommendationService::new(store, metadata))
}

fn print_json<T: Serialize>(value: &T) -> eyre::Result<()> {
    let rendered = serde_json::to_string_pretty(value).wrap_err("failed to render response")?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[rstest]
    fn cli_declaration_is_consistent() {
        Cli::command().debug_assert();
    }

    #[rstest]
    fn train_accepts_rank_and_window_overrides() {
        let cli = Cli::try_parse_from([
            "basket",
            "train",
            "--model-dir",
            "out",
            "--rank",
            "16",
            "--window-days",
            "30",
        ])
        .unwrap();
        let Command::Train(args) = cli.command else {
            panic!("expected the train subcommand");
        };
        assert_eq!(args.rank, Some(16));
        assert_eq!(args.window_days, Some(30));
        assert_eq!(args.store.model_dir, Utf8PathBuf::from("out"));
        assert_eq!(args.interactions, None);
    }

    #[rstest]
    fn recommend_requires_a_user() {
        assert!(Cli::try_parse_from(["basket", "recommend"]).is_err());
    }

    #[rstest]
    fn recommend_defaults_the_count() {
        let cli = Cli::try_parse_from(["basket", "recommend", "--user", "1001"]).unwrap();
        let Command::Recommend(args) = cli.command else {
            panic!("expected the recommend subcommand");
        };
        assert_eq!(args.count, DEFAULT_RECOMMENDATIONS);
        assert!(!args.query.no_metadata);
    }

    #[rstest]
    fn popular_accepts_a_catalog() {
        let cli = Cli::try_parse_from([
            "basket",
            "popular",
            "-n",
            "3",
            "--catalog",
            "catalog.json",
        ])
        .unwrap();
        let Command::Popular(args) = cli.command else {
            panic!("expected the popular subcommand");
        };
        assert_eq!(args.count, 3);
        assert_eq!(args.query.catalog, Some(Utf8PathBuf::from("catalog.json")));
    }
}
