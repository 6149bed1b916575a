//! CLI for the book recommender

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use book_recommender::persistence::{load_catalog, load_embeddings, save_embeddings};
use book_recommender::server::{self, AppState};
use book_recommender::{AnyIndex, Config, IndexKind, Recommendation, Recommender};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

#[derive(Parser)]
#[command(name = "book-recommender")]
#[command(about = "Recommend books similar to one you liked", long_about = None)]
struct Cli {
    /// Embedding snapshot (.bin) or JSON matrix (.json), one row per book id
    #[arg(long, default_value = "data/item_embeddings.bin")]
    embeddings: PathBuf,

    /// Catalog JSON with book_id, title and authors per book
    #[arg(long, default_value = "data/books.json")]
    catalog: PathBuf,

    /// Index type to use for search (overrides the config file)
    #[arg(long, value_enum)]
    index: Option<IndexType>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy)]
enum IndexType {
    Flat,
    Hnsw,
}

impl From<IndexType> for IndexKind {
    fn from(t: IndexType) -> Self {
        match t {
            IndexType::Flat => IndexKind::Flat,
            IndexType::Hnsw => IndexKind::Hnsw,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend books similar to the given book id
    Recommend {
        book_id: usize,
        /// Number of recommendations
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Recommend books similar to the book with this exact title
    RecommendTitle {
        title: String,
        /// Number of recommendations
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// List books whose title contains a fragment
    Search { fragment: String },
    /// Start the HTTP API server
    Serve {
        /// Address to bind to
        #[arg(long)]
        addr: Option<String>,
    },
    /// Convert a JSON embedding matrix into a binary snapshot
    Convert { input: PathBuf, output: PathBuf },
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => Config::from_file(p)
            .with_context(|| format!("failed to read config {}", p.display())),
        None => Ok(Config::default()),
    }
}

fn build_recommender(cli: &Cli, config: &Config) -> Result<Recommender<AnyIndex>> {
    let store = load_embeddings(&cli.embeddings)
        .with_context(|| format!("failed to load embeddings from {}", cli.embeddings.display()))?;
    let catalog = load_catalog(&cli.catalog)
        .with_context(|| format!("failed to load catalog from {}", cli.catalog.display()))?;

    info!(index = ?config.index.kind, "building similarity index");
    Recommender::build(store, catalog, config.index.clone())
        .context("failed to build similarity index")
}

fn print_recommendations(seed: &str, recs: &[Recommendation]) {
    println!("You chose: \"{}\"", seed);
    if recs.is_empty() {
        println!("No similar books found");
        return;
    }
    println!("Most similar books:");
    for (i, r) in recs.iter().enumerate() {
        println!(
            "{:>3}. {} by {} (id: {}, distance: {:.4})",
            i + 1,
            r.name,
            r.author,
            r.item_id,
            r.distance
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("book_recommender=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(index) = cli.index {
        config.index.kind = index.into();
    }

    match &cli.command {
        Commands::Convert { input, output } => {
            let store = load_embeddings(input)
                .with_context(|| format!("failed to load {}", input.display()))?;
            save_embeddings(output, &store)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!(
                "Wrote {} embeddings of dimension {} to {}",
                store.len(),
                store.dimension(),
                output.display()
            );
        }
        Commands::Search { fragment } => {
            let catalog = load_catalog(&cli.catalog)
                .with_context(|| format!("failed to load catalog from {}", cli.catalog.display()))?;
            let matches = catalog.find_by_title(fragment);
            if matches.is_empty() {
                println!("No books match \"{}\"", fragment);
            } else {
                for (id, book) in matches {
                    println!("{:>6}  {} by {}", id, book.title, book.authors);
                }
            }
        }
        Commands::Recommend { book_id, count } => {
            let recommender = build_recommender(&cli, &config)?;
            let count = count.unwrap_or(config.default_count);
            let recs = recommender.recommend(*book_id, count)?;
            let seed = recommender.catalog().name_of(*book_id)?;
            print_recommendations(seed, &recs);
        }
        Commands::RecommendTitle { title, count } => {
            let recommender = build_recommender(&cli, &config)?;
            let count = count.unwrap_or(config.default_count);
            let (seed_id, recs) = recommender.recommend_by_title(title, count)?;
            print_recommendations(recommender.catalog().name_of(seed_id)?, &recs);
        }
        Commands::Serve { addr } => {
            let recommender = build_recommender(&cli, &config)?;
            let addr = addr.clone().unwrap_or_else(|| config.server_addr.clone());
            server::serve(&addr, AppState::new(recommender, config.default_count)).await?;
        }
    }

    Ok(())
}
