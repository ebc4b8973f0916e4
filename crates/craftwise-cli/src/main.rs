//! Craftwise - which recipes can this account craft right now.
//!
//! Loads a snapshot from a data directory, resolves craftability and prints
//! one page of the filtered recipe list.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use craftwise_cli::{CliConfig, FileFavoritesStore, PageReport, SnapshotLoader, CONFIG_FILE};
use craftwise_common::{CharacterName, RecipeId};
use craftwise_resolver::{
    Discipline, Favorites, Rarity, RecipeBrowser, Session, SortKey, SourceBus, TypeFilter,
};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Sort order accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Catalog,
    Name,
    Rating,
    Rarity,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Catalog => Self::Catalog,
            SortArg::Name => Self::Name,
            SortArg::Rating => Self::Rating,
            SortArg::Rarity => Self::Rarity,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "craftwise", version)]
#[command(about = "List the recipes an account can craft, and who can craft them")]
struct Args {
    /// Config file
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Data directory (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Search output item names (2+ characters)
    #[arg(long, short)]
    search: Option<String>,

    /// Keep recipes of these disciplines
    #[arg(long = "discipline")]
    disciplines: Vec<Discipline>,

    /// Keep recipes whose output has this rarity
    #[arg(long)]
    rarity: Option<Rarity>,

    /// Type group (Refinement, Component, Upgrade) or exact type
    #[arg(long = "type")]
    recipe_type: Option<String>,

    /// Lowest minimum rating
    #[arg(long, default_value_t = 0)]
    min_rating: u32,

    /// Highest minimum rating
    #[arg(long, default_value_t = craftwise_resolver::MAX_RATING)]
    max_rating: u32,

    /// Keep recipes these characters can craft
    #[arg(long = "character")]
    characters: Vec<String>,

    /// Only recipes craftable now
    #[arg(long)]
    craftable: bool,

    /// Only favorite recipes
    #[arg(long)]
    favorites: bool,

    /// Sort order
    #[arg(long, value_enum, default_value = "catalog")]
    sort: SortArg,

    /// Reverse the sort order
    #[arg(long)]
    desc: bool,

    /// Zero-based page
    #[arg(long, default_value_t = 0)]
    page: usize,

    /// Recipes per page (overrides config)
    #[arg(long)]
    page_size: Option<usize>,

    /// Characters to show first (overrides config)
    #[arg(long = "prefer")]
    preferred: Vec<String>,

    /// Toggle a recipe's favorite state before listing
    #[arg(long = "toggle-favorite")]
    toggle_favorites: Vec<u32>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn init_tracing(filter: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(env) => env,
        Err(_) => EnvFilter::try_new(filter).context("invalid log filter")?,
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = CliConfig::try_load_from(&args.config);
    let filter = loaded
        .as_ref()
        .map_or(craftwise_cli::DEFAULT_LOG_FILTER, |c| c.log_filter.as_str())
        .to_string();
    init_tracing(&filter)?;

    info!("Craftwise {}", env!("CARGO_PKG_VERSION"));
    let mut config = CliConfig::or_default(loaded, &args.config);
    if let Some(dir) = args.data_dir.clone() {
        config.data_dir = dir;
    }
    if let Some(size) = args.page_size {
        config.page_size = size;
    }
    if !args.preferred.is_empty() {
        config.preferred_characters = args.preferred.clone();
    }
    config.validate();

    let session = Session::new(SourceBus::new(config.channel_capacity));
    let stats = SnapshotLoader::new(&config.data_dir)
        .load_into(&session)
        .with_context(|| format!("loading {}", config.data_dir.display()))?;
    if !stats.missing_files.is_empty() {
        warn!("{} snapshot files missing; results are partial", stats.missing_files.len());
    }

    let mut favorites = Favorites::open(Box::new(FileFavoritesStore::new(&config.favorites_path)));
    for id in &args.toggle_favorites {
        let now = favorites
            .toggle(RecipeId::new(*id))
            .with_context(|| format!("saving favorite {id}"))?;
        info!("Recipe {} {}", id, if now { "favorited" } else { "unfavorited" });
    }

    let mut browser = RecipeBrowser::new(config.page_size);
    browser.update_filters(|f| {
        f.search = args.search.clone().unwrap_or_default();
        f.disciplines = args.disciplines.iter().copied().collect();
        f.rarity = args
            .rarity
            .map_or(craftwise_resolver::RarityFilter::All, craftwise_resolver::RarityFilter::Only);
        f.recipe_type = args.recipe_type.as_deref().map_or(TypeFilter::All, TypeFilter::parse);
        f.level = craftwise_resolver::LevelRange::new(args.min_rating, args.max_rating);
        f.characters = args.characters.iter().map(|c| CharacterName::from(c.as_str())).collect();
        f.craftable_only = args.craftable;
        f.favorites_only = args.favorites;
    });
    browser.set_sort(args.sort.into(), args.desc);
    browser.set_page(args.page);

    let snapshot = session.snapshot();
    let page = browser.query(&snapshot.query_context(favorites.ids()));
    let preferred: HashSet<CharacterName> = config
        .preferred_characters
        .iter()
        .map(|c| CharacterName::from(c.as_str()))
        .collect();
    let report = PageReport::new(&page, &preferred);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_table());
    }
    Ok(())
}
