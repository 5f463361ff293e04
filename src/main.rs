use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

// Use library instead of local modules
use pokedle::{
    count_entries, date_checksum, insert_entry, list_recent_outcomes, load_catalog_file,
    outcome_summary, pick_daily_from_store, seed_if_empty, EntryForm, StoreConfig,
    STATS_PAGE_SIZE,
};

/// Pokedle admin CLI
#[derive(Parser)]
#[command(name = "pokedle", version, about = "Pokedle catalog and log administration")]
struct Cli {
    #[command(flatten)]
    store: StoreConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create tables and seed the catalog if the database is empty
    Init,
    /// Import a JSON or CSV catalog into an empty database
    Import {
        /// Catalog file to import
        file: PathBuf,
    },
    /// Add a single entry to the catalog
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        type1: String,
        #[arg(long)]
        type2: Option<String>,
        #[arg(long)]
        evolution_stage: String,
        #[arg(long)]
        total_evolutions: String,
        #[arg(long)]
        color: String,
    },
    /// Show the daily secret (today in UTC unless --date is given)
    Daily {
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List the most recent guesses
    Stats {
        #[arg(long, default_value_t = STATS_PAGE_SIZE)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    // Library warnings (e.g. duplicate names skipped while seeding) go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pokedle=warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Init => run_init(&cli.store),
        Command::Import { file } => run_import(&cli.store, &file),
        Command::Add {
            name,
            type1,
            type2,
            evolution_stage,
            total_evolutions,
            color,
        } => run_add(
            &cli.store,
            EntryForm {
                name,
                type1,
                type2,
                evolution_stage,
                total_evolutions,
                color,
            },
        ),
        Command::Daily { date } => run_daily(&cli.store, date),
        Command::Stats { limit } => run_stats(&cli.store, limit),
    }
}

fn run_init(store: &StoreConfig) -> Result<()> {
    println!("🔧 Setting up database...");
    let conn = store.bootstrap()?;
    println!("✓ Database ready: {}", store.database.display());
    println!("✓ Catalog contains {} entries", count_entries(&conn)?);
    Ok(())
}

fn run_import(store: &StoreConfig, file: &Path) -> Result<()> {
    println!("📂 Loading catalog {}...", file.display());
    let entries = load_catalog_file(file)?;
    println!("✓ Loaded {} entries", entries.len());

    let conn = pokedle::open_database(&store.database)
        .with_context(|| format!("Failed to open database {}", store.database.display()))?;

    if count_entries(&conn)? > 0 {
        println!("⚠️  Catalog already populated - nothing imported");
        return Ok(());
    }

    let inserted = seed_if_empty(&conn, &entries)?;
    println!("✓ Imported {} entries", inserted);
    if inserted < entries.len() {
        println!("✓ Skipped duplicate names: {}", entries.len() - inserted);
    }
    Ok(())
}

fn run_add(store: &StoreConfig, form: EntryForm) -> Result<()> {
    let entry = form.validate()?;
    let conn = store.bootstrap()?;
    let stored = insert_entry(&conn, &entry)?;
    println!("✓ Added {} (#{}) to the catalog", stored.name, stored.id);
    Ok(())
}

fn run_daily(store: &StoreConfig, date: Option<NaiveDate>) -> Result<()> {
    let date = date.unwrap_or_else(|| Utc::now().date_naive());
    let conn = store.bootstrap()?;
    let secret = pick_daily_from_store(&conn, date)?;

    println!("📅 {} (checksum {})", date, date_checksum(date));
    println!("   {} - {} / {}", secret.name, secret.type1, secret.type2.as_deref().unwrap_or("-"));
    println!(
        "   stage {}/{}, {}",
        secret.evolution_stage, secret.total_evolutions, secret.color
    );
    Ok(())
}

fn run_stats(store: &StoreConfig, limit: usize) -> Result<()> {
    let conn = store.bootstrap()?;
    let summary = outcome_summary(&conn)?;
    println!("📊 {} guesses, {} correct", summary.total, summary.matched);

    for outcome in list_recent_outcomes(&conn, limit)? {
        println!(
            "   {}  {:<16} {}  (secret: {})",
            outcome.created_at.format("%Y-%m-%d %H:%M:%S"),
            outcome.submitted_name,
            if outcome.matched { "✅" } else { "❌" },
            outcome.secret_name
        );
    }
    Ok(())
}
