// Pokedle - Core Library
// Exposes all modules for use in the admin CLI, the web server, and tests

pub mod error;
pub mod db;
pub mod catalog;    // Catalog Store - entries keyed by case-insensitive name
pub mod daily;      // Daily Selector - date checksum mod catalog size
pub mod evaluate;   // Guess Evaluator - five attribute comparison rows
pub mod outcomes;   // Guess Log - append-only outcomes
pub mod game;       // One guess submission end to end
pub mod config;

// Only compile the web surface when the server feature is enabled
#[cfg(feature = "server")]
pub mod web;

// Re-export commonly used types
pub use error::{FieldError, PokedleError, Result};
pub use db::{open_database, setup_database};
pub use catalog::{
    CatalogEntry, NewEntry, EntryForm,
    insert_entry, lookup_entry, list_entries, count_entries,
    seed_if_empty, load_catalog_file, bundled_catalog,
};
pub use daily::{pick_daily, pick_daily_from_store, date_checksum};
pub use evaluate::{evaluate, Attribute, ComparisonRow, GuessResult};
pub use outcomes::{
    GuessOutcome, OutcomeSummary, STATS_PAGE_SIZE,
    append_outcome, list_recent_outcomes, outcome_summary,
};
pub use game::play_guess;
pub use config::StoreConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
