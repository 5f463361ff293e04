// ⚙️ Configuration shared by the CLI and the web server
// Values come from flags first, then environment variables, then defaults

use crate::catalog::{bundled_catalog, load_catalog_file, seed_if_empty};
use crate::db::open_database;
use anyhow::{Context, Result};
use clap::Args;
use rusqlite::Connection;
use std::path::PathBuf;

pub const DEFAULT_DATABASE: &str = "data.sqlite3";
pub const DEFAULT_CATALOG: &str = "pokedex.json";

/// Where the game keeps its data
#[derive(Debug, Clone, Args)]
pub struct StoreConfig {
    /// SQLite database file
    #[arg(long, env = "POKEDLE_DB", default_value = DEFAULT_DATABASE)]
    pub database: PathBuf,

    /// Catalog used to seed an empty database (JSON array or CSV)
    #[arg(long, env = "POKEDLE_CATALOG", default_value = DEFAULT_CATALOG)]
    pub catalog: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            catalog: PathBuf::from(DEFAULT_CATALOG),
        }
    }
}

impl StoreConfig {
    /// Open the database, create tables and seed the catalog on first boot
    pub fn bootstrap(&self) -> Result<Connection> {
        let conn = open_database(&self.database)
            .with_context(|| format!("Failed to open database {}", self.database.display()))?;

        let seeded = seed_if_empty(&conn, &self.seed_catalog()?)?;
        if seeded > 0 {
            tracing::info!(seeded, database = %self.database.display(), "seeded pokedex into database");
        }

        Ok(conn)
    }

    /// The configured catalog file, or the bundled one when that file does not exist
    pub fn seed_catalog(&self) -> Result<Vec<crate::catalog::NewEntry>> {
        if self.catalog.exists() {
            Ok(load_catalog_file(&self.catalog)?)
        } else {
            tracing::debug!(catalog = %self.catalog.display(), "catalog file missing, using bundled pokedex");
            Ok(bundled_catalog()?)
        }
    }
}
