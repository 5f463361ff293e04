// Pokedle - Web Server

use anyhow::{Context, Result};
use clap::Parser;
use pokedle::web::{build_router, AppState};
use pokedle::{count_entries, StoreConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pokedle-server", version, about = "Pokedle web server")]
struct Cli {
    #[command(flatten)]
    store: StoreConfig,

    /// Listen address; defaults to 0.0.0.0 on $PORT (or 3000)
    #[arg(long, env = "POKEDLE_LISTEN")]
    listen: Option<String>,

    /// Directory served under /static
    #[arg(long, env = "POKEDLE_WEB_DIR", default_value = "web")]
    web_dir: PathBuf,
}

impl Cli {
    fn listen_addr(&self) -> String {
        self.listen.clone().unwrap_or_else(|| {
            let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
            format!("0.0.0.0:{}", port)
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pokedle=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let conn = cli.store.bootstrap()?;
    info!(
        database = %cli.store.database.display(),
        entries = count_entries(&conn)?,
        "database ready"
    );

    let app = build_router(AppState::new(conn), &cli.web_dir);

    let addr = cli.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(%addr, "Pokedle app listening");

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
