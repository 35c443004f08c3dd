//! peeps-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store and an image directory, and serves the JSON API
//! over HTTP.
//!
//! # Example `config.toml`
//!
//! ```toml
//! host             = "0.0.0.0"
//! port             = 5232
//! public_base_url  = "https://peeps.example.com"
//! store_path       = "~/.local/share/peeps/peeps.db"
//! image_dir        = "~/.local/share/peeps/images"
//! max_upload_bytes = 5242880
//! ```
//!
//! Every key can be overridden with a `PEEPS_`-prefixed environment
//! variable, e.g. `PEEPS_PORT=8080`.

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use peeps_api::{AppState, FsImageStore};
use peeps_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Peeps API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  if let Some(parent) = server_cfg.store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  // Open SQLite store.
  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;

  let images = FsImageStore::open(&server_cfg.image_dir, &server_cfg.public_base_url)
    .await
    .with_context(|| format!("failed to open image dir {:?}", server_cfg.image_dir))?
    .with_max_bytes(server_cfg.max_upload_bytes);

  let app = peeps_api::api_router(AppState::new(store, images));
  let address = server_cfg.address();

  tracing::info!(
    store = ?server_cfg.store_path,
    images = ?server_cfg.image_dir,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
