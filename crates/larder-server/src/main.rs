//! larder-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the
//! SQLite store, wires up the plan-generator client, and serves the JSON
//! API over HTTP.
//!
//! # Configuration
//!
//! ```toml
//! host = "127.0.0.1"
//! port = 8080
//! store_path = "~/.local/share/larder/larder.db"
//! generator_endpoint = "http://localhost:8000/generate"
//! # generator_token = "..."
//! ```
//!
//! Every key can also be supplied as an environment variable with the
//! `LARDER_` prefix, e.g. `LARDER_PORT=9000`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::{
  Json, Router,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
  routing::get,
};
use clap::Parser;
use larder_api::AppState;
use larder_gen_http::{GeneratorConfig, HttpPlanGenerator};
use larder_store_sqlite::SqliteStore;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Larder meal-planning server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
struct ServerConfig {
  host:               String,
  port:               u16,
  store_path:         PathBuf,
  /// Base URL of the external plan-generation service.
  generator_endpoint: String,
  /// Bearer token to send to the generator, if it expects one.
  #[serde(default)]
  generator_token:    Option<String>,
}

type ServerState = AppState<SqliteStore, HttpPlanGenerator>;

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

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("LARDER"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Build the generator client.
  let generator = HttpPlanGenerator::new(GeneratorConfig {
    bearer_token: server_cfg.generator_token.clone(),
    ..GeneratorConfig::new(server_cfg.generator_endpoint.clone())
  })
  .context("failed to build the plan-generator client")?;

  let state = ServerState {
    store:     Arc::new(store),
    generator: Arc::new(generator),
  };

  let app = Router::new()
    .route("/health", get(health))
    .with_state(state.clone())
    .nest("/api", larder_api::api_router(state))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Liveness probe: 200 when the store answers, 503 otherwise.
async fn health(State(state): State<ServerState>) -> impl IntoResponse {
  match state.store.ping().await {
    Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
    Err(e) => {
      tracing::warn!(error = %e, "store ping failed");
      (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "status": "degraded" })),
      )
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
