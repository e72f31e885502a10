use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use partscout::api::{create_router, AppState};
use partscout::config::Config;
use partscout::db::{Database, DatabaseBackend, LibSqlBackend};
use partscout::intelligence::HardwareAssistant;
use partscout::llm::{GeminiClient, GenerativeBackend};
use partscout::services;

#[derive(Parser)]
#[command(name = "partscout")]
#[command(about = "GraphQL hardware assistant for PC part identification, chat and product matching")]
struct Args {
    /// Upsert categories and products from a JSON file before serving
    #[arg(long, value_name = "FILE")]
    seed_catalog: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "partscout=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Initializing database...");
    let raw_db = Database::new(&config.database).await?;
    let db: Arc<dyn DatabaseBackend> = Arc::new(LibSqlBackend::new(raw_db));
    db.sync().await?;

    if let Some(path) = &args.seed_catalog {
        tracing::info!("Seeding catalog from {}...", path.display());
        let seed = services::read_seed_file(path).await?;
        services::seed_catalog(db.as_ref(), &seed).await?;
    }

    tracing::info!("Initializing Gemini client: {}...", config.gemini.model);
    let gemini: Arc<dyn GenerativeBackend> = Arc::new(GeminiClient::new(&config.gemini)?);
    let assistant = HardwareAssistant::new(gemini);

    tokio::fs::create_dir_all(&config.storage.media_root).await?;

    let state = AppState::new(config.clone(), db, assistant);
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Partscout starting on http://{}", addr);
    tracing::info!("  GraphQL:      http://{}/graphql", addr);
    tracing::info!("  Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
