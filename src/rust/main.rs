use anyhow::Context;
use clap::Parser;
use log::info;

use sentimento::db::AnalysisRepository;
use sentimento::{api, db, Args, ModelManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before parsing so its values act as environment fallbacks
    dotenvy::dotenv().ok();
    sentimento::init_logger();
    let args = Args::parse();

    info!("=== Starting Sentiment Analysis API ===");

    let manager = ModelManager::new(args.artifact_config());
    info!(
        "Looking for model artifacts at {:?} and {:?}",
        manager.get_model_path(),
        manager.get_vectorizer_path()
    );
    let analyzer = manager.load_or_degrade();

    let pool = db::create_pool(&args.database_url, args.max_connections)
        .await
        .context("Failed to connect to the database")?;
    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    let stored = AnalysisRepository::count(&mut *pool.acquire().await?).await?;
    info!("Database ready ({} analyses stored)", stored);

    api::serve(api::AppState::new(analyzer, pool), args.bind)
        .await
        .context("HTTP server failed")?;

    info!("=== Shutdown Complete ===");
    Ok(())
}
