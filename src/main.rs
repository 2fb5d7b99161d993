use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use edurec_api::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, PgRecommendationStore},
    services::{NoopPreferenceVectorizer, RecommendationEngine},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let store = Arc::new(PgRecommendationStore::new(pool));
    let engine = Arc::new(RecommendationEngine::new(
        store,
        Arc::new(NoopPreferenceVectorizer),
    ));

    let state = AppState::new(engine);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Recommendation service listening");
    axum::serve(listener, app).await?;

    Ok(())
}
