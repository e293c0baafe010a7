use std::path::Path;

use tracing_subscriber::EnvFilter;

use arcade_recs::{
    config::Config,
    routes::{create_router, AppState},
    services::{catalog::load_engine, SeriesRules},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::from_env()?;

    let series = match &config.series_rules_path {
        Some(path) => SeriesRules::from_json_file(Path::new(path))?,
        None => SeriesRules::default(),
    };

    let source = config.catalog_source();
    let engine = load_engine(source.as_ref(), series).await?;

    let state = AppState::new(engine).with_default_count(config.default_recommendation_count);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
