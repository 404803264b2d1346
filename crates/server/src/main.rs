use anyhow::Result;
use db::DBService;
use server::{AppState, app};
use services::services::config::Config;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let db = DBService::new(&config.database_url).await?;
    let state = AppState::new(db, config.clone());

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;

    Ok(())
}
