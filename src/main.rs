use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use taxguide::{AppState, config::Config, create_router};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging: livello di default `info`, sovrascrivibile con RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Inizializza la configurazione
    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;
    config.print_info();

    // Pool di connessioni verso il Postgres di Supabase
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.database_url)
        .await?;
    info!("Connected to database");

    let state = Arc::new(AppState::new(pool, &config));
    let app = create_router(state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    // Avvia il server
    axum::serve(listener, app).await?;

    Ok(())
}
