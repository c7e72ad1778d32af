use anyhow::Result;
use lubricentro_api::api;
use lubricentro_api::auth::{extractors::AppState, issuer::TokenIssuer};
use lubricentro_api::{AppConfig, Database};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lubricentro_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; a missing or bad signing setup stops the process here
    let config = match AppConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };
    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    info!("Starting Lubricentro API on {}", bind_address);

    let token_issuer = match TokenIssuer::new(&config.auth) {
        Ok(issuer) => {
            info!(
                "Token issuer ready (iss={}, lifetime={}s)",
                issuer.issuer(),
                issuer.lifetime().num_seconds()
            );
            issuer
        }
        Err(e) => {
            error!("Failed to initialize token issuer: {}", e);
            return Err(e.into());
        }
    };

    let database = match Database::new(&config.database.url, config.database.max_connections).await {
        Ok(db) => {
            info!("Database connected successfully");
            db
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e);
        }
    };

    let app_state = AppState::new(database, token_issuer, config);
    let app = api::create_app(app_state).await?;

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
