//! API Server for the Crew API
//!
//! Serves agent CRUD, agent/crew runs and the page scraper over REST.

mod config;
mod routes;
mod state;

use anyhow::Context;
use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Settings;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api_server=debug,crew_runner=debug,page_fetcher=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;
    tracing::info!("Using data directory: {:?}", settings.data_dir);

    let app_state = AppState::new(&settings).await?;

    let mut app = Router::new()
        .merge(routes::health::router())
        .merge(routes::agents::router())
        .merge(routes::runs::router())
        .merge(routes::scrape::router())
        .with_state(app_state);

    if let Some(cors) = cors_layer(&settings.allowed_origins)? {
        tracing::info!("CORS enabled for {:?}", settings.allowed_origins);
        app = app.layer(cors);
    }
    let app = app.layer(TraceLayer::new_for_http());

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("REST API listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Credentialed CORS for the configured origins, or none at all
fn cors_layer(origins: &[String]) -> anyhow::Result<Option<CorsLayer>> {
    if origins.is_empty() {
        return Ok(None);
    }

    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid origin in ALLOWED_ORIGINS: {}", origin))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request()),
    ))
}
