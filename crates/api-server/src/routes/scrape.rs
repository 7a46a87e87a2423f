//! Page scrape endpoint

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::warn;

use page_fetcher::{FetchError, FetchOutcome};

use crate::state::AppState;

use super::{bad_request, error_response, RouteError};

const MIN_URL_LENGTH: usize = 5;

#[derive(Debug, Deserialize)]
pub struct ScrapeQuery {
    pub url: String,
    #[serde(default = "default_respect_robots")]
    pub respect_robots: bool,
}

fn default_respect_robots() -> bool {
    true
}

/// GET /api/v1/scrape?url=...&respect_robots=...
async fn scrape(
    State(state): State<AppState>,
    Query(query): Query<ScrapeQuery>,
) -> Result<Json<FetchOutcome>, RouteError> {
    if query.url.trim().chars().count() < MIN_URL_LENGTH {
        return Err(bad_request(format!(
            "url must be at least {} characters",
            MIN_URL_LENGTH
        )));
    }

    match state
        .fetcher()
        .fetch(query.url.trim(), query.respect_robots)
        .await
    {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e @ FetchError::InvalidUrl { .. }) => Err(bad_request(e.to_string())),
        Err(e) => {
            warn!("Scrape of {} failed: {}", query.url, e);
            Err(error_response(StatusCode::BAD_GATEWAY, e.to_string()))
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/scrape", get(scrape))
}
