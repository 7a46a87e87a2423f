//! robots.txt-aware page fetcher

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{FetchError, Result};
use crate::extract::{extract_text, extract_title};
use crate::robots::RobotsRules;

/// Error text returned when robots.txt forbids the fetch
pub const BLOCKED_BY_ROBOTS: &str = "Blocked by robots.txt";

/// Configuration for the page fetcher
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// User agent sent with every request and matched against robots.txt groups
    pub user_agent: String,
    /// Timeout for the robots.txt request
    pub robots_timeout: Duration,
    /// Timeout for the page request
    pub page_timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: "CrewScout/1.0".to_string(),
            robots_timeout: Duration::from_secs(10),
            page_timeout: Duration::from_secs(20),
        }
    }
}

/// A fetched and flattened page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageContent {
    pub title: String,
    pub text: String,
    pub html: String,
}

/// Result of a fetch: either the page or the robots.txt refusal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FetchOutcome {
    Page(PageContent),
    Blocked { error: String },
}

impl FetchOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}

pub struct PageFetcher {
    client: Client,
    config: FetcherConfig,
}

impl PageFetcher {
    pub fn new(config: FetcherConfig) -> Result<Self> {
        let client = Client::builder().user_agent(&config.user_agent).build()?;
        Ok(Self { client, config })
    }

    /// Fetch `raw_url`, checking robots.txt first when `respect_robots` is set.
    ///
    /// A robots.txt refusal is returned as [`FetchOutcome::Blocked`], not as an
    /// error. Transport failures and non-2xx page responses are errors.
    pub async fn fetch(&self, raw_url: &str, respect_robots: bool) -> Result<FetchOutcome> {
        let url = parse_http_url(raw_url)?;

        if respect_robots && !self.can_fetch(&url).await {
            info!("robots.txt disallows {}", url);
            return Ok(FetchOutcome::Blocked {
                error: BLOCKED_BY_ROBOTS.to_string(),
            });
        }

        debug!("Fetching page {}", url);
        let resp = self
            .client
            .get(url.clone())
            .timeout(self.config.page_timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = resp.text().await?;
        Ok(FetchOutcome::Page(PageContent {
            title: extract_title(&html),
            text: extract_text(&html),
            html,
        }))
    }

    /// Only an explicit disallow returns false; any failure to obtain
    /// robots.txt is permissive.
    async fn can_fetch(&self, url: &Url) -> bool {
        let robots_url = match url.join("/robots.txt") {
            Ok(robots_url) => robots_url,
            Err(e) => {
                warn!("Cannot derive robots.txt location for {}: {}", url, e);
                return true;
            }
        };

        let resp = match self
            .client
            .get(robots_url.clone())
            .timeout(self.config.robots_timeout)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!("robots.txt fetch failed for {}, allowing: {}", robots_url, e);
                return true;
            }
        };

        if resp.status().as_u16() >= 400 {
            debug!("{} returned HTTP {}, allowing", robots_url, resp.status());
            return true;
        }

        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("robots.txt body unreadable for {}, allowing: {}", robots_url, e);
                return true;
            }
        };

        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }

        RobotsRules::parse(&body).is_allowed(&self.config.user_agent, &path)
    }
}

fn parse_http_url(raw_url: &str) -> Result<Url> {
    let url = Url::parse(raw_url).map_err(|e| FetchError::invalid_url(raw_url, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::invalid_url(
            raw_url,
            format!("unsupported scheme '{}'", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};

    const PAGE: &str =
        "<html><head><title> Quarterly Report </title></head><body><p>Revenue   rose</p></body></html>";

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn site(robots: Option<&'static str>) -> Router {
        let app = Router::new()
            .route("/x", get(|| async { PAGE }))
            .route("/open", get(|| async { PAGE }))
            .route(
                "/broken",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            );
        match robots {
            Some(body) => app.route("/robots.txt", get(move || async move { body })),
            None => app,
        }
    }

    fn fetcher() -> PageFetcher {
        PageFetcher::new(FetcherConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_blocked_when_robots_disallows_path() {
        let base = serve(site(Some("User-agent: *\nDisallow: /x\n"))).await;

        let outcome = fetcher().fetch(&format!("{}/x", base), true).await.unwrap();
        assert_eq!(
            outcome,
            FetchOutcome::Blocked {
                error: BLOCKED_BY_ROBOTS.to_string()
            }
        );
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({"error": "Blocked by robots.txt"})
        );
    }

    #[tokio::test]
    async fn test_page_returned_when_robots_allows() {
        let base = serve(site(Some("User-agent: *\nDisallow: /private\n"))).await;

        let outcome = fetcher().fetch(&format!("{}/x", base), true).await.unwrap();
        match outcome {
            FetchOutcome::Page(page) => {
                assert_eq!(page.title, "Quarterly Report");
                assert_eq!(page.text, "Quarterly Report Revenue rose");
                assert_eq!(page.html, PAGE);
            }
            other => panic!("Expected page, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_robots_ignored_when_not_respected() {
        let base = serve(site(Some("User-agent: *\nDisallow: /\n"))).await;

        let outcome = fetcher().fetch(&format!("{}/x", base), false).await.unwrap();
        assert!(!outcome.is_blocked());
    }

    #[tokio::test]
    async fn test_missing_robots_is_permissive() {
        let base = serve(site(None)).await;

        let outcome = fetcher().fetch(&format!("{}/open", base), true).await.unwrap();
        assert!(!outcome.is_blocked());
    }

    #[tokio::test]
    async fn test_group_for_our_user_agent_applies() {
        let base = serve(site(Some("User-agent: crewscout\nDisallow: /x\n"))).await;

        let fetcher = fetcher();
        assert!(fetcher.fetch(&format!("{}/x", base), true).await.unwrap().is_blocked());
        assert!(!fetcher.fetch(&format!("{}/open", base), true).await.unwrap().is_blocked());
    }

    #[tokio::test]
    async fn test_non_success_page_is_an_error() {
        let base = serve(site(None)).await;

        let result = fetcher().fetch(&format!("{}/broken", base), true).await;
        match result {
            Err(FetchError::HttpStatus { status, .. }) => assert_eq!(status, 500),
            other => panic!("Expected HttpStatus error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_urls_are_rejected() {
        let fetcher = fetcher();
        assert!(matches!(
            fetcher.fetch("not a url", true).await,
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(matches!(
            fetcher.fetch("ftp://example.test/file", true).await,
            Err(FetchError::InvalidUrl { .. })
        ));
    }
}
