use crate::api::types::{ErrorBody, HealthResponse, SearchResponse};
use crate::config::Config;
use crate::error::{LinkraceError, Result};
use crate::fetch::WikiLinkClient;
use crate::search::{SearchCoordinator, SearchRequest};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// HTTP server wrapping one search coordinator
pub struct HttpServer {
    coordinator: Arc<SearchCoordinator>,
    config: Config,
}

impl HttpServer {
    /// Create a new HTTP server from the loaded configuration.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = WikiLinkClient::new(
            config.wiki.api_url.clone(),
            &config.wiki.user_agent,
            config.http_timeout(),
        )?;
        let coordinator = Arc::new(SearchCoordinator::new(
            fetcher,
            config.worker_count(),
            config.worker_timeout(),
        ));

        Ok(Self { coordinator, config })
    }

    /// Run the HTTP server until shutdown.
    pub async fn run(&self) -> Result<()> {
        let app = self.create_router();

        let addr = format!("{}:{}", self.config.server.bind, self.config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            LinkraceError::Io(std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                format!("Failed to bind to {}: {}", addr, e),
            ))
        })?;

        log::info!("Listening on http://{}", addr);
        log::info!(
            "Search endpoint: http://{}/api/v1/{{start_title}}/{{target_title}}",
            addr
        );

        axum::serve(listener, app).await.map_err(|e| {
            LinkraceError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("HTTP server error: {}", e),
            ))
        })?;

        Ok(())
    }

    /// Create the axum router
    fn create_router(&self) -> Router {
        Router::new()
            .route("/api/v1/:start_title/:target_title", get(handle_search))
            .route("/health", get(handle_health))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(
                        CorsLayer::new()
                            .allow_origin(Any)
                            .allow_methods(Any)
                            .allow_headers(Any),
                    ),
            )
            .with_state(AppState {
                coordinator: Arc::clone(&self.coordinator),
            })
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    coordinator: Arc<SearchCoordinator>,
}

/// Reject empty or whitespace-only titles before any search work begins.
fn validate_titles(start_title: &str, target_title: &str) -> Result<()> {
    if start_title.trim().is_empty() || target_title.trim().is_empty() {
        return Err(LinkraceError::InvalidInput(
            "titles must be non-empty".to_string(),
        ));
    }
    Ok(())
}

/// Handle GET /api/v1/{start_title}/{target_title}
async fn handle_search(
    State(state): State<AppState>,
    Path((start_title, target_title)): Path<(String, String)>,
) -> Response {
    if let Err(e) = validate_titles(&start_title, &target_title) {
        log::debug!("Rejected search request: {}", e);
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                msg: "Invalid request params.".to_string(),
            }),
        )
            .into_response();
    }

    let request = SearchRequest {
        start_title,
        target_title,
    };

    match state.coordinator.search(request).await {
        Ok(outcome) => {
            let status = if outcome.found {
                StatusCode::OK
            } else {
                StatusCode::NOT_FOUND
            };
            (
                status,
                Json(SearchResponse {
                    found: outcome.found,
                    direct_ancestor: outcome.direct_ancestor,
                }),
            )
                .into_response()
        }
        Err(e @ LinkraceError::Upstream(_)) => {
            log::error!("Search failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody { msg: e.to_string() }),
            )
                .into_response()
        }
        Err(e) => {
            log::error!("Search failed unexpectedly: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody { msg: e.to_string() }),
            )
                .into_response()
        }
    }
}

/// Handle GET /health
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FixtureWiki, RunningWiki};
    use std::net::SocketAddr;

    async fn spawn_server(wiki: &RunningWiki) -> SocketAddr {
        let mut config = Config::default();
        config.wiki.api_url = wiki.api_url();
        config.search.worker_timeout_secs = 60;

        let server = HttpServer::new(config).unwrap();
        let app = server.create_router();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_search_found_returns_200_with_ancestor() {
        let wiki = FixtureWiki::new()
            .article("Dog", &["Wolf"])
            .article("Wolf", &["Pack"])
            .spawn()
            .await;
        let addr = spawn_server(&wiki).await;

        let response = reqwest::get(format!("http://{}/api/v1/Dog/Pack", addr))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: SearchResponse = response.json().await.unwrap();
        assert!(body.found);
        assert_eq!(body.direct_ancestor.as_deref(), Some("Wolf"));
    }

    #[tokio::test]
    async fn test_search_miss_returns_404_with_null_ancestor() {
        let wiki = FixtureWiki::new()
            .article("Dog", &["Wolf"])
            .article("Wolf", &[])
            .spawn()
            .await;
        let addr = spawn_server(&wiki).await;

        let response = reqwest::get(format!("http://{}/api/v1/Dog/Basalt", addr))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
        let body: SearchResponse = response.json().await.unwrap();
        assert!(!body.found);
        assert!(body.direct_ancestor.is_none());
    }

    #[tokio::test]
    async fn test_blank_title_returns_400() {
        let wiki = FixtureWiki::new().spawn().await;
        let addr = spawn_server(&wiki).await;

        let response = reqwest::get(format!("http://{}/api/v1/%20/Dog", addr))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: ErrorBody = response.json().await.unwrap();
        assert_eq!(body.msg, "Invalid request params.");
        // Validation rejected the request before any upstream traffic
        assert_eq!(wiki.total_hits(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_returns_502() {
        let wiki = FixtureWiki::new().fail_title("Dog").spawn().await;
        let addr = spawn_server(&wiki).await;

        let response = reqwest::get(format!("http://{}/api/v1/Dog/Cat", addr))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_titles_with_spaces_round_trip() {
        let wiki = FixtureWiki::new()
            .article("Graph Theory", &["Seven Bridges of Konigsberg"])
            .spawn()
            .await;
        let addr = spawn_server(&wiki).await;

        let response = reqwest::get(format!(
            "http://{}/api/v1/Graph%20Theory/Seven%20Bridges%20of%20Konigsberg",
            addr
        ))
        .await
        .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: SearchResponse = response.json().await.unwrap();
        assert_eq!(body.direct_ancestor.as_deref(), Some("Graph Theory"));
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let wiki = FixtureWiki::new().spawn().await;
        let addr = spawn_server(&wiki).await;

        let response = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: HealthResponse = response.json().await.unwrap();
        assert_eq!(body.status, "ok");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }
}
