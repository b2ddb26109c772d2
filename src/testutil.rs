//! Test fixtures: an in-process MediaWiki-shaped link API served over a
//! real TCP listener, so fetcher and search tests exercise the actual
//! reqwest/axum path without touching the network.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::title;

/// Builder for a fixture link API.
///
/// Pages are registered with `(namespace, title)` link lists; lookups are
/// case-insensitive like the real API's title resolution. Responses are
/// paginated with `plcontinue` tokens when a page has more links than
/// `page_size`.
pub struct FixtureWiki {
    pages: HashMap<String, Vec<(i64, String)>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    page_size: usize,
}

struct FixtureState {
    pages: HashMap<String, Vec<(i64, String)>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    page_size: usize,
    hits: Mutex<HashMap<String, usize>>,
}

/// A spawned fixture server.
pub struct RunningWiki {
    addr: SocketAddr,
    state: Arc<FixtureState>,
}

impl FixtureWiki {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            failing: HashSet::new(),
            delays: HashMap::new(),
            page_size: usize::MAX,
        }
    }

    /// Register a page with explicit `(namespace, title)` link entries.
    pub fn page(mut self, title: &str, links: Vec<(i64, &str)>) -> Self {
        self.pages.insert(
            title::normalize(title),
            links.into_iter().map(|(ns, t)| (ns, t.to_string())).collect(),
        );
        self
    }

    /// Register a page from an owned link list.
    pub fn page_owned(mut self, title: &str, links: Vec<(i64, String)>) -> Self {
        self.pages.insert(title::normalize(title), links);
        self
    }

    /// Register an article whose links are all namespace-0 articles.
    pub fn article(self, title: &str, links: &[&str]) -> Self {
        self.page(title, links.iter().map(|t| (0, *t)).collect())
    }

    /// Requests for this title answer HTTP 500.
    pub fn fail_title(mut self, title: &str) -> Self {
        self.failing.insert(title::normalize(title));
        self
    }

    /// Requests for this title stall before answering.
    pub fn delay_title(mut self, title: &str, delay: Duration) -> Self {
        self.delays.insert(title::normalize(title), delay);
        self
    }

    /// Maximum links per response page; more triggers `plcontinue`.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Bind to an ephemeral port and serve the fixture.
    pub async fn spawn(self) -> RunningWiki {
        let state = Arc::new(FixtureState {
            pages: self.pages,
            failing: self.failing,
            delays: self.delays,
            page_size: self.page_size,
            hits: Mutex::new(HashMap::new()),
        });

        let app = Router::new()
            .route("/w/api.php", get(handle_links_query))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        RunningWiki { addr, state }
    }
}

impl RunningWiki {
    pub fn api_url(&self) -> String {
        format!("http://{}/w/api.php", self.addr)
    }

    /// Number of HTTP requests made for `title` (each pagination page counts).
    pub fn hits(&self, title: &str) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .get(&title::normalize(title))
            .copied()
            .unwrap_or(0)
    }

    /// Total HTTP requests served.
    pub fn total_hits(&self) -> usize {
        self.state.hits.lock().unwrap().values().sum()
    }
}

async fn handle_links_query(
    State(state): State<Arc<FixtureState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(raw_title) = params.get("titles") else {
        return (StatusCode::BAD_REQUEST, "missing titles param").into_response();
    };
    let key = title::normalize(raw_title);

    *state.hits.lock().unwrap().entry(key.clone()).or_insert(0) += 1;

    if let Some(delay) = state.delays.get(&key) {
        tokio::time::sleep(*delay).await;
    }

    if state.failing.contains(&key) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "fixture failure").into_response();
    }

    // Unknown pages mirror the real API: a page object without a links array
    let links: &[(i64, String)] = state.pages.get(&key).map(Vec::as_slice).unwrap_or(&[]);

    let offset: usize = params
        .get("plcontinue")
        .and_then(|token| token.rsplit('|').next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);

    let end = links.len().min(offset.saturating_add(state.page_size));
    let page_links: Vec<serde_json::Value> = links[offset.min(links.len())..end]
        .iter()
        .map(|(ns, t)| serde_json::json!({"ns": ns, "title": t}))
        .collect();

    let mut body = serde_json::json!({
        "query": {
            "pages": {
                "1": { "pageid": 1, "ns": 0, "title": raw_title, "links": page_links }
            }
        }
    });
    if end < links.len() {
        body["continue"] = serde_json::json!({
            "plcontinue": format!("1|{}", end),
            "continue": "||"
        });
    }

    Json(body).into_response()
}
