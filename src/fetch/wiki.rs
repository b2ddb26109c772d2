use crate::error::{LinkraceError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Links within this namespace are regular articles; everything else
/// (talk pages, categories, templates, ...) is excluded from traversal.
const ARTICLE_NAMESPACE: i64 = 0;

/// One page of a links query response.
///
/// Shape (MediaWiki `action=query&prop=links`):
/// `{"continue": {"plcontinue": "..."}, "query": {"pages": {"<id>": {"links": [{"ns": 0, "title": "..."}]}}}}`
#[derive(Debug, Deserialize)]
struct LinksResponse {
    #[serde(rename = "continue")]
    continuation: Option<Continuation>,
    query: Option<QueryPages>,
}

#[derive(Debug, Deserialize)]
struct Continuation {
    plcontinue: String,
}

#[derive(Debug, Deserialize)]
struct QueryPages {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    /// Absent for pages with no outbound links (and for missing pages).
    #[serde(default)]
    links: Vec<PageLink>,
}

#[derive(Debug, Deserialize)]
struct PageLink {
    ns: i64,
    title: String,
}

/// Client for the article-link query API.
///
/// Fetches the ordered outbound links of one article, following pagination
/// until the response carries no continuation token. Cheap to clone: the
/// underlying connection pool is shared between clones, so each worker can
/// carry its own handle.
#[derive(Clone)]
pub struct WikiLinkClient {
    client: Client,
    api_url: String,
}

impl WikiLinkClient {
    /// Create a new link client.
    ///
    /// # Arguments
    ///
    /// * `api_url` - MediaWiki api.php endpoint to query
    /// * `user_agent` - client-identifying header sent on every request
    /// * `timeout` - per-request timeout
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed (invalid user agent).
    pub fn new(api_url: String, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| LinkraceError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, api_url })
    }

    /// Fetch the ordered set of article titles `title` links to.
    ///
    /// Issues follow-up requests with the `plcontinue` token until the
    /// response indicates no further pages, concatenating the namespace-0
    /// titles of every page in response order. The result is not
    /// deduplicated; traversal deduplicates through its visited set.
    ///
    /// Any network, status, or parse failure collapses to
    /// [`LinkraceError::Fetch`]; the caller decides whether that is fatal.
    pub async fn fetch_links(&self, title: &str) -> Result<Vec<String>> {
        let mut titles = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let response = self.fetch_page(title, continuation.as_deref()).await?;

            for page in response.query.iter().flat_map(|q| q.pages.values()) {
                for link in &page.links {
                    if link.ns == ARTICLE_NAMESPACE {
                        titles.push(link.title.clone());
                    }
                }
            }

            match response.continuation {
                Some(cont) => continuation = Some(cont.plcontinue),
                None => break,
            }
        }

        log::debug!("Fetched {} links for '{}'", titles.len(), title);
        Ok(titles)
    }

    /// Issue a single links-query request, optionally continued.
    async fn fetch_page(&self, title: &str, plcontinue: Option<&str>) -> Result<LinksResponse> {
        let mut params = vec![
            ("action", "query"),
            ("titles", title),
            ("format", "json"),
            ("prop", "links"),
            ("pllimit", "max"),
        ];
        if let Some(token) = plcontinue {
            params.push(("plcontinue", token));
        }

        let response = self
            .client
            .get(&self.api_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| LinkraceError::Fetch(format!("Network error for '{}': {}", title, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LinkraceError::Fetch(format!(
                "Link API returned {} for '{}'",
                status, title
            )));
        }

        response
            .json()
            .await
            .map_err(|e| LinkraceError::Fetch(format!("Failed to parse response for '{}': {}", title, e)))
    }
}
