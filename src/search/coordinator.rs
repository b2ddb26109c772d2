//! Per-request search orchestration: direct and depth-1 checks, worker
//! dispatch, first-success collection, and sibling cancellation.

use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::{LinkraceError, Result};
use crate::fetch::WikiLinkClient;
use crate::search::partition::partition;
use crate::search::worker::{self, WorkerTask};
use crate::title;

/// One inbound search: immutable for the lifetime of the request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub start_title: String,
    pub target_title: String,
}

/// Terminal answer for one search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub found: bool,
    pub direct_ancestor: Option<String>,
}

impl SearchOutcome {
    fn found_via(direct_ancestor: String) -> Self {
        Self {
            found: true,
            direct_ancestor: Some(direct_ancestor),
        }
    }

    fn not_found() -> Self {
        Self {
            found: false,
            direct_ancestor: None,
        }
    }
}

/// Owns the worker pool for one search request at a time.
///
/// Each [`search`](Self::search) call runs end-to-end with its own workers
/// and holds no state afterwards; pools are never reused across requests.
/// Workers keep private visited sets, so two workers may expand the same
/// title independently and the answer is the first match found, not a
/// shortest path.
pub struct SearchCoordinator {
    fetcher: WikiLinkClient,
    worker_count: usize,
    worker_timeout: Duration,
}

impl SearchCoordinator {
    pub fn new(fetcher: WikiLinkClient, worker_count: usize, worker_timeout: Duration) -> Self {
        Self {
            fetcher,
            worker_count: worker_count.max(1),
            worker_timeout,
        }
    }

    /// Answer whether the target is reachable from the start article, and
    /// through which immediate predecessor.
    ///
    /// # Errors
    ///
    /// [`LinkraceError::Upstream`] when the link source cannot be reached
    /// for the start article itself; that failure is retriable and distinct
    /// from a not-found outcome.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchOutcome> {
        let search_id = Uuid::new_v4();
        log::info!(
            "[{}] search '{}' -> '{}'",
            search_id,
            request.start_title,
            request.target_title
        );

        if title::titles_match(&request.start_title, &request.target_title) {
            log::info!("[{}] start and target are the same article", search_id);
            return Ok(SearchOutcome::found_via(request.start_title));
        }

        // Depth-1 check: a failure here means the link source itself is
        // unreachable, which the caller must see as retriable.
        let frontier = self
            .fetcher
            .fetch_links(&request.start_title)
            .await
            .map_err(|e| match e {
                LinkraceError::Fetch(msg) => LinkraceError::Upstream(msg),
                other => other,
            })?;

        let target = title::normalize(&request.target_title);
        if frontier.iter().any(|t| title::normalize(t) == target) {
            log::info!("[{}] target linked directly from the start article", search_id);
            return Ok(SearchOutcome::found_via(request.start_title));
        }

        // Dispatch: one fire-and-forget traversal per slice, all racing
        // toward the same target with a shared wall-clock deadline.
        let deadline = Instant::now() + self.worker_timeout;
        let slices = partition(frontier, self.worker_count);
        let mut workers = JoinSet::new();
        for assigned_titles in slices {
            let task = WorkerTask {
                assigned_titles,
                target_title: request.target_title.clone(),
            };
            workers.spawn(worker::traverse(task, self.fetcher.clone(), deadline));
        }
        log::info!("[{}] dispatched {} workers", search_id, self.worker_count);

        // Collect: first positive report wins and cancels the rest. A
        // sibling's report racing the cancellation is simply never observed.
        let mut abnormal_exits = 0usize;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(report) if report.found => {
                    log::info!(
                        "[{}] target found via '{}'",
                        search_id,
                        report.direct_ancestor.as_deref().unwrap_or_default()
                    );
                    workers.abort_all();
                    return Ok(SearchOutcome {
                        found: report.found,
                        direct_ancestor: report.direct_ancestor,
                    });
                }
                Ok(_) => {
                    log::debug!("[{}] worker finished without a match", search_id);
                }
                Err(e) if e.is_cancelled() => {
                    log::debug!("[{}] worker cancelled", search_id);
                }
                Err(e) => {
                    // Crash of one worker counts as a negative report
                    abnormal_exits += 1;
                    log::warn!("[{}] worker exited abnormally: {}", search_id, e);
                }
            }
        }

        log::info!(
            "[{}] all workers reported, target not found ({} abnormal exits)",
            search_id,
            abnormal_exits
        );
        Ok(SearchOutcome::not_found())
    }
}
