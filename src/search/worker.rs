//! Worker-side breadth-first traversal over the article link graph.

use std::collections::{HashSet, VecDeque};

use tokio::time::Instant;

use crate::fetch::WikiLinkClient;
use crate::title;

/// Assignment handed to a worker at spawn time; never updated afterwards.
#[derive(Debug, Clone)]
pub struct WorkerTask {
    /// Contiguous slice of the depth-1 frontier this worker owns.
    pub assigned_titles: Vec<String>,
    pub target_title: String,
}

/// A worker's single, terminal report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub found: bool,
    /// The article whose links contained the target, when found.
    pub direct_ancestor: Option<String>,
}

impl WorkerReport {
    pub fn found(direct_ancestor: String) -> Self {
        Self {
            found: true,
            direct_ancestor: Some(direct_ancestor),
        }
    }

    pub fn not_found() -> Self {
        Self {
            found: false,
            direct_ancestor: None,
        }
    }
}

/// Run one breadth-first traversal until the target is found, the frontier
/// is exhausted, or `deadline` passes.
///
/// The visited set is private to this traversal: each title is enqueued at
/// most once per worker, but sibling workers may independently expand the
/// same title. A failed link fetch counts as an article with no links; the
/// traversal moves on to the next queued title.
///
/// The first link matching the target ends the traversal immediately with
/// the currently expanded article as the direct ancestor. That is the first
/// match in this worker's link order, not necessarily a structurally
/// preferable predecessor.
pub async fn traverse(task: WorkerTask, fetcher: WikiLinkClient, deadline: Instant) -> WorkerReport {
    let target = title::normalize(&task.target_title);

    // The assigned slice was already vetted against the target by the
    // coordinator's depth-1 check, so seed it straight into visited.
    let mut visited: HashSet<String> = HashSet::new();
    let mut frontier: VecDeque<String> = VecDeque::new();
    for assigned in task.assigned_titles {
        if visited.insert(title::normalize(&assigned)) {
            frontier.push_back(assigned);
        }
    }

    while let Some(current) = frontier.pop_front() {
        if Instant::now() >= deadline {
            log::info!(
                "Traversal deadline reached with {} titles still queued",
                frontier.len() + 1
            );
            return WorkerReport::not_found();
        }

        let children = match fetcher.fetch_links(&current).await {
            Ok(children) => children,
            Err(e) => {
                log::debug!("Skipping '{}' after fetch failure: {}", current, e);
                continue;
            }
        };

        for child in children {
            if title::normalize(&child) == target {
                return WorkerReport::found(current);
            }
            if visited.insert(title::normalize(&child)) {
                frontier.push_back(child);
            }
        }
    }

    WorkerReport::not_found()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FixtureWiki;
    use std::time::Duration;

    fn client_for(api_url: String) -> WikiLinkClient {
        WikiLinkClient::new(api_url, "linkrace-test", Duration::from_secs(5)).unwrap()
    }

    fn task(assigned: &[&str], target: &str) -> WorkerTask {
        WorkerTask {
            assigned_titles: assigned.iter().map(|t| t.to_string()).collect(),
            target_title: target.to_string(),
        }
    }

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    #[tokio::test]
    async fn test_finds_target_and_reports_ancestor() {
        let wiki = FixtureWiki::new()
            .article("Wolf", &["Pack", "Canidae"])
            .article("Canidae", &["Fox", "Jackal"])
            .spawn()
            .await;
        let fetcher = client_for(wiki.api_url());

        let report = traverse(task(&["Wolf"], "Jackal"), fetcher, far_deadline()).await;
        assert_eq!(report, WorkerReport::found("Canidae".to_string()));
    }

    #[tokio::test]
    async fn test_match_is_case_insensitive() {
        let wiki = FixtureWiki::new()
            .article("Wolf", &["Canidae"])
            .spawn()
            .await;
        let fetcher = client_for(wiki.api_url());

        let report = traverse(task(&["Wolf"], "cAnIdAe"), fetcher, far_deadline()).await;
        assert_eq!(report, WorkerReport::found("Wolf".to_string()));
    }

    #[tokio::test]
    async fn test_exhaustion_reports_not_found() {
        let wiki = FixtureWiki::new()
            .article("Wolf", &["Canidae"])
            .article("Canidae", &[])
            .spawn()
            .await;
        let fetcher = client_for(wiki.api_url());

        let report = traverse(task(&["Wolf"], "Basalt"), fetcher, far_deadline()).await;
        assert_eq!(report, WorkerReport::not_found());
    }

    #[tokio::test]
    async fn test_each_title_expanded_at_most_once() {
        // Diamond plus repeated links: B and C both link D, and A lists B twice
        let wiki = FixtureWiki::new()
            .article("A", &["B", "B", "C"])
            .article("B", &["D"])
            .article("C", &["D", "B"])
            .article("D", &[])
            .spawn()
            .await;
        let fetcher = client_for(wiki.api_url());

        let report = traverse(task(&["A"], "Zzz"), fetcher, far_deadline()).await;
        assert_eq!(report, WorkerReport::not_found());
        for t in ["A", "B", "C", "D"] {
            assert!(wiki.hits(t) <= 1, "'{}' fetched {} times", t, wiki.hits(t));
        }
    }

    #[tokio::test]
    async fn test_cycle_terminates() {
        let wiki = FixtureWiki::new()
            .article("A", &["B"])
            .article("B", &["A"])
            .spawn()
            .await;
        let fetcher = client_for(wiki.api_url());

        let report = traverse(task(&["A"], "Zzz"), fetcher, far_deadline()).await;
        assert_eq!(report, WorkerReport::not_found());
        assert_eq!(wiki.total_hits(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_soft() {
        let wiki = FixtureWiki::new()
            .article("A", &[])
            .fail_title("Broken")
            .article("C", &["Target"])
            .spawn()
            .await;
        let fetcher = client_for(wiki.api_url());

        // The failing title is skipped; traversal continues to C
        let report = traverse(task(&["A", "Broken", "C"], "Target"), fetcher, far_deadline()).await;
        assert_eq!(report, WorkerReport::found("C".to_string()));
    }

    #[tokio::test]
    async fn test_elapsed_deadline_expands_nothing() {
        let wiki = FixtureWiki::new()
            .article("A", &["B"])
            .spawn()
            .await;
        let fetcher = client_for(wiki.api_url());

        let already_elapsed = Instant::now();
        let report = traverse(task(&["A"], "B"), fetcher, already_elapsed).await;
        assert_eq!(report, WorkerReport::not_found());
        assert_eq!(wiki.total_hits(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_assigned_titles_collapse() {
        let wiki = FixtureWiki::new()
            .article("A", &[])
            .spawn()
            .await;
        let fetcher = client_for(wiki.api_url());

        let report = traverse(task(&["A", "a", "A "], "Zzz"), fetcher, far_deadline()).await;
        assert_eq!(report, WorkerReport::not_found());
        assert_eq!(wiki.hits("A"), 1);
    }
}
