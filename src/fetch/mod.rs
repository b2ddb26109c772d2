//! Link retrieval module: paginated outbound-link queries against a
//! MediaWiki-compatible API.

mod wiki;

pub use wiki::WikiLinkClient;
