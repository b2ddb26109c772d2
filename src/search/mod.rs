//! Search engine: frontier partitioning, worker traversals, and the
//! per-request coordinator that races them toward the target.

mod coordinator;
mod partition;
mod worker;

pub use coordinator::{SearchCoordinator, SearchOutcome, SearchRequest};
pub use partition::partition;
pub use worker::{traverse, WorkerReport, WorkerTask};
