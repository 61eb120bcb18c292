//! Workload source trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use ll_core::{QueryRecord, WorkloadFilter};

/// Something that can report aggregated query statistics
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait WorkloadSource: Send + Sync {
    /// Whether query statistics can be read at all
    async fn stats_available(&self) -> DbResult<bool>;

    /// Fetch statistics, filtered, ranked and truncated per `filter`
    async fn fetch_query_stats(&self, filter: &WorkloadFilter) -> DbResult<Vec<QueryRecord>>;

    /// Source type identifier for logging
    fn source_type(&self) -> &'static str;
}
