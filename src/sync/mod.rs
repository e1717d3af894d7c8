//! JIRA → beads synchronization
//!
//! # Sync Flow
//!
//! 1. **Read** ([`source`]): query open issues for the project/component
//! 2. **Map** ([`mapper`]): convert each issue to a beads payload
//! 3. **Reconcile** ([`reconciler`]): create or update the linked bead
//!
//! Each step runs once per invocation, strictly in that order.

pub mod mapper;
pub mod reconciler;
pub mod source;

pub use mapper::{map_issue, map_issue_type, map_priority, BeadPayload};
pub use reconciler::{Reconciler, SyncAction, SyncReport, SyncResult, SyncStats};
pub use source::{IssueQuery, IssueSource, SourceReader};

use crate::storage::IssueStore;
use tracing::info;

/// Read, map, and reconcile once.
///
/// `on_result` is called after each issue is processed.
pub async fn sync_once<S, F>(
    reader: &SourceReader,
    query: &IssueQuery,
    reconciler: &mut Reconciler<S>,
    marker_label: &str,
    on_result: F,
) -> SyncReport
where
    S: IssueStore,
    F: FnMut(&SyncResult),
{
    let issues = reader.read(query).await;
    info!(count = issues.len(), "Fetched issues");

    let payloads: Vec<BeadPayload> = issues
        .iter()
        .map(|issue| {
            info!(
                key = %issue.key,
                updated = ?issue.updated_at().map(|t| t.to_rfc3339()),
                "Mapping issue"
            );
            map_issue(issue, query.component(), marker_label)
        })
        .collect();

    reconciler.run(&payloads, on_result)
}
