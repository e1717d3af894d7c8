//! Source Reader
//!
//! Turns a project/component filter into a list of open JIRA issues. A source
//! that cannot be reached yields an empty list plus a warning; the reader never
//! invents records to stand in for a failed query.

use crate::integrations::{FixtureSource, JiraAdapter, JiraIssue};
use crate::style;
use crate::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Statuses treated as closed; issues in these are never synced
pub const CLOSED_STATUSES: [&str; 3] = ["Done", "Closed", "Resolved"];

/// Whether a status name is one of [`CLOSED_STATUSES`] (case-insensitive)
pub fn is_closed_status(status: &str) -> bool {
    let status = status.trim();
    CLOSED_STATUSES
        .iter()
        .any(|closed| closed.eq_ignore_ascii_case(status))
}

/// Filter for one sync run: project AND component (if any) AND open status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    project: String,
    component: Option<String>,
}

impl IssueQuery {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            component: None,
        }
    }

    /// Restrict to a component; blank names are ignored
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        let component = component.into();
        self.component = if component.trim().is_empty() {
            None
        } else {
            Some(component.trim().to_string())
        };
        self
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }

    /// Project keys are alphanumeric plus underscore.
    fn sanitize_project(project: &str) -> String {
        project
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect()
    }

    /// Sanitize a component name for safe use inside a quoted JQL string.
    fn sanitize_component(component: &str) -> String {
        component
            .chars()
            .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ' ' | '.' | '/'))
            .collect()
    }

    /// Compose the JQL filter expression
    pub fn to_jql(&self) -> String {
        let mut parts = vec![format!("project = {}", Self::sanitize_project(&self.project))];

        if let Some(ref component) = self.component {
            parts.push(format!(
                "component = \"{}\"",
                Self::sanitize_component(component)
            ));
        }

        parts.push(format!("status NOT IN ({})", CLOSED_STATUSES.join(", ")));
        parts.join(" AND ")
    }
}

/// Something that can answer an [`IssueQuery`]
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn fetch(&self, query: &IssueQuery) -> Result<Vec<JiraIssue>>;
}

/// Reads issues from exactly one source, chosen when the reader is built
pub struct SourceReader {
    source: Box<dyn IssueSource>,
}

impl SourceReader {
    pub fn new(source: Box<dyn IssueSource>) -> Self {
        Self { source }
    }

    /// Read from a live JIRA instance
    pub fn live(adapter: JiraAdapter) -> Self {
        Self::new(Box::new(adapter))
    }

    /// Read the fixed example issues instead of calling JIRA
    pub fn fixtures() -> Self {
        Self::new(Box::new(FixtureSource))
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Fetch open issues matching `query`.
    ///
    /// Source failures are logged and reported as an empty result.
    pub async fn read(&self, query: &IssueQuery) -> Vec<JiraIssue> {
        info!(source = self.source.name(), jql = %query.to_jql(), "Querying issues");

        let issues = match self.source.fetch(query).await {
            Ok(issues) => issues,
            Err(e) => {
                warn!(source = self.source.name(), error = %e, "Issue query failed");
                let reason = if e.is_source_unavailable() {
                    "Cannot sync without a working connection to JIRA."
                } else {
                    "JIRA query could not be completed."
                };
                eprintln!("{} Query failed: {}", style::warning_marker(), e);
                eprintln!("{} {}", style::warning_marker(), reason);
                eprintln!(
                    "{} Existing beads issues are still available offline; run the sync again later.",
                    style::info_marker()
                );
                return Vec::new();
            }
        };

        let fetched = issues.len();
        let open: Vec<JiraIssue> = issues
            .into_iter()
            .filter(|issue| {
                let closed = is_closed_status(issue.status_name());
                if closed {
                    debug!(key = %issue.key, status = %issue.status_name(), "Dropping closed issue");
                }
                !closed
            })
            .collect();

        if open.len() != fetched {
            debug!(
                dropped = fetched - open.len(),
                "Source returned issues outside the open-status filter"
            );
        }

        open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::example_issues;
    use crate::SyncError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FailingSource {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl IssueSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch(&self, _query: &IssueQuery) -> Result<Vec<JiraIssue>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SyncError::Network("connection refused".to_string()))
        }
    }

    struct StaticSource(Vec<JiraIssue>);

    #[async_trait]
    impl IssueSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        async fn fetch(&self, _query: &IssueQuery) -> Result<Vec<JiraIssue>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_jql_project_only() {
        let query = IssueQuery::new("PROJ");
        assert_eq!(
            query.to_jql(),
            "project = PROJ AND status NOT IN (Done, Closed, Resolved)"
        );
    }

    #[test]
    fn test_jql_with_component() {
        let query = IssueQuery::new("PROJ").with_component("backend-api");
        assert_eq!(
            query.to_jql(),
            "project = PROJ AND component = \"backend-api\" AND status NOT IN (Done, Closed, Resolved)"
        );
    }

    #[test]
    fn test_jql_sanitizes_input() {
        let query = IssueQuery::new("PROJ OR 1=1").with_component("ui\" OR project = OTHER");
        assert_eq!(
            query.to_jql(),
            "project = PROJOR11 AND component = \"ui OR project  OTHER\" AND status NOT IN (Done, Closed, Resolved)"
        );
    }

    #[test]
    fn test_blank_component_ignored() {
        let query = IssueQuery::new("PROJ").with_component("   ");
        assert_eq!(query.component(), None);
    }

    #[test]
    fn test_is_closed_status() {
        assert!(is_closed_status("Done"));
        assert!(is_closed_status("closed"));
        assert!(is_closed_status(" Resolved "));
        assert!(!is_closed_status("In Progress"));
        assert!(!is_closed_status("Open"));
    }

    #[tokio::test]
    async fn test_failure_yields_empty_without_fixtures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let reader = SourceReader::new(Box::new(FailingSource {
            calls: calls.clone(),
        }));

        let issues = reader.read(&IssueQuery::new("PROJ")).await;
        assert!(issues.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_closed_issues_dropped() {
        let mut issues = example_issues(None);
        issues[1].fields.status.name = "Done".to_string();
        let reader = SourceReader::new(Box::new(StaticSource(issues)));

        let read = reader.read(&IssueQuery::new("EXAMPLE")).await;
        assert_eq!(
            read.iter().map(|i| i.key.as_str()).collect::<Vec<_>>(),
            vec!["EXAMPLE-123", "EXAMPLE-789"]
        );
    }

    #[tokio::test]
    async fn test_fixture_mode_is_explicit() {
        let reader = SourceReader::fixtures();
        assert_eq!(reader.source_name(), "example-data");
        assert_eq!(reader.read(&IssueQuery::new("PROJ")).await.len(), 3);
    }
}
