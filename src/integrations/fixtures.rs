//! Example JIRA data for exercising a sync without a JIRA instance.
//!
//! Only reachable through an explicit opt-in (`--use-example-data`); a failing
//! live source never falls back to these records.

use super::jira::{
    JiraComponent, JiraFields, JiraIssue, JiraIssueType, JiraPriority, JiraStatus, JiraUser,
};
use crate::sync::source::{IssueQuery, IssueSource};
use crate::Result;
use async_trait::async_trait;

/// Component name used when no component filter is active
pub const DEFAULT_EXAMPLE_COMPONENT: &str = "example-component";

#[allow(clippy::too_many_arguments)]
fn example(
    key: &str,
    summary: &str,
    description: &str,
    priority: &str,
    issue_type: &str,
    status: &str,
    assignee: Option<&str>,
    component: &str,
    created: &str,
    updated: &str,
) -> JiraIssue {
    JiraIssue {
        key: key.to_string(),
        id: String::new(),
        fields: JiraFields {
            summary: summary.to_string(),
            description: Some(description.to_string()),
            issue_type: Some(JiraIssueType {
                name: issue_type.to_string(),
            }),
            status: JiraStatus {
                name: status.to_string(),
            },
            priority: Some(JiraPriority {
                name: priority.to_string(),
            }),
            labels: Vec::new(),
            assignee: assignee.map(|name| JiraUser {
                display_name: name.to_string(),
                account_id: None,
            }),
            components: vec![JiraComponent {
                name: component.to_string(),
            }],
            updated: Some(updated.to_string()),
            created: Some(created.to_string()),
        },
    }
}

/// The three example issues, tagged with `component` (or the default name)
pub fn example_issues(component: Option<&str>) -> Vec<JiraIssue> {
    let component = component.unwrap_or(DEFAULT_EXAMPLE_COMPONENT);
    vec![
        example(
            "EXAMPLE-123",
            "[EXAMPLE] Implement user authentication",
            "This is example data for testing. Add OAuth2 support for user login",
            "High",
            "Task",
            "In Progress",
            Some("Example User"),
            component,
            "2025-01-10T10:00:00.000+0000",
            "2025-01-14T15:30:00.000+0000",
        ),
        example(
            "EXAMPLE-456",
            "[EXAMPLE] Fix memory leak in session handler",
            "This is example data for testing. Sessions are not being properly garbage collected",
            "Highest",
            "Bug",
            "Open",
            Some("Example User"),
            component,
            "2025-01-12T09:00:00.000+0000",
            "2025-01-13T11:00:00.000+0000",
        ),
        example(
            "EXAMPLE-789",
            "[EXAMPLE] Add rate limiting to API endpoints",
            "This is example data for testing",
            "Medium",
            "Feature",
            "Open",
            None,
            component,
            "2025-01-15T14:00:00.000+0000",
            "2025-01-15T14:00:00.000+0000",
        ),
    ]
}

/// Issue source serving [`example_issues`]
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSource;

#[async_trait]
impl IssueSource for FixtureSource {
    fn name(&self) -> &str {
        "example-data"
    }

    async fn fetch(&self, query: &IssueQuery) -> Result<Vec<JiraIssue>> {
        Ok(example_issues(query.component()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_issues_shape() {
        let issues = example_issues(None);
        assert_eq!(issues.len(), 3);
        assert_eq!(
            issues.iter().map(|i| i.key.as_str()).collect::<Vec<_>>(),
            vec!["EXAMPLE-123", "EXAMPLE-456", "EXAMPLE-789"]
        );
        assert!(issues
            .iter()
            .all(|i| i.component_names() == vec![DEFAULT_EXAMPLE_COMPONENT]));
        assert_eq!(issues[2].assignee_name(), None);
    }

    #[test]
    fn test_example_issues_follow_component_filter() {
        let issues = example_issues(Some("backend-api"));
        assert!(issues.iter().all(|i| i.component_names() == vec!["backend-api"]));
    }

    #[tokio::test]
    async fn test_fixture_source_fetch() {
        let query = IssueQuery::new("PROJ").with_component("ui");
        let issues = FixtureSource.fetch(&query).await.unwrap();
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.updated_at().is_some()));
    }
}
