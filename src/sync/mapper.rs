//! Field Mapper
//!
//! Pure conversion from a JIRA issue to the fields of a beads issue.

use crate::integrations::JiraIssue;
use beads::IssueType;

/// Placeholder used when JIRA has no description
pub const NO_DESCRIPTION: &str = "*No description provided in Jira*";

/// Priority used for missing or unrecognized JIRA priorities (Medium)
pub const DEFAULT_PRIORITY: u8 = 2;

/// A JIRA issue expressed in beads terms, ready to create or update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeadPayload {
    /// JIRA key; also present in `labels` and used for lookup
    pub external_key: String,
    pub title: String,
    pub description: String,
    pub priority: u8,
    pub issue_type: IssueType,
    pub labels: Vec<String>,
}

/// Map a JIRA priority name to beads priority (0 = highest .. 4 = lowest)
pub fn map_priority(name: Option<&str>) -> u8 {
    match name {
        Some("Highest") => 0,
        Some("High") => 1,
        Some("Medium") => 2,
        Some("Low") => 3,
        Some("Lowest") => 4,
        _ => DEFAULT_PRIORITY,
    }
}

/// Map a JIRA issue type name to a beads issue type
pub fn map_issue_type(name: Option<&str>) -> IssueType {
    match name {
        Some("Bug") => IssueType::Bug,
        Some("Task") | Some("Sub-task") => IssueType::Task,
        Some("Story") | Some("Feature") => IssueType::Feature,
        Some("Epic") => IssueType::Epic,
        _ => IssueType::Task,
    }
}

/// Metadata header, blank line, then the original description (or placeholder)
pub fn build_description(issue: &JiraIssue) -> String {
    let mut lines = vec![
        format!("**Jira Issue:** [{}]", issue.key),
        format!("**Status:** {}", issue.status_name()),
    ];

    if let Some(assignee) = issue.assignee_name() {
        lines.push(format!("**Assignee:** {}", assignee));
    }

    lines.push(String::new());

    match issue.fields.description.as_deref() {
        Some(body) if !body.trim().is_empty() => lines.push(body.to_string()),
        _ => lines.push(NO_DESCRIPTION.to_string()),
    }

    lines.join("\n")
}

/// Label for an active component filter
pub fn component_label(component: &str) -> String {
    format!("component-{}", component.trim())
}

/// Marker, key, and component label; trimmed, non-empty, first occurrence wins
pub fn build_labels(marker: &str, key: &str, component: Option<&str>) -> Vec<String> {
    let candidates = [
        Some(marker.trim().to_string()),
        Some(key.trim().to_string()),
        component
            .filter(|c| !c.trim().is_empty())
            .map(component_label),
    ];

    let mut labels: Vec<String> = Vec::with_capacity(candidates.len());
    for label in candidates.into_iter().flatten() {
        if !label.is_empty() && !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels
}

/// Map one JIRA issue to its beads payload
pub fn map_issue(issue: &JiraIssue, component: Option<&str>, marker: &str) -> BeadPayload {
    BeadPayload {
        external_key: issue.key.trim().to_string(),
        title: issue.fields.summary.clone(),
        description: build_description(issue),
        priority: map_priority(issue.priority_name()),
        issue_type: map_issue_type(issue.issue_type_name()),
        labels: build_labels(marker, &issue.key, component),
    }
}
