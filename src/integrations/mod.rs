//! External Integrations
//!
//! Adapters that produce issues for a sync run.
//!
//! - **jira**: REST API adapter for Atlassian JIRA (the live source)
//! - **fixtures**: fixed example issues, used only when explicitly requested

pub mod fixtures;
pub mod jira;

pub use fixtures::{example_issues, FixtureSource};
pub use jira::{
    JiraAdapter, JiraComponent, JiraFields, JiraIssue, JiraIssueType, JiraPriority,
    JiraSearchResponse, JiraStatus, JiraUser,
};
