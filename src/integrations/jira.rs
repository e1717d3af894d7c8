//! JIRA Integration Adapter
//!
//! Read-only access to JIRA issues through the REST search API.

use crate::config::JiraIntegration;
use crate::sync::source::{IssueQuery, IssueSource};
use crate::{Result, SyncError};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Fields requested from the search endpoint
const SEARCH_FIELDS: &str =
    "summary,description,issuetype,status,priority,labels,assignee,components,created,updated";

/// Search endpoint paged with `nextPageToken` (JIRA Cloud)
const SEARCH_JQL_PATH: &str = "/rest/api/3/search/jql";

/// Offset-paged search endpoint (JIRA Data Center / Server)
const LEGACY_SEARCH_PATH: &str = "/rest/api/2/search";

/// Upper bound on pages fetched for one query
const MAX_PAGES: u32 = 1000;

/// JIRA issue representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssue {
    pub key: String,
    #[serde(default)]
    pub id: String,
    pub fields: JiraFields,
}

/// JIRA issue fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraFields {
    #[serde(default)]
    pub summary: String,
    /// Plain text; ADF documents are flattened on the way in
    #[serde(default, deserialize_with = "deserialize_description")]
    pub description: Option<String>,
    #[serde(rename = "issuetype", default)]
    pub issue_type: Option<JiraIssueType>,
    pub status: JiraStatus,
    #[serde(default)]
    pub priority: Option<JiraPriority>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignee: Option<JiraUser>,
    #[serde(default)]
    pub components: Vec<JiraComponent>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssueType {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraStatus {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraPriority {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraUser {
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    #[serde(rename = "accountId", default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraComponent {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraSearchResponse {
    #[serde(default)]
    pub total: u32,
    #[serde(rename = "startAt", default)]
    pub start_at: u32,
    #[serde(rename = "maxResults", default)]
    pub max_results: u32,
    pub issues: Vec<JiraIssue>,
    /// Cursor for the next page (`/search/jql` only)
    #[serde(rename = "nextPageToken", default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(rename = "isLast", default, skip_serializing_if = "Option::is_none")]
    pub is_last: Option<bool>,
}

impl JiraIssue {
    pub fn status_name(&self) -> &str {
        &self.fields.status.name
    }

    pub fn priority_name(&self) -> Option<&str> {
        self.fields.priority.as_ref().map(|p| p.name.as_str())
    }

    pub fn issue_type_name(&self) -> Option<&str> {
        self.fields.issue_type.as_ref().map(|t| t.name.as_str())
    }

    /// Assignee display name, if assigned to someone with a non-empty name
    pub fn assignee_name(&self) -> Option<&str> {
        self.fields
            .assignee
            .as_ref()
            .map(|a| a.display_name.as_str())
            .filter(|name| !name.trim().is_empty())
    }

    pub fn component_names(&self) -> Vec<&str> {
        self.fields.components.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        self.fields.created.as_deref().and_then(parse_jira_timestamp)
    }

    pub fn updated_at(&self) -> Option<DateTime<FixedOffset>> {
        self.fields.updated.as_deref().and_then(parse_jira_timestamp)
    }
}

/// Parse JIRA timestamps such as `2025-01-10T10:00:00.000+0000`.
pub fn parse_jira_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}

/// Accepts either a plain string (API v2, fixtures) or an Atlassian Document
/// Format object (API v3).
fn deserialize_description<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de;

    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(doc @ serde_json::Value::Object(_)) => Ok(Some(adf_to_text(&doc))),
        Some(other) => Err(de::Error::custom(format!(
            "expected string or document for description, got {}",
            other
        ))),
    }
}

/// Flatten an ADF document to plain text, one line per block.
pub fn adf_to_text(doc: &serde_json::Value) -> String {
    fn walk(node: &serde_json::Value, out: &mut String) {
        let node_type = node.get("type").and_then(|t| t.as_str()).unwrap_or("");
        match node_type {
            "text" => {
                if let Some(text) = node.get("text").and_then(|t| t.as_str()) {
                    out.push_str(text);
                }
            }
            "hardBreak" => out.push('\n'),
            "mention" | "emoji" => {
                if let Some(text) = node.pointer("/attrs/text").and_then(|t| t.as_str()) {
                    out.push_str(text);
                }
            }
            _ => {}
        }

        if let Some(children) = node.get("content").and_then(|c| c.as_array()) {
            for child in children {
                walk(child, out);
            }
        }

        if matches!(node_type, "paragraph" | "heading" | "codeBlock") && !out.ends_with('\n') {
            out.push('\n');
        }
    }

    let mut out = String::new();
    walk(doc, &mut out);
    out.trim_end().to_string()
}

/// How requests authenticate
#[derive(Debug, Clone, PartialEq, Eq)]
enum JiraAuth {
    Anonymous,
    Bearer(String),
    Basic { email: String, token: String },
}

/// JIRA API client for reading issues
pub struct JiraAdapter {
    client: Client,
    instance_url: String,
    page_size: u32,
    auth: JiraAuth,
}

impl JiraAdapter {
    /// Create a new JIRA adapter for the instance at `url`.
    ///
    /// Credentials are read from the environment variables named in `settings`:
    /// email + token gives basic auth, token alone gives a bearer token.
    pub fn new(url: &str, settings: &JiraIntegration) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        let auth = match (settings.email(), settings.token()) {
            (Some(email), Some(token)) => JiraAuth::Basic { email, token },
            (None, Some(token)) => JiraAuth::Bearer(token),
            _ => JiraAuth::Anonymous,
        };

        Ok(Self {
            client,
            instance_url: url.trim_end_matches('/').to_string(),
            page_size: settings.max_results.max(1),
            auth,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth != JiraAuth::Anonymous
    }

    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    fn search_url(&self) -> String {
        format!("{}{}", self.instance_url, SEARCH_JQL_PATH)
    }

    fn legacy_search_url(&self) -> String {
        format!("{}{}", self.instance_url, LEGACY_SEARCH_PATH)
    }

    async fn send_search(&self, url: &str, params: &[(&str, String)]) -> Result<Response> {
        let mut request = self
            .client
            .get(url)
            .query(params)
            .header(reqwest::header::ACCEPT, "application/json");
        request = match &self.auth {
            JiraAuth::Anonymous => request,
            JiraAuth::Bearer(token) => request.bearer_auth(token),
            JiraAuth::Basic { email, token } => request.basic_auth(email, Some(token)),
        };

        request
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("Cannot reach JIRA at {}: {}", url, e)))
    }

    async fn decode_search(response: Response) -> Result<JiraSearchResponse> {
        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                serde_json::from_str(&body).map_err(|e| {
                    SyncError::Parse(format!("Malformed JIRA search response: {}", e))
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SyncError::Auth(format!(
                "JIRA authentication failed (HTTP {})",
                response.status()
            ))),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                Err(SyncError::Integration(format!(
                    "Rate limited by JIRA, retry after {} seconds",
                    retry_after
                )))
            }
            status => {
                let error_body = response.text().await.unwrap_or_default();
                Err(SyncError::Integration(format!(
                    "JIRA API error: HTTP {}: {}",
                    status, error_body
                )))
            }
        }
    }

    /// Search for issues using JQL, following pagination to the end.
    ///
    /// Uses `/rest/api/3/search/jql` with `nextPageToken` paging. Servers
    /// without that endpoint (Data Center) answer 404 on the first page and
    /// are searched through `/rest/api/2/search` instead.
    pub async fn search(&self, jql: &str) -> Result<Vec<JiraIssue>> {
        let url = self.search_url();
        let mut issues: Vec<JiraIssue> = Vec::new();
        let mut next_page_token: Option<String> = None;

        for page_number in 0..MAX_PAGES {
            let mut params = vec![
                ("jql", jql.to_string()),
                ("maxResults", self.page_size.to_string()),
                ("fields", SEARCH_FIELDS.to_string()),
            ];
            if let Some(ref token) = next_page_token {
                params.push(("nextPageToken", token.clone()));
            }

            debug!(jql = %jql, page = page_number, "Searching JIRA issues");
            let response = self.send_search(&url, &params).await?;

            if page_number == 0 && response.status() == StatusCode::NOT_FOUND {
                info!(url = %url, "Enhanced search not available, using /rest/api/2/search");
                return self.search_legacy(jql).await;
            }

            let page = Self::decode_search(response).await?;
            let returned = page.issues.len();
            issues.extend(page.issues);

            match page.next_page_token {
                Some(token) if !page.is_last.unwrap_or(false) && returned > 0 => {
                    next_page_token = Some(token)
                }
                _ => break,
            }
        }

        info!(returned = issues.len(), "JIRA search complete");
        Ok(issues)
    }

    /// Offset-paged search against the v2 endpoint
    async fn search_legacy(&self, jql: &str) -> Result<Vec<JiraIssue>> {
        let url = self.legacy_search_url();
        let mut issues: Vec<JiraIssue> = Vec::new();
        let mut start_at = 0u32;

        for _ in 0..MAX_PAGES {
            let params = [
                ("jql", jql.to_string()),
                ("startAt", start_at.to_string()),
                ("maxResults", self.page_size.to_string()),
                ("fields", SEARCH_FIELDS.to_string()),
            ];

            debug!(jql = %jql, start_at, "Searching JIRA issues (v2)");
            let response = self.send_search(&url, &params).await?;
            let page = Self::decode_search(response).await?;
            let returned = page.issues.len() as u32;
            let total = page.total;
            issues.extend(page.issues);

            if returned == 0 || issues.len() as u32 >= total {
                break;
            }
            start_at += returned;
        }

        info!(returned = issues.len(), "JIRA search complete");
        Ok(issues)
    }
}

#[async_trait]
impl IssueSource for JiraAdapter {
    fn name(&self) -> &str {
        "jira"
    }

    async fn fetch(&self, query: &IssueQuery) -> Result<Vec<JiraIssue>> {
        self.search(&query.to_jql()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> JiraIntegration {
        JiraIntegration {
            token_env: "JBS_TEST_NO_SUCH_TOKEN".to_string(),
            email_env: "JBS_TEST_NO_SUCH_EMAIL".to_string(),
            ..JiraIntegration::default()
        }
    }

    #[test]
    fn test_adapter_creation() {
        let adapter = JiraAdapter::new("https://jira.example.com/", &test_settings())
            .expect("Failed to create adapter");
        assert_eq!(adapter.instance_url(), "https://jira.example.com");
        assert_eq!(
            adapter.search_url(),
            "https://jira.example.com/rest/api/3/search/jql"
        );
        assert_eq!(
            adapter.legacy_search_url(),
            "https://jira.example.com/rest/api/2/search"
        );
        assert!(!adapter.is_authenticated());
    }

    #[test]
    fn test_token_env_enables_auth() {
        std::env::set_var("JBS_UNIT_TEST_TOKEN", "secret");
        let settings = JiraIntegration {
            token_env: "JBS_UNIT_TEST_TOKEN".to_string(),
            ..test_settings()
        };
        let adapter = JiraAdapter::new("https://jira.example.com", &settings).unwrap();
        assert!(adapter.is_authenticated());
        assert_eq!(
            adapter.auth,
            JiraAuth::Bearer("secret".to_string())
        );
    }

    #[test]
    fn test_search_response_shapes() {
        let cloud: JiraSearchResponse =
            serde_json::from_str(r#"{"issues": [], "nextPageToken": "abc", "isLast": false}"#)
                .unwrap();
        assert_eq!(cloud.next_page_token.as_deref(), Some("abc"));
        assert_eq!(cloud.is_last, Some(false));

        let legacy: JiraSearchResponse =
            serde_json::from_str(r#"{"issues": [], "startAt": 0, "maxResults": 50, "total": 7}"#)
                .unwrap();
        assert_eq!(legacy.total, 7);
        assert_eq!(legacy.next_page_token, None);
    }

    #[test]
    fn test_issue_deserialize_api_shape() {
        let json = r#"{
            "key": "PROJ-1",
            "id": "10001",
            "fields": {
                "summary": "Login fails",
                "description": null,
                "issuetype": {"name": "Bug", "id": "1"},
                "status": {"name": "In Progress", "statusCategory": {"key": "indeterminate"}},
                "priority": {"name": "High"},
                "assignee": {"displayName": "Ada", "accountId": "abc"},
                "components": [{"name": "backend-api"}],
                "created": "2025-01-10T10:00:00.000+0000",
                "updated": "2025-01-14T15:30:00.000+0000"
            }
        }"#;
        let issue: JiraIssue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.key, "PROJ-1");
        assert_eq!(issue.fields.description, None);
        assert_eq!(issue.issue_type_name(), Some("Bug"));
        assert_eq!(issue.priority_name(), Some("High"));
        assert_eq!(issue.status_name(), "In Progress");
        assert_eq!(issue.assignee_name(), Some("Ada"));
        assert_eq!(issue.component_names(), vec!["backend-api"]);

        let updated = issue.updated_at().unwrap();
        assert_eq!(updated.to_rfc3339(), "2025-01-14T15:30:00+00:00");
        assert!(issue.created_at().unwrap() < updated);
    }

    #[test]
    fn test_missing_optional_fields() {
        let json = r#"{"key": "PROJ-2", "fields": {"summary": "x", "status": {"name": "Open"}}}"#;
        let issue: JiraIssue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.priority_name(), None);
        assert_eq!(issue.issue_type_name(), None);
        assert_eq!(issue.assignee_name(), None);
        assert!(issue.component_names().is_empty());
        assert!(issue.updated_at().is_none());
    }

    #[test]
    fn test_adf_description_flattened() {
        let json = r#"{"key": "PROJ-3", "fields": {"status": {"name": "Open"}, "description": {
            "type": "doc", "version": 1,
            "content": [
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "First line"},
                    {"type": "hardBreak"},
                    {"type": "text", "text": "second "},
                    {"type": "mention", "attrs": {"text": "@ada"}}
                ]},
                {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Steps"}]},
                {"type": "bulletList", "content": [
                    {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "click"}]}]}
                ]}
            ]
        }}}"#;
        let issue: JiraIssue = serde_json::from_str(json).unwrap();
        assert_eq!(
            issue.fields.description.as_deref(),
            Some("First line\nsecond @ada\nSteps\nclick")
        );
    }

    #[test]
    fn test_description_rejects_unexpected_shape() {
        let json = r#"{"key": "PROJ-4", "fields": {"status": {"name": "Open"}, "description": 42}}"#;
        assert!(serde_json::from_str::<JiraIssue>(json).is_err());
    }

    #[test]
    fn test_parse_jira_timestamp_formats() {
        assert!(parse_jira_timestamp("2025-01-10T10:00:00.000+0000").is_some());
        assert!(parse_jira_timestamp("2025-01-10T10:00:00+02:00").is_some());
        assert!(parse_jira_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_blank_assignee_is_none() {
        let json = r#"{"key": "P-1", "fields": {"status": {"name": "Open"}, "assignee": {"displayName": " "}}}"#;
        let issue: JiraIssue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.assignee_name(), None);
    }
}
