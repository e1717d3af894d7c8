//! Shared test helpers

use beads::IssueType;
use jira_beads_sync::storage::{IssueStore, LocalIssue};
use jira_beads_sync::sync::BeadPayload;
use jira_beads_sync::{Result, SyncError};
use std::collections::HashSet;

/// In-memory stand-in for the bd-backed store
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub issues: Vec<LocalIssue>,
    /// JIRA keys whose create/update calls fail
    pub failing_keys: HashSet<String>,
    next_id: u32,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an issue as if another run (or a person) had created it
    pub fn seed(&mut self, id: &str, issue_type: IssueType, labels: &[&str]) {
        self.issues.push(LocalIssue {
            id: id.to_string(),
            title: format!("seeded {}", id),
            description: Some("seeded description".to_string()),
            priority: Some(4),
            issue_type: Some(issue_type.to_string()),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        });
    }

    pub fn fail_on(mut self, key: &str) -> Self {
        self.failing_keys.insert(key.to_string());
        self
    }

    pub fn count_with_label(&self, label: &str) -> usize {
        self.issues.iter().filter(|i| i.has_label(label)).count()
    }

    pub fn get(&self, id: &str) -> Option<&LocalIssue> {
        self.issues.iter().find(|i| i.id == id)
    }
}

impl IssueStore for MemoryStore {
    fn find_by_label(&mut self, label: &str) -> Result<Vec<LocalIssue>> {
        Ok(self
            .issues
            .iter()
            .filter(|i| i.has_label(label))
            .cloned()
            .collect())
    }

    fn create(&mut self, payload: &BeadPayload) -> Result<String> {
        if self.failing_keys.contains(&payload.external_key) {
            return Err(SyncError::Store(beads::Error::CommandFailed(
                "simulated create failure".to_string(),
            )));
        }
        self.next_id += 1;
        let id = format!("bd-{}", self.next_id);
        self.issues.push(LocalIssue {
            id: id.clone(),
            title: payload.title.clone(),
            description: Some(payload.description.clone()),
            priority: Some(payload.priority),
            issue_type: Some(payload.issue_type.to_string()),
            labels: payload.labels.clone(),
        });
        Ok(id)
    }

    fn update(&mut self, id: &str, description: &str, priority: u8) -> Result<()> {
        let failing = &self.failing_keys;
        let issue = self
            .issues
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| SyncError::Store(beads::Error::CommandFailed(format!("no issue {}", id))))?;

        if issue.labels.iter().any(|l| failing.contains(l)) {
            return Err(SyncError::Store(beads::Error::CommandFailed(
                "simulated update failure".to_string(),
            )));
        }

        issue.description = Some(description.to_string());
        issue.priority = Some(priority);
        Ok(())
    }
}
