//! BeadsStore - [`IssueStore`] backed by the bd CLI

use super::{IssueStore, LocalIssue};
use crate::config::BeadsSettings;
use crate::sync::mapper::BeadPayload;
use crate::Result;
use beads::Beads;
use tracing::debug;

impl From<beads::Issue> for LocalIssue {
    fn from(issue: beads::Issue) -> Self {
        Self {
            id: issue.id,
            title: issue.title,
            description: issue.description,
            priority: issue.priority,
            issue_type: issue.issue_type,
            labels: issue.labels,
        }
    }
}

/// Store wrapper around the beads CLI
#[derive(Debug, Clone, Default)]
pub struct BeadsStore {
    bd: Beads,
}

impl BeadsStore {
    pub fn new(bd: Beads) -> Self {
        Self { bd }
    }

    /// Build from the `beads` section of the config
    pub fn from_settings(settings: &BeadsSettings) -> Self {
        let mut bd = Beads::default()
            .with_program(settings.program.as_str())
            .with_global_flags(settings.global_flags.clone());
        if let Some(ref dir) = settings.workdir {
            bd = bd.with_workdir(dir.clone());
        }
        Self { bd }
    }

    /// Check if bd is available
    pub fn is_available(&self) -> bool {
        self.bd.is_available()
    }

    pub fn program(&self) -> &str {
        self.bd.program()
    }
}

impl IssueStore for BeadsStore {
    fn find_by_label(&mut self, label: &str) -> Result<Vec<LocalIssue>> {
        debug!(label = %label, "Looking up beads issues by label");
        let issues = self.bd.list_by_label(label)?;
        Ok(issues.into_iter().map(LocalIssue::from).collect())
    }

    fn create(&mut self, payload: &BeadPayload) -> Result<String> {
        debug!(key = %payload.external_key, "Creating beads issue");
        let issue = self.bd.create_full(
            &payload.title,
            payload.issue_type,
            Some(payload.priority),
            Some(&payload.description),
            &payload.labels,
        )?;
        Ok(issue.id)
    }

    fn update(&mut self, id: &str, description: &str, priority: u8) -> Result<()> {
        debug!(id = %id, priority, "Updating beads issue");
        let output = self.bd.update(id, Some(description), Some(priority))?;
        debug!(id = %id, output = %output.combined().trim(), "bd update finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beads::IssueType;
    use std::path::PathBuf;

    #[test]
    fn test_from_beads_issue() {
        let issue: beads::Issue = serde_json::from_str(
            r#"{"id": "bd-1", "title": "t", "type": "bug", "priority": 1, "labels": ["PROJ-1"]}"#,
        )
        .unwrap();
        let local = LocalIssue::from(issue);
        assert_eq!(local.id, "bd-1");
        assert_eq!(local.issue_type.as_deref(), Some("bug"));
        assert!(local.has_label("PROJ-1"));
    }

    #[test]
    fn test_from_settings() {
        let settings = BeadsSettings {
            program: "/opt/bd".to_string(),
            workdir: Some(PathBuf::from("/repo")),
            global_flags: vec!["--no-daemon".to_string()],
        };
        let store = BeadsStore::from_settings(&settings);
        assert_eq!(store.program(), "/opt/bd");
    }

    #[test]
    fn test_missing_binary_surfaces_store_error() {
        let mut store = BeadsStore::from_settings(&BeadsSettings {
            program: "no-such-bd-binary-for-tests".to_string(),
            ..BeadsSettings::default()
        });
        assert!(!store.is_available());
        assert!(matches!(
            store.find_by_label("PROJ-1"),
            Err(crate::SyncError::Store(beads::Error::NotInstalled))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_create_returns_reported_id() {
        let bd = Beads::default().with_program("sh").with_global_flags(vec![
            "-c".to_string(),
            r#"echo '{"id":"bd-new","title":"x"}'"#.to_string(),
            "bd".to_string(),
        ]);
        let mut store = BeadsStore::new(bd);
        let payload = BeadPayload {
            external_key: "PROJ-1".to_string(),
            title: "x".to_string(),
            description: "d".to_string(),
            priority: 2,
            issue_type: IssueType::Task,
            labels: vec!["jira-synced".to_string(), "PROJ-1".to_string()],
        };
        assert_eq!(store.create(&payload).unwrap(), "bd-new");
    }

    #[cfg(unix)]
    #[test]
    fn test_global_flags_precede_command() {
        // Fails unless the configured flag comes before the subcommand
        let script = r#"[ "$1" = "--no-daemon" ] && [ "$2" = "list" ] && echo null"#;
        let settings = BeadsSettings {
            program: "sh".to_string(),
            workdir: None,
            global_flags: vec![
                "-c".to_string(),
                script.to_string(),
                "bd".to_string(),
                "--no-daemon".to_string(),
            ],
        };
        let mut store = BeadsStore::from_settings(&settings);
        assert!(store.find_by_label("PROJ-1").unwrap().is_empty());
    }
}
