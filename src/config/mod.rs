//! Configuration system
//!
//! Loads `~/.config/jira-beads-sync/config.yaml` (or an explicit path) with:
//! - JIRA connection settings (URL, credential environment variables, paging)
//! - beads settings (bd executable, working directory)
//! - sync settings (the marker label applied to every synced issue)
//!
//! Command-line flags override anything read from the file.

mod sync_config;

pub use sync_config::{BeadsSettings, JiraIntegration, SyncConfig, SyncSettings};
