//! Terminal styling utilities
//!
//! Console colors for the sync report.
//! Uses crossterm for cross-platform terminal colors.

use crate::sync::{SyncAction, SyncResult, SyncStats};
use crossterm::style::{StyledContent, Stylize};

pub fn warning_marker() -> StyledContent<&'static str> {
    "⚠".yellow().bold()
}

pub fn info_marker() -> StyledContent<&'static str> {
    "ℹ".blue()
}

/// Section header framed by rules
pub fn header(title: &str) -> String {
    let rule = "=".repeat(60);
    format!("{}\n{}\n{}", rule, title.bold(), rule)
}

/// One line describing what happened to an issue
pub fn result_line(result: &SyncResult) -> String {
    let id = result.bead_id.as_deref().unwrap_or("-");
    match result.action {
        SyncAction::CreatedBead => {
            format!("{} {} → created {}", "✓".green(), result.jira_key, id.bold())
        }
        SyncAction::UpdatedBead => {
            format!("{} {} → updated {}", "✓".green(), result.jira_key, id.bold())
        }
        SyncAction::WouldCreate => {
            format!("{} {} → would create", "○".cyan(), result.jira_key)
        }
        SyncAction::WouldUpdate => {
            format!("{} {} → would update {}", "○".cyan(), result.jira_key, id)
        }
        SyncAction::Skipped => format!("{} {} → skipped", "-".dark_grey(), result.jira_key),
        SyncAction::Error => format!(
            "{} {} → error: {}",
            "✗".red().bold(),
            result.jira_key,
            result.error.as_deref().unwrap_or("unknown failure")
        ),
    }
}

/// Final tally block
pub fn summary(stats: &SyncStats) -> String {
    let errors = if stats.errors > 0 {
        stats.errors.to_string().red().bold().to_string()
    } else {
        stats.errors.to_string()
    };
    format!(
        "Created:  {}\nUpdated:  {}\nSkipped:  {}\nErrors:   {}\nTotal:    {}",
        stats.created, stats.updated, stats.skipped, errors, stats.issues_pulled
    )
}
