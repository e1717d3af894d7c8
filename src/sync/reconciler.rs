//! Reconciler
//!
//! Decides, per mapped issue, whether to create a beads issue or update the
//! one already tagged with the JIRA key. A failure on one issue is counted and
//! the batch moves on.

use super::mapper::BeadPayload;
use crate::storage::{IssueStore, LocalIssue};
use crate::Result;
use tracing::{error, info, warn};

/// What happened to a single issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    CreatedBead,
    UpdatedBead,
    /// Dry run: the issue would have been created
    WouldCreate,
    /// Dry run: the issue would have updated an existing bead
    WouldUpdate,
    Skipped,
    Error,
}

/// Sync result for a single issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub jira_key: String,
    pub bead_id: Option<String>,
    pub action: SyncAction,
    pub error: Option<String>,
}

impl SyncResult {
    fn ok(key: &str, bead_id: Option<String>, action: SyncAction) -> Self {
        Self {
            jira_key: key.to_string(),
            bead_id,
            action,
            error: None,
        }
    }

    fn failed(key: &str, bead_id: Option<String>, error: impl ToString) -> Self {
        Self {
            jira_key: key.to_string(),
            bead_id,
            action: SyncAction::Error,
            error: Some(error.to_string()),
        }
    }
}

/// Per-run tally
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncStats {
    pub issues_pulled: u32,
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,
    pub errors: u32,
}

impl SyncStats {
    pub fn record(&mut self, result: &SyncResult) {
        match result.action {
            SyncAction::CreatedBead => self.created += 1,
            SyncAction::UpdatedBead => self.updated += 1,
            SyncAction::WouldCreate | SyncAction::WouldUpdate | SyncAction::Skipped => {
                self.skipped += 1
            }
            SyncAction::Error => self.errors += 1,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Outcome of a whole run
#[derive(Debug, Default, Clone)]
pub struct SyncReport {
    pub stats: SyncStats,
    pub results: Vec<SyncResult>,
}

pub struct Reconciler<S: IssueStore> {
    store: S,
    dry_run: bool,
}

impl<S: IssueStore> Reconciler<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            dry_run: false,
        }
    }

    /// Look up existing issues but never create or update
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// The existing local issue linked to `key`, if any.
    ///
    /// The store's label filter is authoritative: whatever it returns is a
    /// match, even when the record comes back without its labels. Records that
    /// visibly carry the key label are preferred when there are several.
    fn find_existing(&mut self, key: &str) -> Result<Option<LocalIssue>> {
        let found = self.store.find_by_label(key)?;

        let mut matches: Vec<LocalIssue> = if found.iter().any(|issue| issue.has_label(key)) {
            found.into_iter().filter(|issue| issue.has_label(key)).collect()
        } else {
            found
        };

        if matches.len() > 1 {
            warn!(
                key = %key,
                ids = ?matches.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(),
                "Several beads issues carry the same JIRA key; using the first"
            );
        }

        Ok(if matches.is_empty() {
            None
        } else {
            Some(matches.swap_remove(0))
        })
    }

    /// Create or update the bead for one payload
    pub fn sync_issue(&mut self, payload: &BeadPayload) -> SyncResult {
        let key = payload.external_key.as_str();

        if key.is_empty() {
            warn!(title = %payload.title, "Issue has no key and cannot be linked; skipping");
            return SyncResult::ok(key, None, SyncAction::Skipped);
        }

        let existing = match self.find_existing(key) {
            Ok(existing) => existing,
            Err(e) => {
                error!(key = %key, error = %e, "Lookup of existing beads issue failed");
                return SyncResult::failed(key, None, e);
            }
        };

        match existing {
            Some(local) if self.dry_run => {
                SyncResult::ok(key, Some(local.id), SyncAction::WouldUpdate)
            }
            None if self.dry_run => SyncResult::ok(key, None, SyncAction::WouldCreate),
            Some(local) => {
                // Type and labels are fixed at creation; only mapped fields change
                match self
                    .store
                    .update(&local.id, &payload.description, payload.priority)
                {
                    Ok(()) => {
                        info!(key = %key, id = %local.id, "Updated beads issue");
                        SyncResult::ok(key, Some(local.id), SyncAction::UpdatedBead)
                    }
                    Err(e) => {
                        error!(key = %key, id = %local.id, error = %e, "Update failed");
                        SyncResult::failed(key, Some(local.id), e)
                    }
                }
            }
            None => match self.store.create(payload) {
                Ok(id) => {
                    info!(key = %key, id = %id, "Created beads issue");
                    SyncResult::ok(key, Some(id), SyncAction::CreatedBead)
                }
                Err(e) => {
                    error!(key = %key, error = %e, "Create failed");
                    SyncResult::failed(key, None, e)
                }
            },
        }
    }

    /// Process payloads in order, reporting each result as it happens
    pub fn run<F>(&mut self, payloads: &[BeadPayload], mut on_result: F) -> SyncReport
    where
        F: FnMut(&SyncResult),
    {
        let mut report = SyncReport::default();
        report.stats.issues_pulled = payloads.len() as u32;

        for payload in payloads {
            let result = self.sync_issue(payload);
            report.stats.record(&result);
            on_result(&result);
            report.results.push(result);
        }

        report
    }
}
