//! Local issue store
//!
//! The reconciler talks to the destination store through [`IssueStore`]. The
//! production implementation shells out to `bd` ([`BeadsStore`]).

mod beads_store;

pub use beads_store::BeadsStore;

use crate::sync::mapper::BeadPayload;
use crate::Result;

/// An issue that already exists in the local store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIssue {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<u8>,
    pub issue_type: Option<String>,
    pub labels: Vec<String>,
}

impl LocalIssue {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Operations the reconciler needs from the destination store.
///
/// Implementations must report absent or malformed responses as errors
/// rather than as empty results.
pub trait IssueStore {
    /// Issues carrying `label`
    fn find_by_label(&mut self, label: &str) -> Result<Vec<LocalIssue>>;

    /// Create an issue from all mapped fields, returning the new id
    fn create(&mut self, payload: &BeadPayload) -> Result<String>;

    /// Overwrite description and priority of an existing issue
    fn update(&mut self, id: &str, description: &str, priority: u8) -> Result<()>;
}
