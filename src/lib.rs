//! jira-beads-sync - mirror open JIRA issues into a beads issue tracker
//!
//! One-way sync: JIRA is read, beads (via the `bd` CLI) is written. Every
//! synced bead carries a marker label and the JIRA key as a label; the key
//! label is how later runs find the bead again, so repeated runs update
//! instead of duplicating.
//!
//! # Architecture
//!
//! - **integrations**: JIRA REST adapter and the opt-in example data
//! - **sync**: source reader, field mapper, reconciler
//! - **storage**: the local store seam and its `bd`-backed implementation
//! - **config**: YAML configuration with CLI overrides

pub mod config;
pub mod error;
pub mod integrations;
pub mod logging;
pub mod storage;
pub mod style;
pub mod sync;

pub use error::{Result, SyncError};
