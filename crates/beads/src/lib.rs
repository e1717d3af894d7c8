//! Beads (bd) issue tracker wrapper
//!
//! A narrow, type-safe interface to the three bd commands the JIRA sync needs:
//! listing issues by label, creating an issue, and updating an issue.
//!
//! Every response is interpreted defensively: a non-zero exit status, empty
//! output, or output that is not the expected JSON is an error, never an
//! empty success.
//!
//! # Example
//!
//! ```no_run
//! use beads::{Beads, IssueType};
//!
//! let bd = Beads::new()?;
//!
//! let existing = bd.list_by_label("PROJ-123")?;
//! if existing.is_empty() {
//!     let labels = vec!["jira-synced".to_string(), "PROJ-123".to_string()];
//!     let created = bd.create_full("Fix the bug", IssueType::Bug, Some(1), Some("details"), &labels)?;
//!     println!("created {}", created.id);
//! }
//! # Ok::<(), beads::Error>(())
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

/// Errors that can occur when interacting with beads
#[derive(Error, Debug)]
pub enum Error {
    #[error("bd is not installed or not in PATH")]
    NotInstalled,

    #[error("Not in a beads-enabled repository")]
    NotInRepo,

    #[error("Failed to execute bd command: {0}")]
    CommandFailed(String),

    #[error("Failed to parse output: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for beads operations
pub type Result<T> = std::result::Result<T, Error>;

/// Issue type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Bug,
    Feature,
    Task,
    Epic,
}

impl IssueType {
    /// The bd command-line spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Bug => "bug",
            IssueType::Feature => "feature",
            IssueType::Task => "task",
            IssueType::Epic => "epic",
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A beads issue as reported by `bd list --json` / `bd create --json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "issue_type", alias = "type", default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Issue {
    /// Whether this issue carries the given label
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Output from a bd command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Get combined stdout and stderr output
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Beads CLI wrapper
#[derive(Debug, Clone)]
pub struct Beads {
    /// Executable to invoke (normally `bd`)
    program: String,
    /// Working directory
    workdir: Option<PathBuf>,
    /// Global flags to pass to all bd commands
    global_flags: Vec<String>,
}

impl Default for Beads {
    fn default() -> Self {
        Self {
            program: "bd".to_string(),
            workdir: None,
            global_flags: Vec::new(),
        }
    }
}

impl Beads {
    /// Create a new Beads instance, failing if bd is not available
    pub fn new() -> Result<Self> {
        let bd = Self::default();
        if !bd.is_available() {
            return Err(Error::NotInstalled);
        }
        Ok(bd)
    }

    /// Use a different executable instead of `bd`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Run bd commands in a specific working directory
    pub fn with_workdir(mut self, path: impl Into<PathBuf>) -> Self {
        self.workdir = Some(path.into());
        self
    }

    /// Flags placed before every command's own arguments
    pub fn with_global_flags(mut self, flags: Vec<String>) -> Self {
        self.global_flags = flags;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Check if bd is available
    pub fn is_available(&self) -> bool {
        self.run_command(&["--version"]).is_ok()
    }

    // --- Lookup ---

    /// List issues carrying a label
    pub fn list_by_label(&self, label: &str) -> Result<Vec<Issue>> {
        let output = self.run_command(&["list", "--label", label, "--json"])?;
        parse_issue_list(&output.stdout)
    }

    // --- Creation ---

    /// Create an issue and return the record bd reports back
    pub fn create_full(
        &self,
        title: &str,
        issue_type: IssueType,
        priority: Option<u8>,
        description: Option<&str>,
        labels: &[String],
    ) -> Result<Issue> {
        let mut args = vec!["create", "--title", title, "--type", issue_type.as_str()];

        let priority_str;
        if let Some(p) = priority {
            priority_str = p.to_string();
            args.extend(["--priority", &priority_str]);
        }

        if let Some(desc) = description {
            args.extend(["--description", desc]);
        }

        for label in labels {
            args.extend(["--labels", label.as_str()]);
        }

        args.push("--json");

        let output = self.run_command(&args)?;
        parse_created_issue(&output.stdout)
    }

    // --- Updates ---

    /// Update an issue's description and/or priority
    pub fn update(
        &self,
        id: &str,
        description: Option<&str>,
        priority: Option<u8>,
    ) -> Result<CommandOutput> {
        let mut args = vec!["update".to_string(), id.to_string()];

        if let Some(d) = description {
            args.push("--description".to_string());
            args.push(d.to_string());
        }

        if let Some(p) = priority {
            args.push(format!("--priority={}", p));
        }

        args.push("--json".to_string());

        let args_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
        self.run_command(&args_refs)
    }

    fn run_command(&self, args: &[&str]) -> Result<CommandOutput> {
        let mut cmd = Command::new(&self.program);

        for flag in &self.global_flags {
            cmd.arg(flag);
        }

        cmd.args(args);

        if let Some(ref dir) = self.workdir {
            cmd.current_dir(dir);
        }

        let output = match cmd.output() {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotInstalled)
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        // A failed exit is a failure even when bd printed nothing.
        if !output.status.success() {
            if stderr.contains("not initialized") || stderr.contains("No .beads") {
                return Err(Error::NotInRepo);
            }
            let detail = if stderr.trim().is_empty() {
                format!("`{}` exited with {}", args.first().unwrap_or(&""), output.status)
            } else {
                stderr.trim().to_string()
            };
            return Err(Error::CommandFailed(detail));
        }

        Ok(CommandOutput {
            success: true,
            stdout,
            stderr,
        })
    }
}

/// Parse `bd list --json` output.
///
/// `null` (bd's encoding of an empty list) is accepted as empty; blank output
/// is not.
pub fn parse_issue_list(stdout: &str) -> Result<Vec<Issue>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err(Error::ParseError("bd list returned no output".to_string()));
    }
    if trimmed == "null" {
        return Ok(Vec::new());
    }
    let issues: Vec<Issue> = serde_json::from_str(trimmed)?;
    Ok(issues)
}

/// Parse `bd create --json` output into the created issue.
pub fn parse_created_issue(stdout: &str) -> Result<Issue> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err(Error::ParseError("bd create returned no output".to_string()));
    }

    let value: serde_json::Value = serde_json::from_str(trimmed)?;
    let issue: Issue = match value {
        serde_json::Value::Array(mut items) if items.len() == 1 => {
            serde_json::from_value(items.remove(0))?
        }
        serde_json::Value::Object(_) => serde_json::from_value(value)?,
        other => {
            return Err(Error::ParseError(format!(
                "expected an issue object from bd create, got: {}",
                other
            )))
        }
    };

    if issue.id.trim().is_empty() {
        return Err(Error::ParseError("bd create returned an empty id".to_string()));
    }
    Ok(issue)
}
