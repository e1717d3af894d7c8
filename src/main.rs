//! jira-beads-sync - one-way JIRA to beads sync
//!
//! Main entry point for the CLI.

use anyhow::{bail, Context};
use clap::Parser;
use jira_beads_sync::config::SyncConfig;
use jira_beads_sync::integrations::JiraAdapter;
use jira_beads_sync::storage::BeadsStore;
use jira_beads_sync::sync::{self, IssueQuery, Reconciler, SourceReader, SyncStats};
use jira_beads_sync::{logging, style};
use std::path::PathBuf;
use std::process::ExitCode;

/// Sync open JIRA issues into beads
#[derive(Parser, Debug)]
#[command(name = "jira-beads-sync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JIRA project key (e.g., PROJ, MYAPP)
    project_key: String,

    /// Only sync issues in this JIRA component
    #[arg(long)]
    component: Option<String>,

    /// JIRA server URL (e.g., https://company.atlassian.net)
    #[arg(long, env = "JIRA_URL")]
    url: Option<String>,

    /// Use built-in example issues instead of querying JIRA (testing only)
    #[arg(long)]
    use_example_data: bool,

    /// Look up existing beads but do not create or update anything
    #[arg(long)]
    dry_run: bool,

    /// Path to config file (default: ~/.config/jira-beads-sync/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// bd executable to run
    #[arg(long)]
    bd_path: Option<String>,

    /// Directory to run bd in
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli).await {
        Ok(stats) if stats.has_errors() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<SyncConfig> {
    let mut config = match cli.config {
        Some(ref path) => SyncConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SyncConfig::load_default().context("Failed to load default config")?,
    };

    if let Some(ref url) = cli.url {
        config.jira.url = Some(url.clone());
    }
    if let Some(ref program) = cli.bd_path {
        config.beads.program = program.clone();
    }
    if let Some(ref dir) = cli.workdir {
        config.beads.workdir = Some(dir.clone());
    }

    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<SyncStats> {
    if cli.project_key.trim().is_empty() {
        bail!("Project key must not be empty");
    }

    let config = load_config(&cli)?;
    tracing::info!(project = %cli.project_key, "Configuration loaded");

    let store = BeadsStore::from_settings(&config.beads);
    if !store.is_available() {
        bail!(
            "beads CLI `{}` is not installed or not in PATH. Install beads first.",
            store.program()
        );
    }

    // Example data only ever comes from the explicit flag
    let reader = if cli.use_example_data {
        eprintln!(
            "{} Using example data (--use-example-data); nothing is read from JIRA",
            style::warning_marker()
        );
        SourceReader::fixtures()
    } else {
        let url = config.jira.url.as_deref().context(
            "No JIRA URL configured. Pass --url, set JIRA_URL, or add jira.url to the config file",
        )?;
        let adapter = JiraAdapter::new(url, &config.jira)?;
        if !adapter.is_authenticated() {
            tracing::warn!(
                token_env = %config.jira.token_env,
                "No JIRA credentials found; querying anonymously"
            );
        }
        SourceReader::live(adapter)
    };

    let mut query = IssueQuery::new(cli.project_key.trim());
    if let Some(component) = cli.component {
        query = query.with_component(component);
    }

    println!("{}", style::header("Jira to Beads Sync"));
    println!("Project:   {}", query.project());
    if let Some(component) = query.component() {
        println!("Component: {}", component);
    }
    println!("Source:    {}", reader.source_name());
    if cli.dry_run {
        println!("Mode:      dry run (no beads will be written)");
    }
    println!();

    let mut reconciler = Reconciler::new(store).with_dry_run(cli.dry_run);
    let report = sync::sync_once(
        &reader,
        &query,
        &mut reconciler,
        &config.sync.marker_label,
        |result| println!("  {}", style::result_line(result)),
    )
    .await;

    if report.stats.issues_pulled == 0 {
        println!("{} No issues to sync", style::info_marker());
    }

    println!();
    println!("{}", style::header("Sync Summary"));
    println!("{}", style::summary(&report.stats));

    Ok(report.stats)
}
