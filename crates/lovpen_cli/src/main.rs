//! Headless host for the LovPen create workspace.
//!
//! Replays scripted panel and sidebar events against a session and prints
//! the resulting state, or lists the platform catalog.

mod replay;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use lovpen_core::{Config, PlatformCatalog, Workspace};
use replay::{load_script, Replay, StepReport};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "lovpen_core=info,lovpen_cli=info";

#[derive(Parser)]
#[command(name = "lovpen-session", about = "LovPen workspace session host", version)]
struct Cli {
    /// Platform catalog JSON file (defaults to the built-in catalog)
    #[arg(long, global = true, env = "LOVPEN_CATALOG_PATH")]
    catalog: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Replay a JSON script of workspace events
    Replay {
        script: PathBuf,
        /// Platform of the panel the session starts with
        #[arg(long, env = "LOVPEN_INITIAL_PLATFORM")]
        initial_platform: Option<String>,
        /// Generated content to measure against platform limits
        #[arg(long)]
        content_file: Option<PathBuf>,
    },
    /// List the platform catalog
    Platforms,
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

/// Environment config with CLI flags layered on top.
fn resolve_config(catalog: Option<PathBuf>, initial_platform: Option<String>) -> Config {
    let mut config = Config::from_env();
    if let Some(path) = catalog {
        config.catalog_path = Some(path);
    }
    if let Some(platform) = initial_platform.filter(|value| !value.trim().is_empty()) {
        config.initial_platform = platform.trim().to_string();
    }
    config
}

fn format_platforms(catalog: &PlatformCatalog, json: bool) -> Result<String> {
    if json {
        let platforms: Vec<_> = catalog.iter().collect();
        return serde_json::to_string_pretty(&platforms).context("catalog encoding error");
    }

    let rows: Vec<String> = catalog
        .iter()
        .map(|platform| {
            let formats: Vec<&str> = platform
                .constraints
                .supported_formats
                .iter()
                .map(String::as_str)
                .collect();
            format!(
                "{:<12} {:<28} {:>6}  {}",
                platform.id,
                platform.full_name,
                platform.constraints.max_characters,
                formats.join(",")
            )
        })
        .collect();
    Ok(rows.join("\n"))
}

fn format_replay_output(reports: &[StepReport], workspace: &Workspace, json: bool) -> Result<String> {
    if json {
        let body = serde_json::json!({
            "steps": reports,
            "header": workspace.header(),
            "snapshot": workspace.snapshot(),
            "resolved": workspace.resolved_settings(),
            "plan": workspace.generation_plan(),
        });
        return serde_json::to_string_pretty(&body).context("snapshot encoding error");
    }

    let mut lines = Vec::new();
    for report in reports {
        let status = if report.ok { "ok" } else { "FAIL" };
        lines.push(format!(
            "[{:<4}] {:>3} {:<16} {}",
            status, report.index, report.op, report.detail
        ));
    }

    let sidebar = workspace.header();
    lines.push(String::new());
    lines.push(format!("mode: {} ({})", workspace.mode(), sidebar.title));
    if !sidebar.hint.is_empty() {
        lines.push(format!("hint: {}", sidebar.hint));
    }
    for target in workspace.generation_plan() {
        let selected = workspace
            .panels()
            .get(&target.panel_id)
            .is_some_and(|panel| panel.is_selected());
        let marker = if selected { "*" } else { " " };
        let over = if target.length.is_over_limit() {
            format!(" over limit by {}", target.length.excess())
        } else {
            String::new()
        };
        lines.push(format!(
            "{} {:<46} {:<12} {}/{}{}",
            marker,
            target.panel_id.as_str(),
            target.platform_id,
            target.length.used,
            target.length.limit,
            over
        ));
    }
    Ok(lines.join("\n"))
}

fn run_replay(
    config: &Config,
    script: &Path,
    content_file: Option<&Path>,
) -> Result<(Vec<StepReport>, Replay)> {
    let steps = load_script(script)?;
    let content = content_file
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read content {}", path.display()))
        })
        .transpose()?;

    let mut workspace = Workspace::from_config(config).context("failed to start session")?;
    if let Some(content) = content {
        workspace.set_generated_content(content);
    }

    let mut replay = Replay::new(workspace);
    let reports = replay.run(&steps);
    let failed = reports.iter().filter(|report| !report.ok).count();
    info!(steps = reports.len(), failed, "replay finished");
    Ok((reports, replay))
}

fn main() -> Result<()> {
    let Cli {
        catalog,
        json,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    init_tracing();

    match command {
        Commands::Completions { .. } => unreachable!("completions handled before session setup"),
        Commands::Replay {
            script,
            initial_platform,
            content_file,
        } => {
            let config = resolve_config(catalog, initial_platform);
            let (reports, replay) = run_replay(&config, &script, content_file.as_deref())?;
            println!(
                "{}",
                format_replay_output(&reports, replay.workspace(), json)?
            );
        }
        Commands::Platforms => {
            let config = resolve_config(catalog, None);
            let catalog = config.load_catalog().context("failed to load catalog")?;
            println!("{}", format_platforms(&catalog, json)?);
        }
    }
    Ok(())
}
