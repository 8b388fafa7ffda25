//! screenplan command-line entry point.
//!
//! ```text
//! screenplan resolve <snapshot.json>
//! screenplan replay  <snapshot.json> <script.json>
//! screenplan init-config [--force]
//! ```
//!
//! Editor settings come from the TOML config file, then environment
//! variables (`SCREENPLAN_*`), then flags, each overriding the previous.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use screenplan_cli::application::replay::run_script;
use screenplan_cli::application::report::{describe_layout, describe_selection};
use screenplan_cli::infrastructure::script::load_script;
use screenplan_cli::infrastructure::snapshot::load_snapshot;
use screenplan_cli::infrastructure::storage::config::{
    self, config_file_path, load_config_from, save_config, save_config_to, AppConfig, ConfigError,
    EditorConfig, LoggingConfig,
};
use screenplan_core::{EditOptions, LayoutView};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Resolves and edits multi-monitor layouts.
#[derive(Debug, Parser)]
#[command(name = "screenplan", about = "Multi-monitor layout resolver and editor", version)]
struct Cli {
    /// Config file; defaults to `config.toml` in the platform config directory.
    #[arg(long, global = true, env = "SCREENPLAN_CONFIG")]
    config: Option<PathBuf>,

    /// Snap distance in pixels.
    #[arg(long, global = true, env = "SCREENPLAN_SNAP_STRENGTH")]
    snap_strength: Option<i32>,

    /// Disable snapping for operations that do not set it themselves.
    #[arg(long, global = true, env = "SCREENPLAN_NO_SNAP")]
    no_snap: bool,

    /// Edit only the current metamode.
    #[arg(long, global = true, env = "SCREENPLAN_ADVANCED")]
    advanced: bool,

    /// Log level when `RUST_LOG` is not set.
    #[arg(long, global = true, env = "SCREENPLAN_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the resolved geometry of a snapshot.
    Resolve { snapshot: PathBuf },
    /// Apply a script of edits to a snapshot and print each step.
    Replay { snapshot: PathBuf, script: PathBuf },
    /// Write the effective settings to the config file.
    InitConfig {
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Effective settings after merging the config file with the flags.
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    options: EditOptions,
    snap: bool,
    log_level: String,
}

impl Cli {
    fn settings(&self, config: &AppConfig) -> Settings {
        let mut options = config.editor.edit_options();
        if let Some(strength) = self.snap_strength {
            options.snap_strength = strength.max(0);
        }
        options.advanced_mode |= self.advanced;
        Settings {
            options,
            snap: config.editor.snap && !self.no_snap,
            log_level: self
                .log_level
                .clone()
                .unwrap_or_else(|| config.logging.level.clone()),
        }
    }

    fn load_config(&self) -> anyhow::Result<AppConfig> {
        match &self.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("loading config {}", path.display())),
            None => match config::load_config() {
                // No platform directory: run on defaults.
                Err(ConfigError::NoPlatformConfigDir) => Ok(AppConfig::default()),
                other => other.context("loading platform config"),
            },
        }
    }
}

impl Settings {
    fn to_config(&self) -> AppConfig {
        AppConfig {
            editor: EditorConfig {
                snap_strength: self.options.snap_strength,
                snap: self.snap,
                advanced_mode: self.options.advanced_mode,
            },
            logging: LoggingConfig {
                level: self.log_level.clone(),
            },
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn open_view(snapshot: &Path, options: EditOptions) -> anyhow::Result<LayoutView> {
    let layout = load_snapshot(snapshot)
        .with_context(|| format!("loading snapshot {}", snapshot.display()))?;
    let view = LayoutView::new(layout, options);
    info!(session = %view.session_id(), snapshot = %snapshot.display(), "layout loaded");
    Ok(view)
}

fn print_layout(view: &LayoutView) {
    for line in describe_layout(view.layout()) {
        println!("{line}");
    }
    println!("{}", describe_selection(view.layout(), view.selection()));
}

fn resolve(snapshot: &Path, settings: &Settings) -> anyhow::Result<()> {
    let view = open_view(snapshot, settings.options)?;
    print_layout(&view);
    Ok(())
}

fn replay(snapshot: &Path, script: &Path, settings: &Settings) -> anyhow::Result<()> {
    let mut view = open_view(snapshot, settings.options)?;
    let ops =
        load_script(script).with_context(|| format!("loading script {}", script.display()))?;
    info!(operations = ops.len(), "replaying script");

    let outcomes = run_script(&mut view, &ops, settings.snap)
        .with_context(|| format!("replaying {}", script.display()))?;
    for outcome in &outcomes {
        println!("{outcome}");
    }
    print_layout(&view);
    Ok(())
}

/// Writes `settings` to `target`, or to the platform config file.
fn init_config(target: Option<&Path>, settings: &Settings, force: bool) -> anyhow::Result<PathBuf> {
    let path = match target {
        Some(path) => path.to_path_buf(),
        None => config_file_path().context("locating the platform config directory")?,
    };
    if path.exists() && !force {
        anyhow::bail!("{} already exists; pass --force to replace it", path.display());
    }
    let config = settings.to_config();
    match target {
        Some(path) => save_config_to(&config, path),
        None => save_config(&config),
    }
    .with_context(|| format!("writing config {}", path.display()))?;
    info!(path = %path.display(), "config written");
    Ok(path)
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    let settings = cli.settings(&config);

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        snap_strength = settings.options.snap_strength,
        snap = settings.snap,
        advanced = settings.options.advanced_mode,
        "screenplan starting"
    );

    match &cli.command {
        Command::Resolve { snapshot } => resolve(snapshot, &settings),
        Command::Replay { snapshot, script } => replay(snapshot, script, &settings),
        Command::InitConfig { force } => {
            let path = init_config(cli.config.as_deref(), &settings, *force)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
