//! Command-line driver for the Transcrypt transformer.
//!
//! Runs the same steps a bundler runs through the plugin interface, which is
//! useful for checking a project's configuration and for plain builds without
//! a bundler.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use transformer::core::path::resolve;
use transformer::core::types::{DEFAULT_COMMAND, ToolKind};
use transformer::exit_codes;
use transformer::host::{BuildMode, BuildOptions, MemoryAsset};
use transformer::io::probe::resolve_version;
use transformer::io::process::ProcessRunner;
use transformer::logging;
use transformer::transform::TranscryptTransformer;
use transformer::watch::run_watch_loop;

#[derive(Parser)]
#[command(
    name = "transcrypt-transform",
    version,
    about = "Transpile Python entry points with Transcrypt the way the bundler plugin does"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct ProjectArgs {
    /// Project root; Transcrypt runs from here. Defaults to the current directory.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Kill Transcrypt after this many seconds (default: wait indefinitely).
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Transpile a Python file and print the generated re-export module.
    Transform {
        file: PathBuf,
        #[command(flatten)]
        project: ProjectArgs,
        /// Development builds also report the files to watch.
        #[arg(long, value_enum, default_value_t = BuildMode::Production)]
        mode: BuildMode,
    },
    /// Print the effective configuration for a Python file as JSON.
    Config {
        file: PathBuf,
        #[command(flatten)]
        project: ProjectArgs,
    },
    /// Print the Transcrypt and Python versions reachable through a command.
    Versions {
        #[arg(long, default_value = DEFAULT_COMMAND)]
        command: String,
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Transpile a Python file, then again whenever one of its modules changes.
    Watch {
        file: PathBuf,
        #[command(flatten)]
        project: ProjectArgs,
        /// Poll interval in milliseconds.
        #[arg(long, default_value_t = 500)]
        poll_ms: u64,
    },
}

fn main() {
    logging::init("info");
    let code = match run() {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{err:#}");
            exit_codes::for_error(&err)
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Transform {
            file,
            project,
            mode,
        } => cmd_transform(&file, &project, mode),
        Command::Config { file, project } => cmd_config(&file, &project),
        Command::Versions {
            command,
            timeout_secs,
        } => cmd_versions(&command, timeout_secs),
        Command::Watch {
            file,
            project,
            poll_ms,
        } => cmd_watch(&file, &project, Duration::from_millis(poll_ms)),
    }
}

/// Resolved project root and source file for a command.
struct Target {
    root: PathBuf,
    source: PathBuf,
    transformer: TranscryptTransformer<ProcessRunner>,
}

impl Target {
    fn new(file: &Path, project: &ProjectArgs) -> Result<Self> {
        let cwd = std::env::current_dir().context("read current directory")?;
        let root = match &project.root {
            Some(root) => resolve(&cwd, root),
            None => cwd.clone(),
        };
        let source = resolve(&cwd, file);
        if !source.is_file() {
            anyhow::bail!("source file not found: {}", source.display());
        }
        let runner = ProcessRunner::with_timeout(project.timeout_secs.map(Duration::from_secs));
        Ok(Self {
            root,
            source,
            transformer: TranscryptTransformer::new(runner),
        })
    }

    /// Load config and transform; returns the generated code and watched files.
    fn transform(&self, mode: BuildMode) -> Result<(String, BTreeSet<PathBuf>)> {
        let config = self.transformer.load_config(&self.source, &self.root)?;
        let options = BuildOptions {
            project_root: self.root.clone(),
            mode,
        };
        let assets = self
            .transformer
            .transform(MemoryAsset::new(&self.source), config.as_ref(), &options)
            .with_context(|| format!("transform {}", self.source.display()))?;
        let mut code = String::new();
        let mut watched = BTreeSet::new();
        for asset in assets {
            code.push_str(asset.code.as_deref().unwrap_or_default());
            watched.extend(asset.invalidations);
        }
        Ok((code, watched))
    }
}

fn cmd_transform(file: &Path, project: &ProjectArgs, mode: BuildMode) -> Result<()> {
    let target = Target::new(file, project)?;
    let (code, watched) = target.transform(mode)?;
    for path in &watched {
        info!(path = %path.display(), "watch");
    }
    println!("{code}");
    Ok(())
}

fn cmd_config(file: &Path, project: &ProjectArgs) -> Result<()> {
    let target = Target::new(file, project)?;
    let config = target.transformer.load_config(&target.source, &target.root)?;
    let effective = target
        .transformer
        .resolve(config.as_ref(), &target.source, &target.root)?;
    let mut payload = serde_json::to_string_pretty(&effective).context("serialize config")?;
    payload.push('\n');
    print!("{payload}");
    Ok(())
}

fn cmd_versions(command: &str, timeout_secs: Option<u64>) -> Result<()> {
    let runner = ProcessRunner::with_timeout(timeout_secs.map(Duration::from_secs));
    for kind in [ToolKind::Toolchain, ToolKind::Runtime] {
        let label = match resolve_version(&runner, command, kind) {
            Some(version) if version.is_not_installed() => "not installed".to_string(),
            Some(version) => version.to_string(),
            None => "unknown".to_string(),
        };
        println!("{kind}: {label}");
    }
    Ok(())
}

fn cmd_watch(file: &Path, project: &ProjectArgs, poll_interval: Duration) -> Result<()> {
    let target = Target::new(file, project)?;
    let rebuild = |_: &BTreeSet<PathBuf>| -> Result<BTreeSet<PathBuf>> {
        let (code, mut watched) = target.transform(BuildMode::Development)?;
        println!("{code}");
        watched.insert(target.source.clone());
        Ok(watched)
    };

    let initial = match rebuild(&BTreeSet::new()) {
        Ok(watched) => watched,
        Err(err) => {
            tracing::error!("{err:#}");
            BTreeSet::from([target.source.clone()])
        }
    };
    run_watch_loop(initial, poll_interval, rebuild)
}
