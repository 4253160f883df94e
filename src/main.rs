// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! snipd main entry point - CLI and server startup.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tokio_util::sync::CancellationToken;

use snipd::api::{self, AppState};
use snipd::config::{self, CliOptions, EngineKind, ResolvedConfig};
use snipd::telemetry::{init_telemetry, TelemetryConfig};

/// snipd - code intelligence and sandboxed execution for Python snippets.
#[derive(Parser)]
#[command(name = "snipd")]
#[command(author, version, about = "Python editor backend: autocomplete, hover, run", long_about = None)]
struct Cli {
    /// Config file to use instead of the working-directory search
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Show debug output
    #[arg(long, global = true)]
    debug: bool,

    #[command(flatten)]
    overrides: ServeArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options that override configuration files.
#[derive(clap::Args)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "SNIPD_HOST", global = true)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SNIPD_PORT", global = true)]
    port: Option<u16>,

    /// Analysis engine
    #[arg(short, long, env = "SNIPD_ENGINE", global = true)]
    engine: Option<Engine>,

    /// Python interpreter for runs and the jedi engine
    #[arg(long, env = "SNIPD_PYTHON", global = true)]
    python: Option<PathBuf>,

    /// Maximum concurrent runs
    #[arg(long, env = "SNIPD_MAX_CONCURRENT_RUNS", global = true)]
    max_concurrent_runs: Option<usize>,

    /// Default run time limit in milliseconds
    #[arg(long, env = "SNIPD_RUN_TIMEOUT_MS", global = true)]
    run_timeout_ms: Option<u64>,

    /// Analysis budget in milliseconds
    #[arg(long, env = "SNIPD_ANALYSIS_TIMEOUT_MS", global = true)]
    analysis_timeout_ms: Option<u64>,
}

impl From<ServeArgs> for CliOptions {
    fn from(args: ServeArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            engine: args.engine.map(EngineKind::from),
            python: args.python,
            max_concurrent_runs: args.max_concurrent_runs,
            run_timeout_ms: args.run_timeout_ms,
            analysis_timeout_ms: args.analysis_timeout_ms,
        }
    }
}

/// Available analysis engines.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Engine {
    /// In-process static analysis
    TreeSitter,
    /// jedi in a Python subprocess
    Jedi,
}

impl From<Engine> for EngineKind {
    fn from(engine: Engine) -> Self {
        match engine {
            Engine::TreeSitter => EngineKind::TreeSitter,
            Engine::Jedi => EngineKind::Jedi,
        }
    }
}

/// Subcommands for snipd.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (the default)
    Serve,

    /// Show or create configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Show version information
    Version,
}

/// Config subcommand actions.
#[derive(Subcommand)]
enum ConfigAction {
    /// Show the resolved configuration
    Show {
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Write an example snipd.json in the working directory
    Init,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _telemetry = init_telemetry(&TelemetryConfig::from_flags(cli.verbose, cli.debug))?;

    let options = CliOptions::from(cli.overrides);
    match cli.command {
        None | Some(Commands::Serve) => serve(cli.config, options).await,
        Some(Commands::Config { action }) => handle_config(cli.config, options, action),
        Some(Commands::Version) => {
            println!("snipd {}", snipd::VERSION);
            Ok(())
        }
    }
}

fn load(explicit: Option<PathBuf>, options: CliOptions) -> anyhow::Result<ResolvedConfig> {
    let workspace_root = std::env::current_dir()?;
    Ok(config::load_config(&workspace_root, explicit.as_deref(), options)?)
}

async fn serve(explicit: Option<PathBuf>, options: CliOptions) -> anyhow::Result<()> {
    let config = load(explicit, options)?;
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    println!(
        "{} snipd {} on http://{} ({} engine)",
        "→".cyan(),
        snipd::VERSION,
        listener.local_addr()?,
        config.engine
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(api::shutdown_on_signal(shutdown.clone()));
    let state = AppState::from_config(config, shutdown);
    api::serve(listener, state).await?;
    Ok(())
}

fn handle_config(explicit: Option<PathBuf>, options: CliOptions, action: Option<ConfigAction>) -> anyhow::Result<()> {
    match action {
        Some(ConfigAction::Show { json: true }) => {
            let config = load(explicit, options)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Some(ConfigAction::Show { json: false }) | None => {
            let config = load(explicit, options)?;
            print_summary(&config);
        }
        Some(ConfigAction::Init) => {
            let workspace_root = std::env::current_dir()?;
            let path = config::init_config(&workspace_root)?;
            println!("{} Created config file: {}", "✓".green(), path.display());
        }
    }
    Ok(())
}

fn print_summary(config: &ResolvedConfig) {
    println!("{}", "snipd configuration".bright_blue().bold());
    println!("Listen:        {}", config.bind_address().bright_white());
    println!("Engine:        {}", config.engine.as_str().bright_magenta());
    println!("Analysis:      {}ms budget", config.analysis_timeout_ms);
    println!("Python:        {}", config.sandbox.python.display());
    println!(
        "Runs:          {} concurrent, {}ms default, {}ms max",
        config.sandbox.max_concurrent_runs, config.sandbox.timeout_ms, config.sandbox.max_timeout_ms
    );
    println!(
        "Run limits:    {} MiB memory, {} KiB output",
        config.sandbox.memory_limit_mb,
        config.sandbox.output_limit_bytes / 1024
    );
    println!("CORS origins:  {}", config.cors_origins.join(", "));
    println!("\n{}", "Use 'snipd config show --json' for the full configuration".dimmed());
}
