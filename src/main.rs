use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use paceboard::{cli, config, logging, web};

#[derive(Debug, Parser)]
#[command(name = "paceboard")]
#[command(about = "Running dashboard with an offline cache proxy")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the dashboard locally, proxying the exported origin through the offline cache
    Serve {
        /// Listen address (default: server.addr from config)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open a browser window
        #[arg(long)]
        no_open: bool,
    },
    /// Render the dashboard as a standalone HTML page
    Render {
        /// Read the snapshot from this file instead of the origin
        #[arg(long)]
        input: Option<PathBuf>,
        /// Write the page here (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Draw the dashboard in the terminal
    Show {
        /// Read the snapshot from this file instead of the origin
        #[arg(long)]
        input: Option<PathBuf>,
        /// Number of runs to list
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Inspect or clear the offline cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Check config, origin reachability, cache, and event log
    Health,
}

#[derive(Debug, Subcommand)]
enum CacheAction {
    /// List cache generations and entry counts
    Status,
    /// Delete every cache generation
    Clear,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective merged configuration
    Show,
    /// Write the default config to ~/.paceboard/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `cache.version paceboard-v2`
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let cfg = config::load();
    logging::init(&cfg.logging);

    match app.command {
        Commands::Serve { addr, no_open } => {
            let addr = addr.unwrap_or_else(|| cfg.server.addr.clone());
            let open = cfg.server.open_browser && !no_open;
            web::serve(cfg, &addr, open)
        }
        Commands::Render { input, output } => {
            cli::run_render(input.as_deref(), output.as_deref())
        }
        Commands::Show { input, limit } => cli::run_show(input.as_deref(), limit),
        Commands::Cache { action } => match action {
            CacheAction::Status => cli::run_cache_status(),
            CacheAction::Clear => cli::run_cache_clear(),
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
        Commands::Health => cli::run_health(),
    }
}
