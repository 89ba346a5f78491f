//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `paceboard render` — write the dashboard as a static HTML page
//! - `paceboard show` — draw the dashboard in the terminal
//! - `paceboard cache status|clear` — inspect or drop the offline cache
//! - `paceboard health` — check config, origin reachability, cache, log
//! - `paceboard config show|init|set|reset` — configuration management

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::chart::DrawSurface;
use crate::chart::svg::SvgSurface;
use crate::chart::terminal::TerminalSurface;
use crate::config::{self, PaceboardConfig};
use crate::dashboard::page::{self, PageOptions};
use crate::dashboard::{ChartPalette, ChartSurfaces, Dashboard, Phase};
use crate::logging;
use crate::proxy::{CacheMode, CacheStore, DiskStore, Fetch, Request, UreqNetwork};
use crate::snapshot::Snapshot;
use crate::web::host::{ProxyHost, live_proxy};

/// Load the dashboard either from a local snapshot file or through the
/// offline cache proxy.
fn load_dashboard<S: DrawSurface>(
    cfg: &PaceboardConfig,
    input: Option<&Path>,
    charts: ChartSurfaces<S>,
) -> Result<Dashboard<S>> {
    let mut dashboard = Dashboard::new(
        config::data_url(&cfg.source)?,
        charts,
        ChartPalette::from(&cfg.charts),
    );

    match input {
        Some(path) => {
            let bytes =
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            match Snapshot::from_slice(&bytes) {
                Ok(snapshot) => dashboard.apply(&snapshot),
                Err(e) => dashboard.fail(&e.into()),
            };
        }
        None => {
            let mut host = ProxyHost::new(live_proxy(cfg)?, cfg.cache.enabled);
            host.ensure_installed();
            dashboard.refresh(host.proxy());
        }
    }
    Ok(dashboard)
}

fn print_phase<S: DrawSurface>(dashboard: &Dashboard<S>) {
    let message = dashboard.view().empty_message.as_str();
    match dashboard.phase() {
        Phase::Loaded => {}
        Phase::Empty => println!("{}", message.yellow()),
        Phase::Error | Phase::Loading => {
            eprintln!("{}", message.red());
            if let Some(cause) = dashboard.last_error() {
                eprintln!("  {} {}", "Cause:".dimmed(), cause);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// paceboard render
// ---------------------------------------------------------------------------

/// Render the dashboard to a standalone HTML file (or stdout).
pub fn run_render(input: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let cfg = config::load();
    let dashboard = load_dashboard(&cfg, input, ChartSurfaces::from_ids(SvgSurface::new))?;
    let html = page::render_page(dashboard.view(), PageOptions::default());

    match output {
        Some(path) => {
            fs::write(path, &html).with_context(|| format!("failed to write {}", path.display()))?;
            print_phase(&dashboard);
            println!(
                "{} Dashboard ({}) written to {}",
                "✓".green().bold(),
                dashboard.phase(),
                path.display()
            );
        }
        None => print!("{html}"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// paceboard show
// ---------------------------------------------------------------------------

/// Draw KPIs, charts, and the most recent runs in the terminal.
pub fn run_show(input: Option<&Path>, limit: usize) -> Result<()> {
    let cfg = config::load();
    let dashboard = load_dashboard(
        &cfg,
        input,
        ChartSurfaces::from_ids(|_| TerminalSurface::default()),
    )?;
    let view = dashboard.view();

    println!("{}", "Running Dashboard".bold().cyan());
    println!("{}", "=".repeat(64));
    println!("  {}", view.status.dimmed());
    println!();

    if !view.content_visible {
        print_phase(&dashboard);
        return Ok(());
    }

    for card in view.kpis.cards() {
        println!("  {:<20} {}", card.label.bold(), card.value);
    }

    let colorize = colored::control::SHOULD_COLORIZE.should_colorize();
    for (title, surface) in [
        ("Monthly Mileage", &view.charts.monthly),
        ("Pace vs Heart Rate", &view.charts.scatter),
        ("Cadence Trend", &view.charts.cadence),
        ("Distance per Run", &view.charts.distance),
    ] {
        println!();
        println!("{}", title.bold());
        print!("{}", surface.render(colorize));
    }

    println!();
    println!("{}", "Recent Runs".bold());
    println!(
        "  {:<12} {:>9} {:>9} {:>7} {:>11}",
        "Date".bold(),
        "Dist km".bold(),
        "Min".bold(),
        "Avg HR".bold(),
        "Pace".bold()
    );
    for row in view.table.rows().iter().take(limit) {
        println!(
            "  {:<12} {:>9} {:>9} {:>7} {:>11}",
            row.cells[0], row.cells[1], row.cells[2], row.cells[3], row.cells[6]
        );
    }
    let remaining = view.table.rows().len().saturating_sub(limit);
    if remaining > 0 {
        println!("  {}", format!("… {remaining} more").dimmed());
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// paceboard cache status | clear
// ---------------------------------------------------------------------------

/// List cache generations and their entry counts.
pub fn run_cache_status() -> Result<()> {
    let cfg = config::load();
    let store = DiskStore::new(config::cache_dir(&cfg)?);

    println!("{}", "Offline Cache".bold().cyan());
    println!("{}", "=".repeat(50));
    println!("  {} {}", "Directory:".bold(), store.root().display());
    println!(
        "  {} {}",
        "Enabled:  ".bold(),
        if cfg.cache.enabled { "yes" } else { "no" }
    );
    println!("  {} {}", "Current:  ".bold(), cfg.cache.version);
    println!();

    let names = store.store_names()?;
    if names.is_empty() {
        println!(
            "{}",
            "No cache stores yet. Run `paceboard serve` to populate one.".yellow()
        );
        return Ok(());
    }

    for name in names {
        let entries = store.keys(&name)?.len();
        let marker = if name == cfg.cache.version {
            "●".green().bold()
        } else {
            "○".dimmed().bold()
        };
        println!("  {} {:<24} {} entries", marker, name, entries);
    }
    Ok(())
}

/// Delete every cache store.
pub fn run_cache_clear() -> Result<()> {
    let cfg = config::load();
    let store = DiskStore::new(config::cache_dir(&cfg)?);

    let mut removed = 0;
    for name in store.store_names()? {
        if store.delete_store(&name)? {
            removed += 1;
        }
    }
    logging::info("cli", "cache_cleared", Some(&format!("{removed} stores")));
    println!(
        "{} Removed {} cache store(s) from {}",
        "✓".green().bold(),
        removed,
        store.root().display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// paceboard health
// ---------------------------------------------------------------------------

/// Check config, origin reachability, cache, and the event log.
pub fn run_health() -> Result<()> {
    println!("{}", "paceboard Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    // 0. Config file status
    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.paceboard/config.toml found"
        } else {
            "not found (run `paceboard config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".paceboard.toml found"
        } else {
            "none (optional)"
        },
    );

    // 1. Origin reachability
    match config::data_url(&cfg.source) {
        Ok(url) => {
            let network = UreqNetwork::new(Duration::from_millis(cfg.source.timeout_ms));
            let request = Request::get(url.clone()).with_cache(CacheMode::NoStore);
            let (ok, detail) = match network.fetch(&request) {
                Ok(resp) if resp.is_success() => (true, format!("{url} → HTTP {}", resp.status)),
                Ok(resp) => (false, format!("{url} → HTTP {}", resp.status)),
                Err(e) => (false, e.to_string()),
            };
            print_health_item("Data snapshot", ok, &detail);
        }
        Err(e) => print_health_item("Data snapshot", false, &format!("{e:#}")),
    }

    // 2. Offline cache
    let cache_detail = match config::cache_dir(&cfg) {
        Ok(dir) => {
            let store = DiskStore::new(dir);
            let entries = store.keys(&cfg.cache.version).map(|k| k.len()).unwrap_or(0);
            format!("{} ({} entries)", cfg.cache.version, entries)
        }
        Err(e) => format!("{e:#}"),
    };
    let cache_detail = if cfg.cache.enabled {
        cache_detail
    } else {
        "disabled (set PACEBOARD_CACHE=1 to enable)".to_string()
    };
    print_health_item("Offline cache", cfg.cache.enabled, &cache_detail);

    // 3. Event log
    let log_path = if cfg.logging.enabled {
        config::expand_home(&cfg.logging.path)
    } else {
        None
    };
    let log_exists = log_path.as_ref().map(|p| p.exists()).unwrap_or(false);
    print_health_item(
        "Event log",
        log_exists,
        &match (&log_path, log_exists) {
            (Some(path), true) => path.display().to_string(),
            (Some(_), false) => "no log file yet".to_string(),
            (None, _) => "disabled".to_string(),
        },
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// paceboard config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective paceboard Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.paceboard/config.toml", global_exists);
    print_source(".paceboard.toml", project_exists);
    println!("  {} PACEBOARD_* environment variables", "·".dimmed());

    Ok(())
}

fn print_source(label: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), label.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{label} (not found)").dimmed());
    }
}

/// Write the default config to `~/.paceboard/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Set source.origin to where the exporter publishes the dashboard.".dimmed()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    if key == "cache.version" {
        println!(
            "  {}",
            "A running server switches caches on the next page load.".dimmed()
        );
    }
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}
