/// Configuration system for paceboard.
///
/// Layered hierarchy, later layers win at the key level:
///
/// 1. **Built-in defaults** — [`schema::PaceboardConfig::default()`]
/// 2. **User global config** — `~/.paceboard/config.toml`
/// 3. **Project local config** — `.paceboard.toml` in the working directory
/// 4. **Environment variables** — `PACEBOARD_*` overrides
///
/// File layers are merged as TOML value trees before deserialization, so a
/// project file that sets only `[cache] version` keeps the global file's
/// `[source]` settings.
///
/// ```rust,ignore
/// let cfg = paceboard::config::load();
/// let data_url = paceboard::config::data_url(&cfg.source)?;
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use url::Url;

pub use schema::PaceboardConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Malformed files are skipped so a bad edit never stops the dashboard.
pub fn load() -> PaceboardConfig {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in [global_config_path(), project_config_path()]
        .into_iter()
        .flatten()
    {
        if let Some(layer) = load_toml_value(&path) {
            merge_values(&mut merged, layer);
        }
    }

    let mut config: PaceboardConfig = merged.try_into().unwrap_or_default();
    apply_env_overrides(&mut config);
    config
}

fn load_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Deep-merge `overlay` into `base`: tables merge key by key, any other
/// value replaces.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.paceboard/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".paceboard").join("config.toml"))
}

/// Path to the project local config: `.paceboard.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".paceboard.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    if path == "~" {
        return dirs::home_dir();
    }
    if let Some(rest) = path.strip_prefix("~/") {
        return dirs::home_dir().map(|home| home.join(rest));
    }
    Some(PathBuf::from(path))
}

// ---------------------------------------------------------------------------
// URL resolution
// ---------------------------------------------------------------------------

fn origin_url(source: &schema::SourceConfig) -> Result<Url> {
    Url::parse(&source.origin).with_context(|| format!("invalid source.origin: {}", source.origin))
}

/// Absolute URL of the data snapshot.
pub fn data_url(source: &schema::SourceConfig) -> Result<String> {
    resolve(source, &source.data_path)
}

/// Resolve a path (relative or absolute) against `source.origin`.
pub fn resolve(source: &schema::SourceConfig, path: &str) -> Result<String> {
    let origin = origin_url(source)?;
    let joined = origin
        .join(path)
        .with_context(|| format!("cannot resolve {path} against {origin}"))?;
    Ok(joined.to_string())
}

/// Resolve a request path against `source.origin`, keeping only targets
/// that stay on the origin: same scheme, host and port, and a path under the
/// origin's path.
///
/// Returns `Ok(None)` when the path escapes the origin.
pub fn resolve_within_origin(
    source: &schema::SourceConfig,
    path: &str,
) -> Result<Option<String>> {
    let origin = origin_url(source)?;
    let joined = origin
        .join(path)
        .with_context(|| format!("cannot resolve {path} against {origin}"))?;
    let inside = joined.scheme() == origin.scheme()
        && joined.host_str() == origin.host_str()
        && joined.port_or_known_default() == origin.port_or_known_default()
        && joined.path().starts_with(origin.path());
    Ok(inside.then(|| joined.to_string()))
}

/// Absolute URLs of the app shell.
pub fn app_shell_urls(config: &PaceboardConfig) -> Result<Vec<String>> {
    config
        .cache
        .app_shell
        .iter()
        .map(|path| resolve(&config.source, path))
        .collect()
}

/// Resolved cache root directory.
pub fn cache_dir(config: &PaceboardConfig) -> Result<PathBuf> {
    expand_home(&config.cache.dir).context("could not determine home directory for cache.dir")
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `PACEBOARD_ADDR` — server listen address
/// - `PACEBOARD_ORIGIN` — exported dashboard base URL
/// - `PACEBOARD_DATA_PATH` — snapshot path relative to the origin
/// - `PACEBOARD_TIMEOUT_MS` — network timeout
/// - `PACEBOARD_CACHE` — offline cache enabled (`1`/`true`/`yes`/`on`)
/// - `PACEBOARD_CACHE_VERSION` — cache generation name
/// - `PACEBOARD_CACHE_DIR` — cache root directory
/// - `PACEBOARD_LOG_LEVEL` — minimum log level
fn apply_env_overrides(config: &mut PaceboardConfig) {
    if let Ok(val) = std::env::var("PACEBOARD_ADDR")
        && !val.is_empty()
    {
        config.server.addr = val;
    }
    if let Ok(val) = std::env::var("PACEBOARD_ORIGIN")
        && !val.is_empty()
    {
        config.source.origin = val;
    }
    if let Ok(val) = std::env::var("PACEBOARD_DATA_PATH")
        && !val.is_empty()
    {
        config.source.data_path = val;
    }
    if let Ok(val) = std::env::var("PACEBOARD_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.source.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("PACEBOARD_CACHE") {
        config.cache.enabled = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("PACEBOARD_CACHE_VERSION")
        && !val.is_empty()
    {
        config.cache.version = val;
    }
    if let Ok(val) = std::env::var("PACEBOARD_CACHE_DIR")
        && !val.is_empty()
    {
        config.cache.dir = val;
    }
    if let Ok(val) = std::env::var("PACEBOARD_LOG_LEVEL")
        && !val.is_empty()
    {
        config.logging.level = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.paceboard/config.toml`.
///
/// Returns an error if the file already exists and `force` is false.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.paceboard/ directory")?;
    }

    fs::write(&path, PaceboardConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single dotted key (e.g. `cache.version`) in the global config file.
///
/// Starts from the existing file, or from serialized defaults when there is
/// none, so the key must exist in the schema.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let source = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&PaceboardConfig::default())
            .context("failed to serialize default config")?
    };
    let mut root: toml::Value =
        toml::from_str(&source).context("failed to parse config as TOML value")?;

    set_toml_value(&mut root, key, value)?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The new value is parsed according to the type of the existing one.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(*leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(toml::Value::Array(_)) => toml::Value::Array(
            raw_value
                .split(',')
                .map(|s| toml::Value::String(s.trim().to_string()))
                .collect(),
        ),
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("unknown config key: '{key}'"),
    };

    table.insert((*leaf).to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
