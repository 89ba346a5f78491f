/// Configuration schema and defaults for paceboard.
///
/// Sections: `[server]`, `[source]`, `[cache]`, `[charts]`, `[logging]`.
/// Every field has a built-in default; config files only need the values
/// they change.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level paceboard configuration.
///
/// Maps to `~/.paceboard/config.toml` and `.paceboard.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaceboardConfig {
    pub server: ServerConfig,
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub charts: ChartsConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Local dashboard server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address for `paceboard serve`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [source]
// ---------------------------------------------------------------------------

/// Where the exported dashboard lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL of the exported dashboard directory (the app origin).
    pub origin: String,
    /// Snapshot path relative to `origin`.
    pub data_path: String,
    /// Per-request network timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:8000/pwa/".to_string(),
            data_path: "data/dashboard_data.json".to_string(),
            timeout_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [cache]
// ---------------------------------------------------------------------------

/// Offline cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether the offline cache proxy is used at all.
    pub enabled: bool,
    /// Cache generation name. Changing it discards every other generation
    /// on the next activation.
    pub version: String,
    /// Directory holding one sub-directory per cache generation.
    pub dir: String,
    /// App shell paths, relative to `source.origin`, pre-cached at install.
    pub app_shell: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            version: "paceboard-v1".to_string(),
            dir: "~/.paceboard/cache".to_string(),
            app_shell: default_app_shell(),
        }
    }
}

fn default_app_shell() -> Vec<String> {
    [
        "./",
        "./index.html",
        "./manifest.webmanifest",
        "./assets/styles.css",
        "./assets/app.js",
        "./assets/icon.svg",
        "./assets/icon-maskable.svg",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

// ---------------------------------------------------------------------------
// [charts]
// ---------------------------------------------------------------------------

/// Chart colours (`#rrggbb`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    pub monthly_color: String,
    pub scatter_color: String,
    pub cadence_color: String,
    pub distance_color: String,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            monthly_color: "#b45709".to_string(),
            scatter_color: "#1f7a63".to_string(),
            cadence_color: "#0c4a3a".to_string(),
            distance_color: "#296f8f".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether the event log is written.
    pub enabled: bool,
    /// Path to the event log. `~` is expanded to the home directory.
    pub path: String,
    /// Minimum level: `"debug"`, `"info"`, `"warn"`, `"error"`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.paceboard/events.jsonl".to_string(),
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Annotated default file
// ---------------------------------------------------------------------------

impl PaceboardConfig {
    /// The annotated default config written by `paceboard config init`.
    pub fn default_toml() -> String {
        r##"# paceboard configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (PACEBOARD_*)
#   2. Project config (.paceboard.toml in current directory)
#   3. User global config (~/.paceboard/config.toml)
#   4. Built-in defaults

[server]
addr = "127.0.0.1:9747"
open_browser = true

[source]
origin = "http://127.0.0.1:8000/pwa/"   # Directory served by the exporter
data_path = "data/dashboard_data.json"
timeout_ms = 10000                       # Network timeout per request

[cache]
enabled = true
version = "paceboard-v1"                 # Bump to discard old cached copies
dir = "~/.paceboard/cache"
app_shell = [
  "./",
  "./index.html",
  "./manifest.webmanifest",
  "./assets/styles.css",
  "./assets/app.js",
  "./assets/icon.svg",
  "./assets/icon-maskable.svg",
]

[charts]
monthly_color = "#b45709"
scatter_color = "#1f7a63"
cadence_color = "#0c4a3a"
distance_color = "#296f8f"

[logging]
enabled = true
path = "~/.paceboard/events.jsonl"
level = "info"                           # debug | info | warn | error
"##
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = PaceboardConfig::default();
        assert_eq!(config.server.addr, "127.0.0.1:9747");
        assert_eq!(config.source.data_path, "data/dashboard_data.json");
        assert_eq!(config.source.timeout_ms, 10_000);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.version, "paceboard-v1");
        assert_eq!(config.cache.app_shell.len(), 7);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn empty_toml_produces_defaults() {
        let config: PaceboardConfig = toml::from_str("").unwrap();
        assert_eq!(config.cache.version, "paceboard-v1");
        assert!(config.server.open_browser);
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
[source]
origin = "http://nas.local/pwa/"

[cache]
version = "v7"
"#;
        let config: PaceboardConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.source.origin, "http://nas.local/pwa/");
        assert_eq!(config.source.timeout_ms, 10_000);
        assert_eq!(config.cache.version, "v7");
        assert_eq!(config.cache.dir, "~/.paceboard/cache");
    }

    #[test]
    fn default_toml_parses_back() {
        let config: PaceboardConfig = toml::from_str(&PaceboardConfig::default_toml()).unwrap();
        let defaults = PaceboardConfig::default();
        assert_eq!(config.cache.app_shell, defaults.cache.app_shell);
        assert_eq!(config.charts.monthly_color, defaults.charts.monthly_color);
        assert_eq!(config.source.origin, defaults.source.origin);
    }
}
