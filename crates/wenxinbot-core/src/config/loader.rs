//! Config loader — reads `~/.wenxinbot/config.json`, merges env vars, and
//! applies legacy migrations.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.wenxinbot/config.json`
//! 3. Environment variables `WENXINBOT_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Keys that older flat configs kept at the root instead of under `baidu`.
const LEGACY_ROOT_KEYS: &[(&str, &str)] = &[
    ("baiduApikey", "apiKey"),
    ("baiduSecret", "secretKey"),
    ("proxy", "proxy"),
];

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    apply_env_overrides(read_config_file(&config_path))
}

/// Read a config file without env overrides.
fn read_config_file(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    // Parse JSON → Value first for migration
    let mut raw: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return Config::default();
        }
    };

    migrate_config(&mut raw);

    match serde_json::from_value(raw) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to deserialize config: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Move flat root-level credentials (`baiduApikey`, `baiduSecret`, `proxy`)
/// into the `baidu` section. Values already present in `baidu` win.
fn migrate_config(raw: &mut serde_json::Value) {
    let Some(root) = raw.as_object_mut() else {
        return;
    };

    for (legacy, target) in LEGACY_ROOT_KEYS {
        let Some(value) = root.remove(*legacy) else {
            continue;
        };

        let section = root
            .entry("baidu")
            .or_insert_with(|| serde_json::json!({}));
        if let Some(section) = section.as_object_mut() {
            let already_set = section.contains_key(*target)
                || (*target == "apiKey" && section.contains_key("baiduApikey"))
                || (*target == "secretKey" && section.contains_key("baiduSecret"));
            if !already_set {
                section.insert(target.to_string(), value);
                debug!("Migrated {} → baidu.{}", legacy, target);
            }
        }
    }
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `WENXINBOT_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `WENXINBOT_BAIDU__API_KEY` → `baidu.api_key`
/// - `WENXINBOT_BAIDU__SECRET_KEY` → `baidu.secret_key`
/// - `WENXINBOT_BAIDU__PROXY` → `baidu.proxy`
/// - `WENXINBOT_BAIDU__API_BASE` → `baidu.api_base`
/// - `WENXINBOT_BAIDU__MODEL` → `baidu.model`
/// - `WENXINBOT_BAIDU__TIMEOUT_SECS` → `baidu.timeout_secs`
/// - `WENXINBOT_BAIDU__MAX_HISTORY` → `baidu.max_history`
fn apply_env_overrides(mut config: Config) -> Config {
    let baidu = &mut config.baidu;

    if let Ok(val) = std::env::var("WENXINBOT_BAIDU__API_KEY") {
        baidu.api_key = val;
    }
    if let Ok(val) = std::env::var("WENXINBOT_BAIDU__SECRET_KEY") {
        baidu.secret_key = val;
    }
    if let Ok(val) = std::env::var("WENXINBOT_BAIDU__PROXY") {
        baidu.proxy = Some(val).filter(|p| !p.is_empty());
    }
    if let Ok(val) = std::env::var("WENXINBOT_BAIDU__API_BASE") {
        baidu.api_base = Some(val).filter(|b| !b.is_empty());
    }
    if let Ok(val) = std::env::var("WENXINBOT_BAIDU__MODEL") {
        baidu.model = val;
    }
    if let Ok(val) = std::env::var("WENXINBOT_BAIDU__TIMEOUT_SECS") {
        match val.parse::<u64>() {
            Ok(n) => baidu.timeout_secs = n,
            Err(_) => warn!("Ignoring invalid WENXINBOT_BAIDU__TIMEOUT_SECS={}", val),
        }
    }
    if let Ok(val) = std::env::var("WENXINBOT_BAIDU__MAX_HISTORY") {
        if let Ok(n) = val.parse::<usize>() {
            baidu.max_history = Some(n);
        }
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
