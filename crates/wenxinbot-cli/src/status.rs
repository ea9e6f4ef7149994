//! `wenxinbot status` — show where config lives and what is configured.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;

use wenxinbot_core::config::{get_config_path, load_config, BaiduConfig};
use wenxinbot_core::utils::mask_secret;
use wenxinbot_providers::baidu::DEFAULT_API_BASE;

pub fn run(config_path: Option<PathBuf>) -> Result<()> {
    let path = config_path.unwrap_or_else(get_config_path);
    let config = load_config(Some(path.as_path()));

    println!("{}", "Wenxinbot status".cyan().bold());
    println!();
    let exists = if path.exists() {
        "✓".green()
    } else {
        "✗ (using defaults)".yellow()
    };
    println!("Config: {} {}", path.display(), exists);
    println!();

    for (label, value) in describe(&config.baidu) {
        println!("  {:<12} {}", label, value);
    }

    Ok(())
}

/// Label/value rows for the Baidu section, with secrets masked.
fn describe(cfg: &BaiduConfig) -> Vec<(&'static str, String)> {
    let key_state = |v: &str| {
        if v.is_empty() {
            "not set".to_string()
        } else {
            mask_secret(v)
        }
    };

    vec![
        ("API key", key_state(&cfg.api_key)),
        ("Secret key", key_state(&cfg.secret_key)),
        (
            "API base",
            cfg.api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        ),
        ("Endpoint", cfg.model.clone()),
        (
            "Proxy",
            cfg.proxy.clone().unwrap_or_else(|| "none".to_string()),
        ),
        ("Timeout", format!("{}s", cfg.timeout_secs)),
        (
            "History",
            cfg.max_history
                .map(|n| format!("first + last {n} turns"))
                .unwrap_or_else(|| "unbounded".to_string()),
        ),
    ]
}
