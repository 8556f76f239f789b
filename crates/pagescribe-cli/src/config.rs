//! Configuration loading and resolution.

use std::path::{Path, PathBuf};

use anyhow::Context;
use pagescribe::Config;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "PAGESCRIBE_CONFIG";

/// Config file picked up from the working directory.
pub const CWD_CONFIG: &str = ".pagescribe.json";

/// Resolve the config file path: explicit flag, then env var, then the
/// working directory. `None` means built-in defaults.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    let cwd_config = PathBuf::from(CWD_CONFIG);
    cwd_config.exists().then_some(cwd_config)
}

/// Load and validate the resolved config.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = resolve_config_path(explicit) else {
        tracing::debug!("no config file, using defaults");
        return Ok(Config::default());
    };
    tracing::debug!(path = %path.display(), "loading config");
    Config::from_file(&path).with_context(|| format!("failed to load config {}", path.display()))
}
