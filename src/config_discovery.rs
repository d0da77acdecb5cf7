use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::WheelhouseConfig;

/// Discovers wheelhouse configuration by traversing up the directory tree
pub fn discover_config(start_dir: &Path) -> Result<Option<PathBuf>> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join("wheelhouse.toml");
        if config_path.exists() {
            return Ok(Some(config_path));
        }

        // Try to go up one level
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    // Fallback to global config
    if let Some(home) = dirs::home_dir() {
        let global_config = home.join(".config/wheelhouse/config.toml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// Loads configuration with auto-discovery support
///
/// If `explicit_path` is provided, loads config from that path.
/// Otherwise, auto-discovers config by traversing up directory tree from cwd.
///
/// Returns Ok(None) if no config is found (neither explicit nor discovered).
pub fn load_config_with_discovery(
    explicit_path: Option<&str>,
) -> Result<Option<WheelhouseConfig>> {
    if let Some(config_path) = explicit_path {
        // Explicit path provided - load it
        Ok(Some(WheelhouseConfig::from_file(config_path)?))
    } else {
        // Auto-discover by traversing up directory tree
        let current_dir = std::env::current_dir()
            .context("Failed to get current directory for config discovery")?;

        if let Some(discovered_path) = discover_config(&current_dir)? {
            tracing::debug!("Using discovered config: {}", discovered_path.display());
            Ok(Some(WheelhouseConfig::from_file(&discovered_path)?))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join("wheelhouse.toml"), "packages = [\"pytest\"]").unwrap();

        let found = discover_config(&nested).unwrap();
        assert_eq!(found, Some(temp.path().join("wheelhouse.toml")));
    }

    #[test]
    fn test_discover_prefers_nearest() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("project");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join("wheelhouse.toml"), "").unwrap();
        fs::write(nested.join("wheelhouse.toml"), "").unwrap();

        let found = discover_config(&nested).unwrap();
        assert_eq!(found, Some(nested.join("wheelhouse.toml")));
    }

    #[test]
    fn test_explicit_path_is_loaded() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        fs::write(&path, "packages = [\"tox\"]").unwrap();

        let config = load_config_with_discovery(Some(path.to_str().unwrap()))
            .unwrap()
            .unwrap();
        assert_eq!(config.packages, vec!["tox"]);
    }
}
