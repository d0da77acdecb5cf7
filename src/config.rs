use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete wheelhouse configuration (loaded from TOML file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WheelhouseConfig {
    /// Interpreter version key (usually supplied via TRAVIS_PYTHON_VERSION)
    #[serde(default)]
    pub python_version: Option<String>,

    /// Packages cached in each bundle
    #[serde(default = "default_packages")]
    pub packages: Vec<String>,

    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub transfer: TransferConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for WheelhouseConfig {
    fn default() -> Self {
        Self {
            python_version: None,
            packages: default_packages(),
            workspace: WorkspaceConfig::default(),
            remote: RemoteConfig::default(),
            transfer: TransferConfig::default(),
            tools: ToolsConfig::default(),
            store: StoreConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Local working directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Root under which version-keyed bundle directories are created
    #[serde(default = "default_work_dir")]
    pub dir: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            dir: default_work_dir(),
        }
    }
}

/// Remote store the consumer fetches archives from
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RemoteConfig {
    /// Base URL serving `wheelhouse<KEY>.tar.gz` archives
    #[serde(default)]
    pub url: Option<String>,
}

/// Upload transfer session configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TransferConfig {
    /// Remote host receiving uploads
    #[serde(default)]
    pub host: Option<String>,

    /// Login for the transfer session
    #[serde(default)]
    pub user: Option<String>,

    /// Transfer credential (usually supplied via PASSWD)
    #[serde(default)]
    pub password: Option<String>,

    /// Credential file location (defaults to ~/.netrc)
    #[serde(default)]
    pub netrc_path: Option<String>,
}

/// External tool binary names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Package installer binary
    #[serde(default = "default_pip")]
    pub pip: String,

    /// File-transfer client binary
    #[serde(default = "default_ftp")]
    pub ftp: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            pip: default_pip(),
            ftp: default_ftp(),
        }
    }
}

/// Store server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Bind address (port 0 = random)
    #[serde(default = "default_store_bind")]
    pub bind: String,

    /// Directory holding the per-key bundle directories
    #[serde(default = "default_store_dir")]
    pub dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bind: default_store_bind(),
            dir: default_store_dir(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (pretty, compact, json)
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

// Default value functions
fn default_packages() -> Vec<String> {
    vec!["pytest".to_string()]
}

fn default_work_dir() -> String {
    "/tmp".to_string()
}

fn default_pip() -> String {
    "pip".to_string()
}

fn default_ftp() -> String {
    "ftp".to_string()
}

fn default_store_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_store_dir() -> String {
    ".wheelhouse/store".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl WheelhouseConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: WheelhouseConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Generate example configuration as TOML string
    pub fn example() -> String {
        let config = WheelhouseConfig {
            packages: vec!["pytest".to_string()],
            workspace: WorkspaceConfig {
                dir: "/tmp".to_string(),
            },
            remote: RemoteConfig {
                url: Some("https://cache.example.org".to_string()),
            },
            transfer: TransferConfig {
                host: Some("cache.example.org".to_string()),
                user: Some("ci".to_string()),
                password: None,
                netrc_path: None,
            },
            ..Default::default()
        };

        toml::to_string_pretty(&config).unwrap()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.packages.is_empty() {
            anyhow::bail!("packages must not be empty");
        }

        if self.workspace.dir.is_empty() {
            anyhow::bail!("workspace.dir must be set");
        }

        if let Some(url) = &self.remote.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("remote.url must start with http:// or https://: {}", url);
            }
        }

        // A transfer login without a host can never upload
        if self.transfer.user.is_some() && self.transfer.host.is_none() {
            anyhow::bail!("transfer.host must be set when transfer.user is configured");
        }

        if self.store.bind.parse::<std::net::SocketAddr>().is_err() {
            anyhow::bail!("store.bind must be a socket address: {}", self.store.bind);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WheelhouseConfig::default();
        assert_eq!(config.packages, vec!["pytest"]);
        assert_eq!(config.workspace.dir, "/tmp");
        assert_eq!(config.tools.pip, "pip");
        assert_eq!(config.tools.ftp, "ftp");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_gets_defaults() {
        let config: WheelhouseConfig = toml::from_str("").unwrap();
        assert_eq!(config.packages, vec!["pytest"]);
        assert_eq!(config.workspace.dir, "/tmp");
        assert_eq!(config.store.bind, "0.0.0.0:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let config: WheelhouseConfig = toml::from_str(
            r#"
packages = ["pytest", "tox"]

[workspace]
dir = "/var/tmp"

[remote]
url = "https://cache.example.org"

[transfer]
host = "cache.example.org"
user = "ci"

[tools]
pip = "pip3"
ftp = "lftp"
"#,
        )
        .unwrap();

        assert_eq!(config.packages, vec!["pytest", "tox"]);
        assert_eq!(config.workspace.dir, "/var/tmp");
        assert_eq!(config.remote.url.as_deref(), Some("https://cache.example.org"));
        assert_eq!(config.tools.pip, "pip3");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_remote_url() {
        let mut config: WheelhouseConfig = toml::from_str("").unwrap();
        config.remote.url = Some("ftp://cache.example.org".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_packages_rejected() {
        let mut config: WheelhouseConfig = toml::from_str("").unwrap();
        config.packages.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_user_without_host_rejected() {
        let mut config: WheelhouseConfig = toml::from_str("").unwrap();
        config.transfer.user = Some("ci".to_string());
        assert!(config.validate().is_err());
    }
}
