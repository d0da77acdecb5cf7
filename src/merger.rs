/// Configuration merger: CLI args > Env vars > Config file > Defaults
///
/// This module handles merging configuration from multiple sources:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (handled by clap's `env` bindings)
/// 3. Configuration file
/// 4. Built-in defaults (lowest priority)
use anyhow::Result;

use crate::cli::{BuildArgs, RestoreArgs, ServeArgs};
use crate::config::WheelhouseConfig;

fn default_packages() -> Vec<String> {
    vec!["pytest".to_string()]
}

/// Merged configuration for the build command
#[derive(Debug, Clone)]
pub struct MergedBuildConfig {
    pub python_version: String,
    pub packages: Vec<String>,
    pub work_dir: String,
    pub pip_bin: String,
    pub ftp_bin: String,
    pub transfer_host: Option<String>,
    pub transfer_user: Option<String>,
    pub password: Option<String>,
    pub netrc_path: Option<String>,
}

/// Merged configuration for the restore command
#[derive(Debug, Clone)]
pub struct MergedRestoreConfig {
    pub build: MergedBuildConfig,
    pub remote_url: String,
}

/// Merged configuration for the serve command
#[derive(Debug, Clone)]
pub struct MergedServeConfig {
    pub bind: String,
    pub store_dir: String,
}

impl MergedBuildConfig {
    /// Merge configuration from CLI args and config file
    /// Precedence: CLI > env (already handled by clap) > config file > defaults
    pub fn merge(args: &BuildArgs, file_config: Option<WheelhouseConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let python_version = args
            .python_version
            .clone()
            .or_else(|| file.python_version.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "interpreter version not set (use --python-version or TRAVIS_PYTHON_VERSION)"
                )
            })?;

        let packages = args.packages.clone().unwrap_or_else(|| {
            if file.packages.is_empty() {
                default_packages()
            } else {
                file.packages.clone()
            }
        });

        Ok(Self {
            python_version,
            packages,
            work_dir: args
                .work_dir
                .clone()
                .unwrap_or_else(|| file.workspace.dir.clone()),
            pip_bin: args.pip_bin.clone().unwrap_or_else(|| file.tools.pip.clone()),
            ftp_bin: args.ftp_bin.clone().unwrap_or_else(|| file.tools.ftp.clone()),
            transfer_host: args.transfer_host.clone().or_else(|| file.transfer.host.clone()),
            transfer_user: args.transfer_user.clone().or_else(|| file.transfer.user.clone()),
            password: args.password.clone().or_else(|| file.transfer.password.clone()),
            netrc_path: args
                .netrc_path
                .clone()
                .or_else(|| file.transfer.netrc_path.clone()),
        })
    }
}

impl MergedRestoreConfig {
    /// Merge configuration from CLI args and config file
    /// Precedence: CLI > env (already handled by clap) > config file > defaults
    pub fn merge(args: &RestoreArgs, file_config: Option<WheelhouseConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let remote_url = args
            .remote_url
            .clone()
            .or_else(|| file.remote.url.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "remote store URL not set (use --remote-url or [remote] url in wheelhouse.toml)"
                )
            })?;

        // Restore shares the builder's inputs for the rebuild path
        let build_args = BuildArgs {
            config: args.config.clone(),
            python_version: args.python_version.clone(),
            packages: args.packages.clone(),
            work_dir: args.work_dir.clone(),
            pip_bin: args.pip_bin.clone(),
            ftp_bin: args.ftp_bin.clone(),
            transfer_host: args.transfer_host.clone(),
            transfer_user: args.transfer_user.clone(),
            password: args.password.clone(),
            netrc_path: args.netrc_path.clone(),
            json: args.json,
        };

        Ok(Self {
            build: MergedBuildConfig::merge(&build_args, Some(file))?,
            remote_url,
        })
    }
}

impl MergedServeConfig {
    /// Merge configuration from CLI args and config file
    pub fn merge(args: &ServeArgs, file_config: Option<WheelhouseConfig>) -> Self {
        let file = file_config.unwrap_or_default();

        Self {
            bind: args.bind.clone().unwrap_or_else(|| file.store.bind.clone()),
            store_dir: args
                .store_dir
                .clone()
                .unwrap_or_else(|| file.store.dir.clone()),
        }
    }
}
