//! Cache Consumer: make the bundle for the current interpreter version
//! available locally and install from it offline.
//!
//! The fetch has a single binary branch: any failure to obtain the archive
//! is a miss that triggers one rebuild-and-upload, never a hard error.
//! Both paths end with an offline install from the local bundle directory.

use anyhow::{Context, Result};
use serde::Serialize;
use std::process::Command;
use tracing::info;

use crate::archive;
use crate::builder;
use crate::bundle::{Bundle, VersionKey};
use crate::logging::{operations, services, status};
use crate::merger::MergedRestoreConfig;
use crate::tools;

/// How the bundle was made available locally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleSource {
    /// Extracted from the remote archive
    Remote,
    /// Regenerated by the builder after a fetch miss
    Rebuilt,
}

/// Machine-readable result of a restore run
#[derive(Debug, Clone, Serialize)]
pub struct RestoreSummary {
    pub key: String,
    pub source: BundleSource,
    pub bundle_dir: String,
    pub installed: Vec<String>,
    pub completed_at: String,
}

/// Run the full restore pipeline: fetch or rebuild the bundle, then
/// install the package list from it without contacting the package index.
pub fn run(config: &MergedRestoreConfig) -> Result<RestoreSummary> {
    let key = VersionKey::parse(&config.build.python_version)?;
    let bundle = Bundle::new(&config.build.work_dir, key);

    let url = format!(
        "{}/{}",
        config.remote_url.trim_end_matches('/'),
        bundle.archive_name()
    );

    let source = match fetch_archive(&url) {
        Ok(data) => {
            info!(
                service = services::RESTORE,
                operation = operations::FETCH,
                status = status::SUCCESS,
                key = %bundle.key(),
                size_bytes = data.len(),
                "fetched bundle archive"
            );

            archive::unpack(&data[..], std::path::Path::new(&config.build.work_dir))
                .context("extracting fetched bundle archive")?;
            info!(
                service = services::RESTORE,
                operation = operations::UNPACK,
                key = %bundle.key(),
                "bundle extracted into {}",
                config.build.work_dir
            );

            BundleSource::Remote
        }
        Err(reason) => {
            // Retrieval-not-found is the one deliberate non-error: it
            // selects the rebuild branch.
            info!(
                service = services::RESTORE,
                operation = operations::FETCH,
                status = status::MISS,
                key = %bundle.key(),
                "no fetchable archive ({}), rebuilding",
                reason
            );

            builder::run(&config.build)?;
            BundleSource::Rebuilt
        }
    };

    // The bundle must exist and be non-empty before the offline install
    bundle
        .members()
        .context("bundle enumeration before offline install")?;

    install_offline(config, &bundle)?;

    Ok(RestoreSummary {
        key: bundle.key().to_string(),
        source,
        bundle_dir: bundle.dir().display().to_string(),
        installed: config.build.packages.clone(),
        completed_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Upper bound on a fetched archive body. The client's default cap is 10MB,
/// which a bundle of already-compressed wheels easily exceeds.
const MAX_ARCHIVE_BYTES: u64 = 4 * 1024 * 1024 * 1024;

/// Fetch the archive, mapping every failure mode to a miss reason
fn fetch_archive(url: &str) -> Result<Vec<u8>, String> {
    match ureq::get(url).call() {
        Ok(mut response) => response
            .body_mut()
            .with_config()
            .limit(MAX_ARCHIVE_BYTES)
            .read_to_vec()
            .map_err(|e| format!("reading archive body: {}", e)),
        Err(e) => Err(e.to_string()),
    }
}

/// Install the package list from the local bundle, index lookup disabled
fn install_offline(config: &MergedRestoreConfig, bundle: &Bundle) -> Result<()> {
    info!(
        service = services::RESTORE,
        operation = operations::INSTALL,
        key = %bundle.key(),
        "installing {} package(s) from {}",
        config.build.packages.len(),
        bundle.dir().display()
    );

    let pip = tools::resolve_tool(&config.build.pip_bin);
    let mut cmd = Command::new(pip);
    cmd.arg("install")
        .arg("--no-index")
        .arg(format!("--find-links={}", bundle.dir().display()));
    cmd.args(&config.build.packages);
    tools::run_tool(cmd, "installing packages from bundle")?;

    Ok(())
}
