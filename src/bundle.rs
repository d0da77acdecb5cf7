//! Artifact bundles: version-keyed directories of prebuilt wheels.
//!
//! A bundle is the directory `wheelhouse<KEY>` under a working directory,
//! holding every wheel downloaded for one interpreter version. Its archive
//! form is `wheelhouse<KEY>.tar.gz`. Bundles are read-only once produced;
//! there is no update or delete path.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Errors for bundle construction and enumeration
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("invalid version key {0:?}: keys are non-empty [A-Za-z0-9._-] and may not start with '.' or '-'")]
    InvalidKey(String),

    #[error("bundle directory does not exist: {0}")]
    MissingDir(PathBuf),

    #[error("bundle directory is empty: {0}")]
    EmptyDir(PathBuf),

    #[error("failed to read bundle member {path}: {source}")]
    ReadMember {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to walk bundle directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Interpreter-version identifier used to namespace cached bundles.
///
/// The key ends up in filesystem paths and remote directory names, so
/// anything that could escape a path segment is rejected up front.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionKey(String);

impl VersionKey {
    pub fn parse(raw: &str) -> Result<Self, BundleError> {
        let valid = !raw.is_empty()
            && !raw.starts_with('.')
            && !raw.starts_with('-')
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));

        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(BundleError::InvalidKey(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single file inside a bundle
#[derive(Debug, Clone)]
pub struct BundleMember {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub sha256: String,
}

/// A version-keyed artifact bundle rooted in a working directory
#[derive(Debug, Clone)]
pub struct Bundle {
    key: VersionKey,
    dir: PathBuf,
}

impl Bundle {
    pub fn new(work_dir: impl AsRef<Path>, key: VersionKey) -> Self {
        let dir = work_dir.as_ref().join(format!("wheelhouse{}", key));
        Self { key, dir }
    }

    pub fn key(&self) -> &VersionKey {
        &self.key
    }

    /// Local directory holding the wheels
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory name shared by the local bundle and the remote store
    pub fn dir_name(&self) -> String {
        format!("wheelhouse{}", self.key)
    }

    /// Name of the single-file archive form
    pub fn archive_name(&self) -> String {
        format!("wheelhouse{}.tar.gz", self.key)
    }

    /// Remote directory the transfer batch uploads into
    pub fn remote_dir(&self) -> String {
        self.dir_name()
    }

    /// Enumerate member files, sorted by name.
    ///
    /// A missing directory and an empty directory are distinct errors: an
    /// empty bundle is never uploaded or installed from.
    pub fn members(&self) -> Result<Vec<BundleMember>, BundleError> {
        if !self.dir.is_dir() {
            return Err(BundleError::MissingDir(self.dir.clone()));
        }

        let mut members = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path().to_path_buf();
            let data = fs::read(&path).map_err(|source| BundleError::ReadMember {
                path: path.clone(),
                source,
            })?;

            let mut hasher = Sha256::new();
            hasher.update(&data);

            members.push(BundleMember {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
                size_bytes: data.len() as u64,
                sha256: hex::encode(hasher.finalize()),
            });
        }

        if members.is_empty() {
            return Err(BundleError::EmptyDir(self.dir.clone()));
        }

        members.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(members)
    }
}
