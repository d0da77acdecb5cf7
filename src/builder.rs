//! Cache Builder: produce a wheel bundle for one interpreter version and
//! upload it to the remote store.
//!
//! Pipeline, in order: install the packaging tool, resolve and download
//! wheels into the version-keyed bundle directory, verify every requested
//! package produced a wheel, stage the transfer batch file, write the
//! credential file, run the transfer client. Every step's failure aborts
//! the pipeline with context; nothing is silently skipped.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::info;

use crate::bundle::{Bundle, BundleMember, VersionKey};
use crate::logging::{operations, services, status};
use crate::merger::MergedBuildConfig;
use crate::tools;

/// Machine-readable result of a build run
#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    pub key: String,
    pub bundle_dir: String,
    pub files: Vec<FileSummary>,
    pub uploaded: usize,
    pub completed_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub size_bytes: u64,
    pub sha256: String,
}

/// Run the full build pipeline: wheel the packages, stage the batch,
/// upload the bundle.
pub fn run(config: &MergedBuildConfig) -> Result<BuildSummary> {
    let key = VersionKey::parse(&config.python_version)?;
    let bundle = Bundle::new(&config.work_dir, key);
    let pip = tools::resolve_tool(&config.pip_bin);

    // The wheel package provides pip's bdist_wheel support
    let mut cmd = Command::new(&pip);
    cmd.args(["install", "wheel"]);
    tools::run_tool(cmd, "installing the wheel package")?;

    fs::create_dir_all(bundle.dir())
        .with_context(|| format!("failed to create bundle dir: {}", bundle.dir().display()))?;

    info!(
        service = services::BUILDER,
        operation = operations::WHEEL,
        key = %bundle.key(),
        "downloading wheels for {} package(s)",
        config.packages.len()
    );

    let mut cmd = Command::new(&pip);
    cmd.arg("wheel").arg("--wheel-dir").arg(bundle.dir());
    cmd.args(&config.packages);
    tools::run_tool(cmd, "downloading wheels")?;

    let members = bundle
        .members()
        .context("bundle enumeration after wheel download")?;
    verify_packages(&config.packages, &members)?;

    let batch_path = stage_batch(&bundle, &members, Path::new(&config.work_dir))?;
    info!(
        service = services::BUILDER,
        operation = operations::STAGE,
        key = %bundle.key(),
        entry_count = members.len(),
        "staged transfer batch at {}",
        batch_path.display()
    );

    upload(config, &bundle, &batch_path)?;

    let summary = BuildSummary {
        key: bundle.key().to_string(),
        bundle_dir: bundle.dir().display().to_string(),
        files: members
            .iter()
            .map(|m| FileSummary {
                name: m.name.clone(),
                size_bytes: m.size_bytes,
                sha256: m.sha256.clone(),
            })
            .collect(),
        uploaded: members.len(),
        completed_at: chrono::Utc::now().to_rfc3339(),
    };

    info!(
        service = services::BUILDER,
        status = status::SUCCESS,
        key = %summary.key,
        entry_count = summary.files.len(),
        "bundle built and uploaded"
    );

    Ok(summary)
}

/// Upload the bundle by driving the transfer client with the staged batch
fn upload(config: &MergedBuildConfig, bundle: &Bundle, batch_path: &Path) -> Result<()> {
    let host = config
        .transfer_host
        .as_deref()
        .context("transfer host not configured (use --transfer-host or [transfer] host)")?;
    let user = config
        .transfer_user
        .as_deref()
        .context("transfer user not configured (use --transfer-user or [transfer] user)")?;
    let password = config
        .password
        .as_deref()
        .context("transfer credential not set (use PASSWD or [transfer] password)")?;

    let netrc_path = match &config.netrc_path {
        Some(path) => PathBuf::from(path),
        None => dirs::home_dir()
            .context("could not determine home directory for the credential file")?
            .join(".netrc"),
    };
    write_netrc(&netrc_path, host, user, password)?;

    let batch = fs::File::open(batch_path)
        .with_context(|| format!("failed to open transfer batch: {}", batch_path.display()))?;

    info!(
        service = services::TRANSFER,
        operation = operations::UPLOAD,
        key = %bundle.key(),
        "uploading bundle to {}",
        host
    );

    let ftp = tools::resolve_tool(&config.ftp_bin);
    let mut cmd = Command::new(ftp);
    cmd.arg("-i").arg(host).stdin(Stdio::from(batch));
    tools::run_tool(cmd, "uploading bundle")?;

    Ok(())
}

/// Stage the transfer batch file at `<work_dir>/cmd`.
///
/// The batch creates the remote version-keyed directory, changes into it,
/// then puts exactly one line per member file. The remote name is the
/// member's basename so the local temp path never leaks into the store.
/// Batch lines are whitespace-delimited with no quoting, so a local path
/// containing whitespace cannot be represented and is rejected.
pub fn stage_batch(bundle: &Bundle, members: &[BundleMember], work_dir: &Path) -> Result<PathBuf> {
    let mut lines = vec![
        format!("mkdir {}", bundle.remote_dir()),
        format!("cd {}", bundle.remote_dir()),
    ];
    for member in members {
        let local = member.path.display().to_string();
        if local.chars().any(char::is_whitespace) {
            anyhow::bail!(
                "cannot stage {:?} for transfer: batch lines cannot carry whitespace, use a working directory without spaces",
                local
            );
        }
        lines.push(format!("put {} {}", local, member.name));
    }

    let path = work_dir.join("cmd");
    fs::write(&path, lines.join("\n") + "\n")
        .with_context(|| format!("failed to write transfer batch: {}", path.display()))?;

    Ok(path)
}

/// Write the credential file in netrc format with owner-only permissions
pub fn write_netrc(path: &Path, host: &str, user: &str, password: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create credential dir: {}", parent.display()))?;
    }

    let content = format!("machine {}\nlogin {}\npassword {}\n", host, user, password);
    fs::write(path, content)
        .with_context(|| format!("failed to write credential file: {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict credential file: {}", path.display()))?;
    }

    Ok(())
}

/// Verify every requested package produced at least one wheel
pub fn verify_packages(packages: &[String], members: &[BundleMember]) -> Result<()> {
    for package in packages {
        let wanted = normalize_package_name(requirement_name(package));
        let found = members.iter().any(|m| {
            m.name
                .split('-')
                .next()
                .map(|stem| normalize_package_name(stem) == wanted)
                .unwrap_or(false)
        });

        if !found {
            anyhow::bail!(
                "no wheel produced for package {:?} (bundle holds: {})",
                package,
                members
                    .iter()
                    .map(|m| m.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }

    Ok(())
}

/// Strip a version specifier or extras marker from a requirement string
fn requirement_name(requirement: &str) -> &str {
    requirement
        .split(|c| matches!(c, '=' | '<' | '>' | '!' | '~' | '[' | ';' | ' '))
        .next()
        .unwrap_or(requirement)
}

/// Normalize a distribution name for comparison against wheel filename stems:
/// lowercase, with runs of '-', '_' and '.' collapsed to a single '_'.
fn normalize_package_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('_');
            }
            in_separator = true;
        } else {
            out.push(c.to_ascii_lowercase());
            in_separator = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn member(name: &str) -> BundleMember {
        BundleMember {
            name: name.to_string(),
            path: PathBuf::from("/tmp").join(name),
            size_bytes: 1,
            sha256: "00".repeat(32),
        }
    }

    #[test]
    fn test_normalize_package_name() {
        assert_eq!(normalize_package_name("pytest"), "pytest");
        assert_eq!(normalize_package_name("Typing-Extensions"), "typing_extensions");
        assert_eq!(normalize_package_name("zope.interface"), "zope_interface");
        assert_eq!(normalize_package_name("a--b__c"), "a_b_c");
    }

    #[test]
    fn test_requirement_name_strips_specifiers() {
        assert_eq!(requirement_name("pytest"), "pytest");
        assert_eq!(requirement_name("pytest==7.0"), "pytest");
        assert_eq!(requirement_name("pytest>=6,<8"), "pytest");
        assert_eq!(requirement_name("requests[socks]"), "requests");
    }

    #[test]
    fn test_verify_packages_matches_wheel_stems() {
        let members = vec![
            member("pytest-7.0-py3-none-any.whl"),
            member("typing_extensions-4.1-py3-none-any.whl"),
        ];
        let packages = vec!["pytest==7.0".to_string(), "Typing-Extensions".to_string()];
        assert!(verify_packages(&packages, &members).is_ok());
    }

    #[test]
    fn test_verify_packages_names_the_missing_package() {
        let members = vec![member("pytest-7.0-py3-none-any.whl")];
        let packages = vec!["pytest".to_string(), "tox".to_string()];
        let err = verify_packages(&packages, &members).unwrap_err();
        assert!(err.to_string().contains("tox"));
    }

    #[test]
    fn test_stage_batch_exact_line_set() {
        let temp = TempDir::new().unwrap();
        let bundle = Bundle::new(temp.path(), VersionKey::parse("3.6").unwrap());
        let members = vec![
            member("a-1.0-py3-none-any.whl"),
            member("b-2.0-py3-none-any.whl"),
        ];

        let path = stage_batch(&bundle, &members, temp.path()).unwrap();
        assert_eq!(path, temp.path().join("cmd"));

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "mkdir wheelhouse3.6",
                "cd wheelhouse3.6",
                "put /tmp/a-1.0-py3-none-any.whl a-1.0-py3-none-any.whl",
                "put /tmp/b-2.0-py3-none-any.whl b-2.0-py3-none-any.whl",
            ]
        );
    }

    #[test]
    fn test_stage_batch_rejects_whitespace_in_local_path() {
        let temp = TempDir::new().unwrap();
        let bundle = Bundle::new(temp.path(), VersionKey::parse("3.6").unwrap());
        let members = vec![BundleMember {
            name: "a-1.0-py3-none-any.whl".to_string(),
            path: PathBuf::from("/tmp/work dir/a-1.0-py3-none-any.whl"),
            size_bytes: 1,
            sha256: "00".repeat(32),
        }];

        let err = stage_batch(&bundle, &members, temp.path()).unwrap_err();
        assert!(err.to_string().contains("whitespace"), "err: {}", err);
        assert!(!temp.path().join("cmd").exists());
    }

    #[test]
    fn test_write_netrc_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".netrc");

        write_netrc(&path, "cache.example.org", "ci", "hunter2").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "machine cache.example.org\nlogin ci\npassword hunter2\n"
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_write_netrc_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".netrc");
        write_netrc(&path, "h", "u", "p").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
