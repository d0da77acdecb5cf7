//! External tool invocation
//!
//! The package installer and transfer client are pre-built command-line
//! tools. They are resolved from PATH, spawned, and their exit status
//! checked; a nonzero exit aborts the pipeline with the command line and
//! captured stderr attached.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Resolve a tool binary from PATH, falling back to the configured name as-is
pub fn resolve_tool(name: &str) -> PathBuf {
    which::which(name).unwrap_or_else(|e| {
        debug!(tool = name, error = %e, "tool not found in PATH, using name as-is");
        PathBuf::from(name)
    })
}

/// Run a command to completion, treating nonzero exit as an error.
///
/// `what` names the step for error context ("installing the wheel package",
/// "uploading bundle", ...).
pub fn run_tool(mut cmd: Command, what: &str) -> Result<()> {
    let rendered = render_command(&cmd);
    debug!(command = %rendered, "running external tool");

    let output = cmd
        .output()
        .with_context(|| format!("failed to spawn command while {}: {}", what, rendered))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "{} failed ({}): exit {}: {}",
            what,
            rendered,
            output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string()),
            stderr.trim()
        );
    }

    Ok(())
}

fn render_command(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_unknown_tool_falls_back_to_name() {
        let path = resolve_tool("definitely-not-a-real-binary-xyz");
        assert_eq!(path, PathBuf::from("definitely-not-a-real-binary-xyz"));
    }

    #[test]
    fn test_render_command() {
        let mut cmd = Command::new("pip");
        cmd.arg("install").arg("wheel");
        assert_eq!(render_command(&cmd), "pip install wheel");
    }

    #[test]
    #[cfg(unix)]
    fn test_run_tool_success() {
        let cmd = Command::new("true");
        assert!(run_tool(cmd, "running true").is_ok());
    }

    #[test]
    #[cfg(unix)]
    fn test_run_tool_nonzero_exit_is_error() {
        let cmd = Command::new("false");
        let err = run_tool(cmd, "running false").unwrap_err();
        assert!(err.to_string().contains("running false failed"));
    }
}
