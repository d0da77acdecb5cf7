// Common test utilities shared across acceptance tests
//
// ## Test Isolation Strategy
//
// Each acceptance test gets its own temp working directory, its own store
// directory, and (when needed) its own store server bound to a random port,
// so tests can run in parallel without interfering with each other.
//
// External tools are replaced by stub shell scripts that record their
// invocations: the pip stub logs its arguments and fabricates wheel files
// when asked to `wheel`, the ftp stub logs its arguments and captures its
// stdin. Tests assert against those recordings. Stubs are Unix-only.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// Helper to start a wheelhouse store server for testing.
/// Each test gets its own isolated store on a random port.
pub struct TestStore {
    _temp_dir: TempDir,
    child: Child,
    pub port: u16,
    pub store_dir: PathBuf,
}

impl TestStore {
    pub fn start(store_dir: &Path) -> Self {
        let bin = env!("CARGO_BIN_EXE_wheelhouse");
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let port_file = temp_dir.path().join("ports.json");

        let child = Command::new(bin)
            .arg("serve")
            .arg("--bind")
            .arg("127.0.0.1:0")
            .arg("--store-dir")
            .arg(store_dir)
            .arg("--port-file")
            .arg(&port_file)
            .spawn()
            .expect("Failed to start store server");

        // Wait for the port file to appear (max 10 seconds)
        let mut ports_json = None;
        for _ in 0..100 {
            if let Ok(content) = fs::read_to_string(&port_file) {
                ports_json = Some(content);
                break;
            }
            thread::sleep(Duration::from_millis(100));
        }

        let ports_json =
            ports_json.expect("Failed to read port file - store server may not have started");
        let ports: serde_json::Value =
            serde_json::from_str(&ports_json).expect("Failed to parse port file");
        let port = ports["http"].as_u64().expect("Missing http port") as u16;

        Self {
            _temp_dir: temp_dir,
            child,
            port,
            store_dir: store_dir.to_path_buf(),
        }
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}

impl Drop for TestStore {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Stub pip/ftp scripts plus the files recording their invocations
pub struct StubTools {
    pub pip: PathBuf,
    pub ftp: PathBuf,
    pub pip_log: PathBuf,
    pub ftp_log: PathBuf,
    pub ftp_input: PathBuf,
}

/// Install stub pip and ftp scripts into `dir` (Unix only).
///
/// The pip stub appends each invocation's arguments to its log; on
/// `pip wheel --wheel-dir D pkgs...` it creates one fake wheel per package
/// with a PEP-503-normalized stem. The ftp stub logs its arguments and
/// copies stdin into a capture file.
#[cfg(unix)]
pub fn install_stub_tools(dir: &Path) -> StubTools {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(dir).unwrap();

    let pip = dir.join("pip");
    let ftp = dir.join("ftp");
    let pip_log = dir.join("pip_calls.log");
    let ftp_log = dir.join("ftp_calls.log");
    let ftp_input = dir.join("ftp_input.txt");

    let pip_script = format!(
        r#"#!/bin/sh
echo "$@" >> "{pip_log}"
if [ "$1" = "wheel" ]; then
  shift
  dir=""
  pkgs=""
  while [ $# -gt 0 ]; do
    case "$1" in
      --wheel-dir) dir="$2"; shift 2 ;;
      --wheel-dir=*) dir="${{1#--wheel-dir=}}"; shift ;;
      *) pkgs="$pkgs $1"; shift ;;
    esac
  done
  mkdir -p "$dir"
  for p in $pkgs; do
    name=$(printf '%s' "$p" | tr 'A-Z-' 'a-z_')
    : > "$dir/${{name}}-1.0-py3-none-any.whl"
  done
fi
exit 0
"#,
        pip_log = pip_log.display()
    );

    let ftp_script = format!(
        r#"#!/bin/sh
echo "$@" >> "{ftp_log}"
cat >> "{ftp_input}"
exit 0
"#,
        ftp_log = ftp_log.display(),
        ftp_input = ftp_input.display()
    );

    fs::write(&pip, pip_script).unwrap();
    fs::write(&ftp, ftp_script).unwrap();
    for script in [&pip, &ftp] {
        let mut perms = fs::metadata(script).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(script, perms).unwrap();
    }

    StubTools {
        pip,
        ftp,
        pip_log,
        ftp_log,
        ftp_input,
    }
}

/// Read a recording file, returning empty when the tool never ran
pub fn read_log(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_default()
}
