use anyhow::Result;
use std::env;
use std::fs;
use std::path::Path;

use crate::cli::DoctorArgs;
use crate::config_discovery;

pub fn run(args: DoctorArgs) -> Result<()> {
    println!("🔍 wheelhouse Doctor - Environment Check\n");

    let mut all_ok = true;

    // Check 1: wheelhouse binary
    if let Ok(exe_path) = env::current_exe() {
        println!("✅ wheelhouse binary found: {}", exe_path.display());
        if args.verbose {
            println!("   Version: {}", env!("CARGO_PKG_VERSION"));
        }
    } else {
        println!("❌ Could not determine wheelhouse binary path");
        all_ok = false;
    }

    // Check 2: configuration
    let config = match config_discovery::load_config_with_discovery(args.config.as_deref()) {
        Ok(Some(config)) => {
            println!("✅ Configuration loaded");
            Some(config)
        }
        Ok(None) => {
            println!("ℹ️  No wheelhouse.toml found, using defaults");
            None
        }
        Err(e) => {
            println!("❌ Configuration failed to load: {}", e);
            all_ok = false;
            None
        }
    };
    let config = config.unwrap_or_default();

    if let Err(e) = config.validate() {
        println!("❌ Configuration is invalid: {}", e);
        all_ok = false;
    }

    // Check 3: external tools
    for (role, name) in [("package installer", &config.tools.pip), ("transfer client", &config.tools.ftp)] {
        match which::which(name) {
            Ok(path) => {
                println!("✅ {} found: {}", role, path.display());
            }
            Err(_) => {
                println!("⚠️  {} '{}' not found in PATH", role, name);
                if args.verbose {
                    println!("   Set [tools] in wheelhouse.toml if the CI image names it differently");
                }
            }
        }
    }

    // Check 4: contract environment variables
    match env::var("TRAVIS_PYTHON_VERSION") {
        Ok(version) => println!("✅ TRAVIS_PYTHON_VERSION = {}", version),
        Err(_) => {
            println!("⚠️  TRAVIS_PYTHON_VERSION not set (builds need --python-version)");
        }
    }

    if env::var("PASSWD").is_ok() {
        println!("✅ PASSWD is set (value hidden)");
    } else {
        println!("⚠️  PASSWD not set (uploads will fail without a transfer credential)");
    }

    // Check 5: working directory is writable
    let work_dir = Path::new(&config.workspace.dir);
    let probe = work_dir.join(".wheelhouse-doctor-probe");
    match fs::create_dir_all(work_dir).and_then(|_| fs::write(&probe, b"ok")) {
        Ok(()) => {
            let _ = fs::remove_file(&probe);
            println!("✅ Working directory is writable: {}", work_dir.display());
        }
        Err(e) => {
            println!(
                "❌ Working directory is not writable: {} ({})",
                work_dir.display(),
                e
            );
            all_ok = false;
        }
    }

    // Summary
    println!();
    if all_ok {
        println!("✅ All checks passed! wheelhouse is ready.");
    } else {
        println!("⚠️  Some issues detected. Please fix the items marked with ❌ above.");
        std::process::exit(1);
    }

    Ok(())
}
