use anyhow::Result;
use tracing::info;

use crate::cli::ConfigCommands;
use crate::config::WheelhouseConfig;
use crate::config_discovery;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Validate { path } => validate(&path),
        ConfigCommands::Generate => generate(),
        ConfigCommands::Show { config } => show(config),
    }
}

fn validate(path: &str) -> Result<()> {
    info!("Validating config file: {}", path);

    let config = WheelhouseConfig::from_file(path)?;
    config.validate()?;

    println!("✓ Configuration file is valid: {}", path);
    println!("\nSummary:");
    println!("  - Packages: {}", config.packages.join(", "));
    println!("  - Working directory: {}", config.workspace.dir);
    println!(
        "  - Remote store: {}",
        config.remote.url.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  - Transfer host: {}",
        config.transfer.host.as_deref().unwrap_or("(not set)")
    );
    println!("  - Tools: pip={}, ftp={}", config.tools.pip, config.tools.ftp);

    Ok(())
}

fn generate() -> Result<()> {
    println!("{}", WheelhouseConfig::example());
    Ok(())
}

fn show(config_path: Option<String>) -> Result<()> {
    info!("Showing effective configuration");

    let mut config = config_discovery::load_config_with_discovery(config_path.as_deref())?
        .unwrap_or_default();

    // The transfer credential never reaches stdout
    if config.transfer.password.is_some() {
        config.transfer.password = Some("<redacted>".to_string());
    }

    println!("Effective Configuration:\n");
    println!("{}", toml::to_string_pretty(&config)?);

    Ok(())
}
