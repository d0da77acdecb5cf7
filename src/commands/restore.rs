use anyhow::Result;

use crate::cli::RestoreArgs;
use crate::cli_utils::wheelhouse_prefix;
use crate::config_discovery;
use crate::consumer::{self, BundleSource};
use crate::merger::MergedRestoreConfig;

pub fn run(args: RestoreArgs) -> Result<()> {
    let file_config = config_discovery::load_config_with_discovery(args.config.as_deref())?;
    let config = MergedRestoreConfig::merge(&args, file_config)?;

    let summary = consumer::run(&config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let source = match summary.source {
            BundleSource::Remote => "fetched from remote store",
            BundleSource::Rebuilt => "rebuilt after fetch miss",
        };
        eprintln!(
            "{} bundle {} ({}), installed {} package(s) offline",
            wheelhouse_prefix(),
            summary.bundle_dir,
            source,
            summary.installed.len()
        );
    }

    Ok(())
}
