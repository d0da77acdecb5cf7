use anyhow::Result;

use crate::builder;
use crate::cli::BuildArgs;
use crate::cli_utils::wheelhouse_prefix;
use crate::config_discovery;
use crate::merger::MergedBuildConfig;

pub fn run(args: BuildArgs) -> Result<()> {
    let file_config = config_discovery::load_config_with_discovery(args.config.as_deref())?;
    let config = MergedBuildConfig::merge(&args, file_config)?;

    let summary = builder::run(&config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        eprintln!(
            "{} built bundle {} ({} wheel(s), {} uploaded)",
            wheelhouse_prefix(),
            summary.bundle_dir,
            summary.files.len(),
            summary.uploaded
        );
    }

    Ok(())
}
