use anyhow::Result;

use crate::cli::ServeArgs;
use crate::config_discovery;
use crate::merger::MergedServeConfig;
use crate::store::StoreServer;

pub async fn run(args: ServeArgs) -> Result<()> {
    let file_config = config_discovery::load_config_with_discovery(args.config.as_deref())?;
    let config = MergedServeConfig::merge(&args, file_config);

    let server = StoreServer::new(config.bind, config.store_dir);
    server.run(args.port_file.as_deref()).await
}
