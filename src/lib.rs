// Library interface for wheelhouse
// This allows integration tests and external code to use wheelhouse's modules

pub mod archive;
pub mod bundle;
pub mod cli_utils;
pub mod config;
pub mod config_discovery;
pub mod logging;

// Re-export commonly used types
pub use bundle::{Bundle, BundleError, BundleMember, VersionKey};
pub use config::WheelhouseConfig;
pub use config_discovery::{discover_config, load_config_with_discovery};
