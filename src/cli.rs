use clap::{Parser, Subcommand};

/// wheelhouse - version-keyed dependency wheel cache for CI pipelines
///
/// wheelhouse caches prebuilt Python dependency wheels per interpreter
/// version, so CI runs install offline instead of resolving against the
/// package index on every build.
#[derive(Parser, Debug)]
#[command(name = "wheelhouse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Version-keyed dependency wheel cache for CI pipelines", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a wheel bundle for the current interpreter version and upload it
    Build(BuildArgs),

    /// Fetch the cached bundle (rebuilding on a miss) and install from it offline
    Restore(RestoreArgs),

    /// Run the remote-store HTTP server bundles are fetched from
    Serve(ServeArgs),

    /// Configuration management utilities
    Config(ConfigArgs),

    /// Check system configuration and external tools
    Doctor(DoctorArgs),
}

#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Config file path
    #[arg(short = 'c', long, env = "WHEELHOUSE_CONFIG")]
    pub config: Option<String>,

    /// Interpreter version key namespacing the bundle
    #[arg(long, env = "TRAVIS_PYTHON_VERSION")]
    pub python_version: Option<String>,

    /// Package(s) to cache, comma-separated
    #[arg(long = "package", env = "WHEELHOUSE_CONFIG_PACKAGES", value_delimiter = ',')]
    pub packages: Option<Vec<String>>,

    /// Working directory holding the bundle dir and transfer batch file
    #[arg(long, env = "WHEELHOUSE_CONFIG_WORK_DIR")]
    pub work_dir: Option<String>,

    /// Package installer binary
    #[arg(long, env = "WHEELHOUSE_CONFIG_PIP_BIN")]
    pub pip_bin: Option<String>,

    /// File-transfer client binary
    #[arg(long, env = "WHEELHOUSE_CONFIG_FTP_BIN")]
    pub ftp_bin: Option<String>,

    /// Remote host receiving uploads
    #[arg(long, env = "WHEELHOUSE_CONFIG_TRANSFER_HOST")]
    pub transfer_host: Option<String>,

    /// Login for the transfer session
    #[arg(long, env = "WHEELHOUSE_CONFIG_TRANSFER_USER")]
    pub transfer_user: Option<String>,

    /// Transfer credential
    #[arg(long, env = "PASSWD", hide_env_values = true)]
    pub password: Option<String>,

    /// Credential file location (defaults to ~/.netrc)
    #[arg(long, env = "WHEELHOUSE_CONFIG_NETRC_PATH")]
    pub netrc_path: Option<String>,

    /// Print the build summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct RestoreArgs {
    /// Config file path
    #[arg(short = 'c', long, env = "WHEELHOUSE_CONFIG")]
    pub config: Option<String>,

    /// Interpreter version key namespacing the bundle
    #[arg(long, env = "TRAVIS_PYTHON_VERSION")]
    pub python_version: Option<String>,

    /// Package(s) to install, comma-separated
    #[arg(long = "package", env = "WHEELHOUSE_CONFIG_PACKAGES", value_delimiter = ',')]
    pub packages: Option<Vec<String>>,

    /// Working directory the bundle is extracted or rebuilt into
    #[arg(long, env = "WHEELHOUSE_CONFIG_WORK_DIR")]
    pub work_dir: Option<String>,

    /// Base URL of the remote store serving bundle archives
    #[arg(long, env = "WHEELHOUSE_CONFIG_REMOTE_URL")]
    pub remote_url: Option<String>,

    /// Package installer binary
    #[arg(long, env = "WHEELHOUSE_CONFIG_PIP_BIN")]
    pub pip_bin: Option<String>,

    /// File-transfer client binary (used only when rebuilding)
    #[arg(long, env = "WHEELHOUSE_CONFIG_FTP_BIN")]
    pub ftp_bin: Option<String>,

    /// Remote host receiving uploads (used only when rebuilding)
    #[arg(long, env = "WHEELHOUSE_CONFIG_TRANSFER_HOST")]
    pub transfer_host: Option<String>,

    /// Login for the transfer session (used only when rebuilding)
    #[arg(long, env = "WHEELHOUSE_CONFIG_TRANSFER_USER")]
    pub transfer_user: Option<String>,

    /// Transfer credential (used only when rebuilding)
    #[arg(long, env = "PASSWD", hide_env_values = true)]
    pub password: Option<String>,

    /// Credential file location (defaults to ~/.netrc)
    #[arg(long, env = "WHEELHOUSE_CONFIG_NETRC_PATH")]
    pub netrc_path: Option<String>,

    /// Print the restore summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Config file path
    #[arg(short = 'c', long, env = "WHEELHOUSE_CONFIG")]
    pub config: Option<String>,

    /// Bind address (port 0 = random)
    #[arg(long, env = "WHEELHOUSE_CONFIG_STORE_BIND")]
    pub bind: Option<String>,

    /// Directory holding the per-key bundle directories
    #[arg(long, env = "WHEELHOUSE_CONFIG_STORE_DIR")]
    pub store_dir: Option<String>,

    /// Write the actual bound address as JSON to this file
    #[arg(long)]
    pub port_file: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to config file
        path: String,
    },

    /// Generate an example configuration
    Generate,

    /// Show effective configuration
    Show {
        /// Config file path (discovered if omitted)
        #[arg(short = 'c', long, env = "WHEELHOUSE_CONFIG")]
        config: Option<String>,
    },
}

#[derive(Parser, Debug)]
pub struct DoctorArgs {
    /// Config file path
    #[arg(short = 'c', long, env = "WHEELHOUSE_CONFIG")]
    pub config: Option<String>,

    /// Show detailed diagnostic output
    #[arg(short, long)]
    pub verbose: bool,
}
