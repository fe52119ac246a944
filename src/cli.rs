//! Command Line Interface (CLI) arguments.

use clap::Parser;

/// geodb-openeo command line interface
#[derive(Clone, Debug, Parser)]
pub struct CommandLineArgs {
    /// The IP address on which the server should listen
    #[arg(long, default_value = "0.0.0.0", env = "GEODB_OPENEO_HOST")]
    pub host: String,
    /// The port to which the server should bind
    #[arg(long, default_value_t = 5000, env = "GEODB_OPENEO_PORT")]
    pub port: u16,
    /// Path to the configuration YAML file
    #[arg(long, default_value = "config.yml", env = "GEODB_OPENEO_CONFIG")]
    pub config: String,
    /// Flag indicating whether HTTPS should be used
    #[arg(long, default_value_t = false, env = "GEODB_OPENEO_HTTPS")]
    pub https: bool,
    /// Path to the certificate file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/geodb-openeo/certs/cert.pem",
        env = "GEODB_OPENEO_CERT_FILE"
    )]
    pub cert_file: String,
    /// Path to the key file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/geodb-openeo/certs/key.pem",
        env = "GEODB_OPENEO_KEY_FILE"
    )]
    pub key_file: String,
    /// Maximum time in seconds to wait for operations to complete upon receiving `ctrl+c` signal.
    #[arg(long, default_value_t = 60, env = "GEODB_OPENEO_SHUTDOWN_TIMEOUT")]
    pub graceful_shutdown_timeout: u64,
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}
