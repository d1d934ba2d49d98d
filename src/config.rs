//! Command line and environment configuration for the server.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;

/// The REST API server for moniplan.
///
/// Every option can also be set with the environment variable named in its help text.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// File path to the application SQLite database. Created if it does not exist.
    #[arg(long, env = "DATABASE_PATH")]
    pub db_path: String,

    /// The secret used to sign session tokens.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT")]
    pub port: u16,

    /// The address to serve the API from.
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// The canonical timezone used for the current month and default transaction dates,
    /// e.g. "Pacific/Auckland".
    #[arg(long, env = "TIMEZONE", default_value = "Etc/UTC")]
    pub timezone: String,

    /// File path for the debug level log.
    #[arg(long, env = "LOG_PATH", default_value = "debug.log")]
    pub log_path: String,
}

impl Config {
    /// The socket address the server should listen on.
    pub fn socket_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
