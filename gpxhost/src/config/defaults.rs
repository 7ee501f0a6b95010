//! Default configuration values.

use std::net::{Ipv4Addr, SocketAddr};

/// Port the HTTP API listens on.
pub const DEFAULT_LISTEN_PORT: u16 = 8080;

/// Cache root, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "./cache";

pub const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Directory name under the home directory holding the config file.
pub const CONFIG_DIR_NAME: &str = ".gpxhost";

pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Address the HTTP API binds to: loopback only.
pub fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_LISTEN_PORT))
}
