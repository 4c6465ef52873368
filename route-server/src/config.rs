//! Server configuration from environment variables.
//!
//! | Variable                   | Default             |
//! |----------------------------|---------------------|
//! | `ROUTE_SERVER_HOST`        | `127.0.0.1`         |
//! | `ROUTE_SERVER_PORT`        | `4321`              |
//! | `ROUTE_SERVER_DATA`        | `data/network.json` |
//! | `ROUTE_SERVER_STATIC_DIR`  | unset (no static files) |
//! | `ROUTE_SERVER_BATCH_SIZE`  | `8`                 |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::service::ServiceConfig;

pub const HOST_VAR: &str = "ROUTE_SERVER_HOST";
pub const PORT_VAR: &str = "ROUTE_SERVER_PORT";
pub const DATA_VAR: &str = "ROUTE_SERVER_DATA";
pub const STATIC_DIR_VAR: &str = "ROUTE_SERVER_STATIC_DIR";
pub const BATCH_SIZE_VAR: &str = "ROUTE_SERVER_BATCH_SIZE";

/// A configuration variable that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value {value:?} for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// JSON snapshot holding stops and routes.
    pub data_path: PathBuf,
    /// Directory of static files served for unmatched paths.
    pub static_dir: Option<PathBuf>,
    /// Maximum number of position writes dispatched concurrently.
    pub batch_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 4321,
            data_path: PathBuf::from("data/network.json"),
            static_dir: None,
            batch_size: ServiceConfig::default().batch_size,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`; unset variables keep their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(HOST_VAR) {
            config.host = parse(HOST_VAR, value)?;
        }
        if let Some(value) = lookup(PORT_VAR) {
            config.port = parse(PORT_VAR, value)?;
        }
        if let Some(value) = lookup(DATA_VAR) {
            config.data_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(STATIC_DIR_VAR).filter(|v| !v.is_empty()) {
            config.static_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(BATCH_SIZE_VAR) {
            let size: usize = parse(BATCH_SIZE_VAR, value.clone())?;
            if size == 0 {
                return Err(ConfigError {
                    var: BATCH_SIZE_VAR,
                    value,
                    reason: "must be at least 1".into(),
                });
            }
            config.batch_size = size;
        }

        Ok(config)
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Set the batch size; 0 is raised to 1.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Address to bind.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The route service's share of the configuration.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig::new(self.batch_size)
    }
}

fn parse<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError {
        var,
        reason: e.to_string(),
        value,
    })
}
