//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use crate::net::{ConnectionLimits, DEFAULT_MAX_FRAME_LEN, DEFAULT_MAX_LINE_LEN};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 54000;

/// Environment variable overriding the listen address.
pub const ENV_ADDR: &str = "STATION_SERVER_ADDR";
/// Environment variable overriding the live schedule file.
pub const ENV_LIVE_FILE: &str = "STATION_LIVE_FILE";
/// Environment variable overriding the master schedule file.
pub const ENV_MASTER_FILE: &str = "STATION_MASTER_FILE";
/// Environment variable overriding the request line limit.
pub const ENV_MAX_LINE_LEN: &str = "STATION_MAX_LINE_LEN";

/// Configuration for the station server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on.
    pub addr: SocketAddr,

    /// Read-write working copy of the schedule.
    pub live_file: PathBuf,

    /// Pristine schedule copied over the live file at startup.
    pub master_file: PathBuf,

    /// Longest accepted request line, in bytes.
    pub max_line_len: usize,

    /// Longest reply body, in bytes.
    pub max_frame_len: usize,
}

impl ServerConfig {
    /// Build from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    ///
    /// Unparseable values are logged and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            addr: parse_or(&lookup, ENV_ADDR, defaults.addr),
            live_file: lookup(ENV_LIVE_FILE)
                .map(PathBuf::from)
                .unwrap_or(defaults.live_file),
            master_file: lookup(ENV_MASTER_FILE)
                .map(PathBuf::from)
                .unwrap_or(defaults.master_file),
            max_line_len: parse_or(&lookup, ENV_MAX_LINE_LEN, defaults.max_line_len),
            max_frame_len: defaults.max_frame_len,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_files(mut self, live: impl Into<PathBuf>, master: impl Into<PathBuf>) -> Self {
        self.live_file = live.into();
        self.master_file = master.into();
        self
    }

    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len;
        self
    }

    /// Per-connection size limits.
    pub fn limits(&self) -> ConnectionLimits {
        ConnectionLimits {
            max_line_len: self.max_line_len,
            max_frame_len: self.max_frame_len,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            live_file: PathBuf::from("data/schedule_mod.json"),
            master_file: PathBuf::from("data/schedule_org.json"),
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "ignoring invalid setting, using default");
            default
        }),
    }
}
