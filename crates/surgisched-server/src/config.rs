use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use surgisched_core::SchedulingDefaults;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub scheduling: SchedulingDefaults,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        if self.pagination.default_limit == 0 {
            return Err("pagination.default_limit must be > 0".into());
        }
        if self.pagination.max_limit == 0 {
            return Err("pagination.max_limit must be > 0".into());
        }
        if self.pagination.default_limit > self.pagination.max_limit {
            return Err("pagination.default_limit must be <= pagination.max_limit".into());
        }
        if self.scheduling.default_duration_minutes == 0 {
            return Err("scheduling.default_duration_minutes must be > 0".into());
        }
        if self.scheduling.max_plausible_duration_minutes
            < self.scheduling.default_duration_minutes
        {
            return Err(
                "scheduling.max_plausible_duration_minutes must cover the default duration".into(),
            );
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

fn default_limit() -> usize {
    20
}

fn default_max_limit() -> usize {
    100
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl PaginationConfig {
    /// Effective page size for a request: the configured default when the
    /// caller sent nothing, clamped to the configured maximum.
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

/// Loads configuration from a TOML file. A missing file yields the default
/// configuration; a malformed or invalid file is an error.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, String> {
    let cfg = match path {
        Some(p) if p.exists() => {
            let raw = std::fs::read_to_string(p)
                .map_err(|e| format!("failed to read {}: {e}", p.display()))?;
            toml::from_str::<AppConfig>(&raw)
                .map_err(|e| format!("failed to parse {}: {e}", p.display()))?
        }
        _ => AppConfig::default(),
    };
    cfg.validate()?;
    Ok(cfg)
}
