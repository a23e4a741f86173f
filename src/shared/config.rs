use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the remote service; resources are addressed by stable
    /// relative paths underneath it.
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Attempt an immediate drain right after an enqueue when the
    /// connectivity signal reads online.
    pub drain_on_enqueue: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8080/api".to_string(),
                request_timeout_secs: 30,
            },
            database: DatabaseConfig {
                url: "sqlite:data/farmlog.db".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            sync: SyncConfig {
                drain_on_enqueue: true,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("FARMLOG_API_URL") {
            if !v.trim().is_empty() {
                cfg.api.base_url = v.trim().trim_end_matches('/').to_string();
            }
        }
        if let Ok(v) = std::env::var("FARMLOG_API_TIMEOUT_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.api.request_timeout_secs = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("FARMLOG_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("FARMLOG_DRAIN_ON_ENQUEUE") {
            cfg.sync.drain_on_enqueue = parse_bool(&v, cfg.sync.drain_on_enqueue);
        }

        cfg
    }
}

fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_local_api() {
        let cfg = AppConfig::default();
        assert!(cfg.api.base_url.starts_with("http://"));
        assert!(cfg.sync.drain_on_enqueue);
    }

    #[test]
    fn parse_bool_falls_back_on_garbage() {
        assert!(parse_bool("yes", false));
        assert!(!parse_bool("off", true));
        assert!(parse_bool("banana", true));
    }
}
