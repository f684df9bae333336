use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub remote: RemoteConfig,
    pub sync: SyncConfig,
}

/// Local durable storage holding the mutation queue and optimistic snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// System of record the queue is replayed against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Failed attempts after which a mutation is abandoned.
    pub max_retries: u32,
    pub backpressure_threshold: u32,
    pub auto_sync_on_reconnect: bool,
    pub drain_on_enqueue: bool,
    #[serde(default)]
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/fieldsync.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            remote: RemoteConfig {
                url: "sqlite:data/remote.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            sync: SyncConfig::default(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backpressure_threshold: 50,
            auto_sync_on_reconnect: true,
            drain_on_enqueue: true,
            log_json: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("FIELDSYNC_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("FIELDSYNC_REMOTE_URL") {
            if !v.trim().is_empty() {
                cfg.remote.url = v.trim().to_string();
            }
        }
        if let Some(value) = std::env::var("FIELDSYNC_MAX_RETRIES")
            .ok()
            .and_then(|v| parse_u32(&v))
        {
            cfg.sync.max_retries = value.max(1);
        }
        if let Some(value) = std::env::var("FIELDSYNC_BACKPRESSURE_THRESHOLD")
            .ok()
            .and_then(|v| parse_u32(&v))
        {
            cfg.sync.backpressure_threshold = value.max(1);
        }
        if let Ok(v) = std::env::var("FIELDSYNC_AUTO_SYNC") {
            cfg.sync.auto_sync_on_reconnect = parse_bool(&v, cfg.sync.auto_sync_on_reconnect);
        }
        if let Ok(v) = std::env::var("FIELDSYNC_DRAIN_ON_ENQUEUE") {
            cfg.sync.drain_on_enqueue = parse_bool(&v, cfg.sync.drain_on_enqueue);
        }
        if let Ok(v) = std::env::var("FIELDSYNC_LOG_JSON") {
            cfg.sync.log_json = parse_bool(&v, cfg.sync.log_json);
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.remote.url.trim().is_empty() {
            return Err("Remote url must not be empty".to_string());
        }
        if self.database.max_connections == 0 || self.remote.max_connections == 0 {
            return Err("max_connections must be greater than 0".to_string());
        }
        if self.sync.max_retries == 0 {
            return Err("Sync max_retries must be greater than 0".to_string());
        }
        if self.sync.backpressure_threshold == 0 {
            return Err("Sync backpressure_threshold must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_policy() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.sync.max_retries, 3);
        assert_eq!(cfg.sync.backpressure_threshold, 50);
        assert!(cfg.sync.auto_sync_on_reconnect);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_retry_budget() {
        let mut cfg = AppConfig::default();
        cfg.sync.max_retries = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn parse_bool_falls_back_on_garbage() {
        assert!(parse_bool("YES", false));
        assert!(!parse_bool("off", true));
        assert!(parse_bool("maybe", true));
    }
}
