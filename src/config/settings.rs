use std::path::PathBuf;

use log::warn;

use crate::store::StalePolicy;

const ENV_BASE_URL: &str = "TENNIS_CLUB_BASE_URL";
const ENV_DATA_DIR: &str = "TENNIS_CLUB_DATA_DIR";
const ENV_TIMEOUT_SECS: &str = "TENNIS_CLUB_TIMEOUT_SECS";
const ENV_DISCARD_STALE: &str = "TENNIS_CLUB_DISCARD_STALE";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            user_agent: "TennisClubClient/1.0".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub data_dir: PathBuf,
    /// Fixed name the session token is stored under
    pub token_key: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".tennis-club"),
            token_key: "token".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub page_size: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyncSettings {
    pub stale_policy: StalePolicy,
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub session: SessionSettings,
    pub view: ViewSettings,
    pub sync: SyncSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `TENNIS_CLUB_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(url) = lookup(ENV_BASE_URL) {
            config.api.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(dir) = lookup(ENV_DATA_DIR) {
            config.session.data_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.api.timeout_secs = secs,
                _ => warn!("Ignoring invalid {}: {:?}", ENV_TIMEOUT_SECS, raw),
            }
        }

        if let Some(flag) = lookup(ENV_DISCARD_STALE) {
            if matches!(flag.as_str(), "1" | "true") {
                config.sync.stale_policy = StalePolicy::DiscardStale;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = AppConfig::from_lookup(lookup_from(&[]));

        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.session.token_key, "token");
        assert_eq!(config.view.page_size, 10);
        assert_eq!(config.sync.stale_policy, StalePolicy::LastCompletedWins);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_BASE_URL, "https://club.example.com/"),
            (ENV_DATA_DIR, "/tmp/club"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_DISCARD_STALE, "true"),
        ]));

        assert_eq!(config.api.base_url, "https://club.example.com");
        assert_eq!(config.session.data_dir, PathBuf::from("/tmp/club"));
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.sync.stale_policy, StalePolicy::DiscardStale);
    }

    #[test]
    fn invalid_timeout_keeps_default() {
        let config = AppConfig::from_lookup(lookup_from(&[(ENV_TIMEOUT_SECS, "soon")]));
        assert_eq!(config.api.timeout_secs, 30);
    }
}
