use league_api::session::StaticCredentials;
use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const API_URL_ENV: &str = "LEAGUE_API_URL";
pub const API_KEY_ENV: &str = "LEAGUE_API_KEY";
pub const SEED_JSON_ENV: &str = "LEAGUE_SEED_JSON";
pub const COMMIT_RETRIES_ENV: &str = "LEAGUE_COMMIT_RETRIES";
pub const LOG_ENV: &str = "LEAGUE_LOG";

pub const DEFAULT_COMMIT_RETRIES: u32 = 3;
const COMMIT_BACKOFF: Duration = Duration::from_millis(500);

/// Where league data is read from and written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSource {
    Hosted { url: String, api_key: String },
    SeedFile(PathBuf),
    Demo,
}

impl StoreSource {
    pub fn describe(&self) -> String {
        match self {
            StoreSource::Hosted { url, .. } => format!("hosted store at {url}"),
            StoreSource::SeedFile(path) => format!("seed file {}", path.display()),
            StoreSource::Demo => "built-in demo season".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub store: StoreSource,
    pub admin: Option<StaticCredentials>,
    pub commit_retries: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            store: StoreSource::Demo,
            admin: None,
            commit_retries: DEFAULT_COMMIT_RETRIES,
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        let mut settings = Self::from_lookup(|key| std::env::var(key).ok());
        settings.admin = StaticCredentials::from_env();
        settings
    }

    /// Build settings from any key lookup; `load` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let store = if let Some(url) = get(API_URL_ENV) {
            StoreSource::Hosted {
                url,
                api_key: get(API_KEY_ENV).unwrap_or_default(),
            }
        } else if let Some(path) = get(SEED_JSON_ENV) {
            StoreSource::SeedFile(PathBuf::from(path))
        } else {
            StoreSource::Demo
        };

        Self {
            full_screen: false,
            log_level: get(LOG_ENV).and_then(|v| LevelFilter::from_str(&v).ok()),
            store,
            admin: None,
            commit_retries: get(COMMIT_RETRIES_ENV)
                .and_then(|v| v.parse::<u32>().ok())
                .map(|n| n.max(1))
                .unwrap_or(DEFAULT_COMMIT_RETRIES),
        }
    }

    pub fn commit_backoff(&self) -> Duration {
        COMMIT_BACKOFF
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> AppSettings {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppSettings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_use_demo_season() {
        let s = settings(&[]);
        assert_eq!(s.store, StoreSource::Demo);
        assert_eq!(s.commit_retries, DEFAULT_COMMIT_RETRIES);
        assert!(s.log_level.is_none());
    }

    #[test]
    fn test_hosted_store_wins_over_seed_file() {
        let s = settings(&[
            (API_URL_ENV, "https://league.example"),
            (API_KEY_ENV, "anon"),
            (SEED_JSON_ENV, "/tmp/seed.json"),
        ]);
        assert_eq!(
            s.store,
            StoreSource::Hosted { url: "https://league.example".into(), api_key: "anon".into() }
        );
    }

    #[test]
    fn test_seed_file_and_overrides() {
        let s = settings(&[
            (SEED_JSON_ENV, "/tmp/seed.json"),
            (COMMIT_RETRIES_ENV, "0"),
            (LOG_ENV, "debug"),
        ]);
        assert_eq!(s.store, StoreSource::SeedFile(PathBuf::from("/tmp/seed.json")));
        assert_eq!(s.commit_retries, 1);
        assert_eq!(s.log_level, Some(LevelFilter::Debug));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let s = settings(&[(API_URL_ENV, "  "), (COMMIT_RETRIES_ENV, "many")]);
        assert_eq!(s.store, StoreSource::Demo);
        assert_eq!(s.commit_retries, DEFAULT_COMMIT_RETRIES);
    }
}
