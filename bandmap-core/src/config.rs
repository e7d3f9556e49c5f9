//! Configuration loading.
//!
//! Values are resolved in priority order:
//! 1. Command-line flags (applied by the binary)
//! 2. Environment variables (`BANDMAP_*`)
//! 3. TOML config file
//! 4. Compiled defaults

use bandmap_scanner::crawler::{DEFAULT_MAX_DEPTH, DEFAULT_REQUEST_DELAY};
use bandmap_scanner::musicbrainz::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, default_user_agent};
use bandmap_scanner::{ClientConfig, CrawlMode, RelationLabels};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const ENV_BASE_URL: &str = "BANDMAP_BASE_URL";
pub const ENV_USER_AGENT: &str = "BANDMAP_USER_AGENT";
pub const ENV_MAX_DEPTH: &str = "BANDMAP_MAX_DEPTH";
pub const ENV_REQUEST_DELAY_MS: &str = "BANDMAP_REQUEST_DELAY_MS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandmapConfig {
    pub client: ClientSettings,
    pub crawl: CrawlSettings,
    pub relations: RelationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: default_user_agent(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlSettings {
    pub max_depth: usize,
    /// Overrides `max_depth`: expand only the seed's personnel.
    pub one_hop: bool,
    pub request_delay_ms: u64,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            one_hop: false,
            request_delay_ms: DEFAULT_REQUEST_DELAY.as_millis() as u64,
        }
    }
}

/// Relation type labels. Other collaboration types can be tracked by adding them here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationSettings {
    pub member: Vec<String>,
    pub supporting: Vec<String>,
}

impl Default for RelationSettings {
    fn default() -> Self {
        Self {
            member: vec!["member of band".to_string(), "member".to_string()],
            supporting: vec!["supporting musician".to_string()],
        }
    }
}

impl BandmapConfig {
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&content, path)
    }

    /// Loads `path` (with `~` expanded) when given, defaults otherwise.
    pub fn load_optional(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(raw) => {
                let expanded = shellexpand::tilde(raw);
                Self::load(Path::new(expanded.as_ref()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Applies `BANDMAP_*` variables from the process environment.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from<F>(mut self, get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = get(ENV_BASE_URL) {
            self.client.base_url = url;
        }
        if let Some(agent) = get(ENV_USER_AGENT) {
            self.client.user_agent = agent;
        }
        if let Some(depth) = get(ENV_MAX_DEPTH) {
            self.crawl.max_depth = parse_number(ENV_MAX_DEPTH, &depth)?;
            self.crawl.one_hop = false;
        }
        if let Some(delay) = get(ENV_REQUEST_DELAY_MS) {
            self.crawl.request_delay_ms = parse_number(ENV_REQUEST_DELAY_MS, &delay)?;
        }
        Ok(self)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.client.base_url.clone(),
            user_agent: self.client.user_agent.clone(),
            timeout_secs: self.client.timeout_secs,
        }
    }

    pub fn crawl_mode(&self) -> CrawlMode {
        if self.crawl.one_hop {
            CrawlMode::OneHop
        } else {
            CrawlMode::Bounded {
                max_depth: self.crawl.max_depth,
            }
        }
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.crawl.request_delay_ms)
    }

    pub fn relation_labels(&self) -> RelationLabels {
        RelationLabels::new(&self.relations.member, &self.relations.supporting)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandmap_scanner::RelationKind;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = BandmapConfig::default();
        assert_eq!(config.crawl_mode(), CrawlMode::Bounded { max_depth: 2 });
        assert_eq!(config.request_delay(), Duration::from_millis(1100));
        assert_eq!(config.client.base_url, "https://musicbrainz.org/ws/2/");
        assert_eq!(config.client.timeout_secs, 30);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml = r#"
            [crawl]
            max_depth = 3

            [client]
            user_agent = "GrungeMappingProject/0.1 ( me@example.com )"
        "#;
        let config = BandmapConfig::from_toml_str(toml, Path::new("test.toml")).unwrap();
        assert_eq!(config.crawl.max_depth, 3);
        assert_eq!(config.crawl.request_delay_ms, 1100);
        assert_eq!(config.client.user_agent, "GrungeMappingProject/0.1 ( me@example.com )");
        assert_eq!(config.client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_one_hop_wins_over_depth() {
        let toml = "[crawl]\nmax_depth = 5\none_hop = true\n";
        let config = BandmapConfig::from_toml_str(toml, Path::new("test.toml")).unwrap();
        assert_eq!(config.crawl_mode(), CrawlMode::OneHop);
    }

    #[test]
    fn test_invalid_toml() {
        let err = BandmapConfig::from_toml_str("[crawl\nmax_depth = ", Path::new("bad.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_missing_file() {
        let err = BandmapConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_MAX_DEPTH, "4"),
            (ENV_REQUEST_DELAY_MS, " 250 "),
            (ENV_USER_AGENT, "env-agent"),
        ]);
        let config = BandmapConfig::default()
            .apply_env_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.crawl.max_depth, 4);
        assert_eq!(config.request_delay(), Duration::from_millis(250));
        assert_eq!(config.client.user_agent, "env-agent");
    }

    #[test]
    fn test_env_depth_overrides_one_hop_file() {
        let toml = "[crawl]\none_hop = true\n";
        let config = BandmapConfig::from_toml_str(toml, Path::new("test.toml"))
            .unwrap()
            .apply_env_from(|key| (key == ENV_MAX_DEPTH).then(|| "3".to_string()))
            .unwrap();
        assert!(!config.crawl.one_hop);
        assert_eq!(config.crawl_mode(), CrawlMode::Bounded { max_depth: 3 });
    }

    #[test]
    fn test_env_invalid_number() {
        let err = BandmapConfig::default()
            .apply_env_from(|key| (key == ENV_MAX_DEPTH).then(|| "deep".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == ENV_MAX_DEPTH));
    }

    #[test]
    fn test_relation_labels_from_config() {
        let mut config = BandmapConfig::default();
        config.relations.supporting.push("instrumental supporting musician".to_string());
        let labels = config.relation_labels();
        assert_eq!(
            labels.classify("Instrumental Supporting Musician"),
            Some(RelationKind::Supporting)
        );
        assert_eq!(labels.classify("member"), Some(RelationKind::Member));
    }
}
