use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::diversity::TierRatios;
use crate::core::mixer::{PlatformMixer, PlatformShare};
use crate::core::recommender::DEFAULT_CANDIDATE_POOL;
use crate::core::search::DEFAULT_TAG_SCAN_CAP;
use crate::models::{Platform, ScoringWeights};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub parser: ParserSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub taxonomy: TaxonomySettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub recommendation: RecommendationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

/// Where creators are read from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositorySettings {
    #[serde(default)]
    pub backend: RepositoryBackend,
    /// JSON seed for the memory backend
    pub seed_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default)]
    pub enabled: bool,
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            redis_url: None,
            ttl_secs: Some(300),
            l1_cache_size: Some(10_000),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParserSettings {
    #[serde(default)]
    pub enabled: bool,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    /// Language applied to searches with no other signal
    #[serde(default = "default_language")]
    pub default_language: Option<String>,
    #[serde(default = "default_tag_scan_cap")]
    pub tag_scan_cap: usize,
    #[serde(default = "default_mix")]
    pub mix: Vec<PlatformShare>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            tag_scan_cap: default_tag_scan_cap(),
            mix: default_mix(),
        }
    }
}

fn default_language() -> Option<String> {
    Some("es".to_string())
}

fn default_tag_scan_cap() -> usize {
    DEFAULT_TAG_SCAN_CAP
}

fn default_mix() -> Vec<PlatformShare> {
    vec![
        PlatformShare { platform: Platform::Twitch, share: 0.4 },
        PlatformShare { platform: Platform::YouTube, share: 0.3 },
        PlatformShare { platform: Platform::Kick, share: 0.3 },
    ]
}

impl SearchSettings {
    pub fn mixer(&self) -> PlatformMixer {
        PlatformMixer::new(self.mix.clone())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaxonomySettings {
    /// TOML file replacing the built-in brand/keyword tables
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_vertical_fit_weight")]
    pub vertical_fit: f64,
    #[serde(default = "default_historical_weight")]
    pub historical_performance: f64,
    #[serde(default = "default_brand_safety_weight")]
    pub brand_safety: f64,
    #[serde(default = "default_budget_weight")]
    pub budget_alignment: f64,
    #[serde(default = "default_user_history_weight")]
    pub user_history: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            vertical_fit: default_vertical_fit_weight(),
            historical_performance: default_historical_weight(),
            brand_safety: default_brand_safety_weight(),
            budget_alignment: default_budget_weight(),
            user_history: default_user_history_weight(),
        }
    }
}

fn default_vertical_fit_weight() -> f64 {
    0.30
}

fn default_historical_weight() -> f64 {
    0.25
}

fn default_brand_safety_weight() -> f64 {
    0.20
}

fn default_budget_weight() -> f64 {
    0.15
}

fn default_user_history_weight() -> f64 {
    0.10
}

impl WeightsConfig {
    /// Weights for the scorer; rejected unless they sum to 1.0
    pub fn to_weights(&self) -> Result<ScoringWeights, ConfigError> {
        let weights = ScoringWeights {
            vertical_fit: self.vertical_fit,
            historical_performance: self.historical_performance,
            brand_safety: self.brand_safety,
            budget_alignment: self.budget_alignment,
            user_history: self.user_history,
        };

        if !weights.is_normalized() {
            return Err(ConfigError::Message(format!(
                "scoring.weights must be non-negative and sum to 1.0 (got {:.4})",
                weights.sum()
            )));
        }

        Ok(weights)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationSettings {
    #[serde(default = "default_candidate_pool")]
    pub candidate_pool: usize,
    #[serde(default)]
    pub tier_ratios: TierRatios,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            candidate_pool: default_candidate_pool(),
            tier_ratios: TierRatios::default(),
        }
    }
}

fn default_candidate_pool() -> usize {
    DEFAULT_CANDIDATE_POOL
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingSettings {
    /// LOG_LEVEL and LOG_FORMAT override the configured values
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(std::env::var("LOG_LEVEL").ok(), std::env::var("LOG_FORMAT").ok())
    }

    pub fn with_overrides(self, level: Option<String>, format: Option<String>) -> Self {
        Self {
            level: level.unwrap_or(self.level),
            format: format.unwrap_or(self.format),
        }
    }

    pub fn is_pretty(&self) -> bool {
        self.format.eq_ignore_ascii_case("pretty")
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn environment() -> Environment {
    Environment::with_prefix("SCOUT")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration files (config/default.toml, then config/local.toml)
    /// 3. Environment variables, e.g. SCOUT__SERVER__PORT -> server.port
    /// 4. DATABASE_URL, REDIS_URL and SCOUT_PARSER__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(environment())
            .build()?;

        let settings = substitute_env_vars(settings)?;
        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the conventional deployment variables on top of the layered config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(redis_url) = env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", redis_url)?;
    }
    if let Ok(api_key) = env::var("SCOUT_PARSER__API_KEY") {
        builder = builder.set_override("parser.api_key", api_key)?;
    }

    builder.build()
}
