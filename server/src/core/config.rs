use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::analytics::{BucketUnit, OverviewPolicy, WeekAnchor};
use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_GLOBAL_CONCURRENCY, DEFAULT_HOST, DEFAULT_MAX_BUCKETS,
    DEFAULT_PORT, DEFAULT_REQUEST_CONCURRENCY, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOP_LIMIT,
    MAX_BUCKETS_LIMIT, MAX_LIMIT, POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS,
    POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS, POSTGRES_DEFAULT_MAX_CONNECTIONS,
    POSTGRES_DEFAULT_MAX_LIFETIME_SECS, POSTGRES_DEFAULT_MIN_CONNECTIONS,
    POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS, SQLITE_DEFAULT_PATH, SQLITE_MAX_CONNECTIONS,
};

// =============================================================================
// Database Backend Enum (SQLite or PostgreSQL)
// =============================================================================

/// Backend holding the blog tables the engine reads from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Sqlite,
    Postgres,
}

impl fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseBackend::Sqlite => write!(f, "sqlite"),
            DatabaseBackend::Postgres => write!(f, "postgres"),
        }
    }
}

// =============================================================================
// File Config Structs (JSON sections, every field optional)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// SQLite configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SqliteFileConfig {
    /// Path to the blog database file (default: ./blogstat.db)
    pub path: Option<String>,
    pub max_connections: Option<u32>,
}

/// PostgreSQL configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PostgresFileConfig {
    /// PostgreSQL connection URL (or use BLOGSTAT_POSTGRES_URL env var)
    pub url: Option<String>,
    /// Maximum number of connections in the pool (default: 20)
    pub max_connections: Option<u32>,
    /// Minimum number of connections to keep warm (default: 2)
    pub min_connections: Option<u32>,
    /// Connection acquire timeout in seconds (default: 30)
    pub acquire_timeout_secs: Option<u64>,
    /// Idle connection timeout in seconds (default: 600)
    pub idle_timeout_secs: Option<u64>,
    /// Max connection lifetime in seconds (default: 1800)
    pub max_lifetime_secs: Option<u64>,
    /// Statement timeout in seconds, 0 to disable (default: 30)
    pub statement_timeout_secs: Option<u64>,
}

/// Database configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    /// Backend: sqlite (default) or postgres
    pub backend: Option<DatabaseBackend>,
    pub sqlite: Option<SqliteFileConfig>,
    pub postgres: Option<PostgresFileConfig>,
}

/// Analytics engine configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AnalyticsFileConfig {
    pub overview_policy: Option<OverviewPolicy>,
    pub request_concurrency: Option<usize>,
    pub global_concurrency: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub max_buckets: Option<usize>,
    pub default_top_limit: Option<u32>,
    pub allowed_units: Option<Vec<BucketUnit>>,
    pub week_anchor: Option<WeekAnchor>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    pub analytics: Option<AnalyticsFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(database) = other.database {
            let current = self.database.get_or_insert_with(DatabaseFileConfig::default);
            if database.backend.is_some() {
                tracing::trace!(backend = ?database.backend, "Merging database.backend");
                current.backend = database.backend;
            }
            if let Some(sqlite) = database.sqlite {
                let cur = current.sqlite.get_or_insert_with(SqliteFileConfig::default);
                if sqlite.path.is_some() {
                    cur.path = sqlite.path;
                }
                if sqlite.max_connections.is_some() {
                    cur.max_connections = sqlite.max_connections;
                }
            }
            if let Some(pg) = database.postgres {
                let cur = current
                    .postgres
                    .get_or_insert_with(PostgresFileConfig::default);
                if pg.url.is_some() {
                    cur.url = pg.url;
                }
                if pg.max_connections.is_some() {
                    cur.max_connections = pg.max_connections;
                }
                if pg.min_connections.is_some() {
                    cur.min_connections = pg.min_connections;
                }
                if pg.acquire_timeout_secs.is_some() {
                    cur.acquire_timeout_secs = pg.acquire_timeout_secs;
                }
                if pg.idle_timeout_secs.is_some() {
                    cur.idle_timeout_secs = pg.idle_timeout_secs;
                }
                if pg.max_lifetime_secs.is_some() {
                    cur.max_lifetime_secs = pg.max_lifetime_secs;
                }
                if pg.statement_timeout_secs.is_some() {
                    cur.statement_timeout_secs = pg.statement_timeout_secs;
                }
            }
        }

        if let Some(analytics) = other.analytics {
            let current = self
                .analytics
                .get_or_insert_with(AnalyticsFileConfig::default);
            if analytics.overview_policy.is_some() {
                tracing::trace!(policy = ?analytics.overview_policy, "Merging analytics.overview_policy");
                current.overview_policy = analytics.overview_policy;
            }
            if analytics.request_concurrency.is_some() {
                current.request_concurrency = analytics.request_concurrency;
            }
            if analytics.global_concurrency.is_some() {
                current.global_concurrency = analytics.global_concurrency;
            }
            if analytics.request_timeout_secs.is_some() {
                current.request_timeout_secs = analytics.request_timeout_secs;
            }
            if analytics.max_buckets.is_some() {
                current.max_buckets = analytics.max_buckets;
            }
            if analytics.default_top_limit.is_some() {
                current.default_top_limit = analytics.default_top_limit;
            }
            if analytics.allowed_units.is_some() {
                current.allowed_units = analytics.allowed_units;
            }
            if analytics.week_anchor.is_some() {
                tracing::trace!(anchor = ?analytics.week_anchor, "Merging analytics.week_anchor");
                current.week_anchor = analytics.week_anchor;
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// SQLite configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

/// PostgreSQL configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// PostgreSQL connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to keep warm
    pub min_connections: u32,
    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,
    /// Max connection lifetime in seconds
    pub max_lifetime_secs: u64,
    /// Statement timeout in seconds (0 = default)
    pub statement_timeout_secs: u64,
}

/// Database configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub sqlite: SqliteConfig,
    /// Only populated when backend = postgres
    pub postgres: Option<PostgresConfig>,
}

/// Analytics engine configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// How overview requests react to a failing sub-metric
    pub overview_policy: OverviewPolicy,
    /// Max in-flight aggregate fetches within one request
    pub request_concurrency: usize,
    /// Max in-flight aggregate fetches across the whole process
    pub global_concurrency: usize,
    /// Deadline for a whole analyze request
    pub request_timeout_secs: u64,
    pub max_buckets: usize,
    pub default_top_limit: u32,
    pub allowed_units: Vec<BucketUnit>,
    pub week_anchor: WeekAnchor,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            overview_policy: OverviewPolicy::default(),
            request_concurrency: DEFAULT_REQUEST_CONCURRENCY,
            global_concurrency: DEFAULT_GLOBAL_CONCURRENCY,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_buckets: DEFAULT_MAX_BUCKETS,
            default_top_limit: DEFAULT_TOP_LIMIT,
            allowed_units: BucketUnit::ALL.to_vec(),
            week_anchor: WeekAnchor::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub analytics: AnalyticsConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.blogstat/blogstat.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_layers(file_config, cli);
        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            backend = %config.database.backend,
            overview_policy = %config.analytics.overview_policy,
            request_concurrency = config.analytics.request_concurrency,
            global_concurrency = config.analytics.global_concurrency,
            request_timeout_secs = config.analytics.request_timeout_secs,
            week_anchor = %config.analytics.week_anchor,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn from_layers(file_config: FileConfig, cli: &CliConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();
        let file_sqlite = file_database.sqlite.unwrap_or_default();
        let file_analytics = file_config.analytics.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let backend = cli
            .db_backend
            .or(file_database.backend)
            .unwrap_or_default();

        let sqlite_path = cli
            .sqlite_path
            .clone()
            .or(file_sqlite.path)
            .unwrap_or_else(|| SQLITE_DEFAULT_PATH.to_string());
        let sqlite = SqliteConfig {
            path: expand_path(&sqlite_path),
            max_connections: file_sqlite
                .max_connections
                .unwrap_or(SQLITE_MAX_CONNECTIONS),
        };

        let postgres = if backend == DatabaseBackend::Postgres {
            let file_pg = file_database.postgres.unwrap_or_default();
            Some(PostgresConfig {
                url: cli.postgres_url.clone().or(file_pg.url).unwrap_or_default(),
                max_connections: file_pg
                    .max_connections
                    .unwrap_or(POSTGRES_DEFAULT_MAX_CONNECTIONS),
                min_connections: file_pg
                    .min_connections
                    .unwrap_or(POSTGRES_DEFAULT_MIN_CONNECTIONS),
                acquire_timeout_secs: file_pg
                    .acquire_timeout_secs
                    .unwrap_or(POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS),
                idle_timeout_secs: file_pg
                    .idle_timeout_secs
                    .unwrap_or(POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS),
                max_lifetime_secs: file_pg
                    .max_lifetime_secs
                    .unwrap_or(POSTGRES_DEFAULT_MAX_LIFETIME_SECS),
                statement_timeout_secs: file_pg
                    .statement_timeout_secs
                    .unwrap_or(POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS),
            })
        } else {
            None
        };

        let defaults = AnalyticsConfig::default();
        let analytics = AnalyticsConfig {
            overview_policy: cli
                .overview_policy
                .or(file_analytics.overview_policy)
                .unwrap_or(defaults.overview_policy),
            request_concurrency: cli
                .request_concurrency
                .or(file_analytics.request_concurrency)
                .unwrap_or(defaults.request_concurrency),
            global_concurrency: cli
                .global_concurrency
                .or(file_analytics.global_concurrency)
                .unwrap_or(defaults.global_concurrency),
            request_timeout_secs: cli
                .request_timeout
                .or(file_analytics.request_timeout_secs)
                .unwrap_or(defaults.request_timeout_secs),
            max_buckets: file_analytics.max_buckets.unwrap_or(defaults.max_buckets),
            default_top_limit: file_analytics
                .default_top_limit
                .unwrap_or(defaults.default_top_limit),
            allowed_units: file_analytics
                .allowed_units
                .unwrap_or(defaults.allowed_units),
            week_anchor: cli
                .week_anchor
                .or(file_analytics.week_anchor)
                .unwrap_or(defaults.week_anchor),
        };

        Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                backend,
                sqlite,
                postgres,
            },
            analytics,
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if let Some(pg) = &self.database.postgres
            && pg.url.is_empty()
        {
            anyhow::bail!(
                "Configuration error: database.postgres.url is required when backend is postgres"
            );
        }

        let analytics = &self.analytics;
        if analytics.request_concurrency == 0 || analytics.global_concurrency == 0 {
            anyhow::bail!("Configuration error: analytics concurrency limits must be at least 1");
        }
        if analytics.request_concurrency > analytics.global_concurrency {
            anyhow::bail!(
                "Configuration error: analytics.request_concurrency ({}) exceeds analytics.global_concurrency ({})",
                analytics.request_concurrency,
                analytics.global_concurrency
            );
        }
        if analytics.request_timeout_secs == 0 {
            anyhow::bail!("Configuration error: analytics.request_timeout_secs must be greater than 0");
        }
        if analytics.max_buckets == 0 || analytics.max_buckets > MAX_BUCKETS_LIMIT {
            anyhow::bail!(
                "Configuration error: analytics.max_buckets must be between 1 and {}",
                MAX_BUCKETS_LIMIT
            );
        }
        if analytics.default_top_limit == 0 || analytics.default_top_limit > MAX_LIMIT {
            anyhow::bail!(
                "Configuration error: analytics.default_top_limit must be between 1 and {}",
                MAX_LIMIT
            );
        }
        if analytics.allowed_units.is_empty() {
            anyhow::bail!("Configuration error: analytics.allowed_units must not be empty");
        }

        if is_all_interfaces(&self.server.host) {
            tracing::warn!(
                host = %self.server.host,
                "Server binds to all interfaces; analytics endpoints carry no authentication"
            );
        }

        Ok(())
    }
}

/// Get the profile config path (~/.blogstat/blogstat.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}
