use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::DatabaseBackend;
use super::constants::{
    ENV_CONFIG, ENV_DB_BACKEND, ENV_GLOBAL_CONCURRENCY, ENV_HOST, ENV_OVERVIEW_POLICY, ENV_PORT,
    ENV_POSTGRES_URL, ENV_REQUEST_CONCURRENCY, ENV_REQUEST_TIMEOUT, ENV_SQLITE_PATH,
    ENV_WEEK_ANCHOR,
};
use crate::domain::analytics::{OverviewPolicy, WeekAnchor};

#[derive(Parser)]
#[command(name = "blogstat")]
#[command(version, about = "Blog analytics aggregation server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    // Database options
    /// Database backend holding the blog tables (sqlite or postgres)
    #[arg(long, global = true, env = ENV_DB_BACKEND, value_parser = parse_database_backend)]
    pub db_backend: Option<DatabaseBackend>,

    /// SQLite database path (when using sqlite backend)
    #[arg(long, global = true, env = ENV_SQLITE_PATH)]
    pub sqlite_path: Option<String>,

    /// PostgreSQL connection URL (when using postgres backend)
    #[arg(long, global = true, env = ENV_POSTGRES_URL)]
    pub postgres_url: Option<String>,

    // Analytics options
    /// Overview composition policy (strict or lenient)
    #[arg(long, global = true, env = ENV_OVERVIEW_POLICY, value_parser = parse_overview_policy)]
    pub overview_policy: Option<OverviewPolicy>,

    /// Analyze request deadline in seconds
    #[arg(long, global = true, env = ENV_REQUEST_TIMEOUT)]
    pub request_timeout: Option<u64>,

    /// Aggregate fetches in flight per request
    #[arg(long, global = true, env = ENV_REQUEST_CONCURRENCY)]
    pub request_concurrency: Option<usize>,

    /// Aggregate fetches in flight across all requests
    #[arg(long, global = true, env = ENV_GLOBAL_CONCURRENCY)]
    pub global_concurrency: Option<usize>,

    /// Week bucket anchor (iso_monday or range_start)
    #[arg(long, global = true, env = ENV_WEEK_ANCHOR, value_parser = parse_week_anchor)]
    pub week_anchor: Option<WeekAnchor>,
}

/// Parse database backend from CLI/env string
fn parse_database_backend(s: &str) -> Result<DatabaseBackend, String> {
    match s.to_lowercase().as_str() {
        "sqlite" => Ok(DatabaseBackend::Sqlite),
        "postgres" | "postgresql" => Ok(DatabaseBackend::Postgres),
        _ => Err(format!(
            "Invalid database backend '{}'. Valid options: sqlite, postgres",
            s
        )),
    }
}

/// Parse overview policy from CLI/env string
fn parse_overview_policy(s: &str) -> Result<OverviewPolicy, String> {
    match s.to_lowercase().as_str() {
        "strict" => Ok(OverviewPolicy::Strict),
        "lenient" => Ok(OverviewPolicy::Lenient),
        _ => Err(format!(
            "Invalid overview policy '{}'. Valid options: strict, lenient",
            s
        )),
    }
}

/// Parse week anchor from CLI/env string
fn parse_week_anchor(s: &str) -> Result<WeekAnchor, String> {
    match s.to_lowercase().replace('-', "_").as_str() {
        "iso_monday" | "iso" | "monday" => Ok(WeekAnchor::IsoMonday),
        "range_start" | "rolling" => Ok(WeekAnchor::RangeStart),
        _ => Err(format!(
            "Invalid week anchor '{}'. Valid options: iso_monday, range_start",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Print every analyzable domain, metric slug and overview field
    Metrics,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub db_backend: Option<DatabaseBackend>,
    pub sqlite_path: Option<String>,
    pub postgres_url: Option<String>,
    pub overview_policy: Option<OverviewPolicy>,
    pub request_timeout: Option<u64>,
    pub request_concurrency: Option<usize>,
    pub global_concurrency: Option<usize>,
    pub week_anchor: Option<WeekAnchor>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        db_backend: cli.db_backend,
        sqlite_path: cli.sqlite_path,
        postgres_url: cli.postgres_url,
        overview_policy: cli.overview_policy,
        request_timeout: cli.request_timeout,
        request_concurrency: cli.request_concurrency,
        global_concurrency: cli.global_concurrency,
        week_anchor: cli.week_anchor,
    };
    (config, cli.command)
}
