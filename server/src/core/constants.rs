// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Blogstat";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "blogstat";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".blogstat";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "blogstat.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "BLOGSTAT_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "BLOGSTAT_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "BLOGSTAT_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "BLOGSTAT_LOG";

/// Environment variable for log output format (`compact` or `json`)
pub const ENV_LOG_FORMAT: &str = "BLOGSTAT_LOG_FORMAT";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5390;

/// Graceful shutdown timeout for background tasks
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Environment Variables - Database
// =============================================================================

/// Environment variable for the database backend (sqlite or postgres)
pub const ENV_DB_BACKEND: &str = "BLOGSTAT_DB_BACKEND";

/// Environment variable for the SQLite database path
pub const ENV_SQLITE_PATH: &str = "BLOGSTAT_SQLITE_PATH";

/// Environment variable for the PostgreSQL connection URL
pub const ENV_POSTGRES_URL: &str = "BLOGSTAT_POSTGRES_URL";

// =============================================================================
// SQLite Database
// =============================================================================

/// Default SQLite database filename (relative to the working directory)
pub const SQLITE_DEFAULT_PATH: &str = "blogstat.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 8;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite cache size (negative = KB, so -64000 = 64MB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

// =============================================================================
// PostgreSQL Database
// =============================================================================

pub const POSTGRES_DEFAULT_MAX_CONNECTIONS: u32 = 20;
pub const POSTGRES_DEFAULT_MIN_CONNECTIONS: u32 = 2;
pub const POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
pub const POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
pub const POSTGRES_DEFAULT_MAX_LIFETIME_SECS: u64 = 1800;
pub const POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 30;

/// Interval between PostgreSQL pool health checks
pub const POSTGRES_HEALTH_CHECK_INTERVAL_SECS: u64 = 60;

// =============================================================================
// Environment Variables - Analytics
// =============================================================================

/// Environment variable for the overview composition policy (strict or lenient)
pub const ENV_OVERVIEW_POLICY: &str = "BLOGSTAT_OVERVIEW_POLICY";

/// Environment variable for the per-request timeout in seconds
pub const ENV_REQUEST_TIMEOUT: &str = "BLOGSTAT_REQUEST_TIMEOUT";

/// Environment variable for the per-request fetch concurrency
pub const ENV_REQUEST_CONCURRENCY: &str = "BLOGSTAT_REQUEST_CONCURRENCY";

/// Environment variable for the process-wide fetch concurrency
pub const ENV_GLOBAL_CONCURRENCY: &str = "BLOGSTAT_GLOBAL_CONCURRENCY";

/// Environment variable for the week bucket anchor (iso_monday or range_start)
pub const ENV_WEEK_ANCHOR: &str = "BLOGSTAT_WEEK_ANCHOR";

// =============================================================================
// Analytics Defaults
// =============================================================================

/// In-flight aggregate fetches per request
pub const DEFAULT_REQUEST_CONCURRENCY: usize = 4;

/// In-flight aggregate fetches across all requests
pub const DEFAULT_GLOBAL_CONCURRENCY: usize = 16;

/// Whole-request deadline
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Upper bound on buckets per plan (ten years of daily buckets)
pub const DEFAULT_MAX_BUCKETS: usize = 3660;

/// Ceiling for `analytics.max_buckets`; each bucket window binds 3 parameters
/// and PostgreSQL caps a statement at 65535
pub const MAX_BUCKETS_LIMIT: usize = 20_000;

/// Ranking length when the request carries no limit
pub const DEFAULT_TOP_LIMIT: u32 = 10;

/// Requested limits above this are clamped
pub const MAX_LIMIT: u32 = 100;

// =============================================================================
// Request Body Limits
// =============================================================================

/// Default body limit for API requests (64 KB, analyze bodies are tiny)
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;
