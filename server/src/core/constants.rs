// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Cinetable";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "cinetable";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".cinetable";

/// User agent for outbound catalog requests
pub const USER_AGENT: &str = concat!("Cinetable/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "cinetable.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "CINETABLE_CONFIG";

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "CINETABLE_DEBUG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

pub const ENV_HOST: &str = "CINETABLE_HOST";
pub const ENV_PORT: &str = "CINETABLE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "CINETABLE_LOG";

// =============================================================================
// Environment Variables - Catalog
// =============================================================================

/// Bearer token for the TMDB API
pub const ENV_TMDB_TOKEN: &str = "CINETABLE_TMDB_TOKEN";

/// Catalog source (tmdb or file)
pub const ENV_CATALOG_SOURCE: &str = "CINETABLE_CATALOG_SOURCE";

/// Path of the JSON file used by the file source
pub const ENV_CATALOG_FILE: &str = "CINETABLE_CATALOG_FILE";

/// Catalog refresh interval in minutes (0 = disabled)
pub const ENV_CATALOG_REFRESH_MINUTES: &str = "CINETABLE_CATALOG_REFRESH_MINUTES";

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5390;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_TMDB_LANGUAGE: &str = "en-US";
pub const DEFAULT_TMDB_PAGE: u32 = 1;
pub const DEFAULT_TMDB_TIMEOUT_SECS: u64 = 15;

/// Catalog refresh interval in minutes
pub const DEFAULT_CATALOG_REFRESH_MINUTES: u64 = 60;

/// Maximum time to wait for background tasks on shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// API
// =============================================================================

pub const API_PREFIX: &str = "/api/v1";

/// Path the filter endpoints redirect to
pub const MOVIES_PATH: &str = "/api/v1/movies";

/// Request body limit for the JSON endpoints
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;
