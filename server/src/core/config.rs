use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_CATALOG_REFRESH_MINUTES, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_TMDB_BASE_URL, DEFAULT_TMDB_LANGUAGE, DEFAULT_TMDB_PAGE, DEFAULT_TMDB_TIMEOUT_SECS,
};

// =============================================================================
// Catalog Source Enum
// =============================================================================

/// Where movie records come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSourceKind {
    #[default]
    Tmdb,
    File,
}

impl fmt::Display for CatalogSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tmdb => write!(f, "tmdb"),
            Self::File => write!(f, "file"),
        }
    }
}

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// TMDB configuration (nested under catalog)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TmdbFileConfig {
    pub base_url: Option<String>,
    pub language: Option<String>,
    pub page: Option<u32>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// File source configuration (nested under catalog)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CatalogFileFileConfig {
    pub path: Option<String>,
}

/// Catalog configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CatalogFileConfig {
    pub source: Option<CatalogSourceKind>,
    pub refresh_minutes: Option<u64>,
    pub tmdb: Option<TmdbFileConfig>,
    pub file: Option<CatalogFileFileConfig>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub catalog: Option<CatalogFileConfig>,
    pub debug: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

/// Overwrite `$dst` with `$src` when the latter is set
macro_rules! merge_field {
    ($dst:expr, $src:expr, $name:literal) => {
        if $src.is_some() {
            tracing::trace!(field = $name, value = ?$src, "Merging config field");
            $dst = $src;
        }
    };
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

    /// Warn about unknown top-level fields in the config
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
            merge_field!(current.host, server.host, "server.host");
            merge_field!(current.port, server.port, "server.port");
        }

        if let Some(catalog) = other.catalog {
            let current = self.catalog.get_or_insert_with(CatalogFileConfig::default);
            merge_field!(current.source, catalog.source, "catalog.source");
            merge_field!(
                current.refresh_minutes,
                catalog.refresh_minutes,
                "catalog.refresh_minutes"
            );

            if let Some(tmdb) = catalog.tmdb {
                let current_tmdb = current.tmdb.get_or_insert_with(TmdbFileConfig::default);
                merge_field!(current_tmdb.base_url, tmdb.base_url, "catalog.tmdb.base_url");
                merge_field!(current_tmdb.language, tmdb.language, "catalog.tmdb.language");
                merge_field!(current_tmdb.page, tmdb.page, "catalog.tmdb.page");
                if tmdb.token.is_some() {
                    tracing::trace!(field = "catalog.tmdb.token", "Merging config field");
                    current_tmdb.token = tmdb.token;
                }
                merge_field!(
                    current_tmdb.timeout_secs,
                    tmdb.timeout_secs,
                    "catalog.tmdb.timeout_secs"
                );
            }

            if let Some(file) = catalog.file {
                let current_file = current.file.get_or_insert_with(CatalogFileFileConfig::default);
                merge_field!(current_file.path, file.path, "catalog.file.path");
            }
        }

        merge_field!(self.debug, other.debug, "debug");
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

/// TMDB catalog configuration
#[derive(Clone)]
pub struct TmdbConfig {
    pub base_url: String,
    pub language: String,
    /// Listing page fetched on every refresh
    pub page: u32,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            language: DEFAULT_TMDB_LANGUAGE.to_string(),
            page: DEFAULT_TMDB_PAGE,
            token: None,
            timeout_secs: DEFAULT_TMDB_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .field("page", &self.page)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Catalog configuration
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub source: CatalogSourceKind,
    /// Minutes between refreshes, 0 disables the background refresh
    pub refresh_minutes: u64,
    pub tmdb: TmdbConfig,
    /// JSON file for the file source
    pub file: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: CatalogSourceKind::default(),
            refresh_minutes: DEFAULT_CATALOG_REFRESH_MINUTES,
            tmdb: TmdbConfig::default(),
            file: None,
        }
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.cinetable/cinetable.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");

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

        Self::from_layers(cli, file_config)
    }

    /// Layer defaults -> merged file config -> CLI/env overrides
    fn from_layers(cli: &CliConfig, file_config: FileConfig) -> Result<Self> {
        let file_server = file_config.server.unwrap_or_default();
        let file_catalog = file_config.catalog.unwrap_or_default();
        let file_tmdb = file_catalog.tmdb.unwrap_or_default();
        let file_source = file_catalog.file.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let defaults = CatalogConfig::default();
        let catalog = CatalogConfig {
            source: cli
                .catalog_source
                .or(file_catalog.source)
                .unwrap_or(defaults.source),
            refresh_minutes: cli
                .catalog_refresh_minutes
                .or(file_catalog.refresh_minutes)
                .unwrap_or(defaults.refresh_minutes),
            tmdb: TmdbConfig {
                base_url: file_tmdb.base_url.unwrap_or(defaults.tmdb.base_url),
                language: file_tmdb.language.unwrap_or(defaults.tmdb.language),
                page: file_tmdb.page.unwrap_or(defaults.tmdb.page),
                token: cli.tmdb_token.clone().or(file_tmdb.token),
                timeout_secs: file_tmdb.timeout_secs.unwrap_or(defaults.tmdb.timeout_secs),
            },
            file: cli
                .catalog_file
                .as_ref()
                .map(|p| expand_path(&p.to_string_lossy()))
                .or_else(|| file_source.path.as_deref().map(expand_path)),
        };

        let debug = cli.debug || file_config.debug.unwrap_or(false);

        let config = Self {
            server: ServerConfig { host, port },
            catalog,
            debug,
        };

        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            debug = config.debug,
            catalog_source = %config.catalog.source,
            catalog_refresh_minutes = config.catalog.refresh_minutes,
            tmdb_base_url = %config.catalog.tmdb.base_url,
            tmdb_token_set = config.catalog.tmdb.token.is_some(),
            catalog_file = ?config.catalog.file,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if self.catalog.tmdb.page == 0 {
            anyhow::bail!("Configuration error: catalog.tmdb.page must be >= 1");
        }

        if self.catalog.tmdb.timeout_secs == 0 {
            anyhow::bail!("Configuration error: catalog.tmdb.timeout_secs must be greater than 0");
        }

        let base_url = &self.catalog.tmdb.base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            anyhow::bail!(
                "Configuration error: catalog.tmdb.base_url must start with http:// or https://. Got: {}",
                base_url
            );
        }

        if self.catalog.source == CatalogSourceKind::File && self.catalog.file.is_none() {
            anyhow::bail!(
                "Configuration error: catalog.file.path is required when catalog.source is 'file'"
            );
        }

        if is_all_interfaces(&self.server.host) {
            tracing::warn!(
                host = %self.server.host,
                "Binding to all network interfaces; the API has no authentication"
            );
        }

        Ok(())
    }
}

/// Get the profile config path (~/.cinetable/cinetable.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn parse(json: &str) -> FileConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_catalog_source_serde() {
        let source: CatalogSourceKind = serde_json::from_str("\"file\"").unwrap();
        assert_eq!(source, CatalogSourceKind::File);
        assert_eq!(CatalogSourceKind::Tmdb.to_string(), "tmdb");
    }

    #[test]
    fn test_file_config_parse_nested_catalog() {
        let config = parse(
            r#"{
                "server": { "host": "0.0.0.0", "port": 8080 },
                "catalog": {
                    "source": "tmdb",
                    "refresh_minutes": 30,
                    "tmdb": { "language": "de-DE", "page": 2, "token": "abc" }
                }
            }"#,
        );

        let catalog = config.catalog.as_ref().unwrap();
        let tmdb = catalog.tmdb.as_ref().unwrap();
        assert_eq!(config.server.as_ref().unwrap().port, Some(8080));
        assert_eq!(catalog.refresh_minutes, Some(30));
        assert_eq!(tmdb.language.as_deref(), Some("de-DE"));
        assert_eq!(tmdb.page, Some(2));
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let config = parse(r#"{ "server": { "host": "localhost" }, "tabel": {} }"#);
        assert!(config.extra.get("tabel").is_some());
    }

    #[test]
    fn test_file_config_merge() {
        let mut base = parse(
            r#"{
                "server": { "host": "base.host", "port": 1000 },
                "catalog": { "refresh_minutes": 5, "tmdb": { "token": "base", "page": 3 } }
            }"#,
        );
        base.merge(parse(
            r#"{
                "server": { "port": 2000 },
                "catalog": { "tmdb": { "token": "overlay" } },
                "debug": true
            }"#,
        ));

        let server = base.server.unwrap();
        let catalog = base.catalog.unwrap();
        let tmdb = catalog.tmdb.unwrap();
        assert_eq!(server.host.as_deref(), Some("base.host"));
        assert_eq!(server.port, Some(2000));
        assert_eq!(catalog.refresh_minutes, Some(5));
        assert_eq!(tmdb.token.as_deref(), Some("overlay"));
        assert_eq!(tmdb.page, Some(3));
        assert_eq!(base.debug, Some(true));
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::from_layers(&CliConfig::default(), FileConfig::default()).unwrap();

        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.catalog.source, CatalogSourceKind::Tmdb);
        assert_eq!(config.catalog.refresh_minutes, DEFAULT_CATALOG_REFRESH_MINUTES);
        assert_eq!(config.catalog.tmdb.base_url, DEFAULT_TMDB_BASE_URL);
        assert!(config.catalog.tmdb.token.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn test_app_config_cli_override() {
        let cli = CliConfig {
            host: Some("cli.host".to_string()),
            port: Some(3000),
            debug: true,
            tmdb_token: Some("cli-token".to_string()),
            catalog_refresh_minutes: Some(0),
            ..CliConfig::default()
        };
        let file = parse(
            r#"{
                "server": { "host": "file.host", "port": 9000 },
                "catalog": { "refresh_minutes": 15, "tmdb": { "token": "file-token", "language": "fr-FR" } }
            }"#,
        );
        let config = AppConfig::from_layers(&cli, file).unwrap();

        assert_eq!(config.server.host, "cli.host");
        assert_eq!(config.server.port, 3000);
        assert!(config.debug);
        assert_eq!(config.catalog.refresh_minutes, 0);
        assert_eq!(config.catalog.tmdb.token.as_deref(), Some("cli-token"));
        assert_eq!(config.catalog.tmdb.language, "fr-FR");
    }

    #[test]
    fn test_app_config_load_from_cli_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "catalog": {{ "source": "file", "file": {{ "path": "/tmp/movies.json" }} }} }}"#
        )
        .unwrap();

        let cli = CliConfig {
            config: Some(file.path().to_path_buf()),
            ..CliConfig::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.catalog.source, CatalogSourceKind::File);
        assert_eq!(config.catalog.file, Some(PathBuf::from("/tmp/movies.json")));
    }

    #[test]
    fn test_app_config_missing_cli_path() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/cinetable.json")),
            ..CliConfig::default()
        };
        assert!(AppConfig::load(&cli).is_err());
    }

    #[test]
    fn test_app_config_validation_file_source_needs_path() {
        let cli = CliConfig {
            catalog_source: Some(CatalogSourceKind::File),
            ..CliConfig::default()
        };
        let err = AppConfig::from_layers(&cli, FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("catalog.file.path"));
    }

    #[test]
    fn test_app_config_validation_server_port_zero() {
        let cli = CliConfig {
            port: Some(0),
            ..CliConfig::default()
        };
        assert!(AppConfig::from_layers(&cli, FileConfig::default()).is_err());
    }

    #[test]
    fn test_app_config_validation_base_url_scheme() {
        let file = parse(r#"{ "catalog": { "tmdb": { "base_url": "api.themoviedb.org" } } }"#);
        assert!(AppConfig::from_layers(&CliConfig::default(), file).is_err());
    }

    #[test]
    fn test_tmdb_config_debug_redacts_token() {
        let tmdb = TmdbConfig {
            token: Some("secret-token".into()),
            ..TmdbConfig::default()
        };
        let debug = format!("{:?}", tmdb);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(!is_all_interfaces("127.0.0.1"));
    }
}
