use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::CatalogSourceKind;
use super::constants::{
    ENV_CATALOG_FILE, ENV_CATALOG_REFRESH_MINUTES, ENV_CATALOG_SOURCE, ENV_CONFIG, ENV_DEBUG,
    ENV_HOST, ENV_PORT, ENV_TMDB_TOKEN,
};

#[derive(Parser)]
#[command(name = "cinetable")]
#[command(version, about = "Filterable movie table with shareable query strings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Enable debug logging of filter application
    #[arg(long, global = true, env = ENV_DEBUG)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// TMDB API bearer token
    #[arg(long, global = true, env = ENV_TMDB_TOKEN, hide_env_values = true)]
    pub tmdb_token: Option<String>,

    /// Catalog source (tmdb or file)
    #[arg(long, global = true, env = ENV_CATALOG_SOURCE, value_parser = parse_catalog_source)]
    pub catalog_source: Option<CatalogSourceKind>,

    /// JSON file for the file catalog source
    #[arg(long, global = true, env = ENV_CATALOG_FILE)]
    pub catalog_file: Option<PathBuf>,

    /// Catalog refresh interval in minutes (0 = disabled)
    #[arg(long, global = true, env = ENV_CATALOG_REFRESH_MINUTES)]
    pub catalog_refresh_minutes: Option<u64>,
}

/// Parse catalog source from CLI/env string
fn parse_catalog_source(s: &str) -> Result<CatalogSourceKind, String> {
    match s.to_lowercase().as_str() {
        "tmdb" => Ok(CatalogSourceKind::Tmdb),
        "file" => Ok(CatalogSourceKind::File),
        _ => Err(format!(
            "Invalid catalog source '{}'. Valid options: tmdb, file",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Print one page of the table for a query string
    Table(TableArgs),
}

#[derive(clap::Args, Clone, Debug)]
pub struct TableArgs {
    /// Filter query string, e.g. "title=matrix&vote_average=min:7"
    #[arg(default_value = "")]
    pub query: String,

    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Rows per page
    #[arg(long, default_value_t = 10)]
    pub limit: u32,

    /// Sort column, optionally suffixed with :asc or :desc
    #[arg(long)]
    pub order_by: Option<String>,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub tmdb_token: Option<String>,
    pub catalog_source: Option<CatalogSourceKind>,
    pub catalog_file: Option<PathBuf>,
    pub catalog_refresh_minutes: Option<u64>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        debug: cli.debug,
        config: cli.config,
        tmdb_token: cli.tmdb_token,
        catalog_source: cli.catalog_source,
        catalog_file: cli.catalog_file,
        catalog_refresh_minutes: cli.catalog_refresh_minutes,
    };
    (config, cli.command)
}
