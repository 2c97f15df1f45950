//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::api::types::OrderBy;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands, TableArgs};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::CatalogService;
use crate::domain::filters::{FilterController, QueryLocation};
use crate::domain::table::{MovieRecord, RowModel, TableDefinition, movies_table};

/// Widest cell printed by the `table` command
const MAX_CELL_WIDTH: usize = 40;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub catalog: Arc<CatalogService>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();

        let (cli_config, command) = cli::parse();
        Self::init_logging(cli_config.debug);

        tracing::debug!(command = ?command, "Application starting");

        match command {
            Some(Commands::Table(args)) => Self::print_table(&cli_config, args).await,
            Some(Commands::Start) | None => {
                let app = Self::init(&cli_config).await?;
                Self::start_server(app).await
            }
        }
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let catalog = Arc::new(
            CatalogService::from_config(&config.catalog)
                .context("Failed to initialize catalog")?,
        );

        // The server still starts with an empty table; refresh retries later
        if let Err(e) = catalog.refresh().await {
            tracing::warn!(error = %e, "Initial catalog fetch failed, starting empty");
        }

        Ok(Self {
            shutdown: ShutdownService::new(),
            config,
            catalog,
        })
    }

    fn init_logging(debug: bool) {
        let level = if debug { "debug" } else { "info" };
        let default_filter = format!("{},{}={}", level, APP_NAME_LOWER, level);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        app.start_background_tasks().await;

        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            app.catalog.source_name(),
            app.catalog.records().len(),
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }

    pub async fn start_background_tasks(&self) {
        if let Some(h) = self
            .catalog
            .start_refresh_task(self.config.catalog.refresh_minutes, self.shutdown.subscribe())
        {
            self.shutdown.register(h).await;
        }

        tracing::debug!("Background tasks started");
    }

    /// Fetch the catalog once and print one page for a query string
    async fn print_table(cli: &CliConfig, args: TableArgs) -> Result<()> {
        let config = AppConfig::load(cli)?;
        let catalog = CatalogService::from_config(&config.catalog)
            .context("Failed to initialize catalog")?;
        catalog
            .refresh()
            .await
            .context("Failed to fetch the catalog")?;

        let table = movies_table();
        let sort = args
            .order_by
            .as_deref()
            .map(|s| OrderBy::parse(s, &table.sortable_ids()))
            .transpose()?;

        let records = catalog.records();
        let mut model = RowModel::new(table, &records);
        let mut location = StaticQuery(args.query);
        FilterController::new(&mut model, &mut location).replay_from_url();
        model.set_sort(sort.map(Into::into));

        let page = model.page(args.page.max(1), args.limit.max(1));
        print!("{}", render_table(table, &page.rows));
        println!(
            "\n{} of {} movies match, page {}",
            page.total_items,
            records.len(),
            args.page.max(1)
        );
        Ok(())
    }
}

/// Read-only location for the `table` command
struct StaticQuery(String);

impl QueryLocation for StaticQuery {
    fn query(&self) -> &str {
        &self.0
    }

    fn push_query(&mut self, query: String) {
        self.0 = query;
    }
}

/// Plain-text table with a header row, cells cut at [`MAX_CELL_WIDTH`]
fn render_table(table: &TableDefinition<MovieRecord>, rows: &[&MovieRecord]) -> String {
    let columns = table.columns();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| truncate(&c.value(row).to_text(), MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<w$}", c.header, w = *w))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<w$}", cell, w = *w))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::testing::sample_movies;

    #[test]
    fn renders_aligned_table() {
        let movies = sample_movies();
        let rows: Vec<&MovieRecord> = movies.iter().take(2).collect();
        let text = render_table(movies_table(), &rows);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID     Title"));
        assert!(lines[1].starts_with("-----  "));
        assert!(lines[2].starts_with("27205  Inception"));
        assert!(lines[3].contains("The Matrix"));
        assert!(lines[3].contains("1999-03-31"));
    }

    #[test]
    fn truncate_marks_cut_cells() {
        assert_eq!(truncate("Inception", 40), "Inception");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }
}
