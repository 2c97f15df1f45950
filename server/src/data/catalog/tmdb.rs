//! TMDB-compatible HTTP catalog

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::{CatalogSource, PopularMoviesResponse};
use crate::core::config::TmdbConfig;
use crate::core::constants::USER_AGENT;
use crate::data::error::CatalogError;
use crate::domain::table::MovieRecord;
use crate::utils::retry::{DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, retry_transient};

/// Longest error body kept in [`CatalogError::Status`]
const MAX_ERROR_BODY: usize = 200;

pub struct TmdbCatalog {
    client: reqwest::Client,
    endpoint: Url,
    language: String,
    token: String,
}

impl TmdbCatalog {
    pub fn new(config: &TmdbConfig) -> Result<Self, CatalogError> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                CatalogError::Config(
                    "catalog.tmdb.token is required for the tmdb source".to_string(),
                )
            })?;

        let base = config.base_url.trim_end_matches('/');
        let endpoint = Url::parse(&format!("{}/movie/popular", base)).map_err(|e| {
            CatalogError::Config(format!("Invalid catalog.tmdb.base_url '{}': {}", base, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            language: config.language.clone(),
            token,
        })
    }

    fn page_url(&self, page: u32) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("language", &self.language)
            .append_pair("page", &page.to_string());
        url
    }

    async fn fetch_once(&self, url: &Url) -> Result<Vec<MovieRecord>, CatalogError> {
        let response = self
            .client
            .get(url.as_str())
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let mut body = body;
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PopularMoviesResponse =
            serde_json::from_str(&body).map_err(|e| CatalogError::Decode(e.to_string()))?;
        tracing::trace!(
            page = parsed.page,
            total_pages = parsed.total_pages,
            total_results = parsed.total_results,
            "Catalog page decoded"
        );
        Ok(parsed.results)
    }
}

#[async_trait]
impl CatalogSource for TmdbCatalog {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<MovieRecord>, CatalogError> {
        let url = self.page_url(page);
        tracing::debug!(url = %url, "Fetching catalog page");

        retry_transient(
            DEFAULT_MAX_ATTEMPTS,
            DEFAULT_BASE_DELAY_MS,
            CatalogError::is_transient,
            || self.fetch_once(&url),
        )
        .await
    }
}
